//! Domain logic for the wallet CLI.

pub mod template;

pub use template::{parse_amount, TemplateError, TransactionTemplateBuilder, TxKind};

/// Process exit codes.
pub mod exit {
    pub const SUCCESS: i32 = 0;
    /// Bad arguments or local execution failure; nothing was sent.
    pub const LOCAL_EXEC: i32 = 1;
    pub const CONNECTION: i32 = 2;
    /// The reply could not be read into the expected shape.
    pub const LOCAL_PARSE: i32 = 3;
    /// The gateway answered with a fail envelope.
    pub const REMOTE: i32 = 4;
}
