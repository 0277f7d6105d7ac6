//! Ports (collaborator interfaces).

pub mod outbound;

pub use outbound::{
    AccountsService, AliasResolver, AssetsService, ChainService, CollaboratorError,
    CollaboratorResult, KeyStore, NetworkService, TransactionService, TxFeedService,
    WalletService,
};
