//! API client module for the wallet gateway's JSON endpoints.

mod client;
mod types;

pub use client::{decode_envelope, ClientError, WalletApi, WalletApiClient};
pub use types::*;
