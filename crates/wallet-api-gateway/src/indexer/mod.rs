//! Pure aggregation over freshly fetched unspent outputs.
//!
//! Nothing here holds state between calls; each request builds an indexer,
//! runs it once and drops it.

pub mod balances;
pub mod unspent;

pub use balances::BalanceIndexer;
pub use unspent::UnspentOutputIndexer;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndexError {
    #[error("balance overflow for account {account_id}, asset {asset_id}")]
    AmountOverflow { account_id: String, asset_id: String },
}
