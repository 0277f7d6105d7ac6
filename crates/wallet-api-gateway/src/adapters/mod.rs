//! Adapters for the collaborator ports.

pub mod memory;

pub use memory::{MemoryNode, MemoryTxFeeds};
