//! Wallet CLI: build, sign and submit transactions through the wallet API gateway.

pub mod api;
pub mod cli;
pub mod commands;
pub mod domain;
