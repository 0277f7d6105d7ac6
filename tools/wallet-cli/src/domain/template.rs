//! Transaction template construction from command-line parameters.
//!
//! Two flows, both paying the gas fee from the same account first:
//!
//! ```text
//! issue: spend_account(fee) → issue(asset)         → control_account(asset)
//! spend: spend_account(fee) → spend_account(asset) → control_receiver(asset)
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::api::{Action, BuildRequest, Receiver};

/// Asset id the gas fee is paid in.
pub const FEE_ASSET_ID: &str = "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff";

pub const DEFAULT_GAS: u64 = 20_000_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("Invalid transaction template type {0:?}, valid types: 'issue', 'spend'")]
    UnknownKind(String),
    #[error("spend transactions require a receiver program")]
    MissingReceiver,
    #[error("invalid {field}: {value:?}")]
    InvalidAmount { field: &'static str, value: String },
    #[error("{0} must not be empty")]
    Empty(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxKind {
    Issue,
    Spend,
}

impl FromStr for TxKind {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "issue" => Ok(TxKind::Issue),
            "spend" => Ok(TxKind::Spend),
            other => Err(TemplateError::UnknownKind(other.to_string())),
        }
    }
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxKind::Issue => write!(f, "issue"),
            TxKind::Spend => write!(f, "spend"),
        }
    }
}

/// Parse a decimal amount argument.
pub fn parse_amount(field: &'static str, value: &str) -> Result<u64, TemplateError> {
    value
        .trim()
        .parse()
        .map_err(|_| TemplateError::InvalidAmount {
            field,
            value: value.to_string(),
        })
}

/// Builds the action list for one issue or spend transaction.
#[derive(Debug, Clone)]
pub struct TransactionTemplateBuilder {
    kind: TxKind,
    account_id: String,
    asset_id: String,
    amount: u64,
    receiver: Option<String>,
    gas: u64,
    expires_at: Option<DateTime<Utc>>,
}

impl TransactionTemplateBuilder {
    pub fn new(
        kind: TxKind,
        account_id: impl Into<String>,
        asset_id: impl Into<String>,
        amount: u64,
    ) -> Self {
        Self {
            kind,
            account_id: account_id.into(),
            asset_id: asset_id.into(),
            amount,
            receiver: None,
            gas: DEFAULT_GAS,
            expires_at: None,
        }
    }

    /// Receiver control program; empty strings count as absent.
    pub fn receiver(mut self, program: Option<String>) -> Self {
        self.receiver = program.filter(|p| !p.trim().is_empty());
        self
    }

    pub fn gas(mut self, gas: u64) -> Self {
        self.gas = gas;
        self
    }

    /// Receiver expiry; defaults to one day from build time.
    pub fn expires_at(mut self, at: DateTime<Utc>) -> Self {
        self.expires_at = Some(at);
        self
    }

    pub fn kind(&self) -> TxKind {
        self.kind
    }

    pub fn build(&self) -> Result<BuildRequest, TemplateError> {
        if self.account_id.is_empty() {
            return Err(TemplateError::Empty("account id"));
        }
        if self.asset_id.is_empty() {
            return Err(TemplateError::Empty("asset id"));
        }

        let fee = Action::SpendAccount {
            asset_id: FEE_ASSET_ID.to_string(),
            amount: self.gas,
            account_id: self.account_id.clone(),
        };

        let actions = match self.kind {
            TxKind::Issue => vec![
                fee,
                Action::Issue {
                    asset_id: self.asset_id.clone(),
                    amount: self.amount,
                },
                Action::ControlAccount {
                    asset_id: self.asset_id.clone(),
                    amount: self.amount,
                    account_id: self.account_id.clone(),
                },
            ],
            TxKind::Spend => {
                let program = self.receiver.clone().ok_or(TemplateError::MissingReceiver)?;
                let expires_at = self.expires_at.unwrap_or_else(|| Utc::now() + Duration::days(1));
                vec![
                    fee,
                    Action::SpendAccount {
                        asset_id: self.asset_id.clone(),
                        amount: self.amount,
                        account_id: self.account_id.clone(),
                    },
                    Action::ControlReceiver {
                        asset_id: self.asset_id.clone(),
                        amount: self.amount,
                        receiver: Receiver {
                            control_program: program,
                            expires_at: Some(expires_at.to_rfc3339()),
                        },
                    },
                ]
            }
        };

        Ok(BuildRequest { actions })
    }
}
