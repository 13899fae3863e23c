//! Transaction builder
//!
//! Turns a recipient and an atomic amount into the transfer descriptor the
//! wallet extension signs. Pure; no I/O.

use agentmart_types::{
    AmountError, AtomicAmount, Classify, ErrorKind, UnsignedTransaction, AMA_SYMBOL, COIN_CONTRACT,
    TRANSFER_METHOD,
};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("Recipient address is required")]
    MissingRecipient,

    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),
}

impl Classify for BuildError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Validation
    }
}

/// Build a `Coin.transfer` of `amount` atomic units to `recipient`
pub fn build_transfer(recipient: &str, amount: AtomicAmount) -> Result<UnsignedTransaction, BuildError> {
    if recipient.trim().is_empty() {
        return Err(BuildError::MissingRecipient);
    }

    Ok(UnsignedTransaction {
        contract: COIN_CONTRACT.to_string(),
        method: TRANSFER_METHOD.to_string(),
        args: vec![recipient.to_string(), amount.to_string(), AMA_SYMBOL.to_string()],
        description: format!("Transfer {} AMA for agent purchase", amount.to_ama_string()),
    })
}

/// Same as [`build_transfer`] but from loosely typed JSON input.
///
/// A recipient must be a non-blank string; the amount follows
/// [`AtomicAmount::from_json`] and is never rounded.
pub fn build_transfer_from_json(
    recipient: Option<&Value>,
    amount: Option<&Value>,
) -> Result<UnsignedTransaction, BuildError> {
    let recipient = match recipient {
        Some(Value::String(s)) => s.as_str(),
        _ => return Err(BuildError::MissingRecipient),
    };
    if recipient.trim().is_empty() {
        return Err(BuildError::MissingRecipient);
    }
    let amount = AtomicAmount::from_json(amount)?;
    build_transfer(recipient, amount)
}
