//! Transaction descriptors exchanged with the wallet and the chain node

use serde::{Deserialize, Serialize};

/// Contract that holds AMA balances
pub const COIN_CONTRACT: &str = "Coin";

/// Coin contract method used for purchases
pub const TRANSFER_METHOD: &str = "transfer";

/// Unsigned transfer intent handed to the wallet for signing.
///
/// The wallet extension expects every argument as a string:
/// `[recipient, amount_in_atomic_units, symbol]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsignedTransaction {
    pub contract: String,
    pub method: String,
    pub args: Vec<String>,
    pub description: String,
}

/// Output of the wallet signer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedTransaction {
    /// Hash computed by the wallet; may differ from the confirmed hash
    pub tx_hash: String,
    /// Packed signed transaction, opaque to the marketplace
    pub tx_packed: Vec<u8>,
}

/// Node acknowledgement of a submitted transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReceipt {
    pub tx_hash: String,
}
