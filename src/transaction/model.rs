use serde::{Deserialize, Serialize};
use serde_json::Number;

/// Sender recorded on transactions minted by the node itself.
pub const MINT_SENDER: &str = "0";

/// Amount credited to a node for forging a block.
pub const MINING_REWARD: i64 = 1;

/// A transfer waiting in the pending pool or committed to a block.
///
/// Amounts are kept as plain JSON numbers: no sign or magnitude checks
/// are applied when a transaction is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub recipient: String,
    pub amount: Number,
}

impl Transaction {
    pub fn new(
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: impl Into<Number>,
    ) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            amount: amount.into(),
        }
    }

    /// Reward paid to `recipient` for finding a proof.
    pub fn reward(recipient: impl Into<String>) -> Self {
        Self::new(MINT_SENDER, recipient, MINING_REWARD)
    }

    pub fn is_reward(&self) -> bool {
        self.sender == MINT_SENDER
    }
}
