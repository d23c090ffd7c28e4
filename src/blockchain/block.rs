use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::hash::hash_block;
use crate::transaction::Transaction;

/// Proof carried by the genesis block.
pub const GENESIS_PROOF: u64 = 100;

/// `previous_hash` of the genesis block. Not a real digest.
pub const GENESIS_PREVIOUS_HASH: &str = "1";

/// A single block of the chain. Indices are 1-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub timestamp: f64, // seconds since epoch (UTC), fractional
    pub transactions: Vec<Transaction>,
    pub proof: u64,
    pub previous_hash: String,
}

impl Block {
    /// Create the genesis block (first block in the chain).
    pub fn genesis() -> Self {
        Self::new(
            1,
            Vec::new(),
            GENESIS_PROOF,
            GENESIS_PREVIOUS_HASH.to_string(),
        )
    }

    /// Create a block stamped with the current time.
    pub fn new(
        index: u64,
        transactions: Vec<Transaction>,
        proof: u64,
        previous_hash: String,
    ) -> Self {
        Self {
            index,
            timestamp: now_secs(),
            transactions,
            proof,
            previous_hash,
        }
    }

    /// SHA-256 of the block's canonical JSON form.
    pub fn hash(&self) -> String {
        hash_block(self)
    }
}

fn now_secs() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}
