use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use log::{debug, info};
use serde_json::Number;
use thiserror::Error;

use super::validator::is_valid_chain;
use super::{Block, ProofOfWork};
use crate::transaction::Transaction;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("tip moved while mining: expected previous hash {expected}, chain now ends in {actual}")]
    StaleTip { expected: String, actual: String },
    #[error("proof {proof} does not solve the puzzle for last proof {last_proof}")]
    InvalidProof { last_proof: u64, proof: u64 },
}

/// Everything a miner needs to search for the next proof without holding
/// the ledger lock. Captured by [`Ledger::mining_job`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MiningJob {
    pub index: u64,
    pub last_proof: u64,
    pub previous_hash: String,
    pub generation: u64,
}

#[derive(Debug)]
struct LedgerState {
    chain: Vec<Block>,
    pending: Vec<Transaction>,
}

impl LedgerState {
    fn last_block(&self) -> &Block {
        self.chain
            .last()
            .expect("ledger should always hold at least the genesis block")
    }

    fn next_index(&self) -> u64 {
        self.last_block().index.saturating_add(1)
    }

    fn forge(&mut self, proof: u64, previous_hash: Option<String>) -> Block {
        let index = self.next_index();
        let previous_hash = previous_hash.unwrap_or_else(|| self.last_block().hash());

        // The pool is drained, not copied: these become the block's transactions
        let transactions = std::mem::take(&mut self.pending);
        let block = Block::new(index, transactions, proof, previous_hash);
        self.chain.push(block.clone());
        block
    }
}

/// In-memory chain plus pending pool, guarded by a single lock so that
/// appends, forges and chain replacements never interleave.
#[derive(Debug)]
pub struct Ledger {
    state: Mutex<LedgerState>,
    /// Bumped on every wholesale chain replacement.
    generation: AtomicU64,
    pow: ProofOfWork,
}

impl Ledger {
    /// Initialize a ledger holding only a fresh genesis block.
    pub fn new(pow: ProofOfWork) -> Self {
        Self {
            state: Mutex::new(LedgerState {
                chain: vec![Block::genesis()],
                pending: Vec::new(),
            }),
            generation: AtomicU64::new(0),
            pow,
        }
    }

    pub fn pow(&self) -> &ProofOfWork {
        &self.pow
    }

    /// Queue a transaction for the next block. Returns that block's index.
    pub fn add_transaction(
        &self,
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: impl Into<Number>,
    ) -> u64 {
        self.push_transaction(Transaction::new(sender, recipient, amount))
    }

    pub fn push_transaction(&self, tx: Transaction) -> u64 {
        let mut state = self.state.lock().expect("mutex poisoned");
        state.pending.push(tx);
        debug!("pending pool size now {}", state.pending.len());
        state.next_index()
    }

    /// Seal the pending pool into a new block carrying `proof` and append it.
    /// `previous_hash` defaults to the hash of the current last block.
    pub fn forge_block(&self, proof: u64, previous_hash: Option<String>) -> Block {
        let mut state = self.state.lock().expect("mutex poisoned");
        let block = state.forge(proof, previous_hash);
        info!(
            "forged block #{} (proof={}, txs={})",
            block.index,
            block.proof,
            block.transactions.len()
        );
        block
    }

    pub fn last_block(&self) -> Block {
        let state = self.state.lock().expect("mutex poisoned");
        state.last_block().clone()
    }

    /// Copy of the whole chain, for serialization or consensus.
    pub fn chain_snapshot(&self) -> Vec<Block> {
        let state = self.state.lock().expect("mutex poisoned");
        state.chain.clone()
    }

    pub fn pending_transactions(&self) -> Vec<Transaction> {
        let state = self.state.lock().expect("mutex poisoned");
        state.pending.clone()
    }

    pub fn len(&self) -> usize {
        let state = self.state.lock().expect("mutex poisoned");
        state.chain.len()
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Snapshot of the tip to mine against.
    pub fn mining_job(&self) -> MiningJob {
        let state = self.state.lock().expect("mutex poisoned");
        let last = state.last_block();
        MiningJob {
            index: state.next_index(),
            last_proof: last.proof,
            previous_hash: last.hash(),
            generation: self.generation(),
        }
    }

    /// False once the chain has been replaced since `job` was taken.
    /// Lock-free, meant to be polled from a mining loop.
    pub fn is_current(&self, job: &MiningJob) -> bool {
        self.generation() == job.generation
    }

    /// Append `reward` and forge a block for a proof found against `job`.
    /// Fails without touching the ledger if the tip has moved since the
    /// job was taken or if the proof does not verify.
    pub fn forge_mined_block(
        &self,
        job: &MiningJob,
        proof: u64,
        reward: Transaction,
    ) -> Result<Block, LedgerError> {
        if !self.pow.verify(job.last_proof, proof) {
            return Err(LedgerError::InvalidProof {
                last_proof: job.last_proof,
                proof,
            });
        }

        let mut state = self.state.lock().expect("mutex poisoned");
        let tip_hash = state.last_block().hash();
        if tip_hash != job.previous_hash {
            return Err(LedgerError::StaleTip {
                expected: job.previous_hash.clone(),
                actual: tip_hash,
            });
        }

        state.pending.push(reward);
        let block = state.forge(proof, Some(tip_hash));
        info!(
            "forged block #{} (proof={}, txs={})",
            block.index,
            block.proof,
            block.transactions.len()
        );
        Ok(block)
    }

    /// Replace the whole chain with `candidate` if it is still strictly
    /// longer than ours and valid. The pending pool is left untouched.
    pub fn adopt_chain(&self, candidate: Vec<Block>) -> bool {
        let mut state = self.state.lock().expect("mutex poisoned");
        if candidate.len() <= state.chain.len() {
            debug!(
                "not adopting chain of length {}: ours is {}",
                candidate.len(),
                state.chain.len()
            );
            return false;
        }
        if !is_valid_chain(&candidate, &self.pow) {
            return false;
        }

        let old_len = state.chain.len();
        state.chain = candidate;
        self.generation.fetch_add(1, Ordering::AcqRel);
        info!(
            "chain replaced: length {} -> {}",
            old_len,
            state.chain.len()
        );
        true
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(ProofOfWork::default())
    }
}
