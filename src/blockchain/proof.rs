use sha2::{Digest, Sha256};
use thiserror::Error;

/// Default Proof-of-Work difficulty (number of leading zero hex digits).
pub const DEFAULT_DIFFICULTY: usize = 4;

/// How many candidates `mine_until` tries between two stop checks.
const STOP_CHECK_INTERVAL: u64 = 4096;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MiningError {
    #[error("mining on top of proof {last_proof} aborted after {attempts} attempts")]
    Aborted { last_proof: u64, attempts: u64 },
}

/// The puzzle: find `proof` such that `sha256("{last_proof}{proof}")`
/// starts with `difficulty` zero hex digits. Difficulty never retargets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofOfWork {
    difficulty: usize,
    target_prefix: String,
}

impl Default for ProofOfWork {
    fn default() -> Self {
        Self::new(DEFAULT_DIFFICULTY)
    }
}

impl ProofOfWork {
    pub fn new(difficulty: usize) -> Self {
        Self {
            difficulty,
            target_prefix: "0".repeat(difficulty),
        }
    }

    pub fn difficulty(&self) -> usize {
        self.difficulty
    }

    /// Does `proof` solve the puzzle posed by `last_proof`?
    pub fn verify(&self, last_proof: u64, proof: u64) -> bool {
        let guess = format!("{last_proof}{proof}");
        let digest = hex::encode(Sha256::digest(guess.as_bytes()));
        digest.starts_with(&self.target_prefix)
    }

    /// Smallest non-negative proof accepted by `verify` for `last_proof`.
    /// Unbounded; see `mine_until` for a stoppable search.
    pub fn mine(&self, last_proof: u64) -> u64 {
        let mut proof = 0;
        while !self.verify(last_proof, proof) {
            proof += 1;
        }
        proof
    }

    /// Same search as `mine`, but polls `should_stop` every few thousand
    /// candidates and gives up with `MiningError::Aborted` once it says so.
    pub fn mine_until<F>(&self, last_proof: u64, mut should_stop: F) -> Result<u64, MiningError>
    where
        F: FnMut() -> bool,
    {
        let mut proof = 0;
        loop {
            if self.verify(last_proof, proof) {
                return Ok(proof);
            }
            proof += 1;
            if proof % STOP_CHECK_INTERVAL == 0 && should_stop() {
                return Err(MiningError::Aborted {
                    last_proof,
                    attempts: proof,
                });
            }
        }
    }
}
