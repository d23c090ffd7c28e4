use log::debug;
use thiserror::Error;

use super::{Block, ProofOfWork};

/// Why a candidate chain was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("chain is empty")]
    Empty,
    #[error("chain must start at index 1, starts at {found}")]
    GenesisIndex { found: u64 },
    #[error("expected block index {expected}, found {found}")]
    IndexGap { expected: u64, found: u64 },
    #[error("block {index} does not link to the hash of its predecessor")]
    BrokenLink { index: u64 },
    #[error("block {index} carries a proof that does not solve its predecessor's puzzle")]
    InvalidProof { index: u64 },
}

/// Walk the chain from the second block onward checking index continuity,
/// hash linkage and proof-of-work. Apart from its index, the genesis block
/// is trusted, so a chain holding only genesis is always valid.
pub fn validate_chain(chain: &[Block], pow: &ProofOfWork) -> Result<(), ChainError> {
    let Some(genesis) = chain.first() else {
        return Err(ChainError::Empty);
    };
    if genesis.index != 1 {
        return Err(ChainError::GenesisIndex {
            found: genesis.index,
        });
    }

    for pair in chain.windows(2) {
        let (prev, current) = (&pair[0], &pair[1]);

        if prev.index.checked_add(1) != Some(current.index) {
            return Err(ChainError::IndexGap {
                expected: prev.index.saturating_add(1),
                found: current.index,
            });
        }

        if current.previous_hash != prev.hash() {
            return Err(ChainError::BrokenLink {
                index: current.index,
            });
        }

        if !pow.verify(prev.proof, current.proof) {
            return Err(ChainError::InvalidProof {
                index: current.index,
            });
        }
    }

    Ok(())
}

/// Boolean form of [`validate_chain`]; the rejection reason is logged.
pub fn is_valid_chain(chain: &[Block], pow: &ProofOfWork) -> bool {
    match validate_chain(chain, pow) {
        Ok(()) => true,
        Err(e) => {
            debug!("chain of length {} rejected: {}", chain.len(), e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::Transaction;

    /// Mines `extra` blocks on top of a fresh genesis.
    fn build_chain(pow: &ProofOfWork, extra: usize) -> Vec<Block> {
        let mut chain = vec![Block::genesis()];
        for _ in 0..extra {
            let prev = chain.last().unwrap();
            let proof = pow.mine(prev.proof);
            let block = Block::new(
                prev.index + 1,
                vec![Transaction::reward("miner")],
                proof,
                prev.hash(),
            );
            chain.push(block);
        }
        chain
    }

    #[test]
    fn genesis_only_is_valid() {
        let pow = ProofOfWork::default();
        assert!(is_valid_chain(&[Block::genesis()], &pow));
    }

    #[test]
    fn empty_chain_is_invalid() {
        let pow = ProofOfWork::default();
        assert_eq!(validate_chain(&[], &pow), Err(ChainError::Empty));
    }

    #[test]
    fn mined_chain_is_valid() {
        let pow = ProofOfWork::new(2);
        let chain = build_chain(&pow, 3);
        assert_eq!(validate_chain(&chain, &pow), Ok(()));
    }

    #[test]
    fn tampered_previous_hash_is_rejected() {
        let pow = ProofOfWork::new(2);
        let mut chain = build_chain(&pow, 3);
        chain[2].previous_hash = "f".repeat(64);
        assert_eq!(
            validate_chain(&chain, &pow),
            Err(ChainError::BrokenLink { index: 3 })
        );
    }

    #[test]
    fn tampered_transactions_break_the_next_link() {
        let pow = ProofOfWork::new(2);
        let mut chain = build_chain(&pow, 3);
        chain[1].transactions.push(Transaction::new("mallory", "mallory", 1_000));
        assert_eq!(
            validate_chain(&chain, &pow),
            Err(ChainError::BrokenLink { index: 3 })
        );
    }

    #[test]
    fn bad_proof_is_rejected() {
        let pow = ProofOfWork::new(2);
        let mut chain = build_chain(&pow, 2);
        let last = chain.len() - 1;
        let prev_proof = chain[last - 1].proof;
        let bogus = (0..).find(|p| !pow.verify(prev_proof, *p)).unwrap();
        chain[last].proof = bogus;
        assert_eq!(
            validate_chain(&chain, &pow),
            Err(ChainError::InvalidProof { index: 3 })
        );
        assert!(!is_valid_chain(&chain, &pow));
    }

    #[test]
    fn index_gap_is_rejected() {
        let pow = ProofOfWork::new(2);
        let mut chain = build_chain(&pow, 2);
        chain[2].index = 7;
        assert_eq!(
            validate_chain(&chain, &pow),
            Err(ChainError::IndexGap {
                expected: 3,
                found: 7
            })
        );
    }

    #[test]
    fn chain_must_start_at_index_one() {
        let pow = ProofOfWork::new(2);
        let mut genesis = Block::genesis();
        genesis.index = u64::MAX - 1;
        let proof = pow.mine(genesis.proof);
        let next = Block::new(u64::MAX, Vec::new(), proof, genesis.hash());
        let chain = vec![genesis, next];

        assert_eq!(
            validate_chain(&chain, &pow),
            Err(ChainError::GenesisIndex {
                found: u64::MAX - 1
            })
        );
        assert_eq!(
            validate_chain(&chain[..1], &pow),
            Err(ChainError::GenesisIndex {
                found: u64::MAX - 1
            })
        );
    }

    #[test]
    fn validation_does_not_touch_the_chain() {
        let pow = ProofOfWork::new(2);
        let chain = build_chain(&pow, 2);
        let copy = chain.clone();
        assert!(is_valid_chain(&chain, &pow));
        assert_eq!(chain, copy);
    }
}
