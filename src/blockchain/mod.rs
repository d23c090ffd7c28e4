pub mod block;
pub mod hash;
pub mod ledger;
pub mod proof;
pub mod validator;

pub use block::{Block, GENESIS_PREVIOUS_HASH, GENESIS_PROOF};
pub use hash::hash_block;
pub use ledger::{Ledger, LedgerError, MiningJob};
pub use proof::{DEFAULT_DIFFICULTY, MiningError, ProofOfWork};
pub use validator::{ChainError, is_valid_chain, validate_chain};
