pub mod model;

pub use model::{MINING_REWARD, MINT_SENDER, Transaction};
