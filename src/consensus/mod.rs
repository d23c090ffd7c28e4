pub mod client;
pub mod peers;
pub mod resolver;

pub use client::{DEFAULT_PEER_TIMEOUT, FetchError, HttpPeerClient, PeerChain, PeerClient};
pub use peers::{InvalidPeerAddress, PeerSet, normalize_address};
pub use resolver::{ConsensusResolver, Resolution};
