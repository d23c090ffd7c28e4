use std::time::Duration;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::blockchain::{Block, Ledger, ProofOfWork};
use crate::config::Config;
use crate::consensus::{ConsensusResolver, FetchError, HttpPeerClient, PeerSet};
use crate::transaction::Transaction;

/// Everything a node serves from: its ledger, its peers and how to reach them.
/// Owned by the HTTP server and handed to every handler; there is no global.
pub struct AppState {
    pub ledger: Ledger,
    pub peers: PeerSet,
    pub resolver: ConsensusResolver<HttpPeerClient>,
    pub node_id: String,
    pub mine_timeout: Option<Duration>,
}

impl AppState {
    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        let pow = ProofOfWork::new(config.difficulty);
        let client = HttpPeerClient::new(config.peer_timeout)?;
        let state = Self {
            ledger: Ledger::new(pow.clone()),
            peers: PeerSet::new(),
            resolver: ConsensusResolver::new(client, pow),
            node_id: config.node_id.clone(),
            mine_timeout: config.mine_timeout,
        };

        for peer in &config.bootstrap_peers {
            match state.peers.register(peer) {
                Ok(addr) => info!("bootstrap peer {addr} registered"),
                Err(e) => warn!("skipping bootstrap peer: {e}"),
            }
        }
        Ok(state)
    }
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/* ---------- Mining API Models ---------- */

#[derive(Serialize)]
pub struct MineResponse {
    pub message: &'static str,
    pub index: u64,
    pub transactions: Vec<Transaction>,
    pub proof: u64,
    pub previous_hash: String,
}

/* ---------- TX API Models ---------- */

/// Every field is optional so a missing one maps to a plain 400.
#[derive(Deserialize)]
pub struct NewTxRequest {
    pub sender: Option<String>,
    pub recipient: Option<String>,
    pub amount: Option<Number>,
}

/* ---------- Node API Models ---------- */

#[derive(Deserialize)]
pub struct RegisterNodesRequest {
    pub nodes: Option<Vec<String>>,
}

#[derive(Serialize)]
pub struct RegisterNodesResponse {
    pub message: &'static str,
    pub total_nodes: Vec<String>,
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum ResolveResponse {
    Replaced {
        message: &'static str,
        new_chain: Vec<Block>,
    },
    Authoritative {
        message: &'static str,
        chain: Vec<Block>,
    },
}
