use std::collections::HashSet;

use futures::future::join_all;
use log::{debug, info, warn};

use super::client::{PeerChain, PeerClient};
use crate::blockchain::{Block, ProofOfWork, validate_chain};

/// Outcome of a resolution round.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// True when a peer's chain beat the local one.
    pub replaced: bool,
    /// The winning chain (the local one when nothing beat it).
    pub chain: Vec<Block>,
}

/// Longest-valid-chain rule across the known peers.
pub struct ConsensusResolver<C> {
    client: C,
    pow: ProofOfWork,
}

impl<C: PeerClient> ConsensusResolver<C> {
    pub fn new(client: C, pow: ProofOfWork) -> Self {
        Self { client, pow }
    }

    /// Fetch every peer's chain concurrently and return the strictly longest
    /// valid one, or `local_chain` untouched if no peer beats it. Peers that
    /// fail to answer are skipped. Results are weighed in sorted peer order
    /// once every fetch has settled, so the outcome does not depend on
    /// which peer answered first.
    pub async fn resolve(&self, local_chain: Vec<Block>, peers: &HashSet<String>) -> Resolution {
        let mut peers: Vec<&str> = peers.iter().map(String::as_str).collect();
        peers.sort_unstable();

        let fetches = peers.iter().map(|peer| async move {
            let result = self
                .client
                .fetch_chain(peer)
                .await
                .and_then(PeerChain::into_checked);
            (*peer, result)
        });
        let results = join_all(fetches).await;

        let mut best: Option<Vec<Block>> = None;
        let mut best_len = local_chain.len();

        for (peer, result) in results {
            let chain = match result {
                Ok(chain) => chain,
                Err(e) => {
                    warn!("skipping peer {peer}: {e}");
                    continue;
                }
            };

            if chain.len() <= best_len {
                debug!(
                    "peer {peer} chain of length {} does not beat {}",
                    chain.len(),
                    best_len
                );
                continue;
            }

            if let Err(e) = validate_chain(&chain, &self.pow) {
                warn!(
                    "peer {peer} offered an invalid chain of length {}: {e}",
                    chain.len()
                );
                continue;
            }

            debug!("peer {peer} leads with a valid chain of length {}", chain.len());
            best_len = chain.len();
            best = Some(chain);
        }

        match best {
            Some(chain) => {
                info!(
                    "consensus: adopting peer chain of length {} (local was {})",
                    chain.len(),
                    local_chain.len()
                );
                Resolution {
                    replaced: true,
                    chain,
                }
            }
            None => Resolution {
                replaced: false,
                chain: local_chain,
            },
        }
    }
}
