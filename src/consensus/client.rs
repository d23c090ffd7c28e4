use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::blockchain::Block;

/// Default per-peer request timeout.
pub const DEFAULT_PEER_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("peer answered HTTP {0}")]
    Status(u16),
    #[error("undecodable chain payload: {0}")]
    Decode(String),
    #[error("peer advertised length {advertised} but sent {actual} blocks")]
    LengthMismatch { advertised: usize, actual: usize },
}

/// Body of a `/chain` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerChain {
    pub length: usize,
    pub chain: Vec<Block>,
}

impl PeerChain {
    pub fn new(chain: Vec<Block>) -> Self {
        Self {
            length: chain.len(),
            chain,
        }
    }

    /// Unwrap the blocks, refusing payloads whose advertised length lies.
    pub fn into_checked(self) -> Result<Vec<Block>, FetchError> {
        if self.length != self.chain.len() {
            return Err(FetchError::LengthMismatch {
                advertised: self.length,
                actual: self.chain.len(),
            });
        }
        Ok(self.chain)
    }
}

/// Source of peer chains: `GET /chain` answering `{"length": N, "chain": [...]}`.
pub trait PeerClient: Send + Sync {
    fn fetch_chain(
        &self,
        peer: &str,
    ) -> impl Future<Output = Result<PeerChain, FetchError>> + Send;
}

/// [`PeerClient`] over plain HTTP. Every request is bounded by the
/// configured timeout, so an unreachable peer costs at most that long.
#[derive(Debug, Clone)]
pub struct HttpPeerClient {
    http: reqwest::Client,
}

impl HttpPeerClient {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http })
    }

    fn chain_url(peer: &str) -> String {
        format!("http://{}/chain", peer.trim_end_matches('/'))
    }
}

impl PeerClient for HttpPeerClient {
    async fn fetch_chain(&self, peer: &str) -> Result<PeerChain, FetchError> {
        let response = self
            .http
            .get(Self::chain_url(peer))
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        response
            .json::<PeerChain>()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_url_targets_chain_endpoint() {
        assert_eq!(
            HttpPeerClient::chain_url("127.0.0.1:5001"),
            "http://127.0.0.1:5001/chain"
        );
    }

    #[test]
    fn decodes_chain_response() {
        let body = r#"{
            "length": 1,
            "chain": [{
                "index": 1,
                "timestamp": 1700000000.25,
                "transactions": [],
                "proof": 100,
                "previous_hash": "1"
            }]
        }"#;
        let peer: PeerChain = serde_json::from_str(body).unwrap();
        let chain = peer.into_checked().unwrap();
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].proof, 100);
    }

    #[test]
    fn lying_length_is_rejected() {
        let mut peer = PeerChain::new(vec![Block::genesis()]);
        peer.length = 10;
        assert!(matches!(
            peer.into_checked(),
            Err(FetchError::LengthMismatch {
                advertised: 10,
                actual: 1
            })
        ));
    }

    #[actix_web::test]
    async fn unreachable_peer_is_a_transport_error() {
        let client = HttpPeerClient::new(Duration::from_millis(500)).unwrap();
        // port 9 (discard) on localhost is closed in any sane test env
        let err = client.fetch_chain("127.0.0.1:9").await.unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)), "{err}");
    }
}
