use std::collections::HashSet;
use std::sync::RwLock;

use reqwest::Url;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid peer address: {0:?}")]
pub struct InvalidPeerAddress(pub String);

/// Known peers, stored as `host[:port]`. Grows only through registration.
#[derive(Debug, Default)]
pub struct PeerSet {
    peers: RwLock<HashSet<String>>,
}

impl PeerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a peer given either as a URL (`http://10.0.0.2:5000/`)
    /// or as a bare `host:port`. Returns the normalized address.
    pub fn register(&self, address: &str) -> Result<String, InvalidPeerAddress> {
        let normalized =
            normalize_address(address).ok_or_else(|| InvalidPeerAddress(address.to_string()))?;
        let mut peers = self.peers.write().expect("rwlock poisoned");
        peers.insert(normalized.clone());
        Ok(normalized)
    }

    /// Snapshot of every registered peer.
    pub fn all(&self) -> HashSet<String> {
        self.peers.read().expect("rwlock poisoned").clone()
    }

    pub fn len(&self) -> usize {
        self.peers.read().expect("rwlock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Reduce an address to its network location (`host` or `host:port`).
pub fn normalize_address(address: &str) -> Option<String> {
    let address = address.trim();
    if address.is_empty() {
        return None;
    }

    if address.contains("://") {
        let url = Url::parse(address).ok()?;
        let host = url.host_str()?;
        return Some(match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        });
    }

    let bare = address.trim_end_matches('/');
    if bare.is_empty() || bare.contains(['/', ' ', '?', '#', '@']) {
        return None;
    }
    Some(bare.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_urls_and_bare_addresses() {
        assert_eq!(
            normalize_address("http://192.168.0.5:5000"),
            Some("192.168.0.5:5000".into())
        );
        assert_eq!(
            normalize_address("http://node.local:5001/chain"),
            Some("node.local:5001".into())
        );
        assert_eq!(
            normalize_address(" 127.0.0.1:5002/ "),
            Some("127.0.0.1:5002".into())
        );
        assert_eq!(normalize_address("http://example.org"), Some("example.org".into()));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(normalize_address(""), None);
        assert_eq!(normalize_address("   "), None);
        assert_eq!(normalize_address("not a host"), None);
        assert_eq!(normalize_address("http://"), None);
    }

    #[test]
    fn register_deduplicates() {
        let peers = PeerSet::new();
        assert!(peers.is_empty());
        peers.register("http://127.0.0.1:5001").unwrap();
        peers.register("127.0.0.1:5001").unwrap();
        peers.register("127.0.0.1:5002").unwrap();
        assert_eq!(peers.len(), 2);
        assert!(peers.all().contains("127.0.0.1:5001"));
    }

    #[test]
    fn register_reports_invalid_address() {
        let peers = PeerSet::new();
        assert_eq!(
            peers.register("a b"),
            Err(InvalidPeerAddress("a b".into()))
        );
        assert!(peers.is_empty());
    }
}
