use std::env;
use std::str::FromStr;
use std::time::Duration;

use log::warn;
use uuid::Uuid;

use crate::blockchain::DEFAULT_DIFFICULTY;
use crate::consensus::DEFAULT_PEER_TIMEOUT;

/// Node settings read from `HOST`, `PORT`, `NODE_ID`, `POW_DIFFICULTY`,
/// `PEER_TIMEOUT_SECS`, `MINE_TIMEOUT_SECS` and `PEERS` (comma-separated).
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Recipient of this node's mining rewards.
    pub node_id: String,
    pub difficulty: usize,
    pub peer_timeout: Duration,
    /// Upper bound on a single `/mine` search, if any.
    pub mine_timeout: Option<Duration>,
    /// Peers registered at startup.
    pub bootstrap_peers: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = parse_or(&lookup, "PORT", 5000);
        let node_id = lookup("NODE_ID")
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(new_node_id);
        let difficulty = parse_or(&lookup, "POW_DIFFICULTY", DEFAULT_DIFFICULTY);
        let peer_timeout = Duration::from_secs(parse_or(
            &lookup,
            "PEER_TIMEOUT_SECS",
            DEFAULT_PEER_TIMEOUT.as_secs(),
        ));
        let mine_timeout = parse_opt::<u64>(&lookup, "MINE_TIMEOUT_SECS").map(Duration::from_secs);
        let bootstrap_peers = lookup("PEERS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            host,
            port,
            node_id,
            difficulty,
            peer_timeout,
            mine_timeout,
            bootstrap_peers,
        }
    }
}

/// Globally unique node address: a v4 uuid without dashes.
pub fn new_node_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn parse_opt<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("ignoring malformed {key}={raw:?}");
            None
        }
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    parse_opt(lookup, key).unwrap_or(default)
}
