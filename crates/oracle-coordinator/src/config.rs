//! Node configuration: which oracle index this process is, where its key
//! lives, and how to reach its two peers. Loaded from `ORACLE_<i>_KEY` /
//! `ORACLE_<i>_ENDPOINT` environment variables (via `dotenvy`, mirroring the
//! aggregator's `dotenv().ok()` convention) layered under explicit CLI flags.

use crate::error::CoordinatorError;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct PeerConfig {
    pub oracle_index: u8,
    pub endpoint: String,
}

#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub oracle_index: u8,
    pub key_path: PathBuf,
    pub peers: Vec<PeerConfig>,
    pub rpc_url: String,
    pub listen_addr: String,
}

impl NodeConfig {
    /// Resolves CLI-supplied fields against `ORACLE_<i>_KEY` /
    /// `ORACLE_<i>_ENDPOINT` for the two peer indices (every index other than
    /// this node's own), falling back to explicit `--peers` values when
    /// given.
    pub fn resolve(
        oracle_index: u8,
        key_path: Option<PathBuf>,
        peers: Vec<String>,
        rpc_url: Option<String>,
        listen_addr: Option<String>,
    ) -> Result<Self, CoordinatorError> {
        if oracle_index > 2 {
            return Err(CoordinatorError::Config(format!(
                "oracle index must be 0, 1, or 2, got {oracle_index}"
            )));
        }

        let key_path = key_path
            .or_else(|| std::env::var(format!("ORACLE_{oracle_index}_KEY")).ok().map(PathBuf::from))
            .ok_or_else(|| {
                CoordinatorError::Config(format!(
                    "missing key path: pass --key or set ORACLE_{oracle_index}_KEY"
                ))
            })?;

        let peers = if !peers.is_empty() {
            (0u8..3)
                .filter(|i| *i != oracle_index)
                .zip(peers)
                .map(|(oracle_index, endpoint)| PeerConfig { oracle_index, endpoint })
                .collect()
        } else {
            (0u8..3)
                .filter(|i| *i != oracle_index)
                .map(|i| {
                    std::env::var(format!("ORACLE_{i}_ENDPOINT"))
                        .map(|endpoint| PeerConfig { oracle_index: i, endpoint })
                        .map_err(|_| {
                            CoordinatorError::Config(format!(
                                "missing peer endpoint: pass --peers or set ORACLE_{i}_ENDPOINT"
                            ))
                        })
                })
                .collect::<Result<Vec<_>, _>>()?
        };

        let rpc_url = rpc_url
            .or_else(|| std::env::var("SOLISEUM_RPC_URL").ok())
            .unwrap_or_else(|| "https://api.devnet.solana.com".to_string());

        let listen_addr = listen_addr.unwrap_or_else(|| "0.0.0.0:8080".to_string());

        Ok(Self { oracle_index, key_path, peers, rpc_url, listen_addr })
    }
}
