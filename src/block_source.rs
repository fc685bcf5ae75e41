// File: src/block_source.rs
// Block and transaction fetching: node JSON-RPC and offline fixture files

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, info};

use crate::data_models::{RawBlock, RawTransaction};

/// Blocks requested from the node at once when filling a page
const FETCH_CONCURRENCY: usize = 8;

/// bitcoind codes for unknown block/transaction and out-of-range height
const RPC_INVALID_ADDRESS_OR_KEY: i64 = -5;
const RPC_INVALID_PARAMETER: i64 = -8;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Where raw chain data comes from. Implementations must be safe to share
/// between concurrent requests.
#[async_trait]
pub trait BlockSource: Send + Sync {
    async fn best_height(&self) -> Result<u64, SourceError>;

    async fn fetch_block(&self, hash: &str) -> Result<RawBlock, SourceError>;

    async fn fetch_block_at(&self, height: u64) -> Result<RawBlock, SourceError>;

    async fn fetch_transaction(&self, txid: &str) -> Result<RawTransaction, SourceError>;

    /// Up to `count` blocks from `start_height` downwards, newest first
    async fn fetch_blocks(&self, start_height: u64, count: u64) -> Result<Vec<RawBlock>, SourceError> {
        let mut blocks = Vec::new();
        for height in batch_heights(start_height, count) {
            blocks.push(self.fetch_block_at(height).await?);
        }
        Ok(blocks)
    }
}

/// Heights `start, start-1, ...` stopping at genesis
pub fn batch_heights(start_height: u64, count: u64) -> Vec<u64> {
    if count == 0 {
        return Vec::new();
    }
    (start_height.saturating_sub(count - 1)..=start_height).rev().collect()
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

impl From<RpcErrorObject> for SourceError {
    fn from(err: RpcErrorObject) -> Self {
        match err.code {
            RPC_INVALID_ADDRESS_OR_KEY | RPC_INVALID_PARAMETER => SourceError::NotFound(err.message),
            code => SourceError::Rpc {
                code,
                message: err.message,
            },
        }
    }
}

/// bitcoind-compatible JSON-RPC client
#[derive(Clone)]
pub struct RpcBlockSource {
    client: Client,
    url: String,
    auth: Option<(String, String)>,
}

impl RpcBlockSource {
    pub fn new(url: String, auth: Option<(String, String)>) -> Self {
        Self {
            client: Client::new(),
            url,
            auth,
        }
    }

    async fn call<T>(&self, method: &str, params: Value) -> Result<T, SourceError>
    where
        T: DeserializeOwned,
    {
        debug!("RPC {} {}", method, params);

        let mut request = self.client.post(&self.url).json(&json!({
            "jsonrpc": "1.0",
            "id": "coinbase-explorer",
            "method": method,
            "params": params,
        }));
        if let Some((user, password)) = &self.auth {
            request = request.basic_auth(user, Some(password));
        }

        // bitcoind reports RPC failures with non-2xx statuses but a JSON body, so the body decides
        let response: RpcResponse<T> = request.send().await?.json().await?;
        match (response.result, response.error) {
            (_, Some(err)) => Err(err.into()),
            (Some(result), None) => Ok(result),
            (None, None) => Err(SourceError::Rpc {
                code: 0,
                message: format!("{} returned no result", method),
            }),
        }
    }

    async fn block_hash(&self, height: u64) -> Result<String, SourceError> {
        self.call("getblockhash", json!([height])).await
    }
}

#[async_trait]
impl BlockSource for RpcBlockSource {
    async fn best_height(&self) -> Result<u64, SourceError> {
        self.call("getblockcount", json!([])).await
    }

    async fn fetch_block(&self, hash: &str) -> Result<RawBlock, SourceError> {
        self.call("getblock", json!([hash, 2])).await
    }

    async fn fetch_block_at(&self, height: u64) -> Result<RawBlock, SourceError> {
        let hash = self.block_hash(height).await?;
        self.fetch_block(&hash).await
    }

    async fn fetch_transaction(&self, txid: &str) -> Result<RawTransaction, SourceError> {
        self.call("getrawtransaction", json!([txid, 1])).await
    }

    async fn fetch_blocks(&self, start_height: u64, count: u64) -> Result<Vec<RawBlock>, SourceError> {
        stream::iter(batch_heights(start_height, count))
            .map(|height| self.fetch_block_at(height))
            .buffered(FETCH_CONCURRENCY)
            .try_collect()
            .await
    }
}

#[derive(Debug, Deserialize)]
struct FixtureFile {
    blocks: Vec<RawBlock>,
}

/// Chain snapshot held in memory, loaded from a `{"blocks": [...]}` JSON file
#[derive(Debug, Default)]
pub struct FixtureBlockSource {
    blocks: Vec<RawBlock>,
    by_height: BTreeMap<u64, usize>,
    by_hash: HashMap<String, usize>,
    by_txid: HashMap<String, (usize, usize)>,
}

impl FixtureBlockSource {
    pub fn from_blocks(blocks: Vec<RawBlock>) -> Self {
        let mut by_height = BTreeMap::new();
        let mut by_hash = HashMap::new();
        let mut by_txid = HashMap::new();

        for (block_index, block) in blocks.iter().enumerate() {
            by_height.insert(block.height, block_index);
            by_hash.insert(block.hash.clone(), block_index);
            for (tx_index, tx) in block.transactions.iter().enumerate() {
                by_txid.insert(tx.txid.clone(), (block_index, tx_index));
            }
        }

        Self {
            blocks,
            by_height,
            by_hash,
            by_txid,
        }
    }

    pub fn load(path: &Path) -> Result<Self, SourceError> {
        let content = std::fs::read_to_string(path)?;
        let fixture: FixtureFile = serde_json::from_str(&content)?;
        info!("Loaded {} fixture blocks from {}", fixture.blocks.len(), path.display());
        Ok(Self::from_blocks(fixture.blocks))
    }
}

#[async_trait]
impl BlockSource for FixtureBlockSource {
    async fn best_height(&self) -> Result<u64, SourceError> {
        self.by_height
            .keys()
            .next_back()
            .copied()
            .ok_or_else(|| SourceError::NotFound("fixture contains no blocks".to_string()))
    }

    async fn fetch_block(&self, hash: &str) -> Result<RawBlock, SourceError> {
        self.by_hash
            .get(hash)
            .map(|&i| self.blocks[i].clone())
            .ok_or_else(|| SourceError::NotFound(format!("block {}", hash)))
    }

    async fn fetch_block_at(&self, height: u64) -> Result<RawBlock, SourceError> {
        self.by_height
            .get(&height)
            .map(|&i| self.blocks[i].clone())
            .ok_or_else(|| SourceError::NotFound(format!("block at height {}", height)))
    }

    async fn fetch_transaction(&self, txid: &str) -> Result<RawTransaction, SourceError> {
        self.by_txid
            .get(txid)
            .map(|&(b, t)| self.blocks[b].transactions[t].clone())
            .ok_or_else(|| SourceError::NotFound(format!("transaction {}", txid)))
    }

    /// Snapshots may not reach back to genesis, missing heights are skipped
    async fn fetch_blocks(&self, start_height: u64, count: u64) -> Result<Vec<RawBlock>, SourceError> {
        Ok(batch_heights(start_height, count)
            .into_iter()
            .filter_map(|height| self.by_height.get(&height))
            .map(|&i| self.blocks[i].clone())
            .collect())
    }
}
