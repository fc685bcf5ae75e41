// File: src/data_models.rs
// Shared data structures: raw node records and the view records built from them

use std::borrow::Cow;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};

/// Block as returned by `getblock <hash> 2` (transactions expanded)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBlock {
    pub hash: String,
    pub height: u64,
    /// Unix epoch seconds
    pub time: i64,
    pub size: u64,
    #[serde(default)]
    pub bits: String,
    #[serde(default)]
    pub difficulty: f64,
    #[serde(default)]
    pub nonce: u32,
    #[serde(default, rename = "merkleroot")]
    pub merkle_root: String,
    #[serde(default, rename = "previousblockhash")]
    pub previous_hash: Option<String>,
    #[serde(default, rename = "nextblockhash")]
    pub next_hash: Option<String>,
    /// First entry is always the coinbase transaction
    #[serde(default, rename = "tx")]
    pub transactions: Vec<RawTransaction>,
}

/// Verbose transaction record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTransaction {
    pub txid: String,
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub vin: Vec<Vin>,
    #[serde(default)]
    pub vout: Vec<Vout>,
}

/// Transaction input. Coinbase inputs carry `coinbase`, all others the spent outpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vin {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coinbase: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub txid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vout: Option<u32>,
    #[serde(default, rename = "scriptSig", skip_serializing_if = "Option::is_none")]
    pub script_sig: Option<ScriptSig>,
    #[serde(default)]
    pub sequence: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptSig {
    #[serde(default)]
    pub asm: String,
    #[serde(default)]
    pub hex: String,
}

/// Transaction output; `value` is in whole coins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vout {
    pub value: Decimal,
    #[serde(default)]
    pub n: u32,
    #[serde(default, rename = "scriptPubKey")]
    pub script_pub_key: ScriptPubKey,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScriptPubKey {
    #[serde(default)]
    pub asm: String,
    #[serde(default)]
    pub hex: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub addresses: Vec<String>,
}

impl ScriptPubKey {
    /// Best-effort destination for display, newer nodes report `address`, older ones `addresses`
    pub fn destination(&self) -> Option<&str> {
        self.address
            .as_deref()
            .or_else(|| self.addresses.first().map(String::as_str))
    }
}

/// Miner-chosen bytes embedded in a coinbase input.
///
/// Kept as raw bytes so grouping compares exactly what the miner wrote;
/// text conversion happens only for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CoinbaseMessage(Vec<u8>);

impl CoinbaseMessage {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }
}

impl fmt::Display for CoinbaseMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl Serialize for CoinbaseMessage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_text())
    }
}

/// One row of a block list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockSummary {
    pub display_hash: String,
    pub hash: String,
    pub height: u64,
    /// Kilobytes, three decimals
    pub size: String,
    /// `YYYY-MM-DD HH:MM:SS`
    pub timestamp: String,
    pub tx_count: usize,
    pub total_btc: String,
    pub coinbase_message: CoinbaseMessage,
}

/// Navigation boundaries for a block list.
/// `next_page` is absent on the latest-blocks view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    pub previous_page: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreEntry {
    pub message: CoinbaseMessage,
    pub count: usize,
}

/// Transaction row inside a block detail page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TxDisplay {
    pub display_hash: String,
    pub hash: String,
    pub vin: Vec<Vin>,
    pub vout: Vec<Vout>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockDetailView {
    pub summary: BlockSummary,
    pub bits: String,
    pub difficulty: String,
    pub merkle_root: String,
    pub nonce: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_hash: Option<String>,
    pub transactions: Vec<TxDisplay>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockListView {
    pub blocks: Vec<BlockSummary>,
    pub window: PageWindow,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TxDetailView {
    pub hash: String,
    pub vin: Vec<Vin>,
    pub vout: Vec<Vout>,
    pub btc_out: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreView {
    pub blocks_scanned: usize,
    pub entries: Vec<ScoreEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorView {
    pub message: String,
}
