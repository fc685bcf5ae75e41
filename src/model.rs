// File: src/model.rs
// Builders turning raw node records into display records

use chrono::{Local, TimeZone, Utc};
use std::fmt::Display;

use crate::aggregator::{block_total, format_btc, transaction_total, BtcPrecision};
use crate::data_models::{
    BlockDetailView, BlockSummary, RawBlock, RawTransaction, TxDetailView, TxDisplay,
};
use crate::decoder::coinbase_message;
use crate::error::{Result, ViewError};

const DISPLAY_HASH_LEN: usize = 10;
const TIMESTAMP_LEN: usize = 19;

impl BlockSummary {
    /// Build the list row for one block.
    ///
    /// `precision` is the caller's contract for the total output value and
    /// `tz` the zone the timestamp is shown in.
    pub fn build<Tz>(block: &RawBlock, precision: BtcPrecision, tz: &Tz) -> Result<Self>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let coinbase = block
            .transactions
            .first()
            .ok_or_else(|| ViewError::MalformedBlock {
                hash: block.hash.clone(),
                reason: "block has no transactions",
            })?;

        Ok(BlockSummary {
            display_hash: block_display_hash(&block.hash),
            hash: block.hash.clone(),
            height: block.height,
            size: format_size_kb(block.size),
            timestamp: format_timestamp(block.time, tz),
            tx_count: block.transactions.len(),
            total_btc: format_btc(block_total(block), precision),
            coinbase_message: coinbase_message(coinbase)?,
        })
    }
}

/// Summaries for a whole batch, in batch order
pub fn build_summaries<Tz>(blocks: &[RawBlock], precision: BtcPrecision, tz: &Tz) -> Result<Vec<BlockSummary>>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    blocks
        .iter()
        .map(|block| BlockSummary::build(block, precision, tz))
        .collect()
}

impl BlockDetailView {
    pub fn build<Tz>(block: &RawBlock, tz: &Tz) -> Result<Self>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let summary = BlockSummary::build(block, BtcPrecision::Detail, tz)?;

        Ok(BlockDetailView {
            summary,
            bits: block.bits.clone(),
            difficulty: format!("{:.6}", block.difficulty),
            merkle_root: block.merkle_root.clone(),
            nonce: block.nonce,
            previous_hash: block.previous_hash.clone(),
            next_hash: block.next_hash.clone(),
            transactions: block.transactions.iter().map(TxDisplay::from).collect(),
        })
    }
}

impl From<&RawTransaction> for TxDisplay {
    fn from(tx: &RawTransaction) -> Self {
        TxDisplay {
            display_hash: truncate_chars(&tx.txid, DISPLAY_HASH_LEN),
            hash: tx.txid.clone(),
            vin: tx.vin.clone(),
            vout: tx.vout.clone(),
        }
    }
}

impl From<&RawTransaction> for TxDetailView {
    fn from(tx: &RawTransaction) -> Self {
        TxDetailView {
            hash: tx.txid.clone(),
            vin: tx.vin.clone(),
            vout: tx.vout.clone(),
            btc_out: format_btc(transaction_total(tx), BtcPrecision::Detail),
        }
    }
}

/// Leading zeros stripped, then at most the first ten characters.
/// Shorter remainders are returned as they are.
pub fn block_display_hash(hash: &str) -> String {
    truncate_chars(hash.trim_start_matches('0'), DISPLAY_HASH_LEN)
}

pub fn format_size_kb(size_bytes: u64) -> String {
    format!("{:.3}", size_bytes as f64 / 1000.0)
}

/// `YYYY-MM-DD HH:MM:SS` in the given zone
pub fn format_timestamp<Tz>(secs: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let full = tz
        .timestamp_opt(secs, 0)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S %z").to_string())
        .unwrap_or_else(|| format!("invalid:{}", secs));
    truncate_chars(&full, TIMESTAMP_LEN)
}

/// Zone block timestamps are rendered in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayZone {
    Local,
    Utc,
}

impl DisplayZone {
    pub fn summaries(self, blocks: &[RawBlock], precision: BtcPrecision) -> Result<Vec<BlockSummary>> {
        match self {
            DisplayZone::Local => build_summaries(blocks, precision, &Local),
            DisplayZone::Utc => build_summaries(blocks, precision, &Utc),
        }
    }

    pub fn block_detail(self, block: &RawBlock) -> Result<BlockDetailView> {
        match self {
            DisplayZone::Local => BlockDetailView::build(block, &Local),
            DisplayZone::Utc => BlockDetailView::build(block, &Utc),
        }
    }
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
