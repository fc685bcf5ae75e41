// File: src/error.rs
// Error taxonomy for view construction

use thiserror::Error;

/// Failures surfaced while deriving view records from raw block data.
///
/// Hex decode failures never show up here: the coinbase decoder absorbs them
/// and substitutes a sentinel message instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ViewError {
    #[error("Malformed block {hash}: {reason}")]
    MalformedBlock { hash: String, reason: &'static str },

    #[error("Malformed transaction {txid}: {reason}")]
    MalformedTransaction { txid: String, reason: &'static str },

    #[error("Empty batch: no blocks to build a page window from")]
    EmptyBatch,
}

pub type Result<T> = std::result::Result<T, ViewError>;
