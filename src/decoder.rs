// File: src/decoder.rs
// Coinbase payload decoding

use crate::data_models::{CoinbaseMessage, RawTransaction};
use crate::error::{Result, ViewError};

/// Substituted when the coinbase payload is not valid hex
pub const DECODE_ERROR_SENTINEL: &[u8] = b"ERROR";

/// Leading bytes of the payload that encode the block height, not the message
const HEIGHT_PREFIX_LEN: usize = 9;

/// Decode a hex coinbase payload into the miner's message.
///
/// Payloads longer than the height prefix lose that prefix; shorter ones are
/// returned whole. Bytes are passed through untouched, binary content included.
pub fn decode_coinbase_payload(payload_hex: &str) -> CoinbaseMessage {
    let bytes = hex::decode(payload_hex).unwrap_or_else(|_| DECODE_ERROR_SENTINEL.to_vec());

    if bytes.len() > HEIGHT_PREFIX_LEN {
        CoinbaseMessage::new(&bytes[HEIGHT_PREFIX_LEN..])
    } else {
        CoinbaseMessage::new(bytes)
    }
}

/// Message carried by the first input of a coinbase transaction.
/// A first input without a coinbase payload yields an empty message.
pub fn coinbase_message(tx: &RawTransaction) -> Result<CoinbaseMessage> {
    let input = tx.vin.first().ok_or_else(|| ViewError::MalformedTransaction {
        txid: tx.txid.clone(),
        reason: "coinbase transaction has no inputs",
    })?;

    Ok(decode_coinbase_payload(input.coinbase.as_deref().unwrap_or_default()))
}

/// Grouping key used by the leaderboard.
///
/// When the first byte is not printable it is taken to be a stray height
/// marker and dropped. Only the leaderboard applies this; block views show
/// the message unmodified.
pub fn score_key(message: &CoinbaseMessage) -> CoinbaseMessage {
    match message.as_bytes().split_first() {
        Some((&first, rest)) if !is_printable_byte(first) => CoinbaseMessage::new(rest),
        _ => message.clone(),
    }
}

/// Printability of a single byte read as a Latin-1 code point:
/// graphic characters plus the ASCII space.
fn is_printable_byte(byte: u8) -> bool {
    matches!(byte, 0x20..=0x7e) || (byte >= 0xa1 && byte != 0xad)
}
