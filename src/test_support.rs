// File: src/test_support.rs
// Raw record builders shared by unit tests

use crate::block_source::FixtureBlockSource;
use crate::data_models::{RawBlock, RawTransaction, ScriptPubKey, Vin, Vout};

pub const GENESIS_TIME: i64 = 1_231_006_505;

pub fn block_hash(height: u64) -> String {
    format!("{:064x}", height)
}

pub fn txid(height: u64, index: usize) -> String {
    format!("{:056x}{:08x}", height, index)
}

pub fn vout(value: &str) -> Vout {
    Vout {
        value: value.parse().expect("valid decimal literal"),
        n: 0,
        script_pub_key: ScriptPubKey::default(),
    }
}

/// Coinbase whose decoded message is exactly `message` (a nine byte height prefix is prepended)
pub fn coinbase_tx(txid: String, message: &[u8], values: &[&str]) -> RawTransaction {
    let mut payload = vec![0x03, 0x01, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x00];
    payload.extend_from_slice(message);
    RawTransaction {
        txid,
        hash: None,
        vin: vec![Vin {
            coinbase: Some(hex::encode(payload)),
            txid: None,
            vout: None,
            script_sig: None,
            sequence: u32::MAX,
        }],
        vout: values.iter().copied().map(vout).collect(),
    }
}

pub fn spend_tx(txid: String, values: &[&str]) -> RawTransaction {
    RawTransaction {
        txid,
        hash: None,
        vin: vec![Vin {
            coinbase: None,
            txid: Some("f".repeat(64)),
            vout: Some(0),
            script_sig: None,
            sequence: u32::MAX,
        }],
        vout: values.iter().copied().map(vout).collect(),
    }
}

/// Block with a coinbase paying 50 and one spend of 0.5 + 1.25 + 0.001
pub fn block(height: u64, message: &[u8]) -> RawBlock {
    RawBlock {
        hash: block_hash(height),
        height,
        time: GENESIS_TIME + height as i64 * 600,
        size: 1234,
        bits: "1d00ffff".to_string(),
        difficulty: 1.0,
        nonce: 2083236893,
        merkle_root: "4a5e1e4baab89f3a32518a88c31bc87f618f76673e2cc77ab2127b7afdeda33b".to_string(),
        previous_hash: height.checked_sub(1).map(block_hash),
        next_hash: Some(block_hash(height + 1)),
        transactions: vec![
            coinbase_tx(txid(height, 0), message, &["50"]),
            spend_tx(txid(height, 1), &["0.5", "1.25", "0.001"]),
        ],
    }
}

/// Fixture chain of heights `0..=tip`, messages cycling through `messages`
pub fn fixture_source(tip: u64, messages: &[&str]) -> FixtureBlockSource {
    FixtureBlockSource::from_blocks(
        (0..=tip)
            .map(|h| block(h, messages[h as usize % messages.len()].as_bytes()))
            .collect(),
    )
}
