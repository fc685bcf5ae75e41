// File: src/scoreboard.rs
// Coinbase message leaderboard

use indexmap::IndexMap;

use crate::data_models::{CoinbaseMessage, RawBlock, ScoreEntry, ScoreView};
use crate::decoder::{coinbase_message, score_key};
use crate::error::{Result, ViewError};

/// Occurrence counts per normalized coinbase message, in first-seen order
#[derive(Debug, Default)]
pub struct ScoreBoard {
    counts: IndexMap<CoinbaseMessage, usize>,
    blocks_scanned: usize,
}

impl ScoreBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count every block of a batch in the order given
    pub fn tally(blocks: &[RawBlock]) -> Result<Self> {
        let mut board = Self::new();
        for block in blocks {
            board.record_block(block)?;
        }
        Ok(board)
    }

    pub fn record_block(&mut self, block: &RawBlock) -> Result<()> {
        let coinbase = block
            .transactions
            .first()
            .ok_or_else(|| ViewError::MalformedBlock {
                hash: block.hash.clone(),
                reason: "block has no transactions",
            })?;
        self.record(&coinbase_message(coinbase)?);
        self.blocks_scanned += 1;
        Ok(())
    }

    pub fn record(&mut self, message: &CoinbaseMessage) {
        *self.counts.entry(score_key(message)).or_insert(0) += 1;
    }

    /// Entries by descending count; equal counts keep first-seen order
    pub fn ranked(&self) -> Vec<ScoreEntry> {
        let mut entries: Vec<ScoreEntry> = self
            .counts
            .iter()
            .map(|(message, &count)| ScoreEntry {
                message: message.clone(),
                count,
            })
            .collect();
        entries.sort_by(|a, b| b.count.cmp(&a.count));
        entries
    }

    pub fn into_view(self) -> ScoreView {
        ScoreView {
            blocks_scanned: self.blocks_scanned,
            entries: self.ranked(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_models::{RawTransaction, Vin};

    fn block_with_message(height: u64, message: &[u8]) -> RawBlock {
        let mut payload = vec![0u8; 9];
        payload.extend_from_slice(message);
        RawBlock {
            hash: format!("{:064x}", height),
            height,
            time: 0,
            size: 0,
            bits: String::new(),
            difficulty: 0.0,
            nonce: 0,
            merkle_root: String::new(),
            previous_hash: None,
            next_hash: None,
            transactions: vec![RawTransaction {
                txid: format!("cb{}", height),
                hash: None,
                vin: vec![Vin {
                    coinbase: Some(hex::encode(payload)),
                    txid: None,
                    vout: None,
                    script_sig: None,
                    sequence: 0,
                }],
                vout: Vec::new(),
            }],
        }
    }

    fn counts(entries: &[ScoreEntry]) -> Vec<(String, usize)> {
        entries
            .iter()
            .map(|e| (e.message.to_text().into_owned(), e.count))
            .collect()
    }

    #[test]
    fn ranks_by_descending_count() {
        let blocks: Vec<RawBlock> = ["a", "b", "a", "a", "c", "b"]
            .iter()
            .enumerate()
            .map(|(i, m)| block_with_message(i as u64, m.as_bytes()))
            .collect();

        let view = ScoreBoard::tally(&blocks).unwrap().into_view();
        assert_eq!(view.blocks_scanned, 6);
        assert_eq!(
            counts(&view.entries),
            vec![("a".to_string(), 3), ("b".to_string(), 2), ("c".to_string(), 1)]
        );
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let blocks: Vec<RawBlock> = ["z", "y", "x", "y", "z", "x", "w"]
            .iter()
            .enumerate()
            .map(|(i, m)| block_with_message(i as u64, m.as_bytes()))
            .collect();

        let entries = ScoreBoard::tally(&blocks).unwrap().ranked();
        assert_eq!(
            counts(&entries),
            vec![
                ("z".to_string(), 2),
                ("y".to_string(), 2),
                ("x".to_string(), 2),
                ("w".to_string(), 1)
            ]
        );
    }

    #[test]
    fn unprintable_leading_byte_joins_groups() {
        let blocks = vec![
            block_with_message(1, b"\x04/slush/"),
            block_with_message(2, b"/slush/"),
            block_with_message(3, b"\x1f/slush/"),
        ];
        let entries = ScoreBoard::tally(&blocks).unwrap().ranked();
        assert_eq!(counts(&entries), vec![("/slush/".to_string(), 3)]);
    }

    #[test]
    fn empty_batch_yields_empty_ranking() {
        let view = ScoreBoard::tally(&[]).unwrap().into_view();
        assert_eq!(view.blocks_scanned, 0);
        assert!(view.entries.is_empty());
    }

    #[test]
    fn short_payloads_group_on_whole_bytes() {
        // nine zero bytes: kept whole by the decoder, then one stripped as unprintable
        let blocks = vec![block_with_message(1, b""), block_with_message(2, b"")];
        let entries = ScoreBoard::tally(&blocks).unwrap().ranked();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message.as_bytes(), &[0u8; 8]);
        assert_eq!(entries[0].count, 2);
    }

    #[test]
    fn empty_message_is_its_own_group() {
        let mut board = ScoreBoard::new();
        board.record(&CoinbaseMessage::default());
        board.record(&CoinbaseMessage::new(b"a".to_vec()));
        board.record(&CoinbaseMessage::default());
        assert_eq!(
            counts(&board.ranked()),
            vec![(String::new(), 2), ("a".to_string(), 1)]
        );
    }

    #[test]
    fn block_without_transactions_fails() {
        let mut block = block_with_message(1, b"a");
        block.transactions.clear();
        assert!(matches!(
            ScoreBoard::tally(&[block]),
            Err(ViewError::MalformedBlock { .. })
        ));
    }
}
