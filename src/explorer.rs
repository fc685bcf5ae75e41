// File: src/explorer.rs
// Request-scoped view assembly: fetch one batch, run the builders, hand back a view

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::block_source::{BlockSource, SourceError};
use crate::config::Config;
use crate::data_models::{BlockDetailView, BlockListView, ScoreView, TxDetailView};
use crate::error::ViewError;
use crate::model::DisplayZone;
use crate::pager::{page_start, ListKind, BLOCKS_PER_PAGE};
use crate::scoreboard::ScoreBoard;

#[derive(Debug, Error)]
pub enum ExplorerError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    View(#[from] ViewError),
}

/// Everything a request needs: where blocks come from and how to present them.
/// Holds no per-request state, so one instance serves all requests.
#[derive(Clone)]
pub struct Explorer {
    source: Arc<dyn BlockSource>,
    zone: DisplayZone,
    score_depth: u64,
}

impl Explorer {
    pub fn new(source: Arc<dyn BlockSource>, zone: DisplayZone, score_depth: u64) -> Self {
        Self {
            source,
            zone,
            score_depth,
        }
    }

    pub fn from_config(source: Arc<dyn BlockSource>, config: &Config) -> Self {
        let zone = if config.utc_timestamps {
            DisplayZone::Utc
        } else {
            DisplayZone::Local
        };
        Self::new(source, zone, config.score_depth)
    }

    /// Most recent blocks, no next page
    pub async fn latest(&self) -> Result<BlockListView, ExplorerError> {
        let tip = self.source.best_height().await?;
        self.list(tip, ListKind::Latest).await
    }

    /// Page whose newest block is at `height` (clamped to the tip)
    pub async fn page(&self, height: u64) -> Result<BlockListView, ExplorerError> {
        let tip = self.source.best_height().await?;
        self.list(page_start(height, tip), ListKind::Pager).await
    }

    /// Latest-style list of the newest `count` blocks
    pub async fn recent(&self, count: u64) -> Result<BlockListView, ExplorerError> {
        let tip = self.source.best_height().await?;
        let blocks = self.source.fetch_blocks(tip, count).await?;
        let summaries = self.zone.summaries(&blocks, ListKind::Latest.precision())?;
        Ok(BlockListView::new(summaries, ListKind::Latest)?)
    }

    async fn list(&self, start: u64, kind: ListKind) -> Result<BlockListView, ExplorerError> {
        let blocks = self.source.fetch_blocks(start, BLOCKS_PER_PAGE).await?;
        debug!("Fetched {} blocks from height {}", blocks.len(), start);

        let summaries = self.zone.summaries(&blocks, kind.precision())?;
        Ok(BlockListView::new(summaries, kind)?)
    }

    pub async fn block(&self, hash: &str) -> Result<BlockDetailView, ExplorerError> {
        let block = self.source.fetch_block(hash).await?;
        Ok(self.zone.block_detail(&block)?)
    }

    pub async fn block_at(&self, height: u64) -> Result<BlockDetailView, ExplorerError> {
        let block = self.source.fetch_block_at(height).await?;
        Ok(self.zone.block_detail(&block)?)
    }

    pub async fn transaction(&self, txid: &str) -> Result<TxDetailView, ExplorerError> {
        let tx = self.source.fetch_transaction(txid).await?;
        Ok(TxDetailView::from(&tx))
    }

    /// Leaderboard over the newest `score_depth` blocks, scanned newest first
    pub async fn scores(&self) -> Result<ScoreView, ExplorerError> {
        let tip = self.source.best_height().await?;
        let blocks = self.source.fetch_blocks(tip, self.score_depth).await?;
        debug!("Scoring {} blocks below height {}", blocks.len(), tip);

        Ok(ScoreBoard::tally(&blocks)?.into_view())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block_source::FixtureBlockSource;
    use crate::pager::PAGE_SIZE;
    use crate::test_support::{block, block_hash, fixture_source, txid};

    fn explorer(tip: u64) -> Explorer {
        Explorer::new(
            Arc::new(fixture_source(tip, &["/pool-a/", "/pool-b/", "/pool-a/"])),
            DisplayZone::Utc,
            12,
        )
    }

    #[tokio::test]
    async fn latest_view_spans_one_page_from_tip() {
        let view = explorer(100).latest().await.unwrap();
        assert_eq!(view.blocks.len(), BLOCKS_PER_PAGE as usize);
        assert_eq!(view.blocks[0].height, 100);
        assert_eq!(view.window.previous_page, 100 - PAGE_SIZE);
        assert_eq!(view.window.next_page, None);
        assert_eq!(view.blocks[0].total_btc, "51.75100000");
    }

    #[tokio::test]
    async fn page_view_clamps_and_uses_pager_precision() {
        let view = explorer(100).page(5000).await.unwrap();
        assert_eq!(view.blocks[0].height, 100);
        assert_eq!(view.window.next_page, Some(100 + PAGE_SIZE));
        assert_eq!(view.blocks[0].total_btc, "51.75100");

        let view = explorer(100).page(10).await.unwrap();
        assert_eq!(view.blocks.len(), 11);
        assert_eq!(view.window.previous_page, 0);
    }

    #[tokio::test]
    async fn recent_view_limits_count() {
        let view = explorer(100).recent(3).await.unwrap();
        let heights: Vec<u64> = view.blocks.iter().map(|b| b.height).collect();
        assert_eq!(heights, vec![100, 99, 98]);
    }

    #[tokio::test]
    async fn block_and_transaction_views() {
        let explorer = explorer(20);
        let detail = explorer.block(&block_hash(7)).await.unwrap();
        assert_eq!(detail.summary.height, 7);
        assert_eq!(detail.transactions.len(), 2);
        assert_eq!(explorer.block_at(7).await.unwrap(), detail);

        let tx = explorer.transaction(&txid(7, 1)).await.unwrap();
        assert_eq!(tx.btc_out, "1.75100000");
    }

    #[tokio::test]
    async fn scores_cover_configured_depth() {
        let view = explorer(100).scores().await.unwrap();
        assert_eq!(view.blocks_scanned, 12);
        assert_eq!(view.entries.len(), 2);
        assert_eq!(view.entries[0].message.to_text(), "/pool-a/");
        assert_eq!(view.entries[0].count, 8);
        assert_eq!(view.entries[1].count, 4);
    }

    #[tokio::test]
    async fn malformed_block_surfaces_as_view_error() {
        let mut broken = block(3, b"x");
        broken.transactions.clear();
        let explorer = Explorer::new(
            Arc::new(FixtureBlockSource::from_blocks(vec![broken])),
            DisplayZone::Utc,
            10,
        );
        assert!(matches!(
            explorer.latest().await,
            Err(ExplorerError::View(ViewError::MalformedBlock { .. }))
        ));
        assert!(matches!(
            explorer.scores().await,
            Err(ExplorerError::View(ViewError::MalformedBlock { .. }))
        ));
    }

    #[tokio::test]
    async fn unknown_hash_is_not_found() {
        assert!(matches!(
            explorer(5).block("missing").await,
            Err(ExplorerError::Source(SourceError::NotFound(_)))
        ));
    }
}
