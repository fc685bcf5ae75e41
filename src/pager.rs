// File: src/pager.rs
// Previous/next page boundaries for block lists

use crate::aggregator::BtcPrecision;
use crate::data_models::{BlockListView, BlockSummary, PageWindow};
use crate::error::{Result, ViewError};

/// Height distance from the newest block of a page to the newest block of the following page
pub const PAGE_SIZE: u64 = 29;

/// Blocks fetched for one page, so that previous and next links round-trip
pub const BLOCKS_PER_PAGE: u64 = PAGE_SIZE + 1;

impl PageWindow {
    /// Window for a page in the middle of the chain.
    /// `summaries` must be ordered newest first.
    pub fn pager(summaries: &[BlockSummary]) -> Result<Self> {
        let (first, last) = bounds(summaries)?;
        Ok(PageWindow {
            previous_page: last.height,
            next_page: Some(first.height + PAGE_SIZE),
        })
    }

    /// Window for the latest blocks, nothing newer to page to
    pub fn latest(summaries: &[BlockSummary]) -> Result<Self> {
        let (_, last) = bounds(summaries)?;
        Ok(PageWindow {
            previous_page: last.height,
            next_page: None,
        })
    }
}

fn bounds(summaries: &[BlockSummary]) -> Result<(&BlockSummary, &BlockSummary)> {
    match (summaries.first(), summaries.last()) {
        (Some(first), Some(last)) => Ok((first, last)),
        _ => Err(ViewError::EmptyBatch),
    }
}

/// The two list flavours differ in total precision and in whether a next page exists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Pager,
    Latest,
}

impl ListKind {
    pub fn precision(self) -> BtcPrecision {
        match self {
            ListKind::Pager => BtcPrecision::Pager,
            ListKind::Latest => BtcPrecision::Detail,
        }
    }
}

impl BlockListView {
    pub fn new(blocks: Vec<BlockSummary>, kind: ListKind) -> Result<Self> {
        let window = match kind {
            ListKind::Pager => PageWindow::pager(&blocks)?,
            ListKind::Latest => PageWindow::latest(&blocks)?,
        };
        Ok(BlockListView { blocks, window })
    }
}

/// Newest height of a requested page, never past the chain tip
pub fn page_start(requested: u64, tip: u64) -> u64 {
    requested.min(tip)
}
