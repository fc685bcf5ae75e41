// File: src/cli_interface.rs
// Terminal rendering of the explorer views

use anyhow::Result;

use crate::data_models::{BlockDetailView, BlockListView, ScoreView, TxDetailView, Vin, Vout};
use crate::explorer::Explorer;

/// What the CLI mode should show
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliRequest {
    Recent(u64),
    Page(u64),
    Block(String),
    Height(u64),
    Transaction(String),
    Scores,
}

impl CliRequest {
    /// Pick the request from CLI flags; at most one selector may be given
    pub fn from_flags(
        count: u64,
        start: Option<u64>,
        block: Option<String>,
        height: Option<u64>,
        tx: Option<String>,
        scores: bool,
    ) -> Result<Self> {
        let mut requests = Vec::new();
        if let Some(start) = start {
            requests.push(CliRequest::Page(start));
        }
        if let Some(hash) = block {
            requests.push(CliRequest::Block(hash));
        }
        if let Some(height) = height {
            requests.push(CliRequest::Height(height));
        }
        if let Some(txid) = tx {
            requests.push(CliRequest::Transaction(txid));
        }
        if scores {
            requests.push(CliRequest::Scores);
        }

        match requests.len() {
            0 => Ok(CliRequest::Recent(count)),
            1 => Ok(requests.remove(0)),
            _ => anyhow::bail!("Specify only one of --start, --block, --height, --tx, --scores"),
        }
    }
}

/// Execute CLI mode operations
pub async fn run_cli_mode(explorer: &Explorer, request: CliRequest) -> Result<()> {
    let output = match request {
        CliRequest::Recent(count) => format_block_list(&explorer.recent(count).await?),
        CliRequest::Page(start) => format_block_list(&explorer.page(start).await?),
        CliRequest::Block(hash) => format_block_detail(&explorer.block(&hash).await?),
        CliRequest::Height(height) => format_block_detail(&explorer.block_at(height).await?),
        CliRequest::Transaction(txid) => format_transaction(&explorer.transaction(&txid).await?),
        CliRequest::Scores => format_scores(&explorer.scores().await?),
    };
    print!("{}", output);
    Ok(())
}

/// Blocks as a table, followed by the navigation heights
pub fn format_block_list(view: &BlockListView) -> String {
    let mut out = String::new();
    out.push_str(&format!("╭─{:─<10}─┬─{:─<8}─┬─{:─<19}─┬─{:─<5}─┬─{:─<14}─┬─{:─<10}─┬─{:─<30}─╮\n", "", "", "", "", "", "", ""));
    out.push_str(&format!(
        "│ {:^10} │ {:^8} │ {:^19} │ {:^5} │ {:^14} │ {:^10} │ {:^30} │\n",
        "Hash", "Height", "Time", "Txs", "Total BTC", "Size (kB)", "Coinbase"
    ));
    out.push_str(&format!("├─{:─<10}─┼─{:─<8}─┼─{:─<19}─┼─{:─<5}─┼─{:─<14}─┼─{:─<10}─┼─{:─<30}─┤\n", "", "", "", "", "", "", ""));

    for block in &view.blocks {
        out.push_str(&format!(
            "│ {:<10} │ {:>8} │ {:<19} │ {:>5} │ {:>14} │ {:>10} │ {:<30} │\n",
            block.display_hash,
            block.height,
            block.timestamp,
            block.tx_count,
            block.total_btc,
            block.size,
            printable(&block.coinbase_message.to_text(), 30)
        ));
    }

    out.push_str(&format!("╰─{:─<10}─┴─{:─<8}─┴─{:─<19}─┴─{:─<5}─┴─{:─<14}─┴─{:─<10}─┴─{:─<30}─╯\n", "", "", "", "", "", "", ""));

    match view.window.next_page {
        Some(next) => out.push_str(&format!("◀ older: --start {}   newer: --start {} ▶\n", view.window.previous_page, next)),
        None => out.push_str(&format!("◀ older: --start {}\n", view.window.previous_page)),
    }
    out
}

pub fn format_block_detail(view: &BlockDetailView) -> String {
    let summary = &view.summary;
    let mut out = String::new();

    out.push_str("\n🔍 Block Detail View\n");
    out.push_str(&format!("╭─{:─<70}─╮\n", ""));
    out.push_str(&format!("│ Height: {}  Hash: {}\n", summary.height, summary.hash));
    out.push_str(&format!("│ Time: {}  Size: {} kB  Txs: {}\n", summary.timestamp, summary.size, summary.tx_count));
    out.push_str(&format!("│ Total output: {} BTC\n", summary.total_btc));
    out.push_str(&format!("│ Bits: {}  Difficulty: {}  Nonce: {}\n", view.bits, view.difficulty, view.nonce));
    out.push_str(&format!("│ Merkle root: {}\n", view.merkle_root));
    out.push_str(&format!("│ Previous: {}\n", view.previous_hash.as_deref().unwrap_or("─")));
    out.push_str(&format!("│ Next: {}\n", view.next_hash.as_deref().unwrap_or("─")));
    out.push_str(&format!("│ Coinbase: {}\n", printable(&summary.coinbase_message.to_text(), 60)));
    out.push_str(&format!("├─{:─<70}─┤\n", ""));

    for tx in &view.transactions {
        out.push_str(&format!("│ 📄 {} ({})\n", tx.display_hash, tx.hash));
        out.push_str(&format_inputs(&tx.vin));
        out.push_str(&format_outputs(&tx.vout));
    }

    out.push_str(&format!("╰─{:─<70}─╯\n", ""));
    out
}

pub fn format_transaction(view: &TxDetailView) -> String {
    let mut out = String::new();
    out.push_str("\n📄 Transaction Detail View\n");
    out.push_str(&format!("╭─{:─<70}─╮\n", ""));
    out.push_str(&format!("│ Hash: {}\n", view.hash));
    out.push_str(&format_inputs(&view.vin));
    out.push_str(&format_outputs(&view.vout));
    out.push_str(&format!("│ Total output: {} BTC\n", view.btc_out));
    out.push_str(&format!("╰─{:─<70}─╯\n", ""));
    out
}

pub fn format_scores(view: &ScoreView) -> String {
    let mut out = String::new();
    out.push_str(&format!("\n🏆 Coinbase messages over the last {} blocks\n", view.blocks_scanned));
    out.push_str(&format!("╭─{:─<5}─┬─{:─<50}─┬─{:─<7}─╮\n", "", "", ""));
    out.push_str(&format!("│ {:^5} │ {:^50} │ {:^7} │\n", "#", "Message", "Blocks"));
    out.push_str(&format!("├─{:─<5}─┼─{:─<50}─┼─{:─<7}─┤\n", "", "", ""));
    for (rank, entry) in view.entries.iter().enumerate() {
        out.push_str(&format!(
            "│ {:>5} │ {:<50} │ {:>7} │\n",
            rank + 1,
            printable(&entry.message.to_text(), 50),
            entry.count
        ));
    }
    out.push_str(&format!("╰─{:─<5}─┴─{:─<50}─┴─{:─<7}─╯\n", "", "", ""));
    out
}

fn format_inputs(inputs: &[Vin]) -> String {
    inputs
        .iter()
        .map(|vin| match (&vin.coinbase, &vin.txid) {
            (Some(_), _) => "│   📥 coinbase\n".to_string(),
            (None, Some(txid)) => format!("│   📥 {}:{}\n", txid, vin.vout.unwrap_or_default()),
            (None, None) => "│   📥 ─\n".to_string(),
        })
        .collect()
}

fn format_outputs(outputs: &[Vout]) -> String {
    outputs
        .iter()
        .map(|vout| {
            format!(
                "│   📤 {} {} BTC\n",
                vout.script_pub_key.destination().unwrap_or("(no address)"),
                vout.value
            )
        })
        .collect()
}

/// Control characters would garble the table, show them as dots and cap the width
fn printable(text: &str, max_chars: usize) -> String {
    text.chars()
        .map(|c| if c.is_control() { '·' } else { c })
        .take(max_chars)
        .collect()
}
