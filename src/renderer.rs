// File: src/renderer.rs
// HTML pages for the explorer views

use crate::data_models::{
    BlockDetailView, BlockListView, BlockSummary, CoinbaseMessage, ErrorView, ScoreView,
    TxDetailView, TxDisplay, Vin, Vout,
};

/// Page renderer. Built once at startup and shared with every handler.
#[derive(Debug, Clone)]
pub struct Renderer {
    title: String,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new("Coinbase Explorer")
    }
}

impl Renderer {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    /// Front page: newest blocks, link to older ones only
    pub fn main_page(&self, view: &BlockListView) -> String {
        let body = format!(
            "<h2>Latest blocks</h2>\n{}\n<p class=\"nav\"><a href=\"/blocks/{}\">Older blocks &raquo;</a></p>",
            self.block_table(&view.blocks),
            view.window.previous_page
        );
        self.layout("Latest blocks", &body)
    }

    pub fn pager_page(&self, view: &BlockListView) -> String {
        let newer = view
            .window
            .next_page
            .map(|height| format!("<a href=\"/blocks/{}\">&laquo; Newer blocks</a> | ", height))
            .unwrap_or_default();
        let body = format!(
            "<h2>Blocks</h2>\n{}\n<p class=\"nav\">{}<a href=\"/blocks/{}\">Older blocks &raquo;</a></p>",
            self.block_table(&view.blocks),
            newer,
            view.window.previous_page
        );
        self.layout("Blocks", &body)
    }

    pub fn block_page(&self, view: &BlockDetailView) -> String {
        let summary = &view.summary;
        let link = |hash: &Option<String>| match hash {
            Some(hash) => format!("<a href=\"/block/{0}\">{0}</a>", escape(hash)),
            None => "&mdash;".to_string(),
        };

        let header = [
            ("Hash", escape(&summary.hash)),
            ("Height", summary.height.to_string()),
            ("Previous block", link(&view.previous_hash)),
            ("Next block", link(&view.next_hash)),
            ("Time", escape(&summary.timestamp)),
            ("Size (kB)", escape(&summary.size)),
            ("Transactions", summary.tx_count.to_string()),
            ("Total output", format!("{} BTC", escape(&summary.total_btc))),
            ("Bits", escape(&view.bits)),
            ("Difficulty", escape(&view.difficulty)),
            ("Nonce", view.nonce.to_string()),
            ("Merkle root", escape(&view.merkle_root)),
            ("Coinbase message", coinbase_text(&summary.coinbase_message)),
        ]
        .iter()
        .map(|(label, value)| format!("<tr><th>{}</th><td>{}</td></tr>\n", label, value))
        .collect::<String>();

        let transactions = view.transactions.iter().map(tx_section).collect::<String>();

        let body = format!(
            "<h2>Block {}</h2>\n<table class=\"header\">\n{}</table>\n<h3>Transactions</h3>\n{}",
            summary.height, header, transactions
        );
        self.layout(&format!("Block {}", summary.height), &body)
    }

    pub fn tx_page(&self, view: &TxDetailView) -> String {
        let body = format!(
            "<h2>Transaction</h2>\n<p class=\"hash\">{}</p>\n<div class=\"tx\">\n{}\n{}\n</div>\n<p>Total output: {} BTC</p>",
            escape(&view.hash),
            inputs_list(&view.vin),
            outputs_list(&view.vout),
            escape(&view.btc_out)
        );
        self.layout("Transaction", &body)
    }

    pub fn scores_page(&self, view: &ScoreView) -> String {
        let rows = view
            .entries
            .iter()
            .enumerate()
            .map(|(rank, entry)| {
                format!(
                    "<tr><td>{}</td><td class=\"msg\">{}</td><td>{}</td></tr>\n",
                    rank + 1,
                    escape(&entry.message.to_text()),
                    entry.count
                )
            })
            .collect::<String>();

        let body = format!(
            "<h2>Coinbase messages</h2>\n<p>Last {} blocks</p>\n<table>\n<tr><th>#</th><th>Message</th><th>Blocks</th></tr>\n{}</table>",
            view.blocks_scanned, rows
        );
        self.layout("Scores", &body)
    }

    pub fn error_page(&self, view: &ErrorView) -> String {
        let body = format!("<h2>Error</h2>\n<p class=\"error\">{}</p>", escape(&view.message));
        self.layout("Error", &body)
    }

    fn block_table(&self, blocks: &[BlockSummary]) -> String {
        let rows = blocks
            .iter()
            .map(|b| {
                format!(
                    "<tr><td><a href=\"/block/{}\">{}</a></td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td class=\"msg\">{}</td></tr>\n",
                    escape(&b.hash),
                    escape(&b.display_hash),
                    b.height,
                    escape(&b.timestamp),
                    b.tx_count,
                    escape(&b.total_btc),
                    escape(&b.size),
                    escape(&b.coinbase_message.to_text())
                )
            })
            .collect::<String>();

        format!(
            "<table class=\"blocks\">\n<tr><th>Hash</th><th>Height</th><th>Time</th><th>Txs</th><th>Total BTC</th><th>Size (kB)</th><th>Coinbase</th></tr>\n{}</table>",
            rows
        )
    }

    fn layout(&self, page_title: &str, body: &str) -> String {
        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{} - {}</title>\n</head>\n<body>\n<header><a href=\"/\">{}</a> | <a href=\"/scores\">Scores</a></header>\n<main>\n{}\n</main>\n</body>\n</html>\n",
            escape(page_title),
            escape(&self.title),
            escape(&self.title),
            body
        )
    }
}

fn coinbase_text(message: &CoinbaseMessage) -> String {
    if message.is_empty() {
        "&mdash;".to_string()
    } else {
        escape(&message.to_text())
    }
}

fn tx_section(tx: &TxDisplay) -> String {
    format!(
        "<div class=\"tx\">\n<p><a href=\"/tx/{}\">{}</a></p>\n{}\n{}\n</div>\n",
        escape(&tx.hash),
        escape(&tx.display_hash),
        inputs_list(&tx.vin),
        outputs_list(&tx.vout)
    )
}

fn inputs_list(inputs: &[Vin]) -> String {
    let items = inputs
        .iter()
        .map(|vin| match (&vin.coinbase, &vin.txid) {
            (Some(_), _) => "<li>Coinbase</li>\n".to_string(),
            (None, Some(txid)) => format!(
                "<li><a href=\"/tx/{0}\">{0}</a>:{1}</li>\n",
                escape(txid),
                vin.vout.unwrap_or_default()
            ),
            (None, None) => "<li>&mdash;</li>\n".to_string(),
        })
        .collect::<String>();
    format!("<ul class=\"vin\">\n{}</ul>", items)
}

fn outputs_list(outputs: &[Vout]) -> String {
    let items = outputs
        .iter()
        .map(|vout| {
            format!(
                "<li>{} {} BTC</li>\n",
                escape(vout.script_pub_key.destination().unwrap_or("(no address)")),
                vout.value
            )
        })
        .collect::<String>();
    format!("<ul class=\"vout\">\n{}</ul>", items)
}

/// Escape text for HTML element content and double-quoted attributes
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}
