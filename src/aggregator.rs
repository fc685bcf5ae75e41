// File: src/aggregator.rs
// Output value totals and their display precision

use rust_decimal::Decimal;

use crate::data_models::{RawBlock, RawTransaction, Vout};

/// Decimal places a total is displayed with. The block list pager and the
/// detail/latest views print the same sum with different precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BtcPrecision {
    Pager,
    Detail,
}

impl BtcPrecision {
    pub fn decimals(self) -> u32 {
        match self {
            BtcPrecision::Pager => 5,
            BtcPrecision::Detail => 8,
        }
    }
}

pub fn sum_outputs(outputs: &[Vout]) -> Decimal {
    outputs.iter().map(|v| v.value).sum()
}

pub fn transaction_total(tx: &RawTransaction) -> Decimal {
    sum_outputs(&tx.vout)
}

/// Every output of every transaction, coinbase included
pub fn block_total(block: &RawBlock) -> Decimal {
    block.transactions.iter().map(transaction_total).sum()
}

/// Round half-to-even and print exactly `precision` decimals
pub fn format_btc(value: Decimal, precision: BtcPrecision) -> String {
    let mut rounded = value.round_dp(precision.decimals());
    rounded.rescale(precision.decimals());
    rounded.to_string()
}
