//! Stock-adjustment form helpers. Only the signed delta is submitted; the
//! server-computed stock is authoritative.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Adjustment must be a whole number")]
pub struct AdjustmentParseError;

/// Parse the adjustment as typed into the form; accepts a leading sign.
pub fn parse_adjustment(input: &str) -> Result<i32, AdjustmentParseError> {
    input.trim().parse::<i32>().map_err(|_| AdjustmentParseError)
}

/// The previewed resulting stock. Widened so extreme deltas cannot wrap.
pub fn preview_stock(current: i32, adjustment: i32) -> i64 {
    current as i64 + adjustment as i64
}
