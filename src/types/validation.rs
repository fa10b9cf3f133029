//! Input and provider-data validation.

use chrono::NaiveDate;

use super::RawQuote;
use crate::{Result, StockwireError};

/// Maximum ticker length accepted before any provider call.
pub const MAX_TICKER_LEN: usize = 10;

/// Check a ticker's syntax: 1–10 characters of `A-Z`, `0-9`, `.` or `-`
/// (case-insensitive).
pub fn validate_ticker(ticker: &str) -> Result<()> {
    let len = ticker.chars().count();
    let well_formed = (1..=MAX_TICKER_LEN).contains(&len)
        && ticker
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
    if well_formed {
        Ok(())
    } else {
        Err(StockwireError::InvalidTicker(ticker.to_string()))
    }
}

/// Check that a provider response carries usable prices.
///
/// Returns `(price, previous_close)` when both are present and positive.
pub fn validate_raw_quote(raw: &RawQuote) -> Result<(f64, f64)> {
    let price = raw
        .price()
        .ok_or_else(|| StockwireError::IncompleteData("missing current price".into()))?;
    let previous_close = raw
        .previous_close
        .ok_or_else(|| StockwireError::IncompleteData("missing previous close".into()))?;
    if !(price > 0.0 && previous_close > 0.0) {
        return Err(StockwireError::IncompleteData(
            "price is zero or negative".into(),
        ));
    }
    Ok((price, previous_close))
}

/// Check a `YYYY-MM-DD` date string.
pub fn validate_date(date: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
        StockwireError::InvalidInput(format!("invalid date '{date}', expected YYYY-MM-DD"))
    })
}
