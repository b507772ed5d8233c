//! Market data port trait.

use chrono::NaiveDateTime;

use crate::domain::candle::Candle;
use crate::domain::error::HacoError;

pub trait CandlePort {
    /// Up to `lookback` most recent candles for `symbol` on `timeframe`, oldest
    /// first. An unknown symbol is an error; a known one with no rows is `Ok(vec![])`.
    fn fetch_candles(
        &self,
        symbol: &str,
        timeframe: &str,
        lookback: usize,
    ) -> Result<Vec<Candle<NaiveDateTime>>, HacoError>;

    fn list_symbols(&self, timeframe: &str) -> Result<Vec<String>, HacoError>;
}
