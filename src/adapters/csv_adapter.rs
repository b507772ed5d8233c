//! CSV file candle adapter.
//!
//! One file per symbol and timeframe: `{base}/{SYMBOL}_{timeframe}.csv` with a
//! header row naming `time` (or `date`), `open`, `high`, `low`, `close`. Extra
//! columns such as volume are ignored.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::fs;
use std::path::PathBuf;

use crate::domain::candle::{Candle, normalize_candles};
use crate::domain::error::HacoError;
use crate::ports::candle_port::CandlePort;

pub struct CsvCandleAdapter {
    base_path: PathBuf,
}

struct Columns {
    time: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Self {
        let find = |names: &[&str], fallback: usize| {
            headers
                .iter()
                .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
                .unwrap_or(fallback)
        };
        Self {
            time: find(&["time", "date", "timestamp"], 0),
            open: find(&["open", "o"], 1),
            high: find(&["high", "h"], 2),
            low: find(&["low", "l"], 3),
            close: find(&["close", "c"], 4),
        }
    }
}

impl CsvCandleAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str, timeframe: &str) -> PathBuf {
        self.base_path.join(format!("{}_{}.csv", symbol, timeframe))
    }
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS` or unix seconds.
pub fn parse_time(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(secs) = raw.parse::<i64>() {
        return DateTime::from_timestamp(secs, 0).map(|dt| dt.naive_utc());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn field(record: &csv::StringRecord, index: usize, name: &str, line: usize) -> Result<f64, HacoError> {
    let raw = record.get(index).ok_or_else(|| HacoError::DataSource {
        reason: format!("line {line}: missing {name} column"),
    })?;
    raw.trim().parse().map_err(|e| HacoError::DataSource {
        reason: format!("line {line}: invalid {name} value {raw:?}: {e}"),
    })
}

impl CandlePort for CsvCandleAdapter {
    fn fetch_candles(
        &self,
        symbol: &str,
        timeframe: &str,
        lookback: usize,
    ) -> Result<Vec<Candle<NaiveDateTime>>, HacoError> {
        let path = self.csv_path(symbol, timeframe);
        let content = fs::read_to_string(&path).map_err(|e| HacoError::DataSource {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr.headers().map_err(|e| HacoError::DataSource {
            reason: format!("CSV header error in {}: {}", path.display(), e),
        })?;
        let cols = Columns::from_headers(headers);

        let mut candles = Vec::new();
        for (i, result) in rdr.records().enumerate() {
            // header is line 1
            let line = i + 2;
            let record = result.map_err(|e| HacoError::DataSource {
                reason: format!("CSV parse error: {}", e),
            })?;

            let time_raw = record.get(cols.time).ok_or_else(|| HacoError::DataSource {
                reason: format!("line {line}: missing time column"),
            })?;
            let time = parse_time(time_raw).ok_or_else(|| HacoError::DataSource {
                reason: format!("line {line}: invalid time {time_raw:?}"),
            })?;

            candles.push(Candle::new(
                time,
                field(&record, cols.open, "open", line)?,
                field(&record, cols.high, "high", line)?,
                field(&record, cols.low, "low", line)?,
                field(&record, cols.close, "close", line)?,
            ));
        }

        let mut candles = normalize_candles(candles).candles;
        if candles.len() > lookback {
            candles.drain(..candles.len() - lookback);
        }
        log::debug!("{symbol} {timeframe}: loaded {} candles from {}", candles.len(), path.display());
        Ok(candles)
    }

    fn list_symbols(&self, timeframe: &str) -> Result<Vec<String>, HacoError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| HacoError::DataSource {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let suffix = format!("_{}.csv", timeframe);
        let mut symbols = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|e| HacoError::DataSource {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();

            if let Some(symbol) = name_str.strip_suffix(&suffix) {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}
