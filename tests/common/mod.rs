#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use hacotrend::domain::candle::Candle;
use hacotrend::domain::error::HacoError;
use hacotrend::ports::candle_port::CandlePort;
use hacotrend::ports::notify_port::{Channel, NotifyPort};
use std::cell::RefCell;
use std::collections::HashMap;

pub struct MockCandlePort {
    pub data: HashMap<String, Vec<Candle<NaiveDateTime>>>,
    pub errors: HashMap<String, String>,
}

impl MockCandlePort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_candles(mut self, symbol: &str, candles: Vec<Candle<NaiveDateTime>>) -> Self {
        self.data.insert(symbol.to_string(), candles);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl CandlePort for MockCandlePort {
    fn fetch_candles(
        &self,
        symbol: &str,
        _timeframe: &str,
        lookback: usize,
    ) -> Result<Vec<Candle<NaiveDateTime>>, HacoError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(HacoError::DataSource {
                reason: reason.clone(),
            });
        }
        let candles = self.data.get(symbol).cloned().unwrap_or_default();
        let skip = candles.len().saturating_sub(lookback);
        Ok(candles.into_iter().skip(skip).collect())
    }

    fn list_symbols(&self, _timeframe: &str) -> Result<Vec<String>, HacoError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: RefCell<Vec<(Channel, String, String)>>,
}

impl NotifyPort for RecordingNotifier {
    fn send(&self, channel: &Channel, subject: &str, body: &str) -> Result<(), HacoError> {
        self.sent
            .borrow_mut()
            .push((channel.clone(), subject.to_string(), body.to_string()));
        Ok(())
    }
}

pub fn day(offset: usize) -> NaiveDateTime {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    start + chrono::Duration::days(offset as i64)
}

pub fn candle(i: usize, open: f64, high: f64, low: f64, close: f64) -> Candle<NaiveDateTime> {
    Candle::new(day(i), open, high, low, close)
}

/// Eight bars: a short rally, a sharp drop, then a recovery.
pub fn reversal_fixture() -> Vec<Candle<NaiveDateTime>> {
    vec![
        candle(0, 1.0, 1.1, 0.9, 1.05),
        candle(1, 1.05, 1.2, 1.0, 1.15),
        candle(2, 1.15, 1.2, 1.1, 1.12),
        candle(3, 1.12, 1.15, 0.8, 0.85),
        candle(4, 0.85, 0.9, 0.7, 0.75),
        candle(5, 0.75, 0.95, 0.7, 0.92),
        candle(6, 0.92, 1.0, 0.9, 0.96),
        candle(7, 0.96, 1.2, 0.95, 1.1),
    ]
}

pub fn flat(n: usize, price: f64) -> Vec<Candle<NaiveDateTime>> {
    (0..n).map(|i| candle(i, price, price, price, price)).collect()
}

/// Steady one-point-per-bar rise with bullish bodies.
pub fn uptrend(n: usize) -> Vec<Candle<NaiveDateTime>> {
    (0..n)
        .map(|i| {
            let base = 100.0 + i as f64;
            candle(i, base, base + 1.5, base - 0.5, base + 1.0)
        })
        .collect()
}

/// 20 rising bars closing at 140, then 20 falling bars of three points each.
pub fn rally_then_selloff() -> Vec<Candle<NaiveDateTime>> {
    let mut candles: Vec<_> = (0..20)
        .map(|i| {
            let open = 100.0 + 2.0 * i as f64;
            candle(i, open, open + 2.5, open - 0.5, open + 2.0)
        })
        .collect();
    for k in 0..20 {
        let open = 135.0 - 3.0 * k as f64;
        let close = open - 3.0;
        candles.push(candle(20 + k, open, open + 0.5, close - 0.5, close));
    }
    candles
}

pub fn indices<T>(series: &[T], pred: impl Fn(&T) -> bool) -> Vec<usize> {
    series
        .iter()
        .enumerate()
        .filter(|(_, b)| pred(b))
        .map(|(i, _)| i)
        .collect()
}

pub fn write_csv(dir: &std::path::Path, symbol: &str, timeframe: &str, candles: &[Candle<NaiveDateTime>]) {
    let mut out = String::from("time,open,high,low,close,volume\n");
    for c in candles {
        out.push_str(&format!(
            "{},{},{},{},{},1000\n",
            c.time.format("%Y-%m-%d"),
            c.open,
            c.high,
            c.low,
            c.close
        ));
    }
    std::fs::write(dir.join(format!("{symbol}_{timeframe}.csv")), out).unwrap();
}
