//! OHLC candle representation and input normalization.
//!
//! `time` is opaque to the engine: it is carried through to the output untouched,
//! so any type works. Normalization needs it to be `Ord`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle<T> {
    pub time: T,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl<T> Candle<T> {
    pub fn new(time: T, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
        }
    }

    /// (high + low) / 2
    pub fn mid(&self) -> f64 {
        (self.high + self.low) / 2.0
    }

    /// Ties count as bullish.
    pub fn is_bullish(&self) -> bool {
        self.close >= self.open
    }

    /// Finite prices with high/low enclosing the body.
    pub fn is_well_formed(&self) -> bool {
        let finite = [self.open, self.high, self.low, self.close]
            .iter()
            .all(|v| v.is_finite());
        finite && self.high >= self.open.max(self.close) && self.low <= self.open.min(self.close)
    }
}

/// What `normalize_candles` had to do to the input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    pub reordered: bool,
    pub duplicates: usize,
    pub malformed: usize,
}

#[derive(Debug, Clone)]
pub struct Normalized<T> {
    pub candles: Vec<Candle<T>>,
    pub report: NormalizeReport,
}

/// Orders candles by time and collapses duplicate timestamps.
///
/// The sort is stable, so for a repeated timestamp the candle that appeared
/// last in the input wins. Malformed candles are counted and kept: the engine
/// tolerates degenerate arithmetic and dropping bars would shift every
/// downstream index.
pub fn normalize_candles<T: Ord>(mut candles: Vec<Candle<T>>) -> Normalized<T> {
    let mut report = NormalizeReport {
        reordered: candles.windows(2).any(|w| w[0].time > w[1].time),
        ..NormalizeReport::default()
    };

    if report.reordered {
        candles.sort_by(|a, b| a.time.cmp(&b.time));
    }

    let mut out: Vec<Candle<T>> = Vec::with_capacity(candles.len());
    for candle in candles {
        if !candle.is_well_formed() {
            report.malformed += 1;
        }
        match out.last_mut() {
            Some(last) if last.time == candle.time => {
                *last = candle;
                report.duplicates += 1;
            }
            _ => out.push(candle),
        }
    }

    if report.reordered {
        log::warn!("candle input was out of order; sorted {} bars", out.len());
    }
    if report.duplicates > 0 {
        log::warn!("collapsed {} duplicate timestamps", report.duplicates);
    }
    if report.malformed > 0 {
        log::warn!(
            "{} candles have high/low outside the body or non-finite prices",
            report.malformed
        );
    }

    Normalized {
        candles: out,
        report,
    }
}
