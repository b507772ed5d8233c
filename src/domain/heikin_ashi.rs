//! Heikin-Ashi projection of raw OHLC candles.
//!
//! haCloseRaw = (O+H+L+C)/4
//! haOpen[0]  = (O+C)/2, haOpen[i] = (haOpen[i-1] + haCloseRaw[i-1]) / 2
//! haClose    = (haCloseRaw + haOpen + max(H, haOpen) + min(L, haOpen)) / 4
//! mid        = (H+L)/2

use crate::domain::candle::Candle;

/// Index-aligned derived series, one entry per input candle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeikinAshiSeries {
    pub ha_open: Vec<f64>,
    pub ha_close_raw: Vec<f64>,
    pub ha_close: Vec<f64>,
    pub mid: Vec<f64>,
}

impl HeikinAshiSeries {
    pub fn len(&self) -> usize {
        self.ha_open.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ha_open.is_empty()
    }
}

pub fn project<T>(candles: &[Candle<T>]) -> HeikinAshiSeries {
    let n = candles.len();
    let mut series = HeikinAshiSeries {
        ha_open: Vec::with_capacity(n),
        ha_close_raw: Vec::with_capacity(n),
        ha_close: Vec::with_capacity(n),
        mid: Vec::with_capacity(n),
    };

    for (i, bar) in candles.iter().enumerate() {
        let close_raw = (bar.open + bar.high + bar.low + bar.close) / 4.0;
        let open = if i == 0 {
            (bar.open + bar.close) / 2.0
        } else {
            (series.ha_open[i - 1] + series.ha_close_raw[i - 1]) / 2.0
        };
        // f64::max/min would swallow a NaN wick; keep it flowing through instead.
        let upper = if open > bar.high { open } else { bar.high };
        let lower = if open < bar.low { open } else { bar.low };

        series.ha_open.push(open);
        series.ha_close_raw.push(close_raw);
        series.ha_close.push((close_raw + open + upper + lower) / 4.0);
        series.mid.push(bar.mid());
    }

    series
}
