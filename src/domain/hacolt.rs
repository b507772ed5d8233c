//! HACO body-momentum oscillator and the HACOLT tri-state derived from it.
//!
//! body       = haCloseRaw - haOpen
//! smoothed   = rolling mean of body over `length` bars
//! e          = EMA(smoothed, smooth)
//! osc        = e rescaled into [-100, 100] against its own 200-bar min/max
//! hacolt     = 100 when osc > 60 and rising, 0 when osc < -60 and falling, else 50

use serde::Serialize;

use crate::domain::candle::Candle;
use crate::domain::heikin_ashi;
use crate::domain::indicator::ema;
use crate::domain::indicator::rolling::{rolling_max, rolling_mean, rolling_min};

pub const DEFAULT_OSC_LENGTH: usize = 10;
pub const DEFAULT_OSC_SMOOTH: usize = 5;
pub const NORMALIZATION_WINDOW: usize = 200;

const STATE_THRESHOLD: f64 = 60.0;

/// HACOLT reading. Serializes as 0 / 50 / 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HacoltState {
    Short,
    Neutral,
    Long,
}

impl HacoltState {
    pub fn value(self) -> u8 {
        match self {
            HacoltState::Short => 0,
            HacoltState::Neutral => 50,
            HacoltState::Long => 100,
        }
    }
}

impl Serialize for HacoltState {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.value())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OscillatorParams {
    pub length: usize,
    pub smooth: usize,
}

impl Default for OscillatorParams {
    fn default() -> Self {
        Self {
            length: DEFAULT_OSC_LENGTH,
            smooth: DEFAULT_OSC_SMOOTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OscillatorPoint<T> {
    pub time: T,
    /// Oscillator in [-100, 100].
    pub haco: f64,
    /// The same reading mapped to [0, 100].
    pub percent: f64,
    pub hacolt: HacoltState,
}

/// HACO oscillator, clamped to [-100, 100]. A flat normalization window maps to -100.
pub fn haco_oscillator<T>(candles: &[Candle<T>], params: &OscillatorParams) -> Vec<f64> {
    if candles.is_empty() {
        return Vec::new();
    }

    let ha = heikin_ashi::project(candles);
    let body: Vec<f64> = ha
        .ha_close_raw
        .iter()
        .zip(&ha.ha_open)
        .map(|(close, open)| close - open)
        .collect();

    let smoothed = rolling_mean(&body, params.length);
    let e = ema(&smoothed, params.smooth);
    let lo = rolling_min(&e, NORMALIZATION_WINDOW);
    let hi = rolling_max(&e, NORMALIZATION_WINDOW);

    e.iter()
        .zip(lo.iter().zip(&hi))
        .map(|(v, (lo, hi))| {
            let span = hi - lo;
            let normalized = (v - lo) / span;
            let normalized = if span == 0.0 || normalized.is_nan() { 0.0 } else { normalized };
            (normalized * 200.0 - 100.0).clamp(-100.0, 100.0)
        })
        .collect()
}

/// Oscillator series mapped to [0, 100].
pub fn haco_percent(oscillator: &[f64]) -> Vec<f64> {
    oscillator.iter().map(|v| (v + 100.0) / 2.0).collect()
}

/// Tri-state classification of an oscillator series. The first bar's slope is 0.
pub fn hacolt_states(oscillator: &[f64]) -> Vec<HacoltState> {
    oscillator
        .iter()
        .enumerate()
        .map(|(i, &value)| {
            let slope = if i == 0 { 0.0 } else { value - oscillator[i - 1] };
            if value > STATE_THRESHOLD && slope >= 0.0 {
                HacoltState::Long
            } else if value < -STATE_THRESHOLD && slope <= 0.0 {
                HacoltState::Short
            } else {
                HacoltState::Neutral
            }
        })
        .collect()
}

/// Oscillator, percent and HACOLT state per candle.
pub fn compute_oscillator<T: Clone>(
    candles: &[Candle<T>],
    params: &OscillatorParams,
) -> Vec<OscillatorPoint<T>> {
    let osc = haco_oscillator(candles, params);
    let percent = haco_percent(&osc);
    let states = hacolt_states(&osc);

    candles
        .iter()
        .zip(osc.iter().zip(percent))
        .zip(states)
        .map(|((candle, (&haco, percent)), hacolt)| OscillatorPoint {
            time: candle.time.clone(),
            haco,
            percent,
            hacolt,
        })
        .collect()
}
