//! HACO trend-state engine.
//!
//! Candles → Heikin-Ashi projection → per-side zero-lag lines → up/down
//! retention tracks → flip edges → sticky state, in one forward pass. The
//! function is pure: every call allocates its own series and nothing survives
//! between calls, so independent symbols can be evaluated in parallel.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::domain::candle::Candle;
use crate::domain::edge::EdgeDetector;
use crate::domain::heikin_ashi;
use crate::domain::indicator::zero_lag::{MomentumPoint, build_zero_lag_lines};
use crate::domain::params::HacoParams;
use crate::domain::retention::{BarInputs, DownRules, PriceBar, RetentionFlags, RetentionRules, RetentionTracker, UpRules};
use crate::domain::trend_state::{SideTrace, StateAggregator, TrendState, build_reason};

/// Every raw and derived value for one input candle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HacoBar<T> {
    pub time: T,
    pub o: f64,
    pub h: f64,
    pub l: f64,
    pub c: f64,
    pub ha_open: f64,
    pub ha_close: f64,
    pub mid: f64,
    pub up: MomentumPoint,
    pub down: MomentumPoint,
    pub up_track: RetentionFlags,
    pub down_track: RetentionFlags,
    pub upw: bool,
    pub dnw: bool,
    pub state: TrendState,
    pub reason: String,
}

impl<T> HacoBar<T> {
    pub fn utr(&self) -> bool {
        self.up_track.retained
    }

    pub fn dtr(&self) -> bool {
        self.down_track.retained
    }
}

/// Last-bar view used by scanners and alerting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HacoSummary {
    pub upw: bool,
    pub dnw: bool,
    pub state: TrendState,
    /// State differs from the bar before; false with fewer than two bars.
    pub changed: bool,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HacoResult<T> {
    pub series: Vec<HacoBar<T>>,
    /// `None` for empty input; serialized as `{}`.
    #[serde(serialize_with = "serialize_last")]
    pub last: Option<HacoSummary>,
}

impl<T> HacoResult<T> {
    pub fn empty() -> Self {
        Self {
            series: Vec::new(),
            last: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn last_state(&self) -> Option<TrendState> {
        self.last.as_ref().map(|s| s.state)
    }
}

fn serialize_last<S: Serializer>(last: &Option<HacoSummary>, serializer: S) -> Result<S::Ok, S::Error> {
    match last {
        Some(summary) => summary.serialize(serializer),
        None => serializer.serialize_map(Some(0))?.end(),
    }
}

fn price_of<T>(candle: &Candle<T>) -> PriceBar {
    PriceBar {
        open: candle.open,
        high: candle.high,
        low: candle.low,
        close: candle.close,
    }
}

/// Runs the full pipeline over `candles`, which must already be in time order
/// (see [`crate::domain::candle::normalize_candles`]).
///
/// Total over all inputs: an empty slice yields an empty result, and malformed
/// candles flow through the arithmetic without raising.
pub fn compute_haco<T: Clone>(candles: &[Candle<T>], params: &HacoParams) -> HacoResult<T> {
    if candles.is_empty() {
        return HacoResult::empty();
    }

    let ha = heikin_ashi::project(candles);
    let up_lines = build_zero_lag_lines(&ha.ha_close, &ha.mid, params.length_up);
    let down_lines = build_zero_lag_lines(&ha.ha_close, &ha.mid, params.length_down);

    let mut up_tracker = RetentionTracker::new(UpRules, params.alert_lookback);
    let mut down_tracker = RetentionTracker::new(DownRules, params.alert_lookback);
    let mut edges = EdgeDetector::new();
    let mut states = StateAggregator::new();

    let mut series = Vec::with_capacity(candles.len());
    let mut flips = 0usize;

    for (i, candle) in candles.iter().enumerate() {
        let price = price_of(candle);
        let prev = if i == 0 { price } else { price_of(&candles[i - 1]) };

        let up_flags = up_tracker.step(
            &BarInputs {
                price,
                ha_open: ha.ha_open[i],
                ha_close: ha.ha_close[i],
                zero_lag_diff: up_lines.zero_lag_diff[i],
            },
            &prev,
        );
        let down_flags = down_tracker.step(
            &BarInputs {
                price,
                ha_open: ha.ha_open[i],
                ha_close: ha.ha_close[i],
                zero_lag_diff: down_lines.zero_lag_diff[i],
            },
            &prev,
        );

        let edge = edges.step(up_flags.retained, down_flags.retained);
        if edge.any() {
            flips += 1;
        }
        let state = states.step(candle.is_bullish(), edge);
        let reason = build_reason(
            edge,
            SideTrace {
                label: up_tracker.rules().label(),
                flags: &up_flags,
                zero_lag_diff: up_lines.zero_lag_diff[i],
            },
            SideTrace {
                label: down_tracker.rules().label(),
                flags: &down_flags,
                zero_lag_diff: down_lines.zero_lag_diff[i],
            },
        );

        series.push(HacoBar {
            time: candle.time.clone(),
            o: candle.open,
            h: candle.high,
            l: candle.low,
            c: candle.close,
            ha_open: ha.ha_open[i],
            ha_close: ha.ha_close[i],
            mid: ha.mid[i],
            up: up_lines.point(i),
            down: down_lines.point(i),
            up_track: up_flags,
            down_track: down_flags,
            upw: edge.upw,
            dnw: edge.dnw,
            state,
            reason,
        });
    }

    let last = summarize(&series);
    log::debug!(
        "haco: {} bars, {} flips, params {:?}",
        series.len(),
        flips,
        params
    );

    HacoResult { series, last }
}

fn summarize<T>(series: &[HacoBar<T>]) -> Option<HacoSummary> {
    let last = series.last()?;
    let changed = series.len() > 1 && series[series.len() - 2].state != last.state;
    Some(HacoSummary {
        upw: last.upw,
        dnw: last.dnw,
        state: last.state,
        changed,
        reason: last.reason.clone(),
    })
}
