//! Sticky trend state and the per-bar diagnostic trace.

use serde::{Serialize, Serializer};
use std::fmt;

use crate::domain::edge::EdgeFlags;
use crate::domain::retention::RetentionFlags;

/// Discrete trend classification. Serializes as `0` / `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrendState {
    Bearish,
    Bullish,
}

impl TrendState {
    pub fn as_u8(self) -> u8 {
        match self {
            TrendState::Bearish => 0,
            TrendState::Bullish => 1,
        }
    }
}

impl fmt::Display for TrendState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

impl Serialize for TrendState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_u8())
    }
}

/// Latch that only moves on an edge.
///
/// The first bar seeds from its own candle direction; every later bar keeps the
/// previous state unless `upw` (→ bullish) or `dnw` (→ bearish) fires.
#[derive(Debug, Clone, Default)]
pub struct StateAggregator {
    current: Option<TrendState>,
}

impl StateAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<TrendState> {
        self.current
    }

    /// `bullish_candle` only matters on the seeding bar.
    pub fn step(&mut self, bullish_candle: bool, edges: EdgeFlags) -> TrendState {
        let next = match self.current {
            None if bullish_candle => TrendState::Bullish,
            None => TrendState::Bearish,
            Some(_) if edges.upw => TrendState::Bullish,
            Some(_) if edges.dnw => TrendState::Bearish,
            Some(state) => state,
        };
        self.current = Some(next);
        next
    }
}

/// One direction's contribution to the per-bar trace.
#[derive(Debug, Clone, Copy)]
pub struct SideTrace<'a> {
    /// Rule-set label ("U" / "D"); names the `keeping*`, `*tr` and `ZlDif*` entries.
    pub label: &'a str,
    pub flags: &'a RetentionFlags,
    pub zero_lag_diff: f64,
}

/// Human-readable audit trail for one bar.
///
/// Lists the names of the true headline flags in a fixed order, then a
/// trailer with the up-side keep1 components and both zero-lag diffs.
/// Booleans in the trailer print as `True`/`False` so traces line up with the
/// ones produced by the Python indicator service.
pub fn build_reason(edges: EdgeFlags, up: SideTrace<'_>, down: SideTrace<'_>) -> String {
    let named = [
        (edges.upw, "upw".to_string()),
        (edges.dnw, "dnw".to_string()),
        (up.flags.keeping, format!("keeping{}", up.label)),
        (down.flags.keeping, format!("keeping{}", down.label)),
        (up.flags.retained, format!("{}tr", up.label.to_lowercase())),
        (down.flags.retained, format!("{}tr", down.label.to_lowercase())),
    ];

    let mut parts: Vec<String> = named
        .into_iter()
        .filter(|(on, _)| *on)
        .map(|(_, name)| name)
        .collect();

    parts.push(format!(
        "keep1={}/{}/{} ZlDif{}={:.2} ZlDif{}={:.2}",
        py_bool(up.flags.keep1_alert),
        py_bool(up.flags.keep1_price.unwrap_or(false)),
        py_bool(up.flags.keep2),
        up.label,
        up.zero_lag_diff,
        down.label,
        down.zero_lag_diff
    ));

    parts.join(", ")
}

fn py_bool(value: bool) -> &'static str {
    if value { "True" } else { "False" }
}
