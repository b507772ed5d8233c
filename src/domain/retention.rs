//! Trend retention tracks ("keeping" hysteresis).
//!
//! Each direction runs its own [`RetentionTracker`], a small automaton that
//! latches on when any of several conditions holds and only lets go once none
//! of them, nor its one-bar memory, does. Per bar `i` (with `prev = i - 1`, or
//! `i` itself on the first bar):
//!
//! ```text
//! keep1_alert = alert_condition held on any bar in [i - lookback, i]
//! keep1_price = price_confirmation(i, prev)          (up side only)
//! keep2       = momentum_confirmation(i)
//! keeping     = keep1_alert | keep1_price | keep2
//! keepAll     = keeping | (keeping[prev] & body_follow_through) | close_follow_through
//! keep3       = H != L & |C - O| < (H - L) * 0.35 & range_reach
//! retained    = keepAll | (keepAll[prev] & keep3)
//! ```
//!
//! The two directions differ only in their [`RetentionRules`]. The down side
//! deliberately has no price-confirmation term.

use serde::Serialize;

/// Raw prices of one candle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBar {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// Everything a tracker reads for one bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarInputs {
    pub price: PriceBar,
    pub ha_open: f64,
    pub ha_close: f64,
    /// zero_lag_mid - zero_lag_ha for this tracker's own window length
    pub zero_lag_diff: f64,
}

/// The predicate set that distinguishes one trend direction from the other.
pub trait RetentionRules {
    /// Suffix used in diagnostic traces ("U" / "D").
    fn label(&self) -> &'static str;

    /// Raw same-direction Heikin-Ashi condition, OR-ed over the alert window.
    fn alert_condition(&self, bar: &BarInputs) -> bool;

    /// Extra price/extremum confirmation. `None` when the direction has none.
    fn price_confirmation(&self, bar: &BarInputs, prev: &PriceBar) -> Option<bool>;

    fn momentum_confirmation(&self, bar: &BarInputs) -> bool;

    /// Candle body points in this direction.
    fn body_follow_through(&self, bar: &PriceBar) -> bool;

    /// Close moved (or held) in this direction relative to the previous close.
    fn close_follow_through(&self, bar: &PriceBar, prev: &PriceBar) -> bool;

    /// Bar still reaches back into the previous bar's range.
    fn range_reach(&self, bar: &PriceBar, prev: &PriceBar) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UpRules;

#[derive(Debug, Clone, Copy, Default)]
pub struct DownRules;

impl RetentionRules for UpRules {
    fn label(&self) -> &'static str {
        "U"
    }

    fn alert_condition(&self, bar: &BarInputs) -> bool {
        bar.ha_close >= bar.ha_open
    }

    fn price_confirmation(&self, bar: &BarInputs, prev: &PriceBar) -> Option<bool> {
        let p = &bar.price;
        Some(p.close >= bar.ha_close || p.high > prev.high || p.low > prev.low)
    }

    fn momentum_confirmation(&self, bar: &BarInputs) -> bool {
        bar.zero_lag_diff >= 0.0
    }

    fn body_follow_through(&self, bar: &PriceBar) -> bool {
        bar.close >= bar.open
    }

    fn close_follow_through(&self, bar: &PriceBar, prev: &PriceBar) -> bool {
        bar.close >= prev.close
    }

    fn range_reach(&self, bar: &PriceBar, prev: &PriceBar) -> bool {
        bar.high >= prev.low
    }
}

impl RetentionRules for DownRules {
    fn label(&self) -> &'static str {
        "D"
    }

    fn alert_condition(&self, bar: &BarInputs) -> bool {
        bar.ha_close < bar.ha_open
    }

    fn price_confirmation(&self, _bar: &BarInputs, _prev: &PriceBar) -> Option<bool> {
        None
    }

    fn momentum_confirmation(&self, bar: &BarInputs) -> bool {
        bar.zero_lag_diff < 0.0
    }

    fn body_follow_through(&self, bar: &PriceBar) -> bool {
        bar.close < bar.open
    }

    fn close_follow_through(&self, bar: &PriceBar, prev: &PriceBar) -> bool {
        bar.close < prev.close
    }

    fn range_reach(&self, bar: &PriceBar, prev: &PriceBar) -> bool {
        bar.low <= prev.high
    }
}

/// One bar's output from a tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetentionFlags {
    pub keep1_alert: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep1_price: Option<bool>,
    pub keep2: bool,
    pub keeping: bool,
    pub keep_all: bool,
    pub keep3: bool,
    /// `utr` on the up side, `dtr` on the down side.
    pub retained: bool,
}

/// Body under 35% of the range is a "small body" for the secondary check.
const KEEP3_BODY_RATIO: f64 = 0.35;

#[derive(Debug, Clone, Copy)]
struct Memory {
    keeping: bool,
    keep_all: bool,
}

/// Forward-only retention automaton for one direction.
///
/// Feed bars in order with [`RetentionTracker::step`]. The windowed alert OR is
/// tracked through the index of the most recent raw hit, so each step is O(1).
#[derive(Debug, Clone)]
pub struct RetentionTracker<R> {
    rules: R,
    lookback: usize,
    index: usize,
    last_alert_at: Option<usize>,
    memory: Option<Memory>,
}

impl<R: RetentionRules> RetentionTracker<R> {
    pub fn new(rules: R, lookback: usize) -> Self {
        Self {
            rules,
            lookback,
            index: 0,
            last_alert_at: None,
            memory: None,
        }
    }

    pub fn rules(&self) -> &R {
        &self.rules
    }

    /// Advance by one bar. `prev` is the previous candle, or this bar's own
    /// candle on the very first step.
    pub fn step(&mut self, bar: &BarInputs, prev: &PriceBar) -> RetentionFlags {
        let rules = &self.rules;
        let i = self.index;
        let price = &bar.price;

        if rules.alert_condition(bar) {
            self.last_alert_at = Some(i);
        }
        let keep1_alert = self.last_alert_at.is_some_and(|j| i - j <= self.lookback);
        let keep1_price = rules.price_confirmation(bar, prev);
        let keep2 = rules.momentum_confirmation(bar);
        let keeping = keep1_alert || keep1_price.unwrap_or(false) || keep2;

        let prev_keeping = self.memory.map_or(keeping, |m| m.keeping);
        let keep_all = keeping
            || (prev_keeping && rules.body_follow_through(price))
            || rules.close_follow_through(price, prev);

        // a zero-range bar never confirms
        let keep3 = price.high != price.low
            && (price.close - price.open).abs() < (price.high - price.low) * KEEP3_BODY_RATIO
            && rules.range_reach(price, prev);

        let prev_keep_all = self.memory.map_or(keep_all, |m| m.keep_all);
        let retained = keep_all || (prev_keep_all && keep3);

        self.memory = Some(Memory { keeping, keep_all });
        self.index += 1;

        RetentionFlags {
            keep1_alert,
            keep1_price,
            keep2,
            keeping,
            keep_all,
            keep3,
            retained,
        }
    }
}
