//! Periodic HACO state-change alerting.
//!
//! Each pass re-fetches the full lookback window for every due alert, reruns
//! the engine, and notifies when the last bar's state differs from the state
//! recorded on the previous pass.

use chrono::{Duration, NaiveDateTime};

use crate::domain::haco_cache::CachedEngine;
use crate::domain::params::HacoParams;
use crate::domain::trend_state::TrendState;
use crate::ports::candle_port::CandlePort;
use crate::ports::notify_port::{Channel, NotifyPort};

pub const DEFAULT_FREQUENCY_MINUTES: i64 = 15;
pub const DEFAULT_POLL_SECONDS: u64 = 60;

/// One watched symbol and what we last saw for it.
#[derive(Debug, Clone, PartialEq)]
pub struct HacoAlert {
    pub symbol: String,
    pub frequency_minutes: i64,
    pub channels: Vec<Channel>,
    pub last_state: Option<TrendState>,
    pub last_checked: Option<NaiveDateTime>,
}

impl HacoAlert {
    pub fn new(symbol: impl Into<String>, frequency_minutes: i64, channels: Vec<Channel>) -> Self {
        Self {
            symbol: symbol.into(),
            frequency_minutes,
            channels,
            last_state: None,
            last_checked: None,
        }
    }

    /// Never-checked alerts are always due. A frequency too large for a
    /// `Duration` is never due again.
    pub fn is_due(&self, now: NaiveDateTime) -> bool {
        match self.last_checked {
            None => true,
            Some(last) => Duration::try_minutes(self.frequency_minutes)
                .is_some_and(|every| now - last >= every),
        }
    }
}

/// Data window and engine parameters shared by every alert in a pass.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchRequest {
    pub timeframe: String,
    pub lookback: usize,
    pub params: HacoParams,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlertEvent {
    pub symbol: String,
    pub previous: Option<TrendState>,
    pub state: TrendState,
    pub at: NaiveDateTime,
    pub message: String,
}

pub fn alert_subject(symbol: &str) -> String {
    format!("{symbol} HACO Alert")
}

pub fn alert_message(symbol: &str, state: TrendState) -> String {
    format!("HACO state for {symbol} changed to {state}")
}

/// Runs one polling pass over `alerts` and returns the alerts that fired.
///
/// The first observation of a symbol counts as a change (there is no previous
/// state to match). Data errors skip the symbol without touching its record;
/// delivery errors are logged and the state is still recorded, so a flaky
/// channel does not re-send the same flip on every poll.
pub fn check_alerts(
    alerts: &mut [HacoAlert],
    candles: &dyn CandlePort,
    notifier: &dyn NotifyPort,
    engine: &mut CachedEngine<NaiveDateTime>,
    request: &WatchRequest,
    now: NaiveDateTime,
) -> Vec<AlertEvent> {
    let mut events = Vec::new();

    for alert in alerts.iter_mut() {
        if !alert.is_due(now) {
            log::debug!("{}: not due yet", alert.symbol);
            continue;
        }

        let window = match candles.fetch_candles(&alert.symbol, &request.timeframe, request.lookback) {
            Ok(w) => w,
            Err(e) => {
                log::warn!("{}: skipping ({})", alert.symbol, e);
                continue;
            }
        };
        if window.is_empty() {
            log::info!("{}: no data on {}", alert.symbol, request.timeframe);
            continue;
        }

        let result = engine.compute(&window, &request.params);
        let Some(state) = result.last_state() else {
            continue;
        };

        if alert.last_state != Some(state) {
            let message = alert_message(&alert.symbol, state);
            let subject = alert_subject(&alert.symbol);
            for channel in &alert.channels {
                if let Err(e) = notifier.send(channel, &subject, &message) {
                    log::error!("{}: {}", alert.symbol, e);
                }
            }
            log::info!("{message}");
            events.push(AlertEvent {
                symbol: alert.symbol.clone(),
                previous: alert.last_state,
                state,
                at: now,
                message,
            });
        }

        alert.last_state = Some(state);
        alert.last_checked = Some(now);
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::candle::Candle;
    use crate::domain::error::HacoError;
    use chrono::NaiveDate;
    use std::cell::RefCell;
    use std::collections::HashMap;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    struct StubCandles {
        data: HashMap<String, Vec<Candle<NaiveDateTime>>>,
    }

    impl CandlePort for StubCandles {
        fn fetch_candles(
            &self,
            symbol: &str,
            _timeframe: &str,
            _lookback: usize,
        ) -> Result<Vec<Candle<NaiveDateTime>>, HacoError> {
            self.data.get(symbol).cloned().ok_or_else(|| HacoError::DataSource {
                reason: format!("unknown symbol {symbol}"),
            })
        }

        fn list_symbols(&self, _timeframe: &str) -> Result<Vec<String>, HacoError> {
            Ok(self.data.keys().cloned().collect())
        }
    }

    #[derive(Default)]
    struct Recorder {
        sent: RefCell<Vec<(Channel, String, String)>>,
        fail: bool,
    }

    impl NotifyPort for Recorder {
        fn send(&self, channel: &Channel, subject: &str, body: &str) -> Result<(), HacoError> {
            if self.fail {
                return Err(HacoError::Notify {
                    channel: channel.kind().into(),
                    reason: "down".into(),
                });
            }
            self.sent
                .borrow_mut()
                .push((channel.clone(), subject.to_string(), body.to_string()));
            Ok(())
        }
    }

    fn one_bar(close: f64) -> Vec<Candle<NaiveDateTime>> {
        vec![Candle::new(at(0, 0), 100.0, 101.0, 99.0, close)]
    }

    fn request() -> WatchRequest {
        WatchRequest {
            timeframe: "Day".into(),
            lookback: 500,
            params: HacoParams::default(),
        }
    }

    #[test]
    fn due_after_frequency_elapsed() {
        let mut alert = HacoAlert::new("AAPL", 15, vec![]);
        assert!(alert.is_due(at(9, 0)));
        alert.last_checked = Some(at(9, 0));
        assert!(!alert.is_due(at(9, 14)));
        assert!(alert.is_due(at(9, 15)));
    }

    #[test]
    fn oversized_frequency_does_not_panic() {
        let mut alert = HacoAlert::new("AAPL", i64::MAX, vec![]);
        assert!(alert.is_due(at(9, 0)));
        alert.last_checked = Some(at(9, 0));
        assert!(!alert.is_due(at(9, 0)));
        assert!(!alert.is_due(at(23, 59)));
    }

    #[test]
    fn first_observation_notifies_every_channel() {
        let data = StubCandles {
            data: HashMap::from([("AAPL".to_string(), one_bar(100.5))]),
        };
        let notifier = Recorder::default();
        let mut alerts = vec![HacoAlert::new(
            "AAPL",
            15,
            vec![Channel::Email("a@example.com".into()), Channel::Sms("+100".into())],
        )];
        let mut engine = CachedEngine::new(4);

        let events = check_alerts(&mut alerts, &data, &notifier, &mut engine, &request(), at(9, 0));

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].state, TrendState::Bullish);
        assert_eq!(events[0].previous, None);
        let sent = notifier.sent.borrow();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].1, "AAPL HACO Alert");
        assert_eq!(sent[0].2, "HACO state for AAPL changed to 1");
        assert_eq!(alerts[0].last_state, Some(TrendState::Bullish));
        assert_eq!(alerts[0].last_checked, Some(at(9, 0)));
    }

    #[test]
    fn unchanged_state_is_silent() {
        let data = StubCandles {
            data: HashMap::from([("AAPL".to_string(), one_bar(100.5))]),
        };
        let notifier = Recorder::default();
        let mut alerts = vec![HacoAlert::new("AAPL", 15, vec![Channel::Sms("+100".into())])];
        alerts[0].last_state = Some(TrendState::Bullish);
        let mut engine = CachedEngine::new(4);

        let events = check_alerts(&mut alerts, &data, &notifier, &mut engine, &request(), at(9, 0));
        assert!(events.is_empty());
        assert!(notifier.sent.borrow().is_empty());
        assert_eq!(alerts[0].last_checked, Some(at(9, 0)));
    }

    #[test]
    fn not_due_alert_is_skipped() {
        let data = StubCandles {
            data: HashMap::from([("AAPL".to_string(), one_bar(99.0))]),
        };
        let notifier = Recorder::default();
        let mut alerts = vec![HacoAlert::new("AAPL", 15, vec![])];
        alerts[0].last_checked = Some(at(9, 0));
        alerts[0].last_state = Some(TrendState::Bullish);
        let mut engine = CachedEngine::new(4);

        let events = check_alerts(&mut alerts, &data, &notifier, &mut engine, &request(), at(9, 5));
        assert!(events.is_empty());
        assert_eq!(alerts[0].last_checked, Some(at(9, 0)));
    }

    #[test]
    fn data_error_leaves_record_untouched() {
        let data = StubCandles { data: HashMap::new() };
        let notifier = Recorder::default();
        let mut alerts = vec![HacoAlert::new("MISSING", 15, vec![])];
        let mut engine = CachedEngine::new(4);

        let events = check_alerts(&mut alerts, &data, &notifier, &mut engine, &request(), at(9, 0));
        assert!(events.is_empty());
        assert_eq!(alerts[0].last_checked, None);
    }

    #[test]
    fn empty_window_is_skipped() {
        let data = StubCandles {
            data: HashMap::from([("AAPL".to_string(), vec![])]),
        };
        let notifier = Recorder::default();
        let mut alerts = vec![HacoAlert::new("AAPL", 15, vec![])];
        let mut engine = CachedEngine::new(4);

        let events = check_alerts(&mut alerts, &data, &notifier, &mut engine, &request(), at(9, 0));
        assert!(events.is_empty());
        assert_eq!(alerts[0].last_state, None);
    }

    #[test]
    fn delivery_failure_still_records_state() {
        let data = StubCandles {
            data: HashMap::from([("AAPL".to_string(), one_bar(99.0))]),
        };
        let notifier = Recorder {
            fail: true,
            ..Recorder::default()
        };
        let mut alerts = vec![HacoAlert::new("AAPL", 15, vec![Channel::Email("x@y".into())])];
        let mut engine = CachedEngine::new(4);

        let events = check_alerts(&mut alerts, &data, &notifier, &mut engine, &request(), at(9, 0));
        assert_eq!(events.len(), 1);
        assert_eq!(alerts[0].last_state, Some(TrendState::Bearish));
    }
}
