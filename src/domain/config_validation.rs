//! Configuration validation.
//!
//! Rejects values the engine would otherwise clamp or misread, before any
//! candles are fetched.

use crate::domain::error::HacoError;
use crate::ports::config_port::ConfigPort;

pub fn validate_haco_config(config: &dyn ConfigPort) -> Result<(), HacoError> {
    require_positive(config, "haco", "length_up")?;
    require_positive(config, "haco", "length_down")?;
    require_non_negative(config, "haco", "alert_lookback")?;
    Ok(())
}

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), HacoError> {
    match config.get_string("data", "csv_dir") {
        Some(s) if !s.trim().is_empty() => {}
        _ => {
            return Err(HacoError::ConfigMissing {
                section: "data".to_string(),
                key: "csv_dir".to_string(),
            });
        }
    }
    if let Some(tf) = config.get_string("data", "timeframe") {
        if tf.trim().is_empty() {
            return Err(HacoError::ConfigInvalid {
                section: "data".to_string(),
                key: "timeframe".to_string(),
                reason: "timeframe must not be empty".to_string(),
            });
        }
    }
    require_positive(config, "data", "lookback")?;
    Ok(())
}

pub fn validate_oscillator_config(config: &dyn ConfigPort) -> Result<(), HacoError> {
    require_positive(config, "oscillator", "length")?;
    require_positive(config, "oscillator", "smooth")?;
    Ok(())
}

pub fn validate_watch_config(config: &dyn ConfigPort) -> Result<(), HacoError> {
    if config.get_list("watch", "symbols").is_empty() {
        return Err(HacoError::ConfigMissing {
            section: "watch".to_string(),
            key: "symbols".to_string(),
        });
    }
    require_positive(config, "watch", "frequency_minutes")?;
    if let Some(minutes) = read_int(config, "watch", "frequency_minutes")? {
        if chrono::Duration::try_minutes(minutes).is_none() {
            return Err(HacoError::ConfigInvalid {
                section: "watch".to_string(),
                key: "frequency_minutes".to_string(),
                reason: format!("{minutes} minutes is out of range"),
            });
        }
    }
    require_positive(config, "watch", "poll_seconds")?;
    Ok(())
}

/// Parses an optional integer key. Missing keys yield `None`; present but
/// unparseable ones are an error rather than a silent default.
pub fn read_int(config: &dyn ConfigPort, section: &str, key: &str) -> Result<Option<i64>, HacoError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<i64>().map(Some).map_err(|_| HacoError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: format!("expected an integer, got {raw:?}"),
        }),
    }
}

fn require_positive(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), HacoError> {
    match read_int(config, section, key)? {
        Some(v) if v <= 0 => Err(HacoError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: format!("{key} must be positive"),
        }),
        _ => Ok(()),
    }
}

fn require_non_negative(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), HacoError> {
    match read_int(config, section, key)? {
        Some(v) if v < 0 => Err(HacoError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: format!("{key} must be non-negative"),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapConfig(HashMap<(String, String), String>);

    impl MapConfig {
        fn new(entries: &[(&str, &str, &str)]) -> Self {
            Self(
                entries
                    .iter()
                    .map(|(s, k, v)| ((s.to_string(), k.to_string()), v.to_string()))
                    .collect(),
            )
        }
    }

    impl ConfigPort for MapConfig {
        fn get_string(&self, section: &str, key: &str) -> Option<String> {
            self.0.get(&(section.to_string(), key.to_string())).cloned()
        }

    }

    #[test]
    fn empty_haco_section_is_valid() {
        assert!(validate_haco_config(&MapConfig::new(&[])).is_ok());
    }

    #[test]
    fn zero_length_rejected() {
        let cfg = MapConfig::new(&[("haco", "length_up", "0")]);
        let err = validate_haco_config(&cfg).unwrap_err();
        assert!(matches!(err, HacoError::ConfigInvalid { key, .. } if key == "length_up"));
    }

    #[test]
    fn negative_lookback_rejected() {
        let cfg = MapConfig::new(&[("haco", "alert_lookback", "-1")]);
        assert!(validate_haco_config(&cfg).is_err());
    }

    #[test]
    fn zero_lookback_allowed() {
        let cfg = MapConfig::new(&[("haco", "alert_lookback", "0")]);
        assert!(validate_haco_config(&cfg).is_ok());
    }

    #[test]
    fn non_numeric_is_invalid_not_defaulted() {
        let cfg = MapConfig::new(&[("haco", "length_down", "abc")]);
        let err = validate_haco_config(&cfg).unwrap_err();
        assert!(matches!(err, HacoError::ConfigInvalid { key, .. } if key == "length_down"));
    }

    #[test]
    fn data_requires_csv_dir() {
        let err = validate_data_config(&MapConfig::new(&[])).unwrap_err();
        assert!(matches!(err, HacoError::ConfigMissing { key, .. } if key == "csv_dir"));
        let ok = MapConfig::new(&[("data", "csv_dir", "/tmp"), ("data", "lookback", "200")]);
        assert!(validate_data_config(&ok).is_ok());
    }

    #[test]
    fn data_rejects_zero_lookback() {
        let cfg = MapConfig::new(&[("data", "csv_dir", "/tmp"), ("data", "lookback", "0")]);
        assert!(validate_data_config(&cfg).is_err());
    }

    #[test]
    fn watch_requires_symbols() {
        let err = validate_watch_config(&MapConfig::new(&[])).unwrap_err();
        assert!(matches!(err, HacoError::ConfigMissing { key, .. } if key == "symbols"));

        let cfg = MapConfig::new(&[("watch", "symbols", "AAPL, MSFT"), ("watch", "frequency_minutes", "0")]);
        assert!(validate_watch_config(&cfg).is_err());
    }

    #[test]
    fn watch_rejects_unrepresentable_frequency() {
        let cfg = MapConfig::new(&[
            ("watch", "symbols", "AAPL"),
            ("watch", "frequency_minutes", "9223372036854775807"),
        ]);
        let err = validate_watch_config(&cfg).unwrap_err();
        assert!(matches!(err, HacoError::ConfigInvalid { key, .. } if key == "frequency_minutes"));

        let ok = MapConfig::new(&[("watch", "symbols", "AAPL"), ("watch", "frequency_minutes", "1440")]);
        assert!(validate_watch_config(&ok).is_ok());
    }

    #[test]
    fn oscillator_lengths_positive() {
        let cfg = MapConfig::new(&[("oscillator", "smooth", "0")]);
        assert!(validate_oscillator_config(&cfg).is_err());
    }
}
