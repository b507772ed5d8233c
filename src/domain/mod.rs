//! Core domain types and logic: the HACO trend engine and what sits around it.

pub mod candle;
pub mod params;
pub mod heikin_ashi;
pub mod indicator;
pub mod retention;
pub mod edge;
pub mod trend_state;
pub mod haco;
pub mod haco_cache;
pub mod hacolt;
pub mod alert_watch;
pub mod config_validation;
pub mod error;
