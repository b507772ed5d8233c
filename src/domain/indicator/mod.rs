//! Series indicators used by the trend engine and the HACO oscillator.
//!
//! Everything here works on plain `&[f64]` slices and returns a vector of the
//! same length, so results stay index-aligned with the candle input.

pub mod ema;
pub mod rolling;
pub mod zero_lag;

pub use ema::{ema, tema};
pub use zero_lag::{ZeroLagLines, build_zero_lag_lines, zero_lag};
