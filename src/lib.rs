//! HACO/HACOLT trend-state engine.
//!
//! Hexagonal architecture: the pure engine and its collaborators live in
//! [`domain`], port traits in [`ports`], concrete implementations in
//! [`adapters`], and the command-line front end in [`cli`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;

pub use domain::candle::Candle;
pub use domain::haco::{HacoBar, HacoResult, HacoSummary, compute_haco};
pub use domain::params::HacoParams;
pub use domain::trend_state::TrendState;
