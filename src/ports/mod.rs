//! Port traits: the seams between the engine and the outside world.

pub mod candle_port;
pub mod config_port;
pub mod notify_port;
