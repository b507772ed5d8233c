//! Engine parameters.

use serde::{Deserialize, Serialize};

pub const DEFAULT_LENGTH_UP: usize = 34;
pub const DEFAULT_LENGTH_DOWN: usize = 34;
pub const DEFAULT_ALERT_LOOKBACK: usize = 1;

/// Immutable configuration threaded through every pipeline stage.
///
/// Window lengths of zero are clamped to 1 by [`HacoParams::new`]; callers that
/// want to reject them do so in config validation before building params.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HacoParams {
    pub length_up: usize,
    pub length_down: usize,
    pub alert_lookback: usize,
}

impl HacoParams {
    pub fn new(length_up: usize, length_down: usize, alert_lookback: usize) -> Self {
        Self {
            length_up: length_up.max(1),
            length_down: length_down.max(1),
            alert_lookback,
        }
    }
}

impl Default for HacoParams {
    fn default() -> Self {
        Self {
            length_up: DEFAULT_LENGTH_UP,
            length_down: DEFAULT_LENGTH_DOWN,
            alert_lookback: DEFAULT_ALERT_LOOKBACK,
        }
    }
}
