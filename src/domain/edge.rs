//! Flip detection between the two retention tracks.
//!
//! upw = !dtr & dtr[prev] & utr
//! dnw = !utr & utr[prev] & dtr

use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EdgeFlags {
    pub upw: bool,
    pub dnw: bool,
}

impl EdgeFlags {
    pub fn any(&self) -> bool {
        self.upw || self.dnw
    }
}

/// Remembers the previous bar's `utr`/`dtr` pair.
#[derive(Debug, Clone, Default)]
pub struct EdgeDetector {
    prev: Option<(bool, bool)>,
}

impl EdgeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&mut self, utr: bool, dtr: bool) -> EdgeFlags {
        let (prev_utr, prev_dtr) = self.prev.unwrap_or((utr, dtr));
        self.prev = Some((utr, dtr));

        let flags = EdgeFlags {
            upw: !dtr && prev_dtr && utr,
            dnw: !utr && prev_utr && dtr,
        };
        debug_assert!(
            !(flags.upw && flags.dnw),
            "upw and dnw fired on the same bar (utr={utr}, dtr={dtr})"
        );
        flags
    }
}
