//! Zero-lag momentum lines.
//!
//! For a window length L, each source series s gets
//! tma1 = TEMA(s, L), tma2 = TEMA(tma1, L), zeroLag = tma1 + (tma1 - tma2).
//! The engine builds one set over the Heikin-Ashi close and one over the bar
//! midpoint; their difference is the momentum sign the retention rules read.

use serde::Serialize;

use crate::domain::indicator::ema::tema;

/// tma1 + (tma1 - tma2), element-wise.
pub fn zero_lag(tma1: &[f64], tma2: &[f64]) -> Vec<f64> {
    tma1.iter().zip(tma2).map(|(a, b)| a + (a - b)).collect()
}

/// One side's momentum lines, all index-aligned with the candles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZeroLagLines {
    pub length: usize,
    pub tema1: Vec<f64>,
    pub tema2: Vec<f64>,
    pub zero_lag_ha: Vec<f64>,
    pub tema1_mid: Vec<f64>,
    pub tema2_mid: Vec<f64>,
    pub zero_lag_mid: Vec<f64>,
    /// zero_lag_mid - zero_lag_ha
    pub zero_lag_diff: Vec<f64>,
}

/// A single bar's slice of [`ZeroLagLines`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MomentumPoint {
    pub tema1: f64,
    pub tema2: f64,
    #[serde(rename = "zeroLagHA")]
    pub zero_lag_ha: f64,
    pub tema1_mid: f64,
    pub tema2_mid: f64,
    pub zero_lag_mid: f64,
    pub zero_lag_diff: f64,
}

impl ZeroLagLines {
    pub fn len(&self) -> usize {
        self.zero_lag_diff.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zero_lag_diff.is_empty()
    }

    pub fn point(&self, i: usize) -> MomentumPoint {
        MomentumPoint {
            tema1: self.tema1[i],
            tema2: self.tema2[i],
            zero_lag_ha: self.zero_lag_ha[i],
            tema1_mid: self.tema1_mid[i],
            tema2_mid: self.tema2_mid[i],
            zero_lag_mid: self.zero_lag_mid[i],
            zero_lag_diff: self.zero_lag_diff[i],
        }
    }
}

pub fn build_zero_lag_lines(ha_close: &[f64], mid: &[f64], length: usize) -> ZeroLagLines {
    let length = length.max(1);

    let tema1 = tema(ha_close, length);
    let tema2 = tema(&tema1, length);
    let zero_lag_ha = zero_lag(&tema1, &tema2);

    let tema1_mid = tema(mid, length);
    let tema2_mid = tema(&tema1_mid, length);
    let zero_lag_mid = zero_lag(&tema1_mid, &tema2_mid);

    let zero_lag_diff = zero_lag_mid
        .iter()
        .zip(&zero_lag_ha)
        .map(|(m, h)| m - h)
        .collect();

    ZeroLagLines {
        length,
        tema1,
        tema2,
        zero_lag_ha,
        tema1_mid,
        tema2_mid,
        zero_lag_mid,
        zero_lag_diff,
    }
}
