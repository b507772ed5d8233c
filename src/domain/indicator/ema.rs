//! Exponential and triple-exponential moving averages.
//!
//! k = 2/(n+1), seeded with the first sample (no warmup window),
//! EMA[i] = s[i]*k + EMA[i-1]*(1-k).

/// EMA over `series`. A zero length is treated as 1 (which reproduces the input).
pub fn ema(series: &[f64], length: usize) -> Vec<f64> {
    let Some(&first) = series.first() else {
        return Vec::new();
    };

    let k = 2.0 / (length.max(1) as f64 + 1.0);
    let mut values = Vec::with_capacity(series.len());
    let mut prev = first;
    values.push(prev);

    for &price in &series[1..] {
        prev = price * k + prev * (1.0 - k);
        values.push(prev);
    }

    values
}

/// 3*EMA - 3*EMA(EMA) + EMA(EMA(EMA))
pub fn tema(series: &[f64], length: usize) -> Vec<f64> {
    let e1 = ema(series, length);
    let e2 = ema(&e1, length);
    let e3 = ema(&e2, length);

    e1.iter()
        .zip(&e2)
        .zip(&e3)
        .map(|((a, b), c)| 3.0 * a - 3.0 * b + c)
        .collect()
}
