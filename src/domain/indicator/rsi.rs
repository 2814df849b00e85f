//! RSI (Relative Strength Index) over a trailing window.
//!
//! Uses Wilder's smoothing for average gain/loss:
//! - First average: simple mean of gains/losses over the first n deltas
//! - Subsequent: avg = (prev_avg * (n-1) + current) / n
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100. Output is clamped to [0, 100].
//!
//! Warmup: `None` until n deltas between present closes exist. Rows with a
//! missing close are `None` and do not contribute a delta.

use crate::domain::ohlcv::PricePoint;

pub fn calculate_rsi(points: &[PricePoint], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; points.len()];
    if period == 0 {
        return out;
    }

    let mut prev_close: Option<f64> = None;
    let mut deltas_seen = 0usize;
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;

    for (i, point) in points.iter().enumerate() {
        let Some(close) = point.close else {
            continue;
        };
        let Some(prev) = prev_close else {
            prev_close = Some(close);
            continue;
        };

        let change = close - prev;
        let gain = if change > 0.0 { change } else { 0.0 };
        let loss = if change < 0.0 { -change } else { 0.0 };
        prev_close = Some(close);
        deltas_seen += 1;

        if deltas_seen < period {
            // Accumulating toward the seed average.
            avg_gain += gain;
            avg_loss += loss;
            continue;
        } else if deltas_seen == period {
            avg_gain = (avg_gain + gain) / period as f64;
            avg_loss = (avg_loss + loss) / period as f64;
        } else {
            avg_gain = (avg_gain * (period - 1) as f64 + gain) / period as f64;
            avg_loss = (avg_loss * (period - 1) as f64 + loss) / period as f64;
        }

        let rsi = if avg_loss == 0.0 {
            100.0
        } else {
            100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
        };
        out[i] = Some(rsi.clamp(0.0, 100.0));
    }

    out
}
