//! Simple moving average over trailing closes.
//!
//! The window covers the trailing `period` *present* closes; rows with no
//! close receive `None` and do not consume window slots. Undefined (`None`)
//! until `period` closes exist, per the no-misleading-zero rule.

use crate::domain::ohlcv::PricePoint;
use std::collections::VecDeque;

pub fn calculate_sma(points: &[PricePoint], period: usize) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(points.len());
    if period == 0 {
        out.resize(points.len(), None);
        return out;
    }

    let mut window: VecDeque<f64> = VecDeque::with_capacity(period);
    let mut sum = 0.0;

    for point in points {
        let Some(close) = point.close else {
            out.push(None);
            continue;
        };

        window.push_back(close);
        sum += close;
        if window.len() > period {
            sum -= window.pop_front().unwrap_or(0.0);
        }

        if window.len() == period {
            out.push(Some(sum / period as f64));
        } else {
            out.push(None);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn close_series(closes: &[f64]) -> Vec<PricePoint> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                let date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
                    + chrono::Days::new(i as u64);
                PricePoint::close_only(date, c)
            })
            .collect()
    }

    #[test]
    fn undefined_until_period_closes_exist() {
        let points = close_series(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let sma = calculate_sma(&points, 3);
        assert_eq!(sma[0], None);
        assert_eq!(sma[1], None);
        assert_relative_eq!(sma[2].unwrap(), 2.0);
        assert_relative_eq!(sma[3].unwrap(), 3.0);
        assert_relative_eq!(sma[4].unwrap(), 4.0);
    }

    #[test]
    fn equals_arithmetic_mean_of_trailing_window() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + (i as f64) * 0.5).collect();
        let points = close_series(&closes);
        let sma = calculate_sma(&points, 20);
        for i in 19..30 {
            let expected: f64 = closes[i + 1 - 20..=i].iter().sum::<f64>() / 20.0;
            assert_relative_eq!(sma[i].unwrap(), expected, epsilon = 1e-10);
        }
    }

    #[test]
    fn missing_close_yields_none_without_breaking_window() {
        let mut points = close_series(&[1.0, 2.0, 3.0, 4.0]);
        points[2].close = None;
        let sma = calculate_sma(&points, 3);
        assert_eq!(sma[2], None);
        // Window is over present closes: 1, 2, 4.
        assert_relative_eq!(sma[3].unwrap(), (1.0 + 2.0 + 4.0) / 3.0);
    }

    #[test]
    fn zero_period_always_undefined() {
        let points = close_series(&[1.0, 2.0]);
        assert_eq!(calculate_sma(&points, 0), vec![None, None]);
    }
}
