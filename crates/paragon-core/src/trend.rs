//! Daily series and trend lines over a pivot

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::flatten::parse_date_prefix;
use crate::pivot::PivotMaps;

/// Total of one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPoint {
    pub day: String,
    pub amount: f64,
}

/// Least-squares line `y = slope * x + intercept` over x = 0, 1, 2, ...
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendLine {
    pub slope: f64,
    pub intercept: f64,
}

impl TrendLine {
    pub fn at(&self, x: usize) -> f64 {
        self.slope * x as f64 + self.intercept
    }

    /// Fitted values for the first `n` points
    pub fn points(&self, n: usize) -> Vec<f64> {
        (0..n).map(|x| self.at(x)).collect()
    }
}

/// Per-day totals over the given categories, every category when empty
pub fn daily_series(pivot: &PivotMaps, categories: &[String]) -> Vec<DayPoint> {
    pivot
        .days
        .iter()
        .map(|day| {
            let amount = if categories.is_empty() {
                pivot.row_total(day)
            } else {
                categories.iter().map(|c| pivot.value(day, c)).sum()
            };
            DayPoint {
                day: day.clone(),
                amount,
            }
        })
        .collect()
}

/// Insert zero points for calendar days missing between dated points
///
/// Points whose day is not a date are passed through and break the gap
/// filling around them.
pub fn fill_missing_days(series: &[DayPoint]) -> Vec<DayPoint> {
    let mut filled = Vec::with_capacity(series.len());
    let mut previous: Option<NaiveDate> = None;

    for point in series {
        let date = parse_date_prefix(&point.day);
        if let (Some(prev), Some(date)) = (previous, date) {
            let mut day = prev.succ_opt();
            while let Some(d) = day.filter(|d| *d < date) {
                filled.push(DayPoint {
                    day: d.to_string(),
                    amount: 0.0,
                });
                day = d.succ_opt();
            }
        }
        filled.push(point.clone());
        previous = date;
    }

    filled
}

/// Running total of a series
pub fn cumulative(series: &[DayPoint]) -> Vec<DayPoint> {
    let mut running = 0.0;
    series
        .iter()
        .map(|p| {
            running += p.amount;
            DayPoint {
                day: p.day.clone(),
                amount: running,
            }
        })
        .collect()
}

/// Fit a line through evenly spaced values; `None` with fewer than two
pub fn linear_trend(values: &[f64]) -> Option<TrendLine> {
    if values.len() < 2 {
        return None;
    }

    let n = values.len() as f64;
    let mean_x = (n - 1.0) / 2.0;
    let mean_y = values.iter().sum::<f64>() / n;

    let (mut cov, mut var) = (0.0, 0.0);
    for (x, y) in values.iter().enumerate() {
        let dx = x as f64 - mean_x;
        cov += dx * (y - mean_y);
        var += dx * dx;
    }

    let slope = cov / var;
    Some(TrendLine {
        slope,
        intercept: mean_y - slope * mean_x,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::flatten;
    use crate::pivot::build_pivot;
    use crate::test_utils::{item, receipt, sample_dataset};

    const EPS: f64 = 1e-9;

    #[test]
    fn test_daily_series_all_and_selected_categories() {
        let pivot = build_pivot(&flatten(&sample_dataset().receipts));

        let all = daily_series(&pivot, &[]);
        assert_eq!(all.len(), 3);
        assert!((all[0].amount - 43.4).abs() < EPS);

        let food = daily_series(&pivot, &["food_drinks".to_string()]);
        assert_eq!(food[0].amount, 35.0);
        assert_eq!(food[1].amount, 0.0);
        assert!((food[2].amount - 12.99).abs() < EPS);
    }

    #[test]
    fn test_fill_missing_days() {
        let pivot = build_pivot(&flatten(&sample_dataset().receipts));
        let filled = fill_missing_days(&daily_series(&pivot, &[]));

        assert_eq!(filled.len(), 10);
        assert_eq!(filled[0].day, "2024-03-01");
        assert_eq!(filled[1].day, "2024-03-02");
        assert_eq!(filled[1].amount, 0.0);
        assert_eq!(filled[3].day, "2024-03-04");
        assert_eq!(filled[9].day, "2024-03-10");
        let total: f64 = filled.iter().map(|p| p.amount).sum();
        assert!((total - pivot.grand_total()).abs() < EPS);
    }

    #[test]
    fn test_fill_missing_days_keeps_undated() {
        let series = vec![
            DayPoint { day: String::new(), amount: 1.0 },
            DayPoint { day: "2024-12-31".to_string(), amount: 2.0 },
            DayPoint { day: "2025-01-02".to_string(), amount: 3.0 },
        ];
        let days: Vec<String> = fill_missing_days(&series).into_iter().map(|p| p.day).collect();
        assert_eq!(days, vec!["", "2024-12-31", "2025-01-01", "2025-01-02"]);
        assert!(fill_missing_days(&[]).is_empty());
    }

    #[test]
    fn test_cumulative() {
        let receipts = vec![
            receipt(1, "2024-03-01", "A", vec![item("x", "1")]),
            receipt(2, "2024-03-02", "A", vec![item("x", "2")]),
            receipt(3, "2024-03-03", "A", vec![item("x", "3")]),
        ];
        let pivot = build_pivot(&flatten(&receipts));
        let running: Vec<f64> = cumulative(&daily_series(&pivot, &[]))
            .iter()
            .map(|p| p.amount)
            .collect();
        assert_eq!(running, vec![1.0, 3.0, 6.0]);
    }

    #[test]
    fn test_linear_trend_exact_line() {
        let line = linear_trend(&[1.0, 3.0, 5.0, 7.0]).unwrap();
        assert!((line.slope - 2.0).abs() < EPS);
        assert!((line.intercept - 1.0).abs() < EPS);
        assert!((line.at(4) - 9.0).abs() < EPS);
        assert_eq!(line.points(2).len(), 2);
    }

    #[test]
    fn test_linear_trend_flat_and_short() {
        let flat = linear_trend(&[5.0, 5.0, 5.0]).unwrap();
        assert_eq!(flat.slope, 0.0);
        assert_eq!(flat.intercept, 5.0);
        assert!(linear_trend(&[1.0]).is_none());
        assert!(linear_trend(&[]).is_none());
    }
}
