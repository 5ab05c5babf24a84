//! Daily series and trend command

use anyhow::Result;
use paragon_core::{
    build_pivot, cumulative, daily_series, fill_missing_days, flatten, linear_trend, Dataset,
    DayPoint,
};

use super::core::typed_filter;
use crate::cli::FilterArgs;

/// Daily totals (or running totals) for the selected categories
///
/// Every calendar day between the first and last receipt gets a point, so
/// the trend slope is per day.
pub fn trend_series(
    dataset: &Dataset,
    filter: &FilterArgs,
    categories: &[String],
    running: bool,
) -> Result<Vec<DayPoint>> {
    let (receipt_filter, _) = typed_filter(filter)?;
    let receipts = receipt_filter.apply(&dataset.receipts);
    let pivot = build_pivot(&flatten(&receipts));

    // Undated lines have no place on a time axis
    let dated: Vec<DayPoint> = daily_series(&pivot, categories)
        .into_iter()
        .filter(|p| !p.day.is_empty())
        .collect();
    let series = fill_missing_days(&dated);

    Ok(if running { cumulative(&series) } else { series })
}

pub fn cmd_trend(
    dataset: &Dataset,
    filter: &FilterArgs,
    categories: &[String],
    running: bool,
) -> Result<()> {
    let series = trend_series(dataset, filter, categories, running)?;

    if series.is_empty() {
        println!("No dated receipts found.");
        return Ok(());
    }

    let values: Vec<f64> = series.iter().map(|p| p.amount).collect();
    let trend = linear_trend(&values);

    println!();
    println!(
        "   {:10} │ {:>10} │ {:>10}",
        "Day",
        if running { "Running" } else { "Amount" },
        "Trend"
    );
    println!("   ───────────┼────────────┼───────────");
    for (x, point) in series.iter().enumerate() {
        let fitted = trend
            .map(|t| format!("{:>10.2}", t.at(x)))
            .unwrap_or_default();
        println!("   {:10} │ {:>10.2} │ {}", point.day, point.amount, fitted);
    }

    if let Some(trend) = trend {
        println!();
        println!("   Slope: {:+.2} per day", trend.slope);
    }

    Ok(())
}
