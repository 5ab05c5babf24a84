//! Configurable pivot command

use anyhow::Result;
use paragon_core::{
    compute_pivot, Dataset, Dimension, Measure, OwnerAllocation, PivotResult, PivotSpec,
    Preferences, SortBy, SortDir, TimeGrain,
};

use super::core::receipt_filter;
use super::truncate;
use crate::cli::FilterArgs;

/// Raw pivot options as given on the command line
#[derive(Debug, Clone, Default)]
pub struct PivotArgs {
    pub group_by: Vec<String>,
    pub grain: String,
    pub measure: String,
    pub allocation: String,
    pub sort: String,
    pub dir: String,
    pub limit: usize,
    pub categories: Vec<String>,
    pub shops: Vec<String>,
    pub payers: Vec<i64>,
    pub owners: Vec<i64>,
}

fn parse_arg<T>(raw: &str) -> Result<T>
where
    T: std::str::FromStr<Err = String>,
{
    raw.parse::<T>().map_err(|e| anyhow::anyhow!(e))
}

/// Empty allow-lists mean "no restriction"
fn allow_list<T: Clone>(values: &[T]) -> Option<Vec<T>> {
    (!values.is_empty()).then(|| values.to_vec())
}

/// Turn command-line options into a pivot spec
pub fn build_spec(filter: &FilterArgs, args: &PivotArgs) -> Result<PivotSpec> {
    let receipts = receipt_filter(filter)?;

    let mut group_by: Vec<Dimension> = Vec::with_capacity(args.group_by.len());
    for raw in args.group_by.iter().filter(|g| !g.trim().is_empty()) {
        let dimension = parse_arg::<Dimension>(raw)?;
        if group_by.contains(&dimension) {
            anyhow::bail!("Dimension {} given more than once", dimension);
        }
        group_by.push(dimension);
    }

    Ok(PivotSpec {
        transaction_type: receipts.transaction_type,
        date_from: receipts.date_from,
        date_to: receipts.date_to,
        group_by,
        time_grain: parse_arg::<TimeGrain>(&args.grain)?,
        measure: parse_arg::<Measure>(&args.measure)?,
        owner_allocation: parse_arg::<OwnerAllocation>(&args.allocation)?,
        categories: allow_list(&args.categories),
        shops: allow_list(&args.shops),
        payers: allow_list(&args.payers),
        owners: allow_list(&args.owners),
        sort_by: parse_arg::<SortBy>(&args.sort)?,
        sort_dir: parse_arg::<SortDir>(&args.dir)?,
        limit: args.limit,
    })
}

/// Run the pivot, showing category labels instead of keys
pub fn pivot_result(dataset: &Dataset, prefs: &Preferences, spec: &PivotSpec) -> PivotResult {
    let people = dataset.people_index();
    let mut result = compute_pivot(&dataset.receipts, spec, Some(&people));

    if let Some(pos) = result
        .dimensions
        .iter()
        .position(|d| *d == Dimension::Category)
    {
        for row in &mut result.rows {
            row.labels[pos] = prefs.label(&row.keys[pos]);
        }
    }

    result
}

pub fn cmd_pivot(
    dataset: &Dataset,
    prefs: &Preferences,
    spec: &PivotSpec,
    json: bool,
) -> Result<()> {
    let result = pivot_result(dataset, prefs, spec);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if result.rows.is_empty() {
        println!("No matching receipt lines.");
        return Ok(());
    }

    let mut headers: Vec<String> = result
        .dimensions
        .iter()
        .map(|d| d.as_str().to_string())
        .collect();
    if result.time_grain != TimeGrain::None {
        headers.push(result.time_grain.as_str().to_string());
    }

    println!();
    println!("📊 Pivot ({})", result.measure.as_str());
    println!("   ─────────────────────────────────────────────────────────────");
    let header: String = headers.iter().map(|h| format!("{:18} │ ", h)).collect();
    println!("   {}{:>10} │ {:>5}", header, "Value", "Items");

    for row in &result.rows {
        let mut cells: Vec<&str> = row.labels.iter().map(String::as_str).collect();
        if let Some(period) = &row.period {
            cells.push(if period.is_empty() { "(no date)" } else { period.as_str() });
        }
        let line: String = cells
            .iter()
            .map(|c| format!("{:18} │ ", truncate(c, 18)))
            .collect();
        println!("   {}{:>10.2} │ {:>5}", line, row.value, row.count);
    }

    println!();
    if result.total_groups > result.rows.len() {
        println!(
            "   Showing {} of {} groups (--limit to see more)",
            result.rows.len(),
            result.total_groups
        );
    }
    println!("   Total: {:.2}", result.total);
    if result.double_counted {
        println!("   ⚠ full_value allocation counts shared items once per owner");
    }

    Ok(())
}
