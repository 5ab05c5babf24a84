//! Receipt line, day × category matrix and cell drill-down commands

use anyhow::Result;
use paragon_core::{
    build_pivot, filter_flats, flatten, get_cell_meta, get_column_totals, CellMeta, Dataset,
    FlatRecord, Preferences,
};

use super::core::{parse_date, receipt_filter, typed_filter};
use super::truncate;
use crate::cli::FilterArgs;

/// Day × category matrix ready for printing
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixView {
    pub days: Vec<String>,
    /// Category keys in column order
    pub categories: Vec<String>,
    /// Column headers, same order as `categories`
    pub labels: Vec<String>,
    /// One row per day, one value per category
    pub cells: Vec<Vec<f64>>,
    pub row_totals: Vec<f64>,
    pub column_totals: Vec<f64>,
    pub grand_total: f64,
}

/// One receipt contributing to a matrix cell
#[derive(Debug, Clone, PartialEq)]
pub struct CellReceipt {
    pub id: i64,
    pub shop: String,
    /// Payer name, `(none)` when the receipt has no payer
    pub payer: String,
    /// Part of the cell value coming from this receipt
    pub amount: f64,
}

/// Cell drill-down: totals, shop breakdown and contributing receipts
#[derive(Debug, Clone, PartialEq)]
pub struct CellView {
    pub meta: CellMeta,
    pub receipts: Vec<CellReceipt>,
}

/// Filtered receipt lines, optionally narrowed by a shop/category query
pub fn flat_records(
    dataset: &Dataset,
    filter: &FilterArgs,
    query: Option<&str>,
) -> Result<Vec<FlatRecord>> {
    let receipts = receipt_filter(filter)?.apply(&dataset.receipts);
    let flats = flatten(&receipts);
    Ok(match query {
        Some(q) => filter_flats(&flats, q),
        None => flats,
    })
}

pub fn cmd_flatten(
    dataset: &Dataset,
    filter: &FilterArgs,
    query: Option<&str>,
    json: bool,
) -> Result<()> {
    let flats = flat_records(dataset, filter, query)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&flats)?);
        return Ok(());
    }

    if flats.is_empty() {
        println!("No receipt lines found.");
        return Ok(());
    }

    println!();
    println!(
        "   {:>7} │ {:10} │ {:20} │ {:20} │ {:>10}",
        "Receipt", "Date", "Shop", "Category", "Amount"
    );
    println!("   ────────┼────────────┼──────────────────────┼──────────────────────┼───────────");
    for flat in &flats {
        println!(
            "   {:>7} │ {:10} │ {:20} │ {:20} │ {:>10.2}",
            flat.receipt_id,
            flat.date_display,
            truncate(&flat.shop, 20),
            truncate(&flat.category, 20),
            flat.amount
        );
    }
    println!();
    println!("   {} line(s)", flats.len());

    Ok(())
}

/// Build the matrix for the selected receipts
///
/// Columns follow the preferred order of the selected transaction type
/// (expenses when none is given), with headers taken from the labels.
pub fn matrix_view(
    dataset: &Dataset,
    prefs: &Preferences,
    filter: &FilterArgs,
    query: Option<&str>,
) -> Result<MatrixView> {
    let (receipt_filter, transaction_type) = typed_filter(filter)?;
    let receipts = receipt_filter.apply(&dataset.receipts);
    let flats = flatten(&receipts);
    let flats = match query {
        Some(q) => filter_flats(&flats, q),
        None => flats,
    };
    let pivot = build_pivot(&flats);

    let categories = prefs.order_categories(&pivot.categories, transaction_type);
    let labels = categories.iter().map(|c| prefs.label(c)).collect();
    let cells = pivot
        .days
        .iter()
        .map(|day| {
            categories
                .iter()
                .map(|c| pivot.value(day, c))
                .collect::<Vec<f64>>()
        })
        .collect();
    let row_totals = pivot.days.iter().map(|day| pivot.row_total(day)).collect();
    let column_totals = get_column_totals(&pivot, &categories);

    Ok(MatrixView {
        days: pivot.days.clone(),
        categories,
        labels,
        cells,
        row_totals,
        column_totals,
        grand_total: pivot.grand_total(),
    })
}

pub fn cmd_matrix(
    dataset: &Dataset,
    prefs: &Preferences,
    filter: &FilterArgs,
    query: Option<&str>,
) -> Result<()> {
    let view = matrix_view(dataset, prefs, filter, query)?;

    if view.days.is_empty() {
        println!("No receipts found.");
        return Ok(());
    }

    let header: String = view
        .labels
        .iter()
        .map(|l| format!(" │ {:>12}", truncate(l, 12)))
        .collect();
    let rule: String = view.labels.iter().map(|_| "─┼─────────────").collect();

    println!();
    println!("   {:10}{} │ {:>10}", "Day", header, "Total");
    println!("   ──────────{}─┼───────────", rule);

    for ((day, cells), total) in view.days.iter().zip(&view.cells).zip(&view.row_totals) {
        let row: String = cells
            .iter()
            .map(|v| {
                if *v == 0.0 {
                    format!(" │ {:>12}", "")
                } else {
                    format!(" │ {:>12.2}", v)
                }
            })
            .collect();
        let day = if day.is_empty() { "(no date)" } else { day.as_str() };
        println!("   {:10}{} │ {:>10.2}", day, row, total);
    }

    let totals: String = view
        .column_totals
        .iter()
        .map(|v| format!(" │ {:>12.2}", v))
        .collect();
    println!("   ──────────{}─┼───────────", rule);
    println!("   {:10}{} │ {:>10.2}", "Total", totals, view.grand_total);

    Ok(())
}

/// Drill-down of one (day, category) cell
pub fn cell_view(
    dataset: &Dataset,
    filter: &FilterArgs,
    day: &str,
    category: &str,
) -> Result<CellView> {
    let day = parse_date(day, "day")?.to_string();
    let (receipt_filter, _) = typed_filter(filter)?;
    let receipts = receipt_filter.apply(&dataset.receipts);
    let pivot = build_pivot(&flatten(&receipts));
    let meta = get_cell_meta(&pivot, &day, category);

    let people = dataset.people_index();
    let by_receipt = pivot
        .amount_by_receipt_in_cell
        .get(&day)
        .and_then(|row| row.get(category));
    let receipts = meta
        .ids
        .iter()
        .map(|&id| {
            let payer = dataset
                .receipt(id)
                .and_then(|r| r.payer)
                .map(|p| match people.get(p) {
                    Some(person) => person.name.clone(),
                    None => format!("#{}", p),
                })
                .unwrap_or_else(|| "(none)".to_string());
            CellReceipt {
                id,
                shop: pivot.shop_of(id).unwrap_or_default().to_string(),
                payer,
                amount: by_receipt
                    .and_then(|amounts| amounts.get(&id))
                    .copied()
                    .unwrap_or(0.0),
            }
        })
        .collect();

    Ok(CellView { meta, receipts })
}

pub fn cmd_cell(
    dataset: &Dataset,
    prefs: &Preferences,
    filter: &FilterArgs,
    day: &str,
    category: &str,
) -> Result<()> {
    let view = cell_view(dataset, filter, day, category)?;

    println!();
    println!("📅 {} · {}", day, prefs.label(category));
    println!("   ─────────────────────────────────────────────");

    if view.meta.ids.is_empty() {
        println!("   Nothing in this cell.");
        return Ok(());
    }

    println!("   Total: {:.2}", view.meta.value);
    println!();
    println!("   {:25} │ {:>10}", "Shop", "Amount");
    println!("   ──────────────────────────┼───────────");
    for share in &view.meta.shops {
        println!("   {:25} │ {:>10.2}", truncate(&share.shop, 25), share.amount);
    }

    println!();
    println!("   {:>7} │ {:20} │ {:15} │ {:>10}", "Receipt", "Shop", "Paid by", "Amount");
    println!("   ────────┼──────────────────────┼─────────────────┼───────────");
    for receipt in &view.receipts {
        println!(
            "   {:>7} │ {:20} │ {:15} │ {:>10.2}",
            format!("#{}", receipt.id),
            truncate(&receipt.shop, 20),
            truncate(&receipt.payer, 15),
            receipt.amount
        );
    }

    Ok(())
}
