//! Receipt flattening
//!
//! Turns receipts into one [`FlatRecord`] per line item. Aggregation views work
//! over possibly dirty data, so nothing here fails: unparseable amounts become
//! zero and unusable dates become an empty key.

use chrono::NaiveDate;
use tracing::debug;

use crate::models::{FlatRecord, ItemValue, Receipt};

/// Flatten receipts into per-line records, preserving receipt then item order
pub fn flatten(receipts: &[Receipt]) -> Vec<FlatRecord> {
    let mut flats = Vec::with_capacity(receipts.iter().map(|r| r.items.len()).sum());

    for receipt in receipts {
        let date = receipt.payment_date.as_deref().and_then(parse_date_prefix);
        let date_key = date.map(|d| d.to_string()).unwrap_or_default();
        let date_display = date
            .map(|d| d.format("%d.%m.%Y").to_string())
            .unwrap_or_default();

        for item in &receipt.items {
            flats.push(FlatRecord {
                receipt_id: receipt.id,
                date_key: date_key.clone(),
                date_display: date_display.clone(),
                category: item.category.clone(),
                shop: receipt.shop.clone(),
                amount: amount_loose(&item.value),
            });
        }
    }

    debug!(
        receipts = receipts.len(),
        records = flats.len(),
        "Flattened receipts"
    );
    flats
}

/// Parse the leading `YYYY-MM-DD` of an ISO date or datetime string
pub fn parse_date_prefix(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let prefix = raw.get(..10)?;
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}

/// Numeric value of an item for aggregation, zero when it cannot be read
pub fn amount_loose(value: &ItemValue) -> f64 {
    match value {
        ItemValue::Number(n) if n.is_finite() => *n,
        ItemValue::Number(_) => 0.0,
        ItemValue::Text(s) => parse_amount_loose(s),
    }
}

/// Lenient decimal parsing: drops whitespace, accepts a decimal comma
pub fn parse_amount_loose(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    match cleaned.parse::<f64>() {
        Ok(n) if n.is_finite() => n,
        _ => {
            if !cleaned.is_empty() {
                debug!(raw, "Unparseable amount, counting as 0");
            }
            0.0
        }
    }
}

/// Narrow records by a case-insensitive substring of the shop or category
///
/// Returns a new vector; a blank query keeps every record.
pub fn filter_flats(flats: &[FlatRecord], query: &str) -> Vec<FlatRecord> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return flats.to_vec();
    }

    flats
        .iter()
        .filter(|f| {
            f.shop.to_lowercase().contains(&query) || f.category.to_lowercase().contains(&query)
        })
        .cloned()
        .collect()
}
