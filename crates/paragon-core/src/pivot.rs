//! Day × category pivot
//!
//! [`build_pivot`] folds flat records into a matrix of sums plus the indices the
//! UI needs for drill-down: which shops and which receipts make up each cell.
//! Missing cells read as zero everywhere; none of the queries fail.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::FlatRecord;
use crate::ordering::compare_pl;

type CellMap<T> = BTreeMap<String, BTreeMap<String, T>>;

/// Aggregated day × category view over flat records
///
/// For every populated (day, category) cell the sum equals the sum of its shop
/// breakdown and the sum of its per-receipt amounts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PivotMaps {
    /// Distinct date keys, ascending
    pub days: Vec<String>,
    /// Distinct categories in Polish alphabetical order
    pub categories: Vec<String>,
    pub sum_by_day_cat: CellMap<f64>,
    pub shops_by_day_cat: CellMap<BTreeMap<String, f64>>,
    /// Distinct contributing receipts, in first-seen order
    pub receipt_ids_by_day_cat: CellMap<Vec<i64>>,
    pub amount_by_receipt_in_cell: CellMap<BTreeMap<i64, f64>>,
    pub receipt_shop: HashMap<i64, String>,
}

/// One shop's share of a cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopShare {
    pub shop: String,
    pub amount: f64,
}

/// Everything the UI shows for a single cell
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CellMeta {
    pub value: f64,
    pub ids: Vec<i64>,
    /// Largest share first
    pub shops: Vec<ShopShare>,
}

/// Build the day × category pivot in a single pass
pub fn build_pivot(flats: &[FlatRecord]) -> PivotMaps {
    let mut pivot = PivotMaps::default();
    let mut days: BTreeSet<String> = BTreeSet::new();
    let mut categories: HashSet<String> = HashSet::new();

    for flat in flats {
        let day = flat.date_key.as_str();
        let category = flat.category.as_str();

        if !days.contains(day) {
            days.insert(day.to_string());
        }
        if !categories.contains(category) {
            categories.insert(category.to_string());
        }

        *cell_entry(&mut pivot.sum_by_day_cat, day, category).or_insert(0.0) += flat.amount;

        *cell_entry(&mut pivot.shops_by_day_cat, day, category)
            .or_default()
            .entry(flat.shop.clone())
            .or_insert(0.0) += flat.amount;

        let per_receipt = cell_entry(&mut pivot.amount_by_receipt_in_cell, day, category)
            .or_default();
        let first_in_cell = !per_receipt.contains_key(&flat.receipt_id);
        *per_receipt.entry(flat.receipt_id).or_insert(0.0) += flat.amount;

        if first_in_cell {
            cell_entry(&mut pivot.receipt_ids_by_day_cat, day, category)
                .or_default()
                .push(flat.receipt_id);
        }

        pivot
            .receipt_shop
            .entry(flat.receipt_id)
            .or_insert_with(|| flat.shop.clone());
    }

    pivot.days = days.into_iter().collect();
    pivot.categories = categories.into_iter().collect();
    pivot.categories.sort_by(|a, b| compare_pl(a, b));

    debug!(
        records = flats.len(),
        days = pivot.days.len(),
        categories = pivot.categories.len(),
        "Built day x category pivot"
    );
    pivot
}

fn cell_entry<'a, T>(
    map: &'a mut CellMap<T>,
    day: &str,
    category: &str,
) -> std::collections::btree_map::Entry<'a, String, T> {
    map.entry(day.to_string())
        .or_default()
        .entry(category.to_string())
}

impl PivotMaps {
    /// Sum of one cell, zero when absent
    pub fn value(&self, day: &str, category: &str) -> f64 {
        self.sum_by_day_cat
            .get(day)
            .and_then(|row| row.get(category))
            .copied()
            .unwrap_or(0.0)
    }

    /// Sum of one day across all categories
    pub fn row_total(&self, day: &str) -> f64 {
        self.sum_by_day_cat
            .get(day)
            .map(|row| row.values().sum())
            .unwrap_or(0.0)
    }

    pub fn grand_total(&self) -> f64 {
        self.sum_by_day_cat
            .values()
            .flat_map(|row| row.values())
            .sum()
    }

    /// Shop of a receipt seen while building the pivot
    pub fn shop_of(&self, receipt_id: i64) -> Option<&str> {
        self.receipt_shop.get(&receipt_id).map(String::as_str)
    }
}

/// Value, contributing receipts and shop breakdown of one cell
pub fn get_cell_meta(pivot: &PivotMaps, day: &str, category: &str) -> CellMeta {
    let ids = pivot
        .receipt_ids_by_day_cat
        .get(day)
        .and_then(|row| row.get(category))
        .cloned()
        .unwrap_or_default();

    let mut shops: Vec<ShopShare> = pivot
        .shops_by_day_cat
        .get(day)
        .and_then(|row| row.get(category))
        .map(|by_shop| {
            by_shop
                .iter()
                .map(|(shop, amount)| ShopShare {
                    shop: shop.clone(),
                    amount: *amount,
                })
                .collect()
        })
        .unwrap_or_default();
    shops.sort_by(|a, b| {
        b.amount
            .total_cmp(&a.amount)
            .then_with(|| compare_pl(&a.shop, &b.shop))
    });

    CellMeta {
        value: pivot.value(day, category),
        ids,
        shops,
    }
}

/// Per-category totals over all days, in the order given
pub fn get_column_totals(pivot: &PivotMaps, categories: &[String]) -> Vec<f64> {
    categories
        .iter()
        .map(|category| {
            pivot
                .sum_by_day_cat
                .values()
                .filter_map(|row| row.get(category))
                .sum()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::flatten;
    use crate::test_utils::{item, receipt, sample_dataset};

    const EPS: f64 = 1e-9;

    #[test]
    fn test_two_shops_same_day_and_category() {
        let receipts = vec![
            receipt(1, "2024-03-01", "Lidl", vec![item("food_drinks", "20")]),
            receipt(2, "2024-03-01", "Biedronka", vec![item("food_drinks", "15")]),
        ];
        let pivot = build_pivot(&flatten(&receipts));

        assert_eq!(pivot.sum_by_day_cat["2024-03-01"]["food_drinks"], 35.0);
        let shops = &pivot.shops_by_day_cat["2024-03-01"]["food_drinks"];
        assert_eq!(shops.len(), 2);
        assert_eq!(shops["Lidl"], 20.0);
        assert_eq!(shops["Biedronka"], 15.0);
        assert_eq!(
            pivot.receipt_ids_by_day_cat["2024-03-01"]["food_drinks"],
            vec![1, 2]
        );
    }

    #[test]
    fn test_pivot_conservation() {
        let pivot = build_pivot(&flatten(&sample_dataset().receipts));

        for (day, row) in &pivot.sum_by_day_cat {
            for (category, sum) in row {
                let by_shop: f64 = pivot.shops_by_day_cat[day][category].values().sum();
                let by_receipt: f64 = pivot.amount_by_receipt_in_cell[day][category]
                    .values()
                    .sum();
                assert!((sum - by_shop).abs() < EPS, "{day}/{category}");
                assert!((sum - by_receipt).abs() < EPS, "{day}/{category}");
            }
        }
    }

    #[test]
    fn test_days_and_categories_sorted() {
        let pivot = build_pivot(&flatten(&sample_dataset().receipts));
        assert_eq!(
            pivot.days,
            vec!["2024-03-01", "2024-03-04", "2024-03-10"]
        );
        assert_eq!(
            pivot.categories,
            vec!["chemistry", "entertainment", "food_drinks", "fuel", "salary"]
        );
    }

    #[test]
    fn test_receipt_ids_are_distinct_per_cell() {
        let receipts = vec![receipt(
            1,
            "2024-03-01",
            "Lidl",
            vec![item("food_drinks", "2"), item("food_drinks", "3")],
        )];
        let pivot = build_pivot(&flatten(&receipts));
        let meta = get_cell_meta(&pivot, "2024-03-01", "food_drinks");
        assert_eq!(meta.ids, vec![1]);
        assert_eq!(meta.value, 5.0);
        assert_eq!(pivot.amount_by_receipt_in_cell["2024-03-01"]["food_drinks"][&1], 5.0);
    }

    #[test]
    fn test_cell_meta_sorts_shops_descending() {
        let receipts = vec![
            receipt(1, "2024-03-01", "Lidl", vec![item("food_drinks", "5")]),
            receipt(2, "2024-03-01", "Biedronka", vec![item("food_drinks", "15")]),
            receipt(3, "2024-03-01", "Żabka", vec![item("food_drinks", "9")]),
        ];
        let pivot = build_pivot(&flatten(&receipts));
        let meta = get_cell_meta(&pivot, "2024-03-01", "food_drinks");
        let shops: Vec<&str> = meta.shops.iter().map(|s| s.shop.as_str()).collect();
        assert_eq!(shops, vec!["Biedronka", "Żabka", "Lidl"]);
        assert_eq!(meta.ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_missing_cell_is_empty() {
        let pivot = build_pivot(&flatten(&sample_dataset().receipts));
        assert_eq!(get_cell_meta(&pivot, "1999-01-01", "food_drinks"), CellMeta::default());
        assert_eq!(get_cell_meta(&pivot, "2024-03-01", "nope"), CellMeta::default());
    }

    #[test]
    fn test_column_totals_agree_with_matrix() {
        let pivot = build_pivot(&flatten(&sample_dataset().receipts));
        let order = vec![
            "fuel".to_string(),
            "food_drinks".to_string(),
            "unknown".to_string(),
        ];
        let totals = get_column_totals(&pivot, &order);

        for (i, category) in order.iter().enumerate() {
            let expected: f64 = pivot.days.iter().map(|d| pivot.value(d, category)).sum();
            assert!((totals[i] - expected).abs() < EPS);
        }
        assert!((totals[1] - 47.99).abs() < EPS);
        assert_eq!(totals[2], 0.0);
    }

    #[test]
    fn test_undated_records_sort_first() {
        let mut undated = receipt(9, "", "Kiosk", vec![item("other", "1")]);
        undated.payment_date = None;
        let receipts = vec![
            receipt(1, "2024-03-01", "Lidl", vec![item("food_drinks", "1")]),
            undated,
        ];
        let pivot = build_pivot(&flatten(&receipts));
        assert_eq!(pivot.days, vec!["", "2024-03-01"]);
        assert_eq!(pivot.shop_of(9), Some("Kiosk"));
        assert_eq!(pivot.grand_total(), 2.0);
        assert_eq!(pivot.row_total("2024-03-01"), 1.0);
    }
}
