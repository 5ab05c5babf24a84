//! Configurable pivot engine
//!
//! General form of the day × category pivot: receipts are filtered, their
//! items expanded into per-owner contributions when owners matter, bucketed
//! by a time grain, grouped by any ordered combination of category, shop,
//! payer and owner, measured, sorted and truncated.
//!
//! ## Owner allocation
//!
//! Contributions are expanded per owner only when the owner dimension is
//! grouped or an owner allow-list is set. Otherwise each item counts once with
//! its full value, so an item with no owners still shows up in category, shop
//! and payer views.
//!
//! `split_even` divides an item across all of its owners. `full_value` gives
//! every owner the whole amount, which answers "how much did this touch X"
//! but counts shared money more than once; [`PivotResult::double_counted`]
//! reports when that happened.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::flatten::{amount_loose, parse_date_prefix};
use crate::models::{Item, PeopleIndex, Receipt, TransactionType};
use crate::ordering::compare_pl;

/// Default number of rows returned
pub const DEFAULT_LIMIT: usize = 20;
/// Largest accepted row limit
pub const MAX_LIMIT: usize = 500;

/// A grouping dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Category,
    Shop,
    Payer,
    Owner,
}

impl Dimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Shop => "shop",
            Self::Payer => "payer",
            Self::Owner => "owner",
        }
    }
}

impl std::str::FromStr for Dimension {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "category" => Ok(Self::Category),
            "shop" => Ok(Self::Shop),
            "payer" => Ok(Self::Payer),
            "owner" => Ok(Self::Owner),
            _ => Err(format!(
                "Unknown dimension: {} (valid: category, shop, payer, owner)",
                s
            )),
        }
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Time bucket applied on top of the dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimeGrain {
    #[default]
    None,
    Day,
    Week,
    Month,
    Year,
}

impl TimeGrain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }

    /// Bucket key of a date; undated receipts share the empty bucket
    pub fn bucket(&self, date: Option<NaiveDate>) -> String {
        let Some(date) = date else {
            return String::new();
        };
        match self {
            Self::None => String::new(),
            Self::Day => date.format("%Y-%m-%d").to_string(),
            Self::Week => {
                let week = date.iso_week();
                format!("{}-W{:02}", week.year(), week.week())
            }
            Self::Month => date.format("%Y-%m").to_string(),
            Self::Year => date.format("%Y").to_string(),
        }
    }
}

impl std::str::FromStr for TimeGrain {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            _ => Err(format!(
                "Unknown time grain: {} (valid: none, day, week, month, year)",
                s
            )),
        }
    }
}

/// Aggregate computed per group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Measure {
    #[default]
    Sum,
    Count,
    Avg,
}

impl Measure {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Count => "count",
            Self::Avg => "avg",
        }
    }
}

impl std::str::FromStr for Measure {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sum" => Ok(Self::Sum),
            "count" => Ok(Self::Count),
            "avg" | "average" => Ok(Self::Avg),
            _ => Err(format!("Unknown measure: {} (valid: sum, count, avg)", s)),
        }
    }
}

/// How a shared item is attributed to its owners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OwnerAllocation {
    /// Each owner gets value / number of owners
    #[default]
    SplitEven,
    /// Each owner gets the full value
    FullValue,
}

impl OwnerAllocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SplitEven => "split_even",
            Self::FullValue => "full_value",
        }
    }

    /// Share of `value` attributed to one of `owners` owners
    pub fn share(&self, value: f64, owners: usize) -> f64 {
        match self {
            Self::SplitEven if owners > 0 => value / owners as f64,
            Self::SplitEven => 0.0,
            Self::FullValue => value,
        }
    }
}

impl std::str::FromStr for OwnerAllocation {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "split_even" => Ok(Self::SplitEven),
            "full_value" => Ok(Self::FullValue),
            _ => Err(format!(
                "Unknown owner allocation: {} (valid: split_even, full_value)",
                s
            )),
        }
    }
}

/// Field rows are ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    /// The measured value
    #[default]
    Value,
    Count,
    /// Group keys then period, alphabetically
    Key,
}

impl std::str::FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "value" => Ok(Self::Value),
            "count" => Ok(Self::Count),
            "key" => Ok(Self::Key),
            _ => Err(format!("Unknown sort field: {} (valid: value, count, key)", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    Asc,
    #[default]
    Desc,
}

impl std::str::FromStr for SortDir {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(format!("Unknown sort direction: {} (valid: asc, desc)", s)),
        }
    }
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

/// A user-configured aggregation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotSpec {
    #[serde(default)]
    pub transaction_type: Option<TransactionType>,
    /// Inclusive lower bound on the payment date
    #[serde(default)]
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper bound on the payment date
    #[serde(default)]
    pub date_to: Option<NaiveDate>,
    #[serde(default)]
    pub group_by: Vec<Dimension>,
    #[serde(default)]
    pub time_grain: TimeGrain,
    #[serde(default)]
    pub measure: Measure,
    #[serde(default)]
    pub owner_allocation: OwnerAllocation,
    #[serde(default)]
    pub categories: Option<Vec<String>>,
    #[serde(default)]
    pub shops: Option<Vec<String>>,
    #[serde(default)]
    pub payers: Option<Vec<i64>>,
    #[serde(default)]
    pub owners: Option<Vec<i64>>,
    #[serde(default)]
    pub sort_by: SortBy,
    #[serde(default)]
    pub sort_dir: SortDir,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl Default for PivotSpec {
    fn default() -> Self {
        Self {
            transaction_type: None,
            date_from: None,
            date_to: None,
            group_by: Vec::new(),
            time_grain: TimeGrain::None,
            measure: Measure::Sum,
            owner_allocation: OwnerAllocation::SplitEven,
            categories: None,
            shops: None,
            payers: None,
            owners: None,
            sort_by: SortBy::Value,
            sort_dir: SortDir::Desc,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PivotSpec {
    /// Row limit clamped to [1, MAX_LIMIT]
    pub fn effective_limit(&self) -> usize {
        self.limit.clamp(1, MAX_LIMIT)
    }

    fn has_date_range(&self) -> bool {
        self.date_from.is_some() || self.date_to.is_some()
    }

    fn accepts_receipt(&self, receipt: &Receipt, date: Option<NaiveDate>) -> bool {
        if let Some(tt) = self.transaction_type {
            if receipt.transaction_type != tt {
                return false;
            }
        }

        if self.has_date_range() {
            let Some(date) = date else {
                return false;
            };
            if self.date_from.is_some_and(|from| date < from) {
                return false;
            }
            if self.date_to.is_some_and(|to| date > to) {
                return false;
            }
        }

        if let Some(shops) = &self.shops {
            if !shops.iter().any(|s| s == &receipt.shop) {
                return false;
            }
        }

        if let Some(payers) = &self.payers {
            match receipt.payer {
                Some(payer) if payers.contains(&payer) => {}
                _ => return false,
            }
        }

        true
    }

    fn accepts_item(&self, item: &Item) -> bool {
        match &self.categories {
            Some(categories) => categories.iter().any(|c| c == &item.category),
            None => true,
        }
    }

    fn accepts_owner(&self, owner: i64) -> bool {
        match &self.owners {
            Some(owners) => owners.contains(&owner),
            None => true,
        }
    }
}

/// One aggregated group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotRow {
    /// Raw keys, aligned with [`PivotResult::dimensions`]
    pub keys: Vec<String>,
    /// Display labels (person names instead of ids)
    pub labels: Vec<String>,
    /// Time bucket, `None` when the grain is `none`
    pub period: Option<String>,
    /// The measured value
    pub value: f64,
    pub sum: f64,
    /// Contributing item rows
    pub count: usize,
}

/// Output of [`compute_pivot`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotResult {
    pub dimensions: Vec<Dimension>,
    pub time_grain: TimeGrain,
    pub measure: Measure,
    pub rows: Vec<PivotRow>,
    /// Number of groups before truncation
    pub total_groups: usize,
    /// Sum over all groups before truncation
    pub total: f64,
    /// Shared items were attributed in full to more than one owner
    pub double_counted: bool,
}

struct Group {
    keys: Vec<String>,
    labels: Vec<String>,
    period: String,
    sum: f64,
    items: HashSet<(usize, usize)>,
}

/// Groups in first-appearance order
#[derive(Default)]
struct Groups {
    groups: Vec<Group>,
    index: HashMap<(Vec<String>, String), usize>,
}

impl Groups {
    fn add(
        &mut self,
        keys: Vec<String>,
        labels: Vec<String>,
        period: &str,
        amount: f64,
        item: (usize, usize),
    ) {
        let lookup = (keys, period.to_string());
        let idx = match self.index.get(&lookup) {
            Some(&idx) => idx,
            None => {
                let idx = self.groups.len();
                self.groups.push(Group {
                    keys: lookup.0.clone(),
                    labels,
                    period: lookup.1.clone(),
                    sum: 0.0,
                    items: HashSet::new(),
                });
                self.index.insert(lookup, idx);
                idx
            }
        };

        let group = &mut self.groups[idx];
        group.sum += amount;
        group.items.insert(item);
    }
}

fn person_key(id: Option<i64>) -> String {
    id.map(|id| id.to_string()).unwrap_or_default()
}

fn person_label(id: Option<i64>, people: &PeopleIndex) -> String {
    match id {
        Some(id) => people.label(id),
        None => "(none)".to_string(),
    }
}

fn group_key(
    dimensions: &[Dimension],
    receipt: &Receipt,
    item: &Item,
    owner: Option<i64>,
    people: &PeopleIndex,
) -> (Vec<String>, Vec<String>) {
    let mut keys = Vec::with_capacity(dimensions.len());
    let mut labels = Vec::with_capacity(dimensions.len());

    for dimension in dimensions {
        let (key, label) = match dimension {
            Dimension::Category => (item.category.clone(), item.category.clone()),
            Dimension::Shop => (receipt.shop.clone(), receipt.shop.clone()),
            Dimension::Payer => (person_key(receipt.payer), person_label(receipt.payer, people)),
            Dimension::Owner => (person_key(owner), person_label(owner, people)),
        };
        keys.push(key);
        labels.push(label);
    }

    (keys, labels)
}

/// Run a pivot spec over receipts
///
/// `people` only affects labels; ids are used as keys either way.
pub fn compute_pivot(
    receipts: &[Receipt],
    spec: &PivotSpec,
    people: Option<&PeopleIndex>,
) -> PivotResult {
    let empty = PeopleIndex::default();
    let people = people.unwrap_or(&empty);

    let owner_grouped = spec.group_by.contains(&Dimension::Owner);
    let expand_owners = owner_grouped || spec.owners.is_some();

    let mut groups = Groups::default();
    let mut double_counted = false;
    let mut accepted = 0usize;

    for (ri, receipt) in receipts.iter().enumerate() {
        let date = receipt.payment_date.as_deref().and_then(parse_date_prefix);
        if !spec.accepts_receipt(receipt, date) {
            continue;
        }
        accepted += 1;
        let period = spec.time_grain.bucket(date);

        for (ii, item) in receipt.items.iter().enumerate() {
            if !spec.accepts_item(item) {
                continue;
            }
            let value = amount_loose(&item.value);

            if !expand_owners {
                let (keys, labels) = group_key(&spec.group_by, receipt, item, None, people);
                groups.add(keys, labels, &period, value, (ri, ii));
                continue;
            }

            let share = spec.owner_allocation.share(value, item.owners.len());
            let mut attributed = 0usize;
            for &owner in &item.owners {
                if !spec.accepts_owner(owner) {
                    continue;
                }
                let (keys, labels) = group_key(&spec.group_by, receipt, item, Some(owner), people);
                groups.add(keys, labels, &period, share, (ri, ii));
                attributed += 1;
            }

            if attributed > 1 && spec.owner_allocation == OwnerAllocation::FullValue {
                double_counted = true;
            }
        }
    }

    let mut rows: Vec<PivotRow> = groups
        .groups
        .into_iter()
        .map(|g| {
            let count = g.items.len();
            let value = match spec.measure {
                Measure::Sum => g.sum,
                Measure::Count => count as f64,
                Measure::Avg if count > 0 => g.sum / count as f64,
                Measure::Avg => 0.0,
            };
            PivotRow {
                keys: g.keys,
                labels: g.labels,
                period: (spec.time_grain != TimeGrain::None).then_some(g.period),
                value,
                sum: g.sum,
                count,
            }
        })
        .collect();

    let total_groups = rows.len();
    let total = rows.iter().map(|r| r.sum).sum();

    rows.sort_by(|a, b| {
        let ord = compare_rows(a, b, spec.sort_by);
        match spec.sort_dir {
            SortDir::Asc => ord,
            SortDir::Desc => ord.reverse(),
        }
    });
    rows.truncate(spec.effective_limit());

    debug!(
        receipts = receipts.len(),
        accepted,
        groups = total_groups,
        rows = rows.len(),
        "Computed pivot"
    );

    PivotResult {
        dimensions: spec.group_by.clone(),
        time_grain: spec.time_grain,
        measure: spec.measure,
        rows,
        total_groups,
        total,
        double_counted,
    }
}

fn compare_rows(a: &PivotRow, b: &PivotRow, sort_by: SortBy) -> Ordering {
    match sort_by {
        SortBy::Value => a.value.total_cmp(&b.value),
        SortBy::Count => a.count.cmp(&b.count),
        SortBy::Key => a
            .labels
            .iter()
            .zip(&b.labels)
            .map(|(x, y)| compare_pl(x, y))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.period.cmp(&b.period)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{household, income, item, item_with_owners, paid_by, receipt, sample_dataset};

    const EPS: f64 = 1e-9;

    fn spec(group_by: &[Dimension]) -> PivotSpec {
        PivotSpec {
            group_by: group_by.to_vec(),
            ..PivotSpec::default()
        }
    }

    fn row<'a>(result: &'a PivotResult, keys: &[&str]) -> &'a PivotRow {
        result
            .rows
            .iter()
            .find(|r| r.keys == keys)
            .unwrap_or_else(|| panic!("no row for {:?}", keys))
    }

    #[test]
    fn test_split_even_conserves_item_value() {
        let receipts = vec![receipt(
            1,
            "2024-03-01",
            "Lidl",
            vec![item_with_owners("food_drinks", 30.0, &[1, 2, 3])],
        )];
        let result = compute_pivot(&receipts, &spec(&[Dimension::Owner]), None);

        assert_eq!(result.rows.len(), 3);
        let total: f64 = result.rows.iter().map(|r| r.value).sum();
        assert!((total - 30.0).abs() < EPS);
        for r in &result.rows {
            assert!((r.value - 10.0).abs() < EPS);
        }
        assert!(!result.double_counted);
    }

    #[test]
    fn test_full_value_gives_each_owner_everything() {
        let receipts = vec![receipt(
            1,
            "2024-03-01",
            "Lidl",
            vec![item_with_owners("food_drinks", 30.0, &[1, 2, 3])],
        )];
        let result = compute_pivot(
            &receipts,
            &PivotSpec {
                owner_allocation: OwnerAllocation::FullValue,
                ..spec(&[Dimension::Owner])
            },
            None,
        );

        assert_eq!(result.rows.len(), 3);
        for r in &result.rows {
            assert_eq!(r.value, 30.0);
        }
        assert_eq!(result.total, 90.0);
        assert!(result.double_counted);
    }

    #[test]
    fn test_items_without_owners_only_drop_from_owner_grouping() {
        let receipts = vec![receipt(
            1,
            "2024-03-01",
            "Lidl",
            vec![item("food_drinks", "10"), item_with_owners("food_drinks", "4", &[1])],
        )];

        let by_owner = compute_pivot(&receipts, &spec(&[Dimension::Owner]), None);
        assert_eq!(by_owner.rows.len(), 1);
        assert_eq!(by_owner.rows[0].value, 4.0);

        let by_category = compute_pivot(&receipts, &spec(&[Dimension::Category]), None);
        assert_eq!(by_category.rows.len(), 1);
        assert_eq!(by_category.rows[0].value, 14.0);
        assert_eq!(by_category.rows[0].count, 2);
    }

    #[test]
    fn test_transaction_type_filter_excludes_receipt() {
        let dataset = sample_dataset();
        let result = compute_pivot(
            &dataset.receipts,
            &PivotSpec {
                transaction_type: Some(TransactionType::Income),
                ..spec(&[Dimension::Category])
            },
            None,
        );
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0].keys, vec!["salary"]);
        assert_eq!(result.rows[0].value, 5000.0);
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let dataset = sample_dataset();
        let result = compute_pivot(
            &dataset.receipts,
            &PivotSpec {
                transaction_type: Some(TransactionType::Expense),
                date_from: NaiveDate::from_ymd_opt(2024, 3, 1),
                date_to: NaiveDate::from_ymd_opt(2024, 3, 4),
                ..spec(&[Dimension::Shop])
            },
            None,
        );
        let mut shops: Vec<&str> = result.rows.iter().map(|r| r.keys[0].as_str()).collect();
        shops.sort();
        assert_eq!(shops, vec!["Biedronka", "Lidl", "Orlen"]);
    }

    #[test]
    fn test_undated_receipts_excluded_only_with_date_range() {
        let mut undated = receipt(1, "", "Kiosk", vec![item("other", "3")]);
        undated.payment_date = None;
        let receipts = vec![undated];

        assert_eq!(compute_pivot(&receipts, &spec(&[]), None).rows.len(), 1);
        let ranged = PivotSpec {
            date_to: NaiveDate::from_ymd_opt(2030, 1, 1),
            ..spec(&[])
        };
        assert!(compute_pivot(&receipts, &ranged, None).rows.is_empty());
    }

    #[test]
    fn test_allow_lists() {
        let dataset = sample_dataset();
        let result = compute_pivot(
            &dataset.receipts,
            &PivotSpec {
                categories: Some(vec!["food_drinks".to_string()]),
                payers: Some(vec![2]),
                ..spec(&[Dimension::Shop])
            },
            None,
        );
        assert_eq!(result.rows.len(), 2);
        assert_eq!(row(&result, &["Biedronka"]).value, 15.0);
        assert_eq!(row(&result, &["Żabka"]).value, 12.99);

        let shops_only = compute_pivot(
            &dataset.receipts,
            &PivotSpec {
                shops: Some(vec!["Orlen".to_string()]),
                ..spec(&[Dimension::Category])
            },
            None,
        );
        assert_eq!(shops_only.rows.len(), 1);
        assert_eq!(shops_only.rows[0].keys, vec!["fuel"]);
    }

    #[test]
    fn test_owner_filter_attributes_share_without_owner_grouping() {
        let receipts = vec![receipt(
            1,
            "2024-03-01",
            "Lidl",
            vec![
                item_with_owners("food_drinks", "20", &[1, 2]),
                item_with_owners("chemistry", "9", &[2]),
            ],
        )];
        let result = compute_pivot(
            &receipts,
            &PivotSpec {
                owners: Some(vec![1]),
                ..spec(&[Dimension::Category])
            },
            None,
        );
        assert_eq!(result.rows.len(), 1);
        assert_eq!(row(&result, &["food_drinks"]).value, 10.0);
    }

    #[test]
    fn test_multi_dimension_keys_and_labels() {
        let people = crate::models::PeopleIndex::new(&household());
        let receipts = vec![
            paid_by(
                receipt(1, "2024-03-01", "Lidl", vec![item_with_owners("food_drinks", "20", &[1, 2])]),
                2,
            ),
            receipt(2, "2024-03-02", "Lidl", vec![item_with_owners("food_drinks", "6", &[1])]),
        ];
        let result = compute_pivot(
            &receipts,
            &spec(&[Dimension::Payer, Dimension::Owner]),
            Some(&people),
        );

        assert_eq!(result.rows.len(), 3);
        let r = row(&result, &["2", "1"]);
        assert_eq!(r.labels, vec!["Ola", "Kuba"]);
        assert_eq!(r.value, 10.0);
        assert_eq!(row(&result, &["1", "1"]).value, 6.0);
    }

    #[test]
    fn test_time_grains() {
        let date = NaiveDate::from_ymd_opt(2024, 12, 30);
        assert_eq!(TimeGrain::Day.bucket(date), "2024-12-30");
        assert_eq!(TimeGrain::Week.bucket(date), "2025-W01");
        assert_eq!(TimeGrain::Month.bucket(date), "2024-12");
        assert_eq!(TimeGrain::Year.bucket(date), "2024");
        assert_eq!(TimeGrain::None.bucket(date), "");
        assert_eq!(TimeGrain::Month.bucket(None), "");
    }

    #[test]
    fn test_month_grain_groups_by_category_and_month() {
        let receipts = vec![
            receipt(1, "2024-03-01", "Lidl", vec![item("food_drinks", "20")]),
            receipt(2, "2024-03-20", "Lidl", vec![item("food_drinks", "5")]),
            receipt(3, "2024-04-02", "Lidl", vec![item("food_drinks", "7")]),
        ];
        let result = compute_pivot(
            &receipts,
            &PivotSpec {
                time_grain: TimeGrain::Month,
                sort_by: SortBy::Key,
                sort_dir: SortDir::Asc,
                ..spec(&[Dimension::Category])
            },
            None,
        );
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.rows[0].period.as_deref(), Some("2024-03"));
        assert_eq!(result.rows[0].value, 25.0);
        assert_eq!(result.rows[1].period.as_deref(), Some("2024-04"));
    }

    #[test]
    fn test_measures() {
        let receipts = vec![
            receipt(1, "2024-03-01", "Lidl", vec![item("food_drinks", "20"), item("food_drinks", "10")]),
            receipt(2, "2024-03-02", "Lidl", vec![item("food_drinks", "3")]),
        ];
        let base = spec(&[Dimension::Category]);

        let count = compute_pivot(&receipts, &PivotSpec { measure: Measure::Count, ..base.clone() }, None);
        assert_eq!(count.rows[0].value, 3.0);

        let avg = compute_pivot(&receipts, &PivotSpec { measure: Measure::Avg, ..base }, None);
        assert!((avg.rows[0].value - 11.0).abs() < EPS);
        assert_eq!(avg.rows[0].sum, 33.0);
    }

    #[test]
    fn test_sorted_and_limited() {
        let receipts: Vec<Receipt> = (0..30)
            .map(|i| receipt(i, "2024-03-01", &format!("Shop {}", i), vec![item("x", (i % 7) as f64)]))
            .collect();

        let result = compute_pivot(&receipts, &spec(&[Dimension::Shop]), None);
        assert_eq!(result.rows.len(), DEFAULT_LIMIT);
        assert_eq!(result.total_groups, 30);
        for pair in result.rows.windows(2) {
            assert!(pair[0].value >= pair[1].value);
        }

        let asc = compute_pivot(
            &receipts,
            &PivotSpec {
                sort_by: SortBy::Count,
                sort_dir: SortDir::Asc,
                limit: 5,
                ..spec(&[Dimension::Shop])
            },
            None,
        );
        assert_eq!(asc.rows.len(), 5);
        for pair in asc.rows.windows(2) {
            assert!(pair[0].count <= pair[1].count);
        }
    }

    #[test]
    fn test_ties_keep_first_appearance_order() {
        let receipts = vec![
            receipt(1, "2024-03-01", "B", vec![item("x", "5")]),
            receipt(2, "2024-03-01", "A", vec![item("x", "5")]),
            receipt(3, "2024-03-01", "C", vec![item("x", "5")]),
        ];
        let result = compute_pivot(
            &receipts,
            &PivotSpec {
                limit: 2,
                ..spec(&[Dimension::Shop])
            },
            None,
        );
        let shops: Vec<&str> = result.rows.iter().map(|r| r.keys[0].as_str()).collect();
        assert_eq!(shops, vec!["B", "A"]);
    }

    #[test]
    fn test_limit_is_clamped() {
        assert_eq!(PivotSpec { limit: 0, ..PivotSpec::default() }.effective_limit(), 1);
        assert_eq!(PivotSpec { limit: 9000, ..PivotSpec::default() }.effective_limit(), MAX_LIMIT);
    }

    #[test]
    fn test_no_dimensions_gives_single_total_row() {
        let dataset = sample_dataset();
        let result = compute_pivot(
            &dataset.receipts,
            &PivotSpec {
                transaction_type: Some(TransactionType::Expense),
                ..PivotSpec::default()
            },
            None,
        );
        assert_eq!(result.rows.len(), 1);
        assert!(result.rows[0].keys.is_empty());
        assert!(result.rows[0].period.is_none());
        assert!((result.rows[0].value - 336.39).abs() < 1e-6);
    }

    #[test]
    fn test_spec_deserializes_with_defaults() {
        let spec: PivotSpec = serde_json::from_str(
            r#"{"group_by": ["category", "owner"], "owner_allocation": "full_value", "date_from": "2024-03-01"}"#,
        )
        .unwrap();
        assert_eq!(spec.group_by, vec![Dimension::Category, Dimension::Owner]);
        assert_eq!(spec.owner_allocation, OwnerAllocation::FullValue);
        assert_eq!(spec.limit, DEFAULT_LIMIT);
        assert_eq!(spec.sort_dir, SortDir::Desc);
        assert_eq!(spec.date_from, NaiveDate::from_ymd_opt(2024, 3, 1));
    }

    #[test]
    fn test_income_helper_is_excluded_from_expense_views() {
        let receipts = vec![
            income(1, "2024-03-01", "Employer", vec![item("salary", "100")]),
            receipt(2, "2024-03-01", "Lidl", vec![item("food_drinks", "1")]),
        ];
        let result = compute_pivot(
            &receipts,
            &PivotSpec {
                transaction_type: Some(TransactionType::Expense),
                ..spec(&[Dimension::Category])
            },
            None,
        );
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0].keys, vec!["food_drinks"]);
    }
}
