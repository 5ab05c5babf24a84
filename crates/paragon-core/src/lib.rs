//! Paragon Core Library
//!
//! Client-side logic of the Paragon household receipt tracker:
//! - Receipt flattening into per-line records
//! - Day × category pivot with drill-down indices
//! - Configurable pivot engine (dimensions, time grain, measure, owner allocation)
//! - Amount field evaluation (`=2+3*4` formulas) and receipt validation
//! - Household balances, settlement and monthly income/expense
//! - Daily series and trend lines
//! - Display preferences (category order, labels)

pub mod balance;
pub mod dataset;
pub mod error;
pub mod expression;
pub mod flatten;
pub mod models;
pub mod ordering;
pub mod pivot;
pub mod pivot_spec;
pub mod preferences;
pub mod trend;
pub mod validation;

/// Test utilities (receipt and people builders)
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use balance::{monthly_balances, person_balances, settle, MonthBalance, PersonBalance, Transfer};
pub use dataset::{Dataset, ReceiptFilter};
pub use error::{Error, Result};
pub use expression::{
    evaluate_amount, validate_item, Evaluated, ValidatedItem, ValidationError, ValidationOutcome,
};
pub use flatten::{filter_flats, flatten};
pub use models::{FlatRecord, Item, ItemValue, PeopleIndex, Person, Receipt, TransactionType};
pub use ordering::{compare_pl, sort_categories_by_preferred_order};
pub use pivot::{build_pivot, get_cell_meta, get_column_totals, CellMeta, PivotMaps, ShopShare};
pub use pivot_spec::{
    compute_pivot, Dimension, Measure, OwnerAllocation, PivotResult, PivotRow, PivotSpec, SortBy,
    SortDir, TimeGrain,
};
pub use preferences::Preferences;
pub use trend::{
    cumulative, daily_series, fill_missing_days, linear_trend, DayPoint, TrendLine,
};
pub use validation::{validate_receipt, ReceiptValidationError};
