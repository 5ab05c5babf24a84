//! Shared utilities: dataset and preferences loading, argument parsing

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use paragon_core::{Dataset, Preferences, ReceiptFilter, TransactionType};

use crate::cli::FilterArgs;

/// Open the dataset file
pub fn open_dataset(path: &Path) -> Result<Dataset> {
    Dataset::load(path).with_context(|| {
        format!(
            "Failed to open dataset {} (pass --data <file>)",
            path.display()
        )
    })
}

/// Load display preferences (explicit path, user override, built-in)
pub fn load_preferences(path: Option<&Path>) -> Result<Preferences> {
    Preferences::load(path).context("Failed to load preferences")
}

/// Parse a `YYYY-MM-DD` argument
pub fn parse_date(raw: &str, flag: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid --{} date: {} (use YYYY-MM-DD)", flag, raw))
}

/// Parse a transaction type argument
pub fn parse_type(raw: &str) -> Result<TransactionType> {
    raw.parse::<TransactionType>().map_err(|e| anyhow::anyhow!(e))
}

/// Build the receipt filter from `--type`, `--from` and `--to`
pub fn receipt_filter(args: &FilterArgs) -> Result<ReceiptFilter> {
    let date_from = args
        .from
        .as_deref()
        .map(|d| parse_date(d, "from"))
        .transpose()?;
    let date_to = args
        .to
        .as_deref()
        .map(|d| parse_date(d, "to"))
        .transpose()?;

    if let (Some(from), Some(to)) = (date_from, date_to) {
        if from > to {
            anyhow::bail!("--from {} is after --to {}", from, to);
        }
    }

    Ok(ReceiptFilter {
        date_from,
        date_to,
        transaction_type: args.transaction_type.as_deref().map(parse_type).transpose()?,
        ..Default::default()
    })
}

/// Receipt filter for single-type views, defaulting to expenses
pub fn typed_filter(args: &FilterArgs) -> Result<(ReceiptFilter, TransactionType)> {
    let mut filter = receipt_filter(args)?;
    let transaction_type = filter.transaction_type.unwrap_or_default();
    filter.transaction_type = Some(transaction_type);
    Ok((filter, transaction_type))
}
