//! Receipt datasets and fetch filters
//!
//! A dataset is the JSON the backend hands to the client: the household's
//! people and a list of receipts. [`ReceiptFilter`] mirrors the backend's
//! receipt query so the same selection can be made locally.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::flatten::parse_date_prefix;
use crate::models::{PeopleIndex, Person, Receipt, TransactionType};

/// People and receipts as exported by the backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub people: Vec<Person>,
    #[serde(default)]
    pub receipts: Vec<Receipt>,
}

impl Dataset {
    /// Parse a dataset from JSON text
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load a dataset file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::NotFound(format!("Dataset {}", path.display())));
        }
        let content = fs::read_to_string(path)?;
        let dataset = Self::from_json(&content)?;
        debug!(
            path = %path.display(),
            people = dataset.people.len(),
            receipts = dataset.receipts.len(),
            "Loaded dataset"
        );
        Ok(dataset)
    }

    /// Write the dataset as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn people_index(&self) -> PeopleIndex {
        PeopleIndex::new(&self.people)
    }

    pub fn receipt(&self, id: i64) -> Option<&Receipt> {
        self.receipts.iter().find(|r| r.id == id)
    }
}

/// Receipt selection, the same shape the backend accepts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReceiptFilter {
    #[serde(default)]
    pub date_from: Option<NaiveDate>,
    #[serde(default)]
    pub date_to: Option<NaiveDate>,
    /// Keep receipts with at least one item owned by one of these people
    #[serde(default)]
    pub owners: Option<Vec<i64>>,
    /// Keep receipts with at least one item in one of these categories
    #[serde(default)]
    pub categories: Option<Vec<String>>,
    #[serde(default)]
    pub transaction_type: Option<TransactionType>,
}

impl ReceiptFilter {
    /// Whether a receipt passes every set criterion
    pub fn matches(&self, receipt: &Receipt) -> bool {
        if self
            .transaction_type
            .is_some_and(|tt| tt != receipt.transaction_type)
        {
            return false;
        }

        if self.date_from.is_some() || self.date_to.is_some() {
            let Some(date) = receipt.payment_date.as_deref().and_then(parse_date_prefix) else {
                return false;
            };
            if self.date_from.is_some_and(|from| date < from)
                || self.date_to.is_some_and(|to| date > to)
            {
                return false;
            }
        }

        receipt.items.iter().any(|item| {
            let category_ok = self
                .categories
                .as_ref()
                .map_or(true, |cats| cats.contains(&item.category));
            let owner_ok = self
                .owners
                .as_ref()
                .map_or(true, |owners| item.owners.iter().any(|o| owners.contains(o)));
            category_ok && owner_ok
        }) || (receipt.items.is_empty() && self.categories.is_none() && self.owners.is_none())
    }

    /// Receipts passing the filter, in input order
    pub fn apply(&self, receipts: &[Receipt]) -> Vec<Receipt> {
        receipts
            .iter()
            .filter(|r| self.matches(r))
            .cloned()
            .collect()
    }
}
