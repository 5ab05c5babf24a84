//! Domain models for Paragon

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Whether a receipt records money going out or coming in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    #[default]
    Expense,
    Income,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Income => "income",
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "expense" | "expenses" => Ok(Self::Expense),
            "income" => Ok(Self::Income),
            _ => Err(format!(
                "Unknown transaction type: {} (valid: expense, income)",
                s
            )),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raw amount of a line item as it comes from a form or the backend
///
/// The backend stores decimals as strings ("12.50"), forms may hold formulas
/// ("=2+3*4") and already validated items carry plain numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemValue {
    Number(f64),
    Text(String),
}

impl Default for ItemValue {
    fn default() -> Self {
        Self::Number(0.0)
    }
}

impl From<f64> for ItemValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for ItemValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ItemValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl std::fmt::Display for ItemValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

fn default_quantity() -> f64 {
    1.0
}

/// A categorized line within a receipt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(default)]
    pub id: i64,
    pub category: String,
    #[serde(default)]
    pub value: ItemValue,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_quantity")]
    pub quantity: f64,
    /// People sharing the cost of this line
    #[serde(default)]
    pub owners: Vec<i64>,
}

/// One purchase or income event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub id: i64,
    /// ISO date, possibly with a time suffix ("2024-03-01T10:00:00")
    #[serde(default)]
    pub payment_date: Option<String>,
    /// Person who fronted the money
    #[serde(default)]
    pub payer: Option<i64>,
    #[serde(default)]
    pub shop: String,
    #[serde(default)]
    pub transaction_type: TransactionType,
    #[serde(default)]
    pub items: Vec<Item>,
}

/// A household member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: i64,
    pub name: String,
    /// May be selected as the payer of a receipt
    #[serde(default)]
    pub payer: bool,
    /// May be selected as an owner of an item
    #[serde(default)]
    pub owner: bool,
}

/// Lookup table over the people of a household
#[derive(Debug, Clone, Default)]
pub struct PeopleIndex {
    by_id: HashMap<i64, Person>,
}

impl PeopleIndex {
    pub fn new(people: &[Person]) -> Self {
        Self {
            by_id: people.iter().map(|p| (p.id, p.clone())).collect(),
        }
    }

    pub fn get(&self, id: i64) -> Option<&Person> {
        self.by_id.get(&id)
    }

    pub fn name(&self, id: i64) -> Option<&str> {
        self.get(id).map(|p| p.name.as_str())
    }

    /// Display label for a person id, `#<id>` when unknown
    pub fn label(&self, id: i64) -> String {
        self.name(id)
            .map(str::to_string)
            .unwrap_or_else(|| format!("#{}", id))
    }

    pub fn is_payer(&self, id: i64) -> bool {
        self.get(id).is_some_and(|p| p.payer)
    }

    pub fn is_owner(&self, id: i64) -> bool {
        self.get(id).is_some_and(|p| p.owner)
    }

    /// People who may pay, ordered by id
    pub fn payers(&self) -> Vec<&Person> {
        let mut people: Vec<&Person> = self.by_id.values().filter(|p| p.payer).collect();
        people.sort_by_key(|p| p.id);
        people
    }

    /// People who may own items, ordered by id
    pub fn owners(&self) -> Vec<&Person> {
        let mut people: Vec<&Person> = self.by_id.values().filter(|p| p.owner).collect();
        people.sort_by_key(|p| p.id);
        people
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// One receipt × item row, the unit of aggregation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatRecord {
    pub receipt_id: i64,
    /// `YYYY-MM-DD`, empty when the receipt has no usable date
    pub date_key: String,
    /// `DD.MM.YYYY`, empty when the receipt has no usable date
    pub date_display: String,
    pub category: String,
    pub shop: String,
    pub amount: f64,
}
