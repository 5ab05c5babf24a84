//! Display preferences
//!
//! Category column order, category labels and the default pivot row limit.
//!
//! ## Configuration Resolution
//!
//! Preferences are loaded with a three-layer resolution:
//! 1. An explicit path, when given and present
//! 2. The user override (~/.config/paragon/preferences.toml on Linux)
//! 3. Embedded defaults (compiled into binary)

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::TransactionType;
use crate::ordering::sort_categories_by_preferred_order;
use crate::pivot_spec::{DEFAULT_LIMIT, MAX_LIMIT};

/// Embedded default preferences (compiled into binary)
const DEFAULT_PREFERENCES: &str = include_str!("../../../config/preferences.toml");

#[derive(Debug, Clone, PartialEq)]
pub struct Preferences {
    /// Preferred category order per transaction type
    pub category_order: HashMap<TransactionType, Vec<String>>,
    /// Category key -> display label
    pub labels: HashMap<String, String>,
    /// Row limit for pivots when none is requested
    pub default_limit: usize,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            category_order: HashMap::new(),
            labels: HashMap::new(),
            default_limit: DEFAULT_LIMIT,
        }
    }
}

impl Preferences {
    /// Load preferences (explicit path, then user override, then defaults)
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let override_path = path
            .map(Path::to_path_buf)
            .filter(|p| p.exists())
            .or_else(|| default_config_path().filter(|p| p.exists()));

        match override_path {
            Some(path) => {
                debug!(path = %path.display(), "Loading preferences");
                let content = fs::read_to_string(&path).map_err(|e| {
                    Error::Config(format!("Failed to read {}: {}", path.display(), e))
                })?;
                Self::parse(&content)
            }
            None => Self::embedded(),
        }
    }

    /// The defaults compiled into the binary
    pub fn embedded() -> Result<Self> {
        let mut prefs = Self::default();
        prefs.apply(DEFAULT_PREFERENCES)?;
        Ok(prefs)
    }

    /// Parse an override file layered on top of the embedded defaults
    ///
    /// Order lists replace the default list of the same transaction type,
    /// labels replace defaults key by key, everything absent is kept.
    pub fn parse(content: &str) -> Result<Self> {
        let mut prefs = Self::embedded()?;
        prefs.apply(content)?;
        Ok(prefs)
    }

    fn apply(&mut self, content: &str) -> Result<()> {
        let raw: RawPreferences = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid preferences TOML: {}", e)))?;

        for (name, order) in raw.order.unwrap_or_default() {
            match name.parse::<TransactionType>() {
                Ok(tt) => {
                    self.category_order.insert(tt, order);
                }
                Err(_) => warn!(section = %name, "Ignoring order for unknown transaction type"),
            }
        }

        self.labels.extend(raw.labels.unwrap_or_default());

        if let Some(limit) = raw.pivot.and_then(|p| p.default_limit) {
            self.default_limit = limit.clamp(1, MAX_LIMIT);
        }

        Ok(())
    }

    pub fn preferred_order(&self, transaction_type: TransactionType) -> Option<&[String]> {
        self.category_order
            .get(&transaction_type)
            .map(Vec::as_slice)
    }

    /// Display label of a category, the key itself when unlabelled
    pub fn label(&self, category: &str) -> String {
        self.labels
            .get(category)
            .cloned()
            .unwrap_or_else(|| category.to_string())
    }

    /// Column order for a transaction type's categories
    pub fn order_categories(
        &self,
        categories: &[String],
        transaction_type: TransactionType,
    ) -> Vec<String> {
        sort_categories_by_preferred_order(
            categories,
            self.preferred_order(transaction_type),
            |c| self.label(c),
        )
    }
}

/// User preferences override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("paragon").join("preferences.toml"))
}

#[derive(Debug, Deserialize)]
struct RawPreferences {
    order: Option<HashMap<String, Vec<String>>>,
    labels: Option<HashMap<String, String>>,
    pivot: Option<RawPivot>,
}

#[derive(Debug, Deserialize)]
struct RawPivot {
    default_limit: Option<usize>,
}
