//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Paragon - Household receipts, pivots and balances
#[derive(Parser)]
#[command(name = "paragon")]
#[command(about = "Household receipt pivots and balances", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Dataset file (JSON with `people` and `receipts`)
    #[arg(long, default_value = "paragon.json", global = true)]
    pub data: PathBuf,

    /// Preferences file (category order, labels)
    ///
    /// Defaults to ~/.config/paragon/preferences.toml when present,
    /// otherwise to the built-in preferences.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Receipt selection shared by most commands
#[derive(clap::Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Transaction type: expense, income
    #[arg(long = "type")]
    pub transaction_type: Option<String>,

    /// Start date (YYYY-MM-DD), inclusive
    #[arg(long)]
    pub from: Option<String>,

    /// End date (YYYY-MM-DD), inclusive
    #[arg(long)]
    pub to: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List flattened receipt lines
    Flatten {
        #[command(flatten)]
        filter: FilterArgs,

        /// Keep lines whose shop or category contains this text
        #[arg(short, long)]
        query: Option<String>,

        /// Output JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show the day x category matrix with column totals
    Matrix {
        #[command(flatten)]
        filter: FilterArgs,

        /// Keep lines whose shop or category contains this text
        #[arg(short, long)]
        query: Option<String>,
    },

    /// Drill into one matrix cell
    Cell {
        /// Day (YYYY-MM-DD)
        #[arg(long)]
        day: String,

        /// Category key
        #[arg(long)]
        category: String,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Run a configurable pivot
    Pivot {
        #[command(flatten)]
        filter: FilterArgs,

        /// Dimensions to group by: category, shop, payer, owner (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        group_by: Vec<String>,

        /// Time grain: none, day, week, month, year
        #[arg(long, default_value = "none")]
        grain: String,

        /// Measure: sum, count, avg
        #[arg(short, long, default_value = "sum")]
        measure: String,

        /// Owner allocation: split_even, full_value
        #[arg(long, default_value = "split_even")]
        allocation: String,

        /// Sort field: value, count, key
        #[arg(long, default_value = "value")]
        sort: String,

        /// Sort direction: asc, desc
        #[arg(long, default_value = "desc")]
        dir: String,

        /// Maximum rows (1-500, defaults to the preferences value)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Only these categories (comma-separated)
        #[arg(long, value_delimiter = ',')]
        categories: Vec<String>,

        /// Only these shops (comma-separated)
        #[arg(long, value_delimiter = ',')]
        shops: Vec<String>,

        /// Only receipts paid by these person ids (comma-separated)
        #[arg(long, value_delimiter = ',')]
        payers: Vec<i64>,

        /// Only shares of these person ids (comma-separated)
        #[arg(long, value_delimiter = ',')]
        owners: Vec<i64>,

        /// Output JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Evaluate an amount field ("12,50" or "=2+3*4")
    Eval {
        /// Raw amount as typed into the form
        raw: String,
    },

    /// Validate every receipt in the dataset
    Validate,

    /// Show who paid and who owes, with settling transfers
    Balance {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Show income and expenses per month
    Monthly,

    /// Show the daily series with a linear trend
    Trend {
        #[command(flatten)]
        filter: FilterArgs,

        /// Categories to include (repeatable, all when omitted)
        #[arg(short, long)]
        category: Vec<String>,

        /// Show running totals instead of daily amounts
        #[arg(long)]
        cumulative: bool,
    },
}
