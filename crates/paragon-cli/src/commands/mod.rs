//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (open_dataset, load_preferences, filter parsing)
//! - `views` - Receipt lines, day × category matrix, cell drill-down
//! - `pivot` - Configurable pivot
//! - `amounts` - Amount evaluation and receipt validation
//! - `balances` - Household balance and monthly income/expenses
//! - `trend` - Daily series with a trend line

pub mod amounts;
pub mod balances;
pub mod core;
pub mod pivot;
pub mod trend;
pub mod views;

// Re-export command functions for main.rs
pub use amounts::*;
pub use balances::*;
pub use self::core::*;
pub use pivot::*;
pub use trend::*;
pub use views::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
