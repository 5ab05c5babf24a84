//! Paragon CLI - Household receipt pivots and balances
//!
//! Usage:
//!   paragon matrix --type expense         Day x category matrix
//!   paragon pivot -g category,owner       Configurable pivot
//!   paragon eval "=2+3*4"                 Evaluate an amount field
//!   paragon balance                       Who owes whom

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let data = cli.data.as_path();
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Eval { raw } => commands::cmd_eval(&raw),
        Commands::Flatten {
            filter,
            query,
            json,
        } => {
            let dataset = commands::open_dataset(data)?;
            commands::cmd_flatten(&dataset, &filter, query.as_deref(), json)
        }
        Commands::Matrix { filter, query } => {
            let dataset = commands::open_dataset(data)?;
            let prefs = commands::load_preferences(config)?;
            commands::cmd_matrix(&dataset, &prefs, &filter, query.as_deref())
        }
        Commands::Cell {
            day,
            category,
            filter,
        } => {
            let dataset = commands::open_dataset(data)?;
            let prefs = commands::load_preferences(config)?;
            commands::cmd_cell(&dataset, &prefs, &filter, &day, &category)
        }
        Commands::Pivot {
            filter,
            group_by,
            grain,
            measure,
            allocation,
            sort,
            dir,
            limit,
            categories,
            shops,
            payers,
            owners,
            json,
        } => {
            let dataset = commands::open_dataset(data)?;
            let prefs = commands::load_preferences(config)?;
            let spec = commands::build_spec(
                &filter,
                &commands::PivotArgs {
                    group_by,
                    grain,
                    measure,
                    allocation,
                    sort,
                    dir,
                    limit: limit.unwrap_or(prefs.default_limit),
                    categories,
                    shops,
                    payers,
                    owners,
                },
            )?;
            commands::cmd_pivot(&dataset, &prefs, &spec, json)
        }
        Commands::Validate => commands::cmd_validate(&commands::open_dataset(data)?),
        Commands::Balance { filter } => {
            commands::cmd_balance(&commands::open_dataset(data)?, &filter)
        }
        Commands::Monthly => commands::cmd_monthly(&commands::open_dataset(data)?),
        Commands::Trend {
            filter,
            category,
            cumulative,
        } => {
            let dataset = commands::open_dataset(data)?;
            commands::cmd_trend(&dataset, &filter, &category, cumulative)
        }
    }
}
