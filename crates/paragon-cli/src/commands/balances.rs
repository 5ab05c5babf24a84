//! Household balance commands

use anyhow::Result;
use paragon_core::{monthly_balances, person_balances, settle, Dataset};

use super::core::receipt_filter;
use super::truncate;
use crate::cli::FilterArgs;

pub fn cmd_balance(dataset: &Dataset, filter: &FilterArgs) -> Result<()> {
    let receipts = receipt_filter(filter)?.apply(&dataset.receipts);
    let people = dataset.people_index();
    let balances = person_balances(&receipts, &people);

    println!();
    println!("⚖️  Household Balance");
    println!("   ─────────────────────────────────────────────────────────────");

    if balances.is_empty() {
        println!("   No people or expenses found.");
        return Ok(());
    }

    println!(
        "   {:20} │ {:>10} │ {:>10} │ {:>10}",
        "Person", "Paid", "Owes", "Net"
    );
    println!("   ─────────────────────┼────────────┼────────────┼───────────");
    for balance in &balances {
        println!(
            "   {:20} │ {:>10.2} │ {:>10.2} │ {:>+10.2}",
            truncate(&balance.name, 20),
            balance.paid,
            balance.owed,
            balance.net
        );
    }

    let transfers = settle(&balances);
    println!();
    if transfers.is_empty() {
        println!("   ✓ Everyone is settled up");
        return Ok(());
    }

    println!("   To settle:");
    for transfer in &transfers {
        println!(
            "   {} → {}: {:.2}",
            people.label(transfer.from),
            people.label(transfer.to),
            transfer.amount
        );
    }

    Ok(())
}

pub fn cmd_monthly(dataset: &Dataset) -> Result<()> {
    let months = monthly_balances(&dataset.receipts);

    println!();
    println!("📈 Monthly Income vs Expenses");
    println!("   ─────────────────────────────────────────────────────────────");

    if months.is_empty() {
        println!("   No dated receipts found.");
        return Ok(());
    }

    println!(
        "   {:8} │ {:>12} │ {:>12} │ {:>12}",
        "Month", "Income", "Expenses", "Balance"
    );
    println!("   ─────────┼──────────────┼──────────────┼─────────────");
    for month in &months {
        println!(
            "   {:8} │ {:>12.2} │ {:>12.2} │ {:>+12.2}",
            month.month, month.income, month.expense, month.balance
        );
    }

    Ok(())
}
