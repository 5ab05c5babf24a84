//! Amount evaluation and receipt validation commands

use anyhow::Result;
use paragon_core::validation::PayerProblem;
use paragon_core::{evaluate_amount, validate_receipt, Dataset, ReceiptValidationError};

pub fn cmd_eval(raw: &str) -> Result<()> {
    let evaluated = evaluate_amount(raw).map_err(|e| anyhow::anyhow!("{}: {}", raw, e))?;
    println!("{}", evaluated.message);
    Ok(())
}

/// Every receipt that would be rejected on submission
pub fn invalid_receipts(dataset: &Dataset) -> Vec<ReceiptValidationError> {
    let people = dataset.people_index();
    let people = (!people.is_empty()).then_some(&people);

    dataset
        .receipts
        .iter()
        .filter_map(|r| validate_receipt(r, people).err())
        .collect()
}

pub fn cmd_validate(dataset: &Dataset) -> Result<()> {
    let invalid = invalid_receipts(dataset);

    if invalid.is_empty() {
        println!("✓ All {} receipt(s) are valid", dataset.receipts.len());
        return Ok(());
    }

    for error in &invalid {
        println!("✗ {}", error);
        match error.payer {
            Some(PayerProblem::Missing) => println!("    payer: missing"),
            Some(PayerProblem::NotAPayer(id)) => {
                println!("    payer: person {} is not allowed to pay", id)
            }
            None => {}
        }
        for failure in &error.failures {
            println!(
                "    item {} (#{}): {}",
                failure.index + 1,
                failure.item_id,
                failure.problem
            );
        }
    }

    anyhow::bail!(
        "{} of {} receipt(s) failed validation",
        invalid.len(),
        dataset.receipts.len()
    )
}
