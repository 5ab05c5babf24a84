//! Receipt validation before submission

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::expression::{validate_item, ValidationError};
use crate::models::{PeopleIndex, Receipt};

/// Problem with one line of a receipt
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ItemProblem {
    #[error("{0}")]
    Amount(#[from] ValidationError),

    #[error("Item has no owners")]
    NoOwners,

    #[error("Person {0} cannot own items")]
    NotAnOwner(i64),
}

/// One failing item
#[derive(Debug, Clone, PartialEq)]
pub struct ItemFailure {
    /// Position of the item in the receipt
    pub index: usize,
    pub item_id: i64,
    pub problem: ItemProblem,
}

/// A receipt that must not be submitted
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Receipt {receipt_id} has {} invalid item(s){}", .failures.len(), payer_suffix(.payer))]
pub struct ReceiptValidationError {
    pub receipt_id: i64,
    /// Payer id that is missing or not allowed to pay
    pub payer: Option<PayerProblem>,
    pub failures: Vec<ItemFailure>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PayerProblem {
    Missing,
    NotAPayer(i64),
}

fn payer_suffix(payer: &Option<PayerProblem>) -> String {
    match payer {
        None => String::new(),
        Some(PayerProblem::Missing) => ", no payer".to_string(),
        Some(PayerProblem::NotAPayer(id)) => format!(", person {} cannot pay", id),
    }
}

/// Validate every item of a receipt, and its people when an index is given
///
/// Returns a copy with numeric item values, or every problem found. With a
/// [`PeopleIndex`] the payer must be payer-flagged and each item needs at
/// least one owner, all owner-flagged.
pub fn validate_receipt(
    receipt: &Receipt,
    people: Option<&PeopleIndex>,
) -> Result<Receipt, ReceiptValidationError> {
    let mut validated = receipt.clone();
    let mut failures = Vec::new();

    for (index, item) in receipt.items.iter().enumerate() {
        match validate_item(item) {
            Ok(ok) => validated.items[index] = ok.item,
            Err(e) => failures.push(ItemFailure {
                index,
                item_id: item.id,
                problem: e.into(),
            }),
        }

        if let Some(people) = people {
            if item.owners.is_empty() {
                failures.push(ItemFailure {
                    index,
                    item_id: item.id,
                    problem: ItemProblem::NoOwners,
                });
            }
            if let Some(&owner) = item.owners.iter().find(|&&o| !people.is_owner(o)) {
                failures.push(ItemFailure {
                    index,
                    item_id: item.id,
                    problem: ItemProblem::NotAnOwner(owner),
                });
            }
        }
    }

    let payer = people.and_then(|people| match receipt.payer {
        None => Some(PayerProblem::Missing),
        Some(id) if !people.is_payer(id) => Some(PayerProblem::NotAPayer(id)),
        Some(_) => None,
    });

    if failures.is_empty() && payer.is_none() {
        Ok(validated)
    } else {
        Err(ReceiptValidationError {
            receipt_id: receipt.id,
            payer,
            failures,
        })
    }
}
