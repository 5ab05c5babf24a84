//! Test utilities for Paragon
//!
//! Small builders for receipts, items and people so tests read as scenarios
//! instead of struct literals. Enabled for this crate's tests and, via the
//! `test-utils` feature, for downstream crates.

use std::sync::atomic::{AtomicI64, Ordering};

use crate::dataset::Dataset;
use crate::models::{Item, ItemValue, Person, Receipt, TransactionType};

static ITEM_ID: AtomicI64 = AtomicI64::new(1);

/// Item without owners
pub fn item(category: &str, value: impl Into<ItemValue>) -> Item {
    item_with_owners(category, value, &[])
}

/// Item shared by the given owners
pub fn item_with_owners(category: &str, value: impl Into<ItemValue>, owners: &[i64]) -> Item {
    Item {
        id: ITEM_ID.fetch_add(1, Ordering::SeqCst),
        category: category.to_string(),
        value: value.into(),
        description: String::new(),
        quantity: 1.0,
        owners: owners.to_vec(),
    }
}

/// Expense receipt paid by person 1
pub fn receipt(id: i64, date: &str, shop: &str, items: Vec<Item>) -> Receipt {
    Receipt {
        id,
        payment_date: Some(date.to_string()),
        payer: Some(1),
        shop: shop.to_string(),
        transaction_type: TransactionType::Expense,
        items,
    }
}

/// Income receipt paid to person 1
pub fn income(id: i64, date: &str, shop: &str, items: Vec<Item>) -> Receipt {
    Receipt {
        transaction_type: TransactionType::Income,
        ..receipt(id, date, shop, items)
    }
}

/// Receipt with an explicit payer
pub fn paid_by(mut receipt: Receipt, payer: i64) -> Receipt {
    receipt.payer = Some(payer);
    receipt
}

/// Two cohabitants who pay and own, plus a guest who only owns
pub fn household() -> Vec<Person> {
    vec![
        Person {
            id: 1,
            name: "Kuba".to_string(),
            payer: true,
            owner: true,
        },
        Person {
            id: 2,
            name: "Ola".to_string(),
            payer: true,
            owner: true,
        },
        Person {
            id: 3,
            name: "Gość".to_string(),
            payer: false,
            owner: true,
        },
    ]
}

/// A month of mixed household receipts
pub fn sample_dataset() -> Dataset {
    Dataset {
        people: household(),
        receipts: vec![
            receipt(
                1,
                "2024-03-01",
                "Lidl",
                vec![
                    item_with_owners("food_drinks", "20", &[1, 2]),
                    item_with_owners("chemistry", "8,40", &[1]),
                ],
            ),
            paid_by(
                receipt(
                    2,
                    "2024-03-01",
                    "Biedronka",
                    vec![item_with_owners("food_drinks", "15", &[1, 2])],
                ),
                2,
            ),
            receipt(
                3,
                "2024-03-04",
                "Orlen",
                vec![item_with_owners("fuel", 250.0, &[1])],
            ),
            paid_by(
                receipt(
                    4,
                    "2024-03-10T18:30:00",
                    "Żabka",
                    vec![
                        item_with_owners("food_drinks", "12.99", &[2]),
                        item_with_owners("entertainment", "30", &[1, 2, 3]),
                    ],
                ),
                2,
            ),
            income(
                5,
                "2024-03-10",
                "Employer",
                vec![item_with_owners("salary", "5000", &[1])],
            ),
        ],
    }
}
