//! Household balances
//!
//! Who paid how much versus who owes how much, the transfers that settle the
//! difference, and income against expenses per month.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::expression::round_cents;
use crate::flatten::{amount_loose, parse_date_prefix};
use crate::models::{PeopleIndex, Receipt, TransactionType};

/// Residues below half a cent are treated as settled
const SETTLED: f64 = 0.005;

/// Paid versus owed for one person
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonBalance {
    pub person_id: i64,
    pub name: String,
    /// Total of expense receipts this person paid
    pub paid: f64,
    /// This person's split-even share of expense items
    pub owed: f64,
    /// paid - owed; positive means others owe this person
    pub net: f64,
}

/// Money one person should hand to another
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    pub from: i64,
    pub to: i64,
    pub amount: f64,
}

/// Income and expenses of one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthBalance {
    /// `YYYY-MM`
    pub month: String,
    pub income: f64,
    pub expense: f64,
    /// income - expense
    pub balance: f64,
}

/// Paid and owed amounts per person over expense receipts
///
/// Items are split evenly across their owners. An item without owners is
/// borne by whoever paid the receipt. Everyone in `people` gets a row even
/// with no activity; unknown ids seen in receipts are added with a `#id` name.
pub fn person_balances(receipts: &[Receipt], people: &PeopleIndex) -> Vec<PersonBalance> {
    let mut paid: BTreeMap<i64, f64> = BTreeMap::new();
    let mut owed: BTreeMap<i64, f64> = BTreeMap::new();

    for receipt in receipts {
        if receipt.transaction_type != TransactionType::Expense {
            continue;
        }

        for item in &receipt.items {
            let value = amount_loose(&item.value);
            if let Some(payer) = receipt.payer {
                *paid.entry(payer).or_insert(0.0) += value;
            }

            if item.owners.is_empty() {
                if let Some(payer) = receipt.payer {
                    *owed.entry(payer).or_insert(0.0) += value;
                }
                continue;
            }
            let share = value / item.owners.len() as f64;
            for &owner in &item.owners {
                *owed.entry(owner).or_insert(0.0) += share;
            }
        }
    }

    let mut ids: BTreeSet<i64> = paid.keys().chain(owed.keys()).copied().collect();
    ids.extend(people.payers().iter().map(|p| p.id));
    ids.extend(people.owners().iter().map(|p| p.id));

    ids.into_iter()
        .map(|id| {
            let paid = paid.get(&id).copied().unwrap_or(0.0);
            let owed = owed.get(&id).copied().unwrap_or(0.0);
            PersonBalance {
                person_id: id,
                name: people.label(id),
                paid,
                owed,
                net: paid - owed,
            }
        })
        .collect()
}

/// Transfers that bring every net balance to zero
///
/// Greedy: the largest debtor pays the largest creditor until one side is
/// exhausted. Amounts are rounded to cents.
pub fn settle(balances: &[PersonBalance]) -> Vec<Transfer> {
    let mut creditors: Vec<(i64, f64)> = balances
        .iter()
        .filter(|b| b.net > SETTLED)
        .map(|b| (b.person_id, b.net))
        .collect();
    let mut debtors: Vec<(i64, f64)> = balances
        .iter()
        .filter(|b| b.net < -SETTLED)
        .map(|b| (b.person_id, -b.net))
        .collect();
    creditors.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    debtors.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

    let mut transfers = Vec::new();
    let (mut ci, mut di) = (0, 0);
    while ci < creditors.len() && di < debtors.len() {
        let amount = creditors[ci].1.min(debtors[di].1);
        if amount > SETTLED {
            transfers.push(Transfer {
                from: debtors[di].0,
                to: creditors[ci].0,
                amount: round_cents(amount),
            });
        }
        creditors[ci].1 -= amount;
        debtors[di].1 -= amount;
        if creditors[ci].1 <= SETTLED {
            ci += 1;
        }
        if debtors[di].1 <= SETTLED {
            di += 1;
        }
    }

    debug!(transfers = transfers.len(), "Computed settlement");
    transfers
}

/// Income, expenses and their difference per month, oldest first
///
/// Undated receipts are left out.
pub fn monthly_balances(receipts: &[Receipt]) -> Vec<MonthBalance> {
    let mut months: BTreeMap<String, (f64, f64)> = BTreeMap::new();
    let mut undated = 0usize;

    for receipt in receipts {
        let Some(date) = receipt.payment_date.as_deref().and_then(parse_date_prefix) else {
            undated += 1;
            continue;
        };
        let total: f64 = receipt.items.iter().map(|i| amount_loose(&i.value)).sum();
        let entry = months
            .entry(date.format("%Y-%m").to_string())
            .or_insert((0.0, 0.0));
        match receipt.transaction_type {
            TransactionType::Income => entry.0 += total,
            TransactionType::Expense => entry.1 += total,
        }
    }

    if undated > 0 {
        debug!(undated, "Skipped undated receipts in monthly balances");
    }

    months
        .into_iter()
        .map(|(month, (income, expense))| MonthBalance {
            month,
            income,
            expense,
            balance: income - expense,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{household, income, item, item_with_owners, paid_by, receipt, sample_dataset};

    const EPS: f64 = 1e-9;

    fn balance_of(balances: &[PersonBalance], id: i64) -> &PersonBalance {
        balances.iter().find(|b| b.person_id == id).unwrap()
    }

    #[test]
    fn test_shared_bill_between_two() {
        let people = PeopleIndex::new(&household());
        let receipts = vec![
            receipt(1, "2024-03-01", "PGE", vec![item_with_owners("bills", "100", &[1, 2])]),
            paid_by(
                receipt(2, "2024-03-02", "Lidl", vec![item_with_owners("food_drinks", "40", &[1, 2])]),
                2,
            ),
        ];
        let balances = person_balances(&receipts, &people);

        let kuba = balance_of(&balances, 1);
        assert_eq!(kuba.paid, 100.0);
        assert_eq!(kuba.owed, 70.0);
        assert_eq!(kuba.net, 30.0);
        let ola = balance_of(&balances, 2);
        assert_eq!(ola.net, -30.0);
        assert_eq!(balance_of(&balances, 3).net, 0.0);

        let transfers = settle(&balances);
        assert_eq!(
            transfers,
            vec![Transfer {
                from: 2,
                to: 1,
                amount: 30.0
            }]
        );
    }

    #[test]
    fn test_nets_sum_to_zero() {
        let dataset = sample_dataset();
        let balances = person_balances(&dataset.receipts, &dataset.people_index());
        let total: f64 = balances.iter().map(|b| b.net).sum();
        assert!(total.abs() < EPS);
    }

    #[test]
    fn test_unowned_items_are_borne_by_payer() {
        let people = PeopleIndex::new(&household());
        let receipts = vec![receipt(1, "2024-03-01", "Kiosk", vec![item("other", "5")])];
        let balances = person_balances(&receipts, &people);
        assert_eq!(balance_of(&balances, 1).net, 0.0);
        assert!(settle(&balances).is_empty());
    }

    #[test]
    fn test_income_is_ignored_in_person_balances() {
        let people = PeopleIndex::new(&household());
        let receipts = vec![income(1, "2024-03-01", "Employer", vec![item_with_owners("salary", "100", &[2])])];
        let balances = person_balances(&receipts, &people);
        assert!(balances.iter().all(|b| b.paid == 0.0 && b.owed == 0.0));
    }

    #[test]
    fn test_settlement_with_three_people() {
        let balances = vec![
            PersonBalance { person_id: 1, name: "A".into(), paid: 90.0, owed: 30.0, net: 60.0 },
            PersonBalance { person_id: 2, name: "B".into(), paid: 0.0, owed: 30.0, net: -30.0 },
            PersonBalance { person_id: 3, name: "C".into(), paid: 0.0, owed: 30.0, net: -30.0 },
        ];
        let transfers = settle(&balances);
        assert_eq!(transfers.len(), 2);
        assert!(transfers.iter().all(|t| t.to == 1 && t.amount == 30.0));
    }

    #[test]
    fn test_monthly_balances() {
        let receipts = vec![
            receipt(1, "2024-02-28", "Lidl", vec![item("food_drinks", "10")]),
            receipt(2, "2024-03-01", "Lidl", vec![item("food_drinks", "20"), item("chemistry", "5")]),
            income(3, "2024-03-10", "Employer", vec![item("salary", "100")]),
        ];
        let months = monthly_balances(&receipts);

        assert_eq!(months.len(), 2);
        assert_eq!(months[0].month, "2024-02");
        assert_eq!(months[0].balance, -10.0);
        assert_eq!(months[1].income, 100.0);
        assert_eq!(months[1].expense, 25.0);
        assert_eq!(months[1].balance, 75.0);
    }
}
