//! Totals and per-category breakdowns over a set of transactions.

use std::collections::BTreeMap;

use crate::transaction::{Transaction, TransactionType};

/// Income and expense totals over a set of transactions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    /// The sum of all income.
    pub income: f64,
    /// The sum of all expenses.
    pub expense: f64,
    /// `income - expense`.
    pub net_income: f64,
    /// The number of transactions summarised.
    pub transaction_count: usize,
    /// Summed expenses per category. Only categories with expenses are present.
    pub expense_by_category: BTreeMap<String, f64>,
    /// Summed income per category. Only categories with income are present.
    pub income_by_category: BTreeMap<String, f64>,
}

/// Summarise `transactions` in a single pass.
pub fn summarize(transactions: &[Transaction]) -> Summary {
    let mut summary = Summary {
        transaction_count: transactions.len(),
        ..Default::default()
    };

    for transaction in transactions {
        let (total, by_category) = match transaction.transaction_type {
            TransactionType::Income => (&mut summary.income, &mut summary.income_by_category),
            TransactionType::Expense => (&mut summary.expense, &mut summary.expense_by_category),
        };

        *total += transaction.amount;
        *by_category
            .entry(transaction.category.clone())
            .or_insert(0.0) += transaction.amount;
    }

    summary.net_income = summary.income - summary.expense;

    summary
}
