//! Aggregation of expense records into the dashboard summary.
//!
//! Everything here is pure: the handlers fetch an owner's records, run them
//! through [`filter_expenses`] and [`compute_summary`], and serialize the
//! result. Amounts are summed as integer cents, so the totals are exact no
//! matter how many records participate.

use std::collections::BTreeMap;

use crate::date_utils;
use crate::error::{AppError, AppResult};
use crate::models::ExpenseWithCategory;

/// Aggregate totals over a set of expenses. Breakdown maps are ordered, so
/// monthly keys serialize in ascending calendar order for the charts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub total_cents: i64,
    pub total_count: usize,
    pub category_breakdown: BTreeMap<String, i64>,
    pub monthly_breakdown: BTreeMap<String, i64>,
}

impl Summary {
    /// Mean amount per expense in currency units, 0 for an empty set.
    /// Left unrounded; rounding to display precision is the consumer's job.
    pub fn average_amount(&self) -> f64 {
        if self.total_count == 0 {
            return 0.0;
        }
        crate::models::expense::cents_to_amount(self.total_cents) / self.total_count as f64
    }
}

/// Fold a sequence of expenses into a [`Summary`].
///
/// Fails with `InvalidInput` on a negative amount, an unparseable date, or a
/// missing category name. Upstream validation and schema constraints should
/// make those impossible, but a corrupted record must fail the whole request
/// rather than silently vanish from the totals.
pub fn compute_summary(expenses: &[ExpenseWithCategory]) -> AppResult<Summary> {
    let mut total_cents: i64 = 0;
    let mut category_breakdown: BTreeMap<String, i64> = BTreeMap::new();
    let mut monthly_breakdown: BTreeMap<String, i64> = BTreeMap::new();

    for item in expenses {
        let expense = &item.expense;

        if expense.amount_cents < 0 {
            return Err(AppError::InvalidInput(format!(
                "Expense {} has a negative amount",
                expense.id
            )));
        }

        let category = item
            .category_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| {
                AppError::InvalidInput(format!("Expense {} has no category", expense.id))
            })?;

        let month = date_utils::month_key(&expense.date).ok_or_else(|| {
            AppError::InvalidInput(format!(
                "Expense {} has an invalid date '{}'",
                expense.id, expense.date
            ))
        })?;

        total_cents += expense.amount_cents;
        *category_breakdown.entry(category.to_string()).or_insert(0) += expense.amount_cents;
        *monthly_breakdown.entry(month).or_insert(0) += expense.amount_cents;
    }

    Ok(Summary {
        total_cents,
        total_count: expenses.len(),
        category_breakdown,
        monthly_breakdown,
    })
}

/// Apply optional category/date predicates conjunctively, preserving the
/// original relative order. An absent argument places no constraint on that
/// dimension; both date bounds are inclusive.
pub fn filter_expenses(
    expenses: Vec<ExpenseWithCategory>,
    category_id: Option<i64>,
    start_date: Option<&str>,
    end_date: Option<&str>,
) -> Vec<ExpenseWithCategory> {
    expenses
        .into_iter()
        .filter(|item| {
            let expense = &item.expense;
            if let Some(id) = category_id {
                if expense.category_id != id {
                    return false;
                }
            }
            // ISO dates compare lexicographically in chronological order
            if let Some(start) = start_date {
                if expense.date.as_str() < start {
                    return false;
                }
            }
            if let Some(end) = end_date {
                if expense.date.as_str() > end {
                    return false;
                }
            }
            true
        })
        .collect()
}
