use serde::{Deserialize, Serialize};

/// A single recorded spending event. Amounts are integer minor units
/// (cents); summing them stays exact where repeated float addition drifts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub user_id: i64,
    pub date: String,
    pub amount_cents: i64,
    pub description: String,
    pub category_id: i64,
    pub created_at: String,
}

impl Expense {
    pub fn amount(&self) -> f64 {
        cents_to_amount(self.amount_cents)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseWithCategory {
    #[serde(flatten)]
    pub expense: Expense,
    pub category_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewExpense {
    pub date: String,
    pub amount_cents: i64,
    pub description: String,
    pub category_id: i64,
}

/// Convert integer minor units to a decimal currency amount. Only used at
/// the JSON boundary; all arithmetic happens in cents.
pub fn cents_to_amount(cents: i64) -> f64 {
    cents as f64 / 100.0
}

/// Convert a decimal currency amount to integer minor units.
pub fn amount_to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}
