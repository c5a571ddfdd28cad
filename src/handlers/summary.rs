use std::collections::BTreeMap;

use axum::extract::{Query, State};
use axum::response::Json;
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::db::queries::expenses;
use crate::error::AppResult;
use crate::handlers::expenses::validated_date;
use crate::models::expense::cents_to_amount;
use crate::services::summary::{compute_summary, filter_expenses, Summary};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SummaryParams {
    #[serde(
        default,
        deserialize_with = "crate::form_utils::deserialize_optional_i64"
    )]
    pub category_id: Option<i64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// The dashboard payload. Amounts leave the cent domain here and nowhere
/// earlier; the maps stay ordered so the monthly series arrives in
/// ascending calendar order.
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub total_amount: f64,
    pub total_count: usize,
    pub average_per_expense: f64,
    pub category_breakdown: BTreeMap<String, f64>,
    pub monthly_breakdown: BTreeMap<String, f64>,
}

impl From<Summary> for SummaryResponse {
    fn from(summary: Summary) -> Self {
        let average_per_expense = summary.average_amount();
        Self {
            total_amount: cents_to_amount(summary.total_cents),
            total_count: summary.total_count,
            average_per_expense,
            category_breakdown: to_amounts(summary.category_breakdown),
            monthly_breakdown: to_amounts(summary.monthly_breakdown),
        }
    }
}

fn to_amounts(cents: BTreeMap<String, i64>) -> BTreeMap<String, f64> {
    cents
        .into_iter()
        .map(|(key, value)| (key, cents_to_amount(value)))
        .collect()
}

pub async fn show(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<SummaryParams>,
) -> AppResult<Json<SummaryResponse>> {
    let start_date = validated_date(params.start_date, "start_date")?;
    let end_date = validated_date(params.end_date, "end_date")?;

    let conn = state.db.get()?;
    let expense_list = expenses::list_expenses(&conn, user.id, &Default::default())?;

    let filtered = filter_expenses(
        expense_list,
        params.category_id,
        start_date.as_deref(),
        end_date.as_deref(),
    );
    let summary = compute_summary(&filtered)?;

    Ok(Json(summary.into()))
}
