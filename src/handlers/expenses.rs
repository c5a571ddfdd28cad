use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::CurrentUser;
use crate::date_utils;
use crate::db::queries::{categories, expenses};
use crate::error::{AppError, AppResult};
use crate::models::expense::{amount_to_cents, ExpenseWithCategory, NewExpense};
use crate::state::AppState;

/// Default page size for the expense list, matching the dashboard's
/// "recent expenses" table.
const DEFAULT_LIMIT: i64 = 50;

#[derive(Debug, Deserialize)]
pub struct ExpenseListParams {
    #[serde(
        default,
        deserialize_with = "crate::form_utils::deserialize_optional_i64"
    )]
    pub category_id: Option<i64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(
        default,
        deserialize_with = "crate::form_utils::deserialize_optional_i64"
    )]
    pub limit: Option<i64>,
}

/// Request body for creating an expense. `description`, `amount` and
/// `category_id` are required; `date` defaults to today.
#[derive(Debug, Deserialize)]
pub struct CreateExpenseRequest {
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub category_id: Option<i64>,
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ExpenseResponse {
    pub id: i64,
    pub description: String,
    pub amount: f64,
    pub category: String,
    pub category_id: i64,
    pub date: String,
    pub created_at: String,
}

impl From<ExpenseWithCategory> for ExpenseResponse {
    fn from(item: ExpenseWithCategory) -> Self {
        let amount = item.expense.amount();
        Self {
            id: item.expense.id,
            description: item.expense.description,
            amount,
            category: item.category_name.unwrap_or_else(|| "Uncategorized".into()),
            category_id: item.expense.category_id,
            date: item.expense.date,
            created_at: item.expense.created_at,
        }
    }
}

pub async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<ExpenseListParams>,
) -> AppResult<Json<Vec<ExpenseResponse>>> {
    let filter = expenses::ExpenseFilter {
        category_id: params.category_id,
        from_date: validated_date(params.start_date, "start_date")?,
        to_date: validated_date(params.end_date, "end_date")?,
        limit: Some(params.limit.unwrap_or(DEFAULT_LIMIT)),
    };

    let conn = state.db.get()?;
    let expense_list = expenses::list_expenses(&conn, user.id, &filter)?;

    Ok(Json(
        expense_list.into_iter().map(ExpenseResponse::from).collect(),
    ))
}

pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<CreateExpenseRequest>,
) -> AppResult<(StatusCode, Json<ExpenseResponse>)> {
    let description = body
        .description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .ok_or_else(|| AppError::Validation("Missing required field: description".into()))?;

    let amount = body
        .amount
        .ok_or_else(|| AppError::Validation("Missing required field: amount".into()))?;
    if !amount.is_finite() {
        return Err(AppError::Validation("Invalid amount format".into()));
    }
    let amount_cents = amount_to_cents(amount);
    if amount_cents <= 0 {
        return Err(AppError::Validation("Amount must be positive".into()));
    }

    let category_id = body
        .category_id
        .ok_or_else(|| AppError::Validation("Missing required field: category_id".into()))?;

    let date = body.date.unwrap_or_else(date_utils::today);
    if date_utils::parse_date(&date).is_none() {
        return Err(AppError::Validation(format!("Invalid date '{}'", date)));
    }

    let conn = state.db.get()?;

    if categories::get_category(&conn, category_id)?.is_none() {
        return Err(AppError::Validation("Invalid category".into()));
    }

    let new_expense = NewExpense {
        date,
        amount_cents,
        description,
        category_id,
    };
    let id = expenses::create_expense(&conn, user.id, &new_expense)?;

    let created = expenses::get_expense(&conn, user.id, id)?
        .ok_or_else(|| AppError::Internal("Created expense not found".into()))?;

    info!(
        expense_id = id,
        username = %user.username,
        "Expense added"
    );

    Ok((StatusCode::CREATED, Json(created.into())))
}

pub async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<serde_json::Value>> {
    let conn = state.db.get()?;

    if !expenses::delete_expense(&conn, user.id, id)? {
        return Err(AppError::NotFound("Expense not found".into()));
    }

    Ok(Json(
        serde_json::json!({"message": "Expense deleted successfully"}),
    ))
}

/// Validate an optional `YYYY-MM-DD` query parameter.
pub(crate) fn validated_date(value: Option<String>, field: &str) -> AppResult<Option<String>> {
    match value {
        None => Ok(None),
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => {
            if date_utils::parse_date(&s).is_none() {
                return Err(AppError::Validation(format!("Invalid {} '{}'", field, s)));
            }
            Ok(Some(s))
        }
    }
}
