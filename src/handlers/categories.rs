use axum::extract::State;
use axum::response::Json;
use serde::Serialize;

use crate::db::queries::categories;
use crate::error::AppResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub id: i64,
    pub name: String,
}

pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<CategoryResponse>>> {
    let conn = state.db.get()?;
    let categories = categories::list_categories(&conn)?;

    Ok(Json(
        categories
            .into_iter()
            .map(|c| CategoryResponse {
                id: c.id,
                name: c.name,
            })
            .collect(),
    ))
}
