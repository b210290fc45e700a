use super::AppState;
use super::extract::{Json, Path};
use crate::error::{ApiError, ApiResult};
use crate::validate;
use axum::extract::State;
use std::sync::Arc;
use todo_types::{
    Ack, Category, CategoryRequest, CategoryWithCounts, DEFAULT_CATEGORY_COLOR,
    DEFAULT_CATEGORY_ICON,
};

/// Resolve name/color/icon, applying defaults for blank color or icon.
fn fields(req: CategoryRequest) -> ApiResult<(String, String, String)> {
    let name = validate::required_text(&req.name, "name")?;
    let color = validate::optional_text(req.color).unwrap_or_else(|| DEFAULT_CATEGORY_COLOR.to_string());
    let icon = validate::optional_text(req.icon).unwrap_or_else(|| DEFAULT_CATEGORY_ICON.to_string());
    Ok((name, color, icon))
}

// GET /api/categories
pub async fn list(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<CategoryWithCounts>>> {
    Ok(Json(state.db.list_categories()?))
}

// POST /api/categories
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CategoryRequest>,
) -> ApiResult<Json<Category>> {
    let (name, color, icon) = fields(req)?;
    let category = state.db.create_category(&name, &color, &icon)?;
    log::info!("Created category #{} '{}'", category.id, category.name);
    Ok(Json(category))
}

// PUT /api/categories/:id
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<CategoryRequest>,
) -> ApiResult<Json<Category>> {
    let (name, color, icon) = fields(req)?;
    state
        .db
        .update_category(id, &name, &color, &icon)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Category #{} not found", id)))
}

// DELETE /api/categories/:id
pub async fn remove(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Ack>> {
    if state.db.delete_category(id)? {
        log::info!("Deleted category #{}", id);
    }
    Ok(Json(Ack::ok()))
}
