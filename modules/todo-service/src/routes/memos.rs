use super::AppState;
use super::extract::{Json, Path, Query};
use crate::error::{ApiError, ApiResult};
use crate::validate;
use axum::extract::State;
use std::sync::Arc;
use todo_types::{Ack, Memo, MemoFilter, MemoRequest, TagCount};

fn not_found(id: i64) -> ApiError {
    ApiError::not_found(format!("Memo #{} not found", id))
}

// GET /api/memos?tag=&search=
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<MemoFilter>,
) -> ApiResult<Json<Vec<Memo>>> {
    let filter = MemoFilter {
        tag: validate::optional_text(filter.tag),
        search: validate::optional_text(filter.search),
    };
    Ok(Json(state.db.list_memos(&filter)?))
}

// GET /api/memos/tags
pub async fn tags(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<TagCount>>> {
    Ok(Json(state.db.memo_tag_counts()?))
}

// GET /api/memos/:id
pub async fn get_one(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Memo>> {
    state.db.get_memo(id)?.map(Json).ok_or_else(|| not_found(id))
}

// POST /api/memos
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MemoRequest>,
) -> ApiResult<Json<Memo>> {
    let content = validate::required_text(&req.content, "content")?;
    let memo = state.db.create_memo(&content, &req.images, &req.tags)?;
    log::info!("Created memo #{} ({} tags)", memo.id, memo.tags.len());
    Ok(Json(memo))
}

// PUT /api/memos/:id
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<MemoRequest>,
) -> ApiResult<Json<Memo>> {
    let content = validate::required_text(&req.content, "content")?;
    state
        .db
        .update_memo(id, &content, &req.images, &req.tags)?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

// DELETE /api/memos/:id
pub async fn remove(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Ack>> {
    if state.db.delete_memo(id)? {
        log::info!("Deleted memo #{}", id);
    }
    Ok(Json(Ack::ok()))
}
