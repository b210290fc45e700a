use super::AppState;
use crate::error::ApiResult;
use axum::extract::State;
use axum::response::Json;
use std::sync::Arc;
use todo_types::{ExportData, ServiceStatus};

// GET /api/export
pub async fn export_all(State(state): State<Arc<AppState>>) -> ApiResult<Json<ExportData>> {
    let data = state.db.export_all()?;
    log::debug!(
        "Exported {} todos across {} categories",
        data.stats.total,
        data.stats.categories
    );
    Ok(Json(data))
}

// GET /api/status
pub async fn status(State(state): State<Arc<AppState>>) -> ApiResult<Json<ServiceStatus>> {
    let uptime = state.start_time.elapsed().as_secs();
    Ok(Json(state.db.service_status(uptime)?))
}
