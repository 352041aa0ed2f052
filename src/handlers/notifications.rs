//! Notification feed endpoints

use axum::extract::State;
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use crate::middleware::AuthUser;
use crate::models::NotificationView;
use crate::state::AppState;
use crate::utils::errors::Result;
use crate::utils::helpers::clamp_limit;
use super::extract::{PathParam, QueryParams};

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 200;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/unread-count", get(unread_count))
        .route("/read-all", post(mark_all_read))
        .route("/:id/read", patch(mark_read))
        .route("/:id", delete(remove))
}

#[derive(Debug, Deserialize, Default)]
pub struct FeedQuery {
    pub unread_only: Option<bool>,
    pub limit: Option<i64>,
}

async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(query): QueryParams<FeedQuery>,
) -> Result<Json<Vec<NotificationView>>> {
    let limit = clamp_limit(query.limit, DEFAULT_LIMIT, MAX_LIMIT);
    let feed = state.services.notification_service
        .feed(auth.id, query.unread_only.unwrap_or(false), limit)
        .await?;
    Ok(Json(feed))
}

async fn unread_count(State(state): State<AppState>, auth: AuthUser) -> Result<Json<Value>> {
    let count = state.services.notification_service.unread_count(auth.id).await?;
    Ok(Json(json!({ "count": count })))
}

async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParam(id): PathParam<i64>,
) -> Result<Json<NotificationView>> {
    Ok(Json(state.services.notification_service.mark_read(id, auth.id).await?))
}

async fn mark_all_read(State(state): State<AppState>, auth: AuthUser) -> Result<Json<Value>> {
    let updated = state.services.notification_service.mark_all_read(auth.id).await?;
    Ok(Json(json!({ "updated": updated })))
}

async fn remove(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParam(id): PathParam<i64>,
) -> Result<Json<Value>> {
    state.services.notification_service.delete(id, auth.id).await?;
    Ok(Json(json!({ "message": "Notification deleted" })))
}
