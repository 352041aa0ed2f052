//! HTTP handlers module
//!
//! One submodule per API area, each exposing a `routes()` router that is
//! nested under its prefix here. Every handler follows the same pipeline:
//! cookie session, role check, body validation, service call, JSON response.

pub mod auth;
pub mod donor;
pub mod extract;
pub mod hospital;
pub mod ngo;
pub mod notifications;
pub mod user;

use axum::extract::State;
use axum::http::header::{CONTENT_TYPE, SET_COOKIE};
use axum::http::{HeaderValue, Method};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{middleware, Json, Router};
use serde_json::{json, Value};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;
use crate::middleware::request_logging;
use crate::models::RegistrationStatus;
use crate::state::AppState;
use crate::utils::errors::{BloodLinkError, Result};

/// Build the application router
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.settings.server.allowed_origins);

    Router::new()
        .route("/health", get(health))
        .nest("/api/auth", auth::routes())
        .nest("/api/user", user::routes())
        .nest("/api/donor", donor::routes())
        .nest("/api/hospital", hospital::routes())
        .nest("/api/ngo", ngo::routes())
        .nest("/api/notifications", notifications::routes())
        .layer(middleware::from_fn(request_logging))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// CORS for the configured frontend origins; credentials are allowed so the
/// browser sends the session cookie.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true)
}

async fn health(State(state): State<AppState>) -> Result<Json<Value>> {
    state.db.health_check().await?;
    Ok(Json(json!({
        "status": "ok",
        "version": crate::VERSION,
    })))
}

/// JSON response that also sets a cookie
pub(crate) fn with_cookie(status: axum::http::StatusCode, cookie: String, body: Value) -> Response {
    (status, [(SET_COOKIE, cookie)], Json(body)).into_response()
}

/// Parse an optional `?status=` filter
pub(crate) fn parse_status_filter(status: Option<String>) -> Result<Option<RegistrationStatus>> {
    crate::utils::helpers::non_empty(status)
        .map(|s| s.parse::<RegistrationStatus>())
        .transpose()
        .map_err(BloodLinkError::InvalidInput)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status_filter() {
        assert_eq!(parse_status_filter(None).unwrap(), None);
        assert_eq!(parse_status_filter(Some("".to_string())).unwrap(), None);
        assert_eq!(
            parse_status_filter(Some("approved".to_string())).unwrap(),
            Some(RegistrationStatus::Approved)
        );
        assert!(parse_status_filter(Some("pending".to_string())).is_err());
    }
}
