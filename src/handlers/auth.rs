//! Signup, login, logout and session lookup

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use crate::middleware::AuthUser;
use crate::services::SignupInput;
use crate::state::AppState;
use crate::utils::errors::{BloodLinkError, Result};
use crate::utils::helpers::normalize_email;
use super::with_cookie;
use super::extract::JsonBody;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct SignupBody {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

async fn signup(State(state): State<AppState>, JsonBody(body): JsonBody<SignupBody>) -> Result<Response> {
    let services = &state.services;
    let user = services.user_service.signup(SignupInput {
        name: body.name,
        email: body.email,
        password: body.password,
        role: body.role,
    }).await?;

    let token = services.auth_service.issue_token(&user)?;
    Ok(with_cookie(
        StatusCode::CREATED,
        services.auth_service.session_cookie(&token),
        json!({ "user": user }),
    ))
}

async fn login(State(state): State<AppState>, JsonBody(body): JsonBody<LoginBody>) -> Result<Response> {
    let services = &state.services;
    let key = normalize_email(&body.email);
    services.login_limiter.check(&key)?;

    let user = match services.user_service.login(&body.email, &body.password).await {
        Ok(user) => user,
        Err(err @ BloodLinkError::Authentication(_)) => {
            services.login_limiter.record_failure(&key);
            return Err(err);
        }
        Err(err) => return Err(err),
    };
    services.login_limiter.reset(&key);

    let token = services.auth_service.issue_token(&user)?;
    info!(user_id = user.id, "User logged in");
    Ok(with_cookie(
        StatusCode::OK,
        services.auth_service.session_cookie(&token),
        json!({ "user": user }),
    ))
}

async fn logout(State(state): State<AppState>) -> Response {
    with_cookie(
        StatusCode::OK,
        state.services.auth_service.clear_cookie(),
        json!({ "message": "Logged out" }),
    )
}

async fn me(State(state): State<AppState>, auth: AuthUser) -> Result<Response> {
    match state.services.user_service.get_user(auth.id).await? {
        Some(user) => {
            let profile = state.db.profile_for(user).await?;
            Ok(Json(profile).into_response())
        }
        None => Ok(with_cookie(
            StatusCode::UNAUTHORIZED,
            state.services.auth_service.clear_cookie(),
            json!({ "error": "Account no longer exists" }),
        )),
    }
}
