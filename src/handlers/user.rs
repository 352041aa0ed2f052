//! Profile, password and account endpoints

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::{delete, get, put};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use crate::middleware::AuthUser;
use crate::models::UserProfile;
use crate::services::ProfileInput;
use crate::state::AppState;
use crate::utils::errors::Result;
use super::with_cookie;
use super::extract::JsonBody;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", delete(delete_account))
        .route("/profile", get(get_profile).put(update_profile))
        .route("/password", put(change_password))
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ProfileBody {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub blood_type: Option<String>,
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

impl From<ProfileBody> for ProfileInput {
    fn from(body: ProfileBody) -> Self {
        ProfileInput {
            name: body.name,
            phone: body.phone,
            address: body.address,
            city: body.city,
            state: body.state,
            pincode: body.pincode,
            blood_type: body.blood_type,
            gender: body.gender,
            date_of_birth: body.date_of_birth,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct PasswordBody {
    pub current_password: String,
    pub new_password: String,
}

async fn get_profile(State(state): State<AppState>, auth: AuthUser) -> Result<Json<UserProfile>> {
    Ok(Json(state.services.user_service.get_profile(auth.id).await?))
}

async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(body): JsonBody<ProfileBody>,
) -> Result<Json<UserProfile>> {
    let profile = state.services.user_service.update_profile(auth.id, body.into()).await?;
    Ok(Json(profile))
}

async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(body): JsonBody<PasswordBody>,
) -> Result<Json<Value>> {
    state.services.user_service
        .change_password(auth.id, &body.current_password, &body.new_password)
        .await?;
    Ok(Json(json!({ "message": "Password updated" })))
}

async fn delete_account(State(state): State<AppState>, auth: AuthUser) -> Result<Response> {
    state.services.user_service.delete_account(auth.id).await?;
    Ok(with_cookie(
        StatusCode::OK,
        state.services.auth_service.clear_cookie(),
        json!({ "message": "Account deleted" }),
    ))
}
