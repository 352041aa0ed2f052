//! Hospital endpoints: incoming registrations and inventory

use axum::extract::State;
use axum::routing::{get, patch};
use axum::{Json, Router};
use serde::Deserialize;
use crate::middleware::HospitalUser;
use crate::models::{Registration, RegistrationStatus, RegistrationView, UserRole};
use crate::services::Inventory;
use crate::state::AppState;
use crate::utils::errors::{BloodLinkError, Result};
use super::parse_status_filter;
use super::extract::{JsonBody, PathParam, QueryParams};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/registrations", get(list_registrations))
        .route("/registrations/:id", patch(update_registration))
        .route("/inventory", get(inventory))
}

#[derive(Debug, Deserialize, Default)]
pub struct StatusQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct StatusBody {
    pub status: String,
}

impl StatusBody {
    pub fn parse(&self) -> Result<RegistrationStatus> {
        self.status.parse::<RegistrationStatus>().map_err(BloodLinkError::InvalidInput)
    }
}

async fn list_registrations(
    State(state): State<AppState>,
    HospitalUser(hospital): HospitalUser,
    QueryParams(query): QueryParams<StatusQuery>,
) -> Result<Json<Vec<RegistrationView>>> {
    let status = parse_status_filter(query.status)?;
    Ok(Json(state.services.registration_service.list_for_hospital(hospital.id, status).await?))
}

async fn update_registration(
    State(state): State<AppState>,
    HospitalUser(hospital): HospitalUser,
    PathParam(id): PathParam<i64>,
    JsonBody(body): JsonBody<StatusBody>,
) -> Result<Json<Registration>> {
    let to = body.parse()?;
    let registration = state.services.registration_service
        .owner_transition(hospital.id, UserRole::Hospital, id, to)
        .await?;
    Ok(Json(registration))
}

async fn inventory(State(state): State<AppState>, HospitalUser(hospital): HospitalUser) -> Result<Json<Inventory>> {
    Ok(Json(state.services.registration_service.hospital_inventory(hospital.id).await?))
}
