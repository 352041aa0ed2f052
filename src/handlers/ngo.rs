//! NGO endpoints: camp management, camp registrations, inventory and
//! legacy camp import

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::Deserialize;
use crate::middleware::NgoUser;
use crate::models::{BloodCamp, LegacyCampDetails, Registration, RegistrationView, UpdateCampRequest, UserRole};
use crate::services::{Inventory, NewCamp};
use crate::state::AppState;
use crate::utils::errors::{BloodLinkError, Result};
use super::hospital::{StatusBody, StatusQuery};
use super::parse_status_filter;
use super::extract::{JsonBody, PathParam, QueryParams};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/camps", get(list_camps).post(create_camp))
        .route("/camps/:id", get(get_camp).patch(update_camp).delete(cancel_camp))
        .route("/camps/:id/registrations", get(camp_registrations))
        .route("/registrations/:id", patch(update_registration))
        .route("/inventory", get(inventory))
        .route("/legacy-camps", get(legacy_camps))
        .route("/legacy-camps/:id/import", post(import_legacy_camp))
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct CampBody {
    pub name: String,
    pub description: Option<String>,
    pub location: String,
    pub city: String,
    pub camp_date: Option<NaiveDate>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub capacity: Option<i32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct CampUpdateBody {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub city: Option<String>,
    pub camp_date: Option<NaiveDate>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub capacity: Option<i32>,
}

async fn create_camp(
    State(state): State<AppState>,
    NgoUser(ngo): NgoUser,
    JsonBody(body): JsonBody<CampBody>,
) -> Result<(StatusCode, Json<BloodCamp>)> {
    let camp_date = body.camp_date
        .ok_or_else(|| BloodLinkError::InvalidInput("Camp date is required".to_string()))?;
    let capacity = body.capacity
        .ok_or_else(|| BloodLinkError::InvalidInput("Capacity is required".to_string()))?;

    let camp = state.services.camp_service.create(ngo.id, NewCamp {
        name: body.name,
        description: body.description,
        location: body.location,
        city: body.city,
        camp_date,
        start_time: body.start_time,
        end_time: body.end_time,
        capacity,
    }).await?;

    Ok((StatusCode::CREATED, Json(camp)))
}

async fn list_camps(State(state): State<AppState>, NgoUser(ngo): NgoUser) -> Result<Json<Vec<BloodCamp>>> {
    Ok(Json(state.services.camp_service.list_for_ngo(ngo.id).await?))
}

async fn get_camp(
    State(state): State<AppState>,
    NgoUser(ngo): NgoUser,
    PathParam(id): PathParam<i64>,
) -> Result<Json<BloodCamp>> {
    Ok(Json(state.services.camp_service.get_owned(ngo.id, id).await?))
}

async fn update_camp(
    State(state): State<AppState>,
    NgoUser(ngo): NgoUser,
    PathParam(id): PathParam<i64>,
    JsonBody(body): JsonBody<CampUpdateBody>,
) -> Result<Json<BloodCamp>> {
    let request = UpdateCampRequest {
        name: body.name,
        description: body.description,
        location: body.location,
        city: body.city,
        camp_date: body.camp_date,
        start_time: body.start_time,
        end_time: body.end_time,
        capacity: body.capacity,
    };
    Ok(Json(state.services.camp_service.update(ngo.id, id, request).await?))
}

async fn cancel_camp(
    State(state): State<AppState>,
    NgoUser(ngo): NgoUser,
    PathParam(id): PathParam<i64>,
) -> Result<Json<BloodCamp>> {
    Ok(Json(state.services.camp_service.cancel(ngo.id, id).await?))
}

async fn camp_registrations(
    State(state): State<AppState>,
    NgoUser(ngo): NgoUser,
    PathParam(id): PathParam<i64>,
    QueryParams(query): QueryParams<StatusQuery>,
) -> Result<Json<Vec<RegistrationView>>> {
    let status = parse_status_filter(query.status)?;
    Ok(Json(state.services.camp_service.registrations(ngo.id, id, status).await?))
}

async fn update_registration(
    State(state): State<AppState>,
    NgoUser(ngo): NgoUser,
    PathParam(id): PathParam<i64>,
    JsonBody(body): JsonBody<StatusBody>,
) -> Result<Json<Registration>> {
    let to = body.parse()?;
    let registration = state.services.registration_service
        .owner_transition(ngo.id, UserRole::Ngo, id, to)
        .await?;
    Ok(Json(registration))
}

async fn inventory(State(state): State<AppState>, NgoUser(ngo): NgoUser) -> Result<Json<Inventory>> {
    Ok(Json(state.services.registration_service.ngo_inventory(ngo.id).await?))
}

async fn legacy_camps(State(state): State<AppState>, NgoUser(ngo): NgoUser) -> Result<Json<Vec<LegacyCampDetails>>> {
    Ok(Json(state.services.camp_service.legacy_camps(ngo.id).await?))
}

async fn import_legacy_camp(
    State(state): State<AppState>,
    NgoUser(ngo): NgoUser,
    PathParam(id): PathParam<i64>,
) -> Result<(StatusCode, Json<BloodCamp>)> {
    let camp = state.services.camp_service.import_legacy(ngo.id, id).await?;
    Ok((StatusCode::CREATED, Json(camp)))
}
