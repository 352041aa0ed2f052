//! Donor endpoints: browsing hospitals and camps, registrations, stats

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{delete, get};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::Deserialize;
use crate::middleware::DonorUser;
use crate::models::{CampSummary, DonorStats, HospitalSummary, Registration, RegistrationView};
use crate::services::NewRegistration;
use crate::state::AppState;
use crate::utils::errors::Result;
use crate::utils::helpers::non_empty;
use super::extract::{JsonBody, PathParam, QueryParams};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/hospitals", get(list_hospitals))
        .route("/camps", get(list_camps))
        .route("/registrations", get(list_registrations).post(create_registration))
        .route("/registrations/:id", delete(withdraw_registration))
        .route("/stats", get(stats))
}

#[derive(Debug, Deserialize, Default)]
pub struct CityQuery {
    pub city: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct RegistrationBody {
    pub hospital_id: Option<i64>,
    pub camp_id: Option<i64>,
    pub blood_type: Option<String>,
    pub units: Option<i32>,
    pub scheduled_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

async fn list_hospitals(
    State(state): State<AppState>,
    _donor: DonorUser,
    QueryParams(query): QueryParams<CityQuery>,
) -> Result<Json<Vec<HospitalSummary>>> {
    let city = non_empty(query.city);
    Ok(Json(state.db.users.list_hospitals(city.as_deref()).await?))
}

async fn list_camps(
    State(state): State<AppState>,
    _donor: DonorUser,
    QueryParams(query): QueryParams<CityQuery>,
) -> Result<Json<Vec<CampSummary>>> {
    let city = non_empty(query.city);
    Ok(Json(state.services.camp_service.list_upcoming(city.as_deref()).await?))
}

async fn create_registration(
    State(state): State<AppState>,
    DonorUser(donor): DonorUser,
    JsonBody(body): JsonBody<RegistrationBody>,
) -> Result<(StatusCode, Json<Registration>)> {
    let registration = state.services.registration_service.create(donor.id, NewRegistration {
        hospital_id: body.hospital_id,
        camp_id: body.camp_id,
        blood_type: body.blood_type,
        units: body.units,
        scheduled_date: body.scheduled_date,
        notes: body.notes,
    }).await?;

    Ok((StatusCode::CREATED, Json(registration)))
}

async fn list_registrations(
    State(state): State<AppState>,
    DonorUser(donor): DonorUser,
) -> Result<Json<Vec<RegistrationView>>> {
    Ok(Json(state.services.registration_service.list_for_donor(donor.id).await?))
}

async fn withdraw_registration(
    State(state): State<AppState>,
    DonorUser(donor): DonorUser,
    PathParam(id): PathParam<i64>,
) -> Result<Json<Registration>> {
    Ok(Json(state.services.registration_service.withdraw(donor.id, id).await?))
}

async fn stats(State(state): State<AppState>, DonorUser(donor): DonorUser) -> Result<Json<DonorStats>> {
    Ok(Json(state.services.registration_service.donor_stats(donor.id).await?))
}
