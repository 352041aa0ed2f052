//! Camp service implementation
//!
//! NGO blood-camp management: creation, updates, cancellation with donor
//! notification, listings, and import of legacy camp records.

use std::collections::HashMap;
use chrono::{NaiveDate, Utc};
use tracing::info;
use crate::database::DatabaseService;
use crate::models::{
    BloodCamp, CampSummary, CreateCampRequest, LegacyCampDetails, RegistrationStatus,
    RegistrationView, UpdateCampRequest,
};
use crate::services::notification::NotificationService;
use crate::utils::errors::{BloodLinkError, Result};
use crate::utils::helpers::{non_empty, normalize_whitespace};
use crate::utils::logging::log_camp_action;

/// Camp creation input as received from an NGO
#[derive(Debug, Clone)]
pub struct NewCamp {
    pub name: String,
    pub description: Option<String>,
    pub location: String,
    pub city: String,
    pub camp_date: NaiveDate,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub capacity: i32,
}

#[derive(Clone, Debug)]
pub struct CampService {
    db: DatabaseService,
    notifications: NotificationService,
}

impl CampService {
    /// Create a new CampService instance
    pub fn new(db: DatabaseService, notifications: NotificationService) -> Self {
        Self { db, notifications }
    }

    /// Validate a new camp against `today`
    pub fn validate_new(ngo_id: i64, input: NewCamp, today: NaiveDate) -> Result<CreateCampRequest> {
        let name = normalize_whitespace(&input.name);
        let location = normalize_whitespace(&input.location);
        let city = normalize_whitespace(&input.city);

        if name.is_empty() || location.is_empty() || city.is_empty() {
            return Err(BloodLinkError::InvalidInput("Name, location and city are required".to_string()));
        }
        if input.capacity < 1 {
            return Err(BloodLinkError::InvalidInput("Capacity must be at least 1".to_string()));
        }
        if input.camp_date < today {
            return Err(BloodLinkError::InvalidInput("Camp date cannot be in the past".to_string()));
        }

        Ok(CreateCampRequest {
            ngo_id,
            name,
            description: non_empty(input.description),
            location,
            city,
            camp_date: input.camp_date,
            start_time: non_empty(input.start_time),
            end_time: non_empty(input.end_time),
            capacity: input.capacity,
        })
    }

    /// Create a camp for an NGO
    pub async fn create(&self, ngo_id: i64, input: NewCamp) -> Result<BloodCamp> {
        let request = Self::validate_new(ngo_id, input, Utc::now().date_naive())?;
        let camp = self.db.camps.create(request).await?;

        log_camp_action(camp.id, "create", ngo_id, Some(&camp.name));
        Ok(camp)
    }

    /// Camps run by an NGO
    pub async fn list_for_ngo(&self, ngo_id: i64) -> Result<Vec<BloodCamp>> {
        self.db.camps.list_for_ngo(ngo_id).await
    }

    /// Upcoming active camps for donors
    pub async fn list_upcoming(&self, city: Option<&str>) -> Result<Vec<CampSummary>> {
        self.db.camps.list_upcoming(Utc::now().date_naive(), city).await
    }

    /// A camp owned by `ngo_id`; other NGOs' camps are reported as not found
    pub async fn get_owned(&self, ngo_id: i64, camp_id: i64) -> Result<BloodCamp> {
        self.db.camps.find_by_id(camp_id).await?
            .filter(|camp| camp.ngo_id == ngo_id)
            .ok_or_else(|| BloodLinkError::not_found("Camp"))
    }

    /// Update camp details
    pub async fn update(&self, ngo_id: i64, camp_id: i64, request: UpdateCampRequest) -> Result<BloodCamp> {
        let camp = self.get_owned(ngo_id, camp_id).await?;
        let request = Self::validate_update(&camp, request, Utc::now().date_naive())?;

        let updated = self.db.camps.update(camp_id, request).await?;
        log_camp_action(camp_id, "update", ngo_id, None);
        Ok(updated)
    }

    /// Validate an update against the stored camp
    pub fn validate_update(camp: &BloodCamp, request: UpdateCampRequest, today: NaiveDate) -> Result<UpdateCampRequest> {
        if !camp.is_active {
            return Err(BloodLinkError::InvalidInput("Cancelled camps cannot be edited".to_string()));
        }

        if let Some(capacity) = request.capacity {
            if capacity < 1 {
                return Err(BloodLinkError::InvalidInput("Capacity must be at least 1".to_string()));
            }
            if capacity < camp.registered_count {
                return Err(BloodLinkError::InvalidInput(format!(
                    "Capacity cannot be lower than the {} registered donors",
                    camp.registered_count
                )));
            }
        }

        if let Some(date) = request.camp_date {
            if date < today {
                return Err(BloodLinkError::InvalidInput("Camp date cannot be in the past".to_string()));
            }
        }

        let required = |value: Option<String>, field: &str| -> Result<Option<String>> {
            match value.map(|v| normalize_whitespace(&v)) {
                Some(v) if v.is_empty() => Err(BloodLinkError::InvalidInput(format!("{} cannot be empty", field))),
                other => Ok(other),
            }
        };

        Ok(UpdateCampRequest {
            name: required(request.name, "Name")?,
            location: required(request.location, "Location")?,
            city: required(request.city, "City")?,
            description: non_empty(request.description),
            start_time: non_empty(request.start_time),
            end_time: non_empty(request.end_time),
            camp_date: request.camp_date,
            capacity: request.capacity,
        })
    }

    /// Cancel a camp: deactivate it, close its open registrations and
    /// notify every affected donor.
    pub async fn cancel(&self, ngo_id: i64, camp_id: i64) -> Result<BloodCamp> {
        self.get_owned(ngo_id, camp_id).await?;

        let mut tx = self.db.begin().await?;

        let camp = self.db.camps.deactivate_in(&mut tx, camp_id).await?
            .ok_or_else(|| BloodLinkError::InvalidInput("Camp is already cancelled".to_string()))?;

        let closed = self.db.registrations.deactivate_open_for_camp(&mut tx, camp_id).await?;
        if !closed.is_empty() {
            self.db.camps.release_seats_in(&mut tx, camp_id, closed.len() as i32).await?;
        }

        let mut params = HashMap::new();
        params.insert("camp", camp.name.clone());
        params.insert("date", camp.camp_date.format("%Y-%m-%d").to_string());
        for registration in &closed {
            self.notifications.notify_in(&mut tx, registration.donor_id, "camp_cancelled", &params).await?;
        }

        let camp = self.db.camps.find_by_id_in(&mut tx, camp_id).await?
            .ok_or_else(|| BloodLinkError::not_found("Camp"))?;

        tx.commit().await?;

        log_camp_action(camp_id, "cancel", ngo_id, Some(&format!("{} registrations closed", closed.len())));
        Ok(camp)
    }

    /// Registrations for a camp owned by `ngo_id`
    pub async fn registrations(&self, ngo_id: i64, camp_id: i64, status: Option<RegistrationStatus>) -> Result<Vec<RegistrationView>> {
        self.get_owned(ngo_id, camp_id).await?;
        self.db.registrations.list_for_camp(camp_id, status).await
    }

    /// Legacy camp rows for an NGO
    pub async fn legacy_camps(&self, ngo_id: i64) -> Result<Vec<LegacyCampDetails>> {
        self.db.camps.list_legacy(ngo_id).await
    }

    /// Turn a legacy row into a historical camp and remove the row
    pub async fn import_legacy(&self, ngo_id: i64, legacy_id: i64) -> Result<BloodCamp> {
        let mut tx = self.db.begin().await?;

        let legacy = self.db.camps.take_legacy_in(&mut tx, legacy_id, ngo_id).await?
            .ok_or_else(|| BloodLinkError::not_found("Legacy camp"))?;
        let camp = self.db.camps.create_historical_in(&mut tx, &legacy).await?;

        tx.commit().await?;

        info!(ngo_id = ngo_id, legacy_id = legacy_id, camp_id = camp.id, "Legacy camp imported");
        Ok(camp)
    }
}
