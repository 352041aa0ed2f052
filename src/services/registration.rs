//! Registration service implementation
//!
//! Donor registrations and their status machine. Every workflow that changes
//! a status, a camp counter and the notification feed runs in one transaction.

use std::collections::{BTreeMap, HashMap};
use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use tracing::{debug, info};
use crate::config::settings::RegistrationConfig;
use crate::database::repositories::BloodTypeCount;
use crate::database::DatabaseService;
use crate::models::{
    BloodType, CreateRegistrationRequest, DonorStats, Registration, RegistrationStatus,
    RegistrationTarget, RegistrationView, TransitionActor, UserRole,
};
use crate::services::notification::NotificationService;
use crate::utils::errors::{BloodLinkError, Result};
use crate::utils::helpers::non_empty;
use crate::utils::logging::log_registration_transition;

/// Registration input as received from a donor
#[derive(Debug, Clone, Default)]
pub struct NewRegistration {
    pub hospital_id: Option<i64>,
    pub camp_id: Option<i64>,
    pub blood_type: Option<String>,
    pub units: Option<i32>,
    pub scheduled_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Donated units grouped by blood type; always lists all eight types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Inventory {
    pub counts: BTreeMap<String, i64>,
    pub total_units: i64,
    pub total_donations: i64,
}

impl Inventory {
    /// Build an inventory from grouped donation counts
    pub fn from_counts(rows: &[BloodTypeCount]) -> Self {
        let mut counts: BTreeMap<String, i64> = BloodType::ALL
            .iter()
            .map(|bt| (bt.as_str().to_string(), 0))
            .collect();

        let mut total_units = 0;
        let mut total_donations = 0;
        for row in rows {
            *counts.entry(row.blood_type.as_str().to_string()).or_insert(0) += row.units;
            total_units += row.units;
            total_donations += row.donations;
        }

        Self {
            counts,
            total_units,
            total_donations,
        }
    }
}

/// Registration service for donor workflows
#[derive(Clone, Debug)]
pub struct RegistrationService {
    db: DatabaseService,
    notifications: NotificationService,
    config: RegistrationConfig,
}

impl RegistrationService {
    /// Create a new RegistrationService instance
    pub fn new(db: DatabaseService, notifications: NotificationService, config: RegistrationConfig) -> Self {
        Self { db, notifications, config }
    }

    /// Validate the unit count, defaulting to one unit
    pub fn validate_units(&self, units: Option<i32>) -> Result<i32> {
        let units = units.unwrap_or(1);
        if units < 1 || units > self.config.max_units_per_registration {
            return Err(BloodLinkError::InvalidInput(format!(
                "Units must be between 1 and {}",
                self.config.max_units_per_registration
            )));
        }
        Ok(units)
    }

    /// First date a donor may register again after donating on `last_donation`
    pub fn next_eligible_date(&self, last_donation: NaiveDate) -> NaiveDate {
        last_donation + Duration::days(self.config.donation_cooldown_days)
    }

    /// Create a registration for a donor
    pub async fn create(&self, donor_id: i64, input: NewRegistration) -> Result<Registration> {
        let target = RegistrationTarget::from_ids(input.hospital_id, input.camp_id)?;
        let units = self.validate_units(input.units)?;
        let today = Utc::now().date_naive();

        if let Some(date) = input.scheduled_date {
            if date < today {
                return Err(BloodLinkError::InvalidInput("Scheduled date cannot be in the past".to_string()));
            }
        }

        let profile = self.db.get_user_profile(donor_id).await?;
        let blood_type = match non_empty(input.blood_type) {
            Some(raw) => raw.parse::<BloodType>().map_err(BloodLinkError::InvalidInput)?,
            None => profile
                .contact_details
                .as_ref()
                .and_then(|contact| contact.blood_type)
                .ok_or_else(|| {
                    BloodLinkError::InvalidInput("Blood type is required; add it to your profile or the request".to_string())
                })?,
        };

        self.check_eligibility(donor_id, today).await?;

        let mut tx = self.db.begin().await?;

        let (owner_id, target_name) = match target {
            RegistrationTarget::Hospital(hospital_id) => {
                let hospital = self.db.users.find_by_id_and_role(hospital_id, UserRole::Hospital).await?
                    .ok_or_else(|| BloodLinkError::not_found("Hospital"))?;
                (hospital.id, hospital.name)
            }
            RegistrationTarget::Camp(camp_id) => {
                let camp = match self.db.camps.reserve_seat_in(&mut tx, camp_id, today).await? {
                    Some(camp) => camp,
                    None => {
                        let existing = self.db.camps.find_by_id_in(&mut tx, camp_id).await?
                            .ok_or_else(|| BloodLinkError::not_found("Camp"))?;
                        let reason = if !existing.is_active {
                            "This camp is no longer active"
                        } else if existing.camp_date < today {
                            "This camp has already taken place"
                        } else {
                            "This camp is full"
                        };
                        return Err(BloodLinkError::InvalidInput(reason.to_string()));
                    }
                };
                (camp.ngo_id, camp.name)
            }
        };

        let registration = self.db.registrations.create_in(&mut tx, CreateRegistrationRequest {
            donor_id,
            target,
            blood_type,
            units,
            scheduled_date: input.scheduled_date,
            notes: non_empty(input.notes),
        }).await?;

        let mut params = HashMap::new();
        params.insert("donor", profile.user.name.clone());
        params.insert("blood_type", blood_type.to_string());
        params.insert("target", target_name);
        self.notifications.notify_in(&mut tx, owner_id, "registration_received", &params).await?;

        tx.commit().await?;

        info!(
            registration_id = registration.id,
            donor_id = donor_id,
            blood_type = %blood_type,
            "Registration created"
        );
        Ok(registration)
    }

    async fn check_eligibility(&self, donor_id: i64, today: NaiveDate) -> Result<()> {
        if let Some(open) = self.db.registrations.find_open_for_donor(donor_id).await? {
            debug!(donor_id = donor_id, registration_id = open.id, "Donor already has an open registration");
            return Err(BloodLinkError::InvalidInput(
                "You already have an open registration; withdraw it first".to_string(),
            ));
        }

        if let Some(last) = self.db.registrations.last_donation_at(donor_id).await? {
            let eligible = self.next_eligible_date(last.date_naive());
            if today < eligible {
                return Err(BloodLinkError::InvalidInput(format!(
                    "You can donate again from {}",
                    eligible.format("%Y-%m-%d")
                )));
            }
        }

        Ok(())
    }

    /// Registrations created by a donor
    pub async fn list_for_donor(&self, donor_id: i64) -> Result<Vec<RegistrationView>> {
        self.db.registrations.list_for_donor(donor_id).await
    }

    /// Registrations targeting a hospital
    pub async fn list_for_hospital(&self, hospital_id: i64, status: Option<RegistrationStatus>) -> Result<Vec<RegistrationView>> {
        self.db.registrations.list_for_hospital(hospital_id, status).await
    }

    /// Donor withdraws their own open registration
    pub async fn withdraw(&self, donor_id: i64, registration_id: i64) -> Result<Registration> {
        let mut tx = self.db.begin().await?;

        let current = self.db.registrations.find_for_update(&mut tx, registration_id).await?
            .filter(|registration| registration.donor_id == donor_id)
            .ok_or_else(|| BloodLinkError::not_found("Registration"))?;

        let to = current.status.transition(RegistrationStatus::Inactive, TransitionActor::Donor)?;
        let updated = self.apply_transition(&mut tx, &current, to).await?;

        let donor = self.db.users.find_by_id(donor_id).await?
            .ok_or_else(|| BloodLinkError::not_found("User"))?;
        let (owner_id, target_name) = self.owner_of_in(&mut tx, &current).await?;

        let mut params = HashMap::new();
        params.insert("donor", donor.name);
        params.insert("target", target_name);
        self.notifications.notify_in(&mut tx, owner_id, "registration_withdrawn", &params).await?;

        tx.commit().await?;

        log_registration_transition(updated.id, donor_id, current.status.as_str(), to.as_str());
        Ok(updated)
    }

    /// Hospital or NGO moves a registration it owns to `to`.
    ///
    /// A registration the caller does not own is reported as not found.
    pub async fn owner_transition(
        &self,
        owner_id: i64,
        owner_role: UserRole,
        registration_id: i64,
        to: RegistrationStatus,
    ) -> Result<Registration> {
        let mut tx = self.db.begin().await?;

        let current = self.db.registrations.find_for_update(&mut tx, registration_id).await?
            .ok_or_else(|| BloodLinkError::not_found("Registration"))?;

        let (target_owner, target_name) = match (owner_role, current.hospital_id, current.camp_id) {
            (UserRole::Hospital, Some(_), None) | (UserRole::Ngo, None, Some(_)) => {
                self.owner_of_in(&mut tx, &current).await?
            }
            _ => return Err(BloodLinkError::not_found("Registration")),
        };
        if target_owner != owner_id {
            return Err(BloodLinkError::not_found("Registration"));
        }

        let to = current.status.transition(to, TransitionActor::Owner)?;
        let updated = self.apply_transition(&mut tx, &current, to).await?;

        let mut params = HashMap::new();
        params.insert("target", target_name);
        self.notifications
            .notify_in(&mut tx, current.donor_id, NotificationService::status_template(to), &params)
            .await?;

        tx.commit().await?;

        log_registration_transition(updated.id, owner_id, current.status.as_str(), to.as_str());
        Ok(updated)
    }

    /// Conditional status update plus the camp counter change it implies
    async fn apply_transition(
        &self,
        conn: &mut PgConnection,
        current: &Registration,
        to: RegistrationStatus,
    ) -> Result<Registration> {
        let updated = self.db.registrations
            .update_status_in(conn, current.id, current.status, to)
            .await?
            .ok_or_else(|| BloodLinkError::InvalidStateTransition {
                from: current.status.to_string(),
                to: to.to_string(),
            })?;

        if let Some(camp_id) = current.camp_id {
            match to {
                RegistrationStatus::Rejected | RegistrationStatus::Inactive => {
                    self.db.camps.release_seats_in(conn, camp_id, 1).await?;
                }
                RegistrationStatus::Donated => {
                    self.db.camps.record_donation_in(conn, camp_id).await?;
                }
                RegistrationStatus::Requested | RegistrationStatus::Approved => {}
            }
        }

        Ok(updated)
    }

    /// Owner user id and display name of a registration's target
    async fn owner_of_in(&self, conn: &mut PgConnection, registration: &Registration) -> Result<(i64, String)> {
        match (registration.hospital_id, registration.camp_id) {
            (Some(hospital_id), _) => {
                let hospital = self.db.users.find_by_id(hospital_id).await?
                    .ok_or_else(|| BloodLinkError::not_found("Hospital"))?;
                Ok((hospital.id, hospital.name))
            }
            (None, Some(camp_id)) => {
                let camp = self.db.camps.find_by_id_in(conn, camp_id).await?
                    .ok_or_else(|| BloodLinkError::not_found("Camp"))?;
                Ok((camp.ngo_id, camp.name))
            }
            (None, None) => Err(BloodLinkError::not_found("Registration")),
        }
    }

    /// Donation history for a donor
    pub async fn donor_stats(&self, donor_id: i64) -> Result<DonorStats> {
        let (total_donations, units_donated) = self.db.registrations.donor_totals(donor_id).await?;
        let last_donation = self.db.registrations.last_donation_at(donor_id).await?;
        let open_registration = self.db.registrations.find_open_for_donor(donor_id).await?.map(|r| r.id);

        Ok(DonorStats {
            total_donations,
            units_donated,
            last_donation,
            next_eligible_date: last_donation.map(|at| self.next_eligible_date(at.date_naive())),
            open_registration,
        })
    }

    /// Inventory of donations received by a hospital
    pub async fn hospital_inventory(&self, hospital_id: i64) -> Result<Inventory> {
        let rows = self.db.registrations.blood_type_counts_for_hospital(hospital_id).await?;
        Ok(Inventory::from_counts(&rows))
    }

    /// Inventory of donations collected at an NGO's camps
    pub async fn ngo_inventory(&self, ngo_id: i64) -> Result<Inventory> {
        let rows = self.db.registrations.blood_type_counts_for_ngo(ngo_id).await?;
        Ok(Inventory::from_counts(&rows))
    }
}
