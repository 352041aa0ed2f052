//! Registration model
//!
//! A donor's application to donate at a hospital or at an NGO camp, and the
//! status machine that governs it.

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

use super::contact::BloodType;
use crate::utils::errors::BloodLinkError;

/// Lifecycle status of a registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "registration_status", rename_all = "lowercase")]
pub enum RegistrationStatus {
    Requested,
    Approved,
    Rejected,
    Donated,
    Inactive,
}

/// Who is asking for a status change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionActor {
    /// The donor who created the registration
    Donor,
    /// The hospital or NGO the registration targets
    Owner,
}

impl RegistrationStatus {
    pub const ALL: [RegistrationStatus; 5] = [
        RegistrationStatus::Requested,
        RegistrationStatus::Approved,
        RegistrationStatus::Rejected,
        RegistrationStatus::Donated,
        RegistrationStatus::Inactive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationStatus::Requested => "requested",
            RegistrationStatus::Approved => "approved",
            RegistrationStatus::Rejected => "rejected",
            RegistrationStatus::Donated => "donated",
            RegistrationStatus::Inactive => "inactive",
        }
    }

    /// Requested or approved
    pub fn is_open(&self) -> bool {
        matches!(self, RegistrationStatus::Requested | RegistrationStatus::Approved)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_open()
    }

    /// Whether `actor` may move a registration from `self` to `to`
    pub fn can_transition(&self, to: RegistrationStatus, actor: TransitionActor) -> bool {
        use RegistrationStatus::*;

        match (self, to, actor) {
            (Requested, Approved, TransitionActor::Owner) => true,
            (Requested, Rejected, TransitionActor::Owner) => true,
            (Approved, Donated, TransitionActor::Owner) => true,
            (Requested | Approved, Inactive, TransitionActor::Donor) => true,
            _ => false,
        }
    }

    /// Validate a transition, returning the target status
    pub fn transition(
        &self,
        to: RegistrationStatus,
        actor: TransitionActor,
    ) -> Result<RegistrationStatus, BloodLinkError> {
        if self.can_transition(to, actor) {
            Ok(to)
        } else {
            Err(BloodLinkError::InvalidStateTransition {
                from: self.to_string(),
                to: to.to_string(),
            })
        }
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegistrationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        RegistrationStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| format!("Invalid status: {}", s.trim()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Registration {
    pub id: i64,
    pub donor_id: i64,
    pub hospital_id: Option<i64>,
    pub camp_id: Option<i64>,
    pub blood_type: BloodType,
    pub units: i32,
    pub status: RegistrationStatus,
    pub scheduled_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Where a donor wants to donate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationTarget {
    Hospital(i64),
    Camp(i64),
}

impl RegistrationTarget {
    /// Exactly one of the two ids must be present
    pub fn from_ids(hospital_id: Option<i64>, camp_id: Option<i64>) -> Result<Self, BloodLinkError> {
        match (hospital_id, camp_id) {
            (Some(id), None) => Ok(RegistrationTarget::Hospital(id)),
            (None, Some(id)) => Ok(RegistrationTarget::Camp(id)),
            (Some(_), Some(_)) => Err(BloodLinkError::InvalidInput(
                "Register with either a hospital or a camp, not both".to_string(),
            )),
            (None, None) => Err(BloodLinkError::InvalidInput(
                "A hospital_id or camp_id is required".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateRegistrationRequest {
    pub donor_id: i64,
    pub target: RegistrationTarget,
    pub blood_type: BloodType,
    pub units: i32,
    pub scheduled_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Registration joined with the donor and target for listings
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RegistrationView {
    pub id: i64,
    pub donor_id: i64,
    pub donor_name: String,
    pub donor_email: String,
    pub donor_phone: Option<String>,
    pub hospital_id: Option<i64>,
    pub hospital_name: Option<String>,
    pub camp_id: Option<i64>,
    pub camp_name: Option<String>,
    pub camp_date: Option<NaiveDate>,
    pub blood_type: BloodType,
    pub units: i32,
    pub status: RegistrationStatus,
    pub scheduled_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Donation history summary for a donor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DonorStats {
    pub total_donations: i64,
    pub units_donated: i64,
    pub last_donation: Option<DateTime<Utc>>,
    pub next_eligible_date: Option<NaiveDate>,
    pub open_registration: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use RegistrationStatus::*;

    #[test]
    fn test_owner_transitions() {
        assert!(Requested.can_transition(Approved, TransitionActor::Owner));
        assert!(Requested.can_transition(Rejected, TransitionActor::Owner));
        assert!(Approved.can_transition(Donated, TransitionActor::Owner));
        assert!(!Requested.can_transition(Donated, TransitionActor::Owner));
        assert!(!Approved.can_transition(Rejected, TransitionActor::Owner));
        assert!(!Requested.can_transition(Inactive, TransitionActor::Owner));
    }

    #[test]
    fn test_donor_transitions() {
        assert!(Requested.can_transition(Inactive, TransitionActor::Donor));
        assert!(Approved.can_transition(Inactive, TransitionActor::Donor));
        assert!(!Requested.can_transition(Approved, TransitionActor::Donor));
        assert!(!Donated.can_transition(Inactive, TransitionActor::Donor));
    }

    #[test]
    fn test_transition_error() {
        let err = Donated.transition(Approved, TransitionActor::Owner).unwrap_err();
        assert_eq!(err.to_string(), "Cannot change status from donated to approved");
    }

    #[test]
    fn test_target_from_ids() {
        assert_eq!(RegistrationTarget::from_ids(Some(1), None).unwrap(), RegistrationTarget::Hospital(1));
        assert_eq!(RegistrationTarget::from_ids(None, Some(2)).unwrap(), RegistrationTarget::Camp(2));
        assert!(RegistrationTarget::from_ids(Some(1), Some(2)).is_err());
        assert!(RegistrationTarget::from_ids(None, None).is_err());
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("Approved".parse::<RegistrationStatus>(), Ok(Approved));
        assert!("pending".parse::<RegistrationStatus>().is_err());
    }

    fn any_status() -> impl Strategy<Value = RegistrationStatus> {
        (0usize..5).prop_map(|i| RegistrationStatus::ALL[i])
    }

    fn any_actor() -> impl Strategy<Value = TransitionActor> {
        prop_oneof![Just(TransitionActor::Donor), Just(TransitionActor::Owner)]
    }

    proptest! {
        #[test]
        fn terminal_states_are_final(from in any_status(), to in any_status(), actor in any_actor()) {
            if from.is_terminal() {
                prop_assert!(!from.can_transition(to, actor));
            }
        }

        #[test]
        fn no_self_transitions(status in any_status(), actor in any_actor()) {
            prop_assert!(!status.can_transition(status, actor));
        }

        #[test]
        fn nothing_returns_to_requested(from in any_status(), actor in any_actor()) {
            prop_assert!(!from.can_transition(Requested, actor));
        }

        #[test]
        fn donor_can_only_withdraw(from in any_status(), to in any_status()) {
            if from.can_transition(to, TransitionActor::Donor) {
                prop_assert_eq!(to, Inactive);
            }
        }
    }
}
