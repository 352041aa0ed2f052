//! Blood camp model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BloodCamp {
    pub id: i64,
    pub ngo_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub location: String,
    pub city: String,
    pub camp_date: NaiveDate,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub capacity: i32,
    pub registered_count: i32,
    pub donated_count: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BloodCamp {
    pub fn seats_left(&self) -> i32 {
        (self.capacity - self.registered_count).max(0)
    }

    /// Active, not in the past, and not full
    pub fn accepts_registrations(&self, today: NaiveDate) -> bool {
        self.is_active && self.camp_date >= today && self.seats_left() > 0
    }
}

/// Camp listing entry shown to donors
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CampSummary {
    pub id: i64,
    pub ngo_id: i64,
    pub ngo_name: String,
    pub name: String,
    pub description: Option<String>,
    pub location: String,
    pub city: String,
    pub camp_date: NaiveDate,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub capacity: i32,
    pub registered_count: i32,
    pub seats_left: i32,
}

#[derive(Debug, Clone)]
pub struct CreateCampRequest {
    pub ngo_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub location: String,
    pub city: String,
    pub camp_date: NaiveDate,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub capacity: i32,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateCampRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub city: Option<String>,
    pub camp_date: Option<NaiveDate>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub capacity: Option<i32>,
}

/// Row of the legacy `camp_details` collection
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LegacyCampDetails {
    pub id: i64,
    pub ngo_id: i64,
    pub camp_name: String,
    pub location: String,
    pub camp_date: NaiveDate,
    pub total_donors: i32,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camp(capacity: i32, registered: i32, date: NaiveDate, active: bool) -> BloodCamp {
        BloodCamp {
            id: 1,
            ngo_id: 2,
            name: "City Drive".to_string(),
            description: None,
            location: "Town Hall".to_string(),
            city: "Pune".to_string(),
            camp_date: date,
            start_time: None,
            end_time: None,
            capacity,
            registered_count: registered,
            donated_count: 0,
            is_active: active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_accepts_registrations() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let tomorrow = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();
        let yesterday = NaiveDate::from_ymd_opt(2024, 5, 31).unwrap();

        assert!(camp(10, 3, tomorrow, true).accepts_registrations(today));
        assert!(camp(10, 3, today, true).accepts_registrations(today));
        assert!(!camp(10, 10, tomorrow, true).accepts_registrations(today));
        assert!(!camp(10, 3, yesterday, true).accepts_registrations(today));
        assert!(!camp(10, 3, tomorrow, false).accepts_registrations(today));
    }

    #[test]
    fn test_seats_left_never_negative() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert_eq!(camp(5, 7, date, true).seats_left(), 0);
        assert_eq!(camp(5, 2, date, true).seats_left(), 3);
    }
}
