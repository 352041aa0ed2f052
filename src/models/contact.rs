//! Contact details model
//!
//! Extended profile fields stored separately from the core user record,
//! plus the blood type vocabulary shared by registrations and inventory.

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

/// ABO/Rh blood group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "blood_type")]
pub enum BloodType {
    #[serde(rename = "A+")]
    #[sqlx(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    #[sqlx(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    #[sqlx(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    #[sqlx(rename = "B-")]
    BNegative,
    #[serde(rename = "AB+")]
    #[sqlx(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    #[sqlx(rename = "AB-")]
    AbNegative,
    #[serde(rename = "O+")]
    #[sqlx(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    #[sqlx(rename = "O-")]
    ONegative,
}

impl BloodType {
    pub const ALL: [BloodType; 8] = [
        BloodType::APositive,
        BloodType::ANegative,
        BloodType::BPositive,
        BloodType::BNegative,
        BloodType::AbPositive,
        BloodType::AbNegative,
        BloodType::OPositive,
        BloodType::ONegative,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BloodType::APositive => "A+",
            BloodType::ANegative => "A-",
            BloodType::BPositive => "B+",
            BloodType::BNegative => "B-",
            BloodType::AbPositive => "AB+",
            BloodType::AbNegative => "AB-",
            BloodType::OPositive => "O+",
            BloodType::ONegative => "O-",
        }
    }
}

impl fmt::Display for BloodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BloodType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s.split_whitespace().collect::<String>().to_uppercase();
        BloodType::ALL
            .iter()
            .copied()
            .find(|bt| bt.as_str() == normalized)
            .ok_or_else(|| format!("Invalid blood type: {}", s.trim()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ContactDetails {
    pub id: i64,
    pub user_id: i64,
    pub phone: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub blood_type: Option<BloodType>,
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating or updating contact details.
/// `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct UpsertContactRequest {
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub blood_type: Option<BloodType>,
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}
