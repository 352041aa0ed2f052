//! User model

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::contact::ContactDetails;

/// Account role; decides which part of the API a user may call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum UserRole {
    Donor,
    Hospital,
    Ngo,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Donor => "donor",
            UserRole::Hospital => "hospital",
            UserRole::Ngo => "ngo",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "donor" => Ok(UserRole::Donor),
            "hospital" => Ok(UserRole::Hospital),
            "ngo" => Ok(UserRole::Ngo),
            other => Err(format!("Invalid role: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub password_hash: Option<String>,
}

/// User together with the optional contact details record
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub user: User,
    pub contact_details: Option<ContactDetails>,
}

/// Hospital listing entry shown to donors
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct HospitalSummary {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!("Donor".parse::<UserRole>(), Ok(UserRole::Donor));
        assert_eq!(" ngo ".parse::<UserRole>(), Ok(UserRole::Ngo));
        assert!("admin".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User {
            id: 1,
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            role: UserRole::Donor,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let value = serde_json::to_value(&user).unwrap();
        assert!(value.get("password_hash").is_none());
        assert_eq!(value["role"], "donor");
    }
}
