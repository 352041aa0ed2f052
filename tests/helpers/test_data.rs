//! Test identities and request bodies

use std::sync::atomic::{AtomicU32, Ordering};
use axum::http::StatusCode;
use chrono::{Duration, Utc};
use fake::faker::company::en::CompanyName;
use fake::faker::name::en::Name;
use fake::Fake;
use serde_json::{json, Value};
use super::test_app::TestApp;

static SEQUENCE: AtomicU32 = AtomicU32::new(1);

pub const TEST_PASSWORD: &str = "donate-blood-2024";

fn next() -> u32 {
    SEQUENCE.fetch_add(1, Ordering::SeqCst)
}

/// A signed-up account with its session cookie
#[derive(Debug, Clone)]
pub struct TestAccount {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub cookie: String,
}

pub fn signup_body(role: &str) -> Value {
    let n = next();
    let name: String = match role {
        "donor" => Name().fake(),
        _ => CompanyName().fake(),
    };
    json!({
        "name": name,
        "email": format!("{}{}@example.com", role, n),
        "password": TEST_PASSWORD,
        "role": role,
    })
}

/// Unique, valid phone number
pub fn phone() -> String {
    format!("98{:08}", next())
}

pub fn camp_body(capacity: i32) -> Value {
    let date = (Utc::now() + Duration::days(14)).date_naive();
    json!({
        "name": format!("Blood Drive {}", next()),
        "location": "Community Centre",
        "city": "Pune",
        "camp_date": date.format("%Y-%m-%d").to_string(),
        "capacity": capacity,
    })
}

impl TestApp {
    /// Sign up a new account and return it with its cookie
    pub async fn signup(&self, role: &str) -> TestAccount {
        let body = signup_body(role);
        let response = self.post("/api/auth/signup", None, body.clone()).await;
        assert_eq!(response.status, StatusCode::CREATED, "signup failed: {:?}", response.body);

        TestAccount {
            id: response.body["user"]["id"].as_i64().expect("user id"),
            name: body["name"].as_str().unwrap_or_default().to_string(),
            email: body["email"].as_str().unwrap_or_default().to_string(),
            cookie: response.session_cookie().expect("session cookie"),
        }
    }

    /// Sign up a donor with contact details and a blood type
    pub async fn donor_with_profile(&self, blood_type: &str) -> TestAccount {
        let donor = self.signup("donor").await;
        let response = self.put("/api/user/profile", Some(&donor.cookie), json!({
            "phone": phone(),
            "city": "Pune",
            "blood_type": blood_type,
        })).await;
        assert_eq!(response.status, StatusCode::OK, "profile failed: {:?}", response.body);
        donor
    }

    /// Notification titles for an account, newest first
    pub async fn notification_titles(&self, account: &TestAccount) -> Vec<String> {
        let response = self.get("/api/notifications", Some(&account.cookie)).await;
        assert_eq!(response.status, StatusCode::OK);
        response.body
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|n| n["title"].as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}
