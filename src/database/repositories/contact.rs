//! Contact details repository implementation

use sqlx::PgPool;
use chrono::Utc;
use crate::models::contact::{ContactDetails, UpsertContactRequest};
use crate::utils::errors::BloodLinkError;

const CONTACT_COLUMNS: &str = "id, user_id, phone, address, city, state, pincode, blood_type, gender, date_of_birth, created_at, updated_at";

#[derive(Clone, Debug)]
pub struct ContactRepository {
    pool: PgPool,
}

impl ContactRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find contact details for a user
    pub async fn find_by_user(&self, user_id: i64) -> Result<Option<ContactDetails>, BloodLinkError> {
        let contact = sqlx::query_as::<_, ContactDetails>(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contact_details WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(contact)
    }

    /// Create contact details; `phone` is required for the first record
    pub async fn create(&self, user_id: i64, phone: String, request: UpsertContactRequest) -> Result<ContactDetails, BloodLinkError> {
        let now = Utc::now();
        let contact = sqlx::query_as::<_, ContactDetails>(&format!(
            r#"
            INSERT INTO contact_details
                (user_id, phone, address, city, state, pincode, blood_type, gender, date_of_birth, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {CONTACT_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(phone)
        .bind(request.address)
        .bind(request.city)
        .bind(request.state)
        .bind(request.pincode)
        .bind(request.blood_type)
        .bind(request.gender)
        .bind(request.date_of_birth)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(contact)
    }

    /// Update contact details, keeping stored values for missing fields
    pub async fn update(&self, user_id: i64, request: UpsertContactRequest) -> Result<ContactDetails, BloodLinkError> {
        let contact = sqlx::query_as::<_, ContactDetails>(&format!(
            r#"
            UPDATE contact_details
            SET phone = COALESCE($2, phone),
                address = COALESCE($3, address),
                city = COALESCE($4, city),
                state = COALESCE($5, state),
                pincode = COALESCE($6, pincode),
                blood_type = COALESCE($7, blood_type),
                gender = COALESCE($8, gender),
                date_of_birth = COALESCE($9, date_of_birth),
                updated_at = $10
            WHERE user_id = $1
            RETURNING {CONTACT_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(request.phone)
        .bind(request.address)
        .bind(request.city)
        .bind(request.state)
        .bind(request.pincode)
        .bind(request.blood_type)
        .bind(request.gender)
        .bind(request.date_of_birth)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| BloodLinkError::not_found("Contact details"))?;

        Ok(contact)
    }
}
