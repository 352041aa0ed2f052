//! User repository implementation

use sqlx::{PgConnection, PgPool};
use chrono::Utc;
use crate::models::user::{User, UserRole, CreateUserRequest, UpdateUserRequest, HospitalSummary};
use crate::utils::errors::BloodLinkError;

const USER_COLUMNS: &str = "id, name, email, password_hash, role, created_at, updated_at";

#[derive(Clone)]
#[derive(Debug)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user
    pub async fn create(&self, request: CreateUserRequest) -> Result<User, BloodLinkError> {
        let now = Utc::now();
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (name, email, password_hash, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(request.name)
        .bind(request.email)
        .bind(request.password_hash)
        .bind(request.role)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find user by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, BloodLinkError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find user by ID, restricted to one role
    pub async fn find_by_id_and_role(&self, id: i64, role: UserRole) -> Result<Option<User>, BloodLinkError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND role = $2"
        ))
        .bind(id)
        .bind(role)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find user by (normalized) email
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, BloodLinkError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Update user
    pub async fn update(&self, id: i64, request: UpdateUserRequest) -> Result<User, BloodLinkError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                password_hash = COALESCE($3, password_hash),
                updated_at = $4
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(request.name)
        .bind(request.password_hash)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| BloodLinkError::not_found("User"))?;

        Ok(user)
    }

    /// Delete user; dependent rows go with it via ON DELETE CASCADE
    pub async fn delete_in(&self, conn: &mut PgConnection, id: i64) -> Result<bool, BloodLinkError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List hospitals, optionally filtered by exact city, ignoring case
    pub async fn list_hospitals(&self, city: Option<&str>) -> Result<Vec<HospitalSummary>, BloodLinkError> {
        let hospitals = sqlx::query_as::<_, HospitalSummary>(
            r#"
            SELECT u.id, u.name, u.email, c.phone, c.address, c.city
            FROM users u
            LEFT JOIN contact_details c ON c.user_id = u.id
            WHERE u.role = 'hospital'
              AND ($1::TEXT IS NULL OR lower(c.city) = lower($1))
            ORDER BY u.name ASC
            "#
        )
        .bind(city)
        .fetch_all(&self.pool)
        .await?;

        Ok(hospitals)
    }
}
