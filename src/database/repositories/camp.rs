//! Blood camp repository implementation
//!
//! Seat counters are only ever changed with conditional updates so the
//! `registered_count <= capacity` invariant holds under concurrent requests.

use sqlx::{PgConnection, PgPool};
use chrono::{NaiveDate, Utc};
use crate::models::camp::{BloodCamp, CampSummary, CreateCampRequest, LegacyCampDetails, UpdateCampRequest};
use crate::utils::errors::BloodLinkError;

const CAMP_COLUMNS: &str = "id, ngo_id, name, description, location, city, camp_date, start_time, end_time, capacity, registered_count, donated_count, is_active, created_at, updated_at";

const LEGACY_COLUMNS: &str = "id, ngo_id, camp_name, location, camp_date, total_donors, notes, created_at";

#[derive(Clone, Debug)]
pub struct CampRepository {
    pool: PgPool,
}

impl CampRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new camp
    pub async fn create(&self, request: CreateCampRequest) -> Result<BloodCamp, BloodLinkError> {
        let now = Utc::now();
        let camp = sqlx::query_as::<_, BloodCamp>(&format!(
            r#"
            INSERT INTO blood_camps
                (ngo_id, name, description, location, city, camp_date, start_time, end_time, capacity, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {CAMP_COLUMNS}
            "#
        ))
        .bind(request.ngo_id)
        .bind(request.name)
        .bind(request.description)
        .bind(request.location)
        .bind(request.city)
        .bind(request.camp_date)
        .bind(request.start_time)
        .bind(request.end_time)
        .bind(request.capacity)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(camp)
    }

    /// Find camp by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<BloodCamp>, BloodLinkError> {
        let camp = sqlx::query_as::<_, BloodCamp>(&format!(
            "SELECT {CAMP_COLUMNS} FROM blood_camps WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(camp)
    }

    /// Find camp by ID inside a transaction
    pub async fn find_by_id_in(&self, conn: &mut PgConnection, id: i64) -> Result<Option<BloodCamp>, BloodLinkError> {
        let camp = sqlx::query_as::<_, BloodCamp>(&format!(
            "SELECT {CAMP_COLUMNS} FROM blood_camps WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(camp)
    }

    /// Camps run by an NGO, latest camp date first
    pub async fn list_for_ngo(&self, ngo_id: i64) -> Result<Vec<BloodCamp>, BloodLinkError> {
        let camps = sqlx::query_as::<_, BloodCamp>(&format!(
            "SELECT {CAMP_COLUMNS} FROM blood_camps WHERE ngo_id = $1 ORDER BY camp_date DESC, id DESC"
        ))
        .bind(ngo_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(camps)
    }

    /// Active camps on or after `today`, soonest first
    pub async fn list_upcoming(&self, today: NaiveDate, city: Option<&str>) -> Result<Vec<CampSummary>, BloodLinkError> {
        let camps = sqlx::query_as::<_, CampSummary>(
            r#"
            SELECT bc.id, bc.ngo_id, u.name AS ngo_name, bc.name, bc.description, bc.location, bc.city,
                   bc.camp_date, bc.start_time, bc.end_time, bc.capacity, bc.registered_count,
                   GREATEST(bc.capacity - bc.registered_count, 0) AS seats_left
            FROM blood_camps bc
            JOIN users u ON u.id = bc.ngo_id
            WHERE bc.is_active AND bc.camp_date >= $1
              AND ($2::TEXT IS NULL OR lower(bc.city) = lower($2))
            ORDER BY bc.camp_date ASC, bc.id ASC
            "#
        )
        .bind(today)
        .bind(city)
        .fetch_all(&self.pool)
        .await?;

        Ok(camps)
    }

    /// Update camp details, keeping stored values for missing fields
    pub async fn update(&self, id: i64, request: UpdateCampRequest) -> Result<BloodCamp, BloodLinkError> {
        let camp = sqlx::query_as::<_, BloodCamp>(&format!(
            r#"
            UPDATE blood_camps
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                location = COALESCE($4, location),
                city = COALESCE($5, city),
                camp_date = COALESCE($6, camp_date),
                start_time = COALESCE($7, start_time),
                end_time = COALESCE($8, end_time),
                capacity = COALESCE($9, capacity),
                updated_at = $10
            WHERE id = $1
            RETURNING {CAMP_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(request.name)
        .bind(request.description)
        .bind(request.location)
        .bind(request.city)
        .bind(request.camp_date)
        .bind(request.start_time)
        .bind(request.end_time)
        .bind(request.capacity)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| BloodLinkError::not_found("Camp"))?;

        Ok(camp)
    }

    /// Deactivate a camp
    pub async fn deactivate_in(&self, conn: &mut PgConnection, id: i64) -> Result<Option<BloodCamp>, BloodLinkError> {
        let camp = sqlx::query_as::<_, BloodCamp>(&format!(
            r#"
            UPDATE blood_camps
            SET is_active = FALSE, updated_at = $2
            WHERE id = $1 AND is_active
            RETURNING {CAMP_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(Utc::now())
        .fetch_optional(&mut *conn)
        .await?;

        Ok(camp)
    }

    /// Take one seat; `None` when the camp is inactive, past or full
    pub async fn reserve_seat_in(&self, conn: &mut PgConnection, id: i64, today: NaiveDate) -> Result<Option<BloodCamp>, BloodLinkError> {
        let camp = sqlx::query_as::<_, BloodCamp>(&format!(
            r#"
            UPDATE blood_camps
            SET registered_count = registered_count + 1, updated_at = $3
            WHERE id = $1 AND is_active AND camp_date >= $2 AND registered_count < capacity
            RETURNING {CAMP_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(today)
        .bind(Utc::now())
        .fetch_optional(&mut *conn)
        .await?;

        Ok(camp)
    }

    /// Give back `seats` seats
    pub async fn release_seats_in(&self, conn: &mut PgConnection, id: i64, seats: i32) -> Result<(), BloodLinkError> {
        sqlx::query(
            r#"
            UPDATE blood_camps
            SET registered_count = GREATEST(registered_count - $2, 0), updated_at = $3
            WHERE id = $1
            "#
        )
        .bind(id)
        .bind(seats)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Count one completed donation
    pub async fn record_donation_in(&self, conn: &mut PgConnection, id: i64) -> Result<(), BloodLinkError> {
        sqlx::query(
            "UPDATE blood_camps SET donated_count = donated_count + 1, updated_at = $2 WHERE id = $1"
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Legacy camp rows for an NGO
    pub async fn list_legacy(&self, ngo_id: i64) -> Result<Vec<LegacyCampDetails>, BloodLinkError> {
        let rows = sqlx::query_as::<_, LegacyCampDetails>(&format!(
            "SELECT {LEGACY_COLUMNS} FROM camp_details WHERE ngo_id = $1 ORDER BY camp_date DESC"
        ))
        .bind(ngo_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Remove a legacy row owned by `ngo_id`, returning it
    pub async fn take_legacy_in(&self, conn: &mut PgConnection, id: i64, ngo_id: i64) -> Result<Option<LegacyCampDetails>, BloodLinkError> {
        let row = sqlx::query_as::<_, LegacyCampDetails>(&format!(
            "DELETE FROM camp_details WHERE id = $1 AND ngo_id = $2 RETURNING {LEGACY_COLUMNS}"
        ))
        .bind(id)
        .bind(ngo_id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(row)
    }

    /// Insert a finished, inactive camp built from a legacy row
    pub async fn create_historical_in(&self, conn: &mut PgConnection, legacy: &LegacyCampDetails) -> Result<BloodCamp, BloodLinkError> {
        let donors = legacy.total_donors.max(0);
        let now = Utc::now();

        let camp = sqlx::query_as::<_, BloodCamp>(&format!(
            r#"
            INSERT INTO blood_camps
                (ngo_id, name, description, location, city, camp_date, capacity,
                 registered_count, donated_count, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4, $5, $6, $7, $7, FALSE, $8, $9)
            RETURNING {CAMP_COLUMNS}
            "#
        ))
        .bind(legacy.ngo_id)
        .bind(&legacy.camp_name)
        .bind(&legacy.notes)
        .bind(&legacy.location)
        .bind(legacy.camp_date)
        .bind(donors.max(1))
        .bind(donors)
        .bind(legacy.created_at)
        .bind(now)
        .fetch_one(&mut *conn)
        .await?;

        Ok(camp)
    }
}
