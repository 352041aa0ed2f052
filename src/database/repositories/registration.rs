//! Registration repository implementation

use sqlx::{PgConnection, PgPool};
use chrono::{DateTime, Utc};
use crate::models::contact::BloodType;
use crate::models::registration::{
    CreateRegistrationRequest, Registration, RegistrationStatus, RegistrationTarget, RegistrationView,
};
use crate::utils::errors::BloodLinkError;

const REGISTRATION_COLUMNS: &str = "id, donor_id, hospital_id, camp_id, blood_type, units, status, scheduled_date, notes, created_at, updated_at";

const VIEW_SELECT: &str = r#"
    SELECT r.id, r.donor_id, d.name AS donor_name, d.email AS donor_email, dc.phone AS donor_phone,
           r.hospital_id, h.name AS hospital_name,
           r.camp_id, bc.name AS camp_name, bc.camp_date,
           r.blood_type, r.units, r.status, r.scheduled_date, r.notes, r.created_at, r.updated_at
    FROM registrations r
    JOIN users d ON d.id = r.donor_id
    LEFT JOIN contact_details dc ON dc.user_id = r.donor_id
    LEFT JOIN users h ON h.id = r.hospital_id
    LEFT JOIN blood_camps bc ON bc.id = r.camp_id
"#;

/// Donation counts for one blood type
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BloodTypeCount {
    pub blood_type: BloodType,
    pub donations: i64,
    pub units: i64,
}

#[derive(Clone, Debug)]
pub struct RegistrationRepository {
    pool: PgPool,
}

impl RegistrationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new registration in `requested` status
    pub async fn create_in(&self, conn: &mut PgConnection, request: CreateRegistrationRequest) -> Result<Registration, BloodLinkError> {
        let (hospital_id, camp_id) = match request.target {
            RegistrationTarget::Hospital(id) => (Some(id), None),
            RegistrationTarget::Camp(id) => (None, Some(id)),
        };
        let now = Utc::now();

        let registration = sqlx::query_as::<_, Registration>(&format!(
            r#"
            INSERT INTO registrations
                (donor_id, hospital_id, camp_id, blood_type, units, status, scheduled_date, notes, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {REGISTRATION_COLUMNS}
            "#
        ))
        .bind(request.donor_id)
        .bind(hospital_id)
        .bind(camp_id)
        .bind(request.blood_type)
        .bind(request.units)
        .bind(RegistrationStatus::Requested)
        .bind(request.scheduled_date)
        .bind(request.notes)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *conn)
        .await?;

        Ok(registration)
    }

    /// Find registration by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Registration>, BloodLinkError> {
        let registration = sqlx::query_as::<_, Registration>(&format!(
            "SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(registration)
    }

    /// Find registration by ID and lock the row for the rest of the transaction
    pub async fn find_for_update(&self, conn: &mut PgConnection, id: i64) -> Result<Option<Registration>, BloodLinkError> {
        let registration = sqlx::query_as::<_, Registration>(&format!(
            "SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(registration)
    }

    /// Move a registration from `from` to `to`.
    ///
    /// Returns `None` when the row is no longer in `from`, so a transition is
    /// applied at most once.
    pub async fn update_status_in(
        &self,
        conn: &mut PgConnection,
        id: i64,
        from: RegistrationStatus,
        to: RegistrationStatus,
    ) -> Result<Option<Registration>, BloodLinkError> {
        let registration = sqlx::query_as::<_, Registration>(&format!(
            r#"
            UPDATE registrations
            SET status = $3, updated_at = $4
            WHERE id = $1 AND status = $2
            RETURNING {REGISTRATION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(from)
        .bind(to)
        .bind(Utc::now())
        .fetch_optional(&mut *conn)
        .await?;

        Ok(registration)
    }

    /// Mark every open registration for a camp inactive
    pub async fn deactivate_open_for_camp(&self, conn: &mut PgConnection, camp_id: i64) -> Result<Vec<Registration>, BloodLinkError> {
        let registrations = sqlx::query_as::<_, Registration>(&format!(
            r#"
            UPDATE registrations
            SET status = 'inactive', updated_at = $2
            WHERE camp_id = $1 AND status IN ('requested', 'approved')
            RETURNING {REGISTRATION_COLUMNS}
            "#
        ))
        .bind(camp_id)
        .bind(Utc::now())
        .fetch_all(&mut *conn)
        .await?;

        Ok(registrations)
    }

    /// Mark every open registration of a donor inactive
    pub async fn deactivate_open_for_donor_in(&self, conn: &mut PgConnection, donor_id: i64) -> Result<Vec<Registration>, BloodLinkError> {
        let registrations = sqlx::query_as::<_, Registration>(&format!(
            r#"
            UPDATE registrations
            SET status = 'inactive', updated_at = $2
            WHERE donor_id = $1 AND status IN ('requested', 'approved')
            RETURNING {REGISTRATION_COLUMNS}
            "#
        ))
        .bind(donor_id)
        .bind(Utc::now())
        .fetch_all(&mut *conn)
        .await?;

        Ok(registrations)
    }

    /// The donor's open (requested or approved) registration, if any
    pub async fn find_open_for_donor(&self, donor_id: i64) -> Result<Option<Registration>, BloodLinkError> {
        let registration = sqlx::query_as::<_, Registration>(&format!(
            r#"
            SELECT {REGISTRATION_COLUMNS} FROM registrations
            WHERE donor_id = $1 AND status IN ('requested', 'approved')
            ORDER BY created_at DESC
            LIMIT 1
            "#
        ))
        .bind(donor_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(registration)
    }

    /// When the donor last donated
    pub async fn last_donation_at(&self, donor_id: i64) -> Result<Option<DateTime<Utc>>, BloodLinkError> {
        let row: (Option<DateTime<Utc>>,) = sqlx::query_as(
            "SELECT MAX(updated_at) FROM registrations WHERE donor_id = $1 AND status = 'donated'"
        )
        .bind(donor_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.0)
    }

    /// Number of donations and units donated by a donor
    pub async fn donor_totals(&self, donor_id: i64) -> Result<(i64, i64), BloodLinkError> {
        let row: (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COALESCE(SUM(units), 0)::BIGINT
            FROM registrations
            WHERE donor_id = $1 AND status = 'donated'
            "#
        )
        .bind(donor_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// Registrations created by a donor, newest first
    pub async fn list_for_donor(&self, donor_id: i64) -> Result<Vec<RegistrationView>, BloodLinkError> {
        let registrations = sqlx::query_as::<_, RegistrationView>(&format!(
            "{VIEW_SELECT} WHERE r.donor_id = $1 ORDER BY r.created_at DESC"
        ))
        .bind(donor_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(registrations)
    }

    /// Registrations targeting a hospital
    pub async fn list_for_hospital(&self, hospital_id: i64, status: Option<RegistrationStatus>) -> Result<Vec<RegistrationView>, BloodLinkError> {
        let registrations = sqlx::query_as::<_, RegistrationView>(&format!(
            "{VIEW_SELECT} WHERE r.hospital_id = $1 AND ($2::registration_status IS NULL OR r.status = $2) ORDER BY r.created_at DESC"
        ))
        .bind(hospital_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(registrations)
    }

    /// Registrations for one camp
    pub async fn list_for_camp(&self, camp_id: i64, status: Option<RegistrationStatus>) -> Result<Vec<RegistrationView>, BloodLinkError> {
        let registrations = sqlx::query_as::<_, RegistrationView>(&format!(
            "{VIEW_SELECT} WHERE r.camp_id = $1 AND ($2::registration_status IS NULL OR r.status = $2) ORDER BY r.created_at DESC"
        ))
        .bind(camp_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(registrations)
    }

    /// Donations at a hospital grouped by blood type
    pub async fn blood_type_counts_for_hospital(&self, hospital_id: i64) -> Result<Vec<BloodTypeCount>, BloodLinkError> {
        let counts = sqlx::query_as::<_, BloodTypeCount>(
            r#"
            SELECT blood_type, COUNT(*) AS donations, COALESCE(SUM(units), 0)::BIGINT AS units
            FROM registrations
            WHERE hospital_id = $1 AND status = 'donated'
            GROUP BY blood_type
            "#
        )
        .bind(hospital_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(counts)
    }

    /// Donations across all camps of an NGO grouped by blood type
    pub async fn blood_type_counts_for_ngo(&self, ngo_id: i64) -> Result<Vec<BloodTypeCount>, BloodLinkError> {
        let counts = sqlx::query_as::<_, BloodTypeCount>(
            r#"
            SELECT r.blood_type, COUNT(*) AS donations, COALESCE(SUM(r.units), 0)::BIGINT AS units
            FROM registrations r
            JOIN blood_camps bc ON bc.id = r.camp_id
            WHERE bc.ngo_id = $1 AND r.status = 'donated'
            GROUP BY r.blood_type
            "#
        )
        .bind(ngo_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(counts)
    }
}
