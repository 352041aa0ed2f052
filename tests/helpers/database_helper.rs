//! Test database helper utilities
//!
//! Provides a migrated PostgreSQL database for integration tests, either from
//! `TEST_DATABASE_URL` or from a throwaway container. When neither is
//! available the tests fail, unless `BLOODLINK_SKIP_DB_TESTS` is set.

use sqlx::PgPool;
use std::sync::Once;
use testcontainers::{runners::AsyncRunner, ContainerAsync};
use testcontainers_modules::postgres::Postgres as PostgresImage;

static INIT: Once = Once::new();

/// Set to skip DB-backed tests on machines without PostgreSQL or Docker
pub const SKIP_DB_TESTS_VAR: &str = "BLOODLINK_SKIP_DB_TESTS";

/// Skip when explicitly allowed, fail otherwise
fn unavailable(reason: String) -> Option<TestDatabase> {
    if std::env::var_os(SKIP_DB_TESTS_VAR).is_some() {
        eprintln!("skipping database test: {}", reason);
        return None;
    }
    panic!(
        "no test database available ({}); set TEST_DATABASE_URL, start Docker, or set {} to skip",
        reason, SKIP_DB_TESTS_VAR
    );
}

/// Test database helper that manages PostgreSQL test database setup
pub struct TestDatabase {
    pub pool: PgPool,
    pub database_url: String,
    _container: Option<ContainerAsync<PostgresImage>>,
}

impl TestDatabase {
    /// Start a migrated, empty database
    ///
    /// Returns `None` only when no database is reachable and skipping was
    /// requested through `BLOODLINK_SKIP_DB_TESTS`.
    pub async fn try_new() -> Option<Self> {
        INIT.call_once(|| {
            let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        });

        let (database_url, container) = match std::env::var("TEST_DATABASE_URL") {
            Ok(url) => (url, None),
            Err(_) => match Self::start_container().await {
                Ok((url, container)) => (url, Some(container)),
                Err(e) => return unavailable(e),
            },
        };

        let pool = match PgPool::connect(&database_url).await {
            Ok(pool) => pool,
            Err(e) => return unavailable(e.to_string()),
        };

        if let Err(e) = sqlx::migrate!("./migrations").run(&pool).await {
            panic!("migrations failed on test database: {}", e);
        }

        let db = Self {
            pool,
            database_url,
            _container: container,
        };
        if let Err(e) = db.cleanup().await {
            panic!("failed to clean test database: {}", e);
        }
        Some(db)
    }

    async fn start_container() -> Result<(String, ContainerAsync<PostgresImage>), String> {
        let container = PostgresImage::default()
            .start()
            .await
            .map_err(|e| format!("cannot start postgres container: {}", e))?;
        let host = container.get_host().await.map_err(|e| e.to_string())?;
        let port = container.get_host_port_ipv4(5432).await.map_err(|e| e.to_string())?;

        let url = format!("postgres://postgres:postgres@{}:{}/postgres", host, port);
        Ok((url, container))
    }

    /// Clean all test data from the database
    pub async fn cleanup(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            "TRUNCATE notifications, registrations, blood_camps, camp_details, contact_details, users RESTART IDENTITY CASCADE"
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Count rows in a table
    pub async fn count_records(&self, table: &str) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }

    /// Count a donor's requested or approved registrations
    pub async fn count_open_registrations(&self, donor_id: i64) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM registrations WHERE donor_id = $1 AND status IN ('requested', 'approved')"
        )
        .bind(donor_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.0)
    }

    /// Insert a legacy camp row for an NGO
    pub async fn insert_legacy_camp(&self, ngo_id: i64, name: &str, total_donors: i32) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            r#"
            INSERT INTO camp_details (ngo_id, camp_name, location, camp_date, total_donors, notes)
            VALUES ($1, $2, 'Community Hall', DATE '2022-08-15', $3, 'Imported from paper records')
            RETURNING id
            "#
        )
        .bind(ngo_id)
        .bind(name)
        .bind(total_donors)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.0)
    }
}
