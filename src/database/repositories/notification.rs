//! Notification repository implementation

use sqlx::{PgConnection, PgPool};
use chrono::Utc;
use crate::models::notification::{CreateNotificationRequest, Notification};
use crate::utils::errors::BloodLinkError;

const NOTIFICATION_COLUMNS: &str = "id, user_id, kind, title, message, is_read, created_at";

#[derive(Clone, Debug)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a notification
    pub async fn create_in(&self, conn: &mut PgConnection, request: CreateNotificationRequest) -> Result<Notification, BloodLinkError> {
        let notification = sqlx::query_as::<_, Notification>(&format!(
            r#"
            INSERT INTO notifications (user_id, kind, title, message, is_read, created_at)
            VALUES ($1, $2, $3, $4, FALSE, $5)
            RETURNING {NOTIFICATION_COLUMNS}
            "#
        ))
        .bind(request.user_id)
        .bind(request.kind)
        .bind(request.title)
        .bind(request.message)
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await?;

        Ok(notification)
    }

    /// Insert a notification outside any transaction
    pub async fn create(&self, request: CreateNotificationRequest) -> Result<Notification, BloodLinkError> {
        let mut conn = self.pool.acquire().await?;
        self.create_in(&mut conn, request).await
    }

    /// Notifications for a user, newest first
    pub async fn list_for_user(&self, user_id: i64, unread_only: bool, limit: i64) -> Result<Vec<Notification>, BloodLinkError> {
        let notifications = sqlx::query_as::<_, Notification>(&format!(
            r#"
            SELECT {NOTIFICATION_COLUMNS} FROM notifications
            WHERE user_id = $1 AND (NOT $2 OR NOT is_read)
            ORDER BY created_at DESC, id DESC
            LIMIT $3
            "#
        ))
        .bind(user_id)
        .bind(unread_only)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(notifications)
    }

    /// Count unread notifications
    pub async fn unread_count(&self, user_id: i64) -> Result<i64, BloodLinkError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND NOT is_read"
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }

    /// Mark one of the user's notifications read
    pub async fn mark_read(&self, id: i64, user_id: i64) -> Result<Option<Notification>, BloodLinkError> {
        let notification = sqlx::query_as::<_, Notification>(&format!(
            r#"
            UPDATE notifications SET is_read = TRUE
            WHERE id = $1 AND user_id = $2
            RETURNING {NOTIFICATION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(notification)
    }

    /// Mark all of the user's notifications read
    pub async fn mark_all_read(&self, user_id: i64) -> Result<u64, BloodLinkError> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND NOT is_read"
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Delete one of the user's notifications
    pub async fn delete(&self, id: i64, user_id: i64) -> Result<bool, BloodLinkError> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
