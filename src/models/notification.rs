//! Notification model

use std::fmt;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::utils::helpers::format_relative_time;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "notification_kind", rename_all = "lowercase")]
pub enum NotificationKind {
    Registration,
    Status,
    Camp,
    Account,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NotificationKind::Registration => "registration",
            NotificationKind::Status => "status",
            NotificationKind::Camp => "camp",
            NotificationKind::Account => "account",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateNotificationRequest {
    pub user_id: i64,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
}

/// Notification as returned to the frontend
#[derive(Debug, Clone, Serialize)]
pub struct NotificationView {
    #[serde(flatten)]
    pub notification: Notification,
    pub time_ago: String,
}

impl NotificationView {
    pub fn new(notification: Notification, now: DateTime<Utc>) -> Self {
        let time_ago = format_relative_time(notification.created_at, now);
        Self { notification, time_ago }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_view_flattens_fields() {
        let now = Utc::now();
        let notification = Notification {
            id: 7,
            user_id: 3,
            kind: NotificationKind::Status,
            title: "Registration approved".to_string(),
            message: "See you soon".to_string(),
            is_read: false,
            created_at: now - Duration::hours(2),
        };

        let value = serde_json::to_value(NotificationView::new(notification, now)).unwrap();
        assert_eq!(value["id"], 7);
        assert_eq!(value["kind"], "status");
        assert_eq!(value["time_ago"], "2 hours ago");
    }
}
