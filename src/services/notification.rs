//! Notification service implementation
//!
//! This service owns the message templates for every event that produces a
//! notification, renders them with parameters, and serves the per-user feed.

use std::collections::HashMap;
use chrono::Utc;
use sqlx::PgConnection;
use tracing::{debug, info};
use crate::database::NotificationRepository;
use crate::models::{CreateNotificationRequest, Notification, NotificationKind, NotificationView, RegistrationStatus};
use crate::utils::errors::{BloodLinkError, Result};

/// Message template structure
#[derive(Debug, Clone)]
pub struct MessageTemplate {
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
}

/// Notification service for message handling
#[derive(Clone, Debug)]
pub struct NotificationService {
    repository: NotificationRepository,
    templates: HashMap<String, MessageTemplate>,
}

impl NotificationService {
    /// Create a new NotificationService instance
    pub fn new(repository: NotificationRepository) -> Self {
        Self {
            repository,
            templates: Self::load_default_templates(),
        }
    }

    /// Render a template and store the notification inside `conn`'s transaction
    pub async fn notify_in(
        &self,
        conn: &mut PgConnection,
        user_id: i64,
        template_key: &str,
        parameters: &HashMap<&str, String>,
    ) -> Result<Notification> {
        let request = self.render(user_id, template_key, parameters)?;
        let notification = self.repository.create_in(conn, request).await?;
        debug!(user_id = user_id, template_key = template_key, "Notification stored");
        Ok(notification)
    }

    /// Render a template and store the notification
    pub async fn notify(&self, user_id: i64, template_key: &str, parameters: &HashMap<&str, String>) -> Result<Notification> {
        let request = self.render(user_id, template_key, parameters)?;
        self.repository.create(request).await
    }

    /// Build a notification from a template
    pub fn render(&self, user_id: i64, template_key: &str, parameters: &HashMap<&str, String>) -> Result<CreateNotificationRequest> {
        let template = self.templates.get(template_key).ok_or_else(|| {
            BloodLinkError::Config(format!("Notification template not found: {}", template_key))
        })?;

        Ok(CreateNotificationRequest {
            user_id,
            kind: template.kind,
            title: Self::fill(&template.title, parameters),
            message: Self::fill(&template.body, parameters),
        })
    }

    fn fill(text: &str, parameters: &HashMap<&str, String>) -> String {
        parameters.iter().fold(text.to_string(), |acc, (key, value)| {
            acc.replace(&format!("{{{}}}", key), value)
        })
    }

    /// Template key for a status change announced to the donor
    pub fn status_template(status: RegistrationStatus) -> &'static str {
        match status {
            RegistrationStatus::Approved => "registration_approved",
            RegistrationStatus::Rejected => "registration_rejected",
            RegistrationStatus::Donated => "registration_donated",
            RegistrationStatus::Inactive => "registration_withdrawn",
            RegistrationStatus::Requested => "registration_received",
        }
    }

    /// The user's feed, newest first
    pub async fn feed(&self, user_id: i64, unread_only: bool, limit: i64) -> Result<Vec<NotificationView>> {
        let now = Utc::now();
        let notifications = self.repository.list_for_user(user_id, unread_only, limit).await?;

        Ok(notifications
            .into_iter()
            .map(|notification| NotificationView::new(notification, now))
            .collect())
    }

    pub async fn unread_count(&self, user_id: i64) -> Result<i64> {
        self.repository.unread_count(user_id).await
    }

    pub async fn mark_read(&self, id: i64, user_id: i64) -> Result<NotificationView> {
        let notification = self.repository.mark_read(id, user_id).await?
            .ok_or_else(|| BloodLinkError::not_found("Notification"))?;
        Ok(NotificationView::new(notification, Utc::now()))
    }

    pub async fn mark_all_read(&self, user_id: i64) -> Result<u64> {
        let updated = self.repository.mark_all_read(user_id).await?;
        info!(user_id = user_id, updated = updated, "Notifications marked read");
        Ok(updated)
    }

    pub async fn delete(&self, id: i64, user_id: i64) -> Result<()> {
        if !self.repository.delete(id, user_id).await? {
            return Err(BloodLinkError::not_found("Notification"));
        }
        Ok(())
    }

    /// Load default message templates
    fn load_default_templates() -> HashMap<String, MessageTemplate> {
        let entries = [
            (
                "welcome",
                NotificationKind::Account,
                "Welcome to BloodLink",
                "Hi {name}, your {role} account is ready.",
            ),
            (
                "registration_received",
                NotificationKind::Registration,
                "New donation request",
                "{donor} ({blood_type}) asked to donate at {target}.",
            ),
            (
                "registration_approved",
                NotificationKind::Status,
                "Registration approved",
                "Your donation request at {target} was approved.",
            ),
            (
                "registration_rejected",
                NotificationKind::Status,
                "Registration rejected",
                "Your donation request at {target} was not accepted.",
            ),
            (
                "registration_donated",
                NotificationKind::Status,
                "Thank you for donating",
                "Your donation at {target} has been recorded.",
            ),
            (
                "registration_withdrawn",
                NotificationKind::Registration,
                "Registration withdrawn",
                "{donor} withdrew their donation request at {target}.",
            ),
            (
                "camp_cancelled",
                NotificationKind::Camp,
                "Camp cancelled",
                "The camp {camp} on {date} was cancelled.",
            ),
        ];

        entries
            .into_iter()
            .map(|(key, kind, title, body)| {
                (
                    key.to_string(),
                    MessageTemplate {
                        kind,
                        title: title.to_string(),
                        body: body.to_string(),
                    },
                )
            })
            .collect()
    }
}
