//! Database service layer
//!
//! This module provides a high-level interface to database operations

use sqlx::{Postgres, Transaction};
use crate::database::{DatabasePool, UserRepository, ContactRepository, RegistrationRepository, CampRepository, NotificationRepository};
use crate::models::{User, UserProfile};
use crate::utils::errors::BloodLinkError;

#[derive(Debug, Clone)]
pub struct DatabaseService {
    pool: DatabasePool,
    pub users: UserRepository,
    pub contacts: ContactRepository,
    pub registrations: RegistrationRepository,
    pub camps: CampRepository,
    pub notifications: NotificationRepository,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            contacts: ContactRepository::new(pool.clone()),
            registrations: RegistrationRepository::new(pool.clone()),
            camps: CampRepository::new(pool.clone()),
            notifications: NotificationRepository::new(pool.clone()),
            pool,
        }
    }

    /// Start a transaction for a multi-table operation
    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, BloodLinkError> {
        Ok(self.pool.begin().await?)
    }

    /// Load a user with their contact details
    pub async fn get_user_profile(&self, user_id: i64) -> Result<UserProfile, BloodLinkError> {
        let user = self.users.find_by_id(user_id).await?
            .ok_or_else(|| BloodLinkError::not_found("User"))?;
        self.profile_for(user).await
    }

    /// Attach contact details to an already loaded user
    pub async fn profile_for(&self, user: User) -> Result<UserProfile, BloodLinkError> {
        let contact_details = self.contacts.find_by_user(user.id).await?;
        Ok(UserProfile { user, contact_details })
    }

    /// Check database health
    pub async fn health_check(&self) -> Result<(), BloodLinkError> {
        super::connection::health_check(&self.pool).await
    }
}
