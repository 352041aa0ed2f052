//! Services module
//!
//! This module contains business logic services

pub mod auth;
pub mod camp;
pub mod notification;
pub mod registration;
pub mod user;

// Re-export commonly used services
pub use auth::{AuthService, Claims};
pub use camp::{CampService, NewCamp};
pub use notification::{NotificationService, MessageTemplate};
pub use registration::{Inventory, NewRegistration, RegistrationService};
pub use user::{ProfileInput, SignupInput, UserService};

use crate::config::settings::Settings;
use crate::database::DatabaseService;
use crate::middleware::rate_limit::LoginRateLimiter;

/// Service factory for creating and managing all services
#[derive(Clone, Debug)]
pub struct ServiceFactory {
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub registration_service: RegistrationService,
    pub camp_service: CampService,
    pub notification_service: NotificationService,
    pub login_limiter: LoginRateLimiter,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(settings: &Settings, db: DatabaseService) -> Self {
        let auth_service = AuthService::new(settings.auth.clone());
        let notification_service = NotificationService::new(db.notifications.clone());
        let user_service = UserService::new(db.clone(), auth_service.clone(), notification_service.clone());
        let registration_service = RegistrationService::new(
            db.clone(),
            notification_service.clone(),
            settings.registration.clone(),
        );
        let camp_service = CampService::new(db, notification_service.clone());
        let login_limiter = LoginRateLimiter::new(&settings.rate_limit);

        Self {
            auth_service,
            user_service,
            registration_service,
            camp_service,
            notification_service,
            login_limiter,
        }
    }
}
