//! Database repositories module
//!
//! This module contains all repository implementations for data access,
//! one per table.

pub mod user;
pub mod contact;
pub mod registration;
pub mod camp;
pub mod notification;

// Re-export repositories
pub use user::UserRepository;
pub use contact::ContactRepository;
pub use registration::{RegistrationRepository, BloodTypeCount};
pub use camp::CampRepository;
pub use notification::NotificationRepository;
