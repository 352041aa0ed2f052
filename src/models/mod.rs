//! Data models module
//!
//! This module contains all data structures used throughout the application

pub mod user;
pub mod contact;
pub mod registration;
pub mod camp;
pub mod notification;

// Re-export commonly used models
pub use user::{User, UserRole, CreateUserRequest, UpdateUserRequest, UserProfile, HospitalSummary};
pub use contact::{ContactDetails, BloodType, UpsertContactRequest};
pub use registration::{Registration, RegistrationStatus, RegistrationTarget, RegistrationView, TransitionActor, CreateRegistrationRequest, DonorStats};
pub use camp::{BloodCamp, CampSummary, CreateCampRequest, UpdateCampRequest, LegacyCampDetails};
pub use notification::{Notification, NotificationKind, NotificationView, CreateNotificationRequest};
