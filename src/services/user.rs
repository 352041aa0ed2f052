//! User service implementation
//!
//! This service handles signup and login, profile and contact details
//! management, password changes and account deletion.

use std::collections::{BTreeMap, HashMap};
use chrono::NaiveDate;
use tracing::{debug, info, warn};
use crate::database::DatabaseService;
use crate::models::{BloodType, CreateUserRequest, UpdateUserRequest, UpsertContactRequest, User, UserProfile, UserRole};
use crate::services::auth::AuthService;
use crate::services::notification::NotificationService;
use crate::utils::errors::{BloodLinkError, Result};
use crate::utils::helpers::{is_valid_email, is_valid_phone, is_valid_pincode, non_empty, normalize_email, normalize_phone, normalize_whitespace};
use crate::utils::logging::{log_auth_attempt, log_user_action};

/// Signup input after deserialization
#[derive(Debug, Clone)]
pub struct SignupInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

/// Profile update input; every field is optional
#[derive(Debug, Clone, Default)]
pub struct ProfileInput {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub blood_type: Option<String>,
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

/// User service for managing accounts
#[derive(Clone, Debug)]
pub struct UserService {
    db: DatabaseService,
    auth: AuthService,
    notifications: NotificationService,
}

impl UserService {
    /// Create a new UserService instance
    pub fn new(db: DatabaseService, auth: AuthService, notifications: NotificationService) -> Self {
        Self { db, auth, notifications }
    }

    /// Validate signup fields without touching the database
    pub fn validate_signup(input: &SignupInput) -> Result<(String, String, UserRole)> {
        let name = normalize_whitespace(&input.name);
        if name.is_empty() {
            return Err(BloodLinkError::InvalidInput("Name is required".to_string()));
        }

        let email = normalize_email(&input.email);
        if !is_valid_email(&email) {
            return Err(BloodLinkError::InvalidInput("A valid email is required".to_string()));
        }

        AuthService::validate_password(&input.password)?;

        let role = input.role.parse::<UserRole>().map_err(BloodLinkError::InvalidInput)?;

        Ok((name, email, role))
    }

    /// Create a new account
    pub async fn signup(&self, input: SignupInput) -> Result<User> {
        let (name, email, role) = Self::validate_signup(&input)?;

        if self.db.users.find_by_email(&email).await?.is_some() {
            log_auth_attempt(&email, "signup", false);
            return Err(BloodLinkError::Conflict("Email is already registered".to_string()));
        }

        let password_hash = self.auth.hash_password(&input.password)?;
        let user = self.db.users.create(CreateUserRequest {
            name,
            email,
            password_hash,
            role,
        }).await?;

        let mut params = HashMap::new();
        params.insert("name", user.name.clone());
        params.insert("role", user.role.to_string());
        self.notifications.notify(user.id, "welcome", &params).await?;

        log_auth_attempt(&user.email, "signup", true);
        info!(user_id = user.id, role = %user.role, "New user registered");
        Ok(user)
    }

    /// Check credentials and return the user
    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(BloodLinkError::InvalidInput("Email and password are required".to_string()));
        }

        let invalid = || BloodLinkError::Authentication("Invalid email or password".to_string());

        let user = match self.db.users.find_by_email(&email).await? {
            Some(user) => user,
            None => {
                log_auth_attempt(&email, "login", false);
                return Err(invalid());
            }
        };

        if !self.auth.verify_password(password, &user.password_hash)? {
            log_auth_attempt(&email, "login", false);
            return Err(invalid());
        }

        log_auth_attempt(&email, "login", true);
        Ok(user)
    }

    /// Get user by ID
    pub async fn get_user(&self, user_id: i64) -> Result<Option<User>> {
        debug!(user_id = user_id, "Getting user by ID");
        self.db.users.find_by_id(user_id).await
    }

    /// Get a user together with contact details
    pub async fn get_profile(&self, user_id: i64) -> Result<UserProfile> {
        self.db.get_user_profile(user_id).await
    }

    /// Update name and contact details
    pub async fn update_profile(&self, user_id: i64, input: ProfileInput) -> Result<UserProfile> {
        let (name, contact) = Self::validate_profile(input)?;

        let user = if name.is_some() {
            self.db.users.update(user_id, UpdateUserRequest { name, ..Default::default() }).await?
        } else {
            self.db.users.find_by_id(user_id).await?
                .ok_or_else(|| BloodLinkError::not_found("User"))?
        };

        let has_contact_fields = contact.phone.is_some()
            || contact.address.is_some()
            || contact.city.is_some()
            || contact.state.is_some()
            || contact.pincode.is_some()
            || contact.blood_type.is_some()
            || contact.gender.is_some()
            || contact.date_of_birth.is_some();

        let contact_details = match self.db.contacts.find_by_user(user_id).await? {
            Some(existing) if !has_contact_fields => Some(existing),
            Some(_) => Some(self.db.contacts.update(user_id, contact).await?),
            None if !has_contact_fields => None,
            None => {
                let phone = contact.phone.clone().ok_or_else(|| {
                    BloodLinkError::InvalidInput("Phone is required for contact details".to_string())
                })?;
                Some(self.db.contacts.create(user_id, phone, contact).await?)
            }
        };

        log_user_action(user_id, "update_profile", None);
        Ok(UserProfile { user, contact_details })
    }

    /// Validate and normalize a profile update
    pub fn validate_profile(input: ProfileInput) -> Result<(Option<String>, UpsertContactRequest)> {
        let name = non_empty(input.name).map(|n| normalize_whitespace(&n));

        let phone = match non_empty(input.phone) {
            Some(phone) if is_valid_phone(&phone) => Some(normalize_phone(&phone)),
            Some(_) => return Err(BloodLinkError::InvalidInput("Invalid phone number".to_string())),
            None => None,
        };

        let pincode = match non_empty(input.pincode) {
            Some(pincode) if is_valid_pincode(&pincode) => Some(pincode),
            Some(_) => return Err(BloodLinkError::InvalidInput("Invalid pincode".to_string())),
            None => None,
        };

        let blood_type = non_empty(input.blood_type)
            .map(|bt| bt.parse::<BloodType>())
            .transpose()
            .map_err(BloodLinkError::InvalidInput)?;

        if let Some(dob) = input.date_of_birth {
            if dob > chrono::Utc::now().date_naive() {
                return Err(BloodLinkError::InvalidInput("Date of birth cannot be in the future".to_string()));
            }
        }

        let contact = UpsertContactRequest {
            phone,
            address: non_empty(input.address),
            city: non_empty(input.city),
            state: non_empty(input.state),
            pincode,
            blood_type,
            gender: non_empty(input.gender).map(|g| g.to_lowercase()),
            date_of_birth: input.date_of_birth,
        };

        Ok((name, contact))
    }

    /// Change the password after checking the current one
    pub async fn change_password(&self, user_id: i64, current_password: &str, new_password: &str) -> Result<()> {
        let user = self.db.users.find_by_id(user_id).await?
            .ok_or_else(|| BloodLinkError::not_found("User"))?;

        if !self.auth.verify_password(current_password, &user.password_hash)? {
            warn!(user_id = user_id, "Password change with wrong current password");
            return Err(BloodLinkError::Authentication("Current password is incorrect".to_string()));
        }

        AuthService::validate_password(new_password)?;
        let password_hash = self.auth.hash_password(new_password)?;
        self.db.users.update(user_id, UpdateUserRequest {
            password_hash: Some(password_hash),
            ..Default::default()
        }).await?;

        log_user_action(user_id, "change_password", None);
        Ok(())
    }

    /// Delete an account and everything that belongs to it
    ///
    /// Open camp registrations are closed first so their seats go back to
    /// the camp before the cascade removes the rows.
    pub async fn delete_account(&self, user_id: i64) -> Result<()> {
        let mut tx = self.db.begin().await?;

        let closed = self.db.registrations.deactivate_open_for_donor_in(&mut tx, user_id).await?;
        let mut seats: BTreeMap<i64, i32> = BTreeMap::new();
        for camp_id in closed.iter().filter_map(|r| r.camp_id) {
            *seats.entry(camp_id).or_default() += 1;
        }
        for (&camp_id, &count) in &seats {
            self.db.camps.release_seats_in(&mut tx, camp_id, count).await?;
        }

        if !self.db.users.delete_in(&mut tx, user_id).await? {
            return Err(BloodLinkError::not_found("User"));
        }
        tx.commit().await?;

        log_user_action(user_id, "delete_account", Some(&format!("released {} camp seats", seats.values().sum::<i32>())));
        Ok(())
    }
}
