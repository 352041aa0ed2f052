//! Authentication service implementation
//!
//! This service handles password hashing, issuing and verifying the signed
//! session token carried in the auth cookie, and building the cookie headers.

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use crate::config::settings::AuthConfig;
use crate::models::{User, UserRole};
use crate::utils::errors::{BloodLinkError, Result};
use crate::utils::helpers::generate_uuid;

/// Minimum accepted password length
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Claims stored in the session token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// User id
    pub sub: i64,
    pub role: UserRole,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// Authentication service for password and session handling
#[derive(Clone)]
pub struct AuthService {
    config: AuthConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("cookie_name", &self.config.cookie_name)
            .field("token_ttl_hours", &self.config.token_ttl_hours)
            .finish_non_exhaustive()
    }
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(config: AuthConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.config.cookie_name
    }

    /// Hash a password into a PHC string
    pub fn hash_password(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| BloodLinkError::PasswordHash(e.to_string()))
    }

    /// Check a password against a stored PHC string
    pub fn verify_password(&self, password: &str, password_hash: &str) -> Result<bool> {
        let parsed = PasswordHash::new(password_hash)
            .map_err(|e| BloodLinkError::PasswordHash(e.to_string()))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    /// Validate password strength
    pub fn validate_password(password: &str) -> Result<()> {
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(BloodLinkError::InvalidInput(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }
        Ok(())
    }

    /// Issue a session token for a user
    pub fn issue_token(&self, user: &User) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id,
            role: user.role,
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.config.token_ttl_hours)).timestamp(),
            jti: generate_uuid(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        debug!(user_id = user.id, "Session token issued");
        Ok(token)
    }

    /// Verify a session token and return its claims
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let validation = Validation::new(Algorithm::HS256);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                warn!(error = %e, "Rejected session token");
                BloodLinkError::Authentication("Invalid or expired session".to_string())
            })
    }

    /// `Set-Cookie` value carrying a session token
    pub fn session_cookie(&self, token: &str) -> String {
        let max_age = self.config.token_ttl_hours * 3600;
        self.build_cookie(token, max_age)
    }

    /// `Set-Cookie` value that removes the session cookie
    pub fn clear_cookie(&self) -> String {
        self.build_cookie("", 0)
    }

    fn build_cookie(&self, value: &str, max_age: i64) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            self.config.cookie_name, value, max_age
        );
        if self.config.secure_cookies {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

/// Find a cookie value in a `Cookie` request header
pub fn find_cookie<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"'))
        .filter(|value| !value.is_empty())
}
