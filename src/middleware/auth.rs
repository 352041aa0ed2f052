//! Authentication middleware
//!
//! This module provides the cookie-based session extractor and the role
//! checks that protect the donor, hospital and NGO routes.

use axum::extract::FromRequestParts;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use tracing::{debug, warn};
use crate::models::UserRole;
use crate::services::auth::find_cookie;
use crate::state::AppState;
use crate::utils::errors::{BloodLinkError, Result};

/// The caller identified by the session cookie
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i64,
    pub role: UserRole,
    pub email: String,
}

impl AuthUser {
    /// Check that the caller has `role`
    pub fn require(&self, role: UserRole) -> Result<()> {
        if self.role == role {
            Ok(())
        } else {
            warn!(user_id = self.id, role = %self.role, required = %role, "Role check failed");
            Err(BloodLinkError::PermissionDenied(format!(
                "This action requires a {} account",
                role
            )))
        }
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = BloodLinkError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> std::result::Result<Self, Self::Rejection> {
        let auth = &state.services.auth_service;

        let token = parts
            .headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(|header| find_cookie(header, auth.cookie_name()))
            .ok_or_else(|| BloodLinkError::Authentication("Not authenticated".to_string()))?;

        let claims = auth.verify_token(token)?;
        debug!(user_id = claims.sub, role = %claims.role, "Session authenticated");

        Ok(AuthUser {
            id: claims.sub,
            role: claims.role,
            email: claims.email,
        })
    }
}

/// Caller that must hold the donor role
#[derive(Debug, Clone)]
pub struct DonorUser(pub AuthUser);

/// Caller that must hold the hospital role
#[derive(Debug, Clone)]
pub struct HospitalUser(pub AuthUser);

/// Caller that must hold the NGO role
#[derive(Debug, Clone)]
pub struct NgoUser(pub AuthUser);

macro_rules! role_extractor {
    ($name:ident, $role:expr) => {
        #[axum::async_trait]
        impl FromRequestParts<AppState> for $name {
            type Rejection = BloodLinkError;

            async fn from_request_parts(parts: &mut Parts, state: &AppState) -> std::result::Result<Self, Self::Rejection> {
                let user = AuthUser::from_request_parts(parts, state).await?;
                user.require($role)?;
                Ok($name(user))
            }
        }
    };
}

role_extractor!(DonorUser, UserRole::Donor);
role_extractor!(HospitalUser, UserRole::Hospital);
role_extractor!(NgoUser, UserRole::Ngo);

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn user(role: UserRole) -> AuthUser {
        AuthUser {
            id: 1,
            role,
            email: "someone@example.com".to_string(),
        }
    }

    #[test]
    fn test_require_matching_role() {
        assert!(user(UserRole::Donor).require(UserRole::Donor).is_ok());
    }

    #[test]
    fn test_require_other_role_is_denied() {
        assert_matches!(
            user(UserRole::Donor).require(UserRole::Hospital),
            Err(BloodLinkError::PermissionDenied(_))
        );
        assert_matches!(
            user(UserRole::Ngo).require(UserRole::Donor),
            Err(BloodLinkError::PermissionDenied(_))
        );
    }
}
