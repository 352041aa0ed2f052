//! Request extractors whose rejections use the `{"error"}` body
//!
//! Wrappers around axum's `Json`, `Path` and `Query` that turn malformed
//! input into `BloodLinkError::InvalidInput`.

use axum::extract::{FromRequest, FromRequestParts};
use crate::utils::errors::BloodLinkError;

/// JSON request body
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(BloodLinkError))]
pub struct JsonBody<T>(pub T);

/// Typed path parameters
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(BloodLinkError))]
pub struct PathParam<T>(pub T);

/// Typed query string
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(BloodLinkError))]
pub struct QueryParams<T>(pub T);
