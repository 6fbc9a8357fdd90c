//! Axum extractors for the authorization gate and request bodies
//!
//! - [`AdminPrincipal`] rejects the request unless the bearer token belongs
//!   to an administrator.
//! - [`Authenticated`] rejects the request unless it carries a valid bearer
//!   token; handlers call [`Authenticated::require_owner_or_admin`] once they
//!   know which customer owns the resource.
//! - [`ApiJson`], [`ApiForm`] and [`ApiPath`] wrap the axum extractors so
//!   that malformed input is answered with the same `{"detail": ...}`
//!   envelope as every other error.
//!
//! The gate extractors only read request parts. Placed before a body
//! extractor, they reject a request without a valid token with 401 before
//! its payload is parsed.

use autoshop_shared::auth::authorization::{authenticate, require_admin};
use autoshop_shared::auth::jwt::Principal;
use autoshop_shared::auth::policy;
use axum::async_trait;
use axum::extract::{FromRequest, FromRequestParts};
use axum::http::{header, request::Parts};
use chrono::Utc;
use tracing::debug;

use crate::app::AppState;
use crate::error::ApiError;

fn authorization_header(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
}

/// Caller holding a valid token, whatever its role
#[derive(Debug, Clone)]
pub struct Authenticated(pub Principal);

impl Authenticated {
    /// Requires an administrator or the customer identified by `owner_id`
    pub fn require_owner_or_admin(&self, owner_id: i64) -> Result<(), ApiError> {
        if policy::can_access_customer_resource(&self.0, owner_id) {
            return Ok(());
        }

        debug!(
            user_id = self.0.user_id,
            role = ?self.0.role,
            resource_owner_id = owner_id,
            "Owner or admin required"
        );
        Err(ApiError::Forbidden)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let principal = authenticate(&state.tokens, authorization_header(parts), Utc::now())?;

        Ok(Self(principal))
    }
}

/// Authenticated administrator
#[derive(Debug, Clone)]
pub struct AdminPrincipal(pub Principal);

#[async_trait]
impl FromRequestParts<AppState> for AdminPrincipal {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let principal = require_admin(&state.tokens, authorization_header(parts), Utc::now())?;

        Ok(Self(principal))
    }
}

/// JSON body; rejections render as [`ApiError`]
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Urlencoded form body; rejections render as [`ApiError`]
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Form), rejection(ApiError))]
pub struct ApiForm<T>(pub T);

/// Path parameters; rejections render as [`ApiError`]
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);
