/// Authorization gate for bearer-token protected operations
///
/// Each check takes the raw `Authorization` header value, decodes the bearer
/// token and applies the role policy:
///
/// ```text
/// no header / not "Bearer <token>"  -> Unauthorized
/// token invalid or expired          -> Unauthorized
/// token valid, policy denies        -> Forbidden
/// token valid, policy allows        -> Ok(Principal)
/// ```
///
/// The gate never touches storage and keeps no state between calls.
///
/// # Example
///
/// ```
/// use autoshop_shared::auth::authorization::{require_owner_or_admin, AuthError};
/// use autoshop_shared::auth::jwt::TokenCodec;
/// use autoshop_shared::auth::role::Role;
/// use chrono::{Duration, Utc};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let codec = TokenCodec::new("your-secret-key-at-least-32-bytes-long", "HS256", Duration::days(1))?;
/// let now = Utc::now();
///
/// let token = codec.issue(5, "john.doe@email.com", Role::Customer, now)?;
/// let header = format!("Bearer {}", token);
///
/// assert!(require_owner_or_admin(&codec, Some(&header), 5, now).is_ok());
/// assert_eq!(
///     require_owner_or_admin(&codec, Some(&header), 7, now).unwrap_err(),
///     AuthError::Forbidden,
/// );
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use tracing::debug;

use super::jwt::{Principal, TokenCodec};
use super::policy;

/// Error type for authorization checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Missing, malformed, forged or expired token
    #[error("Invalid token")]
    Unauthorized,

    /// Valid token whose bearer may not perform the operation
    #[error("Token bearer cannot execute the required operation")]
    Forbidden,
}

/// Extracts the token from a `Bearer <token>` header value
///
/// The scheme is matched case-insensitively. Returns `None` for any other
/// shape, including an empty token or trailing fields.
pub fn bearer_token(auth_header: &str) -> Option<&str> {
    let mut parts = auth_header.split_whitespace();
    let scheme = parts.next()?;
    let token = parts.next()?;

    if !scheme.eq_ignore_ascii_case("bearer") || parts.next().is_some() {
        return None;
    }

    Some(token)
}

/// Decodes the bearer token without applying any policy
///
/// # Errors
///
/// Returns `AuthError::Unauthorized` if the header is absent, malformed or
/// carries an invalid token.
pub fn authenticate(
    codec: &TokenCodec,
    auth_header: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Principal, AuthError> {
    let header = auth_header.ok_or_else(|| {
        debug!("Missing authorization header");
        AuthError::Unauthorized
    })?;

    let token = bearer_token(header).ok_or_else(|| {
        debug!("Authorization header is not a bearer token");
        AuthError::Unauthorized
    })?;

    codec.decode(token, now).map_err(|_| AuthError::Unauthorized)
}

/// Requires an administrator
///
/// # Errors
///
/// - `AuthError::Unauthorized` when the token cannot be authenticated
/// - `AuthError::Forbidden` when the bearer is not an administrator
pub fn require_admin(
    codec: &TokenCodec,
    auth_header: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Principal, AuthError> {
    let principal = authenticate(codec, auth_header, now)?;

    if !policy::is_admin(&principal) {
        debug!(user_id = principal.user_id, role = ?principal.role, "Admin role required");
        return Err(AuthError::Forbidden);
    }

    Ok(principal)
}

/// Requires an administrator or the customer owning the resource
///
/// # Errors
///
/// - `AuthError::Unauthorized` when the token cannot be authenticated
/// - `AuthError::Forbidden` when the bearer is neither admin nor owner
pub fn require_owner_or_admin(
    codec: &TokenCodec,
    auth_header: Option<&str>,
    resource_owner_id: i64,
    now: DateTime<Utc>,
) -> Result<Principal, AuthError> {
    let principal = authenticate(codec, auth_header, now)?;

    if !policy::can_access_customer_resource(&principal, resource_owner_id) {
        debug!(
            user_id = principal.user_id,
            role = ?principal.role,
            resource_owner_id,
            "Owner or admin required"
        );
        return Err(AuthError::Forbidden);
    }

    Ok(principal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::Claims;
    use crate::auth::role::Role;
    use chrono::Duration;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn codec() -> TokenCodec {
        TokenCodec::new(SECRET, "HS256", Duration::days(1)).unwrap()
    }

    fn header_for(codec: &TokenCodec, user_id: i64, role: Role, now: DateTime<Utc>) -> String {
        let token = codec
            .issue(user_id, &format!("user{}@email.com", user_id), role, now)
            .unwrap();
        format!("Bearer {}", token)
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("bearer abc"), Some("abc"));
        assert_eq!(bearer_token("BEARER  abc"), Some("abc"));

        assert_eq!(bearer_token(""), None);
        assert_eq!(bearer_token("Bearer"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Basic dXNlcjpwYXNz"), None);
        assert_eq!(bearer_token("Bearer abc def"), None);
        assert_eq!(bearer_token("abc.def.ghi"), None);
    }

    #[test]
    fn test_missing_header_is_unauthorized() {
        let codec = codec();
        let now = Utc::now();

        assert_eq!(require_admin(&codec, None, now), Err(AuthError::Unauthorized));
        assert_eq!(
            require_owner_or_admin(&codec, None, 1, now),
            Err(AuthError::Unauthorized)
        );
    }

    #[test]
    fn test_malformed_header_is_unauthorized() {
        let codec = codec();
        let now = Utc::now();

        for header in ["", "Bearer", "Token abc", "Bearer not-a-jwt"] {
            assert_eq!(
                require_admin(&codec, Some(header), now),
                Err(AuthError::Unauthorized),
                "header {:?}",
                header
            );
        }
    }

    #[test]
    fn test_expired_token_is_unauthorized_not_forbidden() {
        let codec = TokenCodec::new(SECRET, "HS256", Duration::seconds(1)).unwrap();
        let now = Utc::now();
        let header = header_for(&codec, 1, Role::Customer, now);

        let later = now + Duration::seconds(2);
        assert_eq!(require_admin(&codec, Some(&header), later), Err(AuthError::Unauthorized));
        assert_eq!(
            require_owner_or_admin(&codec, Some(&header), 1, later),
            Err(AuthError::Unauthorized)
        );
    }

    #[test]
    fn test_require_admin() {
        let codec = codec();
        let now = Utc::now();

        let admin = header_for(&codec, 1, Role::Admin, now);
        let principal = require_admin(&codec, Some(&admin), now).unwrap();
        assert_eq!(principal.user_id, 1);

        let customer = header_for(&codec, 2, Role::Customer, now);
        assert_eq!(require_admin(&codec, Some(&customer), now), Err(AuthError::Forbidden));

        let employee = header_for(&codec, 3, Role::Employee, now);
        assert_eq!(require_admin(&codec, Some(&employee), now), Err(AuthError::Forbidden));
    }

    #[test]
    fn test_admin_bypasses_ownership() {
        let codec = codec();
        let now = Utc::now();
        let admin = header_for(&codec, 1, Role::Admin, now);

        let principal = require_owner_or_admin(&codec, Some(&admin), 999, now).unwrap();
        assert_eq!(principal.user_id, 1);
        assert_eq!(principal.role, Some(Role::Admin));
    }

    #[test]
    fn test_customer_ownership() {
        let codec = codec();
        let now = Utc::now();
        let customer = header_for(&codec, 5, Role::Customer, now);

        assert!(require_owner_or_admin(&codec, Some(&customer), 5, now).is_ok());
        assert_eq!(
            require_owner_or_admin(&codec, Some(&customer), 7, now),
            Err(AuthError::Forbidden)
        );
    }

    #[test]
    fn test_unknown_role_is_forbidden() {
        let codec = codec();
        let now = Utc::now();
        let token = codec
            .encode_claims(&Claims {
                user_id: 5,
                username: "user5@email.com".to_string(),
                user_role: String::new(),
                iat: now.timestamp(),
                exp: (now + Duration::hours(1)).timestamp(),
            })
            .unwrap();
        let header = format!("Bearer {}", token);

        assert_eq!(require_admin(&codec, Some(&header), now), Err(AuthError::Forbidden));
        assert_eq!(
            require_owner_or_admin(&codec, Some(&header), 5, now),
            Err(AuthError::Forbidden)
        );
    }

    #[test]
    fn test_auth_error_display() {
        assert_eq!(AuthError::Unauthorized.to_string(), "Invalid token");
        assert_eq!(
            AuthError::Forbidden.to_string(),
            "Token bearer cannot execute the required operation"
        );
    }
}
