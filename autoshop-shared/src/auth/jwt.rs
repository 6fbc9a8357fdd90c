/// JWT token issuance and validation
///
/// Tokens are signed with a shared secret using an HMAC algorithm (HS256,
/// HS384 or HS512) chosen at startup. They carry the user id, username and
/// role, plus issued-at and expiry timestamps.
///
/// The codec never reads the clock itself: callers pass `now`, which keeps
/// issuance and validation pure functions of their inputs.
///
/// # Validation
///
/// A token decodes only if its signature verifies with the configured secret
/// and algorithm AND `now < exp`. Expired, forged and malformed tokens all
/// produce the same [`TokenError::Invalid`]; the concrete reason is logged at
/// debug level and never returned.
///
/// # Example
///
/// ```
/// use autoshop_shared::auth::jwt::TokenCodec;
/// use autoshop_shared::auth::role::Role;
/// use chrono::{Duration, Utc};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let codec = TokenCodec::new(
///     "your-secret-key-at-least-32-bytes-long",
///     "HS256",
///     Duration::days(1),
/// )?;
///
/// let now = Utc::now();
/// let token = codec.issue(1, "john.doe@email.com", Role::Customer, now)?;
///
/// let principal = codec.decode(&token, now)?;
/// assert_eq!(principal.user_id, 1);
/// assert_eq!(principal.role, Some(Role::Customer));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use super::role::Role;

/// Error type for token operations
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Secret, algorithm or expiration is unusable
    #[error("Invalid token configuration: {0}")]
    Config(String),

    /// Failed to sign the token
    #[error("Failed to create token: {0}")]
    Encode(String),

    /// Token is expired, forged or malformed
    #[error("Invalid token")]
    Invalid,
}

/// Claims embedded in every token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user id
    pub user_id: i64,

    /// Username at issuance time
    pub username: String,

    /// Role identifier at issuance time
    ///
    /// Kept as the raw string so that a token carrying an unknown role still
    /// decodes; the policy then denies it.
    pub user_role: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Identity reconstructed from a valid token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// User id
    pub user_id: i64,

    /// Username
    pub username: String,

    /// Role, `None` when the claim is not a recognized identifier
    pub role: Option<Role>,
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        Self {
            role: Role::parse(&claims.user_role),
            user_id: claims.user_id,
            username: claims.username,
        }
    }
}

/// Longest accepted token lifetime
pub const MAX_EXPIRATION_DAYS: i64 = 3650;

fn max_expiration() -> Duration {
    Duration::days(MAX_EXPIRATION_DAYS)
}

/// Signs and validates tokens with one secret, algorithm and lifetime
///
/// Built once at startup from configuration and shared read-only.
pub struct TokenCodec {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiration: Duration,
}

impl TokenCodec {
    /// Creates a codec, rejecting configuration that could produce
    /// unverifiable tokens
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Config` if:
    /// - The secret is empty
    /// - The algorithm is unknown or not in the HMAC family
    /// - The expiration is not positive or exceeds [`MAX_EXPIRATION_DAYS`]
    pub fn new(secret: &str, algorithm: &str, expiration: Duration) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::Config("signing secret is empty".to_string()));
        }

        let algorithm = parse_hmac_algorithm(algorithm)?;

        if expiration <= Duration::zero() {
            return Err(TokenError::Config(format!(
                "expiration must be positive, got {} seconds",
                expiration.num_seconds()
            )));
        }

        if expiration > max_expiration() {
            return Err(TokenError::Config(format!(
                "expiration must be at most {} days, got {} days",
                MAX_EXPIRATION_DAYS,
                expiration.num_days()
            )));
        }

        Ok(Self {
            algorithm,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiration,
        })
    }

    /// Configured signing algorithm
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Configured token lifetime
    pub fn expiration(&self) -> Duration {
        self.expiration
    }

    /// Issues a signed token expiring at `now + expiration`
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Encode` if signing fails, or `TokenError::Config`
    /// if the expiry is not representable from `now`
    pub fn issue(
        &self,
        user_id: i64,
        username: &str,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            user_id,
            username: username.to_string(),
            user_role: role.as_str().to_string(),
            iat: now.timestamp(),
            exp: now
                .checked_add_signed(self.expiration)
                .ok_or_else(|| {
                    TokenError::Config(format!("expiry overflows from issue time {}", now))
                })?
                .timestamp(),
        };

        self.encode_claims(&claims)
    }

    /// Signs arbitrary claims with the configured key
    pub fn encode_claims(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(self.algorithm), claims, &self.encoding_key)
            .map_err(|e| TokenError::Encode(format!("Token encoding failed: {}", e)))
    }

    /// Validates a token and returns the principal it names
    ///
    /// A token whose `exp` equals `now` is already expired.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Invalid` for a bad signature, a different
    /// algorithm, malformed structure or expiry.
    pub fn decode(&self, token: &str, now: DateTime<Utc>) -> Result<Principal, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        // Expiry is checked against the caller's clock below.
        validation.validate_exp = false;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            debug!(error = %e, "Token rejected");
            TokenError::Invalid
        })?;

        let claims = token_data.claims;
        if now.timestamp() >= claims.exp {
            debug!(user_id = claims.user_id, exp = claims.exp, "Token expired");
            return Err(TokenError::Invalid);
        }

        Ok(Principal::from(claims))
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &self.algorithm)
            .field("expiration", &self.expiration)
            .finish_non_exhaustive()
    }
}

fn parse_hmac_algorithm(value: &str) -> Result<Algorithm, TokenError> {
    let algorithm: Algorithm = value
        .parse()
        .map_err(|_| TokenError::Config(format!("unknown signing algorithm {:?}", value)))?;

    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(algorithm),
        other => Err(TokenError::Config(format!(
            "signing algorithm {:?} is not an HMAC algorithm",
            other
        ))),
    }
}
