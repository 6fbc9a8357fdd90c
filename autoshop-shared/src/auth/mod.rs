/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`role`]: The closed set of user roles
/// - [`jwt`]: Token issuance and validation
/// - [`policy`]: Pure role/ownership decisions
/// - [`authorization`]: Per-request gate combining decode and policy
///
/// # Example
///
/// ```
/// use autoshop_shared::auth::authorization::require_admin;
/// use autoshop_shared::auth::jwt::TokenCodec;
/// use autoshop_shared::auth::password::{hash_password, verify_password};
/// use autoshop_shared::auth::role::Role;
/// use chrono::{Duration, Utc};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// // Signin
/// let hash = hash_password("test789")?;
/// assert!(verify_password("test789", &hash));
///
/// let codec = TokenCodec::new("your-secret-key-at-least-32-bytes-long", "HS256", Duration::days(1))?;
/// let now = Utc::now();
/// let token = codec.issue(1, "alex.doe@email.com", Role::Admin, now)?;
///
/// // Later request
/// let principal = require_admin(&codec, Some(&format!("Bearer {}", token)), now)?;
/// assert_eq!(principal.user_id, 1);
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod password;
pub mod policy;
pub mod role;
