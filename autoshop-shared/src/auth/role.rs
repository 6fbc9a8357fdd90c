/// User roles
///
/// Every identity has exactly one role. The stable string identifiers
/// (`ADMIN`, `CUSTOMER`, `EMPLOYEE`) are used both for the PostgreSQL
/// `user_role` enum and for the `user_role` token claim.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE user_role AS ENUM ('ADMIN', 'CUSTOMER', 'EMPLOYEE');
/// ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of roles an identity can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Shop administrator, may manage every resource
    Admin,

    /// Customer, may manage resources they own
    Customer,

    /// Shop employee
    Employee,
}

impl Role {
    /// Stable identifier used in storage and tokens
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Customer => "CUSTOMER",
            Role::Employee => "EMPLOYEE",
        }
    }

    /// Parses a stable identifier
    ///
    /// Matching is exact. Anything else, including the empty string, is not
    /// a role.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ADMIN" => Some(Role::Admin),
            "CUSTOMER" => Some(Role::Customer),
            "EMPLOYEE" => Some(Role::Employee),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
