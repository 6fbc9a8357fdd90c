/// User model and database operations
///
/// Every account, whatever its role, is a row in `users`. Customers and
/// employees additionally have a row keyed by the same id in `customers` or
/// `employees` (see [`super::customer`] and [`super::employee`]).
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id BIGSERIAL PRIMARY KEY,
///     username VARCHAR(255) NOT NULL UNIQUE,
///     hashed_password VARCHAR(255) NOT NULL,
///     first_name VARCHAR(255),
///     last_name VARCHAR(255),
///     is_active BOOLEAN NOT NULL DEFAULT TRUE,
///     role user_role NOT NULL DEFAULT 'CUSTOMER',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use autoshop_shared::auth::role::Role;
/// use autoshop_shared::models::user::{CreateUser, User};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let user = User::create(&pool, CreateUser {
///     username: "alex.doe@email.com".to_string(),
///     hashed_password: "$argon2id$...".to_string(),
///     role: Role::Admin,
/// }).await?;
///
/// let found = User::find_by_username(&pool, "alex.doe@email.com").await?;
/// assert_eq!(found.map(|u| u.id), Some(user.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{PgExecutor, PgPool};

use crate::auth::role::Role;

/// A user account
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,

    /// Login name, unique across all users
    pub username: String,

    /// Argon2id PHC string, never serialized
    #[serde(skip_serializing)]
    pub hashed_password: String,

    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: bool,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a user row
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub username: String,

    /// Argon2id hash (NOT the plaintext password)
    pub hashed_password: String,

    pub role: Role,
}

/// Input for updating a user's profile
///
/// `hashed_password` is only written when present.
#[derive(Debug, Clone)]
pub struct UpdateUser {
    pub username: String,
    pub hashed_password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

pub(crate) const USER_COLUMNS: &str =
    "id, username, hashed_password, first_name, last_name, is_active, role, created_at, updated_at";

impl User {
    /// Inserts a user row
    ///
    /// # Errors
    ///
    /// Returns an error if the username is already taken (unique violation)
    /// or the database is unreachable.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, hashed_password, role)
            VALUES ($1, $2, $3)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(data.username)
        .bind(data.hashed_password)
        .bind(data.role)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by exact username
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE username = $1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Lists all users ordered by ID
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users ORDER BY id",
            USER_COLUMNS
        ))
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    /// Updates username, names and optionally the password hash
    ///
    /// Returns `None` if no user has the given ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the new username belongs to another user.
    pub async fn update<'e, E>(
        executor: E,
        id: i64,
        data: UpdateUser,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET username = $2,
                hashed_password = COALESCE($3, hashed_password),
                first_name = $4,
                last_name = $5,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(id)
        .bind(data.username)
        .bind(data.hashed_password)
        .bind(data.first_name)
        .bind(data.last_name)
        .fetch_optional(executor)
        .await?;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: 1,
            username: "alex.doe@email.com".to_string(),
            hashed_password: "$argon2id$v=19$m=65536,t=3,p=4$c2FsdA$aGFzaA".to_string(),
            first_name: Some("Alex".to_string()),
            last_name: None,
            is_active: true,
            role: Role::Admin,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_user_serialization_hides_password_hash() {
        let json = serde_json::to_value(sample_user()).unwrap();

        assert!(json.get("hashed_password").is_none());
        assert_eq!(json["username"], "alex.doe@email.com");
        assert_eq!(json["role"], "ADMIN");
        assert_eq!(json["is_active"], true);
        assert!(json["last_name"].is_null());
    }
}
