/// Customer and address models
///
/// A customer is a user with role `CUSTOMER` plus a `customers` row sharing
/// its id. The optional address is deduplicated: identical addresses point
/// to the same `addresses` row.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE addresses (
///     id BIGSERIAL PRIMARY KEY,
///     street VARCHAR(255) NOT NULL DEFAULT '',
///     city VARCHAR(255) NOT NULL DEFAULT '',
///     state VARCHAR(255) NOT NULL DEFAULT '',
///     complement VARCHAR(255) NOT NULL DEFAULT '',
///     zipcode VARCHAR(32) NOT NULL DEFAULT ''
/// );
///
/// CREATE TABLE customers (
///     id BIGINT PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
///     address_id BIGINT REFERENCES addresses(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgExecutor, PgPool};

use super::user::{UpdateUser, User, USER_COLUMNS};
use crate::auth::role::Role;

/// A customer row
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Customer {
    /// Same as the owning user's id
    pub id: i64,
    pub address_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A postal address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Address {
    pub id: i64,
    pub street: String,
    pub city: String,
    pub state: String,
    pub complement: String,
    pub zipcode: String,
}

/// Address fields as submitted by clients
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAddress {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub complement: String,
    #[serde(default)]
    pub zipcode: String,
}

/// Customer listing row: user profile joined with its address
///
/// Address fields are `None` for customers that never registered one.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CustomerWithAddress {
    pub id: i64,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: bool,
    pub role: Role,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub complement: Option<String>,
    pub zipcode: Option<String>,
}

impl Customer {
    /// Creates a user with role `CUSTOMER` and its customer row
    ///
    /// Both inserts run in one transaction.
    ///
    /// # Errors
    ///
    /// Returns a unique violation if the username is taken.
    pub async fn register(
        pool: &PgPool,
        username: &str,
        hashed_password: &str,
    ) -> Result<User, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, hashed_password, role)
            VALUES ($1, $2, $3)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(username)
        .bind(hashed_password)
        .bind(Role::Customer)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO customers (id) VALUES ($1)")
            .bind(user.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(user)
    }

    /// Finds a customer row by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, address_id, created_at, updated_at
            FROM customers
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(customer)
    }

    /// Lists customers with their profile and address
    pub async fn list_with_address(pool: &PgPool) -> Result<Vec<CustomerWithAddress>, sqlx::Error> {
        let customers = sqlx::query_as::<_, CustomerWithAddress>(
            r#"
            SELECT u.id, u.username, u.first_name, u.last_name, u.is_active, u.role,
                   a.street, a.city, a.state, a.complement, a.zipcode
            FROM customers c
            JOIN users u ON u.id = c.id
            LEFT JOIN addresses a ON a.id = c.address_id
            ORDER BY u.id
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(customers)
    }

    /// Points the customer at an address
    ///
    /// Returns false if the customer doesn't exist.
    pub async fn set_address<'e, E>(
        executor: E,
        id: i64,
        address_id: i64,
    ) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            "UPDATE customers SET address_id = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(address_id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Updates the customer's user fields and, when given, their address
    ///
    /// The address upsert, the address link and the user update share one
    /// transaction. Returns `None` without writing anything if no user has
    /// the given ID.
    ///
    /// # Errors
    ///
    /// Returns a unique violation if the new username belongs to another
    /// user. Nothing is written in that case.
    pub async fn update_profile(
        pool: &PgPool,
        id: i64,
        data: UpdateUser,
        address: Option<&NewAddress>,
    ) -> Result<Option<User>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if let Some(address) = address {
            let address = Address::find_or_create(&mut *tx, address).await?;
            Self::set_address(&mut *tx, id, address.id).await?;
        }

        let Some(user) = User::update(&mut *tx, id, data).await? else {
            tx.rollback().await?;
            return Ok(None);
        };

        tx.commit().await?;

        Ok(Some(user))
    }
}

impl Address {
    /// Finds an address with exactly these fields
    pub async fn find_matching(
        conn: &mut PgConnection,
        data: &NewAddress,
    ) -> Result<Option<Self>, sqlx::Error> {
        let address = sqlx::query_as::<_, Address>(
            r#"
            SELECT id, street, city, state, complement, zipcode
            FROM addresses
            WHERE street = $1 AND city = $2 AND state = $3
              AND complement = $4 AND zipcode = $5
            LIMIT 1
            "#,
        )
        .bind(&data.street)
        .bind(&data.city)
        .bind(&data.state)
        .bind(&data.complement)
        .bind(&data.zipcode)
        .fetch_optional(conn)
        .await?;

        Ok(address)
    }

    /// Returns the matching address, inserting it first if needed
    pub async fn find_or_create(
        conn: &mut PgConnection,
        data: &NewAddress,
    ) -> Result<Self, sqlx::Error> {
        if let Some(existing) = Self::find_matching(&mut *conn, data).await? {
            return Ok(existing);
        }

        let address = sqlx::query_as::<_, Address>(
            r#"
            INSERT INTO addresses (street, city, state, complement, zipcode)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, street, city, state, complement, zipcode
            "#,
        )
        .bind(&data.street)
        .bind(&data.city)
        .bind(&data.state)
        .bind(&data.complement)
        .bind(&data.zipcode)
        .fetch_one(conn)
        .await?;

        Ok(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_address_missing_fields_default_to_empty() {
        let address: NewAddress =
            serde_json::from_str(r#"{"street": "Rua A", "zipcode": "01000-000"}"#).unwrap();

        assert_eq!(address.street, "Rua A");
        assert_eq!(address.zipcode, "01000-000");
        assert_eq!(address.city, "");
        assert_eq!(address.complement, "");
    }
}
