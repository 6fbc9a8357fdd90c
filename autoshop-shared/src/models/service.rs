/// Shop service model
///
/// A service is an item of work the shop sells (oil change, alignment...),
/// with a price and an estimated duration in minutes.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE services (
///     id BIGSERIAL PRIMARY KEY,
///     name VARCHAR(255) NOT NULL,
///     price DOUBLE PRECISION NOT NULL,
///     description TEXT NOT NULL,
///     image TEXT,
///     estimated_time INTEGER NOT NULL,
///     category VARCHAR(64) NOT NULL DEFAULT 'maintenance',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Category assigned when a request omits one
pub const DEFAULT_SERVICE_CATEGORY: &str = "maintenance";

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Service {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub description: String,
    pub image: Option<String>,

    /// Minutes
    pub estimated_time: i32,

    pub category: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Writable service fields, used for both create and full update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceData {
    pub name: String,
    pub price: f64,
    pub description: String,
    pub image: Option<String>,
    pub estimated_time: i32,
    pub category: String,
}

const SERVICE_COLUMNS: &str =
    "id, name, price, description, image, estimated_time, category, created_at, updated_at";

impl Service {
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let services = sqlx::query_as::<_, Service>(&format!(
            "SELECT {} FROM services ORDER BY id",
            SERVICE_COLUMNS
        ))
        .fetch_all(pool)
        .await?;

        Ok(services)
    }

    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let service = sqlx::query_as::<_, Service>(&format!(
            "SELECT {} FROM services WHERE id = $1",
            SERVICE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(service)
    }

    /// Finds a service with identical fields
    pub async fn find_matching(
        pool: &PgPool,
        data: &ServiceData,
    ) -> Result<Option<Self>, sqlx::Error> {
        let service = sqlx::query_as::<_, Service>(&format!(
            r#"
            SELECT {}
            FROM services
            WHERE name = $1 AND price = $2 AND description = $3
              AND image IS NOT DISTINCT FROM $4
              AND estimated_time = $5 AND category = $6
            LIMIT 1
            "#,
            SERVICE_COLUMNS
        ))
        .bind(&data.name)
        .bind(data.price)
        .bind(&data.description)
        .bind(&data.image)
        .bind(data.estimated_time)
        .bind(&data.category)
        .fetch_optional(pool)
        .await?;

        Ok(service)
    }

    pub async fn create(pool: &PgPool, data: &ServiceData) -> Result<Self, sqlx::Error> {
        let service = sqlx::query_as::<_, Service>(&format!(
            r#"
            INSERT INTO services (name, price, description, image, estimated_time, category)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            SERVICE_COLUMNS
        ))
        .bind(&data.name)
        .bind(data.price)
        .bind(&data.description)
        .bind(&data.image)
        .bind(data.estimated_time)
        .bind(&data.category)
        .fetch_one(pool)
        .await?;

        Ok(service)
    }

    /// Replaces every writable field
    ///
    /// Returns `None` if no service has the given ID.
    pub async fn update(
        pool: &PgPool,
        id: i64,
        data: &ServiceData,
    ) -> Result<Option<Self>, sqlx::Error> {
        let service = sqlx::query_as::<_, Service>(&format!(
            r#"
            UPDATE services
            SET name = $2, price = $3, description = $4, image = $5,
                estimated_time = $6, category = $7, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            SERVICE_COLUMNS
        ))
        .bind(id)
        .bind(&data.name)
        .bind(data.price)
        .bind(&data.description)
        .bind(&data.image)
        .bind(data.estimated_time)
        .bind(&data.category)
        .fetch_optional(pool)
        .await?;

        Ok(service)
    }

    /// Deletes a service, returning false if it didn't exist
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
