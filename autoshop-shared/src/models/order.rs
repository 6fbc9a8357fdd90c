/// Work order model
///
/// An order groups, for one customer, the vehicles brought in, the services
/// requested and the employees assigned, with a start date, an estimated
/// completion time and a status.
///
/// Vehicle, service and employee references are stored as `BIGINT[]`
/// columns and are not foreign keys.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE orders (
///     id BIGSERIAL PRIMARY KEY,
///     customer_id BIGINT NOT NULL REFERENCES customers(id),
///     customer_vehicle_ids BIGINT[] NOT NULL,
///     service_ids BIGINT[] NOT NULL,
///     employee_ids BIGINT[],
///     start_date TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     estimated_time TIMESTAMPTZ NOT NULL,
///     status VARCHAR(32) NOT NULL DEFAULT 'REQUESTED',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Order {
    pub id: i64,
    pub customer_id: i64,
    pub customer_vehicle_ids: Vec<i64>,
    pub service_ids: Vec<i64>,
    pub employee_ids: Option<Vec<i64>>,
    pub start_date: DateTime<Utc>,
    pub estimated_time: DateTime<Utc>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Writable order fields, used for both create and full update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderData {
    pub customer_id: i64,
    pub customer_vehicle_ids: Vec<i64>,
    pub service_ids: Vec<i64>,
    pub employee_ids: Option<Vec<i64>>,
    pub start_date: DateTime<Utc>,
    pub estimated_time: DateTime<Utc>,
    pub status: String,
}

const ORDER_COLUMNS: &str = "id, customer_id, customer_vehicle_ids, service_ids, employee_ids, \
     start_date, estimated_time, status, created_at, updated_at";

impl Order {
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {} FROM orders ORDER BY id",
            ORDER_COLUMNS
        ))
        .fetch_all(pool)
        .await?;

        Ok(orders)
    }

    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {} FROM orders WHERE id = $1",
            ORDER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(order)
    }

    /// Finds an order for the same customer, dates and status whose id
    /// arrays contain the requested ones
    ///
    /// A missing `employee_ids` matches any assignment.
    pub async fn find_matching(
        pool: &PgPool,
        data: &OrderData,
    ) -> Result<Option<Self>, sqlx::Error> {
        let order = sqlx::query_as::<_, Order>(&format!(
            r#"
            SELECT {}
            FROM orders
            WHERE customer_id = $1
              AND customer_vehicle_ids @> $2
              AND service_ids @> $3
              AND ($4::BIGINT[] IS NULL OR employee_ids @> $4)
              AND start_date = $5
              AND estimated_time = $6
              AND status = $7
            LIMIT 1
            "#,
            ORDER_COLUMNS
        ))
        .bind(data.customer_id)
        .bind(&data.customer_vehicle_ids)
        .bind(&data.service_ids)
        .bind(&data.employee_ids)
        .bind(data.start_date)
        .bind(data.estimated_time)
        .bind(&data.status)
        .fetch_optional(pool)
        .await?;

        Ok(order)
    }

    pub async fn create(pool: &PgPool, data: &OrderData) -> Result<Self, sqlx::Error> {
        let order = sqlx::query_as::<_, Order>(&format!(
            r#"
            INSERT INTO orders (customer_id, customer_vehicle_ids, service_ids, employee_ids,
                                start_date, estimated_time, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            ORDER_COLUMNS
        ))
        .bind(data.customer_id)
        .bind(&data.customer_vehicle_ids)
        .bind(&data.service_ids)
        .bind(&data.employee_ids)
        .bind(data.start_date)
        .bind(data.estimated_time)
        .bind(&data.status)
        .fetch_one(pool)
        .await?;

        Ok(order)
    }

    /// Replaces every writable field
    ///
    /// Returns `None` if no order has the given ID.
    pub async fn update(
        pool: &PgPool,
        id: i64,
        data: &OrderData,
    ) -> Result<Option<Self>, sqlx::Error> {
        let order = sqlx::query_as::<_, Order>(&format!(
            r#"
            UPDATE orders
            SET customer_id = $2, customer_vehicle_ids = $3, service_ids = $4,
                employee_ids = $5, start_date = $6, estimated_time = $7,
                status = $8, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            ORDER_COLUMNS
        ))
        .bind(id)
        .bind(data.customer_id)
        .bind(&data.customer_vehicle_ids)
        .bind(&data.service_ids)
        .bind(&data.employee_ids)
        .bind(data.start_date)
        .bind(data.estimated_time)
        .bind(&data.status)
        .fetch_optional(pool)
        .await?;

        Ok(order)
    }

    /// Deletes an order, returning false if it didn't exist
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
