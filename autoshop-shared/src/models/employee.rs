/// Employee model
///
/// An employee is a user with role `EMPLOYEE` plus an `employees` row
/// sharing its id.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use super::user::{User, USER_COLUMNS};
use crate::auth::role::Role;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Employee {
    pub id: i64,
    pub job_title: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Employee {
    /// Creates a user with role `EMPLOYEE` and its employee row in one
    /// transaction
    ///
    /// # Errors
    ///
    /// Returns a unique violation if the username is taken.
    pub async fn register(
        pool: &PgPool,
        username: &str,
        hashed_password: &str,
        job_title: Option<&str>,
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
        .bind(Role::Employee)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO employees (id, job_title) VALUES ($1, $2)")
            .bind(user.id)
            .bind(job_title)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(user)
    }

    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let employee = sqlx::query_as::<_, Employee>(
            "SELECT id, job_title, created_at, updated_at FROM employees WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(employee)
    }
}
