/// Vehicle catalog and customer vehicles
///
/// `vehicles` is a catalog of (brand, model, color, year) combinations.
/// `customer_vehicles` records a physical car: its VIN and plate, the
/// customer owning it and the catalog entry it instantiates.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE vehicles (
///     id BIGSERIAL PRIMARY KEY,
///     brand VARCHAR(255) NOT NULL,
///     model VARCHAR(255) NOT NULL,
///     color VARCHAR(64) NOT NULL,
///     year VARCHAR(16) NOT NULL
/// );
///
/// CREATE TABLE customer_vehicles (
///     id BIGSERIAL PRIMARY KEY,
///     vin VARCHAR(64) NOT NULL UNIQUE,
///     plate_code VARCHAR(32) NOT NULL DEFAULT '',
///     customer_id BIGINT NOT NULL REFERENCES customers(id) ON DELETE CASCADE,
///     vehicle_id BIGINT NOT NULL REFERENCES vehicles(id)
/// );
/// ```

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// A catalog vehicle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Vehicle {
    pub id: i64,
    pub brand: String,
    pub model: String,
    pub color: String,
    pub year: String,
}

/// Catalog fields for a new vehicle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVehicle {
    pub brand: String,
    pub model: String,
    pub color: String,
    pub year: String,
}

/// A vehicle owned by a customer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct CustomerVehicle {
    pub id: i64,
    pub vin: String,
    pub plate_code: String,
    pub customer_id: i64,
    pub vehicle_id: i64,
}

/// Fields for a new customer vehicle
#[derive(Debug, Clone)]
pub struct NewCustomerVehicle {
    pub vin: String,
    pub plate_code: String,
    pub customer_id: i64,
    pub vehicle_id: i64,
}

impl Vehicle {
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let vehicles = sqlx::query_as::<_, Vehicle>(
            "SELECT id, brand, model, color, year FROM vehicles ORDER BY id",
        )
        .fetch_all(pool)
        .await?;

        Ok(vehicles)
    }

    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            "SELECT id, brand, model, color, year FROM vehicles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(vehicle)
    }

    /// Finds a catalog entry with the same brand, model, color and year
    pub async fn find_matching(
        pool: &PgPool,
        data: &NewVehicle,
    ) -> Result<Option<Self>, sqlx::Error> {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            SELECT id, brand, model, color, year
            FROM vehicles
            WHERE brand = $1 AND model = $2 AND color = $3 AND year = $4
            LIMIT 1
            "#,
        )
        .bind(&data.brand)
        .bind(&data.model)
        .bind(&data.color)
        .bind(&data.year)
        .fetch_optional(pool)
        .await?;

        Ok(vehicle)
    }

    /// Inserts a catalog entry
    ///
    /// Callers check [`Vehicle::find_matching`] first; the table itself
    /// does not enforce uniqueness.
    pub async fn create(pool: &PgPool, data: &NewVehicle) -> Result<Self, sqlx::Error> {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            INSERT INTO vehicles (brand, model, color, year)
            VALUES ($1, $2, $3, $4)
            RETURNING id, brand, model, color, year
            "#,
        )
        .bind(&data.brand)
        .bind(&data.model)
        .bind(&data.color)
        .bind(&data.year)
        .fetch_one(pool)
        .await?;

        Ok(vehicle)
    }
}

impl CustomerVehicle {
    /// Inserts a customer vehicle
    ///
    /// # Errors
    ///
    /// Returns a unique violation if the VIN is already registered.
    pub async fn create(pool: &PgPool, data: NewCustomerVehicle) -> Result<Self, sqlx::Error> {
        let customer_vehicle = sqlx::query_as::<_, CustomerVehicle>(
            r#"
            INSERT INTO customer_vehicles (vin, plate_code, customer_id, vehicle_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, vin, plate_code, customer_id, vehicle_id
            "#,
        )
        .bind(data.vin)
        .bind(data.plate_code)
        .bind(data.customer_id)
        .bind(data.vehicle_id)
        .fetch_one(pool)
        .await?;

        Ok(customer_vehicle)
    }

    /// Inserts a catalog vehicle and a customer vehicle pointing at it in
    /// one transaction
    pub async fn create_with_vehicle(
        pool: &PgPool,
        vehicle: &NewVehicle,
        vin: &str,
        plate_code: &str,
        customer_id: i64,
    ) -> Result<(Vehicle, Self), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            INSERT INTO vehicles (brand, model, color, year)
            VALUES ($1, $2, $3, $4)
            RETURNING id, brand, model, color, year
            "#,
        )
        .bind(&vehicle.brand)
        .bind(&vehicle.model)
        .bind(&vehicle.color)
        .bind(&vehicle.year)
        .fetch_one(&mut *tx)
        .await?;

        let customer_vehicle = sqlx::query_as::<_, CustomerVehicle>(
            r#"
            INSERT INTO customer_vehicles (vin, plate_code, customer_id, vehicle_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, vin, plate_code, customer_id, vehicle_id
            "#,
        )
        .bind(vin)
        .bind(plate_code)
        .bind(customer_id)
        .bind(vehicle.id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((vehicle, customer_vehicle))
    }

    pub async fn find_by_vin(pool: &PgPool, vin: &str) -> Result<Option<Self>, sqlx::Error> {
        let customer_vehicle = sqlx::query_as::<_, CustomerVehicle>(
            r#"
            SELECT id, vin, plate_code, customer_id, vehicle_id
            FROM customer_vehicles
            WHERE vin = $1
            "#,
        )
        .bind(vin)
        .fetch_optional(pool)
        .await?;

        Ok(customer_vehicle)
    }
}
