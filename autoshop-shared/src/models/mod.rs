/// Database models for the shop
///
/// Each model owns its queries as associated async functions taking a
/// `&PgPool`.
///
/// # Models
///
/// - `user`: Accounts of every role
/// - `customer`: Customer rows and their deduplicated addresses
/// - `employee`: Employee rows
/// - `vehicle`: Vehicle catalog and customer-owned vehicles
/// - `service`: Services offered by the shop
/// - `order`: Work orders
///
/// # Example
///
/// ```no_run
/// use autoshop_shared::models::customer::Customer;
/// use autoshop_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = Customer::register(&pool, "john.doe@email.com", "$argon2id$...").await?;
/// # Ok(())
/// # }
/// ```

pub mod customer;
pub mod employee;
pub mod order;
pub mod service;
pub mod user;
pub mod vehicle;
