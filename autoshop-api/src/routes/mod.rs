/// API route handlers
///
/// One module per resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Sign-in and customer sign-up
/// - `users`: Users, customers and employees
/// - `vehicles`: Vehicle catalog and customers' cars
/// - `services`: Services offered by the shop
/// - `orders`: Work orders

use serde::{Deserialize, Serialize};

pub mod auth;
pub mod health;
pub mod orders;
pub mod services;
pub mod users;
pub mod vehicles;

/// Body returned by delete endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deleted {
    pub id: i64,
}
