//! # Autoshop API Server Library
//!
//! REST backend for a vehicle-service shop: bearer-token authentication,
//! role-based authorization and CRUD over users, vehicles, services and
//! orders.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `extractors`: Authorization gate as Axum extractors
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod extractors;
pub mod routes;
