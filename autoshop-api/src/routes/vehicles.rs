/// Vehicle endpoints
///
/// # Endpoints
///
/// - `GET  /api/v1/vehicles/` - List the vehicle catalog
/// - `GET  /api/v1/vehicles/:vehicle_id/` - Get a catalog vehicle
/// - `POST /api/v1/vehicles/` - Add a catalog vehicle (admin)
/// - `POST /api/v1/vehicles/customer/:vehicle_id/` - Register a customer's
///   car of an existing catalog vehicle (owner or admin)
/// - `POST /api/v1/vehicles/customer/` - Add a catalog vehicle and register
///   a customer's car of it (owner or admin)
///
/// For the customer endpoints the owner is the `customer_id` in the body.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extractors::{AdminPrincipal, ApiJson, ApiPath, Authenticated},
};
use autoshop_shared::models::{
    customer::Customer,
    vehicle::{CustomerVehicle, NewCustomerVehicle, NewVehicle, Vehicle},
};
use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;
use validator::Validate;

const VEHICLE_NOT_FOUND: &str = "Vehicle not found for given vehicle_id";
const CUSTOMER_NOT_FOUND: &str = "Customer not found for given id.";

/// Catalog fields of a vehicle
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct VehicleRequest {
    #[validate(length(min = 1, max = 255, message = "Brand must be 1 to 255 characters"))]
    pub brand: String,

    #[validate(length(min = 1, max = 255, message = "Model must be 1 to 255 characters"))]
    pub model: String,

    #[validate(length(min = 1, max = 64, message = "Color must be 1 to 64 characters"))]
    pub color: String,

    #[validate(length(min = 1, max = 16, message = "Year must be 1 to 16 characters"))]
    pub year: String,
}

impl From<VehicleRequest> for NewVehicle {
    fn from(req: VehicleRequest) -> Self {
        NewVehicle {
            brand: req.brand,
            model: req.model,
            color: req.color,
            year: req.year,
        }
    }
}

/// A customer's car
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CustomerVehicleRequest {
    #[validate(length(min = 1, max = 64, message = "VIN must be 1 to 64 characters"))]
    pub vin: String,

    #[serde(default)]
    #[validate(length(max = 32, message = "Plate code must be at most 32 characters"))]
    pub plate_code: String,

    /// Owning customer; also the owner checked by the gate
    pub customer_id: i64,
}

/// A customer's car together with its not yet cataloged vehicle
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerVehicleWithVehicleRequest {
    #[serde(flatten)]
    pub owner: CustomerVehicleRequest,

    #[serde(flatten)]
    pub vehicle: VehicleRequest,
}

pub async fn list_vehicles(State(state): State<AppState>) -> ApiResult<Json<Vec<Vehicle>>> {
    let vehicles = Vehicle::list(&state.db).await?;
    Ok(Json(vehicles))
}

pub async fn get_vehicle(
    State(state): State<AppState>,
    ApiPath(vehicle_id): ApiPath<i64>,
) -> ApiResult<Json<Vehicle>> {
    let vehicle = Vehicle::find_by_id(&state.db, vehicle_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(VEHICLE_NOT_FOUND.to_string()))?;

    Ok(Json(vehicle))
}

/// Adds a vehicle to the catalog
///
/// # Errors
///
/// - `400 Bad Request`: Same brand, model, color and year already cataloged
/// - `401`/`403`: Not an administrator
pub async fn create_vehicle(
    State(state): State<AppState>,
    AdminPrincipal(admin): AdminPrincipal,
    ApiJson(req): ApiJson<VehicleRequest>,
) -> ApiResult<(StatusCode, Json<Vehicle>)> {
    req.validate()?;

    let data = NewVehicle::from(req);
    ensure_not_cataloged(&state, &data).await?;

    let vehicle = Vehicle::create(&state.db, &data).await?;

    info!(admin_id = admin.user_id, vehicle_id = vehicle.id, "Vehicle created");

    Ok((StatusCode::CREATED, Json(vehicle)))
}

/// Registers a customer's car of an existing catalog vehicle
///
/// # Errors
///
/// - `400 Bad Request`: VIN already registered
/// - `401`/`403`: Neither the customer in the body nor an administrator
/// - `404 Not Found`: Unknown vehicle or customer
pub async fn create_customer_vehicle(
    State(state): State<AppState>,
    caller: Authenticated,
    ApiPath(vehicle_id): ApiPath<i64>,
    ApiJson(req): ApiJson<CustomerVehicleRequest>,
) -> ApiResult<(StatusCode, Json<CustomerVehicle>)> {
    caller.require_owner_or_admin(req.customer_id)?;

    req.validate()?;

    if Vehicle::find_by_id(&state.db, vehicle_id).await?.is_none() {
        return Err(ApiError::NotFound(VEHICLE_NOT_FOUND.to_string()));
    }
    ensure_customer_exists(&state, req.customer_id).await?;
    ensure_vin_available(&state, &req.vin).await?;

    let vin = req.vin.clone();
    let customer_vehicle = CustomerVehicle::create(
        &state.db,
        NewCustomerVehicle {
            vin: req.vin,
            plate_code: req.plate_code,
            customer_id: req.customer_id,
            vehicle_id,
        },
    )
    .await
    .map_err(|e| ApiError::on_conflict(e, vin_taken(&vin)))?;

    info!(
        user_id = caller.0.user_id,
        customer_id = customer_vehicle.customer_id,
        customer_vehicle_id = customer_vehicle.id,
        "Customer vehicle created"
    );

    Ok((StatusCode::CREATED, Json(customer_vehicle)))
}

/// Catalogs a vehicle and registers a customer's car of it in one step
///
/// # Errors
///
/// - `400 Bad Request`: Vehicle already cataloged or VIN already registered
/// - `401`/`403`: Neither the customer in the body nor an administrator
/// - `404 Not Found`: Unknown customer
pub async fn create_vehicle_and_customer_vehicle(
    State(state): State<AppState>,
    caller: Authenticated,
    ApiJson(req): ApiJson<CustomerVehicleWithVehicleRequest>,
) -> ApiResult<(StatusCode, Json<CustomerVehicle>)> {
    caller.require_owner_or_admin(req.owner.customer_id)?;

    req.owner.validate()?;
    req.vehicle.validate()?;

    let owner = req.owner;
    let vehicle = NewVehicle::from(req.vehicle);

    ensure_customer_exists(&state, owner.customer_id).await?;
    ensure_not_cataloged(&state, &vehicle).await?;
    ensure_vin_available(&state, &owner.vin).await?;

    let (vehicle, customer_vehicle) = CustomerVehicle::create_with_vehicle(
        &state.db,
        &vehicle,
        &owner.vin,
        &owner.plate_code,
        owner.customer_id,
    )
    .await
    .map_err(|e| ApiError::on_conflict(e, vin_taken(&owner.vin)))?;

    info!(
        user_id = caller.0.user_id,
        customer_id = customer_vehicle.customer_id,
        vehicle_id = vehicle.id,
        customer_vehicle_id = customer_vehicle.id,
        "Vehicle and customer vehicle created"
    );

    Ok((StatusCode::CREATED, Json(customer_vehicle)))
}

async fn ensure_not_cataloged(state: &AppState, data: &NewVehicle) -> ApiResult<()> {
    match Vehicle::find_matching(&state.db, data).await? {
        Some(existing) => Err(ApiError::BadRequest(format!(
            "Vehicle already exists with id {}",
            existing.id
        ))),
        None => Ok(()),
    }
}

async fn ensure_customer_exists(state: &AppState, customer_id: i64) -> ApiResult<()> {
    match Customer::find_by_id(&state.db, customer_id).await? {
        Some(_) => Ok(()),
        None => Err(ApiError::NotFound(CUSTOMER_NOT_FOUND.to_string())),
    }
}

async fn ensure_vin_available(state: &AppState, vin: &str) -> ApiResult<()> {
    match CustomerVehicle::find_by_vin(&state.db, vin).await? {
        Some(_) => Err(vin_taken(vin)),
        None => Ok(()),
    }
}

fn vin_taken(vin: &str) -> ApiError {
    ApiError::BadRequest(format!("Customer vehicle already exists with vin {}", vin))
}
