/// User management endpoints
///
/// # Endpoints
///
/// - `GET  /api/v1/users/` - List all users (admin)
/// - `GET  /api/v1/users/customers/` - List customers with address (admin)
/// - `POST /api/v1/users/customer/` - Create a customer (admin)
/// - `PUT  /api/v1/users/customer/:customer_id/` - Update a customer (owner or admin)
/// - `POST /api/v1/users/employee/` - Create an employee (admin)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extractors::{AdminPrincipal, ApiForm, ApiJson, ApiPath, Authenticated},
    routes::auth::{register_customer, CredentialsForm},
};
use autoshop_shared::{
    auth::{password, role::Role},
    models::{
        customer::{Customer, CustomerWithAddress, NewAddress},
        employee::Employee,
        user::{UpdateUser, User},
    },
};
use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

const CUSTOMER_NOT_FOUND: &str = "Customer not found for given id.";

/// Customer created by an administrator
#[derive(Debug, Serialize, Deserialize)]
pub struct NewCustomerResponse {
    pub id: i64,
    pub role: Role,
    pub username: String,
}

/// Employee created by an administrator
#[derive(Debug, Serialize, Deserialize)]
pub struct NewEmployeeResponse {
    pub id: i64,
    pub username: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct EmployeeForm {
    #[validate(length(min = 1, max = 255, message = "Username must be 1 to 255 characters"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: String,

    #[validate(length(max = 255, message = "Job title must be at most 255 characters"))]
    pub job_title: Option<String>,
}

/// Profile update for a customer
///
/// The password is only changed when present and non-empty. A present
/// `address` is matched against existing addresses before a new one is
/// created.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCustomerRequest {
    #[validate(length(min = 1, max = 255, message = "Username must be 1 to 255 characters"))]
    pub username: String,

    pub password: Option<String>,

    #[validate(length(max = 255, message = "First name must be at most 255 characters"))]
    pub first_name: Option<String>,

    #[validate(length(max = 255, message = "Last name must be at most 255 characters"))]
    pub last_name: Option<String>,

    pub address: Option<NewAddress>,
}

pub async fn list_users(
    State(state): State<AppState>,
    AdminPrincipal(_admin): AdminPrincipal,
) -> ApiResult<Json<Vec<User>>> {
    let users = User::list(&state.db).await?;
    Ok(Json(users))
}

pub async fn list_customers(
    State(state): State<AppState>,
    AdminPrincipal(_admin): AdminPrincipal,
) -> ApiResult<Json<Vec<CustomerWithAddress>>> {
    let customers = Customer::list_with_address(&state.db).await?;
    Ok(Json(customers))
}

/// Creates a customer account on behalf of a client
///
/// # Errors
///
/// - `400 Bad Request`: Username already registered
/// - `401`/`403`: Not an administrator
pub async fn create_customer(
    State(state): State<AppState>,
    AdminPrincipal(admin): AdminPrincipal,
    ApiForm(form): ApiForm<CredentialsForm>,
) -> ApiResult<(StatusCode, Json<NewCustomerResponse>)> {
    form.validate()?;

    let user = register_customer(&state, &form).await?;

    info!(admin_id = admin.user_id, customer_id = user.id, "Customer created");

    Ok((
        StatusCode::CREATED,
        Json(NewCustomerResponse {
            id: user.id,
            role: user.role,
            username: user.username,
        }),
    ))
}

/// Updates a customer's profile
///
/// The address and user fields are written together or not at all.
///
/// # Errors
///
/// - `400 Bad Request`: New username belongs to another user
/// - `401`/`403`: Neither the customer nor an administrator
/// - `404 Not Found`: No such customer
pub async fn update_customer(
    State(state): State<AppState>,
    caller: Authenticated,
    ApiPath(customer_id): ApiPath<i64>,
    ApiJson(req): ApiJson<UpdateCustomerRequest>,
) -> ApiResult<Json<User>> {
    caller.require_owner_or_admin(customer_id)?;

    req.validate()?;

    if User::find_by_id(&state.db, customer_id).await?.is_none()
        || Customer::find_by_id(&state.db, customer_id).await?.is_none()
    {
        return Err(ApiError::NotFound(CUSTOMER_NOT_FOUND.to_string()));
    }

    if let Some(existing) = User::find_by_username(&state.db, &req.username).await? {
        if existing.id != customer_id {
            return Err(ApiError::InvalidUsername);
        }
    }

    let hashed_password = match req.password.as_deref() {
        Some(plain) if !plain.is_empty() => Some(password::hash_password(plain)?),
        _ => None,
    };

    let user = Customer::update_profile(
        &state.db,
        customer_id,
        UpdateUser {
            username: req.username,
            hashed_password,
            first_name: req.first_name,
            last_name: req.last_name,
        },
        req.address.as_ref(),
    )
    .await
    .map_err(|e| ApiError::on_conflict(e, ApiError::InvalidUsername))?
    .ok_or_else(|| ApiError::NotFound(CUSTOMER_NOT_FOUND.to_string()))?;

    info!(user_id = caller.0.user_id, customer_id, "Customer updated");

    Ok(Json(user))
}

/// Creates an employee account
///
/// # Errors
///
/// - `400 Bad Request`: Username already registered
/// - `401`/`403`: Not an administrator
pub async fn create_employee(
    State(state): State<AppState>,
    AdminPrincipal(admin): AdminPrincipal,
    ApiForm(form): ApiForm<EmployeeForm>,
) -> ApiResult<(StatusCode, Json<NewEmployeeResponse>)> {
    form.validate()?;

    if User::find_by_username(&state.db, &form.username).await?.is_some() {
        return Err(ApiError::InvalidUsername);
    }

    let hashed_password = password::hash_password(&form.password)?;

    let user = Employee::register(
        &state.db,
        &form.username,
        &hashed_password,
        form.job_title.as_deref().filter(|t| !t.is_empty()),
    )
    .await
    .map_err(|e| ApiError::on_conflict(e, ApiError::InvalidUsername))?;

    info!(admin_id = admin.user_id, employee_id = user.id, "Employee created");

    Ok((
        StatusCode::CREATED,
        Json(NewEmployeeResponse {
            id: user.id,
            username: user.username,
        }),
    ))
}
