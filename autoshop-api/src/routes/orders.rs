/// Work order endpoints
///
/// # Endpoints
///
/// - `GET    /api/v1/orders/` - List orders (admin)
/// - `GET    /api/v1/orders/:order_id/` - Get an order (owning customer or admin)
/// - `POST   /api/v1/orders/` - Create an order (admin)
/// - `PUT    /api/v1/orders/:order_id/` - Replace an order (admin)
/// - `DELETE /api/v1/orders/:order_id/` - Delete an order (admin)
///
/// Statuses are restricted to the configured `ORDER_STATUS` list.

use crate::{
    app::AppState,
    config::OrderConfig,
    error::{ApiError, ApiResult},
    extractors::{AdminPrincipal, ApiJson, ApiPath, Authenticated},
    routes::Deleted,
};
use autoshop_shared::models::{
    customer::Customer,
    order::{Order, OrderData},
};
use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;
use validator::Validate;

const ORDER_NOT_FOUND: &str = "Order not found for given order_id";
const CUSTOMER_NOT_FOUND: &str = "Customer not found for given id.";

/// Order fields for create and update
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct OrderRequest {
    pub customer_id: i64,

    #[validate(length(min = 1, message = "At least one customer vehicle is required"))]
    pub customer_vehicle_ids: Vec<i64>,

    #[validate(length(min = 1, message = "At least one service is required"))]
    pub service_ids: Vec<i64>,

    pub employee_ids: Option<Vec<i64>>,

    /// Defaults to the time of the request
    pub start_date: Option<DateTime<Utc>>,

    pub estimated_time: DateTime<Utc>,

    /// Defaults to the first configured status
    pub status: Option<String>,
}

impl OrderRequest {
    /// Fills defaults and checks the status against the configured list
    fn into_data(self, orders: &OrderConfig, now: DateTime<Utc>) -> ApiResult<OrderData> {
        let status = self
            .status
            .unwrap_or_else(|| orders.default_status().to_string());

        if !orders.is_valid_status(&status) {
            return Err(ApiError::BadRequest(format!(
                "Invalid order status {}; expected one of {}",
                status,
                orders.statuses.join(", ")
            )));
        }

        Ok(OrderData {
            customer_id: self.customer_id,
            customer_vehicle_ids: self.customer_vehicle_ids,
            service_ids: self.service_ids,
            employee_ids: self.employee_ids,
            start_date: self.start_date.unwrap_or(now),
            estimated_time: self.estimated_time,
            status,
        })
    }
}

pub async fn list_orders(
    State(state): State<AppState>,
    AdminPrincipal(_admin): AdminPrincipal,
) -> ApiResult<Json<Vec<Order>>> {
    let orders = Order::list(&state.db).await?;
    Ok(Json(orders))
}

/// Gets one order
///
/// The caller is authenticated before the lookup; ownership is checked
/// once the order is loaded.
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid token
/// - `403 Forbidden`: Neither the order's customer nor an administrator
/// - `404 Not Found`: Unknown order
pub async fn get_order(
    State(state): State<AppState>,
    caller: Authenticated,
    ApiPath(order_id): ApiPath<i64>,
) -> ApiResult<Json<Order>> {
    let order = Order::find_by_id(&state.db, order_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(ORDER_NOT_FOUND.to_string()))?;

    caller.require_owner_or_admin(order.customer_id)?;

    Ok(Json(order))
}

/// Creates an order
///
/// # Errors
///
/// - `400 Bad Request`: Unknown status or an identical order exists
/// - `401`/`403`: Not an administrator
/// - `404 Not Found`: Unknown customer
pub async fn create_order(
    State(state): State<AppState>,
    AdminPrincipal(admin): AdminPrincipal,
    ApiJson(req): ApiJson<OrderRequest>,
) -> ApiResult<(StatusCode, Json<Order>)> {
    req.validate()?;

    let data = req.into_data(&state.config.orders, Utc::now())?;
    ensure_customer_exists(&state, data.customer_id).await?;

    if let Some(existing) = Order::find_matching(&state.db, &data).await? {
        return Err(ApiError::BadRequest(format!(
            "Order already exists with id {}",
            existing.id
        )));
    }

    let order = Order::create(&state.db, &data).await?;

    info!(
        admin_id = admin.user_id,
        order_id = order.id,
        customer_id = order.customer_id,
        "Order created"
    );

    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn update_order(
    State(state): State<AppState>,
    AdminPrincipal(admin): AdminPrincipal,
    ApiPath(order_id): ApiPath<i64>,
    ApiJson(req): ApiJson<OrderRequest>,
) -> ApiResult<Json<Order>> {
    req.validate()?;

    let data = req.into_data(&state.config.orders, Utc::now())?;
    ensure_customer_exists(&state, data.customer_id).await?;

    let order = Order::update(&state.db, order_id, &data)
        .await?
        .ok_or_else(|| ApiError::NotFound(ORDER_NOT_FOUND.to_string()))?;

    info!(admin_id = admin.user_id, order_id, status = %order.status, "Order updated");

    Ok(Json(order))
}

pub async fn delete_order(
    State(state): State<AppState>,
    AdminPrincipal(admin): AdminPrincipal,
    ApiPath(order_id): ApiPath<i64>,
) -> ApiResult<Json<Deleted>> {
    if !Order::delete(&state.db, order_id).await? {
        return Err(ApiError::NotFound(ORDER_NOT_FOUND.to_string()));
    }

    info!(admin_id = admin.user_id, order_id, "Order deleted");

    Ok(Json(Deleted { id: order_id }))
}

async fn ensure_customer_exists(state: &AppState, customer_id: i64) -> ApiResult<()> {
    match Customer::find_by_id(&state.db, customer_id).await? {
        Some(_) => Ok(()),
        None => Err(ApiError::NotFound(CUSTOMER_NOT_FOUND.to_string())),
    }
}
