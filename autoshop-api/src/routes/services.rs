/// Shop service endpoints
///
/// # Endpoints
///
/// - `GET    /api/v1/services/` - List services
/// - `GET    /api/v1/services/:service_id/` - Get a service
/// - `POST   /api/v1/services/` - Create a service (admin)
/// - `PUT    /api/v1/services/:service_id/` - Replace a service (admin)
/// - `DELETE /api/v1/services/:service_id/` - Delete a service (admin)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extractors::{AdminPrincipal, ApiJson, ApiPath},
    routes::Deleted,
};
use autoshop_shared::models::service::{Service, ServiceData, DEFAULT_SERVICE_CATEGORY};
use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;
use validator::Validate;

const SERVICE_NOT_FOUND: &str = "Service not found for given service_id";

/// Service fields for create and update
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ServiceRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1 to 255 characters"))]
    pub name: String,

    #[validate(range(min = 0.0, message = "Price must not be negative"))]
    pub price: f64,

    pub description: String,

    pub image: Option<String>,

    /// Minutes
    #[validate(range(min = 0, message = "Estimated time must not be negative"))]
    pub estimated_time: i32,

    #[validate(length(min = 1, max = 64, message = "Category must be 1 to 64 characters"))]
    pub category: Option<String>,
}

impl From<ServiceRequest> for ServiceData {
    fn from(req: ServiceRequest) -> Self {
        ServiceData {
            name: req.name,
            price: req.price,
            description: req.description,
            image: req.image,
            estimated_time: req.estimated_time,
            category: req
                .category
                .unwrap_or_else(|| DEFAULT_SERVICE_CATEGORY.to_string()),
        }
    }
}

pub async fn list_services(State(state): State<AppState>) -> ApiResult<Json<Vec<Service>>> {
    let services = Service::list(&state.db).await?;
    Ok(Json(services))
}

pub async fn get_service(
    State(state): State<AppState>,
    ApiPath(service_id): ApiPath<i64>,
) -> ApiResult<Json<Service>> {
    let service = Service::find_by_id(&state.db, service_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(SERVICE_NOT_FOUND.to_string()))?;

    Ok(Json(service))
}

/// Creates a service
///
/// # Errors
///
/// - `400 Bad Request`: An identical service exists
/// - `401`/`403`: Not an administrator
pub async fn create_service(
    State(state): State<AppState>,
    AdminPrincipal(admin): AdminPrincipal,
    ApiJson(req): ApiJson<ServiceRequest>,
) -> ApiResult<(StatusCode, Json<Service>)> {
    req.validate()?;

    let data = ServiceData::from(req);

    if let Some(existing) = Service::find_matching(&state.db, &data).await? {
        return Err(ApiError::BadRequest(format!(
            "Service already exists with id {}",
            existing.id
        )));
    }

    let service = Service::create(&state.db, &data).await?;

    info!(admin_id = admin.user_id, service_id = service.id, "Service created");

    Ok((StatusCode::CREATED, Json(service)))
}

pub async fn update_service(
    State(state): State<AppState>,
    AdminPrincipal(admin): AdminPrincipal,
    ApiPath(service_id): ApiPath<i64>,
    ApiJson(req): ApiJson<ServiceRequest>,
) -> ApiResult<Json<Service>> {
    req.validate()?;

    let service = Service::update(&state.db, service_id, &ServiceData::from(req))
        .await?
        .ok_or_else(|| ApiError::NotFound(SERVICE_NOT_FOUND.to_string()))?;

    info!(admin_id = admin.user_id, service_id, "Service updated");

    Ok(Json(service))
}

pub async fn delete_service(
    State(state): State<AppState>,
    AdminPrincipal(admin): AdminPrincipal,
    ApiPath(service_id): ApiPath<i64>,
) -> ApiResult<Json<Deleted>> {
    if !Service::delete(&state.db, service_id).await? {
        return Err(ApiError::NotFound(SERVICE_NOT_FOUND.to_string()));
    }

    info!(admin_id = admin.user_id, service_id, "Service deleted");

    Ok(Json(Deleted { id: service_id }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_defaults_to_maintenance() {
        let req: ServiceRequest = serde_json::from_str(
            r#"{"name": "Oil change", "price": 120.0, "description": "Synthetic oil",
                "image": null, "estimated_time": 45}"#,
        )
        .unwrap();

        let data = ServiceData::from(req);
        assert_eq!(data.category, "maintenance");
        assert_eq!(data.estimated_time, 45);
        assert!(data.image.is_none());
    }

    #[test]
    fn test_negative_price_rejected() {
        let req = ServiceRequest {
            name: "Alignment".to_string(),
            price: -1.0,
            description: String::new(),
            image: None,
            estimated_time: 30,
            category: None,
        };

        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("price"));
    }
}
