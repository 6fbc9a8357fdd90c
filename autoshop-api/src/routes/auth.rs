/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /api/v1/auth/signin/` - Exchange credentials for a token
/// - `POST /api/v1/auth/signup/` - Register a customer and get a token
///
/// Both take an `application/x-www-form-urlencoded` body with `username`
/// and `password`.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, INVALID_CREDENTIALS},
    extractors::ApiForm,
};
use autoshop_shared::{
    auth::password,
    models::{customer::Customer, user::User},
};
use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::Validate;

/// Username/password form shared by signin, signup and admin user creation
#[derive(Debug, Deserialize, Validate)]
pub struct CredentialsForm {
    #[validate(length(min = 1, max = 255, message = "Username must be 1 to 255 characters"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: String,
}

/// Token returned by signin and signup
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub token: String,
    pub token_type: String,
}

impl AuthenticatedUser {
    fn bearer(id: i64, token: String) -> Self {
        Self {
            id,
            token,
            token_type: "bearer".to_string(),
        }
    }
}

/// Signs a user in
///
/// # Endpoint
///
/// ```text
/// POST /api/v1/auth/signin/
/// Content-Type: application/x-www-form-urlencoded
///
/// username=alex.doe%40email.com&password=test789
/// ```
///
/// # Response
///
/// ```json
/// { "id": 1, "token": "eyJ...", "token_type": "bearer" }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown user, wrong password or inactive account.
///   The three cases return the same body and each costs one Argon2
///   verification.
/// - `422 Unprocessable Entity`: Empty username or password
pub async fn signin(
    State(state): State<AppState>,
    ApiForm(form): ApiForm<CredentialsForm>,
) -> ApiResult<Json<AuthenticatedUser>> {
    form.validate()?;

    let user = User::find_by_username(&state.db, &form.username).await?;

    // Every path runs one Argon2 verification so failures take the same time
    let verified = match &user {
        Some(user) => password::verify_password(&form.password, &user.hashed_password),
        None => password::verify_dummy_password(&form.password),
    };

    let user = match user {
        Some(user) if verified && user.is_active => user,
        _ => {
            warn!(username = %form.username, "Failed signin attempt");
            return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }
    };

    let token = state
        .tokens
        .issue(user.id, &user.username, user.role, Utc::now())?;

    info!(user_id = user.id, role = %user.role, "User signed in");

    Ok(Json(AuthenticatedUser::bearer(user.id, token)))
}

/// Registers a new customer and signs them in
///
/// # Endpoint
///
/// ```text
/// POST /api/v1/auth/signup/
/// Content-Type: application/x-www-form-urlencoded
///
/// username=john.doe%40email.com&password=test789
/// ```
///
/// # Response
///
/// `201 Created` with the same body as signin.
///
/// # Errors
///
/// - `400 Bad Request`: Username already registered
/// - `422 Unprocessable Entity`: Empty username or password
pub async fn signup(
    State(state): State<AppState>,
    ApiForm(form): ApiForm<CredentialsForm>,
) -> ApiResult<(StatusCode, Json<AuthenticatedUser>)> {
    form.validate()?;

    let user = register_customer(&state, &form).await?;

    let token = state
        .tokens
        .issue(user.id, &user.username, user.role, Utc::now())?;

    info!(user_id = user.id, "Customer signed up");

    Ok((StatusCode::CREATED, Json(AuthenticatedUser::bearer(user.id, token))))
}

/// Creates a customer account, mapping a taken username to `InvalidUsername`
pub(crate) async fn register_customer(
    state: &AppState,
    form: &CredentialsForm,
) -> ApiResult<User> {
    if User::find_by_username(&state.db, &form.username).await?.is_some() {
        return Err(ApiError::InvalidUsername);
    }

    let hashed_password = password::hash_password(&form.password)?;

    Customer::register(&state.db, &form.username, &hashed_password)
        .await
        .map_err(|e| ApiError::on_conflict(e, ApiError::InvalidUsername))
}
