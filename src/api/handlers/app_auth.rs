//! Mobile-app authentication handlers

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::dto::{ApiResponse, EmptyData};
use crate::auth::middleware::AuthenticatedUser;
use crate::auth::{create_token, hash_password, verify_password, JwtConfig};
use crate::domain::{DomainError, RepositoryProvider, User};

/// State for app auth handlers
#[derive(Clone)]
pub struct AppAuthState {
    pub repos: Arc<dyn RepositoryProvider>,
    pub jwt_config: JwtConfig,
    /// bcrypt work factor for new registrations
    pub bcrypt_cost: u32,
}

/// App registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "name": "Ayşe Yılmaz",
    "email": "ayse@example.com",
    "phone": "+905551112233",
    "password": "park&go-2024"
}))]
pub struct AppRegisterRequest {
    #[validate(length(min = 2, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    pub phone: Option<String>,
    #[validate(length(min = 8))]
    pub password: String,
}

/// App login request
#[derive(Debug, Deserialize, ToSchema)]
pub struct AppLoginRequest {
    pub email: String,
    pub password: String,
}

/// App user profile
#[derive(Debug, Serialize, ToSchema)]
pub struct AppUserInfo {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub vehicle_plates: Vec<String>,
}

impl From<User> for AppUserInfo {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            phone: u.phone,
            vehicle_plates: u.vehicle_plates,
        }
    }
}

/// App login response
#[derive(Debug, Serialize, ToSchema)]
pub struct AppLoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: AppUserInfo,
}

/// Device token registration
#[derive(Debug, Deserialize, ToSchema)]
pub struct FcmTokenRequest {
    /// `null` unregisters the device
    pub token: Option<String>,
}

type HandlerError<T> = (StatusCode, Json<ApiResponse<T>>);

fn internal<T>(e: impl std::fmt::Display) -> HandlerError<T> {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::error(e.to_string())),
    )
}

/// App user registration
///
/// Email must be unique; the password is stored bcrypt-hashed. Vehicles
/// are linked separately after registration.
#[utoipa::path(
    post,
    path = "/api/v1/app/auth/register",
    tag = "App Auth",
    request_body = AppRegisterRequest,
    responses(
        (status = 201, description = "Account created", body = ApiResponse<AppUserInfo>),
        (status = 400, description = "Validation failure (short password, bad email)"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn app_register(
    State(state): State<AppAuthState>,
    Json(request): Json<AppRegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AppUserInfo>>), HandlerError<AppUserInfo>> {
    if let Err(e) = request.validate() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(e.to_string())),
        ));
    }

    let email = request.email.trim().to_lowercase();
    let password_hash = hash_password(&request.password, state.bcrypt_cost).map_err(internal)?;

    let now = Utc::now();
    let user = User {
        id: uuid::Uuid::new_v4().to_string(),
        name: request.name.trim().to_string(),
        email,
        phone: request.phone.clone(),
        password_hash,
        fcm_token: None,
        is_active: true,
        vehicle_plates: Vec::new(),
        created_at: now,
        updated_at: now,
    };

    let created = match state.repos.users().create(user).await {
        Ok(u) => u,
        Err(DomainError::Conflict(_)) => {
            return Err((
                StatusCode::CONFLICT,
                Json(ApiResponse::error("Email or phone already registered")),
            ));
        }
        Err(e) => return Err(internal(e)),
    };

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(created.into())),
    ))
}

/// App user login
///
/// Returns a JWT with the `user` role.
#[utoipa::path(
    post,
    path = "/api/v1/app/auth/login",
    tag = "App Auth",
    request_body = AppLoginRequest,
    responses(
        (status = 200, description = "Authenticated, returns JWT", body = ApiResponse<AppLoginResponse>),
        (status = 401, description = "Invalid credentials or account disabled")
    )
)]
pub async fn app_login(
    State(state): State<AppAuthState>,
    Json(request): Json<AppLoginRequest>,
) -> Result<Json<ApiResponse<AppLoginResponse>>, HandlerError<AppLoginResponse>> {
    let email = request.email.trim().to_lowercase();
    let user = state
        .repos
        .users()
        .find_by_email(&email)
        .await
        .map_err(internal)?;

    let Some(user) = user else {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::error("Invalid credentials")),
        ));
    };

    if !user.is_active {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::error("Account is disabled")),
        ));
    }

    let password_valid = verify_password(&request.password, &user.password_hash).unwrap_or(false);
    if !password_valid {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::error("Invalid credentials")),
        ));
    }

    let token =
        create_token(&user.id, &user.email, "user", &state.jwt_config).map_err(internal)?;

    Ok(Json(ApiResponse::success(AppLoginResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_config.expiration_hours * 3600,
        user: user.into(),
    })))
}

/// Register or clear the device push token
#[utoipa::path(
    post,
    path = "/api/v1/app/fcm-token",
    tag = "App Auth",
    security(("bearer_auth" = [])),
    request_body = FcmTokenRequest,
    responses(
        (status = 200, description = "Token stored", body = ApiResponse<EmptyData>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn set_fcm_token(
    State(state): State<AppAuthState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<FcmTokenRequest>,
) -> Result<Json<ApiResponse<EmptyData>>, HandlerError<EmptyData>> {
    state
        .repos
        .users()
        .set_fcm_token(&user.user_id, request.token)
        .await
        .map_err(internal)?;
    Ok(Json(ApiResponse::success(EmptyData {})))
}
