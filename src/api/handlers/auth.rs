//! Dashboard authentication handlers

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::dto::ApiResponse;
use crate::auth::middleware::AuthenticatedUser;
use crate::auth::{create_token, verify_password, JwtConfig};
use crate::domain::RepositoryProvider;

/// State for dashboard auth handlers
#[derive(Clone)]
pub struct AdminAuthState {
    pub repos: Arc<dyn RepositoryProvider>,
    pub jwt_config: JwtConfig,
}

/// Login request
#[derive(Debug, Deserialize, ToSchema)]
#[schema(example = json!({
    "username": "admin",
    "password": "secret123"
}))]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Successful login response
///
/// Carries the JWT for subsequent requests, passed in the
/// `Authorization: Bearer <token>` header.
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    /// JWT access token
    pub token: String,
    /// Always `Bearer`
    pub token_type: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
    pub user: AdminInfo,
}

/// Dashboard user info
#[derive(Debug, Serialize, ToSchema)]
pub struct AdminInfo {
    pub id: String,
    pub username: String,
    pub email: String,
    /// `admin` or `operator`
    pub role: String,
}

/// Dashboard login
///
/// Returns a JWT on successful authentication. Deactivated accounts
/// get 401.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated, returns JWT", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid credentials or account disabled")
    )
)]
pub async fn login(
    State(state): State<AdminAuthState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, (StatusCode, Json<ApiResponse<LoginResponse>>)> {
    let admin = state
        .repos
        .admins()
        .find_by_username(&request.username)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(e.to_string())),
            )
        })?;

    let Some(admin) = admin else {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::error("Invalid credentials")),
        ));
    };

    if !admin.is_active {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::error("Account is disabled")),
        ));
    }

    let password_valid = verify_password(&request.password, &admin.password_hash).unwrap_or(false);
    if !password_valid {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::error("Invalid credentials")),
        ));
    }

    // fire and forget
    if let Err(e) = state.repos.admins().touch_last_login(&admin.id).await {
        tracing::warn!(username = %admin.username, error = %e, "failed to record login time");
    }

    let role = admin.role.as_str();
    let token = create_token(&admin.id, &admin.username, role, &state.jwt_config).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error(e.to_string())),
        )
    })?;

    let response = LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_config.expiration_hours * 3600,
        user: AdminInfo {
            id: admin.id,
            username: admin.username,
            email: admin.email,
            role: role.to_string(),
        },
    };

    Ok(Json(ApiResponse::success(response)))
}

/// Current dashboard user
///
/// Returns the account behind the presented JWT.
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user info", body = ApiResponse<AdminInfo>),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn get_current_admin(
    State(state): State<AdminAuthState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<AdminInfo>>, (StatusCode, Json<ApiResponse<AdminInfo>>)> {
    let admin = state
        .repos
        .admins()
        .find_by_id(&user.user_id)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(e.to_string())),
            )
        })?;

    let Some(admin) = admin else {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("User not found")),
        ));
    };

    Ok(Json(ApiResponse::success(AdminInfo {
        id: admin.id,
        username: admin.username,
        email: admin.email,
        role: admin.role.as_str().to_string(),
    })))
}
