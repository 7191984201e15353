//! Authentication middleware for Axum

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use super::jwt::{verify_token, AuthError, Claims, JwtConfig};

/// Authentication state containing JWT config
#[derive(Clone)]
pub struct AuthState {
    pub jwt_config: JwtConfig,
}

/// Authenticated principal extracted from a verified token
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub username: String,
    pub role: String,
}

impl AuthenticatedUser {
    pub fn from_claims(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            username: claims.username,
            role: claims.role,
        }
    }

    pub fn is_staff(&self) -> bool {
        self.role == "admin" || self.role == "operator"
    }

    pub fn is_app_user(&self) -> bool {
        self.role == "user"
    }
}

/// Extract token from Authorization header
fn extract_token(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ")
}

fn verify_request(
    request: &Request<Body>,
    jwt_config: &JwtConfig,
) -> Result<AuthenticatedUser, AuthError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    let token = extract_token(auth_header).ok_or(AuthError::InvalidToken)?;

    let claims = verify_token(token, jwt_config).map_err(|_| AuthError::InvalidToken)?;
    if claims.is_expired() {
        return Err(AuthError::ExpiredToken);
    }
    Ok(AuthenticatedUser::from_claims(claims))
}

/// Dashboard authentication middleware, admin and operator roles only
pub async fn admin_auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    match verify_request(&request, &auth_state.jwt_config) {
        Ok(user) if user.is_staff() => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Ok(_) => auth_error_response(AuthError::InsufficientPermissions),
        Err(e) => auth_error_response(e),
    }
}

/// Mobile-app authentication middleware, "user" role only
pub async fn user_auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    match verify_request(&request, &auth_state.jwt_config) {
        Ok(user) if user.is_app_user() => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Ok(_) => auth_error_response(AuthError::InsufficientPermissions),
        Err(e) => auth_error_response(e),
    }
}

/// Create an authentication error response
fn auth_error_response(error: AuthError) -> Response {
    let (status, message) = match error {
        AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "Missing authentication token"),
        AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid authentication token"),
        AuthError::ExpiredToken => (StatusCode::UNAUTHORIZED, "Token has expired"),
        AuthError::InsufficientPermissions => (StatusCode::FORBIDDEN, "Insufficient permissions"),
        AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Invalid credentials"),
        AuthError::UserNotFound => (StatusCode::NOT_FOUND, "User not found"),
    };

    let body = Json(json!({
        "success": false,
        "error": message
    }));

    (status, body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_token() {
        assert_eq!(extract_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(extract_token("Basic dXNlcg=="), None);
        assert_eq!(extract_token(""), None);
    }

    #[test]
    fn test_staff_roles() {
        let admin = AuthenticatedUser {
            user_id: "1".into(),
            username: "a".into(),
            role: "admin".into(),
        };
        let operator = AuthenticatedUser {
            role: "operator".into(),
            ..admin.clone()
        };
        let app_user = AuthenticatedUser {
            role: "user".into(),
            ..admin.clone()
        };
        assert!(admin.is_staff());
        assert!(operator.is_staff());
        assert!(!app_user.is_staff());
        assert!(app_user.is_app_user());
    }
}
