//! Authentication middleware
//!
//! Wraps `/api/` routes; validates the bearer JWT and injects
//! [`CurrentUser`] into request extensions.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::{CurrentUser, JwtService};
use crate::core::ServerState;
use crate::utils::AppError;

/// Public routes that skip authentication.
///
/// Browsing (search, restaurant info, menus, reviews, blog) is open to
/// anonymous visitors; everything mutating requires a login.
fn is_public_route(method: &http::Method, path: &str) -> bool {
    if path == "/api/auth/login" || path == "/api/auth/register" {
        return true;
    }
    if *method != http::Method::GET {
        return false;
    }
    path == "/api/health"
        || path.starts_with("/api/blog")
        || path.starts_with("/api/restaurants")
        || path.starts_with("/api/menu_items")
        || path.starts_with("/api/reviews")
}

/// Require a valid JWT for non-public API routes.
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path().to_string();

    // CORS preflight passes through
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    // Non-API paths 404 naturally
    if !path.starts_with("/api/") {
        return Ok(next.run(req).await);
    }

    if is_public_route(req.method(), &path) {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => {
            JwtService::extract_from_header(header).ok_or(AppError::InvalidToken)?
        }
        None => {
            tracing::warn!(target: "security", uri = %req.uri(), "missing auth header");
            return Err(AppError::Unauthorized);
        }
    };

    match state.jwt_service.validate_token(token) {
        Ok(claims) => {
            req.extensions_mut().insert(CurrentUser::from(claims));
            Ok(next.run(req).await)
        }
        Err(e) => {
            tracing::warn!(target: "security", uri = %req.uri(), error = %e, "auth failed");
            match e {
                crate::auth::JwtError::ExpiredToken => Err(AppError::TokenExpired),
                _ => Err(AppError::InvalidToken),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_and_register_are_public() {
        assert!(is_public_route(&http::Method::POST, "/api/auth/login"));
        assert!(is_public_route(&http::Method::POST, "/api/auth/register"));
    }

    #[test]
    fn browsing_is_public_for_get_only() {
        assert!(is_public_route(&http::Method::GET, "/api/restaurants"));
        assert!(is_public_route(&http::Method::GET, "/api/restaurants/restaurant:x"));
        assert!(!is_public_route(&http::Method::PUT, "/api/restaurants/restaurant:x"));
    }

    #[test]
    fn workflow_routes_require_auth() {
        assert!(!is_public_route(&http::Method::POST, "/api/reservations"));
        assert!(!is_public_route(&http::Method::GET, "/api/reservations"));
        assert!(!is_public_route(&http::Method::GET, "/api/events"));
    }
}
