//! Bearer-token authentication of the calling actor.
//!
//! Tokens are issued elsewhere; this service only verifies them and turns the
//! payload into an [`Actor`].

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use domain::models::{Actor, Role};
use serde_json::json;
use shared::jwt::{extract_account_id, JwtConfig};

use crate::app::AppState;
use crate::config::JwtAuthConfig;

/// Builds the verifier from configuration.
pub fn create_jwt_config(config: &JwtAuthConfig) -> Result<JwtConfig, String> {
    JwtConfig::with_leeway(
        &config.secret,
        config.access_token_expiry_secs,
        config.leeway_secs,
    )
    .map_err(|e| format!("Failed to initialize JWT config: {}", e))
}

/// Returns the token of a `Bearer` Authorization header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Validates a token and maps its payload to an actor.
pub fn actor_from_token(jwt_config: &JwtConfig, token: &str) -> Result<Actor, String> {
    let claims = jwt_config
        .validate_token(token)
        .map_err(|e| format!("Invalid token: {}", e))?;

    let id = extract_account_id(&claims).map_err(|_| "Invalid account id in token".to_string())?;
    let role: Role = claims
        .role
        .parse()
        .map_err(|e| format!("Invalid role in token: {}", e))?;

    Ok(Actor {
        id,
        role,
        email: claims.email,
        name: claims.name,
    })
}

/// Middleware that requires a valid bearer token.
///
/// The resulting [`Actor`] is stored in request extensions.
pub async fn require_actor(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = match bearer_token(req.headers()) {
        Some(token) => token.to_string(),
        None => return unauthorized_response("Missing or invalid Authorization header"),
    };

    let jwt_config = match create_jwt_config(&state.config.jwt) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            return internal_error_response("Authentication service unavailable");
        }
    };

    match actor_from_token(&jwt_config, &token) {
        Ok(actor) => {
            tracing::debug!(actor_id = actor.id, role = %actor.role, "Authenticated actor");
            req.extensions_mut().insert(actor);
            next.run(req).await
        }
        Err(e) => {
            tracing::debug!("JWT validation failed: {}", e);
            unauthorized_response("Invalid or expired token")
        }
    }
}

pub(crate) fn unauthorized_response(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "unauthorized",
            "message": message
        })),
    )
        .into_response()
}

fn internal_error_response(message: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "internal_error",
            "message": message
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn jwt() -> JwtConfig {
        JwtConfig::new("unit-test-secret", 3600).unwrap()
    }

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers), Some("abc.def"));
    }

    #[test]
    fn test_actor_from_token() {
        let jwt = jwt();
        let token = jwt
            .generate_access_token(7, "technician", Some("tech@example.com"), Some("Tomás"))
            .unwrap();
        let actor = actor_from_token(&jwt, &token).unwrap();
        assert_eq!(actor.id, 7);
        assert_eq!(actor.role, Role::Technician);
        assert_eq!(actor.name.as_deref(), Some("Tomás"));
    }

    #[test]
    fn test_actor_from_token_legacy_role() {
        let jwt = jwt();
        let token = jwt
            .generate_access_token(1, "administrador", None, None)
            .unwrap();
        assert_eq!(actor_from_token(&jwt, &token).unwrap().role, Role::Administrator);
    }

    #[test]
    fn test_actor_from_token_unknown_role() {
        let jwt = jwt();
        let token = jwt.generate_access_token(1, "guest", None, None).unwrap();
        assert!(actor_from_token(&jwt, &token).is_err());
    }

    #[test]
    fn test_actor_from_token_wrong_secret() {
        let token = JwtConfig::new("other-secret", 3600)
            .unwrap()
            .generate_access_token(1, "administrator", None, None)
            .unwrap();
        assert!(actor_from_token(&jwt(), &token).is_err());
    }

    #[test]
    fn test_unauthorized_response() {
        let response = unauthorized_response("Test message");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_internal_error_response() {
        let response = internal_error_response("Authentication service unavailable");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
