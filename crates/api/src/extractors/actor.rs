//! Authenticated actor extractor.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use domain::models::Actor;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::actor_auth::{actor_from_token, bearer_token, create_jwt_config};

/// The caller a handler acts on behalf of.
///
/// Taken from request extensions when [`require_actor`] already ran,
/// otherwise the bearer token is verified here.
///
/// [`require_actor`]: crate::middleware::require_actor
#[derive(Debug, Clone)]
pub struct CurrentActor(pub Actor);

#[async_trait]
impl FromRequestParts<AppState> for CurrentActor {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(actor) = parts.extensions.get::<Actor>() {
            return Ok(CurrentActor(actor.clone()));
        }

        let token = bearer_token(&parts.headers).ok_or_else(|| {
            ApiError::Unauthorized("Missing or invalid Authorization header".to_string())
        })?;

        let jwt_config = create_jwt_config(&state.config.jwt).map_err(ApiError::Internal)?;

        let actor = actor_from_token(&jwt_config, token)
            .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))?;

        Ok(CurrentActor(actor))
    }
}
