use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::services::AccessTokenClaims;
use crate::startup::AppState;
use service_core::error::AppError;

/// Middleware requiring a valid access token on the request.
///
/// On success the claims and the raw bearer token are stored in request
/// extensions; the token is forwarded verbatim on downstream calls so
/// db-interact can authorize the caller itself.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| {
            AppError::Unauthorized(anyhow::anyhow!("Missing or invalid Authorization header"))
        })?;

    let claims = state.jwt.validate_access_token(token)?;
    let token = AuthToken(token.to_string());

    req.extensions_mut().insert(claims);
    req.extensions_mut().insert(token);

    Ok(next.run(req).await)
}

/// The caller's raw bearer token, kept for downstream forwarding.
#[derive(Clone)]
pub struct AuthToken(pub String);

/// Extractor to easily get claims in handlers
pub struct AuthUser(pub AccessTokenClaims);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = parts
            .extensions
            .get::<AccessTokenClaims>()
            .ok_or_else(|| {
                AppError::InternalError(anyhow::anyhow!(
                    "Auth claims missing from request extensions"
                ))
            })?;

        Ok(AuthUser(claims.clone()))
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<AuthToken>().cloned().ok_or_else(|| {
            AppError::InternalError(anyhow::anyhow!(
                "Auth token missing from request extensions"
            ))
        })
    }
}
