use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::JwtConfig;
use service_core::error::AppError;

/// `type` claim value carried by access tokens issued by the auth service.
pub const ACCESS_TOKEN_TYPE: &str = "access";
/// `type` claim value distinguishing linking codes from access tokens.
pub const LINKING_CODE_TYPE: &str = "linking_code";

/// JWT service for access-token validation and linking-code issuance.
///
/// Uses the HS256 secret shared with the other services; this service never
/// mints access tokens itself.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    linking_code_expiry_hours: i64,
}

/// Claims for access tokens issued by the auth service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Role of the caller (`parent` or `teacher`)
    pub role: String,
    /// Token type, must be `access`
    #[serde(rename = "type")]
    pub token_type: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// Claims for linking codes (short-lived, single purpose).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkingCodeClaims {
    /// The child the code links to
    pub child_id: String,
    /// Token type, must be `linking_code`
    #[serde(rename = "type")]
    pub token_type: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

impl JwtService {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            linking_code_expiry_hours: config.linking_code_expiry_hours,
        }
    }

    /// Validate an access token and return its claims.
    ///
    /// Rejects expired tokens, bad signatures, non-access token types and
    /// payloads missing `sub` or `role`.
    pub fn validate_access_token(&self, token: &str) -> Result<AccessTokenClaims, AppError> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<AccessTokenClaims>(token, &self.decoding_key, &validation)?;
        let claims = data.claims;

        if claims.token_type != ACCESS_TOKEN_TYPE {
            return Err(AppError::Unauthorized(anyhow::anyhow!(
                "Invalid token type provided (expected access)"
            )));
        }

        if claims.sub.is_empty() || claims.role.is_empty() {
            return Err(AppError::Unauthorized(anyhow::anyhow!(
                "Invalid token payload"
            )));
        }

        Ok(claims)
    }

    /// Generate a short-lived linking code for a freshly created child.
    pub fn generate_linking_code(&self, child_id: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let exp = now + Duration::hours(self.linking_code_expiry_hours);

        let claims = LinkingCodeClaims {
            child_id: child_id.to_string(),
            token_type: LINKING_CODE_TYPE.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| {
                AppError::InternalError(anyhow::anyhow!(
                    "Failed to generate linking code for child {}: {}",
                    child_id,
                    e
                ))
            })?;

        Ok(token)
    }

    /// Verify a linking code and return the child it refers to.
    ///
    /// Any failure (signature, expiry, wrong type, missing child_id) maps to
    /// a client-facing bad-request error without leaking the cause.
    pub fn verify_linking_code(&self, code: &str) -> Result<String, AppError> {
        let validation = Validation::new(Algorithm::HS256);
        let data =
            decode::<LinkingCodeClaims>(code, &self.decoding_key, &validation).map_err(|e| {
                tracing::info!("Rejected linking code: {}", e);
                AppError::BadRequest(anyhow::anyhow!("Invalid or expired linking code"))
            })?;

        if data.claims.token_type != LINKING_CODE_TYPE {
            tracing::warn!("Attempted to use a non-linking-code JWT for linking");
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Invalid or expired linking code"
            )));
        }

        if data.claims.child_id.is_empty() {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Invalid or expired linking code"
            )));
        }

        Ok(data.claims.child_id)
    }
}
