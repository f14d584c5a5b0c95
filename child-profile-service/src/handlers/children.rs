use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use validator::Validate;

use crate::dtos::{AddChildRequest, AddChildResponse, LinkSupervisorResponse};
use crate::middleware::auth::{AuthToken, AuthUser};
use crate::startup::AppState;
use service_core::error::AppError;

const ROLE_PARENT: &str = "parent";
const ROLE_TEACHER: &str = "teacher";

/// Create a child profile. Parent role only.
///
/// Forwards the payload to db-interact and, on success, mints a linking code
/// the parent can hand to a supervisor.
#[tracing::instrument(skip(state, token, request), fields(user_id = %claims.sub))]
pub async fn add_child(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    AuthToken(token): AuthToken,
    Json(request): Json<AddChildRequest>,
) -> Result<Response, AppError> {
    if claims.role != ROLE_PARENT {
        return Err(AppError::Forbidden(anyhow::anyhow!(
            "Only parents can add children"
        )));
    }

    request.validate()?;

    let payload = serde_json::to_value(&request)
        .map_err(|e| AppError::InternalError(anyhow::anyhow!(e)))?;

    let response = state.db_interact.create_child(&payload, &token).await?;

    if response.status() != StatusCode::CREATED {
        let (status, body) = relay_parts(response).await;
        let message = match body.get("message").and_then(Value::as_str) {
            Some(reason) => format!(
                "Failed to create child profile via database service. Reason: {}",
                reason
            ),
            None => format!(
                "Failed to create child profile via database service. Status: {}",
                status.as_u16()
            ),
        };
        return Ok((status, Json(json!({ "message": message }))).into_response());
    }

    let body: Value = response.json().await.map_err(|e| {
        AppError::BadGateway(format!("Invalid JSON from db-interact: {}", e))
    })?;

    let child_id = body
        .get("child_id")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            tracing::error!("db-interact created child but did not return child_id");
            AppError::InternalError(anyhow::anyhow!(
                "Child profile created, but failed to get ID"
            ))
        })?
        .to_string();

    let linking_code = state.jwt.generate_linking_code(&child_id)?;

    Ok((
        StatusCode::CREATED,
        Json(AddChildResponse {
            message: "Child profile added successfully".to_string(),
            child_id,
            linking_code,
        }),
    )
        .into_response())
}

/// Link a supervisor to a child using a linking code. Teacher role only.
#[tracing::instrument(skip(state, token, body), fields(supervisor_id = %claims.sub))]
pub async fn link_supervisor(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    AuthToken(token): AuthToken,
    Json(body): Json<Value>,
) -> Result<Response, AppError> {
    if claims.role != ROLE_TEACHER {
        return Err(AppError::Forbidden(anyhow::anyhow!(
            "Only supervisors can link using a code"
        )));
    }

    // Taken from the raw body so a missing field is a 400, not an
    // extractor rejection.
    let linking_code = body
        .get("linking_code")
        .and_then(Value::as_str)
        .filter(|code| !code.is_empty())
        .ok_or_else(|| {
            AppError::BadRequest(anyhow::anyhow!("Missing 'linking_code' in request body"))
        })?;

    let child_id = state.jwt.verify_linking_code(linking_code)?;

    let response = state
        .db_interact
        .link_supervisor(&child_id, &claims.sub, &token)
        .await?;

    let status = response.status();
    if status == StatusCode::OK {
        Ok((
            StatusCode::OK,
            Json(LinkSupervisorResponse {
                message: "Supervisor linked successfully".to_string(),
                child_id,
            }),
        )
            .into_response())
    } else if status == StatusCode::NOT_FOUND {
        Ok((
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "Failed to link supervisor: Child not found" })),
        )
            .into_response())
    } else {
        let (status, body) = relay_parts(response).await;
        let message = match body.get("message").and_then(Value::as_str) {
            Some(reason) => format!(
                "Failed to link supervisor via database service. Reason: {}",
                reason
            ),
            None => format!(
                "Failed to link supervisor via database service. Status: {}",
                status.as_u16()
            ),
        };
        Ok((status, Json(json!({ "message": message }))).into_response())
    }
}

/// Fetch one child profile; db-interact enforces access, we relay its answer.
#[tracing::instrument(skip(state, token), fields(user_id = %claims.sub))]
pub async fn get_child(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    AuthToken(token): AuthToken,
    Path(child_id): Path<String>,
) -> Result<Response, AppError> {
    let response = state.db_interact.get_child(&child_id, &token).await?;
    Ok(relay(response).await)
}

/// List the children associated with the caller.
#[tracing::instrument(skip(state, token), fields(user_id = %claims.sub))]
pub async fn list_children(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    AuthToken(token): AuthToken,
) -> Result<Response, AppError> {
    let response = state.db_interact.list_children(&token).await?;
    Ok(relay(response).await)
}

/// Update editable details for a child.
///
/// The caller's access is checked first through the downstream read endpoint;
/// the update call is only made once that check passes.
#[tracing::instrument(skip(state, token, update), fields(user_id = %claims.sub))]
pub async fn update_child(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    AuthToken(token): AuthToken,
    Path(child_id): Path<String>,
    Json(update): Json<Value>,
) -> Result<Response, AppError> {
    let is_empty = match update.as_object() {
        Some(obj) => obj.is_empty(),
        None => return Err(AppError::BadRequest(anyhow::anyhow!(
            "Request body must be a JSON object"
        ))),
    };
    if is_empty {
        return Err(AppError::BadRequest(anyhow::anyhow!("Missing request body")));
    }

    let authz_response = state.db_interact.get_child(&child_id, &token).await?;
    if !authz_response.status().is_success() {
        tracing::warn!(
            child_id = %child_id,
            status = authz_response.status().as_u16(),
            "Authorization check failed for child update"
        );
        return Ok(relay(authz_response).await);
    }

    let response = state
        .db_interact
        .update_child(&child_id, &update, &token)
        .await?;
    Ok(relay(response).await)
}

/// Relay a downstream response to the client with equivalent status
/// semantics. Non-JSON bodies are wrapped in a message envelope.
async fn relay(response: reqwest::Response) -> Response {
    let (status, body) = relay_parts(response).await;
    (status, Json(body)).into_response()
}

async fn relay_parts(response: reqwest::Response) -> (StatusCode, Value) {
    let status = response.status();
    let body = match response.text().await {
        Ok(text) if text.is_empty() => json!({}),
        Ok(text) => {
            serde_json::from_str::<Value>(&text).unwrap_or_else(|_| json!({ "message": text }))
        }
        Err(e) => {
            tracing::error!("Failed to read db-interact response body: {}", e);
            json!({ "message": "Failed to read response from database service" })
        }
    };
    (status, body)
}
