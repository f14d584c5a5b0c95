use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

/// Payload for creating a child profile. Only `name` and `birthday` are
/// required here; the optional fields are forwarded opaquely to db-interact,
/// which owns their shape.
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct AddChildRequest {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: String,

    #[validate(length(min = 1, message = "Birthday cannot be empty"))]
    pub birthday: String,

    pub group: Option<String>,
    pub allergies: Option<Value>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AddChildResponse {
    pub message: String,
    pub child_id: String,
    pub linking_code: String,
}

#[derive(Debug, Serialize)]
pub struct LinkSupervisorResponse {
    pub message: String,
    pub child_id: String,
}
