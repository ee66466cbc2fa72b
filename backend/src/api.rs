//! Public API surface for callers of the engine.
//!
//! Every HTTP response body is an [`ApiResponse`]: a `success` flag plus
//! either the payload or an [`ApiErrorBody`]. The types are plain serde
//! records so non-HTTP callers can reuse the same envelope.

use serde::{Deserialize, Serialize};

pub use crate::models::{
    Assignment, AssignmentFilter, AssignmentPatch, ConflictDetail, ConflictKind, ConflictLogEntry,
    DeleteOutcome, InstructorWorkload, ReplicationResult, ReplicationTarget, ValidationResult,
    WorkloadReport,
};

/// Uniform response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiErrorBody>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: ApiErrorBody) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

/// Machine-readable failure.
///
/// `kind` is a conflict kind (`instructor-conflict`, `room-conflict`, ...)
/// for rejections, or an error kind (`not-found`, `invalid-input`,
/// `store-error`) otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub kind: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiErrorBody {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl From<&ConflictDetail> for ApiErrorBody {
    /// Rejections carry the colliding rows as details.
    fn from(conflict: &ConflictDetail) -> Self {
        ApiErrorBody::new(conflict.kind.as_str(), conflict.message.clone())
            .with_details(conflict.details_json())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_envelope_omits_error() {
        let json = serde_json::to_value(ApiResponse::ok(3)).unwrap();
        assert_eq!(json, serde_json::json!({ "success": true, "data": 3 }));
    }

    #[test]
    fn test_failure_envelope_omits_data() {
        let body = ApiErrorBody::new("not-found", "Assignment 9 not found");
        let json = serde_json::to_value(ApiResponse::<()>::failure(body)).unwrap();
        assert_eq!(json["success"], false);
        assert!(json.get("data").is_none());
        assert_eq!(json["error"]["kind"], "not-found");
        assert!(json["error"].get("details").is_none());
    }

    #[test]
    fn test_conflict_body_uses_wire_kind() {
        let body = ApiErrorBody::from(&ConflictDetail::new(ConflictKind::Room, "taken"));
        assert_eq!(body.kind, "room-conflict");
        assert_eq!(body.details, Some(serde_json::json!([])));
    }
}
