//! # Transport Boundary
//!
//! Explicit decoding of `(method, path, body)` triples into [`ApiRequest`]s and encoding of
//! service outcomes into [`ApiResponse`]s. No socket is opened here; a server adapter only
//! has to move bytes in and out of [`handle`].
//!
//! | Request                        | Success                         |
//! |--------------------------------|---------------------------------|
//! | `GET /api/commands`            | 200, array of commands          |
//! | `GET /api/commands/{id}`       | 200, the command                |
//! | `POST /api/commands`           | 201, `Location`, the command    |
//! | `PUT /api/commands/{id}`       | 204                             |
//! | `PATCH /api/commands/{id}`     | 204                             |
//! | `DELETE /api/commands/{id}`    | 204                             |
//!
//! Failures: unknown ID 404, field violations or a failed patch 422, undecodable body or ID
//! 400, unknown route 404, unsupported method 405, storage or actor failure 500.

use crate::command_actor::CommandError;
use crate::model::{CommandCreate, CommandId, CommandUpdate};
use crate::orchestrator::CommandService;
use resource_actor::{PatchError, PatchOperation};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, error};

/// Route prefix of the Command resource.
pub const COMMANDS_ROUTE: &str = "/api/commands";

pub const OK: u16 = 200;
pub const CREATED: u16 = 201;
pub const NO_CONTENT: u16 = 204;
pub const BAD_REQUEST: u16 = 400;
pub const NOT_FOUND: u16 = 404;
pub const METHOD_NOT_ALLOWED: u16 = 405;
pub const UNPROCESSABLE_ENTITY: u16 = 422;
pub const INTERNAL_SERVER_ERROR: u16 = 500;

/// A decoded request on the Command resource.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiRequest {
    List,
    Get(CommandId),
    Create(CommandCreate),
    Replace(CommandId, CommandUpdate),
    Patch(CommandId, Vec<PatchOperation>),
    Delete(CommandId),
}

/// Why a request could not be decoded.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("no route for '{0}'")]
    UnknownRoute(String),

    #[error("method {method} is not allowed on '{path}'")]
    MethodNotAllowed { method: String, path: String },

    #[error("invalid command id '{0}'")]
    InvalidId(String),

    #[error("invalid request body: {0}")]
    InvalidBody(#[from] serde_json::Error),
}

impl DecodeError {
    pub fn status(&self) -> u16 {
        match self {
            DecodeError::UnknownRoute(_) => NOT_FOUND,
            DecodeError::MethodNotAllowed { .. } => METHOD_NOT_ALLOWED,
            DecodeError::InvalidId(_) | DecodeError::InvalidBody(_) => BAD_REQUEST,
        }
    }
}

/// An encoded outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    /// The `Location` header, set on 201.
    pub location: Option<String>,
    pub body: Option<Value>,
}

impl ApiResponse {
    fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            location: None,
            body: Some(body),
        }
    }

    fn no_content() -> Self {
        Self {
            status: NO_CONTENT,
            location: None,
            body: None,
        }
    }

    fn error(status: u16, message: impl ToString) -> Self {
        Self::json(status, json!({ "error": message.to_string() }))
    }

    fn serialized<T: Serialize>(status: u16, value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(body) => Self::json(status, body),
            Err(e) => {
                error!(error = %e, "Response body could not be encoded");
                Self::error(INTERNAL_SERVER_ERROR, e)
            }
        }
    }
}

/// Turns a raw request into an [`ApiRequest`].
///
/// A trailing slash and a query string on `path` are ignored.
pub fn decode_request(method: &str, path: &str, body: &[u8]) -> Result<ApiRequest, DecodeError> {
    let route = path.split('?').next().unwrap_or_default();
    let route = route.strip_suffix('/').unwrap_or(route);

    let rest = route
        .strip_prefix(COMMANDS_ROUTE)
        .ok_or_else(|| DecodeError::UnknownRoute(path.to_string()))?;
    let method_not_allowed = || DecodeError::MethodNotAllowed {
        method: method.to_string(),
        path: path.to_string(),
    };

    if rest.is_empty() {
        return match method {
            "GET" => Ok(ApiRequest::List),
            "POST" => Ok(ApiRequest::Create(serde_json::from_slice(body)?)),
            _ => Err(method_not_allowed()),
        };
    }

    let segment = rest
        .strip_prefix('/')
        .filter(|segment| !segment.contains('/'))
        .ok_or_else(|| DecodeError::UnknownRoute(path.to_string()))?;
    let id = segment
        .parse::<u32>()
        .map(CommandId)
        .map_err(|_| DecodeError::InvalidId(segment.to_string()))?;

    match method {
        "GET" => Ok(ApiRequest::Get(id)),
        "PUT" => Ok(ApiRequest::Replace(id, serde_json::from_slice(body)?)),
        "PATCH" => Ok(ApiRequest::Patch(id, serde_json::from_slice(body)?)),
        "DELETE" => Ok(ApiRequest::Delete(id)),
        _ => Err(method_not_allowed()),
    }
}

/// Runs a decoded request against `service` and encodes the outcome.
pub async fn dispatch(service: &CommandService, request: ApiRequest) -> ApiResponse {
    let outcome = match request {
        ApiRequest::List => service
            .list()
            .await
            .map(|commands| ApiResponse::serialized(OK, &commands)),
        ApiRequest::Get(id) => service
            .get(id)
            .await
            .map(|command| ApiResponse::serialized(OK, &command)),
        ApiRequest::Create(params) => service.create(params).await.map(|command| ApiResponse {
            location: Some(format!("{COMMANDS_ROUTE}/{}", command.id)),
            ..ApiResponse::serialized(CREATED, &command)
        }),
        ApiRequest::Replace(id, update) => service
            .replace(id, update)
            .await
            .map(|()| ApiResponse::no_content()),
        ApiRequest::Patch(id, operations) => service
            .patch(id, &operations)
            .await
            .map(|()| ApiResponse::no_content()),
        ApiRequest::Delete(id) => service
            .delete(id)
            .await
            .map(|()| ApiResponse::no_content()),
    };

    outcome.unwrap_or_else(|e| encode_error(&e))
}

/// Decodes and dispatches in one step.
pub async fn handle(service: &CommandService, method: &str, path: &str, body: &[u8]) -> ApiResponse {
    match decode_request(method, path, body) {
        Ok(request) => {
            debug!(method, path, "Request decoded");
            dispatch(service, request).await
        }
        Err(e) => {
            debug!(method, path, error = %e, "Request rejected");
            ApiResponse::error(e.status(), e)
        }
    }
}

/// Maps a service failure onto its status code and body.
pub fn encode_error(e: &CommandError) -> ApiResponse {
    match e {
        CommandError::NotFound(_) => ApiResponse::error(NOT_FOUND, e),
        CommandError::ValidationFailed(errors) => ApiResponse::json(
            UNPROCESSABLE_ENTITY,
            json!({ "error": "validation failed", "violations": errors }),
        ),
        CommandError::PatchFailed(failure) => {
            let kind = match &failure.error {
                PatchError::TestFailed { .. } => "testFailed",
                PatchError::PathNotFound { .. } => "pathNotFound",
                PatchError::TypeMismatch { .. } => "typeMismatch",
            };
            ApiResponse::json(
                UNPROCESSABLE_ENTITY,
                json!({
                    "error": "patch failed",
                    "index": failure.index,
                    "kind": kind,
                    "reason": failure.error.to_string(),
                }),
            )
        }
        CommandError::StorageFailed(_)
        | CommandError::Internal(_)
        | CommandError::ActorCommunicationError(_) => {
            error!(error = %e, "Request failed");
            ApiResponse::error(INTERNAL_SERVER_ERROR, e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{FieldLimits, Validate, ValidationErrors};
    use resource_actor::PatchFailure;

    #[test]
    fn test_decode_collection_routes() {
        assert_eq!(decode_request("GET", "/api/commands", b"").unwrap(), ApiRequest::List);
        assert_eq!(decode_request("GET", "/api/commands/?page=1", b"").unwrap(), ApiRequest::List);

        let body = br#"{"howTo":"List files","platform":"linux","commandLine":"ls"}"#;
        assert_eq!(
            decode_request("POST", "/api/commands", body).unwrap(),
            ApiRequest::Create(CommandCreate {
                how_to: "List files".to_string(),
                platform: "linux".to_string(),
                command_line: "ls".to_string(),
            })
        );
    }

    #[test]
    fn test_decode_item_routes() {
        assert_eq!(
            decode_request("GET", "/api/commands/3", b"").unwrap(),
            ApiRequest::Get(CommandId(3))
        );
        assert_eq!(
            decode_request("DELETE", "/api/commands/3", b"").unwrap(),
            ApiRequest::Delete(CommandId(3))
        );

        let patch = br#"[{"op":"replace","path":"/howTo","value":"x"}]"#;
        assert_eq!(
            decode_request("PATCH", "/api/commands/3", patch).unwrap(),
            ApiRequest::Patch(
                CommandId(3),
                vec![PatchOperation::Replace {
                    path: "/howTo".to_string(),
                    value: json!("x"),
                }]
            )
        );
    }

    #[test]
    fn test_missing_fields_decode_as_empty() {
        match decode_request("PUT", "/api/commands/1", br#"{"howTo":"x"}"#).unwrap() {
            ApiRequest::Replace(_, update) => {
                assert_eq!(update.platform, "");
                assert!(update.validate(&FieldLimits::default()).is_err());
            }
            other => panic!("unexpected request {other:?}"),
        }
    }

    #[test]
    fn test_decode_failures_and_statuses() {
        let cases = [
            ("GET", "/api/users", "", NOT_FOUND),
            ("GET", "/api/commands/1/extra", "", NOT_FOUND),
            ("DELETE", "/api/commands", "", METHOD_NOT_ALLOWED),
            ("POST", "/api/commands/1", "{}", METHOD_NOT_ALLOWED),
            ("GET", "/api/commands/abc", "", BAD_REQUEST),
            ("GET", "/api/commands/-1", "", BAD_REQUEST),
            ("POST", "/api/commands", "not json", BAD_REQUEST),
            ("PATCH", "/api/commands/1", r#"[{"op":"rename","path":"/howTo"}]"#, BAD_REQUEST),
        ];

        for (method, path, body, status) in cases {
            let error = decode_request(method, path, body.as_bytes()).unwrap_err();
            assert_eq!(error.status(), status, "{method} {path}");
        }
    }

    #[test]
    fn test_encode_validation_failure() {
        let errors: ValidationErrors = CommandUpdate::default()
            .validate(&FieldLimits::default())
            .unwrap_err();
        let response = encode_error(&CommandError::ValidationFailed(errors));

        assert_eq!(response.status, UNPROCESSABLE_ENTITY);
        let body = response.body.unwrap();
        assert_eq!(body["violations"].as_array().unwrap().len(), 3);
        assert_eq!(body["violations"][0]["field"], "howTo");
    }

    #[test]
    fn test_encode_patch_failure() {
        let failure = PatchFailure {
            index: 2,
            error: PatchError::PathNotFound {
                path: "/nonexistentfield".to_string(),
            },
        };
        let response = encode_error(&CommandError::PatchFailed(failure));

        assert_eq!(response.status, UNPROCESSABLE_ENTITY);
        let body = response.body.unwrap();
        assert_eq!(body["index"], 2);
        assert_eq!(body["kind"], "pathNotFound");
    }

    #[test]
    fn test_encode_other_failures() {
        assert_eq!(encode_error(&CommandError::NotFound(CommandId(9))).status, NOT_FOUND);
        assert_eq!(
            encode_error(&CommandError::StorageFailed("disk full".to_string())).status,
            INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            encode_error(&CommandError::ActorCommunicationError("closed".to_string())).status,
            INTERNAL_SERVER_ERROR
        );
    }
}
