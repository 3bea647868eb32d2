// src/rpc/dispatcher.rs

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::{Map, Value, json};
use tracing::{debug, info, warn};

use crate::feedback::{FeedbackRequest, FeedbackWorkflow};

use super::message::{Request, Response, RpcError};
use super::PROTOCOL_VERSION;

/// The single tool this server exposes.
pub const TOOL_NAME: &str = "interactive_feedback";

const TOOL_DESCRIPTION: &str = "Get interactive feedback from user for development tasks";
const PREVIOUS_REQUEST_DESCRIPTION: &str =
    "The previous user request that triggered this interactive feedback";

/// Argument names, in the order they appear in the schema.
const ARG_PROJECT_DIRECTORY: &str = "projectDirectory";
const ARG_PROMPT: &str = "prompt";
const ARG_PREVIOUS_USER_REQUEST: &str = "previousUserRequest";

/// Routes decoded requests to their handlers.
///
/// Requests are handled one at a time; `tools/call` blocks the caller for
/// the full feedback round-trip.
pub struct Dispatcher {
    workflow: Arc<FeedbackWorkflow>,
}

impl Dispatcher {
    pub fn new(workflow: Arc<FeedbackWorkflow>) -> Self {
        Self { workflow }
    }

    /// Handle one input line.
    ///
    /// Returns `None` for blank lines and notifications; every other line,
    /// including undecodable ones, yields exactly one response.
    pub async fn handle_line(&self, line: &str) -> Option<Response> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        match Request::parse(line) {
            Ok(request) => self.handle(request).await,
            Err(error) => {
                warn!(code = error.code, "rejecting malformed request line");
                Some(Response::failure(Value::Null, error))
            }
        }
    }

    pub async fn handle(&self, request: Request) -> Option<Response> {
        let Some(id) = request.id.clone() else {
            debug!(method = %request.method, "notification received");
            return None;
        };

        debug!(method = %request.method, id = %id, "dispatching request");
        let outcome = match request.method.as_str() {
            "initialize" => Ok(initialize_result()),
            "tools/list" => Ok(tools_list_result()),
            "tools/call" => self.tools_call(request.params.as_ref()).await,
            other => {
                debug!(method = %other, "unknown method");
                Err(RpcError::method_not_found("Method not found"))
            }
        };

        Some(match outcome {
            Ok(result) => Response::success(id, result),
            Err(error) => Response::failure(id, error),
        })
    }

    async fn tools_call(&self, params: Option<&Value>) -> Result<Value, RpcError> {
        let params = params
            .and_then(Value::as_object)
            .ok_or_else(|| RpcError::invalid_params("Invalid params"))?;

        let name = params.get("name").and_then(Value::as_str).unwrap_or_default();
        if name != TOOL_NAME {
            return Err(RpcError::method_not_found("Unknown tool"));
        }

        let request = feedback_request(params.get("arguments"))?;
        info!(project = ?request.project_directory, "interactive feedback requested");

        let text = self.workflow.run_to_text(request).await;
        Ok(json!({
            "content": [{ "type": "text", "text": text }]
        }))
    }
}

/// Validate tool arguments: all three must be present and strings.
fn feedback_request(arguments: Option<&Value>) -> Result<FeedbackRequest, RpcError> {
    let empty = Map::new();
    let args = match arguments {
        Some(Value::Object(map)) => map,
        None => &empty,
        Some(_) => return Err(RpcError::invalid_params("arguments must be an object")),
    };

    let string_arg = |key: &str| -> Result<String, RpcError> {
        match args.get(key) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(_) => Err(RpcError::invalid_params(format!("argument `{key}` must be a string"))),
            None => Err(RpcError::invalid_params(format!("missing required argument `{key}`"))),
        }
    };

    let project_directory = string_arg(ARG_PROJECT_DIRECTORY)?;
    let prompt = string_arg(ARG_PROMPT)?;
    let previous_user_request = string_arg(ARG_PREVIOUS_USER_REQUEST)?;

    let project_directory = if project_directory.trim().is_empty() {
        PathBuf::from(".")
    } else {
        PathBuf::from(project_directory)
    };

    Ok(FeedbackRequest {
        project_directory,
        prompt,
        previous_user_request,
    })
}

fn initialize_result() -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": {
            "tools": { "listChanged": true }
        },
        "serverInfo": {
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
        }
    })
}

fn tools_list_result() -> Value {
    json!({
        "tools": [{
            "name": TOOL_NAME,
            "description": TOOL_DESCRIPTION,
            "inputSchema": {
                "type": "object",
                "properties": {
                    ARG_PROJECT_DIRECTORY: {
                        "type": "string",
                        "description": "The project directory path"
                    },
                    ARG_PROMPT: {
                        "type": "string",
                        "description": "The prompt to show to the user"
                    },
                    ARG_PREVIOUS_USER_REQUEST: {
                        "type": "string",
                        "description": PREVIOUS_REQUEST_DESCRIPTION
                    }
                },
                "required": [ARG_PROJECT_DIRECTORY, ARG_PROMPT, ARG_PREVIOUS_USER_REQUEST]
            }
        }]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::INVALID_PARAMS;

    #[test]
    fn schema_requires_all_three_arguments() {
        let list = tools_list_result();
        let tool = &list["tools"][0];
        assert_eq!(tool["name"], TOOL_NAME);
        assert_eq!(
            tool["inputSchema"]["required"],
            json!(["projectDirectory", "prompt", "previousUserRequest"])
        );
        for key in ["projectDirectory", "prompt", "previousUserRequest"] {
            assert_eq!(tool["inputSchema"]["properties"][key]["type"], "string");
        }
    }

    #[test]
    fn initialize_announces_protocol_version() {
        let init = initialize_result();
        assert_eq!(init["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(init["capabilities"]["tools"]["listChanged"], true);
        assert_eq!(init["serverInfo"]["name"], env!("CARGO_PKG_NAME"));
    }

    #[test]
    fn empty_project_directory_means_cwd() {
        let args = json!({"projectDirectory": "", "prompt": "p", "previousUserRequest": "r"});
        let req = feedback_request(Some(&args)).unwrap();
        assert_eq!(req.project_directory, PathBuf::from("."));
        assert_eq!(req.prompt, "p");
        assert_eq!(req.previous_user_request, "r");
    }

    #[test]
    fn missing_or_mistyped_arguments_are_invalid_params() {
        let missing = json!({"projectDirectory": "/tmp", "prompt": "p"});
        assert_eq!(feedback_request(Some(&missing)).unwrap_err().code, INVALID_PARAMS);

        let mistyped = json!({"projectDirectory": "/tmp", "prompt": 3, "previousUserRequest": "r"});
        assert_eq!(feedback_request(Some(&mistyped)).unwrap_err().code, INVALID_PARAMS);

        assert_eq!(feedback_request(None).unwrap_err().code, INVALID_PARAMS);
        assert_eq!(feedback_request(Some(&json!([1]))).unwrap_err().code, INVALID_PARAMS);
    }
}
