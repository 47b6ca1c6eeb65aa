//! Request and response envelopes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CommandFailure;

/// Serialized form of an envelope that somehow failed to serialize.
const FALLBACK_ERROR_LINE: &str = r#"{"success":false,"error":"Internal error"}"#;

/// A command request as sent by a controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandRequest {
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl CommandRequest {
    /// Build a request. Empty params are omitted from the wire, matching what
    /// zero-argument commands expect.
    pub fn new(command: impl Into<String>, params: Option<Map<String, Value>>) -> Self {
        Self {
            command: command.into(),
            params: params.filter(|p| !p.is_empty()).map(Value::Object),
        }
    }

    /// Parse one frame into a request.
    ///
    /// Only the envelope is checked here: the frame must be a JSON object with
    /// a non-empty string `command`. `params` is carried through untouched
    /// and validated by the handler.
    pub fn parse(frame: &str) -> Result<Self, CommandFailure> {
        let parsed: Value = serde_json::from_str(frame).map_err(|_| CommandFailure::InvalidJson)?;
        let Value::Object(mut object) = parsed else {
            return Err(CommandFailure::InvalidJson);
        };

        let command = match object.get("command").and_then(Value::as_str) {
            Some(c) if !c.is_empty() => c.to_string(),
            _ => return Err(CommandFailure::MissingCommand),
        };

        Ok(Self {
            command,
            params: object.remove("params"),
        })
    }

    /// The params as an object, if present and actually an object.
    pub fn params_object(&self) -> Option<&Map<String, Value>> {
        self.params.as_ref().and_then(Value::as_object)
    }

    /// Serialize to a single line without the trailing delimiter.
    pub fn to_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| String::from("{}"))
    }
}

/// Response envelope: `{"success": bool, ...fields}`.
///
/// `success` is always serialized first; on failure `fields` holds exactly
/// one `error` string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub success: bool,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Response {
    /// An empty success envelope; add fields with [`Response::with`].
    pub fn ok() -> Self {
        Self {
            success: true,
            fields: Map::new(),
        }
    }

    pub fn ok_with(fields: Map<String, Value>) -> Self {
        Self {
            success: true,
            fields,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("error".into(), Value::String(message.into()));
        Self {
            success: false,
            fields,
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn error_message(&self) -> Option<&str> {
        if self.success {
            return None;
        }
        self.fields.get("error").and_then(Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Serialize to a single line without the trailing delimiter.
    pub fn to_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| FALLBACK_ERROR_LINE.to_string())
    }
}

impl From<CommandFailure> for Response {
    fn from(failure: CommandFailure) -> Self {
        Self::error(failure.to_string())
    }
}
