//! Topics and payloads carried by the notification bus

use serde::Serialize;
use std::fmt;

/// Topics emitted by the plugin core
///
/// Topics are plain strings so plugins may publish their own; these are the
/// ones the host itself uses.
pub mod topics {
    /// A plugin was registered; payload is the plugin name
    pub const LOAD_PLUGIN: &str = "LoadPlugin";
    /// A plugin was unloaded; payload is the plugin name
    pub const UNLOAD_PLUGIN: &str = "UnloadPlugin";
    /// A method invocation was requested; payload is a [`super::MethodRequest`]
    pub const REQUEST_METHOD: &str = "RequestMethod";
    /// A load or invocation failed; payload is the message
    pub const ERROR: &str = "Error";
    /// A recoverable problem, e.g. a duplicate registration; payload is the message
    pub const WARNING: &str = "Warning";
}

/// Audit record of a single `invoke` request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodRequest {
    pub author: String,
    pub name: String,
    pub version_range: String,
    pub method: String,
}

impl MethodRequest {
    pub fn new(author: &str, name: &str, version_range: &str, method: &str) -> Self {
        Self {
            author: author.to_string(),
            name: name.to_string(),
            version_range: version_range.to_string(),
            method: method.to_string(),
        }
    }
}

impl fmt::Display for MethodRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}::{} ({})",
            self.author, self.name, self.method, self.version_range
        )
    }
}

/// Payload delivered with a notification
///
/// The shape depends on the topic; see [`topics`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Payload {
    Empty,
    Text(String),
    MethodRequest(MethodRequest),
    Value(serde_json::Value),
}

impl Payload {
    /// The text of a `Text` payload
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_method_request(&self) -> Option<&MethodRequest> {
        match self {
            Payload::MethodRequest(request) => Some(request),
            _ => None,
        }
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Empty => Ok(()),
            Payload::Text(text) => write!(f, "{}", text),
            Payload::MethodRequest(request) => write!(f, "{}", request),
            Payload::Value(value) => write!(f, "{}", value),
        }
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

impl From<MethodRequest> for Payload {
    fn from(request: MethodRequest) -> Self {
        Payload::MethodRequest(request)
    }
}

impl From<serde_json::Value> for Payload {
    fn from(value: serde_json::Value) -> Self {
        Payload::Value(value)
    }
}
