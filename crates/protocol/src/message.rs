//! Command and frame types for the remote debugging wire format.
//!
//! # Wire shapes
//!
//! ```text
//! outgoing command  {"id": 7, "method": "Runtime.evaluate", "params": {...}}
//! success response  {"id": 7, "result": {...}}
//! error response    {"id": 7, "error": {"code": -32000, "message": "...", "data": ...}}
//! event             {"method": "Page.loadEventFired", "params": {...}}
//! ```
//!
//! Inbound text is classified by [`Frame::decode`]: anything carrying an `id`
//! is a [`Response`], anything carrying only a `method` is an [`Event`].

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Correlation identifier attached to a command and echoed in its response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandId(pub u64);

impl CommandId {
	pub fn get(self) -> u64 {
		self.0
	}
}

impl fmt::Display for CommandId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl From<u64> for CommandId {
	fn from(id: u64) -> Self {
		Self(id)
	}
}

/// Command message sent to the remote endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
	/// Unique request ID for correlating responses
	pub id: CommandId,
	/// Method name, `Domain.command` (e.g. `Page.navigate`)
	pub method: String,
	/// Parameters document; always an object on the wire
	#[serde(default = "empty_params")]
	pub params: Value,
}

fn empty_params() -> Value {
	Value::Object(Map::new())
}

impl Request {
	/// Builds a request, normalizing `null` params to an empty object.
	pub fn new(id: CommandId, method: impl Into<String>, params: Value) -> Self {
		let params = if params.is_null() { empty_params() } else { params };
		Self {
			id,
			method: method.into(),
			params,
		}
	}

	/// Serializes the request into a single text frame.
	pub fn to_text(&self) -> Result<String, serde_json::Error> {
		serde_json::to_string(self)
	}
}

/// Error document carried by a failed response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteError {
	/// JSON-RPC style error code (e.g. `-32601` method not found)
	#[serde(default)]
	pub code: i64,
	/// Human-readable error message
	pub message: String,
	/// Optional extra detail, usually a string
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub data: Option<Value>,
}

impl fmt::Display for RemoteError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} (code {})", self.message, self.code)?;
		match &self.data {
			Some(Value::String(data)) => write!(f, ": {data}"),
			Some(data) => write!(f, ": {data}"),
			None => Ok(()),
		}
	}
}

/// Tagged payload of a response frame.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseOutcome {
	/// The command succeeded; carries the `result` document (`null` if absent).
	Success(Value),
	/// The command failed on the remote side.
	Failure(RemoteError),
}

impl ResponseOutcome {
	pub fn is_success(&self) -> bool {
		matches!(self, ResponseOutcome::Success(_))
	}

	pub fn into_result(self) -> Result<Value, RemoteError> {
		match self {
			ResponseOutcome::Success(value) => Ok(value),
			ResponseOutcome::Failure(error) => Err(error),
		}
	}
}

/// Response to a previously sent command.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
	/// Request ID this response correlates to
	pub id: CommandId,
	pub outcome: ResponseOutcome,
}

/// Unsolicited notification emitted by the endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
	/// Event method name (e.g. `Page.loadEventFired`)
	pub method: String,
	/// Event parameters, `null` when the endpoint omitted them
	#[serde(default)]
	pub params: Value,
	/// Flattened session the event belongs to, if any
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub session_id: Option<String>,
}

impl Event {
	/// Domain part of the method name (`Page` for `Page.loadEventFired`).
	pub fn domain(&self) -> &str {
		self.method.split_once('.').map_or(self.method.as_str(), |(domain, _)| domain)
	}
}

/// A decoded inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
	/// Carries an `id`; answers a command
	Response(Response),
	/// Carries no `id`; a notification nobody asked for
	Event(Event),
}

/// Reasons an inbound frame could not be decoded.
#[derive(Debug, Error)]
pub enum FrameError {
	#[error("frame is not valid JSON: {0}")]
	Json(#[from] serde_json::Error),

	#[error("frame is not a JSON object")]
	NotAnObject,

	#[error("frame id is not an unsigned integer: {0}")]
	InvalidId(Value),

	#[error("frame error payload is malformed: {0}")]
	InvalidError(serde_json::Error),

	#[error("frame method is not a string: {0}")]
	InvalidMethod(Value),

	#[error("frame has neither an id nor a method")]
	Unclassified,
}

/// Loose view of an inbound frame used for classification.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFrame {
	#[serde(default)]
	id: Option<Value>,
	#[serde(default)]
	method: Option<Value>,
	#[serde(default)]
	params: Option<Value>,
	#[serde(default)]
	result: Option<Value>,
	#[serde(default)]
	error: Option<Value>,
	#[serde(default)]
	session_id: Option<String>,
}

impl Frame {
	/// Decodes one raw frame (UTF-8 JSON text).
	pub fn decode(bytes: impl AsRef<[u8]>) -> Result<Self, FrameError> {
		let value: Value = serde_json::from_slice(bytes.as_ref())?;
		Self::from_value(value)
	}

	/// Classifies an already parsed JSON document.
	pub fn from_value(value: Value) -> Result<Self, FrameError> {
		if !value.is_object() {
			return Err(FrameError::NotAnObject);
		}
		let raw: RawFrame = serde_json::from_value(value)?;

		match raw.id {
			Some(Value::Null) | None => {}
			Some(id) => {
				let id = id.as_u64().map(CommandId).ok_or(FrameError::InvalidId(id))?;
				// `error` takes precedence if an endpoint sends both.
				let outcome = match raw.error {
					Some(error) if !error.is_null() => {
						ResponseOutcome::Failure(serde_json::from_value(error).map_err(FrameError::InvalidError)?)
					}
					_ => ResponseOutcome::Success(raw.result.unwrap_or(Value::Null)),
				};
				return Ok(Frame::Response(Response { id, outcome }));
			}
		}

		match raw.method {
			Some(Value::String(method)) => Ok(Frame::Event(Event {
				method,
				params: raw.params.unwrap_or(Value::Null),
				session_id: raw.session_id,
			})),
			Some(other) => Err(FrameError::InvalidMethod(other)),
			None => Err(FrameError::Unclassified),
		}
	}

	/// The correlation id, for response frames.
	pub fn id(&self) -> Option<CommandId> {
		match self {
			Frame::Response(response) => Some(response.id),
			Frame::Event(_) => None,
		}
	}
}
