//! Error types for the session runtime.

use std::time::Duration;

use devtools_protocol::{CommandId, FrameError, RemoteError};
use thiserror::Error;

/// Result type alias for runtime operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to a remote debugging endpoint.
#[derive(Debug, Error)]
pub enum Error {
	/// Network or handshake failure while connecting. Never retried automatically.
	#[error("Failed to connect to {endpoint}: {reason}")]
	Connection { endpoint: String, reason: String },

	/// Operation attempted on a client that is not (or no longer) connected.
	#[error("Client is not connected")]
	NotConnected,

	/// One inbound frame could not be decoded.
	#[error("Malformed frame: {0}")]
	MalformedFrame(#[from] FrameError),

	/// An identifier was registered twice.
	#[error("Command id {0} is already pending")]
	DuplicateIdentifier(CommandId),

	/// No response arrived for one command within its timeout.
	#[error("Command '{method}' (id {id}) timed out after {}ms", timeout.as_millis())]
	CommandTimeout {
		id: CommandId,
		method: String,
		timeout: Duration,
	},

	/// A polling predicate never held before the deadline.
	#[error("Polling '{method}' timed out after {}ms ({attempts} attempts)", elapsed.as_millis())]
	PollTimeout {
		method: String,
		attempts: u32,
		elapsed: Duration,
	},

	/// The connection ended while the command was outstanding.
	#[error("Connection closed")]
	ConnectionClosed,

	/// The endpoint answered the command with an error document.
	#[error("Remote error: {0}")]
	Remote(RemoteError),

	/// `Page.navigate` reported a failure.
	#[error("Navigation to '{url}' failed: {reason}")]
	Navigation { url: String, reason: String },

	/// JavaScript evaluation threw.
	#[error("JavaScript exception: {0}")]
	Evaluation(String),

	/// A result document did not have the expected shape.
	#[error("Protocol error: {0}")]
	ProtocolError(String),

	/// HTTP target discovery failed.
	#[error("Target discovery failed: {0}")]
	Discovery(String),

	/// Transport-level read or write failure.
	#[error("Transport error: {0}")]
	Transport(String),

	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	#[error("HTTP error: {0}")]
	Http(#[from] reqwest::Error),
}

impl Error {
	/// The wait ran out of time; the session is still usable and a retry may succeed.
	pub fn is_timeout(&self) -> bool {
		matches!(self, Error::CommandTimeout { .. } | Error::PollTimeout { .. })
	}

	/// The session is gone; a new client must be connected.
	pub fn is_session_lost(&self) -> bool {
		matches!(self, Error::ConnectionClosed | Error::NotConnected | Error::Transport(_))
	}

	/// Returns the remote error document if the endpoint rejected the command.
	pub fn remote(&self) -> Option<&RemoteError> {
		match self {
			Error::Remote(error) => Some(error),
			_ => None,
		}
	}
}

impl From<RemoteError> for Error {
	fn from(error: RemoteError) -> Self {
		Error::Remote(error)
	}
}
