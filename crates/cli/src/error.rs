use std::path::PathBuf;

use devtools_runtime::Error as RuntimeError;
use serde_json::json;
use thiserror::Error;

use crate::output::{CommandError, ErrorCode};

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
	#[error(transparent)]
	Runtime(#[from] RuntimeError),

	#[error("invalid input: {0}")]
	InvalidInput(String),

	#[error("failed to write {path}: {source}")]
	Write {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Json(#[from] serde_json::Error),

	#[error(transparent)]
	Anyhow(#[from] anyhow::Error),
}

fn classify_runtime_error(err: &RuntimeError) -> (ErrorCode, Option<serde_json::Value>) {
	match err {
		RuntimeError::Connection { endpoint, .. } => (ErrorCode::ConnectionFailed, Some(json!({ "endpoint": endpoint }))),
		RuntimeError::NotConnected | RuntimeError::ConnectionClosed | RuntimeError::Transport(_) => {
			(ErrorCode::ConnectionFailed, None)
		}
		RuntimeError::Discovery(_) | RuntimeError::Http(_) => (ErrorCode::TargetNotFound, None),
		RuntimeError::CommandTimeout { id, method, timeout } => (
			ErrorCode::Timeout,
			Some(json!({ "id": id, "method": method, "timeoutMs": timeout.as_millis() as u64 })),
		),
		RuntimeError::PollTimeout { method, attempts, elapsed } => (
			ErrorCode::Timeout,
			Some(json!({ "method": method, "attempts": attempts, "elapsedMs": elapsed.as_millis() as u64 })),
		),
		RuntimeError::Remote(remote) => (
			ErrorCode::RemoteError,
			Some(json!({ "code": remote.code, "data": remote.data })),
		),
		RuntimeError::Navigation { url, .. } => (ErrorCode::NavigationFailed, Some(json!({ "url": url }))),
		RuntimeError::Evaluation(_) => (ErrorCode::JsEvalFailed, None),
		RuntimeError::MalformedFrame(_) | RuntimeError::ProtocolError(_) | RuntimeError::Json(_) => {
			(ErrorCode::ProtocolError, None)
		}
		RuntimeError::Io(_) => (ErrorCode::IoError, None),
		RuntimeError::DuplicateIdentifier(_) => (ErrorCode::InternalError, None),
	}
}

impl CliError {
	/// Convert this error to a CommandError for structured output
	pub fn to_command_error(&self) -> CommandError {
		let (code, details) = match self {
			CliError::Runtime(err) => classify_runtime_error(err),
			CliError::InvalidInput(_) => (ErrorCode::InvalidInput, None),
			CliError::Write { path, .. } => (ErrorCode::IoError, Some(json!({ "path": path }))),
			CliError::Io(_) => (ErrorCode::IoError, None),
			CliError::Json(_) => (ErrorCode::InvalidInput, None),
			CliError::Anyhow(_) => (ErrorCode::InternalError, None),
		};

		CommandError {
			code,
			message: self.to_string(),
			details,
		}
	}
}

#[cfg(test)]
mod tests {
	use std::time::Duration;

	use devtools_protocol::{CommandId, RemoteError};

	use super::*;

	#[test]
	fn timeouts_map_to_timeout_code() {
		let err = CliError::from(RuntimeError::CommandTimeout {
			id: CommandId(3),
			method: "Runtime.evaluate".into(),
			timeout: Duration::from_millis(1500),
		});
		let command_error = err.to_command_error();
		assert_eq!(command_error.code, ErrorCode::Timeout);
		assert_eq!(command_error.details.unwrap()["timeoutMs"], 1500);

		let err = CliError::from(RuntimeError::PollTimeout {
			method: "Runtime.evaluate".into(),
			attempts: 7,
			elapsed: Duration::from_secs(2),
		});
		assert_eq!(err.to_command_error().code, ErrorCode::Timeout);
	}

	#[test]
	fn remote_error_keeps_code() {
		let err = CliError::from(RuntimeError::Remote(RemoteError {
			code: -32601,
			message: "'Foo.bar' wasn't found".into(),
			data: None,
		}));
		let command_error = err.to_command_error();
		assert_eq!(command_error.code, ErrorCode::RemoteError);
		assert_eq!(command_error.details.unwrap()["code"], -32601);
		assert!(command_error.message.contains("wasn't found"));
	}

	#[test]
	fn session_loss_maps_to_connection_failed() {
		let err = CliError::from(RuntimeError::ConnectionClosed);
		assert_eq!(err.to_command_error().code, ErrorCode::ConnectionFailed);

		let err = CliError::from(RuntimeError::Discovery("no page target available".into()));
		assert_eq!(err.to_command_error().code, ErrorCode::TargetNotFound);
	}

	#[test]
	fn invalid_input_message() {
		let err = CliError::InvalidInput("--params must be a JSON object".into());
		let command_error = err.to_command_error();
		assert_eq!(command_error.code, ErrorCode::InvalidInput);
		assert_eq!(command_error.message, "invalid input: --params must be a JSON object");
	}
}
