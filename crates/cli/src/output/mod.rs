//! Structured output envelope for all CLI commands.
//!
//! ## Output Contract
//!
//! Every command produces one result envelope on stdout:
//!
//! ```json
//! {
//!   "ok": true,
//!   "command": "eval",
//!   "data": { ... },
//!   "timings": { "durationMs": 12 }
//! }
//! ```
//!
//! On failure:
//!
//! ```json
//! {
//!   "ok": false,
//!   "command": "eval",
//!   "error": { "code": "JS_EVAL_FAILED", "message": "ReferenceError: x is not defined" }
//! }
//! ```
//!
//! `listen` additionally streams one JSON line per event before its envelope.


use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use devtools_protocol::Event;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Output format for CLI results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
	/// Pretty-printed JSON envelope
	#[default]
	Json,
	/// Human-readable text
	Text,
}

impl std::str::FromStr for OutputFormat {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_lowercase().as_str() {
			"json" => Ok(OutputFormat::Json),
			"text" => Ok(OutputFormat::Text),
			_ => Err(format!("unknown format: {s}")),
		}
	}
}

impl std::fmt::Display for OutputFormat {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			OutputFormat::Json => write!(f, "json"),
			OutputFormat::Text => write!(f, "text"),
		}
	}
}

/// The result envelope returned by every command.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult<T: Serialize> {
	/// Whether the command succeeded
	pub ok: bool,

	/// Command name (e.g. "eval", "targets")
	pub command: String,

	/// Command-specific result data (only present on success)
	#[serde(skip_serializing_if = "Option::is_none")]
	pub data: Option<T>,

	/// Error information (only present on failure)
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<CommandError>,

	#[serde(skip_serializing_if = "Option::is_none")]
	pub timings: Option<Timings>,
}

/// Error information for failed commands
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
	pub code: ErrorCode,

	/// Human-readable error message
	pub message: String,

	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<Value>,
}

/// Standardized error codes for programmatic handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
	/// Could not reach the endpoint or the session was lost
	ConnectionFailed,
	/// No suitable target on the debugging port
	TargetNotFound,
	/// A command or wait ran out of time
	Timeout,
	/// The endpoint rejected a command
	RemoteError,
	/// Navigation to URL failed
	NavigationFailed,
	/// JavaScript evaluation threw
	JsEvalFailed,
	/// The endpoint sent something the client could not understand
	ProtocolError,
	/// File I/O error
	IoError,
	/// Invalid input provided
	InvalidInput,
	/// Unknown/internal error
	InternalError,
}

impl std::fmt::Display for ErrorCode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let code = match self {
			ErrorCode::ConnectionFailed => "CONNECTION_FAILED",
			ErrorCode::TargetNotFound => "TARGET_NOT_FOUND",
			ErrorCode::Timeout => "TIMEOUT",
			ErrorCode::RemoteError => "REMOTE_ERROR",
			ErrorCode::NavigationFailed => "NAVIGATION_FAILED",
			ErrorCode::JsEvalFailed => "JS_EVAL_FAILED",
			ErrorCode::ProtocolError => "PROTOCOL_ERROR",
			ErrorCode::IoError => "IO_ERROR",
			ErrorCode::InvalidInput => "INVALID_INPUT",
			ErrorCode::InternalError => "INTERNAL_ERROR",
		};
		f.write_str(code)
	}
}

/// Timing information for the command
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timings {
	/// Total duration in milliseconds
	pub duration_ms: u64,

	/// Time spent waiting for a condition (if applicable)
	#[serde(skip_serializing_if = "Option::is_none")]
	pub wait_ms: Option<u64>,
}

impl From<Duration> for Timings {
	fn from(duration: Duration) -> Self {
		Timings {
			duration_ms: duration.as_millis() as u64,
			wait_ms: None,
		}
	}
}

/// Builder for constructing command results
pub struct ResultBuilder<T: Serialize> {
	command: String,
	data: Option<T>,
	error: Option<CommandError>,
	start_time: Instant,
	wait: Option<Duration>,
}

impl<T: Serialize> ResultBuilder<T> {
	pub fn new(command: impl Into<String>) -> Self {
		Self::started_at(command, Instant::now())
	}

	/// Builder whose duration is measured from `start`.
	pub fn started_at(command: impl Into<String>, start: Instant) -> Self {
		Self {
			command: command.into(),
			data: None,
			error: None,
			start_time: start,
			wait: None,
		}
	}

	/// Set the successful result data
	pub fn data(mut self, data: T) -> Self {
		self.data = Some(data);
		self
	}

	pub fn error(mut self, error: CommandError) -> Self {
		self.error = Some(error);
		self
	}

	/// Record time spent polling for a condition
	pub fn waited(mut self, wait: Duration) -> Self {
		self.wait = Some(wait);
		self
	}

	pub fn build(self) -> CommandResult<T> {
		let ok = self.error.is_none() && self.data.is_some();
		let mut timings = Timings::from(self.start_time.elapsed());
		timings.wait_ms = self.wait.map(|wait| wait.as_millis() as u64);

		CommandResult {
			ok,
			command: self.command,
			data: self.data,
			error: self.error,
			timings: Some(timings),
		}
	}
}

/// Print a command result to stdout in the specified format
pub fn print_result<T: Serialize>(result: &CommandResult<T>, format: OutputFormat) {
	let mut stdout = io::stdout().lock();
	let _ = write_result(&mut stdout, result, format);
}

/// Writes `result` to `out`; separated from [`print_result`] for tests.
pub fn write_result<T: Serialize>(out: &mut impl Write, result: &CommandResult<T>, format: OutputFormat) -> io::Result<()> {
	match format {
		OutputFormat::Json => {
			let json = serde_json::to_string_pretty(result).map_err(io::Error::other)?;
			writeln!(out, "{json}")
		}
		OutputFormat::Text => write_result_text(out, result),
	}
}

fn write_result_text<T: Serialize>(out: &mut impl Write, result: &CommandResult<T>) -> io::Result<()> {
	if result.ok {
		if let Some(ref data) = result.data {
			match serde_json::to_value(data) {
				// Bare strings read better unquoted.
				Ok(Value::String(text)) => writeln!(out, "{text}")?,
				Ok(value) => writeln!(out, "{}", serde_json::to_string_pretty(&value).map_err(io::Error::other)?)?,
				Err(e) => writeln!(out, "<unprintable result: {e}>")?,
			}
		}
	} else if let Some(ref error) = result.error {
		writeln!(out, "Error [{}]: {}", error.code, error.message)?;
	}
	Ok(())
}

/// Print an error to stderr in human-readable format
pub fn print_error_stderr(error: &CommandError) {
	eprintln!("Error [{}]: {}", error.code, error.message);
}

/// Writes one event as a line: NDJSON for `json`, `method params` for `text`.
pub fn write_event(out: &mut impl Write, event: &Event, format: OutputFormat) -> io::Result<()> {
	match format {
		OutputFormat::Json => {
			let line = serde_json::to_string(event).map_err(io::Error::other)?;
			writeln!(out, "{line}")
		}
		OutputFormat::Text => writeln!(out, "{} {}", event.method, event.params),
	}
}

/// Result data for `eval`
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvalData {
	pub expression: String,
	pub value: Value,
}

/// Result data for `navigate`
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigateData {
	/// The requested URL
	pub url: String,
	/// The page URL after navigation (may differ due to redirects)
	#[serde(skip_serializing_if = "Option::is_none")]
	pub actual_url: Option<String>,
	pub title: String,
	pub frame_id: String,
	/// Value of the `--wait-for` expression once it became truthy
	#[serde(skip_serializing_if = "Option::is_none")]
	pub condition_value: Option<Value>,
}

/// Result data for `send`
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendData {
	pub method: String,
	pub result: Value,
}

/// Result data for `screenshot`
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenshotData {
	pub path: PathBuf,
	pub format: String,
	pub size_bytes: u64,
}

/// Result data for `close` and `activate`
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetActionData {
	pub id: String,
	pub action: String,
}

/// Result data for `listen`
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListenData {
	pub domains: Vec<String>,
	pub events: u64,
	/// Why listening stopped: `duration`, `interrupted` or `disconnected`
	pub stopped_by: String,
}
