//! Connection settings: config file, environment, and flags.
//!
//! Precedence, highest first: command-line flag, `DEVTOOLS_HOST` /
//! `DEVTOOLS_PORT`, config file, built-in default.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use devtools_runtime::discovery::{DEFAULT_HOST, DEFAULT_PORT};
use devtools_runtime::connection::DEFAULT_COMMAND_TIMEOUT;
use serde::{Deserialize, Serialize};

use crate::cli::Cli;
use crate::error::{CliError, Result};
use crate::output::OutputFormat;

pub const ENV_HOST: &str = "DEVTOOLS_HOST";
pub const ENV_PORT: &str = "DEVTOOLS_PORT";

/// Contents of `config.json`; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FileConfig {
	pub host: Option<String>,
	pub port: Option<u16>,
	pub timeout_ms: Option<u64>,
	pub format: Option<OutputFormat>,
}

/// `<config dir>/devtools/config.json`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
	dirs::config_dir().map(|dir| dir.join("devtools").join("config.json"))
}

/// Loads `explicit`, or the default file when it exists.
///
/// An explicit path must exist; a missing default file yields defaults.
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<FileConfig> {
	match explicit {
		Some(path) => read_config(path),
		None => match default_config_path() {
			Some(path) if path.is_file() => read_config(&path),
			_ => Ok(FileConfig::default()),
		},
	}
}

fn read_config(path: &Path) -> anyhow::Result<FileConfig> {
	let text = fs::read_to_string(path).with_context(|| format!("Failed to read config {}", path.display()))?;
	let config = serde_json::from_str(&text).with_context(|| format!("Invalid config {}", path.display()))?;
	tracing::debug!(path = %path.display(), "loaded config");
	Ok(config)
}

/// Effective settings for one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
	pub host: String,
	pub port: u16,
	/// Direct WebSocket endpoint; skips discovery when set
	pub ws: Option<String>,
	pub target: Option<String>,
	pub timeout: Duration,
	pub format: OutputFormat,
}

impl Settings {
	/// Merges flags, environment (looked up through `env`) and file config.
	pub fn resolve(cli: &Cli, file: &FileConfig, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
		let env_port = match env(ENV_PORT) {
			Some(raw) => Some(
				raw.trim()
					.parse::<u16>()
					.map_err(|_| CliError::InvalidInput(format!("{ENV_PORT} is not a port number: '{raw}'")))?,
			),
			None => None,
		};

		let host = cli
			.host
			.clone()
			.or_else(|| env(ENV_HOST))
			.or_else(|| file.host.clone())
			.unwrap_or_else(|| DEFAULT_HOST.to_string());
		let port = cli.port.or(env_port).or(file.port).unwrap_or(DEFAULT_PORT);
		let timeout = cli
			.timeout_ms
			.or(file.timeout_ms)
			.map(Duration::from_millis)
			.unwrap_or(DEFAULT_COMMAND_TIMEOUT);
		if timeout.is_zero() {
			return Err(CliError::InvalidInput("timeout must be greater than zero".into()));
		}

		Ok(Self {
			host,
			port,
			ws: cli.ws.clone(),
			target: cli.target.clone(),
			timeout,
			format: cli.format.or(file.format).unwrap_or_default(),
		})
	}

	/// Settings from the process environment.
	pub fn from_env(cli: &Cli, file: &FileConfig) -> Result<Self> {
		Self::resolve(cli, file, |key| std::env::var(key).ok())
	}
}
