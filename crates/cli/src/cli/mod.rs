#[cfg(test)]
mod tests;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use devtools_protocol::ScreenshotFormat;

use crate::output::OutputFormat;

/// Root CLI.
#[derive(Parser, Debug)]
#[command(name = "devtools")]
#[command(about = "Drive a browser through its remote debugging endpoint")]
#[command(version)]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug, -vvv every frame)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Output format [default: json]
	#[arg(short = 'f', long, global = true, value_enum)]
	pub format: Option<OutputFormat>,

	/// Host of the remote debugging port [default: 127.0.0.1]
	#[arg(long, global = true, value_name = "HOST")]
	pub host: Option<String>,

	/// Remote debugging port [default: 9222]
	#[arg(short, long, global = true, value_name = "PORT")]
	pub port: Option<u16>,

	/// WebSocket endpoint to use directly, skipping target discovery
	#[arg(long, global = true, value_name = "URL")]
	pub ws: Option<String>,

	/// Target id to attach to (default: first page target)
	#[arg(short, long, global = true, value_name = "ID")]
	pub target: Option<String>,

	/// Per-command timeout in milliseconds [default: 30000]
	#[arg(long, global = true, value_name = "MS")]
	pub timeout_ms: Option<u64>,

	/// Config file (default: <config dir>/devtools/config.json)
	#[arg(long, global = true, value_name = "FILE")]
	pub config: Option<PathBuf>,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Show browser and protocol version.
	Version,
	/// List inspectable targets.
	Targets,
	/// Open a new tab.
	Open {
		/// Initial URL (default: about:blank)
		#[arg(value_name = "URL")]
		url: Option<String>,
	},
	/// Close a tab.
	Close {
		#[arg(value_name = "ID")]
		id: String,
	},
	/// Bring a tab to the front.
	Activate {
		#[arg(value_name = "ID")]
		id: String,
	},
	/// Evaluate a JavaScript expression in the page.
	Eval(EvalArgs),
	/// Navigate the page and wait until it is ready.
	Navigate(NavigateArgs),
	/// Send a raw protocol command.
	Send(SendArgs),
	/// Capture a screenshot of the viewport.
	Screenshot(ScreenshotArgs),
	/// Print protocol events as they arrive.
	Listen(ListenArgs),
}

impl Commands {
	/// Name used in the output envelope.
	pub fn name(&self) -> &'static str {
		match self {
			Commands::Version => "version",
			Commands::Targets => "targets",
			Commands::Open { .. } => "open",
			Commands::Close { .. } => "close",
			Commands::Activate { .. } => "activate",
			Commands::Eval(_) => "eval",
			Commands::Navigate(_) => "navigate",
			Commands::Send(_) => "send",
			Commands::Screenshot(_) => "screenshot",
			Commands::Listen(_) => "listen",
		}
	}
}

#[derive(Args, Debug, Clone)]
pub struct EvalArgs {
	/// JavaScript expression; promises are awaited
	#[arg(value_name = "EXPR")]
	pub expression: String,
}

#[derive(Args, Debug, Clone)]
pub struct NavigateArgs {
	#[arg(value_name = "URL")]
	pub url: String,

	/// Wait for this expression to become truthy instead of the load event
	#[arg(long, value_name = "EXPR")]
	pub wait_for: Option<String>,

	/// Poll interval while waiting
	#[arg(long, value_name = "MS", default_value_t = 250)]
	pub interval_ms: u64,

	/// Return as soon as the navigation is committed
	#[arg(long, conflicts_with = "wait_for")]
	pub no_wait: bool,
}

#[derive(Args, Debug, Clone)]
pub struct SendArgs {
	/// Protocol method, e.g. Browser.getVersion
	#[arg(value_name = "METHOD")]
	pub method: String,

	/// Parameters as a JSON object
	#[arg(long, value_name = "JSON")]
	pub params: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ScreenshotArgs {
	/// Output file
	#[arg(value_name = "PATH")]
	pub path: PathBuf,

	/// Image format (default: from the file extension, else png)
	#[arg(long = "image-format", value_enum, value_name = "FORMAT")]
	pub image_format: Option<ImageFormat>,
}

/// Screenshot format (CLI wrapper for `ScreenshotFormat`)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ImageFormat {
	#[default]
	Png,
	Jpeg,
}

impl From<ImageFormat> for ScreenshotFormat {
	fn from(format: ImageFormat) -> Self {
		match format {
			ImageFormat::Png => ScreenshotFormat::Png,
			ImageFormat::Jpeg => ScreenshotFormat::Jpeg,
		}
	}
}

impl ScreenshotArgs {
	/// Explicit `--image-format`, else inferred from the path's extension.
	pub fn resolved_format(&self) -> ImageFormat {
		if let Some(format) = self.image_format {
			return format;
		}
		match self.path.extension().and_then(|ext| ext.to_str()).map(str::to_ascii_lowercase) {
			Some(ext) if ext == "jpg" || ext == "jpeg" => ImageFormat::Jpeg,
			_ => ImageFormat::Png,
		}
	}
}

#[derive(Args, Debug, Clone)]
pub struct ListenArgs {
	/// Domains to enable (repeatable)
	#[arg(long = "domain", short = 'd', value_name = "DOMAIN", default_value = "Page")]
	pub domains: Vec<String>,

	/// Stop after this long (default: until interrupted or disconnected)
	#[arg(long, value_name = "MS")]
	pub duration_ms: Option<u64>,
}
