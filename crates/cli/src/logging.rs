use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Filter directive for a `-v` count; `RUST_LOG` takes precedence.
pub fn default_filter(verbosity: u8) -> &'static str {
	// 0 = errors only (frame-level chatter stays hidden)
	// 1 (-v) = connect/close and warnings from the runtime
	// 2 (-vv) = per-command debug
	// 3+ = every frame
	match verbosity {
		0 => "error",
		1 => "info,devtools_runtime=info",
		2 => "debug",
		_ => "trace",
	}
}

pub fn init_logging(verbosity: u8) {
	let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

	// stdout carries the result envelope; logs always go to stderr.
	let stderr = std::io::stderr.with_max_level(tracing::Level::TRACE);

	tracing_subscriber::fmt()
		.with_env_filter(env_filter)
		.with_writer(stderr)
		.with_target(true)
		.with_level(true)
		.compact()
		.init();
}
