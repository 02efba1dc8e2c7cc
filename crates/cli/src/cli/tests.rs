use std::path::PathBuf;

use clap::Parser;

use super::*;

#[test]
fn parse_eval_with_globals() {
	let args = vec!["devtools", "--port", "9333", "-f", "text", "eval", "document.title"];
	let cli = Cli::try_parse_from(args).unwrap();

	assert_eq!(cli.port, Some(9333));
	assert_eq!(cli.format, Some(OutputFormat::Text));
	assert!(cli.host.is_none());
	match cli.command {
		Commands::Eval(args) => assert_eq!(args.expression, "document.title"),
		_ => panic!("Expected Eval command"),
	}
}

#[test]
fn globals_after_subcommand() {
	let args = vec!["devtools", "targets", "--host", "10.0.0.5", "-vv", "--timeout-ms", "500"];
	let cli = Cli::try_parse_from(args).unwrap();

	assert!(matches!(cli.command, Commands::Targets));
	assert_eq!(cli.host.as_deref(), Some("10.0.0.5"));
	assert_eq!(cli.verbose, 2);
	assert_eq!(cli.timeout_ms, Some(500));
}

#[test]
fn parse_navigate_wait_for() {
	let args = vec![
		"devtools",
		"navigate",
		"https://example.com",
		"--wait-for",
		"document.querySelector('h1')",
		"--interval-ms",
		"100",
	];
	let cli = Cli::try_parse_from(args).unwrap();

	match cli.command {
		Commands::Navigate(args) => {
			assert_eq!(args.url, "https://example.com");
			assert_eq!(args.wait_for.as_deref(), Some("document.querySelector('h1')"));
			assert_eq!(args.interval_ms, 100);
			assert!(!args.no_wait);
		}
		_ => panic!("Expected Navigate command"),
	}
}

#[test]
fn navigate_defaults_and_conflicts() {
	let cli = Cli::try_parse_from(["devtools", "navigate", "https://example.com"]).unwrap();
	match cli.command {
		Commands::Navigate(args) => {
			assert_eq!(args.interval_ms, 250);
			assert!(args.wait_for.is_none());
		}
		_ => panic!("Expected Navigate command"),
	}

	let result = Cli::try_parse_from(["devtools", "navigate", "https://example.com", "--no-wait", "--wait-for", "true"]);
	assert!(result.is_err());
}

#[test]
fn parse_send_with_params() {
	let args = vec!["devtools", "send", "Page.reload", "--params", r#"{"ignoreCache":true}"#];
	let cli = Cli::try_parse_from(args).unwrap();

	match cli.command {
		Commands::Send(args) => {
			assert_eq!(args.method, "Page.reload");
			assert_eq!(args.params.as_deref(), Some(r#"{"ignoreCache":true}"#));
		}
		_ => panic!("Expected Send command"),
	}
}

#[test]
fn screenshot_format_inferred_from_extension() {
	let cli = Cli::try_parse_from(["devtools", "screenshot", "/tmp/shot.JPG"]).unwrap();
	match cli.command {
		Commands::Screenshot(args) => {
			assert_eq!(args.path, PathBuf::from("/tmp/shot.JPG"));
			assert_eq!(args.resolved_format(), ImageFormat::Jpeg);
		}
		_ => panic!("Expected Screenshot command"),
	}

	let cli = Cli::try_parse_from(["devtools", "screenshot", "out.bin", "--image-format", "jpeg"]).unwrap();
	match cli.command {
		Commands::Screenshot(args) => assert_eq!(args.resolved_format(), ImageFormat::Jpeg),
		_ => panic!("Expected Screenshot command"),
	}

	let cli = Cli::try_parse_from(["devtools", "-f", "json", "screenshot", "out"]).unwrap();
	match cli.command {
		Commands::Screenshot(args) => assert_eq!(args.resolved_format(), ImageFormat::Png),
		_ => panic!("Expected Screenshot command"),
	}
}

#[test]
fn parse_listen_domains() {
	let cli = Cli::try_parse_from(["devtools", "listen"]).unwrap();
	match cli.command {
		Commands::Listen(args) => {
			assert_eq!(args.domains, vec!["Page".to_string()]);
			assert!(args.duration_ms.is_none());
		}
		_ => panic!("Expected Listen command"),
	}

	let cli = Cli::try_parse_from(["devtools", "listen", "-d", "Network", "--domain", "Runtime", "--duration-ms", "1000"])
		.unwrap();
	match cli.command {
		Commands::Listen(args) => {
			assert_eq!(args.domains, vec!["Network".to_string(), "Runtime".to_string()]);
			assert_eq!(args.duration_ms, Some(1000));
		}
		_ => panic!("Expected Listen command"),
	}
}

#[test]
fn parse_target_management() {
	let cli = Cli::try_parse_from(["devtools", "open"]).unwrap();
	assert!(matches!(cli.command, Commands::Open { url: None }));

	let cli = Cli::try_parse_from(["devtools", "close", "A1B2"]).unwrap();
	assert!(matches!(cli.command, Commands::Close { ref id } if id == "A1B2"));
	assert_eq!(cli.command.name(), "close");
}

#[test]
fn missing_required_argument_fails() {
	assert!(Cli::try_parse_from(["devtools", "eval"]).is_err());
	assert!(Cli::try_parse_from(["devtools", "--port", "notaport", "targets"]).is_err());
}

#[test]
fn command_definition_is_valid() {
	use clap::CommandFactory;
	Cli::command().debug_assert();
}
