use clap::Parser;
use devtools_cli::cli::Cli;
use devtools_cli::config::{self, Settings};
use devtools_cli::error::CliError;
use devtools_cli::output::{self, CommandResult, OutputFormat, ResultBuilder};
use devtools_cli::{commands, logging};

#[tokio::main]
async fn main() {
	let cli = Cli::parse();
	logging::init_logging(cli.verbose);

	let command = cli.command.name();
	let requested_format = cli.format.unwrap_or_default();

	let file = match config::load_config(cli.config.as_deref()) {
		Ok(file) => file,
		Err(err) => fail(command, CliError::InvalidInput(format!("{err:#}")), requested_format),
	};
	let settings = match Settings::from_env(&cli, &file) {
		Ok(settings) => settings,
		Err(err) => fail(command, err, requested_format),
	};

	if let Err(err) = commands::dispatch(cli.command, &settings).await {
		fail(command, err, settings.format);
	}
}

fn fail(command: &str, err: CliError, format: OutputFormat) -> ! {
	let cmd_error = err.to_command_error();

	// Always print to stderr for humans
	output::print_error_stderr(&cmd_error);

	// The JSON envelope goes to stdout for scripts
	if format == OutputFormat::Json {
		let result: CommandResult<()> = ResultBuilder::new(command).error(cmd_error).build();
		output::print_result(&result, format);
	}
	std::process::exit(1);
}
