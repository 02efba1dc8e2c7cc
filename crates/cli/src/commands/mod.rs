//! Command implementations and dispatch.
//!
//! Discovery commands (`version`, `targets`, `open`, `close`, `activate`)
//! only use the HTTP routes; page commands attach a [`CommandClient`] to the
//! selected target for the duration of one command.
//!
//! [`CommandClient`]: devtools_runtime::CommandClient

mod listen;
mod page;
mod session;
mod targets;

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::cli::Commands;
use crate::config::Settings;
use crate::error::Result;
use crate::output::{self, ResultBuilder};

/// Data produced by one command plus how long it spent polling.
#[derive(Debug)]
pub struct CommandOutcome<T> {
	pub data: T,
	pub wait: Option<Duration>,
}

impl<T> CommandOutcome<T> {
	pub fn new(data: T) -> Self {
		Self { data, wait: None }
	}

	pub fn with_wait(mut self, wait: Duration) -> Self {
		self.wait = Some(wait);
		self
	}
}

pub async fn dispatch(command: Commands, settings: &Settings) -> Result<()> {
	let name = command.name();
	let started = Instant::now();
	tracing::debug!(command = name, host = %settings.host, port = settings.port, "dispatching");

	match command {
		Commands::Version => emit(name, started, settings, CommandOutcome::new(targets::version(settings).await?)),
		Commands::Targets => emit(name, started, settings, CommandOutcome::new(targets::list(settings).await?)),
		Commands::Open { url } => emit(name, started, settings, CommandOutcome::new(targets::open(settings, url.as_deref()).await?)),
		Commands::Close { id } => emit(name, started, settings, CommandOutcome::new(targets::close(settings, id).await?)),
		Commands::Activate { id } => emit(name, started, settings, CommandOutcome::new(targets::activate(settings, id).await?)),
		Commands::Eval(args) => emit(name, started, settings, CommandOutcome::new(page::eval(settings, args).await?)),
		Commands::Navigate(args) => emit(name, started, settings, page::navigate(settings, args).await?),
		Commands::Send(args) => emit(name, started, settings, CommandOutcome::new(page::send(settings, args).await?)),
		Commands::Screenshot(args) => emit(name, started, settings, CommandOutcome::new(page::screenshot(settings, args).await?)),
		Commands::Listen(args) => emit(name, started, settings, CommandOutcome::new(listen::execute(settings, args).await?)),
	}
	Ok(())
}

fn emit<T: Serialize>(name: &str, started: Instant, settings: &Settings, outcome: CommandOutcome<T>) {
	let mut builder = ResultBuilder::started_at(name, started).data(outcome.data);
	if let Some(wait) = outcome.wait {
		builder = builder.waited(wait);
	}
	output::print_result(&builder.build(), settings.format);
}
