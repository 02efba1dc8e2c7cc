//! `listen`: stream protocol events as they arrive.

use std::io::Write;
use std::time::Duration;

use devtools_runtime::{ClientOptions, Page};
use tokio::time::Instant;

use super::session::connect_page;
use crate::cli::ListenArgs;
use crate::config::Settings;
use crate::error::Result;
use crate::output::{self, ListenData};

pub async fn execute(settings: &Settings, args: ListenArgs) -> Result<ListenData> {
	let (options, mut events) = ClientOptions::default().event_channel();
	let client = connect_page(settings, options).await?;

	let page = Page::new(&client);
	for domain in &args.domains {
		if let Err(e) = page.enable(domain).await {
			client.close().await;
			return Err(e.into());
		}
	}
	tracing::info!(domains = ?args.domains, "listening");

	let deadline = args.duration_ms.map(|ms| Instant::now() + Duration::from_millis(ms));
	let elapsed = async {
		match deadline {
			Some(deadline) => tokio::time::sleep_until(deadline).await,
			None => std::future::pending().await,
		}
	};
	let interrupted = tokio::signal::ctrl_c();
	let disconnected = client.closed();
	tokio::pin!(elapsed, interrupted, disconnected);

	let mut count = 0u64;
	let mut stdout = std::io::stdout();
	let stopped_by = loop {
		tokio::select! {
			Some(event) = events.recv() => {
				output::write_event(&mut stdout.lock(), &event, settings.format)?;
				count += 1;
			}
			_ = &mut elapsed => break "duration",
			_ = &mut interrupted => break "interrupted",
			_ = &mut disconnected => break "disconnected",
		}
	};

	// Events that were already queued when the loop stopped.
	while let Ok(event) = events.try_recv() {
		output::write_event(&mut stdout.lock(), &event, settings.format)?;
		count += 1;
	}
	stdout.flush()?;

	client.close().await;
	Ok(ListenData {
		domains: args.domains,
		events: count,
		stopped_by: stopped_by.to_string(),
	})
}
