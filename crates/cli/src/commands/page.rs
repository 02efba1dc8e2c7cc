//! Commands that attach to a page target.

use std::time::{Duration, Instant};

use devtools_protocol::ScreenshotFormat;
use devtools_runtime::{ClientOptions, CommandClient, Page, PollOptions};
use serde_json::Value;

use super::CommandOutcome;
use super::session::connect_page;
use crate::cli::{EvalArgs, NavigateArgs, ScreenshotArgs, SendArgs};
use crate::config::Settings;
use crate::error::{CliError, Result};
use crate::output::{EvalData, NavigateData, ScreenshotData, SendData};

/// Runs `f` against a fresh connection and closes it on every path.
async fn with_client<T>(
	settings: &Settings,
	f: impl AsyncFnOnce(&CommandClient) -> Result<T>,
) -> Result<T> {
	let client = connect_page(settings, ClientOptions::default()).await?;
	let result = f(&client).await;
	client.close().await;
	result
}

pub async fn eval(settings: &Settings, args: EvalArgs) -> Result<EvalData> {
	let value = with_client(settings, async |client| Ok(Page::new(client).evaluate(&args.expression).await?)).await?;
	Ok(EvalData {
		expression: args.expression,
		value,
	})
}

pub async fn navigate(settings: &Settings, args: NavigateArgs) -> Result<CommandOutcome<NavigateData>> {
	let poll = PollOptions::new(Duration::from_millis(args.interval_ms), settings.timeout);

	with_client(settings, async |client| {
		let page = Page::new(client);
		let response = page.navigate(&args.url).await?;

		let wait_started = Instant::now();
		let condition_value = match (&args.wait_for, args.no_wait) {
			(_, true) => None,
			(Some(expression), false) => Some(page.wait_for_expression(expression, poll).await?),
			(None, false) => {
				page.wait_for_load(poll).await?;
				None
			}
		};
		let waited = wait_started.elapsed();

		let data = NavigateData {
			url: args.url.clone(),
			actual_url: page.url().await.ok().filter(|actual| *actual != args.url),
			title: page.title().await.unwrap_or_default(),
			frame_id: response.frame_id,
			condition_value,
		};
		let outcome = CommandOutcome::new(data);
		Ok(if args.no_wait { outcome } else { outcome.with_wait(waited) })
	})
	.await
}

/// Parses `--params`; absent means `{}`.
pub fn parse_params(raw: Option<&str>) -> Result<Value> {
	let Some(raw) = raw else {
		return Ok(Value::Object(Default::default()));
	};
	match serde_json::from_str::<Value>(raw) {
		Ok(value @ Value::Object(_)) => Ok(value),
		Ok(other) => Err(CliError::InvalidInput(format!("--params must be a JSON object, got {other}"))),
		Err(e) => Err(CliError::InvalidInput(format!("--params is not valid JSON: {e}"))),
	}
}

pub async fn send(settings: &Settings, args: SendArgs) -> Result<SendData> {
	let params = parse_params(args.params.as_deref())?;
	let result = with_client(settings, async |client| Ok(client.call(&args.method, params).await?)).await?;
	Ok(SendData {
		method: args.method,
		result,
	})
}

pub async fn screenshot(settings: &Settings, args: ScreenshotArgs) -> Result<ScreenshotData> {
	let format: ScreenshotFormat = args.resolved_format().into();
	let bytes = with_client(settings, async |client| Ok(Page::new(client).screenshot(format).await?)).await?;

	tokio::fs::write(&args.path, &bytes).await.map_err(|source| CliError::Write {
		path: args.path.clone(),
		source,
	})?;
	tracing::info!(path = %args.path.display(), bytes = bytes.len(), "saved screenshot");

	Ok(ScreenshotData {
		path: args.path,
		format: format.extension().to_string(),
		size_bytes: bytes.len() as u64,
	})
}
