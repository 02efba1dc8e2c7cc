//! Typed helpers for the `Page` and `Runtime` domains.

use devtools_protocol::{
	CaptureScreenshotParams, CaptureScreenshotResponse, EvaluateParams, EvaluateResponse, NavigateParams,
	NavigateResponse, ScreenshotFormat,
};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::connection::CommandClient;
use crate::error::{Error, Result};
use crate::poll::PollOptions;

const READY_STATE_COMPLETE: &str = "document.readyState === 'complete'";

/// A page session driven through a [`CommandClient`].
#[derive(Debug, Clone, Copy)]
pub struct Page<'a> {
	client: &'a CommandClient,
}

impl<'a> Page<'a> {
	pub fn new(client: &'a CommandClient) -> Self {
		Self { client }
	}

	pub fn client(&self) -> &'a CommandClient {
		self.client
	}

	/// Sends `<domain>.enable`.
	pub async fn enable(&self, domain: &str) -> Result<()> {
		self.client.call(&format!("{domain}.enable"), json!({})).await?;
		Ok(())
	}

	/// Starts a navigation. Does not wait for the load; see [`wait_for_load`](Self::wait_for_load).
	pub async fn navigate(&self, url: &str) -> Result<NavigateResponse> {
		let params = NavigateParams {
			url: url.to_string(),
			referrer: None,
		};
		let response: NavigateResponse = self.client.invoke("Page.navigate", &params).await?;
		if let Some(reason) = response.error_text.as_deref().filter(|text| !text.is_empty()) {
			return Err(Error::Navigation {
				url: url.to_string(),
				reason: reason.to_string(),
			});
		}
		tracing::debug!(url, frame_id = %response.frame_id, "navigation started");
		Ok(response)
	}

	/// Evaluates `expression` by value, awaiting promises.
	///
	/// A thrown exception becomes [`Error::Evaluation`]; `undefined` becomes `null`.
	pub async fn evaluate(&self, expression: &str) -> Result<Value> {
		let response: EvaluateResponse = self
			.client
			.invoke("Runtime.evaluate", &EvaluateParams::by_value(expression))
			.await?;
		if let Some(details) = response.exception_details {
			return Err(Error::Evaluation(details.message()));
		}
		Ok(response.result.into_value())
	}

	pub async fn evaluate_as<T: DeserializeOwned>(&self, expression: &str) -> Result<T> {
		let value = self.evaluate(expression).await?;
		serde_json::from_value(value).map_err(|e| Error::ProtocolError(format!("unexpected value of `{expression}`: {e}")))
	}

	/// Polls `expression` until it evaluates to a truthy value and returns that value.
	///
	/// A throwing evaluation counts as "not yet" (the page may still be
	/// loading the script it references).
	pub async fn wait_for_expression(&self, expression: &str, options: PollOptions) -> Result<Value> {
		let params = serde_json::to_value(EvaluateParams::by_value(expression))?;
		let response: EvaluateResponse = self
			.client
			.poll(
				"Runtime.evaluate",
				params,
				|response: &EvaluateResponse| response.exception_details.is_none() && response.result.is_truthy(),
				options,
			)
			.await?;
		Ok(response.result.into_value())
	}

	/// Waits for `document.readyState` to reach `complete`.
	pub async fn wait_for_load(&self, options: PollOptions) -> Result<()> {
		self.wait_for_expression(READY_STATE_COMPLETE, options).await?;
		Ok(())
	}

	pub async fn title(&self) -> Result<String> {
		self.evaluate_as("document.title").await
	}

	pub async fn url(&self) -> Result<String> {
		self.evaluate_as("location.href").await
	}

	/// Captures the viewport and returns the decoded image bytes.
	pub async fn screenshot(&self, format: ScreenshotFormat) -> Result<Vec<u8>> {
		let params = CaptureScreenshotParams { format, quality: None };
		let response: CaptureScreenshotResponse = self.client.invoke("Page.captureScreenshot", &params).await?;
		response
			.decode_data()
			.map_err(|e| Error::ProtocolError(format!("screenshot data is not base64: {e}")))
	}
}
