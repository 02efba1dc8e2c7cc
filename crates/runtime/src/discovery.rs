//! HTTP target discovery on a remote debugging port.
//!
//! A browser started with `--remote-debugging-port` serves a small JSON API
//! next to its WebSocket endpoints:
//!
//! | route | method | result |
//! |-------|--------|--------|
//! | `/json/version` | GET | [`BrowserVersion`] |
//! | `/json/list` | GET | `[TargetInfo]` |
//! | `/json/new?<url>` | PUT | the new [`TargetInfo`] |
//! | `/json/activate/<id>` | GET | plain text |
//! | `/json/close/<id>` | GET | plain text |

use std::time::Duration;

use devtools_protocol::{BrowserVersion, TargetInfo};
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 9222;

/// Client for a browser's discovery routes.
#[derive(Debug, Clone)]
pub struct DevToolsHttp {
	base: Url,
	http: reqwest::Client,
}

impl DevToolsHttp {
	pub fn new(host: &str, port: u16, timeout: Duration) -> Result<Self> {
		let host = if host.contains(':') && !host.starts_with('[') {
			format!("[{host}]")
		} else {
			host.to_string()
		};
		Self::from_base_url(&format!("http://{host}:{port}"), timeout)
	}

	/// Uses `base` (e.g. `http://127.0.0.1:9222`) as the route prefix.
	pub fn from_base_url(base: &str, timeout: Duration) -> Result<Self> {
		let base = Url::parse(base).map_err(|e| Error::Discovery(format!("invalid base url '{base}': {e}")))?;
		let http = reqwest::Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| Error::Discovery(format!("Failed to create HTTP client: {e}")))?;
		Ok(Self { base, http })
	}

	pub fn base_url(&self) -> &str {
		self.base.as_str().trim_end_matches('/')
	}

	fn url(&self, path: &str) -> Result<Url> {
		self.base
			.join(path)
			.map_err(|e| Error::Discovery(format!("invalid route '{path}': {e}")))
	}

	async fn request(&self, method: Method, url: Url) -> Result<reqwest::Response> {
		tracing::debug!(%method, %url, "discovery request");
		let response = self
			.http
			.request(method, url.clone())
			.send()
			.await
			.map_err(|e| Error::Discovery(format!("{url}: {e}")))?;

		match response.status() {
			status if status.is_success() => Ok(response),
			StatusCode::NOT_FOUND => {
				let body = response.text().await.unwrap_or_default();
				Err(Error::Discovery(format!("{url}: not found {}", body.trim())))
			}
			status => Err(Error::Discovery(format!("{url}: unexpected status {status}"))),
		}
	}

	async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
		let response = self.request(Method::GET, self.url(path)?).await?;
		Ok(response.json().await?)
	}

	/// Browser build and protocol version.
	pub async fn version(&self) -> Result<BrowserVersion> {
		self.get_json("/json/version").await
	}

	/// Every inspectable target (pages, workers, extensions).
	pub async fn targets(&self) -> Result<Vec<TargetInfo>> {
		self.get_json("/json/list").await
	}

	/// Opens a new tab, on `url` or `about:blank`.
	pub async fn new_target(&self, url: Option<&str>) -> Result<TargetInfo> {
		let mut route = self.url("/json/new")?;
		// The whole query is the target url; it is not a key=value pair.
		route.set_query(url);
		let response = self.request(Method::PUT, route).await?;
		let target: TargetInfo = response.json().await?;
		tracing::info!(id = %target.id, url = %target.url, "opened target");
		Ok(target)
	}

	pub async fn activate_target(&self, id: &str) -> Result<()> {
		self.request(Method::GET, self.url(&format!("/json/activate/{id}"))?).await?;
		Ok(())
	}

	pub async fn close_target(&self, id: &str) -> Result<()> {
		self.request(Method::GET, self.url(&format!("/json/close/{id}"))?).await?;
		tracing::info!(id, "closed target");
		Ok(())
	}

	/// Browser-level WebSocket endpoint from `/json/version`.
	pub async fn browser_websocket_url(&self) -> Result<String> {
		self.version()
			.await?
			.web_socket_debugger_url
			.ok_or_else(|| Error::Discovery("browser did not report a webSocketDebuggerUrl".into()))
	}

	/// WebSocket endpoint of target `id`, or of the first page target.
	pub async fn page_websocket_url(&self, id: Option<&str>) -> Result<String> {
		let targets = self.targets().await?;
		let target = match id {
			Some(id) => targets
				.into_iter()
				.find(|target| target.id == id)
				.ok_or_else(|| Error::Discovery(format!("no target with id '{id}'")))?,
			None => targets
				.into_iter()
				.find(TargetInfo::is_page)
				.ok_or_else(|| Error::Discovery("no page target available".into()))?,
		};
		target.web_socket_debugger_url.ok_or_else(|| {
			Error::Discovery(format!(
				"target '{}' has no webSocketDebuggerUrl (is another client attached?)",
				target.id
			))
		})
	}
}
