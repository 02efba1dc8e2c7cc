//! Documents served by the endpoint's HTTP discovery routes.

use serde::{Deserialize, Serialize};

/// `/json/version` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowserVersion {
	#[serde(rename = "Browser")]
	pub browser: String,
	#[serde(rename = "Protocol-Version", default)]
	pub protocol_version: Option<String>,
	#[serde(rename = "User-Agent", default)]
	pub user_agent: Option<String>,
	#[serde(rename = "V8-Version", default, skip_serializing_if = "Option::is_none")]
	pub v8_version: Option<String>,
	/// Browser-level WebSocket endpoint
	#[serde(rename = "webSocketDebuggerUrl", default)]
	pub web_socket_debugger_url: Option<String>,
}

/// One entry of `/json/list` (also returned by `/json/new`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetInfo {
	pub id: String,
	/// `page`, `iframe`, `service_worker`, `background_page`, ...
	#[serde(rename = "type")]
	pub kind: String,
	#[serde(default)]
	pub title: String,
	#[serde(default)]
	pub url: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	/// Absent while another client is attached to the target
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub web_socket_debugger_url: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub devtools_frontend_url: Option<String>,
}

impl TargetInfo {
	pub fn is_page(&self) -> bool {
		self.kind == "page"
	}
}
