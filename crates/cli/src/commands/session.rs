use devtools_runtime::{ClientOptions, CommandClient, DevToolsHttp};

use crate::config::Settings;
use crate::error::Result;

pub fn discovery(settings: &Settings) -> Result<DevToolsHttp> {
	Ok(DevToolsHttp::new(&settings.host, settings.port, settings.timeout)?)
}

/// WebSocket endpoint of the selected page: `--ws`, else `--target`, else the first page.
pub async fn page_endpoint(settings: &Settings) -> Result<String> {
	if let Some(ws) = &settings.ws {
		return Ok(ws.clone());
	}
	let endpoint = discovery(settings)?.page_websocket_url(settings.target.as_deref()).await?;
	tracing::debug!(%endpoint, "resolved page endpoint");
	Ok(endpoint)
}

/// Connects to the selected page with the configured command timeout.
pub async fn connect_page(settings: &Settings, options: ClientOptions) -> Result<CommandClient> {
	let endpoint = page_endpoint(settings).await?;
	let options = options.with_command_timeout(settings.timeout);
	Ok(CommandClient::connect(endpoint, options).await?)
}
