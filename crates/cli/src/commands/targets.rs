//! Commands served by the discovery routes alone.

use devtools_protocol::{BrowserVersion, TargetInfo};

use super::session::discovery;
use crate::config::Settings;
use crate::error::Result;
use crate::output::TargetActionData;

pub async fn version(settings: &Settings) -> Result<BrowserVersion> {
	Ok(discovery(settings)?.version().await?)
}

pub async fn list(settings: &Settings) -> Result<Vec<TargetInfo>> {
	Ok(discovery(settings)?.targets().await?)
}

pub async fn open(settings: &Settings, url: Option<&str>) -> Result<TargetInfo> {
	Ok(discovery(settings)?.new_target(url).await?)
}

pub async fn close(settings: &Settings, id: String) -> Result<TargetActionData> {
	discovery(settings)?.close_target(&id).await?;
	Ok(TargetActionData {
		id,
		action: "closed".into(),
	})
}

pub async fn activate(settings: &Settings, id: String) -> Result<TargetActionData> {
	discovery(settings)?.activate_target(&id).await?;
	Ok(TargetActionData {
		id,
		action: "activated".into(),
	})
}
