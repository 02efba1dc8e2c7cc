//! `Page` domain payloads.

use base64::Engine;
use serde::{Deserialize, Serialize};

/// Parameters for `Page.navigate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigateParams {
	pub url: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub referrer: Option<String>,
}

/// Result document of `Page.navigate`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigateResponse {
	pub frame_id: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub loader_id: Option<String>,
	/// Set when the navigation failed (e.g. `net::ERR_NAME_NOT_RESOLVED`)
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error_text: Option<String>,
}

/// Screenshot image format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScreenshotFormat {
	/// PNG format (lossless, supports transparency)
	#[default]
	Png,
	/// JPEG format (lossy compression, smaller file size)
	Jpeg,
	/// WebP format
	Webp,
}

impl ScreenshotFormat {
	pub fn extension(self) -> &'static str {
		match self {
			ScreenshotFormat::Png => "png",
			ScreenshotFormat::Jpeg => "jpg",
			ScreenshotFormat::Webp => "webp",
		}
	}
}

/// Parameters for `Page.captureScreenshot`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureScreenshotParams {
	pub format: ScreenshotFormat,
	/// Compression quality 0-100, jpeg and webp only
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub quality: Option<u8>,
}

/// Result document of `Page.captureScreenshot`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureScreenshotResponse {
	/// Image bytes as base64
	pub data: String,
}

impl CaptureScreenshotResponse {
	pub fn decode_data(&self) -> Result<Vec<u8>, base64::DecodeError> {
		base64::engine::general_purpose::STANDARD.decode(&self.data)
	}
}
