//! Caller-facing media request.

use serde::{Deserialize, Serialize};

use crate::constraints::{MediaStreamConstraints, TrackRequest};

/// Media request supplied by the caller.
///
/// Audio and video constraints sit at the top level next to the screen-capture
/// switches, so `{"audio": true, "video": true}` and
/// `{"screen": true, "extensionId": "..."}` both parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaConfig {
	#[serde(flatten)]
	pub constraints: MediaStreamConstraints,
	/// Request screen capture instead of camera/microphone.
	#[serde(default, skip_serializing_if = "std::ops::Not::not")]
	pub screen: bool,
	/// Pre-negotiated Chromium desktop stream id; skips the extension round-trip.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub desktop_stream_id: Option<String>,
	/// Extension to ask for a desktop stream id, overriding the configured default.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub extension_id: Option<String>,
}

impl MediaConfig {
	/// Camera and/or microphone request.
	pub fn user_media(audio: bool, video: bool) -> Self {
		Self {
			constraints: MediaStreamConstraints {
				audio: Some(TrackRequest::Enabled(audio)),
				video: Some(TrackRequest::Enabled(video)),
			},
			..Default::default()
		}
	}

	/// Screen-capture request with no track constraints.
	pub fn screen() -> Self {
		Self {
			screen: true,
			..Default::default()
		}
	}

	pub fn audio(&self) -> Option<&TrackRequest> {
		self.constraints.audio.as_ref()
	}

	pub fn video(&self) -> Option<&TrackRequest> {
		self.constraints.video.as_ref()
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn screen_request_parses_switches() {
		let config: MediaConfig = serde_json::from_value(json!({
			"screen": true,
			"desktopStreamId": "abc",
			"extensionId": "ext",
			"video": {"width": 640}
		}))
		.unwrap();

		assert!(config.screen);
		assert_eq!(config.desktop_stream_id.as_deref(), Some("abc"));
		assert_eq!(config.extension_id.as_deref(), Some("ext"));
		assert!(config.constraints.video_constraints().is_some());
		assert!(config.audio().is_none());
	}

	#[test]
	fn plain_request_omits_screen_switches() {
		let json = serde_json::to_value(MediaConfig::user_media(true, true)).unwrap();
		assert_eq!(json, json!({"audio": true, "video": true}));
	}
}
