//! Media constraint records handed to the host capability API.
//!
//! A track request is either a plain flag (`audio: true`) or a constraints
//! object. Chromium's legacy screen capture reads a `mandatory` block, Firefox
//! reads `mediaSource`; everything else is passed through untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Constraints record accepted by the capability API (`getUserMedia`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaStreamConstraints {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub audio: Option<TrackRequest>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub video: Option<TrackRequest>,
}

impl MediaStreamConstraints {
	/// Video-only constraints.
	pub fn video(constraints: TrackConstraints) -> Self {
		Self {
			audio: None,
			video: Some(TrackRequest::Constraints(constraints)),
		}
	}

	/// Returns the video constraints object, if video was requested as one.
	pub fn video_constraints(&self) -> Option<&TrackConstraints> {
		match &self.video {
			Some(TrackRequest::Constraints(c)) => Some(c),
			_ => None,
		}
	}
}

/// A single track request: a flag or a constraints object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TrackRequest {
	Enabled(bool),
	Constraints(TrackConstraints),
}

impl TrackRequest {
	/// Returns the object form of this request.
	///
	/// A flag carries no constraints, so it yields an empty object.
	pub fn constraints(&self) -> TrackConstraints {
		match self {
			TrackRequest::Enabled(_) => TrackConstraints::default(),
			TrackRequest::Constraints(c) => c.clone(),
		}
	}

	/// Whether the request carries a `mandatory` block.
	pub fn has_mandatory(&self) -> bool {
		matches!(self, TrackRequest::Constraints(c) if c.mandatory.is_some())
	}
}

impl From<bool> for TrackRequest {
	fn from(enabled: bool) -> Self {
		TrackRequest::Enabled(enabled)
	}
}

impl From<TrackConstraints> for TrackRequest {
	fn from(constraints: TrackConstraints) -> Self {
		TrackRequest::Constraints(constraints)
	}
}

/// Constraints object for one track.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackConstraints {
	/// Legacy Chromium constraint block used for screen and desktop capture.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub mandatory: Option<MandatoryConstraints>,
	/// Firefox screen-capture source selector.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub media_source: Option<MediaSource>,
	/// Any other constraint (width, frameRate, deviceId, ...).
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

impl TrackConstraints {
	/// Returns the `mandatory` block, creating an empty one when absent.
	pub fn mandatory_mut(&mut self) -> &mut MandatoryConstraints {
		self.mandatory.get_or_insert_with(MandatoryConstraints::default)
	}
}

/// Chromium `mandatory` constraint block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MandatoryConstraints {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub chrome_media_source: Option<ChromeMediaSource>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub chrome_media_source_id: Option<String>,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

/// Value of `mandatory.chromeMediaSource`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChromeMediaSource {
	/// Whole-screen capture (Electron).
	Screen,
	/// Desktop capture keyed by an extension-issued stream id.
	Desktop,
	/// Any other source (`tab`, `system`, ...), passed through as written.
	#[serde(untagged)]
	Other(String),
}

/// Value of Firefox's `mediaSource` video constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaSource {
	Window,
	Screen,
	/// `browser`, `application`, `camera` and future values.
	#[serde(untagged)]
	Other(String),
}
