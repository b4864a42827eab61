//! Connection configuration and session descriptions.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Configuration record for one peer connection.
///
/// `session_id` is assigned by the connection factory; callers leave it unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionSpec {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub session_id: Option<u64>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub ice_servers: Vec<IceServer>,
	#[serde(default)]
	pub audio: bool,
	#[serde(default)]
	pub video: bool,
	#[serde(default)]
	pub data: bool,
	/// Audio bandwidth ceiling in kbps.
	#[serde(default, rename = "maxAudioBW", skip_serializing_if = "Option::is_none")]
	pub max_audio_bw: Option<u32>,
	/// Video bandwidth ceiling in kbps.
	#[serde(default, rename = "maxVideoBW", skip_serializing_if = "Option::is_none")]
	pub max_video_bw: Option<u32>,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

/// STUN/TURN server entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IceServer {
	pub urls: IceUrls,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub username: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub credential: Option<String>,
}

/// One URL or a list of URLs, as browsers accept both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IceUrls {
	One(String),
	Many(Vec<String>),
}

impl IceUrls {
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		let urls: &[String] = match self {
			IceUrls::One(url) => std::slice::from_ref(url),
			IceUrls::Many(urls) => urls,
		};
		urls.iter().map(String::as_str)
	}
}

/// SDP description type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SdpType {
	Offer,
	Answer,
}

/// Session description exchanged with the remote peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDescription {
	#[serde(rename = "type")]
	pub sdp_type: SdpType,
	pub sdp: String,
}
