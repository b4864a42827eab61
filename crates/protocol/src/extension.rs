//! Message format for the screen-capture extension round-trip.
//!
//! The page sends [`StreamRequest`] to the extension by id; the extension runs
//! the desktop picker and answers with [`StreamResponse`]. A cancelled picker
//! answers with nothing at all, which the page reads as access denied.

use serde::{Deserialize, Serialize};

/// Well-known id of the hosted screen-capture extension.
///
/// Only usable against the deployment it was published for; production
/// setups configure their own id.
pub const DEFAULT_EXTENSION_ID: &str = "okeephmleflklcdebijnponpabbmmgeo";

/// Request sent from the page to the extension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamRequest {
	#[serde(default)]
	pub get_stream: bool,
}

impl StreamRequest {
	/// The only request the extension understands.
	pub const GET_STREAM: StreamRequest = StreamRequest { get_stream: true };
}

/// Reply sent from the extension back to the page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamResponse {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub stream_id: Option<String>,
}

impl StreamResponse {
	pub fn with_stream_id(id: impl Into<String>) -> Self {
		Self {
			stream_id: Some(id.into()),
		}
	}
}
