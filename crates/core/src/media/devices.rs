//! Host capability API for camera, microphone, and screen acquisition.

use async_trait::async_trait;
use rtcgate_protocol::MediaStreamConstraints;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejection raised by the host capability API.
///
/// Mirrors a DOM exception: `name` is the machine-readable kind
/// (`NotAllowedError`, `NotFoundError`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{name}: {message}")]
pub struct CapabilityError {
	pub name: String,
	pub message: String,
}

impl CapabilityError {
	pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			message: message.into(),
		}
	}

	/// The user or policy refused access.
	pub fn not_allowed(message: impl Into<String>) -> Self {
		Self::new("NotAllowedError", message)
	}
}

/// Media acquisition capability (`navigator.mediaDevices`).
///
/// One call is one single-shot acquisition; the host resolves or rejects it
/// exactly once.
#[async_trait(?Send)]
pub trait MediaDevices {
	/// Handle to an acquired media stream.
	type Stream;

	async fn get_user_media(&self, constraints: &MediaStreamConstraints) -> Result<Self::Stream, CapabilityError>;
}
