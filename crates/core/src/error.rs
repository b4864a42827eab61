//! Error types for connection building and configuration.
//!
//! Media negotiation failures are not here: they are delivered to the caller
//! as [`MediaError`](crate::media::MediaError) values, never returned early.

use std::path::PathBuf;

use thiserror::Error;

use crate::runtime::RuntimeTag;
use crate::stack::{StackError, StackFamily};

/// Result type alias for rtcgate operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised synchronously by the connection factory and settings loader.
#[derive(Debug, Error)]
pub enum Error {
	/// No capability adapter exists for the detected runtime.
	#[error("WebRTC stack not available for runtime '{0}'")]
	UnsupportedRuntime(RuntimeTag),

	/// The runtime maps to an adapter family nobody registered a builder for.
	#[error("no {0} stack registered")]
	StackNotRegistered(StackFamily),

	/// The adapter builder itself failed.
	#[error("failed to construct {family} stack: {source}")]
	StackConstruction {
		family: StackFamily,
		#[source]
		source: StackError,
	},

	/// Every session id of the sequence has been handed out.
	#[error("session id sequence exhausted")]
	SessionIdsExhausted,

	/// Settings file could not be read.
	#[error("failed to read settings from {path}: {source}")]
	SettingsIo {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	/// Settings value is malformed.
	#[error("invalid settings: {0}")]
	InvalidSettings(String),

	#[error(transparent)]
	Json(#[from] serde_json::Error),
}

impl Error {
	/// Returns true when the host runtime has no usable stack at all.
	pub fn is_unsupported_runtime(&self) -> bool {
		matches!(self, Error::UnsupportedRuntime(_))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn unsupported_runtime_message_names_the_tag() {
		let err = Error::UnsupportedRuntime(RuntimeTag::None);
		assert_eq!(err.to_string(), "WebRTC stack not available for runtime 'none'");
		assert!(err.is_unsupported_runtime());
	}

	#[test]
	fn construction_error_keeps_source() {
		let err = Error::StackConstruction {
			family: StackFamily::Firefox,
			source: StackError::Failed("no RTCPeerConnection".into()),
		};
		assert!(!err.is_unsupported_runtime());
		assert_eq!(
			err.to_string(),
			"failed to construct firefox stack: stack operation failed: no RTCPeerConnection"
		);
	}
}
