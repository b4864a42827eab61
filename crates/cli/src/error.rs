use thiserror::Error;

use crate::output::{CommandError, ErrorCode};

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
	#[error("invalid {what} JSON: {source}")]
	InvalidJson {
		what: &'static str,
		#[source]
		source: serde_json::Error,
	},

	/// Negotiation reached the error callback.
	#[error("{source}")]
	Negotiation {
		#[source]
		source: rtcgate::MediaError,
		details: serde_json::Value,
	},

	#[error(transparent)]
	Core(#[from] rtcgate::Error),
}

impl CliError {
	pub fn code(&self) -> ErrorCode {
		match self {
			CliError::InvalidJson { .. } => ErrorCode::InvalidInput,
			CliError::Negotiation { source, .. } => match source {
				rtcgate::MediaError::ScreenAccessDenied => ErrorCode::ScreenAccessDenied,
				rtcgate::MediaError::PluginUnavailable => ErrorCode::PluginUnavailable,
				rtcgate::MediaError::Capability(_) => ErrorCode::CapabilityRejected,
			},
			CliError::Core(err) => match err {
				rtcgate::Error::UnsupportedRuntime(_) => ErrorCode::UnsupportedRuntime,
				rtcgate::Error::StackNotRegistered(_) | rtcgate::Error::StackConstruction { .. } => ErrorCode::StackUnavailable,
				rtcgate::Error::SessionIdsExhausted => ErrorCode::InternalError,
				rtcgate::Error::SettingsIo { .. } | rtcgate::Error::InvalidSettings(_) | rtcgate::Error::Json(_) => {
					ErrorCode::ConfigError
				}
			},
		}
	}

	pub fn to_command_error(&self) -> CommandError {
		let details = match self {
			CliError::Negotiation { source, details } => {
				let mut details = details.clone();
				if let Some(fields) = details.as_object_mut() {
					fields.insert("marker".into(), source.code().into());
				}
				Some(details)
			}
			CliError::Core(rtcgate::Error::UnsupportedRuntime(runtime)) => Some(serde_json::json!({ "runtime": runtime })),
			CliError::Core(rtcgate::Error::StackNotRegistered(family))
			| CliError::Core(rtcgate::Error::StackConstruction { family, .. }) => Some(serde_json::json!({ "family": family })),
			CliError::Core(rtcgate::Error::SettingsIo { path, .. }) => Some(serde_json::json!({ "path": path })),
			_ => None,
		};

		CommandError {
			code: self.code(),
			message: self.to_string(),
			details,
		}
	}
}

#[cfg(test)]
mod tests {
	use rtcgate::{CapabilityError, MediaError, RuntimeTag, StackFamily};
	use serde_json::json;

	use super::*;

	#[test]
	fn unsupported_runtime_carries_tag() {
		let err = CliError::from(rtcgate::Error::UnsupportedRuntime(RuntimeTag::None));
		let cmd = err.to_command_error();
		assert_eq!(cmd.code, ErrorCode::UnsupportedRuntime);
		assert_eq!(cmd.details, Some(json!({"runtime": "none"})));
	}

	#[test]
	fn missing_stack_is_unavailable() {
		let err = CliError::from(rtcgate::Error::StackNotRegistered(StackFamily::Firefox));
		assert_eq!(err.code(), ErrorCode::StackUnavailable);
	}

	#[test]
	fn negotiation_failures_keep_marker() {
		let err = CliError::Negotiation {
			source: MediaError::PluginUnavailable,
			details: json!({"extensionCalls": ["abc"]}),
		};
		let cmd = err.to_command_error();
		assert_eq!(cmd.code, ErrorCode::PluginUnavailable);
		assert_eq!(cmd.details.unwrap()["marker"], "no_plugin_present");

		let err = CliError::Negotiation {
			source: MediaError::Capability(CapabilityError::not_allowed("nope")),
			details: json!({}),
		};
		assert_eq!(err.code(), ErrorCode::CapabilityRejected);
	}

	#[test]
	fn exhausted_ids_are_internal() {
		let err = CliError::from(rtcgate::Error::SessionIdsExhausted);
		assert_eq!(err.code(), ErrorCode::InternalError);
		assert!(err.to_command_error().details.is_none());
	}

	#[test]
	fn settings_errors_are_config_errors() {
		let err = CliError::from(rtcgate::Error::InvalidSettings("bad".into()));
		assert_eq!(err.code(), ErrorCode::ConfigError);
	}
}
