//! Deployment settings.
//!
//! Settings come from an optional JSON file and are then overridden from the
//! environment:
//!
//! | Variable | Field |
//! |---|---|
//! | `RTCGATE_EXTENSION_ID` | [`Settings::extension_id`] |
//! | `RTCGATE_SESSION_ID_BASE` | [`Settings::session_id_base`] |

use std::path::Path;
use std::sync::Arc;

use rtcgate_protocol::DEFAULT_EXTENSION_ID;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::session::{SESSION_ID_BASE, SessionIdSequence};

pub const EXTENSION_ID_ENV: &str = "RTCGATE_EXTENSION_ID";
pub const SESSION_ID_BASE_ENV: &str = "RTCGATE_SESSION_ID_BASE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
	/// Screen-capture extension asked for desktop stream ids by default.
	pub extension_id: String,
	/// Session ids handed out start above this value.
	pub session_id_base: u64,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			extension_id: DEFAULT_EXTENSION_ID.to_string(),
			session_id_base: SESSION_ID_BASE,
		}
	}
}

impl Settings {
	/// Loads settings from a JSON file; missing fields keep their defaults.
	pub fn from_file(path: &Path) -> Result<Self> {
		let content = std::fs::read_to_string(path).map_err(|source| Error::SettingsIo {
			path: path.to_path_buf(),
			source,
		})?;
		let settings = Self::from_json_str(&content)?;
		debug!(target = "rtcgate.settings", path = %path.display(), "loaded settings file");
		Ok(settings)
	}

	pub fn from_json_str(json: &str) -> Result<Self> {
		let settings: Settings = serde_json::from_str(json)?;
		settings.validate()?;
		Ok(settings)
	}

	/// Applies `RTCGATE_*` overrides from the process environment.
	pub fn with_env_overrides(self) -> Result<Self> {
		self.with_overrides(|key| std::env::var(key).ok())
	}

	/// Applies overrides read through `lookup`.
	pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
	where
		F: Fn(&str) -> Option<String>,
	{
		if let Some(id) = lookup(EXTENSION_ID_ENV) {
			self.extension_id = id;
		}
		if let Some(base) = lookup(SESSION_ID_BASE_ENV) {
			self.session_id_base = base
				.trim()
				.parse()
				.map_err(|_| Error::InvalidSettings(format!("{SESSION_ID_BASE_ENV} must be an integer, got '{base}'")))?;
		}
		self.validate()?;
		Ok(self)
	}

	/// A fresh sequence seeded from these settings.
	pub fn session_sequence(&self) -> SessionIdSequence {
		SessionIdSequence::starting_at(self.session_id_base)
	}

	/// Sequence for a connection factory: the process-wide one at the default
	/// base, otherwise a fresh sequence seeded from `session_id_base`.
	pub fn connection_sequence(&self) -> Arc<SessionIdSequence> {
		if self.session_id_base == SESSION_ID_BASE {
			SessionIdSequence::shared()
		} else {
			Arc::new(self.session_sequence())
		}
	}

	fn validate(&self) -> Result<()> {
		if self.extension_id.trim().is_empty() {
			return Err(Error::InvalidSettings("extensionId must not be empty".into()));
		}
		if self.session_id_base == u64::MAX {
			return Err(Error::InvalidSettings("sessionIdBase leaves no session ids to allocate".into()));
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use std::io::Write;

	use super::*;

	#[test]
	fn defaults_use_well_known_values() {
		let settings = Settings::default();
		assert_eq!(settings.extension_id, DEFAULT_EXTENSION_ID);
		assert_eq!(settings.session_id_base, SESSION_ID_BASE);
		assert_eq!(settings.session_sequence().next(), Some(SESSION_ID_BASE + 1));
	}

	#[test]
	fn partial_file_keeps_defaults() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		write!(file, r#"{{"extensionId": "abcdefghijklmnop"}}"#).unwrap();

		let settings = Settings::from_file(file.path()).unwrap();
		assert_eq!(settings.extension_id, "abcdefghijklmnop");
		assert_eq!(settings.session_id_base, SESSION_ID_BASE);
	}

	#[test]
	fn missing_file_reports_path() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("absent.json");
		let err = Settings::from_file(&path).unwrap_err();
		assert!(matches!(err, Error::SettingsIo { .. }));
		assert!(err.to_string().contains("absent.json"));
	}

	#[test]
	fn empty_extension_id_is_rejected() {
		let err = Settings::from_json_str(r#"{"extensionId": "  "}"#).unwrap_err();
		assert!(matches!(err, Error::InvalidSettings(_)));
	}

	#[test]
	fn overrides_win_over_file_values() {
		let settings = Settings::from_json_str(r#"{"extensionId": "file", "sessionIdBase": 5}"#)
			.unwrap()
			.with_overrides(|key| match key {
				EXTENSION_ID_ENV => Some("env".into()),
				SESSION_ID_BASE_ENV => Some(" 900 ".into()),
				_ => None,
			})
			.unwrap();

		assert_eq!(settings.extension_id, "env");
		assert_eq!(settings.session_id_base, 900);
	}

	#[test]
	fn malformed_session_base_override_fails() {
		let err = Settings::default()
			.with_overrides(|key| (key == SESSION_ID_BASE_ENV).then(|| "lots".to_string()))
			.unwrap_err();
		assert!(err.to_string().contains("RTCGATE_SESSION_ID_BASE"));
	}

	#[test]
	fn connection_sequence_honours_custom_base() {
		let default = Settings::default();
		assert!(Arc::ptr_eq(&default.connection_sequence(), &SessionIdSequence::shared()));

		let custom = Settings {
			session_id_base: 7_000,
			..Default::default()
		};
		let sequence = custom.connection_sequence();
		assert!(!Arc::ptr_eq(&sequence, &SessionIdSequence::shared()));
		assert_eq!(sequence.next(), Some(7_001));
	}

	#[test]
	fn session_base_at_u64_max_is_rejected() {
		let err = Settings::default()
			.with_overrides(|key| (key == SESSION_ID_BASE_ENV).then(|| u64::MAX.to_string()))
			.unwrap_err();
		assert!(matches!(err, Error::InvalidSettings(_)));

		let json = format!(r#"{{"sessionIdBase": {}}}"#, u64::MAX);
		assert!(Settings::from_json_str(&json).is_err());

		let last_usable = Settings::default()
			.with_overrides(|key| (key == SESSION_ID_BASE_ENV).then(|| (u64::MAX - 1).to_string()))
			.unwrap();
		assert_eq!(last_usable.session_sequence().next(), Some(u64::MAX));
	}
}
