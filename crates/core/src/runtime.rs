//! Runtime identification.
//!
//! Classifies the hosting environment into one [`RuntimeTag`]. Detection reads
//! the environment through a [`HostProbe`] so the classification itself stays
//! pure: `classify_user_agent` only ever sees a string.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::stack::StackFamily;

/// Discrete classification of the hosting browser or environment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuntimeTag {
	/// Non-browser host (native process, test harness, server-side client).
	Fake,
	/// Firefox.
	Mozilla,
	/// Chrome and other Chromium browsers.
	ChromeStable,
	/// Chromium embedded in Electron.
	Electron,
	/// Safari and other WebKit browsers.
	Safari,
	/// Unrecognised browser.
	None,
}

impl RuntimeTag {
	pub const ALL: [RuntimeTag; 6] = [
		RuntimeTag::Fake,
		RuntimeTag::Mozilla,
		RuntimeTag::ChromeStable,
		RuntimeTag::Electron,
		RuntimeTag::Safari,
		RuntimeTag::None,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			RuntimeTag::Fake => "fake",
			RuntimeTag::Mozilla => "mozilla",
			RuntimeTag::ChromeStable => "chrome-stable",
			RuntimeTag::Electron => "electron",
			RuntimeTag::Safari => "safari",
			RuntimeTag::None => "none",
		}
	}

	/// Adapter family serving this runtime.
	///
	/// Safari deliberately reuses the Firefox family; Chrome and Electron share
	/// the Chromium family.
	pub fn stack_family(self) -> Option<StackFamily> {
		match self {
			RuntimeTag::Fake => Some(StackFamily::Fake),
			RuntimeTag::Mozilla | RuntimeTag::Safari => Some(StackFamily::Firefox),
			RuntimeTag::ChromeStable | RuntimeTag::Electron => Some(StackFamily::ChromeStable),
			RuntimeTag::None => None,
		}
	}

	/// Whether this is a real browser (anything but the non-browser host).
	pub fn is_browser(self) -> bool {
		self != RuntimeTag::Fake
	}
}

impl fmt::Display for RuntimeTag {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for RuntimeTag {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		RuntimeTag::ALL
			.into_iter()
			.find(|tag| tag.as_str() == s)
			.ok_or_else(|| format!("unknown runtime: {s}"))
	}
}

/// Read-only view of the hosting environment.
pub trait HostProbe {
	/// True when running outside any browser.
	fn is_headless(&self) -> bool;

	/// The environment's identifying string (`navigator.userAgent`).
	fn user_agent(&self) -> Option<String>;
}

impl<P: HostProbe + ?Sized> HostProbe for &P {
	fn is_headless(&self) -> bool {
		(**self).is_headless()
	}

	fn user_agent(&self) -> Option<String> {
		(**self).user_agent()
	}
}

/// Host with a fixed identity, for native processes and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticHost {
	user_agent: Option<String>,
	headless: bool,
}

impl StaticHost {
	/// A browser identifying itself with `user_agent`.
	pub fn browser(user_agent: impl Into<String>) -> Self {
		Self {
			user_agent: Some(user_agent.into()),
			headless: false,
		}
	}

	/// A non-browser host.
	pub fn headless() -> Self {
		Self {
			user_agent: None,
			headless: true,
		}
	}
}

impl HostProbe for StaticHost {
	fn is_headless(&self) -> bool {
		self.headless
	}

	fn user_agent(&self) -> Option<String> {
		self.user_agent.clone()
	}
}

/// Classifies a browser user agent. Matching is case-sensitive, first hit wins.
pub fn classify_user_agent(user_agent: &str) -> RuntimeTag {
	if user_agent.contains("Firefox") {
		RuntimeTag::Mozilla
	} else if user_agent.contains("Chrome") {
		if user_agent.contains("Electron") {
			RuntimeTag::Electron
		} else {
			RuntimeTag::ChromeStable
		}
	} else if user_agent.contains("Safari") || user_agent.contains("AppleWebKit") {
		RuntimeTag::Safari
	} else {
		RuntimeTag::None
	}
}

/// Detects the runtime of `probe`. Never fails; unknown hosts are `None`.
pub fn detect_runtime(probe: &impl HostProbe) -> RuntimeTag {
	if probe.is_headless() {
		return RuntimeTag::Fake;
	}
	let tag = probe
		.user_agent()
		.map_or(RuntimeTag::None, |ua| classify_user_agent(&ua));
	tracing::trace!(target = "rtcgate.runtime", runtime = %tag, "runtime detected");
	tag
}
