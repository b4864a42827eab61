//! Media acquisition negotiation.
//!
//! Turns a caller's [`MediaConfig`] into one call of the host capability API.
//! Camera and microphone requests are forwarded as-is; screen capture is first
//! reshaped for the runtime and, on Chrome without a pre-negotiated stream id,
//! preceded by a round-trip to the screen-capture extension.
//!
//! ```text
//! Idle → ConfigBuilt → [ExtensionRoundTrip] → CapabilityCallIssued → Acquired | Failed
//! ```
//!
//! Two branches end without an answer: camera/microphone on a non-browser host
//! and screen capture on a runtime without support. Both are logged and
//! reported as [`Negotiation::Unanswered`]; the callback surface
//! ([`Negotiator::get_user_media`]) invokes neither callback for them.

mod devices;
mod extension;
mod screen;


pub use devices::{CapabilityError, MediaDevices};
pub use extension::{ChannelError, ExtensionChannel, NoExtensionChannel, StreamIdError, request_stream_id};
use rtcgate_protocol::{DEFAULT_EXTENSION_ID, MediaConfig, MediaStreamConstraints};
pub use screen::{ScreenPlan, desktop_constraints, plan_screen_capture};
use thiserror::Error;
use tracing::{debug, error};

use crate::runtime::{HostProbe, RuntimeTag, detect_runtime};
use crate::settings::Settings;

/// Failure delivered to the caller's error callback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
	/// The extension answered without a stream id.
	#[error("Access to screen denied")]
	ScreenAccessDenied,

	/// The extension messaging channel could not be reached.
	#[error("screen-sharing extension is not present")]
	PluginUnavailable,

	/// The capability API rejected the request.
	#[error(transparent)]
	Capability(#[from] CapabilityError),
}

impl MediaError {
	/// Stable marker identifying the failure to callers.
	pub fn code(&self) -> &str {
		match self {
			MediaError::ScreenAccessDenied => "Access to screen denied",
			MediaError::PluginUnavailable => "no_plugin_present",
			MediaError::Capability(err) => &err.name,
		}
	}
}

/// Why a negotiation ended without reaching either callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unanswered {
	/// Camera/microphone requested on a non-browser host.
	HeadlessMedia,
	/// Screen capture requested on a runtime that cannot provide it.
	ScreenShareUnsupported(RuntimeTag),
}

/// Result of one negotiation.
#[derive(Debug)]
pub enum Negotiation<S> {
	Acquired(S),
	Failed(MediaError),
	Unanswered(Unanswered),
}

impl<S> Negotiation<S> {
	pub fn is_acquired(&self) -> bool {
		matches!(self, Negotiation::Acquired(_))
	}

	/// `None` for unanswered negotiations.
	pub fn into_result(self) -> Option<Result<S, MediaError>> {
		match self {
			Negotiation::Acquired(stream) => Some(Ok(stream)),
			Negotiation::Failed(err) => Some(Err(err)),
			Negotiation::Unanswered(_) => None,
		}
	}
}

/// Media acquisition front door for one host.
#[derive(Debug)]
pub struct Negotiator<P, D, C> {
	probe: P,
	devices: D,
	channel: C,
	extension_id: String,
}

impl<P, D, C> Negotiator<P, D, C>
where
	P: HostProbe,
	D: MediaDevices,
	C: ExtensionChannel,
{
	pub fn new(probe: P, devices: D, channel: C) -> Self {
		Self {
			probe,
			devices,
			channel,
			extension_id: DEFAULT_EXTENSION_ID.to_string(),
		}
	}

	/// Takes the default extension id from `settings`.
	pub fn with_settings(self, settings: &Settings) -> Self {
		self.with_extension_id(settings.extension_id.clone())
	}

	/// Extension asked for desktop stream ids when the request names none.
	pub fn with_extension_id(mut self, extension_id: impl Into<String>) -> Self {
		self.extension_id = extension_id.into();
		self
	}

	pub fn extension_id(&self) -> &str {
		&self.extension_id
	}

	pub fn devices(&self) -> &D {
		&self.devices
	}

	pub fn channel(&self) -> &C {
		&self.channel
	}

	/// The runtime requests are currently negotiated for.
	pub fn runtime(&self) -> RuntimeTag {
		detect_runtime(&self.probe)
	}

	/// Negotiates `config` down to at most one capability API call.
	pub async fn negotiate(&self, config: MediaConfig) -> Negotiation<D::Stream> {
		let runtime = detect_runtime(&self.probe);

		if config.screen {
			return self.negotiate_screen(runtime, &config).await;
		}

		if runtime == RuntimeTag::Fake {
			error!(target = "rtcgate.media", "video/audio streams not supported on non-browser hosts");
			return Negotiation::Unanswered(Unanswered::HeadlessMedia);
		}

		debug!(target = "rtcgate.media", %runtime, constraints = ?config.constraints, "calling getUserMedia");
		self.acquire(&config.constraints).await
	}

	/// Callback form of [`negotiate`](Self::negotiate).
	///
	/// Calls exactly one of `on_success`/`on_error` unless the negotiation is
	/// [`Negotiation::Unanswered`], in which case neither is called.
	pub async fn get_user_media<S, E>(&self, config: MediaConfig, on_success: S, on_error: E)
	where
		S: FnOnce(D::Stream),
		E: FnOnce(MediaError),
	{
		match self.negotiate(config).await {
			Negotiation::Acquired(stream) => on_success(stream),
			Negotiation::Failed(err) => on_error(err),
			Negotiation::Unanswered(reason) => {
				debug!(target = "rtcgate.media", ?reason, "negotiation ended without a callback");
			}
		}
	}

	async fn negotiate_screen(&self, runtime: RuntimeTag, config: &MediaConfig) -> Negotiation<D::Stream> {
		debug!(target = "rtcgate.media", %runtime, "screen access requested");

		match plan_screen_capture(runtime, config, &self.extension_id) {
			ScreenPlan::Ready(constraints) => {
				debug!(target = "rtcgate.media", %runtime, ?constraints, "screen constraints built");
				self.acquire(&constraints).await
			}
			ScreenPlan::NeedsStreamId { extension_id } => {
				debug!(target = "rtcgate.media", %extension_id, "screen access on chrome stable, looking for extension");
				match request_stream_id(&self.channel, &extension_id).await {
					Ok(stream_id) => self.acquire(&desktop_constraints(config, &stream_id)).await,
					Err(StreamIdError::NoResponse) => {
						error!(target = "rtcgate.media", %extension_id, "access to screen denied");
						Negotiation::Failed(MediaError::ScreenAccessDenied)
					}
					Err(StreamIdError::ChannelUnreachable(err)) => {
						debug!(target = "rtcgate.media", error = %err, "screensharing plugin is not accessible");
						Negotiation::Failed(MediaError::PluginUnavailable)
					}
				}
			}
			ScreenPlan::Unsupported => {
				error!(target = "rtcgate.media", %runtime, "this browser does not support screen sharing");
				Negotiation::Unanswered(Unanswered::ScreenShareUnsupported(runtime))
			}
		}
	}

	async fn acquire(&self, constraints: &MediaStreamConstraints) -> Negotiation<D::Stream> {
		match self.devices.get_user_media(constraints).await {
			Ok(stream) => Negotiation::Acquired(stream),
			Err(err) => {
				debug!(target = "rtcgate.media", error = %err, "getUserMedia rejected");
				Negotiation::Failed(err.into())
			}
		}
	}
}
