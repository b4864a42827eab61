//! rtcgate: the front door for real-time media in a browser.
//!
//! Three concerns, all driven by which browser hosts the code:
//!
//! - [`runtime`] classifies the host into a [`RuntimeTag`].
//! - [`connection`] picks the peer-connection adapter for that runtime and
//!   stamps each connection spec with a unique session id.
//! - [`media`] turns camera, microphone, and screen requests into the shape
//!   each runtime's capability API expects, including the extension
//!   round-trip Chrome needs for desktop capture.
//!
//! The host itself (user agent, `getUserMedia`, extension messaging) is
//! reached only through the [`HostProbe`], [`MediaDevices`], and
//! [`ExtensionChannel`] traits. The `web` feature provides browser
//! implementations of all three.
//!
//! # Example
//!
//! ```ignore
//! use rtcgate::{ConnectionFactory, StackRegistry, StaticHost};
//! use rtcgate_protocol::ConnectionSpec;
//!
//! let factory = ConnectionFactory::new(StaticHost::headless(), StackRegistry::new());
//! let mut spec = ConnectionSpec::default();
//! let handle = factory.build_connection(&mut spec)?;
//! assert_eq!(spec.session_id, Some(handle.session_id()));
//! ```

pub mod connection;
pub mod error;
pub mod media;
pub mod runtime;
pub mod session;
pub mod settings;
pub mod stack;
#[cfg(feature = "web")]
pub mod web;

pub use connection::{ConnectionFactory, ConnectionHandle};
pub use error::{Error, Result};
pub use media::{
	CapabilityError, ChannelError, ExtensionChannel, MediaDevices, MediaError, Negotiation, Negotiator, NoExtensionChannel,
	ScreenPlan, Unanswered,
};
pub use runtime::{HostProbe, RuntimeTag, StaticHost, classify_user_agent, detect_runtime};
pub use session::{SESSION_ID_BASE, SessionIdSequence};
pub use settings::Settings;
pub use stack::{FakeStack, PeerStack, SpecUpdateError, SpecUpdater, StackError, StackFamily, StackRegistry};
