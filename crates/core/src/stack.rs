//! Capability adapter interface.
//!
//! Each browser family has its own peer-connection adapter. The adapters are
//! supplied by the embedder through a [`StackRegistry`]; this crate only ships
//! [`FakeStack`], the stand-in used on non-browser hosts.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use rtcgate_protocol::{ConnectionSpec, SessionDescription};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Adapter family. Several runtimes may share one family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StackFamily {
	Fake,
	Firefox,
	ChromeStable,
}

impl fmt::Display for StackFamily {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			StackFamily::Fake => "fake",
			StackFamily::Firefox => "firefox",
			StackFamily::ChromeStable => "chrome-stable",
		})
	}
}

/// Failure reported by an adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StackError {
	#[error("{0} not supported by this stack")]
	Unsupported(&'static str),

	#[error("stack operation failed: {0}")]
	Failed(String),
}

/// Failure delivered to an `update_spec` callback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecUpdateError {
	/// The adapter cannot change its configuration after construction.
	#[error("unimplemented")]
	Unimplemented,

	#[error("spec update rejected: {0}")]
	Rejected(String),
}

/// Completion callback for [`SpecUpdater::update_spec`].
pub type UpdateCallback = Box<dyn FnOnce(Result<(), SpecUpdateError>)>;

/// Optional adapter capability: reconfigure a live connection.
pub trait SpecUpdater {
	fn update_spec(&self, spec: ConnectionSpec, callback: UpdateCallback);
}

/// Peer-connection adapter for one browser family.
#[async_trait(?Send)]
pub trait PeerStack {
	fn family(&self) -> StackFamily;

	/// The configuration the adapter was built with.
	fn spec(&self) -> &ConnectionSpec;

	async fn create_offer(&self) -> Result<SessionDescription, StackError>;

	async fn set_remote_description(&self, description: SessionDescription) -> Result<(), StackError>;

	/// Returns the reconfiguration capability, if this adapter has one.
	fn spec_updater(&self) -> Option<&dyn SpecUpdater> {
		None
	}
}

/// Builds an adapter for a connection spec.
pub type StackBuilder = Box<dyn Fn(&ConnectionSpec) -> Result<Box<dyn PeerStack>, StackError>>;

/// Family → adapter builder table.
pub struct StackRegistry {
	builders: HashMap<StackFamily, StackBuilder>,
}

impl StackRegistry {
	/// Registry with only the [`FakeStack`] builder.
	pub fn new() -> Self {
		let mut registry = Self::empty();
		registry.register(StackFamily::Fake, |spec| {
			Ok(Box::new(FakeStack::new(spec.clone())) as Box<dyn PeerStack>)
		});
		registry
	}

	/// Registry with no builders at all.
	pub fn empty() -> Self {
		Self {
			builders: HashMap::new(),
		}
	}

	/// Registers (or replaces) the builder for `family`.
	pub fn register<F>(&mut self, family: StackFamily, builder: F) -> &mut Self
	where
		F: Fn(&ConnectionSpec) -> Result<Box<dyn PeerStack>, StackError> + 'static,
	{
		self.builders.insert(family, Box::new(builder));
		self
	}

	/// Builder-style [`register`](Self::register).
	pub fn with<F>(mut self, family: StackFamily, builder: F) -> Self
	where
		F: Fn(&ConnectionSpec) -> Result<Box<dyn PeerStack>, StackError> + 'static,
	{
		self.register(family, builder);
		self
	}

	pub fn contains(&self, family: StackFamily) -> bool {
		self.builders.contains_key(&family)
	}

	/// Returns `None` when no builder is registered for `family`.
	pub(crate) fn build(&self, family: StackFamily, spec: &ConnectionSpec) -> Option<Result<Box<dyn PeerStack>, StackError>> {
		self.builders.get(&family).map(|builder| builder(spec))
	}
}

impl Default for StackRegistry {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for StackRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("StackRegistry")
			.field("families", &self.builders.keys().collect::<Vec<_>>())
			.finish()
	}
}

/// Adapter for non-browser hosts: keeps its connection spec but cannot publish or subscribe.
#[derive(Debug, Clone)]
pub struct FakeStack {
	spec: ConnectionSpec,
}

impl FakeStack {
	pub fn new(spec: ConnectionSpec) -> Self {
		Self { spec }
	}
}

#[async_trait(?Send)]
impl PeerStack for FakeStack {
	fn family(&self) -> StackFamily {
		StackFamily::Fake
	}

	fn spec(&self) -> &ConnectionSpec {
		&self.spec
	}

	async fn create_offer(&self) -> Result<SessionDescription, StackError> {
		Err(StackError::Unsupported("publish/subscribe"))
	}

	async fn set_remote_description(&self, _description: SessionDescription) -> Result<(), StackError> {
		Err(StackError::Unsupported("publish/subscribe"))
	}
}
