//! Connection factory.
//!
//! Resolves the runtime, picks the adapter family for it, and wraps the built
//! adapter in a [`ConnectionHandle`] whose baseline surface is the same on
//! every runtime.


use std::fmt;
use std::sync::Arc;

use rtcgate_protocol::{ConnectionSpec, SessionDescription};
use tracing::{debug, error, warn};

use crate::error::{Error, Result};
use crate::runtime::{HostProbe, RuntimeTag, detect_runtime};
use crate::session::SessionIdSequence;
use crate::stack::{PeerStack, SpecUpdateError, StackError, StackFamily, StackRegistry};

/// Builds connection handles for the host described by `P`.
pub struct ConnectionFactory<P> {
	probe: P,
	registry: StackRegistry,
	sequence: Arc<SessionIdSequence>,
}

impl<P: HostProbe> ConnectionFactory<P> {
	/// Creates a factory drawing session ids from the process-wide sequence.
	pub fn new(probe: P, registry: StackRegistry) -> Self {
		Self {
			probe,
			registry,
			sequence: SessionIdSequence::shared(),
		}
	}

	/// Uses an isolated session id sequence instead of the shared one.
	pub fn with_sequence(mut self, sequence: Arc<SessionIdSequence>) -> Self {
		self.sequence = sequence;
		self
	}

	/// The runtime this factory would dispatch on right now.
	pub fn runtime(&self) -> RuntimeTag {
		detect_runtime(&self.probe)
	}

	pub fn registry(&self) -> &StackRegistry {
		&self.registry
	}

	/// Assigns a session id to `spec` and builds the adapter for the host runtime.
	///
	/// The id is allocated before the runtime is resolved and stays consumed
	/// when building fails.
	///
	/// # Errors
	///
	/// - [`Error::SessionIdsExhausted`] when the sequence has no ids left; the
	///   spec is left untouched.
	/// - [`Error::UnsupportedRuntime`] when the runtime has no adapter family;
	///   no builder is invoked in that case.
	/// - [`Error::StackNotRegistered`] when the family has no builder.
	/// - [`Error::StackConstruction`] when the builder fails.
	pub fn build_connection(&self, spec: &mut ConnectionSpec) -> Result<ConnectionHandle> {
		let session_id = self.sequence.next().ok_or_else(|| {
			error!(target = "rtcgate.connection", last = self.sequence.last(), "no session ids left");
			Error::SessionIdsExhausted
		})?;
		spec.session_id = Some(session_id);

		let runtime = detect_runtime(&self.probe);
		let Some(family) = runtime.stack_family() else {
			error!(target = "rtcgate.connection", session_id, %runtime, "no stack available for this browser");
			return Err(Error::UnsupportedRuntime(runtime));
		};

		match runtime {
			RuntimeTag::Fake => warn!(
				target = "rtcgate.connection",
				session_id,
				"publishing and subscribing media streams is not supported on non-browser hosts"
			),
			RuntimeTag::Safari => debug!(target = "rtcgate.connection", session_id, "Safari using Firefox stack"),
			_ => debug!(target = "rtcgate.connection", session_id, %runtime, %family, "selected stack"),
		}

		let stack = match self.registry.build(family, spec) {
			None => return Err(Error::StackNotRegistered(family)),
			Some(Err(source)) => return Err(Error::StackConstruction { family, source }),
			Some(Ok(stack)) => stack,
		};

		Ok(ConnectionHandle {
			runtime,
			session_id,
			stack,
		})
	}
}

impl<P> fmt::Debug for ConnectionFactory<P> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ConnectionFactory")
			.field("registry", &self.registry)
			.field("last_session_id", &self.sequence.last())
			.finish_non_exhaustive()
	}
}

/// A built connection: the adapter plus what the factory resolved for it.
pub struct ConnectionHandle {
	runtime: RuntimeTag,
	session_id: u64,
	stack: Box<dyn PeerStack>,
}

impl ConnectionHandle {
	pub fn runtime(&self) -> RuntimeTag {
		self.runtime
	}

	pub fn family(&self) -> StackFamily {
		self.stack.family()
	}

	pub fn session_id(&self) -> u64 {
		self.session_id
	}

	pub fn spec(&self) -> &ConnectionSpec {
		self.stack.spec()
	}

	pub fn stack(&self) -> &dyn PeerStack {
		self.stack.as_ref()
	}

	pub async fn create_offer(&self) -> std::result::Result<SessionDescription, StackError> {
		self.stack.create_offer().await
	}

	pub async fn set_remote_description(&self, description: SessionDescription) -> std::result::Result<(), StackError> {
		self.stack.set_remote_description(description).await
	}

	/// Whether the adapter can be reconfigured in place.
	pub fn supports_update_spec(&self) -> bool {
		self.stack.spec_updater().is_some()
	}

	/// Reconfigures the connection.
	///
	/// Adapters without the capability answer through `callback` with
	/// [`SpecUpdateError::Unimplemented`]; this never panics.
	pub fn update_spec<F>(&self, spec: ConnectionSpec, callback: F)
	where
		F: FnOnce(std::result::Result<(), SpecUpdateError>) + 'static,
	{
		match self.stack.spec_updater() {
			Some(updater) => updater.update_spec(spec, Box::new(callback)),
			None => {
				error!(
					target = "rtcgate.connection",
					session_id = self.session_id,
					runtime = %self.runtime,
					"update configuration not implemented in this browser"
				);
				callback(Err(SpecUpdateError::Unimplemented));
			}
		}
	}
}

impl fmt::Debug for ConnectionHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ConnectionHandle")
			.field("runtime", &self.runtime)
			.field("family", &self.stack.family())
			.field("session_id", &self.session_id)
			.finish_non_exhaustive()
	}
}
