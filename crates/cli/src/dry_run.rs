//! In-process stand-ins for the browser side.
//!
//! The CLI has no browser, so peer-connection adapters, `getUserMedia`, and
//! the screen-capture extension are all simulated here. Each double records
//! what it was asked so commands can report it.

use async_trait::async_trait;
use parking_lot::Mutex;
use rtcgate::stack::UpdateCallback;
use rtcgate::{
	CapabilityError, ChannelError, ExtensionChannel, MediaDevices, PeerStack, SpecUpdateError, SpecUpdater, StackError,
	StackFamily, StackRegistry, StaticHost,
};
use rtcgate_protocol::{ConnectionSpec, MediaStreamConstraints, SdpType, SessionDescription, StreamRequest, StreamResponse};
use serde::Serialize;
use tracing::debug;

use crate::cli::{ExtensionArgs, HostArgs};

impl HostArgs {
	/// `--headless` is a non-browser host; otherwise a browser, with or
	/// without a user agent.
	pub fn probe(&self) -> StaticHost {
		match &self.user_agent {
			_ if self.headless => StaticHost::headless(),
			Some(ua) => StaticHost::browser(ua.clone()),
			None => StaticHost::default(),
		}
	}
}

/// Adapter that answers negotiation with placeholder SDP and accepts updates.
pub struct DryRunStack {
	family: StackFamily,
	spec: ConnectionSpec,
	updated: Mutex<Option<ConnectionSpec>>,
	remote: Mutex<Option<SessionDescription>>,
}

impl DryRunStack {
	pub fn new(family: StackFamily, spec: ConnectionSpec) -> Self {
		Self {
			family,
			spec,
			updated: Mutex::new(None),
			remote: Mutex::new(None),
		}
	}

	/// The spec after the last accepted update.
	pub fn current_spec(&self) -> ConnectionSpec {
		self.updated.lock().clone().unwrap_or_else(|| self.spec.clone())
	}

	pub fn remote_description(&self) -> Option<SessionDescription> {
		self.remote.lock().clone()
	}
}

#[async_trait(?Send)]
impl PeerStack for DryRunStack {
	fn family(&self) -> StackFamily {
		self.family
	}

	fn spec(&self) -> &ConnectionSpec {
		&self.spec
	}

	async fn create_offer(&self) -> Result<SessionDescription, StackError> {
		let session_id = self.spec.session_id.unwrap_or_default();
		Ok(SessionDescription {
			sdp_type: SdpType::Offer,
			sdp: format!("v=0\r\no=- {session_id} 0 IN IP4 127.0.0.1\r\ns=rtcgate-dry-run\r\nt=0 0\r\n"),
		})
	}

	async fn set_remote_description(&self, description: SessionDescription) -> Result<(), StackError> {
		if description.sdp_type != SdpType::Answer {
			return Err(StackError::Failed(format!("expected an answer, got {:?}", description.sdp_type)));
		}
		*self.remote.lock() = Some(description);
		Ok(())
	}

	fn spec_updater(&self) -> Option<&dyn SpecUpdater> {
		Some(self)
	}
}

impl SpecUpdater for DryRunStack {
	fn update_spec(&self, spec: ConnectionSpec, callback: UpdateCallback) {
		let session_id = self.spec.session_id;
		if spec.session_id.is_some() && spec.session_id != session_id {
			callback(Err(SpecUpdateError::Rejected("session id cannot change".into())));
			return;
		}
		*self.updated.lock() = Some(ConnectionSpec { session_id, ..spec });
		debug!(target = "rtcgate_cli.dry_run", ?session_id, family = %self.family, "spec updated");
		callback(Ok(()));
	}
}

/// Registry with the fake adapter plus dry-run adapters for every browser family.
pub fn dry_run_registry() -> StackRegistry {
	StackRegistry::new()
		.with(StackFamily::Firefox, |spec| {
			Ok(Box::new(DryRunStack::new(StackFamily::Firefox, spec.clone())) as Box<dyn PeerStack>)
		})
		.with(StackFamily::ChromeStable, |spec| {
			Ok(Box::new(DryRunStack::new(StackFamily::ChromeStable, spec.clone())) as Box<dyn PeerStack>)
		})
}

/// Capability API that records each request and returns a label for the stream.
#[derive(Debug, Default)]
pub struct RecordingDevices {
	calls: Mutex<Vec<MediaStreamConstraints>>,
	deny: Option<String>,
}

impl RecordingDevices {
	/// Rejects every request with a `name` error, like a browser permission prompt.
	pub fn denying(name: impl Into<String>) -> Self {
		Self {
			deny: Some(name.into()),
			..Default::default()
		}
	}

	pub fn calls(&self) -> Vec<MediaStreamConstraints> {
		self.calls.lock().clone()
	}
}

#[async_trait(?Send)]
impl MediaDevices for RecordingDevices {
	type Stream = String;

	async fn get_user_media(&self, constraints: &MediaStreamConstraints) -> Result<String, CapabilityError> {
		let mut calls = self.calls.lock();
		calls.push(constraints.clone());
		match &self.deny {
			Some(name) => Err(CapabilityError::new(name.clone(), "rejected by --deny")),
			None => Ok(format!("dry-run-stream-{}", calls.len())),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "kind", content = "streamId")]
pub enum ExtensionScript {
	Reply(String),
	Silent,
	Unreachable,
}

impl From<&ExtensionArgs> for ExtensionScript {
	fn from(args: &ExtensionArgs) -> Self {
		match (&args.extension_reply, args.extension_silent) {
			(Some(id), _) => ExtensionScript::Reply(id.clone()),
			(None, true) => ExtensionScript::Silent,
			(None, false) => ExtensionScript::Unreachable,
		}
	}
}

/// Extension messaging channel that follows a fixed script.
#[derive(Debug)]
pub struct ScriptedExtension {
	script: ExtensionScript,
	calls: Mutex<Vec<String>>,
}

impl ScriptedExtension {
	pub fn new(script: ExtensionScript) -> Self {
		Self {
			script,
			calls: Mutex::new(Vec::new()),
		}
	}

	/// Extension ids messaged so far.
	pub fn calls(&self) -> Vec<String> {
		self.calls.lock().clone()
	}
}

#[async_trait(?Send)]
impl ExtensionChannel for ScriptedExtension {
	async fn send_message(&self, extension_id: &str, request: &StreamRequest) -> Result<Option<StreamResponse>, ChannelError> {
		self.calls.lock().push(extension_id.to_string());
		debug!(target = "rtcgate_cli.dry_run", extension_id, ?request, script = ?self.script, "extension message");
		match &self.script {
			ExtensionScript::Reply(id) => Ok(Some(StreamResponse::with_stream_id(id.clone()))),
			ExtensionScript::Silent => Ok(None),
			ExtensionScript::Unreachable => Err(ChannelError::Unavailable),
		}
	}
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;
	use std::rc::Rc;

	use rtcgate::{ConnectionFactory, HostProbe, RuntimeTag, SessionIdSequence};

	use super::*;

	const FIREFOX: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

	#[test]
	fn host_args_select_simulated_host() {
		let bare = HostArgs::default().probe();
		assert!(!bare.is_headless());
		assert_eq!(rtcgate::detect_runtime(&bare), RuntimeTag::None);

		let headless = HostArgs {
			headless: true,
			..Default::default()
		};
		assert_eq!(rtcgate::detect_runtime(&headless.probe()), RuntimeTag::Fake);

		let args = HostArgs {
			user_agent: Some(FIREFOX.into()),
			headless: false,
		};
		assert_eq!(rtcgate::detect_runtime(&args.probe()), RuntimeTag::Mozilla);
	}

	#[test]
	fn registry_covers_every_family() {
		let registry = dry_run_registry();
		for family in [StackFamily::Fake, StackFamily::Firefox, StackFamily::ChromeStable] {
			assert!(registry.contains(family), "{family} missing");
		}
	}

	#[tokio::test]
	async fn dry_run_stack_negotiates_and_updates() {
		let factory = ConnectionFactory::new(StaticHost::browser(FIREFOX), dry_run_registry())
			.with_sequence(std::sync::Arc::new(SessionIdSequence::default()));
		let mut spec = ConnectionSpec::default();
		let handle = factory.build_connection(&mut spec).unwrap();

		let offer = handle.create_offer().await.unwrap();
		assert_eq!(offer.sdp_type, SdpType::Offer);
		assert!(offer.sdp.contains(&handle.session_id().to_string()));

		let outcome = Rc::new(RefCell::new(None));
		let sink = Rc::clone(&outcome);
		handle.update_spec(
			ConnectionSpec {
				video: true,
				..Default::default()
			},
			move |result| *sink.borrow_mut() = Some(result),
		);
		assert_eq!(*outcome.borrow(), Some(Ok(())));
	}

	#[test]
	fn update_cannot_change_session_id() {
		let stack = DryRunStack::new(
			StackFamily::ChromeStable,
			ConnectionSpec {
				session_id: Some(7),
				..Default::default()
			},
		);
		let outcome = Rc::new(RefCell::new(None));
		let sink = Rc::clone(&outcome);
		stack.update_spec(
			ConnectionSpec {
				session_id: Some(8),
				..Default::default()
			},
			Box::new(move |result| *sink.borrow_mut() = Some(result)),
		);
		assert!(matches!(*outcome.borrow(), Some(Err(SpecUpdateError::Rejected(_)))));
		assert_eq!(stack.current_spec().session_id, Some(7));
	}

	#[tokio::test]
	async fn remote_description_must_be_answer() {
		let stack = DryRunStack::new(StackFamily::Firefox, ConnectionSpec::default());
		let offer = stack.create_offer().await.unwrap();
		assert!(stack.set_remote_description(offer).await.is_err());

		let answer = SessionDescription {
			sdp_type: SdpType::Answer,
			sdp: "v=0\r\n".into(),
		};
		stack.set_remote_description(answer.clone()).await.unwrap();
		assert_eq!(stack.remote_description(), Some(answer));
	}

	#[tokio::test]
	async fn scripts_follow_flags() {
		let silent = ExtensionArgs {
			extension_silent: true,
			..Default::default()
		};
		assert_eq!(ExtensionScript::from(&silent), ExtensionScript::Silent);
		assert_eq!(ExtensionScript::from(&ExtensionArgs::default()), ExtensionScript::Unreachable);

		let ext = ScriptedExtension::new(ExtensionScript::Reply("d-1".into()));
		let reply = ext.send_message("abc", &StreamRequest::GET_STREAM).await.unwrap();
		assert_eq!(reply, Some(StreamResponse::with_stream_id("d-1")));
		assert_eq!(ext.calls(), ["abc"]);
	}
}
