use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use rtcgate::{ConnectionFactory, ConnectionHandle, HostProbe, RuntimeTag, Settings, SpecUpdateError, StackFamily};
use rtcgate_protocol::{ConnectionSpec, SdpType};
use serde::Serialize;
use tracing::info;

use crate::cli::HostArgs;
use crate::dry_run::dry_run_registry;
use crate::error::{CliError, Result};
use crate::output::{OutputFormat, ResultBuilder, print_result};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectReport {
	pub runtime: RuntimeTag,
	pub connections: Vec<ConnectionReport>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionReport {
	pub session_id: u64,
	pub family: StackFamily,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub offer: Option<SdpType>,
	/// Why the adapter refused to make an offer.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub offer_error: Option<String>,
	pub update_spec: UpdateOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "status", content = "reason")]
pub enum UpdateOutcome {
	Applied,
	Unimplemented,
	Rejected(String),
	/// The adapter took the update but has not called back yet.
	Pending,
}

impl From<Option<std::result::Result<(), SpecUpdateError>>> for UpdateOutcome {
	fn from(result: Option<std::result::Result<(), SpecUpdateError>>) -> Self {
		match result {
			None => UpdateOutcome::Pending,
			Some(Ok(())) => UpdateOutcome::Applied,
			Some(Err(SpecUpdateError::Unimplemented)) => UpdateOutcome::Unimplemented,
			Some(Err(SpecUpdateError::Rejected(reason))) => UpdateOutcome::Rejected(reason),
		}
	}
}

pub async fn execute(host: &HostArgs, spec: Option<&str>, count: u32, settings: &Settings, format: OutputFormat) -> Result<()> {
	let template = parse_spec(spec)?;
	let report = build_connections(host.probe(), template, count, settings).await?;
	print_result(&ResultBuilder::new("connect").data(report).build(), format);
	Ok(())
}

pub fn parse_spec(spec: Option<&str>) -> Result<ConnectionSpec> {
	match spec {
		Some(json) => serde_json::from_str(json).map_err(|source| CliError::InvalidJson { what: "connection spec", source }),
		None => Ok(ConnectionSpec::default()),
	}
}

/// Builds `count` connections from copies of `template`, stopping at the first failure.
pub async fn build_connections<P: HostProbe>(
	probe: P,
	template: ConnectionSpec,
	count: u32,
	settings: &Settings,
) -> Result<ConnectReport> {
	let factory = ConnectionFactory::new(probe, dry_run_registry()).with_sequence(Arc::new(settings.session_sequence()));

	let mut connections = Vec::with_capacity(count as usize);
	for _ in 0..count {
		let mut spec = template.clone();
		let handle = factory.build_connection(&mut spec)?;
		info!(
			target = "rtcgate_cli.connect",
			session_id = handle.session_id(),
			family = %handle.family(),
			"connection built"
		);
		connections.push(exercise(&handle, spec).await);
	}

	Ok(ConnectReport {
		runtime: factory.runtime(),
		connections,
	})
}

async fn exercise(handle: &ConnectionHandle, spec: ConnectionSpec) -> ConnectionReport {
	let (offer, offer_error) = match handle.create_offer().await {
		Ok(description) => (Some(description.sdp_type), None),
		Err(err) => (None, Some(err.to_string())),
	};

	let outcome = Rc::new(RefCell::new(None));
	let sink = Rc::clone(&outcome);
	handle.update_spec(spec, move |result| *sink.borrow_mut() = Some(result));
	let update_spec = outcome.borrow_mut().take().into();

	ConnectionReport {
		session_id: handle.session_id(),
		family: handle.family(),
		offer,
		offer_error,
		update_spec,
	}
}

#[cfg(test)]
mod tests {
	use rtcgate::StaticHost;

	use super::*;

	const CHROME: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";

	#[tokio::test]
	async fn ids_follow_settings_base() {
		let settings = Settings {
			session_id_base: 500,
			..Default::default()
		};
		let report = build_connections(StaticHost::browser(CHROME), ConnectionSpec::default(), 3, &settings)
			.await
			.unwrap();

		let ids: Vec<_> = report.connections.iter().map(|c| c.session_id).collect();
		assert_eq!(ids, [501, 502, 503]);
		assert_eq!(report.runtime, RuntimeTag::ChromeStable);
		assert!(report.connections.iter().all(|c| c.family == StackFamily::ChromeStable));
		assert!(report.connections.iter().all(|c| c.update_spec == UpdateOutcome::Applied));
	}

	#[tokio::test]
	async fn fake_stack_cannot_update() {
		let report = build_connections(StaticHost::headless(), ConnectionSpec::default(), 1, &Settings::default())
			.await
			.unwrap();

		let conn = &report.connections[0];
		assert_eq!(conn.family, StackFamily::Fake);
		assert_eq!(conn.update_spec, UpdateOutcome::Unimplemented);
		assert!(conn.offer.is_none());
		assert!(conn.offer_error.is_some());
	}

	#[tokio::test]
	async fn unknown_browser_fails() {
		let err = build_connections(StaticHost::browser("Lynx/2.9"), ConnectionSpec::default(), 2, &Settings::default())
			.await
			.unwrap_err();
		assert!(matches!(err, CliError::Core(ref e) if e.is_unsupported_runtime()));
	}

	#[test]
	fn malformed_spec_is_invalid_input() {
		assert!(matches!(parse_spec(Some("{")), Err(CliError::InvalidJson { .. })));
		let spec = parse_spec(Some(r#"{"audio": true, "maxVideoBW": 300}"#)).unwrap();
		assert!(spec.audio);
		assert_eq!(spec.max_video_bw, Some(300));
	}

	#[test]
	fn update_outcome_serializes_with_status() {
		let value = serde_json::to_value(UpdateOutcome::Rejected("no".into())).unwrap();
		assert_eq!(value, serde_json::json!({"status": "rejected", "reason": "no"}));
		let value = serde_json::to_value(UpdateOutcome::Unimplemented).unwrap();
		assert_eq!(value, serde_json::json!({"status": "unimplemented"}));
	}
}
