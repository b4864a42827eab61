use rtcgate::{HostProbe, Negotiation, Negotiator, RuntimeTag, Settings, Unanswered};
use rtcgate_protocol::{MediaConfig, MediaStreamConstraints};
use serde::Serialize;

use crate::cli::{ExtensionArgs, HostArgs};
use crate::dry_run::{ExtensionScript, RecordingDevices, ScriptedExtension};
use crate::error::{CliError, Result};
use crate::output::{DiagnosticLevel, OutputFormat, ResultBuilder, print_result};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NegotiateReport {
	pub runtime: RuntimeTag,
	/// "acquired" or "unanswered"; failures are reported as errors.
	pub outcome: &'static str,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub stream: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub reason: Option<&'static str>,
	/// Every request that reached the capability API.
	pub forwarded: Vec<MediaStreamConstraints>,
	/// Extension ids messaged for a desktop stream id.
	pub extension_calls: Vec<String>,
}

pub async fn execute(
	host: &HostArgs,
	media: &str,
	extension: &ExtensionArgs,
	deny: Option<String>,
	settings: &Settings,
	format: OutputFormat,
) -> Result<()> {
	let config = parse_media(media)?;
	let devices = match deny {
		Some(name) => RecordingDevices::denying(name),
		None => RecordingDevices::default(),
	};
	let report = run(host.probe(), devices, ExtensionScript::from(extension), config, settings).await?;

	let mut builder = ResultBuilder::new("negotiate");
	if let Some(reason) = report.reason {
		builder = builder.diagnostic(DiagnosticLevel::Warning, format!("no callback would fire: {reason}"));
	}
	print_result(&builder.data(report).build(), format);
	Ok(())
}

pub fn parse_media(media: &str) -> Result<MediaConfig> {
	serde_json::from_str(media).map_err(|source| CliError::InvalidJson { what: "media request", source })
}

/// Negotiates once and reports what each double saw.
pub async fn run<P: HostProbe>(
	probe: P,
	devices: RecordingDevices,
	script: ExtensionScript,
	config: MediaConfig,
	settings: &Settings,
) -> Result<NegotiateReport> {
	let negotiator = Negotiator::new(probe, devices, ScriptedExtension::new(script)).with_settings(settings);
	let runtime = negotiator.runtime();
	let negotiation = negotiator.negotiate(config).await;

	let forwarded = negotiator.devices().calls();
	let extension_calls = negotiator.channel().calls();

	let (outcome, stream, reason) = match negotiation {
		Negotiation::Acquired(stream) => ("acquired", Some(stream), None),
		Negotiation::Unanswered(why) => ("unanswered", None, Some(reason_label(why))),
		Negotiation::Failed(source) => {
			return Err(CliError::Negotiation {
				source,
				details: serde_json::json!({
					"runtime": runtime,
					"forwarded": forwarded,
					"extensionCalls": extension_calls,
				}),
			});
		}
	};

	Ok(NegotiateReport {
		runtime,
		outcome,
		stream,
		reason,
		forwarded,
		extension_calls,
	})
}

fn reason_label(reason: Unanswered) -> &'static str {
	match reason {
		Unanswered::HeadlessMedia => "media requested on a non-browser host",
		Unanswered::ScreenShareUnsupported(_) => "screen sharing unsupported on this runtime",
	}
}

#[cfg(test)]
mod tests {
	use rtcgate::{MediaError, StaticHost};
	use rtcgate_protocol::DEFAULT_EXTENSION_ID;
	use serde_json::json;

	use super::*;

	const CHROME: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";
	const FIREFOX: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

	async fn negotiate(host: StaticHost, script: ExtensionScript, media: &str) -> Result<NegotiateReport> {
		run(
			host,
			RecordingDevices::default(),
			script,
			parse_media(media).unwrap(),
			&Settings::default(),
		)
		.await
	}

	#[tokio::test]
	async fn chrome_screen_share_round_trips_extension() {
		let report = negotiate(
			StaticHost::browser(CHROME),
			ExtensionScript::Reply("desk-1".into()),
			r#"{"screen": true}"#,
		)
		.await
		.unwrap();

		assert_eq!(report.outcome, "acquired");
		assert_eq!(report.extension_calls, [DEFAULT_EXTENSION_ID]);
		assert_eq!(
			serde_json::to_value(&report.forwarded).unwrap(),
			json!([{"video": {"mandatory": {"chromeMediaSource": "desktop", "chromeMediaSourceId": "desk-1"}}}])
		);
	}

	#[tokio::test]
	async fn firefox_camera_is_forwarded() {
		let report = negotiate(StaticHost::browser(FIREFOX), ExtensionScript::Unreachable, r#"{"audio": true}"#)
			.await
			.unwrap();
		assert_eq!(report.stream.as_deref(), Some("dry-run-stream-1"));
		assert!(report.extension_calls.is_empty());
	}

	#[tokio::test]
	async fn headless_media_is_unanswered() {
		let report = negotiate(StaticHost::headless(), ExtensionScript::Silent, r#"{"video": true}"#)
			.await
			.unwrap();
		assert_eq!(report.outcome, "unanswered");
		assert!(report.reason.is_some());
		assert!(report.forwarded.is_empty());
	}

	#[tokio::test]
	async fn silent_extension_fails_with_details() {
		let err = negotiate(StaticHost::browser(CHROME), ExtensionScript::Silent, r#"{"screen": true}"#)
			.await
			.unwrap_err();

		match err {
			CliError::Negotiation { source, details } => {
				assert_eq!(source, MediaError::ScreenAccessDenied);
				assert_eq!(details["extensionCalls"], json!([DEFAULT_EXTENSION_ID]));
				assert_eq!(details["forwarded"], json!([]));
			}
			other => panic!("unexpected {other:?}"),
		}
	}

	#[tokio::test]
	async fn denied_capability_surfaces_name() {
		let err = run(
			StaticHost::browser(FIREFOX),
			RecordingDevices::denying("NotFoundError"),
			ExtensionScript::Unreachable,
			MediaConfig::user_media(false, true),
			&Settings::default(),
		)
		.await
		.unwrap_err();
		assert_eq!(err.to_command_error().details.unwrap()["marker"], "NotFoundError");
	}

	#[test]
	fn malformed_media_is_invalid_input() {
		assert!(matches!(parse_media("screen"), Err(CliError::InvalidJson { .. })));
	}
}
