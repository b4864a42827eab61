//! Screen-capture constraint synthesis.
//!
//! Each runtime expects screen capture requested in its own dialect. These
//! functions only reshape records; they never touch the host.

use rtcgate_protocol::{
	ChromeMediaSource, MediaConfig, MediaSource, MediaStreamConstraints, TrackConstraints, TrackRequest,
};

use crate::runtime::RuntimeTag;

/// What a screen-capture request needs before the capability API can be called.
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenPlan {
	/// Constraints are complete.
	Ready(MediaStreamConstraints),
	/// A desktop stream id must first be obtained from this extension.
	NeedsStreamId { extension_id: String },
	/// The runtime cannot share its screen.
	Unsupported,
}

/// Plans screen capture of `config` on `runtime`.
///
/// `default_extension_id` is used on Chrome when the caller supplied neither a
/// stream id nor an extension id.
pub fn plan_screen_capture(runtime: RuntimeTag, config: &MediaConfig, default_extension_id: &str) -> ScreenPlan {
	match runtime {
		RuntimeTag::Electron => ScreenPlan::Ready(electron_constraints(config)),
		RuntimeTag::Mozilla => ScreenPlan::Ready(firefox_constraints(config)),
		RuntimeTag::ChromeStable => match &config.desktop_stream_id {
			Some(stream_id) => ScreenPlan::Ready(preselected_desktop_constraints(config, stream_id)),
			None => ScreenPlan::NeedsStreamId {
				extension_id: config
					.extension_id
					.clone()
					.unwrap_or_else(|| default_extension_id.to_string()),
			},
		},
		RuntimeTag::Fake | RuntimeTag::Safari | RuntimeTag::None => ScreenPlan::Unsupported,
	}
}

/// Chrome desktop constraints for a stream id returned by the extension.
///
/// The caller's video constraints are kept only when they already carry a
/// `mandatory` block; otherwise a bare desktop request is built.
pub fn desktop_constraints(config: &MediaConfig, stream_id: &str) -> MediaStreamConstraints {
	let mut video = match config.video() {
		Some(video) if video.has_mandatory() => video.constraints(),
		_ => TrackConstraints::default(),
	};
	set_desktop_source(&mut video, stream_id);
	MediaStreamConstraints::video(video)
}

fn electron_constraints(config: &MediaConfig) -> MediaStreamConstraints {
	let mut video = caller_video(config);
	video.mandatory_mut().chrome_media_source = Some(ChromeMediaSource::Screen);
	MediaStreamConstraints::video(video)
}

fn firefox_constraints(config: &MediaConfig) -> MediaStreamConstraints {
	match config.video() {
		// An explicit refusal is forwarded as written.
		Some(TrackRequest::Enabled(false)) => MediaStreamConstraints {
			audio: None,
			video: Some(TrackRequest::Enabled(false)),
		},
		Some(video) => {
			let mut video = video.constraints();
			video.media_source = Some(MediaSource::Window);
			MediaStreamConstraints::video(video)
		}
		None => MediaStreamConstraints {
			audio: config.audio().cloned(),
			video: Some(TrackRequest::Constraints(TrackConstraints {
				media_source: Some(MediaSource::Window),
				..Default::default()
			})),
		},
	}
}

fn preselected_desktop_constraints(config: &MediaConfig, stream_id: &str) -> MediaStreamConstraints {
	let mut video = caller_video(config);
	set_desktop_source(&mut video, stream_id);
	MediaStreamConstraints::video(video)
}

fn caller_video(config: &MediaConfig) -> TrackConstraints {
	config.video().map(TrackRequest::constraints).unwrap_or_default()
}

fn set_desktop_source(video: &mut TrackConstraints, stream_id: &str) {
	let mandatory = video.mandatory_mut();
	mandatory.chrome_media_source = Some(ChromeMediaSource::Desktop);
	mandatory.chrome_media_source_id = Some(stream_id.to_string());
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn config(value: serde_json::Value) -> MediaConfig {
		serde_json::from_value(value).unwrap()
	}

	fn ready(plan: ScreenPlan) -> serde_json::Value {
		match plan {
			ScreenPlan::Ready(constraints) => serde_json::to_value(constraints).unwrap(),
			other => panic!("expected ready plan, got {other:?}"),
		}
	}

	#[test]
	fn electron_requests_screen_source_and_keeps_video_constraints() {
		let plan = plan_screen_capture(
			RuntimeTag::Electron,
			&config(json!({"screen": true, "audio": true, "video": {"mandatory": {"maxWidth": 1920}}})),
			"default",
		);
		assert_eq!(
			ready(plan),
			json!({"video": {"mandatory": {"maxWidth": 1920, "chromeMediaSource": "screen"}}})
		);
	}

	#[test]
	fn electron_without_video_builds_fresh_block() {
		let plan = plan_screen_capture(RuntimeTag::Electron, &MediaConfig::screen(), "default");
		assert_eq!(ready(plan), json!({"video": {"mandatory": {"chromeMediaSource": "screen"}}}));
	}

	#[test]
	fn firefox_with_video_drops_audio() {
		let plan = plan_screen_capture(
			RuntimeTag::Mozilla,
			&config(json!({"screen": true, "audio": true, "video": {"frameRate": 5}})),
			"default",
		);
		assert_eq!(ready(plan), json!({"video": {"frameRate": 5, "mediaSource": "window"}}));
	}

	#[test]
	fn firefox_keeps_refused_video() {
		let plan = plan_screen_capture(
			RuntimeTag::Mozilla,
			&config(json!({"screen": true, "audio": true, "video": false})),
			"default",
		);
		assert_eq!(ready(plan), json!({"video": false}));
	}

	#[test]
	fn firefox_without_video_passes_audio_through() {
		let plan = plan_screen_capture(RuntimeTag::Mozilla, &config(json!({"screen": true, "audio": true})), "default");
		assert_eq!(ready(plan), json!({"audio": true, "video": {"mediaSource": "window"}}));
	}

	#[test]
	fn chrome_with_stream_id_is_ready() {
		let plan = plan_screen_capture(
			RuntimeTag::ChromeStable,
			&config(json!({"screen": true, "desktopStreamId": "abc", "video": {"width": 800}})),
			"default",
		);
		assert_eq!(
			ready(plan),
			json!({"video": {"width": 800, "mandatory": {"chromeMediaSource": "desktop", "chromeMediaSourceId": "abc"}}})
		);
	}

	#[test]
	fn chrome_without_stream_id_needs_extension() {
		let plan = plan_screen_capture(RuntimeTag::ChromeStable, &MediaConfig::screen(), "default-ext");
		assert_eq!(
			plan,
			ScreenPlan::NeedsStreamId {
				extension_id: "default-ext".into()
			}
		);

		let plan = plan_screen_capture(
			RuntimeTag::ChromeStable,
			&config(json!({"screen": true, "extensionId": "mine"})),
			"default-ext",
		);
		assert_eq!(plan, ScreenPlan::NeedsStreamId { extension_id: "mine".into() });
	}

	#[test]
	fn other_runtimes_cannot_share() {
		for runtime in [RuntimeTag::Safari, RuntimeTag::Fake, RuntimeTag::None] {
			assert_eq!(plan_screen_capture(runtime, &MediaConfig::screen(), "default"), ScreenPlan::Unsupported);
		}
	}

	#[test]
	fn extension_id_merges_into_existing_mandatory_block() {
		let cfg = config(json!({"screen": true, "video": {"width": 640, "mandatory": {"maxFrameRate": 10}}}));
		assert_eq!(
			serde_json::to_value(desktop_constraints(&cfg, "sid")).unwrap(),
			json!({"video": {"width": 640, "mandatory": {"maxFrameRate": 10, "chromeMediaSource": "desktop", "chromeMediaSourceId": "sid"}}})
		);
	}

	#[test]
	fn extension_id_without_mandatory_builds_bare_request() {
		let cfg = config(json!({"screen": true, "audio": true, "video": {"width": 640}}));
		assert_eq!(
			serde_json::to_value(desktop_constraints(&cfg, "sid")).unwrap(),
			json!({"video": {"mandatory": {"chromeMediaSource": "desktop", "chromeMediaSourceId": "sid"}}})
		);
	}
}
