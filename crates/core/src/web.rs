//! Browser bindings for the host traits (feature `web`).
//!
//! Only meaningful on `wasm32-unknown-unknown` inside a page. Inside a worker
//! there is no `window`, so the host reads as non-browser.

use async_trait::async_trait;
use js_sys::{Function, Promise, Reflect};
use rtcgate_protocol::{MediaStreamConstraints, StreamRequest, StreamResponse};
use serde::Serialize;
use serde_wasm_bindgen::Serializer;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::MediaStream;

use crate::connection::ConnectionFactory;
use crate::media::{CapabilityError, ChannelError, ExtensionChannel, MediaDevices, Negotiator};
use crate::runtime::HostProbe;
use crate::settings::Settings;
use crate::stack::StackRegistry;

/// The page this code runs in.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserHost;

impl HostProbe for BrowserHost {
	fn is_headless(&self) -> bool {
		web_sys::window().is_none()
	}

	fn user_agent(&self) -> Option<String> {
		web_sys::window()?.navigator().user_agent().ok()
	}
}

/// `navigator.mediaDevices`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserMediaDevices;

#[async_trait(?Send)]
impl MediaDevices for BrowserMediaDevices {
	type Stream = MediaStream;

	async fn get_user_media(&self, constraints: &MediaStreamConstraints) -> Result<MediaStream, CapabilityError> {
		let window = web_sys::window().ok_or_else(|| CapabilityError::new("NotSupportedError", "no window"))?;
		let devices = window.navigator().media_devices().map_err(capability_error)?;

		// Plain objects, not ES Maps: the constraints carry flattened fields.
		let js_constraints = constraints
			.serialize(&Serializer::json_compatible())
			.map_err(|e| CapabilityError::new("TypeError", e.to_string()))?;

		let promise = devices
			.get_user_media_with_constraints(js_constraints.unchecked_ref())
			.map_err(capability_error)?;
		let stream = JsFuture::from(promise).await.map_err(capability_error)?;
		Ok(stream.unchecked_into())
	}
}

/// `chrome.runtime.sendMessage`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeRuntimeChannel;

#[async_trait(?Send)]
impl ExtensionChannel for ChromeRuntimeChannel {
	async fn send_message(&self, extension_id: &str, request: &StreamRequest) -> Result<Option<StreamResponse>, ChannelError> {
		let (runtime, send) = chrome_runtime().ok_or(ChannelError::Unavailable)?;
		let payload = request
			.serialize(&Serializer::json_compatible())
			.map_err(|e| ChannelError::Failed(e.to_string()))?;
		let extension_id = JsValue::from_str(extension_id);

		let mut sent = Ok(JsValue::UNDEFINED);
		let reply = Promise::new(&mut |resolve: Function, _reject: Function| {
			let callback = Closure::once_into_js(move |response: JsValue| {
				let _ = resolve.call1(&JsValue::UNDEFINED, &response);
			});
			sent = send.call3(&runtime, &extension_id, &payload, &callback);
		});
		// sendMessage throws synchronously when the page may not message extensions.
		sent.map_err(|_| ChannelError::Unavailable)?;

		let response = JsFuture::from(reply)
			.await
			.map_err(|e| ChannelError::Failed(format!("{e:?}")))?;
		if response.is_undefined() || response.is_null() {
			return Ok(None);
		}
		serde_wasm_bindgen::from_value(response)
			.map(Some)
			.map_err(|e| ChannelError::Failed(e.to_string()))
	}
}

/// Negotiator wired to the current page.
pub fn browser_negotiator(settings: &Settings) -> Negotiator<BrowserHost, BrowserMediaDevices, ChromeRuntimeChannel> {
	Negotiator::new(BrowserHost, BrowserMediaDevices, ChromeRuntimeChannel).with_settings(settings)
}

/// Connection factory for the current page.
///
/// Session ids follow [`Settings::connection_sequence`].
pub fn browser_factory(registry: StackRegistry, settings: &Settings) -> ConnectionFactory<BrowserHost> {
	ConnectionFactory::new(BrowserHost, registry).with_sequence(settings.connection_sequence())
}

fn chrome_runtime() -> Option<(JsValue, Function)> {
	let chrome = Reflect::get(&js_sys::global(), &JsValue::from_str("chrome"))
		.ok()
		.filter(JsValue::is_object)?;
	let runtime = Reflect::get(&chrome, &JsValue::from_str("runtime"))
		.ok()
		.filter(JsValue::is_object)?;
	let send = Reflect::get(&runtime, &JsValue::from_str("sendMessage"))
		.ok()?
		.dyn_into::<Function>()
		.ok()?;
	Some((runtime, send))
}

fn capability_error(value: JsValue) -> CapabilityError {
	let field = |key: &str| {
		Reflect::get(&value, &JsValue::from_str(key))
			.ok()
			.and_then(|v| v.as_string())
	};
	CapabilityError::new(
		field("name").unwrap_or_else(|| "Error".to_string()),
		field("message").unwrap_or_else(|| format!("{value:?}")),
	)
}
