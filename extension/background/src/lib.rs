//! Screen-capture extension background worker.
//!
//! Pages message this extension with `{getStream: true}`; it shows Chrome's
//! desktop picker for the sender's tab and answers `{streamId}`. A cancelled
//! picker answers with nothing, which the page reads as access denied.

use js_sys::{Array, Function, Reflect};
use rtcgate_protocol::{StreamRequest, StreamResponse};
use serde::Serialize;
use serde_wasm_bindgen::Serializer;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

/// Sources offered in the picker.
pub const CAPTURE_SOURCES: [&str; 2] = ["screen", "window"];

#[wasm_bindgen(start)]
pub fn start() {
	console_error_panic_hook::set_once();

	let listener = Closure::<dyn FnMut(JsValue, JsValue, Function) -> bool>::new(
		|message: JsValue, sender: JsValue, send_response: Function| on_external_message(message, sender, send_response),
	);
	runtime_on_message_external_add_listener(&listener);
	listener.forget();
}

fn on_external_message(message: JsValue, sender: JsValue, send_response: Function) -> bool {
	let request: StreamRequest = serde_wasm_bindgen::from_value(message).unwrap_or_default();
	if !wants_stream(&request) {
		return false;
	}

	let tab = Reflect::get(&sender, &JsValue::from_str("tab")).unwrap_or(JsValue::UNDEFINED);
	let sources: Array = CAPTURE_SOURCES.iter().map(|s| JsValue::from_str(s)).collect();

	let on_chosen = Closure::once_into_js(move |stream_id: JsValue| {
		let reply = stream_id.as_string().and_then(|id| reply_for(&id));
		if let Err(err) = respond(&send_response, reply.as_ref()) {
			web_sys::console::error_2(&JsValue::from_str("getStream reply failed"), &err);
		}
	});
	desktop_capture_choose_desktop_media(&sources, &tab, on_chosen.unchecked_ref());

	// Keeps the message channel open until the picker callback answers.
	true
}

/// Whether a page message asks for a desktop stream id.
pub fn wants_stream(request: &StreamRequest) -> bool {
	request.get_stream
}

/// Reply for a picker result; the picker reports cancellation as an empty id.
pub fn reply_for(stream_id: &str) -> Option<StreamResponse> {
	(!stream_id.is_empty()).then(|| StreamResponse::with_stream_id(stream_id))
}

fn respond(send_response: &Function, reply: Option<&StreamResponse>) -> Result<JsValue, JsValue> {
	match reply {
		Some(reply) => {
			let value = reply.serialize(&Serializer::json_compatible())?;
			send_response.call1(&JsValue::UNDEFINED, &value)
		}
		None => send_response.call0(&JsValue::UNDEFINED),
	}
}

#[wasm_bindgen]
extern "C" {
	#[wasm_bindgen(js_namespace = ["chrome", "runtime", "onMessageExternal"], js_name = addListener)]
	fn runtime_on_message_external_add_listener(cb: &Closure<dyn FnMut(JsValue, JsValue, Function) -> bool>);

	#[wasm_bindgen(js_namespace = ["chrome", "desktopCapture"], js_name = chooseDesktopMedia)]
	fn desktop_capture_choose_desktop_media(sources: &Array, tab: &JsValue, callback: &Function) -> i32;
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn only_get_stream_is_answered() {
		assert!(wants_stream(&StreamRequest::GET_STREAM));
		assert!(!wants_stream(&StreamRequest::default()));
	}

	#[test]
	fn cancelled_picker_gets_no_reply() {
		assert_eq!(reply_for(""), None);
		assert_eq!(reply_for("abc"), Some(StreamResponse::with_stream_id("abc")));
	}
}
