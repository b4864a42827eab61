//! Extension round-trip for Chromium desktop capture.
//!
//! Chromium hands out desktop stream ids only to extensions, so the page asks
//! a companion extension for one. The two ways this can fail are kept apart:
//! the messaging channel may be missing entirely, or the extension may answer
//! without an id (not installed for this origin, or the user cancelled).

use async_trait::async_trait;
use rtcgate_protocol::{StreamRequest, StreamResponse};
use thiserror::Error;

/// Failure of the messaging mechanism itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
	/// The host exposes no extension messaging API.
	#[error("extension messaging is not available")]
	Unavailable,

	#[error("extension messaging failed: {0}")]
	Failed(String),
}

/// Page → extension messaging (`chrome.runtime.sendMessage`).
#[async_trait(?Send)]
pub trait ExtensionChannel {
	/// Sends `request` to the extension and waits for its reply.
	///
	/// `Ok(None)` means the extension answered with nothing. There is no
	/// timeout; an extension that never answers leaves this pending.
	async fn send_message(&self, extension_id: &str, request: &StreamRequest) -> Result<Option<StreamResponse>, ChannelError>;
}

/// Channel for hosts without extension messaging.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExtensionChannel;

#[async_trait(?Send)]
impl ExtensionChannel for NoExtensionChannel {
	async fn send_message(&self, _extension_id: &str, _request: &StreamRequest) -> Result<Option<StreamResponse>, ChannelError> {
		Err(ChannelError::Unavailable)
	}
}

/// Outcome of a failed stream id request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamIdError {
	#[error("screen-capture extension unreachable: {0}")]
	ChannelUnreachable(#[source] ChannelError),

	#[error("screen-capture extension returned no stream id")]
	NoResponse,
}

/// Asks the extension `extension_id` for a desktop stream id.
pub async fn request_stream_id<C>(channel: &C, extension_id: &str) -> Result<String, StreamIdError>
where
	C: ExtensionChannel + ?Sized,
{
	let response = channel
		.send_message(extension_id, &StreamRequest::GET_STREAM)
		.await
		.map_err(StreamIdError::ChannelUnreachable)?;

	response.and_then(|r| r.stream_id).ok_or(StreamIdError::NoResponse)
}

#[cfg(test)]
mod tests {
	use super::*;

	struct Replying(Option<StreamResponse>);

	#[async_trait(?Send)]
	impl ExtensionChannel for Replying {
		async fn send_message(&self, extension_id: &str, request: &StreamRequest) -> Result<Option<StreamResponse>, ChannelError> {
			assert_eq!(extension_id, "ext-id");
			assert!(request.get_stream);
			Ok(self.0.clone())
		}
	}

	#[tokio::test]
	async fn stream_id_is_extracted() {
		let channel = Replying(Some(StreamResponse::with_stream_id("desk-1")));
		assert_eq!(request_stream_id(&channel, "ext-id").await, Ok("desk-1".to_string()));
	}

	#[tokio::test]
	async fn missing_reply_and_missing_id_are_no_response() {
		assert_eq!(request_stream_id(&Replying(None), "ext-id").await, Err(StreamIdError::NoResponse));
		assert_eq!(
			request_stream_id(&Replying(Some(StreamResponse::default())), "ext-id").await,
			Err(StreamIdError::NoResponse)
		);
	}

	#[tokio::test]
	async fn absent_channel_is_unreachable() {
		assert_eq!(
			request_stream_id(&NoExtensionChannel, "ext-id").await,
			Err(StreamIdError::ChannelUnreachable(ChannelError::Unavailable))
		);
	}
}
