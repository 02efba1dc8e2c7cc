//! Client configuration.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use devtools_protocol::Event;
use tokio::sync::mpsc;

/// Callback receiving unsolicited event frames.
///
/// Runs on the frame reader task, so it must return promptly; anything slow
/// belongs behind a channel (see [`ClientOptions::event_channel`]).
pub type EventSink = Arc<dyn Fn(Event) + Send + Sync>;

pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 64 << 20;

/// Options for a [`CommandClient`](super::CommandClient).
#[derive(Clone)]
pub struct ClientOptions {
	/// Timeout used by [`CommandClient::call`](super::CommandClient::call)
	pub command_timeout: Duration,
	/// Upper bound on the connect handshake
	pub connect_timeout: Duration,
	/// Largest accepted inbound WebSocket message (screenshots are big)
	pub max_message_size: Option<usize>,
	/// Receives event frames; events are discarded when unset
	pub event_sink: Option<EventSink>,
}

impl Default for ClientOptions {
	fn default() -> Self {
		Self {
			command_timeout: DEFAULT_COMMAND_TIMEOUT,
			connect_timeout: DEFAULT_CONNECT_TIMEOUT,
			max_message_size: Some(DEFAULT_MAX_MESSAGE_SIZE),
			event_sink: None,
		}
	}
}

impl fmt::Debug for ClientOptions {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ClientOptions")
			.field("command_timeout", &self.command_timeout)
			.field("connect_timeout", &self.connect_timeout)
			.field("max_message_size", &self.max_message_size)
			.field("event_sink", &self.event_sink.is_some())
			.finish()
	}
}

impl ClientOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
		self.command_timeout = timeout;
		self
	}

	pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
		self.connect_timeout = timeout;
		self
	}

	pub fn with_max_message_size(mut self, size: Option<usize>) -> Self {
		self.max_message_size = size;
		self
	}

	pub fn with_event_sink<F>(mut self, sink: F) -> Self
	where
		F: Fn(Event) + Send + Sync + 'static,
	{
		self.event_sink = Some(Arc::new(sink));
		self
	}

	/// Routes events into an unbounded channel and returns its receiver.
	pub fn event_channel(self) -> (Self, mpsc::UnboundedReceiver<Event>) {
		let (tx, rx) = mpsc::unbounded_channel();
		let options = self.with_event_sink(move |event| {
			// Receiver dropped: nobody is listening any more.
			let _ = tx.send(event);
		});
		(options, rx)
	}
}
