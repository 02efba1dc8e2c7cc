//! Message-framed bidirectional transports.
//!
//! A transport is split into two halves so the frame reader can own the only
//! read handle while writers share the send half behind a lock:
//!
//! - [`TransportSender`]: writes one frame per call
//! - [`TransportReceiver`]: yields one raw frame per call, `None` on clean close
//!
//! Implementations:
//! - [`WebSocketTransport`]: one text message per frame
//! - [`PipeTransport`]: NUL-terminated frames over a byte stream
//!   (the browser's `--remote-debugging-pipe` framing)
//! - [`ChannelTransport`]: in-memory pair for embedding a scripted endpoint

use async_trait::async_trait;

use crate::error::Result;

mod channel;
mod pipe;
mod websocket;

#[cfg(test)]
mod tests;

pub use channel::{ChannelReceiver, ChannelSender, ChannelTransport, RemotePeer};
pub use pipe::{PipeReceiver, PipeSender, PipeTransport};
pub use websocket::{WebSocketReceiver, WebSocketSender, WebSocketTransport};

/// Write half of a transport.
#[async_trait]
pub trait TransportSender: Send {
	/// Writes one complete frame.
	async fn send(&mut self, frame: String) -> Result<()>;

	/// Closes the write side, signalling the peer where the framing allows it.
	async fn close(&mut self) -> Result<()>;
}

/// Read half of a transport.
#[async_trait]
pub trait TransportReceiver: Send {
	/// Next raw frame.
	///
	/// Returns `None` once the peer closed the connection and `Some(Err(_))`
	/// on an I/O failure; both end the session.
	async fn recv(&mut self) -> Option<Result<Vec<u8>>>;
}

/// Both halves of an established transport.
pub struct TransportParts {
	pub sender: Box<dyn TransportSender>,
	pub receiver: Box<dyn TransportReceiver>,
}

impl TransportParts {
	pub fn new(sender: impl TransportSender + 'static, receiver: impl TransportReceiver + 'static) -> Self {
		Self {
			sender: Box::new(sender),
			receiver: Box::new(receiver),
		}
	}
}
