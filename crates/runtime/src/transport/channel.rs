//! In-memory transport pair.
//!
//! [`ChannelTransport::pair`] returns the client's [`TransportParts`] plus a
//! [`RemotePeer`] that plays the endpoint: it reads the commands the client
//! wrote and pushes arbitrary frames back, in any order.

use async_trait::async_trait;
use devtools_protocol::{CommandId, Request};
use serde_json::{Value, json};
use tokio::sync::mpsc;

use super::{TransportParts, TransportReceiver, TransportSender};
use crate::error::{Error, Result};

type InboundFrame = Result<Vec<u8>>;

pub struct ChannelTransport;

impl ChannelTransport {
	pub fn pair() -> (TransportParts, RemotePeer) {
		let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
		let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();

		let parts = TransportParts::new(
			ChannelSender { tx: Some(outbound_tx) },
			ChannelReceiver { rx: inbound_rx },
		);
		let peer = RemotePeer {
			requests: outbound_rx,
			frames: inbound_tx,
		};
		(parts, peer)
	}
}

/// Write half handed to the client.
pub struct ChannelSender {
	tx: Option<mpsc::UnboundedSender<String>>,
}

#[async_trait]
impl TransportSender for ChannelSender {
	async fn send(&mut self, frame: String) -> Result<()> {
		let tx = self.tx.as_ref().ok_or(Error::ConnectionClosed)?;
		tx.send(frame).map_err(|_| Error::Transport("remote peer dropped".into()))
	}

	async fn close(&mut self) -> Result<()> {
		self.tx = None;
		Ok(())
	}
}

/// Read half handed to the client.
pub struct ChannelReceiver {
	rx: mpsc::UnboundedReceiver<InboundFrame>,
}

#[async_trait]
impl TransportReceiver for ChannelReceiver {
	async fn recv(&mut self) -> Option<Result<Vec<u8>>> {
		self.rx.recv().await
	}
}

/// The endpoint side of a [`ChannelTransport`] pair.
///
/// Dropping the peer (or calling [`close`](Self::close)) ends the client's
/// read stream.
pub struct RemotePeer {
	requests: mpsc::UnboundedReceiver<String>,
	frames: mpsc::UnboundedSender<InboundFrame>,
}

impl RemotePeer {
	/// Next command written by the client, `None` once the client closed.
	pub async fn next_request(&mut self) -> Option<Request> {
		loop {
			let text = self.requests.recv().await?;
			match serde_json::from_str(&text) {
				Ok(request) => return Some(request),
				Err(e) => tracing::warn!(error = %e, frame = %text, "skipping frame that is not a request"),
			}
		}
	}

	/// Pushes one raw frame, valid or not. Returns `false` if the client is gone.
	pub fn send_raw(&self, frame: impl Into<String>) -> bool {
		self.frames.send(Ok(frame.into().into_bytes())).is_ok()
	}

	pub fn respond(&self, id: CommandId, result: Value) -> bool {
		self.send_raw(json!({ "id": id, "result": result }).to_string())
	}

	pub fn respond_error(&self, id: CommandId, code: i64, message: &str) -> bool {
		self.send_raw(json!({ "id": id, "error": { "code": code, "message": message } }).to_string())
	}

	pub fn emit(&self, method: &str, params: Value) -> bool {
		self.send_raw(json!({ "method": method, "params": params }).to_string())
	}

	/// Simulates an I/O failure on the client's read side.
	pub fn fail(&self, reason: &str) -> bool {
		self.frames.send(Err(Error::Transport(reason.to_string()))).is_ok()
	}

	/// Closes the connection from the endpoint side.
	pub fn close(self) {}
}
