//! WebSocket transport: one text message per frame.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Error as WsError;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::WebSocketConfig;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use super::{TransportParts, TransportReceiver, TransportSender};
use crate::error::{Error, Result};

/// Connector for `ws://` / `wss://` debugging endpoints.
pub struct WebSocketTransport;

impl WebSocketTransport {
	/// Opens a WebSocket connection and splits it into transport halves.
	///
	/// Fails with [`Error::Connection`] on a network or handshake failure, or
	/// when the handshake does not finish within `connect_timeout`.
	pub async fn connect(endpoint: &str, connect_timeout: Duration, max_message_size: Option<usize>) -> Result<TransportParts> {
		let config = WebSocketConfig {
			max_message_size,
			..Default::default()
		};

		let connecting = tokio_tungstenite::connect_async_with_config(endpoint, Some(config), false);
		let (stream, response) = match tokio::time::timeout(connect_timeout, connecting).await {
			Ok(Ok(established)) => established,
			Ok(Err(e)) => {
				return Err(Error::Connection {
					endpoint: endpoint.to_string(),
					reason: e.to_string(),
				});
			}
			Err(_) => {
				return Err(Error::Connection {
					endpoint: endpoint.to_string(),
					reason: format!("handshake timed out after {}ms", connect_timeout.as_millis()),
				});
			}
		};

		tracing::debug!(endpoint, status = %response.status(), "WebSocket handshake complete");
		Ok(Self::from_stream::<MaybeTlsStream<TcpStream>>(stream))
	}

	/// Wraps an already established WebSocket stream.
	pub fn from_stream<S>(stream: WebSocketStream<S>) -> TransportParts
	where
		S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
	{
		let (sink, stream) = stream.split();
		TransportParts::new(WebSocketSender { sink }, WebSocketReceiver { stream })
	}
}

/// Write half of a WebSocket transport.
pub struct WebSocketSender<S> {
	sink: SplitSink<WebSocketStream<S>, Message>,
}

#[async_trait]
impl<S> TransportSender for WebSocketSender<S>
where
	S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
	async fn send(&mut self, frame: String) -> Result<()> {
		self.sink
			.send(Message::Text(frame))
			.await
			.map_err(|e| Error::Transport(format!("failed to send WebSocket message: {e}")))
	}

	async fn close(&mut self) -> Result<()> {
		match self.sink.close().await {
			Ok(()) | Err(WsError::ConnectionClosed) | Err(WsError::AlreadyClosed) => Ok(()),
			Err(e) => Err(Error::Transport(format!("failed to close WebSocket: {e}"))),
		}
	}
}

/// Read half of a WebSocket transport.
pub struct WebSocketReceiver<S> {
	stream: SplitStream<WebSocketStream<S>>,
}

#[async_trait]
impl<S> TransportReceiver for WebSocketReceiver<S>
where
	S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
	async fn recv(&mut self) -> Option<Result<Vec<u8>>> {
		loop {
			match self.stream.next().await? {
				Ok(Message::Text(text)) => return Some(Ok(text.into_bytes())),
				Ok(Message::Binary(bytes)) => return Some(Ok(bytes)),
				Ok(Message::Close(frame)) => {
					tracing::debug!(?frame, "WebSocket closed by remote");
					return None;
				}
				// Control frames are answered by tungstenite itself.
				Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_)) => continue,
				Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => return None,
				Err(e) => return Some(Err(Error::Transport(format!("WebSocket read failed: {e}")))),
			}
		}
	}
}
