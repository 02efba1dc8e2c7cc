//! Command client: the send/await API over one connection.
//!
//! A [`CommandClient`] owns exactly one connection. Commands are written
//! through the transport's sender half (serialized by a write lock) and
//! correlated with their responses by the [`CorrelationRegistry`]; the
//! [`FrameReader`](reader) task owns the read half for the lifetime of the
//! connection.
//!
//! Lifecycle: `Disconnected -> Connecting -> Connected -> Closing -> Closed`,
//! or `Connected -> Closed` directly when the connection fails. Nothing
//! leaves `Closed`.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use devtools_protocol::{CommandId, Request};
use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::{Mutex as TokioMutex, oneshot, watch};
use tokio::task::JoinHandle;

use crate::error::{Error, Result};
use crate::registry::{CorrelationRegistry, PendingCommand, ResultReceiver};
use crate::transport::{TransportParts, TransportReceiver, TransportSender, WebSocketTransport};

mod options;
mod reader;


pub use options::{
	ClientOptions, DEFAULT_COMMAND_TIMEOUT, DEFAULT_CONNECT_TIMEOUT, DEFAULT_MAX_MESSAGE_SIZE, EventSink,
};
pub use reader::FrameStats;
use reader::{FrameCounters, FrameReader, ReaderExit};

/// Connection lifecycle state of a [`CommandClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
	Disconnected,
	Connecting,
	Connected,
	Closing,
	Closed,
}

impl fmt::Display for ClientState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			ClientState::Disconnected => "disconnected",
			ClientState::Connecting => "connecting",
			ClientState::Connected => "connected",
			ClientState::Closing => "closing",
			ClientState::Closed => "closed",
		};
		f.write_str(name)
	}
}

struct ReaderHandle {
	shutdown: oneshot::Sender<()>,
	task: JoinHandle<ReaderExit>,
}

/// A command that was written and whose result has not been collected.
///
/// Holds the only receiver of the command's result. Dropping the handle (or
/// an [`await_result`](CommandClient::await_result) future that owns it)
/// expires the command, so its response is dropped when it arrives.
#[must_use = "a command is expired when its handle is dropped"]
pub struct SentCommand {
	id: CommandId,
	method: String,
	rx: ResultReceiver,
	registry: Arc<CorrelationRegistry>,
}

impl SentCommand {
	pub fn id(&self) -> CommandId {
		self.id
	}

	pub fn method(&self) -> &str {
		&self.method
	}
}

impl fmt::Debug for SentCommand {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SentCommand")
			.field("id", &self.id)
			.field("method", &self.method)
			.finish_non_exhaustive()
	}
}

impl Drop for SentCommand {
	fn drop(&mut self) {
		if self.registry.expire(self.id).is_some() {
			tracing::debug!(id = %self.id, method = %self.method, "expired command whose handle was dropped");
		}
	}
}

/// Client for one remote debugging connection.
///
/// Cheap operations take `&self`, so a client is usually shared behind an
/// `Arc` between concurrent callers.
pub struct CommandClient {
	endpoint: Arc<str>,
	options: ClientOptions,
	registry: Arc<CorrelationRegistry>,
	sender: TokioMutex<Option<Box<dyn TransportSender>>>,
	state: Arc<watch::Sender<ClientState>>,
	counters: Arc<FrameCounters>,
	reader: Mutex<Option<ReaderHandle>>,
}

impl fmt::Debug for CommandClient {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("CommandClient")
			.field("endpoint", &self.endpoint)
			.field("state", &self.state())
			.field("pending", &self.registry.len())
			.finish_non_exhaustive()
	}
}

impl CommandClient {
	/// Creates a disconnected client for a WebSocket `endpoint`; see [`open`](Self::open).
	pub fn new(endpoint: impl Into<String>, options: ClientOptions) -> Self {
		Self::build(endpoint.into(), options, None, ClientState::Disconnected)
	}

	/// Connects to a WebSocket `endpoint`.
	///
	/// Fails with [`Error::Connection`] on a network or handshake failure or
	/// when `options.connect_timeout` elapses. There is no automatic retry.
	pub async fn connect(endpoint: impl Into<String>, options: ClientOptions) -> Result<Self> {
		let client = Self::new(endpoint, options);
		client.open().await?;
		Ok(client)
	}

	/// Attaches to an already established transport (pipe, in-memory).
	///
	/// Must be called from within a Tokio runtime; the frame reader is spawned
	/// immediately.
	pub fn from_transport(endpoint: impl Into<String>, parts: TransportParts, options: ClientOptions) -> Self {
		let TransportParts { sender, receiver } = parts;
		let client = Self::build(endpoint.into(), options, Some(sender), ClientState::Connected);
		client.spawn_reader(receiver);
		tracing::info!(endpoint = %client.endpoint, "attached to transport");
		client
	}

	fn build(
		endpoint: String,
		options: ClientOptions,
		sender: Option<Box<dyn TransportSender>>,
		state: ClientState,
	) -> Self {
		let (state, _) = watch::channel(state);
		Self {
			endpoint: Arc::from(endpoint),
			options,
			registry: Arc::new(CorrelationRegistry::new()),
			sender: TokioMutex::new(sender),
			state: Arc::new(state),
			counters: Arc::new(FrameCounters::default()),
			reader: Mutex::new(None),
		}
	}

	/// Opens the WebSocket connection of a client created with [`new`](Self::new).
	///
	/// A failed attempt returns the client to `Disconnected`, so `open` may be
	/// called again. Opening a connected client is a no-op.
	pub async fn open(&self) -> Result<()> {
		let mut prior = ClientState::Disconnected;
		let started = self.state.send_if_modified(|state| {
			prior = *state;
			if *state == ClientState::Disconnected {
				*state = ClientState::Connecting;
				true
			} else {
				false
			}
		});
		if !started {
			return match prior {
				ClientState::Connected => Ok(()),
				ClientState::Connecting => Err(Error::Connection {
					endpoint: self.endpoint.to_string(),
					reason: "connection attempt already in progress".into(),
				}),
				_ => Err(Error::NotConnected),
			};
		}

		tracing::info!(endpoint = %self.endpoint, "connecting");
		let parts = match WebSocketTransport::connect(
			&self.endpoint,
			self.options.connect_timeout,
			self.options.max_message_size,
		)
		.await
		{
			Ok(parts) => parts,
			Err(e) => {
				self.state.send_replace(ClientState::Disconnected);
				return Err(e);
			}
		};

		let TransportParts { sender, receiver } = parts;
		*self.sender.lock().await = Some(sender);
		self.state.send_replace(ClientState::Connected);
		self.spawn_reader(receiver);
		tracing::info!(endpoint = %self.endpoint, "connected");
		Ok(())
	}

	fn spawn_reader(&self, receiver: Box<dyn TransportReceiver>) {
		let (shutdown, shutdown_rx) = oneshot::channel();
		let reader = FrameReader {
			receiver,
			registry: Arc::clone(&self.registry),
			event_sink: self.options.event_sink.clone(),
			counters: Arc::clone(&self.counters),
			state: Arc::clone(&self.state),
			endpoint: Arc::clone(&self.endpoint),
		};
		let task = tokio::spawn(reader.run(shutdown_rx));
		*self.reader.lock() = Some(ReaderHandle { shutdown, task });
	}

	pub fn endpoint(&self) -> &str {
		&self.endpoint
	}

	pub fn options(&self) -> &ClientOptions {
		&self.options
	}

	pub fn state(&self) -> ClientState {
		*self.state.borrow()
	}

	pub fn is_connected(&self) -> bool {
		self.state() == ClientState::Connected
	}

	/// Snapshot of the frame reader's counters.
	pub fn stats(&self) -> FrameStats {
		self.counters.snapshot()
	}

	/// Number of commands sent but not yet resolved, failed or expired.
	pub fn pending_count(&self) -> usize {
		self.registry.len()
	}

	/// Resolves once the client reaches `Closed`.
	pub async fn closed(&self) {
		let mut rx = self.state.subscribe();
		// The sender lives as long as `self`.
		let _ = rx.wait_for(|state| *state == ClientState::Closed).await;
	}

	/// Writes one command and returns the handle carrying its identifier.
	///
	/// The command is registered before it is written, so a response that
	/// races the write still resolves it. Collect the result with
	/// [`await_result`](Self::await_result).
	///
	/// A failed write ends the session: every other pending command fails
	/// with [`Error::ConnectionClosed`] and the client moves to `Closed`.
	pub async fn send(&self, method: &str, params: Value) -> Result<SentCommand> {
		if !self.is_connected() {
			return Err(Error::NotConnected);
		}

		let id = self.registry.next_id();
		let request = Request::new(id, method, params);
		let text = request.to_text()?;
		let (pending, rx) = PendingCommand::new(request);

		self.registry.register(id, pending).map_err(|e| match e {
			Error::ConnectionClosed => Error::NotConnected,
			other => other,
		})?;
		let command = SentCommand {
			id,
			method: method.to_string(),
			rx,
			registry: Arc::clone(&self.registry),
		};

		tracing::debug!(%id, method, "sending command");
		let written = {
			let mut sender = self.sender.lock().await;
			match sender.as_mut() {
				Some(sender) => sender.send(text).await,
				None => Err(Error::NotConnected),
			}
		};

		if let Err(e) = written {
			tracing::warn!(%id, method, error = %e, "failed to write command");
			drop(command);
			if !matches!(e, Error::NotConnected) {
				self.fail_connection().await;
			}
			return Err(e);
		}
		Ok(command)
	}

	/// Tears the session down after a fatal write error.
	///
	/// Mirrors what the frame reader does on a read error: stop reading, fail
	/// every pending command and move `Connected` to `Closed`.
	async fn fail_connection(&self) {
		let reader = self.reader.lock().take();
		if let Some(ReaderHandle { shutdown, task }) = reader {
			let _ = shutdown.send(());
			if let Err(e) = task.await {
				tracing::warn!(endpoint = %self.endpoint, error = %e, "frame reader task failed");
			}
		}

		let failed = self.registry.close();

		let sender = self.sender.lock().await.take();
		if let Some(mut sender) = sender {
			if let Err(e) = sender.close().await {
				tracing::debug!(endpoint = %self.endpoint, error = %e, "error closing transport");
			}
		}

		self.state.send_if_modified(|state| {
			if *state == ClientState::Connected {
				*state = ClientState::Closed;
				true
			} else {
				false
			}
		});
		tracing::warn!(endpoint = %self.endpoint, failed, "connection closed after write failure");
	}

	/// Waits for the result of a sent command.
	///
	/// On timeout the command is expired, its late response will be dropped,
	/// and [`Error::CommandTimeout`] is returned; other commands are not
	/// affected.
	pub async fn await_result(&self, mut command: SentCommand, timeout: Duration) -> Result<Value> {
		let id = command.id;
		match tokio::time::timeout(timeout, &mut command.rx).await {
			Ok(delivered) => delivered.unwrap_or(Err(Error::ConnectionClosed)),
			Err(_) => {
				if self.registry.expire(id).is_none() {
					// Resolved (or failed by close) between the deadline and the expiry.
					if let Ok(result) = command.rx.try_recv() {
						return result;
					}
				}
				let method = std::mem::take(&mut command.method);
				tracing::warn!(%id, method, timeout_ms = timeout.as_millis() as u64, "command timed out");
				Err(Error::CommandTimeout { id, method, timeout })
			}
		}
	}

	/// [`send`](Self::send) followed by [`await_result`](Self::await_result).
	pub async fn send_and_wait(&self, method: &str, params: Value, timeout: Duration) -> Result<Value> {
		let command = self.send(method, params).await?;
		self.await_result(command, timeout).await
	}

	/// [`send_and_wait`](Self::send_and_wait) with the configured command timeout.
	pub async fn call(&self, method: &str, params: Value) -> Result<Value> {
		self.send_and_wait(method, params, self.options.command_timeout).await
	}

	/// Typed [`call`](Self::call): serializes `params` and decodes the result into `R`.
	pub async fn invoke<P, R>(&self, method: &str, params: &P) -> Result<R>
	where
		P: Serialize + ?Sized,
		R: DeserializeOwned,
	{
		let params = serde_json::to_value(params)?;
		let result = self.call(method, params).await?;
		serde_json::from_value(result).map_err(|e| Error::ProtocolError(format!("unexpected {method} result: {e}")))
	}

	/// Closes the connection.
	///
	/// Stops the frame reader (no frame is processed after this returns),
	/// fails every pending command with [`Error::ConnectionClosed`] and closes
	/// the write side. Idempotent.
	pub async fn close(&self) {
		let mut prior = ClientState::Closed;
		self.state.send_if_modified(|state| {
			prior = *state;
			match state {
				ClientState::Closing | ClientState::Closed => false,
				_ => {
					*state = ClientState::Closing;
					true
				}
			}
		});
		if prior == ClientState::Closing {
			self.closed().await;
			return;
		}

		let reader = self.reader.lock().take();
		if let Some(ReaderHandle { shutdown, task }) = reader {
			// Err means the reader already exited on its own.
			let _ = shutdown.send(());
			match task.await {
				Ok(exit) => tracing::debug!(endpoint = %self.endpoint, ?exit, "frame reader stopped"),
				Err(e) => tracing::warn!(endpoint = %self.endpoint, error = %e, "frame reader task failed"),
			}
		}

		let failed = self.registry.close();

		let sender = self.sender.lock().await.take();
		if let Some(mut sender) = sender {
			if let Err(e) = sender.close().await {
				tracing::debug!(endpoint = %self.endpoint, error = %e, "error closing transport");
			}
		}

		self.state.send_replace(ClientState::Closed);
		if prior != ClientState::Closed {
			tracing::info!(endpoint = %self.endpoint, failed, "connection closed");
		}
	}
}

impl Drop for CommandClient {
	fn drop(&mut self) {
		if let Some(reader) = self.reader.get_mut().take() {
			reader.task.abort();
		}
		self.registry.close();
		self.state.send_replace(ClientState::Closed);
	}
}
