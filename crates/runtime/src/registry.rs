//! Correlation registry: identifier issuance and pending-command tracking.
//!
//! Identifiers come from a monotonic counter and are never reused on one
//! connection, so a response that arrives after its command expired can only
//! miss (and be dropped), never resolve a different command.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use devtools_protocol::{CommandId, Request, ResponseOutcome};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::oneshot;

use crate::error::{Error, Result};

/// Receiving half of a pending command's result slot.
pub type ResultReceiver = oneshot::Receiver<Result<Value>>;

/// A command awaiting its response.
#[derive(Debug)]
pub struct PendingCommand {
	request: Request,
	created_at: Instant,
	slot: oneshot::Sender<Result<Value>>,
}

impl PendingCommand {
	/// Creates the pending entry and the receiver its result will be delivered to.
	pub fn new(request: Request) -> (Self, ResultReceiver) {
		let (slot, rx) = oneshot::channel();
		let pending = Self {
			request,
			created_at: Instant::now(),
			slot,
		};
		(pending, rx)
	}

	pub fn id(&self) -> CommandId {
		self.request.id
	}

	pub fn method(&self) -> &str {
		&self.request.method
	}

	/// The originating request.
	pub fn request(&self) -> &Request {
		&self.request
	}

	/// Time since the command was created.
	pub fn age(&self) -> Duration {
		self.created_at.elapsed()
	}

	fn fulfill(self, result: Result<Value>) {
		let id = self.request.id;
		if self.slot.send(result).is_err() {
			tracing::debug!(%id, "result receiver already dropped");
		}
	}
}

#[derive(Default)]
struct RegistryState {
	pending: HashMap<CommandId, PendingCommand>,
	closed: bool,
}

/// Issues command identifiers and tracks outstanding commands.
///
/// The id-to-pending map is the only mutable state shared between callers
/// and the frame reader; every operation takes the lock briefly and never
/// across an await point.
#[derive(Default)]
pub struct CorrelationRegistry {
	last_id: AtomicU64,
	state: Mutex<RegistryState>,
}

impl CorrelationRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns a fresh identifier, strictly greater than every one issued before.
	pub fn next_id(&self) -> CommandId {
		CommandId(self.last_id.fetch_add(1, Ordering::SeqCst) + 1)
	}

	/// Records a pending command under `id`.
	pub fn register(&self, id: CommandId, pending: PendingCommand) -> Result<()> {
		let mut state = self.state.lock();
		if state.closed {
			return Err(Error::ConnectionClosed);
		}
		if state.pending.contains_key(&id) {
			return Err(Error::DuplicateIdentifier(id));
		}
		state.pending.insert(id, pending);
		Ok(())
	}

	/// Fulfills the pending command `id` with `outcome`.
	///
	/// Returns `false` without side effects when `id` is not pending: an
	/// unknown id, or a command that already resolved or expired.
	pub fn resolve(&self, id: CommandId, outcome: ResponseOutcome) -> bool {
		let Some(pending) = self.state.lock().pending.remove(&id) else {
			return false;
		};
		tracing::debug!(%id, method = pending.method(), elapsed_ms = pending.age().as_millis() as u64, "resolved command");
		pending.fulfill(outcome.into_result().map_err(Error::Remote));
		true
	}

	/// Stops tracking `id`; a response arriving later is dropped by [`resolve`](Self::resolve).
	pub fn expire(&self, id: CommandId) -> Option<PendingCommand> {
		self.state.lock().pending.remove(&id)
	}

	/// Fails every pending command with [`Error::ConnectionClosed`] and refuses
	/// further registrations. Returns the number of commands failed.
	pub fn close(&self) -> usize {
		let drained: Vec<PendingCommand> = {
			let mut state = self.state.lock();
			state.closed = true;
			state.pending.drain().map(|(_, pending)| pending).collect()
		};
		let count = drained.len();
		for pending in drained {
			pending.fulfill(Err(Error::ConnectionClosed));
		}
		count
	}

	pub fn is_closed(&self) -> bool {
		self.state.lock().closed
	}

	pub fn contains(&self, id: CommandId) -> bool {
		self.state.lock().pending.contains_key(&id)
	}

	pub fn len(&self) -> usize {
		self.state.lock().pending.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}
