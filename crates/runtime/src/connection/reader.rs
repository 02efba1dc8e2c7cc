//! Frame reader: the single consumer of a connection's read half.
//!
//! Decodes each inbound frame and routes it:
//! - response whose id is pending: resolves that command
//! - response whose id is not pending (late, unknown): counted and dropped
//! - event: handed to the event sink, or dropped when there is none
//! - undecodable: logged and counted; the loop keeps going
//!
//! When the read half ends (clean close or I/O error) every pending command
//! fails with `ConnectionClosed`.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use devtools_protocol::Frame;
use serde::Serialize;
use tokio::sync::{oneshot, watch};

use super::ClientState;
use super::options::EventSink;
use crate::registry::CorrelationRegistry;
use crate::transport::TransportReceiver;

/// Counters maintained by the frame reader.
#[derive(Debug, Default)]
pub(crate) struct FrameCounters {
	frames: AtomicU64,
	resolved: AtomicU64,
	unmatched: AtomicU64,
	events: AtomicU64,
	malformed: AtomicU64,
}

impl FrameCounters {
	pub(crate) fn snapshot(&self) -> FrameStats {
		FrameStats {
			frames_received: self.frames.load(Ordering::Relaxed),
			responses_resolved: self.resolved.load(Ordering::Relaxed),
			responses_unmatched: self.unmatched.load(Ordering::Relaxed),
			events_received: self.events.load(Ordering::Relaxed),
			malformed_frames: self.malformed.load(Ordering::Relaxed),
		}
	}
}

/// Point-in-time copy of the reader's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameStats {
	pub frames_received: u64,
	pub responses_resolved: u64,
	/// Responses for ids that were unknown, already resolved, or expired
	pub responses_unmatched: u64,
	pub events_received: u64,
	pub malformed_frames: u64,
}

/// Why the reader loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReaderExit {
	/// The client asked the reader to stop.
	Shutdown,
	/// The peer closed the connection.
	Eof,
	/// The read half failed.
	IoError,
}

pub(crate) struct FrameReader {
	pub(crate) receiver: Box<dyn TransportReceiver>,
	pub(crate) registry: Arc<CorrelationRegistry>,
	pub(crate) event_sink: Option<EventSink>,
	pub(crate) counters: Arc<FrameCounters>,
	pub(crate) state: Arc<watch::Sender<ClientState>>,
	pub(crate) endpoint: Arc<str>,
}

impl FrameReader {
	/// Reads until the connection ends or `shutdown` fires (or its sender is dropped).
	pub(crate) async fn run(mut self, mut shutdown: oneshot::Receiver<()>) -> ReaderExit {
		let exit = loop {
			let next = tokio::select! {
				biased;
				_ = &mut shutdown => break ReaderExit::Shutdown,
				next = self.receiver.recv() => next,
			};

			match next {
				Some(Ok(bytes)) => self.route(&bytes),
				Some(Err(e)) => {
					tracing::warn!(endpoint = %self.endpoint, error = %e, "connection read failed");
					break ReaderExit::IoError;
				}
				None => {
					tracing::info!(endpoint = %self.endpoint, "connection closed by remote");
					break ReaderExit::Eof;
				}
			}
		};

		let failed = self.registry.close();
		if failed > 0 {
			tracing::debug!(endpoint = %self.endpoint, failed, "failed pending commands on reader exit");
		}

		// A fatal read moves Connected straight to Closed; a shutdown is
		// finished by `close()` itself.
		if exit != ReaderExit::Shutdown {
			self.state.send_if_modified(|state| {
				if *state == ClientState::Connected {
					*state = ClientState::Closed;
					true
				} else {
					false
				}
			});
		}
		exit
	}

	fn route(&self, bytes: &[u8]) {
		self.counters.frames.fetch_add(1, Ordering::Relaxed);

		match Frame::decode(bytes) {
			Ok(Frame::Response(response)) => {
				let id = response.id;
				if self.registry.resolve(id, response.outcome) {
					self.counters.resolved.fetch_add(1, Ordering::Relaxed);
				} else {
					self.counters.unmatched.fetch_add(1, Ordering::Relaxed);
					tracing::debug!(%id, "dropping response for a command that is not pending");
				}
			}
			Ok(Frame::Event(event)) => {
				self.counters.events.fetch_add(1, Ordering::Relaxed);
				match &self.event_sink {
					Some(sink) => sink(event),
					None => tracing::trace!(method = %event.method, "discarding event"),
				}
			}
			Err(e) => {
				let count = self.counters.malformed.fetch_add(1, Ordering::Relaxed) + 1;
				tracing::warn!(
					endpoint = %self.endpoint,
					error = %e,
					malformed_total = count,
					preview = %String::from_utf8_lossy(&bytes[..bytes.len().min(120)]),
					"discarding malformed frame"
				);
			}
		}
	}
}
