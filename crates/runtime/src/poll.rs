//! Polling driver: repeat a read command until a predicate holds.
//!
//! Replaces fixed sleeps ("navigate, wait three seconds, hope it loaded")
//! with a bounded loop of `send_and_wait` cycles.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::time::Instant;

use crate::connection::CommandClient;
use crate::error::{Error, Result};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(30);

/// Pacing and deadline for [`CommandClient::poll`].
///
/// The interval has no enforced minimum; a zero interval re-issues the read
/// command as soon as the previous answer arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
	/// Pause between two reads
	pub interval: Duration,
	/// Overall deadline, measured from the first read
	pub timeout: Duration,
}

impl Default for PollOptions {
	fn default() -> Self {
		Self {
			interval: DEFAULT_POLL_INTERVAL,
			timeout: DEFAULT_POLL_TIMEOUT,
		}
	}
}

impl PollOptions {
	pub fn new(interval: Duration, timeout: Duration) -> Self {
		Self { interval, timeout }
	}

	pub fn with_interval(mut self, interval: Duration) -> Self {
		self.interval = interval;
		self
	}

	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;
		self
	}
}

impl CommandClient {
	/// Issues `method` until `predicate` accepts its decoded result.
	///
	/// Each read is bounded by the time left before the deadline. A state that
	/// satisfies the predicate is returned even if the deadline passed while
	/// it was being read. Fails with:
	/// - [`Error::PollTimeout`] when the deadline elapses first
	/// - [`Error::ProtocolError`] when a result does not decode into `T`
	/// - any error of the read command itself (a remote error aborts polling)
	pub async fn poll<T, F>(&self, method: &str, params: Value, mut predicate: F, options: PollOptions) -> Result<T>
	where
		T: DeserializeOwned,
		F: FnMut(&T) -> bool,
	{
		let started = Instant::now();
		let deadline = started + options.timeout;
		let mut attempts: u32 = 0;

		let timed_out = |attempts: u32| Error::PollTimeout {
			method: method.to_string(),
			attempts,
			elapsed: started.elapsed(),
		};

		loop {
			let remaining = deadline.saturating_duration_since(Instant::now());
			if remaining.is_zero() {
				return Err(timed_out(attempts));
			}

			attempts += 1;
			let value = match self.send_and_wait(method, params.clone(), remaining).await {
				Ok(value) => value,
				Err(Error::CommandTimeout { .. }) => return Err(timed_out(attempts)),
				Err(e) => return Err(e),
			};

			let state: T = serde_json::from_value(value)
				.map_err(|e| Error::ProtocolError(format!("unexpected {method} result while polling: {e}")))?;
			if predicate(&state) {
				tracing::debug!(method, attempts, elapsed_ms = started.elapsed().as_millis() as u64, "poll satisfied");
				return Ok(state);
			}
			tracing::trace!(method, attempts, "poll predicate not yet satisfied");

			let remaining = deadline.saturating_duration_since(Instant::now());
			if remaining.is_zero() {
				return Err(timed_out(attempts));
			}
			tokio::time::sleep(options.interval.min(remaining)).await;
		}
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;
	use std::sync::atomic::{AtomicU32, Ordering};

	use serde::Deserialize;
	use serde_json::json;

	use super::*;
	use crate::connection::ClientOptions;
	use crate::transport::{ChannelTransport, RemotePeer};

	#[derive(Debug, Deserialize)]
	struct Readiness {
		ready: bool,
		attempt: u32,
	}

	fn fast_poll() -> PollOptions {
		PollOptions::new(Duration::from_millis(5), Duration::from_secs(5))
	}

	/// Answers every request with `answer(n)`, where `n` counts from 1.
	fn spawn_responder<F>(mut peer: RemotePeer, answer: F) -> Arc<AtomicU32>
	where
		F: Fn(u32) -> Option<Value> + Send + 'static,
	{
		let count = Arc::new(AtomicU32::new(0));
		let seen = Arc::clone(&count);
		tokio::spawn(async move {
			while let Some(request) = peer.next_request().await {
				let n = seen.fetch_add(1, Ordering::SeqCst) + 1;
				match answer(n) {
					Some(result) => peer.respond(request.id, result),
					None => peer.respond_error(request.id, -32000, "Cannot find context with specified id"),
				};
			}
		});
		count
	}

	#[tokio::test]
	async fn test_poll_returns_on_fourth_read() {
		let (parts, peer) = ChannelTransport::pair();
		let client = CommandClient::from_transport("channel://poll", parts, ClientOptions::default());
		let reads = spawn_responder(peer, |n| Some(json!({ "ready": n >= 4, "attempt": n })));

		let state: Readiness = client
			.poll("Test.readiness", json!({}), |state: &Readiness| state.ready, fast_poll())
			.await
			.unwrap();

		assert!(state.ready);
		assert_eq!(state.attempt, 4);
		assert_eq!(reads.load(Ordering::SeqCst), 4);
	}

	fn ratio_poll() -> PollOptions {
		// One interval unit against a five-unit deadline.
		PollOptions::new(Duration::from_millis(10), Duration::from_millis(50))
	}

	#[tokio::test(start_paused = true)]
	async fn test_poll_fourth_read_within_tight_deadline() {
		let (parts, peer) = ChannelTransport::pair();
		let client = CommandClient::from_transport("channel://poll", parts, ClientOptions::default());
		let reads = spawn_responder(peer, |n| Some(json!({ "ready": n >= 4, "attempt": n })));

		let started = Instant::now();
		let state: Readiness = client
			.poll("Test.readiness", json!({}), |state: &Readiness| state.ready, ratio_poll())
			.await
			.unwrap();

		assert_eq!(state.attempt, 4);
		assert_eq!(reads.load(Ordering::SeqCst), 4);
		let elapsed = started.elapsed();
		assert!(elapsed >= Duration::from_millis(30) && elapsed < Duration::from_millis(40), "{elapsed:?}");
	}

	#[tokio::test(start_paused = true)]
	async fn test_poll_last_read_before_deadline_counts() {
		let (parts, peer) = ChannelTransport::pair();
		let client = CommandClient::from_transport("channel://poll", parts, ClientOptions::default());
		let reads = spawn_responder(peer, |n| Some(json!({ "ready": n >= 5, "attempt": n })));

		let state: Readiness = client
			.poll("Test.readiness", json!({}), |state: &Readiness| state.ready, ratio_poll())
			.await
			.unwrap();

		assert_eq!(state.attempt, 5);
		assert_eq!(reads.load(Ordering::SeqCst), 5);
	}

	#[tokio::test(start_paused = true)]
	async fn test_poll_no_read_after_deadline() {
		let (parts, peer) = ChannelTransport::pair();
		let client = CommandClient::from_transport("channel://poll", parts, ClientOptions::default());
		let reads = spawn_responder(peer, |n| Some(json!({ "ready": n >= 6, "attempt": n })));

		let err = client
			.poll("Test.readiness", json!({}), |state: &Readiness| state.ready, ratio_poll())
			.await
			.unwrap_err();

		assert!(matches!(err, Error::PollTimeout { attempts: 5, .. }), "{err:?}");
		assert_eq!(reads.load(Ordering::SeqCst), 5);
	}

	#[tokio::test]
	async fn test_poll_times_out_when_predicate_never_holds() {
		let (parts, peer) = ChannelTransport::pair();
		let client = CommandClient::from_transport("channel://poll", parts, ClientOptions::default());
		spawn_responder(peer, |n| Some(json!({ "ready": false, "attempt": n })));

		let options = PollOptions::new(Duration::from_millis(10), Duration::from_millis(80));
		let err = client
			.poll("Test.readiness", json!({}), |state: &Readiness| state.ready, options)
			.await
			.unwrap_err();

		assert!(err.is_timeout());
		match err {
			Error::PollTimeout { method, attempts, elapsed } => {
				assert_eq!(method, "Test.readiness");
				assert!(attempts >= 1);
				assert!(elapsed >= Duration::from_millis(80));
			}
			other => panic!("expected PollTimeout, got {other:?}"),
		}
		assert!(client.is_connected());
	}

	#[tokio::test]
	async fn test_poll_times_out_when_reads_go_unanswered() {
		let (parts, mut peer) = ChannelTransport::pair();
		let client = CommandClient::from_transport("channel://poll", parts, ClientOptions::default());
		let drain = tokio::spawn(async move { while peer.next_request().await.is_some() {} });

		let options = PollOptions::new(Duration::from_millis(10), Duration::from_millis(50));
		let err = client
			.poll::<Value, _>("Test.silent", json!({}), |_| true, options)
			.await
			.unwrap_err();

		assert!(matches!(err, Error::PollTimeout { attempts: 1, .. }));
		assert_eq!(client.pending_count(), 0);
		client.close().await;
		drain.await.unwrap();
	}

	#[tokio::test]
	async fn test_poll_aborts_on_remote_error() {
		let (parts, peer) = ChannelTransport::pair();
		let client = CommandClient::from_transport("channel://poll", parts, ClientOptions::default());
		let reads = spawn_responder(peer, |n| (n < 2).then(|| json!({ "ready": false, "attempt": n })));

		let err = client
			.poll("Test.readiness", json!({}), |state: &Readiness| state.ready, fast_poll())
			.await
			.unwrap_err();

		assert_eq!(err.remote().map(|e| e.code), Some(-32000));
		assert_eq!(reads.load(Ordering::SeqCst), 2);
	}

	#[tokio::test]
	async fn test_poll_rejects_undecodable_state() {
		let (parts, peer) = ChannelTransport::pair();
		let client = CommandClient::from_transport("channel://poll", parts, ClientOptions::default());
		spawn_responder(peer, |_| Some(json!({ "status": "loading" })));

		let err = client
			.poll("Test.readiness", json!({}), |state: &Readiness| state.ready, fast_poll())
			.await
			.unwrap_err();

		assert!(matches!(err, Error::ProtocolError(_)));
	}

	#[tokio::test]
	async fn test_zero_timeout_never_reads() {
		let (parts, peer) = ChannelTransport::pair();
		let client = CommandClient::from_transport("channel://poll", parts, ClientOptions::default());
		let reads = spawn_responder(peer, |n| Some(json!({ "ready": true, "attempt": n })));

		let options = PollOptions::default().with_timeout(Duration::ZERO);
		let err = client
			.poll("Test.readiness", json!({}), |state: &Readiness| state.ready, options)
			.await
			.unwrap_err();

		assert!(matches!(err, Error::PollTimeout { attempts: 0, .. }));
		assert_eq!(reads.load(Ordering::SeqCst), 0);
	}
}
