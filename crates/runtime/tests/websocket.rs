//! Command client against an in-process WebSocket endpoint.

use std::time::Duration;

use devtools_runtime::{ClientOptions, ClientState, CommandClient, Error, Page};
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_tungstenite::tungstenite::Message;

const WAIT: Duration = Duration::from_secs(5);

/// How the fake endpoint treats each command.
#[derive(Clone, Copy)]
enum Behavior {
	/// Emit an event, then echo the method name (as binary for odd ids).
	Echo,
	/// Close the socket on the first command without answering.
	HangUp,
}

/// Serves one WebSocket session; the returned receiver fires when it ends.
async fn spawn_endpoint(behavior: Behavior) -> (String, oneshot::Receiver<()>) {
	let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
	let addr = listener.local_addr().unwrap();
	let (done_tx, done_rx) = oneshot::channel();

	tokio::spawn(async move {
		let (stream, _) = listener.accept().await.unwrap();
		let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();

		while let Some(Ok(message)) = ws.next().await {
			let Message::Text(text) = message else {
				if message.is_close() {
					break;
				}
				continue;
			};
			let request: Value = serde_json::from_str(&text).unwrap();

			match behavior {
				Behavior::Echo => {
					let event = json!({ "method": "Runtime.consoleAPICalled", "params": { "type": "log" } });
					ws.send(Message::Text(event.to_string())).await.unwrap();

					let response = json!({ "id": request["id"], "result": { "echo": request["method"] } }).to_string();
					let frame = if request["id"].as_u64().unwrap_or(0) % 2 == 1 {
						Message::Binary(response.into_bytes())
					} else {
						Message::Text(response)
					};
					ws.send(frame).await.unwrap();
				}
				Behavior::HangUp => {
					let _ = ws.close(None).await;
					break;
				}
			}
		}
		let _ = done_tx.send(());
	});

	(format!("ws://{addr}/devtools/page/TEST"), done_rx)
}

#[tokio::test]
async fn test_connect_call_and_close() {
	let (endpoint, done) = spawn_endpoint(Behavior::Echo).await;
	let (options, mut events) = ClientOptions::default().with_command_timeout(WAIT).event_channel();

	let client = CommandClient::connect(&endpoint, options).await.unwrap();
	assert_eq!(client.state(), ClientState::Connected);
	assert_eq!(client.endpoint(), endpoint);

	let first = client.call("Page.enable", json!({})).await.unwrap();
	assert_eq!(first["echo"], "Page.enable");
	let second = client.call("Runtime.enable", json!({})).await.unwrap();
	assert_eq!(second["echo"], "Runtime.enable");

	let event = tokio::time::timeout(WAIT, events.recv()).await.unwrap().unwrap();
	assert_eq!(event.method, "Runtime.consoleAPICalled");

	let stats = client.stats();
	assert_eq!(stats.responses_resolved, 2);
	assert_eq!(stats.events_received, 2);

	client.close().await;
	assert_eq!(client.state(), ClientState::Closed);
	tokio::time::timeout(WAIT, done).await.unwrap().unwrap();
}

#[tokio::test]
async fn test_page_helpers_over_websocket() {
	let (endpoint, _done) = spawn_endpoint(Behavior::Echo).await;
	let client = CommandClient::connect(&endpoint, ClientOptions::default().with_command_timeout(WAIT))
		.await
		.unwrap();

	// The echo endpoint answers every command with a success document.
	Page::new(&client).enable("Network").await.unwrap();
	client.close().await;
}

#[tokio::test]
async fn test_remote_hang_up_fails_pending_command() {
	let (endpoint, _done) = spawn_endpoint(Behavior::HangUp).await;
	let client = CommandClient::connect(&endpoint, ClientOptions::default()).await.unwrap();

	let err = client.send_and_wait("Page.navigate", json!({ "url": "about:blank" }), WAIT).await.unwrap_err();
	assert!(matches!(err, Error::ConnectionClosed), "got {err:?}");
	assert!(err.is_session_lost());

	tokio::time::timeout(WAIT, client.closed()).await.unwrap();
	assert!(matches!(client.send("Page.enable", json!({})).await, Err(Error::NotConnected)));
}

#[tokio::test]
async fn test_connect_failure_is_connection_error() {
	let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
	let addr = listener.local_addr().unwrap();
	drop(listener);

	let err = CommandClient::connect(format!("ws://{addr}/devtools/browser"), ClientOptions::default())
		.await
		.unwrap_err();
	match err {
		Error::Connection { endpoint, .. } => assert!(endpoint.contains(&addr.to_string())),
		other => panic!("expected Connection error, got {other:?}"),
	}
}
