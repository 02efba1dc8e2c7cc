use tokio::io::{AsyncReadExt, AsyncWriteExt};

use super::*;

#[tokio::test]
async fn test_pipe_send_appends_delimiter() {
	// Transport writes into `to_browser_write`, we read from `to_browser_read`.
	let (mut to_browser_read, to_browser_write) = tokio::io::duplex(1024);
	let (from_browser_read, _from_browser_write) = tokio::io::duplex(1024);

	let TransportParts { mut sender, .. } = PipeTransport::new(to_browser_write, from_browser_read).into_parts();

	let message = serde_json::json!({"id": 1, "method": "Page.enable", "params": {}});
	sender.send(message.to_string()).await.unwrap();

	let expected_len = message.to_string().len() + 1;
	let mut buf = vec![0u8; expected_len];
	to_browser_read.read_exact(&mut buf).await.unwrap();

	assert_eq!(buf.last(), Some(&0u8));
	let received: serde_json::Value = serde_json::from_slice(&buf[..expected_len - 1]).unwrap();
	assert_eq!(received, message);
}

#[tokio::test]
async fn test_pipe_multiple_frames_in_one_write() {
	let (_to_browser_read, to_browser_write) = tokio::io::duplex(4096);
	let (from_browser_read, mut from_browser_write) = tokio::io::duplex(4096);

	let TransportParts { mut receiver, .. } = PipeTransport::new(to_browser_write, from_browser_read).into_parts();

	let messages = [
		serde_json::json!({"id": 1, "result": {}}),
		serde_json::json!({"method": "Page.loadEventFired", "params": {"timestamp": 1.0}}),
		serde_json::json!({"id": 2, "result": {"value": 3}}),
	];

	let mut wire = Vec::new();
	for msg in &messages {
		wire.extend_from_slice(msg.to_string().as_bytes());
		wire.push(0);
	}
	from_browser_write.write_all(&wire).await.unwrap();
	from_browser_write.flush().await.unwrap();

	for expected in &messages {
		let frame = receiver.recv().await.unwrap().unwrap();
		let received: serde_json::Value = serde_json::from_slice(&frame).unwrap();
		assert_eq!(&received, expected);
	}
}

#[tokio::test]
async fn test_pipe_large_frame() {
	let (_to_browser_read, to_browser_write) = tokio::io::duplex(1024);
	let (from_browser_read, mut from_browser_write) = tokio::io::duplex(1024 * 1024);

	let TransportParts { mut receiver, .. } = PipeTransport::new(to_browser_write, from_browser_read).into_parts();

	// Larger than the BufReader's internal buffer
	let large = serde_json::json!({"id": 1, "result": {"data": "x".repeat(100_000)}});
	let mut wire = large.to_string().into_bytes();
	wire.push(0);

	let writer = tokio::spawn(async move {
		from_browser_write.write_all(&wire).await.unwrap();
		from_browser_write.flush().await.unwrap();
		from_browser_write
	});

	let frame = receiver.recv().await.unwrap().unwrap();
	let received: serde_json::Value = serde_json::from_slice(&frame).unwrap();
	assert_eq!(received, large);
	drop(writer.await.unwrap());
}

#[tokio::test]
async fn test_pipe_skips_empty_frames_and_ends_on_eof() {
	let (_to_browser_read, to_browser_write) = tokio::io::duplex(1024);
	let (from_browser_read, mut from_browser_write) = tokio::io::duplex(1024);

	let TransportParts { mut receiver, .. } = PipeTransport::new(to_browser_write, from_browser_read).into_parts();

	from_browser_write.write_all(b"\0\0{\"id\":1}\0").await.unwrap();
	drop(from_browser_write);

	let frame = receiver.recv().await.unwrap().unwrap();
	assert_eq!(frame, b"{\"id\":1}");
	assert!(receiver.recv().await.is_none());
}

#[tokio::test]
async fn test_pipe_unterminated_tail_is_delivered() {
	let (_to_browser_read, to_browser_write) = tokio::io::duplex(1024);
	let (from_browser_read, mut from_browser_write) = tokio::io::duplex(1024);

	let TransportParts { mut receiver, .. } = PipeTransport::new(to_browser_write, from_browser_read).into_parts();

	from_browser_write.write_all(b"{\"id\":").await.unwrap();
	drop(from_browser_write);

	// The partial tail surfaces as a frame (which will fail to decode), then EOF.
	assert_eq!(receiver.recv().await.unwrap().unwrap(), b"{\"id\":");
	assert!(receiver.recv().await.is_none());
}

#[tokio::test]
async fn test_pipe_close_shuts_down_writer() {
	let (mut to_browser_read, to_browser_write) = tokio::io::duplex(1024);
	let (from_browser_read, _from_browser_write) = tokio::io::duplex(1024);

	let TransportParts { mut sender, .. } = PipeTransport::new(to_browser_write, from_browser_read).into_parts();
	sender.close().await.unwrap();

	let mut rest = Vec::new();
	let n = to_browser_read.read_to_end(&mut rest).await.unwrap();
	assert_eq!(n, 0);
}

#[tokio::test]
async fn test_channel_pair_round_trip() {
	let (parts, mut peer) = ChannelTransport::pair();
	let TransportParts { mut sender, mut receiver } = parts;

	sender
		.send(r#"{"id":5,"method":"Runtime.evaluate","params":{"expression":"1+1"}}"#.to_string())
		.await
		.unwrap();
	let request = peer.next_request().await.unwrap();
	assert_eq!(request.id.get(), 5);
	assert_eq!(request.method, "Runtime.evaluate");

	assert!(peer.respond(request.id, serde_json::json!({"result": {"type": "number", "value": 2}})));
	let frame = receiver.recv().await.unwrap().unwrap();
	let value: serde_json::Value = serde_json::from_slice(&frame).unwrap();
	assert_eq!(value["id"], 5);
	assert_eq!(value["result"]["result"]["value"], 2);

	peer.close();
	assert!(receiver.recv().await.is_none());
}

#[tokio::test]
async fn test_channel_sender_close_ends_peer_stream() {
	let (parts, mut peer) = ChannelTransport::pair();
	let TransportParts { mut sender, receiver: _receiver } = parts;

	sender.close().await.unwrap();
	assert!(peer.next_request().await.is_none());
	assert!(sender.send("{}".to_string()).await.is_err());
}
