//! Pipe transport: NUL-terminated JSON frames over a byte stream.
//!
//! This is the framing browsers use with `--remote-debugging-pipe`: the
//! client writes `<json>\0` and reads frames up to the next `\0`.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use super::{TransportParts, TransportReceiver, TransportSender};
use crate::error::{Error, Result};

const FRAME_DELIMITER: u8 = b'\0';

/// Transport over an `AsyncWrite` (frames out) and `AsyncRead` (frames in) pair.
pub struct PipeTransport<W, R> {
	writer: W,
	reader: R,
}

impl<W, R> PipeTransport<W, R>
where
	W: AsyncWrite + Unpin + Send + 'static,
	R: AsyncRead + Unpin + Send + 'static,
{
	pub fn new(writer: W, reader: R) -> Self {
		Self { writer, reader }
	}

	pub fn into_parts(self) -> TransportParts {
		TransportParts::new(
			PipeSender { writer: self.writer },
			PipeReceiver {
				reader: BufReader::new(self.reader),
			},
		)
	}
}

/// Write half of a pipe transport.
pub struct PipeSender<W> {
	writer: W,
}

#[async_trait]
impl<W> TransportSender for PipeSender<W>
where
	W: AsyncWrite + Unpin + Send + 'static,
{
	async fn send(&mut self, frame: String) -> Result<()> {
		let mut bytes = frame.into_bytes();
		bytes.push(FRAME_DELIMITER);
		self.writer
			.write_all(&bytes)
			.await
			.map_err(|e| Error::Transport(format!("Failed to write frame: {e}")))?;
		self.writer
			.flush()
			.await
			.map_err(|e| Error::Transport(format!("Failed to flush frame: {e}")))
	}

	async fn close(&mut self) -> Result<()> {
		self.writer
			.shutdown()
			.await
			.map_err(|e| Error::Transport(format!("Failed to close pipe: {e}")))
	}
}

/// Read half of a pipe transport.
pub struct PipeReceiver<R> {
	reader: BufReader<R>,
}

#[async_trait]
impl<R> TransportReceiver for PipeReceiver<R>
where
	R: AsyncRead + Unpin + Send + 'static,
{
	async fn recv(&mut self) -> Option<Result<Vec<u8>>> {
		loop {
			let mut frame = Vec::new();
			match self.reader.read_until(FRAME_DELIMITER, &mut frame).await {
				Ok(0) => return None,
				Ok(_) => {
					if frame.last() == Some(&FRAME_DELIMITER) {
						frame.pop();
					}
					// Back-to-back delimiters carry nothing.
					if frame.is_empty() {
						continue;
					}
					return Some(Ok(frame));
				}
				Err(e) => return Some(Err(Error::Transport(format!("Failed to read frame: {e}")))),
			}
		}
	}
}
