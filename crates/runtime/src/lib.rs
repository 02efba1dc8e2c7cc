//! Remote debugging session runtime - connection, correlation, polling
//!
//! This crate talks to a browser's remote debugging endpoint:
//!
//! - **Transport**: message-framed connections (WebSocket, NUL-delimited pipe, in-memory)
//! - **Correlation**: identifier issuance and pending-command tracking
//! - **Connection**: the [`CommandClient`] send/await API and its frame reader
//! - **Polling**: repeat a read command until a predicate holds
//! - **Discovery**: the `/json/*` HTTP routes next to the WebSocket endpoints
//! - **Page**: typed helpers for navigation, evaluation and screenshots
//!
//! # Architecture
//!
//! ```text
//!  callers ──send──► CommandClient ──write lock──► TransportSender ──► endpoint
//!                       │    ▲
//!              register │    │ resolve(id)
//!                       ▼    │
//!               CorrelationRegistry ◄── FrameReader ◄── TransportReceiver ◄── endpoint
//!                                           │
//!                                           └──► event sink (frames without an id)
//! ```
//!
//! # Example
//!
//! ```ignore
//! let http = DevToolsHttp::new("127.0.0.1", 9222, Duration::from_secs(2))?;
//! let ws = http.page_websocket_url(None).await?;
//! let client = CommandClient::connect(ws, ClientOptions::default()).await?;
//! let page = Page::new(&client);
//! page.navigate("https://example.com").await?;
//! page.wait_for_load(PollOptions::default()).await?;
//! println!("{}", page.title().await?);
//! client.close().await;
//! ```

pub mod connection;
pub mod discovery;
pub mod error;
pub mod page;
pub mod poll;
pub mod registry;
pub mod transport;

pub use connection::{ClientOptions, ClientState, CommandClient, EventSink, FrameStats, SentCommand};
pub use discovery::DevToolsHttp;
pub use error::{Error, Result};
pub use page::Page;
pub use poll::PollOptions;
pub use registry::{CorrelationRegistry, PendingCommand};
pub use transport::{
	ChannelTransport, PipeTransport, RemotePeer, TransportParts, TransportReceiver, TransportSender,
	WebSocketTransport,
};
