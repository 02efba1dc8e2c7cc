//! Wire types for the browser remote-debugging protocol.
//!
//! This crate contains the serde-serializable types exchanged with a remote
//! debugging endpoint. These types represent the "protocol layer" - the
//! shapes of data as they appear on the wire.
//!
//! # Design Philosophy
//!
//! Types in this crate are:
//! - **Pure data**: No I/O, only encoding, decoding and classification
//! - **Exhaustive**: Every inbound frame decodes to exactly one [`Frame`]
//!   variant or a [`FrameError`]
//! - **Stable**: Changes only when the wire protocol changes
//!
//! The connection, correlation and polling machinery lives in
//! `devtools-runtime`.

pub mod message;
pub mod page;
pub mod runtime;
pub mod target;

pub use message::*;
pub use page::*;
pub use runtime::*;
pub use target::*;
