//! # LineVis: Line-Protocol Telemetry Pipeline
//!
//! A real-time ingest and visualization pipeline for delimited text
//! telemetry, the kind of stream a microcontroller prints over a serial
//! port. Bytes go in at one end; bounded, render-ready plot series come
//! out the other.
//!
//! ## Architecture
//!
//! - **Protocol**: Framing and field parsing of raw byte chunks into
//!   packets ([`protocol`])
//! - **Ingest**: A worker thread driving the parse loop, fanning packets
//!   out on a lossless logging stream and a rate-limited display stream
//!   ([`ingest`])
//! - **History**: A shared bounded ring of recent packets ([`history`])
//! - **Render**: Per-channel series, point-budget downsampling and
//!   throttled range estimation ([`render`])
//! - **Record**: CSV recording fed from the lossless stream ([`record`])
//! - **Communication**: Crossbeam channels between the worker and every
//!   consumer
//!
//! ## Example
//!
//! ```no_run
//! use linevis::config::Profile;
//! use linevis::history::PacketHistory;
//! use linevis::ingest::IngestSession;
//! use linevis::render::RenderState;
//! use std::sync::Arc;
//!
//! let profile = Profile::default();
//! let history = Arc::new(PacketHistory::new());
//! let (session, streams) = IngestSession::spawn(&profile, history);
//!
//! session.feed(b"1.0,2.0\n".to_vec());
//!
//! let mut render = RenderState::new(&profile.display);
//! while let Ok(packet) = streams.display_rx.try_recv() {
//!     render.ingest(&packet);
//! }
//! let frame = render.tick();
//! # drop(frame);
//! ```

pub mod config;
pub mod error;
pub mod history;
pub mod ingest;
pub mod protocol;
pub mod record;
pub mod render;
pub mod types;

pub use error::{LinevisError, Result};
pub use types::Packet;
