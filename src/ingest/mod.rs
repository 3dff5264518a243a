//! Ingestion pipeline
//!
//! Owns the worker thread that converts raw source bytes into packets.
//! Callers push [`SourceEvent`]s in, steer the worker with
//! [`IngestCommand`]s, and consume packets from the three receivers in
//! [`PacketStreams`]: lossless logging, rate-limited display, and raw
//! lines.

pub mod emitter;
pub mod worker;

pub use emitter::{DualRateEmitter, RateLimiter};
pub use worker::IngestWorker;

use crate::config::Profile;
use crate::history::PacketHistory;
use crate::types::Packet;
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

/// Depth of the bounded display channel. Deep enough to absorb a slow
/// frame, shallow enough that a stalled consumer sheds load quickly.
const DISPLAY_CHANNEL_DEPTH: usize = 256;

/// Input to the ingest worker from a byte source.
#[derive(Debug, Clone)]
pub enum SourceEvent {
    /// A chunk of raw bytes, split at arbitrary positions
    Bytes(Vec<u8>),
    /// The source came up (port opened, socket accepted)
    Connected { detail: String },
    /// The source went away
    Disconnected { detail: String },
}

/// Control commands for the ingest worker.
#[derive(Debug, Clone)]
pub enum IngestCommand {
    /// Replace the active protocol's parser configuration
    SetParserConfig(crate::config::ParserConfig),
    /// Switch the active protocol by registry id
    SetProtocol(String),
    /// Change the display path's target rate in Hz
    SetDisplayRate(u32),
    /// Enable or disable display rate limiting
    SetRateLimitEnabled(bool),
    /// Clear parser, limiter and counter state
    Reset,
    /// Stop the worker thread
    Shutdown,
}

/// The consumer ends of the three packet fan-out channels.
pub struct PacketStreams {
    /// Every parsed packet, lossless. Feed this to recorders.
    pub logging_rx: Receiver<Packet>,
    /// Rate-limited packets for rendering. Bounded; may drop under load.
    pub display_rx: Receiver<Packet>,
    /// Every framed line, before parsing.
    pub raw_rx: Receiver<String>,
}

/// Handle to a running ingest worker thread.
pub struct IngestSession {
    source_tx: Sender<SourceEvent>,
    command_tx: Sender<IngestCommand>,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl IngestSession {
    /// Spawn the worker thread and return the session handle together with
    /// the packet stream receivers.
    pub fn spawn(profile: &Profile, history: Arc<PacketHistory>) -> (Self, PacketStreams) {
        let (source_tx, source_rx) = unbounded();
        let (command_tx, command_rx) = unbounded();
        let (logging_tx, logging_rx) = unbounded();
        let (display_tx, display_rx) = bounded(DISPLAY_CHANNEL_DEPTH);
        let (raw_tx, raw_rx) = unbounded();

        let running = Arc::new(AtomicBool::new(true));
        let emitter = DualRateEmitter::new(
            logging_tx,
            display_tx,
            raw_tx,
            RateLimiter::new(
                profile.display.rate_limit_enabled,
                profile.display.target_display_hz,
            ),
        );

        let mut worker = IngestWorker::new(
            profile,
            source_rx,
            command_rx,
            emitter,
            history,
            running.clone(),
        );
        let handle = std::thread::Builder::new()
            .name("ingest-worker".to_string())
            .spawn(move || worker.run())
            .ok();

        (
            Self {
                source_tx,
                command_tx,
                running,
                handle,
            },
            PacketStreams {
                logging_rx,
                display_rx,
                raw_rx,
            },
        )
    }

    /// Sender for pushing source events from an I/O loop.
    pub fn source_sender(&self) -> Sender<SourceEvent> {
        self.source_tx.clone()
    }

    /// Push one chunk of source bytes.
    pub fn feed(&self, bytes: impl Into<Vec<u8>>) {
        let _ = self.source_tx.send(SourceEvent::Bytes(bytes.into()));
    }

    /// Send a control command to the worker.
    pub fn send_command(&self, cmd: IngestCommand) {
        let _ = self.command_tx.send(cmd);
    }

    /// Whether the worker thread is still running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stop the worker and join its thread.
    pub fn close(&mut self) {
        let _ = self.command_tx.send(IngestCommand::Shutdown);
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for IngestSession {
    fn drop(&mut self) {
        self.close();
    }
}
