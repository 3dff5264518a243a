//! Ingest worker thread
//!
//! The worker owns the full byte-to-packet path: it receives source
//! events and control commands over crossbeam channels, feeds bytes
//! through the active protocol, appends parsed packets to the shared
//! history, and fans them out through the dual-rate emitter. The parse
//! loop itself never blocks on a consumer.

use crate::config::{ParserConfig, Profile};
use crate::history::PacketHistory;
use crate::ingest::emitter::{DualRateEmitter, RateLimiter};
use crate::ingest::{IngestCommand, SourceEvent};
use crate::protocol::{LineParser, ParseEvent, ProtocolRegistry};
use crate::types::ConnectionState;
use crossbeam_channel::{select, Receiver};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub struct IngestWorker {
    source_rx: Receiver<SourceEvent>,
    command_rx: Receiver<IngestCommand>,
    registry: ProtocolRegistry,
    emitter: DualRateEmitter,
    history: Arc<PacketHistory>,
    connection_state: ConnectionState,
    running: Arc<AtomicBool>,
    parse_errors: u64,
}

impl IngestWorker {
    pub fn new(
        profile: &Profile,
        source_rx: Receiver<SourceEvent>,
        command_rx: Receiver<IngestCommand>,
        emitter: DualRateEmitter,
        history: Arc<PacketHistory>,
        running: Arc<AtomicBool>,
    ) -> Self {
        let mut registry = ProtocolRegistry::new();
        registry.register(
            "line",
            Box::new(LineParser::with_config(profile.parser.clone())),
        );

        Self {
            source_rx,
            command_rx,
            registry,
            emitter,
            history,
            connection_state: ConnectionState::Disconnected,
            running,
            parse_errors: 0,
        }
    }

    /// Run until shutdown is commanded or both channels disconnect.
    pub fn run(&mut self) {
        tracing::info!("Ingest worker started");

        while self.running.load(Ordering::SeqCst) {
            select! {
                recv(self.command_rx) -> cmd => match cmd {
                    Ok(cmd) => self.handle_command(cmd),
                    Err(_) => {
                        self.running.store(false, Ordering::SeqCst);
                    }
                },
                recv(self.source_rx) -> event => match event {
                    Ok(event) => self.handle_source_event(event),
                    Err(_) => {
                        self.running.store(false, Ordering::SeqCst);
                    }
                },
            }
        }

        tracing::info!(
            parse_errors = self.parse_errors,
            display_dropped = self.emitter.display_dropped(),
            "Ingest worker stopped"
        );
    }

    fn handle_command(&mut self, cmd: IngestCommand) {
        match cmd {
            IngestCommand::SetParserConfig(config) => {
                self.apply_parser_config(&config);
            }
            IngestCommand::SetProtocol(id) => {
                self.registry.set_active(&id);
            }
            IngestCommand::SetDisplayRate(hz) => {
                self.emitter.limiter_mut().set_target_hz(hz);
            }
            IngestCommand::SetRateLimitEnabled(enabled) => {
                self.emitter.limiter_mut().set_enabled(enabled);
            }
            IngestCommand::Reset => {
                self.reset();
            }
            IngestCommand::Shutdown => {
                self.running.store(false, Ordering::SeqCst);
            }
        }
    }

    fn handle_source_event(&mut self, event: SourceEvent) {
        match event {
            SourceEvent::Bytes(bytes) => {
                let events = match self.registry.active_mut() {
                    Some(protocol) => protocol.feed(&bytes),
                    None => Vec::new(),
                };
                for event in events {
                    self.route_parse_event(event);
                }
            }
            SourceEvent::Connected { detail } => {
                // A fresh connection gets fresh parser and limiter state so
                // a partial line from the previous session can't corrupt
                // the first packet
                self.reset();
                self.connection_state = ConnectionState::Connected;
                tracing::info!("Source connected: {}", detail);
            }
            SourceEvent::Disconnected { detail } => {
                self.registry.reset();
                self.connection_state = ConnectionState::Disconnected;
                tracing::info!("Source disconnected: {}", detail);
            }
        }
    }

    fn route_parse_event(&mut self, event: ParseEvent) {
        match event {
            ParseEvent::RawLine(line) => self.emitter.emit_raw(line),
            ParseEvent::Packet(packet) => {
                self.history.add(packet.clone());
                self.emitter.emit_packet(packet);
            }
            ParseEvent::Error { message, raw_line } => {
                self.parse_errors += 1;
                tracing::warn!(line = %raw_line, "Parse error: {}", message);
            }
        }
    }

    fn apply_parser_config(&mut self, config: &ParserConfig) {
        if let Some(protocol) = self.registry.active_mut() {
            protocol.configure(config);
        }
        // A config swap restarts the stream: the limiter baseline clears so
        // the first packet under the new schema is displayed immediately
        self.emitter.limiter_mut().reset();
        tracing::debug!("Parser configuration applied");
    }

    fn reset(&mut self) {
        self.registry.reset();
        self.emitter.reset();
        self.parse_errors = 0;
    }
}
