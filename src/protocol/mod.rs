//! Protocol parsing layer
//!
//! A [`Protocol`] turns raw byte chunks into a stream of [`ParseEvent`]s.
//! The trait exists so the ingest worker can switch between parser
//! strategies at runtime over a compile-time-known set; the line protocol
//! ([`LineParser`]) is the one shipped implementation.
//!
//! # Components
//!
//! - [`LineFramer`] - Accumulates bytes and splits them into lines
//! - [`LineParser`] - Frames and parses delimited text lines
//! - [`ProtocolRegistry`] - Registers protocols by id and routes bytes to
//!   the active one

pub mod framer;
pub mod line_parser;

pub use framer::{FramedItem, LineFramer};
pub use line_parser::{LineParser, ParseOutcome, TestParseReport};

use crate::types::Packet;
use std::collections::HashMap;

/// One event produced while feeding bytes through a protocol.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseEvent {
    /// A framed line, surfaced unconditionally for raw-mode display
    RawLine(String),
    /// A packet carrying at least one extracted value
    Packet(Packet),
    /// A framing or parse failure, local to one line
    Error { message: String, raw_line: String },
}

/// Contract for protocol parsers.
///
/// Implementations consume raw bytes and emit events for each complete
/// frame they decode. `reset` clears internal buffers and counters; it is
/// called when switching protocols or reconnecting.
pub trait Protocol: Send {
    /// Human-readable protocol name
    fn name(&self) -> &str;

    /// Description of the protocol format
    fn description(&self) -> &str;

    /// Process raw bytes, producing zero or more events
    fn feed(&mut self, bytes: &[u8]) -> Vec<ParseEvent>;

    /// Reset parser state
    fn reset(&mut self);

    /// Whether the protocol has configurable options
    fn is_configurable(&self) -> bool {
        false
    }

    /// Apply a new parser configuration. Protocols that ignore the line
    /// parser options leave this as a no-op.
    fn configure(&mut self, _config: &crate::config::ParserConfig) {}
}

/// Registry of protocol parsers with one active strategy.
pub struct ProtocolRegistry {
    protocols: HashMap<String, Box<dyn Protocol>>,
    active_id: String,
}

impl ProtocolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            protocols: HashMap::new(),
            active_id: String::new(),
        }
    }

    /// Register a protocol. The first registered protocol becomes active.
    pub fn register(&mut self, id: impl Into<String>, protocol: Box<dyn Protocol>) {
        let id = id.into();
        if self.protocols.contains_key(&id) {
            tracing::warn!("Protocol '{}' already registered, replacing", id);
        }
        self.protocols.insert(id.clone(), protocol);

        if self.active_id.is_empty() {
            self.set_active(&id);
        }
    }

    /// Switch the active protocol. Resets its state for a clean start.
    pub fn set_active(&mut self, id: &str) -> bool {
        let Some(protocol) = self.protocols.get_mut(id) else {
            tracing::warn!("Unknown protocol '{}'", id);
            return false;
        };
        protocol.reset();
        self.active_id = id.to_string();
        tracing::debug!("Active protocol set to '{}'", id);
        true
    }

    /// Id of the active protocol.
    pub fn active_id(&self) -> &str {
        &self.active_id
    }

    /// Mutable access to the active protocol.
    pub fn active_mut(&mut self) -> Option<&mut Box<dyn Protocol>> {
        self.protocols.get_mut(&self.active_id)
    }

    /// Registered protocol ids.
    pub fn registered(&self) -> Vec<&str> {
        self.protocols.keys().map(|k| k.as_str()).collect()
    }

    /// Reset the active protocol's state.
    pub fn reset(&mut self) {
        if let Some(protocol) = self.active_mut() {
            protocol.reset();
        }
    }

    /// Feed raw bytes to the active protocol.
    pub fn process(&mut self, bytes: &[u8]) -> Vec<ParseEvent> {
        match self.active_mut() {
            Some(protocol) => protocol.feed(bytes),
            None => Vec::new(),
        }
    }
}

impl Default for ProtocolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
