//! Core data types for linevis
//!
//! This module contains the fundamental data structures shared across the
//! ingest and render layers.
//!
//! # Main Types
//!
//! - [`Packet`] - The structured result of parsing one framed line
//! - [`ConnectionState`] - Byte-source connection transitions
//!
//! # Packet Lifecycle
//!
//! A [`Packet`] is created once per successfully framed line and is immutable
//! after creation. It is copied into the history store on the logging path
//! and optionally forwarded to the display path under rate limiting.

use serde::{Deserialize, Serialize};

/// Default capacity of the packet history ring buffer
pub const DEFAULT_HISTORY_CAPACITY: usize = 10_000;

/// Default maximum number of points handed to the renderer per channel
pub const DEFAULT_RENDER_BUDGET: usize = 2000;

/// The structured result of parsing one line.
///
/// Channel names and values are kept as parallel vectors in parse order so
/// both name-based lookup and index-addressable access stay cheap. Names are
/// unique within a packet (auto-naming is positional).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Packet {
    /// Capture-time clock reading (epoch milliseconds)
    pub timestamp_ms: i64,
    /// Monotonic per-parser counter, reset on `reset()`
    pub packet_index: u64,
    /// Sensor/device identifier; empty when not present
    pub sensor_id: String,
    /// Channel names in parse order, parallel to `values`
    pub channel_names: Vec<String>,
    /// Parsed values in parse order
    pub values: Vec<f64>,
    /// The original line that produced this packet
    pub raw_line: String,
    /// True iff at least one channel was extracted and no field failed
    pub is_valid: bool,
    /// Last field failure, if any
    pub error_message: String,
}

impl Packet {
    /// Create an empty packet for the given raw line, stamped now.
    pub fn from_line(line: &str, packet_index: u64) -> Self {
        Self {
            timestamp_ms: chrono::Utc::now().timestamp_millis(),
            packet_index,
            raw_line: line.to_string(),
            ..Default::default()
        }
    }

    /// Append a channel value.
    pub fn add_channel(&mut self, name: impl Into<String>, value: f64) {
        self.channel_names.push(name.into());
        self.values.push(value);
    }

    /// Look up a value by channel name (first match wins).
    pub fn value(&self, name: &str) -> Option<f64> {
        self.channel_names
            .iter()
            .position(|n| n == name)
            .map(|i| self.values[i])
    }

    /// Look up a value by parse-order index.
    pub fn value_at(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    /// Number of extracted channels.
    pub fn channel_count(&self) -> usize {
        self.values.len()
    }

    /// Whether at least one channel was extracted.
    pub fn has_data(&self) -> bool {
        !self.values.is_empty()
    }
}

/// Connection state of the byte-source collaborator.
///
/// Transitions arrive as discrete events alongside byte chunks and trigger a
/// parser reset so stale buffer contents never leak across sessions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No byte source attached
    #[default]
    Disconnected,
    /// Byte source delivering chunks
    Connected,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "Disconnected"),
            ConnectionState::Connected => write!(f, "Connected"),
        }
    }
}
