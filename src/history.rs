//! Bounded, shared packet history
//!
//! [`PacketHistory`] is the first point shared between the ingestion
//! consumer and the periodic render-tick consumer. It keeps the most
//! recent N packets in a FIFO ring, tracks channel discovery, and serves
//! per-channel time/value series for rendering.
//!
//! # Locking Discipline
//!
//! A readers-writer lock guards the ring. The ingestion path holds the
//! write section only for the O(1) append-and-maybe-evict; bulk read
//! accessors copy data out under the read lock so no caller ever observes
//! a torn packet and writers are never blocked across downsampling or
//! formatting work.

use crate::types::{Packet, DEFAULT_HISTORY_CAPACITY};
use std::collections::VecDeque;
use std::sync::RwLock;

#[derive(Debug)]
struct HistoryInner {
    packets: VecDeque<Packet>,
    capacity: usize,
    channel_names: Vec<String>,
    max_channel_count: usize,
}

impl HistoryInner {
    fn trim(&mut self) {
        while self.packets.len() > self.capacity {
            self.packets.pop_front();
        }
    }
}

/// Multi-producer-safe ring buffer of recent packets.
#[derive(Debug)]
pub struct PacketHistory {
    inner: RwLock<HistoryInner>,
}

impl PacketHistory {
    /// Create a history with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    /// Create a history bounded to `capacity` packets.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(HistoryInner {
                packets: VecDeque::with_capacity(capacity.min(DEFAULT_HISTORY_CAPACITY)),
                capacity: capacity.max(1),
                channel_names: Vec::new(),
                max_channel_count: 0,
            }),
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HistoryInner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HistoryInner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Append a packet, evicting the oldest when over capacity.
    pub fn add(&self, packet: Packet) {
        let mut inner = self.write();

        for name in &packet.channel_names {
            if !inner.channel_names.iter().any(|n| n == name) {
                inner.channel_names.push(name.clone());
            }
        }
        if packet.channel_count() > inner.max_channel_count {
            inner.max_channel_count = packet.channel_count();
        }

        inner.packets.push_back(packet);
        inner.trim();
    }

    /// Change the capacity, trimming immediately if necessary.
    pub fn set_capacity(&self, capacity: usize) {
        let mut inner = self.write();
        inner.capacity = capacity.max(1);
        inner.trim();
    }

    /// Number of retained packets.
    pub fn len(&self) -> usize {
        self.read().packets.len()
    }

    /// Whether the history is empty.
    pub fn is_empty(&self) -> bool {
        self.read().packets.is_empty()
    }

    /// Copy of the packet at `index` (0 = oldest).
    pub fn packet_at(&self, index: usize) -> Option<Packet> {
        self.read().packets.get(index).cloned()
    }

    /// Copy of the most recent packet.
    pub fn last_packet(&self) -> Option<Packet> {
        self.read().packets.back().cloned()
    }

    /// Channel names in first-seen order.
    pub fn channel_names(&self) -> Vec<String> {
        self.read().channel_names.clone()
    }

    /// Maximum channel count seen in any single packet.
    pub fn max_channel_count(&self) -> usize {
        self.read().max_channel_count
    }

    /// Time/value series for the channel at `channel_index`, over the most
    /// recent `max_points` packets (0 = all). Packets without that channel
    /// are skipped, not zero-filled.
    pub fn series_by_index(&self, channel_index: usize, max_points: usize) -> (Vec<f64>, Vec<f64>) {
        let inner = self.read();
        let start = series_start(inner.packets.len(), max_points);

        let mut timestamps = Vec::with_capacity(inner.packets.len() - start);
        let mut values = Vec::with_capacity(inner.packets.len() - start);
        for packet in inner.packets.iter().skip(start) {
            if let Some(value) = packet.value_at(channel_index) {
                timestamps.push(packet.timestamp_ms as f64);
                values.push(value);
            }
        }
        (timestamps, values)
    }

    /// Same as [`series_by_index`](Self::series_by_index), addressed by
    /// channel name.
    pub fn series_by_name(&self, channel_name: &str, max_points: usize) -> (Vec<f64>, Vec<f64>) {
        let inner = self.read();
        let start = series_start(inner.packets.len(), max_points);

        let mut timestamps = Vec::with_capacity(inner.packets.len() - start);
        let mut values = Vec::with_capacity(inner.packets.len() - start);
        for packet in inner.packets.iter().skip(start) {
            if let Some(value) = packet.value(channel_name) {
                timestamps.push(packet.timestamp_ms as f64);
                values.push(value);
            }
        }
        (timestamps, values)
    }

    /// Drop all packets and discovered channel metadata.
    pub fn clear(&self) {
        let mut inner = self.write();
        inner.packets.clear();
        inner.channel_names.clear();
        inner.max_channel_count = 0;
    }
}

impl Default for PacketHistory {
    fn default() -> Self {
        Self::new()
    }
}

fn series_start(count: usize, max_points: usize) -> usize {
    if max_points > 0 && count > max_points {
        count - max_points
    } else {
        0
    }
}
