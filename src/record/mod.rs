//! CSV recording sink
//!
//! Consumes packets from the lossless logging stream and appends them to
//! a CSV file. The header is derived from the first recorded packet, so a
//! recording always starts with the channel layout that was actually on
//! the wire.

use crate::error::{LinevisError, Result};
use crate::types::Packet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Options for a recording session.
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// Write a wall-clock timestamp column
    pub include_timestamp: bool,
    /// Record only packets from this sensor id
    pub sensor_filter: Option<String>,
    /// Flush to disk every N rows. Zero flushes only on stop.
    pub flush_every: usize,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            include_timestamp: true,
            sensor_filter: None,
            flush_every: 100,
        }
    }
}

/// Appends packets to a CSV file, one row per packet.
pub struct CsvRecorder {
    writer: BufWriter<File>,
    path: PathBuf,
    config: RecorderConfig,
    /// Channel names captured from the first recorded packet
    header_channels: Option<Vec<String>>,
    record_count: u64,
}

impl CsvRecorder {
    /// Create the output file, truncating an existing one.
    pub fn create(path: impl AsRef<Path>, config: RecorderConfig) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)?;
        tracing::info!("Recording to {}", path.display());
        Ok(Self {
            writer: BufWriter::new(file),
            path,
            config,
            header_channels: None,
            record_count: 0,
        })
    }

    /// Path of the output file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rows written so far.
    pub fn record_count(&self) -> u64 {
        self.record_count
    }

    /// Append one packet. Invalid packets and packets excluded by the
    /// sensor filter are skipped. Returns whether a row was written.
    pub fn record(&mut self, packet: &Packet) -> Result<bool> {
        if !packet.is_valid {
            return Ok(false);
        }
        if let Some(filter) = &self.config.sensor_filter {
            if !packet.sensor_id.eq_ignore_ascii_case(filter) {
                return Ok(false);
            }
        }

        if self.header_channels.is_none() {
            self.write_header(packet)?;
        }

        let mut row = String::new();
        if self.config.include_timestamp {
            row.push_str(&format_timestamp(packet.timestamp_ms));
            row.push(',');
        }
        row.push_str(&packet.packet_index.to_string());
        row.push(',');
        row.push_str(&escape_field(&packet.sensor_id));

        // Column count is fixed by the header; missing channels become
        // blank cells and surplus values are dropped
        let header = self.header_channels.as_ref().ok_or_else(|| {
            LinevisError::Recording("header not written before first row".to_string())
        })?;
        for i in 0..header.len() {
            row.push(',');
            if let Some(value) = packet.value_at(i) {
                row.push_str(&value.to_string());
            }
        }

        writeln!(self.writer, "{}", row)?;
        self.record_count += 1;

        if self.config.flush_every > 0 && self.record_count % self.config.flush_every as u64 == 0 {
            self.writer.flush()?;
        }
        Ok(true)
    }

    /// Flush buffered rows to disk.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Flush and finish. Returns the number of rows written.
    pub fn stop(mut self) -> Result<u64> {
        self.writer.flush()?;
        tracing::info!(
            rows = self.record_count,
            "Recording stopped: {}",
            self.path.display()
        );
        Ok(self.record_count)
    }

    fn write_header(&mut self, packet: &Packet) -> Result<()> {
        let mut header = String::new();
        if self.config.include_timestamp {
            header.push_str("Timestamp,");
        }
        header.push_str("PacketIndex,SensorID");
        for name in &packet.channel_names {
            header.push(',');
            header.push_str(&escape_field(name));
        }
        writeln!(self.writer, "{}", header)?;
        self.header_channels = Some(packet.channel_names.clone());
        Ok(())
    }
}

fn format_timestamp(timestamp_ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(timestamp_ms)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S%.3f").to_string())
        .unwrap_or_else(|| timestamp_ms.to_string())
}

/// Quote a CSV field if it contains a delimiter, quote or newline.
fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
