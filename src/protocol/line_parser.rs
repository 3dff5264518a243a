//! Universal line parser: tokens to channels
//!
//! Turns framed lines into [`Packet`]s under a [`ParserConfig`]: delimiter
//! tokenization, optional sensor-ID extraction and filtering, label
//! stripping, and numeric extraction. Parsing is line-local: every failure
//! is reported against the offending line and the parser stays ready for
//! the next one.
//!
//! # Outcome Model
//!
//! Each line yields exactly one [`ParseOutcome`]:
//!
//! - `Emitted` — at least one channel value was extracted. The packet may
//!   still carry `is_valid = false` when some other field failed (partial
//!   success).
//! - `Filtered` — the sensor-ID filter rejected the line, or the selection
//!   left nothing to extract. No packet, no error.
//! - `Errored` — no value could be extracted and at least one failure
//!   occurred.
//!
//! Sensor-ID filtering is deliberately silent: a mismatching line produces
//! neither a packet nor an error. The distinguishable `Filtered` variant
//! exists so callers and tests can observe it without conflating it with a
//! real parse failure.

use crate::config::ParserConfig;
use crate::protocol::framer::{FramedItem, LineFramer};
use crate::protocol::{ParseEvent, Protocol};
use crate::types::Packet;

/// Tri-state result of parsing a single line.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    /// A packet with at least one extracted value
    Emitted(Packet),
    /// Silently discarded (sensor-ID mismatch or nothing to extract)
    Filtered,
    /// Nothing extracted and at least one field failed
    Errored { message: String, raw_line: String },
}

/// Report produced by [`LineParser::test_parse`] for interactive
/// configuration validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestParseReport {
    /// Whether every selected field parsed and at least one value resulted
    pub success: bool,
    /// Description of the last failure, empty on success
    pub error_message: String,
    /// The raw token list, before numeric extraction
    pub field_texts: Vec<String>,
    /// Values that did extract, in selection order
    pub values: Vec<f64>,
    /// Token index of the first failing field
    pub failed_field_index: Option<usize>,
}

/// Line-oriented protocol parser.
///
/// Owns the framer and the per-instance packet counter. Replacing the
/// configuration resets both.
#[derive(Debug)]
pub struct LineParser {
    config: ParserConfig,
    framer: LineFramer,
    packet_counter: u64,
}

impl LineParser {
    /// Create a parser with the default CSV configuration.
    pub fn new() -> Self {
        Self::with_config(ParserConfig::csv_default())
    }

    /// Create a parser with an explicit configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        let framer = LineFramer::new(&config);
        Self {
            config,
            framer,
            packet_counter: 0,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Replace the configuration wholesale. Resets parser state.
    pub fn set_config(&mut self, config: ParserConfig) {
        self.framer.configure(&config);
        self.config = config;
        self.reset();
    }

    /// Current value of the packet counter.
    pub fn packet_counter(&self) -> u64 {
        self.packet_counter
    }

    /// Parse one already-framed line.
    pub fn process_line(&mut self, line: &str) -> ParseOutcome {
        let mut packet = Packet::from_line(line, self.packet_counter);
        self.packet_counter += 1;

        let tokens = split_line(line, &self.config.delimiter);
        if tokens.is_empty() {
            return ParseOutcome::Errored {
                message: "No tokens found".to_string(),
                raw_line: line.to_string(),
            };
        }

        // Sensor ID extraction and silent filtering
        if let Some(id_index) = self.config.id_field_index {
            if let Some(id_token) = tokens.get(id_index) {
                let id = if self.config.trim_whitespace {
                    id_token.trim()
                } else {
                    id_token
                };
                packet.sensor_id = id.to_string();

                if !self.config.accept_sensor_id.is_empty()
                    && !sensor_id_matches(id, &self.config.accept_sensor_id)
                {
                    return ParseOutcome::Filtered;
                }
            }
        }

        let fields = selected_fields(&self.config, tokens.len());

        let mut has_error = false;
        for (i, &field_index) in fields.iter().enumerate() {
            let Some(token) = tokens.get(field_index) else {
                has_error = true;
                packet.error_message = format!("Field index {} out of range", field_index);
                continue;
            };

            let token = if self.config.trim_whitespace {
                token.trim()
            } else {
                token
            };

            match extract_number(token, &self.config) {
                Some(value) => packet.add_channel(self.config.channel_name(i), value),
                None => {
                    has_error = true;
                    packet.error_message =
                        format!("Failed to parse field {}: '{}'", field_index, token);
                }
            }
        }

        packet.is_valid = packet.has_data() && !has_error;

        if packet.has_data() {
            ParseOutcome::Emitted(packet)
        } else if has_error {
            ParseOutcome::Errored {
                message: packet.error_message,
                raw_line: line.to_string(),
            }
        } else {
            // Nothing selected for extraction (e.g. an ID-only line):
            // no packet and no error, same as a filtered line.
            ParseOutcome::Filtered
        }
    }

    /// Re-run the parsing logic against a sample line without touching
    /// parser state. Used for interactive configuration validation.
    pub fn test_parse(sample_line: &str, config: &ParserConfig) -> TestParseReport {
        let mut report = TestParseReport::default();

        let line = if config.trim_whitespace {
            sample_line.trim()
        } else {
            sample_line
        };

        if line.is_empty() {
            report.error_message = "Empty line".to_string();
            return report;
        }

        let tokens = split_line(line, &config.delimiter);
        if tokens.is_empty() {
            report.error_message = "No tokens found".to_string();
            return report;
        }
        report.field_texts = tokens.iter().map(|t| t.to_string()).collect();

        let fields = selected_fields(config, tokens.len());

        report.success = true;
        for &field_index in &fields {
            let Some(token) = tokens.get(field_index) else {
                report.success = false;
                report.error_message = format!(
                    "Field index {} out of range (have {} fields)",
                    field_index,
                    tokens.len()
                );
                report.failed_field_index.get_or_insert(field_index);
                continue;
            };

            let token = if config.trim_whitespace {
                token.trim()
            } else {
                token
            };

            match extract_number(token, config) {
                Some(value) => report.values.push(value),
                None => {
                    report.success = false;
                    report.error_message =
                        format!("Failed to parse field {}: '{}'", field_index, token);
                    report.failed_field_index.get_or_insert(field_index);
                }
            }
        }

        if report.success && report.values.is_empty() {
            report.success = false;
            report.error_message = "No numeric values extracted".to_string();
        }

        report
    }
}

impl Default for LineParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Protocol for LineParser {
    fn name(&self) -> &str {
        "line"
    }

    fn description(&self) -> &str {
        "Delimited text lines with configurable field mapping"
    }

    fn feed(&mut self, bytes: &[u8]) -> Vec<ParseEvent> {
        let mut events = Vec::new();

        for item in self.framer.feed(bytes) {
            match item {
                FramedItem::Line(line) => {
                    // Raw line surfaced unconditionally, independent of
                    // parse results and of any rate limiting downstream
                    events.push(ParseEvent::RawLine(line.clone()));

                    match self.process_line(&line) {
                        ParseOutcome::Emitted(packet) => events.push(ParseEvent::Packet(packet)),
                        ParseOutcome::Filtered => {}
                        ParseOutcome::Errored { message, raw_line } => {
                            events.push(ParseEvent::Error { message, raw_line })
                        }
                    }
                }
                FramedItem::LineTooLong { discarded } => events.push(ParseEvent::Error {
                    message: "Line too long, discarding".to_string(),
                    raw_line: String::from_utf8_lossy(&discarded).into_owned(),
                }),
                FramedItem::BufferOverflow { discarded } => events.push(ParseEvent::Error {
                    message: "Buffer overflow, clearing".to_string(),
                    raw_line: String::from_utf8_lossy(&discarded).into_owned(),
                }),
            }
        }

        events
    }

    fn reset(&mut self) {
        self.framer.reset();
        self.packet_counter = 0;
    }

    fn is_configurable(&self) -> bool {
        true
    }

    fn configure(&mut self, config: &ParserConfig) {
        self.set_config(config.clone());
    }
}

/// Split a line by the delimiter, keeping empty tokens.
///
/// An empty delimiter yields the whole line as a single token; an empty
/// line yields no tokens.
pub fn split_line<'a>(line: &'a str, delimiter: &str) -> Vec<&'a str> {
    if line.is_empty() {
        return Vec::new();
    }
    if delimiter.is_empty() {
        return vec![line];
    }
    line.split(delimiter).collect()
}

/// Extract a numeric value from a token.
///
/// When label stripping is enabled, a token of the form `label<sep>value`
/// contributes only the suffix after the separator. The strict parse runs
/// first; a comma-decimal fallback covers locale-formatted input. The
/// ordering matters: a locale-first parse would silently accept different
/// separator conventions.
pub fn extract_number(token: &str, config: &ParserConfig) -> Option<f64> {
    if token.is_empty() {
        return None;
    }

    let mut payload = token;
    if config.strip_labels {
        if let Some(sep_pos) = token.find(config.label_separator) {
            let after = sep_pos + config.label_separator.len_utf8();
            if after < token.len() {
                payload = &token[after..];
            }
        }
    }

    let payload = payload.trim();
    if payload.is_empty() {
        return None;
    }

    if let Ok(value) = payload.parse::<f64>() {
        return Some(value);
    }

    // Comma decimal separator, e.g. "3,14"
    if payload.contains(',') {
        if let Ok(value) = payload.replace(',', ".").parse::<f64>() {
            return Some(value);
        }
    }

    None
}

/// Token indices selected for extraction: the explicit list when present,
/// otherwise every token except the ID field, in ascending order.
fn selected_fields(config: &ParserConfig, token_count: usize) -> Vec<usize> {
    if config.data_fields.is_empty() {
        (0..token_count)
            .filter(|&i| Some(i) != config.id_field_index)
            .collect()
    } else {
        config.data_fields.clone()
    }
}

/// Whether a sensor ID passes the filter.
///
/// Case-insensitive exact match first, then a comparison of the numeric
/// parts (digits and minus signs) so "#12820" matches "12820" and "d1"
/// matches "1".
fn sensor_id_matches(id: &str, filter: &str) -> bool {
    if id.to_lowercase() == filter.to_lowercase() {
        return true;
    }

    let id_numeric = numeric_part(id);
    let filter_numeric = numeric_part(filter);
    !id_numeric.is_empty() && !filter_numeric.is_empty() && id_numeric == filter_numeric
}

fn numeric_part(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_digit() || *c == '-')
        .collect()
}
