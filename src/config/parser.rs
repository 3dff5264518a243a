//! Parser configuration for the universal line parser
//!
//! Defines all configurable options for parsing line-oriented telemetry,
//! enabling dynamic field mapping and flexible numeric extraction. The
//! configuration is immutable per parse call and replaced wholesale at
//! runtime; replacing it resets the parser state (buffer, counter, and
//! rate-limiter baseline).

use serde::{Deserialize, Serialize};

/// What to use for X-axis values when plotting.
///
/// Carried on the configuration for the render layer; the parser itself
/// does not consume it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum XAxisSource {
    /// Use the packet capture timestamp (milliseconds)
    #[default]
    Timestamp,
    /// Use the auto-incrementing packet counter
    Counter,
    /// Use a specific field from the data
    FieldIndex,
}

/// Configuration for the line parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Delimiter between fields. Common values: ",", "\t", " ", ";".
    /// Empty means no splitting: the whole line is a single token.
    pub delimiter: String,

    /// Token index carrying the sensor/device ID, `None` to disable.
    ///
    /// Useful when multiple sensors share the same line.
    pub id_field_index: Option<usize>,

    /// Sensor ID filter; empty accepts every packet.
    ///
    /// Matching is case-insensitive exact comparison first, then a
    /// numeric-part comparison so "#12820" matches "12820" and "d1"
    /// matches "1". Non-matching packets are discarded silently.
    pub accept_sensor_id: String,

    /// Explicit ordered list of token indices to extract.
    ///
    /// Empty means "extract all tokens except the ID field".
    pub data_fields: Vec<usize>,

    /// Channel names for extracted fields, by extraction order.
    ///
    /// Fields beyond this list are auto-named "Ch0", "Ch1", ...
    pub channel_names: Vec<String>,

    /// Source for X-axis values
    pub x_axis_source: XAxisSource,

    /// Field index to use when `x_axis_source` is `FieldIndex`
    pub x_axis_field_index: usize,

    /// Strip label prefixes from tokens: "X:123.45" parses as "123.45"
    pub strip_labels: bool,

    /// Separator between a label and its value (e.g. ':' in "X:123")
    pub label_separator: char,

    /// Trim whitespace from lines and tokens
    pub trim_whitespace: bool,

    /// Drop empty lines instead of parsing them
    pub skip_empty_lines: bool,

    /// Line ending to split on. Common values: "\n", "\r\n", "\r".
    pub line_ending: String,

    /// Maximum line length before bounded discard.
    ///
    /// Bounds memory on malformed or never-terminated streams.
    pub max_line_length: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self::csv_default()
    }
}

impl ParserConfig {
    /// Default configuration for comma-separated values.
    pub fn csv_default() -> Self {
        Self {
            delimiter: ",".to_string(),
            id_field_index: None,
            accept_sensor_id: String::new(),
            data_fields: Vec::new(),
            channel_names: Vec::new(),
            x_axis_source: XAxisSource::Timestamp,
            x_axis_field_index: 0,
            strip_labels: false,
            label_separator: ':',
            trim_whitespace: true,
            skip_empty_lines: true,
            line_ending: "\n".to_string(),
            max_line_length: 4096,
        }
    }

    /// Configuration for tab-separated values.
    pub fn tsv_default() -> Self {
        Self {
            delimiter: "\t".to_string(),
            ..Self::csv_default()
        }
    }

    /// Configuration for labeled data (e.g. "X:1.0,Y:2.0").
    pub fn labeled_default() -> Self {
        Self {
            strip_labels: true,
            label_separator: ':',
            ..Self::csv_default()
        }
    }

    /// Channel name for the field at extraction position `i`.
    pub fn channel_name(&self, i: usize) -> String {
        self.channel_names
            .get(i)
            .cloned()
            .unwrap_or_else(|| format!("Ch{}", i))
    }
}
