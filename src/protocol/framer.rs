//! Line framing over a raw byte stream
//!
//! The framer accumulates incoming byte chunks and splits them on a
//! configurable line-ending sequence, enforcing a maximum line length so a
//! malformed or never-terminated stream cannot grow memory without bound.
//! Oversized data is discarded in bounded chunks and reported, never
//! processed; the framer always remains ready for the next chunk.

use crate::config::ParserConfig;

/// One outcome of feeding bytes to the framer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FramedItem {
    /// A complete line, already trimmed when `trim_whitespace` is set
    Line(String),
    /// A terminated line exceeded `max_line_length` and was discarded
    LineTooLong { discarded: Vec<u8> },
    /// The unterminated tail exceeded `max_line_length`; the whole buffer
    /// was discarded
    BufferOverflow { discarded: Vec<u8> },
}

/// Accumulates byte chunks and extracts complete lines.
#[derive(Debug)]
pub struct LineFramer {
    buffer: Vec<u8>,
    line_ending: Vec<u8>,
    max_line_length: usize,
    trim_whitespace: bool,
    skip_empty_lines: bool,
}

impl LineFramer {
    /// Create a framer from a parser configuration.
    pub fn new(config: &ParserConfig) -> Self {
        let mut framer = Self {
            buffer: Vec::with_capacity(config.max_line_length.min(4096)),
            line_ending: Vec::new(),
            max_line_length: 0,
            trim_whitespace: true,
            skip_empty_lines: true,
        };
        framer.configure(config);
        framer
    }

    /// Apply the framing-relevant parts of a configuration.
    pub fn configure(&mut self, config: &ParserConfig) {
        self.line_ending = if config.line_ending.is_empty() {
            // An empty terminator would never frame anything
            b"\n".to_vec()
        } else {
            config.line_ending.as_bytes().to_vec()
        };
        self.max_line_length = config.max_line_length.max(1);
        self.trim_whitespace = config.trim_whitespace;
        self.skip_empty_lines = config.skip_empty_lines;
    }

    /// Discard any buffered, unterminated data.
    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    /// Number of buffered bytes awaiting a terminator.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Append a chunk and extract zero or more complete lines.
    ///
    /// Lines are returned in arrival order and never returned twice.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<FramedItem> {
        self.buffer.extend_from_slice(bytes);

        let mut items = Vec::new();
        let terminator_len = self.line_ending.len();

        while let Some(pos) = find_subsequence(&self.buffer, &self.line_ending) {
            if pos > self.max_line_length {
                let discarded = self.buffer[..pos].to_vec();
                self.buffer.drain(..pos + terminator_len);
                items.push(FramedItem::LineTooLong { discarded });
                continue;
            }

            let line_bytes: Vec<u8> = self.buffer.drain(..pos + terminator_len).collect();
            let line_bytes = &line_bytes[..pos];

            if line_bytes.is_empty() && self.skip_empty_lines {
                continue;
            }

            let mut line = String::from_utf8_lossy(line_bytes).into_owned();
            if self.trim_whitespace {
                line = line.trim().to_string();
            }

            if line.is_empty() && self.skip_empty_lines {
                continue;
            }

            items.push(FramedItem::Line(line));
        }

        // Bound the unterminated tail, not only terminated lines
        if self.buffer.len() > self.max_line_length {
            let discarded = std::mem::take(&mut self.buffer);
            items.push(FramedItem::BufferOverflow { discarded });
        }

        items
    }
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}
