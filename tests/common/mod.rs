//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

use crossbeam_channel::Receiver;
use std::time::{Duration, Instant};

/// Assert two floats are approximately equal
pub fn assert_float_eq(a: f64, b: f64, epsilon: f64) {
    assert!(
        (a - b).abs() < epsilon,
        "Expected {} to be approximately equal to {} (epsilon: {})",
        a,
        b,
        epsilon
    );
}

/// Drain a receiver into a vector, waiting up to `timeout` for `expected`
/// items to arrive.
pub fn drain_at_least<T>(rx: &Receiver<T>, expected: usize, timeout: Duration) -> Vec<T> {
    let deadline = Instant::now() + timeout;
    let mut items = Vec::new();
    while items.len() < expected && Instant::now() < deadline {
        match rx.recv_timeout(Duration::from_millis(10)) {
            Ok(item) => items.push(item),
            Err(_) => {}
        }
    }
    // Pick up any stragglers already queued
    while let Ok(item) = rx.try_recv() {
        items.push(item);
    }
    items
}

/// A delimited telemetry stream of `lines` lines with `channels` channels,
/// as one byte vector.
pub fn synthetic_stream(lines: usize, channels: usize) -> Vec<u8> {
    let mut out = Vec::new();
    for i in 0..lines {
        let fields: Vec<String> = (0..channels)
            .map(|c| format!("{:.3}", (i * channels + c) as f64 * 0.5))
            .collect();
        out.extend_from_slice(fields.join(",").as_bytes());
        out.push(b'\n');
    }
    out
}
