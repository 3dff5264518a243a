//! Dual-rate packet fan-out
//!
//! Every parsed packet goes out on the logging channel; the display
//! channel only sees packets the [`RateLimiter`] lets through, so
//! recording stays lossless while the render side is fed at a bounded
//! rate. Raw lines bypass both and go out on their own channel.

use crate::types::Packet;
use crossbeam_channel::{Sender, TrySendError};
use std::time::{Duration, Instant};
use tracing::warn;

/// Drop-based throttle for the display path.
///
/// The first packet after a reset always passes, so a fresh stream shows
/// up immediately instead of waiting out one interval.
#[derive(Debug)]
pub struct RateLimiter {
    enabled: bool,
    interval: Option<Duration>,
    last_emit: Option<Instant>,
}

impl RateLimiter {
    pub fn new(enabled: bool, target_hz: u32) -> Self {
        let mut limiter = Self {
            enabled,
            interval: None,
            last_emit: None,
        };
        limiter.set_target_hz(target_hz);
        limiter
    }

    /// Set the target rate. Zero disables the interval entirely.
    ///
    /// The interval keeps sub-millisecond precision so rates above
    /// 1000 Hz still throttle instead of collapsing to a zero interval.
    pub fn set_target_hz(&mut self, target_hz: u32) {
        self.interval = if target_hz == 0 {
            None
        } else {
            Some(Duration::from_secs_f64(1.0 / f64::from(target_hz)))
        };
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Forget the last emission, so the next packet passes unconditionally.
    pub fn reset(&mut self) {
        self.last_emit = None;
    }

    /// Whether a packet arriving at `now` may be emitted. Advances the
    /// baseline only when it returns true.
    pub fn allow(&mut self, now: Instant) -> bool {
        if !self.enabled {
            return true;
        }
        let Some(interval) = self.interval else {
            return true;
        };
        match self.last_emit {
            Some(last) if now.duration_since(last) < interval => false,
            _ => {
                self.last_emit = Some(now);
                true
            }
        }
    }
}

/// Fans parsed packets out to the logging and display channels and raw
/// lines to the raw channel.
pub struct DualRateEmitter {
    logging_tx: Sender<Packet>,
    display_tx: Sender<Packet>,
    raw_tx: Sender<String>,
    limiter: RateLimiter,
    display_dropped: u64,
}

impl DualRateEmitter {
    pub fn new(
        logging_tx: Sender<Packet>,
        display_tx: Sender<Packet>,
        raw_tx: Sender<String>,
        limiter: RateLimiter,
    ) -> Self {
        Self {
            logging_tx,
            display_tx,
            raw_tx,
            limiter,
            display_dropped: 0,
        }
    }

    pub fn limiter_mut(&mut self) -> &mut RateLimiter {
        &mut self.limiter
    }

    /// Packets dropped from the display path because its channel was full.
    /// Rate-limited packets are not counted; only backpressure drops are.
    pub fn display_dropped(&self) -> u64 {
        self.display_dropped
    }

    /// Route one parsed packet. Logging delivery is unconditional; display
    /// delivery is gated by the rate limiter and uses a non-blocking send
    /// so a stalled consumer can never back up the parse loop.
    pub fn emit_packet(&mut self, packet: Packet) {
        if self.limiter.allow(Instant::now()) {
            match self.display_tx.try_send(packet.clone()) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    self.display_dropped += 1;
                    if self.display_dropped % 100 == 1 {
                        warn!(
                            dropped = self.display_dropped,
                            "display channel full, dropping packets"
                        );
                    }
                }
                Err(TrySendError::Disconnected(_)) => {}
            }
        }
        // Disconnected logging consumer is fine, e.g. no recorder attached
        let _ = self.logging_tx.send(packet);
    }

    /// Route one framed raw line, untouched by parsing or rate limiting.
    pub fn emit_raw(&mut self, line: String) {
        let _ = self.raw_tx.send(line);
    }

    pub fn reset(&mut self) {
        self.limiter.reset();
        self.display_dropped = 0;
    }
}
