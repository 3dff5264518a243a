//! Display and history settings
//!
//! These settings govern the rate-limited display path and the render-side
//! bounded stores. They are separate from [`ParserConfig`](super::ParserConfig)
//! because changing them must not reset parser state.

use crate::render::DownsampleMethod;
use serde::{Deserialize, Serialize};

/// Settings for the display path and render tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Whether the display path is rate limited at all
    pub rate_limit_enabled: bool,

    /// Target display update rate in Hz (0 disables limiting)
    pub target_display_hz: u32,

    /// Maximum points per channel handed to the renderer
    pub render_budget: usize,

    /// Downsampling algorithm for over-budget series
    pub downsample_method: DownsampleMethod,

    /// Maximum retained points per channel series
    pub max_series_points: usize,

    /// Sliding time window in seconds for auto-scaling
    pub time_window_secs: f64,

    /// Recompute the auto-scale range every Nth render tick
    pub range_refresh_ticks: u32,

    /// Capacity of the packet history ring buffer
    pub history_capacity: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            rate_limit_enabled: true,
            target_display_hz: 30,
            render_budget: crate::types::DEFAULT_RENDER_BUDGET,
            downsample_method: DownsampleMethod::Lttb,
            max_series_points: 50_000,
            time_window_secs: 10.0,
            range_refresh_ticks: 5,
            history_capacity: crate::types::DEFAULT_HISTORY_CAPACITY,
        }
    }
}
