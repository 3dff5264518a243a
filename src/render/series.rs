//! Per-channel plot series and the render tick
//!
//! Display packets are staged in a [`PendingBatch`] as they arrive and
//! folded into per-channel [`ChannelSeries`] ring buffers on the next
//! render tick, so the hot ingestion path never pays for downsampling and
//! a tick always works on a consistent snapshot.

use crate::config::{DisplayConfig, XAxisSource};
use crate::render::downsample::{downsample, DownsampleMethod};
use crate::render::range::RangeEstimator;
use crate::types::Packet;
use std::collections::VecDeque;

/// Bounded x/y ring for one channel. Parallel deques, FIFO trimmed.
#[derive(Debug)]
pub struct ChannelSeries {
    xs: VecDeque<f64>,
    ys: VecDeque<f64>,
    max_points: usize,
}

impl ChannelSeries {
    pub fn new(max_points: usize) -> Self {
        let max_points = max_points.max(1);
        Self {
            xs: VecDeque::with_capacity(max_points.min(4096)),
            ys: VecDeque::with_capacity(max_points.min(4096)),
            max_points,
        }
    }

    pub fn push(&mut self, x: f64, y: f64) {
        self.xs.push_back(x);
        self.ys.push_back(y);
        while self.xs.len() > self.max_points {
            self.xs.pop_front();
            self.ys.pop_front();
        }
    }

    pub fn set_max_points(&mut self, max_points: usize) {
        self.max_points = max_points.max(1);
        while self.xs.len() > self.max_points {
            self.xs.pop_front();
            self.ys.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    pub fn last_x(&self) -> Option<f64> {
        self.xs.back().copied()
    }

    /// Contiguous copy of the series as `[x, y]` points.
    pub fn points(&self) -> Vec<[f64; 2]> {
        self.xs
            .iter()
            .zip(self.ys.iter())
            .map(|(&x, &y)| [x, y])
            .collect()
    }

    pub fn clear(&mut self) {
        self.xs.clear();
        self.ys.clear();
    }
}

/// Packets staged between render ticks.
#[derive(Debug, Default)]
pub struct PendingBatch {
    entries: VecDeque<(f64, Vec<f64>)>,
}

impl PendingBatch {
    pub fn push(&mut self, x: f64, values: Vec<f64>) {
        self.entries.push_back((x, values));
    }

    pub fn drain(&mut self) -> impl Iterator<Item = (f64, Vec<f64>)> + '_ {
        self.entries.drain(..)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

struct RenderChannel {
    name: String,
    series: ChannelSeries,
    range: RangeEstimator,
}

/// One channel's contribution to a rendered frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesFrame {
    pub name: String,
    pub points: Vec<[f64; 2]>,
}

/// Output of one render tick.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderFrame {
    pub series: Vec<SeriesFrame>,
    /// Combined y-range across all channels, from the throttled estimators.
    pub y_range: Option<(f64, f64)>,
}

/// All per-frame plotting state for one stream of packets.
pub struct RenderState {
    channels: Vec<RenderChannel>,
    pending: PendingBatch,
    budget: usize,
    method: DownsampleMethod,
    max_series_points: usize,
    time_window_ms: f64,
    range_refresh_ticks: u32,
    x_axis_source: XAxisSource,
    x_axis_field_index: usize,
}

impl RenderState {
    pub fn new(config: &DisplayConfig) -> Self {
        Self {
            channels: Vec::new(),
            pending: PendingBatch::default(),
            budget: config.render_budget,
            method: config.downsample_method,
            max_series_points: config.max_series_points,
            time_window_ms: config.time_window_secs * 1000.0,
            range_refresh_ticks: config.range_refresh_ticks,
            x_axis_source: XAxisSource::Timestamp,
            x_axis_field_index: 0,
        }
    }

    /// Select where the x coordinate of plotted points comes from.
    pub fn set_x_axis(&mut self, source: XAxisSource, field_index: usize) {
        self.x_axis_source = source;
        self.x_axis_field_index = field_index;
    }

    fn x_value(&self, packet: &Packet) -> f64 {
        match self.x_axis_source {
            XAxisSource::Timestamp => packet.timestamp_ms as f64,
            XAxisSource::Counter => packet.packet_index as f64,
            XAxisSource::FieldIndex => packet
                .value_at(self.x_axis_field_index)
                .unwrap_or(packet.timestamp_ms as f64),
        }
    }

    /// Stage one packet for the next tick. Cheap, no downsampling here.
    pub fn ingest(&mut self, packet: &Packet) {
        for (i, name) in packet.channel_names.iter().enumerate() {
            if i >= self.channels.len() {
                self.channels.push(RenderChannel {
                    name: name.clone(),
                    series: ChannelSeries::new(self.max_series_points),
                    range: RangeEstimator::new(self.range_refresh_ticks),
                });
            }
        }
        self.pending.push(self.x_value(packet), packet.values.clone());
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Fold staged packets into the series and produce a frame: trim,
    /// downsample each channel to the point budget, and refresh y-ranges
    /// on their throttle schedule.
    pub fn tick(&mut self) -> RenderFrame {
        for (x, values) in self.pending.drain() {
            for (i, &y) in values.iter().enumerate() {
                if let Some(channel) = self.channels.get_mut(i) {
                    channel.series.push(x, y);
                }
            }
        }

        let latest_x = self
            .channels
            .iter()
            .filter_map(|c| c.series.last_x())
            .fold(f64::NEG_INFINITY, f64::max);
        let window_start = if self.time_window_ms > 0.0 {
            latest_x - self.time_window_ms
        } else {
            f64::NEG_INFINITY
        };

        let mut frame = RenderFrame::default();
        for channel in &mut self.channels {
            let points = channel.series.points();
            if let Some((min, max)) = channel.range.tick(&points, window_start) {
                frame.y_range = Some(match frame.y_range {
                    Some((lo, hi)) => (lo.min(min), hi.max(max)),
                    None => (min, max),
                });
            }
            frame.series.push(SeriesFrame {
                name: channel.name.clone(),
                points: downsample(&points, self.budget, self.method),
            });
        }
        frame
    }

    pub fn apply_config(&mut self, config: &DisplayConfig) {
        self.budget = config.render_budget;
        self.method = config.downsample_method;
        self.time_window_ms = config.time_window_secs * 1000.0;
        self.range_refresh_ticks = config.range_refresh_ticks;
        self.max_series_points = config.max_series_points;
        for channel in &mut self.channels {
            channel.series.set_max_points(config.max_series_points);
            channel.range.set_refresh_ticks(config.range_refresh_ticks);
            channel.range.invalidate();
        }
    }

    pub fn clear(&mut self) {
        self.channels.clear();
        self.pending.clear();
    }
}
