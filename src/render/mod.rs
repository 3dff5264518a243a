//! Rendering-side data reduction
//!
//! Everything downstream of the display packet channel: staging incoming
//! packets, bounded per-channel series, point-budget downsampling, and
//! throttled axis-range estimation. Nothing here draws; the output of a
//! tick is plain point data a plotting frontend can consume directly.

mod downsample;
mod range;
mod series;

pub use downsample::{downsample, DownsampleMethod};
pub use range::RangeEstimator;
pub use series::{ChannelSeries, PendingBatch, RenderFrame, RenderState, SeriesFrame};
