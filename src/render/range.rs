//! Throttled y-range estimation
//!
//! Recomputing an exact min/max over the full series every frame is wasted
//! work for an axis label. [`RangeEstimator`] recomputes only every Nth
//! tick, locates the visible window start by proportional index estimation
//! instead of a scan, and strides through the window so no recompute ever
//! touches more than a bounded number of samples.

const MAX_SAMPLES: usize = 200;

#[derive(Debug)]
pub struct RangeEstimator {
    refresh_ticks: u32,
    ticks_since_refresh: u32,
    cached: Option<(f64, f64)>,
}

impl RangeEstimator {
    pub fn new(refresh_ticks: u32) -> Self {
        Self {
            refresh_ticks: refresh_ticks.max(1),
            // Force a recompute on the first tick
            ticks_since_refresh: u32::MAX,
            cached: None,
        }
    }

    pub fn set_refresh_ticks(&mut self, refresh_ticks: u32) {
        self.refresh_ticks = refresh_ticks.max(1);
    }

    /// Drop the cache and recompute on the next tick.
    pub fn invalidate(&mut self) {
        self.cached = None;
        self.ticks_since_refresh = u32::MAX;
    }

    /// Last computed `(min, max)`, if any.
    pub fn cached(&self) -> Option<(f64, f64)> {
        self.cached
    }

    /// Advance one render tick. Recomputes the y-range of `points` at or
    /// after `window_start_x` every `refresh_ticks` calls, otherwise
    /// returns the cached range.
    pub fn tick(&mut self, points: &[[f64; 2]], window_start_x: f64) -> Option<(f64, f64)> {
        // Saturating: the forced-recompute sentinel must stay at MAX, not
        // wrap back to zero
        self.ticks_since_refresh = self.ticks_since_refresh.saturating_add(1);
        if self.ticks_since_refresh >= self.refresh_ticks {
            self.ticks_since_refresh = 0;
            self.cached = estimate_range(points, window_start_x);
        }
        self.cached
    }
}

/// Sampled y-range of `points` from `window_start_x` to the end.
///
/// The window start index is estimated proportionally from the x extent
/// rather than searched, which is exact for uniformly spaced samples and
/// close enough for an axis range otherwise. The final point is always
/// included so the newest sample never falls outside the reported range.
fn estimate_range(points: &[[f64; 2]], window_start_x: f64) -> Option<(f64, f64)> {
    let (first, last) = match points {
        [] => return None,
        [only] => return Some((only[1], only[1])),
        [first, .., last] => (first, last),
    };

    let span = last[0] - first[0];
    let start = if span > 0.0 && window_start_x > first[0] {
        let fraction = ((window_start_x - first[0]) / span).clamp(0.0, 1.0);
        ((points.len() as f64 * fraction) as usize).min(points.len() - 1)
    } else {
        0
    };

    let window = points.len() - start;
    let stride = (window / MAX_SAMPLES).max(1);

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for p in points.iter().skip(start).step_by(stride) {
        min = min.min(p[1]);
        max = max.max(p[1]);
    }
    min = min.min(last[1]);
    max = max.max(last[1]);

    Some((min, max))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize) -> Vec<[f64; 2]> {
        (0..n).map(|i| [i as f64, i as f64]).collect()
    }

    #[test]
    fn test_empty_and_single_point() {
        assert_eq!(estimate_range(&[], 0.0), None);
        assert_eq!(estimate_range(&[[1.0, 42.0]], 0.0), Some((42.0, 42.0)));
    }

    #[test]
    fn test_full_window_range() {
        let points = ramp(1000);
        let (min, max) = estimate_range(&points, f64::NEG_INFINITY).unwrap();
        assert_eq!(min, 0.0);
        assert_eq!(max, 999.0);
    }

    #[test]
    fn test_window_start_excludes_old_samples() {
        let points = ramp(1000);
        let (min, max) = estimate_range(&points, 500.0).unwrap();
        assert!(min >= 400.0, "min {} should be near window start", min);
        assert_eq!(max, 999.0);
    }

    #[test]
    fn test_last_point_always_included() {
        let mut points = ramp(10_000);
        points.last_mut().unwrap()[1] = -5000.0;
        let (min, _) = estimate_range(&points, 0.0).unwrap();
        assert_eq!(min, -5000.0);
    }

    #[test]
    fn test_first_tick_always_computes() {
        // A fresh estimator must produce a range on its very first tick,
        // for any refresh period
        for refresh_ticks in [1, 2, 5, 100] {
            let mut estimator = RangeEstimator::new(refresh_ticks);
            assert_eq!(
                estimator.tick(&ramp(100), 0.0),
                Some((0.0, 99.0)),
                "refresh_ticks = {}",
                refresh_ticks
            );
        }
    }

    #[test]
    fn test_tick_throttling() {
        let mut estimator = RangeEstimator::new(3);
        let points = ramp(100);

        assert_eq!(estimator.tick(&points, 0.0), Some((0.0, 99.0)));

        // Cached value survives until the next refresh even if the data
        // changes underneath
        let changed = ramp(10);
        assert_eq!(estimator.tick(&changed, 0.0), Some((0.0, 99.0)));
        assert_eq!(estimator.tick(&changed, 0.0), Some((0.0, 99.0)));
        assert_eq!(estimator.tick(&changed, 0.0), Some((0.0, 9.0)));
    }

    #[test]
    fn test_invalidate_forces_recompute() {
        let mut estimator = RangeEstimator::new(10);
        let points = ramp(100);
        estimator.tick(&points, 0.0);

        estimator.invalidate();
        assert_eq!(estimator.cached(), None);
        assert_eq!(estimator.tick(&ramp(5), 0.0), Some((0.0, 4.0)));
    }
}
