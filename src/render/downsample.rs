//! Point-budget downsampling for plot series
//!
//! Two reducers over `[x, y]` point slices: Largest-Triangle-Three-Buckets
//! keeps the visually dominant point per bucket, Min-Max keeps the extremes
//! per bucket so spikes survive. Both keep the first and last points and
//! preserve chronological order, so connected-line rendering stays stable
//! at the window edges.

use serde::{Deserialize, Serialize};

/// Reduction strategy applied when a series exceeds the point budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DownsampleMethod {
    /// Largest-Triangle-Three-Buckets, best shape preservation.
    #[default]
    Lttb,
    /// Per-bucket min and max, best spike preservation.
    MinMax,
}

impl std::fmt::Display for DownsampleMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DownsampleMethod::Lttb => write!(f, "LTTB"),
            DownsampleMethod::MinMax => write!(f, "Min-Max"),
        }
    }
}

/// Reduce `points` to at most `budget` points using `method`.
///
/// Slices already within budget are returned unchanged (copied). A budget
/// below 3 degenerates to the first and last points.
pub fn downsample(points: &[[f64; 2]], budget: usize, method: DownsampleMethod) -> Vec<[f64; 2]> {
    if points.len() <= budget {
        return points.to_vec();
    }
    if budget < 3 {
        return match points {
            [] => Vec::new(),
            [only] => vec![*only],
            [first, .., last] => vec![*first, *last],
        };
    }
    match method {
        DownsampleMethod::Lttb => lttb(points, budget),
        // Paired emission needs room for at least one min/max couple
        DownsampleMethod::MinMax if budget < 4 => lttb(points, budget),
        DownsampleMethod::MinMax => min_max(points, budget),
    }
}

/// Largest-Triangle-Three-Buckets.
///
/// The interior indices `1..len-1` are split into `budget - 2` buckets.
/// For each bucket the point forming the largest triangle with the
/// previously selected point and the mean of the next bucket is kept.
fn lttb(points: &[[f64; 2]], budget: usize) -> Vec<[f64; 2]> {
    let len = points.len();
    let bucket_count = budget - 2;
    let bucket_size = (len - 2) as f64 / bucket_count as f64;

    let mut out = Vec::with_capacity(budget);
    out.push(points[0]);
    let mut selected = 0usize;

    for bucket in 0..bucket_count {
        let start = (bucket as f64 * bucket_size) as usize + 1;
        let end = (((bucket + 1) as f64 * bucket_size) as usize + 1).min(len - 1);

        // Anchor C is the mean of the next bucket, or the final point for
        // the last bucket
        let next_start = end;
        let next_end = (((bucket + 2) as f64 * bucket_size) as usize + 1).min(len - 1);
        let anchor = if bucket + 1 < bucket_count && next_end > next_start {
            let mut cx = 0.0;
            let mut cy = 0.0;
            for p in &points[next_start..next_end] {
                cx += p[0];
                cy += p[1];
            }
            let n = (next_end - next_start) as f64;
            [cx / n, cy / n]
        } else {
            points[len - 1]
        };

        let a = points[selected];
        let mut best_index = start;
        let mut best_area = -1.0f64;
        for (i, p) in points.iter().enumerate().take(end).skip(start) {
            let area = triangle_area(a, *p, anchor);
            if area > best_area {
                best_area = area;
                best_index = i;
            }
        }

        out.push(points[best_index]);
        selected = best_index;
    }

    out.push(points[len - 1]);
    out
}

/// Per-bucket extremes. Interior indices are split into `(budget - 2) / 2`
/// buckets so the output never exceeds the budget even when every bucket
/// contributes both a min and a max.
fn min_max(points: &[[f64; 2]], budget: usize) -> Vec<[f64; 2]> {
    let len = points.len();
    let bucket_count = ((budget - 2) / 2).max(1);
    let bucket_size = (len - 2) as f64 / bucket_count as f64;

    let mut out = Vec::with_capacity(budget);
    out.push(points[0]);

    for bucket in 0..bucket_count {
        let start = (bucket as f64 * bucket_size) as usize + 1;
        let end = (((bucket + 1) as f64 * bucket_size) as usize + 1).min(len - 1);
        if start >= end {
            continue;
        }

        let mut min_index = start;
        let mut max_index = start;
        for i in start..end {
            if points[i][1] < points[min_index][1] {
                min_index = i;
            }
            if points[i][1] > points[max_index][1] {
                max_index = i;
            }
        }

        if min_index == max_index {
            out.push(points[min_index]);
        } else if min_index < max_index {
            out.push(points[min_index]);
            out.push(points[max_index]);
        } else {
            out.push(points[max_index]);
            out.push(points[min_index]);
        }
    }

    out.push(points[len - 1]);
    out
}

fn triangle_area(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> f64 {
    ((a[0] - c[0]) * (b[1] - a[1]) - (a[0] - b[0]) * (c[1] - a[1])).abs() * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine_points(n: usize) -> Vec<[f64; 2]> {
        (0..n)
            .map(|i| {
                let x = i as f64 * 0.01;
                [x, (x * 5.0).sin()]
            })
            .collect()
    }

    #[test]
    fn test_passthrough_within_budget() {
        let points = sine_points(100);
        let out = downsample(&points, 100, DownsampleMethod::Lttb);
        assert_eq!(out, points);
        let out = downsample(&points, 500, DownsampleMethod::MinMax);
        assert_eq!(out, points);
    }

    #[test]
    fn test_lttb_keeps_endpoints_and_budget() {
        let points = sine_points(10_000);
        let out = downsample(&points, 500, DownsampleMethod::Lttb);
        assert_eq!(out.len(), 500);
        assert_eq!(out[0], points[0]);
        assert_eq!(*out.last().unwrap(), *points.last().unwrap());
    }

    #[test]
    fn test_lttb_output_is_chronological() {
        let points = sine_points(5000);
        let out = downsample(&points, 200, DownsampleMethod::Lttb);
        for pair in out.windows(2) {
            assert!(pair[0][0] < pair[1][0]);
        }
    }

    #[test]
    fn test_lttb_preserves_isolated_spike() {
        let mut points = sine_points(10_000);
        points[4321][1] = 100.0;
        let out = downsample(&points, 300, DownsampleMethod::Lttb);
        assert!(out.iter().any(|p| p[1] == 100.0));
    }

    #[test]
    fn test_min_max_within_budget_and_ordered() {
        let points = sine_points(10_000);
        let out = downsample(&points, 500, DownsampleMethod::MinMax);
        assert!(out.len() <= 500);
        assert_eq!(out[0], points[0]);
        assert_eq!(*out.last().unwrap(), *points.last().unwrap());
        for pair in out.windows(2) {
            assert!(pair[0][0] <= pair[1][0]);
        }
    }

    #[test]
    fn test_min_max_preserves_extremes() {
        let mut points = sine_points(10_000);
        points[1234][1] = 50.0;
        points[8765][1] = -50.0;
        let out = downsample(&points, 100, DownsampleMethod::MinMax);
        assert!(out.iter().any(|p| p[1] == 50.0));
        assert!(out.iter().any(|p| p[1] == -50.0));
    }

    #[test]
    fn test_constant_bucket_emits_once() {
        let points: Vec<[f64; 2]> = (0..1000).map(|i| [i as f64, 7.0]).collect();
        let out = downsample(&points, 50, DownsampleMethod::MinMax);
        // All-constant buckets collapse min and max to one emission
        assert!(out.len() <= 2 + (50 - 2) / 2);
    }

    #[test]
    fn test_tiny_budget_degenerates_to_endpoints() {
        let points = sine_points(100);
        let out = downsample(&points, 2, DownsampleMethod::Lttb);
        assert_eq!(out, vec![points[0], points[99]]);
        let out = downsample(&[], 2, DownsampleMethod::Lttb);
        assert!(out.is_empty());
    }

    // Property-based tests using proptest
    use proptest::prelude::*;

    fn random_series(len: usize, ys: &[f64]) -> Vec<[f64; 2]> {
        (0..len).map(|i| [i as f64, ys[i % ys.len()]]).collect()
    }

    proptest! {
        #[test]
        fn test_downsample_invariants_hold(
            len in 10usize..3000,
            budget in 3usize..500,
            ys in prop::collection::vec(-1.0e4f64..1.0e4, 1..32)
        ) {
            let points = random_series(len, &ys);
            for method in [DownsampleMethod::Lttb, DownsampleMethod::MinMax] {
                let out = downsample(&points, budget, method);

                // Never exceeds the budget
                prop_assert!(out.len() <= budget);
                prop_assert!(out.len() <= points.len());

                // First and last points survive
                prop_assert_eq!(out[0], points[0]);
                prop_assert_eq!(*out.last().unwrap(), *points.last().unwrap());

                // Chronological order is preserved
                for pair in out.windows(2) {
                    prop_assert!(pair[0][0] <= pair[1][0]);
                }

                // Every output point is a real input point
                for p in &out {
                    prop_assert_eq!(points[p[0] as usize], *p);
                }
            }
        }
    }
}
