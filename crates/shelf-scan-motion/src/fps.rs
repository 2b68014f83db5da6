//! Rolling frame-rate statistics.

use serde::{Deserialize, Serialize};

/// Frame-rate window configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct FpsParams {
    /// Number of per-frame samples kept in the ring.
    pub window: usize,
    /// Lowest acceptable instantaneous FPS.
    pub low_fps_threshold: i32,
}

impl Default for FpsParams {
    fn default() -> Self {
        Self {
            window: 60,
            low_fps_threshold: 20,
        }
    }
}

/// Statistics over the whole ring. Slots not yet written count as zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FpsStats {
    pub average: i32,
    pub highest: i32,
    pub lowest: i32,
}

/// Raised once per distinct low value of [`FpsStats::lowest`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LowFpsWarning {
    pub lowest: i32,
    pub threshold: i32,
}

/// Fixed-size ring of instantaneous frame rates.
#[derive(Clone, Debug)]
pub struct FpsCounter {
    params: FpsParams,
    ring: Vec<i32>,
    cursor: usize,
    last_timestamp: Option<f64>,
    previous_lowest: i32,
    stats: FpsStats,
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new(FpsParams::default())
    }
}

impl FpsCounter {
    pub fn new(params: FpsParams) -> Self {
        let window = params.window.max(1);
        Self {
            params,
            ring: vec![0; window],
            cursor: 0,
            last_timestamp: None,
            previous_lowest: 0,
            stats: FpsStats::default(),
        }
    }

    #[inline]
    pub fn stats(&self) -> FpsStats {
        self.stats
    }

    /// Feed a frame timestamp in seconds.
    ///
    /// The first call only sets the baseline. Non-increasing timestamps are
    /// skipped without touching the ring.
    pub fn update(&mut self, timestamp: f64) -> Option<LowFpsWarning> {
        let last = self.last_timestamp.replace(timestamp)?;
        let dt = timestamp - last;
        if dt <= 0.0 {
            log::debug!("non-increasing frame timestamp ({dt:.6}s), skipping fps sample");
            return None;
        }

        self.ring[self.cursor] = (1.0 / dt) as i32;
        self.cursor = (self.cursor + 1) % self.ring.len();

        self.recompute();
        self.check_low()
    }

    /// Until the ring has wrapped once the zero slots pull the average and
    /// the lowest value down, so no low-fps warning fires during warm-up.
    fn recompute(&mut self) {
        let sum: i64 = self.ring.iter().map(|&v| v as i64).sum();
        self.stats = FpsStats {
            average: (sum as f64 / self.ring.len() as f64) as i32,
            highest: self.ring.iter().copied().max().unwrap_or(0),
            lowest: self.ring.iter().copied().min().unwrap_or(0),
        };
    }

    fn check_low(&mut self) -> Option<LowFpsWarning> {
        let lowest = self.stats.lowest;
        let threshold = self.params.low_fps_threshold;
        if lowest < threshold && lowest != self.previous_lowest {
            self.previous_lowest = lowest;
            log::warn!("low fps detected: {lowest} (threshold {threshold})");
            return Some(LowFpsWarning { lowest, threshold });
        }
        None
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.params.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(counter: &mut FpsCounter, start: f64, dt: f64, n: usize) -> Vec<LowFpsWarning> {
        (0..n)
            .filter_map(|i| counter.update(start + dt * i as f64))
            .collect()
    }

    #[test]
    fn first_frame_sets_baseline_only() {
        let mut c = FpsCounter::default();
        assert!(c.update(10.0).is_none());
        assert_eq!(c.stats(), FpsStats::default());
    }

    #[test]
    fn steady_rate_is_reported() {
        let mut c = FpsCounter::default();
        let warnings = feed(&mut c, 0.0, 1.0 / 32.0, 61);
        assert!(warnings.is_empty());
        assert_eq!(
            c.stats(),
            FpsStats {
                average: 32,
                highest: 32,
                lowest: 32
            }
        );
    }

    #[test]
    fn warm_up_counts_empty_slots_as_zero() {
        let mut c = FpsCounter::default();
        let warnings = feed(&mut c, 0.0, 1.0 / 32.0, 11);
        assert!(warnings.is_empty());
        // 10 samples of 32 over 60 slots.
        assert_eq!(
            c.stats(),
            FpsStats {
                average: 5,
                highest: 32,
                lowest: 0
            }
        );
    }

    #[test]
    fn low_fps_warns_once_per_distinct_value() {
        let mut c = FpsCounter::default();
        feed(&mut c, 0.0, 1.0 / 32.0, 61);
        let t = 60.0 / 32.0;

        // One slow frame drops the minimum to 8.
        let w = c.update(t + 0.125).expect("warning");
        assert_eq!(w.lowest, 8);
        assert_eq!(w.threshold, 20);

        // The minimum stays at 8, no repeat.
        let again = feed(&mut c, t + 0.125 + 1.0 / 32.0, 1.0 / 32.0, 5);
        assert!(again.is_empty());
        assert_eq!(c.stats().lowest, 8);
        assert_eq!(c.stats().highest, 32);
    }

    #[test]
    fn ring_forgets_old_samples() {
        let mut c = FpsCounter::new(FpsParams {
            window: 4,
            low_fps_threshold: 0,
        });
        feed(&mut c, 0.0, 0.5, 3);
        assert_eq!(c.stats().lowest, 0);
        feed(&mut c, 1.5, 0.5, 3);
        assert_eq!(c.stats().lowest, 2);
        feed(&mut c, 10.0, 1.0 / 32.0, 6);
        // The jump from 2.5 to 10.0 s was pushed out by the later samples.
        assert_eq!(c.stats().lowest, 32);
    }

    #[test]
    fn repeated_timestamps_are_skipped() {
        let mut c = FpsCounter::default();
        c.update(1.0);
        c.update(1.0);
        assert_eq!(c.stats(), FpsStats::default());
    }
}
