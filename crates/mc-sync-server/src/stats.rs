//! Rolling tick timings.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

#[derive(Debug)]
pub struct TickStats {
    window: usize,
    ticks: VecDeque<Duration>,
    dimensions: HashMap<i32, VecDeque<Duration>>,
    /// "Can't keep up" warnings emitted.
    pub skipped_warnings: u64,
    /// Wall time discarded by the catch-up cap.
    pub skipped_ms: i64,
}

fn push(samples: &mut VecDeque<Duration>, window: usize, sample: Duration) {
    if samples.len() == window {
        samples.pop_front();
    }
    samples.push_back(sample);
}

fn mean(samples: &VecDeque<Duration>) -> Duration {
    if samples.is_empty() {
        return Duration::ZERO;
    }
    samples.iter().sum::<Duration>() / samples.len() as u32
}

impl TickStats {
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
            ticks: VecDeque::new(),
            dimensions: HashMap::new(),
            skipped_warnings: 0,
            skipped_ms: 0,
        }
    }

    pub fn record_tick(&mut self, duration: Duration) {
        push(&mut self.ticks, self.window, duration);
    }

    pub fn record_dimension(&mut self, dimension: i32, duration: Duration) {
        let window = self.window;
        push(self.dimensions.entry(dimension).or_default(), window, duration);
    }

    pub fn mean_tick(&self) -> Duration {
        mean(&self.ticks)
    }

    pub fn mean_dimension(&self, dimension: i32) -> Option<Duration> {
        self.dimensions.get(&dimension).map(mean)
    }

    pub fn samples(&self) -> usize {
        self.ticks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_is_bounded() {
        let mut stats = TickStats::new(3);
        for ms in [10, 20, 30, 40] {
            stats.record_tick(Duration::from_millis(ms));
        }
        assert_eq!(stats.samples(), 3);
        assert_eq!(stats.mean_tick(), Duration::from_millis(30));
    }

    #[test]
    fn per_dimension_means() {
        let mut stats = TickStats::new(100);
        stats.record_dimension(0, Duration::from_millis(4));
        stats.record_dimension(0, Duration::from_millis(6));
        assert_eq!(stats.mean_dimension(0), Some(Duration::from_millis(5)));
        assert_eq!(stats.mean_dimension(-1), None);
    }
}
