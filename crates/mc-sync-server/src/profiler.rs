//! Nested named sections over the tick, in the shape `root.levels.world.tick`.

use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
pub struct Profiler {
    enabled: bool,
    stack: Vec<(String, Instant)>,
    totals: HashMap<String, Duration>,
}

impl Profiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start accumulating section timings. The section path is tracked
    /// either way so crash reports can name it.
    pub fn enable(&mut self) {
        self.enabled = true;
        self.totals.clear();
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn start_section(&mut self, name: &str) {
        self.stack.push((name.to_string(), Instant::now()));
    }

    pub fn end_section(&mut self) {
        let path = self.current_path();
        if let Some((_, started)) = self.stack.pop() {
            if self.enabled {
                *self.totals.entry(path).or_default() += started.elapsed();
            }
        }
    }

    pub fn end_start_section(&mut self, name: &str) {
        self.end_section();
        self.start_section(name);
    }

    /// Dot-joined path of open sections, empty between ticks.
    pub fn current_path(&self) -> String {
        self.stack
            .iter()
            .map(|(name, _)| name.as_str())
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Drop any sections left open by an aborted step.
    pub fn reset(&mut self) {
        self.stack.clear();
    }

    pub fn total(&self, path: &str) -> Option<Duration> {
        self.totals.get(path).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_paths() {
        let mut profiler = Profiler::new();
        profiler.enable();
        profiler.start_section("root");
        profiler.start_section("jobs");
        assert_eq!(profiler.current_path(), "root.jobs");
        profiler.end_start_section("levels");
        profiler.start_section("overworld");
        assert_eq!(profiler.current_path(), "root.levels.overworld");
        profiler.end_section();
        profiler.end_section();
        profiler.end_section();
        assert_eq!(profiler.current_path(), "");
        assert!(profiler.total("root.jobs").is_some());
        assert!(profiler.total("root.levels.overworld").is_some());
    }

    #[test]
    fn disabled_profiler_still_tracks_path() {
        let mut profiler = Profiler::new();
        profiler.start_section("root");
        profiler.start_section("tick");
        assert_eq!(profiler.current_path(), "root.tick");
        profiler.end_section();
        assert!(profiler.total("root.tick").is_none());
        profiler.reset();
        assert_eq!(profiler.current_path(), "");
    }
}
