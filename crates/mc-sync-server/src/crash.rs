//! Crash reports written when a simulation step fails.

use std::any::Any;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone)]
pub struct CrashReport {
    title: String,
    cause: String,
    details: Vec<(String, String)>,
    created: SystemTime,
}

impl CrashReport {
    pub fn new(title: impl Into<String>, cause: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            cause: cause.into(),
            details: Vec::new(),
            created: SystemTime::now(),
        }
    }

    pub fn with_detail(mut self, key: &str, value: impl ToString) -> Self {
        self.add_detail(key, value);
        self
    }

    pub fn add_detail(&mut self, key: &str, value: impl ToString) {
        self.details.push((key.to_string(), value.to_string()));
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn cause(&self) -> &str {
        &self.cause
    }

    pub fn detail(&self, key: &str) -> Option<&str> {
        self.details
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn timestamp(&self) -> u64 {
        self.created
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "---- Server Crash Report ----");
        let _ = writeln!(out);
        let _ = writeln!(out, "Time: {}", self.timestamp());
        let _ = writeln!(out, "Description: {}", self.title);
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", self.cause);
        let _ = writeln!(out);
        let _ = writeln!(out, "-- Details --");
        for (key, value) in &self.details {
            let _ = writeln!(out, "\t{key}: {value}");
        }
        out
    }

    /// Write to `dir/crash-<unix seconds>-server.txt`, adding a counter if
    /// that name is taken.
    pub fn save(&self, dir: &Path) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let stamp = self.timestamp();
        let mut path = dir.join(format!("crash-{stamp}-server.txt"));
        let mut n = 1;
        while path.exists() {
            path = dir.join(format!("crash-{stamp}-{n}-server.txt"));
            n += 1;
        }
        std::fs::write(&path, self.render())?;
        Ok(path)
    }
}

/// Text of a caught panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
