//! Lower-priority periodic work run after the dimensions each step.

use tracing::trace;

use crate::context::ServerContext;

/// Ticks between keep-alives.
pub const KEEP_ALIVE_INTERVAL: u64 = 40;

type JobFn = Box<dyn FnMut(&mut ServerContext, u64) + Send>;

struct Job {
    name: String,
    interval: u64,
    run: JobFn,
}

#[derive(Default)]
pub struct JobList {
    jobs: Vec<Job>,
}

impl JobList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Jobs every server runs.
    pub fn standard() -> Self {
        let mut jobs = Self::new();
        jobs.add("keepalive", KEEP_ALIVE_INTERVAL, keep_alive);
        jobs
    }

    /// Run `f` on every tick divisible by `interval` (0 is treated as 1).
    pub fn add<F>(&mut self, name: &str, interval: u64, f: F)
    where
        F: FnMut(&mut ServerContext, u64) + Send + 'static,
    {
        self.jobs.push(Job {
            name: name.to_string(),
            interval: interval.max(1),
            run: Box::new(f),
        });
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn run(&mut self, ctx: &mut ServerContext, tick: u64) {
        for job in &mut self.jobs {
            if tick % job.interval == 0 {
                trace!("Running job {}", job.name);
                (job.run)(ctx, tick);
            }
        }
    }
}

fn keep_alive(ctx: &mut ServerContext, _tick: u64) {
    for conn in ctx.connections() {
        let id = rand::random::<i32>() & i32::MAX;
        ctx.send_keep_alive(conn, id);
    }
}
