//! Fixed-rate tick loop with catch-up, sleep fast-path and crash capture.
//!
//! Wall time owed to the simulation accumulates as debt and is paid off in
//! fixed quanta. Each quantum runs one step: deferred tasks, every
//! dimension, periodic jobs, then one network pump.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use mc_sync_proto::packets::{ClientboundPacket, TimeUpdate};
use mc_sync_tasks::TaskQueue;
use tracing::{debug, error, info, warn};

use crate::clock::Clock;
use crate::config::TickSection;
use crate::context::ServerContext;
use crate::crash::{panic_message, CrashReport};
use crate::error::{PersistenceError, ServerError, SimulationError};
use crate::jobs::JobList;
use crate::network::NetworkPump;
use crate::persistence::Persistence;
use crate::profiler::Profiler;
use crate::stats::TickStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Stopped,
    Starting,
    Running,
    /// The last iteration ran more than one step.
    CatchingUp,
    Stopping,
    Crashed,
}

#[derive(Debug, Clone)]
pub struct TickSettings {
    pub quantum_ms: i64,
    pub max_catchup_ms: i64,
    pub warn_cooldown_ms: i64,
    pub min_sleep_ms: i64,
    /// 0 disables autosave.
    pub autosave_interval: u64,
    pub time_sync_interval: u64,
    pub tick_window: usize,
}

impl Default for TickSettings {
    fn default() -> Self {
        Self::from(&TickSection::default())
    }
}

impl From<&TickSection> for TickSettings {
    fn from(section: &TickSection) -> Self {
        Self {
            quantum_ms: section.quantum_ms.max(1),
            max_catchup_ms: section.max_catchup_ms.max(0),
            warn_cooldown_ms: section.warn_cooldown_ms,
            min_sleep_ms: section.min_sleep_ms.max(0),
            autosave_interval: section.autosave_interval,
            time_sync_interval: section.time_sync_interval.max(1),
            tick_window: section.tick_window,
        }
    }
}

/// What one loop iteration did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IterationReport {
    /// Elapsed time credited to the debt, after clamping.
    pub elapsed_ms: i64,
    pub steps: u32,
    /// Debt left for the next iteration.
    pub debt_ms: i64,
    /// A "can't keep up" warning was emitted.
    pub warned: bool,
}

/// A failure inside a step, captured before it unwinds.
struct Fault {
    title: &'static str,
    /// `None` when the failure was outside any dimension.
    dimension: Option<String>,
    cause: String,
    position: String,
}

fn outcome(result: std::thread::Result<Result<(), SimulationError>>) -> Option<String> {
    match result {
        Ok(Ok(())) => None,
        Ok(Err(e)) => Some(e.to_string()),
        Err(payload) => Some(panic_message(payload.as_ref())),
    }
}

pub struct TickScheduler {
    settings: TickSettings,
    clock: Box<dyn Clock>,
    ctx: ServerContext,
    network: Box<dyn NetworkPump>,
    persistence: Option<Box<dyn Persistence>>,
    jobs: JobList,
    tasks: TaskQueue<ServerContext>,
    profiler: Profiler,
    stats: TickStats,
    state: SchedulerState,
    tick: u64,
    debt_ms: i64,
    last_tick_start: i64,
    last_warning: Option<i64>,
    running: Arc<AtomicBool>,
    crash_dir: PathBuf,
}

impl TickScheduler {
    pub fn new(
        settings: TickSettings,
        clock: Box<dyn Clock>,
        ctx: ServerContext,
        network: Box<dyn NetworkPump>,
    ) -> Self {
        let stats = TickStats::new(settings.tick_window);
        Self {
            settings,
            clock,
            ctx,
            network,
            persistence: None,
            jobs: JobList::new(),
            tasks: TaskQueue::new(),
            profiler: Profiler::new(),
            stats,
            state: SchedulerState::Stopped,
            tick: 0,
            debt_ms: 0,
            last_tick_start: 0,
            last_warning: None,
            running: Arc::new(AtomicBool::new(true)),
            crash_dir: PathBuf::from("crash-reports"),
        }
    }

    pub fn with_persistence(mut self, persistence: Box<dyn Persistence>) -> Self {
        self.persistence = Some(persistence);
        self
    }

    pub fn with_jobs(mut self, jobs: JobList) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn with_crash_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.crash_dir = dir.into();
        self
    }

    /// Handle for posting work onto the simulation thread.
    pub fn tasks(&self) -> &TaskQueue<ServerContext> {
        &self.tasks
    }

    /// Clearing this flag stops [`run`](Self::run) at the top of its next iteration.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn debt_ms(&self) -> i64 {
        self.debt_ms
    }

    pub fn stats(&self) -> &TickStats {
        &self.stats
    }

    pub fn context(&self) -> &ServerContext {
        &self.ctx
    }

    /// Bind the calling thread as the simulation thread and start the clock.
    pub fn start(&mut self) {
        self.state = SchedulerState::Starting;
        self.tasks.bind_current_thread();
        self.last_tick_start = self.clock.now_ms();
        self.debt_ms = 0;
        info!(
            "Tick loop starting with {} dimension(s), {}ms per tick",
            self.ctx.dimension_count(),
            self.settings.quantum_ms
        );
        self.state = SchedulerState::Running;
    }

    /// One pass of the loop body without the trailing sleep.
    pub fn run_iteration(&mut self) -> Result<IterationReport, ServerError> {
        let now = self.clock.now_ms();
        let mut elapsed = now - self.last_tick_start;
        let mut warned = false;

        // Overdue time is only discarded together with a warning. Inside the
        // cooldown the whole backlog stays owed.
        let may_warn = self
            .last_warning
            .map_or(true, |at| now - at >= self.settings.warn_cooldown_ms);
        if elapsed > self.settings.max_catchup_ms && may_warn {
            warn!(
                "Can't keep up! Did the system time change, or is the server overloaded? \
                 Running {elapsed}ms behind, skipping {} tick(s)",
                elapsed / self.settings.quantum_ms
            );
            self.last_warning = Some(now);
            self.stats.skipped_warnings += 1;
            self.stats.skipped_ms += elapsed - self.settings.max_catchup_ms;
            elapsed = self.settings.max_catchup_ms;
            warned = true;
        }
        if elapsed < 0 {
            warn!("Time ran backwards! Did the system time change?");
            elapsed = 0;
        }

        self.debt_ms += elapsed;
        self.last_tick_start = now;

        let mut steps = 0;
        if self.ctx.all_idle() {
            self.guarded_step()?;
            steps = 1;
            self.debt_ms = 0;
        } else {
            while self.debt_ms >= self.settings.quantum_ms {
                self.debt_ms -= self.settings.quantum_ms;
                self.guarded_step()?;
                steps += 1;
            }
        }

        self.state = if steps > 1 {
            SchedulerState::CatchingUp
        } else {
            SchedulerState::Running
        };
        Ok(IterationReport {
            elapsed_ms: elapsed,
            steps,
            debt_ms: self.debt_ms,
            warned,
        })
    }

    /// Run one step; a panic that escapes it crashes the server like a world fault.
    fn guarded_step(&mut self) -> Result<(), ServerError> {
        match catch_unwind(AssertUnwindSafe(|| self.step())) {
            Ok(result) => result,
            Err(payload) => {
                let fault = Fault {
                    title: "Exception in server tick loop",
                    dimension: None,
                    cause: panic_message(payload.as_ref()),
                    position: self.profiler.current_path(),
                };
                Err(self.crash(fault))
            }
        }
    }

    fn step(&mut self) -> Result<(), ServerError> {
        let started = Instant::now();
        self.tick += 1;
        let tick = self.tick;

        self.profiler.start_section("root");
        self.profiler.start_section("jobs");
        self.tasks.drain(&mut self.ctx);

        self.profiler.end_start_section("levels");
        if let Err(fault) = self.tick_dimensions(tick) {
            return Err(self.crash(fault));
        }

        self.profiler.end_start_section("tickables");
        self.jobs.run(&mut self.ctx, tick);

        self.profiler.end_start_section("connection");
        let outgoing = self.ctx.outbox.take();
        for event in self.network.pump(outgoing) {
            self.ctx.handle_event(event);
        }

        if self.settings.autosave_interval > 0 && tick % self.settings.autosave_interval == 0 {
            self.profiler.end_start_section("save");
            debug!("Autosaving at tick {tick}");
            if let Err(e) = self.save_all() {
                error!("Autosave failed: {e}");
            }
        }
        self.profiler.end_section();
        self.profiler.end_section();

        self.stats.record_tick(started.elapsed());
        Ok(())
    }

    fn tick_dimensions(&mut self, tick: u64) -> Result<(), Fault> {
        let Self {
            ctx,
            profiler,
            stats,
            settings,
            ..
        } = self;
        let (dimensions, outbox) = ctx.split();

        for dimension in dimensions.iter_mut() {
            let started = Instant::now();
            profiler.start_section(dimension.name());

            if tick % settings.time_sync_interval == 0 {
                profiler.start_section("timeSync");
                let (world_age, time_of_day) = dimension.time();
                let packet = ClientboundPacket::TimeUpdate(TimeUpdate {
                    world_age,
                    time_of_day,
                });
                outbox.broadcast(dimension.players(), &packet);
                profiler.end_section();
            }

            profiler.start_section("tick");
            let result = catch_unwind(AssertUnwindSafe(|| dimension.tick(tick, outbox)));
            if let Some(cause) = outcome(result) {
                return Err(Fault {
                    title: "Exception ticking world",
                    dimension: Some(dimension.name().to_string()),
                    cause,
                    position: profiler.current_path(),
                });
            }

            profiler.end_start_section("entities");
            let result = catch_unwind(AssertUnwindSafe(|| dimension.update_entities(outbox)));
            if let Some(cause) = outcome(result) {
                return Err(Fault {
                    title: "Exception ticking world entities",
                    dimension: Some(dimension.name().to_string()),
                    cause,
                    position: profiler.current_path(),
                });
            }

            profiler.end_start_section("tracker");
            let result = catch_unwind(AssertUnwindSafe(|| {
                dimension.track(outbox);
                Ok(())
            }));
            if let Some(cause) = outcome(result) {
                return Err(Fault {
                    title: "Exception ticking world tracker",
                    dimension: Some(dimension.name().to_string()),
                    cause,
                    position: profiler.current_path(),
                });
            }
            profiler.end_section();

            profiler.end_section();
            stats.record_dimension(dimension.id(), started.elapsed());
        }
        Ok(())
    }

    /// Hand every dimension's snapshot to the persistence collaborator.
    pub fn save_all(&mut self) -> Result<(), PersistenceError> {
        let Some(persistence) = self.persistence.as_mut() else {
            return Ok(());
        };
        let snapshots = self.ctx.snapshots(self.tick);
        persistence.save(&snapshots)?;
        debug!("Saved {} dimension(s)", snapshots.len());
        Ok(())
    }

    fn crash(&mut self, fault: Fault) -> ServerError {
        let mut report = CrashReport::new(fault.title, fault.cause);
        if let Some(dimension) = &fault.dimension {
            report = report.with_detail("Dimension", dimension);
        }
        let report = report
            .with_detail("Tick", self.tick)
            .with_detail("Profiler Position", &fault.position)
            .with_detail("Players", self.ctx.connections().len())
            .with_detail("Mean tick", format!("{:?}", self.stats.mean_tick()));
        error!(
            "{} in {} at tick {}: {}",
            report.title(),
            fault.dimension.as_deref().unwrap_or("the tick loop"),
            self.tick,
            report.cause()
        );

        let path = match report.save(&self.crash_dir) {
            Ok(path) => {
                error!("This crash report has been saved to: {}", path.display());
                Some(path)
            }
            Err(e) => {
                error!("We were unable to save this crash report to disk: {e}");
                None
            }
        };

        self.profiler.reset();
        self.state = SchedulerState::Crashed;
        self.running.store(false, Ordering::Release);
        self.close();
        ServerError::Crashed { report: path }
    }

    /// Flush state and close every endpoint.
    fn close(&mut self) {
        if let Err(e) = self.save_all() {
            error!("Failed to save worlds: {e}");
        }
        self.network.shutdown();
        self.tasks.close();
    }

    /// Graceful shutdown. A crashed scheduler stays crashed.
    pub fn stop(&mut self) {
        if matches!(
            self.state,
            SchedulerState::Crashed | SchedulerState::Stopped
        ) {
            return;
        }
        self.state = SchedulerState::Stopping;
        info!("Stopping server at tick {}", self.tick);
        self.close();
        self.state = SchedulerState::Stopped;
    }

    /// Loop until the running flag is cleared or a dimension fails.
    pub fn run(&mut self) -> Result<(), ServerError> {
        self.start();
        while self.running.load(Ordering::Acquire) {
            let report = self.run_iteration()?;
            let sleep_ms = (self.settings.quantum_ms - report.debt_ms).max(self.settings.min_sleep_ms);
            self.clock.sleep(Duration::from_millis(sleep_ms as u64));
        }
        self.stop();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::network::{ConnId, NetworkEvent, Outbox, Outgoing};
    use crate::persistence::WorldSnapshot;
    use crate::world::{Dimension, EntityIds};
    use mc_sync_proto::types::BlockPos;
    use std::sync::Mutex;

    type Log = Arc<Mutex<Vec<String>>>;

    fn push(log: &Log, entry: &str) {
        log.lock().unwrap().push(entry.to_string());
    }

    #[derive(Default)]
    struct Recording {
        log: Log,
        asleep: bool,
        players: Vec<ConnId>,
        fail_at: Option<u64>,
        panic_entities_at: Option<u64>,
        panic_track_at: Option<u64>,
        tick: u64,
    }

    impl Dimension for Recording {
        fn id(&self) -> i32 {
            0
        }

        fn name(&self) -> &str {
            "rec"
        }

        fn tick(&mut self, tick: u64, _outbox: &mut Outbox) -> Result<(), SimulationError> {
            push(&self.log, "tick");
            self.tick = tick;
            if self.fail_at == Some(tick) {
                return Err(SimulationError::new("block update exploded"));
            }
            Ok(())
        }

        fn update_entities(&mut self, _outbox: &mut Outbox) -> Result<(), SimulationError> {
            push(&self.log, "entities");
            if self.panic_entities_at == Some(self.tick) {
                panic!("entity went missing");
            }
            Ok(())
        }

        fn track(&mut self, _outbox: &mut Outbox) {
            push(&self.log, "track");
            if self.panic_track_at == Some(self.tick) {
                panic!("viewer index out of bounds");
            }
        }

        fn time(&self) -> (i64, i64) {
            (self.tick as i64, 6000)
        }

        fn snapshot(&self, tick: u64) -> WorldSnapshot {
            WorldSnapshot {
                name: "rec".into(),
                dimension: 0,
                tick,
                world_age: self.tick as i64,
                time_of_day: 6000,
                spawn: BlockPos::default(),
                entities: Vec::new(),
            }
        }

        fn players(&self) -> Vec<ConnId> {
            self.players.clone()
        }

        fn all_players_asleep(&self) -> bool {
            self.asleep
        }
    }

    struct RecordingPump {
        log: Log,
        sent: Arc<Mutex<Vec<Vec<Outgoing>>>>,
    }

    impl NetworkPump for RecordingPump {
        fn pump(&mut self, outgoing: Vec<Outgoing>) -> Vec<NetworkEvent> {
            push(&self.log, "pump");
            self.sent.lock().unwrap().push(outgoing);
            Vec::new()
        }

        fn shutdown(&mut self) {
            push(&self.log, "net-shutdown");
        }
    }

    struct RecordingPersistence(Arc<Mutex<Vec<u64>>>);

    impl Persistence for RecordingPersistence {
        fn save(&mut self, snapshots: &[WorldSnapshot]) -> Result<(), PersistenceError> {
            self.0.lock().unwrap().push(snapshots[0].tick);
            Ok(())
        }
    }

    struct Harness {
        scheduler: TickScheduler,
        clock: ManualClock,
        log: Log,
        sent: Arc<Mutex<Vec<Vec<Outgoing>>>>,
        saves: Arc<Mutex<Vec<u64>>>,
    }

    fn harness_with(settings: TickSettings, dimension: Recording) -> Harness {
        let log = Arc::clone(&dimension.log);
        let clock = ManualClock::new(0);
        let sent = Arc::new(Mutex::new(Vec::new()));
        let saves = Arc::new(Mutex::new(Vec::new()));

        let mut ctx = ServerContext::new(EntityIds::default());
        ctx.add_dimension(Box::new(dimension));
        let pump = RecordingPump {
            log: Arc::clone(&log),
            sent: Arc::clone(&sent),
        };
        let mut scheduler = TickScheduler::new(settings, Box::new(clock.clone()), ctx, Box::new(pump))
            .with_persistence(Box::new(RecordingPersistence(Arc::clone(&saves))))
            .with_crash_dir(
                std::env::temp_dir().join(format!("mc_sync_crash_{}", rand::random::<u64>())),
            );
        scheduler.start();
        Harness {
            scheduler,
            clock,
            log,
            sent,
            saves,
        }
    }

    fn harness() -> Harness {
        harness_with(TickSettings::default(), Recording::default())
    }

    #[test]
    fn five_quanta_run_five_steps() {
        let mut h = harness();
        h.clock.advance(250);
        let report = h.scheduler.run_iteration().unwrap();
        assert_eq!(report.steps, 5);
        assert_eq!(report.debt_ms, 0);
        assert_eq!(h.scheduler.tick(), 5);
    }

    #[test]
    fn partial_quantum_stays_as_debt() {
        let mut h = harness();
        h.clock.advance(220);
        let report = h.scheduler.run_iteration().unwrap();
        assert_eq!(report.steps, 4);
        assert_eq!(report.debt_ms, 20);

        h.clock.advance(30);
        assert_eq!(h.scheduler.run_iteration().unwrap().steps, 1);
        assert_eq!(h.scheduler.debt_ms(), 0);
    }

    #[test]
    fn overload_is_clamped_and_warned_once_per_cooldown() {
        let mut h = harness();

        h.clock.advance(10_000);
        let first = h.scheduler.run_iteration().unwrap();
        assert!(first.warned);
        assert_eq!(first.elapsed_ms, 2000);
        assert_eq!(first.steps, 40);

        // Inside the cooldown nothing is discarded: the full backlog is run.
        h.clock.advance(10_000);
        let second = h.scheduler.run_iteration().unwrap();
        assert!(!second.warned);
        assert_eq!(second.elapsed_ms, 10_000);
        assert_eq!(second.steps, 200);
        assert_eq!(second.debt_ms, 0);

        h.clock.advance(10_000);
        let third = h.scheduler.run_iteration().unwrap();
        assert!(third.warned);
        assert_eq!(third.elapsed_ms, 2000);
        assert_eq!(h.scheduler.stats().skipped_warnings, 2);
        assert_eq!(h.scheduler.stats().skipped_ms, 2 * 8000);
    }

    #[test]
    fn backwards_clock_counts_as_zero() {
        let mut h = harness();
        h.clock.set(-100);
        let report = h.scheduler.run_iteration().unwrap();
        assert_eq!(report.elapsed_ms, 0);
        assert_eq!(report.steps, 0);

        h.clock.advance(50);
        assert_eq!(h.scheduler.run_iteration().unwrap().steps, 1);
    }

    #[test]
    fn sleeping_players_run_one_step_and_clear_debt() {
        let dimension = Recording {
            asleep: true,
            ..Recording::default()
        };
        let mut h = harness_with(TickSettings::default(), dimension);
        h.clock.advance(500);
        let report = h.scheduler.run_iteration().unwrap();
        assert_eq!(report.steps, 1);
        assert_eq!(report.debt_ms, 0);
    }

    #[test]
    fn step_runs_in_fixed_order() {
        let mut h = harness();
        let log = Arc::clone(&h.log);
        h.scheduler
            .tasks()
            .post(move |_| push(&log, "task"))
            .unwrap();
        let mut jobs = JobList::new();
        let log = Arc::clone(&h.log);
        jobs.add("record", 1, move |_, _| push(&log, "job"));
        h.scheduler.jobs = jobs;

        h.clock.advance(50);
        h.scheduler.run_iteration().unwrap();
        assert_eq!(
            *h.log.lock().unwrap(),
            ["task", "tick", "entities", "track", "job", "pump"]
        );
    }

    #[test]
    fn network_is_pumped_once_per_step() {
        let mut h = harness();
        h.clock.advance(150);
        h.scheduler.run_iteration().unwrap();
        assert_eq!(h.sent.lock().unwrap().len(), 3);
    }

    #[test]
    fn tasks_resolve_and_failures_stay_isolated() {
        let mut h = harness();
        h.scheduler.tasks().post(|_| panic!("bad task")).unwrap();
        let handle = h
            .scheduler
            .tasks()
            .submit(|ctx: &mut ServerContext| ctx.dimension_count())
            .unwrap();
        h.clock.advance(50);
        h.scheduler.run_iteration().unwrap();
        assert_eq!(handle.blocking_wait(), Ok(1));
        assert_eq!(h.scheduler.tasks().stats(), (1, 1));
    }

    #[test]
    fn autosave_on_interval() {
        let settings = TickSettings {
            autosave_interval: 3,
            ..TickSettings::default()
        };
        let mut h = harness_with(settings, Recording::default());
        h.clock.advance(350);
        h.scheduler.run_iteration().unwrap();
        assert_eq!(*h.saves.lock().unwrap(), vec![3, 6]);
    }

    #[test]
    fn time_sync_reaches_players() {
        let settings = TickSettings {
            time_sync_interval: 2,
            ..TickSettings::default()
        };
        let dimension = Recording {
            players: vec![7],
            ..Recording::default()
        };
        let mut h = harness_with(settings, dimension);
        h.clock.advance(100);
        h.scheduler.run_iteration().unwrap();

        let sent = h.sent.lock().unwrap();
        assert!(sent[0].is_empty());
        assert_eq!(
            sent[1],
            vec![Outgoing {
                conn: 7,
                packet: ClientboundPacket::TimeUpdate(TimeUpdate {
                    world_age: 1,
                    time_of_day: 6000,
                }),
            }]
        );
    }

    #[test]
    fn catching_up_state_follows_step_count() {
        let mut h = harness();
        assert_eq!(h.scheduler.state(), SchedulerState::Running);
        h.clock.advance(100);
        h.scheduler.run_iteration().unwrap();
        assert_eq!(h.scheduler.state(), SchedulerState::CatchingUp);
        h.clock.advance(50);
        h.scheduler.run_iteration().unwrap();
        assert_eq!(h.scheduler.state(), SchedulerState::Running);
    }

    #[test]
    fn world_failure_crashes_with_report() {
        let dimension = Recording {
            fail_at: Some(2),
            ..Recording::default()
        };
        let mut h = harness_with(TickSettings::default(), dimension);
        h.clock.advance(150);

        let err = h.scheduler.run_iteration().unwrap_err();
        let ServerError::Crashed { report: Some(path) } = err else {
            panic!("expected a saved crash report");
        };
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("Description: Exception ticking world"));
        assert!(text.contains("block update exploded"));
        assert!(text.contains("Profiler Position: root.levels.rec.tick"));
        assert!(text.contains("Tick: 2"));

        assert_eq!(h.scheduler.state(), SchedulerState::Crashed);
        assert_eq!(h.scheduler.tick(), 2);
        assert!(!h.scheduler.running_flag().load(Ordering::Acquire));
        assert!(h.scheduler.tasks().is_closed());
        assert_eq!(*h.saves.lock().unwrap(), vec![2]);
        assert_eq!(h.log.lock().unwrap().last().map(String::as_str), Some("net-shutdown"));

        h.scheduler.stop();
        assert_eq!(h.scheduler.state(), SchedulerState::Crashed);
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn entity_panic_is_captured() {
        let dimension = Recording {
            panic_entities_at: Some(1),
            ..Recording::default()
        };
        let mut h = harness_with(TickSettings::default(), dimension);
        h.clock.advance(50);
        let Err(ServerError::Crashed { report: Some(path) }) = h.scheduler.run_iteration() else {
            panic!("expected crash");
        };
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("Exception ticking world entities"));
        assert!(text.contains("entity went missing"));
        assert!(text.contains("root.levels.rec.entities"));
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn tracker_panic_is_captured() {
        let dimension = Recording {
            panic_track_at: Some(1),
            ..Recording::default()
        };
        let mut h = harness_with(TickSettings::default(), dimension);
        h.clock.advance(100);
        let Err(ServerError::Crashed { report: Some(path) }) = h.scheduler.run_iteration() else {
            panic!("expected crash");
        };
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("Exception ticking world tracker"));
        assert!(text.contains("viewer index out of bounds"));
        assert!(text.contains("root.levels.rec.tracker"));
        assert_eq!(h.scheduler.state(), SchedulerState::Crashed);
        assert_eq!(h.scheduler.tick(), 1);
        assert_eq!(*h.saves.lock().unwrap(), vec![1]);
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn panic_outside_dimensions_still_crashes_cleanly() {
        let mut h = harness();
        let mut jobs = JobList::new();
        jobs.add("broken", 1, |_, _| panic!("job state corrupted"));
        h.scheduler.jobs = jobs;

        h.clock.advance(50);
        let Err(ServerError::Crashed { report: Some(path) }) = h.scheduler.run_iteration() else {
            panic!("expected crash");
        };
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("Exception in server tick loop"));
        assert!(text.contains("job state corrupted"));
        assert!(text.contains("Profiler Position: root.tickables"));
        assert!(!text.contains("Dimension:"));
        assert_eq!(h.scheduler.state(), SchedulerState::Crashed);
        assert!(h.scheduler.tasks().is_closed());
        assert_eq!(h.log.lock().unwrap().last().map(String::as_str), Some("net-shutdown"));
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn run_stops_at_top_of_loop_and_saves() {
        let settings = TickSettings {
            autosave_interval: 0,
            ..TickSettings::default()
        };
        let mut h = harness_with(settings, Recording::default());
        let flag = h.scheduler.running_flag();
        let mut jobs = JobList::new();
        jobs.add("halt", 1, move |_, tick| {
            if tick == 3 {
                flag.store(false, Ordering::Release);
            }
        });
        h.scheduler.jobs = jobs;

        h.scheduler.run().unwrap();
        assert_eq!(h.scheduler.tick(), 3);
        assert_eq!(h.scheduler.state(), SchedulerState::Stopped);
        assert_eq!(h.scheduler.context().dimension_count(), 1);
        assert_eq!(*h.saves.lock().unwrap(), vec![3]);
        assert!(h
            .clock
            .sleeps()
            .iter()
            .all(|d| *d == Duration::from_millis(50)));
    }
}
