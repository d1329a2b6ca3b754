use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

use tokio::sync::oneshot;
use tracing::{error, warn};

use crate::error::TaskError;
use crate::handle::TaskHandle;

/// How a job finished, as seen by [`TaskQueue::drain`].
enum Ran {
    Done,
    Skipped,
    Failed(String),
}

type Job<C> = Box<dyn FnOnce(&mut C) -> Ran + Send>;

struct Shared<C> {
    jobs: Mutex<VecDeque<Job<C>>>,
    closed: AtomicBool,
    owner: Mutex<Option<ThreadId>>,
    completed: AtomicU64,
    failed: AtomicU64,
}

/// FIFO of closures that run against the simulation context `C`.
///
/// Cloning yields another handle to the same queue.
pub struct TaskQueue<C> {
    shared: Arc<Shared<C>>,
}

impl<C> Clone for TaskQueue<C> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<C: 'static> Default for TaskQueue<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: 'static> TaskQueue<C> {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                jobs: Mutex::new(VecDeque::new()),
                closed: AtomicBool::new(false),
                owner: Mutex::new(None),
                completed: AtomicU64::new(0),
                failed: AtomicU64::new(0),
            }),
        }
    }

    fn jobs(&self) -> MutexGuard<'_, VecDeque<Job<C>>> {
        // A panic never happens while the lock is held, but recover anyway.
        self.shared
            .jobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Record the calling thread as the one that drains this queue.
    pub fn bind_current_thread(&self) {
        *self
            .shared
            .owner
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(thread::current().id());
    }

    /// Whether the caller is the thread bound with [`bind_current_thread`](Self::bind_current_thread).
    pub fn is_simulation_thread(&self) -> bool {
        *self
            .shared
            .owner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            == Some(thread::current().id())
    }

    /// Queue `f` to run on the simulation thread and return a handle to its result.
    pub fn submit<R, F>(&self, f: F) -> Result<TaskHandle<R>, TaskError>
    where
        F: FnOnce(&mut C) -> R + Send + 'static,
        R: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);

        let job: Job<C> = Box::new(move |ctx: &mut C| {
            if flag.load(Ordering::Acquire) {
                let _ = tx.send(Err(TaskError::Cancelled));
                return Ran::Skipped;
            }
            // The submitter may have dropped its handle, so send results are ignored.
            match panic::catch_unwind(AssertUnwindSafe(|| f(ctx))) {
                Ok(value) => {
                    let _ = tx.send(Ok(value));
                    Ran::Done
                }
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    let _ = tx.send(Err(TaskError::Panicked(message.clone())));
                    Ran::Failed(message)
                }
            }
        });

        self.push(job)?;
        Ok(TaskHandle::new(rx, cancelled))
    }

    /// Queue `f` without keeping a handle. Failures are still logged by [`drain`](Self::drain).
    pub fn post<F>(&self, f: F) -> Result<(), TaskError>
    where
        F: FnOnce(&mut C) + Send + 'static,
    {
        self.push(Box::new(move |ctx: &mut C| {
            f(ctx);
            Ran::Done
        }))
    }

    fn push(&self, job: Job<C>) -> Result<(), TaskError> {
        let mut jobs = self.jobs();
        // Checked under the lock so `close` cannot interleave with an enqueue.
        if self.shared.closed.load(Ordering::Acquire) {
            return Err(TaskError::QueueClosed);
        }
        jobs.push_back(job);
        Ok(())
    }

    /// Run queued tasks in submission order until the queue is empty.
    ///
    /// The lock is released while each task runs, so tasks may submit further tasks; those
    /// run in the same drain. Returns how many tasks were taken off the queue.
    pub fn drain(&self, ctx: &mut C) -> usize {
        let mut ran = 0;
        loop {
            let Some(job) = self.jobs().pop_front() else {
                break;
            };
            let ran_as = panic::catch_unwind(AssertUnwindSafe(|| job(ctx)))
                .unwrap_or_else(|payload| Ran::Failed(panic_message(payload.as_ref())));
            match ran_as {
                Ran::Done => {
                    self.shared.completed.fetch_add(1, Ordering::Relaxed);
                }
                Ran::Skipped => {}
                Ran::Failed(message) => {
                    self.shared.failed.fetch_add(1, Ordering::Relaxed);
                    error!("Deferred task failed: {message}");
                }
            }
            ran += 1;
        }
        ran
    }

    /// Refuse further submissions and drop anything still queued.
    ///
    /// Handles of dropped tasks resolve to [`TaskError::Dropped`].
    pub fn close(&self) {
        let dropped = {
            let mut jobs = self.jobs();
            self.shared.closed.store(true, Ordering::Release);
            std::mem::take(&mut *jobs)
        };
        if !dropped.is_empty() {
            warn!("Task queue closed with {} pending task(s)", dropped.len());
        }
    }

    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        self.jobs().len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs().is_empty()
    }

    /// (completed, failed) task counts since creation.
    pub fn stats(&self) -> (u64, u64) {
        (
            self.shared.completed.load(Ordering::Relaxed),
            self.shared.failed.load(Ordering::Relaxed),
        )
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Sim {
        log: Vec<u32>,
    }

    #[test]
    fn runs_in_fifo_order() {
        let queue = TaskQueue::<Sim>::new();
        for i in 0..5 {
            queue.post(move |sim: &mut Sim| sim.log.push(i)).unwrap();
        }
        let mut sim = Sim::default();
        assert_eq!(queue.drain(&mut sim), 5);
        assert_eq!(sim.log, vec![0, 1, 2, 3, 4]);
        assert!(queue.is_empty());
    }

    #[test]
    fn result_delivered_to_submitter() {
        let queue = TaskQueue::<Sim>::new();
        let mut handle = queue
            .submit(|sim: &mut Sim| {
                sim.log.push(7);
                sim.log.len()
            })
            .unwrap();
        assert!(handle.try_result().is_none());
        let mut sim = Sim::default();
        queue.drain(&mut sim);
        assert_eq!(handle.try_result(), Some(Ok(1)));
    }

    #[test]
    fn panicking_task_is_isolated() {
        let queue = TaskQueue::<Sim>::new();
        queue.post(|sim: &mut Sim| sim.log.push(1)).unwrap();
        let mut bad = queue
            .submit(|_: &mut Sim| -> u32 { panic!("boom") })
            .unwrap();
        queue.post(|sim: &mut Sim| sim.log.push(3)).unwrap();

        let mut sim = Sim::default();
        assert_eq!(queue.drain(&mut sim), 3);
        assert_eq!(sim.log, vec![1, 3]);
        assert_eq!(bad.try_result(), Some(Err(TaskError::Panicked("boom".into()))));
        assert_eq!(queue.stats(), (2, 1));
    }

    #[test]
    fn posted_panic_is_counted() {
        let queue = TaskQueue::<Sim>::new();
        queue.post(|_: &mut Sim| panic!("lost")).unwrap();
        queue.post(|sim: &mut Sim| sim.log.push(2)).unwrap();
        let mut sim = Sim::default();
        queue.drain(&mut sim);
        assert_eq!(sim.log, vec![2]);
        assert_eq!(queue.stats(), (1, 1));
    }

    #[test]
    fn submitted_panic_counts_as_failed() {
        let queue = TaskQueue::<Sim>::new();
        let _handle = queue
            .submit(|_: &mut Sim| -> u32 { panic!("no reply") })
            .unwrap();
        queue.drain(&mut Sim::default());
        assert_eq!(queue.stats(), (0, 1));
    }

    #[test]
    fn cancelled_task_does_not_run() {
        let queue = TaskQueue::<Sim>::new();
        let mut handle = queue.submit(|sim: &mut Sim| sim.log.push(9)).unwrap();
        handle.cancel();
        let mut sim = Sim::default();
        queue.drain(&mut sim);
        assert!(sim.log.is_empty());
        assert_eq!(handle.try_result(), Some(Err(TaskError::Cancelled)));
        assert_eq!(queue.stats(), (0, 0));
    }

    #[test]
    fn tasks_submitted_during_drain_run_in_same_drain() {
        let queue = TaskQueue::<Sim>::new();
        let inner = queue.clone();
        queue
            .post(move |sim: &mut Sim| {
                sim.log.push(1);
                inner.post(|sim: &mut Sim| sim.log.push(2)).unwrap();
            })
            .unwrap();
        let mut sim = Sim::default();
        assert_eq!(queue.drain(&mut sim), 2);
        assert_eq!(sim.log, vec![1, 2]);
    }

    #[test]
    fn closed_queue_rejects_and_drops() {
        let queue = TaskQueue::<Sim>::new();
        let mut pending = queue.submit(|_: &mut Sim| 1).unwrap();
        queue.close();
        assert!(queue.is_closed());
        assert_eq!(pending.try_result(), Some(Err(TaskError::Dropped)));
        assert!(matches!(
            queue.post(|_: &mut Sim| {}),
            Err(TaskError::QueueClosed)
        ));
    }

    #[test]
    fn simulation_thread_binding() {
        let queue = TaskQueue::<Sim>::new();
        assert!(!queue.is_simulation_thread());
        queue.bind_current_thread();
        assert!(queue.is_simulation_thread());
        let other = queue.clone();
        let on_other = thread::spawn(move || other.is_simulation_thread())
            .join()
            .unwrap();
        assert!(!on_other);
    }

    #[test]
    fn submit_from_other_threads() {
        let queue = TaskQueue::<Sim>::new();
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let q = queue.clone();
                thread::spawn(move || q.post(move |sim: &mut Sim| sim.log.push(i)).unwrap())
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        let mut sim = Sim::default();
        queue.drain(&mut sim);
        sim.log.sort_unstable();
        assert_eq!(sim.log, vec![0, 1, 2, 3]);
    }

    #[tokio::test]
    async fn async_waiter_sees_result() {
        let queue = TaskQueue::<Sim>::new();
        let handle = queue.submit(|_: &mut Sim| "done").unwrap();
        let q = queue.clone();
        std::thread::spawn(move || {
            let mut sim = Sim::default();
            q.drain(&mut sim);
        })
        .join()
        .unwrap();
        assert_eq!(handle.wait().await, Ok("done"));
    }
}
