//! An elastic worker pool for opaque, zero-argument tasks.
//!
//! [`Executor`] dispatches [`Task`]s — anything `FnOnce() + Send + 'static`
//! — across a set of worker threads that grows and shrinks between
//! [`ExecutorConfig::low_watermark`] and [`ExecutorConfig::high_watermark`].
//! All of the pool's mutable state (queue, counters, roster, lifecycle
//! state) lives behind a single [`parking_lot::Mutex`]; the pool has
//! historically been implemented twice with a second lock carved out for
//! worker bookkeeping, which opens a race between a submission spawning a
//! worker and that worker deregistering itself. One lock, one source of
//! truth.
//!
//! # Worker lifecycle
//!
//! A worker alternates between three states: idle (waiting on the
//! queue-nonempty condition, bounded by [`ExecutorConfig::idle_timeout`]),
//! running (popped a task and is executing it outside the lock), and
//! exiting (deregistering from the roster). A worker above
//! [`ExecutorConfig::low_watermark`] that times out while idle and the pool
//! is still [`State::Run`] prunes itself. Under [`State::Stopping`], workers
//! ignore the idle timeout entirely and keep draining the queue until it is
//! empty, then exit unconditionally.

use alloc::boxed::Box;
use std::collections::{HashSet, VecDeque};
use std::panic::{self, AssertUnwindSafe};
use std::string::String;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, ThreadId};
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

use crate::error::ExecutorError;

/// An opaque unit of work submitted to an [`Executor`].
///
/// The pool performs no introspection on a task: it is called exactly
/// once, on some worker thread, with no arguments and no return value.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Lifecycle state of an [`Executor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Constructed but [`Executor::start`] has not yet been called.
    Uninitialized,
    /// Accepting submissions; workers are live between the watermarks.
    Run,
    /// Draining: no new submissions are accepted, but already-queued tasks
    /// still run to completion.
    Stopping,
    /// Every worker has exited. `workers_total == 0`.
    Stopped,
}

/// Configuration accepted by [`Executor::start`].
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Diagnostic label, used only in log output.
    pub name: String,
    /// Minimum number of workers kept alive even when idle. Must be at
    /// least 1.
    pub low_watermark: usize,
    /// Maximum number of workers that may exist simultaneously. Must be
    /// `>= low_watermark`.
    pub high_watermark: usize,
    /// Maximum number of queued, not-yet-started tasks.
    pub max_queue_size: usize,
    /// How long an idle worker above `low_watermark` waits before
    /// self-terminating.
    pub idle_timeout: Duration,
}

impl ExecutorConfig {
    /// Convenience constructor equivalent to the struct literal.
    pub fn new(
        name: impl Into<String>,
        low_watermark: usize,
        high_watermark: usize,
        max_queue_size: usize,
        idle_timeout: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            low_watermark,
            high_watermark,
            max_queue_size,
            idle_timeout,
        }
    }
}

struct Shared {
    state: State,
    queue: VecDeque<Task>,
    workers_total: usize,
    workers_busy: usize,
    roster: HashSet<ThreadId>,
}

struct Inner {
    config: ExecutorConfig,
    shared: Mutex<Shared>,
    /// Signaled when a task is enqueued, or when the state transitions away
    /// from `Run`, so idle workers wake up to re-check both conditions.
    not_empty: Condvar,
    /// Signaled by the last worker to deregister, so `Stop(await=true)` can
    /// block on a single condition rather than polling.
    drained: Condvar,
    /// Count of live [`Executor`] handles sharing this `Inner` — distinct
    /// from `Arc::strong_count(&inner)`, which also counts the `Arc<Inner>`
    /// clone every worker thread holds (see `spawn_worker`). `Drop` needs
    /// the handle count, not the strong count: a running pool always has at
    /// least `low_watermark >= 1` workers, so the strong count never reaches
    /// 1 while the pool is actually live, and counting on it would make
    /// dropping the last `Executor` handle never drain the pool.
    handles: AtomicUsize,
}

/// An elastic pool of worker threads executing opaque tasks.
///
/// Cloning an `Executor` is cheap and shares the same underlying pool —
/// internally it is an `Arc` handle, so the typical pattern is to construct
/// one and hand clones to however many submitters need it.
pub struct Executor {
    inner: Arc<Inner>,
}

impl Executor {
    /// Validates `config` and constructs an executor in
    /// [`State::Uninitialized`]. No threads are spawned until
    /// [`Executor::start`] is called.
    pub fn new(config: ExecutorConfig) -> Result<Self, ExecutorError> {
        if config.low_watermark < 1 || config.high_watermark < config.low_watermark {
            return Err(ExecutorError::InvalidWatermarks {
                low: config.low_watermark,
                high: config.high_watermark,
            });
        }
        Ok(Self {
            inner: Arc::new(Inner {
                config,
                shared: Mutex::new(Shared {
                    state: State::Uninitialized,
                    queue: VecDeque::new(),
                    workers_total: 0,
                    workers_busy: 0,
                    roster: HashSet::new(),
                }),
                not_empty: Condvar::new(),
                drained: Condvar::new(),
                handles: AtomicUsize::new(1),
            }),
        })
    }

    /// Spawns `low_watermark` workers and transitions to [`State::Run`].
    ///
    /// Returns [`ExecutorError::AlreadyStarted`] if this executor has
    /// already been started (regardless of whether it has since stopped —
    /// an `Executor` is single-use; build a new one to run again).
    pub fn start(&self) -> Result<(), ExecutorError> {
        let mut guard = self.inner.shared.lock();
        if guard.state != State::Uninitialized {
            return Err(ExecutorError::AlreadyStarted);
        }
        guard.state = State::Run;
        for _ in 0..self.inner.config.low_watermark {
            if let Err(err) = spawn_worker(&self.inner, &mut guard) {
                guard.state = State::Stopping;
                drop(guard);
                self.inner.not_empty.notify_all();
                self.stop(true);
                return Err(err);
            }
        }
        Ok(())
    }

    /// Diagnostic label this executor was configured with.
    pub fn name(&self) -> &str {
        &self.inner.config.name
    }

    /// Current lifecycle state.
    pub fn state(&self) -> State {
        self.inner.shared.lock().state
    }

    /// Number of worker threads currently alive.
    pub fn workers_total(&self) -> usize {
        self.inner.shared.lock().workers_total
    }

    /// Number of worker threads currently executing a task.
    pub fn workers_busy(&self) -> usize {
        self.inner.shared.lock().workers_busy
    }

    /// Number of tasks queued but not yet started.
    pub fn queue_len(&self) -> usize {
        self.inner.shared.lock().queue.len()
    }

    /// Enqueues `task` for eventual execution on a worker thread.
    ///
    /// Returns `false` without any side effect if the pool is not
    /// [`State::Run`] or if the queue is already at
    /// [`ExecutorConfig::max_queue_size`]. On success, if every existing
    /// worker is busy and the pool is below `high_watermark`, a new worker
    /// is spawned before the task is enqueued — this is the only place
    /// workers are created after `start`.
    pub fn submit<F>(&self, task: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        let mut guard = self.inner.shared.lock();
        if guard.state != State::Run {
            return false;
        }
        if guard.queue.len() >= self.inner.config.max_queue_size {
            return false;
        }
        if guard.workers_busy == guard.workers_total
            && guard.workers_total < self.inner.config.high_watermark
        {
            if let Err(err) = spawn_worker(&self.inner, &mut guard) {
                log::error!(
                    "executor '{}': failed to spawn additional worker: {err}",
                    self.inner.config.name
                );
            }
        }
        guard.queue.push_back(Box::new(task));
        drop(guard);
        self.inner.not_empty.notify_one();
        true
    }

    /// Begins shutdown: refuses further submissions and wakes every worker.
    ///
    /// Already-queued tasks keep running. If `await_completion` is `true`,
    /// blocks until every worker has deregistered and the pool has reached
    /// [`State::Stopped`]; otherwise returns immediately and the transition
    /// to `Stopped` happens asynchronously once the last worker exits.
    pub fn stop(&self, await_completion: bool) {
        {
            let mut guard = self.inner.shared.lock();
            if guard.state == State::Run {
                guard.state = State::Stopping;
            } else if guard.state == State::Uninitialized {
                guard.state = State::Stopped;
            }
        }
        self.inner.not_empty.notify_all();
        if await_completion {
            let mut guard = self.inner.shared.lock();
            while guard.state != State::Stopped {
                self.inner.drained.wait(&mut guard);
            }
        }
    }
}

impl Clone for Executor {
    /// Shares the same underlying pool, bumping the live-handle count so
    /// `Drop` can tell a handle going away from a worker thread's own
    /// `Arc<Inner>` clone going away.
    fn clone(&self) -> Self {
        self.inner.handles.fetch_add(1, Ordering::AcqRel);
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl core::fmt::Debug for Executor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let guard = self.inner.shared.lock();
        f.debug_struct("Executor")
            .field("name", &self.inner.config.name)
            .field("state", &guard.state)
            .field("workers_total", &guard.workers_total)
            .field("workers_busy", &guard.workers_busy)
            .field("queue_len", &guard.queue.len())
            .finish()
    }
}

impl Drop for Executor {
    /// Ensures no worker thread outlives the pool: if this is the last
    /// live `Executor` handle and the pool was never stopped, block until
    /// it drains. Checked against the dedicated `handles` counter, not
    /// `Arc::strong_count` — every worker thread also holds an
    /// `Arc<Inner>` clone (see `spawn_worker`), so the strong count is
    /// `handles + workers_total` and is never 1 while the pool is actually
    /// running.
    fn drop(&mut self) {
        if self.inner.handles.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.stop(true);
        }
    }
}

/// Spawns one worker thread, registering it in the roster and incrementing
/// `workers_total`. Must be called with `guard` already held.
fn spawn_worker(inner: &Arc<Inner>, guard: &mut Shared) -> Result<(), ExecutorError> {
    let name = format!("{}-worker", inner.config.name);
    let worker_inner = Arc::clone(inner);
    let handle = thread::Builder::new()
        .name(name)
        .spawn(move || worker_loop(worker_inner))
        .map_err(|err| ExecutorError::SpawnFailed(err.to_string()))?;
    guard.roster.insert(handle.thread().id());
    guard.workers_total += 1;
    Ok(())
}

/// Body run by every worker thread. See the module docs for the state
/// machine this implements.
fn worker_loop(inner: Arc<Inner>) {
    let id = thread::current().id();
    let mut guard = inner.shared.lock();
    loop {
        if let Some(task) = guard.queue.pop_front() {
            guard.workers_busy += 1;
            parking_lot::MutexGuard::unlocked(&mut guard, || {
                run_task(task, &inner.config.name);
            });
            guard.workers_busy -= 1;
            continue;
        }

        if guard.state != State::Run {
            // Stopping with an empty queue (or, defensively, Stopped):
            // nothing left to drain.
            break;
        }

        let timed_out = inner
            .not_empty
            .wait_for(&mut guard, inner.config.idle_timeout)
            .timed_out();
        if timed_out
            && guard.queue.is_empty()
            && guard.state == State::Run
            && guard.workers_total > inner.config.low_watermark
        {
            break;
        }
    }

    guard.workers_total -= 1;
    guard.roster.remove(&id);
    let last_worker = guard.roster.is_empty();
    if last_worker && guard.state != State::Run {
        guard.state = State::Stopped;
    }
    drop(guard);
    if last_worker {
        inner.drained.notify_all();
    }
}

/// Runs `task`, catching a panic so one failing task can never take down
/// its worker or corrupt the pool's counters (the counters are already
/// restored by the caller regardless of how `task` returns).
fn run_task(task: Task, executor_name: &str) {
    let result = panic::catch_unwind(AssertUnwindSafe(task));
    if let Err(payload) = result {
        let message = payload
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
            .unwrap_or("<non-string panic payload>");
        log::error!("executor '{executor_name}': task panicked: {message}");
    }
}
