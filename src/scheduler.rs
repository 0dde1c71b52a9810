//! Task Scheduler
//!
//! Repeating timers and detached futures on a single-threaded event loop.
//! Every interval is represented by a [`TaskHandle`]; cancelling it stops
//! further ticks. Native code runs on a tokio `LocalSet`; the browser crate
//! supplies its own implementation over `gloo-timers`.

use futures_util::future::LocalBoxFuture;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

/// Executes interval callbacks and detached futures
pub trait Scheduler {
    /// Run `tick` every `period`, first after one full period
    fn interval(&self, period: Duration, tick: Box<dyn FnMut()>) -> TaskHandle;

    /// Run a future to completion without waiting on it
    fn spawn(&self, task: LocalBoxFuture<'static, ()>);
}

struct HandleInner {
    cancelled: Cell<bool>,
    on_cancel: RefCell<Option<Box<dyn FnOnce()>>>,
}

/// Handle to a scheduled repeating task
///
/// Clones share the same task. Cancellation is idempotent: only the first
/// call to [`TaskHandle::cancel`] stops the task and returns `true`.
#[derive(Clone)]
pub struct TaskHandle {
    inner: Rc<HandleInner>,
}

impl TaskHandle {
    /// Handle whose cancellation runs `on_cancel` once
    pub fn new(on_cancel: impl FnOnce() + 'static) -> Self {
        Self {
            inner: Rc::new(HandleInner {
                cancelled: Cell::new(false),
                on_cancel: RefCell::new(Some(Box::new(on_cancel))),
            }),
        }
    }

    /// Handle with no platform resource attached
    pub fn detached() -> Self {
        Self::new(|| {})
    }

    /// Stop the task. Returns `true` if this call performed the cancellation.
    pub fn cancel(&self) -> bool {
        if self.inner.cancelled.replace(true) {
            return false;
        }
        let on_cancel = self.inner.on_cancel.borrow_mut().take();
        if let Some(on_cancel) = on_cancel {
            on_cancel();
        }
        true
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.get()
    }

    /// Attach the platform cancellation after construction
    ///
    /// Used when the task has to be created before its handle exists. If the
    /// handle was already cancelled the hook runs immediately.
    pub fn set_on_cancel(&self, on_cancel: impl FnOnce() + 'static) {
        if self.is_cancelled() {
            on_cancel();
        } else {
            *self.inner.on_cancel.borrow_mut() = Some(Box::new(on_cancel));
        }
    }
}

impl fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Scheduler on the current tokio `LocalSet`
///
/// Must be used from inside `LocalSet::run_until` (or a task spawned on a
/// `LocalSet`), since callbacks and futures are not `Send`.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

#[cfg(not(target_arch = "wasm32"))]
impl Scheduler for TokioScheduler {
    fn interval(&self, period: Duration, mut tick: Box<dyn FnMut()>) -> TaskHandle {
        // tokio rejects a zero period
        let period = period.max(Duration::from_millis(1));
        let handle = TaskHandle::detached();
        let watch = handle.clone();

        let task = tokio::task::spawn_local(async move {
            let start = tokio::time::Instant::now() + period;
            let mut interval = tokio::time::interval_at(start, period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if watch.is_cancelled() {
                    break;
                }
                tick();
            }
        });

        handle.set_on_cancel(move || task.abort());
        handle
    }

    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        tokio::task::spawn_local(task);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::task::LocalSet;

    #[test]
    fn test_cancel_is_idempotent() {
        let runs = Rc::new(Cell::new(0));
        let counter = Rc::clone(&runs);
        let handle = TaskHandle::new(move || counter.set(counter.get() + 1));
        let clone = handle.clone();

        assert!(handle.cancel());
        assert!(!clone.cancel());
        assert!(clone.is_cancelled());
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn test_late_cancel_hook_runs_immediately() {
        let handle = TaskHandle::detached();
        handle.cancel();

        let ran = Rc::new(Cell::new(false));
        let flag = Rc::clone(&ran);
        handle.set_on_cancel(move || flag.set(true));
        assert!(ran.get());
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_waits_one_period_then_repeats() {
        LocalSet::new()
            .run_until(async {
                let ticks = Rc::new(Cell::new(0));
                let counter = Rc::clone(&ticks);
                let handle = TokioScheduler.interval(
                    Duration::from_millis(100),
                    Box::new(move || counter.set(counter.get() + 1)),
                );

                tokio::time::sleep(Duration::from_millis(50)).await;
                assert_eq!(ticks.get(), 0);

                tokio::time::sleep(Duration::from_millis(260)).await;
                assert_eq!(ticks.get(), 3);

                handle.cancel();
                tokio::time::sleep(Duration::from_millis(500)).await;
                assert_eq!(ticks.get(), 3);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_period_ticks_instead_of_panicking() {
        LocalSet::new()
            .run_until(async {
                let ticks = Rc::new(Cell::new(0));
                let counter = Rc::clone(&ticks);
                let handle = TokioScheduler.interval(
                    Duration::ZERO,
                    Box::new(move || counter.set(counter.get() + 1)),
                );

                tokio::time::sleep(Duration::from_millis(5)).await;
                assert!(ticks.get() >= 1);
                assert!(handle.cancel());
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawn_runs_detached_future() {
        LocalSet::new()
            .run_until(async {
                let done = Rc::new(Cell::new(false));
                let flag = Rc::clone(&done);
                TokioScheduler.spawn(Box::pin(async move {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    flag.set(true);
                }));

                tokio::time::sleep(Duration::from_millis(20)).await;
                assert!(done.get());
            })
            .await;
    }
}
