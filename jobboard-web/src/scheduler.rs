//! Browser scheduler
//!
//! Intervals run on `gloo-timers`; detached futures on the page's microtask
//! queue through `wasm-bindgen-futures`.

use futures_util::future::LocalBoxFuture;
use gloo_timers::callback::{Interval, Timeout};
use jobboard::scheduler::{Scheduler, TaskHandle};
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserScheduler;

fn millis(period: Duration) -> u32 {
    u32::try_from(period.as_millis()).unwrap_or(u32::MAX).max(1)
}

impl Scheduler for BrowserScheduler {
    fn interval(&self, period: Duration, tick: Box<dyn FnMut()>) -> TaskHandle {
        let interval = Interval::new(millis(period), tick);
        TaskHandle::new(move || {
            let callback = interval.cancel();
            // Cancellation may come from inside the tick itself, so the
            // callback is released on the next turn of the event loop.
            Timeout::new(0, move || drop(callback)).forget();
        })
    }

    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(task);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gloo_timers::future::TimeoutFuture;
    use std::cell::Cell;
    use std::rc::Rc;
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    async fn test_interval_ticks_until_cancelled() {
        let ticks = Rc::new(Cell::new(0));
        let counter = Rc::clone(&ticks);
        let handle = BrowserScheduler.interval(
            Duration::from_millis(10),
            Box::new(move || counter.set(counter.get() + 1)),
        );

        TimeoutFuture::new(55).await;
        assert!(handle.cancel());
        let seen = ticks.get();
        assert!(seen >= 2, "only {} ticks", seen);

        TimeoutFuture::new(50).await;
        assert_eq!(ticks.get(), seen);
        assert!(!handle.cancel());
    }

    #[wasm_bindgen_test]
    async fn test_spawned_future_runs() {
        let done = Rc::new(Cell::new(false));
        let flag = Rc::clone(&done);
        BrowserScheduler.spawn(Box::pin(async move { flag.set(true) }));

        TimeoutFuture::new(0).await;
        assert!(done.get());
    }
}
