//! Counter Animator
//!
//! Counts stat figures up from zero. Each counter owns one interval handle
//! and cancels it itself on the tick that reaches the target.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::document::{Document, Element, Selector};
use crate::scheduler::{Scheduler, TaskHandle};

/// Default delay between frames
pub const DEFAULT_TICK: Duration = Duration::from_millis(20);

/// Default number of increments to reach the target
pub const DEFAULT_STEPS: u32 = 50;

/// One rendered frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    /// Still counting; shows the floored accumulator
    Progress(i64),
    /// Target reached
    Done(i64),
}

impl Frame {
    /// Display text, e.g. `"120+"`
    pub fn render(&self) -> String {
        match self {
            Frame::Progress(n) | Frame::Done(n) => format!("{}+", n),
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Frame::Done(_))
    }
}

/// Accumulator stepping from zero to a target in fixed increments
#[derive(Debug, Clone, PartialEq)]
pub struct CounterAnimation {
    target: i64,
    increment: f64,
    current: f64,
    finished: bool,
}

impl CounterAnimation {
    pub fn new(target: i64, steps: u32) -> Self {
        Self {
            target,
            increment: target as f64 / f64::from(steps.max(1)),
            current: 0.0,
            finished: false,
        }
    }

    pub fn target(&self) -> i64 {
        self.target
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Advance one step. Once done, keeps returning the final frame.
    pub fn tick(&mut self) -> Frame {
        if self.finished {
            return Frame::Done(self.target);
        }
        self.current += self.increment;
        if self.current >= self.target as f64 {
            self.finished = true;
            Frame::Done(self.target)
        } else {
            Frame::Progress(self.current.floor() as i64)
        }
    }
}

/// Leading integer of `text`, parsed leniently.
///
/// Leading whitespace and one sign are accepted and parsing stops at the
/// first non-digit, so `" 1200+ jobs"` yields `1200`. Returns `None` when no
/// digit follows.
pub fn parse_leading_int(text: &str) -> Option<i64> {
    let s = text.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let magnitude: i64 = digits[..end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Start one animation per `.stat-item h3` whose text holds an integer.
///
/// Returns the interval handles; each is cancelled by its own final tick.
pub fn start_counters<D, S>(doc: &D, scheduler: &S, tick: Duration, steps: u32) -> Vec<TaskHandle>
where
    D: Document,
    S: Scheduler,
{
    let mut handles = Vec::new();

    for stat in doc.query_all(&Selector::class("stat-item").descendant(Selector::tag("h3"))) {
        let Some(target) = parse_leading_int(&stat.text()) else {
            tracing::debug!("Skipping stat without a numeric value: {:?}", stat.text());
            continue;
        };
        handles.push(animate(stat, target, scheduler, tick, steps));
    }

    handles
}

/// Animate a single element towards `target`
pub fn animate<E, S>(element: E, target: i64, scheduler: &S, tick: Duration, steps: u32) -> TaskHandle
where
    E: Element,
    S: Scheduler,
{
    let mut animation = CounterAnimation::new(target, steps);
    let slot: Rc<RefCell<Option<TaskHandle>>> = Rc::new(RefCell::new(None));
    let own = Rc::clone(&slot);

    let handle = scheduler.interval(
        tick,
        Box::new(move || {
            if animation.is_finished() {
                return;
            }
            let frame = animation.tick();
            element.set_text(&frame.render());
            if frame.is_done() {
                let handle = own.borrow_mut().take();
                if let Some(handle) = handle {
                    handle.cancel();
                }
            }
        }),
    );

    *slot.borrow_mut() = Some(handle.clone());
    handle
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MemoryDocument;
    use crate::scheduler::TokioScheduler;
    use tokio::task::LocalSet;

    fn run_to_end(target: i64) -> Vec<Frame> {
        let mut animation = CounterAnimation::new(target, DEFAULT_STEPS);
        let mut frames = Vec::new();
        loop {
            let frame = animation.tick();
            frames.push(frame);
            if frame.is_done() || frames.len() > 1000 {
                return frames;
            }
        }
    }

    #[test]
    fn test_counts_to_exact_target() {
        let frames = run_to_end(100);
        assert_eq!(frames.last().unwrap().render(), "100+");
        assert!(frames.len() <= 51);
        assert_eq!(frames.iter().filter(|f| f.is_done()).count(), 1);
    }

    #[test]
    fn test_frames_never_decrease() {
        for target in [1, 7, 99, 100, 1234, 98765] {
            let frames = run_to_end(target);
            let values: Vec<i64> = frames
                .iter()
                .map(|f| match f {
                    Frame::Progress(n) | Frame::Done(n) => *n,
                })
                .collect();
            assert!(values.windows(2).all(|w| w[0] <= w[1]), "target {}", target);
            assert_eq!(*values.last().unwrap(), target);
            assert!(frames.len() <= 51, "target {} took {}", target, frames.len());
        }
    }

    #[test]
    fn test_zero_target_finishes_on_first_tick() {
        assert_eq!(run_to_end(0), vec![Frame::Done(0)]);
    }

    #[test]
    fn test_finished_animation_stays_done() {
        let mut animation = CounterAnimation::new(2, DEFAULT_STEPS);
        while !animation.tick().is_done() {}
        assert_eq!(animation.tick(), Frame::Done(2));
    }

    #[test]
    fn test_parse_leading_int() {
        assert_eq!(parse_leading_int("1200"), Some(1200));
        assert_eq!(parse_leading_int("  350+ companies"), Some(350));
        assert_eq!(parse_leading_int("-5"), Some(-5));
        assert_eq!(parse_leading_int("+8"), Some(8));
        assert_eq!(parse_leading_int("1,500"), Some(1));
        assert_eq!(parse_leading_int("jobs"), None);
        assert_eq!(parse_leading_int(""), None);
        assert_eq!(parse_leading_int("-"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_counters_animate_and_cancel_themselves() {
        LocalSet::new()
            .run_until(async {
                let doc = MemoryDocument::new();
                let body = doc.root();
                let stats = doc.element("div").class("stats").append_to(&body);
                let item = doc.element("div").class("stat-item").append_to(&stats);
                let jobs = doc.element("h3").text_content("100").append_to(&item);
                let item = doc.element("div").class("stat-item").append_to(&stats);
                let label = doc.element("h3").text_content("Trusted").append_to(&item);

                let handles = start_counters(&doc, &TokioScheduler, DEFAULT_TICK, DEFAULT_STEPS);
                assert_eq!(handles.len(), 1);

                tokio::time::sleep(Duration::from_millis(30)).await;
                assert_eq!(jobs.text(), "2+");

                tokio::time::sleep(Duration::from_millis(500)).await;
                let midway = parse_leading_int(&jobs.text()).unwrap();
                assert!(midway > 2 && midway < 100);

                tokio::time::sleep(Duration::from_millis(2000)).await;
                assert_eq!(jobs.text(), "100+");
                assert_eq!(label.text(), "Trusted");
                assert!(handles[0].is_cancelled());
                assert!(!handles[0].cancel());
            })
            .await;
    }
}
