//! Page initializer
//!
//! The "ready" routine: every enhancement is set up independently against one
//! document, so a page that lacks one feature's elements still gets the rest.

use chrono::{DateTime, Utc};
use std::rc::Rc;

use crate::binder;
use crate::categories::{CategoryRefresher, CategorySource};
use crate::config::Config;
use crate::counter;
use crate::document::Document;
use crate::preferences::AppPreferences;
use crate::reveal;
use crate::scheduler::{Scheduler, TaskHandle};
use crate::timefmt;

/// What got attached to the page
#[derive(Debug, Default)]
pub struct Enhancements {
    pub theme_toggle: bool,
    pub signup_form: bool,
    pub active_links: usize,
    pub relative_times: usize,
    pub revealed_cards: usize,
    /// One handle per running stat counter
    pub counters: Vec<TaskHandle>,
    pub refresher: Option<TaskHandle>,
}

impl Enhancements {
    /// Stop every timer still running
    pub fn cancel_all(&self) {
        for handle in self.counters.iter().chain(self.refresher.iter()) {
            handle.cancel();
        }
    }
}

/// Enhance `doc` using the current time for relative labels
pub fn enhance_page<D, S>(
    doc: &D,
    prefs: &AppPreferences,
    scheduler: &S,
    source: Option<Rc<dyn CategorySource>>,
    config: &Config,
) -> Enhancements
where
    D: Document,
    S: Scheduler + Clone + 'static,
{
    enhance_page_at(doc, prefs, scheduler, source, config, Utc::now())
}

/// Enhance `doc` with relative labels computed against `now`.
///
/// The refresher only starts when a category source is given and refreshing
/// is enabled.
pub fn enhance_page_at<D, S>(
    doc: &D,
    prefs: &AppPreferences,
    scheduler: &S,
    source: Option<Rc<dyn CategorySource>>,
    config: &Config,
    now: DateTime<Utc>,
) -> Enhancements
where
    D: Document,
    S: Scheduler + Clone + 'static,
{
    let theme_toggle = binder::bind_theme_toggle(doc, prefs);
    let active_links = binder::highlight_active_links(doc);
    let signup_form = binder::bind_signup_form(doc);
    let relative_times = timefmt::apply_relative_times(doc, now);

    let counters = counter::start_counters(
        doc,
        scheduler,
        config.counter.tick(),
        config.counter.steps,
    );

    let revealed_cards = match reveal::install(doc, &config.reveal.options()) {
        Ok(count) => count,
        Err(e) => {
            tracing::warn!("Reveal-on-scroll unavailable: {}", e);
            0
        }
    };

    let refresher = match source {
        Some(source) if config.refresh.enabled => {
            CategoryRefresher::new(doc.clone(), source, config.refresh.interval()).start(scheduler)
        }
        _ => None,
    };

    let enhancements = Enhancements {
        theme_toggle,
        signup_form,
        active_links,
        relative_times,
        revealed_cards,
        counters,
        refresher,
    };

    tracing::debug!(
        "Page enhanced: theme_toggle={} signup_form={} links={} times={} counters={} cards={} refresher={}",
        enhancements.theme_toggle,
        enhancements.signup_form,
        enhancements.active_links,
        enhancements.relative_times,
        enhancements.counters.len(),
        enhancements.revealed_cards,
        enhancements.refresher.is_some()
    );

    enhancements
}
