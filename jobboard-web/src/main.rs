//! Job board page enhancements (browser)
//!
//! Compiles to WebAssembly and enhances the server-rendered job board pages
//! once the DOM is ready: theme toggle, nav highlighting, signup-form hints,
//! relative timestamps, stat counters, reveal-on-scroll and live category
//! job counts.
//!
//! # Architecture
//!
//! All behavior lives in the `jobboard` library. This crate only supplies the
//! browser adapters: the `web-sys` document, `gloo-timers` scheduling,
//! `localStorage` preferences and a `gloo-net` category source.

use std::cell::RefCell;
use std::rc::Rc;

use jobboard::{enhance_page, AppPreferences, CategorySource, Config, Enhancements};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::DocumentReadyState;

mod dom;
mod logging;
mod scheduler;
mod source;
mod storage;

use dom::WebDocument;
use scheduler::BrowserScheduler;
use source::FetchCategorySource;
use storage::LocalStorageStore;

#[cfg(test)]
wasm_bindgen_test::wasm_bindgen_test_configure!(run_in_browser);

thread_local! {
    // Timers stop when their handles drop, so the page keeps them here
    static PAGE: RefCell<Option<Enhancements>> = const { RefCell::new(None) };
}

fn ready(doc: WebDocument) {
    let config = Config::default();
    let prefs = AppPreferences::new(LocalStorageStore);
    let source: Rc<dyn CategorySource> =
        Rc::new(FetchCategorySource::new(config.api.categories_url()));

    let enhancements = enhance_page(&doc, &prefs, &BrowserScheduler, Some(source), &config);
    tracing::info!(
        "Page ready: {} counters, {} cards",
        enhancements.counters.len(),
        enhancements.revealed_cards
    );

    PAGE.with(|page| *page.borrow_mut() = Some(enhancements));
}

fn main() {
    // Set up panic hook for better error messages in WASM
    console_error_panic_hook::set_once();

    logging::init(&Config::default().logging.level);

    let Some(doc) = WebDocument::current() else {
        return;
    };

    if doc.raw().ready_state() != DocumentReadyState::Loading {
        ready(doc);
        return;
    }

    let target = doc.raw().clone();
    let on_ready = Closure::once(move || ready(doc));
    if let Err(e) = target
        .add_event_listener_with_callback("DOMContentLoaded", on_ready.as_ref().unchecked_ref())
    {
        tracing::error!("Cannot wait for DOMContentLoaded: {:?}", e);
        return;
    }
    on_ready.forget();
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobboard::document::{Document, Element, Selector};
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    fn test_theme_toggle_on_live_page() {
        let doc = WebDocument::current().unwrap();
        let host = doc.create_element("div").unwrap();
        host.raw().set_inner_html(
            r#"<button id="theme-toggle"><i class="fas fa-moon"></i></button>"#,
        );
        doc.body().unwrap().append_child(&host).unwrap();

        let prefs = AppPreferences::new(LocalStorageStore);
        prefs.set_theme(jobboard::Theme::Light);
        assert!(jobboard::binder::bind_theme_toggle(&doc, &prefs));

        let button = doc.by_id("theme-toggle").unwrap();
        button
            .raw()
            .dyn_ref::<web_sys::HtmlElement>()
            .unwrap()
            .click();

        let body = doc.body().unwrap();
        assert!(body.has_class("dark-theme"));
        assert!(doc
            .query(&Selector::id("theme-toggle").descendant(Selector::tag("i")))
            .unwrap()
            .has_class("fa-sun"));
        assert_eq!(prefs.theme(), jobboard::Theme::Dark);

        body.remove_class("dark-theme");
        prefs.set_theme(jobboard::Theme::Light);
    }
}
