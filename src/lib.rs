//! # jobboard
//!
//! Page enhancements for the job board: theme toggling with a persisted
//! preference, nav highlighting, signup-form hints, relative timestamps,
//! animated stat counters, reveal-on-scroll cards and live category job
//! counts.
//!
//! All behavior runs against injected adapters so the same code drives the
//! browser (see the `jobboard-web` crate) and the headless [`MemoryDocument`]
//! used by tests and the CLI.
//!
//! ## Modules
//!
//! - [`document`]: document adapter traits, typed selectors, in-memory DOM
//! - [`scheduler`]: repeating timers with cancellable handles
//! - [`preferences`]: theme preference storage
//! - [`binder`]: theme toggle, nav links and signup form listeners
//! - [`timefmt`]: "time since" labels
//! - [`counter`]: stat counter animation
//! - [`reveal`]: reveal-on-scroll controller
//! - [`categories`]: category job count refresher
//! - [`app`]: the page initializer tying everything together
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use jobboard::{enhance_page, AppPreferences, Config, MemoryDocument, TokioScheduler};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let local = tokio::task::LocalSet::new();
//!     local
//!         .run_until(async {
//!             let doc = MemoryDocument::new();
//!             let prefs = AppPreferences::in_memory();
//!             let enhancements =
//!                 enhance_page(&doc, &prefs, &TokioScheduler, None, &Config::default());
//!             println!("{} counters running", enhancements.counters.len());
//!         })
//!         .await;
//! }
//! ```

pub mod app;
pub mod binder;
pub mod categories;
pub mod config;
pub mod counter;
pub mod document;
pub mod forms;
pub mod preferences;
pub mod reveal;
pub mod scheduler;
pub mod timefmt;

pub use app::{enhance_page, enhance_page_at, Enhancements};
pub use categories::{CategoryRecord, CategoryRefresher, CategorySource, RefreshError};
pub use config::{Config, ConfigError};
pub use document::{Document, Element, MemoryDocument, Selector};
pub use preferences::{AppPreferences, PreferenceError, PreferenceStore, Theme};
pub use scheduler::{Scheduler, TaskHandle};

#[cfg(not(target_arch = "wasm32"))]
pub use scheduler::TokioScheduler;
