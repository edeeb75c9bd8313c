//! Search modal for static documentation sites, compiled to WebAssembly.
//!
//! The page ships a pre-built elasticlunr index. This crate owns everything
//! between a keystroke and a rendered result list:
//!
//! ```text
//! input ──▶ controller ──▶ loader ──▶ engine search ──▶ results
//! (debounce)  (readiness)            (snippet + highlight)
//!                                          │
//!          modal ◀── navigator ◀───────────┘
//!   (open/close, focus)  (arrows, enter)
//! ```
//!
//! All state logic is plain Rust behind [`ModalView`], [`Scheduler`] and
//! [`IndexSource`]; the `wasm` module binds those to the DOM.

use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

pub mod config;
pub mod controller;
pub mod error;
pub mod highlight;
pub mod loader;
pub mod logging;
pub mod modal;
pub mod navigator;
pub mod parse;
pub mod results;
pub mod schedule;
pub mod snippet;
pub mod testing;
pub mod types;
mod wasm;

pub use config::{ModalConfig, ModalSettings};
pub use controller::{QueryController, QueryOutcome};
pub use error::{ConfigError, LoadError, SearchError};
pub use highlight::{highlight, highlight_spans, render_marked};
pub use loader::{IndexLoader, IndexSource, LoadedIndex, SearchIndex};
pub use modal::{KeyDisposition, KeyPress, ModalView, SearchModal};
pub use navigator::KeyboardNavigator;
pub use results::render_results;
pub use schedule::{Debouncer, Scheduler, TaskHandle};
pub use snippet::build_snippet;
pub use types::{DocumentMeta, DocumentStore, Hit, ModalState, ReadinessState, ResultItem};

// Use thread_local with RefCell so JS can install once and query later
thread_local! {
    static MODAL: RefCell<Option<wasm::Installed>> = const { RefCell::new(None) };
}

/// Wire the search modal into the page
/// config_json: JSON string of ModalConfig ("" for the defaults)
/// Calling again after a successful install does nothing.
#[wasm_bindgen]
pub fn init_search_modal(config_json: &str) -> Result<(), JsError> {
    let config = ModalConfig::from_json(config_json)
        .map_err(|e| JsError::new(&format!("Failed to parse config: {}", e)))?;
    logging::init(&config.log_level);

    MODAL.with(|slot| {
        if slot.borrow().is_some() {
            return Ok(());
        }
        let installed = wasm::install(&config)
            .map_err(|e| JsError::new(&format!("Failed to install search modal: {}", e)))?;
        *slot.borrow_mut() = Some(installed);
        tracing::debug!("search modal installed");
        Ok(())
    })
}

/// Check if the search index has finished loading
#[wasm_bindgen]
pub fn is_index_ready() -> bool {
    MODAL.with(|slot| {
        slot.borrow()
            .as_ref()
            .is_some_and(|installed| installed.modal.loader().state() == ReadinessState::Ready)
    })
}

fn installed_modal() -> Option<Rc<SearchModal<wasm::DomView>>> {
    MODAL.with(|slot| {
        slot.borrow()
            .as_ref()
            .map(|installed| Rc::clone(&installed.modal))
    })
}

/// Open the modal from script (e.g., a custom trigger)
#[wasm_bindgen]
pub fn open_search_modal() {
    if let Some(modal) = installed_modal() {
        modal.open();
    }
}

#[wasm_bindgen]
pub fn close_search_modal() {
    if let Some(modal) = installed_modal() {
        modal.close();
    }
}
