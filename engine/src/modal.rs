//! Open/close lifecycle of the search modal and its keyboard handling.
//!
//! [`SearchModal`] holds all UI state and talks to the page only through
//! [`ModalView`], so the whole flow runs without a DOM in tests.

use crate::config::ModalSettings;
use crate::controller::{QueryController, QueryOutcome, STATUS_LOADING, STATUS_UNAVAILABLE};
use crate::loader::{IndexLoader, LoadOutcome};
use crate::navigator::KeyboardNavigator;
use crate::schedule::Scheduler;
use crate::types::{ModalState, ReadinessState, ResultItem};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::debug;

/// The concrete UI the modal drives: a dialog with a text input, a status
/// line and a listbox of results.
pub trait ModalView {
    /// A focusable element captured before opening
    type Focus: PartialEq;

    /// Toggle the hidden class and `aria-hidden` on the modal container
    fn set_hidden(&self, hidden: bool);
    fn set_status(&self, text: &str);
    fn clear_input(&self);
    /// Permanent; there is no way back
    fn disable_input(&self);
    fn focus_input(&self);
    /// Replace the listbox content with `items`
    fn show_results(&self, items: &[ResultItem]);
    fn clear_results(&self);
    /// Move the active marker (`aria-selected`) to row `index`, scrolling it into view
    fn mark_active(&self, index: usize);
    fn focused(&self) -> Option<Self::Focus>;
    /// Ask `target` to take focus. Elements that no longer accept it
    /// (disabled, hidden, detached) ignore the request.
    fn focus_element(&self, target: &Self::Focus);
    fn focus_open_button(&self);
    fn navigate(&self, href: &str);
}

/// A keydown as the global handler sees it
#[derive(Debug, Clone, Copy)]
pub struct KeyPress<'a> {
    pub key: &'a str,
    /// The event target is a text field, textarea or content-editable element
    pub in_editable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDisposition {
    Ignored,
    /// Handled; the browser default (scrolling, typing) must be suppressed
    PreventDefault,
}

/// Whether an element with this tag takes typed text
pub fn is_editable_target(tag_name: &str, content_editable: bool) -> bool {
    content_editable
        || tag_name.eq_ignore_ascii_case("input")
        || tag_name.eq_ignore_ascii_case("textarea")
}

pub struct SearchModal<V: ModalView> {
    view: V,
    loader: Rc<IndexLoader>,
    controller: QueryController,
    scheduler: Rc<dyn Scheduler>,
    navigator: RefCell<KeyboardNavigator>,
    state: Cell<ModalState>,
    status: Cell<&'static str>,
    previous_focus: RefCell<Option<V::Focus>>,
    open_shortcut: String,
}

impl<V: ModalView + 'static> SearchModal<V> {
    /// Build the modal in its initial closed state and hide the container
    pub fn new(
        view: V,
        loader: Rc<IndexLoader>,
        scheduler: Rc<dyn Scheduler>,
        settings: &ModalSettings,
    ) -> Rc<Self> {
        let controller = QueryController::new(
            Rc::clone(&loader),
            Rc::clone(&scheduler),
            settings.debounce_ms,
            settings.result_cap,
        );
        let modal = Rc::new(SearchModal {
            view,
            loader,
            controller,
            scheduler,
            navigator: RefCell::new(KeyboardNavigator::new()),
            state: Cell::new(ModalState::Closed),
            status: Cell::new(""),
            previous_focus: RefCell::new(None),
            open_shortcut: settings.open_shortcut.clone(),
        });
        modal.view.set_hidden(true);
        modal
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn loader(&self) -> &Rc<IndexLoader> {
        &self.loader
    }

    pub fn state(&self) -> ModalState {
        self.state.get()
    }

    pub fn is_open(&self) -> bool {
        self.state.get() == ModalState::Open
    }

    pub fn active_index(&self) -> Option<usize> {
        self.navigator.borrow().active()
    }

    pub fn items(&self) -> Vec<ResultItem> {
        self.navigator.borrow().items().to_vec()
    }

    pub fn status(&self) -> &'static str {
        self.status.get()
    }

    pub fn open(self: &Rc<Self>) {
        if self.is_open() {
            return;
        }
        *self.previous_focus.borrow_mut() = self.view.focused();
        self.state.set(ModalState::Open);
        self.view.set_hidden(false);

        self.view.clear_input();
        self.controller.cancel_pending();
        self.clear_results();
        self.set_status("");

        if matches!(
            self.loader.state(),
            ReadinessState::Uninitialized | ReadinessState::Loading
        ) {
            self.set_status(STATUS_LOADING);
        }
        let weak = Rc::downgrade(self);
        self.loader.ensure_ready(Box::new(move |outcome| {
            if let Some(modal) = weak.upgrade() {
                modal.index_settled(outcome);
            }
        }));

        // The container was hidden until now; focus once layout has caught up
        let weak = Rc::downgrade(self);
        self.scheduler.schedule(
            0,
            Box::new(move || {
                if let Some(modal) = weak.upgrade() {
                    if modal.is_open() {
                        modal.view.focus_input();
                    }
                }
            }),
        );
        debug!("search modal opened");
    }

    pub fn close(&self) {
        if !self.is_open() {
            return;
        }
        self.state.set(ModalState::Closed);
        self.view.set_hidden(true);
        self.controller.cancel_pending();
        self.clear_results();
        self.set_status("");

        let previous = self.previous_focus.borrow_mut().take();
        let restored = previous.is_some_and(|target| {
            self.view.focus_element(&target);
            self.view.focused().as_ref() == Some(&target)
        });
        if !restored {
            self.view.focus_open_button();
        }
        debug!("search modal closed");
    }

    /// Text in the query input changed
    pub fn on_input(self: &Rc<Self>, raw: &str) {
        let weak = Rc::downgrade(self);
        self.controller.on_input(raw, move |outcome| {
            if let Some(modal) = weak.upgrade() {
                if modal.is_open() {
                    modal.apply(outcome);
                }
            }
        });
    }

    /// Pointer moved over result row `index`
    pub fn on_hover(&self, index: usize) {
        let marked = self.navigator.borrow_mut().hover(index);
        if let Some(index) = marked {
            self.view.mark_active(index);
        }
    }

    /// A result row was clicked: select it and follow its link
    pub fn choose(&self, index: usize) -> bool {
        self.on_hover(index);
        self.activate()
    }

    /// Global keydown handler
    pub fn handle_key(self: &Rc<Self>, key: KeyPress<'_>) -> KeyDisposition {
        if !self.is_open() {
            if key.key != self.open_shortcut || key.in_editable {
                return KeyDisposition::Ignored;
            }
            self.open();
            return KeyDisposition::PreventDefault;
        }

        match key.key {
            "Escape" => {
                self.close();
                KeyDisposition::PreventDefault
            }
            "ArrowDown" => self.step(KeyboardNavigator::move_down),
            "ArrowUp" => self.step(KeyboardNavigator::move_up),
            "Enter" if self.activate() => KeyDisposition::PreventDefault,
            _ => KeyDisposition::Ignored,
        }
    }

    fn step(&self, movement: fn(&mut KeyboardNavigator) -> Option<usize>) -> KeyDisposition {
        let marked = movement(&mut self.navigator.borrow_mut());
        match marked {
            Some(index) => {
                self.view.mark_active(index);
                KeyDisposition::PreventDefault
            }
            None => KeyDisposition::Ignored,
        }
    }

    /// Close, then navigate to the active row. Returns false with no active row.
    fn activate(&self) -> bool {
        let target = self.navigator.borrow().active_target().map(str::to_string);
        let Some(href) = target else {
            return false;
        };
        self.close();
        self.view.navigate(&href);
        true
    }

    fn apply(&self, outcome: QueryOutcome) {
        self.set_status(outcome.status());
        match outcome {
            QueryOutcome::Results(items) => {
                self.view.show_results(&items);
                let active = self.navigator.borrow_mut().replace(items);
                if let Some(index) = active {
                    self.view.mark_active(index);
                }
            }
            // Results stay; a later input will search again
            QueryOutcome::Loading => {}
            QueryOutcome::Cleared
            | QueryOutcome::NoResults
            | QueryOutcome::Failed
            | QueryOutcome::Unavailable => {
                self.clear_results();
            }
        }
    }

    fn index_settled(&self, outcome: LoadOutcome) {
        match outcome {
            Ok(_) => {
                if self.status.get() == STATUS_LOADING {
                    self.set_status("");
                }
            }
            Err(_) => {
                self.view.disable_input();
                self.set_status(STATUS_UNAVAILABLE);
            }
        }
    }

    fn clear_results(&self) {
        self.navigator.borrow_mut().clear();
        self.view.clear_results();
    }

    fn set_status(&self, text: &'static str) {
        self.status.set(text);
        self.view.set_status(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editable_targets() {
        assert!(is_editable_target("INPUT", false));
        assert!(is_editable_target("textarea", false));
        assert!(is_editable_target("div", true));
        assert!(!is_editable_target("BUTTON", false));
        assert!(!is_editable_target("a", false));
    }
}
