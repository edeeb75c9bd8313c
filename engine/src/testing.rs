//! Test doubles shared by unit and integration tests.
//!
//! Always compiled but hidden from documentation. Nothing here touches the
//! DOM, so the full modal flow runs natively.

#![doc(hidden)]

use crate::error::{LoadError, SearchError};
use crate::loader::{IndexSource, LoadedIndex, SearchIndex};
use crate::modal::ModalView;
use crate::schedule::{Scheduler, Task, TaskHandle};
use crate::types::{DocumentStore, Hit, ResultItem, SearchOptions};
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

/// Virtual-clock scheduler. Tasks run only when the test advances time.
#[derive(Default)]
pub struct ManualScheduler {
    now: Cell<u64>,
    next_id: Cell<i32>,
    tasks: RefCell<Vec<(TaskHandle, u64, Task)>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> u64 {
        self.now.get()
    }

    pub fn pending_count(&self) -> usize {
        self.tasks.borrow().len()
    }

    /// Run every task due within `ms`, in due-time order, including tasks
    /// scheduled by the tasks themselves
    pub fn advance(&self, ms: u64) {
        let target = self.now.get() + ms;
        while let Some(task) = self.pop_due(target) {
            task();
        }
        self.now.set(target);
    }

    /// Run everything due right now (zero-delay ticks)
    pub fn run_pending(&self) {
        self.advance(0);
    }

    fn pop_due(&self, target: u64) -> Option<Task> {
        let mut tasks = self.tasks.borrow_mut();
        let next = tasks
            .iter()
            .enumerate()
            .filter(|(_, (_, due, _))| *due <= target)
            .min_by_key(|(_, (handle, due, _))| (*due, handle.0))
            .map(|(i, _)| i)?;
        let (_, due, task) = tasks.remove(next);
        self.now.set(due);
        Some(task)
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay_ms: u32, task: Task) -> TaskHandle {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        let handle = TaskHandle(id);
        let due = self.now.get() + u64::from(delay_ms);
        self.tasks.borrow_mut().push((handle, due, task));
        handle
    }

    fn cancel(&self, handle: TaskHandle) {
        self.tasks.borrow_mut().retain(|(h, _, _)| *h != handle);
    }
}

/// Engine double: returns fixed hits and records every query it sees
pub struct StaticIndex {
    hits: Vec<Hit>,
    fail: bool,
    queries: Rc<RefCell<Vec<String>>>,
}

impl StaticIndex {
    pub fn new(hits: Vec<Hit>) -> Self {
        StaticIndex {
            hits,
            fail: false,
            queries: Rc::default(),
        }
    }

    pub fn failing() -> Self {
        StaticIndex {
            fail: true,
            ..StaticIndex::new(Vec::new())
        }
    }

    pub fn queries(&self) -> Rc<RefCell<Vec<String>>> {
        Rc::clone(&self.queries)
    }
}

impl SearchIndex for StaticIndex {
    fn search(&self, query: &str, _options: SearchOptions) -> Result<Vec<Hit>, SearchError> {
        self.queries.borrow_mut().push(query.to_string());
        if self.fail {
            return Err(SearchError::Engine("index exploded".to_string()));
        }
        Ok(self.hits.clone())
    }
}

/// Index source that hands out one prepared outcome and counts loads
pub struct StaticIndexSource {
    outcome: RefCell<Option<Result<LoadedIndex, LoadError>>>,
    loads: Rc<Cell<usize>>,
}

impl StaticIndexSource {
    pub fn ready(index: StaticIndex, docs: DocumentStore) -> Self {
        StaticIndexSource {
            outcome: RefCell::new(Some(Ok(LoadedIndex::new(Box::new(index), docs)))),
            loads: Rc::default(),
        }
    }

    pub fn failing(err: LoadError) -> Self {
        StaticIndexSource {
            outcome: RefCell::new(Some(Err(err))),
            loads: Rc::default(),
        }
    }

    pub fn loads(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.loads)
    }
}

impl IndexSource for StaticIndexSource {
    fn load(&self) -> Result<LoadedIndex, LoadError> {
        self.loads.set(self.loads.get() + 1);
        self.outcome
            .borrow_mut()
            .take()
            .unwrap_or_else(|| Err(LoadError::EngineFailed("loaded twice".to_string())))
    }
}

pub const OPEN_BUTTON: &str = "open-button";
pub const INPUT: &str = "input";

/// In-memory view: records what the modal asked the page to do.
/// Focus targets are element ids.
#[derive(Default)]
pub struct RecordingView {
    pub hidden: Cell<bool>,
    pub status: RefCell<String>,
    pub input_cleared: Cell<usize>,
    pub input_disabled: Cell<bool>,
    pub results: RefCell<Vec<ResultItem>>,
    pub active: Cell<Option<usize>>,
    pub focused: RefCell<Option<String>>,
    /// Ids that silently refuse focus (removed, disabled or hidden elements)
    pub unfocusable: RefCell<HashSet<String>>,
    pub navigations: RefCell<Vec<String>>,
    /// Whether the modal was closed when each navigation was issued
    pub hidden_at_navigation: RefCell<Vec<bool>>,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focus(&self, id: &str) {
        *self.focused.borrow_mut() = Some(id.to_string());
    }

    pub fn focused_id(&self) -> Option<String> {
        self.focused.borrow().clone()
    }

    pub fn status_text(&self) -> String {
        self.status.borrow().clone()
    }

    pub fn result_titles(&self) -> Vec<String> {
        self.results.borrow().iter().map(|r| r.title.clone()).collect()
    }
}

impl ModalView for RecordingView {
    type Focus = String;

    fn set_hidden(&self, hidden: bool) {
        self.hidden.set(hidden);
    }

    fn set_status(&self, text: &str) {
        *self.status.borrow_mut() = text.to_string();
    }

    fn clear_input(&self) {
        self.input_cleared.set(self.input_cleared.get() + 1);
    }

    fn disable_input(&self) {
        self.input_disabled.set(true);
    }

    fn focus_input(&self) {
        self.focus(INPUT);
    }

    fn show_results(&self, items: &[ResultItem]) {
        *self.results.borrow_mut() = items.to_vec();
        self.active.set(None);
    }

    fn clear_results(&self) {
        self.results.borrow_mut().clear();
        self.active.set(None);
    }

    fn mark_active(&self, index: usize) {
        self.active.set(Some(index));
    }

    fn focused(&self) -> Option<String> {
        self.focused_id()
    }

    fn focus_element(&self, target: &String) {
        if !self.unfocusable.borrow().contains(target) {
            self.focus(target);
        }
    }

    fn focus_open_button(&self) {
        self.focus(OPEN_BUTTON);
    }

    fn navigate(&self, href: &str) {
        self.navigations.borrow_mut().push(href.to_string());
        self.hidden_at_navigation.borrow_mut().push(self.hidden.get());
    }
}
