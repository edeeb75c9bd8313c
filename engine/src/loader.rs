//! Exactly-once loading of the search index.
//!
//! [`IndexLoader`] owns the readiness state machine
//! `Uninitialized -> Loading -> Ready | Error`. Callers register a callback
//! with [`IndexLoader::ensure_ready`]; all callers that arrive before the
//! load settles are answered by that one load, and later callers get the
//! stored outcome straight away.

use crate::error::{LoadError, SearchError};
use crate::schedule::Scheduler;
use crate::types::{DocumentStore, Hit, ReadinessState, SearchOptions};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, info, warn};

/// The external full-text engine, already loaded
pub trait SearchIndex {
    fn search(&self, query: &str, options: SearchOptions) -> Result<Vec<Hit>, SearchError>;
}

/// Where the engine, index blob and document store come from
pub trait IndexSource {
    fn load(&self) -> Result<LoadedIndex, LoadError>;
}

/// A loaded index plus its document store. Immutable once built.
pub struct LoadedIndex {
    index: Box<dyn SearchIndex>,
    docs: DocumentStore,
}

impl LoadedIndex {
    pub fn new(index: Box<dyn SearchIndex>, docs: DocumentStore) -> Self {
        LoadedIndex { index, docs }
    }

    pub fn search(&self, query: &str, options: SearchOptions) -> Result<Vec<Hit>, SearchError> {
        self.index.search(query, options)
    }

    pub fn docs(&self) -> &DocumentStore {
        &self.docs
    }
}

pub type LoadOutcome = Result<Rc<LoadedIndex>, LoadError>;
pub type ReadyCallback = Box<dyn FnOnce(LoadOutcome)>;

enum Slot {
    Uninitialized,
    Loading(Vec<ReadyCallback>),
    Ready(Rc<LoadedIndex>),
    Error(LoadError),
}

pub struct IndexLoader {
    source: Box<dyn IndexSource>,
    scheduler: Rc<dyn Scheduler>,
    slot: RefCell<Slot>,
}

impl IndexLoader {
    pub fn new(source: Box<dyn IndexSource>, scheduler: Rc<dyn Scheduler>) -> Rc<Self> {
        Rc::new(IndexLoader {
            source,
            scheduler,
            slot: RefCell::new(Slot::Uninitialized),
        })
    }

    pub fn state(&self) -> ReadinessState {
        match &*self.slot.borrow() {
            Slot::Uninitialized => ReadinessState::Uninitialized,
            Slot::Loading(_) => ReadinessState::Loading,
            Slot::Ready(_) => ReadinessState::Ready,
            Slot::Error(_) => ReadinessState::Error,
        }
    }

    /// The loaded index, if the load has succeeded
    pub fn index(&self) -> Option<Rc<LoadedIndex>> {
        match &*self.slot.borrow() {
            Slot::Ready(index) => Some(Rc::clone(index)),
            _ => None,
        }
    }

    fn settled(&self) -> Option<LoadOutcome> {
        match &*self.slot.borrow() {
            Slot::Ready(index) => Some(Ok(Rc::clone(index))),
            Slot::Error(err) => Some(Err(err.clone())),
            _ => None,
        }
    }

    /// Run `callback` once the index has settled.
    ///
    /// Settled: the callback runs now. Loading: it is queued. Uninitialized:
    /// it is queued and the single load is scheduled for the next tick.
    /// Safe to call from inside another callback.
    pub fn ensure_ready(self: &Rc<Self>, callback: ReadyCallback) {
        if let Some(outcome) = self.settled() {
            callback(outcome);
            return;
        }

        let start = {
            let mut slot = self.slot.borrow_mut();
            let start = matches!(*slot, Slot::Uninitialized);
            if start {
                *slot = Slot::Loading(Vec::new());
            }
            if let Slot::Loading(waiters) = &mut *slot {
                waiters.push(callback);
            }
            start
        };

        if start {
            debug!("scheduling search index load");
            let this = Rc::clone(self);
            self.scheduler
                .schedule(0, Box::new(move || this.finish_load()));
        }
    }

    fn finish_load(&self) {
        if !matches!(*self.slot.borrow(), Slot::Loading(_)) {
            return;
        }

        let outcome = self.source.load().map(Rc::new);
        match &outcome {
            Ok(index) => info!(documents = index.docs().len(), "search index ready"),
            Err(err) => warn!(error = %err, "search index unavailable"),
        }

        let waiters = {
            let mut slot = self.slot.borrow_mut();
            let settled = match &outcome {
                Ok(index) => Slot::Ready(Rc::clone(index)),
                Err(err) => Slot::Error(err.clone()),
            };
            match std::mem::replace(&mut *slot, settled) {
                Slot::Loading(waiters) => waiters,
                _ => Vec::new(),
            }
        };

        for waiter in waiters {
            waiter(outcome.clone());
        }
    }
}
