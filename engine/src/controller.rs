use crate::loader::IndexLoader;
use crate::parse::tokenize_query;
use crate::results::render_results;
use crate::schedule::{Debouncer, Scheduler};
use crate::types::{ReadinessState, ResultItem, SearchOptions};
use std::rc::Rc;
use tracing::{debug, error};

pub const STATUS_LOADING: &str = "Loading search index…";
pub const STATUS_NO_RESULTS: &str = "No results.";
pub const STATUS_FAILED: &str = "Search failed.";
pub const STATUS_UNAVAILABLE: &str = "Search is unavailable (index missing).";

/// What one query did; the modal turns it into list + status updates
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Cleared,
    Loading,
    Results(Vec<ResultItem>),
    NoResults,
    Failed,
    /// The index failed to load; no query will ever run
    Unavailable,
}

impl QueryOutcome {
    pub fn status(&self) -> &'static str {
        match self {
            QueryOutcome::Cleared | QueryOutcome::Results(_) => "",
            QueryOutcome::Loading => STATUS_LOADING,
            QueryOutcome::NoResults => STATUS_NO_RESULTS,
            QueryOutcome::Failed => STATUS_FAILED,
            QueryOutcome::Unavailable => STATUS_UNAVAILABLE,
        }
    }
}

/// Input-to-search pipeline: debounce, empty-query short circuit,
/// readiness gate and per-query failure containment
pub struct QueryController {
    loader: Rc<IndexLoader>,
    debouncer: Debouncer,
    result_cap: usize,
}

impl QueryController {
    pub fn new(
        loader: Rc<IndexLoader>,
        scheduler: Rc<dyn Scheduler>,
        debounce_ms: u32,
        result_cap: usize,
    ) -> Self {
        QueryController {
            loader,
            debouncer: Debouncer::new(scheduler, debounce_ms),
            result_cap,
        }
    }

    /// Handle one text-change event.
    ///
    /// An empty query is delivered right away and drops any pending search.
    /// Otherwise the search runs after the quiet interval, unless another
    /// input arrives first.
    pub fn on_input(&self, raw: &str, deliver: impl FnOnce(QueryOutcome) + 'static) {
        if raw.trim().is_empty() {
            self.debouncer.cancel();
            deliver(QueryOutcome::Cleared);
            return;
        }

        let loader = Rc::clone(&self.loader);
        let query = raw.to_string();
        let cap = self.result_cap;
        self.debouncer.schedule(Box::new(move || {
            deliver(execute_query(&loader, &query, cap));
        }));
    }

    pub fn cancel_pending(&self) {
        self.debouncer.cancel();
    }

    /// Run a query now, bypassing the debounce
    pub fn execute(&self, raw: &str) -> QueryOutcome {
        execute_query(&self.loader, raw, self.result_cap)
    }
}

fn execute_query(loader: &IndexLoader, raw: &str, cap: usize) -> QueryOutcome {
    let terms = tokenize_query(raw);
    if terms.is_empty() {
        return QueryOutcome::Cleared;
    }

    let index = match loader.state() {
        ReadinessState::Ready => loader.index(),
        ReadinessState::Error => return QueryOutcome::Unavailable,
        ReadinessState::Uninitialized | ReadinessState::Loading => None,
    };
    let Some(index) = index else {
        debug!(query = raw, "search index not ready");
        return QueryOutcome::Loading;
    };

    match index.search(raw, SearchOptions { expand: true }) {
        Ok(hits) if hits.is_empty() => QueryOutcome::NoResults,
        Ok(hits) => {
            debug!(query = raw, hits = hits.len(), "search complete");
            QueryOutcome::Results(render_results(&hits, &terms, index.docs(), cap))
        }
        Err(err) => {
            error!(query = raw, error = %err, "search error");
            QueryOutcome::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ManualScheduler, StaticIndex, StaticIndexSource};
    use crate::error::LoadError;
    use crate::types::{DocumentStore, Hit};
    use std::cell::RefCell;

    fn ready_controller(index: StaticIndex) -> (Rc<ManualScheduler>, QueryController) {
        let scheduler = Rc::new(ManualScheduler::new());
        let loader = IndexLoader::new(
            Box::new(StaticIndexSource::ready(index, DocumentStore::new())),
            scheduler.clone(),
        );
        loader.ensure_ready(Box::new(|_| {}));
        scheduler.run_pending();
        let controller = QueryController::new(loader, scheduler.clone(), 60, 20);
        (scheduler, controller)
    }

    type Sink = Box<dyn FnOnce(QueryOutcome)>;

    fn recorder() -> (Rc<RefCell<Vec<QueryOutcome>>>, impl Fn() -> Sink) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let make = move || -> Sink {
            let sink = sink.clone();
            Box::new(move |o: QueryOutcome| sink.borrow_mut().push(o))
        };
        (seen, make)
    }

    #[test]
    fn test_burst_runs_last_query_once() {
        let index = StaticIndex::new(vec![Hit::new("/a", 1.0)]);
        let queries = index.queries();
        let (scheduler, controller) = ready_controller(index);
        let (seen, sink) = recorder();

        for text in ["r", "ru", "rus", "rust"] {
            controller.on_input(text, sink());
            scheduler.advance(30);
        }
        scheduler.advance(60);

        assert_eq!(*queries.borrow(), vec!["rust".to_string()]);
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_empty_query_clears_immediately() {
        let index = StaticIndex::new(vec![Hit::new("/a", 1.0)]);
        let queries = index.queries();
        let (scheduler, controller) = ready_controller(index);
        let (seen, sink) = recorder();

        controller.on_input("rust", sink());
        controller.on_input("   ", sink());
        assert_eq!(*seen.borrow(), vec![QueryOutcome::Cleared]);

        scheduler.advance(200);
        assert!(queries.borrow().is_empty());
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_not_ready_reports_loading() {
        let scheduler = Rc::new(ManualScheduler::new());
        let loader = IndexLoader::new(
            Box::new(StaticIndexSource::ready(StaticIndex::new(vec![]), DocumentStore::new())),
            scheduler.clone(),
        );
        let controller = QueryController::new(loader, scheduler, 60, 20);
        assert_eq!(controller.execute("rust"), QueryOutcome::Loading);
        assert_eq!(QueryOutcome::Loading.status(), STATUS_LOADING);
    }

    #[test]
    fn test_failed_load_reports_unavailable() {
        let scheduler = Rc::new(ManualScheduler::new());
        let loader = IndexLoader::new(
            Box::new(StaticIndexSource::failing(LoadError::IndexMissing)),
            scheduler.clone(),
        );
        loader.ensure_ready(Box::new(|_| {}));
        scheduler.run_pending();

        let controller = QueryController::new(loader, scheduler, 60, 20);
        let outcome = controller.execute("rust");
        assert_eq!(outcome, QueryOutcome::Unavailable);
        assert_eq!(outcome.status(), STATUS_UNAVAILABLE);
    }

    #[test]
    fn test_zero_hits_and_failure() {
        let (_, controller) = ready_controller(StaticIndex::new(vec![]));
        assert_eq!(controller.execute("rust"), QueryOutcome::NoResults);

        let (_, failing) = ready_controller(StaticIndex::failing());
        assert_eq!(failing.execute("rust"), QueryOutcome::Failed);
        // Still usable for the next query
        assert_eq!(failing.execute("again"), QueryOutcome::Failed);
        assert_eq!(failing.execute(" "), QueryOutcome::Cleared);
    }
}
