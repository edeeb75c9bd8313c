use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

/// Handle of a scheduled task, used to cancel it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(pub i32);

pub type Task = Box<dyn FnOnce()>;

/// Deferred execution on the single UI thread.
///
/// Tasks run later, never inside `schedule` itself. A delay of 0 means
/// "next tick".
pub trait Scheduler {
    fn schedule(&self, delay_ms: u32, task: Task) -> TaskHandle;
    /// Cancel a task. Cancelling one that already ran is a no-op.
    fn cancel(&self, handle: TaskHandle);
}

/// Keeps at most one task pending: each `schedule` cancels the previous one
pub struct Debouncer {
    scheduler: Rc<dyn Scheduler>,
    delay_ms: u32,
    pending: Cell<Option<TaskHandle>>,
}

impl Debouncer {
    pub fn new(scheduler: Rc<dyn Scheduler>, delay_ms: u32) -> Self {
        Debouncer {
            scheduler,
            delay_ms,
            pending: Cell::new(None),
        }
    }

    pub fn schedule(&self, task: Task) {
        self.cancel();
        let handle = self.scheduler.schedule(self.delay_ms, task);
        self.pending.set(Some(handle));
    }

    pub fn cancel(&self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel(handle);
        }
    }
}

/// Live timer callbacks keyed by [`TaskHandle`], for a host timer API that
/// needs the callback kept alive until it fires.
///
/// A callback cannot be freed while it runs, so the one that fired last is
/// parked and released when the next one fires. Host timers never nest, so
/// by then it has returned.
pub(crate) struct TimerTable<C> {
    next_key: i32,
    live: HashMap<i32, (i32, C)>,
    fired: Option<C>,
}

impl<C> Default for TimerTable<C> {
    fn default() -> Self {
        TimerTable {
            next_key: 0,
            live: HashMap::new(),
            fired: None,
        }
    }
}

impl<C> TimerTable<C> {
    /// Key for a callback about to be created
    pub(crate) fn reserve(&mut self) -> TaskHandle {
        self.next_key = self.next_key.wrapping_add(1);
        TaskHandle(self.next_key)
    }

    /// Keep `callback` alive under `handle` until it fires or is cancelled
    pub(crate) fn insert(&mut self, handle: TaskHandle, timer_id: i32, callback: C) {
        self.live.insert(handle.0, (timer_id, callback));
    }

    /// Called from inside the firing callback. Releases the previously
    /// fired one.
    pub(crate) fn fired(&mut self, handle: TaskHandle) {
        self.fired = self.live.remove(&handle.0).map(|(_, callback)| callback);
    }

    /// Forget a pending callback, returning the host timer id to clear.
    /// Drop the returned callback outside any borrow of the table.
    pub(crate) fn cancel(&mut self, handle: TaskHandle) -> Option<(i32, C)> {
        self.live.remove(&handle.0)
    }

    #[cfg(test)]
    pub(crate) fn live_count(&self) -> usize {
        self.live.len()
    }
}
