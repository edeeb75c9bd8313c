//! Browser bindings: the DOM view, the global elasticlunr index source and
//! a `setTimeout` scheduler.

use crate::config::ModalConfig;
use crate::error::{ConfigError, LoadError, SearchError};
use crate::loader::{IndexLoader, IndexSource, LoadedIndex, SearchIndex};
use crate::modal::{is_editable_target, KeyDisposition, KeyPress, ModalView, SearchModal};
use crate::schedule::{Scheduler, Task, TaskHandle, TimerTable};
use crate::types::{DocumentStore, Hit, ResultItem, SearchOptions};
use js_sys::{Function, Object, Reflect};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, Event, EventTarget, HtmlElement, HtmlInputElement, KeyboardEvent,
    MouseEvent, ScrollIntoViewOptions, ScrollLogicalPosition, Window,
};

/// Data attribute carrying a result row's position in the list
const INDEX_ATTRIBUTE: &str = "data-result-index";

/// Readable form of a thrown JS value
fn describe(value: &JsValue) -> String {
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

/// `target[key]`, treating `undefined` and `null` as absent
fn property(target: &JsValue, key: &str) -> Option<JsValue> {
    Reflect::get(target, &JsValue::from_str(key))
        .ok()
        .filter(|v| !v.is_undefined() && !v.is_null())
}

fn method(target: &JsValue, key: &str) -> Option<Function> {
    property(target, key).and_then(|v| v.dyn_into::<Function>().ok())
}

fn to_json(value: &JsValue) -> Result<String, JsValue> {
    js_sys::JSON::stringify(value).map(String::from)
}

/// Log DOM calls that fail; the modal keeps going either way
fn check(result: Result<(), JsValue>, action: &str) {
    if let Err(err) = result {
        debug!(action, error = %describe(&err), "DOM call failed");
    }
}

/// `elasticlunr.Index.load(window.searchIndex)` plus the document store
/// at `searchIndex.documentStore.docs`
struct GlobalIndexSource {
    window: Window,
}

impl IndexSource for GlobalIndexSource {
    fn load(&self) -> Result<LoadedIndex, LoadError> {
        let engine = property(&self.window, "elasticlunr").ok_or(LoadError::EngineUnavailable)?;
        let blob = property(&self.window, "searchIndex").ok_or(LoadError::IndexMissing)?;

        let index_class = property(&engine, "Index").ok_or(LoadError::EngineUnavailable)?;
        let load = method(&index_class, "load").ok_or(LoadError::EngineUnavailable)?;
        let index = load
            .call1(&index_class, &blob)
            .map_err(|e| LoadError::EngineFailed(describe(&e)))?;

        let docs = property(&blob, "documentStore")
            .and_then(|store| property(&store, "docs"))
            .ok_or(LoadError::StoreMissing)?;
        let json = to_json(&docs).map_err(|e| LoadError::StoreMalformed(describe(&e)))?;
        let docs: DocumentStore =
            serde_json::from_str(&json).map_err(|e| LoadError::StoreMalformed(e.to_string()))?;

        Ok(LoadedIndex::new(Box::new(JsIndex { index }), docs))
    }
}

/// A loaded elasticlunr index object
struct JsIndex {
    index: JsValue,
}

impl SearchIndex for JsIndex {
    fn search(&self, query: &str, options: SearchOptions) -> Result<Vec<Hit>, SearchError> {
        let search = method(&self.index, "search")
            .ok_or_else(|| SearchError::Engine("index has no search method".to_string()))?;

        let js_options = Object::new();
        Reflect::set(
            &js_options,
            &JsValue::from_str("expand"),
            &JsValue::from_bool(options.expand),
        )
        .map_err(|e| SearchError::Engine(describe(&e)))?;

        let hits = search
            .call2(&self.index, &JsValue::from_str(query), &js_options)
            .map_err(|e| SearchError::Engine(describe(&e)))?;
        let json = to_json(&hits).map_err(|e| SearchError::MalformedHits(describe(&e)))?;
        serde_json::from_str(&json).map_err(|e| SearchError::MalformedHits(e.to_string()))
    }
}

type TimerCallback = Closure<dyn FnMut()>;

/// `setTimeout` / `clearTimeout`. Callbacks live in a [`TimerTable`] so a
/// cancelled timer frees its closure.
struct TimeoutScheduler {
    window: Window,
    timers: Rc<RefCell<TimerTable<TimerCallback>>>,
}

impl Scheduler for TimeoutScheduler {
    fn schedule(&self, delay_ms: u32, task: Task) -> TaskHandle {
        let handle = self.timers.borrow_mut().reserve();

        let timers = Rc::clone(&self.timers);
        let mut task = Some(task);
        let callback = TimerCallback::new(move || {
            timers.borrow_mut().fired(handle);
            if let Some(task) = task.take() {
                task();
            }
        });

        let delay = i32::try_from(delay_ms).unwrap_or(i32::MAX);
        match self.window.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            delay,
        ) {
            Ok(id) => self.timers.borrow_mut().insert(handle, id, callback),
            Err(err) => warn!(error = %describe(&err), "setTimeout failed"),
        }
        handle
    }

    fn cancel(&self, handle: TaskHandle) {
        let cancelled = self.timers.borrow_mut().cancel(handle);
        if let Some((id, _callback)) = cancelled {
            self.window.clear_timeout_with_handle(id);
        }
    }
}

/// Host page elements, looked up once at install
pub struct DomView {
    document: Document,
    window: Window,
    open_button: HtmlElement,
    modal: HtmlElement,
    input: HtmlInputElement,
    results: HtmlElement,
    status: HtmlElement,
    class_prefix: String,
    rows: RefCell<Vec<HtmlElement>>,
}

impl DomView {
    fn create(&self, tag: &str, class: &str) -> Result<HtmlElement, JsValue> {
        let element = self.document.create_element(tag)?;
        element.set_class_name(&format!("{}__{}", self.class_prefix, class));
        element.dyn_into::<HtmlElement>().map_err(JsValue::from)
    }

    fn build_row(&self, index: usize, item: &ResultItem) -> Result<HtmlElement, JsValue> {
        let row = self.create("li", "result")?;
        row.set_attribute("role", "option")?;
        row.set_attribute(INDEX_ATTRIBUTE, &index.to_string())?;

        let link = self.create("a", "result-link")?;
        link.set_attribute("href", item.href())?;

        let title = self.create("div", "result-title")?;
        title.set_text_content(Some(&item.title));

        let snippet = self.create("div", "result-snippet")?;
        snippet.set_inner_html(&item.snippet_html);

        link.append_child(&title)?;
        link.append_child(&snippet)?;
        row.append_child(&link)?;
        Ok(row)
    }
}

impl ModalView for DomView {
    type Focus = HtmlElement;

    fn set_hidden(&self, hidden: bool) {
        let classes = self.modal.class_list();
        if hidden {
            check(classes.add_1("hidden"), "hide modal");
            check(self.modal.set_attribute("aria-hidden", "true"), "set aria-hidden");
        } else {
            check(classes.remove_1("hidden"), "show modal");
            check(self.modal.remove_attribute("aria-hidden"), "clear aria-hidden");
        }
    }

    fn set_status(&self, text: &str) {
        self.status.set_text_content(Some(text));
    }

    fn clear_input(&self) {
        self.input.set_value("");
    }

    fn disable_input(&self) {
        check(self.input.set_attribute("disabled", "disabled"), "disable input");
    }

    fn focus_input(&self) {
        check(self.input.focus(), "focus input");
    }

    fn show_results(&self, items: &[ResultItem]) {
        self.clear_results();
        let mut rows = self.rows.borrow_mut();
        for (i, item) in items.iter().enumerate() {
            let row = match self.build_row(i, item) {
                Ok(row) => row,
                Err(err) => {
                    warn!(
                        reference = %item.reference,
                        error = %describe(&err),
                        "failed to render result"
                    );
                    continue;
                }
            };
            check(self.results.append_child(&row).map(drop), "append result");
            rows.push(row);
        }
    }

    fn clear_results(&self) {
        while let Some(child) = self.results.first_child() {
            check(self.results.remove_child(&child).map(drop), "remove result");
        }
        self.rows.borrow_mut().clear();
    }

    fn mark_active(&self, index: usize) {
        let options = ScrollIntoViewOptions::new();
        options.set_block(ScrollLogicalPosition::Nearest);

        for (i, row) in self.rows.borrow().iter().enumerate() {
            if i == index {
                check(row.class_list().add_1("active"), "mark active");
                check(row.set_attribute("aria-selected", "true"), "set aria-selected");
                row.scroll_into_view_with_scroll_into_view_options(&options);
            } else {
                check(row.class_list().remove_1("active"), "unmark active");
                check(row.remove_attribute("aria-selected"), "clear aria-selected");
            }
        }
    }

    fn focused(&self) -> Option<HtmlElement> {
        self.document
            .active_element()
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    }

    fn focus_element(&self, target: &HtmlElement) {
        check(target.focus(), "restore focus");
    }

    fn focus_open_button(&self) {
        check(self.open_button.focus(), "focus open button");
    }

    fn navigate(&self, href: &str) {
        check(self.window.location().set_href(href), "navigate");
    }
}

fn element<T: JsCast>(document: &Document, id: &str) -> Result<T, ConfigError> {
    document
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<T>().ok())
        .ok_or_else(|| ConfigError::MissingElement(id.to_string()))
}

/// Index of the result row containing the event target
fn row_index(event: &Event) -> Option<usize> {
    let target = event.target()?.dyn_into::<Element>().ok()?;
    let row = target
        .closest(&format!("[{}]", INDEX_ATTRIBUTE))
        .ok()
        .flatten()?;
    row.get_attribute(INDEX_ATTRIBUTE)?.parse().ok()
}

type Listener = Closure<dyn FnMut(Event)>;

fn listen(
    target: &EventTarget,
    event: &str,
    capture: bool,
    handler: impl FnMut(Event) + 'static,
) -> Listener {
    let listener = Closure::<dyn FnMut(Event)>::new(handler);
    check(
        target.add_event_listener_with_callback_and_bool(
            event,
            listener.as_ref().unchecked_ref(),
            capture,
        ),
        "add event listener",
    );
    listener
}

pub(crate) struct Installed {
    pub(crate) modal: Rc<SearchModal<DomView>>,
    _listeners: Vec<Listener>,
}

pub(crate) fn install(config: &ModalConfig) -> Result<Installed, ConfigError> {
    let window = web_sys::window().ok_or_else(|| ConfigError::MissingElement("window".into()))?;
    let document = window
        .document()
        .ok_or_else(|| ConfigError::MissingElement("document".into()))?;

    let view = DomView {
        open_button: element(&document, &config.open_button_id)?,
        modal: element(&document, &config.modal_id)?,
        input: element(&document, &config.input_id)?,
        results: element(&document, &config.results_id)?,
        status: element(&document, &config.status_id)?,
        class_prefix: config.class_prefix.clone(),
        rows: RefCell::new(Vec::new()),
        document: document.clone(),
        window: window.clone(),
    };
    let settings = config.settings(view.modal.get_attribute("data-max-results").as_deref());

    let scheduler: Rc<dyn Scheduler> = Rc::new(TimeoutScheduler {
        window: window.clone(),
        timers: Rc::default(),
    });
    let loader = IndexLoader::new(Box::new(GlobalIndexSource { window }), Rc::clone(&scheduler));

    let open_button: EventTarget = view.open_button.clone().into();
    let modal_el: Element = view.modal.clone().into();
    let input: EventTarget = view.input.clone().into();
    let results: EventTarget = view.results.clone().into();
    let modal = SearchModal::new(view, loader, scheduler, &settings);

    let mut listeners = Vec::new();

    let m = Rc::clone(&modal);
    listeners.push(listen(&open_button, "click", false, move |_| m.open()));

    let close_targets = modal_el
        .query_selector_all(&format!("[{}]", config.close_attribute))
        .map_err(|_| ConfigError::MissingElement(config.close_attribute.clone()))?;
    for i in 0..close_targets.length() {
        if let Some(node) = close_targets.get(i) {
            let m = Rc::clone(&modal);
            listeners.push(listen(&node, "click", false, move |_| m.close()));
        }
    }

    // Clicks inside the panel must not reach the backdrop's close handler
    if let Ok(Some(dialog)) = modal_el.query_selector(&config.dialog_selector) {
        listeners.push(listen(&dialog, "click", false, |event: Event| {
            event.stop_propagation();
        }));
    }

    let m = Rc::clone(&modal);
    let field = modal.view().input.clone();
    listeners.push(listen(&input, "input", false, move |_| m.on_input(&field.value())));

    let m = Rc::clone(&modal);
    listeners.push(listen(&results, "mousemove", false, move |event: Event| {
        if let Some(i) = row_index(&event) {
            m.on_hover(i);
        }
    }));

    let m = Rc::clone(&modal);
    listeners.push(listen(&results, "click", false, move |event: Event| {
        // Modified clicks (new tab, new window) keep the browser default
        let plain = event.dyn_ref::<MouseEvent>().is_some_and(|e| {
            e.button() == 0 && !(e.ctrl_key() || e.meta_key() || e.shift_key() || e.alt_key())
        });
        if !plain {
            return;
        }
        if let Some(i) = row_index(&event) {
            event.prevent_default();
            m.choose(i);
        }
    }));

    let m = Rc::clone(&modal);
    listeners.push(listen(&document, "keydown", true, move |event: Event| {
        let Some(key_event) = event.dyn_ref::<KeyboardEvent>() else {
            return;
        };
        let in_editable = event
            .target()
            .and_then(|t| t.dyn_into::<HtmlElement>().ok())
            .is_some_and(|el| is_editable_target(&el.tag_name(), el.is_content_editable()));
        let key = key_event.key();
        let press = KeyPress {
            key: &key,
            in_editable,
        };
        if m.handle_key(press) == KeyDisposition::PreventDefault {
            event.prevent_default();
        }
    }));

    Ok(Installed {
        modal,
        _listeners: listeners,
    })
}
