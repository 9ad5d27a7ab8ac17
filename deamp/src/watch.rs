//! DOM-facing half of the content pipeline: the live page surface, the
//! navigator, anchor interception, and the mutation observation stream
//! that drives re-classification.

use std::cell::RefCell;

use async_std::sync::Mutex;
use once_cell::sync::Lazy;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{
    console, Document, Event, HtmlAnchorElement, HtmlLinkElement,
    MutationObserver, MutationObserverInit, Node, Window,
};

use crate::bridge::{self, LocalMarkerStore, StatReporter};
use crate::classify::{self, Classification, Page, SEARCH_RESULTS_ITEMTYPE};
use crate::pipeline::{Binding, Pipeline, ReportStats};
use crate::redirect::{AnchorPlan, Navigate};
use crate::util::errors::CustomError;

/// Both historical spellings of the root-element AMP marker.
const AMP_MARKER_SELECTORS: [&str; 2] = ["html[amp]", "html[⚡]"];
const CANONICAL_LINK_SELECTOR: &str = "link[rel=\"canonical\"]";
const SEARCH_ANCHOR_SELECTOR: &str = "a[data-amp]";
const CANONICAL_DATA_ATTRIBUTE: &str = "data-amp-cur";
const BOUND_MARKER_ATTRIBUTE: &str = "data-deamp-bound";

type ContentPipeline = Pipeline<DomNavigator, StatReporter, LocalMarkerStore>;

static PIPELINE: Lazy<Mutex<Option<ContentPipeline>>> =
    Lazy::new(|| Mutex::new(None));

thread_local! {
    static OBSERVATION: RefCell<Option<MutationStream>> = RefCell::new(None);
}

/// Sets up the pipeline for this document load and starts observing.
/// One pass runs immediately, covering activation on an already-loaded
/// page; the stream re-runs it on every subtree mutation after that.
pub async fn boot() -> Result<(), CustomError> {
    let allowlist = bridge::fetch_allowlist().await;
    let page = DomPage::current()?;
    let classification = classify::classify(&page);
    if classification != Classification::Plain {
        console::log_1(&JsValue::from_str(&format!(
            "page classified as {classification}"
        )));
    }
    *PIPELINE.lock().await =
        Some(Pipeline::new(allowlist, DomNavigator, StatReporter, LocalMarkerStore));
    run_tick(&page).await;
    let stream =
        MutationStream::observe(&page.document, || spawn_local(mutation_tick()))?;
    OBSERVATION.with(|slot| *slot.borrow_mut() = Some(stream));
    Ok(())
}

async fn mutation_tick() {
    if let Ok(page) = DomPage::current() {
        run_tick(&page).await;
    }
}

async fn run_tick(page: &DomPage) {
    let mut guard = PIPELINE.lock().await;
    let Some(pipeline) = guard.as_mut() else { return };
    let binding = pipeline.tick(page).await;
    drop(guard);
    if let Some(binding) = binding {
        if let Err(error) = bind_anchors(&page.document, binding) {
            console::warn_1(&JsValue::from_str(&error.to_string()));
        }
    }
}

/// Live document read surface.
pub struct DomPage {
    window: Window,
    document: Document,
}

impl DomPage {
    pub fn current() -> Result<Self, CustomError> {
        let window = web_sys::window().ok_or(CustomError::StandardMismatch {
            message: String::from("window should exist in page"),
        })?;
        let document = window.document().ok_or(CustomError::StandardMismatch {
            message: String::from("document should exist in page"),
        })?;
        Ok(Self { window, document })
    }

    fn location(&self) -> web_sys::Location {
        self.window.location()
    }

    fn selector_matches(&self, selector: &str) -> bool {
        matches!(self.document.query_selector(selector), Ok(Some(_)))
    }
}

impl Page for DomPage {
    fn hostname(&self) -> String {
        self.location().hostname().unwrap_or_default()
    }

    fn pathname(&self) -> String {
        self.location().pathname().unwrap_or_default()
    }

    fn href(&self) -> String {
        self.location().href().unwrap_or_default()
    }

    fn has_amp_marker(&self) -> bool {
        AMP_MARKER_SELECTORS
            .iter()
            .any(|selector| self.selector_matches(selector))
    }

    fn has_search_results_marker(&self) -> bool {
        self.selector_matches(&format!(
            "html[itemtype=\"{SEARCH_RESULTS_ITEMTYPE}\"]"
        ))
    }

    fn canonical_url(&self) -> Option<String> {
        let link = self
            .document
            .query_selector(CANONICAL_LINK_SELECTOR)
            .ok()
            .flatten()?;
        let href = link.dyn_into::<HtmlLinkElement>().ok()?.href();
        (!href.is_empty()).then_some(href)
    }
}

/// Navigation through the live window location.
/// Stateless so the shared pipeline can hold it without dragging
/// non-Send handles into the static.
pub struct DomNavigator;

impl DomNavigator {
    fn location(&self) -> Option<web_sys::Location> {
        web_sys::window().map(|window| window.location())
    }
}

impl Navigate for DomNavigator {
    fn replace(&self, url: &str) {
        if let Some(location) = self.location() {
            drop(location.replace(url));
        }
    }

    fn assign(&self, url: &str) {
        if let Some(location) = self.location() {
            drop(location.set_href(url));
        }
    }

    fn reload(&self) {
        if let Some(location) = self.location() {
            drop(location.reload());
        }
    }
}

/// Subtree mutation stream with an explicit teardown,
/// wrapping the browser's mutation observer.
/// Dropping the stream disconnects it.
pub struct MutationStream {
    observer: MutationObserver,
    _handler: Closure<dyn FnMut()>,
}

impl MutationStream {
    /// Starts observing subtree mutations under `target`.
    /// Fails if the browser indicates so.
    pub fn observe(
        target: &Node,
        mut on_mutation: impl FnMut() + 'static,
    ) -> Result<Self, CustomError> {
        let handler = Closure::new(move || on_mutation());
        let observer = MutationObserver::new(handler.as_ref().unchecked_ref())
            .or(Err(CustomError::StandardMismatch {
                message: String::from("observer rejected the callback"),
            }))?;
        let options = MutationObserverInit::new();
        options.set_child_list(true);
        options.set_subtree(true);
        observer
            .observe_with_options(target, &options)
            .or(Err(CustomError::StandardMismatch {
                message: String::from("observer rejected the target"),
            }))?;
        Ok(Self {
            observer,
            _handler: handler,
        })
    }

    /// Stops the stream; later mutations are ignored.
    pub fn disconnect(&self) {
        self.observer.disconnect();
    }
}

impl Drop for MutationStream {
    fn drop(&mut self) {
        self.disconnect();
    }
}

/// Binds capture-phase click interceptors for a listing page.
/// Bound anchors are tagged so repeated watcher ticks bind each anchor
/// once while anchors injected later still get picked up.
fn bind_anchors(document: &Document, binding: Binding) -> Result<(), CustomError> {
    let selector = match binding {
        Binding::SearchAnchors => SEARCH_ANCHOR_SELECTOR,
        Binding::AllAnchors => "a",
    };
    let anchors = document.query_selector_all(selector).or(Err(
        CustomError::StandardMismatch {
            message: String::from("anchor selector rejected"),
        },
    ))?;
    let mut newly_bound = 0;
    for index in 0..anchors.length() {
        let Some(node) = anchors.get(index) else { continue };
        let Ok(anchor) = node.dyn_into::<HtmlAnchorElement>() else { continue };
        if anchor.get_attribute(BOUND_MARKER_ATTRIBUTE).is_some() {
            continue;
        }
        drop(anchor.set_attribute(BOUND_MARKER_ATTRIBUTE, ""));
        let target = anchor.clone();
        let handler = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            intercept_click(binding, &target, &event);
        });
        drop(anchor.add_event_listener_with_callback_and_bool(
            "click",
            handler.as_ref().unchecked_ref(),
            true,
        ));
        handler.forget();
        newly_bound += 1;
    }
    if newly_bound > 0 {
        console::log_1(&JsValue::from_str(&format!(
            "intercepting {newly_bound} listing anchors"
        )));
    }
    Ok(())
}

/// Cancels the host page's click handling and follows the plan instead.
fn intercept_click(binding: Binding, anchor: &HtmlAnchorElement, event: &Event) {
    event.prevent_default();
    event.stop_immediate_propagation();
    let plan = match binding {
        Binding::SearchAnchors => AnchorPlan::for_search_anchor(
            anchor.get_attribute(CANONICAL_DATA_ATTRIBUTE),
            anchor.href(),
        ),
        Binding::AllAnchors => AnchorPlan::for_news_anchor(anchor.href()),
    };
    let hostname = DomPage::current()
        .map(|page| page.hostname())
        .unwrap_or_default();
    let mut guard = PIPELINE.try_lock();
    match guard.as_deref_mut().and_then(Option::as_mut) {
        Some(pipeline) => pipeline.follow_anchor(&hostname, plan),
        None => {
            // The click must win even when a tick holds the pipeline.
            if plan.counts_activation {
                StatReporter.report_activation(&hostname);
            }
            DomNavigator.assign(&plan.target);
        }
    }
}
