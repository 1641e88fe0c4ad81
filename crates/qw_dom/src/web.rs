//! Browser backend built on `web_sys`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    ErrorEvent, EventTarget, HtmlElement, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit, KeyboardEvent, ScrollBehavior, ScrollIntoViewOptions,
    ScrollLogicalPosition,
};

use crate::document::{Document, Element, EnterCallback, ViewportObserver, ViewportOptions};
use crate::error::{DomError, Result};
use crate::event::{DomEvent, EventKind, Listener, Propagation};
use crate::scheduler::{Scheduler, TimerId};

const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

/// Best-effort text for a thrown JS value.
pub fn js_error_text(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    format!("{:?}", value)
}

fn add_listener(target: &EventTarget, kind: EventKind, listener: Listener) -> Result<()> {
    let closure = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
        let dom_event = convert_event(kind, &event);
        if listener(&dom_event) == Propagation::PreventDefault {
            event.prevent_default();
        }
    });

    target
        .add_event_listener_with_callback(kind.name(), closure.as_ref().unchecked_ref())
        .map_err(|e| DomError::Listener {
            event: kind.name(),
            reason: js_error_text(&e),
        })?;

    // Listeners stay registered for the lifetime of the page
    closure.forget();
    Ok(())
}

fn convert_event(kind: EventKind, event: &web_sys::Event) -> DomEvent {
    match kind {
        EventKind::Click => DomEvent::Click,
        EventKind::KeyDown => DomEvent::KeyDown {
            key: event
                .dyn_ref::<KeyboardEvent>()
                .map(KeyboardEvent::key)
                .unwrap_or_default(),
        },
        EventKind::Error => DomEvent::Error {
            message: event.dyn_ref::<ErrorEvent>().map(ErrorEvent::message),
        },
        EventKind::BeforeUnload => DomEvent::BeforeUnload,
    }
}

// ============================================================================
// Elements
// ============================================================================

/// A live DOM element.
#[derive(Debug, Clone, PartialEq)]
pub struct WebElement(web_sys::Element);

impl WebElement {
    pub fn raw(&self) -> &web_sys::Element {
        &self.0
    }

    fn html(&self) -> Option<&HtmlElement> {
        self.0.dyn_ref::<HtmlElement>()
    }
}

impl From<web_sys::Element> for WebElement {
    fn from(element: web_sys::Element) -> Self {
        Self(element)
    }
}

impl Element for WebElement {
    fn attribute(&self, name: &str) -> Option<String> {
        self.0.get_attribute(name)
    }

    fn set_attribute(&self, name: &str, value: &str) {
        if let Err(e) = self.0.set_attribute(name, value) {
            log::debug!("set_attribute({}) failed: {}", name, js_error_text(&e));
        }
    }

    fn add_class(&self, class: &str) {
        if let Err(e) = self.0.class_list().add_1(class) {
            log::debug!("classList.add({}) failed: {}", class, js_error_text(&e));
        }
    }

    fn remove_class(&self, class: &str) {
        if let Err(e) = self.0.class_list().remove_1(class) {
            log::debug!("classList.remove({}) failed: {}", class, js_error_text(&e));
        }
    }

    fn has_class(&self, class: &str) -> bool {
        self.0.class_list().contains(class)
    }

    fn set_text_content(&self, text: &str) {
        self.0.set_text_content(Some(text));
    }

    fn set_inner_html(&self, markup: &str) {
        self.0.set_inner_html(markup);
    }

    fn inner_html(&self) -> String {
        self.0.inner_html()
    }

    fn text_content(&self) -> String {
        self.0.text_content().unwrap_or_default()
    }

    fn query_selector(&self, selector: &str) -> Option<Self> {
        self.0.query_selector(selector).ok().flatten().map(WebElement)
    }

    fn parent(&self) -> Option<Self> {
        self.0.parent_element().map(WebElement)
    }

    fn focus(&self) {
        if let Some(html) = self.html() {
            if let Err(e) = html.focus() {
                log::debug!("focus() failed: {}", js_error_text(&e));
            }
        }
    }

    fn blur(&self) {
        if let Some(html) = self.html() {
            if let Err(e) = html.blur() {
                log::debug!("blur() failed: {}", js_error_text(&e));
            }
        }
    }

    fn scroll_into_view(&self) {
        let options = ScrollIntoViewOptions::new();
        options.set_behavior(ScrollBehavior::Smooth);
        options.set_block(ScrollLogicalPosition::Center);
        self.0.scroll_into_view_with_scroll_into_view_options(&options);
    }

    fn hide(&self) {
        if let Some(html) = self.html() {
            if let Err(e) = html.style().set_property("display", "none") {
                log::debug!("hiding element failed: {}", js_error_text(&e));
            }
        }
    }

    fn click(&self) {
        if let Some(html) = self.html() {
            html.click();
        }
    }

    fn on(&self, kind: EventKind, listener: Listener) -> Result<()> {
        add_listener(&self.0, kind, listener)
    }
}

// ============================================================================
// Viewport observer
// ============================================================================

/// An `IntersectionObserver` together with the closure it calls.
pub struct WebObserver {
    observer: IntersectionObserver,
    _callback: Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>,
}

impl ViewportObserver for WebObserver {
    fn disconnect(&self) {
        self.observer.disconnect();
    }
}

// ============================================================================
// Document
// ============================================================================

/// The browser window and its document.
#[derive(Clone)]
pub struct WebDocument {
    window: web_sys::Window,
    document: web_sys::Document,
}

impl WebDocument {
    /// Returns `None` when the window has no document.
    pub fn new(window: web_sys::Window) -> Option<Self> {
        let document = window.document()?;
        Some(Self { window, document })
    }

    pub fn window(&self) -> &web_sys::Window {
        &self.window
    }
}

impl Document for WebDocument {
    type Element = WebElement;
    type Observer = WebObserver;

    fn element_by_id(&self, id: &str) -> Option<WebElement> {
        self.document.get_element_by_id(id).map(WebElement)
    }

    fn query_selector(&self, selector: &str) -> Option<WebElement> {
        match self.document.query_selector(selector) {
            Ok(found) => found.map(WebElement),
            Err(e) => {
                log::warn!("Invalid selector '{}': {}", selector, js_error_text(&e));
                None
            }
        }
    }

    fn query_selector_all(&self, selector: &str) -> Vec<WebElement> {
        let list = match self.document.query_selector_all(selector) {
            Ok(list) => list,
            Err(e) => {
                log::warn!("Invalid selector '{}': {}", selector, js_error_text(&e));
                return Vec::new();
            }
        };

        (0..list.length())
            .filter_map(|i| list.get(i))
            .filter_map(|node| node.dyn_into::<web_sys::Element>().ok())
            .map(WebElement)
            .collect()
    }

    fn prefers_reduced_motion(&self) -> bool {
        matches!(
            self.window.match_media(REDUCED_MOTION_QUERY),
            Ok(Some(query)) if query.matches()
        )
    }

    fn on_window(&self, kind: EventKind, listener: Listener) -> Result<()> {
        add_listener(&self.window, kind, listener)
    }

    fn observe_viewport(
        &self,
        targets: &[WebElement],
        options: &ViewportOptions,
        on_enter: EnterCallback<WebElement>,
    ) -> Result<Option<WebObserver>> {
        let supported =
            js_sys::Reflect::has(&self.window, &JsValue::from_str("IntersectionObserver"))
                .unwrap_or(false);
        if !supported {
            return Ok(None);
        }

        let callback = Closure::<dyn FnMut(js_sys::Array, IntersectionObserver)>::new(
            move |entries: js_sys::Array, observer: IntersectionObserver| {
                for (index, entry) in entries.iter().enumerate() {
                    let entry: IntersectionObserverEntry = entry.unchecked_into();
                    if entry.is_intersecting() {
                        let target = entry.target();
                        observer.unobserve(&target);
                        on_enter(WebElement(target), index);
                    }
                }
            },
        );

        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(options.threshold));
        init.set_root_margin(&options.root_margin);

        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)
                .map_err(|e| DomError::Observer(js_error_text(&e)))?;

        for target in targets {
            observer.observe(&target.0);
        }

        Ok(Some(WebObserver {
            observer,
            _callback: callback,
        }))
    }
}

// ============================================================================
// Timers
// ============================================================================

fn millis(duration: Duration) -> i32 {
    duration.as_millis().min(i32::MAX as u128) as i32
}

/// `setTimeout`/`setInterval` on the window.
///
/// Interval closures are owned here until the interval is cleared; timeout
/// closures free themselves after running.
#[derive(Clone)]
pub struct WebScheduler {
    window: web_sys::Window,
    intervals: Rc<RefCell<HashMap<i32, Closure<dyn FnMut()>>>>,
}

impl WebScheduler {
    pub fn new(window: web_sys::Window) -> Self {
        Self {
            window,
            intervals: Rc::new(RefCell::new(HashMap::new())),
        }
    }
}

impl Scheduler for WebScheduler {
    fn set_timeout<F>(&self, delay: Duration, task: F) -> Result<TimerId>
    where
        F: FnOnce() + 'static,
    {
        let callback = Closure::once_into_js(task);
        self.window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.unchecked_ref(),
                millis(delay),
            )
            .map(TimerId::from_raw)
            .map_err(|e| DomError::Timer(js_error_text(&e)))
    }

    fn set_interval<F>(&self, period: Duration, task: F) -> Result<TimerId>
    where
        F: FnMut() + 'static,
    {
        let closure = Closure::<dyn FnMut()>::new(task);
        let handle = self
            .window
            .set_interval_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                millis(period),
            )
            .map_err(|e| DomError::Timer(js_error_text(&e)))?;

        self.intervals.borrow_mut().insert(handle, closure);
        Ok(TimerId::from_raw(handle))
    }

    fn clear(&self, id: TimerId) {
        // Timeouts and intervals share one handle pool, so clearInterval
        // cancels either kind.
        self.window.clear_interval_with_handle(id.raw());
        let removed = self.intervals.borrow_mut().remove(&id.raw());

        // An interval may clear itself from inside its own callback, so its
        // closure is freed on a later turn of the event loop.
        if let Some(closure) = removed {
            let release = Closure::once_into_js(move || drop(closure));
            if let Err(e) = self
                .window
                .set_timeout_with_callback_and_timeout_and_arguments_0(release.unchecked_ref(), 0)
            {
                log::debug!("Deferred interval release failed: {}", js_error_text(&e));
            }
        }
    }
}
