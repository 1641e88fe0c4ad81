//! In-memory page.
//!
//! A small element tree that behaves like the parts of the browser DOM the
//! demo relies on: class lists, attributes, text/markup content, listeners,
//! focus, and a simulated viewport. Tests build a page with the builder
//! methods on [`MemoryElement`], then drive it through [`MemoryElement::click`],
//! [`MemoryElement::key_down`] and [`MemoryDocument::scroll_into_viewport`].

mod selector;

pub use selector::Selector;

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::document::{Document, Element, EnterCallback, ViewportObserver, ViewportOptions};
use crate::error::{DomError, Result};
use crate::event::{DomEvent, EventKind, Listener, Propagation};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Content {
    Text(String),
    Markup(String),
}

struct Node {
    tag: String,
    /// Includes `id` and the space-separated `class` list
    attributes: BTreeMap<String, String>,
    content: Content,
    children: Vec<MemoryElement>,
    parent: Weak<RefCell<Node>>,
    listeners: Vec<(EventKind, Listener)>,
    focused: bool,
    focus_count: usize,
    hidden: bool,
    scroll_count: usize,
    rejects_listeners: bool,
}

/// Handle to an element of a [`MemoryDocument`]. Clones share the element.
#[derive(Clone)]
pub struct MemoryElement(Rc<RefCell<Node>>);

impl MemoryElement {
    pub fn new(tag: &str) -> Self {
        Self(Rc::new(RefCell::new(Node {
            tag: tag.to_ascii_lowercase(),
            attributes: BTreeMap::new(),
            content: Content::Text(String::new()),
            children: Vec::new(),
            parent: Weak::new(),
            listeners: Vec::new(),
            focused: false,
            focus_count: 0,
            hidden: false,
            scroll_count: 0,
            rejects_listeners: false,
        })))
    }

    pub fn with_id(self, id: &str) -> Self {
        self.set_attribute("id", id);
        self
    }

    pub fn with_class(self, class: &str) -> Self {
        self.add_class(class);
        self
    }

    pub fn with_attribute(self, name: &str, value: &str) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn with_text(self, text: &str) -> Self {
        self.set_text_content(text);
        self
    }

    pub fn with_child(self, child: MemoryElement) -> Self {
        self.append_child(&child);
        self
    }

    pub fn append_child(&self, child: &MemoryElement) {
        child.0.borrow_mut().parent = Rc::downgrade(&self.0);
        self.0.borrow_mut().children.push(child.clone());
    }

    pub fn tag(&self) -> String {
        self.0.borrow().tag.clone()
    }

    pub fn children(&self) -> Vec<MemoryElement> {
        self.0.borrow().children.clone()
    }

    pub fn is_focused(&self) -> bool {
        self.0.borrow().focused
    }

    /// How many times the element has received focus.
    pub fn focus_count(&self) -> usize {
        self.0.borrow().focus_count
    }

    pub fn is_hidden(&self) -> bool {
        self.0.borrow().hidden
    }

    /// How many times the element was scrolled into view.
    pub fn scroll_count(&self) -> usize {
        self.0.borrow().scroll_count
    }

    /// Make every later [`Element::on`] call fail, as a browser does for a
    /// detached or sandboxed node.
    pub fn reject_listeners(&self) {
        self.0.borrow_mut().rejects_listeners = true;
    }

    /// Run the listeners registered for `event`'s kind, in registration order.
    pub fn dispatch(&self, event: &DomEvent) -> Propagation {
        let listeners: Vec<Listener> = self
            .0
            .borrow()
            .listeners
            .iter()
            .filter(|(kind, _)| *kind == event.kind())
            .map(|(_, listener)| listener.clone())
            .collect();
        run_listeners(&listeners, event)
    }

    pub fn key_down(&self, key: &str) -> Propagation {
        self.dispatch(&DomEvent::key_down(key))
    }

    /// Every descendant in document order, excluding `self`.
    pub fn descendants(&self) -> Vec<MemoryElement> {
        let mut out = Vec::new();
        self.collect_descendants(&mut out);
        out
    }

    fn collect_descendants(&self, out: &mut Vec<MemoryElement>) {
        for child in self.0.borrow().children.iter() {
            out.push(child.clone());
            child.collect_descendants(out);
        }
    }

    fn matches(&self, selector: &Selector) -> bool {
        let node = self.0.borrow();
        selector.matches(&node.tag, |name: &str| {
            node.attributes.get(name).map(String::as_str)
        })
    }

    fn select_all(&self, selector: &str) -> Vec<MemoryElement> {
        match Selector::parse(selector) {
            Some(selector) => self
                .descendants()
                .into_iter()
                .filter(|element| element.matches(&selector))
                .collect(),
            None => {
                log::warn!("Unsupported selector '{}'", selector);
                Vec::new()
            }
        }
    }

    fn replace_content(&self, content: Content) {
        let children = {
            let mut node = self.0.borrow_mut();
            node.content = content;
            std::mem::take(&mut node.children)
        };
        for child in children {
            child.0.borrow_mut().parent = Weak::new();
        }
    }
}

impl PartialEq for MemoryElement {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for MemoryElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = self.0.borrow();
        f.debug_struct("MemoryElement")
            .field("tag", &node.tag)
            .field("attributes", &node.attributes)
            .field("children", &node.children.len())
            .finish()
    }
}

impl Element for MemoryElement {
    fn attribute(&self, name: &str) -> Option<String> {
        self.0.borrow().attributes.get(name).cloned()
    }

    fn set_attribute(&self, name: &str, value: &str) {
        self.0
            .borrow_mut()
            .attributes
            .insert(name.to_ascii_lowercase(), value.to_string());
    }

    fn add_class(&self, class: &str) {
        let mut node = self.0.borrow_mut();
        let classes = node.attributes.entry("class".to_string()).or_default();
        if !classes.split_whitespace().any(|c| c == class) {
            if !classes.is_empty() {
                classes.push(' ');
            }
            classes.push_str(class);
        }
    }

    fn remove_class(&self, class: &str) {
        let mut node = self.0.borrow_mut();
        if let Some(classes) = node.attributes.get_mut("class") {
            *classes = classes
                .split_whitespace()
                .filter(|c| *c != class)
                .collect::<Vec<_>>()
                .join(" ");
        }
    }

    fn has_class(&self, class: &str) -> bool {
        self.0
            .borrow()
            .attributes
            .get("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    fn set_text_content(&self, text: &str) {
        self.replace_content(Content::Text(text.to_string()));
    }

    fn set_inner_html(&self, markup: &str) {
        self.replace_content(Content::Markup(markup.to_string()));
    }

    fn inner_html(&self) -> String {
        match &self.0.borrow().content {
            Content::Text(text) => escape_text(text),
            Content::Markup(markup) => markup.clone(),
        }
    }

    fn text_content(&self) -> String {
        let node = self.0.borrow();
        let mut text = match &node.content {
            Content::Text(text) => text.clone(),
            Content::Markup(markup) => strip_markup(markup),
        };
        for child in node.children.iter() {
            text.push_str(&child.text_content());
        }
        text
    }

    fn query_selector(&self, selector: &str) -> Option<Self> {
        self.select_all(selector).into_iter().next()
    }

    fn parent(&self) -> Option<Self> {
        self.0.borrow().parent.upgrade().map(MemoryElement)
    }

    fn focus(&self) {
        let mut node = self.0.borrow_mut();
        node.focused = true;
        node.focus_count += 1;
    }

    fn blur(&self) {
        self.0.borrow_mut().focused = false;
    }

    fn scroll_into_view(&self) {
        self.0.borrow_mut().scroll_count += 1;
    }

    fn hide(&self) {
        self.0.borrow_mut().hidden = true;
    }

    fn click(&self) {
        self.dispatch(&DomEvent::Click);
    }

    fn on(&self, kind: EventKind, listener: Listener) -> Result<()> {
        let mut node = self.0.borrow_mut();
        if node.rejects_listeners {
            return Err(DomError::Listener {
                event: kind.name(),
                reason: format!("<{}> rejected the listener", node.tag),
            });
        }
        node.listeners.push((kind, listener));
        Ok(())
    }
}

fn run_listeners(listeners: &[Listener], event: &DomEvent) -> Propagation {
    let mut outcome = Propagation::Continue;
    for listener in listeners {
        if listener(event) == Propagation::PreventDefault {
            outcome = Propagation::PreventDefault;
        }
    }
    outcome
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn strip_markup(markup: &str) -> String {
    let mut text = String::with_capacity(markup.len());
    let mut in_tag = false;
    for c in markup.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

// ============================================================================
// Viewport simulation
// ============================================================================

struct ObserverState {
    options: ViewportOptions,
    watched: RefCell<Vec<MemoryElement>>,
    on_enter: EnterCallback<MemoryElement>,
}

/// Viewport observation created by [`MemoryDocument::observe_viewport`].
pub struct MemoryObserver {
    state: Rc<ObserverState>,
}

impl MemoryObserver {
    pub fn options(&self) -> &ViewportOptions {
        &self.state.options
    }

    /// Elements still waiting to enter the viewport.
    pub fn watched(&self) -> usize {
        self.state.watched.borrow().len()
    }
}

impl ViewportObserver for MemoryObserver {
    fn disconnect(&self) {
        self.state.watched.borrow_mut().clear();
    }
}

// ============================================================================
// Document
// ============================================================================

struct DocumentState {
    body: MemoryElement,
    reduced_motion: Cell<bool>,
    viewport_supported: Cell<bool>,
    window_listeners: RefCell<Vec<(EventKind, Listener)>>,
    observers: RefCell<Vec<Weak<ObserverState>>>,
}

/// An in-memory page rooted at a `<body>` element.
#[derive(Clone)]
pub struct MemoryDocument {
    state: Rc<DocumentState>,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self {
            state: Rc::new(DocumentState {
                body: MemoryElement::new("body"),
                reduced_motion: Cell::new(false),
                viewport_supported: Cell::new(true),
                window_listeners: RefCell::new(Vec::new()),
                observers: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn body(&self) -> MemoryElement {
        self.state.body.clone()
    }

    pub fn set_prefers_reduced_motion(&self, reduce: bool) {
        self.state.reduced_motion.set(reduce);
    }

    /// Pretend the environment lacks (or has) a viewport observer.
    pub fn set_viewport_supported(&self, supported: bool) {
        self.state.viewport_supported.set(supported);
    }

    /// Deliver an event to the window listeners.
    pub fn dispatch_window(&self, event: &DomEvent) -> Propagation {
        let listeners: Vec<Listener> = self
            .state
            .window_listeners
            .borrow()
            .iter()
            .filter(|(kind, _)| *kind == event.kind())
            .map(|(_, listener)| listener.clone())
            .collect();
        run_listeners(&listeners, event)
    }

    /// Simulate `elements` becoming visible together. Each live observer
    /// fires once for every element it still watches, numbered within this
    /// batch, then forgets it.
    pub fn scroll_into_viewport(&self, elements: &[MemoryElement]) {
        let observers: Vec<Rc<ObserverState>> = self
            .state
            .observers
            .borrow()
            .iter()
            .filter_map(Weak::upgrade)
            .collect();

        for observer in observers {
            let entered: Vec<MemoryElement> = {
                let mut watched = observer.watched.borrow_mut();
                let entered: Vec<MemoryElement> = elements
                    .iter()
                    .filter(|element| watched.contains(element))
                    .cloned()
                    .collect();
                watched.retain(|element| !entered.contains(element));
                entered
            };

            for (index, element) in entered.into_iter().enumerate() {
                (observer.on_enter)(element, index);
            }
        }
    }

    /// Elements watched by all live observers.
    pub fn observed_count(&self) -> usize {
        self.state
            .observers
            .borrow()
            .iter()
            .filter_map(Weak::upgrade)
            .map(|observer| observer.watched.borrow().len())
            .sum()
    }
}

impl Document for MemoryDocument {
    type Element = MemoryElement;
    type Observer = MemoryObserver;

    fn element_by_id(&self, id: &str) -> Option<MemoryElement> {
        self.state
            .body
            .descendants()
            .into_iter()
            .find(|element| element.attribute("id").as_deref() == Some(id))
    }

    fn query_selector(&self, selector: &str) -> Option<MemoryElement> {
        self.state.body.query_selector(selector)
    }

    fn query_selector_all(&self, selector: &str) -> Vec<MemoryElement> {
        self.state.body.select_all(selector)
    }

    fn prefers_reduced_motion(&self) -> bool {
        self.state.reduced_motion.get()
    }

    fn on_window(&self, kind: EventKind, listener: Listener) -> Result<()> {
        self.state.window_listeners.borrow_mut().push((kind, listener));
        Ok(())
    }

    fn observe_viewport(
        &self,
        targets: &[MemoryElement],
        options: &ViewportOptions,
        on_enter: EnterCallback<MemoryElement>,
    ) -> Result<Option<MemoryObserver>> {
        if !self.state.viewport_supported.get() {
            return Ok(None);
        }

        let state = Rc::new(ObserverState {
            options: options.clone(),
            watched: RefCell::new(targets.to_vec()),
            on_enter,
        });
        self.state.observers.borrow_mut().push(Rc::downgrade(&state));
        Ok(Some(MemoryObserver { state }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::listener;

    fn page() -> MemoryDocument {
        let doc = MemoryDocument::new();
        doc.body().append_child(
            &MemoryElement::new("nav")
                .with_child(
                    MemoryElement::new("button")
                        .with_class("demo-tab")
                        .with_attribute("data-tab", "live-demo"),
                )
                .with_child(
                    MemoryElement::new("button")
                        .with_class("demo-tab")
                        .with_attribute("data-tab", "setup-guide"),
                ),
        );
        doc.body().append_child(
            &MemoryElement::new("div")
                .with_class("demo-card")
                .with_child(MemoryElement::new("pre").with_id("demo-sql")),
        );
        doc
    }

    #[test]
    fn test_query_in_document_order() {
        let doc = page();
        let tabs = doc.query_selector_all(".demo-tab");
        assert_eq!(tabs.len(), 2);
        assert_eq!(tabs[0].attribute("data-tab").as_deref(), Some("live-demo"));
        assert_eq!(tabs[1].attribute("data-tab").as_deref(), Some("setup-guide"));

        let setup = doc.query_selector("[data-tab=\"setup-guide\"]").unwrap();
        assert_eq!(setup, tabs[1]);
        assert!(doc.element_by_id("demo-sql").is_some());
        assert!(doc.element_by_id("missing").is_none());
        assert!(doc.query_selector_all(".demo-card .x").is_empty());
    }

    #[test]
    fn test_class_list() {
        let el = MemoryElement::new("div").with_class("a");
        el.add_class("b");
        el.add_class("b");
        assert_eq!(el.attribute("class").as_deref(), Some("a b"));
        el.remove_class("a");
        assert!(!el.has_class("a"));
        assert!(el.has_class("b"));
        el.remove_class("not-there");
        assert_eq!(el.attribute("class").as_deref(), Some("b"));
    }

    #[test]
    fn test_text_and_markup() {
        let el = MemoryElement::new("pre");
        el.set_text_content("a < b & c");
        assert_eq!(el.inner_html(), "a &lt; b &amp; c");
        assert_eq!(el.text_content(), "a < b & c");

        el.set_inner_html("<span class=\"sql-keyword\">SELECT</span> x &gt; 1");
        assert_eq!(el.text_content(), "SELECT x > 1");
    }

    #[test]
    fn test_inner_html_detaches_children() {
        let doc = page();
        let card = doc.query_selector(".demo-card").unwrap();
        let code = doc.element_by_id("demo-sql").unwrap();
        assert_eq!(code.parent(), Some(card.clone()));

        card.set_inner_html("<div class=\"error-fallback\">gone</div>");
        assert!(doc.element_by_id("demo-sql").is_none());
        assert!(code.parent().is_none());
        assert!(card.inner_html().contains("error-fallback"));
    }

    #[test]
    fn test_dispatch_reports_prevent_default() {
        let button = MemoryElement::new("button");
        let clicks = Rc::new(Cell::new(0));

        let counter = clicks.clone();
        button
            .on(
                EventKind::Click,
                listener(move |_| {
                    counter.set(counter.get() + 1);
                    Propagation::Continue
                }),
            )
            .unwrap();
        button
            .on(
                EventKind::KeyDown,
                listener(|event| {
                    if event.is_activation_key() {
                        Propagation::PreventDefault
                    } else {
                        Propagation::Continue
                    }
                }),
            )
            .unwrap();

        button.click();
        button.click();
        assert_eq!(clicks.get(), 2);
        assert_eq!(button.key_down("Enter"), Propagation::PreventDefault);
        assert_eq!(button.key_down("a"), Propagation::Continue);
    }

    #[test]
    fn test_viewport_fires_once_per_element() {
        let doc = MemoryDocument::new();
        let cards: Vec<MemoryElement> = (0..3)
            .map(|_| MemoryElement::new("div").with_class("feature-card"))
            .collect();
        for card in &cards {
            doc.body().append_child(card);
        }

        let entered = Rc::new(RefCell::new(Vec::new()));
        let sink = entered.clone();
        let observer = doc
            .observe_viewport(
                &cards,
                &ViewportOptions::default(),
                Rc::new(move |el: MemoryElement, index| sink.borrow_mut().push((el, index))),
            )
            .unwrap()
            .unwrap();
        assert_eq!(doc.observed_count(), 3);

        doc.scroll_into_viewport(&cards[1..2]);
        doc.scroll_into_viewport(&cards[1..2]);
        assert_eq!(entered.borrow().len(), 1);
        assert_eq!(entered.borrow()[0], (cards[1].clone(), 0));
        assert_eq!(observer.watched(), 2);

        observer.disconnect();
        doc.scroll_into_viewport(&cards);
        assert_eq!(entered.borrow().len(), 1);
    }

    #[test]
    fn test_viewport_numbers_each_batch() {
        let doc = MemoryDocument::new();
        let cards: Vec<MemoryElement> = (0..4).map(|_| MemoryElement::new("div")).collect();
        for card in &cards {
            doc.body().append_child(card);
        }

        let entered = Rc::new(RefCell::new(Vec::new()));
        let sink = entered.clone();
        let _observer = doc
            .observe_viewport(
                &cards,
                &ViewportOptions::default(),
                Rc::new(move |_: MemoryElement, index| sink.borrow_mut().push(index)),
            )
            .unwrap()
            .unwrap();

        doc.scroll_into_viewport(&cards[..2]);
        doc.scroll_into_viewport(&cards[1..]);
        assert_eq!(*entered.borrow(), vec![0, 1, 0, 1]);
    }

    #[test]
    fn test_viewport_unsupported() {
        let doc = MemoryDocument::new();
        doc.set_viewport_supported(false);
        let observer = doc
            .observe_viewport(&[], &ViewportOptions::default(), Rc::new(|_: MemoryElement, _| {}))
            .unwrap();
        assert!(observer.is_none());
    }
}
