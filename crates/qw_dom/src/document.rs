//! Traits the demo controller uses to read and write the page.

use std::rc::Rc;

use crate::error::Result;
use crate::event::{EventKind, Listener};

/// A handle to one page element.
///
/// Handles are cheap to clone and compare by identity. All mutation goes
/// through `&self`, mirroring how the browser DOM behaves.
pub trait Element: Clone + PartialEq + 'static {
    fn attribute(&self, name: &str) -> Option<String>;
    fn set_attribute(&self, name: &str, value: &str);

    fn add_class(&self, class: &str);
    fn remove_class(&self, class: &str);
    fn has_class(&self, class: &str) -> bool;

    /// Replace the element's content with plain text.
    fn set_text_content(&self, text: &str);
    /// Replace the element's content with markup.
    fn set_inner_html(&self, markup: &str);
    fn inner_html(&self) -> String;
    fn text_content(&self) -> String;

    /// First descendant matching `selector`.
    fn query_selector(&self, selector: &str) -> Option<Self>;
    fn parent(&self) -> Option<Self>;

    fn focus(&self);
    fn blur(&self);
    /// Smoothly scroll the element to the vertical centre of the viewport.
    fn scroll_into_view(&self);
    /// Take the element out of the layout (`display: none`).
    fn hide(&self);
    /// Synthesise a click, running the element's click listeners.
    fn click(&self);

    fn on(&self, kind: EventKind, listener: Listener) -> Result<()>;
}

/// Options for [`Document::observe_viewport`].
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportOptions {
    /// Fraction of the element that must be visible, in `[0, 1]`
    pub threshold: f64,
    /// CSS margin applied to the viewport before intersecting
    pub root_margin: String,
}

impl Default for ViewportOptions {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            root_margin: "0px 0px -50px 0px".to_string(),
        }
    }
}

/// Called once per element the first time it enters the viewport, with the
/// element's index in the batch of visibility changes reported together.
pub type EnterCallback<E> = Rc<dyn Fn(E, usize)>;

/// A live viewport observation.
pub trait ViewportObserver {
    /// Stop observing every remaining element.
    fn disconnect(&self);
}

/// The page as a whole.
pub trait Document: Clone + 'static {
    type Element: Element;
    type Observer: ViewportObserver;

    fn element_by_id(&self, id: &str) -> Option<Self::Element>;
    fn query_selector(&self, selector: &str) -> Option<Self::Element>;
    /// All matching elements in document order.
    fn query_selector_all(&self, selector: &str) -> Vec<Self::Element>;

    /// Whether the user asked for reduced motion.
    fn prefers_reduced_motion(&self) -> bool;

    /// Register a listener on the window (`beforeunload`, `error`).
    fn on_window(&self, kind: EventKind, listener: Listener) -> Result<()>;

    /// Watch `targets` and call `on_enter` the first time each one becomes
    /// visible. Each element fires at most once and is then unobserved.
    ///
    /// Returns `Ok(None)` when the environment has no viewport observer.
    fn observe_viewport(
        &self,
        targets: &[Self::Element],
        options: &ViewportOptions,
        on_enter: EnterCallback<Self::Element>,
    ) -> Result<Option<Self::Observer>>;
}
