//! DOM events as seen by listeners.

use std::rc::Rc;

/// The event types the demo listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    KeyDown,
    /// Resource load failure on an element, or an uncaught error on the window
    Error,
    BeforeUnload,
}

impl EventKind {
    /// The DOM event name used with `addEventListener`.
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::Click => "click",
            EventKind::KeyDown => "keydown",
            EventKind::Error => "error",
            EventKind::BeforeUnload => "beforeunload",
        }
    }
}

/// A backend-neutral event delivered to a [`Listener`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomEvent {
    Click,
    KeyDown {
        /// `KeyboardEvent.key`, e.g. `"Enter"` or `" "`
        key: String,
    },
    Error {
        /// Message of the underlying `ErrorEvent`, when there is one
        message: Option<String>,
    },
    BeforeUnload,
}

impl DomEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            DomEvent::Click => EventKind::Click,
            DomEvent::KeyDown { .. } => EventKind::KeyDown,
            DomEvent::Error { .. } => EventKind::Error,
            DomEvent::BeforeUnload => EventKind::BeforeUnload,
        }
    }

    /// Shorthand for building a keydown event.
    pub fn key_down(key: impl Into<String>) -> Self {
        DomEvent::KeyDown { key: key.into() }
    }

    /// True for `Enter` and `Space` keydowns, the keys that activate a
    /// focused control.
    pub fn is_activation_key(&self) -> bool {
        matches!(self, DomEvent::KeyDown { key } if key == "Enter" || key == " ")
    }
}

/// What a listener wants done with the event after it ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Propagation {
    #[default]
    Continue,
    PreventDefault,
}

/// Event handler registered on an element or the window.
pub type Listener = Rc<dyn Fn(&DomEvent) -> Propagation>;

/// Wrap a closure as a [`Listener`].
pub fn listener<F>(f: F) -> Listener
where
    F: Fn(&DomEvent) -> Propagation + 'static,
{
    Rc::new(f)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activation_keys() {
        assert!(DomEvent::key_down("Enter").is_activation_key());
        assert!(DomEvent::key_down(" ").is_activation_key());
        assert!(!DomEvent::key_down("Tab").is_activation_key());
        assert!(!DomEvent::Click.is_activation_key());
    }

    #[test]
    fn test_event_names() {
        assert_eq!(DomEvent::Click.kind().name(), "click");
        assert_eq!(DomEvent::key_down("a").kind().name(), "keydown");
        assert_eq!(EventKind::BeforeUnload.name(), "beforeunload");
    }
}
