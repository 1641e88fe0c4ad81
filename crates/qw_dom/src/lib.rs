//! qw_dom - page abstraction for the QueryWeaver demo widget.
//!
//! The demo controller never touches `web_sys` directly. It talks to a
//! [`Document`] and a [`Scheduler`], which come in two flavours:
//!
//! - the browser backend in [`web`] (wasm32 only), wrapping the real DOM,
//!   `setTimeout`/`setInterval` and `IntersectionObserver`
//! - the in-memory backend in [`memory`] plus [`ManualScheduler`], used by
//!   tests and by the native terminal player

pub mod document;
pub mod error;
pub mod event;
pub mod memory;
pub mod scheduler;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use document::{Document, Element, EnterCallback, ViewportObserver, ViewportOptions};
pub use error::{DomError, Result};
pub use event::{DomEvent, EventKind, Listener, Propagation, listener};
pub use memory::{MemoryDocument, MemoryElement, MemoryObserver};
pub use scheduler::{ManualScheduler, Scheduler, TimerId};
