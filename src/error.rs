//! Errors raised while mounting the demo.

use qw_dom::DomError;

#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    /// No global `window` (e.g. running in a worker)
    #[error("No window object available")]
    NoWindow,

    #[error("Window has no document")]
    NoDocument,

    #[error("DOM error: {0}")]
    Dom(#[from] DomError),
}
