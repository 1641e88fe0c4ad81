use thiserror::Error;

/// Errors raised by page backends.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    #[error("Failed to register '{event}' listener: {reason}")]
    Listener {
        /// DOM event name
        event: &'static str,
        /// Backend-provided reason
        reason: String,
    },

    #[error("Failed to schedule timer: {0}")]
    Timer(String),

    #[error("Failed to create viewport observer: {0}")]
    Observer(String),

    #[error("JavaScript exception: {0}")]
    Js(String),
}

pub type Result<T> = std::result::Result<T, DomError>;
