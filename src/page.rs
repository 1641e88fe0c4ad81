//! Page-level wiring around the demo controller.

use std::rc::Rc;

use qw_dom::{Document, DomError, DomEvent, Element, EventKind, Propagation, Scheduler, listener};

use crate::analytics::AnalyticsSink;
use crate::config::DemoConfig;
use crate::constants::{class, dom};
use crate::controller::DemoController;

/// Mount the demo on `doc` and hook up the page-wide listeners.
///
/// Listener failures here are logged and skipped; they never take the demo
/// down.
pub fn boot<D: Document, S: Scheduler>(
    doc: D,
    scheduler: S,
    config: DemoConfig,
    analytics: Rc<dyn AnalyticsSink>,
) -> DemoController<D, S> {
    let demo = DemoController::new(doc.clone(), scheduler, config, analytics);
    demo.mount();

    if let Err(e) = doc.on_window(EventKind::BeforeUnload, demo.teardown_listener()) {
        log::warn!("Could not bind teardown: {}", e);
    }
    if let Err(e) = bind_error_logging(&doc) {
        log::warn!("Could not bind error logging: {}", e);
    }
    if let Err(e) = bind_video_fallbacks(&doc) {
        log::warn!("Could not bind video fallbacks: {}", e);
    }

    demo
}

/// Log uncaught page errors.
pub fn bind_error_logging<D: Document>(doc: &D) -> Result<(), DomError> {
    doc.on_window(
        EventKind::Error,
        listener(|event| {
            if let DomEvent::Error { message } = event {
                log::error!(
                    "Uncaught error: {}",
                    message.as_deref().unwrap_or("<no message>")
                );
            }
            Propagation::Continue
        }),
    )
}

/// When an embedded video fails to load, hide it and show the fallback
/// next to it.
pub fn bind_video_fallbacks<D: Document>(doc: &D) -> Result<(), DomError> {
    for frame in doc.query_selector_all(dom::VIDEO_FRAME_SELECTOR) {
        let target = frame.clone();
        frame.on(
            EventKind::Error,
            listener(move |_| {
                let fallback = target
                    .parent()
                    .and_then(|parent| parent.query_selector(dom::VIDEO_FALLBACK_SELECTOR));
                if let Some(fallback) = fallback {
                    fallback.add_class(class::SHOW);
                    target.hide();
                }
                Propagation::Continue
            }),
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::LogSink;
    use crate::landing::demo_page;
    use qw_dom::{ManualScheduler, MemoryDocument, MemoryElement};

    #[test]
    fn test_boot_mounts_and_tears_down() {
        let doc = demo_page();
        let demo = boot(
            doc.clone(),
            ManualScheduler::new(),
            DemoConfig::default(),
            Rc::new(LogSink),
        );
        assert!(demo.is_typing());

        doc.dispatch_window(&DomEvent::BeforeUnload);
        assert!(!demo.is_typing());
    }

    #[test]
    fn test_video_error_shows_fallback() {
        let doc = demo_page();
        bind_video_fallbacks(&doc).unwrap();

        let frame = doc.query_selector(dom::VIDEO_FRAME_SELECTOR).unwrap();
        let fallback = doc.query_selector(dom::VIDEO_FALLBACK_SELECTOR).unwrap();
        assert!(!fallback.has_class(class::SHOW));

        frame.dispatch(&DomEvent::Error { message: None });
        assert!(fallback.has_class(class::SHOW));
        assert!(frame.is_hidden());
    }

    #[test]
    fn test_video_error_without_fallback_keeps_frame() {
        let doc = MemoryDocument::new();
        let frame = MemoryElement::new("iframe").with_attribute("src", "https://youtube.com/x");
        doc.body().append_child(&MemoryElement::new("div").with_child(frame.clone()));
        bind_video_fallbacks(&doc).unwrap();

        frame.dispatch(&DomEvent::Error { message: None });
        assert!(!frame.is_hidden());
    }

    #[test]
    fn test_error_logging_does_not_intercept() {
        let doc = MemoryDocument::new();
        bind_error_logging(&doc).unwrap();
        let outcome = doc.dispatch_window(&DomEvent::Error {
            message: Some("boom".to_string()),
        });
        assert_eq!(outcome, Propagation::Continue);
    }

    #[test]
    fn test_boot_survives_failed_mount() {
        let doc = demo_page();
        doc.element_by_id(dom::RUN_DEMO_BUTTON_ID)
            .unwrap()
            .reject_listeners();

        let demo = boot(
            doc.clone(),
            ManualScheduler::new(),
            DemoConfig::default(),
            Rc::new(LogSink),
        );
        assert!(!demo.is_typing());
        let card = doc.query_selector(dom::DEMO_CARD_SELECTOR).unwrap();
        assert!(card.inner_html().contains("error-fallback"));
    }
}
