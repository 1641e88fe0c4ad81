//! An in-memory copy of the landing page markup the demo binds to.

use qw_dom::{MemoryDocument, MemoryElement};

use crate::constants::{MAX_COMPLEXITY, dom, tab};

/// Build the landing page skeleton: tab bar and panels, the demo card, the
/// feature cards and the video section.
pub fn demo_page() -> MemoryDocument {
    let doc = MemoryDocument::new();
    let body = doc.body();

    body.append_child(
        &MemoryElement::new("nav")
            .with_class("demo-tabs")
            .with_attribute("role", "tablist")
            .with_child(tab_button(tab::LIVE_DEMO, "Live Demo", true))
            .with_child(tab_button(tab::SETUP_GUIDE, "Setup Guide", false)),
    );

    body.append_child(
        &MemoryElement::new("a")
            .with_class("btn")
            .with_id(dom::RUN_DEMO_BUTTON_ID)
            .with_attribute("href", "#demo")
            .with_text("Run the demo"),
    );
    body.append_child(
        &MemoryElement::new("a")
            .with_attribute("href", "#setup")
            .with_text("Set up QueryWeaver"),
    );

    body.append_child(
        &MemoryElement::new("section")
            .with_class("demo-content")
            .with_class("active")
            .with_id(tab::LIVE_DEMO)
            .with_child(demo_card()),
    );
    body.append_child(
        &MemoryElement::new("section")
            .with_class("demo-content")
            .with_id(tab::SETUP_GUIDE)
            .with_child(MemoryElement::new("ol").with_text("pip install queryweaver")),
    );

    let features = MemoryElement::new("section").with_class("features");
    for title in ["Graph-powered schema", "Any SQL database", "Explainable queries"] {
        features.append_child(
            &MemoryElement::new("div")
                .with_class("feature-card")
                .with_child(MemoryElement::new("h3").with_text(title)),
        );
    }
    body.append_child(&features);

    body.append_child(
        &MemoryElement::new("section")
            .with_class("video")
            .with_child(
                MemoryElement::new("div")
                    .with_class("video-placeholder")
                    .with_attribute("tabindex", "0")
                    .with_attribute("role", "button"),
            )
            .with_child(
                MemoryElement::new("div")
                    .with_class("video-wrapper")
                    .with_child(
                        MemoryElement::new("iframe")
                            .with_attribute("src", "https://www.youtube.com/embed/queryweaver"),
                    )
                    .with_child(
                        MemoryElement::new("div")
                            .with_class("video-fallback")
                            .with_text("Video unavailable"),
                    ),
            ),
    );

    doc
}

fn tab_button(id: &str, label: &str, active: bool) -> MemoryElement {
    let button = MemoryElement::new("button")
        .with_class("demo-tab")
        .with_attribute(dom::TAB_ATTRIBUTE, id)
        .with_attribute("role", "tab")
        .with_attribute("aria-selected", if active { "true" } else { "false" })
        .with_text(label);
    if active {
        button.with_class("active")
    } else {
        button
    }
}

fn demo_card() -> MemoryElement {
    let dots = MemoryElement::new("div").with_class("complexity");
    for _ in 0..MAX_COMPLEXITY {
        dots.append_child(&MemoryElement::new("span").with_class("complexity-dot"));
    }

    MemoryElement::new("div")
        .with_class("demo-card")
        .with_child(
            MemoryElement::new("p")
                .with_class("demo-question")
                .with_attribute("tabindex", "-1"),
        )
        .with_child(dots)
        .with_child(
            MemoryElement::new("pre").with_child(MemoryElement::new("code").with_id(dom::CODE_ID)),
        )
        .with_child(
            MemoryElement::new("div")
                .with_id(dom::SUCCESS_ID)
                .with_text("Query generated"),
        )
        .with_child(
            MemoryElement::new("button")
                .with_id(dom::NEXT_BUTTON_ID)
                .with_text("Try another question"),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use qw_dom::{Document, Element};

    #[test]
    fn test_page_provides_demo_contract() {
        let doc = demo_page();
        assert_eq!(doc.query_selector_all(dom::TAB_SELECTOR).len(), 2);
        assert_eq!(doc.query_selector_all(dom::PANEL_SELECTOR).len(), 2);
        assert_eq!(
            doc.query_selector_all(dom::COMPLEXITY_DOT_SELECTOR).len(),
            usize::from(MAX_COMPLEXITY)
        );
        assert_eq!(doc.query_selector_all(dom::FEATURE_CARD_SELECTOR).len(), 3);
        for id in [
            dom::CODE_ID,
            dom::SUCCESS_ID,
            dom::NEXT_BUTTON_ID,
            dom::RUN_DEMO_BUTTON_ID,
        ] {
            assert!(doc.element_by_id(id).is_some(), "missing #{id}");
        }
        assert!(doc.query_selector(dom::SETUP_LINK_SELECTOR).is_some());
        assert!(doc.query_selector(dom::VIDEO_FRAME_SELECTOR).is_some());
    }

    #[test]
    fn test_live_demo_tab_starts_active() {
        let doc = demo_page();
        let active = doc.query_selector(".demo-tab.active").unwrap();
        assert_eq!(active.attribute(dom::TAB_ATTRIBUTE).as_deref(), Some(tab::LIVE_DEMO));
        assert!(doc.element_by_id(tab::LIVE_DEMO).unwrap().has_class("active"));
    }

    #[test]
    fn test_video_fallback_is_frame_sibling() {
        let doc = demo_page();
        let frame = doc.query_selector(dom::VIDEO_FRAME_SELECTOR).unwrap();
        let wrapper = frame.parent().unwrap();
        assert!(wrapper.query_selector(dom::VIDEO_FALLBACK_SELECTOR).is_some());
    }
}
