//! Global constants for the demo widget: the page contract.

/// Selectors and ids the demo expects the landing page to provide.
pub mod dom {
    /// Tab selector controls, each carrying [`TAB_ATTRIBUTE`]
    pub const TAB_SELECTOR: &str = ".demo-tab";
    /// Attribute naming the panel a tab selector activates
    pub const TAB_ATTRIBUTE: &str = "data-tab";
    /// Tab panels; a panel's element id is its tab identifier
    pub const PANEL_SELECTOR: &str = ".demo-content";

    pub const QUESTION_SELECTOR: &str = ".demo-question";
    pub const COMPLEXITY_DOT_SELECTOR: &str = ".complexity-dot";
    pub const CODE_ID: &str = "demo-sql";
    pub const SUCCESS_ID: &str = "success-indicator";
    pub const NEXT_BUTTON_ID: &str = "demo-next";
    pub const RUN_DEMO_BUTTON_ID: &str = "run-demo-btn";
    pub const SETUP_LINK_SELECTOR: &str = "a[href=\"#setup\"]";
    pub const DEMO_CARD_SELECTOR: &str = ".demo-card";
    pub const FEATURE_CARD_SELECTOR: &str = ".feature-card";
    pub const VIDEO_PLACEHOLDER_SELECTOR: &str = ".video-placeholder";
    pub const VIDEO_FRAME_SELECTOR: &str = "iframe[src*=\"youtube\"]";
    pub const VIDEO_FALLBACK_SELECTOR: &str = ".video-fallback";
    /// `<script type="application/json">` holding a [`crate::config::DemoConfig`]
    pub const CONFIG_ID: &str = "demo-config";
}

/// Class names toggled by the demo.
pub mod class {
    pub const ACTIVE: &str = "active";
    pub const UPDATED: &str = "updated";
    pub const FILLED: &str = "filled";
    pub const TYPING: &str = "typing";
    pub const SHOW: &str = "show";
    pub const ANIMATE: &str = "animate";
}

/// Tab identifiers the demo switches to on its own.
pub mod tab {
    pub const LIVE_DEMO: &str = "live-demo";
    pub const SETUP_GUIDE: &str = "setup-guide";
}

/// Number of complexity dots on the page, and the highest complexity rating.
pub const MAX_COMPLEXITY: u8 = 3;

/// Accessibility attribute mirroring a tab's selection state
pub const ARIA_SELECTED: &str = "aria-selected";
