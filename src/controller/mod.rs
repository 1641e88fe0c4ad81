//! The demo controller.
//!
//! [`DemoController`] wires the page's tabs, buttons and cards to the
//! example cycler and the SQL reveal animation. It is a cheap handle over
//! shared state; every listener and timer it registers holds only a weak
//! reference back to it.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use qw_dom::{
    Document, DomError, DomEvent, Element, EventKind, Listener, Propagation, Scheduler, listener,
};

use crate::analytics::{AnalyticsEvent, AnalyticsSink};
use crate::catalog::{self, Example};
use crate::config::DemoConfig;
use crate::constants::{ARIA_SELECTED, class, dom, tab};
use crate::error::DemoError;
use crate::highlight::{escape_attribute, highlight_markup};
use crate::reveal::{Frame, Reveal, typing_interval};
use crate::state::DemoState;
use crate::viewport::ViewportAnimator;


struct Inner<D: Document, S: Scheduler> {
    doc: D,
    scheduler: S,
    config: DemoConfig,
    analytics: Rc<dyn AnalyticsSink>,
    state: RefCell<DemoState>,
    viewport: RefCell<Option<ViewportAnimator<D>>>,
}

/// Drives the QueryWeaver demo on one page.
pub struct DemoController<D: Document, S: Scheduler> {
    inner: Rc<Inner<D, S>>,
}

impl<D: Document, S: Scheduler> Clone for DemoController<D, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<D: Document, S: Scheduler> DemoController<D, S> {
    pub fn new(
        doc: D,
        scheduler: S,
        config: DemoConfig,
        analytics: Rc<dyn AnalyticsSink>,
    ) -> Self {
        Self {
            inner: Rc::new(Inner {
                doc,
                scheduler,
                config,
                analytics,
                state: RefCell::new(DemoState::new()),
                viewport: RefCell::new(None),
            }),
        }
    }

    fn from_weak(weak: &Weak<Inner<D, S>>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Initialise the demo, or replace it with the error panel when that
    /// fails. Returns whether the demo is live.
    pub fn mount(&self) -> bool {
        match self.init() {
            Ok(()) => {
                log::info!("QueryWeaver demo mounted");
                true
            }
            Err(e) => {
                log::error!("Failed to initialize demo: {}", e);
                self.show_error_fallback();
                false
            }
        }
    }

    pub fn init(&self) -> Result<(), DemoError> {
        self.init_tabs()?;
        self.init_demo_buttons()?;
        self.bind_page_links()?;
        self.init_viewport()?;
        self.start();
        Ok(())
    }

    /// Show the first example.
    pub fn start(&self) {
        self.inner.state.borrow_mut().current_index = 0;
        let example = catalog::example(0);
        self.update_question(example);
        self.type_sql(example.sql);
    }

    /// Stop the reveal timer and the viewport observer.
    pub fn destroy(&self) {
        self.cancel_reveal();
        let animator = self.inner.viewport.borrow_mut().take();
        if let Some(mut animator) = animator {
            animator.disconnect();
        }
        log::info!("QueryWeaver demo torn down");
    }

    /// Listener that calls [`DemoController::destroy`], for `beforeunload`.
    pub fn teardown_listener(&self) -> Listener {
        self.handler(|demo, _| {
            demo.destroy();
            Propagation::Continue
        })
    }

    // ========================================================================
    // Binding
    // ========================================================================

    fn init_tabs(&self) -> Result<(), DomError> {
        let tabs = self.inner.doc.query_selector_all(dom::TAB_SELECTOR);

        let initial = tabs
            .iter()
            .find(|t| t.has_class(class::ACTIVE))
            .and_then(|t| t.attribute(dom::TAB_ATTRIBUTE));
        self.inner.state.borrow_mut().active_tab = initial;

        for selector in &tabs {
            let Some(id) = selector.attribute(dom::TAB_ATTRIBUTE) else {
                log::warn!("Tab selector without {} attribute", dom::TAB_ATTRIBUTE);
                continue;
            };
            selector.on(
                EventKind::Click,
                self.handler(move |demo, _| {
                    demo.switch_to_tab(&id);
                    Propagation::Continue
                }),
            )?;
            forward_activation_keys(selector)?;
        }
        Ok(())
    }

    fn init_demo_buttons(&self) -> Result<(), DomError> {
        let doc = &self.inner.doc;

        if let Some(next) = doc.element_by_id(dom::NEXT_BUTTON_ID) {
            next.on(
                EventKind::Click,
                self.handler(|demo, _| {
                    demo.advance();
                    Propagation::Continue
                }),
            )?;
        }

        if let Some(run) = doc.element_by_id(dom::RUN_DEMO_BUTTON_ID) {
            run.on(
                EventKind::Click,
                self.handler(|demo, _| {
                    demo.switch_to_tab(tab::LIVE_DEMO);
                    demo.scroll_to_demo_card();
                    demo.track(AnalyticsEvent::DemoStarted);
                    Propagation::PreventDefault
                }),
            )?;
        }
        Ok(())
    }

    fn bind_page_links(&self) -> Result<(), DomError> {
        let doc = &self.inner.doc;

        if let Some(link) = doc.query_selector(dom::SETUP_LINK_SELECTOR) {
            link.on(
                EventKind::Click,
                self.handler(|demo, _| {
                    demo.switch_to_tab(tab::SETUP_GUIDE);
                    demo.scroll_to_demo_card();
                    Propagation::PreventDefault
                }),
            )?;
        }

        for placeholder in doc.query_selector_all(dom::VIDEO_PLACEHOLDER_SELECTOR) {
            forward_activation_keys(&placeholder)?;
        }
        Ok(())
    }

    fn init_viewport(&self) -> Result<(), DomError> {
        let animator = ViewportAnimator::attach(
            &self.inner.doc,
            &self.inner.scheduler,
            &self.inner.config.viewport,
        )?;
        *self.inner.viewport.borrow_mut() = Some(animator);
        Ok(())
    }

    /// Wrap `f` as a listener that does nothing once the controller is gone.
    fn handler<F>(&self, f: F) -> Listener
    where
        F: Fn(&Self, &DomEvent) -> Propagation + 'static,
    {
        let weak = Rc::downgrade(&self.inner);
        listener(move |event| match Self::from_weak(&weak) {
            Some(demo) => f(&demo, event),
            None => Propagation::Continue,
        })
    }

    // ========================================================================
    // Tabs
    // ========================================================================

    /// Activate the selector/panel pair for `id`.
    ///
    /// Unknown identifiers leave the current pair active and return false.
    pub fn switch_to_tab(&self, id: &str) -> bool {
        let doc = &self.inner.doc;
        let selectors = doc.query_selector_all(dom::TAB_SELECTOR);
        let panels = doc.query_selector_all(dom::PANEL_SELECTOR);

        let target_selector = selectors
            .iter()
            .find(|s| s.attribute(dom::TAB_ATTRIBUTE).as_deref() == Some(id));
        let target_panel = panels
            .iter()
            .find(|p| p.attribute("id").as_deref() == Some(id));

        let (Some(target_selector), Some(target_panel)) = (target_selector, target_panel) else {
            log::warn!("No tab named '{}'", id);
            return false;
        };

        for selector in &selectors {
            selector.remove_class(class::ACTIVE);
            selector.set_attribute(ARIA_SELECTED, "false");
        }
        for panel in &panels {
            panel.remove_class(class::ACTIVE);
        }

        target_selector.add_class(class::ACTIVE);
        target_selector.set_attribute(ARIA_SELECTED, "true");
        target_panel.add_class(class::ACTIVE);

        self.inner.state.borrow_mut().active_tab = Some(id.to_string());
        log::debug!("Switched to tab '{}'", id);
        true
    }

    /// Scroll the demo card to the centre of the viewport after a short delay.
    pub fn scroll_to_demo_card(&self) {
        let Some(card) = self.inner.doc.query_selector(dom::DEMO_CARD_SELECTOR) else {
            return;
        };
        self.schedule(self.inner.config.timing.scroll_delay(), move || {
            card.scroll_into_view();
        });
    }

    // ========================================================================
    // Example cycling
    // ========================================================================

    /// Move to the next example. Ignored while a reveal is running.
    pub fn advance(&self) -> bool {
        let index = {
            let mut state = self.inner.state.borrow_mut();
            if state.is_typing {
                log::debug!("Reveal in progress, ignoring advance");
                return false;
            }
            state.current_index = catalog::next_index(state.current_index);
            state.current_index
        };

        log::debug!("Advancing to example {}", index);
        let example = catalog::example(index);
        self.update_question(example);
        self.type_sql(example.sql);
        self.track(AnalyticsEvent::QuestionChanged { index });
        true
    }

    fn update_question(&self, example: &Example) {
        let doc = &self.inner.doc;
        let timing = &self.inner.config.timing;

        if let Some(question) = doc.query_selector(dom::QUESTION_SELECTOR) {
            question.set_text_content(example.question);
            question.add_class(class::UPDATED);

            let pulsed = question.clone();
            self.schedule(timing.question_pulse(), move || {
                pulsed.remove_class(class::UPDATED);
            });

            // Focus briefly so screen readers announce the new question
            let scheduler = self.inner.scheduler.clone();
            let blur_delay = timing.blur_delay();
            self.schedule(timing.focus_delay(), move || {
                question.focus();
                let blurred = question.clone();
                if let Err(e) = scheduler.set_timeout(blur_delay, move || blurred.blur()) {
                    log::warn!("Could not schedule question blur: {}", e);
                }
            });
        } else {
            log::warn!("No {} element on the page", dom::QUESTION_SELECTOR);
        }

        let complexity = usize::from(example.complexity);
        for (i, dot) in doc
            .query_selector_all(dom::COMPLEXITY_DOT_SELECTOR)
            .iter()
            .enumerate()
        {
            if i < complexity {
                dot.add_class(class::FILLED);
            } else {
                dot.remove_class(class::FILLED);
            }
        }
    }

    // ========================================================================
    // Reveal
    // ========================================================================

    /// Reveal `sql` in the code display, replacing any reveal in flight.
    pub fn type_sql(&self, sql: &str) {
        let doc = &self.inner.doc;
        let Some(code) = doc.element_by_id(dom::CODE_ID) else {
            log::warn!("No #{} element, skipping reveal", dom::CODE_ID);
            return;
        };

        if let Some(success) = doc.element_by_id(dom::SUCCESS_ID) {
            success.remove_class(class::SHOW);
        }
        self.cancel_reveal();
        code.set_inner_html("");

        if doc.prefers_reduced_motion() {
            code.remove_class(class::TYPING);
            code.set_inner_html(&highlight_markup(sql));
            self.show_success_after(self.inner.config.timing.success_delay(true));
            return;
        }

        code.add_class(class::TYPING);
        let mut reveal = Reveal::new(sql);
        let period = typing_interval(reveal.len(), &self.inner.config.typing);

        let weak = Rc::downgrade(&self.inner);
        let target = code.clone();
        let started = self.inner.scheduler.set_interval(period, move || {
            let Some(demo) = Self::from_weak(&weak) else {
                return;
            };
            match reveal.tick() {
                Frame::Partial(markup) => target.set_inner_html(&markup),
                Frame::Complete(markup) => demo.finish_reveal(&target, &markup),
            }
        });

        match started {
            Ok(timer) => {
                self.inner.state.borrow_mut().begin_reveal(timer);
                log::debug!("Revealing {} chars every {:?}", sql.chars().count(), period);
            }
            Err(e) => {
                log::warn!("Could not start reveal timer: {}", e);
                self.finish_reveal(&code, &highlight_markup(sql));
            }
        }
    }

    /// Stop the running reveal, if any, leaving the display as it is. A
    /// success indicator still waiting to appear is dropped as well.
    pub fn cancel_reveal(&self) {
        let (timer, success) = {
            let mut state = self.inner.state.borrow_mut();
            (state.finish_reveal(), state.success_timer.take())
        };
        if let Some(timer) = timer {
            self.inner.scheduler.clear(timer);
            log::debug!("Cancelled reveal timer {:?}", timer);
        }
        if let Some(timer) = success {
            self.inner.scheduler.clear(timer);
        }
    }

    fn finish_reveal(&self, code: &D::Element, markup: &str) {
        self.cancel_reveal();
        code.remove_class(class::TYPING);
        code.set_inner_html(markup);
        self.show_success_after(self.inner.config.timing.success_delay(false));
        log::debug!("Reveal finished");
    }

    fn show_success_after(&self, delay: Duration) {
        let Some(success) = self.inner.doc.element_by_id(dom::SUCCESS_ID) else {
            return;
        };

        let weak = Rc::downgrade(&self.inner);
        let scheduled = self.inner.scheduler.set_timeout(delay, move || {
            if let Some(inner) = weak.upgrade() {
                inner.state.borrow_mut().success_timer = None;
            }
            success.add_class(class::SHOW);
        });

        match scheduled {
            Ok(timer) => self.inner.state.borrow_mut().success_timer = Some(timer),
            Err(e) => log::warn!("Could not schedule success indicator: {}", e),
        }
    }

    // ========================================================================
    // Fallback
    // ========================================================================

    /// Replace the demo card with a static error panel.
    pub fn show_error_fallback(&self) {
        match self.inner.doc.query_selector(dom::DEMO_CARD_SELECTOR) {
            Some(card) => card.set_inner_html(&fallback_markup(&self.inner.config.fallback_url)),
            None => log::warn!("No {} to show the error panel in", dom::DEMO_CARD_SELECTOR),
        }
    }

    // ========================================================================
    // Helpers and accessors
    // ========================================================================

    fn schedule<F>(&self, delay: Duration, task: F)
    where
        F: FnOnce() + 'static,
    {
        if let Err(e) = self.inner.scheduler.set_timeout(delay, task) {
            log::warn!("Could not schedule task: {}", e);
        }
    }

    fn track(&self, event: AnalyticsEvent) {
        self.inner.analytics.track(&event);
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> DemoState {
        self.inner.state.borrow().clone()
    }

    pub fn is_typing(&self) -> bool {
        self.inner.state.borrow().is_typing
    }

    pub fn current_index(&self) -> usize {
        self.inner.state.borrow().current_index
    }

    pub fn current_example(&self) -> &'static Example {
        catalog::example(self.current_index())
    }

    pub fn config(&self) -> &DemoConfig {
        &self.inner.config
    }

    pub fn document(&self) -> &D {
        &self.inner.doc
    }

    pub fn scheduler(&self) -> &S {
        &self.inner.scheduler
    }
}

/// Make `Enter` and `Space` on `element` act as a click.
fn forward_activation_keys<E: Element>(element: &E) -> Result<(), DomError> {
    let target = element.clone();
    element.on(
        EventKind::KeyDown,
        listener(move |event| {
            if event.is_activation_key() {
                target.click();
                Propagation::PreventDefault
            } else {
                Propagation::Continue
            }
        }),
    )
}

/// Markup of the panel shown when the demo cannot start.
pub fn fallback_markup(url: &str) -> String {
    format!(
        "<div class=\"error-fallback\">\
         <h3>Demo Temporarily Unavailable</h3>\
         <p>Please try refreshing the page or <a href=\"{}\">visit our GitHub</a> \
         for more information.</p>\
         </div>",
        escape_attribute(url)
    )
}
