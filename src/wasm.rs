use std::cell::RefCell;
use std::rc::Rc;

use qw_dom::web::{WebDocument, WebScheduler, js_error_text};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::analytics::{AnalyticsEvent, AnalyticsSink};
use crate::config::DemoConfig;
use crate::controller::DemoController;
use crate::error::DemoError;
use crate::page::boot;

thread_local! {
    /// The mounted demo; its listeners only hold weak references to it
    static DEMO: RefCell<Option<DemoController<WebDocument, WebScheduler>>> = const { RefCell::new(None) };
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();

    if let Err(e) = console_log::init_with_level(log::Level::Trace) {
        web_sys::console::warn_1(&format!("Logger already set: {}", e).into());
    }

    if let Err(e) = mount_demo() {
        log::error!("QueryWeaver demo not started: {}", e);
    }
}

fn mount_demo() -> Result<(), DemoError> {
    let window = web_sys::window().ok_or(DemoError::NoWindow)?;
    let doc = WebDocument::new(window.clone()).ok_or(DemoError::NoDocument)?;

    let config = DemoConfig::from_page(&doc);
    log::set_max_level(config.log_level.to_level_filter());

    let demo = boot(
        doc,
        WebScheduler::new(window),
        config,
        Rc::new(GtagSink),
    );
    DEMO.with(|slot| *slot.borrow_mut() = Some(demo));
    Ok(())
}

/// Forwards events to the page's global `gtag` function, when there is one.
struct GtagSink;

impl AnalyticsSink for GtagSink {
    fn track(&self, event: &AnalyticsEvent) {
        let global = js_sys::global();
        let Ok(gtag) = js_sys::Reflect::get(&global, &JsValue::from_str("gtag")) else {
            return;
        };
        let Some(gtag) = gtag.dyn_ref::<js_sys::Function>() else {
            log::trace!("No gtag on the page, dropping {}", event.name());
            return;
        };

        let params = match js_sys::JSON::parse(&event.params().to_string()) {
            Ok(params) => params,
            Err(e) => {
                log::warn!("Could not encode {} params: {}", event.name(), js_error_text(&e));
                return;
            }
        };

        if let Err(e) = gtag.call3(
            &JsValue::NULL,
            &JsValue::from_str("event"),
            &JsValue::from_str(event.name()),
            &params,
        ) {
            log::warn!("gtag rejected {}: {}", event.name(), js_error_text(&e));
        }
    }
}
