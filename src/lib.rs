//! content-tabs - progressive enhancement that folds heading-sectioned
//! content into an accessible tabbed interface.
//!
//! The crate splits into a host-agnostic core and a thin browser shell. The
//! core ([`section`] parsing plus the [`controller`] state machine) talks to
//! the document through the [`dom::HostDom`] seam and is exercised by plain
//! unit tests against an in-memory document. The shell ([`widget`]) plugs in
//! `web-sys`, owns the listener closures and emits `tabs:change` events.
//!
//! Enhancement is markup-driven: any element carrying `data-tabs` is
//! upgraded at module start, or host code calls [`enhance`] directly and
//! drives the widget through the returned [`TabsHandle`].

use wasm_bindgen::prelude::*;

pub mod config;
pub mod constants;
pub mod controller;
pub mod dom;
pub mod events;
pub mod ids;
pub mod section;
pub mod widget;


pub use widget::{enhance, enhance_all, TabsHandle};

/// Module entry point: install readable panic reporting, then upgrade every
/// `[data-tabs]` element already present in the document.
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let upgraded = widget::enhance_all();
    if upgraded > 0 {
        web_sys::console::log_1(
            &format!("content-tabs: upgraded {} host element(s)", upgraded).into(),
        );
    }
    Ok(())
}
