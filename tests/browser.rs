//! In-browser integration tests (wasm-pack test --headless). The unit suite
//! already covers the state machine over the in-memory document; these runs
//! prove the `web-sys` adapter and the listener wiring against a real DOM.

#![cfg(target_arch = "wasm32")]

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;
use web_sys::{CustomEvent, Document, Element, Event, HtmlElement, KeyboardEvent, KeyboardEventInit};

use content_tabs::config::TabsConfig;
use content_tabs::controller::TabController;
use content_tabs::dom::browser::BrowserDom;
use content_tabs::enhance;
use content_tabs::ids::SequentialIds;

wasm_bindgen_test_configure!(run_in_browser);

fn document() -> Document {
    web_sys::window().unwrap().document().unwrap()
}

/// Mount a detached host with the given markup into the page body.
fn mount_host(html: &str) -> Element {
    let document = document();
    let host = document.create_element("div").unwrap();
    host.set_inner_html(html);
    document.body().unwrap().append_child(&host).unwrap();
    host
}

/// Resolve after one animation frame - enough for a scheduled build to run.
async fn next_frame() {
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        web_sys::window()
            .unwrap()
            .request_animation_frame(&resolve)
            .unwrap();
    });
    let _ = JsFuture::from(promise).await;
}

fn keydown(key: &str) -> KeyboardEvent {
    let mut init = KeyboardEventInit::new();
    init.key(key);
    KeyboardEvent::new_with_keyboard_event_init_dict("keydown", &init).unwrap()
}

// ---------------------------------------------------------------------------
// Controller over the real document (synchronous, no enhancement glue)
// ---------------------------------------------------------------------------

#[wasm_bindgen_test]
fn controller_builds_aria_structure() {
    let host = mount_host("<h2>Alpha</h2><p>one</p><h2 id=\"beta\">Beta</h2><p>two</p>");
    let dom = BrowserDom::new(document());
    let config = TabsConfig::default();
    let mut ctl = TabController::new(
        dom,
        host.clone().into(),
        config,
        Box::new(SequentialIds::new()),
    );
    ctl.rebuild();

    assert_eq!(ctl.len(), 2);
    assert_eq!(ctl.active_index(), Some(0));

    let tablist = host.query_selector("[role='tablist']").unwrap().unwrap();
    let tabs = tablist.query_selector_all("[role='tab']").unwrap();
    assert_eq!(tabs.length(), 2);
    let panels = host.query_selector_all("[role='tabpanel']").unwrap();
    assert_eq!(panels.length(), 2);

    let first_tab: Element = tabs.item(0).unwrap().dyn_into().unwrap();
    assert_eq!(first_tab.get_attribute("aria-selected").as_deref(), Some("true"));
    assert_eq!(first_tab.get_attribute("tabindex").as_deref(), Some("0"));
    assert_eq!(first_tab.text_content().as_deref(), Some("Alpha"));

    let second_panel: Element = panels.item(1).unwrap().dyn_into().unwrap();
    assert!(second_panel.has_attribute("hidden"));

    // Hash navigation against the real heading id.
    ctl.navigate_to_fragment("beta");
    assert_eq!(ctl.active_index(), Some(1));
    assert!(!second_panel.has_attribute("hidden"));
}

#[wasm_bindgen_test]
fn controller_teardown_restores_markup() {
    let host = mount_host("<h2>Alpha</h2><p>one</p>");
    let before = host.inner_html();
    let dom = BrowserDom::new(document());
    let mut ctl = TabController::new(
        dom,
        host.clone().into(),
        TabsConfig::default(),
        Box::new(SequentialIds::new()),
    );
    ctl.rebuild();
    assert!(host.query_selector("[role='tablist']").unwrap().is_some());

    ctl.teardown();
    assert!(host.query_selector("[role='tablist']").unwrap().is_none());
    assert_eq!(host.inner_html(), before);
}

// ---------------------------------------------------------------------------
// Full enhancement path (deferred build, listeners, events)
// ---------------------------------------------------------------------------

#[wasm_bindgen_test]
async fn enhance_defers_build_to_next_frame() {
    let host = mount_host("<h2>Alpha</h2><p>one</p>");
    let _handle = enhance(host.clone()).unwrap();

    // Nothing generated yet - the build waits for the next paint.
    assert!(host.query_selector("[role='tablist']").unwrap().is_none());

    next_frame().await;
    assert!(host.query_selector("[role='tablist']").unwrap().is_some());
}

#[wasm_bindgen_test]
async fn click_activates_and_emits_change_event() {
    let host = mount_host("<h2>Alpha</h2><p>one</p><h2>Beta</h2><p>two</p>");
    let handle = enhance(host.clone()).unwrap();

    let seen: Rc<RefCell<Vec<(String, u32)>>> = Rc::new(RefCell::new(Vec::new()));
    let listener = {
        let seen = Rc::clone(&seen);
        Closure::wrap(Box::new(move |event: Event| {
            let Some(custom) = event.dyn_ref::<CustomEvent>() else {
                return;
            };
            let detail = custom.detail();
            let tab_id = js_sys::Reflect::get(&detail, &JsValue::from_str("tabId"))
                .ok()
                .and_then(|v| v.as_string())
                .unwrap_or_default();
            let index = js_sys::Reflect::get(&detail, &JsValue::from_str("index"))
                .ok()
                .and_then(|v| v.as_f64())
                .unwrap_or(-1.0) as u32;
            seen.borrow_mut().push((tab_id, index));
        }) as Box<dyn FnMut(Event)>)
    };
    host.add_event_listener_with_callback("tabs:change", listener.as_ref().unchecked_ref())
        .unwrap();
    listener.forget();

    next_frame().await;
    // The initial activation announced itself.
    assert_eq!(seen.borrow().len(), 1);
    assert_eq!(seen.borrow()[0].1, 0);

    let tabs = host.query_selector_all("[role='tab']").unwrap();
    let second: HtmlElement = tabs.item(1).unwrap().dyn_into().unwrap();
    second.click();

    assert_eq!(handle.active_index(), Some(1));
    assert_eq!(seen.borrow().len(), 2);
    let (tab_id, index) = seen.borrow()[1].clone();
    assert_eq!(index, 1);
    assert!(tab_id.ends_with("-tab-1"));

    // Clicking the active tab again is a no-op, no extra event.
    second.click();
    assert_eq!(seen.borrow().len(), 2);
}

#[wasm_bindgen_test]
async fn arrow_keys_rove_focus_and_enter_activates() {
    let host = mount_host("<h2>Alpha</h2><p>one</p><h2>Beta</h2><p>two</p>");
    let handle = enhance(host.clone()).unwrap();
    next_frame().await;

    let tablist = host.query_selector("[role='tablist']").unwrap().unwrap();
    let tabs = host.query_selector_all("[role='tab']").unwrap();
    let first: HtmlElement = tabs.item(0).unwrap().dyn_into().unwrap();
    let second: Element = tabs.item(1).unwrap().dyn_into().unwrap();

    first.focus().unwrap();
    tablist.dispatch_event(&keydown("ArrowRight")).unwrap();

    // Focus roved to the second tab without activating it.
    let active_element = document().active_element().unwrap();
    assert!(active_element.is_same_node(Some(second.unchecked_ref())));
    assert_eq!(handle.active_index(), Some(0));

    tablist.dispatch_event(&keydown("Enter")).unwrap();
    assert_eq!(handle.active_index(), Some(1));
    assert_eq!(second.get_attribute("aria-selected").as_deref(), Some("true"));
}

#[wasm_bindgen_test]
async fn detach_restores_original_content() {
    let host = mount_host("<h2>Alpha</h2><p>one</p>");
    let before = host.inner_html();
    let handle = enhance(host.clone()).unwrap();
    next_frame().await;
    assert_ne!(host.inner_html(), before);

    handle.detach();
    assert_eq!(host.inner_html(), before);
    assert_eq!(handle.active_index(), None);

    // Inert after detach: the scheduled-refresh path must not resurrect it.
    handle.refresh();
    next_frame().await;
    assert_eq!(host.inner_html(), before);
}
