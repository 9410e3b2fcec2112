//! Browser entry points - upgrades host elements into tab widgets and owns
//! everything wasm-bindgen: event listener closures, the per-page instance
//! registry, animation-frame scheduling and `tabs:change` dispatch.
//!
//! The split with [`crate::controller`] is strict: the controller decides,
//! this module wires. Each listener funnels into a controller method under
//! a `try_borrow_mut` guard (browser focus events can fire re-entrantly
//! while the controller moves focus itself), then drains the buffered
//! change notifications and dispatches them once the borrow is released.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CustomEvent, CustomEventInit, Element, Event, EventTarget, KeyboardEvent, Node};

use crate::config::{DefaultTab, Directive, TabListPosition, TabsConfig};
use crate::constants::{
    ATTR_AUTO_ACTIVATE, ATTR_DEFAULT_TAB, ATTR_POSITION, ATTR_SHOW_HEADERS, ATTR_TABS_MARKER,
    CHANGE_EVENT,
};
use crate::controller::{Key, TabController};
use crate::dom::browser::BrowserDom;
use crate::events::TabChange;
use crate::ids::EntropyIds;

// Keeps every upgraded instance (and the closures inside it) alive for the
// page's lifetime. Entries leave the registry only through `detach`.
thread_local! {
    static INSTANCES: RefCell<Vec<Rc<Instance>>> = RefCell::new(Vec::new());
}

/// A live DOM listener: target, event name, and the closure backing it.
/// Dropping the closure invalidates the JS function, so removal and drop
/// happen together in [`clear_listeners`].
struct Listener {
    target: EventTarget,
    kind: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

/// A scheduled animation-frame build. The closure must outlive the frame
/// request; the handle lets `detach` cancel a build that never ran.
struct PendingBuild {
    handle: i32,
    _closure: Closure<dyn FnMut()>,
}

/// One upgraded host element.
struct Instance {
    controller: RefCell<TabController<BrowserDom>>,
    host: Element,
    /// Listeners on generated nodes - replaced wholesale on every rebuild.
    view_listeners: RefCell<Vec<Listener>>,
    /// Listeners that survive rebuilds (window `hashchange`).
    static_listeners: RefCell<Vec<Listener>>,
    pending_build: RefCell<Option<PendingBuild>>,
    detached: Cell<bool>,
}

// ---------------------------------------------------------------------------
// Public surface
// ---------------------------------------------------------------------------

/// Upgrade `host` into a tab widget.
///
/// Reads the directive attributes once, registers the instance and schedules
/// the first build for the next animation frame. Calling `enhance` again on
/// an already-upgraded element just returns another handle to the same
/// instance.
#[wasm_bindgen]
pub fn enhance(host: Element) -> Result<TabsHandle, JsValue> {
    if let Some(existing) = find_instance(&host) {
        return Ok(TabsHandle { instance: existing });
    }

    let document = host.owner_document().ok_or("host element has no document")?;
    let dom = BrowserDom::new(document);
    let node: Node = host.clone().into();
    let config = TabsConfig::from_host(&dom, &node);
    let controller = TabController::new(dom, node, config, Box::new(EntropyIds));

    let instance = Rc::new(Instance {
        controller: RefCell::new(controller),
        host,
        view_listeners: RefCell::new(Vec::new()),
        static_listeners: RefCell::new(Vec::new()),
        pending_build: RefCell::new(None),
        detached: Cell::new(false),
    });
    INSTANCES.with(|instances| instances.borrow_mut().push(Rc::clone(&instance)));

    schedule_build(&instance);
    Ok(TabsHandle { instance })
}

/// Upgrade every `[data-tabs]` element in the document. Returns how many
/// hosts were upgraded; elements that were already upgraded count too.
#[wasm_bindgen(js_name = enhanceAll)]
pub fn enhance_all() -> u32 {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return 0;
    };
    let selector = format!("[{}]", ATTR_TABS_MARKER);
    let Ok(hosts) = document.query_selector_all(&selector) else {
        return 0;
    };
    let mut upgraded = 0;
    for i in 0..hosts.length() {
        let Some(node) = hosts.item(i) else { continue };
        let Ok(host) = node.dyn_into::<Element>() else {
            continue;
        };
        if enhance(host).is_ok() {
            upgraded += 1;
        }
    }
    upgraded
}

/// Host-code handle to one upgraded element, exported to JS.
#[wasm_bindgen]
pub struct TabsHandle {
    instance: Rc<Instance>,
}

#[wasm_bindgen]
impl TabsHandle {
    #[wasm_bindgen(js_name = selectNext)]
    pub fn select_next(&self) {
        self.mutate(|ctl| ctl.select_next());
    }

    #[wasm_bindgen(js_name = selectPrevious)]
    pub fn select_previous(&self) {
        self.mutate(|ctl| ctl.select_previous());
    }

    #[wasm_bindgen(js_name = selectFirst)]
    pub fn select_first(&self) {
        self.mutate(|ctl| ctl.select_first());
    }

    #[wasm_bindgen(js_name = selectLast)]
    pub fn select_last(&self) {
        self.mutate(|ctl| ctl.select_last());
    }

    #[wasm_bindgen(js_name = setActiveIndex)]
    pub fn set_active_index(&self, index: usize) {
        self.mutate(|ctl| ctl.activate(index));
    }

    /// `undefined` until the first build activates a pair.
    #[wasm_bindgen(js_name = activeIndex)]
    pub fn active_index(&self) -> Option<usize> {
        self.read(None, |ctl| ctl.active_index())
    }

    /// The host signals a content change: tear down and rebuild from the
    /// current content on the next animation frame. Calling again before
    /// that frame replaces the still-pending build.
    pub fn refresh(&self) {
        schedule_build(&self.instance);
    }

    /// Undo the transform: restore the original content, drop all listeners
    /// and cancel any pending build. The handle goes inert afterwards.
    pub fn detach(&self) {
        detach_instance(&self.instance);
    }

    #[wasm_bindgen(js_name = showHeaders)]
    pub fn show_headers(&self) -> bool {
        self.read(false, |ctl| ctl.config().show_headers)
    }

    #[wasm_bindgen(js_name = setShowHeaders)]
    pub fn set_show_headers(&self, value: bool) {
        self.mutate(|ctl| ctl.reconfigure(Directive::ShowHeaders(value)));
        self.mirror_flag(ATTR_SHOW_HEADERS, value);
    }

    pub fn position(&self) -> String {
        self.read(TabListPosition::Before, |ctl| ctl.config().position)
            .as_str()
            .to_string()
    }

    #[wasm_bindgen(js_name = setPosition)]
    pub fn set_position(&self, value: &str) {
        let position = TabListPosition::parse(value);
        self.mutate(|ctl| ctl.reconfigure(Directive::Position(position)));
        let _ = self.instance.host.set_attribute(ATTR_POSITION, position.as_str());
    }

    #[wasm_bindgen(js_name = defaultTab)]
    pub fn default_tab(&self) -> Option<String> {
        self.read(None, |ctl| ctl.config().default_tab.clone())
            .map(|value| value.directive_value())
    }

    #[wasm_bindgen(js_name = setDefaultTab)]
    pub fn set_default_tab(&self, value: Option<String>) {
        let parsed = value.as_deref().and_then(DefaultTab::parse);
        self.mutate(|ctl| ctl.reconfigure(Directive::DefaultTab(parsed.clone())));
        match parsed {
            Some(parsed) => {
                let _ = self
                    .instance
                    .host
                    .set_attribute(ATTR_DEFAULT_TAB, &parsed.directive_value());
            }
            None => {
                let _ = self.instance.host.remove_attribute(ATTR_DEFAULT_TAB);
            }
        }
    }

    #[wasm_bindgen(js_name = autoActivate)]
    pub fn auto_activate(&self) -> bool {
        self.read(false, |ctl| ctl.config().auto_activate)
    }

    #[wasm_bindgen(js_name = setAutoActivate)]
    pub fn set_auto_activate(&self, value: bool) {
        self.mutate(|ctl| ctl.reconfigure(Directive::AutoActivate(value)));
        self.mirror_flag(ATTR_AUTO_ACTIVATE, value);
    }
}

impl TabsHandle {
    /// Run a mutating controller operation, then dispatch whatever change
    /// notifications it buffered. Skipped when re-entered.
    fn mutate(&self, f: impl FnOnce(&mut TabController<BrowserDom>)) {
        let changes = match self.instance.controller.try_borrow_mut() {
            Ok(mut ctl) => {
                f(&mut ctl);
                ctl.take_changes()
            }
            Err(_) => return,
        };
        dispatch_changes(&self.instance.host, &changes);
    }

    fn read<R>(&self, fallback: R, f: impl FnOnce(&TabController<BrowserDom>) -> R) -> R {
        match self.instance.controller.try_borrow() {
            Ok(ctl) => f(&ctl),
            Err(_) => fallback,
        }
    }

    /// Keep presence-only directive attributes in sync for CSS hooks.
    fn mirror_flag(&self, attribute: &str, value: bool) {
        if value {
            let _ = self.instance.host.set_attribute(attribute, "");
        } else {
            let _ = self.instance.host.remove_attribute(attribute);
        }
    }
}

// ---------------------------------------------------------------------------
// Build scheduling
// ---------------------------------------------------------------------------

/// Schedule a build for the next animation frame. A not-yet-run frame from
/// an earlier request is cancelled and replaced; if the browser refuses the
/// frame the build runs synchronously instead.
fn schedule_build(instance: &Rc<Instance>) {
    if instance.detached.get() {
        return;
    }
    cancel_pending(instance);
    let Some(window) = web_sys::window() else {
        run_build(instance);
        return;
    };
    let callback = {
        let instance = Rc::clone(instance);
        Closure::wrap(Box::new(move || {
            instance.pending_build.borrow_mut().take();
            run_build(&instance);
        }) as Box<dyn FnMut()>)
    };
    match window.request_animation_frame(callback.as_ref().unchecked_ref()) {
        Ok(handle) => {
            *instance.pending_build.borrow_mut() = Some(PendingBuild {
                handle,
                _closure: callback,
            });
        }
        Err(_) => {
            drop(callback);
            run_build(instance);
        }
    }
}

fn run_build(instance: &Rc<Instance>) {
    let (mut changes, built) = match instance.controller.try_borrow_mut() {
        Ok(mut ctl) => {
            ctl.rebuild();
            (ctl.take_changes(), ctl.is_initialized())
        }
        Err(_) => return,
    };
    wire_view(instance);

    if !built {
        // Nothing to tab through, so stop watching the fragment too.
        clear_listeners(&instance.static_listeners);
        return;
    }
    if instance.static_listeners.borrow().is_empty() {
        wire_hashchange(instance);
    }

    // A deep link may point at a heading that now sits behind a tab.
    let fragment = current_fragment();
    if !fragment.is_empty() {
        if let Ok(mut ctl) = instance.controller.try_borrow_mut() {
            ctl.navigate_to_fragment(&fragment);
            changes.extend(ctl.take_changes());
        }
    }

    dispatch_changes(&instance.host, &changes);
}

fn cancel_pending(instance: &Rc<Instance>) {
    if let Some(pending) = instance.pending_build.borrow_mut().take() {
        if let Some(window) = web_sys::window() {
            let _ = window.cancel_animation_frame(pending.handle);
        }
    }
}

fn detach_instance(instance: &Rc<Instance>) {
    if instance.detached.replace(true) {
        return;
    }
    cancel_pending(instance);
    clear_listeners(&instance.view_listeners);
    clear_listeners(&instance.static_listeners);
    if let Ok(mut ctl) = instance.controller.try_borrow_mut() {
        ctl.teardown();
    }
    INSTANCES.with(|instances| {
        instances
            .borrow_mut()
            .retain(|other| !Rc::ptr_eq(other, instance));
    });
}

// ---------------------------------------------------------------------------
// Listener wiring
// ---------------------------------------------------------------------------

/// Attach listeners to the freshly generated view: delegated keydown on the
/// tab strip plus click and focus per tab button. Old view listeners are
/// removed first - rebuilds replace the generated nodes wholesale.
fn wire_view(instance: &Rc<Instance>) {
    clear_listeners(&instance.view_listeners);

    let (tablist, tabs) = {
        let Ok(ctl) = instance.controller.try_borrow() else {
            return;
        };
        let Some(tablist) = ctl.tablist_node().cloned() else {
            return;
        };
        let tabs: Vec<Node> = (0..ctl.len()).filter_map(|i| ctl.tab_node(i)).collect();
        (tablist, tabs)
    };

    let keydown = {
        let instance = Rc::clone(instance);
        Closure::wrap(Box::new(move |event: Event| {
            let Some(keyboard) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            let Some(key) = Key::from_dom_key(&keyboard.key()) else {
                return;
            };
            event.prevent_default();
            let changes = match instance.controller.try_borrow_mut() {
                Ok(mut ctl) => {
                    ctl.key_down(key);
                    ctl.take_changes()
                }
                Err(_) => return,
            };
            dispatch_changes(&instance.host, &changes);
        }) as Box<dyn FnMut(Event)>)
    };
    attach(&instance.view_listeners, EventTarget::from(tablist), "keydown", keydown);

    for (index, tab) in tabs.into_iter().enumerate() {
        let target = EventTarget::from(tab);

        let click = {
            let instance = Rc::clone(instance);
            Closure::wrap(Box::new(move |_event: Event| {
                let changes = match instance.controller.try_borrow_mut() {
                    Ok(mut ctl) => {
                        ctl.activate(index);
                        ctl.take_changes()
                    }
                    Err(_) => return,
                };
                dispatch_changes(&instance.host, &changes);
            }) as Box<dyn FnMut(Event)>)
        };
        attach(&instance.view_listeners, target.clone(), "click", click);

        // `focus` fires re-entrantly when the controller moves focus during
        // key handling; the failed borrow below is that case and the
        // controller has already updated itself.
        let focus = {
            let instance = Rc::clone(instance);
            Closure::wrap(Box::new(move |_event: Event| {
                let changes = match instance.controller.try_borrow_mut() {
                    Ok(mut ctl) => {
                        ctl.focus_tab(index);
                        ctl.take_changes()
                    }
                    Err(_) => return,
                };
                dispatch_changes(&instance.host, &changes);
            }) as Box<dyn FnMut(Event)>)
        };
        attach(&instance.view_listeners, target, "focus", focus);
    }
}

fn wire_hashchange(instance: &Rc<Instance>) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let callback = {
        let instance = Rc::clone(instance);
        Closure::wrap(Box::new(move |_event: Event| {
            let fragment = current_fragment();
            if fragment.is_empty() {
                return;
            }
            let changes = match instance.controller.try_borrow_mut() {
                Ok(mut ctl) => {
                    ctl.navigate_to_fragment(&fragment);
                    ctl.take_changes()
                }
                Err(_) => return,
            };
            dispatch_changes(&instance.host, &changes);
        }) as Box<dyn FnMut(Event)>)
    };
    attach(
        &instance.static_listeners,
        EventTarget::from(window),
        "hashchange",
        callback,
    );
}

fn attach(
    listeners: &RefCell<Vec<Listener>>,
    target: EventTarget,
    kind: &'static str,
    callback: Closure<dyn FnMut(Event)>,
) {
    let added = target
        .add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())
        .is_ok();
    if added {
        listeners.borrow_mut().push(Listener {
            target,
            kind,
            callback,
        });
    }
}

fn clear_listeners(listeners: &RefCell<Vec<Listener>>) {
    for listener in listeners.borrow_mut().drain(..) {
        let _ = listener.target.remove_event_listener_with_callback(
            listener.kind,
            listener.callback.as_ref().unchecked_ref(),
        );
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn find_instance(host: &Element) -> Option<Rc<Instance>> {
    INSTANCES.with(|instances| {
        instances
            .borrow()
            .iter()
            .find(|instance| instance.host.is_same_node(Some(host.unchecked_ref())))
            .map(Rc::clone)
    })
}

/// Current URL fragment, `#` stripped and percent-decoded. Malformed
/// escapes fall back to the raw text.
fn current_fragment() -> String {
    let raw = web_sys::window()
        .and_then(|w| w.location().hash().ok())
        .unwrap_or_default();
    let trimmed = raw.trim_start_matches('#');
    match js_sys::decode_uri_component(trimmed) {
        Ok(decoded) => String::from(decoded),
        Err(_) => trimmed.to_string(),
    }
}

/// Fire one bubbling `tabs:change` per recorded activation. Runs only with
/// the controller borrow released, so listeners may call straight back into
/// the widget API.
fn dispatch_changes(host: &Element, changes: &[TabChange]) {
    for change in changes {
        let mut init = CustomEventInit::new();
        init.bubbles(true);
        if let Ok(detail) = serde_wasm_bindgen::to_value(change) {
            init.detail(&detail);
        }
        if let Ok(event) = CustomEvent::new_with_event_init_dict(CHANGE_EVENT, &init) {
            let _ = host.dispatch_event(&event);
        }
    }
}
