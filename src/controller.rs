//! Tab controller - the state machine that owns the generated tab/panel
//! pairs and every transition between them.
//!
//! All activation requests (pointer, keyboard, programmatic, hash-driven)
//! funnel through [`TabController::activate`], the single choke point that
//! keeps selection attributes, roving tabindex, panel visibility and the
//! change notifications consistent. The controller talks to the document
//! exclusively through the [`HostDom`] seam, so the whole machine runs under
//! plain `cargo test` against the in-memory backend.
//!
//! Failure semantics are deliberate no-ops: out-of-range indices, unknown
//! fragments and calls before the first build do nothing and emit nothing.
//! Every input source here (host markup, attribute strings, URL fragments)
//! is untrusted and user-editable, not a programming contract.

use crate::config::{DefaultTab, Directive, TabListPosition, TabsConfig};
use crate::constants::{
    ATTR_GENERATED, ATTR_SOURCE_ID, ATTR_TAB_LABEL, ATTR_TYPE, BUTTON_TYPE_BUTTON, CSS_HEADING_HIDDEN,
    CSS_PANEL, CSS_PANEL_BOX, CSS_SOURCE_STORE, CSS_TAB, CSS_TABLIST,
};
use crate::dom::HostDom;
use crate::events::TabChange;
use crate::ids::IdSource;
use crate::section::{self, Section};

/// Keys the tab strip reacts to. Anything else is left to the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    Enter,
    Space,
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value. `None` means "not ours".
    pub fn from_dom_key(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" => Some(Self::ArrowLeft),
            "ArrowRight" => Some(Self::ArrowRight),
            "Home" => Some(Self::Home),
            "End" => Some(Self::End),
            "Enter" => Some(Self::Enter),
            " " => Some(Self::Space),
            _ => None,
        }
    }
}

/// One generated tab/panel pair plus the bookkeeping needed for hash lookups
/// and header-visibility toggling.
#[derive(Debug)]
struct TabPair<N> {
    tab: N,
    panel: N,
    /// Cloned heading living inside the panel.
    heading: N,
    /// The original heading node - still the authority for "current id".
    source_heading: N,
    tab_id: String,
    panel_id: String,
    /// Original heading id captured at build time (back-reference).
    source_id: Option<String>,
    /// Pair uses a short-label override; its heading is always visible.
    custom_label: bool,
}

/// The widget state machine. `Uninitialized` until the first successful
/// build; inside `Initialized` exactly one pair is active.
pub struct TabController<D: HostDom> {
    dom: D,
    host: D::Node,
    config: TabsConfig,
    ids: Box<dyn IdSource>,
    /// Minted once, kept for the life of the instance.
    base_id: Option<String>,
    tablist: Option<D::Node>,
    panel_box: Option<D::Node>,
    /// Hidden holder the original content moves into while transformed.
    source_store: Option<D::Node>,
    pairs: Vec<TabPair<D::Node>>,
    active: Option<usize>,
    focused: usize,
    initialized: bool,
    changes: Vec<TabChange>,
}

impl<D: HostDom> TabController<D> {
    pub fn new(dom: D, host: D::Node, config: TabsConfig, ids: Box<dyn IdSource>) -> Self {
        Self {
            dom,
            host,
            config,
            ids,
            base_id: None,
            tablist: None,
            panel_box: None,
            source_store: None,
            pairs: Vec::new(),
            active: None,
            focused: 0,
            initialized: false,
            changes: Vec::new(),
        }
    }

    // ------------------------------------------------------------------
    // Read access (glue + tests)
    // ------------------------------------------------------------------

    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn host(&self) -> &D::Node {
        &self.host
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// `None` until the first build resolves a default pair.
    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn focused_index(&self) -> usize {
        self.focused
    }

    pub fn config(&self) -> &TabsConfig {
        &self.config
    }

    pub fn tablist_node(&self) -> Option<&D::Node> {
        self.tablist.as_ref()
    }

    pub fn tab_node(&self, index: usize) -> Option<D::Node> {
        self.pairs.get(index).map(|pair| pair.tab.clone())
    }

    pub fn panel_node(&self, index: usize) -> Option<D::Node> {
        self.pairs.get(index).map(|pair| pair.panel.clone())
    }

    pub fn panel_heading(&self, index: usize) -> Option<D::Node> {
        self.pairs.get(index).map(|pair| pair.heading.clone())
    }

    /// Drain the change notifications recorded since the last call.
    ///
    /// Buffering instead of calling straight into host code keeps `activate`
    /// atomic: the glue dispatches after its `RefCell` borrow ends, so a
    /// listener may synchronously re-enter the widget API.
    pub fn take_changes(&mut self) -> Vec<TabChange> {
        std::mem::take(&mut self.changes)
    }

    // ------------------------------------------------------------------
    // Build / teardown
    // ------------------------------------------------------------------

    /// The Build operation: re-parse the host content and rebuild every
    /// tab/panel pair wholesale. Runs on mount and whenever the host signals
    /// a content change. With no qualifying heading this is a no-op
    /// transform - the original content stays in place untouched.
    pub fn rebuild(&mut self) {
        self.teardown();

        let nodes: Vec<D::Node> = self
            .dom
            .children(&self.host)
            .into_iter()
            .filter(|node| self.dom.attr(node, ATTR_GENERATED).is_none())
            .collect();
        let sections = section::parse(&self.dom, &nodes);
        if sections.is_empty() {
            return;
        }

        let base = self.ensure_base_id();

        let tablist = self.dom.create_element("div");
        self.dom.set_attr(&tablist, "role", "tablist");
        self.dom.set_attr(&tablist, ATTR_GENERATED, "");
        self.dom.add_class(&tablist, CSS_TABLIST);

        let panel_box = self.dom.create_element("div");
        self.dom.set_attr(&panel_box, ATTR_GENERATED, "");
        self.dom.add_class(&panel_box, CSS_PANEL_BOX);

        for (index, section) in sections.iter().enumerate() {
            let pair = self.build_pair(&base, index, section);
            self.dom.append(&tablist, &pair.tab);
            self.dom.append(&panel_box, &pair.panel);
            self.pairs.push(pair);
        }

        // Move the originals into a hidden store: they stay alive as the
        // parse source for the next rebuild and come back on teardown.
        let store = self.dom.create_element("div");
        self.dom.set_attr(&store, "hidden", "");
        self.dom.set_attr(&store, ATTR_GENERATED, "");
        self.dom.add_class(&store, CSS_SOURCE_STORE);
        for node in &nodes {
            self.dom.append(&store, node);
        }
        self.dom.append(&self.host, &store);

        match self.config.position {
            TabListPosition::Before => {
                self.dom.append(&self.host, &tablist);
                self.dom.append(&self.host, &panel_box);
            }
            TabListPosition::After => {
                self.dom.append(&self.host, &panel_box);
                self.dom.append(&self.host, &tablist);
            }
        }
        self.tablist = Some(tablist);
        self.panel_box = Some(panel_box);
        self.source_store = Some(store);

        self.initialized = true;
        let initial = self.resolve_default();
        self.activate(initial);
    }

    /// Drop the generated view and give the host its original content back.
    /// Leaves the controller `Uninitialized`; the base id survives.
    pub fn teardown(&mut self) {
        if let Some(tablist) = self.tablist.take() {
            self.dom.detach(&tablist);
        }
        if let Some(panel_box) = self.panel_box.take() {
            self.dom.detach(&panel_box);
        }
        if let Some(store) = self.source_store.take() {
            for child in self.dom.children(&store) {
                self.dom.append(&self.host, &child);
            }
            self.dom.detach(&store);
        }
        self.pairs.clear();
        self.active = None;
        self.focused = 0;
        self.initialized = false;
    }

    fn ensure_base_id(&mut self) -> String {
        if let Some(base) = &self.base_id {
            return base.clone();
        }
        let base = match self.dom.attr(&self.host, "id") {
            Some(id) if !id.trim().is_empty() => id,
            _ => self.ids.base_token(),
        };
        self.base_id = Some(base.clone());
        base
    }

    fn build_pair(&self, base: &str, index: usize, section: &Section<D::Node>) -> TabPair<D::Node> {
        let tab_id = format!("{}-tab-{}", base, index);
        let panel_id = format!("{}-panel-{}", base, index);
        let source_id = self.dom.attr(&section.heading, "id");
        let short_label = self.dom.attr(&section.heading, ATTR_TAB_LABEL);
        let custom_label = short_label.is_some();

        let tab = self.dom.create_element("button");
        self.dom.set_attr(&tab, ATTR_TYPE, BUTTON_TYPE_BUTTON);
        self.dom.set_attr(&tab, "role", "tab");
        self.dom.set_attr(&tab, "id", &tab_id);
        self.dom.set_attr(&tab, "aria-controls", &panel_id);
        self.dom.set_attr(&tab, "aria-selected", "false");
        self.dom.set_attr(&tab, "tabindex", "-1");
        self.dom.add_class(&tab, CSS_TAB);
        match &short_label {
            Some(label) => {
                // Short label on the button, full heading text for AT.
                self.dom.set_text(&tab, label);
                self.dom
                    .set_attr(&tab, "aria-label", &self.dom.text_content(&section.heading));
            }
            None => {
                let label_html = self.dom.inner_html(&section.heading);
                self.dom.set_inner_html(&tab, &label_html);
            }
        }

        let panel = self.dom.create_element("div");
        self.dom.set_attr(&panel, "role", "tabpanel");
        self.dom.set_attr(&panel, "id", &panel_id);
        self.dom.set_attr(&panel, "aria-labelledby", &tab_id);
        self.dom.set_attr(&panel, "hidden", "");
        self.dom.add_class(&panel, CSS_PANEL);

        let heading = self.dom.clone_subtree(&section.heading);
        // The hidden original keeps its id; the clone carries a
        // back-reference instead so document ids stay unique.
        self.dom.remove_attr(&heading, "id");
        if let Some(id) = &source_id {
            self.dom.set_attr(&heading, ATTR_SOURCE_ID, id);
        }
        if !self.config.show_headers && !custom_label {
            self.dom.add_class(&heading, CSS_HEADING_HIDDEN);
        }
        self.dom.append(&panel, &heading);
        for node in &section.content {
            let copy = self.dom.clone_subtree(node);
            self.dom.append(&panel, &copy);
        }

        TabPair {
            tab,
            panel,
            heading,
            source_heading: section.heading.clone(),
            tab_id,
            panel_id,
            source_id,
            custom_label,
        }
    }

    fn resolve_default(&self) -> usize {
        match &self.config.default_tab {
            None => 0,
            Some(DefaultTab::Index(index)) if *index < self.pairs.len() => *index,
            Some(DefaultTab::Index(_)) => 0,
            Some(DefaultTab::Heading(id)) => self
                .pairs
                .iter()
                .position(|pair| pair.source_id.as_deref() == Some(id.as_str()))
                .unwrap_or(0),
        }
    }

    // ------------------------------------------------------------------
    // Activation
    // ------------------------------------------------------------------

    /// The single choke point. No-op when uninitialized, out of range, or
    /// the index is already active; otherwise swaps selection state, roving
    /// tabindex and panel visibility, then records one change notification.
    pub fn activate(&mut self, index: usize) {
        if !self.initialized || index >= self.pairs.len() {
            return;
        }
        if self.active == Some(index) {
            return;
        }
        if let Some(previous) = self.active {
            let pair = &self.pairs[previous];
            self.dom.set_attr(&pair.tab, "aria-selected", "false");
            self.dom.set_attr(&pair.tab, "tabindex", "-1");
            self.dom.set_attr(&pair.panel, "hidden", "");
        }
        let pair = &self.pairs[index];
        self.dom.set_attr(&pair.tab, "aria-selected", "true");
        self.dom.set_attr(&pair.tab, "tabindex", "0");
        self.dom.remove_attr(&pair.panel, "hidden");
        self.active = Some(index);
        self.focused = index;
        self.changes.push(TabChange {
            tab_id: pair.tab_id.clone(),
            panel_id: pair.panel_id.clone(),
            index,
        });
    }

    /// Cyclic: from the last pair wraps to index 0.
    pub fn select_next(&mut self) {
        if let Some(active) = self.active {
            let len = self.pairs.len();
            self.activate((active + 1) % len);
        }
    }

    /// Cyclic: from index 0 wraps to the last pair.
    pub fn select_previous(&mut self) {
        if let Some(active) = self.active {
            let len = self.pairs.len();
            self.activate((active + len - 1) % len);
        }
    }

    pub fn select_first(&mut self) {
        self.activate(0);
    }

    pub fn select_last(&mut self) {
        match self.pairs.len() {
            0 => {}
            len => self.activate(len - 1),
        }
    }

    // ------------------------------------------------------------------
    // Keyboard / focus
    // ------------------------------------------------------------------

    /// Browser focus landed on tab `index` (click, Tab key, or our own
    /// roving-focus move). Manual mode only realigns the focus index;
    /// auto-activate mode also activates.
    pub fn focus_tab(&mut self, index: usize) {
        if !self.initialized || index >= self.pairs.len() {
            return;
        }
        self.focused = index;
        if self.config.auto_activate {
            self.activate(index);
        }
    }

    /// Keyboard semantics per mode. Manual (default): arrows and Home/End
    /// move focus only; Enter/Space activate the focused pair and then move
    /// focus into the panel's first focusable descendant. Auto: every focus
    /// move activates its destination, keeping focus and active in
    /// lock-step.
    pub fn key_down(&mut self, key: Key) {
        if !self.initialized || self.pairs.is_empty() {
            return;
        }
        let len = self.pairs.len();
        match key {
            Key::ArrowRight => self.move_focus((self.focused + 1) % len),
            Key::ArrowLeft => self.move_focus((self.focused + len - 1) % len),
            Key::Home => self.move_focus(0),
            Key::End => self.move_focus(len - 1),
            Key::Enter | Key::Space => {
                self.activate(self.focused);
                if let Some(active) = self.active {
                    let panel = self.pairs[active].panel.clone();
                    if let Some(target) = self.dom.first_focusable(&panel) {
                        self.dom.focus(&target);
                    }
                }
            }
        }
    }

    fn move_focus(&mut self, index: usize) {
        self.focused = index;
        self.dom.focus(&self.pairs[index].tab);
        if self.config.auto_activate {
            self.activate(index);
        }
    }

    // ------------------------------------------------------------------
    // Hash navigation
    // ------------------------------------------------------------------

    /// React to an (already URL-decoded) fragment. Matches the original
    /// heading's current id first, then the back-reference captured at
    /// build time. On a hit the pair activates and the tab strip scrolls
    /// into view; everything else is a no-op.
    pub fn navigate_to_fragment(&mut self, fragment: &str) {
        if !self.initialized || fragment.is_empty() {
            return;
        }
        let hit = self.pairs.iter().position(|pair| {
            self.dom.attr(&pair.source_heading, "id").as_deref() == Some(fragment)
                || pair.source_id.as_deref() == Some(fragment)
        });
        if let Some(index) = hit {
            self.activate(index);
            if let Some(tablist) = &self.tablist {
                self.dom.scroll_into_view(tablist);
            }
        }
    }

    // ------------------------------------------------------------------
    // Reconfiguration
    // ------------------------------------------------------------------

    /// Apply a directive through the single config entry point and run its
    /// post-init reaction. Before the first build only the stored value
    /// changes (the upcoming build picks it up).
    pub fn reconfigure(&mut self, directive: Directive) {
        let changed = self.config.apply(directive.clone());
        if !changed || !self.initialized {
            return;
        }
        match directive {
            Directive::ShowHeaders(show) => {
                for pair in &self.pairs {
                    if pair.custom_label {
                        continue;
                    }
                    if show {
                        self.dom.remove_class(&pair.heading, CSS_HEADING_HIDDEN);
                    } else {
                        self.dom.add_class(&pair.heading, CSS_HEADING_HIDDEN);
                    }
                }
            }
            Directive::Position(position) => self.place_tablist(position),
            Directive::DefaultTab(_) => {
                let target = self.resolve_default();
                self.activate(target);
            }
            Directive::AutoActivate(_) => {
                if let Some(active) = self.active {
                    self.focused = active;
                }
            }
        }
    }

    /// Relocate the already-built tab strip without rebuilding pairs.
    fn place_tablist(&self, position: TabListPosition) {
        let (Some(tablist), Some(panel_box)) = (&self.tablist, &self.panel_box) else {
            return;
        };
        match position {
            TabListPosition::Before => self.dom.insert_before(&self.host, tablist, panel_box),
            TabListPosition::After => {
                self.dom.detach(tablist);
                self.dom.append(&self.host, tablist);
            }
        }
    }
}
