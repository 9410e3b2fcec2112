//! Attribute and class vocabulary for the widget - single source of truth so
//! the builder, the reconfiguration paths and the tests never drift apart.

/// Opt-in marker on a host element picked up by the auto-enhancement sweep.
pub const ATTR_TABS_MARKER: &str = "data-tabs";

/// Directive: show the cloned headings inside panels (default: hidden).
pub const ATTR_SHOW_HEADERS: &str = "data-show-headers";
/// Directive: tab strip placement relative to the panels, "before" / "after".
pub const ATTR_POSITION: &str = "data-position";
/// Directive: initial active pair - integer index or heading identifier.
pub const ATTR_DEFAULT_TAB: &str = "data-default-tab";
/// Directive: focus-driven activation instead of explicit Enter/Space.
pub const ATTR_AUTO_ACTIVATE: &str = "data-auto-activate";

/// Per-heading short label override consumed when building tab buttons.
pub const ATTR_TAB_LABEL: &str = "data-tab-label";
/// Back-reference from a cloned heading to the original heading's id.
pub const ATTR_SOURCE_ID: &str = "data-source-id";
/// Marks generated containers so rebuild scans skip them.
pub const ATTR_GENERATED: &str = "data-tabs-generated";

pub const ATTR_TYPE: &str = "type";
pub const BUTTON_TYPE_BUTTON: &str = "button";

pub const POSITION_BEFORE: &str = "before";
pub const POSITION_AFTER: &str = "after";

// Class names consumed by the (out of scope) styling layer.
pub const CSS_TABLIST: &str = "tab-strip";
pub const CSS_TAB: &str = "tab-button";
pub const CSS_PANEL_BOX: &str = "tab-panels";
pub const CSS_PANEL: &str = "tab-panel";
/// Hidden holder the original content is parked in while transformed.
pub const CSS_SOURCE_STORE: &str = "tab-sources";
/// Applied to cloned headings while the header-visibility directive is off.
pub const CSS_HEADING_HIDDEN: &str = "visually-hidden";

/// Name of the change notification dispatched on the host element.
pub const CHANGE_EVENT: &str = "tabs:change";
