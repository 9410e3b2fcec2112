//! Widget configuration.
//!
//! The four host directives collapse into one [`TabsConfig`] struct with the
//! defaults defined here and nowhere else. Attributes are read once when a
//! host element is upgraded ([`TabsConfig::from_host`]); after that the
//! struct is the sole source of truth and every change flows through the
//! single [`TabsConfig::apply`] entry point.

use crate::constants::{
    ATTR_AUTO_ACTIVATE, ATTR_DEFAULT_TAB, ATTR_POSITION, ATTR_SHOW_HEADERS, POSITION_AFTER,
    POSITION_BEFORE,
};
use crate::dom::HostDom;

/// Placement of the tab strip relative to the panel container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TabListPosition {
    #[default]
    Before,
    After,
}

impl TabListPosition {
    /// Parse the directive value; anything that is not `"after"` means the
    /// default placement.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case(POSITION_AFTER) {
            Self::After
        } else {
            Self::Before
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Before => POSITION_BEFORE,
            Self::After => POSITION_AFTER,
        }
    }
}

/// The default-tab directive: a numeric index or a heading identifier.
/// Out-of-range and unmatched values fall back to index 0 at resolution
/// time, never here - parsing is total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultTab {
    Index(usize),
    Heading(String),
}

impl DefaultTab {
    /// `None` for blank input, `Index` for integer strings, `Heading`
    /// otherwise.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        match trimmed.parse::<usize>() {
            Ok(index) => Some(Self::Index(index)),
            Err(_) => Some(Self::Heading(trimmed.to_string())),
        }
    }

    /// String form written back to the host attribute.
    pub fn directive_value(&self) -> String {
        match self {
            Self::Index(index) => index.to_string(),
            Self::Heading(id) => id.clone(),
        }
    }
}

/// One directive change routed through [`TabsConfig::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    ShowHeaders(bool),
    Position(TabListPosition),
    DefaultTab(Option<DefaultTab>),
    AutoActivate(bool),
}

/// Authoritative widget configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabsConfig {
    /// Show the cloned headings inside panels. Default: hidden.
    pub show_headers: bool,
    /// Tab strip before or after the panels. Default: before.
    pub position: TabListPosition,
    /// Initial/resolved active pair. Default: absent (index 0).
    pub default_tab: Option<DefaultTab>,
    /// Focus-driven activation. Default: explicit Enter/Space.
    pub auto_activate: bool,
}

impl Default for TabsConfig {
    fn default() -> Self {
        Self {
            show_headers: false,
            position: TabListPosition::Before,
            default_tab: None,
            auto_activate: false,
        }
    }
}

impl TabsConfig {
    /// Upgrade step: read any pre-existing directive attributes off the host
    /// element. Presence-only directives follow the HTML boolean-attribute
    /// convention (any value, including "", means set).
    pub fn from_host<D: HostDom>(dom: &D, host: &D::Node) -> Self {
        Self {
            show_headers: dom.attr(host, ATTR_SHOW_HEADERS).is_some(),
            position: dom
                .attr(host, ATTR_POSITION)
                .map(|v| TabListPosition::parse(&v))
                .unwrap_or_default(),
            default_tab: dom
                .attr(host, ATTR_DEFAULT_TAB)
                .and_then(|v| DefaultTab::parse(&v)),
            auto_activate: dom.attr(host, ATTR_AUTO_ACTIVATE).is_some(),
        }
    }

    /// Single write entry point. Returns `true` when the stored value
    /// actually changed, so callers can skip reaction work on no-op writes.
    pub fn apply(&mut self, directive: Directive) -> bool {
        match directive {
            Directive::ShowHeaders(value) => {
                let changed = self.show_headers != value;
                self.show_headers = value;
                changed
            }
            Directive::Position(value) => {
                let changed = self.position != value;
                self.position = value;
                changed
            }
            Directive::DefaultTab(value) => {
                let changed = self.default_tab != value;
                self.default_tab = value;
                changed
            }
            Directive::AutoActivate(value) => {
                let changed = self.auto_activate != value;
                self.auto_activate = value;
                changed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::memory::MemoryDom;

    #[test]
    fn defaults_match_the_directive_table() {
        let config = TabsConfig::default();
        assert!(!config.show_headers);
        assert_eq!(config.position, TabListPosition::Before);
        assert_eq!(config.default_tab, None);
        assert!(!config.auto_activate);
    }

    #[test]
    fn default_tab_parsing() {
        assert_eq!(DefaultTab::parse("2"), Some(DefaultTab::Index(2)));
        assert_eq!(DefaultTab::parse(" 10 "), Some(DefaultTab::Index(10)));
        assert_eq!(
            DefaultTab::parse("install"),
            Some(DefaultTab::Heading("install".to_string()))
        );
        // Negative numbers are not indices; they get a chance as identifiers.
        assert_eq!(
            DefaultTab::parse("-1"),
            Some(DefaultTab::Heading("-1".to_string()))
        );
        assert_eq!(DefaultTab::parse(""), None);
        assert_eq!(DefaultTab::parse("   "), None);
    }

    #[test]
    fn position_parsing_is_lenient() {
        assert_eq!(TabListPosition::parse("after"), TabListPosition::After);
        assert_eq!(TabListPosition::parse("AFTER"), TabListPosition::After);
        assert_eq!(TabListPosition::parse("before"), TabListPosition::Before);
        assert_eq!(TabListPosition::parse("sideways"), TabListPosition::Before);
    }

    #[test]
    fn apply_reports_changes() {
        let mut config = TabsConfig::default();
        assert!(config.apply(Directive::ShowHeaders(true)));
        assert!(!config.apply(Directive::ShowHeaders(true)));
        assert!(config.apply(Directive::Position(TabListPosition::After)));
        assert!(config.apply(Directive::DefaultTab(Some(DefaultTab::Index(1)))));
        assert!(!config.apply(Directive::DefaultTab(Some(DefaultTab::Index(1)))));
        assert!(config.apply(Directive::AutoActivate(true)));
    }

    #[test]
    fn from_host_reads_pre_existing_attributes() {
        let dom = MemoryDom::new();
        let host = dom.elem("div");
        dom.set_attr(&host, "data-show-headers", "");
        dom.set_attr(&host, "data-position", "after");
        dom.set_attr(&host, "data-default-tab", "setup");

        let config = TabsConfig::from_host(&dom, &host);
        assert!(config.show_headers);
        assert_eq!(config.position, TabListPosition::After);
        assert_eq!(
            config.default_tab,
            Some(DefaultTab::Heading("setup".to_string()))
        );
        assert!(!config.auto_activate);
    }
}
