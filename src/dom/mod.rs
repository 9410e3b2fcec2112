//! Host-document adapter seam.
//!
//! The parser and the tab controller never touch `web-sys` directly; they
//! talk to the hosting document through [`HostDom`]. Production code plugs in
//! [`browser::BrowserDom`], unit tests plug in [`memory::MemoryDom`], so the
//! whole state machine runs under plain `cargo test` without a rendering
//! environment.

pub mod browser;
pub mod memory;

/// Everything the widget needs from a hosting document.
///
/// `Node` is a cheap cloneable *handle* to a host node - implementations
/// decide what it points at (a `web_sys::Node`, an arena index, ...). All
/// methods take `&self`; mutability is interior, matching the single-threaded
/// cooperative model of the widget.
pub trait HostDom {
    type Node: Clone + std::fmt::Debug;

    /// Lowercase tag name for element nodes, `None` for anything else.
    fn tag(&self, node: &Self::Node) -> Option<String>;
    /// Character data for text nodes, `None` for element nodes.
    fn text(&self, node: &Self::Node) -> Option<String>;

    fn attr(&self, node: &Self::Node, name: &str) -> Option<String>;
    fn set_attr(&self, node: &Self::Node, name: &str, value: &str);
    fn remove_attr(&self, node: &Self::Node, name: &str);
    fn add_class(&self, node: &Self::Node, class: &str);
    fn remove_class(&self, node: &Self::Node, class: &str);

    /// Rendered markup inside an element (used to copy heading labels).
    fn inner_html(&self, node: &Self::Node) -> String;
    fn set_inner_html(&self, node: &Self::Node, html: &str);
    /// Flattened text of the subtree (accessible-label source).
    fn text_content(&self, node: &Self::Node) -> String;
    fn set_text(&self, node: &Self::Node, text: &str);

    fn create_element(&self, tag: &str) -> Self::Node;
    /// Deep copy. The clone is detached until appended somewhere.
    fn clone_subtree(&self, node: &Self::Node) -> Self::Node;
    /// Child *nodes* in document order, text nodes included.
    fn children(&self, node: &Self::Node) -> Vec<Self::Node>;
    fn append(&self, parent: &Self::Node, child: &Self::Node);
    fn insert_before(&self, parent: &Self::Node, node: &Self::Node, reference: &Self::Node);
    /// Remove `node` from its parent. No-op when already detached.
    fn detach(&self, node: &Self::Node);

    /// Move keyboard focus to `node`.
    fn focus(&self, node: &Self::Node);
    /// First focusable descendant of `node`, if any.
    fn first_focusable(&self, node: &Self::Node) -> Option<Self::Node>;
    /// Bring `node` into the visible viewport.
    fn scroll_into_view(&self, node: &Self::Node);
}
