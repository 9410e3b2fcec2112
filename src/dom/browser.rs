//! `web-sys` implementation of [`HostDom`].
//!
//! Node handles are plain `web_sys::Node`s. Element-only operations
//! (attributes, classes, markup) silently no-op on text nodes, and fallible
//! DOM calls are best-effort `let _ =` - a failed attribute write on a node
//! the page ripped out from under us is not worth unwinding over.

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, Node};

use super::HostDom;

/// Selectors for "first focusable descendant", in one comma list so
/// `query_selector` resolves them in document order.
const FOCUSABLE_SELECTOR: &str = "input:not([disabled]), button:not([disabled]), \
     textarea:not([disabled]), select:not([disabled]), a[href], \
     [tabindex]:not([tabindex='-1'])";

/// Host adapter backed by the real browser document.
#[derive(Clone)]
pub struct BrowserDom {
    document: Document,
}

impl BrowserDom {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    fn as_element(node: &Node) -> Option<&Element> {
        node.dyn_ref::<Element>()
    }
}

impl HostDom for BrowserDom {
    type Node = Node;

    fn tag(&self, node: &Node) -> Option<String> {
        Self::as_element(node).map(|el| el.tag_name().to_ascii_lowercase())
    }

    fn text(&self, node: &Node) -> Option<String> {
        if node.node_type() == Node::TEXT_NODE {
            node.node_value()
        } else {
            None
        }
    }

    fn attr(&self, node: &Node, name: &str) -> Option<String> {
        Self::as_element(node).and_then(|el| el.get_attribute(name))
    }

    fn set_attr(&self, node: &Node, name: &str, value: &str) {
        if let Some(el) = Self::as_element(node) {
            let _ = el.set_attribute(name, value);
        }
    }

    fn remove_attr(&self, node: &Node, name: &str) {
        if let Some(el) = Self::as_element(node) {
            let _ = el.remove_attribute(name);
        }
    }

    fn add_class(&self, node: &Node, class: &str) {
        if let Some(el) = Self::as_element(node) {
            let _ = el.class_list().add_1(class);
        }
    }

    fn remove_class(&self, node: &Node, class: &str) {
        if let Some(el) = Self::as_element(node) {
            let _ = el.class_list().remove_1(class);
        }
    }

    fn inner_html(&self, node: &Node) -> String {
        Self::as_element(node)
            .map(|el| el.inner_html())
            .unwrap_or_default()
    }

    fn set_inner_html(&self, node: &Node, html: &str) {
        if let Some(el) = Self::as_element(node) {
            el.set_inner_html(html);
        }
    }

    fn text_content(&self, node: &Node) -> String {
        node.text_content().unwrap_or_default()
    }

    fn set_text(&self, node: &Node, text: &str) {
        node.set_text_content(Some(text));
    }

    fn create_element(&self, tag: &str) -> Node {
        // Tag names here are the widget's own fixed vocabulary ("div",
        // "button", "span"); an empty text node stands in on the
        // cannot-happen failure path rather than panicking the page.
        self.document
            .create_element(tag)
            .map(Into::into)
            .unwrap_or_else(|_| self.document.create_text_node("").into())
    }

    fn clone_subtree(&self, node: &Node) -> Node {
        node.clone_node_with_deep(true)
            .unwrap_or_else(|_| self.document.create_text_node("").into())
    }

    fn children(&self, node: &Node) -> Vec<Node> {
        let list = node.child_nodes();
        (0..list.length()).filter_map(|i| list.item(i)).collect()
    }

    fn append(&self, parent: &Node, child: &Node) {
        let _ = parent.append_child(child);
    }

    fn insert_before(&self, parent: &Node, node: &Node, reference: &Node) {
        let _ = parent.insert_before(node, Some(reference));
    }

    fn detach(&self, node: &Node) {
        if let Some(parent) = node.parent_node() {
            let _ = parent.remove_child(node);
        }
    }

    fn focus(&self, node: &Node) {
        if let Some(el) = node.dyn_ref::<HtmlElement>() {
            let _ = el.focus();
        }
    }

    fn first_focusable(&self, node: &Node) -> Option<Node> {
        let el = Self::as_element(node)?;
        el.query_selector(FOCUSABLE_SELECTOR)
            .ok()
            .flatten()
            .map(Into::into)
    }

    fn scroll_into_view(&self, node: &Node) {
        if let Some(el) = Self::as_element(node) {
            el.scroll_into_view();
        }
    }
}
