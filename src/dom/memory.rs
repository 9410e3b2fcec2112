//! Arena-backed in-memory implementation of [`HostDom`].
//!
//! This is the collaborator the unit tests inject instead of a browser: it
//! keeps the whole "document" in a `RefCell`'d arena, records focus and
//! scroll requests so assertions can observe interaction side effects, and
//! supports just enough of the DOM surface (attributes, classes, deep clone,
//! text/markup content) for the widget to run end to end.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

use super::HostDom;

/// Handle into the arena. Cheap to copy, compares by identity.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct NodeRef(usize);

#[derive(Default)]
struct NodeData {
    /// `None` marks a text node.
    tag: Option<String>,
    text: String,
    /// Set by `set_inner_html`; wins over serialized children.
    html: Option<String>,
    attrs: BTreeMap<String, String>,
    classes: BTreeSet<String>,
    children: Vec<usize>,
    parent: Option<usize>,
}

/// In-memory host document.
#[derive(Default)]
pub struct MemoryDom {
    nodes: RefCell<Vec<NodeData>>,
    focus_log: RefCell<Vec<NodeRef>>,
    scroll_log: RefCell<Vec<NodeRef>>,
}

impl MemoryDom {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detached element node.
    pub fn elem(&self, tag: &str) -> NodeRef {
        self.push(NodeData {
            tag: Some(tag.to_ascii_lowercase()),
            ..NodeData::default()
        })
    }

    /// Create a detached element node with text content.
    pub fn elem_with_text(&self, tag: &str, text: &str) -> NodeRef {
        let node = self.elem(tag);
        self.set_text(&node, text);
        node
    }

    /// Create a detached text node.
    pub fn text_node(&self, data: &str) -> NodeRef {
        self.push(NodeData {
            tag: None,
            text: data.to_string(),
            ..NodeData::default()
        })
    }

    /// Every focus request seen so far, oldest first.
    pub fn focus_events(&self) -> Vec<NodeRef> {
        self.focus_log.borrow().clone()
    }

    /// Node that currently holds focus, if any focus call happened.
    pub fn last_focused(&self) -> Option<NodeRef> {
        self.focus_log.borrow().last().copied()
    }

    /// Every scroll-into-view request seen so far.
    pub fn scroll_events(&self) -> Vec<NodeRef> {
        self.scroll_log.borrow().clone()
    }

    pub fn has_class(&self, node: &NodeRef, class: &str) -> bool {
        self.nodes.borrow()[node.0].classes.contains(class)
    }

    fn push(&self, data: NodeData) -> NodeRef {
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(data);
        NodeRef(nodes.len() - 1)
    }

    fn unlink(nodes: &mut [NodeData], id: usize) {
        if let Some(parent) = nodes[id].parent.take() {
            nodes[parent].children.retain(|&c| c != id);
        }
    }

    fn clone_rec(&self, id: usize) -> usize {
        let data = {
            let nodes = self.nodes.borrow();
            let src = &nodes[id];
            NodeData {
                tag: src.tag.clone(),
                text: src.text.clone(),
                html: src.html.clone(),
                attrs: src.attrs.clone(),
                classes: src.classes.clone(),
                children: src.children.clone(),
                parent: None,
            }
        };
        let child_ids = data.children.clone();
        let copy = self.push(NodeData {
            children: Vec::new(),
            ..data
        });
        for child in child_ids {
            let child_copy = self.clone_rec(child);
            let mut nodes = self.nodes.borrow_mut();
            nodes[child_copy].parent = Some(copy.0);
            let copy_id = copy.0;
            nodes[copy_id].children.push(child_copy);
        }
        copy.0
    }

    fn text_rec(nodes: &[NodeData], id: usize) -> String {
        let mut out = nodes[id].text.clone();
        for &child in &nodes[id].children {
            out.push_str(&Self::text_rec(nodes, child));
        }
        out
    }

    fn html_rec(nodes: &[NodeData], id: usize) -> String {
        if let Some(html) = &nodes[id].html {
            return html.clone();
        }
        let mut out = nodes[id].text.clone();
        for &child in &nodes[id].children {
            match &nodes[child].tag {
                Some(tag) => {
                    out.push_str(&format!("<{}>{}</{}>", tag, Self::html_rec(nodes, child), tag));
                }
                None => out.push_str(&nodes[child].text),
            }
        }
        out
    }

    fn focusable_rec(&self, id: usize) -> Option<usize> {
        const FOCUSABLE_TAGS: [&str; 5] = ["a", "button", "input", "select", "textarea"];
        let children = self.nodes.borrow()[id].children.clone();
        for child in children {
            let is_hit = {
                let nodes = self.nodes.borrow();
                let data = &nodes[child];
                match &data.tag {
                    Some(tag) => {
                        let by_tag = FOCUSABLE_TAGS.contains(&tag.as_str());
                        let by_tabindex = data
                            .attrs
                            .get("tabindex")
                            .is_some_and(|v| v != "-1");
                        by_tag || by_tabindex
                    }
                    None => false,
                }
            };
            if is_hit {
                return Some(child);
            }
            if let Some(hit) = self.focusable_rec(child) {
                return Some(hit);
            }
        }
        None
    }
}

impl HostDom for MemoryDom {
    type Node = NodeRef;

    fn tag(&self, node: &NodeRef) -> Option<String> {
        self.nodes.borrow()[node.0].tag.clone()
    }

    fn text(&self, node: &NodeRef) -> Option<String> {
        let nodes = self.nodes.borrow();
        match nodes[node.0].tag {
            Some(_) => None,
            None => Some(nodes[node.0].text.clone()),
        }
    }

    fn attr(&self, node: &NodeRef, name: &str) -> Option<String> {
        self.nodes.borrow()[node.0].attrs.get(name).cloned()
    }

    fn set_attr(&self, node: &NodeRef, name: &str, value: &str) {
        self.nodes.borrow_mut()[node.0]
            .attrs
            .insert(name.to_string(), value.to_string());
    }

    fn remove_attr(&self, node: &NodeRef, name: &str) {
        self.nodes.borrow_mut()[node.0].attrs.remove(name);
    }

    fn add_class(&self, node: &NodeRef, class: &str) {
        self.nodes.borrow_mut()[node.0]
            .classes
            .insert(class.to_string());
    }

    fn remove_class(&self, node: &NodeRef, class: &str) {
        self.nodes.borrow_mut()[node.0].classes.remove(class);
    }

    fn inner_html(&self, node: &NodeRef) -> String {
        Self::html_rec(&self.nodes.borrow(), node.0)
    }

    fn set_inner_html(&self, node: &NodeRef, html: &str) {
        let mut nodes = self.nodes.borrow_mut();
        let children = std::mem::take(&mut nodes[node.0].children);
        for child in children {
            nodes[child].parent = None;
        }
        nodes[node.0].text.clear();
        nodes[node.0].html = Some(html.to_string());
    }

    fn text_content(&self, node: &NodeRef) -> String {
        Self::text_rec(&self.nodes.borrow(), node.0)
    }

    fn set_text(&self, node: &NodeRef, text: &str) {
        let mut nodes = self.nodes.borrow_mut();
        let children = std::mem::take(&mut nodes[node.0].children);
        for child in children {
            nodes[child].parent = None;
        }
        nodes[node.0].html = None;
        nodes[node.0].text = text.to_string();
    }

    fn create_element(&self, tag: &str) -> NodeRef {
        self.elem(tag)
    }

    fn clone_subtree(&self, node: &NodeRef) -> NodeRef {
        NodeRef(self.clone_rec(node.0))
    }

    fn children(&self, node: &NodeRef) -> Vec<NodeRef> {
        self.nodes.borrow()[node.0]
            .children
            .iter()
            .map(|&id| NodeRef(id))
            .collect()
    }

    fn append(&self, parent: &NodeRef, child: &NodeRef) {
        let mut nodes = self.nodes.borrow_mut();
        Self::unlink(&mut nodes, child.0);
        nodes[child.0].parent = Some(parent.0);
        nodes[parent.0].children.push(child.0);
    }

    fn insert_before(&self, parent: &NodeRef, node: &NodeRef, reference: &NodeRef) {
        let mut nodes = self.nodes.borrow_mut();
        Self::unlink(&mut nodes, node.0);
        let at = nodes[parent.0]
            .children
            .iter()
            .position(|&c| c == reference.0);
        match at {
            Some(idx) => nodes[parent.0].children.insert(idx, node.0),
            None => nodes[parent.0].children.push(node.0),
        }
        nodes[node.0].parent = Some(parent.0);
    }

    fn detach(&self, node: &NodeRef) {
        let mut nodes = self.nodes.borrow_mut();
        Self::unlink(&mut nodes, node.0);
    }

    fn focus(&self, node: &NodeRef) {
        self.focus_log.borrow_mut().push(*node);
    }

    fn first_focusable(&self, node: &NodeRef) -> Option<NodeRef> {
        self.focusable_rec(node.0).map(NodeRef)
    }

    fn scroll_into_view(&self, node: &NodeRef) {
        self.scroll_log.borrow_mut().push(*node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_reparents_nodes() {
        let dom = MemoryDom::new();
        let a = dom.elem("div");
        let b = dom.elem("div");
        let child = dom.elem_with_text("p", "hello");

        dom.append(&a, &child);
        assert_eq!(dom.children(&a), vec![child]);

        dom.append(&b, &child);
        assert!(dom.children(&a).is_empty());
        assert_eq!(dom.children(&b), vec![child]);
    }

    #[test]
    fn insert_before_orders_children() {
        let dom = MemoryDom::new();
        let parent = dom.elem("div");
        let first = dom.elem("span");
        let second = dom.elem("span");
        dom.append(&parent, &second);
        dom.insert_before(&parent, &first, &second);
        assert_eq!(dom.children(&parent), vec![first, second]);
    }

    #[test]
    fn clone_subtree_is_independent() {
        let dom = MemoryDom::new();
        let heading = dom.elem_with_text("h2", "Setup");
        dom.set_attr(&heading, "id", "setup");

        let copy = dom.clone_subtree(&heading);
        dom.set_attr(&copy, "id", "other");

        assert_eq!(dom.attr(&heading, "id").as_deref(), Some("setup"));
        assert_eq!(dom.attr(&copy, "id").as_deref(), Some("other"));
        assert_eq!(dom.text_content(&copy), "Setup");
    }

    #[test]
    fn inner_html_serializes_children() {
        let dom = MemoryDom::new();
        let heading = dom.elem("h2");
        let code = dom.elem_with_text("code", "cargo");
        dom.append(&heading, &code);
        dom.append(&heading, &dom.text_node(" setup"));
        assert_eq!(dom.inner_html(&heading), "<code>cargo</code> setup");
    }

    #[test]
    fn first_focusable_walks_depth_first() {
        let dom = MemoryDom::new();
        let panel = dom.elem("div");
        let plain = dom.elem("p");
        let wrapper = dom.elem("div");
        let button = dom.elem("button");
        dom.append(&panel, &plain);
        dom.append(&panel, &wrapper);
        dom.append(&wrapper, &button);

        assert_eq!(dom.first_focusable(&panel), Some(button));
        assert_eq!(dom.first_focusable(&plain), None);
    }
}
