//! Section parser: turns a flat run of host nodes into ordered
//! (heading, content) groups.
//!
//! The first heading element found (levels 1-6) fixes the boundary tag for
//! the whole pass - only headings of that exact tag start new sections,
//! deeper or shallower ones are ordinary content. No heading at all means
//! "do not transform" and an empty result.

use crate::dom::HostDom;

/// One parsed group. Scratch data: consumed immediately by the controller's
/// build step to mint a Tab/Panel pair, never retained.
#[derive(Debug, Clone)]
pub struct Section<N> {
    /// The original heading node, unmodified.
    pub heading: N,
    /// Every non-heading node up to the next boundary heading. May be empty.
    pub content: Vec<N>,
}

fn is_heading_tag(tag: &str) -> bool {
    matches!(tag, "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

/// Scan `nodes` in document order and group them into sections.
///
/// Non-empty text nodes are wrapped in a plain `<span>` so the build step can
/// clone them like any element; whitespace-only text is dropped. Nodes before
/// the first boundary heading have no owning section and are discarded.
pub fn parse<D: HostDom>(dom: &D, nodes: &[D::Node]) -> Vec<Section<D::Node>> {
    let boundary = match nodes
        .iter()
        .find_map(|node| dom.tag(node).filter(|tag| is_heading_tag(tag)))
    {
        Some(tag) => tag,
        None => return Vec::new(),
    };

    let mut sections = Vec::new();
    let mut current: Option<Section<D::Node>> = None;

    for node in nodes {
        match dom.tag(node) {
            Some(tag) if tag == boundary => {
                if let Some(done) = current.take() {
                    sections.push(done);
                }
                current = Some(Section {
                    heading: node.clone(),
                    content: Vec::new(),
                });
            }
            Some(_) => {
                if let Some(section) = current.as_mut() {
                    section.content.push(node.clone());
                }
            }
            None => {
                let Some(section) = current.as_mut() else {
                    continue;
                };
                if let Some(text) = dom.text(node) {
                    if !text.trim().is_empty() {
                        let wrapper = dom.create_element("span");
                        dom.set_text(&wrapper, &text);
                        section.content.push(wrapper);
                    }
                }
            }
        }
    }
    if let Some(done) = current.take() {
        sections.push(done);
    }
    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::memory::MemoryDom;

    #[test]
    fn groups_content_under_same_level_headings() {
        let dom = MemoryDom::new();
        let nodes = vec![
            dom.elem_with_text("h2", "A"),
            dom.elem_with_text("p", "1"),
            dom.elem_with_text("p", "2"),
            dom.elem_with_text("h2", "B"),
            dom.elem_with_text("p", "3"),
        ];

        let sections = parse(&dom, &nodes);
        assert_eq!(sections.len(), 2);
        assert_eq!(dom.text_content(&sections[0].heading), "A");
        assert_eq!(sections[0].content.len(), 2);
        assert_eq!(dom.text_content(&sections[1].heading), "B");
        assert_eq!(sections[1].content.len(), 1);
    }

    #[test]
    fn first_heading_fixes_the_boundary_tag() {
        let dom = MemoryDom::new();
        let nodes = vec![
            dom.elem_with_text("h3", "A"),
            dom.elem_with_text("h4", "deeper"),
            dom.elem_with_text("h1", "shallower"),
            dom.elem_with_text("h3", "B"),
        ];

        let sections = parse(&dom, &nodes);
        assert_eq!(sections.len(), 2);
        // Both off-level headings land in section A as plain content.
        assert_eq!(sections[0].content.len(), 2);
        assert!(sections[1].content.is_empty());
    }

    #[test]
    fn no_heading_means_no_transform() {
        let dom = MemoryDom::new();
        let nodes = vec![
            dom.elem_with_text("p", "just"),
            dom.elem_with_text("p", "paragraphs"),
        ];
        assert!(parse(&dom, &nodes).is_empty());
        assert!(parse(&dom, &[]).is_empty());
    }

    #[test]
    fn nodes_before_the_first_heading_are_discarded() {
        let dom = MemoryDom::new();
        let nodes = vec![
            dom.elem_with_text("p", "preamble"),
            dom.text_node("loose text"),
            dom.elem_with_text("h2", "A"),
            dom.elem_with_text("p", "body"),
        ];

        let sections = parse(&dom, &nodes);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].content.len(), 1);
        assert_eq!(dom.text_content(&sections[0].content[0]), "body");
    }

    #[test]
    fn bare_text_gets_an_inline_wrapper() {
        let dom = MemoryDom::new();
        let nodes = vec![
            dom.elem_with_text("h2", "A"),
            dom.text_node("loose words"),
            dom.text_node("   \n "),
        ];

        let sections = parse(&dom, &nodes);
        assert_eq!(sections.len(), 1);
        // Whitespace-only text is dropped, real text is wrapped in a span.
        assert_eq!(sections[0].content.len(), 1);
        let wrapper = &sections[0].content[0];
        assert_eq!(dom.tag(wrapper).as_deref(), Some("span"));
        assert_eq!(dom.text_content(wrapper), "loose words");
    }

    #[test]
    fn empty_section_bodies_are_valid() {
        let dom = MemoryDom::new();
        let nodes = vec![dom.elem_with_text("h2", "A"), dom.elem_with_text("h2", "B")];

        let sections = parse(&dom, &nodes);
        assert_eq!(sections.len(), 2);
        assert!(sections[0].content.is_empty());
        assert!(sections[1].content.is_empty());
    }
}
