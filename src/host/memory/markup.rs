//! HTML parsing and serialization for `innerHTML` / `outerHTML`.
//!
//! Assigned markup goes through `html5ever` as body content and is converted
//! into [`Fragment`]s. Comments, doctypes and processing instructions are
//! dropped.

use html5ever::tendril::TendrilSink;
use html5ever::{ParseOpts, parse_document};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use crate::error::Result;
use crate::identifiers::NodeId;

use super::tree::{Fragment, NodeKind, Tree};

/// Elements serialized without a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Serializes the children of `id`.
pub(super) fn inner_html(tree: &Tree, id: &NodeId) -> Result<String> {
    let mut out = String::new();
    for child in &tree.node(id)?.children {
        write_node(tree, child, &mut out)?;
    }
    Ok(out)
}

/// Serializes `id` itself, including its children.
pub(super) fn outer_html(tree: &Tree, id: &NodeId) -> Result<String> {
    let mut out = String::new();
    write_node(tree, id, &mut out)?;
    Ok(out)
}

fn write_node(tree: &Tree, id: &NodeId, out: &mut String) -> Result<()> {
    let node = tree.node(id)?;
    match &node.kind {
        NodeKind::Text(text) => escape_into(text, false, out),
        NodeKind::Element { tag, attributes } => {
            out.push('<');
            out.push_str(tag);
            for (name, value) in attributes {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                escape_into(value, true, out);
                out.push('"');
            }
            out.push('>');

            if VOID_ELEMENTS.contains(&tag.as_str()) {
                return Ok(());
            }
            for child in &node.children {
                write_node(tree, child, out)?;
            }
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
    }
    Ok(())
}

// ============================================================================
// Parsing
// ============================================================================

/// Parses `html` as the content of a `<body>`.
pub(super) fn parse_fragment(html: &str) -> Vec<Fragment> {
    if html.is_empty() {
        return Vec::new();
    }

    let source = format!("<body>{html}");
    let dom = parse_document(RcDom::default(), ParseOpts::default()).one(source.as_str());

    let Some(body) = find_body(&dom.document) else {
        return Vec::new();
    };
    let children = body.children.borrow();
    children.iter().filter_map(convert).collect()
}

fn find_body(handle: &Handle) -> Option<Handle> {
    if let NodeData::Element { name, .. } = &handle.data
        && &*name.local == "body"
    {
        return Some(handle.clone());
    }
    handle.children.borrow().iter().find_map(find_body)
}

fn convert(handle: &Handle) -> Option<Fragment> {
    match &handle.data {
        NodeData::Text { contents } => Some(Fragment::text(contents.borrow().to_string())),
        NodeData::Element { name, attrs, .. } => {
            let attributes = attrs
                .borrow()
                .iter()
                .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
                .collect();
            let children = handle.children.borrow().iter().filter_map(convert).collect();
            Some(Fragment {
                kind: NodeKind::Element {
                    tag: name.local.to_string(),
                    attributes,
                },
                children,
            })
        }
        _ => None,
    }
}

// ============================================================================
// Escaping
// ============================================================================

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::memory::tree::ParentRef;

    #[test]
    fn test_serialize_nested() {
        let mut tree = Tree::default();
        let div = tree.create(NodeKind::Element {
            tag: "div".into(),
            attributes: vec![("class".into(), "a \"b\"".into())],
        });
        let br = tree.create(NodeKind::Element {
            tag: "br".into(),
            attributes: Vec::new(),
        });
        let text = tree.create(NodeKind::Text("1 < 2 & 3".into()));
        tree.append(ParentRef::Node(div.clone()), &text).unwrap();
        tree.append(ParentRef::Node(div.clone()), &br).unwrap();

        assert_eq!(inner_html(&tree, &div).unwrap(), "1 &lt; 2 &amp; 3<br>");
        assert_eq!(
            outer_html(&tree, &div).unwrap(),
            "<div class=\"a &quot;b&quot;\">1 &lt; 2 &amp; 3<br></div>"
        );
    }

    #[test]
    fn test_parsed_markup_becomes_nodes() {
        let mut tree = Tree::default();
        let div = tree.create(NodeKind::Element {
            tag: "div".into(),
            attributes: Vec::new(),
        });
        tree.replace_children(&div, parse_fragment("say <b class=\"x\">hi</b>!"))
            .unwrap();

        assert_eq!(tree.text_content(&div).unwrap(), "say hi!");
        assert_eq!(tree.element_children(&div).unwrap().len(), 1);
        assert_eq!(inner_html(&tree, &div).unwrap(), "say <b class=\"x\">hi</b>!");
    }

    #[test]
    fn test_parse_fragment_shapes() {
        assert!(parse_fragment("").is_empty());

        let nodes = parse_fragment("  <p>a<!-- note --></p>text");
        assert_eq!(nodes.len(), 3);
        assert!(matches!(&nodes[0].kind, NodeKind::Text(t) if t == "  "));
        assert!(matches!(&nodes[1].kind, NodeKind::Element { tag, .. } if tag == "p"));
        assert_eq!(nodes[1].children.len(), 1);
        assert!(matches!(&nodes[2].kind, NodeKind::Text(t) if t == "text"));
    }

    #[test]
    fn test_parse_fragment_repairs_markup() {
        let mut tree = Tree::default();
        let div = tree.create(NodeKind::Element {
            tag: "div".into(),
            attributes: Vec::new(),
        });
        tree.replace_children(&div, parse_fragment("<ul><li>one<li>two</ul><br>"))
            .unwrap();
        assert_eq!(
            inner_html(&tree, &div).unwrap(),
            "<ul><li>one</li><li>two</li></ul><br>"
        );
    }
}
