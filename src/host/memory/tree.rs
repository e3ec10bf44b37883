//! Node storage and tree operations for [`MemoryDocument`](super::MemoryDocument).

// ============================================================================
// Imports
// ============================================================================

use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::identifiers::NodeId;

// ============================================================================
// Types
// ============================================================================

/// What a node is.
#[derive(Debug, Clone)]
pub(super) enum NodeKind {
    /// An element with ordered attributes.
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
    },
    /// A text node.
    Text(String),
}

/// A detached subtree waiting to be built into the table.
#[derive(Debug, Clone)]
pub(super) struct Fragment {
    pub kind: NodeKind,
    pub children: Vec<Fragment>,
}

impl Fragment {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Text(text.into()),
            children: Vec::new(),
        }
    }
}

/// Where a node hangs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum ParentRef {
    Document,
    Node(NodeId),
}

#[derive(Debug, Clone)]
pub(super) struct Node {
    pub kind: NodeKind,
    pub parent: Option<ParentRef>,
    pub children: Vec<NodeId>,
    /// Expando properties not reflected to attributes.
    pub properties: FxHashMap<String, Value>,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            properties: FxHashMap::default(),
        }
    }

    pub fn tag(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element { tag, .. } => Some(tag),
            NodeKind::Text(_) => None,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        match &self.kind {
            NodeKind::Element { attributes, .. } => attributes
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str()),
            NodeKind::Text(_) => None,
        }
    }
}

// ============================================================================
// Tree
// ============================================================================

/// Flat node table plus the document's own child list.
///
/// Detached elements stay in the table so handles to them keep resolving.
/// Text nodes replaced through [`Tree::replace_children`] are dropped.
#[derive(Debug, Default)]
pub(super) struct Tree {
    nodes: FxHashMap<NodeId, Node>,
    roots: Vec<NodeId>,
}

impl Tree {
    pub fn node(&self, id: &NodeId) -> Result<&Node> {
        self.nodes
            .get(id)
            .ok_or_else(|| Error::node_not_found(id.clone()))
    }

    pub fn node_mut(&mut self, id: &NodeId) -> Result<&mut Node> {
        self.nodes
            .get_mut(id)
            .ok_or_else(|| Error::node_not_found(id.clone()))
    }

    /// Returns the element's tag, or `NotAnElement` for text nodes.
    pub fn tag(&self, id: &NodeId) -> Result<&str> {
        self.node(id)?
            .tag()
            .ok_or_else(|| Error::not_an_element("read tag name"))
    }

    pub fn create(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId::generate();
        self.nodes.insert(id.clone(), Node::new(kind));
        id
    }

    pub fn children_of(&self, parent: &ParentRef) -> Result<&[NodeId]> {
        match parent {
            ParentRef::Document => Ok(&self.roots),
            ParentRef::Node(id) => Ok(&self.node(id)?.children),
        }
    }

    fn children_mut(&mut self, parent: &ParentRef) -> Result<&mut Vec<NodeId>> {
        match parent {
            ParentRef::Document => Ok(&mut self.roots),
            ParentRef::Node(id) => Ok(&mut self.node_mut(id)?.children),
        }
    }

    pub fn element_children(&self, id: &NodeId) -> Result<Vec<NodeId>> {
        Ok(self
            .node(id)?
            .children
            .iter()
            .filter(|child| self.nodes.get(*child).is_some_and(|n| n.tag().is_some()))
            .cloned()
            .collect())
    }

    /// Parent element of `id`, skipping the document.
    pub fn parent_element(&self, id: &NodeId) -> Option<&NodeId> {
        match self.nodes.get(id)?.parent.as_ref()? {
            ParentRef::Node(parent) => Some(parent),
            ParentRef::Document => None,
        }
    }

    /// Returns `true` if `ancestor` is `id` or contains it.
    pub fn is_inclusive_ancestor(&self, ancestor: &NodeId, id: &NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent_element(node);
        }
        false
    }

    /// Elements below `scope` (or the whole document) in document order.
    pub fn descendant_elements(&self, scope: Option<&NodeId>) -> Result<Vec<NodeId>> {
        let start: &[NodeId] = match scope {
            Some(id) => &self.node(id)?.children,
            None => &self.roots,
        };

        let mut out = Vec::new();
        let mut stack: Vec<&NodeId> = start.iter().rev().collect();
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            if node.tag().is_some() {
                out.push(id.clone());
            }
            stack.extend(node.children.iter().rev());
        }
        Ok(out)
    }

    pub fn detach(&mut self, id: &NodeId) -> Result<()> {
        let Some(parent) = self.node_mut(id)?.parent.take() else {
            return Ok(());
        };
        self.children_mut(&parent)?.retain(|child| child != id);
        Ok(())
    }

    pub fn append(&mut self, parent: ParentRef, child: &NodeId) -> Result<()> {
        self.node(child)?;
        if let ParentRef::Node(parent_id) = &parent {
            self.node(parent_id)?;
            if self.is_inclusive_ancestor(child, parent_id) {
                return Err(Error::hierarchy(format!(
                    "cannot append {child} into itself or its descendant {parent_id}"
                )));
            }
        }

        self.detach(child)?;
        self.children_mut(&parent)?.push(child.clone());
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Detaches every child of `id` and returns them.
    pub fn clear_children(&mut self, id: &NodeId) -> Result<Vec<NodeId>> {
        let children = std::mem::take(&mut self.node_mut(id)?.children);
        for child in &children {
            if let Some(node) = self.nodes.get_mut(child) {
                node.parent = None;
            }
        }
        Ok(children)
    }

    /// Builds `fragment` as a detached subtree and returns its root.
    pub fn build(&mut self, fragment: Fragment) -> Result<NodeId> {
        let id = self.create(fragment.kind);
        for child in fragment.children {
            let child = self.build(child)?;
            self.append(ParentRef::Node(id.clone()), &child)?;
        }
        Ok(id)
    }

    pub fn text_content(&self, id: &NodeId) -> Result<String> {
        let mut out = String::new();
        self.collect_text(id, &mut out)?;
        Ok(out)
    }

    fn collect_text(&self, id: &NodeId, out: &mut String) -> Result<()> {
        let node = self.node(id)?;
        match &node.kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Element { .. } => {
                for child in &node.children {
                    self.collect_text(child, out)?;
                }
            }
        }
        Ok(())
    }

    pub fn set_attribute(&mut self, id: &NodeId, name: &str, value: &str) -> Result<()> {
        let NodeKind::Element { attributes, .. } = &mut self.node_mut(id)?.kind else {
            return Err(Error::not_an_element("set attribute"));
        };
        let name = name.to_ascii_lowercase();
        match attributes.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value.to_string(),
            None => attributes.push((name, value.to_string())),
        }
        Ok(())
    }

    pub fn remove_attribute(&mut self, id: &NodeId, name: &str) -> Result<()> {
        if let NodeKind::Element { attributes, .. } = &mut self.node_mut(id)?.kind {
            attributes.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        }
        Ok(())
    }

    /// Replaces all children of `id` with `fragments`, in order.
    ///
    /// Replaced text nodes are removed from the table.
    pub fn replace_children(&mut self, id: &NodeId, fragments: Vec<Fragment>) -> Result<()> {
        for old in self.clear_children(id)? {
            if self.nodes.get(&old).is_some_and(|n| n.tag().is_none()) {
                self.nodes.remove(&old);
            }
        }
        for fragment in fragments {
            let child = self.build(fragment)?;
            self.append(ParentRef::Node(id.clone()), &child)?;
        }
        Ok(())
    }

    /// Number of nodes in the table, reachable or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }
}

// ============================================================================
// Tests
// ============================================================================
