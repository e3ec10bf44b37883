//! Traversal: parent, find, children.

use tracing::debug;

use crate::error::Result;
use crate::host::Target;

use super::Collection;

// ============================================================================
// Collection - Traversal
// ============================================================================

impl Collection {
    /// Maps each held element to its parent.
    ///
    /// Top-level elements map to the document. Detached elements and root
    /// targets have no parent and are dropped. Duplicates are kept.
    pub async fn parent(&self) -> Result<Collection> {
        let mut parents = Vec::new();
        for target in self.targets() {
            let Target::Element(node) = target else {
                continue;
            };
            if let Some(parent) = self.inner.host.parent(&node).await? {
                parents.push(parent);
            }
        }

        debug!(count = parents.len(), "Resolved parents");
        Ok(self.derive(parents))
    }

    /// Immediate element children (`None`) or all descendants matching
    /// `selector`, concatenated per held target.
    ///
    /// On the window or document a selector searches the whole document.
    pub async fn find(&self, selector: Option<&str>) -> Result<Collection> {
        let host = &self.inner.host;
        let mut found = Vec::new();

        for target in self.targets() {
            let nodes = match selector {
                None => host.children(&target).await?,
                Some(selector) => host.query_all(target.node(), selector).await?,
            };
            found.extend(nodes.into_iter().map(Target::Element));
        }

        debug!(selector = ?selector, count = found.len(), "Find");
        Ok(self.derive(found))
    }

    /// Child nodes of every held target, text nodes included.
    ///
    /// One inner list per target, one single-node collection per child. This
    /// reads back what [`set_children`](Self::set_children) writes; use
    /// `find(None)` for a flat collection of element children.
    pub async fn children(&self) -> Result<Vec<Vec<Collection>>> {
        let host = &self.inner.host;
        let mut out = Vec::new();

        for target in self.targets() {
            let nodes = host.child_nodes(&target).await?;
            out.push(
                nodes
                    .into_iter()
                    .map(|node| self.single(Target::Element(node)))
                    .collect(),
            );
        }

        debug!(count = out.len(), "Read child nodes");
        Ok(out)
    }
}

// ============================================================================
// Tests
// ============================================================================
