//! Mutation: remove, child replacement, re-resolution and creation.

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::host::Target;
use crate::identifiers::NodeId;

use super::{Collection, Field};

// ============================================================================
// Child
// ============================================================================

/// New child content for [`Collection::set_children`].
#[derive(Debug, Clone)]
pub enum Child {
    /// An existing node, moved into place.
    Node(NodeId),
    /// Text, appended as a new text node.
    Text(String),
    /// Every element held by the collection, in order.
    Collection(Collection),
}

impl From<NodeId> for Child {
    fn from(id: NodeId) -> Self {
        Self::Node(id)
    }
}

impl From<&str> for Child {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Child {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Collection> for Child {
    fn from(collection: Collection) -> Self {
        Self::Collection(collection)
    }
}

impl From<&Collection> for Child {
    fn from(collection: &Collection) -> Self {
        Self::Collection(collection.clone())
    }
}

// ============================================================================
// Collection - Mutation
// ============================================================================

impl Collection {
    /// Detaches every held element and empties the collection.
    ///
    /// Root targets are skipped. Other collections holding the same
    /// elements keep them.
    ///
    /// # Errors
    ///
    /// Returns the first detach failure. Every other element is still
    /// detached, and the collection keeps only the targets that failed.
    pub async fn remove(&self) -> Result<()> {
        let targets = self.targets();
        if targets.is_empty() {
            return Ok(());
        }

        let mut failed = Vec::new();
        let mut first_error = None;
        let mut detached = 0usize;
        for target in targets {
            let Some(node) = target.node() else {
                continue;
            };
            let result = self.inner.host.detach(node).await;
            match result {
                Ok(()) => detached += 1,
                Err(e) => {
                    warn!(node_id = %node, error = %e, "Detach failed");
                    first_error.get_or_insert(e);
                    failed.push(target);
                }
            }
        }
        self.set_targets(failed);

        debug!(count = detached, "Removed elements");
        first_error.map_or(Ok(()), Err)
    }

    /// Replaces the children of every held element.
    ///
    /// Each element is cleared, then `children` are appended in order. Text
    /// becomes a new text node per element. Existing nodes move, so with
    /// several elements held they end up under the last one.
    ///
    /// # Errors
    ///
    /// [`Error::NotAnElement`] when a root is held. Nothing is changed then.
    pub async fn set_children<I>(&self, children: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<Child>,
    {
        let parents = self
            .targets()
            .into_iter()
            .map(|target| match target {
                Target::Element(node) => Ok(node),
                Target::Window | Target::Document => Err(Error::not_an_element("set children")),
            })
            .collect::<Result<Vec<_>>>()?;
        let children: Vec<Child> = children.into_iter().map(Into::into).collect();

        let host = &self.inner.host;
        let mut appended = 0usize;
        for parent in &parents {
            host.clear_children(parent).await?;
            for child in &children {
                match child {
                    Child::Node(node) => {
                        host.append_child(parent, node).await?;
                        appended += 1;
                    }
                    Child::Text(text) => {
                        let node = host.create_text(text).await?;
                        host.append_child(parent, &node).await?;
                        appended += 1;
                    }
                    Child::Collection(collection) => {
                        for node in collection.nodes() {
                            host.append_child(parent, &node).await?;
                            appended += 1;
                        }
                    }
                }
            }
        }

        debug!(count = parents.len(), appended, "Replaced children");
        Ok(())
    }

    /// Re-runs the stored selector and returns the number of matches.
    ///
    /// # Errors
    ///
    /// [`Error::NoSelector`] when the collection was not built from a
    /// selector.
    pub async fn load(&self) -> Result<usize> {
        let selector = self
            .selector()
            .ok_or_else(|| Error::no_selector("load"))?;

        let found = self.inner.host.query_all(None, &selector).await?;
        let count = found.len();
        self.set_targets(found.into_iter().map(Target::Element).collect());

        debug!(%selector, count, "Loaded selector");
        Ok(count)
    }

    /// Like [`load`](Self::load), returning the collection for chaining.
    pub async fn fetch(&self) -> Result<Collection> {
        self.load().await?;
        Ok(self.clone())
    }

    /// Replaces the contents with one new, detached element whose tag is the
    /// stored selector, then writes each of `properties` to it in order. The
    /// selector is cleared.
    ///
    /// ```ignore
    /// let link = dom
    ///     .lazy("a")
    ///     .create([(Field::Href, json!("/home")), (Field::Text, json!("Home"))])
    ///     .await?;
    /// ```
    ///
    /// # Errors
    ///
    /// - [`Error::NoSelector`] when no selector is stored.
    /// - Any field write failure. The collection is left unchanged then.
    pub async fn create<I>(&self, properties: I) -> Result<Collection>
    where
        I: IntoIterator<Item = (Field, Value)>,
    {
        let tag = self
            .selector()
            .ok_or_else(|| Error::no_selector("create"))?;

        let node = self.inner.host.create_element(&tag).await?;
        let created = self.single(Target::Element(node.clone()));
        for (field, value) in properties {
            created.set_field(field, value).await?;
        }
        {
            let mut state = self.inner.state.lock();
            state.targets = vec![Target::Element(node.clone())];
            state.selector = None;
        }

        debug!(%tag, node_id = %node, "Created element");
        Ok(self.clone())
    }
}

// ============================================================================
// Tests
// ============================================================================
