//! Core Collection struct and accessors.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::dom::Options;
use crate::error::{Error, Result};
use crate::host::{Host, Target};
use crate::identifiers::NodeId;

use super::Source;

// ============================================================================
// Types
// ============================================================================

/// Mutable part of a collection.
#[derive(Debug, Default, Clone)]
pub(crate) struct CollectionState {
    /// Held targets in host order.
    pub targets: Vec<Target>,
    /// Selector for re-resolution, if built from one.
    pub selector: Option<String>,
}

/// Internal shared state for a collection.
pub(crate) struct CollectionInner {
    /// Host the targets live in.
    pub host: Arc<dyn Host>,
    /// Options inherited from the factory.
    pub options: Options,
    /// Targets and selector.
    pub state: Mutex<CollectionState>,
}

// ============================================================================
// Collection
// ============================================================================

/// An ordered set of host targets with an optional selector.
///
/// Clones share state: `load`, `create` and `remove` are visible through
/// every clone. Traversal methods return new, independent collections.
#[derive(Clone)]
pub struct Collection {
    pub(crate) inner: Arc<CollectionInner>,
}

impl fmt::Debug for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("Collection")
            .field("targets", &state.targets)
            .field("selector", &state.selector)
            .finish_non_exhaustive()
    }
}

impl Collection {
    /// Creates a collection from already resolved parts.
    pub(crate) fn with_targets(
        host: Arc<dyn Host>,
        options: Options,
        targets: Vec<Target>,
        selector: Option<String>,
    ) -> Self {
        Self {
            inner: Arc::new(CollectionInner {
                host,
                options,
                state: Mutex::new(CollectionState { targets, selector }),
            }),
        }
    }

    /// Builds a collection from any [`Source`].
    pub(crate) async fn from_source(
        host: Arc<dyn Host>,
        options: Options,
        source: Source,
    ) -> Result<Self> {
        let (targets, selector) = match source {
            Source::Existing(collection) => return Ok(collection),
            Source::Root(root) => (vec![Target::from(root)], None),
            Source::Element(id) => (vec![Target::Element(id)], None),
            Source::List(ids) => (ids.into_iter().map(Target::Element).collect(), None),
            Source::NodeList(list) => (list.items().into_iter().map(Target::Element).collect(), None),
            Source::Selector(selector) => {
                let found = host.query_all(None, &selector).await?;
                debug!(%selector, count = found.len(), "Resolved selector");
                (found.into_iter().map(Target::Element).collect(), Some(selector))
            }
            Source::Lazy(selector) => (Vec::new(), Some(selector)),
        };

        Ok(Self::with_targets(host, options, targets, selector))
    }

    /// New collection over `targets` sharing this one's host and options.
    pub(crate) fn derive(&self, targets: Vec<Target>) -> Self {
        Self::with_targets(
            Arc::clone(&self.inner.host),
            self.inner.options,
            targets,
            None,
        )
    }

    /// One-element collection for callback contexts.
    pub(crate) fn single(&self, target: Target) -> Self {
        self.derive(vec![target])
    }

    /// Replaces the held targets.
    pub(crate) fn set_targets(&self, targets: Vec<Target>) {
        self.inner.state.lock().targets = targets;
    }
}

// ============================================================================
// Collection - Accessors
// ============================================================================

impl Collection {
    /// Returns the host.
    #[inline]
    #[must_use]
    pub fn host(&self) -> &Arc<dyn Host> {
        &self.inner.host
    }

    /// Returns the options inherited from the factory.
    #[inline]
    #[must_use]
    pub fn options(&self) -> Options {
        self.inner.options
    }

    /// Snapshot of the held targets.
    #[must_use]
    pub fn targets(&self) -> Vec<Target> {
        self.inner.state.lock().targets.clone()
    }

    /// Snapshot of the held element IDs, skipping roots.
    #[must_use]
    pub fn nodes(&self) -> Vec<NodeId> {
        self.inner
            .state
            .lock()
            .targets
            .iter()
            .filter_map(|t| t.node().cloned())
            .collect()
    }

    /// First held element, if any.
    #[must_use]
    pub fn first_node(&self) -> Option<NodeId> {
        self.inner
            .state
            .lock()
            .targets
            .iter()
            .find_map(|t| t.node().cloned())
    }

    /// Stored selector.
    #[must_use]
    pub fn selector(&self) -> Option<String> {
        self.inner.state.lock().selector.clone()
    }

    /// Number of held targets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.state.lock().targets.len()
    }

    /// Returns `true` when nothing is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.state.lock().targets.is_empty()
    }

    /// Returns `true` if both handles are the same collection.
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

// ============================================================================
// Collection - Indexing
// ============================================================================

impl Collection {
    /// Returns a new collection with every target (`None`) or just the one
    /// at `index`.
    ///
    /// # Errors
    ///
    /// [`Error::IndexOutOfBounds`] when `index` is past the end.
    pub fn get(&self, index: Option<usize>) -> Result<Collection> {
        let targets = self.targets();
        match index {
            None => Ok(self.derive(targets)),
            Some(i) => targets
                .get(i)
                .cloned()
                .map(|t| self.single(t))
                .ok_or_else(|| Error::index_out_of_bounds(i, targets.len())),
        }
    }

    /// Like `get(Some(0))`.
    pub fn first(&self) -> Result<Collection> {
        self.get(Some(0))
    }
}

// ============================================================================
// Collection - Iteration
// ============================================================================

impl Collection {
    /// Calls `f` with a one-target collection per held target, in order, and
    /// collects the results.
    ///
    /// Callbacks are synchronous. To run host calls per target, map to
    /// futures and join them:
    ///
    /// ```ignore
    /// let texts = futures_util::future::try_join_all(
    ///     items.map(|item| async move { item.text().await }),
    /// )
    /// .await?;
    /// ```
    pub fn map<T, F>(&self, f: F) -> Vec<T>
    where
        F: FnMut(Collection) -> T,
    {
        self.targets()
            .into_iter()
            .map(|t| self.single(t))
            .map(f)
            .collect()
    }

    /// Calls `f` with a one-target collection per held target, in order.
    pub fn for_each<F>(&self, mut f: F) -> &Self
    where
        F: FnMut(Collection),
    {
        for target in self.targets() {
            f(self.single(target));
        }
        self
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::Dom;
    use crate::host::{MemoryDocument, NodeList, Root};

    #[test]
    fn test_collection_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<Collection>();
    }

    #[test]
    fn test_collection_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Collection>();
    }

    #[tokio::test]
    async fn test_existing_collection_is_identity() {
        let dom = Dom::new(MemoryDocument::new());
        let original = dom.lazy("p");
        let wrapped = dom.wrap(&original).await.unwrap();
        assert!(wrapped.ptr_eq(&original));

        let copy = original.get(None).unwrap();
        assert!(!copy.ptr_eq(&original));
    }

    #[tokio::test]
    async fn test_root_and_element_are_single() {
        let doc = MemoryDocument::new();
        let p = doc.insert(None, "p", &[]).unwrap();
        let dom = Dom::new(doc);

        let window = dom.wrap(Root::Window).await.unwrap();
        assert_eq!(window.targets(), vec![Target::Window]);

        let element = dom.wrap(p.clone()).await.unwrap();
        assert_eq!(element.targets(), vec![Target::Element(p)]);
        assert!(element.selector().is_none());
    }

    #[tokio::test]
    async fn test_node_list_is_snapshot() {
        let doc = MemoryDocument::new();
        let list = doc.insert(None, "ul", &[]).unwrap();
        doc.insert(Some(&list), "li", &[]).unwrap();
        let live = Arc::new(doc.live("li").unwrap());
        let dom = Dom::new(doc.clone());

        let collection = dom.wrap(Arc::clone(&live)).await.unwrap();
        doc.insert(Some(&list), "li", &[]).unwrap();

        assert_eq!(live.items().len(), 2);
        assert_eq!(collection.len(), 1);
    }

    #[tokio::test]
    async fn test_get_index() {
        let doc = MemoryDocument::new();
        let a = doc.insert(None, "p", &[]).unwrap();
        let b = doc.insert(None, "p", &[]).unwrap();
        let dom = Dom::new(doc);
        let all = dom.select("p").await.unwrap();

        assert_eq!(all.get(Some(1)).unwrap().nodes(), vec![b]);
        assert_eq!(all.first().unwrap().nodes(), vec![a]);
        assert_eq!(all.get(None).unwrap().len(), 2);

        let err = all.get(Some(2)).unwrap_err();
        assert!(matches!(err, Error::IndexOutOfBounds { index: 2, len: 2 }));
    }

    #[tokio::test]
    async fn test_map_and_for_each_visit_in_order() {
        let doc = MemoryDocument::new();
        let ids: Vec<_> = (0..3).map(|_| doc.insert(None, "li", &[]).unwrap()).collect();
        let dom = Dom::new(doc);
        let items = dom.select("li").await.unwrap();

        let mapped = items.map(|item| {
            assert_eq!(item.len(), 1);
            assert!(!item.ptr_eq(&items));
            item.first_node().unwrap()
        });
        assert_eq!(mapped, ids);

        let mut seen = Vec::new();
        let returned = items.for_each(|item| seen.extend(item.nodes()));
        assert!(returned.ptr_eq(&items));
        assert_eq!(seen, ids);

        assert!(dom.empty().map(|c| c.len()).is_empty());
    }

    proptest! {
        #[test]
        fn prop_list_construction_preserves_order(ids in proptest::collection::vec("[a-z]{1,8}", 0..16)) {
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let dom = Dom::new(MemoryDocument::new());
            let nodes: Vec<NodeId> = ids.iter().map(NodeId::new).collect();

            let collection = runtime.block_on(dom.wrap(nodes.clone())).unwrap();
            prop_assert_eq!(collection.nodes(), nodes);
            prop_assert!(collection.selector().is_none());
        }
    }
}
