//! The collection factory.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::collection::{Collection, Source};
use crate::error::Result;
use crate::host::{Host, Root, Target};

use super::builder::DomBuilder;
use super::options::Options;

// ============================================================================
// Types
// ============================================================================

/// Internal shared state for a [`Dom`].
pub(crate) struct DomInner {
    /// Host every collection talks to.
    pub host: Arc<dyn Host>,
    /// Options handed to every collection.
    pub options: Options,
}

// ============================================================================
// Dom
// ============================================================================

/// Entry point: wraps selectors, handles and lists into [`Collection`]s.
///
/// # Example
///
/// ```ignore
/// use domq::{Dom, host::MemoryDocument};
///
/// let dom = Dom::new(MemoryDocument::new());
/// let items = dom.select("ul > li").await?;
/// items.set_field(Field::Title, "entry").await?;
/// ```
#[derive(Clone)]
pub struct Dom {
    pub(crate) inner: Arc<DomInner>,
}

impl fmt::Debug for Dom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dom")
            .field("options", &self.inner.options)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl Dom {
    /// Creates a factory over `host` with default options.
    #[must_use]
    pub fn new(host: impl Host) -> Self {
        Self::with_options(Arc::new(host), Options::default())
    }

    /// Creates a configuration builder.
    #[inline]
    #[must_use]
    pub fn builder() -> DomBuilder {
        DomBuilder::new()
    }

    pub(crate) fn with_options(host: Arc<dyn Host>, options: Options) -> Self {
        Self {
            inner: Arc::new(DomInner { host, options }),
        }
    }
}

// ============================================================================
// Accessors
// ============================================================================

impl Dom {
    /// Returns the host.
    #[inline]
    #[must_use]
    pub fn host(&self) -> &Arc<dyn Host> {
        &self.inner.host
    }

    /// Returns the options.
    #[inline]
    #[must_use]
    pub fn options(&self) -> Options {
        self.inner.options
    }
}

// ============================================================================
// Factory
// ============================================================================

impl Dom {
    /// Wraps any supported source into a collection.
    ///
    /// A selector source is resolved immediately. An existing collection
    /// is returned unchanged.
    pub async fn wrap(&self, source: impl Into<Source>) -> Result<Collection> {
        let source = source.into();
        debug!(kind = source.kind(), "Wrapping source");
        Collection::from_source(
            Arc::clone(&self.inner.host),
            self.inner.options,
            source,
        )
        .await
    }

    /// Wraps a dynamically shaped value.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`](crate::Error::InvalidArgument) when the
    /// value is not a selector string, element reference, root reference or
    /// array of element references.
    pub async fn wrap_value(&self, value: &Value) -> Result<Collection> {
        let source = Source::try_from(value)?;
        self.wrap(source).await
    }

    /// Resolves `selector` now.
    pub async fn select(&self, selector: &str) -> Result<Collection> {
        self.wrap(Source::Selector(selector.to_string())).await
    }

    /// Stores `selector` without resolving it.
    #[must_use]
    pub fn lazy(&self, selector: &str) -> Collection {
        Collection::with_targets(
            Arc::clone(&self.inner.host),
            self.inner.options,
            Vec::new(),
            Some(selector.to_string()),
        )
    }

    /// Collection holding the window.
    #[must_use]
    pub fn window(&self) -> Collection {
        self.root(Root::Window)
    }

    /// Collection holding the document.
    #[must_use]
    pub fn document(&self) -> Collection {
        self.root(Root::Document)
    }

    /// An empty collection with no selector.
    #[must_use]
    pub fn empty(&self) -> Collection {
        Collection::with_targets(
            Arc::clone(&self.inner.host),
            self.inner.options,
            Vec::new(),
            None,
        )
    }

    fn root(&self, root: Root) -> Collection {
        Collection::with_targets(
            Arc::clone(&self.inner.host),
            self.inner.options,
            vec![Target::from(root)],
            None,
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::Error;
    use crate::host::MemoryDocument;

    #[test]
    fn test_dom_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<Dom>();
    }

    #[tokio::test]
    async fn test_select_resolves_immediately() {
        let doc = MemoryDocument::new();
        let a = doc.insert(None, "p", &[]).unwrap();
        let b = doc.insert(None, "p", &[]).unwrap();
        let dom = Dom::new(doc);

        let paragraphs = dom.select("p").await.unwrap();
        assert_eq!(paragraphs.nodes(), vec![a, b]);
        assert_eq!(paragraphs.selector().as_deref(), Some("p"));
    }

    #[tokio::test]
    async fn test_lazy_does_not_resolve() {
        let doc = MemoryDocument::new();
        doc.insert(None, "p", &[]).unwrap();
        let dom = Dom::new(doc);

        let lazy = dom.lazy("p");
        assert!(lazy.is_empty());
        assert_eq!(lazy.load().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_wrap_value_rejects_number() {
        let dom = Dom::new(MemoryDocument::new());
        let err = dom.wrap_value(&json!(42)).await.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
    }

    #[tokio::test]
    async fn test_wrap_value_shapes() -> anyhow::Result<()> {
        let doc = MemoryDocument::new();
        let a = doc.insert(None, "p", &[])?;
        let b = doc.insert(None, "p", &[])?;
        let dom = Dom::new(doc);

        let list = dom
            .wrap_value(&json!([{"elementId": b.as_str()}, {"elementId": a.as_str()}]))
            .await?;
        assert_eq!(list.nodes(), vec![b, a]);

        let window = dom.wrap_value(&json!({"root": "window"})).await?;
        assert_eq!(window.targets(), vec![Target::Window]);

        let selected = dom.wrap_value(&json!("p")).await?;
        assert_eq!(selected.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_roots() {
        let dom = Dom::new(MemoryDocument::new());
        assert_eq!(dom.window().targets(), vec![Target::Window]);
        assert_eq!(dom.document().targets(), vec![Target::Document]);
        assert!(dom.empty().is_empty());
    }
}
