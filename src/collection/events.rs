//! Event binding, triggering and element actions.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::{Arc, Weak};

use tracing::debug;

use crate::dom::Options;
use crate::error::{Error, Result};
use crate::host::{Event, Host, Listener, Target, events};
use crate::identifiers::HandlerId;

use super::Collection;

// ============================================================================
// Handler
// ============================================================================

/// Handler callback type.
///
/// Receives a one-element collection holding the target the listener is
/// bound to, and the event.
pub type HandlerFn = Arc<dyn Fn(Collection, &Event) + Send + Sync>;

/// An event handler with a stable identity.
///
/// Pass the same `Handler` to [`Collection::unbind`] to remove what
/// [`Collection::bind`] registered. Clones share the identity.
#[derive(Clone)]
pub struct Handler {
    id: HandlerId,
    callback: HandlerFn,
}

impl Handler {
    /// Wraps `callback` with a fresh identity.
    pub fn new(callback: impl Fn(Collection, &Event) + Send + Sync + 'static) -> Self {
        Self {
            id: HandlerId::generate(),
            callback: Arc::new(callback),
        }
    }

    /// Returns the identity.
    #[inline]
    #[must_use]
    pub fn id(&self) -> HandlerId {
        self.id
    }

    /// Listener that builds its context collection on each call.
    fn listener(&self, host: Weak<dyn Host>, options: Options, target: Target) -> Listener {
        let callback = Arc::clone(&self.callback);
        Listener::new(self.id, move |event| {
            let Some(host) = host.upgrade() else {
                return;
            };
            let context = Collection::with_targets(host, options, vec![target.clone()], None);
            callback(context, event);
        })
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// EventNames
// ============================================================================

/// One event name or an ordered list of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventNames(Vec<String>);

impl EventNames {
    /// Names in order.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl From<&str> for EventNames {
    fn from(name: &str) -> Self {
        Self(vec![name.to_string()])
    }
}

impl From<String> for EventNames {
    fn from(name: String) -> Self {
        Self(vec![name])
    }
}

impl From<Vec<String>> for EventNames {
    fn from(names: Vec<String>) -> Self {
        Self(names)
    }
}

impl From<Vec<&str>> for EventNames {
    fn from(names: Vec<&str>) -> Self {
        Self(names.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for EventNames {
    fn from(names: &[&str]) -> Self {
        Self(names.iter().map(|n| (*n).to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for EventNames {
    fn from(names: [&str; N]) -> Self {
        Self(names.iter().map(|n| (*n).to_string()).collect())
    }
}

// ============================================================================
// Trigger
// ============================================================================

/// What [`Collection::trigger`] fires.
#[derive(Debug, Clone)]
pub enum Trigger {
    /// The native action of that name if the target has one, otherwise a
    /// synthetic event.
    Name(String),
    /// Always dispatched as given.
    Event(Event),
}

impl From<&str> for Trigger {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for Trigger {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<Event> for Trigger {
    fn from(event: Event) -> Self {
        Self::Event(event)
    }
}

// ============================================================================
// Collection - Events
// ============================================================================

impl Collection {
    /// Registers `handler` for every name on every held target.
    ///
    /// Binding the same handler twice to one target and event registers it
    /// once.
    pub async fn bind(&self, names: impl Into<EventNames>, handler: &Handler) -> Result<()> {
        let names = names.into();
        let host = &self.inner.host;
        let targets = self.targets();

        for target in &targets {
            for name in names.as_slice() {
                let listener =
                    handler.listener(Arc::downgrade(host), self.inner.options, target.clone());
                host.add_listener(target, name, listener).await?;
            }
        }

        debug!(handler = %handler.id, names = ?names.as_slice(), count = targets.len(), "Bound handler");
        Ok(())
    }

    /// Removes `handler` for every name from every held target.
    pub async fn unbind(&self, names: impl Into<EventNames>, handler: &Handler) -> Result<()> {
        let names = names.into();
        let host = &self.inner.host;
        let mut removed = 0usize;

        for target in self.targets() {
            for name in names.as_slice() {
                if host.remove_listener(&target, name, handler.id).await? {
                    removed += 1;
                }
            }
        }

        debug!(handler = %handler.id, names = ?names.as_slice(), removed, "Unbound handler");
        Ok(())
    }

    /// Fires an event on every held target.
    ///
    /// A [`Trigger::Name`] runs the target's native action when it has one
    /// (so `click` on a checkbox toggles it) and falls back to a synthetic
    /// event otherwise.
    pub async fn trigger(&self, trigger: impl Into<Trigger>) -> Result<()> {
        let trigger = trigger.into();
        let host = &self.inner.host;

        for target in self.targets() {
            match &trigger {
                Trigger::Name(name) => {
                    if !host.invoke_action(&target, name).await? {
                        host.dispatch(&target, &Event::new(name.as_str())).await?;
                    }
                }
                Trigger::Event(event) => host.dispatch(&target, event).await?,
            }
        }

        debug!(trigger = ?trigger, "Triggered");
        Ok(())
    }

    /// Clicks every held target.
    pub async fn click(&self) -> Result<()> {
        self.trigger(events::CLICK).await
    }

    /// Focuses the held target at `index`.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyCollection`] when nothing is held.
    /// - [`Error::IndexOutOfBounds`] when `index` is past the end.
    /// - [`Error::NotAnElement`] when the target at `index` is a root.
    pub async fn focus(&self, index: usize) -> Result<()> {
        let targets = self.targets();
        if targets.is_empty() {
            return Err(Error::empty_collection("focus"));
        }
        let target = targets
            .get(index)
            .ok_or_else(|| Error::index_out_of_bounds(index, targets.len()))?;
        if target.node().is_none() {
            return Err(Error::not_an_element("focus"));
        }

        self.inner.host.invoke_action(target, events::FOCUS).await?;
        Ok(())
    }

    /// Blurs every held element.
    pub async fn blur(&self) -> Result<()> {
        for node in self.nodes() {
            self.inner
                .host
                .invoke_action(&Target::Element(node), events::BLUR)
                .await?;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;
    use serde_json::{Value, json};

    use super::*;
    use crate::Dom;
    use crate::host::MemoryDocument;
    use crate::identifiers::NodeId;

    fn recorder() -> (Handler, Arc<Mutex<Vec<(NodeId, Value)>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let handler = Handler::new(move |context, event| {
            let node = context.first_node().expect("context holds one element");
            assert_eq!(context.len(), 1);
            sink.lock().push((node, event.detail.clone()));
        });
        (handler, seen)
    }

    fn buttons(n: usize) -> (MemoryDocument, Dom, Vec<NodeId>) {
        let doc = MemoryDocument::new();
        let ids = (0..n)
            .map(|_| doc.insert(None, "button", &[]).unwrap())
            .collect();
        (doc.clone(), Dom::new(doc), ids)
    }

    #[tokio::test]
    async fn test_bind_then_trigger_once_per_element() {
        let (_, dom, ids) = buttons(3);
        let all = dom.select("button").await.unwrap();
        let (handler, seen) = recorder();

        all.bind("ping", &handler).await.unwrap();
        all.trigger("ping").await.unwrap();

        let nodes: Vec<_> = seen.lock().iter().map(|(n, _)| n.clone()).collect();
        assert_eq!(nodes, ids);
    }

    #[tokio::test]
    async fn test_bind_twice_registers_once() {
        let (doc, dom, ids) = buttons(1);
        let all = dom.select("button").await.unwrap();
        let (handler, seen) = recorder();

        all.bind("ping", &handler).await.unwrap();
        all.bind(["ping"], &handler).await.unwrap();
        assert_eq!(doc.listener_count(&Target::Element(ids[0].clone()), "ping"), 1);

        all.trigger("ping").await.unwrap();
        assert_eq!(seen.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_unbind_multiple_names() {
        let (doc, dom, ids) = buttons(2);
        let all = dom.select("button").await.unwrap();
        let (handler, seen) = recorder();

        all.bind(vec!["a", "b"], &handler).await.unwrap();
        all.unbind(["a", "b"], &handler).await.unwrap();
        all.trigger("a").await.unwrap();
        all.trigger("b").await.unwrap();

        assert!(seen.lock().is_empty());
        assert_eq!(doc.listener_count(&Target::Element(ids[1].clone()), "b"), 0);
    }

    #[tokio::test]
    async fn test_trigger_event_carries_detail() {
        let (_, dom, _) = buttons(1);
        let all = dom.select("button").await.unwrap();
        let (handler, seen) = recorder();

        all.bind("custom", &handler).await.unwrap();
        all.trigger(Event::new("custom").with_detail(json!({"n": 1})))
            .await
            .unwrap();

        assert_eq!(seen.lock()[0].1, json!({"n": 1}));
    }

    #[tokio::test]
    async fn test_native_click_takes_precedence() {
        let doc = MemoryDocument::new();
        doc.insert(None, "input", &[("type", "checkbox")]).unwrap();
        let dom = Dom::new(doc);
        let checkbox = dom.select("input").await.unwrap();
        let (handler, seen) = recorder();

        checkbox.bind(events::CLICK, &handler).await.unwrap();
        checkbox.click().await.unwrap();

        assert_eq!(seen.lock().len(), 1);
        let err = checkbox.prop("checked").await.unwrap_err();
        assert!(matches!(err, Error::UnknownField { .. }));
        let checked = checkbox
            .host()
            .get_property(&checkbox.targets()[0], "checked")
            .await
            .unwrap();
        assert_eq!(checked, json!(true));
    }

    #[tokio::test]
    async fn test_focus_and_blur() {
        let (doc, dom, ids) = buttons(2);
        let all = dom.select("button").await.unwrap();
        let (handler, seen) = recorder();
        all.bind(["focus", "blur"], &handler).await.unwrap();

        all.focus(0).await.unwrap();
        assert_eq!(doc.focused(), Some(ids[0].clone()));

        all.blur().await.unwrap();
        assert_eq!(doc.focused(), None);
        assert_eq!(seen.lock().len(), 2);
    }

    #[tokio::test]
    async fn test_focus_by_index() {
        let (doc, dom, ids) = buttons(3);
        let all = dom.select("button").await.unwrap();

        all.focus(2).await.unwrap();
        assert_eq!(doc.focused(), Some(ids[2].clone()));
        all.focus(1).await.unwrap();
        assert_eq!(doc.focused(), Some(ids[1].clone()));

        let err = all.focus(3).await.unwrap_err();
        assert!(matches!(err, Error::IndexOutOfBounds { index: 3, len: 3 }));
        assert_eq!(doc.focused(), Some(ids[1].clone()));
    }

    #[tokio::test]
    async fn test_focus_errors() {
        let dom = Dom::new(MemoryDocument::new());
        let err = dom.empty().focus(0).await.unwrap_err();
        assert!(matches!(err, Error::EmptyCollection { .. }));

        let err = dom.window().focus(0).await.unwrap_err();
        assert!(matches!(err, Error::NotAnElement { .. }));
    }

    #[tokio::test]
    async fn test_window_listener() {
        let dom = Dom::new(MemoryDocument::new());
        let window = dom.window();
        let hits = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&hits);
        let handler = Handler::new(move |context, _| {
            assert_eq!(context.targets(), vec![Target::Window]);
            *sink.lock() += 1;
        });

        window.bind("resize", &handler).await.unwrap();
        window.trigger("resize").await.unwrap();
        assert_eq!(*hits.lock(), 1);
    }
}
