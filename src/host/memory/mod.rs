//! In-process DOM host.
//!
//! [`MemoryDocument`] is a complete [`Host`]: a node tree, a small selector
//! engine, listeners, native actions and a ready state that embedders drive
//! through [`MemoryDocument::set_ready_state`].
//!
//! Markup assigned through `innerHTML` is parsed into real nodes, so
//! `textContent` and selectors see what was written.
//!
//! Events do not bubble.
//!
//! # Example
//!
//! ```ignore
//! use domq::host::MemoryDocument;
//!
//! let doc = MemoryDocument::new();
//! let list = doc.insert(None, "ul", &[("id", "menu")])?;
//! doc.insert(Some(&list), "li", &[("class", "item")])?;
//! ```

// ============================================================================
// Submodules
// ============================================================================

mod markup;
mod selector;
mod tree;

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::identifiers::{HandlerId, NodeId};

use super::event::events;
use super::{Event, Host, Listener, NodeList, ReadyState, Target, stringify};

use self::tree::{Fragment, NodeKind, ParentRef, Tree};

pub use self::selector::SelectorGroup;

// ============================================================================
// Constants
// ============================================================================

/// Layout metrics that read as `0` until assigned.
const METRICS: &[&str] = &[
    "clientWidth",
    "clientHeight",
    "offsetWidth",
    "offsetHeight",
    "offsetTop",
    "offsetLeft",
    "scrollWidth",
    "scrollHeight",
    "scrollTop",
    "scrollLeft",
];

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ListenerKey {
    target: Target,
    event: String,
}

struct DocumentState {
    tree: Tree,
    window_properties: FxHashMap<String, Value>,
    document_properties: FxHashMap<String, Value>,
    listeners: FxHashMap<ListenerKey, Vec<Listener>>,
    ready_state: ReadyState,
    focused: Option<NodeId>,
}

// ============================================================================
// MemoryDocument
// ============================================================================

/// A headless DOM document.
///
/// Clones share the same document.
#[derive(Clone)]
pub struct MemoryDocument {
    inner: Arc<Mutex<DocumentState>>,
}

impl fmt::Debug for MemoryDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.lock();
        f.debug_struct("MemoryDocument")
            .field("ready_state", &state.ready_state)
            .field("focused", &state.focused)
            .finish_non_exhaustive()
    }
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl MemoryDocument {
    /// Creates an empty, fully loaded document.
    #[must_use]
    pub fn new() -> Self {
        Self::with_ready_state(ReadyState::Complete)
    }

    /// Creates an empty document that is still loading.
    #[must_use]
    pub fn loading() -> Self {
        Self::with_ready_state(ReadyState::Loading)
    }

    fn with_ready_state(ready_state: ReadyState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(DocumentState {
                tree: Tree::default(),
                window_properties: FxHashMap::default(),
                document_properties: FxHashMap::default(),
                listeners: FxHashMap::default(),
                ready_state,
                focused: None,
            })),
        }
    }
}

// ============================================================================
// Tree Building
// ============================================================================

impl MemoryDocument {
    /// Creates an element and appends it to `parent`, or to the document
    /// when `parent` is `None`.
    pub fn insert(
        &self,
        parent: Option<&NodeId>,
        tag: &str,
        attributes: &[(&str, &str)],
    ) -> Result<NodeId> {
        let tag = validate_tag(tag)?;
        let mut state = self.inner.lock();
        let id = state.tree.create(NodeKind::Element {
            tag,
            attributes: attributes
                .iter()
                .map(|(k, v)| (k.to_ascii_lowercase(), (*v).to_string()))
                .collect(),
        });
        let parent = parent.map_or(ParentRef::Document, |p| ParentRef::Node(p.clone()));
        state.tree.append(parent, &id)?;
        Ok(id)
    }

    /// Appends a text node to `parent`.
    pub fn insert_text(&self, parent: &NodeId, text: &str) -> Result<NodeId> {
        let mut state = self.inner.lock();
        let id = state.tree.create(NodeKind::Text(text.to_string()));
        state.tree.append(ParentRef::Node(parent.clone()), &id)?;
        Ok(id)
    }

    /// Parent of `node` as seen by collections.
    pub fn parent_of(&self, node: &NodeId) -> Result<Option<Target>> {
        let state = self.inner.lock();
        parent_target(&state.tree, node)
    }

    /// Returns `true` if `node` is reachable from the document.
    #[must_use]
    pub fn is_connected(&self, node: &NodeId) -> bool {
        let state = self.inner.lock();
        let mut current = node.clone();
        loop {
            let Ok(n) = state.tree.node(&current) else {
                return false;
            };
            match &n.parent {
                Some(ParentRef::Document) => return true,
                Some(ParentRef::Node(parent)) => current = parent.clone(),
                None => return false,
            }
        }
    }

    /// Number of nodes held, attached or not.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.inner.lock().tree.len()
    }

    /// Runs `selector` synchronously.
    pub fn query(&self, selector: &str) -> Result<Vec<NodeId>> {
        let group = SelectorGroup::parse(selector)?;
        let state = self.inner.lock();
        select(&state.tree, None, &group)
    }

    /// Returns a live node list for `selector`.
    pub fn live(&self, selector: &str) -> Result<LiveNodeList> {
        Ok(LiveNodeList {
            document: self.clone(),
            selector: SelectorGroup::parse(selector)?,
        })
    }
}

// ============================================================================
// Ready State & Events
// ============================================================================

impl MemoryDocument {
    /// Moves the document to `next` and fires the matching signals.
    ///
    /// Skipping from `Loading` straight to `Complete` fires both
    /// `DOMContentLoaded` and `load`. Moving backwards is ignored.
    pub fn set_ready_state(&self, next: ReadyState) {
        let previous = {
            let mut state = self.inner.lock();
            let previous = state.ready_state;
            if next <= previous {
                return;
            }
            state.ready_state = next;
            previous
        };
        debug!(from = previous.as_str(), to = next.as_str(), "Ready state changed");

        self.fire(&Target::Document, &Event::new(events::READY_STATE_CHANGE));
        if previous < ReadyState::Interactive {
            self.fire(&Target::Document, &Event::new(events::DOM_CONTENT_LOADED));
        }
        if next == ReadyState::Complete {
            self.fire(&Target::Window, &Event::new(events::LOAD));
        }
    }

    /// Invokes every listener for `event` on `target`, in registration
    /// order.
    pub fn fire(&self, target: &Target, event: &Event) {
        let listeners = {
            let state = self.inner.lock();
            state
                .listeners
                .get(&ListenerKey {
                    target: target.clone(),
                    event: event.name.clone(),
                })
                .cloned()
                .unwrap_or_default()
        };

        trace!(%target, event = %event.name, count = listeners.len(), "Firing event");
        let event = event.targeted(target);
        for listener in &listeners {
            listener.call(&event);
        }
    }

    /// Number of listeners for `event` on `target`.
    #[must_use]
    pub fn listener_count(&self, target: &Target, event: &str) -> usize {
        let state = self.inner.lock();
        state
            .listeners
            .get(&ListenerKey {
                target: target.clone(),
                event: event.to_string(),
            })
            .map_or(0, Vec::len)
    }

    /// Currently focused element.
    #[must_use]
    pub fn focused(&self) -> Option<NodeId> {
        self.inner.lock().focused.clone()
    }
}

// ============================================================================
// LiveNodeList
// ============================================================================

/// A node list that re-evaluates its selector on every read.
#[derive(Debug, Clone)]
pub struct LiveNodeList {
    document: MemoryDocument,
    selector: SelectorGroup,
}

impl NodeList for LiveNodeList {
    fn items(&self) -> Vec<NodeId> {
        let state = self.document.inner.lock();
        select(&state.tree, None, &self.selector).unwrap_or_default()
    }
}

// ============================================================================
// Host Implementation
// ============================================================================

#[async_trait]
impl Host for MemoryDocument {
    async fn query_all(&self, scope: Option<&NodeId>, selector: &str) -> Result<Vec<NodeId>> {
        let group = SelectorGroup::parse(selector)?;
        let state = self.inner.lock();
        select(&state.tree, scope, &group)
    }

    async fn children(&self, parent: &Target) -> Result<Vec<NodeId>> {
        let state = self.inner.lock();
        match parent {
            Target::Element(node) => state.tree.element_children(node),
            Target::Window | Target::Document => Ok(state
                .tree
                .children_of(&ParentRef::Document)?
                .iter()
                .filter(|id| state.tree.tag(id).is_ok())
                .cloned()
                .collect()),
        }
    }

    async fn child_nodes(&self, parent: &Target) -> Result<Vec<NodeId>> {
        let state = self.inner.lock();
        match parent {
            Target::Element(node) => Ok(state.tree.node(node)?.children.clone()),
            Target::Window | Target::Document => {
                Ok(state.tree.children_of(&ParentRef::Document)?.to_vec())
            }
        }
    }

    async fn parent(&self, node: &NodeId) -> Result<Option<Target>> {
        self.parent_of(node)
    }

    async fn tag_name(&self, node: &NodeId) -> Result<String> {
        Ok(self.inner.lock().tree.tag(node)?.to_string())
    }

    async fn create_element(&self, tag: &str) -> Result<NodeId> {
        let tag = validate_tag(tag)?;
        Ok(self.inner.lock().tree.create(NodeKind::Element {
            tag,
            attributes: Vec::new(),
        }))
    }

    async fn create_text(&self, text: &str) -> Result<NodeId> {
        Ok(self
            .inner
            .lock()
            .tree
            .create(NodeKind::Text(text.to_string())))
    }

    async fn detach(&self, node: &NodeId) -> Result<()> {
        self.inner.lock().tree.detach(node)
    }

    async fn clear_children(&self, node: &NodeId) -> Result<()> {
        self.inner.lock().tree.clear_children(node)?;
        Ok(())
    }

    async fn append_child(&self, parent: &NodeId, child: &NodeId) -> Result<()> {
        self.inner
            .lock()
            .tree
            .append(ParentRef::Node(parent.clone()), child)
    }

    async fn get_property(&self, target: &Target, name: &str) -> Result<Value> {
        let state = self.inner.lock();
        match target {
            Target::Window => Ok(state
                .window_properties
                .get(name)
                .cloned()
                .unwrap_or(Value::Null)),
            Target::Document => Ok(match name {
                "readyState" => Value::String(state.ready_state.as_str().into()),
                "title" => state
                    .document_properties
                    .get(name)
                    .cloned()
                    .unwrap_or_else(|| Value::String(String::new())),
                _ => state
                    .document_properties
                    .get(name)
                    .cloned()
                    .unwrap_or(Value::Null),
            }),
            Target::Element(id) => element_property(&state.tree, id, name),
        }
    }

    async fn set_property(&self, target: &Target, name: &str, value: Value) -> Result<()> {
        let mut state = self.inner.lock();
        match target {
            Target::Window => {
                state.window_properties.insert(name.to_string(), value);
                Ok(())
            }
            Target::Document if name == "readyState" => {
                Err(Error::invalid_argument("document.readyState is read-only"))
            }
            Target::Document => {
                state.document_properties.insert(name.to_string(), value);
                Ok(())
            }
            Target::Element(id) => set_element_property(&mut state.tree, id, name, value),
        }
    }

    async fn get_attribute(&self, node: &NodeId, name: &str) -> Result<Option<String>> {
        let state = self.inner.lock();
        let node = state.tree.node(node)?;
        if node.tag().is_none() {
            return Err(Error::not_an_element("read attribute"));
        }
        Ok(node.attribute(name).map(str::to_string))
    }

    async fn set_attribute(&self, node: &NodeId, name: &str, value: &str) -> Result<()> {
        self.inner.lock().tree.set_attribute(node, name, value)
    }

    async fn add_listener(&self, target: &Target, event: &str, listener: Listener) -> Result<()> {
        let mut state = self.inner.lock();
        if let Some(node) = target.node() {
            state.tree.node(node)?;
        }
        let slot = state
            .listeners
            .entry(ListenerKey {
                target: target.clone(),
                event: event.to_string(),
            })
            .or_default();
        if !slot.iter().any(|existing| existing.id == listener.id) {
            slot.push(listener);
        }
        Ok(())
    }

    async fn remove_listener(&self, target: &Target, event: &str, id: HandlerId) -> Result<bool> {
        let mut state = self.inner.lock();
        let key = ListenerKey {
            target: target.clone(),
            event: event.to_string(),
        };
        let Some(slot) = state.listeners.get_mut(&key) else {
            return Ok(false);
        };
        let before = slot.len();
        slot.retain(|listener| listener.id != id);
        let removed = slot.len() != before;
        if slot.is_empty() {
            state.listeners.remove(&key);
        }
        Ok(removed)
    }

    async fn dispatch(&self, target: &Target, event: &Event) -> Result<()> {
        if let Some(node) = target.node() {
            self.inner.lock().tree.node(node)?;
        }
        self.fire(target, event);
        Ok(())
    }

    async fn invoke_action(&self, target: &Target, name: &str) -> Result<bool> {
        let Target::Element(id) = target else {
            return Ok(false);
        };

        match name {
            events::CLICK => {
                {
                    let mut state = self.inner.lock();
                    let node = state.tree.node(id)?;
                    let toggles = node.tag() == Some("input")
                        && matches!(node.attribute("type"), Some("checkbox" | "radio"));
                    if toggles {
                        let checked = checkbox_checked(node);
                        let checked = if node.attribute("type") == Some("radio") {
                            true
                        } else {
                            !checked
                        };
                        state
                            .tree
                            .node_mut(id)?
                            .properties
                            .insert("checked".into(), Value::Bool(checked));
                    }
                }
                self.fire(target, &Event::new(events::CLICK));
                Ok(true)
            }
            events::FOCUS => {
                let previous = {
                    let mut state = self.inner.lock();
                    state.tree.tag(id)?;
                    if state.focused.as_ref() == Some(id) {
                        return Ok(true);
                    }
                    state.focused.replace(id.clone())
                };
                if let Some(previous) = previous {
                    self.fire(&Target::Element(previous), &Event::new(events::BLUR));
                }
                self.fire(target, &Event::new(events::FOCUS));
                Ok(true)
            }
            events::BLUR => {
                let was_focused = {
                    let mut state = self.inner.lock();
                    state.tree.tag(id)?;
                    if state.focused.as_ref() == Some(id) {
                        state.focused = None;
                        true
                    } else {
                        false
                    }
                };
                if was_focused {
                    self.fire(target, &Event::new(events::BLUR));
                }
                Ok(true)
            }
            events::SUBMIT => {
                let is_form = self.inner.lock().tree.tag(id)? == "form";
                if is_form {
                    self.fire(target, &Event::new(events::SUBMIT));
                }
                Ok(is_form)
            }
            _ => Ok(false),
        }
    }

    async fn ready_state(&self) -> Result<ReadyState> {
        Ok(self.inner.lock().ready_state)
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn validate_tag(tag: &str) -> Result<String> {
    let valid = tag.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        && tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
    if !valid {
        return Err(Error::invalid_argument(format!("invalid tag name '{tag}'")));
    }
    Ok(tag.to_ascii_lowercase())
}

fn select(tree: &Tree, scope: Option<&NodeId>, group: &SelectorGroup) -> Result<Vec<NodeId>> {
    Ok(tree
        .descendant_elements(scope)?
        .into_iter()
        .filter(|id| group.matches(tree, id))
        .collect())
}

fn parent_target(tree: &Tree, node: &NodeId) -> Result<Option<Target>> {
    Ok(match &tree.node(node)?.parent {
        Some(ParentRef::Document) => Some(Target::Document),
        Some(ParentRef::Node(parent)) => Some(Target::Element(parent.clone())),
        None => None,
    })
}

fn checkbox_checked(node: &tree::Node) -> bool {
    node.properties
        .get("checked")
        .and_then(Value::as_bool)
        .unwrap_or_else(|| node.attribute("checked").is_some())
}

fn camel_to_kebab(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn kebab_to_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for c in name.chars() {
        if c == '-' {
            upper = true;
        } else if upper {
            out.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn element_property(tree: &Tree, id: &NodeId, name: &str) -> Result<Value> {
    let node = tree.node(id)?;
    let Some(tag) = node.tag() else {
        return Ok(match name {
            "textContent" => Value::String(tree.text_content(id)?),
            _ => Value::Null,
        });
    };

    if let Some(value) = node.properties.get(name) {
        return Ok(value.clone());
    }

    let reflected = |attr: &str| Value::String(node.attribute(attr).unwrap_or_default().into());

    Ok(match name {
        "id" | "title" | "style" => reflected(name),
        "className" => reflected("class"),
        "tagName" => Value::String(tag.to_ascii_uppercase()),
        "textContent" => Value::String(tree.text_content(id)?),
        "innerHTML" => Value::String(markup::inner_html(tree, id)?),
        "outerHTML" => Value::String(markup::outer_html(tree, id)?),
        "readOnly" => Value::Bool(node.attribute("readonly").is_some()),
        "checked" => Value::Bool(checkbox_checked(node)),
        "value" if tag == "textarea" => Value::String(tree.text_content(id)?),
        "value" => reflected("value"),
        "dataset" => {
            let mut map = Map::new();
            if let NodeKind::Element { attributes, .. } = &node.kind {
                for (key, value) in attributes {
                    if let Some(rest) = key.strip_prefix("data-") {
                        map.insert(kebab_to_camel(rest), Value::String(value.clone()));
                    }
                }
            }
            Value::Object(map)
        }
        metric if METRICS.contains(&metric) => Value::from(0),
        _ => Value::Null,
    })
}

fn set_element_property(tree: &mut Tree, id: &NodeId, name: &str, value: Value) -> Result<()> {
    if tree.node(id)?.tag().is_none() {
        return match name {
            "textContent" => {
                tree.node_mut(id)?.kind = NodeKind::Text(stringify(&value));
                Ok(())
            }
            _ => Err(Error::not_an_element(format!("set property '{name}'"))),
        };
    }

    match name {
        "id" | "title" | "style" => tree.set_attribute(id, name, &stringify(&value)),
        "className" => tree.set_attribute(id, "class", &stringify(&value)),
        "textContent" => {
            let text = stringify(&value);
            let fragments = if text.is_empty() {
                Vec::new()
            } else {
                vec![Fragment::text(text)]
            };
            tree.replace_children(id, fragments)
        }
        "innerHTML" => tree.replace_children(id, markup::parse_fragment(&stringify(&value))),
        "readOnly" => {
            if truthy(&value) {
                tree.set_attribute(id, "readonly", "")
            } else {
                tree.remove_attribute(id, "readonly")
            }
        }
        "dataset" => {
            let Value::Object(entries) = value else {
                return Err(Error::invalid_argument("dataset must be a JSON object"));
            };
            for (key, value) in &entries {
                tree.set_attribute(id, &format!("data-{}", camel_to_kebab(key)), &stringify(value))?;
            }
            Ok(())
        }
        "tagName" | "outerHTML" => Err(Error::invalid_argument(format!("{name} is read-only"))),
        _ => {
            tree.node_mut(id)?.properties.insert(name.to_string(), value);
            Ok(())
        }
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

// ============================================================================
// Tests
// ============================================================================
