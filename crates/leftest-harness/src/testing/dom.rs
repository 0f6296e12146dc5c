//! Simulated DOM tree.

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::trace;

use leftest_protocols::{ElementError, LocatorError, TestElement};

use super::css::{parse_list, Combinator, Complex, Compound};
use super::element::MemoryElement;
use crate::environment::EnvironmentBackend;

/// Handle to a node of a [`MemoryDom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub(crate) fn index(self) -> usize {
        self.0
    }
}

/// Description of an element to append.
#[derive(Debug, Clone, Default)]
pub struct ElementSpec {
    tag: String,
    attributes: BTreeMap<String, String>,
    text: String,
}

impl ElementSpec {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_lowercase(),
            ..Self::default()
        }
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    pub fn class(mut self, class: &str) -> Self {
        let classes = self.attributes.entry("class".to_string()).or_default();
        if !classes.is_empty() {
            classes.push(' ');
        }
        classes.push_str(class);
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }
}

/// Interaction recorded by the simulated DOM.
#[derive(Debug, Clone, PartialEq)]
pub struct DomEvent {
    pub node: NodeId,
    pub kind: String,
    pub detail: Option<Value>,
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    pub text: String,
    pub properties: HashMap<String, Value>,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub attached: bool,
}

impl Node {
    fn new(spec: ElementSpec, parent: Option<usize>) -> Self {
        Self {
            tag: spec.tag,
            attributes: spec.attributes,
            text: spec.text,
            properties: HashMap::new(),
            parent,
            children: Vec::new(),
            attached: true,
        }
    }

    fn has_class(&self, class: &str) -> bool {
        self.attributes
            .get("class")
            .is_some_and(|c| c.split_whitespace().any(|c| c == class))
    }

    fn matches_compound(&self, compound: &Compound) -> bool {
        compound.tag.as_ref().is_none_or(|t| *t == self.tag)
            && compound
                .id
                .as_ref()
                .is_none_or(|id| self.attributes.get("id") == Some(id))
            && compound.classes.iter().all(|c| self.has_class(c))
            && compound.attributes.iter().all(|(name, value)| match value {
                None => self.attributes.contains_key(name),
                Some(v) => self.attributes.get(name) == Some(v),
            })
    }
}

type Mutation = Box<dyn FnOnce(&MemoryDom) + Send>;

pub(crate) struct DomState {
    pub nodes: Vec<Node>,
    pub focused: Option<usize>,
}

const DOCUMENT: usize = 0;

struct Inner {
    state: RwLock<DomState>,
    pending: Mutex<VecDeque<Mutation>>,
    events: Mutex<Vec<DomEvent>>,
    stabilize_calls: AtomicUsize,
}

/// In-memory DOM usable as an [`EnvironmentBackend`].
///
/// Mutations queued with [`defer`](Self::defer) land on the next
/// [`force_stabilize`](EnvironmentBackend::force_stabilize), one per call,
/// which mimics asynchronous rendering.
#[derive(Clone)]
pub struct MemoryDom {
    inner: Arc<Inner>,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDom {
    pub fn new() -> Self {
        let document = Node::new(ElementSpec::new("#document"), None);
        Self {
            inner: Arc::new(Inner {
                state: RwLock::new(DomState {
                    nodes: vec![document],
                    focused: None,
                }),
                pending: Mutex::new(VecDeque::new()),
                events: Mutex::new(Vec::new()),
                stabilize_calls: AtomicUsize::new(0),
            }),
        }
    }

    pub fn document(&self) -> NodeId {
        NodeId(DOCUMENT)
    }

    /// Append a new element as the last child of `parent`.
    pub fn append(&self, parent: NodeId, spec: ElementSpec) -> NodeId {
        let mut state = self.inner.state.write();
        let id = state.nodes.len();
        state.nodes.push(Node::new(spec, Some(parent.0)));
        state.nodes[parent.0].children.push(id);
        NodeId(id)
    }

    /// Detach `node` and its subtree.
    pub fn remove(&self, node: NodeId) {
        let mut state = self.inner.state.write();
        if let Some(parent) = state.nodes[node.0].parent {
            state.nodes[parent].children.retain(|c| *c != node.0);
        }
        let mut stack = vec![node.0];
        while let Some(n) = stack.pop() {
            state.nodes[n].attached = false;
            stack.extend(state.nodes[n].children.iter().copied());
        }
    }

    pub fn set_attribute(&self, node: NodeId, name: &str, value: &str) {
        self.inner.state.write().nodes[node.0]
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    pub fn set_text(&self, node: NodeId, text: &str) {
        self.inner.state.write().nodes[node.0].text = text.to_string();
    }

    pub fn set_property(&self, node: NodeId, name: &str, value: Value) {
        self.inner.state.write().nodes[node.0]
            .properties
            .insert(name.to_string(), value);
    }

    /// Queue a mutation for a later stabilization.
    pub fn defer(&self, mutation: impl FnOnce(&MemoryDom) + Send + 'static) {
        self.inner.pending.lock().push_back(Box::new(mutation));
    }

    pub fn pending_mutations(&self) -> usize {
        self.inner.pending.lock().len()
    }

    pub fn stabilize_calls(&self) -> usize {
        self.inner.stabilize_calls.load(Ordering::SeqCst)
    }

    pub fn events(&self) -> Vec<DomEvent> {
        self.inner.events.lock().clone()
    }

    pub(crate) fn record(&self, node: NodeId, kind: &str, detail: Option<Value>) {
        self.inner.events.lock().push(DomEvent {
            node,
            kind: kind.to_string(),
            detail,
        });
    }

    pub(crate) fn read<T>(&self, node: NodeId, f: impl FnOnce(&Node, &DomState) -> T) -> Result<T, ElementError> {
        let state = self.inner.state.read();
        let n = &state.nodes[node.0];
        if !n.attached {
            return Err(ElementError::Detached);
        }
        Ok(f(n, &state))
    }

    pub(crate) fn write<T>(&self, node: NodeId, f: impl FnOnce(&mut DomState, usize) -> T) -> Result<T, ElementError> {
        let mut state = self.inner.state.write();
        if !state.nodes[node.0].attached {
            return Err(ElementError::Detached);
        }
        Ok(f(&mut state, node.0))
    }

    /// Elements under `root` matching `selector`, in document order.
    pub fn query_all(&self, root: NodeId, selector: &str) -> Result<Vec<NodeId>, String> {
        let list = parse_list(selector)?;
        let state = self.inner.state.read();
        let mut found = Vec::new();
        let mut stack: Vec<usize> = state.nodes[root.0].children.iter().rev().copied().collect();
        while let Some(n) = stack.pop() {
            if list.iter().any(|complex| matches_complex(&state, n, complex)) {
                found.push(NodeId(n));
            }
            stack.extend(state.nodes[n].children.iter().rev().copied());
        }
        Ok(found)
    }

    pub fn matches(&self, node: NodeId, selector: &str) -> Result<bool, String> {
        let list = parse_list(selector)?;
        let state = self.inner.state.read();
        Ok(list.iter().any(|complex| matches_complex(&state, node.0, complex)))
    }

    /// `textContent` of `node`, skipping subtrees matching `exclude`.
    pub(crate) fn text_content(state: &DomState, node: usize, exclude: Option<&[Complex]>) -> String {
        let mut text = state.nodes[node].text.clone();
        for &child in &state.nodes[node].children {
            if exclude.is_some_and(|list| list.iter().any(|c| matches_complex(state, child, c))) {
                continue;
            }
            text.push_str(&Self::text_content(state, child, exclude));
        }
        text
    }
}

pub(crate) fn matches_complex(state: &DomState, node: usize, complex: &Complex) -> bool {
    matches_from(state, node, &complex.parts)
}

fn matches_from(state: &DomState, node: usize, parts: &[(Combinator, Compound)]) -> bool {
    let Some(((combinator, compound), rest)) = parts.split_last() else {
        return true;
    };
    if node == DOCUMENT || !state.nodes[node].matches_compound(compound) {
        return false;
    }
    if rest.is_empty() {
        return true;
    }
    match combinator {
        Combinator::Child => state.nodes[node]
            .parent
            .is_some_and(|p| matches_from(state, p, rest)),
        Combinator::Descendant => {
            let mut ancestor = state.nodes[node].parent;
            while let Some(a) = ancestor {
                if matches_from(state, a, rest) {
                    return true;
                }
                ancestor = state.nodes[a].parent;
            }
            false
        }
    }
}

#[async_trait]
impl EnvironmentBackend for MemoryDom {
    type Element = NodeId;

    fn document_root(&self) -> NodeId {
        self.document()
    }

    async fn raw_elements(&self, root: &NodeId, selector: &str) -> Result<Vec<NodeId>, LocatorError> {
        self.query_all(*root, selector)
            .map_err(|e| LocatorError::Element(ElementError::Backend(e)))
    }

    fn create_test_element(&self, element: &NodeId) -> Arc<dyn TestElement> {
        Arc::new(MemoryElement::new(self.clone(), *element))
    }

    async fn force_stabilize(&self) -> Result<(), LocatorError> {
        self.inner.stabilize_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.inner.pending.lock().pop_front();
        if let Some(mutation) = next {
            trace!("Applying deferred DOM mutation");
            mutation(self);
        }
        Ok(())
    }

    async fn wait_for_tasks_outside_angular(&self) -> Result<(), LocatorError> {
        self.force_stabilize().await
    }

    async fn matches_selector(&self, element: &NodeId, selector: &str) -> Result<bool, LocatorError> {
        self.matches(*element, selector)
            .map_err(|e| LocatorError::Element(ElementError::Backend(e)))
    }
}
