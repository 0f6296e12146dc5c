//! Scenario tree nodes.

use parking_lot::{Mutex, RwLock};
use serde_json::{Map, Value};
use std::any::Any;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use leftest_protocols::{Flag, LeftestError, ScenarioHandle, ScenarioKind};

use crate::steps::StepCall;
use crate::tags::{tag_names, Tag};

/// One example row.
pub type ExampleRow = Map<String, Value>;

/// Declares the tests of a child node when its parent suite body runs.
pub type ScenarioFactory = Arc<dyn Fn() -> Result<(), LeftestError> + Send + Sync>;

/// A set of example rows registered by `examples`.
#[derive(Debug, Clone)]
pub struct ExampleSet {
    /// `None` for the single unnamed set.
    pub name: Option<String>,
    pub rows: Vec<ExampleRow>,
    pub tags: Vec<Tag>,
    pub flag: Flag,
}

/// Identifies an example node by its set name and row index.
type ExampleKey = (Option<String>, usize);

#[derive(Clone)]
struct Child {
    node: Arc<Scenario>,
    factory: Option<ScenarioFactory>,
    example: Option<ExampleKey>,
}

/// A node of the scenario tree.
pub struct Scenario {
    id: String,
    kind: ScenarioKind,
    name: String,
    tags: Vec<Tag>,
    effective_tags: BTreeSet<String>,
    data: ExampleRow,
    feature: Weak<Scenario>,
    parent: Weak<Scenario>,
    steps: Mutex<Vec<StepCall>>,
    background: Mutex<Vec<StepCall>>,
    examples: Mutex<Vec<ExampleSet>>,
    children: Mutex<Vec<Child>>,
    failed: AtomicBool,
    flag: RwLock<Flag>,
    scratch: Mutex<HashMap<String, Arc<dyn Any + Send + Sync>>>,
}

impl Scenario {
    /// The root node of a suite.
    pub fn root() -> Arc<Self> {
        Self::new(ScenarioKind::Root, "", None, Vec::new(), ExampleRow::new())
    }

    /// Create a node under `parent`.
    ///
    /// Effective tags are the parent's effective tags plus `tags`.
    pub fn new(
        kind: ScenarioKind,
        name: impl Into<String>,
        parent: Option<&Arc<Scenario>>,
        tags: Vec<Tag>,
        data: ExampleRow,
    ) -> Arc<Self> {
        let mut effective_tags = parent
            .map(|p| p.effective_tags.clone())
            .unwrap_or_default();
        effective_tags.extend(tag_names(&tags));

        let feature = match parent {
            Some(p) if p.kind == ScenarioKind::Feature => Arc::downgrade(p),
            Some(p) => p.feature.clone(),
            None => Weak::new(),
        };

        Arc::new(Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            name: name.into(),
            tags,
            effective_tags,
            data,
            feature,
            parent: parent.map(Arc::downgrade).unwrap_or_default(),
            steps: Mutex::new(Vec::new()),
            background: Mutex::new(Vec::new()),
            examples: Mutex::new(Vec::new()),
            children: Mutex::new(Vec::new()),
            failed: AtomicBool::new(false),
            flag: RwLock::new(Flag::Default),
            scratch: Mutex::new(HashMap::new()),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> ScenarioKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tags declared on this node only.
    pub fn own_tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn effective_tags(&self) -> &BTreeSet<String> {
        &self.effective_tags
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.effective_tags.contains(name)
    }

    /// Example-row data; empty for non-example nodes.
    pub fn data(&self) -> &ExampleRow {
        &self.data
    }

    pub fn feature(&self) -> Option<Arc<Scenario>> {
        self.feature.upgrade()
    }

    pub fn parent(&self) -> Option<Arc<Scenario>> {
        self.parent.upgrade()
    }

    pub fn flag(&self) -> Flag {
        *self.flag.read()
    }

    pub(crate) fn set_flag(&self, flag: Flag) {
        *self.flag.write() = flag;
    }

    pub fn has_failed(&self) -> bool {
        self.failed.load(Ordering::SeqCst)
    }

    pub fn mark_failed(&self) {
        self.failed.store(true, Ordering::SeqCst);
    }

    pub(crate) fn reset_failed(&self) {
        self.failed.store(false, Ordering::SeqCst);
    }

    /// Steps in execution order, background steps first.
    pub fn steps(&self) -> Vec<StepCall> {
        self.steps.lock().clone()
    }

    pub(crate) fn push_step(&self, step: StepCall) {
        self.steps.lock().push(step);
    }

    pub(crate) fn set_steps(&self, steps: Vec<StepCall>) {
        *self.steps.lock() = steps;
    }

    pub(crate) fn prepend_steps(&self, steps: Vec<StepCall>) {
        let mut current = self.steps.lock();
        let own = std::mem::take(&mut *current);
        *current = steps;
        current.extend(own);
    }

    /// Background steps declared so far on a feature.
    pub fn background(&self) -> Vec<StepCall> {
        self.background.lock().clone()
    }

    pub(crate) fn push_background(&self, step: StepCall) {
        self.background.lock().push(step);
    }

    pub fn examples(&self) -> Vec<ExampleSet> {
        self.examples.lock().clone()
    }

    pub(crate) fn add_examples(&self, set: ExampleSet) {
        self.examples.lock().push(set);
    }

    /// Child nodes in declaration order.
    pub fn children(&self) -> Vec<Arc<Scenario>> {
        self.children.lock().iter().map(|c| c.node.clone()).collect()
    }

    pub fn has_child(&self, name: &str) -> bool {
        self.children.lock().iter().any(|c| c.node.name == name)
    }

    pub(crate) fn add_child(&self, node: Arc<Scenario>, factory: Option<ScenarioFactory>) {
        self.children.lock().push(Child {
            node,
            factory,
            example: None,
        });
    }

    /// Example node for row `index` of set `set`, created and attached on
    /// first use. The flag is `true` when the node was created by this call.
    pub(crate) fn example_child(
        &self,
        set: Option<&str>,
        index: usize,
        create: impl FnOnce() -> Arc<Scenario>,
    ) -> (Arc<Scenario>, bool) {
        let mut children = self.children.lock();
        let existing = children.iter().find(|c| {
            c.example
                .as_ref()
                .is_some_and(|(name, i)| name.as_deref() == set && *i == index)
        });
        if let Some(child) = existing {
            return (child.node.clone(), false);
        }
        let node = create();
        children.push(Child {
            node: node.clone(),
            factory: None,
            example: Some((set.map(str::to_string), index)),
        });
        (node, true)
    }

    pub(crate) fn factories(&self) -> Vec<ScenarioFactory> {
        self.children
            .lock()
            .iter()
            .filter_map(|c| c.factory.clone())
            .collect()
    }

    /// Attach adapter-specific state, replacing any previous value.
    pub fn insert_scratch<T: Any + Send + Sync>(&self, key: impl Into<String>, value: T) {
        self.scratch.lock().insert(key.into(), Arc::new(value));
    }

    pub fn scratch<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        let value = self.scratch.lock().get(key).cloned()?;
        value.downcast::<T>().ok()
    }
}

impl ScenarioHandle for Scenario {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ScenarioKind {
        self.kind
    }

    fn tags(&self) -> Vec<String> {
        self.effective_tags.iter().cloned().collect()
    }

    fn has_failed(&self) -> bool {
        Scenario::has_failed(self)
    }

    fn data(&self, key: &str) -> Option<Value> {
        self.data.get(key).cloned()
    }
}

impl fmt::Debug for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("tags", &self.effective_tags)
            .field("flag", &self.flag())
            .field("failed", &self.has_failed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::TagRegistry;
    use serde_json::json;

    #[test]
    fn test_effective_tags_union() {
        let registry = TagRegistry::new();
        let root = Scenario::root();
        let feature = Scenario::new(
            ScenarioKind::Feature,
            "F",
            Some(&root),
            vec![registry.tag("a")],
            ExampleRow::new(),
        );
        let scenario = Scenario::new(
            ScenarioKind::Scenario,
            "S",
            Some(&feature),
            vec![registry.tag("b")],
            ExampleRow::new(),
        );
        let mut row = ExampleRow::new();
        row.insert("n".to_string(), json!(1));
        let example = Scenario::new(
            ScenarioKind::Example,
            "Example 1 of 1",
            Some(&scenario),
            vec![registry.tag("c")],
            row,
        );

        assert_eq!(
            example.effective_tags().iter().collect::<Vec<_>>(),
            vec!["a", "b", "c"]
        );
        assert_eq!(example.own_tags().len(), 1);
        assert_eq!(example.feature().unwrap().name(), "F");
        assert_eq!(example.parent().unwrap().name(), "S");
        assert_eq!(scenario.feature().unwrap().name(), "F");
        assert!(feature.feature().is_none());
        assert_eq!(ScenarioHandle::data(example.as_ref(), "n"), Some(json!(1)));
    }

    #[test]
    fn test_failed_latch() {
        let root = Scenario::root();
        assert!(!root.has_failed());
        root.mark_failed();
        root.mark_failed();
        assert!(root.has_failed());
        root.reset_failed();
        assert!(!root.has_failed());
    }

    #[test]
    fn test_scratch_storage() {
        let root = Scenario::root();
        root.insert_scratch("recorder", 5u32);
        assert_eq!(*root.scratch::<u32>("recorder").unwrap(), 5);
        assert!(root.scratch::<String>("recorder").is_none());
        assert!(root.scratch::<u32>("missing").is_none());
    }

    #[test]
    fn test_children_and_factories() {
        let root = Scenario::root();
        let feature = Scenario::new(ScenarioKind::Feature, "F", Some(&root), vec![], ExampleRow::new());
        root.add_child(feature.clone(), None);
        assert!(root.has_child("F"));
        assert!(!root.has_child("G"));
        assert!(root.factories().is_empty());

        let child = Scenario::new(ScenarioKind::Scenario, "S", Some(&feature), vec![], ExampleRow::new());
        feature.add_child(child, Some(Arc::new(|| Ok(()))));
        assert_eq!(feature.factories().len(), 1);
        assert_eq!(feature.children()[0].name(), "S");
    }

    #[test]
    fn test_ids_are_unique() {
        let a = Scenario::root();
        let b = Scenario::root();
        assert_ne!(a.id(), b.id());
    }
}
