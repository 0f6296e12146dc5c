//! The authoring state machine.
//!
//! A [`TestSuite`] owns the scenario tree for one step registry and one
//! adapter. Authoring calls (`feature`, `scenario`, `background`,
//! `examples`, step verbs, hooks) check the active context, grow the tree
//! and hand suites and tests to the adapter.
//!
//! ```ignore
//! suite.tagged(["smoke"]).feature("Cart", || {
//!     suite.background(|| suite.given("an empty cart"))?;
//!     suite.scenario("add an item", || {
//!         suite.when("I add <count> apples")?;
//!         suite.examples(vec![json!({"count": 1}), json!({"count": 3})])
//!     })
//! })?;
//! ```

mod frame;
mod run;

use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info};

use leftest_protocols::{
    ContextError, Flag, HookImplementation, LeftestError, ScenarioError, ScenarioKind,
    SuiteBody, TestSuiteAdapter,
};

use crate::hooks::{Hook, HookKind, Hooks};
use crate::scenario::{ExampleSet, Scenario};
use crate::selection::TagSelection;
use crate::steps::{StepCall, StepRegistry, StepVerb};
use crate::store::{ContextEpoch, TestContext};
use crate::tags::{tag_names, Tag, TagFilter, TagRegistry};

use frame::{Frame, FrameGuard, StepSink};
use run::{declare_scenario, SuiteState};

#[cfg(test)]
#[path = "suite_tests.rs"]
mod tests;

#[cfg(test)]
#[path = "run_tests.rs"]
mod run_tests;

pub type AuthoringResult = Result<(), LeftestError>;

/// Builds the scenario tree and drives the adapter.
pub struct TestSuite {
    steps: StepRegistry,
    state: Arc<SuiteState>,
    tags: TagRegistry,
    selection: RwLock<TagSelection>,
    frame: Mutex<Frame>,
    root: Arc<Scenario>,
}

impl TestSuite {
    /// Create a suite using the tag selection from `LEFTEST_TAGS`.
    pub fn new(steps: StepRegistry, adapter: Arc<dyn TestSuiteAdapter>) -> Self {
        Self::with_selection(steps, adapter, TagSelection::from_env())
    }

    pub fn with_selection(
        steps: StepRegistry,
        adapter: Arc<dyn TestSuiteAdapter>,
        selection: TagSelection,
    ) -> Self {
        info!(
            steps = steps.len(),
            is_async = adapter.is_async(),
            include = selection.includes().len(),
            exclude = selection.excludes().len(),
            "Test suite created"
        );
        let root = Scenario::root();
        let state = Arc::new(SuiteState {
            adapter,
            hooks: RwLock::new(Hooks::new()),
            epoch: ContextEpoch::new(),
            scenarios: Mutex::new(vec![root.clone()]),
        });
        Self {
            steps,
            state,
            tags: TagRegistry::new(),
            selection: RwLock::new(selection),
            frame: Mutex::new(Frame::root(root.clone())),
            root,
        }
    }

    pub fn root(&self) -> Arc<Scenario> {
        self.root.clone()
    }

    /// Every node created so far, root first.
    pub fn scenarios(&self) -> Vec<Arc<Scenario>> {
        self.state.scenarios.lock().clone()
    }

    pub fn steps(&self) -> &StepRegistry {
        &self.steps
    }

    /// Context store wiped after every scenario run.
    pub fn create_test_context(&self) -> TestContext {
        TestContext::new(self.state.epoch.clone())
    }

    // Tags

    /// Interned tag for `name`, without activating it.
    pub fn tag(&self, name: &str) -> Tag {
        self.tags.tag(name)
    }

    /// Queue tags for the next tag-accepting call.
    pub fn tagged<I, S>(&self, names: I) -> &Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            self.tags.activate(name.as_ref());
        }
        self
    }

    pub fn tag_and(&self, a: impl Into<TagFilter>, b: impl Into<TagFilter>) -> Result<TagFilter, LeftestError> {
        self.no_tags("and")?;
        Ok(TagFilter::and(a, b))
    }

    pub fn tag_or(&self, a: impl Into<TagFilter>, b: impl Into<TagFilter>) -> Result<TagFilter, LeftestError> {
        self.no_tags("or")?;
        Ok(TagFilter::or(a, b))
    }

    pub fn tag_not(&self, filter: impl Into<TagFilter>) -> Result<TagFilter, LeftestError> {
        self.no_tags("not")?;
        Ok(TagFilter::not(filter))
    }

    pub fn tag_eq(&self, tag: impl Into<TagFilter>) -> Result<TagFilter, LeftestError> {
        self.no_tags("eq")?;
        Ok(TagFilter::eq(tag))
    }

    /// Replace the include/exclude selection from a selection string.
    pub fn set_tags(&self, spec: &str) {
        *self.selection.write() = TagSelection::parse(spec);
    }

    pub fn set_tag_list<I, S>(&self, specs: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        *self.selection.write() = TagSelection::from_tokens(specs);
    }

    pub fn selection(&self) -> TagSelection {
        self.selection.read().clone()
    }

    pub fn is_included(&self, tag: &str) -> bool {
        self.selection.read().is_included(tag)
    }

    pub fn is_excluded(&self, tag: &str) -> bool {
        self.selection.read().is_excluded(tag)
    }

    pub fn get_flag(&self, tags: &BTreeSet<String>, no_default_exclude: bool) -> Flag {
        self.selection.read().flag_for(tags, no_default_exclude)
    }

    /// Fail when tags are pending, flushing them and resetting to root.
    fn no_tags(&self, call: &str) -> AuthoringResult {
        if let Err(e) = self.tags.ensure_none_pending(call) {
            *self.frame.lock() = Frame::root(self.root.clone());
            return Err(e.into());
        }
        Ok(())
    }

    fn current(&self) -> Frame {
        self.frame.lock().clone()
    }

    fn require(&self, call: &str, kind: ScenarioKind) -> Result<Frame, LeftestError> {
        let frame = self.current();
        if frame.kind != kind {
            return Err(ContextError::new(call, kind).into());
        }
        Ok(frame)
    }

    // Tree building

    pub fn feature<F>(&self, name: &str, body: F) -> AuthoringResult
    where
        F: FnOnce() -> AuthoringResult,
    {
        let tags = self.tags.take_pending();
        self.require("feature", ScenarioKind::Root)?;
        if self.root.has_child(name) {
            return Err(ScenarioError::DuplicateFeature(name.to_string()).into());
        }

        let node = Scenario::new(ScenarioKind::Feature, name, Some(&self.root), tags, Default::default());
        self.state.register(&node);
        self.root.add_child(node.clone(), None);
        debug!(feature = name, tags = ?node.effective_tags(), "Declaring feature");

        {
            let _guard = FrameGuard::enter(
                &self.frame,
                Frame::new(ScenarioKind::Feature, node.clone(), StepSink::Illegal),
            );
            body()?;
        }

        let flag = self.feature_flag(&node);
        node.set_flag(flag);

        let factories = node.factories();
        let thunk: SuiteBody = Box::new(move || {
            for factory in factories {
                factory()?;
            }
            Ok(())
        });
        self.state.adapter.suite(name, thunk, flag)
    }

    /// A feature survives when at least one child survives, and is focused
    /// when any child is.
    fn feature_flag(&self, node: &Scenario) -> Flag {
        let children = node.children();
        if !children.is_empty() && children.iter().all(|c| c.flag().is_excluded()) {
            return Flag::Exclude;
        }
        let own = self.get_flag(node.effective_tags(), !children.is_empty());
        promote_only(own, children.iter().map(|c| c.flag()))
    }

    pub fn scenario<F>(&self, name: &str, body: F) -> AuthoringResult
    where
        F: FnOnce() -> AuthoringResult,
    {
        let tags = self.tags.take_pending();
        let frame = self.require("scenario", ScenarioKind::Feature)?;
        if frame.sink == StepSink::Background {
            return Err(ContextError::new("scenario", ScenarioKind::Feature).into());
        }
        let feature = frame.node;
        if feature.has_child(name) {
            return Err(ScenarioError::DuplicateScenario {
                feature: feature.name().to_string(),
                name: name.to_string(),
            }
            .into());
        }

        let background = feature.background();
        let node = Scenario::new(ScenarioKind::Scenario, name, Some(&feature), tags, Default::default());
        self.state.register(&node);
        debug!(scenario = name, feature = feature.name(), "Declaring scenario");

        {
            let _guard = FrameGuard::enter(
                &self.frame,
                Frame::new(ScenarioKind::Scenario, node.clone(), StepSink::Steps),
            );
            body()?;
        }

        node.prepend_steps(background);
        node.set_flag(self.scenario_flag(&node));

        let state = self.state.clone();
        let factory_node = node.clone();
        feature.add_child(node, Some(Arc::new(move || declare_scenario(&state, &factory_node))));
        Ok(())
    }

    fn scenario_flag(&self, node: &Scenario) -> Flag {
        let examples = node.examples();
        if examples.is_empty() {
            return self.get_flag(node.effective_tags(), false);
        }
        if examples.iter().all(|set| set.flag.is_excluded()) {
            return Flag::Exclude;
        }
        let own = self.get_flag(node.effective_tags(), true);
        promote_only(own, examples.iter().map(|set| set.flag))
    }

    /// Steps declared in `body` run before every later scenario of the feature.
    pub fn background<F>(&self, body: F) -> AuthoringResult
    where
        F: FnOnce() -> AuthoringResult,
    {
        self.no_tags("background")?;
        let frame = self.require("background", ScenarioKind::Feature)?;
        if frame.sink != StepSink::Illegal {
            return Err(ContextError::new("background", ScenarioKind::Feature).into());
        }
        let _guard = FrameGuard::enter(
            &self.frame,
            Frame::new(ScenarioKind::Feature, frame.node, StepSink::Background),
        );
        body()
    }

    /// Register the unnamed example set. Rows must be JSON objects.
    pub fn examples(&self, rows: Vec<Value>) -> AuthoringResult {
        self.add_examples(None, rows)
    }

    pub fn named_examples(&self, name: &str, rows: Vec<Value>) -> AuthoringResult {
        self.add_examples(Some(name), rows)
    }

    fn add_examples(&self, name: Option<&str>, rows: Vec<Value>) -> AuthoringResult {
        let tags = self.tags.take_pending();
        let node = self.require("examples", ScenarioKind::Scenario)?.node;

        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(index, row)| match row {
                Value::Object(map) => Ok(map),
                _ => Err(ScenarioError::InvalidExampleRow {
                    scenario: node.name().to_string(),
                    index,
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let existing = node.examples();
        let has_unnamed = existing.iter().any(|set| set.name.is_none());
        if has_unnamed || (name.is_none() && !existing.is_empty()) {
            return Err(ScenarioError::MixedExamples(node.name().to_string()).into());
        }
        if let Some(name) = name {
            if existing.iter().any(|set| set.name.as_deref() == Some(name)) {
                return Err(ScenarioError::DuplicateExamples {
                    scenario: node.name().to_string(),
                    name: name.to_string(),
                }
                .into());
            }
        }

        let mut effective = node.effective_tags().clone();
        effective.extend(tag_names(&tags));
        let flag = self.get_flag(&effective, false);

        node.add_examples(ExampleSet {
            name: name.map(str::to_string),
            rows,
            tags,
            flag,
        });
        Ok(())
    }

    // Steps

    pub fn given(&self, text: &str) -> AuthoringResult {
        self.add_step(StepVerb::Given, text, Vec::new())
    }

    pub fn when(&self, text: &str) -> AuthoringResult {
        self.add_step(StepVerb::When, text, Vec::new())
    }

    pub fn then(&self, text: &str) -> AuthoringResult {
        self.add_step(StepVerb::Then, text, Vec::new())
    }

    pub fn and(&self, text: &str) -> AuthoringResult {
        self.add_step(StepVerb::And, text, Vec::new())
    }

    pub fn but(&self, text: &str) -> AuthoringResult {
        self.add_step(StepVerb::But, text, Vec::new())
    }

    /// Add a step with explicit arguments, skipping inline literal parsing.
    pub fn step_with(&self, verb: StepVerb, text: &str, args: Vec<Value>) -> AuthoringResult {
        self.add_step(verb, text, args)
    }

    fn add_step(&self, verb: StepVerb, text: &str, args: Vec<Value>) -> AuthoringResult {
        self.no_tags(verb.as_str())?;
        let frame = self.current();
        if frame.sink == StepSink::Illegal {
            return Err(ContextError::new(verb.as_str(), ScenarioKind::Scenario).into());
        }

        let call = StepCall::new(verb, text, &self.steps, args)?;
        match frame.sink {
            StepSink::Background => frame.node.push_background(call),
            _ => frame.node.push_step(call),
        }
        Ok(())
    }

    // Hooks

    pub fn before_scenario(&self, implementation: HookImplementation) -> AuthoringResult {
        self.hook(HookKind::BeforeScenario, None, implementation)
    }

    pub fn after_scenario(&self, implementation: HookImplementation) -> AuthoringResult {
        self.hook(HookKind::AfterScenario, None, implementation)
    }

    pub fn before_step(&self, implementation: HookImplementation) -> AuthoringResult {
        self.hook(HookKind::BeforeStep, None, implementation)
    }

    pub fn after_step(&self, implementation: HookImplementation) -> AuthoringResult {
        self.hook(HookKind::AfterStep, None, implementation)
    }

    /// Register a hook, optionally guarded by a tag filter.
    pub fn hook(
        &self,
        kind: HookKind,
        filter: Option<TagFilter>,
        implementation: HookImplementation,
    ) -> AuthoringResult {
        self.no_tags(kind.as_str())?;
        self.require(kind.as_str(), ScenarioKind::Root)?;
        debug!(hook = %kind, filter = ?filter.as_ref().map(|f| f.to_string()), "Registering hook");
        self.state.hooks.write().add(Hook {
            kind,
            filter,
            implementation,
        });
        Ok(())
    }
}

/// Raise a surviving parent to `Only` when any child is focused, so the
/// host runner reaches the focused child.
fn promote_only(own: Flag, children: impl IntoIterator<Item = Flag>) -> Flag {
    let mut children = children.into_iter();
    if own.is_excluded() || own == Flag::Only {
        return own;
    }
    if children.any(|flag| flag == Flag::Only) {
        Flag::Only
    } else {
        own
    }
}
