//! Declaring tests with the adapter and running scenarios.

use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tracing::{debug, warn};

use leftest_protocols::error::StepError;
use leftest_protocols::{
    HookArgs, HookImplementation, Implementation, LeftestError, RunContext, RunMetadata,
    RunResult, Runnable, ScenarioKind, StepArgs, SuiteBody, TestSuiteAdapter,
};

use crate::hooks::{HookKind, Hooks};
use crate::scenario::{ExampleSet, Scenario};
use crate::steps::StepCall;
use crate::store::ContextEpoch;

/// Suite state reachable from deferred factories and generated tests.
pub(crate) struct SuiteState {
    pub adapter: Arc<dyn TestSuiteAdapter>,
    pub hooks: RwLock<Hooks>,
    pub epoch: ContextEpoch,
    pub scenarios: Mutex<Vec<Arc<Scenario>>>,
}

impl SuiteState {
    pub fn register(&self, node: &Arc<Scenario>) {
        self.scenarios.lock().push(node.clone());
    }
}

/// Declare the tests of a scenario: one test, or one per example row.
pub(crate) fn declare_scenario(state: &Arc<SuiteState>, node: &Arc<Scenario>) -> RunResult {
    let steps = Arc::new(node.steps());
    let examples = node.examples();

    if examples.is_empty() {
        let run = ScenarioRun::new(state.clone(), node.clone(), steps);
        return state.adapter.test(node.name(), run.runnable(), run.metadata());
    }

    let body_state = state.clone();
    let body_node = node.clone();
    let body: SuiteBody = Box::new(move || {
        for set in examples {
            match set.name.clone() {
                None => declare_examples(&body_state, &body_node, &set, &steps)?,
                Some(name) => {
                    let flag = set.flag;
                    let (state, node, steps) =
                        (body_state.clone(), body_node.clone(), steps.clone());
                    body_state.adapter.suite(
                        &name,
                        Box::new(move || declare_examples(&state, &node, &set, &steps)),
                        flag,
                    )?;
                }
            }
        }
        Ok(())
    });
    state.adapter.suite(node.name(), body, node.flag())
}

fn declare_examples(
    state: &Arc<SuiteState>,
    scenario: &Arc<Scenario>,
    set: &ExampleSet,
    steps: &Arc<Vec<StepCall>>,
) -> RunResult {
    let total = set.rows.len();
    for (index, row) in set.rows.iter().enumerate() {
        let name = format!("Example {} of {}", index + 1, total);
        let (example, created) = scenario.example_child(set.name.as_deref(), index, || {
            let example = Scenario::new(
                ScenarioKind::Example,
                name.as_str(),
                Some(scenario),
                set.tags.clone(),
                row.clone(),
            );
            example.set_steps(steps.to_vec());
            example.set_flag(set.flag);
            example
        });
        if created {
            state.register(&example);
        }

        let run = ScenarioRun::new(state.clone(), example, steps.clone());
        state.adapter.test(&name, run.runnable(), run.metadata())?;
    }
    Ok(())
}

/// One executable scenario or example.
#[derive(Clone)]
pub(crate) struct ScenarioRun {
    state: Arc<SuiteState>,
    node: Arc<Scenario>,
    steps: Arc<Vec<StepCall>>,
}

impl ScenarioRun {
    pub fn new(state: Arc<SuiteState>, node: Arc<Scenario>, steps: Arc<Vec<StepCall>>) -> Self {
        Self { state, node, steps }
    }

    /// Metadata with hooks resolved against the node's effective tags now.
    pub fn metadata(&self) -> RunMetadata {
        let hooks = self.state.hooks.read().resolve(self.node.effective_tags());
        let steps = self
            .steps
            .iter()
            .map(|s| s.definition.implementation.clone())
            .collect();
        hooks.into_metadata(self.node.flag(), steps)
    }

    pub fn runnable(&self) -> Runnable {
        let run = self.clone();
        if self.state.adapter.is_async() {
            Runnable::async_fn(move |ctx| {
                let run = run.clone();
                async move { run.execute(ctx).await }
            })
        } else {
            Runnable::sync(move |ctx| run.execute_sync(ctx))
        }
    }

    fn is_async(&self) -> bool {
        self.state.adapter.is_async()
    }

    fn display_text(&self, step: &StepCall) -> String {
        step.resolve(|k| self.node.data().get(k).cloned())
            .map(|r| r.text)
            .unwrap_or_else(|_| step.text.clone())
    }

    fn hook_body(&self, kind: HookKind, hook: &HookImplementation, step: Option<String>) -> Runnable {
        let node = self.node.clone();
        let hook = hook.clone();
        if self.is_async() {
            Runnable::async_fn(move |ctx| {
                let (node, hook, step) = (node.clone(), hook.clone(), step.clone());
                async move { call_hook(&node, kind, &hook, step, ctx).await }
            })
        } else {
            Runnable::sync(move |ctx| call_hook_sync(&node, kind, &hook, step.clone(), ctx))
        }
    }

    fn step_body(&self, step: &StepCall) -> Runnable {
        let node = self.node.clone();
        let step = step.clone();
        if self.is_async() {
            Runnable::async_fn(move |ctx| {
                let (node, step) = (node.clone(), step.clone());
                async move { call_step(&node, &step, ctx).await }
            })
        } else {
            Runnable::sync(move |ctx| call_step_sync(&node, &step, ctx))
        }
    }

    fn start(&self) -> RunMetadata {
        self.node.reset_failed();
        debug!(scenario = self.node.name(), steps = self.steps.len(), "Running scenario");
        self.metadata()
    }

    fn finish(&self, outcome: RunResult) -> RunResult {
        self.state.epoch.advance();
        match &outcome {
            Ok(()) => debug!(scenario = self.node.name(), "Scenario passed"),
            Err(e) => warn!(scenario = self.node.name(), error = %e, "Scenario failed"),
        }
        outcome
    }

    fn record(&self, outcome: &mut RunResult, result: RunResult) {
        if let Err(e) = result {
            self.node.mark_failed();
            if outcome.is_ok() {
                *outcome = Err(e);
            }
        }
    }

    fn execute_sync(&self, ctx: RunContext) -> RunResult {
        let meta = self.start();
        let adapter = &self.state.adapter;
        let mut outcome = Ok(());

        for hook in &meta.before_scenario {
            let body = adapter.before_scenario(self.hook_body(HookKind::BeforeScenario, hook, None), &meta);
            self.record(&mut outcome, body.run_sync(ctx.clone()));
            if outcome.is_err() {
                break;
            }
        }
        if outcome.is_ok() {
            for step in self.steps.iter() {
                let result = self.run_step_sync(step, &meta, &ctx);
                self.record(&mut outcome, result);
            }
        }
        for hook in &meta.after_scenario {
            let body = adapter.after_scenario(self.hook_body(HookKind::AfterScenario, hook, None), &meta);
            self.record(&mut outcome, body.run_sync(ctx.clone()));
        }
        self.finish(outcome)
    }

    fn run_step_sync(&self, step: &StepCall, meta: &RunMetadata, ctx: &RunContext) -> RunResult {
        let adapter = &self.state.adapter;
        let text = self.display_text(step);
        let mut outcome = Ok(());

        let attempted = !self.node.has_failed();
        if attempted {
            for hook in &meta.before_step {
                let body = adapter.before_step(
                    self.hook_body(HookKind::BeforeStep, hook, Some(text.clone())),
                    meta,
                );
                self.record(&mut outcome, body.run_sync(ctx.clone()));
                if outcome.is_err() {
                    break;
                }
            }
        }

        let body = adapter.step(step.verb.as_str(), &text, self.step_body(step), meta);
        self.record(&mut outcome, body.run_sync(ctx.clone()));

        if attempted {
            for hook in &meta.after_step {
                let body = adapter.after_step(
                    self.hook_body(HookKind::AfterStep, hook, Some(text.clone())),
                    meta,
                );
                self.record(&mut outcome, body.run_sync(ctx.clone()));
            }
        }
        outcome
    }

    async fn execute(&self, ctx: RunContext) -> RunResult {
        let meta = self.start();
        let adapter = &self.state.adapter;
        let mut outcome = Ok(());

        for hook in &meta.before_scenario {
            let body = adapter.before_scenario(self.hook_body(HookKind::BeforeScenario, hook, None), &meta);
            self.record(&mut outcome, body.run(ctx.clone()).await);
            if outcome.is_err() {
                break;
            }
        }
        if outcome.is_ok() {
            for step in self.steps.iter() {
                let result = self.run_step(step, &meta, &ctx).await;
                self.record(&mut outcome, result);
            }
        }
        for hook in &meta.after_scenario {
            let body = adapter.after_scenario(self.hook_body(HookKind::AfterScenario, hook, None), &meta);
            self.record(&mut outcome, body.run(ctx.clone()).await);
        }
        self.finish(outcome)
    }

    async fn run_step(&self, step: &StepCall, meta: &RunMetadata, ctx: &RunContext) -> RunResult {
        let adapter = &self.state.adapter;
        let text = self.display_text(step);
        let mut outcome = Ok(());

        let attempted = !self.node.has_failed();
        if attempted {
            for hook in &meta.before_step {
                let body = adapter.before_step(
                    self.hook_body(HookKind::BeforeStep, hook, Some(text.clone())),
                    meta,
                );
                self.record(&mut outcome, body.run(ctx.clone()).await);
                if outcome.is_err() {
                    break;
                }
            }
        }

        let body = adapter.step(step.verb.as_str(), &text, self.step_body(step), meta);
        self.record(&mut outcome, body.run(ctx.clone()).await);

        if attempted {
            for hook in &meta.after_step {
                let body = adapter.after_step(
                    self.hook_body(HookKind::AfterStep, hook, Some(text.clone())),
                    meta,
                );
                self.record(&mut outcome, body.run(ctx.clone()).await);
            }
        }
        outcome
    }
}

fn fail(node: &Scenario, error: LeftestError) -> LeftestError {
    node.mark_failed();
    warn!(scenario = node.name(), error = %error, "Step or hook failed");
    error
}

fn hook_args(node: &Arc<Scenario>, step: Option<String>, context: RunContext) -> HookArgs {
    HookArgs {
        scenario: node.clone(),
        step,
        context,
    }
}

fn hook_error(kind: HookKind, source: anyhow::Error) -> LeftestError {
    LeftestError::HookFailed {
        hook: kind.to_string(),
        source,
    }
}

fn call_hook_sync(
    node: &Arc<Scenario>,
    kind: HookKind,
    hook: &HookImplementation,
    step: Option<String>,
    ctx: RunContext,
) -> RunResult {
    let args = hook_args(node, step, ctx);
    match hook {
        Implementation::Sync(f) => f(&args).map_err(|e| fail(node, hook_error(kind, e))),
        Implementation::Async(_) => Err(fail(
            node,
            LeftestError::AsyncInSyncSuite(kind.to_string()),
        )),
    }
}

async fn call_hook(
    node: &Arc<Scenario>,
    kind: HookKind,
    hook: &HookImplementation,
    step: Option<String>,
    ctx: RunContext,
) -> RunResult {
    let args = hook_args(node, step, ctx);
    let result = match hook {
        Implementation::Sync(f) => f(&args),
        Implementation::Async(f) => f(args).await,
    };
    result.map_err(|e| fail(node, hook_error(kind, e)))
}

/// Resolve arguments, or short-circuit when an earlier step failed.
fn prepare_step(node: &Scenario, step: &StepCall, ctx: RunContext) -> Result<StepArgs, LeftestError> {
    if node.has_failed() {
        return Err(StepError::PreviousStepFailed.into());
    }
    let resolved = step
        .resolve(|k| node.data().get(k).cloned())
        .map_err(|e| fail(node, e.into()))?;
    Ok(StepArgs::new(resolved.text, resolved.values, ctx))
}

fn step_error(step: String, source: anyhow::Error) -> LeftestError {
    LeftestError::StepFailed { step, source }
}

fn call_step_sync(node: &Scenario, step: &StepCall, ctx: RunContext) -> RunResult {
    let args = prepare_step(node, step, ctx)?;
    match &step.definition.implementation {
        Implementation::Sync(f) => f(&args).map_err(|e| fail(node, step_error(args.step.clone(), e))),
        Implementation::Async(_) => Err(fail(node, LeftestError::AsyncInSyncSuite(args.step))),
    }
}

async fn call_step(node: &Scenario, step: &StepCall, ctx: RunContext) -> RunResult {
    let args = prepare_step(node, step, ctx)?;
    let text = args.step.clone();
    let result = match &step.definition.implementation {
        Implementation::Sync(f) => f(&args),
        Implementation::Async(f) => f(args).await,
    };
    result.map_err(|e| fail(node, step_error(text, e)))
}
