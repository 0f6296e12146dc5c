//! In-process adapter that records suites and tests and runs them itself.
//!
//! Useful for exercising a [`TestSuite`](crate::TestSuite) without a host
//! test runner.

use parking_lot::Mutex;
use std::sync::Arc;

use leftest_protocols::{
    Flag, LeftestError, RunContext, RunMetadata, RunResult, Runnable, SuiteBody, TestSuiteAdapter,
};

/// A declared suite.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedSuite {
    pub path: Vec<String>,
    pub flag: Flag,
}

/// A declared test.
#[derive(Debug, Clone)]
pub struct RecordedTest {
    /// Names of the enclosing suites, outermost first.
    pub path: Vec<String>,
    pub name: String,
    /// Flags of the enclosing suites, outermost first.
    pub suite_flags: Vec<Flag>,
    pub body: Runnable,
    pub metadata: RunMetadata,
}

impl RecordedTest {
    /// Suite path and test name joined with `" > "`.
    pub fn full_name(&self) -> String {
        let mut parts = self.path.clone();
        parts.push(self.name.clone());
        parts.join(" > ")
    }

    fn flags(&self) -> impl Iterator<Item = Flag> + '_ {
        self.suite_flags
            .iter()
            .copied()
            .chain(std::iter::once(self.metadata.flag))
    }

    fn is_only(&self) -> bool {
        self.flags().any(|f| f == Flag::Only)
    }

    fn is_skipped(&self) -> bool {
        self.flags().any(|f| matches!(f, Flag::Skip | Flag::Exclude))
    }
}

/// Something the adapter observed while a test ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEvent {
    /// `step`, `before_scenario`, `after_step`, ...
    pub kind: String,
    /// `"<verb> <rendered text>"` for steps.
    pub label: Option<String>,
    pub error: Option<String>,
}

/// Outcome of running one recorded test.
#[derive(Debug)]
pub struct TestOutcome {
    pub name: String,
    /// `None` when the test was skipped or excluded.
    pub result: Option<RunResult>,
}

impl TestOutcome {
    pub fn passed(&self) -> bool {
        matches!(self.result, Some(Ok(())))
    }

    pub fn skipped(&self) -> bool {
        self.result.is_none()
    }

    pub fn error(&self) -> Option<&LeftestError> {
        self.result.as_ref().and_then(|r| r.as_ref().err())
    }
}

#[derive(Default)]
struct Recorded {
    stack: Vec<(String, Flag)>,
    suites: Vec<RecordedSuite>,
    tests: Vec<RecordedTest>,
}

/// Adapter that records every declaration and runs tests on demand.
#[derive(Default)]
pub struct RecordingAdapter {
    is_async: bool,
    context: RunContext,
    recorded: Mutex<Recorded>,
    events: Arc<Mutex<Vec<RecordedEvent>>>,
}

impl RecordingAdapter {
    /// A synchronous adapter.
    pub fn new() -> Self {
        Self::default()
    }

    /// An adapter whose tests are awaited.
    pub fn new_async() -> Self {
        Self {
            is_async: true,
            ..Self::default()
        }
    }

    /// Runner context handed to every test.
    pub fn with_context(mut self, context: RunContext) -> Self {
        self.context = context;
        self
    }

    pub fn suites(&self) -> Vec<RecordedSuite> {
        self.recorded.lock().suites.clone()
    }

    pub fn tests(&self) -> Vec<RecordedTest> {
        self.recorded.lock().tests.clone()
    }

    pub fn test_names(&self) -> Vec<String> {
        self.recorded.lock().tests.iter().map(|t| t.name.clone()).collect()
    }

    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().clone()
    }

    /// Labels of the steps run so far, in order.
    pub fn step_labels(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.kind == "step")
            .filter_map(|e| e.label.clone())
            .collect()
    }

    pub fn clear_events(&self) {
        self.events.lock().clear();
    }

    /// Tests that would run, honoring `only`, `skip` and exclusion.
    fn runnable_tests(&self) -> Vec<(RecordedTest, bool)> {
        let tests = self.tests();
        let any_only = tests.iter().any(RecordedTest::is_only);
        tests
            .into_iter()
            .map(|t| {
                let run = !t.is_skipped() && (!any_only || t.is_only());
                (t, run)
            })
            .collect()
    }

    /// Run every recorded test on the current thread.
    pub fn run_all_sync(&self) -> Vec<TestOutcome> {
        self.runnable_tests()
            .into_iter()
            .map(|(test, run)| TestOutcome {
                name: test.full_name(),
                result: run.then(|| test.body.run_sync(self.context.clone())),
            })
            .collect()
    }

    /// Run every recorded test, awaiting async bodies.
    pub async fn run_all(&self) -> Vec<TestOutcome> {
        let mut outcomes = Vec::new();
        for (test, run) in self.runnable_tests() {
            let result = if run {
                Some(test.body.run(self.context.clone()).await)
            } else {
                None
            };
            outcomes.push(TestOutcome {
                name: test.full_name(),
                result,
            });
        }
        outcomes
    }

    fn wrap(&self, kind: &'static str, label: Option<String>, body: Runnable) -> Runnable {
        let events = self.events.clone();
        let log = move |result: &RunResult| {
            events.lock().push(RecordedEvent {
                kind: kind.to_string(),
                label: label.clone(),
                error: result.as_ref().err().map(|e| e.to_string()),
            });
        };
        match body {
            Runnable::Sync(f) => Runnable::sync(move |ctx| {
                let result = f(ctx);
                log(&result);
                result
            }),
            Runnable::Async(f) => {
                let log = Arc::new(log);
                Runnable::async_fn(move |ctx| {
                    let (f, log) = (f.clone(), log.clone());
                    async move {
                        let result = f(ctx).await;
                        log(&result);
                        result
                    }
                })
            }
        }
    }
}

impl TestSuiteAdapter for RecordingAdapter {
    fn is_async(&self) -> bool {
        self.is_async
    }

    fn suite(&self, name: &str, body: SuiteBody, flag: Flag) -> Result<(), LeftestError> {
        {
            let mut recorded = self.recorded.lock();
            recorded.stack.push((name.to_string(), flag));
            let path = recorded.stack.iter().map(|(n, _)| n.clone()).collect();
            recorded.suites.push(RecordedSuite { path, flag });
        }
        let result = body();
        self.recorded.lock().stack.pop();
        result
    }

    fn test(&self, name: &str, body: Runnable, metadata: RunMetadata) -> Result<(), LeftestError> {
        let mut recorded = self.recorded.lock();
        let test = RecordedTest {
            path: recorded.stack.iter().map(|(n, _)| n.clone()).collect(),
            suite_flags: recorded.stack.iter().map(|(_, f)| *f).collect(),
            name: name.to_string(),
            body,
            metadata,
        };
        recorded.tests.push(test);
        Ok(())
    }

    fn step(&self, verb: &str, text: &str, body: Runnable, _metadata: &RunMetadata) -> Runnable {
        self.wrap("step", Some(format!("{} {}", verb, text)), body)
    }

    fn before_scenario(&self, body: Runnable, _metadata: &RunMetadata) -> Runnable {
        self.wrap("before_scenario", None, body)
    }

    fn after_scenario(&self, body: Runnable, _metadata: &RunMetadata) -> Runnable {
        self.wrap("after_scenario", None, body)
    }

    fn before_step(&self, body: Runnable, _metadata: &RunMetadata) -> Runnable {
        self.wrap("before_step", None, body)
    }

    fn after_step(&self, body: Runnable, _metadata: &RunMetadata) -> Runnable {
        self.wrap("after_step", None, body)
    }
}
