use super::*;
use crate::steps::StepsBuilder;
use crate::testing::RecordingAdapter;
use leftest_protocols::{
    ContextStoreError, HookArgs, Implementation, RunContext, StepError,
};
use serde_json::json;

type Log = Arc<Mutex<Vec<String>>>;

fn push(log: &Log, entry: impl Into<String>) {
    log.lock().push(entry.into());
}

fn logging_steps(log: &Log) -> StepsBuilder {
    let (l1, l2, l3, l4) = (log.clone(), log.clone(), log.clone(), log.clone());
    StepsBuilder::new()
        .step("b", move |_| {
            push(&l1, "b");
            Ok(())
        })
        .step("w", move |_| {
            push(&l2, "w");
            Ok(())
        })
        .step("it breaks", move |_| {
            push(&l3, "breaks");
            anyhow::bail!("boom")
        })
        .step("I have <count> apples", move |args| {
            let count: u32 = args.get(0)?;
            push(&l4, format!("apples {count}"));
            Ok(())
        })
}

fn sync_suite(log: &Log) -> (Arc<RecordingAdapter>, TestSuite) {
    let adapter = Arc::new(RecordingAdapter::new());
    let steps = logging_steps(log).build().unwrap();
    let suite = TestSuite::with_selection(steps, adapter.clone(), TagSelection::new());
    (adapter, suite)
}

#[test]
fn test_background_runs_before_each_scenario() {
    let log = Log::default();
    let (adapter, suite) = sync_suite(&log);
    suite
        .feature("F", || {
            suite.background(|| suite.given("b"))?;
            suite.scenario("S", || suite.when("w"))?;
            suite.scenario("T", || suite.when("w"))
        })
        .unwrap();

    let outcomes = adapter.run_all_sync();
    assert!(outcomes.iter().all(|o| o.passed()));
    assert_eq!(*log.lock(), vec!["b", "w", "b", "w"]);
    assert_eq!(
        adapter.step_labels(),
        vec!["given b", "when w", "given b", "when w"]
    );
}

#[test]
fn test_failed_step_short_circuits() {
    let log = Log::default();
    let (adapter, suite) = sync_suite(&log);
    let observed = Log::default();
    let seen = observed.clone();
    suite
        .after_scenario(Implementation::sync(move |args: &HookArgs| {
            push(&seen, format!("failed={}", args.scenario.has_failed()));
            Ok(())
        }))
        .unwrap();

    suite
        .feature("F", || {
            suite.scenario("S", || {
                suite.given("it breaks")?;
                suite.when("w")?;
                suite.then("b")
            })
        })
        .unwrap();

    let outcomes = adapter.run_all_sync();
    let err = outcomes[0].error().unwrap();
    assert!(matches!(err, LeftestError::StepFailed { step, .. } if step == "it breaks"));
    assert!(err.to_string().contains("boom"));

    assert_eq!(*log.lock(), vec!["breaks"]);
    assert_eq!(*observed.lock(), vec!["failed=true"]);

    let step_errors: Vec<_> = adapter
        .events()
        .into_iter()
        .filter(|e| e.kind == "step")
        .map(|e| e.error)
        .collect();
    assert_eq!(step_errors.len(), 3);
    assert!(step_errors[0].as_deref().unwrap().contains("boom"));
    assert_eq!(step_errors[1].as_deref(), Some("Step error: Previous step failed"));
    assert_eq!(step_errors[2].as_deref(), Some("Step error: Previous step failed"));
}

#[test]
fn test_rerun_resets_failed_latch() {
    let log = Log::default();
    let (adapter, suite) = sync_suite(&log);
    suite
        .feature("F", || suite.scenario("S", || suite.given("it breaks")))
        .unwrap();

    adapter.run_all_sync();
    let outcomes = adapter.run_all_sync();
    assert!(matches!(
        outcomes[0].error(),
        Some(LeftestError::StepFailed { .. })
    ));
    assert_eq!(*log.lock(), vec!["breaks", "breaks"]);
}

#[test]
fn test_example_rows_feed_arguments() {
    let log = Log::default();
    let (adapter, suite) = sync_suite(&log);
    suite
        .feature("F", || {
            suite.scenario("S", || {
                suite.given("I have <count> apples")?;
                suite.examples(vec![json!({"count": 2}), json!({"count": 5})])
            })
        })
        .unwrap();

    let outcomes = adapter.run_all_sync();
    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|o| o.passed()));
    assert_eq!(*log.lock(), vec!["apples 2", "apples 5"]);
    assert_eq!(
        adapter.step_labels(),
        vec!["given I have 2 apples", "given I have 5 apples"]
    );
}

#[test]
fn test_missing_example_value() {
    let log = Log::default();
    let (adapter, suite) = sync_suite(&log);
    suite
        .feature("F", || {
            suite.scenario("S", || {
                suite.given("I have <amount> apples")?;
                suite.examples(vec![json!({"count": 2})])
            })
        })
        .unwrap();

    let outcomes = adapter.run_all_sync();
    match outcomes[0].error() {
        Some(LeftestError::Step(StepError::MissingArguments { names, .. })) => {
            assert_eq!(names, &vec!["amount".to_string()]);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert!(log.lock().is_empty());
    assert_eq!(adapter.step_labels(), vec!["given I have <amount> apples"]);
}

#[test]
fn test_inline_and_explicit_arguments() {
    let log = Log::default();
    let (adapter, suite) = sync_suite(&log);
    suite
        .feature("F", || {
            suite.scenario("S", || {
                suite.given("I have [4] apples")?;
                suite.step_with(StepVerb::And, "I have [4] apples", vec![json!(7)])
            })
        })
        .unwrap();

    adapter.run_all_sync();
    assert_eq!(*log.lock(), vec!["apples 4", "apples 7"]);
}

#[test]
fn test_hooks_filtered_by_tags() {
    let log = Log::default();
    let (adapter, suite) = sync_suite(&log);
    let slow = suite.tag("slow");
    let hook_log = log.clone();
    suite
        .hook(
            HookKind::BeforeScenario,
            Some(suite.tag_eq(&slow).unwrap()),
            Implementation::sync(move |args: &HookArgs| {
                push(&hook_log, format!("before {}", args.scenario.name()));
                Ok(())
            }),
        )
        .unwrap();

    suite
        .feature("F", || {
            suite.tagged(["slow"]).scenario("slow one", || suite.given("b"))?;
            suite.scenario("fast one", || suite.given("b"))
        })
        .unwrap();

    adapter.run_all_sync();
    assert_eq!(*log.lock(), vec!["before slow one", "b", "b"]);
}

#[test]
fn test_step_hooks_wrap_each_step() {
    let log = Log::default();
    let (adapter, suite) = sync_suite(&log);
    let (before, after) = (log.clone(), log.clone());
    suite
        .before_step(Implementation::sync(move |args: &HookArgs| {
            push(&before, format!("before {}", args.step.clone().unwrap_or_default()));
            Ok(())
        }))
        .unwrap();
    suite
        .after_step(Implementation::sync(move |args: &HookArgs| {
            push(&after, format!("after {}", args.step.clone().unwrap_or_default()));
            Ok(())
        }))
        .unwrap();

    suite
        .feature("F", || {
            suite.scenario("S", || {
                suite.given("b")?;
                suite.when("it breaks")?;
                suite.then("w")
            })
        })
        .unwrap();

    adapter.run_all_sync();
    assert_eq!(
        *log.lock(),
        vec!["before b", "b", "after b", "before it breaks", "breaks", "after it breaks"]
    );
}

#[test]
fn test_hooks_registered_after_feature_apply() {
    let log = Log::default();
    let (adapter, suite) = sync_suite(&log);
    suite
        .feature("F", || suite.scenario("S", || suite.given("b")))
        .unwrap();

    let hook_log = log.clone();
    suite
        .before_scenario(Implementation::sync(move |_| {
            push(&hook_log, "late hook");
            Ok(())
        }))
        .unwrap();

    adapter.run_all_sync();
    assert_eq!(*log.lock(), vec!["late hook", "b"]);
}

#[test]
fn test_failing_before_scenario_skips_steps() {
    let log = Log::default();
    let (adapter, suite) = sync_suite(&log);
    let after_log = log.clone();
    suite
        .before_scenario(Implementation::sync(|_| anyhow::bail!("setup failed")))
        .unwrap();
    suite
        .after_scenario(Implementation::sync(move |_| {
            push(&after_log, "cleanup");
            Ok(())
        }))
        .unwrap();
    suite
        .feature("F", || suite.scenario("S", || suite.given("b")))
        .unwrap();

    let outcomes = adapter.run_all_sync();
    assert!(matches!(
        outcomes[0].error(),
        Some(LeftestError::HookFailed { hook, .. }) if hook == "before_scenario"
    ));
    assert_eq!(*log.lock(), vec!["cleanup"]);
}

#[test]
fn test_test_context_cleared_between_scenarios() {
    let adapter = Arc::new(RecordingAdapter::new());
    let reads = Log::default();
    let slot: Arc<Mutex<Option<TestContext>>> = Arc::default();

    let (set_slot, get_slot, read_log) = (slot.clone(), slot.clone(), reads.clone());
    let steps = StepsBuilder::new()
        .step("I remember <value>", move |args| {
            let ctx = set_slot.lock().clone().ok_or_else(|| anyhow::anyhow!("no context"))?;
            ctx.set("value", args.get::<String>(0)?);
            Ok(())
        })
        .step("I recall the value", move |_| {
            let ctx = get_slot.lock().clone().ok_or_else(|| anyhow::anyhow!("no context"))?;
            match ctx.get::<String>("value") {
                Ok(v) => push(&read_log, v),
                Err(ContextStoreError::NotSet(key)) => push(&read_log, format!("unset {key}")),
                Err(e) => return Err(e.into()),
            }
            Ok(())
        })
        .build()
        .unwrap();
    let suite = TestSuite::with_selection(steps, adapter.clone(), TagSelection::new());
    let ctx = suite.create_test_context();
    *slot.lock() = Some(ctx.clone());

    suite
        .feature("F", || {
            suite.scenario("first", || {
                suite.given("I remember 'apples'")?;
                suite.then("I recall the value")
            })?;
            suite.scenario("second", || suite.then("I recall the value"))
        })
        .unwrap();

    let outcomes = adapter.run_all_sync();
    assert!(outcomes.iter().all(|o| o.passed()));
    assert_eq!(*reads.lock(), vec!["apples", "unset value"]);
    assert!(ctx.get::<String>("value").is_err());
}

#[test]
fn test_only_flag_limits_run() {
    let log = Log::default();
    let (adapter, suite) = sync_suite(&log);
    suite
        .feature("F", || {
            suite.scenario("normal", || suite.given("b"))?;
            suite.tagged(["only"]).scenario("focused", || suite.given("w"))?;
            suite.tagged(["skip"]).scenario("skipped", || suite.given("b"))
        })
        .unwrap();

    let outcomes = adapter.run_all_sync();
    let ran: Vec<_> = outcomes.iter().filter(|o| !o.skipped()).map(|o| o.name.clone()).collect();
    assert_eq!(ran, vec!["F > focused"]);
    assert_eq!(*log.lock(), vec!["w"]);
}

#[test]
fn test_metadata_exposes_implementations() {
    let log = Log::default();
    let (adapter, suite) = sync_suite(&log);
    suite.after_scenario(Implementation::sync(|_| Ok(()))).unwrap();
    suite
        .feature("F", || {
            suite.background(|| suite.given("b"))?;
            suite.scenario("S", || suite.when("w"))
        })
        .unwrap();

    let test = &adapter.tests()[0];
    assert_eq!(test.metadata.steps.len(), 2);
    assert_eq!(test.metadata.after_scenario.len(), 1);
    let def = suite.steps().lookup("w").unwrap();
    assert!(test.metadata.steps[1].ptr_eq(&def.implementation));
}

#[test]
fn test_runner_context_forwarded() {
    let seen = Log::default();
    let sink = seen.clone();
    let steps = StepsBuilder::new()
        .step("the world", move |args| {
            let world = args.context::<String>().ok_or_else(|| anyhow::anyhow!("no world"))?;
            push(&sink, world.as_str());
            Ok(())
        })
        .build()
        .unwrap();
    let context: RunContext = Some(Arc::new("earth".to_string()));
    let adapter = Arc::new(RecordingAdapter::new().with_context(context));
    let suite = TestSuite::with_selection(steps, adapter.clone(), TagSelection::new());
    suite
        .feature("F", || suite.scenario("S", || suite.given("the world")))
        .unwrap();

    assert!(adapter.run_all_sync()[0].passed());
    assert_eq!(*seen.lock(), vec!["earth"]);
}

#[test]
fn test_async_step_in_sync_suite() {
    let adapter = Arc::new(RecordingAdapter::new());
    let steps = StepsBuilder::new()
        .async_step("later", |_| async { Ok(()) })
        .build()
        .unwrap();
    let suite = TestSuite::with_selection(steps, adapter.clone(), TagSelection::new());
    suite
        .feature("F", || suite.scenario("S", || suite.given("later")))
        .unwrap();

    let outcomes = adapter.run_all_sync();
    assert!(matches!(
        outcomes[0].error(),
        Some(LeftestError::AsyncInSyncSuite(_))
    ));
}

#[tokio::test]
async fn test_async_suite_runs_steps_in_order() {
    let log = Log::default();
    let (l1, l2) = (log.clone(), log.clone());
    let steps = StepsBuilder::new()
        .async_step("slow <n>", move |args| {
            let log = l1.clone();
            async move {
                tokio::time::sleep(std::time::Duration::from_millis(5)).await;
                let n: u32 = args.get(0)?;
                push(&log, format!("slow {n}"));
                Ok::<_, anyhow::Error>(())
            }
        })
        .step("fast", move |_| {
            push(&l2, "fast");
            Ok(())
        })
        .async_step("fails", |_| async { anyhow::bail!("async boom") })
        .build()
        .unwrap();
    let adapter = Arc::new(RecordingAdapter::new_async());
    let suite = TestSuite::with_selection(steps, adapter.clone(), TagSelection::new());

    suite
        .feature("F", || {
            suite.scenario("ok", || {
                suite.given("slow [1]")?;
                suite.when("fast")?;
                suite.then("slow [2]")
            })?;
            suite.scenario("broken", || {
                suite.given("fails")?;
                suite.then("fast")
            })
        })
        .unwrap();

    let outcomes = adapter.run_all().await;
    assert!(outcomes[0].passed());
    assert!(matches!(
        outcomes[1].error(),
        Some(LeftestError::StepFailed { .. })
    ));
    assert_eq!(*log.lock(), vec!["slow 1", "fast", "slow 2"]);
    assert!(adapter.tests()[0].body.is_async());
}
