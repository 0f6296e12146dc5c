use super::*;
use crate::environment::HarnessEnvironment;
use crate::testing::fixtures::{ButtonHarness, ItemHarness};
use crate::testing::{ElementSpec, MemoryDom};

fn buttons_dom() -> MemoryDom {
    let dom = MemoryDom::new();
    let doc = dom.document();
    let toolbar = dom.append(doc, ElementSpec::new("div").class("toolbar"));
    dom.append(toolbar, ElementSpec::new("button").id("ok").text("OK").attr("aria-label", "Confirm"));
    dom.append(toolbar, ElementSpec::new("button").id("cancel").text("Cancel"));
    dom.append(doc, ElementSpec::new("span").attr("role", "button").text("Close"));
    dom
}

#[test]
fn test_string_matches() {
    assert!(string_matches(None, None));
    assert!(!string_matches(Some("a"), None));
    assert!(!string_matches(None, Some(&"a".into())));
    assert!(string_matches(Some("a"), Some(&"a".into())));
    assert!(!string_matches(Some("ab"), Some(&"a".into())));

    let pattern = StringPattern::from(Regex::new("^Sa").unwrap());
    assert!(string_matches(Some("Save"), Some(&pattern)));
    assert!(!string_matches(Some("Unsave"), Some(&pattern)));
}

#[test]
fn test_pattern_debug() {
    assert_eq!(format!("{:?}", StringPattern::from("OK")), "\"OK\"");
    assert_eq!(
        format!("{:?}", StringPattern::from(Regex::new("^O").unwrap())),
        "/^O/"
    );
}

#[test]
fn test_description_joins_predicates() {
    let predicate = ButtonHarness::with().with_text("OK").with_role("button");
    assert_eq!(predicate.description(), "text = \"OK\", role = \"button\"");
    assert_eq!(predicate.len(), 2);
}

#[test]
fn test_add_option_none_is_noop() {
    let predicate = ButtonHarness::with().add_option("text", None::<String>, |_, _, _| async {
        Ok::<_, LocatorError>(false)
    });
    assert!(predicate.is_empty());
    assert_eq!(predicate.description(), "");
}

#[test]
fn test_selector_without_ancestor() {
    assert_eq!(
        HarnessPredicate::<ButtonHarness>::for_type().selector(),
        "button, [role=\"button\"]"
    );
}

#[test]
fn test_ancestor_applied_to_every_branch() {
    let predicate = ButtonHarness::with().with_ancestor(".toolbar");
    assert_eq!(
        predicate.selector(),
        ".toolbar button, .toolbar [role=\"button\"]"
    );
}

#[test]
fn test_harness_name() {
    assert_eq!(HarnessPredicate::<ItemHarness>::harness_name(), "ItemHarness");
}

#[test]
fn test_harness_name_of_generic_type() {
    struct Wrapper<T>(std::marker::PhantomData<T>);
    assert_eq!(harness_name::<Wrapper<ItemHarness>>(), "Wrapper");
    assert_eq!(harness_name::<Vec<Wrapper<u8>>>(), "Vec");
}

#[tokio::test]
async fn test_filter_keeps_order_and_ands_predicates() {
    let loader = HarnessEnvironment::new(buttons_dom()).loader();
    let all = loader.get_all_harnesses(ButtonHarness::with()).await.unwrap();
    assert_eq!(all.len(), 3);

    let not_ok = ButtonHarness::with().add("not OK", |h: Arc<ButtonHarness>| async move {
        Ok::<_, LocatorError>(h.text().await? != "OK")
    });
    let kept = not_ok.filter(all.clone()).await.unwrap();
    let texts: Vec<String> = futures::future::try_join_all(kept.iter().map(|h| h.text()))
        .await
        .unwrap();
    assert_eq!(texts, vec!["Cancel", "Close"]);

    let both = not_ok.with_text(Regex::new("^C").unwrap()).with_role("button");
    let kept = both.filter(all).await.unwrap();
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].text().await.unwrap(), "Close");
}

#[tokio::test]
async fn test_builtin_option_helpers() {
    let loader = HarnessEnvironment::new(buttons_dom()).loader();

    let ok = loader
        .get_harness(ButtonHarness::with().with_label("Confirm"))
        .await
        .unwrap();
    assert_eq!(ok.text().await.unwrap(), "OK");

    let cancel = loader
        .get_harness(ButtonHarness::with().with_selector("#cancel"))
        .await
        .unwrap();
    assert_eq!(cancel.text().await.unwrap(), "Cancel");

    let scoped = loader
        .get_all_harnesses(ButtonHarness::with().with_ancestor(".toolbar"))
        .await
        .unwrap();
    assert_eq!(scoped.len(), 2);
}

#[tokio::test]
async fn test_predicate_error_propagates() {
    let loader = HarnessEnvironment::new(buttons_dom()).loader();
    let failing = ButtonHarness::with().add("explodes", |_| async {
        Err::<bool, _>(LocatorError::Predicate {
            description: "explodes".into(),
            message: "boom".into(),
        })
    });
    let Err(err) = loader.get_harness(failing).await else {
        panic!("expected predicate failure");
    };
    assert!(err.to_string().contains("boom"));
}

#[tokio::test]
async fn test_cache_shared_within_candidate() {
    let cache = CandidateCache::default();
    let calls = Arc::new(parking_lot::Mutex::new(0));
    for _ in 0..2 {
        let calls = calls.clone();
        let value = cache
            .get_or_compute("k", || async move {
                *calls.lock() += 1;
                Ok::<_, LocatorError>(Value::from(7))
            })
            .await
            .unwrap();
        assert_eq!(value, Value::from(7));
    }
    assert_eq!(*calls.lock(), 1);
    assert_eq!(cache.len(), 1);
}
