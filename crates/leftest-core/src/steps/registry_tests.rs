use super::*;

fn noop() -> StepImplementation {
    Implementation::sync(|_| Ok(()))
}

#[test]
fn test_lookup_by_normalized_text() {
    let registry = StepsBuilder::new()
        .step("I have <count> apples", |_| Ok(()))
        .step("I eat 'one'", |_| Ok(()))
        .build()
        .unwrap();

    assert_eq!(registry.len(), 2);
    let def = registry.lookup("I have [3] apples").unwrap();
    assert_eq!(def.name, "I have <count> apples");
    assert!(registry.lookup("I eat \"two\"").is_ok());
    assert!(registry.contains("I have <n> apples"));
}

#[test]
fn test_lookup_not_found() {
    let registry = StepsBuilder::new().step("a", |_| Ok(())).build().unwrap();
    let err = registry.lookup("b").unwrap_err();
    assert!(matches!(err, StepError::NotFound(ref text) if text == "b"));
}

#[test]
fn test_ambiguous_placeholder_names() {
    let err = StepRegistry::new([
        ("add <a> to <b>", noop()),
        ("unrelated", noop()),
        ("add <x> to 'y'", noop()),
    ])
    .unwrap_err();

    match err {
        StepError::Ambiguous(templates) => {
            assert_eq!(templates, vec!["add <a> to <b>", "add <x> to 'y'"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_ambiguous_lists_every_conflict() {
    let err = StepRegistry::new([
        ("<a> one", noop()),
        ("<b> two", noop()),
        ("[c] one", noop()),
        ("'d' two", noop()),
        ("'e' one", noop()),
    ])
    .unwrap_err();

    match err {
        StepError::Ambiguous(templates) => {
            assert_eq!(templates, vec!["<a> one", "[c] one", "'e' one", "<b> two", "'d' two"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_different_literal_text_not_ambiguous() {
    let registry = StepRegistry::new([
        ("add <a> to <b>", noop()),
        ("remove <a> from <b>", noop()),
    ])
    .unwrap();
    assert_eq!(registry.len(), 2);
    assert_eq!(
        registry.templates().collect::<Vec<_>>(),
        vec!["add <a> to <b>", "remove <a> from <b>"]
    );
}

#[test]
fn test_definition_keeps_segments() {
    let registry = StepsBuilder::new()
        .async_step("I wait [1] second", |_| async { Ok(()) })
        .build()
        .unwrap();
    let def = registry.lookup("I wait [2] second").unwrap();
    assert!(def.implementation.is_async());
    assert_eq!(def.vars.len(), 3);
}

#[test]
fn test_empty_registry() {
    let registry = StepsBuilder::new().build().unwrap();
    assert!(registry.is_empty());
}
