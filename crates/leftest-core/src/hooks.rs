//! Lifecycle hooks and their per-scenario resolution.

use std::collections::BTreeSet;
use std::fmt;

use leftest_protocols::{Flag, HookImplementation, RunMetadata, StepImplementation};

use crate::tags::TagFilter;

/// When a hook runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
    BeforeScenario,
    AfterScenario,
    BeforeStep,
    AfterStep,
}

impl HookKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HookKind::BeforeScenario => "before_scenario",
            HookKind::AfterScenario => "after_scenario",
            HookKind::BeforeStep => "before_step",
            HookKind::AfterStep => "after_step",
        }
    }
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered hook, optionally guarded by a tag filter.
#[derive(Debug, Clone)]
pub struct Hook {
    pub kind: HookKind,
    pub filter: Option<TagFilter>,
    pub implementation: HookImplementation,
}

impl Hook {
    /// Whether the hook applies to a node with these effective tags.
    pub fn applies_to(&self, tags: &BTreeSet<String>) -> bool {
        self.filter.as_ref().is_none_or(|f| f.matches(tags))
    }
}

/// Every hook registered on a suite, in registration order.
#[derive(Debug, Clone, Default)]
pub struct Hooks {
    hooks: Vec<Hook>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, hook: Hook) {
        self.hooks.push(hook);
    }

    /// Hooks applicable to a node with the given effective tags.
    pub fn resolve(&self, tags: &BTreeSet<String>) -> EffectiveHooks {
        let mut effective = EffectiveHooks::default();
        for hook in self.hooks.iter().filter(|h| h.applies_to(tags)) {
            let list = match hook.kind {
                HookKind::BeforeScenario => &mut effective.before_scenario,
                HookKind::AfterScenario => &mut effective.after_scenario,
                HookKind::BeforeStep => &mut effective.before_step,
                HookKind::AfterStep => &mut effective.after_step,
            };
            list.push(hook.implementation.clone());
        }
        effective
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

/// Hooks that apply to one scenario or example.
#[derive(Debug, Clone, Default)]
pub struct EffectiveHooks {
    pub before_scenario: Vec<HookImplementation>,
    pub after_scenario: Vec<HookImplementation>,
    pub before_step: Vec<HookImplementation>,
    pub after_step: Vec<HookImplementation>,
}

impl EffectiveHooks {
    pub fn into_metadata(self, flag: Flag, steps: Vec<StepImplementation>) -> RunMetadata {
        RunMetadata {
            flag,
            steps,
            before_scenario: self.before_scenario,
            after_scenario: self.after_scenario,
            before_step: self.before_step,
            after_step: self.after_step,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::TagRegistry;
    use leftest_protocols::Implementation;

    fn hook(kind: HookKind, filter: Option<TagFilter>) -> Hook {
        Hook {
            kind,
            filter,
            implementation: Implementation::sync(|_| Ok(())),
        }
    }

    fn tags(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_resolve_unconditional() {
        let mut hooks = Hooks::new();
        hooks.add(hook(HookKind::BeforeScenario, None));
        hooks.add(hook(HookKind::AfterStep, None));
        let effective = hooks.resolve(&tags(&[]));
        assert_eq!(effective.before_scenario.len(), 1);
        assert_eq!(effective.after_step.len(), 1);
        assert!(effective.after_scenario.is_empty());
        assert_eq!(hooks.len(), 2);
    }

    #[test]
    fn test_resolve_filtered() {
        let registry = TagRegistry::new();
        let slow = registry.tag("slow");
        let mut hooks = Hooks::new();
        hooks.add(hook(HookKind::BeforeScenario, Some(TagFilter::eq(&slow))));
        hooks.add(hook(HookKind::BeforeScenario, Some(TagFilter::not(&slow))));

        let effective = hooks.resolve(&tags(&["slow"]));
        assert_eq!(effective.before_scenario.len(), 1);
        assert!(effective.before_scenario[0].ptr_eq(&hooks.hooks[0].implementation));

        let effective = hooks.resolve(&tags(&["fast"]));
        assert!(effective.before_scenario[0].ptr_eq(&hooks.hooks[1].implementation));
    }

    #[test]
    fn test_into_metadata() {
        let mut hooks = Hooks::new();
        hooks.add(hook(HookKind::AfterScenario, None));
        let meta = hooks
            .resolve(&tags(&[]))
            .into_metadata(Flag::Skip, vec![Implementation::sync(|_| Ok(()))]);
        assert_eq!(meta.flag, Flag::Skip);
        assert_eq!(meta.steps.len(), 1);
        assert_eq!(meta.after_scenario.len(), 1);
    }

    #[test]
    fn test_hook_kind_display() {
        assert_eq!(HookKind::BeforeStep.to_string(), "before_step");
    }
}
