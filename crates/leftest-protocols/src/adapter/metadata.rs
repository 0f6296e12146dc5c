//! Metadata attached to every generated test.

use std::fmt;

use super::{HookArgs, Implementation, StepArgs};
use crate::flag::Flag;

pub type StepImplementation = Implementation<StepArgs>;
pub type HookImplementation = Implementation<HookArgs>;

/// Raw implementations behind a generated test.
///
/// Adapters may introspect these lists, for instance to derive the fixtures a
/// test needs before it starts.
#[derive(Clone, Default)]
pub struct RunMetadata {
    pub flag: Flag,
    pub steps: Vec<StepImplementation>,
    pub before_scenario: Vec<HookImplementation>,
    pub after_scenario: Vec<HookImplementation>,
    pub before_step: Vec<HookImplementation>,
    pub after_step: Vec<HookImplementation>,
}

impl RunMetadata {
    pub fn with_flag(flag: Flag) -> Self {
        Self {
            flag,
            ..Default::default()
        }
    }

    /// Whether any step or hook is async.
    pub fn has_async(&self) -> bool {
        self.steps.iter().any(|s| s.is_async())
            || [
                &self.before_scenario,
                &self.after_scenario,
                &self.before_step,
                &self.after_step,
            ]
            .iter()
            .any(|hooks| hooks.iter().any(|h| h.is_async()))
    }
}

impl fmt::Debug for RunMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunMetadata")
            .field("flag", &self.flag)
            .field("steps", &self.steps.len())
            .field("before_scenario", &self.before_scenario.len())
            .field("after_scenario", &self.after_scenario.len())
            .field("before_step", &self.before_step.len())
            .field("after_step", &self.after_step.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_default() {
        let meta = RunMetadata::default();
        assert_eq!(meta.flag, Flag::Default);
        assert!(meta.steps.is_empty());
        assert!(!meta.has_async());
    }

    #[test]
    fn test_metadata_has_async() {
        let mut meta = RunMetadata::with_flag(Flag::Only);
        meta.steps.push(Implementation::sync(|_| Ok(())));
        assert!(!meta.has_async());
        meta.after_step.push(Implementation::async_fn(|_| async { Ok(()) }));
        assert!(meta.has_async());
    }

    #[test]
    fn test_metadata_debug_counts() {
        let mut meta = RunMetadata::default();
        meta.steps.push(Implementation::sync(|_| Ok(())));
        let debug = format!("{:?}", meta);
        assert!(debug.contains("steps: 1"));
    }
}
