//! Execution flags and scenario node kinds.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a suite or test should be realized by the host runner.
///
/// Forwarded to the adapter for every suite and test so the runner can apply
/// its native skip/only semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flag {
    /// Run normally.
    #[default]
    Default,
    /// Declared but not run (`skip` or `todo` tag).
    Skip,
    /// Run exclusively (`only` tag).
    Only,
    /// Filtered out by the active tag selection.
    Exclude,
}

impl Flag {
    /// Returns true if the node is filtered out entirely.
    pub fn is_excluded(&self) -> bool {
        matches!(self, Flag::Exclude)
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Flag::Default => "default",
            Flag::Skip => "skip",
            Flag::Only => "only",
            Flag::Exclude => "exclude",
        };
        f.write_str(s)
    }
}

/// Kind of a scenario tree node, which doubles as the authoring context kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioKind {
    Root,
    Feature,
    Scenario,
    Example,
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ScenarioKind::Root => "root",
            ScenarioKind::Feature => "feature",
            ScenarioKind::Scenario => "scenario",
            ScenarioKind::Example => "example",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_default() {
        assert_eq!(Flag::default(), Flag::Default);
    }

    #[test]
    fn test_flag_is_excluded() {
        assert!(Flag::Exclude.is_excluded());
        assert!(!Flag::Skip.is_excluded());
        assert!(!Flag::Only.is_excluded());
    }

    #[test]
    fn test_flag_serialization() {
        let json = serde_json::to_string(&Flag::Only).unwrap();
        assert_eq!(json, "\"only\"");
        let flag: Flag = serde_json::from_str("\"exclude\"").unwrap();
        assert_eq!(flag, Flag::Exclude);
    }

    #[test]
    fn test_scenario_kind_display() {
        assert_eq!(ScenarioKind::Root.to_string(), "root");
        assert_eq!(ScenarioKind::Feature.to_string(), "feature");
        assert_eq!(ScenarioKind::Scenario.to_string(), "scenario");
        assert_eq!(ScenarioKind::Example.to_string(), "example");
    }
}
