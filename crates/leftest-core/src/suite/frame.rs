//! Authoring context frames.

use parking_lot::Mutex;
use std::sync::Arc;

use leftest_protocols::ScenarioKind;

use crate::scenario::Scenario;

/// Where step verbs append their steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StepSink {
    Illegal,
    Steps,
    Background,
}

/// The active authoring context.
#[derive(Debug, Clone)]
pub(crate) struct Frame {
    pub kind: ScenarioKind,
    pub node: Arc<Scenario>,
    pub sink: StepSink,
}

impl Frame {
    pub fn new(kind: ScenarioKind, node: Arc<Scenario>, sink: StepSink) -> Self {
        Self { kind, node, sink }
    }

    pub fn root(node: Arc<Scenario>) -> Self {
        Self::new(ScenarioKind::Root, node, StepSink::Illegal)
    }
}

/// Restores the previous frame when dropped.
pub(crate) struct FrameGuard<'a> {
    slot: &'a Mutex<Frame>,
    saved: Option<Frame>,
}

impl<'a> FrameGuard<'a> {
    pub fn enter(slot: &'a Mutex<Frame>, frame: Frame) -> Self {
        let saved = std::mem::replace(&mut *slot.lock(), frame);
        Self {
            slot,
            saved: Some(saved),
        }
    }
}

impl Drop for FrameGuard<'_> {
    fn drop(&mut self) {
        if let Some(frame) = self.saved.take() {
            *self.slot.lock() = frame;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::ExampleRow;

    #[test]
    fn test_guard_restores_on_drop() {
        let root = Scenario::root();
        let slot = Mutex::new(Frame::root(root.clone()));
        let feature = Scenario::new(ScenarioKind::Feature, "F", Some(&root), vec![], ExampleRow::new());
        {
            let _guard = FrameGuard::enter(&slot, Frame::new(ScenarioKind::Feature, feature, StepSink::Illegal));
            assert_eq!(slot.lock().kind, ScenarioKind::Feature);
        }
        assert_eq!(slot.lock().kind, ScenarioKind::Root);
    }
}
