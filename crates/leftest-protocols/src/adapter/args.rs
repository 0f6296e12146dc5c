//! Arguments handed to step and hook implementations.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::any::Any;
use std::sync::Arc;

use super::ScenarioHandle;
use crate::error::StepError;

/// Opaque per-test context supplied by the host runner.
pub type RunContext = Option<Arc<dyn Any + Send + Sync>>;

/// Downcast a runner context to a concrete type.
pub fn downcast_context<T: Any + Send + Sync>(context: &RunContext) -> Option<Arc<T>> {
    context.clone().and_then(|c| c.downcast::<T>().ok())
}

/// Resolved arguments of one step invocation.
#[derive(Clone)]
pub struct StepArgs {
    /// Rendered step text.
    pub step: String,
    values: Vec<Value>,
    /// Runner context for this test.
    pub context: RunContext,
}

impl StepArgs {
    pub fn new(step: impl Into<String>, values: Vec<Value>, context: RunContext) -> Self {
        Self {
            step: step.into(),
            values,
            context,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Raw argument at `index`.
    pub fn value(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Deserialize the argument at `index`.
    pub fn get<T: DeserializeOwned>(&self, index: usize) -> Result<T, StepError> {
        let value = self.values.get(index).ok_or_else(|| StepError::InsufficientArguments {
            step: self.step.clone(),
            expected: index + 1,
            actual: self.values.len(),
        })?;
        serde_json::from_value(value.clone()).map_err(|e| StepError::InvalidArgument {
            step: self.step.clone(),
            index,
            message: e.to_string(),
        })
    }

    /// Runner context as a concrete type.
    pub fn context<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        downcast_context(&self.context)
    }
}

/// Arguments handed to lifecycle hooks.
#[derive(Clone)]
pub struct HookArgs {
    /// The scenario or example being run.
    pub scenario: Arc<dyn ScenarioHandle>,
    /// Rendered text of the current step for step hooks.
    pub step: Option<String>,
    pub context: RunContext,
}

impl HookArgs {
    pub fn context<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        downcast_context(&self.context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_step_args_get_typed() {
        let args = StepArgs::new("I have 3 \"apples\"", vec![json!(3), json!("apples")], None);
        assert_eq!(args.len(), 2);
        let count: u32 = args.get(0).unwrap();
        let fruit: String = args.get(1).unwrap();
        assert_eq!(count, 3);
        assert_eq!(fruit, "apples");
    }

    #[test]
    fn test_step_args_get_out_of_range() {
        let args = StepArgs::new("nothing", vec![], None);
        assert!(args.is_empty());
        let err = args.get::<u32>(0).unwrap_err();
        assert!(matches!(err, StepError::InsufficientArguments { .. }));
    }

    #[test]
    fn test_step_args_get_wrong_type() {
        let args = StepArgs::new("x", vec![json!("nope")], None);
        let err = args.get::<u32>(0).unwrap_err();
        assert!(matches!(err, StepError::InvalidArgument { index: 0, .. }));
    }

    #[test]
    fn test_step_args_context() {
        let args = StepArgs::new("x", vec![], Some(Arc::new("world".to_string())));
        let ctx = args.context::<String>().unwrap();
        assert_eq!(ctx.as_str(), "world");
        assert!(args.context::<u32>().is_none());
    }
}
