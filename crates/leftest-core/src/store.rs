//! Ambient test-context store cleared between scenario runs.

use parking_lot::Mutex;
use std::any::{type_name, Any};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use leftest_protocols::ContextStoreError;

/// Run counter shared by a suite and its test contexts.
///
/// The suite advances it after every scenario run; contexts compare it on
/// access and drop values written under an older epoch.
#[derive(Debug, Clone, Default)]
pub struct ContextEpoch(Arc<AtomicU64>);

impl ContextEpoch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    pub fn advance(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }
}

struct State {
    epoch: u64,
    values: HashMap<String, Arc<dyn Any + Send + Sync>>,
}

/// Key/value store valid for a single scenario run.
#[derive(Clone)]
pub struct TestContext {
    epoch: ContextEpoch,
    state: Arc<Mutex<State>>,
}

impl TestContext {
    pub fn new(epoch: ContextEpoch) -> Self {
        let current = epoch.current();
        Self {
            epoch,
            state: Arc::new(Mutex::new(State {
                epoch: current,
                values: HashMap::new(),
            })),
        }
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        let mut state = self.state.lock();
        let current = self.epoch.current();
        if state.epoch != current {
            state.values.clear();
            state.epoch = current;
        }
        f(&mut state)
    }

    pub fn set<T: Any + Send + Sync>(&self, key: impl Into<String>, value: T) {
        let key = key.into();
        self.with_state(|s| s.values.insert(key, Arc::new(value)));
    }

    /// Shared value for `key`.
    pub fn get_arc<T: Any + Send + Sync>(&self, key: &str) -> Result<Arc<T>, ContextStoreError> {
        let value = self
            .with_state(|s| s.values.get(key).cloned())
            .ok_or_else(|| ContextStoreError::NotSet(key.to_string()))?;
        value
            .downcast::<T>()
            .map_err(|_| ContextStoreError::TypeMismatch {
                key: key.to_string(),
                expected: type_name::<T>(),
            })
    }

    pub fn get<T: Any + Send + Sync + Clone>(&self, key: &str) -> Result<T, ContextStoreError> {
        self.get_arc::<T>(key).map(|v| T::clone(&v))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.with_state(|s| s.values.contains_key(key))
    }

    pub fn remove(&self, key: &str) -> bool {
        self.with_state(|s| s.values.remove(key).is_some())
    }
}
