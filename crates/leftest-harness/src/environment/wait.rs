//! Polling helpers for waiting on query results.

use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::trace;

use leftest_protocols::LocatorError;

use crate::locator::LocatorScope;
use crate::query::{Query, QueryResult};

/// How long a locator keeps polling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Wait {
    /// Resolve once.
    #[default]
    No,
    /// Poll for the environment's default budget.
    Default,
    /// Poll for an explicit budget.
    Timeout(Duration),
}

impl Wait {
    /// Budget in milliseconds. `Default` reports 0; locators resolve it
    /// against the environment first.
    pub fn timeout_ms(&self) -> u64 {
        match self {
            Wait::Timeout(d) => d.as_millis() as u64,
            Wait::No | Wait::Default => 0,
        }
    }
}

impl From<bool> for Wait {
    fn from(wait: bool) -> Self {
        if wait { Wait::Default } else { Wait::No }
    }
}

impl From<Duration> for Wait {
    fn from(timeout: Duration) -> Self {
        Wait::Timeout(timeout)
    }
}

impl From<u64> for Wait {
    fn from(millis: u64) -> Self {
        Wait::Timeout(Duration::from_millis(millis))
    }
}

/// Wait and count options for a locator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtraOptions {
    pub wait: Wait,
    /// Matches required before polling stops. `None` means at least one.
    pub count: Option<usize>,
}

impl ExtraOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_wait(mut self, wait: impl Into<Wait>) -> Self {
        self.wait = wait.into();
        self
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }
}

/// Whether `found` results satisfy `count`.
///
/// `Some(0)` requires no results, `Some(n)` at least `n`.
pub(crate) fn count_satisfied(count: Option<usize>, found: usize) -> bool {
    match count {
        Some(0) => found == 0,
        Some(n) => found >= n,
        None => found > 0,
    }
}

/// Resolve `queries`, re-polling until the count is met or the budget runs out.
///
/// Between attempts the scope is stabilized so pending DOM work can land.
/// The last results are returned either way.
pub async fn wait_for_results(
    scope: &dyn LocatorScope,
    queries: &[Query],
    options: ExtraOptions,
) -> Result<Vec<QueryResult>, LocatorError> {
    let timeout = match options.wait {
        Wait::No => return scope.resolve(queries).await,
        Wait::Default => scope.wait_timeout(),
        Wait::Timeout(timeout) => timeout,
    };

    let started = Instant::now();
    let mut attempts = 0usize;
    loop {
        let results = scope.resolve(queries).await?;
        attempts += 1;
        let satisfied = count_satisfied(options.count, results.len());
        if satisfied || started.elapsed() >= timeout {
            trace!(
                attempts,
                found = results.len(),
                satisfied,
                "Finished waiting for query results"
            );
            return Ok(results);
        }
        scope.force_stabilize().await?;
        tokio::task::yield_now().await;
    }
}

/// Evaluate `expr` until two consecutive evaluations are equal.
///
/// There is no upper bound; an expression that never settles never returns.
pub async fn wait_for_stable<T, F, Fut>(scope: &dyn LocatorScope, mut expr: F) -> Result<T, LocatorError>
where
    T: PartialEq,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, LocatorError>>,
{
    let mut previous = expr().await?;
    loop {
        scope.force_stabilize().await?;
        let current = expr().await?;
        if current == previous {
            return Ok(current);
        }
        previous = current;
    }
}

/// Like [`wait_for_stable`], comparing the serialized form of each value.
pub async fn wait_for_stable_serialized<T, F, Fut>(scope: &dyn LocatorScope, mut expr: F) -> Result<T, LocatorError>
where
    T: Serialize,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, LocatorError>>,
{
    let mut previous = serialized(&expr().await?)?;
    loop {
        scope.force_stabilize().await?;
        let current = expr().await?;
        let snapshot = serialized(&current)?;
        if snapshot == previous {
            return Ok(current);
        }
        previous = snapshot;
    }
}

fn serialized<T: Serialize>(value: &T) -> Result<Value, LocatorError> {
    serde_json::to_value(value).map_err(|e| LocatorError::Predicate {
        description: "wait_for_stable".to_string(),
        message: e.to_string(),
    })
}
