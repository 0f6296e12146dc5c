//! Runnable units and user implementations.

use futures::future::BoxFuture;
use futures::FutureExt;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use super::RunContext;
use crate::error::LeftestError;

#[cfg(test)]
#[path = "runnable_tests.rs"]
mod tests;

/// Result of running a generated test, step or hook.
pub type RunResult = Result<(), LeftestError>;

type SyncRun = Arc<dyn Fn(RunContext) -> RunResult + Send + Sync>;
type AsyncRun = Arc<dyn Fn(RunContext) -> BoxFuture<'static, RunResult> + Send + Sync>;

/// A unit of work generated by the engine and executed by the host runner.
///
/// The runner passes its own per-test context (fixtures, world object, ...)
/// which is forwarded to step and hook implementations untouched.
#[derive(Clone)]
pub enum Runnable {
    Sync(SyncRun),
    Async(AsyncRun),
}

impl Runnable {
    /// Create a synchronous runnable.
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(RunContext) -> RunResult + Send + Sync + 'static,
    {
        Runnable::Sync(Arc::new(f))
    }

    /// Create an asynchronous runnable.
    pub fn async_fn<F, Fut>(f: F) -> Self
    where
        F: Fn(RunContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = RunResult> + Send + 'static,
    {
        Runnable::Async(Arc::new(move |ctx| f(ctx).boxed()))
    }

    pub fn is_async(&self) -> bool {
        matches!(self, Runnable::Async(_))
    }

    /// Run to completion on the current thread.
    ///
    /// Fails with [`LeftestError::AsyncInSyncSuite`] for async runnables.
    pub fn run_sync(&self, ctx: RunContext) -> RunResult {
        match self {
            Runnable::Sync(f) => f(ctx),
            Runnable::Async(_) => Err(LeftestError::AsyncInSyncSuite("runnable".to_string())),
        }
    }

    /// Run, awaiting async bodies.
    pub async fn run(&self, ctx: RunContext) -> RunResult {
        match self {
            Runnable::Sync(f) => f(ctx),
            Runnable::Async(f) => f(ctx).await,
        }
    }
}

impl fmt::Debug for Runnable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Runnable::Sync(_) => f.write_str("Runnable::Sync"),
            Runnable::Async(_) => f.write_str("Runnable::Async"),
        }
    }
}

type SyncImpl<A> = Arc<dyn Fn(&A) -> anyhow::Result<()> + Send + Sync>;
type AsyncImpl<A> = Arc<dyn Fn(A) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

/// A user-supplied step or hook implementation.
pub enum Implementation<A> {
    Sync(SyncImpl<A>),
    Async(AsyncImpl<A>),
}

impl<A> Implementation<A> {
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(&A) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Implementation::Sync(Arc::new(f))
    }

    pub fn async_fn<F, Fut>(f: F) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Implementation::Async(Arc::new(move |args| f(args).boxed()))
    }

    pub fn is_async(&self) -> bool {
        matches!(self, Implementation::Async(_))
    }

    /// Whether both values refer to the same implementation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Implementation::Sync(a), Implementation::Sync(b)) => Arc::ptr_eq(a, b),
            (Implementation::Async(a), Implementation::Async(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl<A> Clone for Implementation<A> {
    fn clone(&self) -> Self {
        match self {
            Implementation::Sync(f) => Implementation::Sync(f.clone()),
            Implementation::Async(f) => Implementation::Async(f.clone()),
        }
    }
}

impl<A> fmt::Debug for Implementation<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Implementation::Sync(_) => f.write_str("Implementation::Sync"),
            Implementation::Async(_) => f.write_str("Implementation::Async"),
        }
    }
}
