//! Locator factories and deferred locators.

use async_trait::async_trait;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use leftest_protocols::{LocatorError, TestElement};

use crate::environment::wait::{self, count_satisfied, ExtraOptions, Wait};
use crate::harness::ComponentHarness;
use crate::predicate::HarnessPredicate;
use crate::query::{describe_queries, Query, QueryResult};

#[cfg(test)]
#[path = "locator_tests.rs"]
mod tests;

/// A subtree queries are resolved against.
///
/// Implemented by [`HarnessEnvironment`](crate::HarnessEnvironment); kept
/// object-safe so harnesses do not carry the backend type.
#[async_trait]
pub trait LocatorScope: Send + Sync {
    fn root_element(&self) -> Arc<dyn TestElement>;

    /// Scope rooted at the document root.
    fn document_root(&self) -> Arc<dyn LocatorScope>;

    /// Budget used by [`Wait::Default`](crate::Wait::Default).
    fn wait_timeout(&self) -> Duration;

    /// Every match for `queries` under this scope, in document order.
    async fn resolve(&self, queries: &[Query]) -> Result<Vec<QueryResult>, LocatorError>;

    /// Scopes rooted at each element matching `selector`.
    async fn child_scopes(&self, selector: &str) -> Result<Vec<Arc<dyn LocatorScope>>, LocatorError>;

    async fn force_stabilize(&self) -> Result<(), LocatorError>;

    async fn wait_for_tasks_outside_angular(&self) -> Result<(), LocatorError>;
}

/// Entry point for finding elements and harnesses under a root element.
///
/// Doubles as the harness loader.
#[derive(Clone)]
pub struct LocatorFactory {
    scope: Arc<dyn LocatorScope>,
}

/// Loader of harnesses under a root element.
pub type HarnessLoader = LocatorFactory;

type Finish<T> = fn(Vec<QueryResult>, &[Query], ExtraOptions) -> Result<T, LocatorError>;

/// Deferred lookup; nothing is resolved until [`get`](Self::get).
pub struct Locator<T> {
    scope: Arc<dyn LocatorScope>,
    queries: Arc<[Query]>,
    options: ExtraOptions,
    finish: Finish<T>,
}

impl<T> Clone for Locator<T> {
    fn clone(&self) -> Self {
        Self {
            scope: self.scope.clone(),
            queries: self.queries.clone(),
            options: self.options,
            finish: self.finish,
        }
    }
}

impl<T> Locator<T> {
    fn new(scope: Arc<dyn LocatorScope>, queries: Vec<Query>, finish: Finish<T>) -> Self {
        Self {
            scope,
            queries: queries.into(),
            options: ExtraOptions::default(),
            finish,
        }
    }

    /// Wait and count options applied on every [`get`](Self::get).
    pub fn with_options(mut self, options: ExtraOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> ExtraOptions {
        self.options
    }

    pub fn queries(&self) -> &[Query] {
        &self.queries
    }

    /// Resolve the queries against the current state of the DOM.
    pub async fn get(&self) -> Result<T, LocatorError> {
        let mut options = self.options;
        if options.wait == Wait::Default {
            options.wait = Wait::Timeout(self.scope.wait_timeout());
        }
        let results = wait::wait_for_results(&*self.scope, &self.queries, options).await?;
        (self.finish)(results, &self.queries, options)
    }
}

impl<T> fmt::Debug for Locator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Locator")
            .field("queries", &self.queries)
            .field("options", &self.options)
            .finish()
    }
}

fn first(results: Vec<QueryResult>, queries: &[Query], options: ExtraOptions) -> Result<QueryResult, LocatorError> {
    check_count(&results, queries, options)?;
    results
        .into_iter()
        .next()
        .ok_or_else(|| LocatorError::NotFound(describe_queries(queries)))
}

/// `None` for zero matches or an unmet explicit count.
fn optional(results: Vec<QueryResult>, _: &[Query], options: ExtraOptions) -> Result<Option<QueryResult>, LocatorError> {
    if options.count.is_some() && !count_satisfied(options.count, results.len()) {
        return Ok(None);
    }
    Ok(results.into_iter().next())
}

fn all(results: Vec<QueryResult>, queries: &[Query], options: ExtraOptions) -> Result<Vec<QueryResult>, LocatorError> {
    check_count(&results, queries, options)?;
    Ok(results)
}

fn first_harness<H: ComponentHarness>(
    results: Vec<QueryResult>,
    queries: &[Query],
    options: ExtraOptions,
) -> Result<Arc<H>, LocatorError> {
    first(results, queries, options)?
        .harness::<H>()
        .ok_or_else(|| LocatorError::NotFound(describe_queries(queries)))
}

fn optional_harness<H: ComponentHarness>(
    results: Vec<QueryResult>,
    queries: &[Query],
    options: ExtraOptions,
) -> Result<Option<Arc<H>>, LocatorError> {
    Ok(optional(results, queries, options)?.and_then(|result| result.harness::<H>()))
}

fn all_harnesses<H: ComponentHarness>(
    results: Vec<QueryResult>,
    queries: &[Query],
    options: ExtraOptions,
) -> Result<Vec<Arc<H>>, LocatorError> {
    check_count(&results, queries, options)?;
    Ok(results.iter().filter_map(QueryResult::harness::<H>).collect())
}

fn check_count(results: &[QueryResult], queries: &[Query], options: ExtraOptions) -> Result<(), LocatorError> {
    match options.count {
        Some(expected) if !count_satisfied(options.count, results.len()) => {
            Err(LocatorError::CountNotReached {
                description: describe_queries(queries),
                expected,
                found: results.len(),
                timeout_ms: options.wait.timeout_ms(),
            })
        }
        _ => Ok(()),
    }
}

fn collect_queries<Q: Into<Query>>(queries: impl IntoIterator<Item = Q>) -> Vec<Query> {
    queries.into_iter().map(Into::into).collect()
}

impl LocatorFactory {
    pub fn new(scope: Arc<dyn LocatorScope>) -> Self {
        Self { scope }
    }

    /// Element this factory is rooted at.
    pub fn root_element(&self) -> Arc<dyn TestElement> {
        self.scope.root_element()
    }

    /// Factory rooted at the document root.
    pub fn document_root_locator_factory(&self) -> LocatorFactory {
        LocatorFactory::new(self.scope.document_root())
    }

    /// First match of any query; fails with a description of every query
    /// when nothing matches.
    pub fn locator_for<Q: Into<Query>>(&self, queries: impl IntoIterator<Item = Q>) -> Locator<QueryResult> {
        Locator::new(self.scope.clone(), collect_queries(queries), first)
    }

    /// First match of any query, `None` when nothing matches.
    pub fn locator_for_optional<Q: Into<Query>>(
        &self,
        queries: impl IntoIterator<Item = Q>,
    ) -> Locator<Option<QueryResult>> {
        Locator::new(self.scope.clone(), collect_queries(queries), optional)
    }

    /// Every match of any query, grouped by element in document order.
    pub fn locator_for_all<Q: Into<Query>>(&self, queries: impl IntoIterator<Item = Q>) -> Locator<Vec<QueryResult>> {
        Locator::new(self.scope.clone(), collect_queries(queries), all)
    }

    pub fn locator_for_harness<H: ComponentHarness>(&self, predicate: HarnessPredicate<H>) -> Locator<Arc<H>> {
        Locator::new(self.scope.clone(), vec![predicate.into()], first_harness::<H>)
    }

    pub fn locator_for_optional_harness<H: ComponentHarness>(
        &self,
        predicate: HarnessPredicate<H>,
    ) -> Locator<Option<Arc<H>>> {
        Locator::new(self.scope.clone(), vec![predicate.into()], optional_harness::<H>)
    }

    pub fn locator_for_all_harnesses<H: ComponentHarness>(
        &self,
        predicate: HarnessPredicate<H>,
    ) -> Locator<Vec<Arc<H>>> {
        Locator::new(self.scope.clone(), vec![predicate.into()], all_harnesses::<H>)
    }

    pub async fn get_harness<H: ComponentHarness>(&self, predicate: HarnessPredicate<H>) -> Result<Arc<H>, LocatorError> {
        self.locator_for_harness(predicate).get().await
    }

    pub async fn get_harness_or_null<H: ComponentHarness>(
        &self,
        predicate: HarnessPredicate<H>,
    ) -> Result<Option<Arc<H>>, LocatorError> {
        self.locator_for_optional_harness(predicate).get().await
    }

    pub async fn get_all_harnesses<H: ComponentHarness>(
        &self,
        predicate: HarnessPredicate<H>,
    ) -> Result<Vec<Arc<H>>, LocatorError> {
        self.locator_for_all_harnesses(predicate).get().await
    }

    pub async fn has_harness<H: ComponentHarness>(&self, predicate: HarnessPredicate<H>) -> Result<bool, LocatorError> {
        Ok(self.get_harness_or_null(predicate).await?.is_some())
    }

    /// Loader rooted at the first element matching `selector`.
    pub async fn harness_loader_for(&self, selector: &str) -> Result<LocatorFactory, LocatorError> {
        self.harness_loader_for_optional(selector)
            .await?
            .ok_or_else(|| {
                LocatorError::NotFound(format!(
                    "(HarnessLoader for element matching selector: {:?})",
                    selector
                ))
            })
    }

    pub async fn harness_loader_for_optional(&self, selector: &str) -> Result<Option<LocatorFactory>, LocatorError> {
        Ok(self
            .scope
            .child_scopes(selector)
            .await?
            .into_iter()
            .next()
            .map(LocatorFactory::new))
    }

    pub async fn harness_loader_for_all(&self, selector: &str) -> Result<Vec<LocatorFactory>, LocatorError> {
        Ok(self
            .scope
            .child_scopes(selector)
            .await?
            .into_iter()
            .map(LocatorFactory::new)
            .collect())
    }

    pub async fn get_child_loader(&self, selector: &str) -> Result<LocatorFactory, LocatorError> {
        self.harness_loader_for(selector).await
    }

    pub async fn get_all_child_loaders(&self, selector: &str) -> Result<Vec<LocatorFactory>, LocatorError> {
        self.harness_loader_for_all(selector).await
    }

    /// Resolve `queries`, polling until `options` are satisfied.
    pub async fn wait_for_results(
        &self,
        queries: &[Query],
        options: ExtraOptions,
    ) -> Result<Vec<QueryResult>, LocatorError> {
        wait::wait_for_results(&*self.scope, queries, options).await
    }

    /// Evaluate `expr` until two consecutive values are equal.
    pub async fn wait_for_stable<T, F, Fut>(&self, expr: F) -> Result<T, LocatorError>
    where
        T: PartialEq,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, LocatorError>>,
    {
        wait::wait_for_stable(&*self.scope, expr).await
    }

    /// Like [`wait_for_stable`](Self::wait_for_stable) for values compared
    /// by their serialized form.
    pub async fn wait_for_stable_serialized<T, F, Fut>(&self, expr: F) -> Result<T, LocatorError>
    where
        T: serde::Serialize,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, LocatorError>>,
    {
        wait::wait_for_stable_serialized(&*self.scope, expr).await
    }

    pub async fn force_stabilize(&self) -> Result<(), LocatorError> {
        self.scope.force_stabilize().await
    }

    pub async fn wait_for_tasks_outside_angular(&self) -> Result<(), LocatorError> {
        self.scope.wait_for_tasks_outside_angular().await
    }
}

impl fmt::Debug for LocatorFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocatorFactory").finish_non_exhaustive()
    }
}
