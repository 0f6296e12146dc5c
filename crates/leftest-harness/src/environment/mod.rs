//! Harness environment: resolves queries against a runner backend.

pub mod wait;

use async_trait::async_trait;
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

use leftest_protocols::{LocatorError, TestElement};

use crate::locator::{LocatorFactory, LocatorScope};
use crate::query::{HarnessMatch, ParsedQueries, Query, QueryResult};

pub use wait::{ExtraOptions, Wait};

#[cfg(test)]
#[path = "environment_tests.rs"]
mod tests;

/// Default budget for waiting locators.
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_millis(4000);

/// Raw element access a runner backend provides.
#[async_trait]
pub trait EnvironmentBackend: Send + Sync + 'static {
    /// Backend-native element handle.
    type Element: Clone + Send + Sync + 'static;

    fn document_root(&self) -> Self::Element;

    /// Elements under `root` matching `selector`, in document order.
    async fn raw_elements(&self, root: &Self::Element, selector: &str)
    -> Result<Vec<Self::Element>, LocatorError>;

    fn create_test_element(&self, element: &Self::Element) -> Arc<dyn TestElement>;

    /// Flush pending UI work so the DOM reflects the latest state.
    async fn force_stabilize(&self) -> Result<(), LocatorError>;

    /// Wait for background work the UI framework does not track.
    async fn wait_for_tasks_outside_angular(&self) -> Result<(), LocatorError>;

    async fn matches_selector(&self, element: &Self::Element, selector: &str) -> Result<bool, LocatorError> {
        Ok(self.create_test_element(element).matches_selector(selector).await?)
    }
}

/// Environment settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentOptions {
    pub wait_timeout: Duration,
}

impl Default for EnvironmentOptions {
    fn default() -> Self {
        Self {
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
        }
    }
}

/// A backend rooted at one element.
pub struct HarnessEnvironment<B: EnvironmentBackend> {
    backend: Arc<B>,
    root: B::Element,
    options: EnvironmentOptions,
}

impl<B: EnvironmentBackend> HarnessEnvironment<B> {
    /// Environment rooted at the backend's document root.
    pub fn new(backend: B) -> Arc<Self> {
        Self::with_options(backend, EnvironmentOptions::default())
    }

    pub fn with_options(backend: B, options: EnvironmentOptions) -> Arc<Self> {
        let root = backend.document_root();
        Arc::new(Self {
            backend: Arc::new(backend),
            root,
            options,
        })
    }

    /// Environment sharing this backend, rooted at `element`.
    pub fn create_environment(&self, element: B::Element) -> Arc<Self> {
        Arc::new(Self {
            backend: self.backend.clone(),
            root: element,
            options: self.options.clone(),
        })
    }

    /// Locator factory (and harness loader) for this environment.
    pub fn loader(self: &Arc<Self>) -> LocatorFactory {
        LocatorFactory::new(self.clone())
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn root(&self) -> &B::Element {
        &self.root
    }

    pub fn options(&self) -> &EnvironmentOptions {
        &self.options
    }

    /// Matches for one candidate element, at most one element result and
    /// one result per harness type.
    async fn results_for_element(
        &self,
        element: &B::Element,
        parsed: &ParsedQueries<'_>,
        skip_selector_check: bool,
    ) -> Result<Vec<QueryResult>, LocatorError> {
        let test_element = self.backend.create_test_element(element);
        let matches = join_all(
            parsed
                .all
                .iter()
                .map(|query| self.evaluate_query(element, &test_element, query, skip_selector_check)),
        )
        .await;

        let mut results = Vec::new();
        let mut seen_element = false;
        let mut seen_harnesses = HashSet::new();
        for matched in matches {
            match matched? {
                Some(QueryResult::Element(e)) if !seen_element => {
                    seen_element = true;
                    results.push(QueryResult::Element(e));
                }
                Some(QueryResult::Harness(m)) if seen_harnesses.insert(m.type_id) => {
                    results.push(QueryResult::Harness(m));
                }
                _ => {}
            }
        }
        Ok(results)
    }

    async fn evaluate_query(
        &self,
        element: &B::Element,
        test_element: &Arc<dyn TestElement>,
        query: &Query,
        skip_selector_check: bool,
    ) -> Result<Option<QueryResult>, LocatorError> {
        if !skip_selector_check && !self.backend.matches_selector(element, &query.selector()).await? {
            return Ok(None);
        }
        match query {
            Query::Selector(_) => Ok(Some(QueryResult::Element(test_element.clone()))),
            Query::Harness(harness_query) => {
                let locator = self.create_environment(element.clone()).loader();
                let instance = harness_query.instantiate(locator).await?;
                Ok(instance.map(|instance| {
                    QueryResult::Harness(HarnessMatch {
                        type_id: harness_query.harness_type(),
                        name: harness_query.harness_name(),
                        instance,
                    })
                }))
            }
        }
    }
}

#[async_trait]
impl<B: EnvironmentBackend> LocatorScope for HarnessEnvironment<B> {
    fn root_element(&self) -> Arc<dyn TestElement> {
        self.backend.create_test_element(&self.root)
    }

    fn document_root(&self) -> Arc<dyn LocatorScope> {
        self.create_environment(self.backend.document_root())
    }

    fn wait_timeout(&self) -> Duration {
        self.options.wait_timeout
    }

    async fn resolve(&self, queries: &[Query]) -> Result<Vec<QueryResult>, LocatorError> {
        let parsed = ParsedQueries::new(queries);
        let selector = parsed.union_selector();
        if selector.is_empty() {
            return Ok(Vec::new());
        }

        let elements = self.backend.raw_elements(&self.root, &selector).await?;
        let skip_selector_check = parsed.skip_selector_check();
        trace!(
            selector = %selector,
            candidates = elements.len(),
            skip_selector_check,
            "Resolving queries"
        );

        let per_element = join_all(
            elements
                .iter()
                .map(|element| self.results_for_element(element, &parsed, skip_selector_check)),
        )
        .await;

        let mut results = Vec::new();
        for element_results in per_element {
            results.extend(element_results?);
        }
        debug!(queries = queries.len(), matches = results.len(), "Resolved queries");
        Ok(results)
    }

    async fn child_scopes(&self, selector: &str) -> Result<Vec<Arc<dyn LocatorScope>>, LocatorError> {
        let elements = self.backend.raw_elements(&self.root, selector).await?;
        Ok(elements
            .into_iter()
            .map(|element| self.create_environment(element) as Arc<dyn LocatorScope>)
            .collect())
    }

    async fn force_stabilize(&self) -> Result<(), LocatorError> {
        self.backend.force_stabilize().await
    }

    async fn wait_for_tasks_outside_angular(&self) -> Result<(), LocatorError> {
        self.backend.wait_for_tasks_outside_angular().await
    }
}
