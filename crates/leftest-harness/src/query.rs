//! Queries accepted by locator methods and the results they produce.

use async_trait::async_trait;
use std::any::{Any, TypeId};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use leftest_protocols::{LocatorError, TestElement};

use crate::harness::ComponentHarness;
use crate::locator::LocatorFactory;
use crate::predicate::{harness_name, HarnessPredicate};
use crate::selector::split_selector;

/// Type-erased harness instance.
pub type ErasedHarness = Arc<dyn Any + Send + Sync>;

/// Object-safe view of a [`HarnessPredicate`].
#[async_trait]
pub trait HarnessQuery: Send + Sync {
    fn harness_type(&self) -> TypeId;

    fn harness_name(&self) -> &'static str;

    /// Selector candidate hosts must match.
    fn selector(&self) -> String;

    fn description(&self) -> String;

    /// Build the harness on `locator` and keep it if every predicate holds.
    async fn instantiate(&self, locator: LocatorFactory) -> Result<Option<ErasedHarness>, LocatorError>;
}

#[async_trait]
impl<H: ComponentHarness> HarnessQuery for HarnessPredicate<H> {
    fn harness_type(&self) -> TypeId {
        TypeId::of::<H>()
    }

    fn harness_name(&self) -> &'static str {
        harness_name::<H>()
    }

    fn selector(&self) -> String {
        HarnessPredicate::selector(self)
    }

    fn description(&self) -> String {
        let constraints = HarnessPredicate::description(self);
        let mut description = format!(
            "{} with host element matching selector: {:?}",
            harness_name::<H>(),
            HarnessPredicate::selector(self)
        );
        if !constraints.is_empty() {
            description.push_str(" satisfying the constraints: ");
            description.push_str(&constraints);
        }
        description
    }

    async fn instantiate(&self, locator: LocatorFactory) -> Result<Option<ErasedHarness>, LocatorError> {
        let harness = Arc::new(H::from_locator(locator));
        if self.evaluate(harness.clone()).await? {
            Ok(Some(harness))
        } else {
            Ok(None)
        }
    }
}

/// A raw selector or a harness query.
#[derive(Clone)]
pub enum Query {
    Selector(String),
    Harness(Arc<dyn HarnessQuery>),
}

impl Query {
    /// Every instance of harness `H`.
    pub fn of<H: ComponentHarness>() -> Self {
        Query::Harness(Arc::new(HarnessPredicate::<H>::new()))
    }

    pub fn harness<H: ComponentHarness>(predicate: HarnessPredicate<H>) -> Self {
        Query::Harness(Arc::new(predicate))
    }

    /// Selector candidates for this query must match.
    pub fn selector(&self) -> String {
        match self {
            Query::Selector(s) => s.clone(),
            Query::Harness(q) => q.selector(),
        }
    }

    pub fn description(&self) -> String {
        match self {
            Query::Selector(s) => format!("TestElement for element matching selector: {:?}", s),
            Query::Harness(q) => q.description(),
        }
    }
}

impl From<&str> for Query {
    fn from(s: &str) -> Self {
        Query::Selector(s.to_string())
    }
}

impl From<String> for Query {
    fn from(s: String) -> Self {
        Query::Selector(s)
    }
}

impl<H: ComponentHarness> From<HarnessPredicate<H>> for Query {
    fn from(predicate: HarnessPredicate<H>) -> Self {
        Query::harness(predicate)
    }
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Query({})", self.description())
    }
}

/// Harness found by a query.
#[derive(Clone)]
pub struct HarnessMatch {
    pub type_id: TypeId,
    pub name: &'static str,
    pub instance: ErasedHarness,
}

/// One resolved match.
#[derive(Clone)]
pub enum QueryResult {
    Element(Arc<dyn TestElement>),
    Harness(HarnessMatch),
}

impl QueryResult {
    pub fn element(&self) -> Option<&Arc<dyn TestElement>> {
        match self {
            QueryResult::Element(e) => Some(e),
            QueryResult::Harness(_) => None,
        }
    }

    /// The harness instance if this result is an `H`.
    pub fn harness<H: Send + Sync + 'static>(&self) -> Option<Arc<H>> {
        match self {
            QueryResult::Harness(m) => m.instance.clone().downcast::<H>().ok(),
            QueryResult::Element(_) => None,
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self, QueryResult::Element(_))
    }

    /// `"TestElement"` or the harness type name.
    pub fn kind_name(&self) -> &'static str {
        match self {
            QueryResult::Element(_) => "TestElement",
            QueryResult::Harness(m) => m.name,
        }
    }
}

impl fmt::Debug for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QueryResult({})", self.kind_name())
    }
}

/// Queries split by kind, in input order.
pub(crate) struct ParsedQueries<'a> {
    pub all: &'a [Query],
    element_count: usize,
    harness_types: HashSet<TypeId>,
}

impl<'a> ParsedQueries<'a> {
    pub fn new(all: &'a [Query]) -> Self {
        let mut element_count = 0;
        let mut harness_types = HashSet::new();
        for query in all {
            match query {
                Query::Selector(_) => element_count += 1,
                Query::Harness(q) => {
                    harness_types.insert(q.harness_type());
                }
            }
        }
        Self {
            all,
            element_count,
            harness_types,
        }
    }

    /// Union of every query's selector branches.
    pub fn union_selector(&self) -> String {
        self.all
            .iter()
            .flat_map(|q| split_selector(&q.selector()))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Whether every element returned by the union selector is known to
    /// match every query's selector.
    pub fn skip_selector_check(&self) -> bool {
        let harness_queries = self.all.len() - self.element_count;
        (self.element_count == 0 && self.harness_types.len() == 1) || harness_queries == 0
    }
}

/// `(description)` per query, joined for error messages.
pub fn describe_queries(queries: &[Query]) -> String {
    queries
        .iter()
        .map(|q| format!("({})", q.description()))
        .collect::<Vec<_>>()
        .join(",\n")
}
