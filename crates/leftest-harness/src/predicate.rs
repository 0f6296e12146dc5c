//! Composable async predicates over harness instances.

use futures::future::{join_all, BoxFuture};
use futures::FutureExt;
use parking_lot::Mutex;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use leftest_protocols::{LocatorError, TextOptions};

use crate::harness::ComponentHarness;
use crate::selector::scope_selector;

#[cfg(test)]
#[path = "predicate_tests.rs"]
mod tests;

/// A string or regex a value is matched against.
#[derive(Clone)]
pub enum StringPattern {
    Exact(String),
    Regex(Regex),
}

impl StringPattern {
    pub fn matches(&self, value: &str) -> bool {
        match self {
            StringPattern::Exact(s) => s == value,
            StringPattern::Regex(re) => re.is_match(value),
        }
    }
}

impl From<&str> for StringPattern {
    fn from(s: &str) -> Self {
        StringPattern::Exact(s.to_string())
    }
}

impl From<String> for StringPattern {
    fn from(s: String) -> Self {
        StringPattern::Exact(s)
    }
}

impl From<Regex> for StringPattern {
    fn from(re: Regex) -> Self {
        StringPattern::Regex(re)
    }
}

impl fmt::Debug for StringPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StringPattern::Exact(s) => write!(f, "{:?}", s),
            StringPattern::Regex(re) => write!(f, "/{}/", re.as_str()),
        }
    }
}

/// Match an optional value against an optional pattern.
///
/// A `None` pattern only matches a `None` value.
pub fn string_matches(value: Option<&str>, pattern: Option<&StringPattern>) -> bool {
    match (value, pattern) {
        (value, None) => value.is_none(),
        (None, Some(_)) => false,
        (Some(value), Some(pattern)) => pattern.matches(value),
    }
}

/// Memo shared by the predicates evaluating one candidate.
#[derive(Clone, Default)]
pub struct CandidateCache {
    entries: Arc<Mutex<HashMap<String, Value>>>,
}

impl CandidateCache {
    /// Cached value for `key`, computed on first use.
    pub async fn get_or_compute<F, Fut>(&self, key: &str, compute: F) -> Result<Value, LocatorError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, LocatorError>>,
    {
        let cached = self.entries.lock().get(key).cloned();
        if let Some(value) = cached {
            return Ok(value);
        }
        let value = compute().await?;
        self.entries.lock().insert(key.to_string(), value.clone());
        Ok(value)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

type PredicateFn<H> =
    Arc<dyn Fn(Arc<H>, CandidateCache) -> BoxFuture<'static, Result<bool, LocatorError>> + Send + Sync>;

/// Query for harnesses of type `H` satisfying every added predicate.
pub struct HarnessPredicate<H> {
    predicates: Vec<(String, PredicateFn<H>)>,
    ancestor: Option<String>,
    _harness: PhantomData<fn() -> H>,
}

impl<H> Clone for HarnessPredicate<H> {
    fn clone(&self) -> Self {
        Self {
            predicates: self.predicates.clone(),
            ancestor: self.ancestor.clone(),
            _harness: PhantomData,
        }
    }
}

impl<H: ComponentHarness> Default for HarnessPredicate<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: ComponentHarness> HarnessPredicate<H> {
    /// Matches every harness of type `H`.
    pub fn new() -> Self {
        Self {
            predicates: Vec::new(),
            ancestor: None,
            _harness: PhantomData,
        }
    }

    /// Default predicate for `H`; same as [`new`](Self::new).
    pub fn for_type() -> Self {
        Self::new()
    }

    /// Append a named predicate.
    pub fn add<F, Fut>(self, description: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(Arc<H>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<bool, LocatorError>> + Send + 'static,
    {
        self.add_cached(description, move |harness, _| predicate(harness))
    }

    /// Append a predicate that may memoize work in the candidate cache.
    pub fn add_cached<F, Fut>(mut self, description: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(Arc<H>, CandidateCache) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<bool, LocatorError>> + Send + 'static,
    {
        let predicate: PredicateFn<H> = Arc::new(move |harness, cache| predicate(harness, cache).boxed());
        self.predicates.push((description.into(), predicate));
        self
    }

    /// Append a predicate bound to `value`; a no-op when `value` is `None`.
    pub fn add_option<V, F, Fut>(self, name: &str, value: Option<V>, predicate: F) -> Self
    where
        V: fmt::Debug + Clone + Send + Sync + 'static,
        F: Fn(Arc<H>, V, CandidateCache) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<bool, LocatorError>> + Send + 'static,
    {
        match value {
            None => self,
            Some(value) => {
                let description = format!("{} = {:?}", name, value);
                self.add_cached(description, move |harness, cache| {
                    predicate(harness, value.clone(), cache)
                })
            }
        }
    }

    /// Only match harnesses inside an element matching `selector`.
    pub fn with_ancestor(mut self, selector: impl Into<String>) -> Self {
        self.ancestor = Some(selector.into());
        self
    }

    /// Host element must also match `selector`.
    pub fn with_selector(self, selector: impl Into<String>) -> Self {
        let selector = selector.into();
        let description = format!("host matches selector {:?}", selector);
        self.add(description, move |harness| {
            let selector = selector.clone();
            async move { Ok::<_, LocatorError>(harness.host().matches_selector(&selector).await?) }
        })
    }

    /// Host text must match `pattern`.
    pub fn with_text(self, pattern: impl Into<StringPattern>) -> Self {
        self.add_option("text", Some(pattern.into()), |harness, pattern, cache| async move {
            let text = cache
                .get_or_compute("text", || async {
                    Ok::<_, LocatorError>(Value::String(
                        harness.host().text(TextOptions::default()).await?,
                    ))
                })
                .await?;
            Ok::<_, LocatorError>(string_matches(text.as_str(), Some(&pattern)))
        })
    }

    /// Host `role` attribute must equal `role`.
    pub fn with_role(self, role: impl Into<String>) -> Self {
        let pattern = StringPattern::Exact(role.into());
        self.add_option("role", Some(pattern), |harness, pattern, cache| async move {
            let role = cached_attribute(&*harness, &cache, "role").await?;
            Ok::<_, LocatorError>(string_matches(role.as_deref(), Some(&pattern)))
        })
    }

    /// Host `aria-label` must match `pattern`.
    pub fn with_label(self, pattern: impl Into<StringPattern>) -> Self {
        self.add_option("label", Some(pattern.into()), |harness, pattern, cache| async move {
            let label = cached_attribute(&*harness, &cache, "aria-label").await?;
            Ok::<_, LocatorError>(string_matches(label.as_deref(), Some(&pattern)))
        })
    }

    /// Whether `harness` satisfies every predicate.
    pub async fn evaluate(&self, harness: Arc<H>) -> Result<bool, LocatorError> {
        self.evaluate_with(harness, &CandidateCache::default()).await
    }

    async fn evaluate_with(&self, harness: Arc<H>, cache: &CandidateCache) -> Result<bool, LocatorError> {
        let results = join_all(
            self.predicates
                .iter()
                .map(|(_, predicate)| predicate(harness.clone(), cache.clone())),
        )
        .await;
        let mut accepted = true;
        for result in results {
            accepted &= result?;
        }
        Ok(accepted)
    }

    /// Candidates satisfying every predicate, in input order.
    ///
    /// Candidates are evaluated concurrently; the cache lives for this pass
    /// only.
    pub async fn filter(&self, candidates: Vec<Arc<H>>) -> Result<Vec<Arc<H>>, LocatorError> {
        let caches: Vec<CandidateCache> = candidates.iter().map(|_| CandidateCache::default()).collect();
        let verdicts = join_all(
            candidates
                .iter()
                .zip(&caches)
                .map(|(candidate, cache)| self.evaluate_with(candidate.clone(), cache)),
        )
        .await;

        let mut survivors = Vec::new();
        for (candidate, verdict) in candidates.into_iter().zip(verdicts) {
            if verdict? {
                survivors.push(candidate);
            }
        }
        Ok(survivors)
    }

    /// Predicate descriptions joined with `", "`.
    pub fn description(&self) -> String {
        self.predicates
            .iter()
            .map(|(d, _)| d.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Selector for candidate hosts, ancestor applied to every branch.
    pub fn selector(&self) -> String {
        match &self.ancestor {
            Some(ancestor) => scope_selector(ancestor, H::HOST_SELECTOR),
            None => H::HOST_SELECTOR.trim().to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Short type name of `H`.
    pub fn harness_name() -> &'static str {
        harness_name::<H>()
    }
}

/// Last path segment of the type name, ignoring generic arguments.
pub(crate) fn harness_name<H>() -> &'static str {
    let full = std::any::type_name::<H>();
    let path = full.split('<').next().unwrap_or(full);
    path.rsplit("::").next().unwrap_or(path)
}

async fn cached_attribute<H: ComponentHarness>(
    harness: &H,
    cache: &CandidateCache,
    name: &str,
) -> Result<Option<String>, LocatorError> {
    let key = format!("attribute:{}", name);
    let value = cache
        .get_or_compute(&key, || async {
            Ok::<_, LocatorError>(harness
                .host()
                .attribute(name)
                .await?
                .map(Value::String)
                .unwrap_or(Value::Null))
        })
        .await?;
    Ok(value.as_str().map(str::to_string))
}

impl<H> fmt::Debug for HarnessPredicate<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HarnessPredicate")
            .field("harness", &harness_name::<H>())
            .field(
                "predicates",
                &self.predicates.iter().map(|(d, _)| d).collect::<Vec<_>>(),
            )
            .field("ancestor", &self.ancestor)
            .finish()
    }
}
