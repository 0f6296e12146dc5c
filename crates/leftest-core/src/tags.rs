//! Tags, tag interning and tag-filter algebra.
//!
//! Tags are interned by a [`TagRegistry`] so every lookup of a name yields
//! the same shared [`Tag`]. Annotating an authoring call works through an
//! explicit pending queue: tags activated right before a call are consumed
//! by that call, and only by that call.

use parking_lot::Mutex;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use leftest_protocols::error::TagError;

#[cfg(test)]
#[path = "tags_tests.rs"]
mod tests;

/// A named marker attachable to features, scenarios and example sets.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag {
    name: Arc<str>,
}

impl Tag {
    fn new(name: &str) -> Self {
        Self {
            name: Arc::from(name),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether both tags are the same interned object.
    pub fn ptr_eq(&self, other: &Tag) -> bool {
        Arc::ptr_eq(&self.name, &other.name)
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({})", self.name)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Boolean predicate over the set of tags active on a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagFilter {
    Tag(Tag),
    Not(Box<TagFilter>),
    And(Box<TagFilter>, Box<TagFilter>),
    Or(Box<TagFilter>, Box<TagFilter>),
}

impl TagFilter {
    /// Matches nodes carrying `tag`.
    pub fn eq(tag: impl Into<TagFilter>) -> Self {
        tag.into()
    }

    pub fn not(filter: impl Into<TagFilter>) -> Self {
        TagFilter::Not(Box::new(filter.into()))
    }

    pub fn and(a: impl Into<TagFilter>, b: impl Into<TagFilter>) -> Self {
        TagFilter::And(Box::new(a.into()), Box::new(b.into()))
    }

    pub fn or(a: impl Into<TagFilter>, b: impl Into<TagFilter>) -> Self {
        TagFilter::Or(Box::new(a.into()), Box::new(b.into()))
    }

    /// Conjunction of all filters, `None` when empty.
    pub fn all_of<I>(filters: I) -> Option<Self>
    where
        I: IntoIterator,
        I::Item: Into<TagFilter>,
    {
        filters
            .into_iter()
            .map(Into::into)
            .reduce(|acc, f| TagFilter::and(acc, f))
    }

    /// Disjunction of all filters, `None` when empty.
    pub fn any_of<I>(filters: I) -> Option<Self>
    where
        I: IntoIterator,
        I::Item: Into<TagFilter>,
    {
        filters
            .into_iter()
            .map(Into::into)
            .reduce(|acc, f| TagFilter::or(acc, f))
    }

    /// Evaluate against the active tag names.
    pub fn matches(&self, active: &BTreeSet<String>) -> bool {
        match self {
            TagFilter::Tag(tag) => active.contains(tag.name()),
            TagFilter::Not(inner) => !inner.matches(active),
            TagFilter::And(a, b) => a.matches(active) && b.matches(active),
            TagFilter::Or(a, b) => a.matches(active) || b.matches(active),
        }
    }
}

impl From<Tag> for TagFilter {
    fn from(tag: Tag) -> Self {
        TagFilter::Tag(tag)
    }
}

impl From<&Tag> for TagFilter {
    fn from(tag: &Tag) -> Self {
        TagFilter::Tag(tag.clone())
    }
}

impl fmt::Display for TagFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagFilter::Tag(tag) => write!(f, "{}", tag),
            TagFilter::Not(inner) => write!(f, "!{}", inner),
            TagFilter::And(a, b) => write!(f, "({} && {})", a, b),
            TagFilter::Or(a, b) => write!(f, "({} || {})", a, b),
        }
    }
}

/// Interning registry for tags plus the pending-annotation queue.
#[derive(Default)]
pub struct TagRegistry {
    interned: Mutex<HashMap<String, Tag>>,
    pending: Mutex<Vec<Tag>>,
}

impl TagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interned tag for `name`. Does not activate it.
    pub fn tag(&self, name: &str) -> Tag {
        let mut interned = self.interned.lock();
        interned
            .entry(name.to_string())
            .or_insert_with(|| Tag::new(name))
            .clone()
    }

    /// Queue `name` for the next tag-accepting authoring call.
    pub fn activate(&self, name: &str) -> Tag {
        let tag = self.tag(name);
        self.pending.lock().push(tag.clone());
        tag
    }

    /// Consume the pending queue.
    pub fn take_pending(&self) -> Vec<Tag> {
        std::mem::take(&mut *self.pending.lock())
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.lock().is_empty()
    }

    /// Fail if tags are pending, flushing the queue.
    pub fn ensure_none_pending(&self, call: &str) -> Result<(), TagError> {
        let pending = self.take_pending();
        if pending.is_empty() {
            return Ok(());
        }
        Err(TagError::Unexpected {
            call: call.to_string(),
            tags: pending.iter().map(|t| t.name().to_string()).collect(),
        })
    }

    /// Number of distinct tags seen so far.
    pub fn len(&self) -> usize {
        self.interned.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.interned.lock().is_empty()
    }
}

/// Union of tag names from any number of sources.
pub fn tag_names<'a, I>(tags: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a Tag>,
{
    tags.into_iter().map(|t| t.name().to_string()).collect()
}
