//! Component harness traits.

use async_trait::async_trait;
use std::ops::Deref;
use std::sync::Arc;

use leftest_protocols::{LocatorError, TestElement};

use crate::locator::LocatorFactory;
use crate::predicate::HarnessPredicate;

/// Typed wrapper around a component's host element.
///
/// A harness is created by the environment for every element matching
/// [`HOST_SELECTOR`](Self::HOST_SELECTOR) and only ever reaches the DOM
/// through its locator factory.
pub trait ComponentHarness: Send + Sync + Sized + 'static {
    /// Selector identifying host elements of this component.
    const HOST_SELECTOR: &'static str;

    fn from_locator(locator: LocatorFactory) -> Self;

    /// Locator factory rooted at the host element.
    fn locator(&self) -> &LocatorFactory;

    fn host(&self) -> Arc<dyn TestElement> {
        self.locator().root_element()
    }

    /// Predicate matching every instance of this harness.
    fn with() -> HarnessPredicate<Self> {
        HarnessPredicate::new()
    }
}

/// Shared state for harness implementations.
///
/// Derefs to the host's [`LocatorFactory`].
#[derive(Clone)]
pub struct HarnessBase {
    locator: LocatorFactory,
}

impl HarnessBase {
    pub fn new(locator: LocatorFactory) -> Self {
        Self { locator }
    }

    pub fn locator(&self) -> &LocatorFactory {
        &self.locator
    }

    pub fn host(&self) -> Arc<dyn TestElement> {
        self.locator.root_element()
    }
}

impl Deref for HarnessBase {
    type Target = LocatorFactory;

    fn deref(&self) -> &LocatorFactory {
        &self.locator
    }
}

/// Harness of a component that hosts arbitrary projected content.
#[async_trait]
pub trait ContentContainerHarness: ComponentHarness {
    /// Loader rooted where the content lives. Defaults to the host.
    async fn root_harness_loader(&self) -> Result<LocatorFactory, LocatorError> {
        Ok(self.locator().clone())
    }

    async fn get_child_loader(&self, selector: &str) -> Result<LocatorFactory, LocatorError> {
        self.root_harness_loader()
            .await?
            .get_child_loader(selector)
            .await
    }

    async fn get_all_child_loaders(&self, selector: &str) -> Result<Vec<LocatorFactory>, LocatorError> {
        self.root_harness_loader()
            .await?
            .get_all_child_loaders(selector)
            .await
    }

    async fn get_harness<H: ComponentHarness>(
        &self,
        predicate: HarnessPredicate<H>,
    ) -> Result<Arc<H>, LocatorError> {
        self.root_harness_loader().await?.get_harness(predicate).await
    }

    async fn get_harness_or_null<H: ComponentHarness>(
        &self,
        predicate: HarnessPredicate<H>,
    ) -> Result<Option<Arc<H>>, LocatorError> {
        self.root_harness_loader()
            .await?
            .get_harness_or_null(predicate)
            .await
    }

    async fn get_all_harnesses<H: ComponentHarness>(
        &self,
        predicate: HarnessPredicate<H>,
    ) -> Result<Vec<Arc<H>>, LocatorError> {
        self.root_harness_loader()
            .await?
            .get_all_harnesses(predicate)
            .await
    }

    async fn has_harness<H: ComponentHarness>(
        &self,
        predicate: HarnessPredicate<H>,
    ) -> Result<bool, LocatorError> {
        self.root_harness_loader().await?.has_harness(predicate).await
    }
}
