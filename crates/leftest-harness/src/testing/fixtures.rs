//! Harnesses shared by the crate's tests.

use leftest_protocols::{ClickTarget, LocatorError, ModifierKeys, TextOptions};

use crate::harness::{ComponentHarness, ContentContainerHarness, HarnessBase};
use crate::locator::LocatorFactory;

pub(crate) struct ButtonHarness {
    base: HarnessBase,
}

impl ComponentHarness for ButtonHarness {
    const HOST_SELECTOR: &'static str = "button, [role=\"button\"]";

    fn from_locator(locator: LocatorFactory) -> Self {
        Self {
            base: HarnessBase::new(locator),
        }
    }

    fn locator(&self) -> &LocatorFactory {
        self.base.locator()
    }
}

impl ButtonHarness {
    pub async fn text(&self) -> Result<String, LocatorError> {
        Ok(self.host().text(TextOptions::default()).await?)
    }

    pub async fn click(&self) -> Result<(), LocatorError> {
        Ok(self
            .host()
            .click(ClickTarget::Default, ModifierKeys::none())
            .await?)
    }
}

pub(crate) struct ItemHarness {
    base: HarnessBase,
}

impl ComponentHarness for ItemHarness {
    const HOST_SELECTOR: &'static str = ".item";

    fn from_locator(locator: LocatorFactory) -> Self {
        Self {
            base: HarnessBase::new(locator),
        }
    }

    fn locator(&self) -> &LocatorFactory {
        self.base.locator()
    }
}

impl ItemHarness {
    pub async fn id(&self) -> Result<Option<String>, LocatorError> {
        Ok(self.host().attribute("id").await?)
    }
}

pub(crate) struct DialogHarness {
    base: HarnessBase,
}

impl ComponentHarness for DialogHarness {
    const HOST_SELECTOR: &'static str = "[role=\"dialog\"]";

    fn from_locator(locator: LocatorFactory) -> Self {
        Self {
            base: HarnessBase::new(locator),
        }
    }

    fn locator(&self) -> &LocatorFactory {
        self.base.locator()
    }
}

impl ContentContainerHarness for DialogHarness {}
