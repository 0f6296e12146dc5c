//! TestElement trait definition.

use async_trait::async_trait;

use super::{ClickTarget, ElementDimensions, EventData, KeyInput, ModifierKeys, TextOptions};
use crate::error::ElementError;

/// Minimal element interaction surface a runner backend must implement.
///
/// Every operation is a suspension point; harness code never assumes an
/// operation completes synchronously.
#[async_trait]
pub trait TestElement: Send + Sync {
    /// Blur the element.
    async fn blur(&self) -> Result<(), ElementError>;

    /// Clear the element's value (inputs only).
    async fn clear(&self) -> Result<(), ElementError>;

    /// Click the element.
    async fn click(&self, target: ClickTarget, modifiers: ModifierKeys) -> Result<(), ElementError>;

    /// Right-click the element.
    async fn right_click(
        &self,
        target: ClickTarget,
        modifiers: ModifierKeys,
    ) -> Result<(), ElementError>;

    /// Focus the element.
    async fn focus(&self) -> Result<(), ElementError>;

    /// Computed value of a CSS property.
    async fn css_value(&self, property: &str) -> Result<String, ElementError>;

    /// Hover the mouse over the element.
    async fn hover(&self) -> Result<(), ElementError>;

    /// Move the mouse off the element.
    async fn mouse_away(&self) -> Result<(), ElementError>;

    /// Send keyboard input to the element.
    async fn send_keys(&self, keys: &[KeyInput], modifiers: ModifierKeys)
    -> Result<(), ElementError>;

    /// Visible text content.
    async fn text(&self, options: TextOptions) -> Result<String, ElementError>;

    /// Set the contents of a `contenteditable` element.
    async fn set_contenteditable_value(&self, value: &str) -> Result<(), ElementError> {
        let _ = value;
        Err(ElementError::Unsupported("set_contenteditable_value"))
    }

    /// Value of an attribute, `None` if absent.
    async fn attribute(&self, name: &str) -> Result<Option<String>, ElementError>;

    async fn has_class(&self, name: &str) -> Result<bool, ElementError>;

    async fn dimensions(&self) -> Result<ElementDimensions, ElementError>;

    /// Value of a DOM property.
    async fn property(&self, name: &str) -> Result<serde_json::Value, ElementError>;

    async fn matches_selector(&self, selector: &str) -> Result<bool, ElementError>;

    async fn is_focused(&self) -> Result<bool, ElementError>;

    /// Set an input's value property without key events.
    async fn set_input_value(&self, value: &str) -> Result<(), ElementError>;

    /// Select options of a `select` element by index.
    async fn select_options(&self, indexes: &[usize]) -> Result<(), ElementError>;

    /// Dispatch a synthetic event.
    async fn dispatch_event(&self, name: &str, data: EventData) -> Result<(), ElementError>;
}
