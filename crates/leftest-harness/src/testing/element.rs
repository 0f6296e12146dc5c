//! [`TestElement`] over a [`MemoryDom`] node.

use async_trait::async_trait;
use serde_json::{json, Value};

use leftest_protocols::{
    ClickTarget, ElementDimensions, ElementError, EventData, KeyInput, ModifierKeys, TestElement,
    TextOptions,
};

use super::css::parse_list;
use super::dom::{MemoryDom, NodeId};

/// Element handle backed by the simulated DOM.
#[derive(Clone)]
pub struct MemoryElement {
    dom: MemoryDom,
    node: NodeId,
}

impl MemoryElement {
    pub fn new(dom: MemoryDom, node: NodeId) -> Self {
        Self { dom, node }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    fn node_index(&self) -> usize {
        self.node.index()
    }

    fn record(&self, kind: &str, detail: Option<Value>) -> Result<(), ElementError> {
        self.dom.read(self.node, |_, _| ())?;
        self.dom.record(self.node, kind, detail);
        Ok(())
    }

    fn value(&self) -> Result<String, ElementError> {
        self.dom.read(self.node, |n, _| {
            n.properties
                .get("value")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        })
    }

    fn set_property(&self, name: &str, value: Value) -> Result<(), ElementError> {
        self.dom.write(self.node, |state, n| {
            state.nodes[n].properties.insert(name.to_string(), value);
        })
    }
}

fn click_detail(target: ClickTarget, modifiers: ModifierKeys) -> Option<Value> {
    let mut detail = serde_json::Map::new();
    if let ClickTarget::Point { x, y } = target {
        detail.insert("x".into(), json!(x));
        detail.insert("y".into(), json!(y));
    }
    if !modifiers.is_empty() {
        detail.insert("modifiers".into(), json!(modifiers));
    }
    (!detail.is_empty()).then_some(Value::Object(detail))
}

#[async_trait]
impl TestElement for MemoryElement {
    async fn blur(&self) -> Result<(), ElementError> {
        self.dom.write(self.node, |state, n| {
            if state.focused == Some(n) {
                state.focused = None;
            }
        })?;
        self.record("blur", None)
    }

    async fn clear(&self) -> Result<(), ElementError> {
        self.set_property("value", json!(""))?;
        self.record("input", None)
    }

    async fn click(&self, target: ClickTarget, modifiers: ModifierKeys) -> Result<(), ElementError> {
        self.record("click", click_detail(target, modifiers))
    }

    async fn right_click(&self, target: ClickTarget, modifiers: ModifierKeys) -> Result<(), ElementError> {
        self.record("contextmenu", click_detail(target, modifiers))
    }

    async fn focus(&self) -> Result<(), ElementError> {
        self.dom.write(self.node, |state, n| state.focused = Some(n))?;
        self.record("focus", None)
    }

    async fn css_value(&self, property: &str) -> Result<String, ElementError> {
        self.dom.read(self.node, |n, _| {
            n.attributes
                .get("style")
                .and_then(|style| {
                    style.split(';').find_map(|decl| {
                        let (name, value) = decl.split_once(':')?;
                        (name.trim() == property).then(|| value.trim().to_string())
                    })
                })
                .unwrap_or_default()
        })
    }

    async fn hover(&self) -> Result<(), ElementError> {
        self.record("mouseenter", None)
    }

    async fn mouse_away(&self) -> Result<(), ElementError> {
        self.record("mouseleave", None)
    }

    async fn send_keys(&self, keys: &[KeyInput], modifiers: ModifierKeys) -> Result<(), ElementError> {
        let mut value = self.value()?;
        for key in keys {
            match key {
                KeyInput::Text(text) => value.push_str(text),
                KeyInput::Key(key) => self.record("keydown", Some(json!(key)))?,
            }
        }
        self.set_property("value", json!(value))?;
        let detail = (!modifiers.is_empty()).then(|| json!({ "modifiers": modifiers }));
        self.record("input", detail)
    }

    async fn text(&self, options: TextOptions) -> Result<String, ElementError> {
        let exclude = match options.exclude.as_deref() {
            Some(selector) => Some(parse_list(selector).map_err(ElementError::Backend)?),
            None => None,
        };
        self.dom.read(self.node, |_, state| {
            MemoryDom::text_content(state, self.node_index(), exclude.as_deref())
                .trim()
                .to_string()
        })
    }

    async fn set_contenteditable_value(&self, value: &str) -> Result<(), ElementError> {
        let editable = self
            .dom
            .read(self.node, |n, _| n.attributes.contains_key("contenteditable"))?;
        if !editable {
            return Err(ElementError::Interaction(
                "element is not contenteditable".to_string(),
            ));
        }
        self.dom.set_text(self.node, value);
        Ok(())
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>, ElementError> {
        self.dom.read(self.node, |n, _| n.attributes.get(name).cloned())
    }

    async fn has_class(&self, name: &str) -> Result<bool, ElementError> {
        self.dom.read(self.node, |n, _| {
            n.attributes
                .get("class")
                .is_some_and(|c| c.split_whitespace().any(|c| c == name))
        })
    }

    async fn dimensions(&self) -> Result<ElementDimensions, ElementError> {
        let value = self.property("dimensions").await?;
        if value.is_null() {
            return Ok(ElementDimensions::default());
        }
        serde_json::from_value(value).map_err(|e| ElementError::Backend(e.to_string()))
    }

    async fn property(&self, name: &str) -> Result<Value, ElementError> {
        self.dom.read(self.node, |n, _| {
            n.properties.get(name).cloned().unwrap_or(Value::Null)
        })
    }

    async fn matches_selector(&self, selector: &str) -> Result<bool, ElementError> {
        self.dom.read(self.node, |_, _| ())?;
        self.dom.matches(self.node, selector).map_err(ElementError::Backend)
    }

    async fn is_focused(&self) -> Result<bool, ElementError> {
        let index = self.node_index();
        self.dom.read(self.node, |_, state| state.focused == Some(index))
    }

    async fn set_input_value(&self, value: &str) -> Result<(), ElementError> {
        self.set_property("value", json!(value))
    }

    async fn select_options(&self, indexes: &[usize]) -> Result<(), ElementError> {
        let tag = self.dom.read(self.node, |n, _| n.tag.clone())?;
        if tag != "select" {
            return Err(ElementError::Interaction(format!(
                "cannot select options on <{}>",
                tag
            )));
        }
        self.set_property("selectedIndexes", json!(indexes))?;
        self.record("change", None)
    }

    async fn dispatch_event(&self, name: &str, data: EventData) -> Result<(), ElementError> {
        let detail = (!data.is_empty()).then(|| json!(data));
        self.record(name, detail)
    }
}
