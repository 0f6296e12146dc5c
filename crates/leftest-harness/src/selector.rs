//! Selector DSL and comma-aware selector handling.

use once_cell::sync::Lazy;
use parking_lot::RwLock;

pub const DEFAULT_TEST_ID_ATTRIBUTE: &str = "data-testid";
pub const DEFAULT_COMPONENT_ATTRIBUTE: &str = "data-component-name";

struct Attributes {
    test_id: String,
    component: String,
}

static ATTRIBUTES: Lazy<RwLock<Attributes>> = Lazy::new(|| {
    RwLock::new(Attributes {
        test_id: DEFAULT_TEST_ID_ATTRIBUTE.to_string(),
        component: DEFAULT_COMPONENT_ATTRIBUTE.to_string(),
    })
});

/// Attribute used by [`with_test_id`].
pub fn set_test_id_attribute(name: impl Into<String>) {
    ATTRIBUTES.write().test_id = name.into();
}

/// Attribute used by [`with_component`].
pub fn set_component_attribute(name: impl Into<String>) {
    ATTRIBUTES.write().component = name.into();
}

pub fn test_id_attribute() -> String {
    ATTRIBUTES.read().test_id.clone()
}

pub fn component_attribute() -> String {
    ATTRIBUTES.read().component.clone()
}

/// Escape a value for use inside a double-quoted attribute selector.
pub fn escape_attribute_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// `[name="value"]`
pub fn attribute_selector(name: &str, value: &str) -> String {
    format!("[{}=\"{}\"]", name, escape_attribute_value(value))
}

pub fn with_role(role: &str) -> String {
    attribute_selector("role", role)
}

pub fn with_test_id(id: &str) -> String {
    attribute_selector(&test_id_attribute(), id)
}

pub fn with_component(name: &str) -> String {
    attribute_selector(&component_attribute(), name)
}

/// Split a selector list on top-level commas.
///
/// Commas inside quoted strings, attribute brackets or parentheses do not
/// split. Branches are trimmed and empty branches dropped.
pub fn split_selector(selector: &str) -> Vec<String> {
    let mut branches = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut depth = 0usize;
    let mut escaped = false;

    for c in selector.chars() {
        if escaped {
            current.push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' => {
                escaped = true;
                current.push(c);
            }
            '"' | '\'' if quote == Some(c) => {
                quote = None;
                current.push(c);
            }
            '"' | '\'' if quote.is_none() => {
                quote = Some(c);
                current.push(c);
            }
            '[' | '(' if quote.is_none() => {
                depth += 1;
                current.push(c);
            }
            ']' | ')' if quote.is_none() => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if quote.is_none() && depth == 0 => {
                branches.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    branches.push(current);

    branches
        .into_iter()
        .map(|b| b.trim().to_string())
        .filter(|b| !b.is_empty())
        .collect()
}

/// Prefix every branch of `selector` with `ancestor`.
pub fn scope_selector(ancestor: &str, selector: &str) -> String {
    let ancestor = ancestor.trim();
    if ancestor.is_empty() {
        return selector.trim().to_string();
    }
    let branches = split_selector(selector);
    if branches.is_empty() {
        return ancestor.to_string();
    }
    branches
        .iter()
        .map(|b| format!("{} {}", ancestor, b))
        .collect::<Vec<_>>()
        .join(", ")
}
