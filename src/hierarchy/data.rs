//! Payload access for hierarchy nodes.

use std::borrow::Cow;

use serde_json::Value;

/// Access to the parts of a payload the hierarchy and layout care about.
///
/// Implemented for [`serde_json::Value`], which is what JavaScript hosts hand
/// over. Typed payloads implement it directly.
pub trait NodeData: Sized {
    /// Whether the value can serve as the root of a hierarchy.
    fn is_valid_root(&self) -> bool {
        true
    }

    /// Default children accessor, in input order.
    ///
    /// `None` and an empty slice both mean "leaf".
    fn children(&self) -> Option<&[Self]>;

    /// Explicit identifier, if the payload carries one.
    fn id(&self) -> Option<Cow<'_, str>>;

    /// Display name, if the payload carries one.
    fn name(&self) -> Option<Cow<'_, str>>;
}

impl NodeData for Value {
    fn is_valid_root(&self) -> bool {
        matches!(self, Value::Object(_) | Value::Array(_))
    }

    fn children(&self) -> Option<&[Self]> {
        self.get("children")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
    }

    fn id(&self) -> Option<Cow<'_, str>> {
        self.get("id").and_then(scalar_text)
    }

    fn name(&self) -> Option<Cow<'_, str>> {
        self.get("name").and_then(scalar_text)
    }
}

/// Render a JSON scalar as text. Null, arrays and objects have no text form.
fn scalar_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(b) => Some(Cow::Owned(b.to_string())),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
