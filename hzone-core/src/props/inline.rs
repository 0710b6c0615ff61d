//! Inline-prefix props.
//!
//! | key | category |
//! |---|---|
//! | `attr:<name>` | attribute |
//! | `on:<name>` | event |
//! | `set:<name>` | member |
//! | `exec:$<index>` | execute hook, ordered by index |
//! | `style` | style (a string becomes the `style` attribute) |
//! | `init`, `clean` | lifecycle hooks |
//!
//! Every other key is passed through to the component untouched.

use std::collections::BTreeMap;

use indexmap::IndexMap;

use super::{ElementHook, EventBinding, PropValue, Props, StyleValue};
use crate::error::{HzoneError, Result};
use crate::value::{Dynamic, Value};

/// A flat props map using key prefixes instead of separate fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InlineProps(IndexMap<String, PropValue>);

impl InlineProps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<PropValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> IndexMap<String, PropValue> {
        self.0
    }
}

impl From<IndexMap<String, PropValue>> for InlineProps {
    fn from(map: IndexMap<String, PropValue>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<PropValue>> FromIterator<(K, V)> for InlineProps {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// Route prefixed keys into their categories.
///
/// A reserved key holding the wrong kind of value is an error, as is an
/// `exec:` key without a `$<index>` suffix.
pub fn inline_props_remapper(props: Option<InlineProps>) -> Result<Props> {
    let mut out = Props::default();
    let Some(InlineProps(entries)) = props else {
        return Ok(out);
    };

    let mut execute = BTreeMap::new();
    let mut style_attr = None;

    for (key, value) in entries {
        if let Some(name) = key.strip_prefix("attr:") {
            let value = expect_value(&key, value)?;
            out.attrs.insert(name.to_owned(), value);
        } else if let Some(name) = key.strip_prefix("on:") {
            let binding = expect_event(&key, value)?;
            out.events.insert(name.to_owned(), binding);
        } else if let Some(name) = key.strip_prefix("set:") {
            let value = expect_value(&key, value)?;
            out.members.insert(name.to_owned(), value);
        } else if let Some(suffix) = key.strip_prefix("exec:") {
            let index = suffix
                .strip_prefix('$')
                .and_then(|digits| digits.parse::<usize>().ok())
                .ok_or_else(|| HzoneError::ExecuteIndex(key.clone()))?;
            // Later duplicates of an index overwrite earlier ones
            execute.insert(index, expect_hook(&key, value)?);
        } else {
            match key.as_str() {
                "style" => match value {
                    PropValue::Style(StyleValue::Text(text)) => {
                        style_attr = Some(text.map(Value::Str));
                    }
                    PropValue::Style(style) => out.style = Some(style),
                    PropValue::Value(text) => style_attr = Some(text),
                    other => return Err(prop_type(&key, "a style value or string", &other)),
                },
                "init" => out.init = Some(expect_hook(&key, value)?),
                "clean" => out.clean = Some(expect_hook(&key, value)?),
                _ => {
                    out.rest.insert(key, value);
                }
            }
        }
    }

    if let Some(style) = style_attr {
        out.attrs.entry("style".to_owned()).or_insert(style);
    }
    out.execute = execute.into_values().collect();
    Ok(out)
}

fn prop_type(key: &str, expected: &'static str, found: &PropValue) -> HzoneError {
    tracing::debug!(key, found = found.kind_name(), expected, "wrong prop kind");
    HzoneError::PropType {
        key: key.to_owned(),
        expected,
    }
}

fn expect_value(key: &str, value: PropValue) -> Result<Dynamic<Value>> {
    match value {
        PropValue::Value(value) => Ok(value),
        other => Err(prop_type(key, "a value", &other)),
    }
}

fn expect_event(key: &str, value: PropValue) -> Result<EventBinding> {
    match value {
        PropValue::Event(binding) => Ok(binding),
        other => Err(prop_type(key, "an event handler", &other)),
    }
}

fn expect_hook(key: &str, value: PropValue) -> Result<ElementHook> {
    match value {
        PropValue::Hook(hook) => Ok(hook),
        other => Err(prop_type(key, "an element hook", &other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Element, ListenerOptions};
    use crate::props::EventHandler;

    #[test]
    fn prefixes_route_to_categories() {
        let handler = EventHandler::new(|_| {});
        let props = inline_props_remapper(Some(
            InlineProps::new()
                .with("attr:id", "a")
                .with("on:click", handler.clone())
                .with("set:value", "typed")
                .with("label", "component param"),
        ))
        .unwrap();

        assert_eq!(props.attrs["id"], Dynamic::Static(Value::from("a")));
        assert_eq!(props.events["click"].handler, handler);
        assert_eq!(props.members["value"], Dynamic::Static(Value::from("typed")));
        assert_eq!(props.rest.len(), 1);
        assert!(props.rest.contains_key("label"));
    }

    #[test]
    fn event_options_survive() {
        let binding = EventBinding {
            handler: EventHandler::new(|_| {}),
            options: Some(ListenerOptions { once: true, ..Default::default() }),
        };
        let props =
            inline_props_remapper(Some(InlineProps::new().with("on:click", binding.clone())))
                .unwrap();

        assert_eq!(props.events["click"], binding);
    }

    #[test]
    fn execute_hooks_follow_index_order() {
        let first = ElementHook::new(|_: &Element| {});
        let second = ElementHook::new(|_: &Element| {});
        let replaced = ElementHook::new(|_: &Element| {});

        let props = inline_props_remapper(Some(
            InlineProps::new()
                .with("exec:$7", second.clone())
                .with("exec:$2", replaced)
                .with("exec:$02", first.clone()),
        ))
        .unwrap();

        assert_eq!(props.execute, vec![first, second]);
    }

    #[test]
    fn bad_execute_keys_fail() {
        let hook = ElementHook::new(|_| {});
        for key in ["exec:x", "exec:$", "exec:$-1"] {
            let err = inline_props_remapper(Some(InlineProps::new().with(key, hook.clone())))
                .unwrap_err();
            assert!(matches!(err, HzoneError::ExecuteIndex(ref k) if k == key));
        }
    }

    #[test]
    fn string_style_becomes_attribute() {
        let props =
            inline_props_remapper(Some(InlineProps::new().with("style", "color: red;"))).unwrap();
        assert_eq!(props.style, None);
        assert_eq!(props.attrs["style"], Dynamic::Static(Value::from("color: red;")));

        // An explicit attribute wins, wherever it appears
        let props = inline_props_remapper(Some(
            InlineProps::new()
                .with("style", StyleValue::from("color: red;"))
                .with("attr:style", "color: green;"),
        ))
        .unwrap();
        assert_eq!(props.attrs["style"], Dynamic::Static(Value::from("color: green;")));
    }

    #[test]
    fn declaration_style_is_kept() {
        let style = StyleValue::declarations([("--x", "red"), ("color", "var(--x)")]);
        let props =
            inline_props_remapper(Some(InlineProps::new().with("style", style.clone()))).unwrap();

        assert_eq!(props.style, Some(style));
        assert!(props.attrs.is_empty());
    }

    #[test]
    fn wrong_kinds_are_rejected() {
        let err = inline_props_remapper(Some(InlineProps::new().with("on:click", "nope")))
            .unwrap_err();
        assert!(matches!(
            err,
            HzoneError::PropType { ref key, expected: "an event handler" } if key == "on:click"
        ));

        let err =
            inline_props_remapper(Some(InlineProps::new().with("init", 5))).unwrap_err();
        assert!(matches!(err, HzoneError::PropType { .. }));
    }

    #[test]
    fn both_conventions_agree() {
        use crate::props::normalize_attr_props;

        let init = ElementHook::new(|_| {});
        let handler = EventHandler::new(|_| {});

        let inline = inline_props_remapper(Some(
            InlineProps::new()
                .with("attr:id", "x")
                .with("on:click", handler.clone())
                .with("init", init.clone()),
        ))
        .unwrap();

        let mut qualified = Props::new().prop("id", "x");
        qualified.events.insert("click".into(), handler.into());
        qualified.init = Some(init);

        assert_eq!(inline, normalize_attr_props(Some(qualified)));
    }
}
