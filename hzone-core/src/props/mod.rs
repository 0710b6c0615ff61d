//! Props
//!
//! Everything a renderer can be told about the element it creates, split into
//! disjoint categories:
//!
//! - **attributes**: stringified values; `true` becomes an empty attribute,
//!   `false` and null detach it
//! - **events**: handlers, optionally with listener options
//! - **members**: direct assignments on the element object
//! - **style**: a CSS string, a declaration map or a computed declaration map
//! - **lifecycle**: an init hook, ordered execute hooks and a clean hook
//!
//! Two input conventions produce the same [`Props`] shape. The qualified
//! convention uses the struct fields directly, with top-level `rest` entries as
//! attribute shorthand (see [`normalize_attr_props`]). The inline convention is
//! a flat [`InlineProps`] map whose keys carry prefixes such as `attr:` and
//! `on:` (see [`inline_props_remapper`]).

mod inline;
mod qualified;

pub use inline::{inline_props_remapper, InlineProps};
pub use qualified::normalize_attr_props;

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::dom::{CssStyleSheet, Element, ElementCallback, Event, EventListener, ListenerOptions};
use crate::error::{HzoneError, Result};
use crate::value::{Accessor, Dynamic, Value};

/// Resolved style declarations, keyed by camelCase or `--custom` names.
pub type StyleMap = IndexMap<String, String>;

/// Parameters handed to a component generator.
pub type ComponentProps = IndexMap<String, PropValue>;

/// A callback run against a created element.
#[derive(Clone)]
pub struct ElementHook(ElementCallback);

impl ElementHook {
    pub fn new<F>(hook: F) -> Self
    where
        F: Fn(&Element) + 'static,
    {
        Self(Rc::new(hook))
    }

    pub fn call(&self, element: &Element) {
        (self.0)(element)
    }

    pub fn callback(&self) -> ElementCallback {
        Rc::clone(&self.0)
    }
}

impl PartialEq for ElementHook {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ElementHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ElementHook").field(&Rc::as_ptr(&self.0)).finish()
    }
}

/// An event handler.
#[derive(Clone)]
pub struct EventHandler(EventListener);

impl EventHandler {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&Event) + 'static,
    {
        Self(Rc::new(handler))
    }

    /// The listener registered with the host. Clones share identity.
    pub fn listener(&self) -> EventListener {
        Rc::clone(&self.0)
    }
}

impl PartialEq for EventHandler {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EventHandler").field(&Rc::as_ptr(&self.0)).finish()
    }
}

/// An event handler with optional listener options.
#[derive(Debug, Clone, PartialEq)]
pub struct EventBinding {
    pub handler: EventHandler,
    pub options: Option<ListenerOptions>,
}

impl From<EventHandler> for EventBinding {
    fn from(handler: EventHandler) -> Self {
        Self {
            handler,
            options: None,
        }
    }
}

/// The style prop.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleValue {
    /// A literal CSS string. Normalization turns it into the `style` attribute.
    Text(Dynamic<String>),
    /// Per-property values, each of which may be live.
    Declarations(IndexMap<String, Dynamic<String>>),
    /// A live accessor producing the whole declaration map.
    Computed(Accessor<StyleMap>),
}

impl StyleValue {
    /// Static declarations from `(key, value)` pairs.
    pub fn declarations<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Dynamic<String>>,
    {
        StyleValue::Declarations(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl From<&str> for StyleValue {
    fn from(text: &str) -> Self {
        StyleValue::Text(text.into())
    }
}

impl From<String> for StyleValue {
    fn from(text: String) -> Self {
        StyleValue::Text(text.into())
    }
}

impl From<StyleMap> for StyleValue {
    fn from(map: StyleMap) -> Self {
        StyleValue::declarations(map)
    }
}

impl From<Accessor<StyleMap>> for StyleValue {
    fn from(accessor: Accessor<StyleMap>) -> Self {
        StyleValue::Computed(accessor)
    }
}

/// Any value a props entry can hold.
#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    Value(Dynamic<Value>),
    Style(StyleValue),
    Event(EventBinding),
    Hook(ElementHook),
    Sheets(Vec<CssStyleSheet>),
}

impl PropValue {
    /// Short name of the variant, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            PropValue::Value(_) => "value",
            PropValue::Style(_) => "style",
            PropValue::Event(_) => "event handler",
            PropValue::Hook(_) => "element hook",
            PropValue::Sheets(_) => "style sheet list",
        }
    }

    pub fn as_value(&self) -> Option<&Dynamic<Value>> {
        match self {
            PropValue::Value(value) => Some(value),
            _ => None,
        }
    }
}

macro_rules! value_prop {
    ($($ty:ty),*) => {
        $(impl From<$ty> for PropValue {
            fn from(value: $ty) -> Self {
                PropValue::Value(value.into())
            }
        })*
    };
}

value_prop!(Value, &str, String, bool, i32, i64, u32, f64, Accessor<Value>);

impl From<Dynamic<Value>> for PropValue {
    fn from(value: Dynamic<Value>) -> Self {
        PropValue::Value(value)
    }
}

impl From<StyleValue> for PropValue {
    fn from(style: StyleValue) -> Self {
        PropValue::Style(style)
    }
}

impl From<EventBinding> for PropValue {
    fn from(binding: EventBinding) -> Self {
        PropValue::Event(binding)
    }
}

impl From<EventHandler> for PropValue {
    fn from(handler: EventHandler) -> Self {
        PropValue::Event(handler.into())
    }
}

impl From<ElementHook> for PropValue {
    fn from(hook: ElementHook) -> Self {
        PropValue::Hook(hook)
    }
}

impl From<Vec<CssStyleSheet>> for PropValue {
    fn from(sheets: Vec<CssStyleSheet>) -> Self {
        PropValue::Sheets(sheets)
    }
}

/// Normalized props.
///
/// `rest` holds entries outside the DOM categories: attribute shorthand
/// before normalization and component parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Props {
    pub attrs: IndexMap<String, Dynamic<Value>>,
    pub events: IndexMap<String, EventBinding>,
    pub members: IndexMap<String, Dynamic<Value>>,
    pub style: Option<StyleValue>,
    /// Hooks run after `init`, in order.
    pub execute: Vec<ElementHook>,
    pub init: Option<ElementHook>,
    pub clean: Option<ElementHook>,
    pub rest: IndexMap<String, PropValue>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when nothing would be applied to an element.
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
            && self.events.is_empty()
            && self.members.is_empty()
            && self.style.is_none()
            && self.execute.is_empty()
            && self.init.is_none()
            && self.clean.is_none()
            && self.rest.is_empty()
    }

    /// Explicit attribute.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<Dynamic<Value>>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn on<F>(mut self, event: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Event) + 'static,
    {
        self.events
            .insert(event.into(), EventHandler::new(handler).into());
        self
    }

    pub fn on_with<F>(mut self, event: impl Into<String>, handler: F, options: ListenerOptions) -> Self
    where
        F: Fn(&Event) + 'static,
    {
        self.events.insert(
            event.into(),
            EventBinding {
                handler: EventHandler::new(handler),
                options: Some(options),
            },
        );
        self
    }

    pub fn member(mut self, key: impl Into<String>, value: impl Into<Dynamic<Value>>) -> Self {
        self.members.insert(key.into(), value.into());
        self
    }

    pub fn style(mut self, style: impl Into<StyleValue>) -> Self {
        self.style = Some(style.into());
        self
    }

    pub fn init<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Element) + 'static,
    {
        self.init = Some(ElementHook::new(hook));
        self
    }

    pub fn execute<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Element) + 'static,
    {
        self.execute.push(ElementHook::new(hook));
        self
    }

    pub fn clean<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Element) + 'static,
    {
        self.clean = Some(ElementHook::new(hook));
        self
    }

    /// Top-level entry: attribute shorthand or a component parameter.
    pub fn prop(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.rest.insert(key.into(), value.into());
        self
    }

    /// Remove a `rest` entry and read it once as text.
    pub fn take_text(&mut self, key: &str) -> Result<Option<String>> {
        match self.rest.shift_remove(key) {
            None => Ok(None),
            Some(PropValue::Value(value)) => Ok(value.get().stringify()),
            Some(_) => Err(HzoneError::PropType {
                key: key.to_owned(),
                expected: "a value",
            }),
        }
    }

    /// Remove a `rest` entry holding a boolean. Absent means `false`.
    pub fn take_flag(&mut self, key: &str) -> Result<bool> {
        match self.rest.shift_remove(key) {
            None => Ok(false),
            Some(PropValue::Value(value)) => match value.get() {
                Value::Bool(flag) => Ok(flag),
                Value::Null => Ok(false),
                _ => Err(HzoneError::PropType {
                    key: key.to_owned(),
                    expected: "a boolean",
                }),
            },
            Some(_) => Err(HzoneError::PropType {
                key: key.to_owned(),
                expected: "a boolean",
            }),
        }
    }

    pub fn take_sheets(&mut self, key: &str) -> Result<Vec<CssStyleSheet>> {
        match self.rest.shift_remove(key) {
            None => Ok(Vec::new()),
            Some(PropValue::Sheets(sheets)) => Ok(sheets),
            Some(_) => Err(HzoneError::PropType {
                key: key.to_owned(),
                expected: "a list of style sheets",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_fills_categories() {
        let props = Props::new()
            .attr("id", "x")
            .member("value", "typed")
            .on("click", |_: &Event| {})
            .style("color: red")
            .prop("width", 50);

        assert_eq!(props.attrs["id"], Dynamic::Static(Value::from("x")));
        assert_eq!(props.members["value"], Dynamic::Static(Value::from("typed")));
        assert!(props.events.contains_key("click"));
        assert!(matches!(props.style, Some(StyleValue::Text(_))));
        assert_eq!(props.rest["width"].as_value(), Some(&Dynamic::Static(Value::Int(50))));
        assert!(!props.is_empty());
        assert!(Props::new().is_empty());
    }

    #[test]
    fn hooks_compare_by_identity() {
        let hook = ElementHook::new(|_| {});
        assert_eq!(hook, hook.clone());
        assert_ne!(hook, ElementHook::new(|_| {}));
    }

    #[test]
    fn kind_names() {
        assert_eq!(PropValue::from(1).kind_name(), "value");
        assert_eq!(PropValue::from(StyleValue::from("a: b")).kind_name(), "style");
        assert_eq!(PropValue::from(Vec::<CssStyleSheet>::new()).kind_name(), "style sheet list");
    }

    #[test]
    fn take_removes_rest_entries() {
        let mut props = Props::new()
            .prop("id", "x-card")
            .prop("shallow", true)
            .prop("label", 3);

        assert_eq!(props.take_text("id").unwrap().as_deref(), Some("x-card"));
        assert!(props.take_flag("shallow").unwrap());
        assert!(!props.take_flag("global").unwrap());
        assert!(props.take_sheets("sheets").unwrap().is_empty());
        assert!(matches!(props.take_flag("label"), Err(HzoneError::PropType { .. })));
        assert!(props.rest.is_empty());
    }
}
