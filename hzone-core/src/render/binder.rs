//! Binders and the shared element construction pipeline.

use super::{Output, RenderChild};
use crate::dom::{Attr, Document, Element, Node};
use crate::error::{HzoneError, Result};
use crate::props::{ElementHook, EventBinding, Props, StyleMap, StyleValue};
use crate::style::DynamicStylable;
use crate::value::{Dynamic, Value};
use crate::zone::HyperZone;

/// How prop values and children get onto an element.
///
/// Renderers are generic over their binder, so the same `HtmlRender` builds
/// static elements with [`VanillaBinder`] and live ones with
/// [`ReactiveBinder`](super::ReactiveBinder).
pub trait Binder {
    /// Build the binder from the collaborators a zone holds.
    fn from_zone(zone: &HyperZone) -> Self
    where
        Self: Sized;

    /// Set an attribute and return its node. A value that stringifies to
    /// nothing leaves the node detached.
    fn add_attr(&self, element: &Element, name: &str, value: &Dynamic<Value>) -> Result<Attr>;

    fn add_event(&self, element: &Element, name: &str, binding: &EventBinding) {
        element.add_event_listener(
            name,
            binding.handler.listener(),
            binding.options.unwrap_or_default(),
        );
    }

    fn set_member(&self, element: &Element, key: &str, value: &Dynamic<Value>);

    fn set_style(&self, element: &Element, style: &StyleValue) -> Result<DynamicStylable>;

    fn run_on_init(&self, element: &Element, hook: &ElementHook) {
        hook.call(element);
    }

    /// Turn a child into a node. Style rules are rejected.
    fn process_child(&self, document: &Document, child: RenderChild) -> Result<Node>;

    /// Called with the processed children just before they are appended to
    /// `element`.
    fn adopt_children(&self, _element: &Element, _children: &[Node]) {}
}

/// Set `name` to `value`, detaching the attribute node when the value is
/// false or null. The returned node keeps its identity either way.
pub fn apply_attr(element: &Element, name: &str, value: &Value) -> Result<Attr> {
    let text = value.to_attr_string();
    element.set_attribute(name, text.as_deref().unwrap_or_default())?;
    let attr = element
        .get_attribute_node(name)
        .ok_or(crate::dom::DomError::NotFound)?;
    if text.is_none() {
        element.remove_attribute_node(&attr)?;
        attr.set_value(None);
    }
    Ok(attr)
}

/// Applies every value once. Live values are read a single time.
#[derive(Debug, Clone, Copy, Default)]
pub struct VanillaBinder;

impl Binder for VanillaBinder {
    fn from_zone(_zone: &HyperZone) -> Self {
        VanillaBinder
    }

    fn add_attr(&self, element: &Element, name: &str, value: &Dynamic<Value>) -> Result<Attr> {
        apply_attr(element, name, &value.get())
    }

    fn set_member(&self, element: &Element, key: &str, value: &Dynamic<Value>) {
        element.set_member(key, value.get());
    }

    fn set_style(&self, element: &Element, style: &StyleValue) -> Result<DynamicStylable> {
        let stylable = DynamicStylable::new(element.clone());
        match style {
            StyleValue::Text(text) => {
                apply_attr(element, "style", &Value::Str(text.get()))?;
            }
            StyleValue::Declarations(declarations) => {
                let resolved: StyleMap = declarations
                    .iter()
                    .map(|(key, value)| (key.clone(), value.get()))
                    .collect();
                stylable.set_style(&resolved);
            }
            StyleValue::Computed(accessor) => stylable.set_style(&accessor.get()),
        }
        Ok(stylable)
    }

    fn process_child(&self, document: &Document, child: RenderChild) -> Result<Node> {
        match child {
            RenderChild::Dynamic(accessor) => Ok(document
                .create_text_node(&accessor.get().stringify().unwrap_or_default())),
            other => static_child(document, other),
        }
    }
}

/// Children that need no binding. Dynamic text is read once.
pub(crate) fn static_child(document: &Document, child: RenderChild) -> Result<Node> {
    match child {
        RenderChild::Node(node) => Ok(node),
        RenderChild::Text(text) => Ok(document.create_text_node(&text)),
        RenderChild::Dynamic(accessor) => {
            Ok(document.create_text_node(&accessor.get().stringify().unwrap_or_default()))
        }
        RenderChild::Rule(_) => Err(HzoneError::UnexpectedChild {
            found: "style rule",
            renderer: "element renderer",
        }),
    }
}

pub(crate) fn process_children<B: Binder>(
    binder: &B,
    document: &Document,
    children: Vec<RenderChild>,
) -> Result<Vec<Node>> {
    children
        .into_iter()
        .map(|child| binder.process_child(document, child))
        .collect()
}

fn has_bindings(props: &Props) -> bool {
    !(props.attrs.is_empty()
        && props.events.is_empty()
        && props.members.is_empty()
        && props.style.is_none()
        && props.execute.is_empty()
        && props.init.is_none()
        && props.clean.is_none())
}

/// Bind props to `element` in order: attributes, events, members, style, the
/// init hook, the execute hooks, then the clean hook registration.
pub(crate) fn bind_props<B: Binder>(binder: &B, element: &Element, props: &Props) -> Result<()> {
    for (name, value) in &props.attrs {
        binder.add_attr(element, name, value)?;
    }
    for (name, binding) in &props.events {
        binder.add_event(element, name, binding);
    }
    for (key, value) in &props.members {
        binder.set_member(element, key, value);
    }
    if let Some(style) = &props.style {
        binder.set_style(element, style)?;
    }
    if let Some(init) = &props.init {
        binder.run_on_init(element, init);
    }
    for hook in &props.execute {
        hook.call(element);
    }
    if let Some(clean) = &props.clean {
        element.add_clean_hook(clean.callback());
    }
    Ok(())
}

/// Finish a generated output: bind props to it and append `children`.
///
/// A fragment output takes the children as extra nodes and cannot carry
/// bindings. A non-element node accepts children but no bindings.
pub(crate) fn compose<B: Binder>(
    binder: &B,
    output: Output,
    props: &Props,
    children: Vec<Node>,
) -> Result<Output> {
    match output {
        Output::Fragment(mut nodes) => {
            if has_bindings(props) {
                tracing::warn!("a fragment output has no element to bind props to, ignoring them");
            }
            nodes.extend(children);
            Ok(Output::Fragment(nodes))
        }
        Output::Node(node) => {
            match node.as_element() {
                Some(element) => {
                    bind_props(binder, &element, props)?;
                    binder.adopt_children(&element, &children);
                }
                None if has_bindings(props) => {
                    return Err(HzoneError::ComponentOutput("non-element node"));
                }
                None => {}
            }
            for child in &children {
                node.append(child)?;
            }
            Ok(Output::Node(node))
        }
        other => Err(HzoneError::ComponentOutput(other.kind_name())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Event;
    use crate::value::Accessor;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn falsy_attributes_stay_detached() {
        let element = Document::new().create_element("input").unwrap();

        let disabled = apply_attr(&element, "disabled", &Value::Bool(false)).unwrap();
        let checked = apply_attr(&element, "checked", &Value::Bool(true)).unwrap();

        assert!(!element.has_attribute("disabled"));
        assert_eq!(disabled.value(), None);
        assert_eq!(element.get_attribute("checked").as_deref(), Some(""));
        assert!(checked.owner_element().is_some());
    }

    #[test]
    fn vanilla_reads_accessors_once() {
        let document = Document::new();
        let element = document.create_element("div").unwrap();
        let value = Rc::new(RefCell::new(Value::from("a")));
        let value_clone = value.clone();
        let dynamic = Dynamic::Reactive(Accessor::new(move || value_clone.borrow().clone()));

        VanillaBinder.add_attr(&element, "title", &dynamic).unwrap();
        *value.borrow_mut() = Value::from("b");

        assert_eq!(element.get_attribute("title").as_deref(), Some("a"));
    }

    #[test]
    fn bind_order_is_fixed() {
        let document = Document::new();
        let element = document.create_element("div").unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));

        let (init_log, exec_log, clean_log) = (log.clone(), log.clone(), log.clone());
        let props = Props::new()
            .attr("id", "x")
            .member("value", 3)
            .execute(move |el| exec_log.borrow_mut().push(format!("exec {}", el.member("value"))))
            .init(move |el| {
                init_log
                    .borrow_mut()
                    .push(format!("init {}", el.get_attribute("id").unwrap_or_default()))
            })
            .clean(move |_| clean_log.borrow_mut().push("clean".to_string()))
            .on("click", |_: &Event| {});

        bind_props(&VanillaBinder, &element, &props).unwrap();
        assert_eq!(*log.borrow(), vec!["init x", "exec 3"]);
        assert_eq!(element.listener_count("click"), 1);

        element.clean();
        assert_eq!(log.borrow().last().map(String::as_str), Some("clean"));
    }

    #[test]
    fn string_style_is_an_attribute() {
        let element = Document::new().create_element("p").unwrap();
        VanillaBinder
            .set_style(&element, &StyleValue::from("color: red;"))
            .unwrap();

        assert_eq!(element.get_attribute("style").as_deref(), Some("color: red;"));
    }

    #[test]
    fn rules_are_not_element_children() {
        let document = Document::new();
        let rule = RenderChild::Rule(crate::render::StyleRule {
            selector: "p".into(),
            declarations: StyleMap::new(),
        });

        assert!(matches!(
            VanillaBinder.process_child(&document, rule),
            Err(HzoneError::UnexpectedChild { found: "style rule", .. })
        ));
    }

    #[test]
    fn compose_rejects_bindings_on_text() {
        let document = Document::new();
        let text = document.create_text_node("t");
        let props = Props::new().attr("id", "x");

        let err = compose(&VanillaBinder, Output::Node(text), &props, Vec::new()).unwrap_err();
        assert!(matches!(err, HzoneError::ComponentOutput(_)));
    }
}
