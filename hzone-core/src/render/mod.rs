//! Renderers
//!
//! A renderer turns `(tag, props, children)` into host nodes. Every renderer
//! answers two questions:
//!
//! - [`Render::test`]: can it handle this tag and props? This is pure and
//!   never fails.
//! - [`Render::h`]: build the output. Props have already been split into
//!   their categories and children have been flattened, so a renderer only
//!   ever sees [`RenderChild`]ren.
//!
//! The element renderers share one construction pipeline and differ only in
//! how values get onto the element. That part is the [`Binder`]:
//! [`VanillaBinder`] applies values once, [`ReactiveBinder`] keeps them in sync
//! with live accessors through an [`EffectScheduler`].
//!
//! ```rust,ignore
//! let document = Document::new();
//! let zone = HyperZone::new(document.clone(), HyperZoneConfig::default());
//! let html = zone.create_renderer_instance(HtmlRender::<ReactiveBinder>::from_zone);
//! zone.set_default_zone([html as Rc<dyn Render>]);
//! ```

mod binder;
mod child;
mod css;
mod elements;
mod reactive;

pub use binder::{apply_attr, Binder, VanillaBinder};
pub use child::{Child, RenderChild};
pub use css::{StyleRuleRender, StyleSheetRender};
pub use elements::{ComponentRender, FragmentRender, HtmlRender, SvgRender, TemplateRender};
pub use reactive::{
    Disposer, EffectScheduler, ExternalEffects, ReactiveBinder, ReactiveDynamicStylable, SignalEffects,
};

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::dom::{CssStyleSheet, Element, Node};
use crate::error::Result;
use crate::props::{ComponentProps, Props, StyleMap};

/// Identity of a renderer, used as its registry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderKind(u64);

impl RenderKind {
    /// A kind no other renderer has.
    pub fn unique() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// The renderer contract.
pub trait Render {
    fn kind(&self) -> RenderKind;

    /// Whether this renderer handles `tag`. Must not fail or have side effects.
    fn test(&self, tag: &Tag, props: &Props) -> bool;

    /// Build the output for `tag`.
    fn h(&self, tag: &Tag, props: Props, children: Vec<RenderChild>) -> Result<Output>;
}

/// A component generator: receives its own parameters, returns a node or a
/// fragment.
#[derive(Clone)]
pub struct Component(Rc<dyn Fn(ComponentProps) -> Result<Output>>);

impl Component {
    pub fn new<F>(generate: F) -> Self
    where
        F: Fn(ComponentProps) -> Result<Output> + 'static,
    {
        Self(Rc::new(generate))
    }

    pub fn call(&self, props: ComponentProps) -> Result<Output> {
        (self.0)(props)
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Component").field(&Rc::as_ptr(&self.0)).finish()
    }
}

/// What to render.
#[derive(Debug, Clone, PartialEq)]
pub enum Tag {
    /// An element name such as `div`, or a pseudo element such as `css`.
    Element(String),
    Component(Component),
    Fragment,
}

impl Tag {
    pub fn element_name(&self) -> Option<&str> {
        match self {
            Tag::Element(name) => Some(name.as_str()),
            _ => None,
        }
    }

    pub fn is_element(&self, name: &str) -> bool {
        self.element_name() == Some(name)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Element(name) => f.write_str(name),
            Tag::Component(_) => f.write_str("<component>"),
            Tag::Fragment => f.write_str("<fragment>"),
        }
    }
}

impl From<&str> for Tag {
    fn from(name: &str) -> Self {
        Tag::Element(name.to_owned())
    }
}

impl From<String> for Tag {
    fn from(name: String) -> Self {
        Tag::Element(name)
    }
}

impl From<Component> for Tag {
    fn from(component: Component) -> Self {
        Tag::Component(component)
    }
}

/// A style rule built by the `rule` renderer, before it joins a sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleRule {
    pub selector: String,
    pub declarations: StyleMap,
}

/// What a renderer produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Node(Node),
    /// Loose nodes, to be spliced into the parent.
    Fragment(Vec<Node>),
    Sheet(CssStyleSheet),
    Rule(StyleRule),
}

impl Output {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Output::Node(_) => "node",
            Output::Fragment(_) => "fragment",
            Output::Sheet(_) => "style sheet",
            Output::Rule(_) => "style rule",
        }
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Output::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_element(&self) -> Option<Element> {
        self.as_node().and_then(Node::as_element)
    }

    /// The output's nodes: one for a node, all of them for a fragment.
    pub fn nodes(&self) -> Vec<Node> {
        match self {
            Output::Node(node) => vec![node.clone()],
            Output::Fragment(nodes) => nodes.clone(),
            Output::Sheet(_) | Output::Rule(_) => Vec::new(),
        }
    }

    pub fn into_sheet(self) -> Option<CssStyleSheet> {
        match self {
            Output::Sheet(sheet) => Some(sheet),
            _ => None,
        }
    }
}

impl From<Node> for Output {
    fn from(node: Node) -> Self {
        Output::Node(node)
    }
}

impl From<Element> for Output {
    fn from(element: Element) -> Self {
        Output::Node(element.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;

    #[test]
    fn render_kinds_are_unique() {
        assert_ne!(RenderKind::unique(), RenderKind::unique());
    }

    #[test]
    fn components_compare_by_identity() {
        let document = Document::new();
        let component = Component::new(move |_| Ok(document.create_element("p")?.into()));

        assert_eq!(Tag::from(component.clone()), Tag::Component(component));
        assert_ne!(
            Tag::from(Component::new(|_| Ok(Output::Fragment(Vec::new())))),
            Tag::from(Component::new(|_| Ok(Output::Fragment(Vec::new()))))
        );
    }

    #[test]
    fn tags_display_their_name() {
        assert_eq!(Tag::from("div").to_string(), "div");
        assert_eq!(Tag::Fragment.to_string(), "<fragment>");
        assert!(Tag::from("css").is_element("css"));
        assert!(!Tag::Fragment.is_element("css"));
    }

    #[test]
    fn output_nodes() {
        let document = Document::new();
        let a = document.create_text_node("a");
        let b = document.create_text_node("b");

        assert_eq!(Output::Node(a.clone()).nodes(), vec![a.clone()]);
        assert_eq!(Output::Fragment(vec![a, b]).nodes().len(), 2);
        assert!(Output::Sheet(CssStyleSheet::new()).nodes().is_empty());
    }
}
