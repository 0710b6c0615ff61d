//! Element, component, fragment and template renderers.

use super::binder::{compose, process_children};
use super::{Binder, Output, Render, RenderChild, RenderKind, Tag, VanillaBinder};
use crate::dom::{CustomElementDefinition, Document, DomError, Namespace, Node};
use crate::error::{HzoneError, Result};
use crate::props::{normalize_attr_props, Props};
use crate::zone::HyperZone;

fn mismatch(tag: &Tag) -> HzoneError {
    HzoneError::TagMismatch {
        tag: tag.to_string(),
    }
}

/// Calls component generators and binds props to what they return.
///
/// The generator receives `rest` as its parameters. Children are built first
/// and appended to the result afterwards, so a component cannot see them.
#[derive(Debug)]
pub struct ComponentRender<B = VanillaBinder> {
    kind: RenderKind,
    document: Document,
    binder: B,
}

impl ComponentRender<VanillaBinder> {
    pub fn new(document: Document) -> Self {
        Self::with_binder(document, VanillaBinder)
    }
}

impl<B: Binder> ComponentRender<B> {
    pub fn with_binder(document: Document, binder: B) -> Self {
        Self {
            kind: RenderKind::unique(),
            document,
            binder,
        }
    }

    pub fn from_zone(zone: &HyperZone) -> Self {
        Self::with_binder(zone.document().clone(), B::from_zone(zone))
    }
}

impl<B: Binder> Render for ComponentRender<B> {
    fn kind(&self) -> RenderKind {
        self.kind
    }

    fn test(&self, tag: &Tag, _props: &Props) -> bool {
        matches!(tag, Tag::Component(_))
    }

    fn h(&self, tag: &Tag, mut props: Props, children: Vec<RenderChild>) -> Result<Output> {
        let Tag::Component(component) = tag else {
            return Err(mismatch(tag));
        };
        let nodes = process_children(&self.binder, &self.document, children)?;
        let output = component.call(std::mem::take(&mut props.rest))?;
        compose(&self.binder, output, &props, nodes)
    }
}

/// Creates elements in one namespace. Accepts any element tag.
#[derive(Debug)]
struct ElementFactory<B> {
    kind: RenderKind,
    document: Document,
    namespace: Namespace,
    binder: B,
}

impl<B: Binder> ElementFactory<B> {
    fn new(document: Document, namespace: Namespace, binder: B) -> Self {
        Self {
            kind: RenderKind::unique(),
            document,
            namespace,
            binder,
        }
    }

    fn h(&self, tag: &Tag, props: Props, children: Vec<RenderChild>) -> Result<Output> {
        let name = tag.element_name().ok_or_else(|| mismatch(tag))?;
        let props = normalize_attr_props(Some(props));
        let nodes = process_children(&self.binder, &self.document, children)?;
        let element = self
            .document
            .create_element_ns(self.namespace.clone(), name)?;
        compose(&self.binder, element.into(), &props, nodes)
    }
}

macro_rules! element_renderer {
    ($(#[$doc:meta])* $name:ident, $namespace:expr) => {
        $(#[$doc])*
        #[derive(Debug)]
        pub struct $name<B = VanillaBinder>(ElementFactory<B>);

        impl $name<VanillaBinder> {
            pub fn new(document: Document) -> Self {
                Self::with_binder(document, VanillaBinder)
            }
        }

        impl<B: Binder> $name<B> {
            pub fn with_binder(document: Document, binder: B) -> Self {
                Self(ElementFactory::new(document, $namespace, binder))
            }

            pub fn from_zone(zone: &HyperZone) -> Self {
                Self::with_binder(zone.document().clone(), B::from_zone(zone))
            }
        }

        impl<B: Binder> Render for $name<B> {
            fn kind(&self) -> RenderKind {
                self.0.kind
            }

            fn test(&self, tag: &Tag, _props: &Props) -> bool {
                matches!(tag, Tag::Element(_))
            }

            fn h(&self, tag: &Tag, props: Props, children: Vec<RenderChild>) -> Result<Output> {
                self.0.h(tag, props, children)
            }
        }
    };
}

element_renderer!(
    /// HTML elements. Top-level `rest` values are attribute shorthand.
    HtmlRender,
    Namespace::Html
);

element_renderer!(
    /// SVG elements, created in the SVG namespace.
    SvgRender,
    Namespace::Svg
);

/// Returns the processed children as loose nodes.
#[derive(Debug)]
pub struct FragmentRender<B = VanillaBinder> {
    kind: RenderKind,
    document: Document,
    binder: B,
    strict: bool,
}

impl FragmentRender<VanillaBinder> {
    pub fn new(document: Document) -> Self {
        Self::with_binder(document, VanillaBinder)
    }
}

impl<B: Binder> FragmentRender<B> {
    pub fn with_binder(document: Document, binder: B) -> Self {
        Self {
            kind: RenderKind::unique(),
            document,
            binder,
            strict: cfg!(debug_assertions),
        }
    }

    pub fn from_zone(zone: &HyperZone) -> Self {
        Self::with_binder(zone.document().clone(), B::from_zone(zone))
            .with_strict(zone.config().debug.strict_fragments)
    }

    /// Whether props on a fragment are an error rather than ignored.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

impl<B: Binder> Render for FragmentRender<B> {
    fn kind(&self) -> RenderKind {
        self.kind
    }

    fn test(&self, tag: &Tag, _props: &Props) -> bool {
        matches!(tag, Tag::Fragment)
    }

    fn h(&self, tag: &Tag, props: Props, children: Vec<RenderChild>) -> Result<Output> {
        if !matches!(tag, Tag::Fragment) {
            return Err(mismatch(tag));
        }
        if !props.is_empty() {
            if self.strict {
                return Err(HzoneError::FragmentProps);
            }
            tracing::warn!("fragments do not accept props, ignoring them");
        }
        let nodes = process_children(&self.binder, &self.document, children)?;
        Ok(Output::Fragment(nodes))
    }
}

/// Defines a custom element from a `<template>`.
///
/// Props, all read from `rest`:
///
/// - `id`: the custom element name (required)
/// - `is`: the built-in element it extends
/// - `shallow`: clone only the top level of the content into each instance
/// - `sheets`: style sheets adopted by each instance's shadow root
///
/// Children become the template content. The template element is returned.
#[derive(Debug)]
pub struct TemplateRender<B = VanillaBinder> {
    kind: RenderKind,
    document: Document,
    binder: B,
}

impl TemplateRender<VanillaBinder> {
    pub fn new(document: Document) -> Self {
        Self::with_binder(document, VanillaBinder)
    }
}

impl<B: Binder> TemplateRender<B> {
    pub fn with_binder(document: Document, binder: B) -> Self {
        Self {
            kind: RenderKind::unique(),
            document,
            binder,
        }
    }

    pub fn from_zone(zone: &HyperZone) -> Self {
        Self::with_binder(zone.document().clone(), B::from_zone(zone))
    }
}

impl<B: Binder> Render for TemplateRender<B> {
    fn kind(&self) -> RenderKind {
        self.kind
    }

    fn test(&self, tag: &Tag, _props: &Props) -> bool {
        tag.is_element("template")
    }

    fn h(&self, tag: &Tag, mut props: Props, children: Vec<RenderChild>) -> Result<Output> {
        if !tag.is_element("template") {
            return Err(mismatch(tag));
        }
        let id = props.take_text("id")?.ok_or(HzoneError::MissingProp("id"))?;
        let extends = props.take_text("is")?;
        let shallow = props.take_flag("shallow")?;
        let sheets = props.take_sheets("sheets")?;

        let template = self.document.create_element("template")?;
        let content: Node = template.template_content().ok_or(DomError::NotFound)?;
        for node in process_children(&self.binder, &self.document, children)? {
            content.append(&node)?;
        }

        self.document.define(
            &id,
            CustomElementDefinition {
                content,
                shallow,
                sheets,
                extends,
            },
        )?;
        Ok(template.into())
    }
}
