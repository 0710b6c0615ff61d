//! Dispatcher taking inline-prefix props.

use std::ops::Deref;
use std::rc::Rc;

use super::HyperZone;
use crate::config::HyperZoneConfig;
use crate::dom::Document;
use crate::error::Result;
use crate::props::{inline_props_remapper, InlineProps, Props};
use crate::render::{Child, Output, Render, RenderChild, RenderKind, Tag};

/// A [`HyperZone`] whose `h` takes [`InlineProps`] such as
/// `attr:id` or `on:click` and remaps them before dispatch.
///
/// Everything else (zones, registry, effects) is the wrapped zone's.
#[derive(Debug)]
pub struct InlineHyperZone {
    zone: HyperZone,
}

impl InlineHyperZone {
    pub fn new(document: Document, config: HyperZoneConfig) -> Self {
        Self {
            zone: HyperZone::new(document, config),
        }
    }

    pub fn with_default_zone<I>(self, renderers: I) -> Self
    where
        I: IntoIterator<Item = Rc<dyn Render>>,
    {
        self.zone.set_default_zone(renderers);
        self
    }

    pub fn into_inner(self) -> HyperZone {
        self.zone
    }

    /// Remap `props` and dispatch.
    pub fn h<C>(
        &self,
        tag: impl Into<Tag>,
        props: impl Into<Option<InlineProps>>,
        children: C,
    ) -> Result<Output>
    where
        C: IntoIterator<Item = Child>,
    {
        let props = inline_props_remapper(props.into())?;
        self.zone.dispatch(&tag.into(), props, children)
    }
}

impl From<HyperZone> for InlineHyperZone {
    fn from(zone: HyperZone) -> Self {
        Self { zone }
    }
}

impl Deref for InlineHyperZone {
    type Target = HyperZone;

    fn deref(&self) -> &HyperZone {
        &self.zone
    }
}

/// As a nested renderer, props arrive already remapped.
impl Render for InlineHyperZone {
    fn kind(&self) -> RenderKind {
        self.zone.kind()
    }

    fn test(&self, tag: &Tag, props: &Props) -> bool {
        Render::test(&self.zone, tag, props)
    }

    fn h(&self, tag: &Tag, props: Props, children: Vec<RenderChild>) -> Result<Output> {
        Render::h(&self.zone, tag, props, children)
    }
}
