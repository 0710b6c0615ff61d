//! Zones
//!
//! A [`HyperZone`] is a composite renderer. It keeps a stack of zones, each an
//! ordered list of renderers, and sends every `h` call to the first renderer
//! of the top zone whose `test` accepts the tag.
//!
//! # Switching zones
//!
//! Zones can be switched inline, the way a child list is written. Arguments
//! are evaluated in order, so everything between a push and its pop is built
//! with the pushed zone:
//!
//! ```rust,ignore
//! let div = zone.h("div", Props::new(), [
//!     zone.push_zone([svg.clone() as Rc<dyn Render>]).into(),
//!     zone.h("svg", Props::new().prop("viewBox", "0 0 10 10"), []).into(),
//!     zone.pop_zone().into(),
//! ])?;
//! ```
//!
//! The sentinels returned by [`HyperZone::push_zone`] and
//! [`HyperZone::pop_zone`] are dropped from the child list. The scoped forms,
//! [`HyperZone::with_zone`] and [`HyperZone::enter_zone`], restore the stack
//! even when the builder returns early.
//!
//! # Depth
//!
//! The stack never drops below the default zone. Popping it is a no-op. There
//! is no upper bound, so unbalanced pushes grow the stack.

mod children;
mod inline;

pub use children::flatten_children;
pub use inline::InlineHyperZone;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::config::HyperZoneConfig;
use crate::dom::Document;
use crate::error::{HzoneError, Result};
use crate::props::Props;
use crate::render::{
    Child, EffectScheduler, Output, Render, RenderChild, RenderKind, SignalEffects, Tag,
};

/// An ordered list of renderers. Earlier renderers take precedence.
pub type Zone = SmallVec<[Rc<dyn Render>; 4]>;

/// Marker left in a child list by a zone push or pop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneSignal {
    Push,
    Pop,
}

/// The dispatcher.
pub struct HyperZone {
    kind: RenderKind,
    document: Document,
    config: HyperZoneConfig,
    registry: RefCell<IndexMap<RenderKind, Rc<dyn Render>>>,
    zones: RefCell<Vec<Zone>>,
    effects: RefCell<Option<Rc<dyn EffectScheduler>>>,
}

impl HyperZone {
    /// A dispatcher with an empty default zone.
    pub fn new(document: Document, config: HyperZoneConfig) -> Self {
        Self {
            kind: RenderKind::unique(),
            document,
            config,
            registry: RefCell::new(IndexMap::new()),
            zones: RefCell::new(vec![Zone::new()]),
            effects: RefCell::new(None),
        }
    }

    /// Builder form of [`set_default_zone`](Self::set_default_zone).
    pub fn with_default_zone<I>(self, renderers: I) -> Self
    where
        I: IntoIterator<Item = Rc<dyn Render>>,
    {
        self.set_default_zone(renderers);
        self
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn config(&self) -> &HyperZoneConfig {
        &self.config
    }

    // Registry

    /// Make a renderer available to [`push_zone_kinds`](Self::push_zone_kinds).
    pub fn register_renderer(&self, renderer: Rc<dyn Render>) -> RenderKind {
        let kind = renderer.kind();
        self.registry.borrow_mut().insert(kind, renderer);
        kind
    }

    /// Build a renderer from this zone's collaborators and register it.
    ///
    /// ```rust,ignore
    /// let html = zone.create_renderer_instance(HtmlRender::<ReactiveBinder>::from_zone);
    /// ```
    pub fn create_renderer_instance<R, F>(&self, build: F) -> Rc<R>
    where
        R: Render + 'static,
        F: FnOnce(&HyperZone) -> R,
    {
        let renderer = Rc::new(build(self));
        self.register_renderer(renderer.clone());
        renderer
    }

    pub fn renderer(&self, kind: RenderKind) -> Option<Rc<dyn Render>> {
        self.registry.borrow().get(&kind).cloned()
    }

    // Effects

    /// The scheduler reactive renderers built from this zone use.
    ///
    /// Defaults to a [`SignalEffects`] created on first use.
    pub fn effects(&self) -> Rc<dyn EffectScheduler> {
        self.effects
            .borrow_mut()
            .get_or_insert_with(|| Rc::new(SignalEffects::new()) as Rc<dyn EffectScheduler>)
            .clone()
    }

    /// Replace the scheduler. Renderers created before the call keep the old one.
    pub fn set_effects(&self, scheduler: Rc<dyn EffectScheduler>) {
        *self.effects.borrow_mut() = Some(scheduler);
    }

    // Zone stack

    /// Replace the bottom zone.
    pub fn set_default_zone<I>(&self, renderers: I)
    where
        I: IntoIterator<Item = Rc<dyn Render>>,
    {
        let zone = self.register_all(renderers);
        let mut zones = self.zones.borrow_mut();
        match zones.first_mut() {
            Some(bottom) => *bottom = zone,
            None => zones.push(zone),
        }
    }

    pub fn push_zone<I>(&self, renderers: I) -> ZoneSignal
    where
        I: IntoIterator<Item = Rc<dyn Render>>,
    {
        let zone = self.register_all(renderers);
        let mut zones = self.zones.borrow_mut();
        zones.push(zone);
        tracing::debug!(depth = zones.len(), "pushed zone");
        ZoneSignal::Push
    }

    /// Push registered renderers by kind.
    pub fn push_zone_kinds(&self, kinds: &[RenderKind]) -> Result<ZoneSignal> {
        let zone = {
            let registry = self.registry.borrow();
            kinds
                .iter()
                .map(|kind| {
                    registry
                        .get(kind)
                        .cloned()
                        .ok_or(HzoneError::UnregisteredRenderer(*kind))
                })
                .collect::<Result<Zone>>()?
        };
        Ok(self.push_zone(zone))
    }

    /// Drop the top zone. The default zone is never popped.
    pub fn pop_zone(&self) -> ZoneSignal {
        let mut zones = self.zones.borrow_mut();
        if zones.len() > 1 {
            zones.pop();
            tracing::debug!(depth = zones.len(), "popped zone");
        } else {
            tracing::warn!("pop_zone called on the default zone, ignoring");
        }
        ZoneSignal::Pop
    }

    /// The active zone.
    pub fn seek_zone(&self) -> Zone {
        self.zones.borrow().last().cloned().unwrap_or_default()
    }

    pub fn depth(&self) -> usize {
        self.zones.borrow().len()
    }

    /// Push a zone for as long as the guard lives.
    pub fn enter_zone<I>(&self, renderers: I) -> ZoneGuard<'_>
    where
        I: IntoIterator<Item = Rc<dyn Render>>,
    {
        self.push_zone(renderers);
        ZoneGuard {
            zone: self,
            depth: self.depth(),
        }
    }

    /// Run `build` with a zone pushed, popping it afterwards.
    pub fn with_zone<I, T>(&self, renderers: I, build: impl FnOnce(&HyperZone) -> T) -> T
    where
        I: IntoIterator<Item = Rc<dyn Render>>,
    {
        let _guard = self.enter_zone(renderers);
        build(self)
    }

    fn register_all<I>(&self, renderers: I) -> Zone
    where
        I: IntoIterator<Item = Rc<dyn Render>>,
    {
        renderers
            .into_iter()
            .inspect(|renderer| {
                self.register_renderer(renderer.clone());
            })
            .collect()
    }

    // Dispatch

    /// Build `tag` with the first renderer of the active zone that accepts it.
    ///
    /// Children are flattened one level and zone sentinels and missing
    /// subtrees are dropped before the renderer sees them.
    pub fn h<C>(
        &self,
        tag: impl Into<Tag>,
        props: impl Into<Option<Props>>,
        children: C,
    ) -> Result<Output>
    where
        C: IntoIterator<Item = Child>,
    {
        let tag = tag.into();
        self.dispatch(&tag, props.into().unwrap_or_default(), children)
    }

    pub(crate) fn dispatch<C>(&self, tag: &Tag, props: Props, children: C) -> Result<Output>
    where
        C: IntoIterator<Item = Child>,
    {
        // Cloned so renderers can push and pop while building
        let zone = self.seek_zone();
        let Some(renderer) = zone.iter().find(|renderer| renderer.test(tag, &props)) else {
            if self.config.debug.report_errors {
                tracing::error!(%tag, depth = self.depth(), "failed to capture an appropriate renderer");
            }
            return Err(HzoneError::NoRenderer {
                tag: tag.to_string(),
            });
        };

        tracing::debug!(%tag, kind = ?renderer.kind(), "dispatching");
        let children = flatten_children(children)?;
        renderer.h(tag, props, children)
    }
}

impl Render for HyperZone {
    fn kind(&self) -> RenderKind {
        self.kind
    }

    fn test(&self, tag: &Tag, props: &Props) -> bool {
        self.seek_zone().iter().any(|renderer| renderer.test(tag, props))
    }

    fn h(&self, tag: &Tag, props: Props, children: Vec<RenderChild>) -> Result<Output> {
        self.dispatch(tag, props, children.into_iter().map(Child::from))
    }
}

impl fmt::Debug for HyperZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HyperZone")
            .field("kind", &self.kind)
            .field("depth", &self.depth())
            .field("registered", &self.registry.borrow().len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Pops the zone pushed by [`HyperZone::enter_zone`] when dropped.
///
/// Zones pushed after it and left unpopped are dropped with it.
#[must_use = "the zone is popped as soon as the guard is dropped"]
pub struct ZoneGuard<'a> {
    zone: &'a HyperZone,
    depth: usize,
}

impl ZoneGuard<'_> {
    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl Drop for ZoneGuard<'_> {
    fn drop(&mut self) {
        let mut zones = self.zone.zones.borrow_mut();
        let keep = self.depth.saturating_sub(1).max(1);
        if zones.len() > keep {
            zones.truncate(keep);
            tracing::debug!(depth = zones.len(), "left zone");
        }
    }
}

impl fmt::Debug for ZoneGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZoneGuard").field("depth", &self.depth).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Accepts element tags with a given name and records calls.
    struct Named {
        kind: RenderKind,
        name: &'static str,
        calls: Cell<usize>,
    }

    impl Named {
        fn new(name: &'static str) -> Rc<Self> {
            Rc::new(Self {
                kind: RenderKind::unique(),
                name,
                calls: Cell::new(0),
            })
        }
    }

    impl Render for Named {
        fn kind(&self) -> RenderKind {
            self.kind
        }

        fn test(&self, tag: &Tag, _props: &Props) -> bool {
            tag.is_element(self.name) || self.name == "*"
        }

        fn h(&self, _tag: &Tag, _props: Props, children: Vec<RenderChild>) -> Result<Output> {
            self.calls.set(self.calls.get() + 1);
            let text = children
                .iter()
                .filter_map(|child| match child {
                    RenderChild::Text(text) => Some(text.as_str()),
                    _ => None,
                })
                .collect::<String>();
            Ok(Output::Node(crate::dom::Node::new_text(&format!("{}:{text}", self.name))))
        }
    }

    fn zone_with(renderers: &[Rc<Named>]) -> HyperZone {
        HyperZone::new(Document::new(), HyperZoneConfig::default())
            .with_default_zone(renderers.iter().map(|r| r.clone() as Rc<dyn Render>))
    }

    fn text_of(output: Result<Output>) -> String {
        output.unwrap().as_node().unwrap().text_content()
    }

    #[test]
    fn first_match_wins() {
        let a = Named::new("*");
        let b = Named::new("div");
        let zone = zone_with(&[a.clone(), b.clone()]);

        assert_eq!(text_of(zone.h("div", Props::new(), [])), "*:");
        assert_eq!(a.calls.get(), 1);
        assert_eq!(b.calls.get(), 0);
    }

    #[test]
    fn miss_is_an_error() {
        let zone = zone_with(&[Named::new("div")]);
        let err = zone.h("span", Props::new(), []).unwrap_err();
        assert!(matches!(err, HzoneError::NoRenderer { ref tag } if tag == "span"));
        assert!(!Render::test(&zone, &"span".into(), &Props::new()));
    }

    #[test]
    fn depth_never_drops_below_one() {
        let zone = zone_with(&[Named::new("div")]);
        assert_eq!(zone.depth(), 1);

        assert_eq!(zone.pop_zone(), ZoneSignal::Pop);
        assert_eq!(zone.depth(), 1);

        zone.push_zone([Named::new("p") as Rc<dyn Render>]);
        zone.push_zone(Vec::<Rc<dyn Render>>::new());
        assert_eq!(zone.depth(), 3);
        zone.pop_zone();
        zone.pop_zone();
        zone.pop_zone();
        assert_eq!(zone.depth(), 1);
    }

    #[test]
    fn pushed_zone_shadows_default() {
        let outer = Named::new("*");
        let inner = Named::new("circle");
        let zone = zone_with(&[outer]);

        zone.push_zone([inner.clone() as Rc<dyn Render>]);
        assert_eq!(text_of(zone.h("circle", Props::new(), [])), "circle:");
        assert!(zone.h("div", Props::new(), []).is_err());
        zone.pop_zone();

        assert_eq!(text_of(zone.h("circle", Props::new(), [])), "*:");
    }

    #[test]
    fn sentinels_switch_zones_inline() {
        let outer = Named::new("*");
        let inner = Named::new("svg");
        let zone = zone_with(&[outer.clone()]);

        let children = [
            Child::from("a"),
            zone.push_zone([inner.clone() as Rc<dyn Render>]).into(),
            zone.h("svg", Props::new(), []).into(),
            zone.pop_zone().into(),
            Child::from("b"),
        ];
        assert_eq!(inner.calls.get(), 1);
        assert_eq!(zone.depth(), 1);

        assert_eq!(text_of(zone.h("div", Props::new(), children)), "*:ab");
    }

    #[test]
    fn scoped_zones_restore_depth() {
        let zone = zone_with(&[Named::new("*")]);
        let svg = Named::new("svg");

        let built = zone.with_zone([svg.clone() as Rc<dyn Render>], |zone| {
            assert_eq!(zone.depth(), 2);
            // Left unbalanced on purpose
            zone.push_zone(Vec::<Rc<dyn Render>>::new());
            zone.dispatch(&"svg".into(), Props::new(), Vec::new())
        });

        assert!(built.is_err());
        assert_eq!(zone.depth(), 1);

        {
            let guard = zone.enter_zone([svg.clone() as Rc<dyn Render>]);
            assert_eq!(guard.depth(), 2);
            assert_eq!(text_of(zone.h("svg", Props::new(), [])), "svg:");
        }
        assert_eq!(zone.depth(), 1);
    }

    #[test]
    fn kinds_resolve_through_registry() {
        let a = Named::new("a");
        let zone = HyperZone::new(Document::new(), HyperZoneConfig::default());
        let kind = zone.register_renderer(a.clone());

        assert_eq!(zone.push_zone_kinds(&[kind]).unwrap(), ZoneSignal::Push);
        assert_eq!(text_of(zone.h("a", Props::new(), [])), "a:");

        let unknown = RenderKind::unique();
        assert!(matches!(
            zone.push_zone_kinds(&[unknown]),
            Err(HzoneError::UnregisteredRenderer(k)) if k == unknown
        ));
        assert_eq!(zone.depth(), 2);
    }

    #[test]
    fn zones_nest_as_renderers() {
        let inner = Rc::new(zone_with(&[Named::new("leaf")]));
        let outer = zone_with(&[]);
        outer.set_default_zone([inner as Rc<dyn Render>]);

        assert_eq!(text_of(outer.h("leaf", Props::new(), [Child::from("x")])), "leaf:x");
    }

    #[test]
    fn effects_are_created_once() {
        let zone = zone_with(&[]);
        assert!(Rc::ptr_eq(&zone.effects(), &zone.effects()));
    }
}
