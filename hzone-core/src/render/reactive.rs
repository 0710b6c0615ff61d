//! Reactive binding.
//!
//! [`ReactiveBinder`] applies the current value of every accessor right away
//! and then hands an update closure to an [`EffectScheduler`]. Whatever the
//! scheduler reruns keeps the element in sync; the binder never decides when.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use super::binder::{apply_attr, static_child};
use super::{Binder, RenderChild};
use crate::dom::{camel_to_kebab, Attr, Document, Element, Node};
use crate::error::Result;
use crate::props::{StyleMap, StyleValue};
use crate::reactive::{untracked, Effect};
use crate::style::{DynamicStylable, StyleTarget};
use crate::value::{Accessor, Dynamic, Value};
use crate::zone::HyperZone;

/// Stops one effect. Running it a second time is not possible.
pub type Disposer = Box<dyn FnOnce()>;

/// Creates effects: closures rerun whenever something they read changes.
pub trait EffectScheduler {
    /// Register `effect`. Implementations run it once immediately to collect
    /// its dependencies.
    ///
    /// Returns a disposer when the scheduler owns the effect's lifetime.
    fn create_effect(&self, effect: Box<dyn FnMut()>) -> Option<Disposer>;
}

/// Scheduler backed by [`crate::reactive`]. Owns each effect until its
/// disposer runs or [`dispose_all`](Self::dispose_all) is called.
#[derive(Debug, Default)]
pub struct SignalEffects {
    effects: Rc<RefCell<IndexMap<u64, Effect>>>,
    next_id: Cell<u64>,
}

impl SignalEffects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live effects.
    pub fn len(&self) -> usize {
        self.effects.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.borrow().is_empty()
    }

    /// Stop every effect created so far.
    pub fn dispose_all(&self) {
        let effects = std::mem::take(&mut *self.effects.borrow_mut());
        tracing::debug!(count = effects.len(), "disposing effects");
        for effect in effects.values() {
            effect.dispose();
        }
    }
}

impl EffectScheduler for SignalEffects {
    fn create_effect(&self, mut effect: Box<dyn FnMut()>) -> Option<Disposer> {
        // Runs immediately, before the map is borrowed
        let effect = Effect::new(move || effect());
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.effects.borrow_mut().insert(id, effect);

        let effects = Rc::downgrade(&self.effects);
        Some(Box::new(move || {
            let removed = effects
                .upgrade()
                .and_then(|effects| effects.borrow_mut().swap_remove(&id));
            if let Some(effect) = removed {
                effect.dispose();
            }
        }))
    }
}

/// Dispose of the effect when `element` is cleaned.
fn dispose_on_clean(element: &Element, disposer: Option<Disposer>) {
    let Some(disposer) = disposer else {
        return;
    };
    let slot = RefCell::new(Some(disposer));
    element.add_clean_hook(Rc::new(move |_: &Element| {
        if let Some(dispose) = slot.borrow_mut().take() {
            dispose();
        }
    }));
}

thread_local! {
    // Live text nodes not yet appended to an element, with their effects.
    static UNOWNED_TEXT: RefCell<Vec<(Node, Disposer)>> = const { RefCell::new(Vec::new()) };
}

/// Adapter for a foreign signal library's create-effect function.
///
/// ```rust,ignore
/// let effects = ExternalEffects::new(|run| other_lib::create_effect(run));
/// zone.set_effects(Rc::new(effects));
/// ```
pub struct ExternalEffects<F> {
    create: F,
}

impl<F> ExternalEffects<F>
where
    F: Fn(Box<dyn FnMut()>),
{
    pub fn new(create: F) -> Self {
        Self { create }
    }
}

impl<F> EffectScheduler for ExternalEffects<F>
where
    F: Fn(Box<dyn FnMut()>),
{
    /// The foreign library owns the effect, so there is nothing to dispose.
    fn create_effect(&self, effect: Box<dyn FnMut()>) -> Option<Disposer> {
        (self.create)(effect);
        None
    }
}

impl<F> fmt::Debug for ExternalEffects<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExternalEffects").finish_non_exhaustive()
    }
}

/// Binds live values through an effect scheduler.
#[derive(Clone)]
pub struct ReactiveBinder {
    scheduler: Rc<dyn EffectScheduler>,
}

impl ReactiveBinder {
    pub fn new(scheduler: Rc<dyn EffectScheduler>) -> Self {
        Self { scheduler }
    }

    pub fn scheduler(&self) -> &Rc<dyn EffectScheduler> {
        &self.scheduler
    }
}

impl fmt::Debug for ReactiveBinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactiveBinder").finish_non_exhaustive()
    }
}

/// Bring `attr` in line with `next`, keeping its identity.
///
/// `None` detaches it. Going from detached back to a value re-attaches the
/// same node to `element`.
fn sync_attr(element: &Element, attr: &Attr, next: Option<String>) {
    match next {
        None => {
            if let Some(owner) = attr.owner_element() {
                if let Err(err) = owner.remove_attribute_node(attr) {
                    tracing::warn!(name = attr.name(), error = %err, "failed to detach attribute");
                }
            }
            attr.set_value(None);
        }
        Some(text) => {
            let detached = attr.value().is_none() || attr.owner_element().is_none();
            attr.set_value(Some(text));
            if detached {
                if let Err(err) = element.set_attribute_node(attr) {
                    tracing::warn!(name = attr.name(), error = %err, "failed to re-attach attribute");
                }
            }
        }
    }
}

impl Binder for ReactiveBinder {
    fn from_zone(zone: &HyperZone) -> Self {
        Self::new(zone.effects())
    }

    fn add_attr(&self, element: &Element, name: &str, value: &Dynamic<Value>) -> Result<Attr> {
        let accessor = match value {
            Dynamic::Static(value) => return apply_attr(element, name, value),
            Dynamic::Reactive(accessor) => accessor.clone(),
        };

        let attr = apply_attr(element, name, &untracked(|| accessor.get()))?;

        let owner = element.clone();
        let bound = attr.clone();
        let mut first_run = true;
        let disposer = self.scheduler.create_effect(Box::new(move || {
            let next = accessor.get().to_attr_string();
            if !first_run && next == bound.value() {
                return;
            }
            first_run = false;
            sync_attr(&owner, &bound, next);
        }));
        dispose_on_clean(element, disposer);
        Ok(attr)
    }

    fn set_member(&self, element: &Element, key: &str, value: &Dynamic<Value>) {
        let accessor = match value {
            Dynamic::Static(value) => return element.set_member(key, value.clone()),
            Dynamic::Reactive(accessor) => accessor.clone(),
        };

        element.set_member(key, untracked(|| accessor.get()));

        let owner = element.clone();
        let key = key.to_owned();
        let disposer = self.scheduler.create_effect(Box::new(move || {
            let next = accessor.get();
            if owner.member(&key) != next {
                owner.set_member(&key, next);
            }
        }));
        dispose_on_clean(element, disposer);
    }

    fn set_style(&self, element: &Element, style: &StyleValue) -> Result<DynamicStylable> {
        let stylable = ReactiveDynamicStylable::new(element.clone(), self.scheduler.clone());
        match style {
            StyleValue::Text(text) => {
                self.add_attr(element, "style", &text.clone().map(Value::Str))?;
            }
            StyleValue::Declarations(declarations) => {
                stylable.set_style(declarations.iter().map(|(k, v)| (k.as_str(), v)));
            }
            StyleValue::Computed(accessor) => stylable.set_computed(accessor.clone()),
        }
        Ok(stylable.base().clone())
    }

    fn process_child(&self, document: &Document, child: RenderChild) -> Result<Node> {
        let accessor = match child {
            RenderChild::Dynamic(accessor) => accessor,
            other => return static_child(document, other),
        };

        let text = document.create_text_node(
            &untracked(|| accessor.get())
                .stringify()
                .unwrap_or_default(),
        );

        let node = text.clone();
        let disposer = self.scheduler.create_effect(Box::new(move || {
            let next = accessor.get().stringify();
            if node.text_value() != next {
                node.set_text_value(next);
            }
        }));
        if let Some(disposer) = disposer {
            UNOWNED_TEXT.with(|unowned| unowned.borrow_mut().push((text.clone(), disposer)));
        }
        Ok(text)
    }

    /// Live text children are disposed of along with the element that
    /// receives them.
    fn adopt_children(&self, element: &Element, children: &[Node]) {
        let adopted: Vec<(Node, Disposer)> = UNOWNED_TEXT.with(|unowned| {
            let mut unowned = unowned.borrow_mut();
            let (adopted, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut *unowned)
                .into_iter()
                .partition(|(node, _)| children.iter().any(|child| child.ptr_eq(node)));
            *unowned = rest;
            adopted
        });
        for (_, disposer) in adopted {
            dispose_on_clean(element, Some(disposer));
        }
    }
}

/// A [`DynamicStylable`] whose declarations may be live.
///
/// Static entries go through the plain controller in one pass. Each live
/// entry gets its own effect, so a change touches only its property.
#[derive(Clone)]
pub struct ReactiveDynamicStylable {
    base: DynamicStylable,
    scheduler: Rc<dyn EffectScheduler>,
}

impl ReactiveDynamicStylable {
    pub fn new(target: impl Into<StyleTarget>, scheduler: Rc<dyn EffectScheduler>) -> Self {
        Self {
            base: DynamicStylable::new(target),
            scheduler,
        }
    }

    pub fn base(&self) -> &DynamicStylable {
        &self.base
    }

    pub fn set_style<'a, I>(&self, entries: I)
    where
        I: IntoIterator<Item = (&'a str, &'a Dynamic<String>)>,
    {
        let mut fixed = StyleMap::new();
        for (key, value) in entries {
            match value {
                Dynamic::Static(value) => {
                    fixed.insert(key.to_owned(), value.clone());
                }
                Dynamic::Reactive(accessor) => self.bind_property(key, accessor.clone()),
            }
        }
        self.base.set_style(&fixed);
    }

    fn bind_property(&self, key: &str, accessor: Accessor<String>) {
        let name = camel_to_kebab(key);
        let declaration = self.base.target().style();

        declaration.set_property(&name, &untracked(|| accessor.get()));
        let disposer = self.scheduler.create_effect(Box::new(move || {
            let next = accessor.get();
            if declaration.get_property_value(&name) != next {
                declaration.set_property(&name, &next);
            }
        }));
        self.own(disposer);
    }

    // Rule targets live as long as their sheet.
    fn own(&self, disposer: Option<Disposer>) {
        if let StyleTarget::Element(element) = self.base.target() {
            dispose_on_clean(element, disposer);
        }
    }

    /// Follow a live declaration map. Keys that disappear from the map are
    /// cleared.
    pub fn set_computed(&self, accessor: Accessor<StyleMap>) {
        let base = self.base.clone();
        let initial = untracked(|| accessor.get());
        base.set_style(&initial);

        let mut last = initial;
        let disposer = self.scheduler.create_effect(Box::new(move || {
            let next = accessor.get();
            if next == last {
                return;
            }
            let declaration = base.target().style();
            let mut blanks = Vec::new();
            for key in last.keys().filter(|key| !next.contains_key(*key)) {
                if key.starts_with("--") {
                    declaration.remove_property(key);
                } else {
                    blanks.push((key.as_str(), ""));
                }
            }
            declaration.assign(blanks);
            base.set_style(&next);
            last = next;
        }));
        self.own(disposer);
    }

    pub fn clear_style(&self) {
        self.base.clear_style();
    }
}

impl fmt::Debug for ReactiveDynamicStylable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactiveDynamicStylable")
            .field("base", &self.base)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::Signal;

    fn binder() -> (Rc<SignalEffects>, ReactiveBinder) {
        let effects = Rc::new(SignalEffects::new());
        (effects.clone(), ReactiveBinder::new(effects))
    }

    fn live(signal: &Signal<Value>) -> Dynamic<Value> {
        Dynamic::Reactive(signal.accessor())
    }

    #[test]
    fn attribute_identity_survives_toggling() {
        let (_effects, binder) = binder();
        let element = Document::new().create_element("button").unwrap();
        let disabled = Signal::new(Value::Bool(true));

        let attr = binder.add_attr(&element, "disabled", &live(&disabled)).unwrap();
        assert_eq!(element.get_attribute("disabled").as_deref(), Some(""));

        disabled.set(Value::Bool(false));
        assert!(!element.has_attribute("disabled"));
        assert_eq!(attr.value(), None);

        disabled.set(Value::from("yes"));
        let reattached = element.get_attribute_node("disabled").unwrap();
        assert!(reattached.ptr_eq(&attr));
        assert_eq!(reattached.value().as_deref(), Some("yes"));
    }

    #[test]
    fn initially_falsy_attribute_attaches_later() {
        let (_effects, binder) = binder();
        let element = Document::new().create_element("div").unwrap();
        let title = Signal::new(Value::Null);

        let attr = binder.add_attr(&element, "title", &live(&title)).unwrap();
        assert!(!element.has_attribute("title"));

        title.set(Value::from("hi"));
        assert!(element.get_attribute_node("title").unwrap().ptr_eq(&attr));
    }

    #[test]
    fn members_follow_signal() {
        let (effects, binder) = binder();
        let element = Document::new().create_element("input").unwrap();
        let value = Signal::new(Value::from("a"));

        binder.set_member(&element, "value", &live(&value));
        assert_eq!(element.member("value"), Value::from("a"));

        value.set(Value::from("b"));
        assert_eq!(element.member("value"), Value::from("b"));
        assert_eq!(effects.len(), 1);
    }

    #[test]
    fn text_children_follow_signal() {
        let (_effects, binder) = binder();
        let document = Document::new();
        let count = Signal::new(Value::Int(1));

        let text = binder
            .process_child(&document, RenderChild::Dynamic(count.accessor()))
            .unwrap();
        assert_eq!(text.text_content(), "1");

        count.set(Value::Int(2));
        assert_eq!(text.text_content(), "2");
    }

    #[test]
    fn live_declarations_touch_one_property() {
        let (_effects, binder) = binder();
        let element = Document::new().create_element("div").unwrap();
        let color = Signal::new("red".to_string());

        let style = StyleValue::Declarations(
            [
                ("fontSize".to_string(), Dynamic::Static("12px".to_string())),
                ("backgroundColor".to_string(), Dynamic::Reactive(color.accessor())),
                ("--accent".to_string(), Dynamic::Static("blue".to_string())),
            ]
            .into_iter()
            .collect(),
        );
        binder.set_style(&element, &style).unwrap();

        let declaration = element.style();
        assert_eq!(declaration.get_property_value("background-color"), "red");
        assert_eq!(declaration.get_property_value("font-size"), "12px");
        assert_eq!(declaration.get_property_value("--accent"), "blue");

        color.set("green".to_string());
        assert_eq!(declaration.get_property_value("background-color"), "green");
        assert_eq!(declaration.get_property_value("font-size"), "12px");
    }

    #[test]
    fn computed_style_drops_stale_keys() {
        let (_effects, binder) = binder();
        let element = Document::new().create_element("div").unwrap();
        let wide = Signal::new(true);
        let wide_reader = wide.clone();
        let computed = Accessor::new(move || {
            let mut map = StyleMap::new();
            if wide_reader.get() {
                map.insert("width".into(), "100%".into());
                map.insert("--gap".into(), "8px".into());
            } else {
                map.insert("height".into(), "1px".into());
            }
            map
        });

        binder.set_style(&element, &StyleValue::Computed(computed)).unwrap();
        assert_eq!(element.style().get_property_value("width"), "100%");

        wide.set(false);
        let declaration = element.style();
        assert_eq!(declaration.get_property_value("width"), "");
        assert_eq!(declaration.get_property_value("--gap"), "");
        assert_eq!(declaration.get_property_value("height"), "1px");
    }

    #[test]
    fn computed_style_blanks_kept_custom_key() {
        let (_effects, binder) = binder();
        let element = Document::new().create_element("div").unwrap();
        let accent = Signal::new("teal".to_string());
        let reader = accent.clone();
        let computed = Accessor::new(move || {
            let mut map = StyleMap::new();
            map.insert("--accent".into(), reader.get());
            map
        });

        binder.set_style(&element, &StyleValue::Computed(computed)).unwrap();
        assert_eq!(element.style().get_property_value("--accent"), "teal");

        accent.set(String::new());
        assert_eq!(element.style().get_property_value("--accent"), "");
    }

    #[test]
    fn clean_disposes_element_effects() {
        let (effects, binder) = binder();
        let document = Document::new();
        let element = document.create_element("input").unwrap();
        let title = Signal::new(Value::from("a"));
        let color = Signal::new("red".to_string());
        let label = Signal::new(Value::from("x"));

        binder.add_attr(&element, "title", &live(&title)).unwrap();
        binder.set_member(&element, "value", &live(&title));
        let style = StyleValue::Declarations(
            [("color".to_string(), Dynamic::Reactive(color.accessor()))]
                .into_iter()
                .collect(),
        );
        binder.set_style(&element, &style).unwrap();
        let text = binder
            .process_child(&document, RenderChild::Dynamic(label.accessor()))
            .unwrap();
        binder.adopt_children(&element, std::slice::from_ref(&text));
        assert_eq!(effects.len(), 4);

        element.clean();
        assert!(effects.is_empty());

        title.set(Value::from("b"));
        color.set("blue".to_string());
        label.set(Value::from("y"));
        assert_eq!(element.get_attribute("title").as_deref(), Some("a"));
        assert_eq!(element.member("value"), Value::from("a"));
        assert_eq!(element.style().get_property_value("color"), "red");
        assert_eq!(text.text_content(), "x");
    }

    #[test]
    fn external_scheduler_receives_effects() {
        let queued: Rc<RefCell<Vec<Box<dyn FnMut()>>>> = Rc::default();
        let sink = queued.clone();
        let scheduler = ExternalEffects::new(move |mut effect: Box<dyn FnMut()>| {
            effect();
            sink.borrow_mut().push(effect);
        });
        let binder = ReactiveBinder::new(Rc::new(scheduler));

        let element = Document::new().create_element("div").unwrap();
        let title = Rc::new(RefCell::new(Value::from("a")));
        let reader = title.clone();
        let value = Dynamic::Reactive(Accessor::new(move || reader.borrow().clone()));

        binder.add_attr(&element, "title", &value).unwrap();
        assert_eq!(queued.borrow().len(), 1);

        *title.borrow_mut() = Value::from("b");
        for effect in queued.borrow_mut().iter_mut() {
            effect();
        }
        assert_eq!(element.get_attribute("title").as_deref(), Some("b"));
    }

    #[test]
    fn disposed_effects_stop_updating() {
        let (effects, binder) = binder();
        let element = Document::new().create_element("div").unwrap();
        let title = Signal::new(Value::from("a"));

        binder.add_attr(&element, "title", &live(&title)).unwrap();
        effects.dispose_all();
        title.set(Value::from("b"));

        assert_eq!(element.get_attribute("title").as_deref(), Some("a"));
        assert!(effects.is_empty());
    }
}
