//! Nodes, elements and attributes.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::ops::Deref;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;

use super::css::{CssStyleDeclaration, CssStyleSheet};
use super::{validate_name, DomError};
use crate::value::Value;

/// Callback receiving an element, used for init, execute and clean hooks.
pub type ElementCallback = Rc<dyn Fn(&Element)>;

/// Event listener callback.
pub type EventListener = Rc<dyn Fn(&Event)>;

/// Element namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Namespace {
    Html,
    Svg,
    Other(String),
}

impl Namespace {
    pub fn uri(&self) -> &str {
        match self {
            Namespace::Html => "http://www.w3.org/1999/xhtml",
            Namespace::Svg => "http://www.w3.org/2000/svg",
            Namespace::Other(uri) => uri,
        }
    }
}

/// What a [`Node`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Element,
    Text,
    Fragment,
}

/// Options accepted by [`Element::add_event_listener`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerOptions {
    pub capture: bool,
    pub once: bool,
    pub passive: bool,
}

/// An event delivered to listeners.
pub struct Event {
    kind: String,
    target: Element,
}

impl Event {
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn target(&self) -> &Element {
        &self.target
    }
}

struct Listener {
    kind: String,
    callback: EventListener,
    options: ListenerOptions,
}

pub(crate) struct NodeInner {
    parent: RefCell<Weak<NodeInner>>,
    children: RefCell<Vec<Node>>,
    data: NodeData,
}

enum NodeData {
    Element(ElementData),
    Text(RefCell<Option<String>>),
    Fragment,
}

struct ElementData {
    namespace: Namespace,
    local_name: String,
    attributes: RefCell<Vec<Attr>>,
    members: RefCell<IndexMap<String, Value>>,
    listeners: RefCell<Vec<Listener>>,
    style: CssStyleDeclaration,
    template_content: Option<Node>,
    shadow_root: RefCell<Option<Node>>,
    shadow_sheets: RefCell<Vec<CssStyleSheet>>,
    clean_hooks: RefCell<Vec<ElementCallback>>,
}

/// Handle to a node in the host tree.
#[derive(Clone)]
pub struct Node(Rc<NodeInner>);

impl Node {
    fn from_data(data: NodeData) -> Self {
        Self(Rc::new(NodeInner {
            parent: RefCell::new(Weak::new()),
            children: RefCell::new(Vec::new()),
            data,
        }))
    }

    pub(crate) fn new_text(text: &str) -> Self {
        Self::from_data(NodeData::Text(RefCell::new(Some(text.to_owned()))))
    }

    pub(crate) fn new_fragment() -> Self {
        Self::from_data(NodeData::Fragment)
    }

    pub(crate) fn new_element(namespace: Namespace, local_name: &str) -> Element {
        let template_content = (namespace == Namespace::Html && local_name == "template")
            .then(Node::new_fragment);

        Element(Self::from_data(NodeData::Element(ElementData {
            namespace,
            local_name: local_name.to_owned(),
            attributes: RefCell::new(Vec::new()),
            members: RefCell::new(IndexMap::new()),
            listeners: RefCell::new(Vec::new()),
            style: CssStyleDeclaration::default(),
            template_content,
            shadow_root: RefCell::new(None),
            shadow_sheets: RefCell::new(Vec::new()),
            clean_hooks: RefCell::new(Vec::new()),
        })))
    }

    pub fn kind(&self) -> NodeKind {
        match self.0.data {
            NodeData::Element(_) => NodeKind::Element,
            NodeData::Text(_) => NodeKind::Text,
            NodeData::Fragment => NodeKind::Fragment,
        }
    }

    /// Whether both handles refer to the same node.
    pub fn ptr_eq(&self, other: &Node) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn as_element(&self) -> Option<Element> {
        match self.0.data {
            NodeData::Element(_) => Some(Element(self.clone())),
            _ => None,
        }
    }

    pub fn parent(&self) -> Option<Node> {
        self.0.parent.borrow().upgrade().map(Node)
    }

    pub fn children(&self) -> Vec<Node> {
        self.0.children.borrow().clone()
    }

    /// Value of a text node. `None` for other node kinds.
    pub fn text_value(&self) -> Option<String> {
        match &self.0.data {
            NodeData::Text(value) => value.borrow().clone(),
            _ => None,
        }
    }

    /// Replace the value of a text node. Ignored for other node kinds.
    pub fn set_text_value(&self, text: Option<String>) {
        if let NodeData::Text(value) = &self.0.data {
            *value.borrow_mut() = text;
        }
    }

    /// Concatenated text of this node and its descendants.
    pub fn text_content(&self) -> String {
        match &self.0.data {
            NodeData::Text(value) => value.borrow().clone().unwrap_or_default(),
            _ => self
                .0
                .children
                .borrow()
                .iter()
                .map(Node::text_content)
                .collect(),
        }
    }

    /// Whether `other` is this node or one of its descendants.
    pub fn contains(&self, other: &Node) -> bool {
        let mut current = Some(other.clone());
        while let Some(node) = current {
            if node.ptr_eq(self) {
                return true;
            }
            current = node.parent();
        }
        false
    }

    /// Append `child` as the last child.
    ///
    /// A child that already has a parent is moved. Appending a fragment moves
    /// the fragment's children instead and leaves it empty.
    pub fn append(&self, child: &Node) -> Result<(), DomError> {
        if self.kind() == NodeKind::Text || child.contains(self) {
            return Err(DomError::HierarchyRequest);
        }

        if child.kind() == NodeKind::Fragment {
            let moved: Vec<Node> = child.0.children.borrow_mut().drain(..).collect();
            for node in moved {
                self.adopt(node);
            }
            return Ok(());
        }

        child.remove();
        self.adopt(child.clone());
        Ok(())
    }

    fn adopt(&self, child: Node) {
        *child.0.parent.borrow_mut() = Rc::downgrade(&self.0);
        self.0.children.borrow_mut().push(child);
    }

    /// Detach this node from its parent, if it has one.
    pub fn remove(&self) {
        let parent = self.0.parent.replace(Weak::new()).upgrade();
        if let Some(parent) = parent {
            parent.children.borrow_mut().retain(|node| !node.ptr_eq(self));
        }
    }

    /// Copy this node. A deep clone copies the subtree as well.
    ///
    /// Attributes, inline style and template content are copied. Members,
    /// listeners, hooks and shadow roots belong to the original only.
    pub fn clone_node(&self, deep: bool) -> Node {
        let copy = match &self.0.data {
            NodeData::Text(value) => {
                Node::from_data(NodeData::Text(RefCell::new(value.borrow().clone())))
            }
            NodeData::Fragment => Node::new_fragment(),
            NodeData::Element(data) => {
                let element = Node::new_element(data.namespace.clone(), &data.local_name);
                let element_data = element.data();
                for attr in data.attributes.borrow().iter() {
                    let copy = Attr::new(attr.name(), attr.value());
                    copy.set_owner(Some(&element));
                    element_data.attributes.borrow_mut().push(copy);
                }
                for name in data.style.property_names() {
                    let value = data.style.get_property_value(&name);
                    element_data.style.set_property(&name, &value);
                }
                if let (Some(source), Some(target)) =
                    (&data.template_content, &element_data.template_content)
                {
                    for child in source.children() {
                        target.adopt(child.clone_node(true));
                    }
                }
                element.0
            }
        };

        if deep {
            for child in self.children() {
                copy.adopt(child.clone_node(true));
            }
        }
        copy
    }

    /// Serialize the node and its descendants as markup.
    pub fn outer_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        match &self.0.data {
            NodeData::Text(value) => {
                out.push_str(&escape(value.borrow().as_deref().unwrap_or_default(), false));
            }
            NodeData::Fragment => {
                for child in self.0.children.borrow().iter() {
                    child.write_html(out);
                }
            }
            NodeData::Element(data) => {
                out.push('<');
                out.push_str(&data.local_name);
                for attr in data.attributes.borrow().iter() {
                    out.push(' ');
                    out.push_str(attr.name());
                    out.push_str("=\"");
                    out.push_str(&escape(&attr.value().unwrap_or_default(), true));
                    out.push('"');
                }
                out.push('>');
                if let Some(content) = &data.template_content {
                    content.write_html(out);
                }
                for child in self.0.children.borrow().iter() {
                    child.write_html(out);
                }
                out.push_str("</");
                out.push_str(&data.local_name);
                out.push('>');
            }
        }
    }
}

fn escape(text: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Node").field(&self.outer_html()).finish()
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

/// Handle to an element node.
#[derive(Clone, PartialEq)]
pub struct Element(Node);

impl Deref for Element {
    type Target = Node;

    fn deref(&self) -> &Node {
        &self.0
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        element.0
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Element").field(&self.outer_html()).finish()
    }
}

impl Element {
    fn data(&self) -> &ElementData {
        match &self.0 .0.data {
            NodeData::Element(data) => data,
            _ => unreachable!("element handles always wrap element nodes"),
        }
    }

    pub fn node(&self) -> &Node {
        &self.0
    }

    pub fn local_name(&self) -> &str {
        &self.data().local_name
    }

    pub fn namespace(&self) -> &Namespace {
        &self.data().namespace
    }

    // Attributes

    /// Set an attribute's value, creating the attribute node if needed.
    pub fn set_attribute(&self, name: &str, value: &str) -> Result<(), DomError> {
        if let Some(attr) = self.get_attribute_node(name) {
            attr.set_value(Some(value.to_owned()));
            return Ok(());
        }
        validate_name(name)?;
        let attr = Attr::new(name, Some(value.to_owned()));
        attr.set_owner(Some(self));
        self.data().attributes.borrow_mut().push(attr);
        Ok(())
    }

    pub fn get_attribute(&self, name: &str) -> Option<String> {
        self.get_attribute_node(name)
            .map(|attr| attr.value().unwrap_or_default())
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.get_attribute_node(name).is_some()
    }

    pub fn get_attribute_node(&self, name: &str) -> Option<Attr> {
        self.data()
            .attributes
            .borrow()
            .iter()
            .find(|attr| attr.name() == name)
            .cloned()
    }

    pub fn attributes(&self) -> Vec<Attr> {
        self.data().attributes.borrow().clone()
    }

    /// Attach an attribute node, replacing any attribute with the same name.
    ///
    /// Returns the replaced attribute. Attaching a node that is already
    /// attached here is a no-op; attaching one owned by another element fails.
    pub fn set_attribute_node(&self, attr: &Attr) -> Result<Option<Attr>, DomError> {
        if let Some(owner) = attr.owner_element() {
            if owner == *self {
                return Ok(None);
            }
            return Err(DomError::InUseAttribute(attr.name().to_owned()));
        }

        let mut attributes = self.data().attributes.borrow_mut();
        attr.set_owner(Some(self));
        match attributes.iter().position(|a| a.name() == attr.name()) {
            Some(index) => {
                let replaced = std::mem::replace(&mut attributes[index], attr.clone());
                replaced.set_owner(None);
                Ok(Some(replaced))
            }
            None => {
                attributes.push(attr.clone());
                Ok(None)
            }
        }
    }

    /// Detach an attribute node. The node keeps its identity and value.
    pub fn remove_attribute_node(&self, attr: &Attr) -> Result<Attr, DomError> {
        let mut attributes = self.data().attributes.borrow_mut();
        let index = attributes
            .iter()
            .position(|a| a.ptr_eq(attr))
            .ok_or(DomError::NotFound)?;
        let removed = attributes.remove(index);
        removed.set_owner(None);
        Ok(removed)
    }

    pub fn remove_attribute(&self, name: &str) -> Option<Attr> {
        let attr = self.get_attribute_node(name)?;
        self.remove_attribute_node(&attr).ok()
    }

    // Members

    /// Assign a member (a property of the element object, not an attribute).
    pub fn set_member(&self, key: &str, value: Value) {
        self.data().members.borrow_mut().insert(key.to_owned(), value);
    }

    /// Read a member, `Value::Null` when it was never assigned.
    pub fn member(&self, key: &str) -> Value {
        self.data()
            .members
            .borrow()
            .get(key)
            .cloned()
            .unwrap_or_default()
    }

    // Events

    /// Register a listener. Registering the same callback twice for the same
    /// event and capture phase is ignored.
    pub fn add_event_listener(&self, kind: &str, callback: EventListener, options: ListenerOptions) {
        let mut listeners = self.data().listeners.borrow_mut();
        let duplicate = listeners.iter().any(|listener| {
            listener.kind == kind
                && listener.options.capture == options.capture
                && Rc::ptr_eq(&listener.callback, &callback)
        });
        if !duplicate {
            listeners.push(Listener {
                kind: kind.to_owned(),
                callback,
                options,
            });
        }
    }

    pub fn listener_count(&self, kind: &str) -> usize {
        self.data()
            .listeners
            .borrow()
            .iter()
            .filter(|listener| listener.kind == kind)
            .count()
    }

    /// Invoke the listeners registered for `kind`, returning how many ran.
    pub fn dispatch_event(&self, kind: &str) -> usize {
        let callbacks: Vec<EventListener> = {
            let mut listeners = self.data().listeners.borrow_mut();
            let matching = listeners
                .iter()
                .filter(|listener| listener.kind == kind)
                .map(|listener| Rc::clone(&listener.callback))
                .collect();
            listeners.retain(|listener| !(listener.kind == kind && listener.options.once));
            matching
        };

        let event = Event {
            kind: kind.to_owned(),
            target: self.clone(),
        };
        for callback in &callbacks {
            callback(&event);
        }
        callbacks.len()
    }

    // Style, templates and shadow roots

    /// The element's inline style declaration.
    pub fn style(&self) -> CssStyleDeclaration {
        self.data().style.clone()
    }

    /// Content fragment of a `<template>` element.
    pub fn template_content(&self) -> Option<Node> {
        self.data().template_content.clone()
    }

    pub fn attach_shadow(&self) -> Result<Node, DomError> {
        let mut shadow = self.data().shadow_root.borrow_mut();
        if shadow.is_some() {
            return Err(DomError::ShadowRootExists);
        }
        let root = Node::new_fragment();
        *shadow = Some(root.clone());
        Ok(root)
    }

    pub fn shadow_root(&self) -> Option<Node> {
        self.data().shadow_root.borrow().clone()
    }

    pub fn adopt_shadow_style_sheet(&self, sheet: CssStyleSheet) {
        self.data().shadow_sheets.borrow_mut().push(sheet);
    }

    pub fn shadow_style_sheets(&self) -> Vec<CssStyleSheet> {
        self.data().shadow_sheets.borrow().clone()
    }

    // Cleanup

    pub fn add_clean_hook(&self, hook: ElementCallback) {
        self.data().clean_hooks.borrow_mut().push(hook);
    }

    /// Run and discard the clean hooks. Returns how many ran.
    ///
    /// Called by whoever permanently discards the element; the renderers never
    /// call it themselves.
    pub fn clean(&self) -> usize {
        let hooks = std::mem::take(&mut *self.data().clean_hooks.borrow_mut());
        for hook in &hooks {
            hook(self);
        }
        hooks.len()
    }
}

struct AttrInner {
    name: String,
    value: RefCell<Option<String>>,
    owner: RefCell<Weak<NodeInner>>,
    detached: Cell<bool>,
}

/// An attribute node.
#[derive(Clone)]
pub struct Attr(Rc<AttrInner>);

impl Attr {
    fn new(name: &str, value: Option<String>) -> Self {
        Self(Rc::new(AttrInner {
            name: name.to_owned(),
            value: RefCell::new(value),
            owner: RefCell::new(Weak::new()),
            detached: Cell::new(true),
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn value(&self) -> Option<String> {
        self.0.value.borrow().clone()
    }

    pub fn set_value(&self, value: Option<String>) {
        *self.0.value.borrow_mut() = value;
    }

    /// The element this attribute is attached to.
    pub fn owner_element(&self) -> Option<Element> {
        if self.0.detached.get() {
            return None;
        }
        self.0.owner.borrow().upgrade().map(|inner| Element(Node(inner)))
    }

    pub fn ptr_eq(&self, other: &Attr) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    fn set_owner(&self, owner: Option<&Element>) {
        match owner {
            Some(element) => {
                *self.0.owner.borrow_mut() = Rc::downgrade(&element.0 .0);
                self.0.detached.set(false);
            }
            None => {
                *self.0.owner.borrow_mut() = Weak::new();
                self.0.detached.set(true);
            }
        }
    }
}

impl PartialEq for Attr {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Attr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attr")
            .field("name", &self.name())
            .field("value", &self.value())
            .field("attached", &!self.0.detached.get())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
