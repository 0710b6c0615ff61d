//! Style declarations, rules and sheets.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

/// Convert a camelCase style key into its dashed property name.
///
/// Custom properties (`--*`) and names that are already dashed are returned
/// unchanged.
pub fn camel_to_kebab(key: &str) -> String {
    if key.starts_with("--") {
        return key.to_owned();
    }
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[derive(Default)]
struct DeclarationInner {
    properties: IndexMap<String, String>,
    // Keys given to bulk assignment that the host does not apply.
    expandos: IndexMap<String, String>,
}

/// A style declaration block, either inline on an element or inside a rule.
#[derive(Clone, Default)]
pub struct CssStyleDeclaration(Rc<RefCell<DeclarationInner>>);

impl CssStyleDeclaration {
    /// Set a property by its dashed name. An empty value removes it.
    pub fn set_property(&self, name: &str, value: &str) {
        let mut inner = self.0.borrow_mut();
        if value.is_empty() {
            inner.properties.shift_remove(name);
        } else {
            inner.properties.insert(name.to_owned(), value.to_owned());
        }
    }

    /// The property's value, or the empty string when it is not set.
    pub fn get_property_value(&self, name: &str) -> String {
        self.0
            .borrow()
            .properties
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    /// Remove a property, returning its old value.
    pub fn remove_property(&self, name: &str) -> String {
        self.0
            .borrow_mut()
            .properties
            .shift_remove(name)
            .unwrap_or_default()
    }

    /// Bulk assignment of camelCase (or dashed) keys.
    ///
    /// This is object-style assignment: standard properties are applied, an
    /// empty value clears one, and custom properties are NOT applied. They end
    /// up as inert expandos, see [`expando_names`](Self::expando_names).
    pub fn assign<I, K, V>(&self, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut inner = self.0.borrow_mut();
        for (key, value) in entries {
            let (key, value) = (key.as_ref(), value.as_ref());
            if key.starts_with("--") {
                inner.expandos.insert(key.to_owned(), value.to_owned());
                continue;
            }
            let name = camel_to_kebab(key);
            if value.is_empty() {
                inner.properties.shift_remove(&name);
            } else {
                inner.properties.insert(name, value.to_owned());
            }
        }
    }

    /// Names of the applied properties, in insertion order.
    pub fn property_names(&self) -> Vec<String> {
        self.0.borrow().properties.keys().cloned().collect()
    }

    /// Keys that bulk assignment received but did not apply.
    pub fn expando_names(&self) -> Vec<String> {
        self.0.borrow().expandos.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().properties.is_empty()
    }

    pub fn css_text(&self) -> String {
        self.0
            .borrow()
            .properties
            .iter()
            .map(|(name, value)| format!("{name}: {value};"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn ptr_eq(&self, other: &CssStyleDeclaration) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for CssStyleDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CssStyleDeclaration")
            .field(&self.css_text())
            .finish()
    }
}

struct RuleInner {
    selector_text: RefCell<String>,
    style: CssStyleDeclaration,
}

/// A style rule: a selector and its declaration block.
#[derive(Clone)]
pub struct CssStyleRule(Rc<RuleInner>);

impl CssStyleRule {
    fn new(selector: &str) -> Self {
        Self(Rc::new(RuleInner {
            selector_text: RefCell::new(selector.to_owned()),
            style: CssStyleDeclaration::default(),
        }))
    }

    pub fn selector_text(&self) -> String {
        self.0.selector_text.borrow().clone()
    }

    pub fn set_selector_text(&self, selector: &str) {
        *self.0.selector_text.borrow_mut() = selector.to_owned();
    }

    pub fn style(&self) -> CssStyleDeclaration {
        self.0.style.clone()
    }

    pub fn css_text(&self) -> String {
        format!("{} {{ {} }}", self.selector_text(), self.0.style.css_text())
    }

    pub fn ptr_eq(&self, other: &CssStyleRule) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for CssStyleRule {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for CssStyleRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CssStyleRule").field(&self.css_text()).finish()
    }
}

/// An ordered list of style rules.
#[derive(Clone, Default)]
pub struct CssStyleSheet(Rc<RefCell<Vec<CssStyleRule>>>);

impl CssStyleSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an empty rule for `selector` and return it.
    pub fn insert_rule(&self, selector: &str) -> CssStyleRule {
        let rule = CssStyleRule::new(selector);
        self.0.borrow_mut().push(rule.clone());
        rule
    }

    pub fn rules(&self) -> Vec<CssStyleRule> {
        self.0.borrow().clone()
    }

    /// First rule whose selector text equals `selector`.
    pub fn find(&self, selector: &str) -> Option<CssStyleRule> {
        self.0
            .borrow()
            .iter()
            .find(|rule| rule.selector_text() == selector)
            .cloned()
    }

    pub fn remove_rule(&self, rule: &CssStyleRule) -> bool {
        let mut rules = self.0.borrow_mut();
        let before = rules.len();
        rules.retain(|r| !r.ptr_eq(rule));
        rules.len() != before
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn css_text(&self) -> String {
        self.0
            .borrow()
            .iter()
            .map(CssStyleRule::css_text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn ptr_eq(&self, other: &CssStyleSheet) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for CssStyleSheet {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for CssStyleSheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CssStyleSheet").field(&self.css_text()).finish()
    }
}
