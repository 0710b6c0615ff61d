//! Style Controller
//!
//! [`DynamicStylable`] applies and clears declaration maps on anything with a
//! style declaration: an element's inline style or a sheet rule. Custom
//! properties (`--*`) always go through `set_property`, because bulk
//! assignment does not apply them. Everything else goes through one bulk
//! assignment.
//!
//! [`DynamicStyleSheet`] keeps one controller per selector of a sheet.

use indexmap::IndexMap;

use crate::dom::{CssStyleDeclaration, CssStyleRule, CssStyleSheet, Element};
use crate::props::StyleMap;

/// Something with a style declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleTarget {
    Element(Element),
    Rule(CssStyleRule),
}

impl StyleTarget {
    pub fn style(&self) -> CssStyleDeclaration {
        match self {
            StyleTarget::Element(element) => element.style(),
            StyleTarget::Rule(rule) => rule.style(),
        }
    }
}

impl From<Element> for StyleTarget {
    fn from(element: Element) -> Self {
        StyleTarget::Element(element)
    }
}

impl From<CssStyleRule> for StyleTarget {
    fn from(rule: CssStyleRule) -> Self {
        StyleTarget::Rule(rule)
    }
}

/// Applies declaration maps to a [`StyleTarget`].
#[derive(Debug, Clone)]
pub struct DynamicStylable {
    target: StyleTarget,
}

impl DynamicStylable {
    pub fn new(target: impl Into<StyleTarget>) -> Self {
        Self {
            target: target.into(),
        }
    }

    pub fn target(&self) -> &StyleTarget {
        &self.target
    }

    /// Apply `style`. An empty custom property value removes the property.
    pub fn set_style(&self, style: &StyleMap) {
        let declaration = self.target.style();
        let (custom, standard): (Vec<_>, Vec<_>) =
            style.iter().partition(|(key, _)| key.starts_with("--"));

        for (key, value) in custom {
            declaration.set_property(key, value);
        }
        declaration.assign(standard);
    }

    /// Remove custom properties and blank every standard property.
    pub fn clear_style(&self) {
        let declaration = self.target.style();
        let mut blanks = Vec::new();
        for name in declaration.property_names() {
            if name.starts_with("--") {
                declaration.remove_property(&name);
            } else {
                blanks.push((name, ""));
            }
        }
        declaration.assign(blanks);
    }
}

/// A sheet with one style controller per selector.
#[derive(Debug, Clone)]
pub struct DynamicStyleSheet {
    sheet: CssStyleSheet,
    stylables: IndexMap<String, DynamicStylable>,
}

impl Default for DynamicStyleSheet {
    fn default() -> Self {
        Self::new(CssStyleSheet::new())
    }
}

impl DynamicStyleSheet {
    /// Wrap `sheet`, indexing the rules it already has.
    pub fn new(sheet: CssStyleSheet) -> Self {
        let stylables = sheet
            .rules()
            .into_iter()
            .map(|rule| (rule.selector_text(), DynamicStylable::new(rule)))
            .collect();
        Self { sheet, stylables }
    }

    pub fn sheet(&self) -> &CssStyleSheet {
        &self.sheet
    }

    pub fn get_rule(&self, selector: &str) -> Option<&DynamicStylable> {
        self.stylables.get(selector)
    }

    /// Apply `style` to the rule for `selector`, appending an empty rule to
    /// the sheet the first time the selector is seen.
    pub fn set_rule(&mut self, selector: &str, style: &StyleMap) -> &DynamicStylable {
        let sheet = &self.sheet;
        let controller = self
            .stylables
            .entry(selector.to_owned())
            .or_insert_with(|| DynamicStylable::new(sheet.insert_rule(selector)));
        controller.set_style(style);
        controller
    }

    /// Clear the rule for `selector` and drop it from the sheet.
    ///
    /// Returns whether the selector was known.
    pub fn del_rule(&mut self, selector: &str) -> bool {
        let Some(controller) = self.stylables.shift_remove(selector) else {
            return false;
        };
        controller.clear_style();
        if let StyleTarget::Rule(rule) = controller.target() {
            self.sheet.remove_rule(rule);
        }
        true
    }

    /// Change a rule's selector. The controller stays the same object.
    pub fn rename_selector(&mut self, selector: &str, new_selector: &str) -> Option<&DynamicStylable> {
        let controller = self.stylables.shift_remove(selector)?;
        if let StyleTarget::Rule(rule) = controller.target() {
            rule.set_selector_text(new_selector);
        }
        self.stylables.insert(new_selector.to_owned(), controller);
        self.stylables.get(new_selector)
    }
}
