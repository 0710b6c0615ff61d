//! Document: node factory, custom element registry and global sheets.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use super::css::CssStyleSheet;
use super::node::{Element, Namespace, Node};
use super::{validate_name, DomError};

const RESERVED_CUSTOM_NAMES: [&str; 8] = [
    "annotation-xml",
    "color-profile",
    "font-face",
    "font-face-src",
    "font-face-uri",
    "font-face-format",
    "font-face-name",
    "missing-glyph",
];

/// A custom element backed by template content.
///
/// Every instance gets a shadow root holding a clone of `content` and adopts
/// `sheets`. With `extends`, the definition upgrades a built-in element
/// created with a matching `is` value instead of an autonomous element.
#[derive(Debug, Clone)]
pub struct CustomElementDefinition {
    pub content: Node,
    pub shallow: bool,
    pub sheets: Vec<CssStyleSheet>,
    pub extends: Option<String>,
}

#[derive(Default)]
struct DocumentInner {
    definitions: RefCell<IndexMap<String, CustomElementDefinition>>,
    adopted_style_sheets: RefCell<Vec<CssStyleSheet>>,
}

/// Entry point for creating nodes.
#[derive(Clone, Default)]
pub struct Document(Rc<DocumentInner>);

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an HTML element. Defined autonomous custom elements are upgraded.
    pub fn create_element(&self, local_name: &str) -> Result<Element, DomError> {
        validate_name(local_name)?;
        let element = Node::new_element(Namespace::Html, local_name);

        let definition = self
            .0
            .definitions
            .borrow()
            .get(local_name)
            .filter(|definition| definition.extends.is_none())
            .cloned();
        if let Some(definition) = definition {
            upgrade(&element, &definition)?;
        }
        Ok(element)
    }

    pub fn create_element_ns(
        &self,
        namespace: Namespace,
        local_name: &str,
    ) -> Result<Element, DomError> {
        if namespace == Namespace::Html {
            return self.create_element(local_name);
        }
        validate_name(local_name)?;
        Ok(Node::new_element(namespace, local_name))
    }

    /// Create a built-in element customized by the definition named `is`.
    pub fn create_customized_element(
        &self,
        local_name: &str,
        is: &str,
    ) -> Result<Element, DomError> {
        let element = self.create_element(local_name)?;
        element.set_attribute("is", is)?;

        let definition = self
            .0
            .definitions
            .borrow()
            .get(is)
            .filter(|definition| definition.extends.as_deref() == Some(local_name))
            .cloned();
        if let Some(definition) = definition {
            upgrade(&element, &definition)?;
        }
        Ok(element)
    }

    pub fn create_text_node(&self, text: &str) -> Node {
        Node::new_text(text)
    }

    pub fn create_document_fragment(&self) -> Node {
        Node::new_fragment()
    }

    /// Register a custom element definition.
    pub fn define(&self, name: &str, definition: CustomElementDefinition) -> Result<(), DomError> {
        if !is_valid_custom_element_name(name) {
            return Err(DomError::InvalidCustomElementName(name.to_owned()));
        }
        let mut definitions = self.0.definitions.borrow_mut();
        if definitions.contains_key(name) {
            return Err(DomError::AlreadyDefined(name.to_owned()));
        }
        definitions.insert(name.to_owned(), definition);
        tracing::debug!(name, "defined custom element");
        Ok(())
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.0.definitions.borrow().contains_key(name)
    }

    /// Make a sheet apply to the whole document.
    pub fn adopt_style_sheet(&self, sheet: CssStyleSheet) {
        self.0.adopted_style_sheets.borrow_mut().push(sheet);
    }

    pub fn adopted_style_sheets(&self) -> Vec<CssStyleSheet> {
        self.0.adopted_style_sheets.borrow().clone()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("defined", &self.0.definitions.borrow().keys().collect::<Vec<_>>())
            .field("adopted_style_sheets", &self.0.adopted_style_sheets.borrow().len())
            .finish()
    }
}

fn upgrade(element: &Element, definition: &CustomElementDefinition) -> Result<(), DomError> {
    let shadow = element.attach_shadow()?;
    for sheet in &definition.sheets {
        element.adopt_shadow_style_sheet(sheet.clone());
    }
    shadow.append(&definition.content.clone_node(!definition.shallow))
}

fn is_valid_custom_element_name(name: &str) -> bool {
    let starts_lowercase = name.chars().next().is_some_and(|c| c.is_ascii_lowercase());
    let allowed = name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '.' | '_'));
    starts_lowercase && allowed && name.contains('-') && !RESERVED_CUSTOM_NAMES.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template_with_text(document: &Document, text: &str) -> Node {
        let content = document.create_document_fragment();
        let span = document.create_element("span").unwrap();
        span.append(&document.create_text_node(text)).unwrap();
        content.append(&span).unwrap();
        content
    }

    #[test]
    fn custom_element_names() {
        assert!(is_valid_custom_element_name("my-card"));
        assert!(is_valid_custom_element_name("x-1.2"));
        assert!(!is_valid_custom_element_name("card"));
        assert!(!is_valid_custom_element_name("My-card"));
        assert!(!is_valid_custom_element_name("font-face"));
    }

    #[test]
    fn template_elements_have_content() {
        let document = Document::new();
        let template = document.create_element("template").unwrap();
        let div = document.create_element("div").unwrap();

        assert!(template.template_content().is_some());
        assert!(div.template_content().is_none());
    }

    #[test]
    fn defined_elements_are_upgraded() {
        let document = Document::new();
        let sheet = CssStyleSheet::new();
        document
            .define(
                "my-card",
                CustomElementDefinition {
                    content: template_with_text(&document, "card"),
                    shallow: false,
                    sheets: vec![sheet.clone()],
                    extends: None,
                },
            )
            .unwrap();

        let first = document.create_element("my-card").unwrap();
        let second = document.create_element("my-card").unwrap();

        let shadow = first.shadow_root().unwrap();
        assert_eq!(shadow.outer_html(), "<span>card</span>");
        assert_eq!(first.shadow_style_sheets(), vec![sheet]);
        // Each instance gets its own copy
        assert!(!shadow.children()[0].ptr_eq(&second.shadow_root().unwrap().children()[0]));
    }

    #[test]
    fn customized_builtins_need_matching_base() {
        let document = Document::new();
        document
            .define(
                "fancy-button",
                CustomElementDefinition {
                    content: template_with_text(&document, "fancy"),
                    shallow: false,
                    sheets: Vec::new(),
                    extends: Some("button".into()),
                },
            )
            .unwrap();

        let button = document.create_customized_element("button", "fancy-button").unwrap();
        let div = document.create_customized_element("div", "fancy-button").unwrap();

        assert!(button.shadow_root().is_some());
        assert!(div.shadow_root().is_none());
        assert_eq!(button.get_attribute("is").as_deref(), Some("fancy-button"));
    }

    #[test]
    fn duplicate_definitions_fail() {
        let document = Document::new();
        let definition = CustomElementDefinition {
            content: document.create_document_fragment(),
            shallow: true,
            sheets: Vec::new(),
            extends: None,
        };

        document.define("my-el", definition.clone()).unwrap();
        assert_eq!(
            document.define("my-el", definition.clone()),
            Err(DomError::AlreadyDefined("my-el".into()))
        );
        assert_eq!(
            document.define("nodash", definition),
            Err(DomError::InvalidCustomElementName("nodash".into()))
        );
    }
}
