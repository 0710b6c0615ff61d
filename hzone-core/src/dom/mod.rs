//! Host Tree
//!
//! A small, single-threaded element tree with the subset of browser DOM behaviour
//! the renderers rely on. Renderers only talk to the host through these types,
//! which keeps element construction testable without a browser.
//!
//! # Model
//!
//! - [`Node`] is a reference-counted handle. Cloning a handle never clones the
//!   node; use [`Node::clone_node`] for that.
//! - [`Element`] derefs to [`Node`] and adds attributes, members, listeners,
//!   inline style, shadow roots and clean hooks.
//! - [`Attr`] is a node with its own identity. A detached attribute keeps its
//!   identity and can be attached again with [`Element::set_attribute_node`].
//! - Attributes and members are separate stores. A member assignment never
//!   touches an attribute and vice versa.
//!
//! Host operations that the browser would reject return a [`DomError`].

mod css;
mod document;
mod node;

pub use css::{camel_to_kebab, CssStyleDeclaration, CssStyleRule, CssStyleSheet};
pub use document::{CustomElementDefinition, Document};
pub use node::{
    Attr, Element, ElementCallback, Event, EventListener, ListenerOptions, Namespace, Node,
    NodeKind,
};

use thiserror::Error;

/// Failures reported by host tree operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    #[error("`{0}` is not a valid name")]
    InvalidCharacter(String),

    #[error("attribute `{0}` is in use by another element")]
    InUseAttribute(String),

    #[error("the node is not attached where it was expected")]
    NotFound,

    #[error("the node cannot be inserted at this position")]
    HierarchyRequest,

    #[error("`{0}` is not a valid custom element name")]
    InvalidCustomElementName(String),

    #[error("custom element `{0}` has already been defined")]
    AlreadyDefined(String),

    #[error("the element already has a shadow root")]
    ShadowRootExists,
}

/// Element and attribute names may not be empty or contain markup characters.
pub(crate) fn validate_name(name: &str) -> Result<(), DomError> {
    let invalid = name.is_empty()
        || name
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '<' | '>' | '/' | '"' | '\'' | '='));
    if invalid {
        return Err(DomError::InvalidCharacter(name.to_owned()));
    }
    Ok(())
}
