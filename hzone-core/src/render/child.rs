//! Children as passed to the dispatcher and as seen by renderers.

use super::{Output, StyleRule};
use crate::dom::{Element, Node};
use crate::error::Result;
use crate::value::{Accessor, Value};
use crate::zone::ZoneSignal;

/// A child argument of a dispatcher call.
///
/// Besides real content this can be a spread [`Group`](Child::Group), a zone
/// sentinel or a [`Missing`](Child::Missing) subtree whose construction
/// failed. The dispatcher removes the last two and splices groups before any
/// renderer sees the children.
#[derive(Debug, Clone, PartialEq)]
pub enum Child {
    Node(Node),
    Text(String),
    /// Text kept in sync with an accessor by reactive renderers.
    Dynamic(Accessor<Value>),
    Rule(StyleRule),
    Group(Vec<Child>),
    Zone(ZoneSignal),
    Missing,
}

impl From<&str> for Child {
    fn from(text: &str) -> Self {
        Child::Text(text.to_owned())
    }
}

impl From<String> for Child {
    fn from(text: String) -> Self {
        Child::Text(text)
    }
}

impl From<Node> for Child {
    fn from(node: Node) -> Self {
        Child::Node(node)
    }
}

impl From<Element> for Child {
    fn from(element: Element) -> Self {
        Child::Node(element.into())
    }
}

impl From<Accessor<Value>> for Child {
    fn from(accessor: Accessor<Value>) -> Self {
        Child::Dynamic(accessor)
    }
}

impl From<StyleRule> for Child {
    fn from(rule: StyleRule) -> Self {
        Child::Rule(rule)
    }
}

impl From<ZoneSignal> for Child {
    fn from(signal: ZoneSignal) -> Self {
        Child::Zone(signal)
    }
}

impl From<Vec<Child>> for Child {
    fn from(children: Vec<Child>) -> Self {
        Child::Group(children)
    }
}

impl From<Output> for Child {
    fn from(output: Output) -> Self {
        match output {
            Output::Node(node) => Child::Node(node),
            Output::Fragment(nodes) => Child::Group(nodes.into_iter().map(Child::Node).collect()),
            Output::Rule(rule) => Child::Rule(rule),
            Output::Sheet(_) => {
                tracing::warn!("a style sheet cannot be a child node, dropping it");
                Child::Missing
            }
        }
    }
}

impl From<RenderChild> for Child {
    fn from(child: RenderChild) -> Self {
        match child {
            RenderChild::Node(node) => Child::Node(node),
            RenderChild::Text(text) => Child::Text(text),
            RenderChild::Dynamic(accessor) => Child::Dynamic(accessor),
            RenderChild::Rule(rule) => Child::Rule(rule),
        }
    }
}

/// A failed subtree becomes [`Child::Missing`], leaving its siblings intact.
impl From<Result<Output>> for Child {
    fn from(result: Result<Output>) -> Self {
        match result {
            Ok(output) => output.into(),
            Err(err) => {
                tracing::warn!(error = %err, "dropping child that failed to render");
                Child::Missing
            }
        }
    }
}

/// A child after flattening, as handed to [`Render::h`](super::Render::h).
#[derive(Debug, Clone, PartialEq)]
pub enum RenderChild {
    Node(Node),
    Text(String),
    Dynamic(Accessor<Value>),
    Rule(StyleRule),
}

impl RenderChild {
    pub fn kind_name(&self) -> &'static str {
        match self {
            RenderChild::Node(_) => "node",
            RenderChild::Text(_) => "text",
            RenderChild::Dynamic(_) => "dynamic text",
            RenderChild::Rule(_) => "style rule",
        }
    }

    /// Text made only of whitespace, which container renderers may skip.
    pub fn is_blank_text(&self) -> bool {
        matches!(self, RenderChild::Text(text) if text.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HzoneError;

    #[test]
    fn fragments_become_groups() {
        let a = Node::new_text("a");
        let child = Child::from(Output::Fragment(vec![a.clone()]));

        assert_eq!(child, Child::Group(vec![Child::Node(a)]));
    }

    #[test]
    fn failures_become_missing() {
        let failed: Result<Output> = Err(HzoneError::NoRenderer { tag: "x".into() });
        assert_eq!(Child::from(failed), Child::Missing);
    }

    #[test]
    fn blank_text() {
        assert!(RenderChild::Text(" \n\t".into()).is_blank_text());
        assert!(!RenderChild::Text(" a ".into()).is_blank_text());
    }
}
