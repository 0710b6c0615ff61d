//! Style sheet and style rule renderers.
//!
//! ```rust,ignore
//! let sheet = zone.h("css", Props::new().prop("global", true), [
//!     zone.h("rule", Props::new().prop("selector", "p").prop("color", "red"), []).into(),
//! ])?;
//! ```
//!
//! A `rule` produces a [`StyleRule`] value and a `css` collects the rules it
//! is given as children into a fresh sheet.

use super::{Output, Render, RenderChild, RenderKind, StyleRule, Tag};
use crate::dom::Document;
use crate::error::{HzoneError, Result};
use crate::props::{PropValue, Props, StyleMap};
use crate::style::DynamicStyleSheet;
use crate::zone::HyperZone;

/// Renders `css` into a [`CssStyleSheet`](crate::dom::CssStyleSheet).
///
/// With `global`, the sheet is also adopted by the document.
#[derive(Debug)]
pub struct StyleSheetRender {
    kind: RenderKind,
    document: Document,
}

impl StyleSheetRender {
    pub fn new(document: Document) -> Self {
        Self {
            kind: RenderKind::unique(),
            document,
        }
    }

    pub fn from_zone(zone: &HyperZone) -> Self {
        Self::new(zone.document().clone())
    }
}

impl Render for StyleSheetRender {
    fn kind(&self) -> RenderKind {
        self.kind
    }

    fn test(&self, tag: &Tag, _props: &Props) -> bool {
        tag.is_element("css")
    }

    fn h(&self, tag: &Tag, mut props: Props, children: Vec<RenderChild>) -> Result<Output> {
        if !tag.is_element("css") {
            return Err(HzoneError::TagMismatch {
                tag: tag.to_string(),
            });
        }
        let global = props.take_flag("global")?;

        let mut sheet = DynamicStyleSheet::default();
        for child in children {
            match child {
                RenderChild::Rule(rule) => {
                    sheet.set_rule(&rule.selector, &rule.declarations);
                }
                blank if blank.is_blank_text() => {}
                other => {
                    return Err(HzoneError::UnexpectedChild {
                        found: other.kind_name(),
                        renderer: "css",
                    })
                }
            }
        }

        let sheet = sheet.sheet().clone();
        if global {
            self.document.adopt_style_sheet(sheet.clone());
        }
        Ok(Output::Sheet(sheet))
    }
}

/// Renders `rule`: a `selector` prop plus declarations from the other
/// top-level props.
#[derive(Debug)]
pub struct StyleRuleRender {
    kind: RenderKind,
}

impl StyleRuleRender {
    pub fn new() -> Self {
        Self {
            kind: RenderKind::unique(),
        }
    }

    pub fn from_zone(_zone: &HyperZone) -> Self {
        Self::new()
    }
}

impl Default for StyleRuleRender {
    fn default() -> Self {
        Self::new()
    }
}

impl Render for StyleRuleRender {
    fn kind(&self) -> RenderKind {
        self.kind
    }

    fn test(&self, tag: &Tag, _props: &Props) -> bool {
        tag.is_element("rule")
    }

    fn h(&self, tag: &Tag, mut props: Props, children: Vec<RenderChild>) -> Result<Output> {
        if !tag.is_element("rule") {
            return Err(HzoneError::TagMismatch {
                tag: tag.to_string(),
            });
        }
        if let Some(child) = children.iter().find(|child| !child.is_blank_text()) {
            return Err(HzoneError::UnexpectedChild {
                found: child.kind_name(),
                renderer: "rule",
            });
        }

        let selector = props
            .take_text("selector")?
            .ok_or(HzoneError::MissingProp("selector"))?;

        let mut declarations = StyleMap::with_capacity(props.rest.len());
        for (key, value) in props.rest {
            let PropValue::Value(value) = value else {
                return Err(HzoneError::PropType {
                    key,
                    expected: "a declaration value",
                });
            };
            declarations.insert(key, value.get().stringify().unwrap_or_default());
        }

        Ok(Output::Rule(StyleRule {
            selector,
            declarations,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(selector: &str, declarations: &[(&str, &str)]) -> RenderChild {
        RenderChild::Rule(StyleRule {
            selector: selector.into(),
            declarations: declarations
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        })
    }

    #[test]
    fn rule_collects_declarations() {
        let output = StyleRuleRender::new()
            .h(
                &"rule".into(),
                Props::new()
                    .prop("selector", ".card")
                    .prop("backgroundColor", "red")
                    .prop("--gap", "4px"),
                Vec::new(),
            )
            .unwrap();

        let Output::Rule(rule) = output else {
            panic!("expected a rule");
        };
        assert_eq!(rule.selector, ".card");
        assert_eq!(rule.declarations["backgroundColor"], "red");
        assert_eq!(rule.declarations["--gap"], "4px");
    }

    #[test]
    fn rule_requires_selector() {
        let err = StyleRuleRender::new()
            .h(&"rule".into(), Props::new().prop("color", "red"), Vec::new())
            .unwrap_err();
        assert!(matches!(err, HzoneError::MissingProp("selector")));
    }

    #[test]
    fn rule_rejects_content() {
        let err = StyleRuleRender::new()
            .h(
                &"rule".into(),
                Props::new().prop("selector", "p"),
                vec![RenderChild::Text("color: red".into())],
            )
            .unwrap_err();
        assert!(matches!(err, HzoneError::UnexpectedChild { renderer: "rule", .. }));
    }

    #[test]
    fn sheet_collects_rules() {
        let document = Document::new();
        let css = StyleSheetRender::new(document.clone());

        let sheet = css
            .h(
                &"css".into(),
                Props::new(),
                vec![
                    rule("p", &[("color", "red")]),
                    RenderChild::Text("\n  ".into()),
                    rule(".x", &[("--size", "2px"), ("marginTop", "var(--size)")]),
                ],
            )
            .unwrap()
            .into_sheet()
            .unwrap();

        assert_eq!(
            sheet.css_text(),
            "p { color: red; }\n.x { --size: 2px; margin-top: var(--size); }"
        );
        assert!(document.adopted_style_sheets().is_empty());
    }

    #[test]
    fn global_sheets_are_adopted() {
        let document = Document::new();
        let sheet = StyleSheetRender::new(document.clone())
            .h(
                &"css".into(),
                Props::new().prop("global", true),
                vec![rule("body", &[("margin", "0")])],
            )
            .unwrap()
            .into_sheet()
            .unwrap();

        assert_eq!(document.adopted_style_sheets(), vec![sheet]);
    }

    #[test]
    fn sheet_rejects_nodes() {
        let document = Document::new();
        let err = StyleSheetRender::new(document.clone())
            .h(
                &"css".into(),
                Props::new(),
                vec![RenderChild::Node(document.create_text_node("x"))],
            )
            .unwrap_err();

        assert!(matches!(err, HzoneError::UnexpectedChild { found: "node", renderer: "css" }));
    }
}
