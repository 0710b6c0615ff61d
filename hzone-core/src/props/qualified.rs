//! Qualified-key normalization.

use indexmap::IndexMap;

use super::{PropValue, Props, StyleValue};
use crate::value::Value;

/// Fold attribute shorthand into the attribute bag.
///
/// Every `rest` entry holding a plain value becomes an attribute. On a key
/// collision the explicit `attrs` entry wins, while the shorthand keeps its
/// position. Other `rest` entries stay where they are. A string style is
/// moved to the `style` attribute unless an explicit one exists.
///
/// Applying the function to its own output changes nothing.
///
/// ```rust,ignore
/// let props = normalize_attr_props(Some(
///     Props::new().prop("width", 50).prop("height", 30).attr("height", 40),
/// ));
/// // attrs: width = 50, height = 40
/// ```
pub fn normalize_attr_props(props: Option<Props>) -> Props {
    let mut props = props.unwrap_or_default();
    let explicit = std::mem::take(&mut props.attrs);
    let rest = std::mem::take(&mut props.rest);

    let mut attrs = IndexMap::with_capacity(explicit.len() + rest.len());
    for (key, value) in rest {
        match value {
            PropValue::Value(value) => {
                attrs.insert(key, value);
            }
            other => {
                props.rest.insert(key, other);
            }
        }
    }
    attrs.extend(explicit);

    if matches!(props.style, Some(StyleValue::Text(_))) {
        if let Some(StyleValue::Text(text)) = props.style.take() {
            attrs
                .entry("style".to_owned())
                .or_insert_with(|| text.map(Value::Str));
        }
    }

    props.attrs = attrs;
    props
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::CssStyleSheet;
    use crate::value::Dynamic;

    fn attr_pairs(props: &Props) -> Vec<(String, Value)> {
        props
            .attrs
            .iter()
            .map(|(key, value)| (key.clone(), value.get()))
            .collect()
    }

    #[test]
    fn absent_props_normalize_to_empty() {
        assert!(normalize_attr_props(None).is_empty());
    }

    #[test]
    fn explicit_attrs_win_over_shorthand() {
        let props = normalize_attr_props(Some(
            Props::new()
                .prop("width", 50)
                .prop("height", 30)
                .attr("height", 40)
                .attr("style", "background-color: red;"),
        ));

        assert_eq!(
            attr_pairs(&props),
            vec![
                ("width".into(), Value::Int(50)),
                ("height".into(), Value::Int(40)),
                ("style".into(), Value::from("background-color: red;")),
            ]
        );
        assert!(props.rest.is_empty());
    }

    #[test]
    fn non_value_shorthand_stays_in_rest() {
        let props = normalize_attr_props(Some(
            Props::new().prop("sheets", Vec::<CssStyleSheet>::new()).prop("id", "x"),
        ));

        assert!(props.rest.contains_key("sheets"));
        assert_eq!(props.attrs.len(), 1);
    }

    #[test]
    fn string_style_becomes_attribute() {
        let props = normalize_attr_props(Some(Props::new().style("color: blue;")));
        assert_eq!(props.style, None);
        assert_eq!(props.attrs["style"], Dynamic::Static(Value::from("color: blue;")));

        let explicit = normalize_attr_props(Some(
            Props::new().style("color: blue;").attr("style", "color: green;"),
        ));
        assert_eq!(explicit.attrs["style"], Dynamic::Static(Value::from("color: green;")));
    }

    #[test]
    fn declaration_style_is_kept() {
        let props = normalize_attr_props(Some(
            Props::new().style(StyleValue::declarations([("color", "red")])),
        ));
        assert!(matches!(props.style, Some(StyleValue::Declarations(_))));
        assert!(props.attrs.is_empty());
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = normalize_attr_props(Some(
            Props::new()
                .prop("width", 50)
                .prop("hook", crate::props::ElementHook::new(|_| {}))
                .attr("width", 60)
                .member("value", "v")
                .style("color: red;")
                .init(|_| {}),
        ));
        let twice = normalize_attr_props(Some(once.clone()));

        assert_eq!(once, twice);
    }
}
