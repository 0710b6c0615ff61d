//! Child flattening.

use crate::error::{HzoneError, Result};
use crate::render::{Child, RenderChild};

fn settle(child: Child) -> Option<RenderChild> {
    match child {
        Child::Node(node) => Some(RenderChild::Node(node)),
        Child::Text(text) => Some(RenderChild::Text(text)),
        Child::Dynamic(accessor) => Some(RenderChild::Dynamic(accessor)),
        Child::Rule(rule) => Some(RenderChild::Rule(rule)),
        Child::Zone(_) | Child::Missing | Child::Group(_) => None,
    }
}

/// Splice groups one level deep and drop zone sentinels and missing
/// subtrees. A group inside a group is an error.
pub fn flatten_children<I>(children: I) -> Result<Vec<RenderChild>>
where
    I: IntoIterator<Item = Child>,
{
    let children = children.into_iter();
    let mut out = Vec::with_capacity(children.size_hint().0);
    for child in children {
        match child {
            Child::Group(group) => {
                for inner in group {
                    if matches!(inner, Child::Group(_)) {
                        return Err(HzoneError::NestedChildren);
                    }
                    out.extend(settle(inner));
                }
            }
            other => out.extend(settle(other)),
        }
    }
    Ok(out)
}
