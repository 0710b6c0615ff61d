//! Error types.
//!
//! Every fallible operation in the crate returns [`HzoneError`]. Failures raised
//! by the host tree are kept as [`DomError`] and wrapped without translation, so
//! callers can still tell an illegal attribute operation apart from a dispatch miss.

use thiserror::Error;

use crate::dom::DomError;
use crate::render::RenderKind;

/// Errors produced while dispatching, normalizing props or building elements.
#[derive(Debug, Error)]
pub enum HzoneError {
    /// No renderer in the active zone accepted the tag.
    #[error("failed to capture an appropriate renderer for tag {tag}")]
    NoRenderer { tag: String },

    /// A zone was pushed by kind, but nothing with that kind was registered.
    #[error("renderer {0:?} was not registered")]
    UnregisteredRenderer(RenderKind),

    /// A renderer's `h` was called with a tag its `test` would have rejected.
    #[error("renderer cannot handle tag {tag}")]
    TagMismatch { tag: String },

    /// Fragments have no node identity to attach props to.
    #[error("fragments do not accept props")]
    FragmentProps,

    /// A spread group contained another spread group.
    #[error("children may only be nested one group deep")]
    NestedChildren,

    /// A reserved prop key held a value of the wrong kind.
    #[error("prop `{key}` expects {expected}")]
    PropType { key: String, expected: &'static str },

    /// An `exec:$<index>` key whose suffix is not an index.
    #[error("execute prop `{0}` does not end in a numeric index")]
    ExecuteIndex(String),

    #[error("missing required prop `{0}`")]
    MissingProp(&'static str),

    /// A child the renderer has no place for, such as a style rule inside a `div`.
    #[error("{renderer} cannot accept a {found} child")]
    UnexpectedChild {
        found: &'static str,
        renderer: &'static str,
    },

    /// A component generator returned something other than a node or a fragment.
    #[error("component returned a {0} instead of a node or fragment")]
    ComponentOutput(&'static str),

    #[error(transparent)]
    Dom(#[from] DomError),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, HzoneError>;
