//! Hzone Core
//!
//! Zone-scoped, pluggable hyperscript. A call such as
//! `zone.h("div", props, children)` is routed to one of several renderers,
//! picked per call from the tag and props:
//!
//! - Plain element creation, once-only
//! - Elements bound to live accessors through an effect scheduler
//! - Components, fragments and custom-element templates
//! - Style sheets built from `rule` children
//!
//! Zones switch the active set of renderers for a subtree, so an `<svg>`
//! subtree can be built by an SVG renderer inside an HTML document.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `zone`: the dispatcher and its zone stack
//! - `render`: the renderer contract, binders and the concrete renderers
//! - `props`: prop categories and the two input conventions
//! - `style`: applying declaration maps to elements and sheet rules
//! - `dom`: the in-memory host tree the renderers build
//! - `reactive`: a small signal engine driving reactive renderers
//! - `value`, `config`, `error`: shared types
//!
//! # Example
//!
//! ```rust,ignore
//! use hzone_core::prelude::*;
//!
//! let zone = HyperZone::new(Document::new(), HyperZoneConfig::default());
//! let html = zone.create_renderer_instance(HtmlRender::<ReactiveBinder>::from_zone);
//! zone.set_default_zone([html as Rc<dyn Render>]);
//!
//! let count = Signal::new(Value::Int(0));
//! let div = zone.h("div", Props::new().prop("id", "x"), [count.accessor().into()])?;
//! count.set(Value::Int(1));
//! // <div id="x">1</div>
//! ```

pub mod config;
pub mod dom;
pub mod error;
pub mod props;
pub mod reactive;
pub mod render;
pub mod style;
pub mod value;
pub mod zone;

pub use config::{DebugConfig, HyperZoneConfig};
pub use error::{HzoneError, Result};
pub use zone::{HyperZone, InlineHyperZone, ZoneGuard, ZoneSignal};

/// Everything needed to set up a zone and build with it.
pub mod prelude {
    pub use std::rc::Rc;

    pub use crate::config::HyperZoneConfig;
    pub use crate::dom::{Document, Element, Node};
    pub use crate::error::{HzoneError, Result};
    pub use crate::props::{InlineProps, Props, StyleValue};
    pub use crate::reactive::Signal;
    pub use crate::render::{
        Child, Component, ComponentRender, FragmentRender, HtmlRender, Output, ReactiveBinder,
        Render, StyleRuleRender, StyleSheetRender, SvgRender, Tag, TemplateRender, VanillaBinder,
    };
    pub use crate::value::{Accessor, Dynamic, Value};
    pub use crate::zone::{HyperZone, InlineHyperZone};
}
