#![allow(non_snake_case)]
//! # Descriptors to live nodes
//!
//! `trellis-dom` turns declarative node descriptors into a live tree held by
//! a [`Document`], and keeps that tree in step with the reactive values the
//! descriptors reference.
//!
//! ```rust
//! use trellis_core::signal;
//! use trellis_dom::*;
//!
//! let doc = Document::new();
//! let renderer = Renderer::new(doc.clone());
//!
//! let count = signal(0);
//! let view = Element("p")
//!     .id("counter")
//!     .text(dynamic({
//!         let count = count.clone();
//!         move || format!("count: {}", count.get())
//!     }));
//!
//! let mounted = renderer.render(view);
//! mounted.mount("body");
//! count.set(5);
//! assert_eq!(doc.to_html(mounted.node()), r#"<p id="counter">count: 5</p>"#);
//! ```
//!
//! Every reactive field gets its own watcher, so a change patches exactly
//! that field on the existing node. Presence (`dom_if`) and identity (`key`)
//! are the exceptions: changing either discards the node and synthesizes a
//! new one in its place.
//!
//! Keyed lists (`MapList`) compare each new snapshot of their source with the
//! previous one and rebuild all items when anything differs.

#![forbid(unsafe_code)]

pub mod descriptor;
pub mod diff;
pub mod dom;
pub mod error;
pub mod lifecycle;
pub mod list;
pub mod mountable;
pub mod normalize;
pub mod render;
pub mod style;
pub mod surface;
pub mod value;

pub use descriptor::*;
pub use diff::has_diff;
pub use dom::{Document, Event, Listener, ListenerId, ListenerOptions, NodeId, NodeKind};
pub use error::*;
pub use lifecycle::Pending;
pub use list::MapList;
pub use mountable::{Mountable, Target};
pub use normalize::{Child, Deferred, Normalized, normalize};
pub use render::{RenderConfig, Renderer};
pub use style::{Style, StyleSheet};
pub use surface::{SurfaceCtor, SurfaceRegistry};
pub use value::{Value, dynamic};
