//! Named surfaces: custom wrapper nodes that adopt realized content.
//!
//! A surface name must look like a custom element name: lowercase ASCII,
//! starting with a letter and containing at least one hyphen. The first
//! registration of a name wins.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::descriptor::SurfaceOptions;
use crate::dom::{Document, NodeId};
use crate::error::SurfaceError;

/// Called with the wrapper node each time a surface instance is created.
pub type SurfaceCtor = Rc<dyn Fn(&Document, NodeId)>;

#[derive(Clone, Default)]
pub struct SurfaceRegistry(Rc<RefCell<HashMap<String, Option<SurfaceCtor>>>>);

impl SurfaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `Ok(false)` if the name was already taken.
    pub fn register(&self, name: &str, ctor: Option<SurfaceCtor>) -> Result<bool, SurfaceError> {
        validate(name)?;
        let mut map = self.0.borrow_mut();
        if map.contains_key(name) {
            log::debug!("surface `{name}` already registered; keeping the first definition");
            return Ok(false);
        }
        map.insert(name.to_string(), ctor);
        Ok(true)
    }

    pub fn define(
        &self,
        name: &str,
        ctor: impl Fn(&Document, NodeId) + 'static,
    ) -> Result<bool, SurfaceError> {
        self.register(name, Some(Rc::new(ctor)))
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.0.borrow().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Wrap `node` in a new instance of the surface named in `options`,
    /// registering the name on first use. An invalid name leaves `node`
    /// unwrapped.
    pub(crate) fn adopt(&self, doc: &Document, options: &SurfaceOptions, node: NodeId) -> NodeId {
        let name = options.name.as_str();
        if let Err(err) = self.register(name, None) {
            log::warn!("{err}; content left unwrapped");
            return node;
        }
        let wrapper = doc.create_surface(name, options.shadow);
        let container = doc.shadow_root(wrapper).unwrap_or(wrapper);
        if let Err(err) = doc.append_child(container, node) {
            log::warn!("surface `{name}` could not adopt its content: {err}");
        }
        let ctor = self.0.borrow().get(name).cloned().flatten();
        if let Some(ctor) = ctor {
            ctor(doc, wrapper);
        }
        wrapper
    }
}

impl std::fmt::Debug for SurfaceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let map = self.0.borrow();
        let mut names: Vec<_> = map.keys().collect();
        names.sort();
        f.debug_struct("SurfaceRegistry").field("names", &names).finish()
    }
}

fn validate(name: &str) -> Result<(), SurfaceError> {
    let valid = name.starts_with(|c: char| c.is_ascii_lowercase())
        && name.contains('-')
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if valid {
        Ok(())
    } else {
        Err(SurfaceError::InvalidName(name.to_string()))
    }
}
