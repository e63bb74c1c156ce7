#![allow(non_snake_case)]
//! Node descriptors: UI described as data.
//!
//! ```rust
//! use trellis_core::signal;
//! use trellis_dom::*;
//!
//! let count = signal(0);
//! let label = count.clone();
//! let view = Element("button")
//!     .class("primary")
//!     .text(dynamic(move || format!("clicked {} times", label.get())))
//!     .on("click", move |_| count.update(|n| *n += 1));
//! # let _ = view;
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::dom::{Event, Listener, ListenerOptions, NodeId};
use crate::lifecycle::Pending;
use crate::list::MapList;
use crate::normalize::Child;
use crate::style::{Style, StyleSheet};
use crate::value::Value;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Tag {
    Element(String),
    Text,
    Comment,
    Fragment,
}

impl From<&str> for Tag {
    fn from(tag: &str) -> Self {
        match tag {
            "text" => Tag::Text,
            "comment" => Tag::Comment,
            "fragment" => Tag::Fragment,
            other => Tag::Element(other.to_ascii_lowercase()),
        }
    }
}

#[derive(Clone)]
pub struct Binding {
    pub event: String,
    pub options: ListenerOptions,
    pub handler: Listener,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SurfaceOptions {
    pub name: String,
    pub shadow: bool,
}

#[derive(Clone, Default)]
pub struct Hooks {
    pub before_mount: Option<Rc<dyn Fn()>>,
    pub mounted: Option<Rc<dyn Fn(NodeId)>>,
    pub before_unmount: Option<Rc<dyn Fn(NodeId) -> Option<Pending>>>,
    pub unmounted: Option<Rc<dyn Fn()>>,
}

pub type AttrMap = BTreeMap<String, String>;
pub type PropMap = BTreeMap<String, serde_json::Value>;

/// Everything needed to realize one live node.
#[derive(Clone)]
pub struct Descriptor {
    pub tag: Tag,
    pub key: Option<Value<String>>,
    pub id: Option<Value<String>>,
    pub class: Option<Value<String>>,
    pub style: Option<Value<Style>>,
    pub css: Option<Value<StyleSheet>>,
    pub attrs: Option<Value<AttrMap>>,
    pub props: Option<Value<PropMap>>,
    pub text: Option<Value<String>>,
    pub html: Option<Value<String>>,
    pub children: Vec<Child>,
    pub on: Vec<Binding>,
    pub dom_if: Option<Value<bool>>,
    pub dom_show: Option<Value<bool>>,
    pub list: Option<MapList>,
    pub surface: Option<SurfaceOptions>,
    pub hooks: Hooks,
}

impl Descriptor {
    pub fn new(tag: impl Into<Tag>) -> Self {
        Self {
            tag: tag.into(),
            key: None,
            id: None,
            class: None,
            style: None,
            css: None,
            attrs: None,
            props: None,
            text: None,
            html: None,
            children: Vec::new(),
            on: Vec::new(),
            dom_if: None,
            dom_show: None,
            list: None,
            surface: None,
            hooks: Hooks::default(),
        }
    }

    pub fn key(mut self, key: impl Into<Value<String>>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn id(mut self, id: impl Into<Value<String>>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn class(mut self, class: impl Into<Value<String>>) -> Self {
        self.class = Some(class.into());
        self
    }

    pub fn style(mut self, style: impl Into<Value<Style>>) -> Self {
        self.style = Some(style.into());
        self
    }

    pub fn css(mut self, sheet: impl Into<Value<StyleSheet>>) -> Self {
        self.css = Some(sheet.into());
        self
    }

    /// Set one static attribute on top of whatever map is already present.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let (name, value) = (name.into(), value.into());
        let attrs = self.attrs.take().unwrap_or_default();
        self.attrs = Some(attrs.map(move |mut m| {
            m.insert(name.clone(), value.clone());
            m
        }));
        self
    }

    pub fn attrs(mut self, attrs: impl Into<Value<AttrMap>>) -> Self {
        self.attrs = Some(attrs.into());
        self
    }

    pub fn prop(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        let (name, value) = (name.into(), value.into());
        let props = self.props.take().unwrap_or_default();
        self.props = Some(props.map(move |mut m| {
            m.insert(name.clone(), value.clone());
            m
        }));
        self
    }

    pub fn props(mut self, props: impl Into<Value<PropMap>>) -> Self {
        self.props = Some(props.into());
        self
    }

    pub fn text(mut self, text: impl Into<Value<String>>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Raw markup. Takes precedence over text and children.
    pub fn html(mut self, html: impl Into<Value<String>>) -> Self {
        self.html = Some(html.into());
        self
    }

    pub fn child(mut self, child: impl Into<Child>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_children<C: Into<Child>>(mut self, children: impl IntoIterator<Item = C>) -> Self {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    pub fn on(self, event: impl Into<String>, handler: impl Fn(&Event) + 'static) -> Self {
        self.on_with(event, ListenerOptions::empty(), handler)
    }

    pub fn on_with(
        mut self,
        event: impl Into<String>,
        options: ListenerOptions,
        handler: impl Fn(&Event) + 'static,
    ) -> Self {
        self.on.push(Binding {
            event: event.into(),
            options,
            handler: Rc::new(handler),
        });
        self
    }

    /// Conditional presence: while false the node is replaced by a
    /// placeholder and its subtree does not exist.
    pub fn dom_if(mut self, present: impl Into<Value<bool>>) -> Self {
        self.dom_if = Some(present.into());
        self
    }

    /// Conditional visibility: the node stays attached but is hidden.
    pub fn dom_show(mut self, visible: impl Into<Value<bool>>) -> Self {
        self.dom_show = Some(visible.into());
        self
    }

    pub fn list(mut self, list: MapList) -> Self {
        self.list = Some(list);
        self
    }

    /// Wrap the realized node in the named surface `name`.
    pub fn surface(mut self, name: impl Into<String>) -> Self {
        self.surface = Some(SurfaceOptions {
            name: name.into(),
            shadow: false,
        });
        self
    }

    pub fn shadow_surface(mut self, name: impl Into<String>) -> Self {
        self.surface = Some(SurfaceOptions {
            name: name.into(),
            shadow: true,
        });
        self
    }

    pub fn before_mount(mut self, f: impl Fn() + 'static) -> Self {
        self.hooks.before_mount = Some(Rc::new(f));
        self
    }

    pub fn mounted(mut self, f: impl Fn(NodeId) + 'static) -> Self {
        self.hooks.mounted = Some(Rc::new(f));
        self
    }

    /// A returned [`Pending`] delays detaching until it settles.
    pub fn before_unmount(mut self, f: impl Fn(NodeId) -> Option<Pending> + 'static) -> Self {
        self.hooks.before_unmount = Some(Rc::new(f));
        self
    }

    pub fn unmounted(mut self, f: impl Fn() + 'static) -> Self {
        self.hooks.unmounted = Some(Rc::new(f));
        self
    }
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor")
            .field("tag", &self.tag)
            .field("key", &self.key)
            .field("children", &self.children.len())
            .finish_non_exhaustive()
    }
}

pub fn Element(tag: &str) -> Descriptor {
    Descriptor::new(Tag::Element(tag.to_ascii_lowercase()))
}

pub fn Text(text: impl Into<Value<String>>) -> Descriptor {
    Descriptor::new(Tag::Text).text(text)
}

pub fn Comment(text: impl Into<Value<String>>) -> Descriptor {
    Descriptor::new(Tag::Comment).text(text)
}

pub fn Fragment() -> Descriptor {
    Descriptor::new(Tag::Fragment)
}
