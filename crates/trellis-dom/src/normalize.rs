//! Reducing the accepted child shapes to one canonical form.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use trellis_core::Trigger;

use crate::descriptor::{Descriptor, SurfaceOptions, Tag, Text};
use crate::mountable::Mountable;
use crate::value::Value;

/// Anything that can stand in a child position.
#[derive(Clone)]
pub enum Child {
    Descriptor(Box<Descriptor>),
    /// An already realized node; passed through untouched.
    Mounted(Mountable),
    /// A child to be wrapped in the named surface `name`.
    Named { name: String, inner: Box<Child> },
    /// Re-evaluated reactively; each new result replaces the previous node.
    Producer(Rc<dyn Fn() -> Child>),
    Deferred(Deferred),
    Empty,
}

impl Child {
    pub fn producer(f: impl Fn() -> Child + 'static) -> Self {
        Child::Producer(Rc::new(f))
    }

    pub fn named(name: impl Into<String>, inner: impl Into<Child>) -> Self {
        Child::Named {
            name: name.into(),
            inner: Box::new(inner.into()),
        }
    }
}

impl fmt::Debug for Child {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Child::Descriptor(d) => d.fmt(f),
            Child::Mounted(m) => m.fmt(f),
            Child::Named { name, inner } => f
                .debug_struct("Named")
                .field("name", name)
                .field("inner", inner)
                .finish(),
            Child::Producer(_) => f.write_str("Producer(..)"),
            Child::Deferred(d) => d.fmt(f),
            Child::Empty => f.write_str("Empty"),
        }
    }
}

impl From<Descriptor> for Child {
    fn from(d: Descriptor) -> Self {
        Child::Descriptor(Box::new(d))
    }
}

impl From<Mountable> for Child {
    fn from(m: Mountable) -> Self {
        Child::Mounted(m)
    }
}

impl From<Deferred> for Child {
    fn from(d: Deferred) -> Self {
        Child::Deferred(d)
    }
}

impl From<&str> for Child {
    fn from(s: &str) -> Self {
        Text(s).into()
    }
}

impl From<String> for Child {
    fn from(s: String) -> Self {
        Text(s).into()
    }
}

impl From<Value<String>> for Child {
    fn from(v: Value<String>) -> Self {
        Text(v).into()
    }
}

impl<C: Into<Child>> From<Option<C>> for Child {
    fn from(c: Option<C>) -> Self {
        c.map_or(Child::Empty, Into::into)
    }
}

/// The canonical form the synthesis engine works with.
pub enum Normalized {
    /// Renders as nothing.
    Nothing,
    Descriptor(Descriptor),
    Mounted(Mountable),
    Reactive(Rc<dyn Fn() -> Child>),
}

impl fmt::Debug for Normalized {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Normalized::Nothing => f.write_str("Nothing"),
            Normalized::Descriptor(d) => d.fmt(f),
            Normalized::Mounted(m) => m.fmt(f),
            Normalized::Reactive(_) => f.write_str("Reactive(..)"),
        }
    }
}

pub fn normalize(child: Child) -> Normalized {
    match child {
        Child::Descriptor(d) => {
            if let Tag::Element(tag) = &d.tag
                && tag.trim().is_empty()
            {
                log::debug!("descriptor without a tag renders as nothing");
                return Normalized::Nothing;
            }
            Normalized::Descriptor(*d)
        }
        Child::Mounted(m) => Normalized::Mounted(m),
        Child::Named { name, inner } => {
            if name.trim().is_empty() {
                log::debug!("named child without a name renders as nothing");
                return Normalized::Nothing;
            }
            match normalize(*inner) {
                Normalized::Descriptor(mut d) => {
                    if d.surface.is_none() {
                        d.surface = Some(SurfaceOptions {
                            name,
                            shadow: false,
                        });
                    }
                    Normalized::Descriptor(d)
                }
                Normalized::Reactive(f) => Normalized::Reactive(Rc::new(move || {
                    Child::named(name.clone(), f())
                })),
                Normalized::Mounted(m) => {
                    log::debug!("`{name}` cannot wrap an already realized node; passed through");
                    Normalized::Mounted(m)
                }
                Normalized::Nothing => Normalized::Nothing,
            }
        }
        Child::Producer(f) => Normalized::Reactive(f),
        Child::Deferred(d) => Normalized::Reactive(d.producer()),
        Child::Empty => Normalized::Nothing,
    }
}

/// A child that becomes available later.
///
/// Renders as an empty placeholder until [`Deferred::resolve`] is called.
#[derive(Clone)]
pub struct Deferred(Rc<DeferredInner>);

struct DeferredInner {
    resolved: RefCell<Option<Child>>,
    trigger: Trigger,
}

impl Default for Deferred {
    fn default() -> Self {
        Self::new()
    }
}

impl Deferred {
    pub fn new() -> Self {
        Self(Rc::new(DeferredInner {
            resolved: RefCell::new(None),
            trigger: Trigger::new(),
        }))
    }

    /// Only the first resolution counts.
    pub fn resolve(&self, child: impl Into<Child>) {
        {
            let mut slot = self.0.resolved.borrow_mut();
            if slot.is_some() {
                log::debug!("deferred child resolved twice; keeping the first");
                return;
            }
            *slot = Some(child.into());
        }
        self.0.trigger.notify();
    }

    pub fn is_resolved(&self) -> bool {
        self.0.resolved.borrow().is_some()
    }

    fn producer(&self) -> Rc<dyn Fn() -> Child> {
        let inner = self.0.clone();
        Rc::new(move || {
            inner.trigger.track();
            inner.resolved.borrow().clone().unwrap_or(Child::Empty)
        })
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred")
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::Element;

    #[test]
    fn test_blank_tag_is_nothing() {
        assert!(matches!(normalize(Element(" ").into()), Normalized::Nothing));
        assert!(matches!(normalize(Child::Empty), Normalized::Nothing));
        assert!(matches!(normalize(None::<Descriptor>.into()), Normalized::Nothing));
    }

    #[test]
    fn test_named_tags_descriptor() {
        let Normalized::Descriptor(d) = normalize(Child::named("x-card", Element("div"))) else {
            panic!("expected a descriptor");
        };
        assert_eq!(
            d.surface,
            Some(SurfaceOptions {
                name: "x-card".into(),
                shadow: false
            })
        );
    }

    #[test]
    fn test_named_keeps_explicit_surface() {
        let inner = Element("div").shadow_surface("x-inner");
        let Normalized::Descriptor(d) = normalize(Child::named("x-outer", inner)) else {
            panic!("expected a descriptor");
        };
        assert_eq!(d.surface.map(|s| s.name).as_deref(), Some("x-inner"));
    }

    #[test]
    fn test_named_producer_wraps_each_result() {
        let Normalized::Reactive(f) =
            normalize(Child::named("x-card", Child::producer(|| Element("p").into())))
        else {
            panic!("expected a producer");
        };
        let Normalized::Descriptor(d) = normalize(f()) else {
            panic!("expected a descriptor");
        };
        assert_eq!(d.surface.map(|s| s.name).as_deref(), Some("x-card"));
    }

    #[test]
    fn test_deferred_is_reactive() {
        let deferred = Deferred::new();
        let Normalized::Reactive(f) = normalize(deferred.clone().into()) else {
            panic!("expected a producer");
        };
        assert!(matches!(f(), Child::Empty));
        deferred.resolve(Element("p"));
        deferred.resolve(Element("span"));
        let Normalized::Descriptor(d) = normalize(f()) else {
            panic!("expected a descriptor");
        };
        assert_eq!(d.tag, Tag::Element("p".into()));
    }
}
