use std::fmt;
use std::rc::Rc;

use trellis_core::{Derived, Signal, Store};

/// A descriptor field: either a literal or a producer the engine tracks.
pub enum Value<T> {
    Static(T),
    Dynamic(Rc<dyn Fn() -> T>),
}

impl<T> Clone for Value<T>
where
    T: Clone,
{
    fn clone(&self) -> Self {
        match self {
            Value::Static(v) => Value::Static(v.clone()),
            Value::Dynamic(f) => Value::Dynamic(f.clone()),
        }
    }
}

impl<T: Clone + 'static> Value<T> {
    pub fn dynamic(f: impl Fn() -> T + 'static) -> Self {
        Value::Dynamic(Rc::new(f))
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, Value::Dynamic(_))
    }

    /// The current value. Inside an effect, a producer's reads are tracked.
    pub fn get(&self) -> T {
        match self {
            Value::Static(v) => v.clone(),
            Value::Dynamic(f) => f(),
        }
    }

    pub fn map<U: Clone + 'static>(self, f: impl Fn(T) -> U + 'static) -> Value<U> {
        match self {
            Value::Static(v) => Value::Static(f(v)),
            Value::Dynamic(g) => Value::dynamic(move || f(g())),
        }
    }

    /// Pair two fields; static only when both are.
    pub fn zip<U: Clone + 'static>(self, other: Value<U>) -> Value<(T, U)> {
        match (self, other) {
            (Value::Static(a), Value::Static(b)) => Value::Static((a, b)),
            (a, b) => Value::dynamic(move || (a.get(), b.get())),
        }
    }
}

/// Shorthand for [`Value::dynamic`].
pub fn dynamic<T: Clone + 'static>(f: impl Fn() -> T + 'static) -> Value<T> {
    Value::dynamic(f)
}

impl<T: fmt::Debug> fmt::Debug for Value<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Static(v) => f.debug_tuple("Static").field(v).finish(),
            Value::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

impl<T> From<T> for Value<T> {
    fn from(value: T) -> Self {
        Value::Static(value)
    }
}

impl From<&str> for Value<String> {
    fn from(value: &str) -> Self {
        Value::Static(value.to_string())
    }
}

impl From<&String> for Value<String> {
    fn from(value: &String) -> Self {
        Value::Static(value.clone())
    }
}

impl From<&str> for Value<crate::style::Style> {
    fn from(css: &str) -> Self {
        Value::Static(crate::style::Style::parse(css))
    }
}

impl<T: Clone + 'static> From<Signal<T>> for Value<T> {
    fn from(signal: Signal<T>) -> Self {
        Value::dynamic(move || signal.get())
    }
}

impl<T: Clone + 'static> From<&Signal<T>> for Value<T> {
    fn from(signal: &Signal<T>) -> Self {
        signal.clone().into()
    }
}

impl<T: Clone + 'static> From<Derived<T>> for Value<T> {
    fn from(derived: Derived<T>) -> Self {
        Value::dynamic(move || derived.get())
    }
}

/// A vector store read as a whole; any mutation re-evaluates it.
impl<T: Clone + 'static> From<Store<Vec<T>>> for Value<Vec<T>> {
    fn from(store: Store<Vec<T>>) -> Self {
        Value::dynamic(move || store.get().unwrap_or_default())
    }
}

impl<T: Default> Default for Value<T> {
    fn default() -> Self {
        Value::Static(T::default())
    }
}
