use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::reactive::{self, ObserverId, ObserverKind, SignalId};

/// A cached computation over other reactive values.
///
/// The value is computed on first read and again on the first read after
/// any of its inputs changed. Readers of a derived cell are notified as soon
/// as an input changes, before the new value is computed.
pub struct Derived<T: 'static>(Rc<DerivedInner<T>>);

struct DerivedInner<T> {
    observer: ObserverId,
    output: SignalId,
    compute: Box<dyn Fn() -> T>,
    cached: RefCell<Option<Rc<T>>>,
}

impl<T> Clone for Derived<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: 'static> Derived<T> {
    pub fn new(compute: impl Fn() -> T + 'static) -> Self {
        let output = reactive::new_source();
        let observer = reactive::new_observer(ObserverKind::Derived { output }, || {});
        Self(Rc::new(DerivedInner {
            observer,
            output,
            compute: Box::new(compute),
            cached: RefCell::new(None),
        }))
    }

    /// A derived cell whose writes are routed through `set`.
    pub fn writable(
        compute: impl Fn() -> T + 'static,
        set: impl Fn(T) + 'static,
    ) -> WritableDerived<T> {
        WritableDerived {
            derived: Self::new(compute),
            setter: Rc::new(set),
        }
    }

    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.with(T::clone)
    }

    /// Borrow the current value. The cache is not held borrowed while `f`
    /// runs, so `f` may write the cell's inputs.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        reactive::track(self.0.output);
        let value = self.refresh();
        f(&*value)
    }

    /// Whether an input changed since the value was last computed.
    pub fn is_dirty(&self) -> bool {
        reactive::is_dirty(self.0.observer)
    }

    fn refresh(&self) -> Rc<T> {
        if !reactive::is_dirty(self.0.observer)
            && let Some(value) = self.0.cached.borrow().as_ref()
        {
            return value.clone();
        }
        let value = Rc::new(reactive::run_tracked(self.0.observer, || (self.0.compute)()));
        *self.0.cached.borrow_mut() = Some(value.clone());
        value
    }
}

impl<T> Drop for DerivedInner<T> {
    fn drop(&mut self) {
        reactive::remove_observer(self.observer);
        reactive::drop_source(self.output);
    }
}

impl<T: fmt::Debug> fmt::Debug for Derived<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.cached.try_borrow() {
            Ok(cached) => f.debug_tuple("Derived").field(&*cached).finish(),
            Err(_) => f.write_str("Derived(<computing>)"),
        }
    }
}

pub fn derived<T>(compute: impl Fn() -> T + 'static) -> Derived<T> {
    Derived::new(compute)
}

/// A [`Derived`] paired with a setter.
pub struct WritableDerived<T: 'static> {
    derived: Derived<T>,
    setter: Rc<dyn Fn(T)>,
}

impl<T> Clone for WritableDerived<T> {
    fn clone(&self) -> Self {
        Self {
            derived: self.derived.clone(),
            setter: self.setter.clone(),
        }
    }
}

impl<T: 'static> WritableDerived<T> {
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.derived.get()
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.derived.with(f)
    }

    pub fn set(&self, value: T) {
        (self.setter)(value);
    }

    pub fn as_derived(&self) -> &Derived<T> {
        &self.derived
    }
}
