use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::error::ReactiveError;
use crate::reactive::{self, SignalId};

/// A mutable value that records who reads it and notifies them on change.
pub struct Signal<T: 'static>(Rc<Inner<T>>);

struct Inner<T> {
    id: SignalId,
    value: RefCell<Rc<T>>,
    disposed: Cell<bool>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: 'static> Signal<T> {
    pub fn new(value: T) -> Self {
        Self(Rc::new(Inner {
            id: reactive::new_source(),
            value: RefCell::new(Rc::new(value)),
            disposed: Cell::new(false),
        }))
    }

    pub fn id(&self) -> SignalId {
        self.0.id
    }

    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.track();
        T::clone(&self.0.value.borrow())
    }

    pub fn get_untracked(&self) -> T
    where
        T: Clone,
    {
        T::clone(&self.0.value.borrow())
    }

    /// Borrow the current value. `f` sees a snapshot and may write the
    /// signal; the write is visible to the next read.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.track();
        self.with_untracked(f)
    }

    pub fn with_untracked<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let value = self.0.value.borrow().clone();
        f(&*value)
    }

    /// Store `value` and notify subscribers, unless it equals the current
    /// value.
    ///
    /// # Panics
    /// If the signal has been disposed. See [`Signal::try_set`].
    pub fn set(&self, value: T)
    where
        T: PartialEq,
    {
        if let Err(err) = self.try_set(value) {
            panic!("{err}");
        }
    }

    /// Returns whether the value changed.
    pub fn try_set(&self, value: T) -> Result<bool, ReactiveError>
    where
        T: PartialEq,
    {
        self.ensure_live()?;
        {
            let mut slot = self.0.value.borrow_mut();
            if **slot == value {
                return Ok(false);
            }
            *slot = Rc::new(value);
        }
        reactive::notify(self.0.id);
        Ok(true)
    }

    /// Mutate in place and always notify.
    pub fn update(&self, f: impl FnOnce(&mut T))
    where
        T: Clone,
    {
        if let Err(err) = self.ensure_live() {
            panic!("{err}");
        }
        f(Rc::make_mut(&mut self.0.value.borrow_mut()));
        reactive::notify(self.0.id);
    }

    /// Detach every subscriber. Later reads still return the last value but
    /// are no longer tracked; later writes fail.
    pub fn dispose(&self) {
        if !self.0.disposed.replace(true) {
            reactive::drop_source(self.0.id);
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.0.disposed.get()
    }

    pub fn subscriber_count(&self) -> usize {
        reactive::subscriber_count(self.0.id)
    }

    fn track(&self) {
        if !self.0.disposed.get() {
            reactive::track(self.0.id);
        }
    }

    fn ensure_live(&self) -> Result<(), ReactiveError> {
        if self.0.disposed.get() {
            Err(ReactiveError::Disposed(self.0.id))
        } else {
            Ok(())
        }
    }
}

impl<T> Drop for Inner<T> {
    fn drop(&mut self) {
        if !self.disposed.get() {
            reactive::drop_source(self.id);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.value.try_borrow() {
            Ok(value) => f.debug_tuple("Signal").field(&**value).finish(),
            Err(_) => f.write_str("Signal(<borrowed>)"),
        }
    }
}

impl<T: Default> Default for Signal<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

pub fn signal<T>(t: T) -> Signal<T> {
    Signal::new(t)
}

/// A valueless source: something to depend on and to fire by hand.
#[derive(Clone)]
pub struct Trigger(Rc<TriggerInner>);

struct TriggerInner {
    id: SignalId,
}

impl Trigger {
    pub fn new() -> Self {
        Self(Rc::new(TriggerInner {
            id: reactive::new_source(),
        }))
    }

    pub fn id(&self) -> SignalId {
        self.0.id
    }

    pub fn track(&self) {
        reactive::track(self.0.id);
    }

    pub fn notify(&self) {
        reactive::notify(self.0.id);
    }

    pub fn subscriber_count(&self) -> usize {
        reactive::subscriber_count(self.0.id)
    }
}

impl Default for Trigger {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TriggerInner {
    fn drop(&mut self) {
        reactive::drop_source(self.id);
    }
}

impl fmt::Debug for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Trigger").field(&self.0.id).finish()
    }
}
