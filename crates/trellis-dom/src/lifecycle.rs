//! Mount and unmount hook propagation.
//!
//! Every realized node carries a [`LifecycleItem`] holding its own hooks and
//! the items of the children it owns, in descriptor order. Mount-side hooks
//! run the node's own hook first and then each child's; unmount-side hooks
//! run the children first. `mounted` and `unmounted` fire at most once per
//! cycle.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::descriptor::Hooks;
use crate::render::Slot;

pub struct LifecycleItem {
    hooks: Hooks,
    slot: Slot,
    children: RefCell<Vec<Rc<LifecycleItem>>>,
    mounted: Cell<bool>,
}

impl LifecycleItem {
    pub(crate) fn new(hooks: Hooks, slot: Slot) -> Rc<Self> {
        Rc::new(Self {
            hooks,
            slot,
            children: RefCell::new(Vec::new()),
            mounted: Cell::new(false),
        })
    }

    pub(crate) fn add_child(&self, child: Rc<LifecycleItem>) {
        self.children.borrow_mut().push(child);
    }

    pub(crate) fn set_children(&self, children: Vec<Rc<LifecycleItem>>) {
        *self.children.borrow_mut() = children;
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.get()
    }

    fn snapshot(&self) -> Vec<Rc<LifecycleItem>> {
        self.children.borrow().clone()
    }

    pub fn before_mount(&self) {
        if let Some(hook) = &self.hooks.before_mount {
            hook();
        }
        for child in self.snapshot() {
            child.before_mount();
        }
    }

    pub fn mounted(&self) {
        if !self.mounted.replace(true)
            && let Some(hook) = &self.hooks.mounted
        {
            hook(self.slot.get());
        }
        for child in self.snapshot() {
            child.mounted();
        }
    }

    /// Collects the pending operations returned by before-unmount hooks.
    pub fn before_unmount(&self, pending: &mut Vec<Pending>) {
        for child in self.snapshot() {
            child.before_unmount(pending);
        }
        if let Some(hook) = &self.hooks.before_unmount
            && let Some(p) = hook(self.slot.get())
        {
            pending.push(p);
        }
    }

    pub fn unmounted(&self) {
        for child in self.snapshot() {
            child.unmounted();
        }
        if self.mounted.replace(false)
            && let Some(hook) = &self.hooks.unmounted
        {
            hook();
        }
    }
}

/// An operation that completes later, such as an exit transition.
#[derive(Clone)]
pub struct Pending(Rc<PendingInner>);

struct PendingInner {
    settled: Cell<bool>,
    callbacks: RefCell<Vec<Box<dyn FnOnce()>>>,
}

impl Default for Pending {
    fn default() -> Self {
        Self::new()
    }
}

impl Pending {
    pub fn new() -> Self {
        Self(Rc::new(PendingInner {
            settled: Cell::new(false),
            callbacks: RefCell::new(Vec::new()),
        }))
    }

    pub fn settled() -> Self {
        let p = Self::new();
        p.resolve();
        p
    }

    /// Idempotent.
    pub fn resolve(&self) {
        if self.0.settled.replace(true) {
            return;
        }
        let callbacks = std::mem::take(&mut *self.0.callbacks.borrow_mut());
        for callback in callbacks {
            callback();
        }
    }

    pub fn is_settled(&self) -> bool {
        self.0.settled.get()
    }

    /// Run `f` once settled; immediately if it already is.
    pub fn on_settled(&self, f: impl FnOnce() + 'static) {
        if self.is_settled() {
            f();
        } else {
            self.0.callbacks.borrow_mut().push(Box::new(f));
        }
    }

    /// Settles once every item has.
    pub fn all(items: impl IntoIterator<Item = Pending>) -> Pending {
        let items: Vec<Pending> = items.into_iter().filter(|p| !p.is_settled()).collect();
        if items.is_empty() {
            return Pending::settled();
        }
        let combined = Pending::new();
        let remaining = Rc::new(Cell::new(items.len()));
        for item in items {
            let combined = combined.clone();
            let remaining = remaining.clone();
            item.on_settled(move || {
                remaining.set(remaining.get() - 1);
                if remaining.get() == 0 {
                    combined.resolve();
                }
            });
        }
        combined
    }
}

impl std::fmt::Debug for Pending {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pending")
            .field("settled", &self.is_settled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_all() {
        let a = Pending::new();
        let b = Pending::new();
        let all = Pending::all([a.clone(), b.clone(), Pending::settled()]);
        let fired = Rc::new(Cell::new(0));
        let counter = fired.clone();
        all.on_settled(move || counter.set(counter.get() + 1));

        a.resolve();
        assert!(!all.is_settled());
        b.resolve();
        b.resolve();
        assert!(all.is_settled());
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn test_pending_all_of_nothing_is_settled() {
        assert!(Pending::all(Vec::new()).is_settled());
    }
}
