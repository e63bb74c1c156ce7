use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::effects::Dispose;

thread_local! {
    static CURRENT_SCOPE: RefCell<Option<Weak<ScopeInner>>> = const { RefCell::new(None) };
}

/// An ownership context for effects and cleanup callbacks.
///
/// Everything created while a scope is current is torn down when the scope
/// is disposed, in the order it was registered. A child scope counts as
/// registered when it is opened.
pub struct Scope {
    inner: Rc<ScopeInner>,
}

enum Member {
    Disposer(Box<dyn FnOnce()>),
    Child(Scope),
}

struct ScopeInner {
    members: RefCell<Vec<Member>>,
    parent: RefCell<Weak<ScopeInner>>,
    disposed: Cell<bool>,
}

struct CurrentGuard(Option<Weak<ScopeInner>>);

impl Drop for CurrentGuard {
    fn drop(&mut self) {
        let prev = self.0.take();
        let _ = CURRENT_SCOPE.try_with(|current| *current.borrow_mut() = prev);
    }
}

impl Scope {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(ScopeInner {
                members: RefCell::new(Vec::new()),
                parent: RefCell::new(Weak::new()),
                disposed: Cell::new(false),
            }),
        }
    }

    /// Run `f` with this scope current. The previous scope is restored even
    /// if `f` panics.
    pub fn run<R>(&self, f: impl FnOnce() -> R) -> R {
        let prev = CURRENT_SCOPE.with(|current| {
            current
                .borrow_mut()
                .replace(Rc::downgrade(&self.inner))
        });
        let _restore = CurrentGuard(prev);
        f()
    }

    /// Register a cleanup. On an already disposed scope it runs right away.
    pub fn add_disposer(&self, disposer: impl FnOnce() + 'static) {
        if self.inner.disposed.get() {
            disposer();
            return;
        }
        self.inner
            .members
            .borrow_mut()
            .push(Member::Disposer(Box::new(disposer)));
    }

    pub fn child(&self) -> Scope {
        let child = Scope::new();
        *child.inner.parent.borrow_mut() = Rc::downgrade(&self.inner);
        if self.inner.disposed.get() {
            child.inner.disposed.set(true);
        } else {
            self.inner.members.borrow_mut().push(Member::Child(child.clone()));
        }
        child
    }

    /// Tear down children and disposers but keep the scope usable.
    pub fn reset(&self) {
        teardown(&self.inner);
    }

    /// Idempotent.
    pub fn dispose(&self) {
        if self.inner.disposed.replace(true) {
            return;
        }
        teardown(&self.inner);
        let parent = self.inner.parent.borrow().upgrade();
        if let Some(parent) = parent {
            parent.members.borrow_mut().retain(|m| match m {
                Member::Child(c) => !Rc::ptr_eq(&c.inner, &self.inner),
                Member::Disposer(_) => true,
            });
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }

    /// Number of pending disposers plus live child scopes.
    pub fn len(&self) -> usize {
        self.inner.members.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn teardown(inner: &ScopeInner) {
    let members = std::mem::take(&mut *inner.members.borrow_mut());
    for member in members {
        match member {
            Member::Disposer(disposer) => disposer(),
            Member::Child(child) => child.dispose(),
        }
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Scope {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl PartialEq for Scope {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl std::fmt::Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("disposed", &self.inner.disposed.get())
            .field("pending", &self.len())
            .finish()
    }
}

pub fn current_scope() -> Option<Scope> {
    CURRENT_SCOPE.with(|current| {
        current
            .borrow()
            .as_ref()
            .and_then(|weak| weak.upgrade().map(|inner| Scope { inner }))
    })
}

/// A child of the current scope, or a fresh root scope when none is active.
pub fn open_scope() -> Scope {
    current_scope().map(|s| s.child()).unwrap_or_default()
}

/// Run `f` now and dispose what it returns together with the current scope.
pub fn scoped_effect<F>(f: F) -> Dispose
where
    F: FnOnce() -> Dispose,
{
    let cleanup = f();
    if let Some(scope) = current_scope() {
        let handle = cleanup.clone();
        scope.add_disposer(move || handle.run());
    } else {
        log::debug!("scoped_effect outside of any scope; cleanup is left to the caller");
    }
    cleanup
}

/// Register `f` to run when the current scope is disposed. Returns `false`
/// (and drops `f`) when no scope is active.
pub fn on_cleanup(f: impl FnOnce() + 'static) -> bool {
    match current_scope() {
        Some(scope) => {
            scope.add_disposer(f);
            true
        }
        None => {
            log::debug!("on_cleanup outside of any scope; callback dropped");
            false
        }
    }
}

impl Drop for ScopeInner {
    fn drop(&mut self) {
        if self.disposed.get() {
            return;
        }
        teardown(self);
    }
}
