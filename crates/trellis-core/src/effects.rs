use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::reactive::{self, ObserverId, ObserverKind};
use crate::scope::{Scope, current_scope};

#[derive(Clone)]
pub struct Dispose(Rc<RefCell<Option<Box<dyn FnOnce()>>>>);

impl Dispose {
    pub fn new(f: impl FnOnce() + 'static) -> Self {
        Self(Rc::new(RefCell::new(Some(Box::new(f)))))
    }

    /// Runs at most once (safe to call multiple times).
    pub fn run(&self) {
        let f = self.0.borrow_mut().take();
        if let Some(f) = f {
            f()
        }
    }

    pub fn is_done(&self) -> bool {
        self.0.borrow().is_none()
    }
}

/// Handle to a running effect.
///
/// Dropping the handle does not stop the effect; it lives until
/// [`Effect::dispose`] is called or the scope it was created in is disposed.
#[derive(Clone)]
pub struct Effect(Rc<EffectInner>);

struct EffectInner {
    observer: Cell<Option<ObserverId>>,
    // Owns whatever the body creates; reset before every re-run.
    scope: Scope,
}

impl Effect {
    /// Stop the effect. Idempotent.
    pub fn dispose(&self) {
        if let Some(id) = self.0.observer.take() {
            reactive::remove_observer(id);
            self.0.scope.dispose();
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.0.observer.get().is_none()
    }

    /// Number of sources read during the last run.
    pub fn dependency_count(&self) -> usize {
        self.0
            .observer
            .get()
            .map_or(0, |id| reactive::dependencies(id).len())
    }

    /// Turn the handle into a [`Dispose`] callback.
    pub fn into_dispose(self) -> Dispose {
        Dispose::new(move || self.dispose())
    }
}

impl std::fmt::Debug for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Effect")
            .field("observer", &self.0.observer.get())
            .finish()
    }
}

/// Run `f` now and again whenever a source it read changes.
///
/// Effects, scopes and cleanups created inside `f` belong to that run and
/// are torn down before the next one. The effect itself is owned by the
/// scope that is current when `effect` is called.
pub fn effect<F>(f: F) -> Effect
where
    F: FnMut() + 'static,
{
    let scope = Scope::new();
    let run_scope = scope.clone();
    let f = RefCell::new(f);
    let observer = reactive::new_observer(ObserverKind::Effect, move || {
        run_scope.reset();
        run_scope.run(|| match f.try_borrow_mut() {
            Ok(mut f) => f(),
            Err(_) => log::warn!("effect body re-entered itself; nested run skipped"),
        });
    });

    let handle = Effect(Rc::new(EffectInner {
        observer: Cell::new(Some(observer)),
        scope,
    }));
    if let Some(owner) = current_scope() {
        let owned = handle.clone();
        owner.add_disposer(move || owned.dispose());
    }
    reactive::run_observer(observer);
    handle
}

/// Re-evaluate `source` reactively and call `handler(next, previous)` every
/// time the result differs from the last one.
///
/// The handler also runs once immediately with `previous == None`. It runs
/// untracked, inside the scope that was current when `watch` was called.
pub fn watch<T, S, H>(source: S, handler: H) -> Effect
where
    T: PartialEq + 'static,
    S: Fn() -> T + 'static,
    H: FnMut(&T, Option<&T>) + 'static,
{
    let owner = current_scope();
    let previous: RefCell<Option<T>> = RefCell::new(None);
    let handler = RefCell::new(handler);
    effect(move || {
        let next = source();
        let mut previous = previous.borrow_mut();
        if previous.as_ref() == Some(&next) {
            return;
        }
        reactive::untracked(|| {
            let mut handler = handler.borrow_mut();
            match &owner {
                Some(scope) => scope.run(|| (*handler)(&next, previous.as_ref())),
                None => (*handler)(&next, previous.as_ref()),
            }
        });
        *previous = Some(next);
    })
}

/// Run `f` without registering any dependencies.
pub fn untracked<R>(f: impl FnOnce() -> R) -> R {
    reactive::untracked(f)
}
