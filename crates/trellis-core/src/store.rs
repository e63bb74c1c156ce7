//! Observable containers.
//!
//! A [`Store`] wraps a plain value so that reads through it are tracked and
//! writes through it notify. Stores are cheap handles: [`Store::project`],
//! [`Store::item`] and [`Store::entry`] hand out views onto nested members
//! that share the root's change notifications.
//!
//! Collections only expose a fixed set of mutators (`push`, `pop`,
//! `insert`, `remove`, `clear`, ...). Each of them takes the same path as a
//! plain write: mutate, then notify subscribers of the root. A mutator that
//! leaves the collection as it was (`pop` on an empty vec, removing a
//! missing key, inserting an item a set already holds) notifies nobody.
//!
//! A shallow store tracks and notifies only at its top level. Members handed
//! out by a shallow store are plain views: reading them registers no
//! dependency and writing them notifies nobody.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use std::hash::Hash;
use std::ops::Range;
use std::rc::Rc;

use crate::signal::Trigger;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Depth {
    Deep,
    Shallow,
}

type Reader<T> = Rc<dyn Fn(&mut dyn FnMut(&T))>;
type Writer<T> = Rc<dyn Fn(&mut dyn FnMut(&mut T))>;

pub struct Store<T: 'static> {
    trigger: Trigger,
    read: Reader<T>,
    write: Writer<T>,
    depth: Depth,
    observed: bool,
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            trigger: self.trigger.clone(),
            read: self.read.clone(),
            write: self.write.clone(),
            depth: self.depth,
            observed: self.observed,
        }
    }
}

/// Wrap `value` so every nested member is observable.
pub fn reactive<T: 'static>(value: T) -> Store<T> {
    Store::root(value, Depth::Deep)
}

/// Wrap `value` so only top-level access is observable.
pub fn shallow_reactive<T: 'static>(value: T) -> Store<T> {
    Store::root(value, Depth::Shallow)
}

impl<T: 'static> Store<T> {
    fn root(value: T, depth: Depth) -> Self {
        let cell = Rc::new(RefCell::new(value));
        let read_cell = cell.clone();
        Self {
            trigger: Trigger::new(),
            read: Rc::new(move |f: &mut dyn FnMut(&T)| f(&read_cell.borrow())),
            write: Rc::new(move |f: &mut dyn FnMut(&mut T)| f(&mut cell.borrow_mut())),
            depth,
            observed: true,
        }
    }

    pub fn depth(&self) -> Depth {
        self.depth
    }

    /// Whether reads through this handle are tracked.
    pub fn is_observed(&self) -> bool {
        self.observed
    }

    /// Read the value. `None` when this is a member view whose target no
    /// longer exists (a vanished map entry or an out-of-range index).
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        if self.observed {
            self.trigger.track();
        }
        self.with_untracked(f)
    }

    pub fn with_untracked<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let mut f = Some(f);
        let mut out = None;
        (self.read)(&mut |value: &T| {
            if let Some(f) = f.take() {
                out = Some(f(value));
            }
        });
        out
    }

    pub fn get(&self) -> Option<T>
    where
        T: Clone,
    {
        self.with(T::clone)
    }

    /// Mutate in place and notify. Returns `None` (without notifying) when
    /// the target no longer exists.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.mutate(move |value| (f(value), true))
    }

    /// Store `value`, notifying only if it differs from the current one.
    /// Returns whether the target existed.
    pub fn set(&self, value: T) -> bool
    where
        T: PartialEq,
    {
        self.mutate(move |slot| {
            if *slot == value {
                ((), false)
            } else {
                *slot = value;
                ((), true)
            }
        })
        .is_some()
    }

    /// Mutate in place; `f` reports whether it changed anything, and only
    /// a change notifies.
    fn mutate<R>(&self, f: impl FnOnce(&mut T) -> (R, bool)) -> Option<R> {
        let mut f = Some(f);
        let mut out = None;
        (self.write)(&mut |value: &mut T| {
            if let Some(f) = f.take() {
                out = Some(f(value));
            }
        });
        let (out, changed) = out?;
        if changed && self.observed {
            self.trigger.notify();
        }
        Some(out)
    }

    /// A view onto a field of the value.
    pub fn project<U: 'static>(
        &self,
        get: impl Fn(&T) -> &U + 'static,
        get_mut: impl Fn(&mut T) -> &mut U + 'static,
    ) -> Store<U> {
        self.member(move |t| Some(get(t)), move |t| Some(get_mut(t)))
    }

    fn member<U: 'static>(
        &self,
        get: impl Fn(&T) -> Option<&U> + 'static,
        get_mut: impl Fn(&mut T) -> Option<&mut U> + 'static,
    ) -> Store<U> {
        let parent_read = self.read.clone();
        let parent_write = self.write.clone();
        Store {
            trigger: self.trigger.clone(),
            read: Rc::new(move |f: &mut dyn FnMut(&U)| {
                parent_read(&mut |t: &T| {
                    if let Some(u) = get(t) {
                        f(u);
                    }
                })
            }),
            write: Rc::new(move |f: &mut dyn FnMut(&mut U)| {
                parent_write(&mut |t: &mut T| {
                    if let Some(u) = get_mut(t) {
                        f(u);
                    }
                })
            }),
            depth: self.depth,
            observed: self.observed && self.depth == Depth::Deep,
        }
    }

    /// Notify subscribers without changing anything.
    pub fn notify(&self) {
        self.trigger.notify();
    }

    pub fn subscriber_count(&self) -> usize {
        self.trigger.subscriber_count()
    }
}

impl<T: fmt::Debug> fmt::Debug for Store<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("Store");
        out.field("depth", &self.depth);
        self.with_untracked(|value| {
            out.field("value", value);
        });
        out.finish()
    }
}

impl<T: 'static> Store<Vec<T>> {
    pub fn len(&self) -> usize {
        self.with(Vec::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn push(&self, item: T) {
        self.update(move |v| v.push(item));
    }

    pub fn pop(&self) -> Option<T> {
        self.mutate(|v| {
            let popped = v.pop();
            let changed = popped.is_some();
            (popped, changed)
        })
        .flatten()
    }

    pub fn remove_first(&self) -> Option<T> {
        self.mutate(|v| {
            let removed = (!v.is_empty()).then(|| v.remove(0));
            let changed = removed.is_some();
            (removed, changed)
        })
        .flatten()
    }

    pub fn prepend(&self, item: T) {
        self.update(move |v| v.insert(0, item));
    }

    /// Insert at `index`, clamped to the length.
    pub fn insert(&self, index: usize, item: T) {
        self.update(move |v| {
            let index = index.min(v.len());
            v.insert(index, item);
        });
    }

    /// Replace `range` (clamped to the length) with `items`, returning the
    /// removed elements.
    pub fn splice(&self, range: Range<usize>, items: impl IntoIterator<Item = T>) -> Vec<T> {
        self.mutate(move |v| {
            let end = range.end.min(v.len());
            let start = range.start.min(end);
            let before = v.len();
            let removed: Vec<T> = v.splice(start..end, items).collect();
            let changed = !removed.is_empty() || v.len() != before;
            (removed, changed)
        })
        .unwrap_or_default()
    }

    pub fn clear(&self) {
        self.mutate(|v| {
            let changed = !v.is_empty();
            v.clear();
            ((), changed)
        });
    }

    pub fn sort(&self)
    where
        T: Ord,
    {
        self.mutate(|v| {
            let changed = !v.is_sorted();
            v.sort();
            ((), changed)
        });
    }

    pub fn sort_by(&self, mut compare: impl FnMut(&T, &T) -> std::cmp::Ordering) {
        self.mutate(move |v| {
            let changed = !v.is_sorted_by(|a, b| compare(a, b).is_le());
            v.sort_by(compare);
            ((), changed)
        });
    }

    pub fn reverse(&self) {
        self.mutate(|v| {
            v.reverse();
            ((), v.len() > 1)
        });
    }

    /// A view onto the element at `index`.
    pub fn item(&self, index: usize) -> Store<T> {
        self.member(move |v| v.get(index), move |v| v.get_mut(index))
    }
}

macro_rules! keyed_store {
    ($map:ident, $($bound:tt)+) => {
        impl<K, V> Store<$map<K, V>>
        where
            K: $($bound)+ + 'static,
            V: 'static,
        {
            pub fn len(&self) -> usize {
                self.with(|m| m.len()).unwrap_or(0)
            }

            pub fn is_empty(&self) -> bool {
                self.len() == 0
            }

            pub fn contains_key(&self, key: &K) -> bool {
                self.with(|m| m.contains_key(key)).unwrap_or(false)
            }

            pub fn value(&self, key: &K) -> Option<V>
            where
                V: Clone,
            {
                self.with(|m| m.get(key).cloned()).flatten()
            }

            pub fn insert(&self, key: K, value: V) -> Option<V> {
                self.update(move |m| m.insert(key, value)).flatten()
            }

            pub fn remove(&self, key: &K) -> Option<V> {
                self.mutate(|m| {
                    let removed = m.remove(key);
                    let changed = removed.is_some();
                    (removed, changed)
                })
                .flatten()
            }

            pub fn clear(&self) {
                self.mutate(|m| {
                    let changed = !m.is_empty();
                    m.clear();
                    ((), changed)
                });
            }

            /// A view onto the value under `key`. Reads return `None` while
            /// the key is absent.
            pub fn entry(&self, key: K) -> Store<V>
            where
                K: Clone,
            {
                let read_key = key.clone();
                self.member(move |m| m.get(&read_key), move |m| m.get_mut(&key))
            }
        }
    };
}

keyed_store!(HashMap, Eq + Hash);
keyed_store!(BTreeMap, Ord);

macro_rules! set_store {
    ($set:ident, $($bound:tt)+) => {
        impl<T> Store<$set<T>>
        where
            T: $($bound)+ + 'static,
        {
            pub fn len(&self) -> usize {
                self.with(|s| s.len()).unwrap_or(0)
            }

            pub fn is_empty(&self) -> bool {
                self.len() == 0
            }

            pub fn contains(&self, item: &T) -> bool {
                self.with(|s| s.contains(item)).unwrap_or(false)
            }

            pub fn insert(&self, item: T) -> bool {
                self.mutate(move |s| {
                    let added = s.insert(item);
                    (added, added)
                })
                .unwrap_or(false)
            }

            pub fn remove(&self, item: &T) -> bool {
                self.mutate(|s| {
                    let removed = s.remove(item);
                    (removed, removed)
                })
                .unwrap_or(false)
            }

            pub fn clear(&self) {
                self.mutate(|s| {
                    let changed = !s.is_empty();
                    s.clear();
                    ((), changed)
                });
            }
        }
    };
}

set_store!(HashSet, Eq + Hash);
set_store!(BTreeSet, Ord);
