//! Keyed lists: a live sub-forest driven by a reactive sequence.
//!
//! Every change to the source is compared structurally with the previous
//! snapshot. An unchanged sequence leaves the rendered items alone; any
//! difference unmounts every item and maps the whole sequence again.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::Serialize;
use trellis_core::{Scope, current_scope, effect, untracked};

use crate::diff::has_diff;
use crate::dom::NodeId;
use crate::lifecycle::LifecycleItem;
use crate::normalize::Child;
use crate::render::{Renderer, Slot, Unit};
use crate::value::Value;

type Snapshot = Option<serde_json::Value>;
type Read = Rc<dyn Fn() -> (Snapshot, Box<dyn FnOnce() -> Vec<Child>>)>;

/// A source sequence plus a per-item mapping function.
#[derive(Clone)]
pub struct MapList {
    read: Read,
    volatile: Vec<String>,
}

impl MapList {
    pub fn new<T, F>(source: impl Into<Value<Vec<T>>>, map: F) -> Self
    where
        T: Serialize + Clone + 'static,
        F: Fn(&T, usize) -> Child + 'static,
    {
        let source = source.into();
        let map = Rc::new(map);
        let read: Read = Rc::new(move || {
            let items = source.get();
            let snapshot = match serde_json::to_value(&items) {
                Ok(snapshot) => Some(snapshot),
                Err(err) => {
                    log::warn!("list source cannot be snapshotted ({err}); every change rebuilds");
                    None
                }
            };
            let map = map.clone();
            let produce: Box<dyn FnOnce() -> Vec<Child>> = Box::new(move || {
                items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| map(item, index))
                    .collect()
            });
            (snapshot, produce)
        });
        Self {
            read,
            volatile: Vec::new(),
        }
    }

    /// Item fields left out of the change check, such as identity keys.
    pub fn volatile<S: Into<String>>(mut self, keys: impl IntoIterator<Item = S>) -> Self {
        self.volatile.extend(keys.into_iter().map(Into::into));
        self
    }
}

impl fmt::Debug for MapList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapList")
            .field("volatile", &self.volatile)
            .finish_non_exhaustive()
    }
}

struct Item {
    scope: Scope,
    unit: Unit,
}

struct ListState {
    anchor: NodeId,
    life: Rc<LifecycleItem>,
    items: RefCell<Vec<Item>>,
    previous: RefCell<Option<Snapshot>>,
}

impl Renderer {
    /// Render `list` as the last children of `parent`, after an anchor
    /// comment. Returns the lifecycle item grouping the produced items.
    pub(crate) fn render_list(&self, parent: NodeId, list: MapList) -> Rc<LifecycleItem> {
        let doc = self.document().clone();
        let anchor = doc.create_comment(&self.config().list_anchor_label);
        if let Err(err) = doc.append_child(parent, anchor) {
            log::warn!("list anchor not attached: {err}");
        }
        let state = Rc::new(ListState {
            anchor,
            life: LifecycleItem::new(Default::default(), Slot::node(anchor)),
            items: RefCell::new(Vec::new()),
            previous: RefCell::new(None),
        });
        let mut volatile = self.config().list_volatile_keys.clone();
        volatile.extend(list.volatile.iter().cloned());

        let owner = current_scope().unwrap_or_default();
        let renderer = self.clone();
        let life = state.life.clone();
        effect(move || {
            let (snapshot, produce) = (list.read)();
            untracked(|| {
                {
                    let mut previous = state.previous.borrow_mut();
                    if let (Some(Some(prev)), Some(next)) = (previous.as_ref(), snapshot.as_ref())
                        && !has_diff(prev, next, &volatile)
                    {
                        return;
                    }
                    *previous = Some(snapshot);
                }
                renderer.replace_items(&state, &owner, produce());
            });
        });
        life
    }

    fn replace_items(&self, state: &ListState, owner: &Scope, children: Vec<Child>) {
        let doc = self.document();
        let mounted = state.life.is_mounted();

        let old = std::mem::take(&mut *state.items.borrow_mut());
        if mounted {
            let mut pending = Vec::new();
            for item in &old {
                item.unit.life.before_unmount(&mut pending);
            }
            if !pending.is_empty() {
                log::debug!("list rebuild does not wait for {} pending unmount(s)", pending.len());
            }
        }
        for item in old {
            let node = item.unit.slot.get();
            if let Err(err) = doc.remove(node) {
                log::debug!("stale list item: {err}");
            }
            if mounted {
                item.unit.life.unmounted();
            }
            item.scope.dispose();
            doc.release(node);
        }

        let mut items = Vec::with_capacity(children.len());
        for child in children {
            let scope = owner.child();
            match scope.run(|| self.render_unit(child)) {
                Some(unit) => items.push(Item { scope, unit }),
                None => scope.dispose(),
            }
        }

        if mounted {
            for item in &items {
                item.unit.life.before_mount();
            }
        }
        if let Some(parent) = doc.parent(state.anchor) {
            let reference = doc.next_sibling(state.anchor);
            for item in &items {
                if let Err(err) = doc.insert_before(parent, item.unit.slot.get(), reference) {
                    log::warn!("list item not attached: {err}");
                }
            }
        }
        state
            .life
            .set_children(items.iter().map(|i| i.unit.life.clone()).collect());
        *state.items.borrow_mut() = items;
        if mounted {
            let lives: Vec<_> = state.items.borrow().iter().map(|i| i.unit.life.clone()).collect();
            for life in lives {
                life.mounted();
            }
        }
    }
}
