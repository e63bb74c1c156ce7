//! The dependency graph shared by signals, derived cells and effects.
//!
//! Sources (signals, triggers and the output side of derived cells) and
//! observers (effects and derived computations) live in two slot maps. Edges
//! are stored in both directions so an observer can drop every subscription
//! it holds before it re-runs; the dependency set after a run is therefore
//! exactly the set of sources read during that run.
//!
//! The active tracking context is an explicit stack: running an observer
//! pushes its id, [`untracked`] pushes `None`, and both are popped by guards
//! so a panicking callback leaves the stack balanced.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;

use crate::error::ReactiveError;
use crate::runtime::config;

new_key_type! {
    /// Identity of something that can be read and written: a signal, a
    /// trigger, or the output side of a derived cell.
    pub struct SignalId;
    /// Identity of a computation that reads sources.
    pub struct ObserverId;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObserverKind {
    /// Re-runs eagerly whenever one of its sources changes.
    Effect,
    /// Marks itself dirty and forwards the change through `output`; the
    /// value is recomputed by the next read.
    Derived { output: SignalId },
}

struct SourceNode {
    subscribers: SmallVec<[ObserverId; 4]>,
}

struct ObserverNode {
    kind: ObserverKind,
    run: Rc<dyn Fn()>,
    sources: SmallVec<[SignalId; 4]>,
    dirty: bool,
}

#[derive(Default)]
struct DepGraph {
    sources: SlotMap<SignalId, SourceNode>,
    observers: SlotMap<ObserverId, ObserverNode>,
}

impl DepGraph {
    fn unlink_sources(&mut self, obs: ObserverId) {
        let sources = match self.observers.get_mut(obs) {
            Some(node) => std::mem::take(&mut node.sources),
            None => return,
        };
        for sig in sources {
            if let Some(src) = self.sources.get_mut(sig) {
                src.subscribers.retain(|o| *o != obs);
            }
        }
    }

    fn link(&mut self, sig: SignalId, obs: ObserverId) {
        let Some(src) = self.sources.get_mut(sig) else {
            return;
        };
        if src.subscribers.contains(&obs) {
            return;
        }
        let Some(node) = self.observers.get_mut(obs) else {
            return;
        };
        src.subscribers.push(obs);
        node.sources.push(sig);
    }

    /// Mark everything downstream of `sig` dirty and collect the effects to
    /// re-run, each once, in the order they are first reached.
    fn mark_stale(
        &mut self,
        sig: SignalId,
        effects: &mut SmallVec<[ObserverId; 8]>,
        visited: &mut SmallVec<[ObserverId; 8]>,
    ) {
        let Some(src) = self.sources.get(sig) else {
            return;
        };
        for obs in src.subscribers.clone() {
            if visited.contains(&obs) {
                continue;
            }
            visited.push(obs);
            let Some(node) = self.observers.get_mut(obs) else {
                continue;
            };
            node.dirty = true;
            match node.kind {
                ObserverKind::Effect => effects.push(obs),
                ObserverKind::Derived { output } => self.mark_stale(output, effects, visited),
            }
        }
    }
}

thread_local! {
    static GRAPH: RefCell<DepGraph> = RefCell::new(DepGraph::default());
    static TRACKING: RefCell<Vec<Option<ObserverId>>> = const { RefCell::new(Vec::new()) };
    static RUNNING: RefCell<SmallVec<[ObserverId; 8]>> = RefCell::new(SmallVec::new());
    static DEPTH: Cell<usize> = const { Cell::new(0) };
}

struct TrackingGuard;

impl TrackingGuard {
    fn push(ctx: Option<ObserverId>) -> Self {
        TRACKING.with(|t| t.borrow_mut().push(ctx));
        TrackingGuard
    }
}

impl Drop for TrackingGuard {
    fn drop(&mut self) {
        let _ = TRACKING.try_with(|t| t.borrow_mut().pop());
    }
}

struct RunningGuard(ObserverId);

impl RunningGuard {
    fn enter(id: ObserverId) -> Self {
        RUNNING.with(|r| r.borrow_mut().push(id));
        RunningGuard(id)
    }
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        let id = self.0;
        let _ = RUNNING.try_with(|r| {
            let mut r = r.borrow_mut();
            if let Some(pos) = r.iter().rposition(|o| *o == id) {
                r.remove(pos);
            }
        });
    }
}

struct DepthGuard;

impl DepthGuard {
    fn enter() -> Self {
        let limit = config().max_propagation_depth;
        let depth = DEPTH.with(|d| {
            let next = d.get() + 1;
            d.set(next);
            next
        });
        let guard = DepthGuard;
        if depth > limit {
            let err = ReactiveError::CycleDetected { limit };
            log::error!("{err}");
            panic!("{err}");
        }
        guard
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        let _ = DEPTH.try_with(|d| d.set(d.get().saturating_sub(1)));
    }
}

/// Counts of live graph entries, for diagnostics and leak checks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GraphStats {
    pub sources: usize,
    pub observers: usize,
    pub edges: usize,
}

pub fn new_source() -> SignalId {
    GRAPH.with(|g| {
        g.borrow_mut().sources.insert(SourceNode {
            subscribers: SmallVec::new(),
        })
    })
}

/// Remove a source and every edge pointing at it.
pub fn drop_source(sig: SignalId) {
    let _ = GRAPH.try_with(|g| {
        let Ok(mut g) = g.try_borrow_mut() else {
            log::debug!("source {sig:?} dropped while the graph was busy; edges are left to be pruned");
            return;
        };
        if let Some(src) = g.sources.remove(sig) {
            for obs in src.subscribers {
                if let Some(node) = g.observers.get_mut(obs) {
                    node.sources.retain(|s| *s != sig);
                }
            }
        }
    });
}

pub fn new_observer(kind: ObserverKind, run: impl Fn() + 'static) -> ObserverId {
    GRAPH.with(|g| {
        g.borrow_mut().observers.insert(ObserverNode {
            kind,
            run: Rc::new(run),
            sources: SmallVec::new(),
            dirty: matches!(kind, ObserverKind::Derived { .. }),
        })
    })
}

/// Remove an observer and all of its dependency edges.
pub fn remove_observer(id: ObserverId) {
    // The node (and the closure it owns) is dropped after the borrow ends:
    // the closure may hold the last handle to a signal whose drop re-enters
    // the graph.
    let removed = GRAPH
        .try_with(|g| {
            let mut g = g.try_borrow_mut().ok()?;
            g.unlink_sources(id);
            g.observers.remove(id)
        })
        .ok()
        .flatten();
    drop(removed);
}

/// Register `sig` as a dependency of the computation currently running, if
/// any.
pub fn track(sig: SignalId) {
    let Some(obs) = current_observer() else {
        return;
    };
    GRAPH.with(|g| g.borrow_mut().link(sig, obs));
}

pub fn current_observer() -> Option<ObserverId> {
    TRACKING.with(|t| t.borrow().last().copied().flatten())
}

pub fn is_tracking() -> bool {
    current_observer().is_some()
}

fn is_running(id: ObserverId) -> bool {
    RUNNING.with(|r| r.borrow().contains(&id))
}

/// Propagate a change of `sig` to its subscribers, synchronously and in
/// subscription order.
///
/// Every derived cell downstream of `sig` is marked dirty first, then each
/// affected effect re-runs at most once, even when it is reached along
/// several paths. An effect that is already running is not re-entered.
pub fn notify(sig: SignalId) {
    let mut pending: SmallVec<[ObserverId; 8]> = SmallVec::new();
    GRAPH.with(|g| g.borrow_mut().mark_stale(sig, &mut pending, &mut SmallVec::new()));
    if pending.is_empty() {
        return;
    }

    let _depth = DepthGuard::enter();
    for obs in pending {
        // An earlier effect may have disposed this one, or already made it
        // re-run through a nested write.
        if !is_dirty(obs) {
            continue;
        }
        if is_running(obs) {
            GRAPH.with(|g| {
                if let Some(node) = g.borrow_mut().observers.get_mut(obs) {
                    node.dirty = false;
                }
            });
            log::warn!(
                "effect {obs:?} wrote a source it depends on while running; nested run skipped"
            );
            continue;
        }
        run_observer(obs);
    }
}

/// Run an observer's stored closure under tracking, after dropping the
/// dependencies recorded by its previous run.
pub fn run_observer(id: ObserverId) {
    let run = GRAPH.with(|g| {
        let mut g = g.borrow_mut();
        g.unlink_sources(id);
        let node = g.observers.get_mut(id)?;
        node.dirty = false;
        Some(node.run.clone())
    });
    let Some(run) = run else {
        return;
    };
    let _ctx = TrackingGuard::push(Some(id));
    let _running = RunningGuard::enter(id);
    run();
}

/// Run `f` as observer `id` and return its result. Used by derived cells,
/// whose computation produces a value instead of a side effect.
pub fn run_tracked<R>(id: ObserverId, f: impl FnOnce() -> R) -> R {
    GRAPH.with(|g| {
        let mut g = g.borrow_mut();
        g.unlink_sources(id);
        if let Some(node) = g.observers.get_mut(id) {
            node.dirty = false;
        }
    });
    let _ctx = TrackingGuard::push(Some(id));
    let _running = RunningGuard::enter(id);
    f()
}

pub fn is_dirty(id: ObserverId) -> bool {
    GRAPH.with(|g| g.borrow().observers.get(id).is_some_and(|n| n.dirty))
}

/// Run `f` with dependency tracking suspended.
pub fn untracked<R>(f: impl FnOnce() -> R) -> R {
    let _ctx = TrackingGuard::push(None);
    f()
}

pub fn subscriber_count(sig: SignalId) -> usize {
    GRAPH.with(|g| g.borrow().sources.get(sig).map_or(0, |s| s.subscribers.len()))
}

/// Sources read by `obs` during its last run, in read order.
pub fn dependencies(obs: ObserverId) -> Vec<SignalId> {
    GRAPH.with(|g| {
        g.borrow()
            .observers
            .get(obs)
            .map(|n| n.sources.to_vec())
            .unwrap_or_default()
    })
}

pub fn stats() -> GraphStats {
    GRAPH.with(|g| {
        let g = g.borrow();
        GraphStats {
            sources: g.sources.len(),
            observers: g.observers.len(),
            edges: g.sources.values().map(|s| s.subscribers.len()).sum(),
        }
    })
}
