//! # Signals, derived cells and effects
//!
//! Trellis keeps UI state in a small push-based reactive core. There are four
//! pieces:
//!
//! - `Signal<T>`: an observable value.
//! - `Derived<T>`: a cached computation over other reactive values.
//! - `effect` / `watch`: side effects that re-run when what they read changes.
//! - `Store<T>`: an observable wrapper around plain data and collections.
//!
//! ## Signals
//!
//! ```rust
//! use trellis_core::*;
//!
//! let count = signal(0);
//! count.set(1);
//! count.update(|v| *v += 1);
//! assert_eq!(count.get(), 2);
//! ```
//!
//! Writing a value equal to the current one is a no-op: nobody is notified.
//!
//! ## Effects
//!
//! An effect runs immediately and records every reactive value it reads. The
//! next write to any of them re-runs it, synchronously, before `set` returns.
//! The dependency set is rebuilt on every run, so a branch that stops
//! reading a signal also stops reacting to it.
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use trellis_core::*;
//!
//! let name = signal("Jane".to_string());
//! let seen = Rc::new(RefCell::new(Vec::new()));
//!
//! let e = effect({
//!     let name = name.clone();
//!     let seen = seen.clone();
//!     move || seen.borrow_mut().push(name.get())
//! });
//!
//! name.set("Joe".to_string());
//! e.dispose();
//! name.set("Ann".to_string());
//! assert_eq!(*seen.borrow(), ["Jane", "Joe"]);
//! ```
//!
//! ## Scopes
//!
//! A `Scope` owns effects and cleanup callbacks. Anything created while a
//! scope is current (see [`Scope::run`]) is torn down when it is disposed:
//!
//! ```rust
//! use trellis_core::*;
//!
//! let scope = Scope::new();
//! let count = signal(0);
//! scope.run(|| {
//!     let count = count.clone();
//!     effect(move || log::info!("count = {}", count.get()));
//! });
//! assert_eq!(count.subscriber_count(), 1);
//! scope.dispose();
//! assert_eq!(count.subscriber_count(), 0);
//! ```
//!
//! ## Stores
//!
//! ```rust
//! use trellis_core::*;
//!
//! let todos = reactive(vec!["write docs".to_string()]);
//! todos.push("ship".to_string());
//! assert_eq!(todos.len(), 2);
//! assert_eq!(todos.item(1).get().as_deref(), Some("ship"));
//! ```
//!
//! Everything here is single-threaded; handles are `Rc`-based and the graph
//! lives in thread-local storage.

#![forbid(unsafe_code)]

pub mod effects;
pub mod error;
pub mod prelude;
pub mod reactive;
pub mod runtime;
pub mod scope;
pub mod signal;
pub mod state;
pub mod store;
pub mod tests;

pub use effects::*;
pub use error::*;
pub use reactive::{GraphStats, ObserverId, SignalId, stats};
pub use runtime::*;
pub use scope::*;
pub use signal::*;
pub use state::*;
pub use store::*;
