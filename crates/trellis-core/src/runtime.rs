//! Per-thread runtime settings for the reactive core.

use std::cell::RefCell;

/// Tunables read by the dependency graph while propagating changes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReactiveConfig {
    /// How many nested change notifications may be in flight before the
    /// propagation is treated as a runaway cycle and aborted.
    pub max_propagation_depth: usize,
}

impl Default for ReactiveConfig {
    fn default() -> Self {
        Self {
            max_propagation_depth: 100,
        }
    }
}

thread_local! {
    static CONFIG: RefCell<ReactiveConfig> = RefCell::new(ReactiveConfig::default());
}

/// Replace the settings for the current thread.
pub fn configure(config: ReactiveConfig) {
    log::debug!("reactive config: {config:?}");
    CONFIG.with(|c| *c.borrow_mut() = config);
}

pub fn config() -> ReactiveConfig {
    CONFIG.with(|c| c.borrow().clone())
}
