pub use crate::effects::{Dispose, Effect, effect, untracked, watch};
pub use crate::error::ReactiveError;
pub use crate::runtime::{ReactiveConfig, config, configure};
pub use crate::scope::{Scope, current_scope, on_cleanup, open_scope, scoped_effect};
pub use crate::signal::{Signal, Trigger, signal};
pub use crate::state::{Derived, WritableDerived, derived};
pub use crate::store::{Depth, Store, reactive, shallow_reactive};
