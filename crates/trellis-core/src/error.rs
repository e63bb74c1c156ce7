use thiserror::Error;

use crate::reactive::SignalId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReactiveError {
    #[error("signal {0:?} was written after it was disposed")]
    Disposed(SignalId),

    #[error(
        "change propagation nested deeper than {limit} levels; an effect keeps writing a cell it depends on"
    )]
    CycleDetected { limit: usize },
}
