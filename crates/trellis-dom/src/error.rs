use thiserror::Error;

use crate::dom::NodeId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    #[error("invalid selector `{0}`")]
    InvalidSelector(String),

    #[error("no node matches `{0}`")]
    TargetNotFound(String),

    #[error("node {0:?} no longer exists")]
    StaleNode(NodeId),

    #[error("cannot place {child:?} under {parent:?}: a node cannot contain itself")]
    Hierarchy { parent: NodeId, child: NodeId },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    #[error(
        "`{0}` is not a valid surface name (lowercase ASCII letters, digits and hyphens, starting with a letter and containing a hyphen)"
    )]
    InvalidName(String),
}
