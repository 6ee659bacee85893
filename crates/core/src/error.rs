//! Error taxonomy for the placement core.
//!
//! Contract violations are caller bugs and fail a build immediately.
//! [`PlacementNotReady`] is transient: the solver skips and retries such
//! constraints, and only a full pass with no progress becomes
//! [`SolveError::Unsolvable`].

use thiserror::Error;

use crate::constraint::Constraint;
use crate::store::ComponentId;
use rig_shape::ShapeError;

/// A plan or caller broke the assembly contract.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContractViolation {
    #[error("child name may not be empty")]
    EmptyChildName,

    #[error("child name {name:?} may not contain '.'")]
    DottedChildName { name: String },

    #[error("assembly already has a child named {name:?}")]
    DuplicateChildName { name: String },

    #[error("component {id:?} is not in the store")]
    UnknownComponent { id: ComponentId },

    #[error("constraint places a mate with no owning component")]
    UnownedMate,

    #[error("assembly {id:?} is already being built")]
    ReentrantBuild { id: ComponentId },

    #[error("component {id:?} is not an assembly")]
    NotAnAssembly { id: ComponentId },

    #[error("component {id:?} is not a part")]
    NotAPart { id: ComponentId },
}

/// A mate's owner has no world placement yet.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("component {owner:?} has not been placed yet")]
pub struct PlacementNotReady {
    pub owner: ComponentId,
}

/// Failures while resolving constraints into placements.
#[derive(Debug, Error, Clone)]
pub enum SolveError {
    /// A full pass over the remaining constraints resolved none of them.
    #[error("no constraint could be resolved; {} left unsolved", remaining.len())]
    Unsolvable { remaining: Vec<Constraint> },

    #[error(transparent)]
    NotReady(#[from] PlacementNotReady),

    #[error("constraint references component {id:?} which is not in the store")]
    UnknownComponent { id: ComponentId },

    #[error("constraint places a mate with no owning component")]
    UnownedMate,
}

/// Failures while looking up components or mates by name.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FindError {
    #[error("no child {segment:?} while walking {path:?}")]
    NoSuchChild { path: String, segment: String },

    #[error("cannot descend into {segment:?} of {path:?}: not an assembly")]
    NotAnAssembly { path: String, segment: String },

    #[error("component has no mate named {name:?}")]
    UnknownMate { name: String },

    #[error("component {id:?} is not in the store")]
    UnknownComponent { id: ComponentId },
}

/// Any failure surfaced by the build cycle.
#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error(transparent)]
    Contract(#[from] ContractViolation),

    #[error(transparent)]
    Solve(#[from] SolveError),

    #[error(transparent)]
    Shape(#[from] ShapeError),

    #[error(transparent)]
    Find(#[from] FindError),

    #[error(transparent)]
    NotReady(#[from] PlacementNotReady),
}
