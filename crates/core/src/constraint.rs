//! Placement constraints between mates.

use rig_geom::Frame;
use serde::{Deserialize, Serialize};

use crate::mate::Mate;
use crate::store::ComponentId;

/// A declarative placement relationship consumed by the solver.
///
/// Every constraint places exactly one component: the owner of its first
/// mate. Targets are read-only inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Constraint {
    /// Pin `mate` onto `target`, an absolute frame given in the solve base
    /// system. Fully determines the owner's placement on its own.
    Fixed { mate: Mate, target: Frame },

    /// Pin `mate` onto `target_mate`'s world frame, displaced by `offset`
    /// expressed in the target mate's system. Becomes solvable once the
    /// target's owner is placed.
    Coincident {
        mate: Mate,
        target_mate: Mate,
        offset: Frame,
    },
}

impl Constraint {
    /// Fix `mate` at the solve base frame itself.
    pub fn fixed(mate: Mate) -> Self {
        Self::Fixed {
            mate,
            target: Frame::identity(),
        }
    }

    /// Fix `mate` at `target`, given in the solve base system.
    pub fn fixed_at(mate: Mate, target: Frame) -> Self {
        Self::Fixed { mate, target }
    }

    /// Make `mate` coincide with `target_mate`.
    pub fn coincident(mate: Mate, target_mate: Mate) -> Self {
        Self::Coincident {
            mate,
            target_mate,
            offset: Frame::identity(),
        }
    }

    /// Make `mate` coincide with `target_mate` displaced by `offset`.
    pub fn coincident_offset(mate: Mate, target_mate: Mate, offset: Frame) -> Self {
        Self::Coincident {
            mate,
            target_mate,
            offset,
        }
    }

    /// The mate this constraint places.
    pub fn mate(&self) -> &Mate {
        match self {
            Self::Fixed { mate, .. } | Self::Coincident { mate, .. } => mate,
        }
    }

    /// The component this constraint places, if the mate is owned.
    pub fn placed(&self) -> Option<ComponentId> {
        self.mate().owner()
    }
}
