//! Mates: named attachment frames on components.
//!
//! A mate couples a component id with a frame in that component's local
//! system. Constraints speak entirely in mates, so "put this part's bottom
//! on that part's top" never touches raw coordinates at the call site.

use std::fmt;

use rig_geom::Frame;
use serde::{Deserialize, Serialize};

use crate::error::{PlacementNotReady, SolveError};
use crate::store::{ComponentId, ComponentStore};

/// A named attachment frame bound to a component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mate {
    owner: Option<ComponentId>,
    local: Frame,
}

impl Mate {
    /// Mate on `owner`, at `local` in the owner's system.
    pub fn new(owner: ComponentId, local: Frame) -> Self {
        Self {
            owner: Some(owner),
            local,
        }
    }

    /// Free-standing mate expressing an absolute world frame.
    pub fn free(local: Frame) -> Self {
        Self { owner: None, local }
    }

    pub fn owner(&self) -> Option<ComponentId> {
        self.owner
    }

    pub fn local(&self) -> Frame {
        self.local
    }

    /// The mate's frame in world coordinates.
    ///
    /// Requires the owner to be placed. A free mate's local frame already is
    /// world-absolute, so it never waits on a placement.
    pub fn world(&self, store: &ComponentStore) -> Result<Frame, SolveError> {
        let Some(owner) = self.owner else {
            return Ok(self.local);
        };
        let component = store
            .get(owner)
            .ok_or(SolveError::UnknownComponent { id: owner })?;
        let world = component
            .world_frame()
            .ok_or(PlacementNotReady { owner })?;
        Ok(world * self.local)
    }

    /// A mate on the same owner, displaced by `offset` in this mate's system.
    pub fn offset(&self, offset: Frame) -> Mate {
        Mate {
            owner: self.owner,
            local: self.local * offset,
        }
    }
}

/// Ordered name-to-accessor table for a concrete component type.
///
/// A type builds its table once (typically under a `OnceLock` static),
/// seeding it from whatever shared base tables apply and then adding or
/// overriding entries. Later entries win on name collisions without
/// disturbing declaration order, which is what `names` reports.
pub struct MateRegistry<T: ?Sized> {
    entries: Vec<(&'static str, fn(&T) -> Frame)>,
}

impl<T: ?Sized> MateRegistry<T> {
    /// Table with no entries at all.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Table holding the one mate every component answers: `origin`.
    pub fn new() -> Self {
        Self::empty().with("origin", |_| Frame::identity())
    }

    /// Add `accessor` under `name`, replacing any existing entry in place.
    pub fn with(mut self, name: &'static str, accessor: fn(&T) -> Frame) -> Self {
        if let Some(slot) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = accessor;
        } else {
            self.entries.push((name, accessor));
        }
        self
    }

    /// Fold another table in; its entries replace same-named ones here.
    pub fn merged(self, other: MateRegistry<T>) -> Self {
        other
            .entries
            .into_iter()
            .fold(self, |table, (name, accessor)| table.with(name, accessor))
    }

    /// Evaluate the named mate frame on `value`.
    pub fn local(&self, value: &T, name: &str) -> Option<Frame> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, accessor)| accessor(value))
    }

    /// Registered names in declaration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|(name, _)| *name).collect()
    }
}

impl<T: ?Sized> Default for MateRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for MateRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MateRegistry")
            .field("names", &self.names())
            .finish()
    }
}
