//! Greedy single-pass constraint resolution.
//!
//! Constraints are attempted in declaration order. One whose dependencies
//! are not placed yet is skipped and retried after the rest of the set; a
//! full pass that resolves nothing means the remainder can never resolve,
//! and the solve fails rather than loops.

use rig_geom::Frame;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::constraint::Constraint;
use crate::error::SolveError;
use crate::store::{ComponentId, ComponentStore};

/// One solved placement: where a component should go.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Placement {
    pub component: ComponentId,
    pub frame: Frame,
}

/// Incremental solver over a constraint set.
///
/// [`ConstraintSolver::next_placement`] yields one placement at a time; the
/// caller applies each to its store before pulling the next, which is what
/// lets later constraints chain onto earlier results. [`solve_apply`] wraps
/// that loop for the common case.
#[derive(Debug)]
pub struct ConstraintSolver {
    remaining: Vec<Constraint>,
    base: Frame,
    cursor: usize,
    progressed: bool,
}

impl ConstraintSolver {
    /// Solver over `constraints`, resolving Fixed targets against `base`.
    pub fn new(constraints: impl IntoIterator<Item = Constraint>, base: Frame) -> Self {
        Self {
            remaining: constraints.into_iter().collect(),
            base,
            cursor: 0,
            progressed: false,
        }
    }

    /// Constraints not yet resolved, in declaration order.
    pub fn remaining(&self) -> &[Constraint] {
        &self.remaining
    }

    /// Resolve and return the next placement.
    ///
    /// Returns `None` once every constraint is resolved. The caller must
    /// apply each placement to the store before the next call, or dependent
    /// constraints never become ready and the solve ends unsolvable.
    pub fn next_placement(
        &mut self,
        store: &ComponentStore,
    ) -> Option<Result<Placement, SolveError>> {
        loop {
            if self.remaining.is_empty() {
                return None;
            }
            if self.cursor >= self.remaining.len() {
                if !self.progressed {
                    warn!(
                        remaining = self.remaining.len(),
                        "constraint pass made no progress"
                    );
                    return Some(Err(SolveError::Unsolvable {
                        remaining: std::mem::take(&mut self.remaining),
                    }));
                }
                debug!(
                    remaining = self.remaining.len(),
                    "constraint pass wrapped"
                );
                self.cursor = 0;
                self.progressed = false;
            }
            match resolve(&self.remaining[self.cursor], self.base, store) {
                Ok(placement) => {
                    self.remaining.remove(self.cursor);
                    self.progressed = true;
                    debug!(component = ?placement.component, "constraint resolved");
                    return Some(Ok(placement));
                }
                Err(SolveError::NotReady(_)) => {
                    self.cursor += 1;
                }
                Err(fatal) => return Some(Err(fatal)),
            }
        }
    }
}

/// Compute the placement a single constraint implies right now.
fn resolve(
    constraint: &Constraint,
    base: Frame,
    store: &ComponentStore,
) -> Result<Placement, SolveError> {
    let component = constraint.placed().ok_or(SolveError::UnownedMate)?;
    if !store.contains(component) {
        return Err(SolveError::UnknownComponent { id: component });
    }
    let frame = match constraint {
        Constraint::Fixed { mate, target } => base * *target * mate.local().inverse(),
        Constraint::Coincident {
            mate,
            target_mate,
            offset,
        } => target_mate.world(store)? * *offset * mate.local().inverse(),
    };
    Ok(Placement { component, frame })
}

/// Run a solver to completion, applying each placement to the store.
#[instrument(skip(store, constraints, base), fields(base_origin = ?base.origin()))]
pub fn solve_apply(
    store: &mut ComponentStore,
    constraints: impl IntoIterator<Item = Constraint>,
    base: Frame,
) -> Result<Vec<Placement>, SolveError> {
    let mut solver = ConstraintSolver::new(constraints, base);
    let mut applied = Vec::new();
    while let Some(step) = solver.next_placement(store) {
        let placement = step?;
        store
            .set_world_frame(placement.component, placement.frame)
            .map_err(|_| SolveError::UnknownComponent {
                id: placement.component,
            })?;
        applied.push(placement);
    }
    Ok(applied)
}
