//! Component kinds and the traits user code implements for them.
//!
//! A model is a tree of [`Component`]s held in a store arena: leaf parts
//! carrying a [`PartDef`] geometry recipe, and assemblies carrying an
//! [`AssemblyPlan`] that declares children and constraints in rounds.

use std::fmt;

use rig_geom::Frame;
use rig_shape::{ShapeError, ShapeHandle, ShapeKernel};

use crate::build::BuildCtx;
use crate::constraint::Constraint;
use crate::error::BuildError;
use crate::store::ComponentId;

/// Geometry recipe for a leaf component.
///
/// `make` runs lazily: the store calls it the first time someone asks for
/// the part's shape, never during placement solving.
pub trait PartDef: fmt::Debug {
    /// Construct the part's solid in its local system.
    fn make(&self, kernel: &mut dyn ShapeKernel) -> Result<ShapeHandle, ShapeError>;

    /// Frame of the named mate point in the part's local system.
    ///
    /// The default answers only `origin`. Parts with richer mate sets
    /// usually route this through a
    /// [`MateRegistry`](crate::mate::MateRegistry).
    fn local_mate(&self, name: &str) -> Option<Frame> {
        (name == "origin").then(Frame::identity)
    }

    /// Mate names this part answers, in declaration order.
    fn mate_names(&self) -> Vec<&'static str> {
        vec!["origin"]
    }
}

/// Staged recipe for an assembly's children, constraints and alterations.
///
/// The build cycle polls each hook once per round with the round index and
/// a [`BuildCtx`] over the store. Returning `Ok(Some(batch))` contributes
/// that round's batch; returning `Ok(None)` marks the hook exhausted, after
/// which it is not polled again. The build ends on the first round where
/// every hook is exhausted.
pub trait AssemblyPlan: fmt::Debug {
    /// Children added this round, as `(name, id)` pairs.
    ///
    /// Ids come from [`BuildCtx::add_part`] / [`BuildCtx::add_assembly`].
    /// Names must be non-empty, dot-free and unique within the assembly.
    fn components(
        &self,
        round: usize,
        ctx: &mut BuildCtx<'_>,
    ) -> Result<Option<Vec<(String, ComponentId)>>, BuildError>;

    /// Constraints added this round, over children declared so far.
    fn constraints(
        &self,
        round: usize,
        ctx: &BuildCtx<'_>,
    ) -> Result<Option<Vec<Constraint>>, BuildError>;

    /// Post-solve mutations for this round: shape edits, frame overrides.
    ///
    /// Runs after the round's constraints are solved, so world placements of
    /// everything declared so far are available.
    fn alterations(&self, round: usize, ctx: &mut BuildCtx<'_>) -> Result<Option<()>, BuildError> {
        let _ = (round, ctx);
        Ok(None)
    }

    /// Frame of the named mate point in the assembly's local system.
    fn local_mate(&self, name: &str) -> Option<Frame> {
        (name == "origin").then(Frame::identity)
    }

    /// Mate names this assembly answers, in declaration order.
    fn mate_names(&self) -> Vec<&'static str> {
        vec!["origin"]
    }
}

/// A leaf component: geometry recipe plus cached placement and shapes.
#[derive(Debug)]
pub struct Part {
    pub(crate) def: Box<dyn PartDef>,
    pub(crate) world_frame: Option<Frame>,
    pub(crate) local_shape: Option<ShapeHandle>,
    pub(crate) world_shape: Option<ShapeHandle>,
}

impl Part {
    pub fn new(def: impl PartDef + 'static) -> Self {
        Self {
            def: Box::new(def),
            world_frame: None,
            local_shape: None,
            world_shape: None,
        }
    }

    pub fn def(&self) -> &dyn PartDef {
        self.def.as_ref()
    }
}

/// An interior component: build plan plus accumulated children and
/// constraints.
#[derive(Debug)]
pub struct Assembly {
    /// Taken while the plan's hooks run, which is also the re-entrancy guard.
    pub(crate) plan: Option<Box<dyn AssemblyPlan>>,
    pub(crate) children: Vec<(String, ComponentId)>,
    pub(crate) constraints: Vec<Constraint>,
    pub(crate) world_frame: Option<Frame>,
    pub(crate) built: bool,
}

impl Assembly {
    pub fn new(plan: impl AssemblyPlan + 'static) -> Self {
        Self {
            plan: Some(Box::new(plan)),
            children: Vec::new(),
            constraints: Vec::new(),
            world_frame: None,
            built: false,
        }
    }

    /// Named children in declaration order.
    pub fn children(&self) -> &[(String, ComponentId)] {
        &self.children
    }

    /// Constraints accumulated across build rounds, in declaration order.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Child id by name.
    pub fn child(&self, name: &str) -> Option<ComponentId> {
        self.children
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, id)| *id)
    }

    /// Whether the last build ran to completion.
    pub fn is_built(&self) -> bool {
        self.built
    }
}

/// A node in the component arena.
#[derive(Debug)]
pub enum Component {
    Part(Part),
    Assembly(Assembly),
}

impl Component {
    pub fn is_assembly(&self) -> bool {
        matches!(self, Self::Assembly(_))
    }

    pub fn as_part(&self) -> Option<&Part> {
        match self {
            Self::Part(part) => Some(part),
            Self::Assembly(_) => None,
        }
    }

    pub fn as_assembly(&self) -> Option<&Assembly> {
        match self {
            Self::Assembly(assembly) => Some(assembly),
            Self::Part(_) => None,
        }
    }

    pub(crate) fn as_assembly_mut(&mut self) -> Option<&mut Assembly> {
        match self {
            Self::Assembly(assembly) => Some(assembly),
            Self::Part(_) => None,
        }
    }

    /// World placement, if the component has been solved or set.
    pub fn world_frame(&self) -> Option<Frame> {
        match self {
            Self::Part(part) => part.world_frame,
            Self::Assembly(assembly) => assembly.world_frame,
        }
    }

    /// Set the placement, dropping any world-shape cache that depended on it.
    pub(crate) fn set_world_frame(&mut self, frame: Frame) {
        match self {
            Self::Part(part) => {
                part.world_frame = Some(frame);
                part.world_shape = None;
            }
            Self::Assembly(assembly) => {
                assembly.world_frame = Some(frame);
            }
        }
    }

    /// Frame of the named mate point in the component's local system.
    pub fn local_mate(&self, name: &str) -> Option<Frame> {
        match self {
            Self::Part(part) => part.def.local_mate(name),
            Self::Assembly(assembly) => match &assembly.plan {
                Some(plan) => plan.local_mate(name),
                // Mid-build the plan is taken; only the default mate answers.
                None => (name == "origin").then(Frame::identity),
            },
        }
    }

    /// Mate names the component answers.
    pub fn mate_names(&self) -> Vec<&'static str> {
        match self {
            Self::Part(part) => part.def.mate_names(),
            Self::Assembly(assembly) => match &assembly.plan {
                Some(plan) => plan.mate_names(),
                None => vec!["origin"],
            },
        }
    }
}
