//! Arena of components addressed by stable ids.
//!
//! Parent/child edges live on assemblies as named references into the arena,
//! so the tree can be traversed, rebuilt and partially replaced without any
//! borrowed self-references.

use rig_geom::Frame;
use rig_shape::{ShapeHandle, ShapeKernel};
use slotmap::{SlotMap, new_key_type};
use tracing::debug;

use crate::component::{Assembly, AssemblyPlan, Component, Part, PartDef};
use crate::constraint::Constraint;
use crate::error::{BuildError, ContractViolation, FindError, PlacementNotReady};
use crate::mate::Mate;

new_key_type! {
    /// Stable identifier of a component in a [`ComponentStore`].
    pub struct ComponentId;
}

/// Arena owning every component of a model.
#[derive(Debug, Default)]
pub struct ComponentStore {
    components: SlotMap<ComponentId, Component>,
}

impl ComponentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a leaf component; returns its id.
    pub fn insert_part(&mut self, def: impl PartDef + 'static) -> ComponentId {
        self.components.insert(Component::Part(Part::new(def)))
    }

    /// Add an assembly with the given build plan; returns its id.
    pub fn insert_assembly(&mut self, plan: impl AssemblyPlan + 'static) -> ComponentId {
        self.components
            .insert(Component::Assembly(Assembly::new(plan)))
    }

    pub fn get(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: ComponentId) -> Option<&mut Component> {
        self.components.get_mut(id)
    }

    pub fn contains(&self, id: ComponentId) -> bool {
        self.components.contains_key(id)
    }

    /// Whether `id` names an assembly.
    pub fn is_assembly(&self, id: ComponentId) -> bool {
        self.get(id).is_some_and(Component::is_assembly)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Ids of every component in the arena, in arbitrary order.
    pub fn ids(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.components.keys()
    }

    /// World placement of a component, if it has been solved or set.
    pub fn world_frame(&self, id: ComponentId) -> Option<Frame> {
        self.get(id).and_then(Component::world_frame)
    }

    /// Set a component's world placement directly.
    ///
    /// Drops the component's world-shape cache. Never re-runs a solve; a
    /// caller that wants constraints re-applied rebuilds the assembly.
    pub fn set_world_frame(
        &mut self,
        id: ComponentId,
        frame: Frame,
    ) -> Result<(), ContractViolation> {
        let component = self
            .get_mut(id)
            .ok_or(ContractViolation::UnknownComponent { id })?;
        component.set_world_frame(frame);
        Ok(())
    }

    /// Named mate on a component.
    pub fn mate(&self, id: ComponentId, name: &str) -> Result<Mate, FindError> {
        let component = self.get(id).ok_or(FindError::UnknownComponent { id })?;
        let local = component
            .local_mate(name)
            .ok_or_else(|| FindError::UnknownMate {
                name: name.to_owned(),
            })?;
        Ok(Mate::new(id, local))
    }

    /// Mate names a component answers (empty for unknown ids).
    pub fn mate_names(&self, id: ComponentId) -> Vec<&'static str> {
        self.get(id).map(Component::mate_names).unwrap_or_default()
    }

    /// Children of an assembly; empty for parts and unknown ids.
    pub fn children(&self, id: ComponentId) -> &[(String, ComponentId)] {
        self.get(id)
            .and_then(Component::as_assembly)
            .map(Assembly::children)
            .unwrap_or(&[])
    }

    /// Constraints of an assembly; empty for parts and unknown ids.
    pub(crate) fn constraint_list(&self, id: ComponentId) -> &[Constraint] {
        self.get(id)
            .and_then(Component::as_assembly)
            .map(Assembly::constraints)
            .unwrap_or(&[])
    }

    /// Direct child of an assembly, by name.
    pub fn child(&self, id: ComponentId, name: &str) -> Option<ComponentId> {
        self.get(id)?.as_assembly()?.child(name)
    }

    /// Walk a dotted path of child names from `root`.
    ///
    /// `find(root, "stack.brick0")` descends through child `stack` into its
    /// child `brick0`. Purely a read: nothing is built along the way.
    pub fn find(&self, root: ComponentId, path: &str) -> Result<ComponentId, FindError> {
        let mut current = root;
        for segment in path.split('.') {
            let component = self
                .get(current)
                .ok_or_else(|| FindError::NoSuchChild {
                    path: path.to_owned(),
                    segment: segment.to_owned(),
                })?;
            let Some(assembly) = component.as_assembly() else {
                return Err(FindError::NotAnAssembly {
                    path: path.to_owned(),
                    segment: segment.to_owned(),
                });
            };
            current = assembly
                .child(segment)
                .ok_or_else(|| FindError::NoSuchChild {
                    path: path.to_owned(),
                    segment: segment.to_owned(),
                })?;
        }
        Ok(current)
    }

    /// The part's local-system solid, built and cached on first use.
    pub fn local_shape(
        &mut self,
        id: ComponentId,
        kernel: &mut dyn ShapeKernel,
    ) -> Result<ShapeHandle, BuildError> {
        let part = self.part_mut(id)?;
        if let Some(shape) = part.local_shape {
            return Ok(shape);
        }
        let shape = part.def.make(kernel)?;
        part.local_shape = Some(shape);
        debug!(?id, "built local shape");
        Ok(shape)
    }

    /// The part's world-placed solid, built and cached on first use.
    ///
    /// Requires the part to be placed.
    pub fn world_shape(
        &mut self,
        id: ComponentId,
        kernel: &mut dyn ShapeKernel,
    ) -> Result<ShapeHandle, BuildError> {
        let local = self.local_shape(id, kernel)?;
        let part = self.part_mut(id)?;
        if let Some(shape) = part.world_shape {
            return Ok(shape);
        }
        let Some(frame) = part.world_frame else {
            return Err(PlacementNotReady { owner: id }.into());
        };
        let world = kernel.transformed(local, &frame)?;
        part.world_shape = Some(world);
        debug!(?id, "built world shape");
        Ok(world)
    }

    /// Replace a part's local solid, dropping its world-shape cache.
    pub(crate) fn set_local_shape(
        &mut self,
        id: ComponentId,
        shape: ShapeHandle,
    ) -> Result<(), BuildError> {
        let part = self.part_mut(id)?;
        part.local_shape = Some(shape);
        part.world_shape = None;
        Ok(())
    }

    fn part_mut(&mut self, id: ComponentId) -> Result<&mut Part, BuildError> {
        match self.get_mut(id) {
            None => Err(ContractViolation::UnknownComponent { id }.into()),
            Some(Component::Assembly(_)) => Err(ContractViolation::NotAPart { id }.into()),
            Some(Component::Part(part)) => Ok(part),
        }
    }

    /// Remove a component and, recursively, everything under it.
    pub fn remove_subtree(&mut self, id: ComponentId) {
        let children: Vec<ComponentId> =
            self.children(id).iter().map(|(_, child)| *child).collect();
        for child in children {
            self.remove_subtree(child);
        }
        self.components.remove(id);
    }
}
