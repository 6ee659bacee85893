//! Round-based assembly build orchestration.
//!
//! A build polls the plan's hooks in lockstep rounds: merge this round's
//! children, append this round's constraints, solve the accumulated set,
//! then run alterations. Rounds continue while any hook still produces;
//! child assemblies build after their parent, so their solve bases see the
//! parent's placements.

use rig_geom::Frame;
use rig_shape::{ShapeHandle, ShapeKernel};
use tracing::{debug, instrument};

use crate::component::{AssemblyPlan, Component, PartDef};
use crate::constraint::Constraint;
use crate::error::{BuildError, ContractViolation, FindError};
use crate::mate::Mate;
use crate::solve::{Placement, solve_apply};
use crate::store::{ComponentId, ComponentStore};

/// Build-time view of the store that a plan's hooks work through.
pub struct BuildCtx<'a> {
    store: &'a mut ComponentStore,
    kernel: &'a mut dyn ShapeKernel,
    assembly: ComponentId,
}

impl<'a> BuildCtx<'a> {
    fn new(
        store: &'a mut ComponentStore,
        kernel: &'a mut dyn ShapeKernel,
        assembly: ComponentId,
    ) -> Self {
        Self {
            store,
            kernel,
            assembly,
        }
    }

    /// Id of the assembly being built.
    pub fn assembly(&self) -> ComponentId {
        self.assembly
    }

    /// Register a new part in the store.
    ///
    /// The id still has to be declared as a named child in the returned
    /// `components` batch before constraints can reach it by name.
    pub fn add_part(&mut self, def: impl PartDef + 'static) -> ComponentId {
        self.store.insert_part(def)
    }

    /// Register a new sub-assembly in the store.
    pub fn add_assembly(&mut self, plan: impl AssemblyPlan + 'static) -> ComponentId {
        self.store.insert_assembly(plan)
    }

    /// Child of the building assembly, by name.
    pub fn child(&self, name: &str) -> Option<ComponentId> {
        self.store.child(self.assembly, name)
    }

    /// Mate `mate_name` on the child called `child_name`.
    pub fn mate(&self, child_name: &str, mate_name: &str) -> Result<Mate, FindError> {
        let id = self.child(child_name).ok_or_else(|| FindError::NoSuchChild {
            path: child_name.to_owned(),
            segment: child_name.to_owned(),
        })?;
        self.store.mate(id, mate_name)
    }

    /// Read access to the whole store.
    pub fn store(&self) -> &ComponentStore {
        self.store
    }

    /// The kernel this build constructs shapes against.
    pub fn kernel(&mut self) -> &mut dyn ShapeKernel {
        self.kernel
    }

    /// World placement of any component, if it has one.
    pub fn world_frame(&self, id: ComponentId) -> Option<Frame> {
        self.store.world_frame(id)
    }

    /// Place a component directly, bypassing the solver.
    pub fn set_world_frame(
        &mut self,
        id: ComponentId,
        frame: Frame,
    ) -> Result<(), ContractViolation> {
        self.store.set_world_frame(id, frame)
    }

    /// Local solid of a part, built on demand.
    pub fn local_shape(&mut self, id: ComponentId) -> Result<ShapeHandle, BuildError> {
        self.store.local_shape(id, self.kernel)
    }

    /// World-placed solid of a part, built on demand.
    pub fn world_shape(&mut self, id: ComponentId) -> Result<ShapeHandle, BuildError> {
        self.store.world_shape(id, self.kernel)
    }

    /// Replace a part's local solid, e.g. after cutting it down.
    pub fn set_local_shape(
        &mut self,
        id: ComponentId,
        shape: ShapeHandle,
    ) -> Result<(), BuildError> {
        self.store.set_local_shape(id, shape)
    }
}

/// What one build round did.
#[derive(Debug, Clone, Default)]
pub struct RoundReport {
    pub round: usize,
    /// Names of children merged this round, in declaration order.
    pub components_added: Vec<String>,
    /// Number of constraints appended this round.
    pub constraints_added: usize,
    /// Placements applied by this round's solve, in resolution order.
    pub placements: Vec<Placement>,
    /// Whether a solve ran this round.
    pub solved: bool,
    /// Whether the alterations hook produced this round.
    pub altered: bool,
}

/// Full record of a build.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub rounds: Vec<RoundReport>,
    /// Reports of recursively built child assemblies, in child order.
    pub child_reports: Vec<(ComponentId, BuildReport)>,
}

impl ComponentStore {
    /// Run an assembly's build plan to exhaustion.
    ///
    /// Re-running a build replaces the assembly's previous children
    /// wholesale: the old subtrees are removed from the store first. With
    /// `recursive` set, child assemblies build after the parent's rounds
    /// finish.
    #[instrument(skip(self, kernel))]
    pub fn build(
        &mut self,
        id: ComponentId,
        kernel: &mut dyn ShapeKernel,
        recursive: bool,
    ) -> Result<BuildReport, BuildError> {
        let assembly = match self.get_mut(id) {
            None => return Err(ContractViolation::UnknownComponent { id }.into()),
            Some(Component::Part(_)) => {
                return Err(ContractViolation::NotAnAssembly { id }.into());
            }
            Some(Component::Assembly(assembly)) => assembly,
        };
        let Some(plan) = assembly.plan.take() else {
            return Err(ContractViolation::ReentrantBuild { id }.into());
        };
        let stale: Vec<ComponentId> = assembly.children.drain(..).map(|(_, child)| child).collect();
        assembly.constraints.clear();
        assembly.built = false;
        for child in stale {
            self.remove_subtree(child);
        }

        let result = self.run_rounds(id, plan.as_ref(), kernel);

        // The plan goes back even on failure, so the assembly can be rebuilt
        // after the caller repairs its input.
        if let Some(Component::Assembly(assembly)) = self.get_mut(id) {
            assembly.plan = Some(plan);
        }
        let mut report = result?;

        if recursive {
            let children: Vec<ComponentId> =
                self.children(id).iter().map(|(_, child)| *child).collect();
            for child in children {
                if self.is_assembly(child) {
                    let child_report = self.build(child, kernel, true)?;
                    report.child_reports.push((child, child_report));
                }
            }
        }

        if let Some(Component::Assembly(assembly)) = self.get_mut(id) {
            assembly.built = true;
        }
        debug!(?id, rounds = report.rounds.len(), "assembly built");
        Ok(report)
    }

    /// Children of an assembly, running its build first when needed.
    pub fn components(
        &mut self,
        id: ComponentId,
        kernel: &mut dyn ShapeKernel,
    ) -> Result<&[(String, ComponentId)], BuildError> {
        self.ensure_built(id, kernel)?;
        Ok(self.children(id))
    }

    /// Constraints of an assembly, running its build first when needed.
    pub fn constraints(
        &mut self,
        id: ComponentId,
        kernel: &mut dyn ShapeKernel,
    ) -> Result<&[Constraint], BuildError> {
        self.ensure_built(id, kernel)?;
        Ok(self.constraint_list(id))
    }

    fn ensure_built(
        &mut self,
        id: ComponentId,
        kernel: &mut dyn ShapeKernel,
    ) -> Result<(), BuildError> {
        let built = match self.get(id) {
            None => return Err(ContractViolation::UnknownComponent { id }.into()),
            Some(Component::Part(_)) => {
                return Err(ContractViolation::NotAnAssembly { id }.into());
            }
            Some(Component::Assembly(assembly)) => assembly.is_built(),
        };
        if !built {
            self.build(id, kernel, false)?;
        }
        Ok(())
    }

    fn run_rounds(
        &mut self,
        id: ComponentId,
        plan: &dyn AssemblyPlan,
        kernel: &mut dyn ShapeKernel,
    ) -> Result<BuildReport, BuildError> {
        let mut report = BuildReport::default();
        let mut components_done = false;
        let mut constraints_done = false;
        let mut alterations_done = false;

        for round in 0.. {
            let mut entry = RoundReport {
                round,
                ..RoundReport::default()
            };
            let mut produced = false;

            if !components_done {
                let batch = {
                    let mut ctx = BuildCtx::new(self, kernel, id);
                    plan.components(round, &mut ctx)?
                };
                match batch {
                    Some(children) => {
                        produced = true;
                        entry.components_added = self.merge_children(id, children)?;
                    }
                    None => components_done = true,
                }
            }

            if !constraints_done {
                let batch = {
                    let ctx = BuildCtx::new(self, kernel, id);
                    plan.constraints(round, &ctx)?
                };
                match batch {
                    Some(constraints) => {
                        produced = true;
                        entry.constraints_added = constraints.len();
                        self.append_constraints(id, constraints)?;
                    }
                    None => constraints_done = true,
                }
            }

            // A solve runs only when the round contributed something new;
            // it always covers the entire accumulated constraint set.
            if !entry.components_added.is_empty() || entry.constraints_added > 0 {
                let base = self.world_frame(id).unwrap_or_else(Frame::identity);
                let constraints = self.constraint_list(id).to_vec();
                debug!(round, total = constraints.len(), "solving accumulated constraints");
                entry.placements = solve_apply(self, constraints, base)?;
                entry.solved = true;
            }

            if !alterations_done {
                let batch = {
                    let mut ctx = BuildCtx::new(self, kernel, id);
                    plan.alterations(round, &mut ctx)?
                };
                match batch {
                    Some(()) => {
                        produced = true;
                        entry.altered = true;
                    }
                    None => alterations_done = true,
                }
            }

            if !produced {
                break;
            }
            report.rounds.push(entry);
        }
        Ok(report)
    }

    fn merge_children(
        &mut self,
        id: ComponentId,
        batch: Vec<(String, ComponentId)>,
    ) -> Result<Vec<String>, BuildError> {
        // The whole batch is validated before the assembly is touched.
        for (name, child) in &batch {
            if name.is_empty() {
                return Err(ContractViolation::EmptyChildName.into());
            }
            if name.contains('.') {
                return Err(ContractViolation::DottedChildName { name: name.clone() }.into());
            }
            if !self.contains(*child) {
                return Err(ContractViolation::UnknownComponent { id: *child }.into());
            }
        }
        let Some(assembly) = self.get_mut(id).and_then(Component::as_assembly_mut) else {
            return Err(ContractViolation::NotAnAssembly { id }.into());
        };
        for (index, (name, _)) in batch.iter().enumerate() {
            if assembly.child(name).is_some() || batch[..index].iter().any(|(n, _)| n == name) {
                return Err(ContractViolation::DuplicateChildName { name: name.clone() }.into());
            }
        }
        let names = batch.iter().map(|(name, _)| name.clone()).collect();
        assembly.children.extend(batch);
        Ok(names)
    }

    fn append_constraints(
        &mut self,
        id: ComponentId,
        batch: Vec<Constraint>,
    ) -> Result<(), BuildError> {
        for constraint in &batch {
            let Some(owner) = constraint.placed() else {
                return Err(ContractViolation::UnownedMate.into());
            };
            if !self.contains(owner) {
                return Err(ContractViolation::UnknownComponent { id: owner }.into());
            }
        }
        let Some(assembly) = self.get_mut(id).and_then(Component::as_assembly_mut) else {
            return Err(ContractViolation::NotAnAssembly { id }.into());
        };
        assembly.constraints.extend(batch);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra::Vector3;
    use rig_shape::{MockKernel, MockOp, ShapeError};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone)]
    struct Cube {
        size: f64,
    }

    impl PartDef for Cube {
        fn make(&self, kernel: &mut dyn ShapeKernel) -> Result<ShapeHandle, ShapeError> {
            kernel.make_box(self.size, self.size, self.size)
        }

        fn local_mate(&self, name: &str) -> Option<Frame> {
            match name {
                "origin" => Some(Frame::identity()),
                "top" => Some(Frame::translation(0.0, 0.0, self.size / 2.0)),
                "bottom" => Some(Frame::translation(0.0, 0.0, -self.size / 2.0)),
                _ => None,
            }
        }

        fn mate_names(&self) -> Vec<&'static str> {
            vec!["origin", "top", "bottom"]
        }
    }

    /// Plan with one cube pinned at the base frame.
    #[derive(Debug)]
    struct SingleCube;

    impl AssemblyPlan for SingleCube {
        fn components(
            &self,
            round: usize,
            ctx: &mut BuildCtx<'_>,
        ) -> Result<Option<Vec<(String, ComponentId)>>, BuildError> {
            if round > 0 {
                return Ok(None);
            }
            let cube = ctx.add_part(Cube { size: 2.0 });
            Ok(Some(vec![("cube".to_owned(), cube)]))
        }

        fn constraints(
            &self,
            round: usize,
            ctx: &BuildCtx<'_>,
        ) -> Result<Option<Vec<Constraint>>, BuildError> {
            if round > 0 {
                return Ok(None);
            }
            Ok(Some(vec![Constraint::fixed(ctx.mate("cube", "bottom")?)]))
        }
    }

    #[test]
    fn test_single_round_build() {
        let mut store = ComponentStore::new();
        let mut kernel = MockKernel::new();
        let root = store.insert_assembly(SingleCube);

        let report = store.build(root, &mut kernel, false).unwrap();

        assert_eq!(report.rounds.len(), 1);
        assert_eq!(report.rounds[0].components_added, vec!["cube"]);
        assert_eq!(report.rounds[0].constraints_added, 1);
        assert!(report.rounds[0].solved);
        assert_eq!(report.rounds[0].placements.len(), 1);

        let cube = store.find(root, "cube").unwrap();
        assert_abs_diff_eq!(
            store.world_frame(cube).unwrap().origin(),
            Vector3::new(0.0, 0.0, 1.0),
            epsilon = 1e-9
        );
        let assembly = store.get(root).and_then(Component::as_assembly).unwrap();
        assert!(assembly.is_built());
    }

    #[test]
    fn test_component_access_builds_lazily() {
        let mut store = ComponentStore::new();
        let mut kernel = MockKernel::new();
        let root = store.insert_assembly(SingleCube);

        let first: Vec<ComponentId> = store
            .components(root, &mut kernel)
            .unwrap()
            .iter()
            .map(|(_, id)| *id)
            .collect();
        assert_eq!(first.len(), 1);
        assert_eq!(store.constraints(root, &mut kernel).unwrap().len(), 1);

        // Already built: the second access reads the cache instead of
        // re-running the plan, so the child ids survive.
        let second: Vec<ComponentId> = store
            .components(root, &mut kernel)
            .unwrap()
            .iter()
            .map(|(_, id)| *id)
            .collect();
        assert_eq!(first, second);
    }

    /// Hooks log every poll so the round interleaving can be asserted.
    #[derive(Debug)]
    struct Lockstep {
        log: Rc<RefCell<Vec<String>>>,
    }

    impl Lockstep {
        fn note(&self, tag: &str, round: usize) {
            self.log.borrow_mut().push(format!("{tag}{round}"));
        }
    }

    impl AssemblyPlan for Lockstep {
        fn components(
            &self,
            round: usize,
            ctx: &mut BuildCtx<'_>,
        ) -> Result<Option<Vec<(String, ComponentId)>>, BuildError> {
            self.note("cmp", round);
            match round {
                0 | 1 => {
                    let cube = ctx.add_part(Cube { size: 1.0 });
                    Ok(Some(vec![(format!("cube{round}"), cube)]))
                }
                2 => Ok(Some(Vec::new())),
                _ => Ok(None),
            }
        }

        fn constraints(
            &self,
            round: usize,
            ctx: &BuildCtx<'_>,
        ) -> Result<Option<Vec<Constraint>>, BuildError> {
            self.note("con", round);
            match round {
                0 => Ok(Some(vec![Constraint::fixed(ctx.mate("cube0", "bottom")?)])),
                1 => Ok(Some(vec![Constraint::coincident(
                    ctx.mate("cube1", "bottom")?,
                    ctx.mate("cube0", "top")?,
                )])),
                2 => Ok(Some(Vec::new())),
                _ => Ok(None),
            }
        }

        fn alterations(
            &self,
            round: usize,
            _ctx: &mut BuildCtx<'_>,
        ) -> Result<Option<()>, BuildError> {
            self.note("alt", round);
            if round <= 2 { Ok(Some(())) } else { Ok(None) }
        }
    }

    #[test]
    fn test_multi_round_lockstep() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut store = ComponentStore::new();
        let mut kernel = MockKernel::new();
        let root = store.insert_assembly(Lockstep { log: Rc::clone(&log) });

        let report = store.build(root, &mut kernel, false).unwrap();

        // Hooks run in lockstep; every hook sees the final probe round.
        assert_eq!(
            *log.borrow(),
            vec![
                "cmp0", "con0", "alt0", "cmp1", "con1", "alt1", "cmp2", "con2", "alt2", "cmp3",
                "con3", "alt3",
            ]
        );
        // The probe round produced nothing, so only three rounds are kept,
        // and the empty third round did not trigger a solve.
        assert_eq!(report.rounds.len(), 3);
        assert_eq!(
            report.rounds.iter().map(|r| r.solved).collect::<Vec<_>>(),
            vec![true, true, false]
        );
        assert!(report.rounds[2].altered);

        // Second round's solve re-covers the whole accumulated set.
        assert_eq!(report.rounds[1].placements.len(), 2);

        let cube1 = store.find(root, "cube1").unwrap();
        assert_abs_diff_eq!(
            store.world_frame(cube1).unwrap().origin(),
            Vector3::new(0.0, 0.0, 1.5),
            epsilon = 1e-9
        );
    }

    /// Plan that cuts its cube down during alterations.
    #[derive(Debug)]
    struct Trimmed;

    impl AssemblyPlan for Trimmed {
        fn components(
            &self,
            round: usize,
            ctx: &mut BuildCtx<'_>,
        ) -> Result<Option<Vec<(String, ComponentId)>>, BuildError> {
            if round > 0 {
                return Ok(None);
            }
            let cube = ctx.add_part(Cube { size: 4.0 });
            Ok(Some(vec![("cube".to_owned(), cube)]))
        }

        fn constraints(
            &self,
            round: usize,
            ctx: &BuildCtx<'_>,
        ) -> Result<Option<Vec<Constraint>>, BuildError> {
            if round > 0 {
                return Ok(None);
            }
            Ok(Some(vec![Constraint::fixed(ctx.mate("cube", "origin")?)]))
        }

        fn alterations(
            &self,
            round: usize,
            ctx: &mut BuildCtx<'_>,
        ) -> Result<Option<()>, BuildError> {
            if round > 0 {
                return Ok(None);
            }
            let cube = ctx.child("cube").ok_or_else(|| FindError::NoSuchChild {
                path: "cube".to_owned(),
                segment: "cube".to_owned(),
            })?;
            let solid = ctx.local_shape(cube)?;
            let tool = ctx.kernel().make_box(1.0, 1.0, 1.0)?;
            let trimmed = ctx.kernel().cut(solid, tool)?;
            ctx.set_local_shape(cube, trimmed)?;
            Ok(Some(()))
        }
    }

    #[test]
    fn test_alterations_can_rework_shapes() {
        let mut store = ComponentStore::new();
        let mut kernel = MockKernel::new();
        let root = store.insert_assembly(Trimmed);

        let report = store.build(root, &mut kernel, false).unwrap();
        assert!(report.rounds[0].altered);
        assert!(kernel.ops().contains(&MockOp::Cut));

        // The replaced local shape is what world_shape now starts from.
        let cube = store.find(root, "cube").unwrap();
        let world = store.world_shape(cube, &mut kernel).unwrap();
        assert_abs_diff_eq!(
            kernel.bounding_box(world).unwrap().size(),
            Vector3::new(4.0, 4.0, 4.0),
            epsilon = 1e-9
        );
    }

    #[derive(Debug)]
    struct BadName {
        name: &'static str,
    }

    impl AssemblyPlan for BadName {
        fn components(
            &self,
            round: usize,
            ctx: &mut BuildCtx<'_>,
        ) -> Result<Option<Vec<(String, ComponentId)>>, BuildError> {
            if round > 0 {
                return Ok(None);
            }
            let cube = ctx.add_part(Cube { size: 1.0 });
            Ok(Some(vec![(self.name.to_owned(), cube)]))
        }

        fn constraints(
            &self,
            _round: usize,
            _ctx: &BuildCtx<'_>,
        ) -> Result<Option<Vec<Constraint>>, BuildError> {
            Ok(None)
        }
    }

    #[test]
    fn test_child_name_contract() {
        for (name, expected) in [
            ("", ContractViolation::EmptyChildName),
            (
                "a.b",
                ContractViolation::DottedChildName {
                    name: "a.b".to_owned(),
                },
            ),
        ] {
            let mut store = ComponentStore::new();
            let mut kernel = MockKernel::new();
            let root = store.insert_assembly(BadName { name });
            match store.build(root, &mut kernel, false) {
                Err(BuildError::Contract(violation)) => assert_eq!(violation, expected),
                other => panic!("expected contract violation, got {other:?}"),
            }
        }
    }

    #[derive(Debug)]
    struct DuplicateName;

    impl AssemblyPlan for DuplicateName {
        fn components(
            &self,
            round: usize,
            ctx: &mut BuildCtx<'_>,
        ) -> Result<Option<Vec<(String, ComponentId)>>, BuildError> {
            if round > 0 {
                return Ok(None);
            }
            let a = ctx.add_part(Cube { size: 1.0 });
            let b = ctx.add_part(Cube { size: 1.0 });
            Ok(Some(vec![("cube".to_owned(), a), ("cube".to_owned(), b)]))
        }

        fn constraints(
            &self,
            _round: usize,
            _ctx: &BuildCtx<'_>,
        ) -> Result<Option<Vec<Constraint>>, BuildError> {
            Ok(None)
        }
    }

    #[test]
    fn test_duplicate_child_name_rejected() {
        let mut store = ComponentStore::new();
        let mut kernel = MockKernel::new();
        let root = store.insert_assembly(DuplicateName);
        assert!(matches!(
            store.build(root, &mut kernel, false),
            Err(BuildError::Contract(ContractViolation::DuplicateChildName { name })) if name == "cube"
        ));
    }

    #[derive(Debug)]
    struct FreeConstraint;

    impl AssemblyPlan for FreeConstraint {
        fn components(
            &self,
            round: usize,
            _ctx: &mut BuildCtx<'_>,
        ) -> Result<Option<Vec<(String, ComponentId)>>, BuildError> {
            if round > 0 { Ok(None) } else { Ok(Some(Vec::new())) }
        }

        fn constraints(
            &self,
            round: usize,
            _ctx: &BuildCtx<'_>,
        ) -> Result<Option<Vec<Constraint>>, BuildError> {
            if round > 0 {
                return Ok(None);
            }
            Ok(Some(vec![Constraint::fixed(Mate::free(Frame::identity()))]))
        }
    }

    #[test]
    fn test_constraint_must_place_something() {
        let mut store = ComponentStore::new();
        let mut kernel = MockKernel::new();
        let root = store.insert_assembly(FreeConstraint);
        assert!(matches!(
            store.build(root, &mut kernel, false),
            Err(BuildError::Contract(ContractViolation::UnownedMate))
        ));
    }

    #[test]
    fn test_build_on_part_rejected() {
        let mut store = ComponentStore::new();
        let mut kernel = MockKernel::new();
        let cube = store.insert_part(Cube { size: 1.0 });
        assert!(matches!(
            store.build(cube, &mut kernel, false),
            Err(BuildError::Contract(ContractViolation::NotAnAssembly { id })) if id == cube
        ));
    }

    #[test]
    fn test_reentrant_build_rejected() {
        let mut store = ComponentStore::new();
        let mut kernel = MockKernel::new();
        let root = store.insert_assembly(SingleCube);
        let taken = store
            .get_mut(root)
            .and_then(Component::as_assembly_mut)
            .unwrap()
            .plan
            .take();
        assert!(matches!(
            store.build(root, &mut kernel, false),
            Err(BuildError::Contract(ContractViolation::ReentrantBuild { id })) if id == root
        ));
        store
            .get_mut(root)
            .and_then(Component::as_assembly_mut)
            .unwrap()
            .plan = taken;
        assert!(store.build(root, &mut kernel, false).is_ok());
    }

    #[test]
    fn test_rebuild_replaces_children() {
        let mut store = ComponentStore::new();
        let mut kernel = MockKernel::new();
        let root = store.insert_assembly(SingleCube);

        store.build(root, &mut kernel, false).unwrap();
        let old_cube = store.find(root, "cube").unwrap();

        store.build(root, &mut kernel, false).unwrap();
        let new_cube = store.find(root, "cube").unwrap();

        assert_ne!(old_cube, new_cube);
        assert!(!store.contains(old_cube));
        // One assembly plus one cube: the stale child did not leak.
        assert_eq!(store.len(), 2);
    }

    /// Plan whose constraints hook names a child that never exists.
    #[derive(Debug)]
    struct MissingChildRef;

    impl AssemblyPlan for MissingChildRef {
        fn components(
            &self,
            round: usize,
            ctx: &mut BuildCtx<'_>,
        ) -> Result<Option<Vec<(String, ComponentId)>>, BuildError> {
            if round > 0 {
                return Ok(None);
            }
            let cube = ctx.add_part(Cube { size: 1.0 });
            Ok(Some(vec![("cube".to_owned(), cube)]))
        }

        fn constraints(
            &self,
            round: usize,
            ctx: &BuildCtx<'_>,
        ) -> Result<Option<Vec<Constraint>>, BuildError> {
            if round > 0 {
                return Ok(None);
            }
            Ok(Some(vec![Constraint::fixed(ctx.mate("tube", "origin")?)]))
        }
    }

    #[test]
    fn test_failed_build_can_be_retried() {
        let mut store = ComponentStore::new();
        let mut kernel = MockKernel::new();
        let root = store.insert_assembly(MissingChildRef);

        // The plan goes back after a failure, so a retry fails the same way
        // instead of tripping the re-entrancy guard.
        for _ in 0..2 {
            assert!(matches!(
                store.build(root, &mut kernel, false),
                Err(BuildError::Find(FindError::NoSuchChild { .. }))
            ));
        }
        // Children added by the failed attempts were replaced, not leaked.
        assert_eq!(store.len(), 2);
    }

    /// Parent placing a sub-assembly, whose own plan then runs against the
    /// frame the parent gave it.
    #[derive(Debug)]
    struct Carrier;

    impl AssemblyPlan for Carrier {
        fn components(
            &self,
            round: usize,
            ctx: &mut BuildCtx<'_>,
        ) -> Result<Option<Vec<(String, ComponentId)>>, BuildError> {
            if round > 0 {
                return Ok(None);
            }
            let inner = ctx.add_assembly(SingleCube);
            Ok(Some(vec![("inner".to_owned(), inner)]))
        }

        fn constraints(
            &self,
            round: usize,
            ctx: &BuildCtx<'_>,
        ) -> Result<Option<Vec<Constraint>>, BuildError> {
            if round > 0 {
                return Ok(None);
            }
            Ok(Some(vec![Constraint::fixed_at(
                ctx.mate("inner", "origin")?,
                Frame::translation(5.0, 0.0, 0.0),
            )]))
        }
    }

    #[test]
    fn test_recursive_build_descends_into_children() {
        let mut store = ComponentStore::new();
        let mut kernel = MockKernel::new();
        let root = store.insert_assembly(Carrier);

        let report = store.build(root, &mut kernel, true).unwrap();
        assert_eq!(report.child_reports.len(), 1);

        // The inner cube solved against the frame the parent assigned.
        let cube = store.find(root, "inner.cube").unwrap();
        assert_abs_diff_eq!(
            store.world_frame(cube).unwrap().origin(),
            Vector3::new(5.0, 0.0, 1.0),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_non_recursive_build_leaves_children_unbuilt() {
        let mut store = ComponentStore::new();
        let mut kernel = MockKernel::new();
        let root = store.insert_assembly(Carrier);

        let report = store.build(root, &mut kernel, false).unwrap();
        assert!(report.child_reports.is_empty());

        let inner = store.find(root, "inner").unwrap();
        let assembly = store.get(inner).and_then(Component::as_assembly).unwrap();
        assert!(!assembly.is_built());
        assert!(assembly.children().is_empty());
        // The parent still placed the sub-assembly itself.
        assert_abs_diff_eq!(
            store.world_frame(inner).unwrap().origin(),
            Vector3::new(5.0, 0.0, 0.0),
            epsilon = 1e-9
        );
    }
}
