//! Rendering of a component hierarchy for logs and diagnostics.

use std::fmt;

use crate::component::Component;
use crate::store::{ComponentId, ComponentStore};

/// Borrowed view of a subtree, rendered with box-drawing branches by
/// `Display`.
pub struct ComponentTree<'a> {
    store: &'a ComponentStore,
    root: ComponentId,
}

impl ComponentStore {
    /// Printable view of the hierarchy under `root`.
    pub fn tree(&self, root: ComponentId) -> ComponentTree<'_> {
        ComponentTree { store: self, root }
    }
}

impl ComponentTree<'_> {
    fn kind(&self, id: ComponentId) -> &'static str {
        match self.store.get(id) {
            None => "missing",
            Some(Component::Part(_)) => "part",
            Some(Component::Assembly(_)) => "assembly",
        }
    }

    fn fmt_children(
        &self,
        f: &mut fmt::Formatter<'_>,
        id: ComponentId,
        prefix: &str,
    ) -> fmt::Result {
        let children = self.store.children(id);
        for (index, (name, child)) in children.iter().enumerate() {
            let last = index + 1 == children.len();
            let (branch, cont) = if last { ("└─ ", "   ") } else { ("├─ ", "│  ") };
            writeln!(f, "{prefix}{branch}{name} ({})", self.kind(*child))?;
            self.fmt_children(f, *child, &format!("{prefix}{cont}"))?;
        }
        Ok(())
    }
}

impl fmt::Display for ComponentTree<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "({})", self.kind(self.root))?;
        self.fmt_children(f, self.root, "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::BuildCtx;
    use crate::component::{AssemblyPlan, PartDef};
    use crate::constraint::Constraint;
    use crate::error::BuildError;
    use rig_shape::{ShapeError, ShapeHandle, ShapeKernel};

    #[derive(Debug)]
    struct Blank;

    impl PartDef for Blank {
        fn make(&self, kernel: &mut dyn ShapeKernel) -> Result<ShapeHandle, ShapeError> {
            kernel.make_box(1.0, 1.0, 1.0)
        }
    }

    #[derive(Debug)]
    struct NullPlan;

    impl AssemblyPlan for NullPlan {
        fn components(
            &self,
            _round: usize,
            _ctx: &mut BuildCtx<'_>,
        ) -> Result<Option<Vec<(String, ComponentId)>>, BuildError> {
            Ok(None)
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
    fn test_tree_rendering() {
        let mut store = ComponentStore::new();
        let root = store.insert_assembly(NullPlan);
        let base = store.insert_part(Blank);
        let arm = store.insert_assembly(NullPlan);
        let cube = store.insert_part(Blank);
        let lid = store.insert_part(Blank);

        store
            .get_mut(root)
            .and_then(Component::as_assembly_mut)
            .unwrap()
            .children
            .extend([
                ("base".to_owned(), base),
                ("arm".to_owned(), arm),
                ("lid".to_owned(), lid),
            ]);
        store
            .get_mut(arm)
            .and_then(Component::as_assembly_mut)
            .unwrap()
            .children
            .push(("cube".to_owned(), cube));

        assert_eq!(
            store.tree(root).to_string(),
            "(assembly)\n\
             ├─ base (part)\n\
             ├─ arm (assembly)\n\
             │  └─ cube (part)\n\
             └─ lid (part)\n"
        );
    }

    #[test]
    fn test_tree_marks_dangling_children() {
        let mut store = ComponentStore::new();
        let root = store.insert_assembly(NullPlan);
        let gone = store.insert_part(Blank);
        store
            .get_mut(root)
            .and_then(Component::as_assembly_mut)
            .unwrap()
            .children
            .push(("gone".to_owned(), gone));
        store.remove_subtree(gone);

        assert_eq!(store.tree(root).to_string(), "(assembly)\n└─ gone (missing)\n");
    }
}
