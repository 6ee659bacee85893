//! Ready-made assembly plans built from the parts in [`crate::parts`].

use rig_core::{AssemblyPlan, BuildCtx, BuildError, ComponentId, Constraint};

use crate::parts::Brick;

/// Bricks piled bottom-to-top along z.
///
/// The first brick rests on the assembly's base plane; every later brick
/// sits with its `bottom` mate on the previous brick's `top` mate.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Stack {
    pub bricks: Vec<Brick>,
}

impl Stack {
    pub fn new(bricks: Vec<Brick>) -> Self {
        Self { bricks }
    }

    pub fn uniform(count: usize, brick: Brick) -> Self {
        Self {
            bricks: vec![brick; count],
        }
    }

    /// Combined height of the pile.
    pub fn height(&self) -> f64 {
        self.bricks.iter().map(|brick| brick.height).sum()
    }
}

impl AssemblyPlan for Stack {
    fn components(
        &self,
        round: usize,
        ctx: &mut BuildCtx<'_>,
    ) -> Result<Option<Vec<(String, ComponentId)>>, BuildError> {
        if round > 0 {
            return Ok(None);
        }
        let children = self
            .bricks
            .iter()
            .enumerate()
            .map(|(index, brick)| (format!("brick{index}"), ctx.add_part(*brick)))
            .collect();
        Ok(Some(children))
    }

    fn constraints(
        &self,
        round: usize,
        ctx: &BuildCtx<'_>,
    ) -> Result<Option<Vec<Constraint>>, BuildError> {
        if round > 0 {
            return Ok(None);
        }
        let mut constraints = Vec::with_capacity(self.bricks.len());
        if !self.bricks.is_empty() {
            constraints.push(Constraint::fixed(ctx.mate("brick0", "bottom")?));
        }
        for index in 1..self.bricks.len() {
            constraints.push(Constraint::coincident(
                ctx.mate(&format!("brick{index}"), "bottom")?,
                ctx.mate(&format!("brick{}", index - 1), "top")?,
            ));
        }
        Ok(Some(constraints))
    }
}

/// A [`Stack`] carried on a plinth brick.
///
/// The stack goes in as a sub-assembly whose origin is mated to the
/// plinth's top face, so a recursive build places the inner bricks
/// relative to the frame the outer solve assigned.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Tower {
    pub plinth: Brick,
    pub stack: Vec<Brick>,
}

impl Tower {
    pub fn new(plinth: Brick, stack: Vec<Brick>) -> Self {
        Self { plinth, stack }
    }

    /// Height from the base plane to the top of the last stacked brick.
    pub fn total_height(&self) -> f64 {
        self.plinth.height + self.stack.iter().map(|brick| brick.height).sum::<f64>()
    }
}

impl AssemblyPlan for Tower {
    fn components(
        &self,
        round: usize,
        ctx: &mut BuildCtx<'_>,
    ) -> Result<Option<Vec<(String, ComponentId)>>, BuildError> {
        if round > 0 {
            return Ok(None);
        }
        let plinth = ctx.add_part(self.plinth);
        let stack = ctx.add_assembly(Stack::new(self.stack.clone()));
        Ok(Some(vec![
            ("plinth".to_owned(), plinth),
            ("stack".to_owned(), stack),
        ]))
    }

    fn constraints(
        &self,
        round: usize,
        ctx: &BuildCtx<'_>,
    ) -> Result<Option<Vec<Constraint>>, BuildError> {
        if round > 0 {
            return Ok(None);
        }
        Ok(Some(vec![
            Constraint::fixed(ctx.mate("plinth", "bottom")?),
            Constraint::coincident(
                ctx.mate("stack", "origin")?,
                ctx.mate("plinth", "top")?,
            ),
        ]))
    }
}
