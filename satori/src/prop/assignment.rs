use partial_ref::{partial, PartialRef};

use satori_formula::{CnfFormula, Lit, LitIdx, Var};

use crate::context::{AssignmentP, Context, ImplGraphP, TrailP};

use super::Reason;

/// Current partial assignment.
#[derive(Default)]
pub struct Assignment {
    assignment: Vec<Option<bool>>,
}

impl Assignment {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.assignment.resize(count, None);
    }

    /// Number of variables covered by this assignment.
    pub fn var_count(&self) -> usize {
        self.assignment.len()
    }

    /// Value of a variable, `None` while it is unassigned.
    pub fn var_value(&self, var: Var) -> Option<bool> {
        self.assignment[var.index()]
    }

    /// Value of a literal, `None` while its variable is unassigned.
    pub fn lit_value(&self, lit: Lit) -> Option<bool> {
        self.assignment[lit.index()].map(|b| b ^ lit.is_negative())
    }

    pub fn lit_is_true(&self, lit: Lit) -> bool {
        self.assignment[lit.index()] == Some(lit.is_positive())
    }

    pub fn lit_is_false(&self, lit: Lit) -> bool {
        self.assignment[lit.index()] == Some(lit.is_negative())
    }

    pub fn assign_lit(&mut self, lit: Lit) {
        self.assignment[lit.index()] = lit.is_positive().into()
    }

    pub fn unassign_var(&mut self, var: Var) {
        self.assignment[var.index()] = None;
    }

    /// Values of all variables, indexed by variable index.
    pub fn assignment(&self) -> &[Option<bool>] {
        &self.assignment
    }

    /// Whether every clause of the formula contains a literal assigned true.
    pub fn satisfies(&self, formula: &CnfFormula) -> bool {
        formula
            .iter()
            .all(|clause| clause.iter().any(|&lit| self.lit_is_true(lit)))
    }
}

/// Decision and propagation history.
#[derive(Default)]
pub struct Trail {
    /// Stack of all propagated and all enqueued assignments.
    trail: Vec<Lit>,
    /// Next assignment in trail to propagate.
    queue_head_pos: usize,
    /// Decision levels as trail indices.
    decisions: Vec<LitIdx>,
}

impl Trail {
    /// Take the next assigned literal off the propagation queue.
    pub fn pop_queue(&mut self) -> Option<Lit> {
        let lit = self.trail.get(self.queue_head_pos).cloned();
        if lit.is_some() {
            self.queue_head_pos += 1;
        }
        lit
    }

    /// Assigned literals in assignment order.
    pub fn trail(&self) -> &[Lit] {
        &self.trail
    }

    /// The current decision level.
    ///
    /// Zero before the first decision; root propagations happen at level zero.
    pub fn current_level(&self) -> usize {
        self.decisions.len()
    }

    /// Open the next decision level.
    ///
    /// Called right before the decision itself is enqueued.
    pub fn new_decision_level(&mut self) {
        self.decisions.push(self.trail.len() as LitIdx);
    }
}

/// Enqueues the assignment of true to a literal.
///
/// This updates the assignment, trail and implication graph, but does not perform any propagation.
/// The literal has to be unassigned when calling this.
pub fn enqueue_assignment(
    mut ctx: partial!(Context, mut AssignmentP, mut ImplGraphP, mut TrailP),
    lit: Lit,
    reason: Reason,
) {
    let assignment = ctx.part_mut(AssignmentP);
    debug_assert!(assignment.lit_value(lit) == None);

    assignment.assign_lit(lit);

    let (trail, mut ctx) = ctx.split_part_mut(TrailP);

    trail.trail.push(lit);

    let node = &mut ctx.part_mut(ImplGraphP).nodes[lit.index()];
    node.reason = reason;
    node.level = trail.decisions.len() as LitIdx;
}

/// Undo all assignments above the given decision level.
///
/// Idempotent: backtracking to the current level or above does nothing. Backtracking to level
/// zero removes everything but root propagations. There is no need to touch the watchlists here,
/// unassigning variables cannot invalidate their invariant.
pub fn backtrack(mut ctx: partial!(Context, mut AssignmentP, mut TrailP), level: usize) {
    let (trail, mut ctx) = ctx.split_part_mut(TrailP);
    let assignment = ctx.part_mut(AssignmentP);

    if level >= trail.decisions.len() {
        return;
    }

    let new_trail_len = trail.decisions[level] as usize;
    trail.decisions.truncate(level);
    trail.queue_head_pos = trail.queue_head_pos.min(new_trail_len);

    for lit in trail.trail.drain(new_trail_len..) {
        assignment.unassign_var(lit.var());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use partial_ref::IntoPartialRefMut;

    use satori_formula::lit;

    use crate::context::set_var_count;

    #[test]
    fn backtrack_undoes_levels_and_is_idempotent() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        set_var_count(ctx.borrow(), 4);

        enqueue_assignment(ctx.borrow(), lit!(1), Reason::Decision);

        ctx.part_mut(TrailP).new_decision_level();
        enqueue_assignment(ctx.borrow(), lit!(2), Reason::Decision);
        enqueue_assignment(ctx.borrow(), lit!(-3), Reason::Decision);

        ctx.part_mut(TrailP).new_decision_level();
        enqueue_assignment(ctx.borrow(), lit!(4), Reason::Decision);

        assert_eq!(ctx.part(TrailP).current_level(), 2);
        assert_eq!(ctx.part(TrailP).trail().len(), 4);

        backtrack(ctx.borrow(), 1);

        assert_eq!(ctx.part(TrailP).current_level(), 1);
        assert_eq!(ctx.part(TrailP).trail(), &[lit!(1), lit!(2), lit!(-3)][..]);
        assert_eq!(ctx.part(AssignmentP).var_value(lit!(4).var()), None);
        assert_eq!(ctx.part(AssignmentP).lit_value(lit!(-3)), Some(true));

        backtrack(ctx.borrow(), 1);

        assert_eq!(ctx.part(TrailP).current_level(), 1);
        assert_eq!(ctx.part(TrailP).trail().len(), 3);

        backtrack(ctx.borrow(), 0);

        assert_eq!(ctx.part(TrailP).current_level(), 0);
        assert_eq!(ctx.part(TrailP).trail(), &[lit!(1)][..]);
        assert_eq!(ctx.part(AssignmentP).lit_value(lit!(1)), Some(true));
        assert_eq!(ctx.part(AssignmentP).var_value(lit!(2).var()), None);
        assert_eq!(ctx.part(AssignmentP).var_value(lit!(3).var()), None);
    }
}
