//! Conflict driven clause learning.

use partial_ref::{partial, PartialRef};

use crate::analyze_conflict::analyze_conflict;
use crate::clause::{db, ClauseHeader};
use crate::context::{
    AnalyzeConflictP, AssignmentP, ClauseAllocP, ClauseDbP, Context, DecisionP, ImplGraphP,
    SolverStateP, TrailP, WatchlistsP,
};
use crate::decision::make_decision;
use crate::prop::{backtrack, enqueue_assignment, propagate, Conflict, Reason};
use crate::state::SatState;

/// Find a conflict, learn a clause and backtrack.
///
/// When no conflict is left to find, the solver state is set to the final verdict instead.
pub fn conflict_step(
    mut ctx: partial!(
        Context,
        mut AnalyzeConflictP,
        mut AssignmentP,
        mut ClauseAllocP,
        mut ClauseDbP,
        mut DecisionP,
        mut ImplGraphP,
        mut SolverStateP,
        mut TrailP,
        mut WatchlistsP,
    ),
) {
    let conflict = match find_conflict(ctx.borrow()) {
        Ok(()) => {
            ctx.part_mut(SolverStateP).sat_state = SatState::Sat;
            return;
        }
        Err(conflict) => conflict,
    };

    ctx.part_mut(SolverStateP).stats.conflicts += 1;

    let backtrack_to = analyze_conflict(ctx.borrow(), conflict);

    let clause = ctx.part(AnalyzeConflictP).clause().to_vec();

    if clause.is_empty() {
        // A conflict at level zero resolved to the empty clause.
        ctx.part_mut(SolverStateP).sat_state = SatState::Unsat;
        return;
    }

    backtrack(ctx.borrow(), backtrack_to);

    // Store the learned clause. Analysis left the asserting literal in slot 0 and the literal of
    // the backtrack level in slot 1, which is exactly the required watch order.
    let mut header = ClauseHeader::new();
    header.set_learnt(true);

    let cref = db::add_clause(ctx.borrow(), header, &clause);

    // After backtracking the learned clause is unit: assert its literal and resume propagation.
    enqueue_assignment(ctx.borrow(), clause[0], Reason::Clause(cref));
}

/// Find a conflict.
///
/// Alternates between unit propagation and decisions. Returns `Err` with a conflict when
/// propagation found one and `Ok` when all variables were assigned without a conflict, i.e. the
/// current assignment satisfies the formula.
pub fn find_conflict(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ClauseAllocP,
        mut DecisionP,
        mut ImplGraphP,
        mut SolverStateP,
        mut TrailP,
        mut WatchlistsP,
    ),
) -> Result<(), Conflict> {
    loop {
        propagate(ctx.borrow())?;

        if !make_decision(ctx.borrow()) {
            return Ok(());
        }
    }
}
