//! Loading a formula into the solver.
use partial_ref::{partial, PartialRef};

use satori_formula::Lit;

use crate::clause::{db, ClauseHeader};
use crate::context::{
    AssignmentP, ClauseAllocP, ClauseDbP, Context, ImplGraphP, SolverStateP, TmpDataP, TrailP,
    WatchlistsP,
};
use crate::prop::{enqueue_assignment, Reason};
use crate::state::SatState;

/// Adds a clause to the current formula.
///
/// Removes duplicated literals and drops tautological clauses (e.g. x v -x v y). The empty clause
/// makes the formula unsatisfiable right away. A unit clause is stored and its literal enqueued
/// with the clause as antecedent, everything else is stored and watched on its first two
/// literals.
///
/// Clauses have to be loaded before solving starts, and the solver's variable count has to cover
/// their literals; use [`ensure_var_count`](crate::context::ensure_var_count) first if necessary.
pub fn load_clause(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ClauseAllocP,
        mut ClauseDbP,
        mut ImplGraphP,
        mut SolverStateP,
        mut TmpDataP,
        mut TrailP,
        mut WatchlistsP,
    ),
    lits: &[Lit],
) {
    debug_assert_ne!(
        ctx.part(SolverStateP).sat_state,
        SatState::Sat,
        "clauses have to be loaded before solving"
    );

    if ctx.part(SolverStateP).sat_state == SatState::Unsat {
        return;
    }

    let (tmp, mut ctx) = ctx.split_part_mut(TmpDataP);

    tmp.lits.clear();
    tmp.lits.extend_from_slice(lits);
    let lits = &mut tmp.lits;

    lits.sort_unstable();
    lits.dedup();

    // A literal and its negation sort next to each other, so tautological clauses show up as
    // adjacent complementary pairs.
    let mut last = None;

    for &lit in lits.iter() {
        if last == Some(!lit) {
            return;
        }
        last = Some(lit);
    }

    match lits[..] {
        [] => ctx.part_mut(SolverStateP).sat_state = SatState::Unsat,
        [lit] => {
            let cref = db::add_clause(ctx.borrow(), ClauseHeader::new(), &[lit]);

            // The same unit may already be enqueued, and contradicting units are detected when
            // the assignment propagates into this clause's watch.
            if ctx.part(AssignmentP).lit_value(lit).is_none() {
                enqueue_assignment(ctx.borrow(), lit, Reason::Clause(cref));
            }
        }
        _ => {
            db::add_clause(ctx.borrow(), ClauseHeader::new(), lits);
        }
    }
}
