//! Unit propagation.
use partial_ref::{partial, PartialRef};

use crate::context::{
    AssignmentP, ClauseAllocP, Context, ImplGraphP, SolverStateP, TrailP, WatchlistsP,
};

pub mod assignment;
pub mod clauses;
pub mod graph;
pub mod watch;

pub use assignment::{backtrack, enqueue_assignment, Assignment, Trail};
pub use graph::{Conflict, ImplGraph, ImplNode, Reason};
pub use watch::{Watch, Watchlists};

/// Propagate all enqueued assignments.
///
/// Returns when every enqueued assignment, including the ones added by propagation itself, has
/// been propagated, or when a conflict is found first. The conflict is the clause whose literals
/// are all assigned false.
pub fn propagate(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ClauseAllocP,
        mut ImplGraphP,
        mut SolverStateP,
        mut TrailP,
        mut WatchlistsP,
    ),
) -> Result<(), Conflict> {
    while let Some(lit) = ctx.part_mut(TrailP).pop_queue() {
        ctx.part_mut(SolverStateP).stats.propagations += 1;
        clauses::propagate_clauses(ctx.borrow(), lit)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::{prelude::*, *};

    use rand::distributions::Bernoulli;
    use rand::seq::SliceRandom;
    use rand::Rng;

    use partial_ref::IntoPartialRefMut;

    use satori_formula::{CnfFormula, Lit};

    use crate::context::{set_var_count, ClauseDbP};
    use crate::load::load_clause;
    use crate::state::SatState;

    /// Generate a random formula and the list of literals it implies.
    pub fn prop_formula(
        vars: impl Strategy<Value = usize>,
        extra_vars: impl Strategy<Value = usize>,
        extra_clauses: impl Strategy<Value = usize>,
        density: impl Strategy<Value = f64>,
    ) -> impl Strategy<Value = (Vec<Lit>, CnfFormula)> {
        (vars, extra_vars, extra_clauses, density).prop_flat_map(
            |(vars, extra_vars, extra_clauses, density)| {
                let polarity = collection::vec(bool::ANY, vars + extra_vars);

                let dist = Bernoulli::new(density).unwrap();

                let lits = polarity
                    .prop_map(|polarity| {
                        polarity
                            .into_iter()
                            .enumerate()
                            .map(|(index, polarity)| Lit::from_index(index, polarity))
                            .collect::<Vec<_>>()
                    })
                    .prop_shuffle();

                lits.prop_perturb(move |mut lits, mut rng| {
                    let implied_lits = &lits[..vars];

                    let mut clauses: Vec<Vec<Lit>> = vec![];
                    for (i, &lit) in implied_lits.iter().enumerate() {
                        // Build a clause that implies lit from earlier implied lits
                        let mut clause = vec![lit];
                        for &reason_lit in implied_lits[..i].iter() {
                            if rng.sample(dist) {
                                clause.push(!reason_lit);
                            }
                        }
                        clause.shuffle(&mut rng);
                        clauses.push(clause);
                    }

                    for _ in 0..extra_clauses {
                        // Build a clause that is satisfied
                        let &true_lit = implied_lits.choose(&mut rng).unwrap();
                        let mut clause = vec![true_lit];
                        for &other_lit in lits.iter() {
                            if other_lit != true_lit && rng.sample(dist) {
                                clause.push(other_lit ^ rng.gen::<bool>());
                            }
                        }
                        clause.shuffle(&mut rng);
                        clauses.push(clause);
                    }

                    clauses.shuffle(&mut rng);

                    // Only return the implied lits
                    lits.drain(vars..);

                    (lits, CnfFormula::from(clauses))
                })
            },
        )
    }

    /// Check the watchlist invariants.
    ///
    /// Every stored clause must watch its first two literals (its single literal for a unit
    /// clause) and no other watches may exist. When `quiescent` is set, propagation returned
    /// without a conflict, and every clause must either contain a true literal or have both
    /// watched literals unassigned.
    pub fn check_watch_invariants(
        mut ctx: partial!(Context, AssignmentP, ClauseAllocP, ClauseDbP, WatchlistsP),
        quiescent: bool,
    ) {
        use std::collections::HashMap;

        use crate::clause::ClauseRef;

        let alloc = ctx.part(ClauseAllocP);
        let assignment = ctx.part(AssignmentP);
        let watchlists = ctx.part(WatchlistsP);

        let mut watch_count: HashMap<ClauseRef, usize> = HashMap::new();

        for code in 0..assignment.var_count() * 2 {
            let watching = !Lit::from_code(code);
            for watch in watchlists.watched_by(Lit::from_code(code)) {
                let lits = alloc.clause(watch.cref).lits();
                let watched = &lits[..2.min(lits.len())];
                assert!(
                    watched.contains(&watching),
                    "watch for {:?} not in watched slots of {:?}",
                    watching,
                    lits
                );
                assert!(
                    lits.contains(&watch.blocking),
                    "blocking literal {:?} not in {:?}",
                    watch.blocking,
                    lits
                );
                *watch_count.entry(watch.cref).or_default() += 1;
            }
        }

        for &cref in ctx.part(ClauseDbP).clauses() {
            let lits = alloc.clause(cref).lits();
            assert_eq!(watch_count.get(&cref).cloned().unwrap_or(0), lits.len().min(2));

            if quiescent {
                let satisfied = lits.iter().any(|&lit| assignment.lit_is_true(lit));
                let watches_unassigned = lits[..2.min(lits.len())]
                    .iter()
                    .all(|&lit| assignment.lit_value(lit).is_none());
                assert!(
                    satisfied || watches_unassigned,
                    "clause {:?} neither satisfied nor fully unassigned on its watches",
                    lits
                );
            }
        }
    }

    proptest! {
        #[test]
        fn propagation_no_conflict(
            (mut lits, formula) in prop_formula(
                2..30usize,
                0..10usize,
                0..20usize,
                0.1..0.9
            ),
        ) {
            let mut ctx = Context::default();
            let mut ctx = ctx.into_partial_ref_mut();

            set_var_count(ctx.borrow(), formula.var_count());

            for clause in formula.iter() {
                load_clause(ctx.borrow(), clause);
            }

            prop_assert_eq!(ctx.part(SolverStateP).sat_state, SatState::Unknown);

            let prop_result = propagate(ctx.borrow());

            prop_assert_eq!(prop_result, Ok(()));

            check_watch_invariants(ctx.borrow(), true);

            lits.sort();

            let mut prop_lits = ctx.part(TrailP).trail().to_owned();

            prop_lits.sort();

            prop_assert_eq!(prop_lits, lits);
        }

        #[test]
        fn propagation_conflict(
            (lits, formula) in prop_formula(
                2..30usize,
                0..10usize,
                0..20usize,
                0.1..0.9
            ),
            conflict_size in any::<sample::Index>(),
        ) {
            let mut ctx = Context::default();
            let mut ctx = ctx.into_partial_ref_mut();

            set_var_count(ctx.borrow(), formula.var_count());

            // The conflict clause is added first so no implied literal is assigned yet

            let conflict_size = conflict_size.index(lits.len() - 1) + 2;

            let conflict_clause: Vec<_> = lits[..conflict_size].iter().map(|&lit| !lit).collect();

            load_clause(ctx.borrow(), &conflict_clause);

            for clause in formula.iter() {
                load_clause(ctx.borrow(), clause);
            }

            prop_assert_eq!(ctx.part(SolverStateP).sat_state, SatState::Unknown);

            let prop_result = propagate(ctx.borrow());

            prop_assert!(prop_result.is_err());

            let conflict = prop_result.unwrap_err();

            let conflict_lits = conflict.lits(ctx.part(ClauseAllocP)).to_owned();

            for &lit in conflict_lits.iter() {
                prop_assert!(ctx.part(AssignmentP).lit_is_false(lit));
            }
        }
    }
}
