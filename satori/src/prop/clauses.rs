//! Propagation over watched clauses.
use std::mem::replace;

use partial_ref::{partial, PartialRef};

use satori_formula::Lit;

use vec_mut_scan::VecMutScan;

use crate::context::{AssignmentP, ClauseAllocP, Context, ImplGraphP, TrailP, WatchlistsP};

use super::enqueue_assignment;
use super::{Conflict, Reason, Watch};

/// Propagate all literals implied by clauses watching the negation of the given literal.
///
/// The literal was just assigned true, so its negation just became false and the invariant
/// described in [`prop::watch`](crate::prop::watch) has to be restored for every clause watching
/// it. On conflict the clause whose literals are all false is returned.
#[inline(never)]
pub fn propagate_clauses(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ClauseAllocP,
        mut ImplGraphP,
        mut TrailP,
        mut WatchlistsP,
    ),
    lit: Lit,
) -> Result<(), Conflict> {
    // Move the watches out of the watchlists struct, so we are free to add watches to other lists
    // while iterating.
    let mut watches = replace(ctx.part_mut(WatchlistsP).watched_by_mut(lit), vec![]);

    let mut scan = VecMutScan::new(&mut watches);

    let mut result = Ok(());

    'watches: while let Some(watch) = scan.next() {
        // When the blocking literal (which is part of the watched clause) is already true, the
        // clause is satisfied and we don't even have to look at it.
        if ctx.part(AssignmentP).lit_is_true(watch.blocking) {
            continue;
        }

        let cref = watch.cref;

        let (clause_alloc, mut ctx) = ctx.split_part_mut(ClauseAllocP);

        let clause = clause_alloc.clause_mut(cref);

        let lits = clause.lits_mut();

        // A unit clause has no second watch to fall back on: its only literal just became false.
        if lits.len() == 1 {
            result = Err(Conflict { cref });
            break;
        }

        // Make sure the literal we are propagating ends up in slot 1, so a propagated literal can
        // go into slot 0. This also means we only have to look at slot 0 to find the other
        // watched literal below.
        let mut other = lits[0];
        if other == !lit {
            lits.swap(0, 1);
            other = lits[0];
        }

        // A new watch with the other watched literal as blocking literal. It either replaces the
        // watch being processed or moves to the watchlist of a replacement literal.
        let new_watch = Watch {
            cref,
            blocking: other,
        };

        // When the other watched literal is true the clause is satisfied. This was already
        // checked when it happens to be the blocking literal.
        if other != watch.blocking && ctx.part(AssignmentP).lit_is_true(other) {
            watch.replace(new_watch);
            continue;
        }

        // Try to find a non-false unwatched literal to take over this watch.
        let (watched, unwatched) = lits.split_at_mut(2);

        for candidate_ref in unwatched.iter_mut() {
            let candidate = *candidate_ref;
            if !ctx.part(AssignmentP).lit_is_false(candidate) {
                // Move the candidate into the watched slot 1 and hand the watch to its
                // watchlist.
                watched[1] = candidate;
                *candidate_ref = !lit;
                ctx.part_mut(WatchlistsP).add_watch(!candidate, new_watch);
                watch.remove();
                continue 'watches;
            }
        }

        // Every unwatched literal is false, so the clause is either propagating or conflicting on
        // the other watched literal.
        watch.replace(new_watch);

        if ctx.part(AssignmentP).lit_is_false(other) {
            result = Err(Conflict { cref });
            break;
        }

        enqueue_assignment(ctx.borrow(), other, Reason::Clause(cref));
    }

    // Keep all unprocessed watches in the current watchlist.
    drop(scan);

    *ctx.part_mut(WatchlistsP).watched_by_mut(lit) = watches;

    result
}
