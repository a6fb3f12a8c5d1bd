//! Learns a new clause by analyzing a conflict.
use std::mem::swap;

use partial_ref::{partial, PartialRef};

use satori_formula::{Lit, Var};

use crate::context::{AnalyzeConflictP, ClauseAllocP, Context, ImplGraphP, TrailP};
use crate::prop::Conflict;

/// Temporaries for conflict analysis.
#[derive(Default)]
pub struct AnalyzeConflict {
    /// The learned clause after analysis finishes.
    clause: Vec<Lit>,
    /// Number of literals of the current clause assigned at the current level.
    current_level_count: usize,
    /// Variables present in the current clause.
    var_flags: Vec<bool>,
    /// Entries to clean in `var_flags`.
    to_clean: Vec<Var>,
}

impl AnalyzeConflict {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.var_flags.resize(count, false);
    }

    /// The learned clause.
    ///
    /// The asserting literal is in slot 0, the remaining literal of the largest decision level in
    /// slot 1. Empty when the last analyzed conflict happened at level zero.
    pub fn clause(&self) -> &[Lit] {
        &self.clause
    }
}

/// Learns a new clause by analyzing a conflict.
///
/// Starting from the conflicting clause, literals assigned at the current decision level are
/// resolved with their antecedent clauses, most recently assigned first, until a single literal
/// of the current level remains: the first unique implication point. Returns the lowest decision
/// level at which the learned clause is asserting, i.e. the largest level among its literals
/// besides the asserted one.
///
/// A conflict at decision level zero yields the empty clause and backtrack level zero; the caller
/// concludes unsatisfiability from the empty clause.
pub fn analyze_conflict(
    mut ctx: partial!(
        Context,
        mut AnalyzeConflictP,
        ClauseAllocP,
        ImplGraphP,
        TrailP,
    ),
    conflict: Conflict,
) -> usize {
    let (alloc, mut ctx) = ctx.split_part(ClauseAllocP);

    let analyze = ctx.part_mut(AnalyzeConflictP);

    analyze.clause.clear();
    analyze.current_level_count = 0;

    drop(analyze);

    if ctx.part(TrailP).current_level() == 0 {
        // Conflict with no decisions, the formula is unsatisfiable.
        return 0;
    }

    // Start with all literals of the conflicting clause.
    for &lit in conflict.lits(alloc) {
        add_literal(ctx.borrow(), lit);
    }

    // To get rid of all but one literal of the current level, resolve the clause with the reason
    // of each such literal, in reverse chronological order. Walking the trail backwards visits
    // exactly the literals assigned at the current level in that order.

    let trail_len = ctx.part(TrailP).trail().len();
    for trail_index in (0..trail_len).rev() {
        let lit = ctx.part(TrailP).trail()[trail_index];
        let analyze = ctx.part_mut(AnalyzeConflictP);
        // Is the lit present in the current clause?
        let lit_present = analyze.var_flags[lit.index()];
        if lit_present {
            analyze.var_flags[lit.index()] = false;
            analyze.current_level_count -= 1;
            let current_level_count = analyze.current_level_count;
            if current_level_count == 0 {
                // lit is the last literal of the current level present in the clause: the first
                // UIP. The resulting clause asserts !lit, which goes into slot 0.
                analyze.clause.push(!lit);
                let end = analyze.clause.len() - 1;
                analyze.clause.swap(0, end);

                break;
            } else {
                drop(analyze);

                // Remove the literal and resolve with its reason.
                let reason = ctx.part(ImplGraphP).reason(lit.var());

                for &reason_lit in reason.lits(alloc) {
                    add_literal(ctx.borrow(), reason_lit);
                }
            }
        }
    }

    let (analyze, mut ctx) = ctx.split_part_mut(AnalyzeConflictP);

    for var in analyze.to_clean.drain(..) {
        analyze.var_flags[var.index()] = false;
    }

    // Find the highest level literal besides the asserted one and move it into slot 1. That keeps
    // the watchlist invariant intact when the clause is added after backtracking, and its level
    // is exactly the backtrack level that makes the clause asserting.
    let mut backtrack_to = 0;

    if analyze.clause.len() > 1 {
        let (slots, rest) = analyze.clause.split_at_mut(2);
        let slot_1 = &mut slots[1];
        backtrack_to = ctx.part(ImplGraphP).level(slot_1.var());
        for lit in rest.iter_mut() {
            let lit_level = ctx.part(ImplGraphP).level(lit.var());
            if lit_level > backtrack_to {
                backtrack_to = lit_level;
                swap(slot_1, lit);
            }
        }
    }

    backtrack_to
}

/// Add a literal to the current clause.
fn add_literal(mut ctx: partial!(Context, mut AnalyzeConflictP, ImplGraphP, TrailP), lit: Lit) {
    let (analyze, mut ctx) = ctx.split_part_mut(AnalyzeConflictP);
    let lit_level = ctx.part(ImplGraphP).level(lit.var());
    // Literals assigned by root propagations stay false and are dropped; duplicates are dropped.
    if lit_level > 0 && !analyze.var_flags[lit.index()] {
        analyze.var_flags[lit.index()] = true;
        if lit_level == ctx.part(TrailP).current_level() {
            analyze.current_level_count += 1;
        } else {
            analyze.clause.push(lit);
            analyze.to_clean.push(lit.var());
        }
    }
}
