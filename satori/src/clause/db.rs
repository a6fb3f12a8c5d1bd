//! Clause database.
use partial_ref::{partial, PartialRef};

use satori_formula::Lit;

use super::{ClauseHeader, ClauseRef};

use crate::context::{ClauseAllocP, ClauseDbP, Context, WatchlistsP};

/// Append-only collection of all stored clauses.
///
/// Original clauses are added while loading the formula, learnt clauses during search. Nothing is
/// ever removed, so [`ClauseRef`] values stay valid for the whole solve.
#[derive(Default)]
pub struct ClauseDb {
    clauses: Vec<ClauseRef>,
    original_count: usize,
    learnt_count: usize,
}

impl ClauseDb {
    /// All stored clauses, originals before learnt clauses they led to.
    pub fn clauses(&self) -> &[ClauseRef] {
        &self.clauses
    }

    /// Number of clauses loaded from the input formula.
    pub fn original_count(&self) -> usize {
        self.original_count
    }

    /// Number of clauses learnt from conflicts.
    pub fn learnt_count(&self) -> usize {
        self.learnt_count
    }
}

/// Add a clause to the database and start watching it.
///
/// Clauses of length two or more get watches on their first two literals, a unit clause gets its
/// single watch. The literal order must already be the intended watch order; for learnt clauses
/// that means the asserting literal in slot 0 and the literal of the highest remaining decision
/// level in slot 1.
pub fn add_clause(
    mut ctx: partial!(Context, mut ClauseAllocP, mut ClauseDbP, mut WatchlistsP),
    header: ClauseHeader,
    lits: &[Lit],
) -> ClauseRef {
    let learnt = header.learnt();

    let cref = ctx.part_mut(ClauseAllocP).add_clause(header, lits);

    let watchlists = ctx.part_mut(WatchlistsP);
    match lits {
        [lit] => watchlists.watch_unit_clause(cref, *lit),
        _ => watchlists.watch_clause(cref, [lits[0], lits[1]]),
    }

    let db = ctx.part_mut(ClauseDbP);

    db.clauses.push(cref);
    if learnt {
        db.learnt_count += 1;
    } else {
        db.original_count += 1;
    }

    cref
}

#[cfg(test)]
mod tests {
    use super::*;

    use partial_ref::IntoPartialRefMut;

    use satori_formula::cnf_formula;

    use crate::context::set_var_count;

    #[test]
    fn stores_originals_and_learnt_clauses() {
        let mut ctx = Context::default();

        let mut ctx = ctx.into_partial_ref_mut();

        let clauses = cnf_formula![
            1, 2, 3;
            4, -5, 6;
            -2;
            -3, 5, 2, 7;
        ];

        set_var_count(ctx.borrow(), clauses.var_count());

        let mut crefs = vec![];

        for clause in clauses.iter() {
            crefs.push(add_clause(ctx.borrow(), ClauseHeader::new(), clause));
        }

        let mut learnt_header = ClauseHeader::new();
        learnt_header.set_learnt(true);
        crefs.push(add_clause(ctx.borrow(), learnt_header, &satori_formula::lits![7, -1]));

        assert_eq!(ctx.part(ClauseDbP).original_count(), 4);
        assert_eq!(ctx.part(ClauseDbP).learnt_count(), 1);
        assert_eq!(ctx.part(ClauseDbP).clauses(), &crefs[..]);

        for (&cref, clause) in crefs.iter().zip(clauses.iter()) {
            assert_eq!(ctx.part(ClauseAllocP).clause(cref).lits(), clause);
            assert!(!ctx.part(ClauseAllocP).header(cref).learnt());
        }

        assert!(ctx.part(ClauseAllocP).header(crefs[4]).learnt());
    }
}
