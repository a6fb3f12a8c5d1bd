//! Watchlists to detect clauses that became unit.
//!
//! Every clause watches two of its literals (a unit clause its only one); the watches live in the
//! watchlists of those literals' negations. Whenever watches move to different literals, the
//! clause's literals are permuted so the watched ones sit in slots 0 and 1.
//!
//! While a clause is neither satisfied nor unit, both watched literals are non-false. When it
//! becomes propagating, the implied literal is watched and moved to slot 0 and the other watched
//! literal is the one with the largest decision level, kept in slot 1. A clause that gets
//! satisfied before becoming unit can keep its watches as they are.
//!
//! Assigning a literal false can invalidate this invariant for the clauses in its watchlist, and
//! only for those. Processing that list restores the invariant and detects every clause that
//! became unit or ran out of non-false literals, which is exactly how propagation and conflict
//! detection work. Backtracking never invalidates the invariant, so the watchlists can stay
//! untouched while unassigning.
//!
//! Each watch also carries a blocking literal, some literal of the clause different from the
//! watched one. When the blocking literal is true the clause is satisfied and can be skipped
//! without touching its memory. See ["MiniSat 2.1 and MiniSat++ 1.0 — SAT Race 2008
//! editions"](https://www.cril.univ-artois.fr/SAT09/solvers/booklet.pdf) and [section 4.5.1 of
//! the Handbook of Satisfiability](https://www.satassociation.org/articles/FAIA185-0131.pdf).

use satori_formula::Lit;

use crate::clause::ClauseRef;

/// A watch for one literal of a clause.
#[derive(Copy, Clone)]
pub struct Watch {
    /// Clause that has the watched literal in slot 0 or 1.
    pub cref: ClauseRef,
    /// A literal of the clause different from the watched literal.
    pub blocking: Lit,
}

/// Watchlists to detect clauses that became unit.
#[derive(Default)]
pub struct Watchlists {
    /// Watches of each literal's negation, indexed by literal code.
    watches: Vec<Vec<Watch>>,
}

impl Watchlists {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.watches.resize(count * 2, vec![]);
    }

    /// Start watching a clause on its first two literals.
    ///
    /// `lits` have to be the literals in slot 0 and 1 of the clause.
    pub fn watch_clause(&mut self, cref: ClauseRef, lits: [Lit; 2]) {
        for i in 0..2 {
            let watch = Watch {
                cref,
                blocking: lits[i ^ 1],
            };
            self.watches[(!lits[i]).code()].push(watch);
        }
    }

    /// Start watching a unit clause on its only literal.
    ///
    /// There is no second literal to block on, so the watched literal doubles as the blocking
    /// literal.
    pub fn watch_unit_clause(&mut self, cref: ClauseRef, lit: Lit) {
        self.watches[(!lit).code()].push(Watch {
            cref,
            blocking: lit,
        });
    }

    /// Watches to process when a literal was assigned true.
    pub fn watched_by_mut(&mut self, lit: Lit) -> &mut Vec<Watch> {
        &mut self.watches[lit.code()]
    }

    /// Watches to process when a literal was assigned true.
    pub fn watched_by(&self, lit: Lit) -> &[Watch] {
        &self.watches[lit.code()]
    }

    /// Make a literal watch a clause.
    pub fn add_watch(&mut self, lit: Lit, watch: Watch) {
        self.watches[lit.code()].push(watch)
    }
}
