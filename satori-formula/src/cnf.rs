//! CNF formulas and the resolution rule.
use std::cmp::max;
use std::fmt;
use std::iter::Extend;
use std::ops::Range;

use crate::lit::{Lit, Var};

/// A formula in conjunctive normal form.
///
/// Logically equivalent to a `Vec<Vec<Lit>>`, but all literals share one backing buffer and each
/// clause is a range into it.
#[derive(Default, Eq)]
pub struct CnfFormula {
    var_count: usize,
    literals: Vec<Lit>,
    clause_ranges: Vec<Range<usize>>,
}

impl CnfFormula {
    /// Create an empty formula.
    pub fn new() -> CnfFormula {
        CnfFormula::default()
    }

    /// Number of variables in the formula.
    ///
    /// Gaps count: if a variable is present, all variables of smaller index are counted whether or
    /// not they appear. A vector of this length can thus be indexed by any present variable.
    pub fn var_count(&self) -> usize {
        self.var_count
    }

    /// Raise the variable count.
    ///
    /// Does nothing if the formula already has at least `count` variables.
    pub fn set_var_count(&mut self, count: usize) {
        self.var_count = max(self.var_count, count)
    }

    /// Number of clauses in the formula.
    pub fn len(&self) -> usize {
        self.clause_ranges.len()
    }

    /// Whether the formula has no clauses.
    pub fn is_empty(&self) -> bool {
        self.clause_ranges.is_empty()
    }

    /// Append a clause to the formula.
    ///
    /// `literals` can be an `IntoIterator<Item = Lit>` or `IntoIterator<Item = &Lit>`.
    pub fn add_clause<L>(&mut self, literals: impl IntoIterator<Item = L>)
    where
        Vec<Lit>: Extend<L>,
    {
        let begin = self.literals.len();
        self.literals.extend(literals);
        let end = self.literals.len();

        for &lit in self.literals[begin..end].iter() {
            self.var_count = max(lit.index() + 1, self.var_count);
        }

        self.clause_ranges.push(begin..end);
    }

    /// Iterator over the clauses as literal slices.
    pub fn iter(&self) -> impl Iterator<Item = &[Lit]> {
        let literals = &self.literals;
        self.clause_ranges
            .iter()
            .map(move |range| &literals[range.clone()])
    }
}

/// Convert any iterable of [`Lit`] iterables into a `CnfFormula`.
impl<F, I, L> From<F> for CnfFormula
where
    F: IntoIterator<Item = I>,
    I: IntoIterator<Item = L>,
    Vec<Lit>: Extend<L>,
{
    fn from(formula: F) -> CnfFormula {
        let mut cnf_formula = CnfFormula::new();
        for clause in formula {
            cnf_formula.add_clause(clause);
        }
        cnf_formula
    }
}

impl fmt::Debug for CnfFormula {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(&self.var_count(), f)?;
        f.debug_list().entries(self.iter()).finish()
    }
}

impl PartialEq for CnfFormula {
    fn eq(&self, other: &CnfFormula) -> bool {
        self.var_count() == other.var_count()
            && self.clause_ranges.len() == other.clause_ranges.len()
            && self
                .clause_ranges
                .iter()
                .zip(other.clause_ranges.iter())
                .all(|(range_a, range_b)| {
                    self.literals[range_a.clone()] == other.literals[range_b.clone()]
                })
    }
}

/// Resolve two clauses on a pivot variable.
///
/// The result contains every literal of both inputs apart from the two pivot literals, sorted and
/// with duplicates removed. The inputs must contain the pivot in complementary polarities;
/// resolving on any other variable is a contract violation.
pub fn resolve(a: &[Lit], b: &[Lit], pivot: Var) -> Vec<Lit> {
    debug_assert!(a
        .iter()
        .chain(b.iter())
        .any(|&lit| lit == pivot.lit(true)));
    debug_assert!(a
        .iter()
        .chain(b.iter())
        .any(|&lit| lit == pivot.lit(false)));

    let mut result: Vec<Lit> = a
        .iter()
        .chain(b.iter())
        .cloned()
        .filter(|lit| lit.var() != pivot)
        .collect();
    result.sort_unstable();
    result.dedup();
    result
}

#[cfg(any(test, feature = "proptest-strategies"))]
#[doc(hidden)]
pub mod strategy {
    use super::*;

    use proptest::{collection::SizeRange, prelude::*, *};

    use crate::lit::strategy::lit;

    pub fn vec_formula(
        vars: impl Strategy<Value = usize>,
        clauses: impl Into<SizeRange>,
        clause_len: impl Into<SizeRange>,
    ) -> impl Strategy<Value = Vec<Vec<Lit>>> {
        let clauses = clauses.into();
        let clause_len = clause_len.into();

        // ind_flat_map keeps shrinking affordable here
        vars.prop_ind_flat_map(move |vars| {
            collection::vec(
                collection::vec(lit(0..vars), clause_len.clone()),
                clauses.clone(),
            )
        })
    }

    pub fn cnf_formula(
        vars: impl Strategy<Value = usize>,
        clauses: impl Into<SizeRange>,
        clause_len: impl Into<SizeRange>,
    ) -> impl Strategy<Value = CnfFormula> {
        let clauses = clauses.into();
        let clause_len = clause_len.into();

        let clause_lens = collection::vec(collection::vec(Just(()), clause_len), clauses);
        (vars, clause_lens).prop_flat_map(move |(vars, clause_lens)| {
            let total_lits: usize = clause_lens.iter().map(|l| l.len()).sum();
            collection::vec(lit(0..vars), total_lits)
                .prop_map(move |literals| {
                    let mut clause_ranges = Vec::with_capacity(clause_lens.len());

                    let mut offset = 0;
                    for len in clause_lens.iter() {
                        clause_ranges.push(offset..offset + len.len());
                        offset += len.len();
                    }

                    CnfFormula {
                        var_count: vars,
                        literals,
                        clause_ranges,
                    }
                })
                .no_shrink() // Shrinking too expensive without this
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{strategy::*, *};

    use proptest::*;

    #[test]
    fn simple_roundtrip() {
        let input = cnf![
            1, 2, 3;
            -1, -2;
            7, 2;
            ;
            4, 5;
        ];

        let formula = CnfFormula::from(input.iter().cloned());

        for (clause, &ref_clause) in formula.iter().zip(input.iter()) {
            assert_eq!(clause, ref_clause);
        }

        assert_eq!(formula.var_count(), 7);
    }

    #[test]
    fn resolve_removes_pivot() {
        let resolvent = resolve(&lits![1, 2, -3], &lits![3, 4], var!(3));
        assert_eq!(resolvent, lits![1, 2, 4]);
    }

    #[test]
    fn resolve_collapses_duplicates() {
        let resolvent = resolve(&lits![1, -2, 4], &lits![2, 4, -5], var!(2));
        assert_eq!(resolvent, lits![1, 4, -5]);
    }

    proptest! {
        #[test]
        fn roundtrip_from_vec(input in vec_formula(1..200usize, 0..1000, 0..10)) {
            let formula = CnfFormula::from(input.iter().map(|clause| clause.iter().cloned()));

            for (clause, ref_clause) in formula.iter().zip(input.iter()) {
                prop_assert_eq!(clause, &ref_clause[..]);
            }

            let var_count = input
                .iter()
                .flat_map(|clause| clause.iter().map(|lit| lit.index() + 1))
                .max()
                .unwrap_or(0);

            prop_assert_eq!(formula.var_count(), var_count);
        }

        #[test]
        fn roundtrip_from_cnf(input in cnf_formula(1..100usize, 0..1000, 0..10)) {
            let roundtrip = CnfFormula::from(input.iter());

            for (clause_a, clause_b) in input.iter().zip(roundtrip.iter()) {
                prop_assert_eq!(clause_a, clause_b);
            }

            prop_assert!(roundtrip.var_count() <= input.var_count());

            if roundtrip.var_count() == input.var_count() {
                prop_assert_eq!(roundtrip, input);
            }
        }

        #[test]
        fn resolve_commutes(
            mut a in collection::vec(crate::lit::strategy::lit(0..30usize), 0..8),
            mut b in collection::vec(crate::lit::strategy::lit(0..30usize), 0..8),
            pivot in 0..30usize,
        ) {
            let pivot = Var::from_index(pivot);
            // Make the pivot a real complementary pair.
            a.push(pivot.lit(true));
            b.push(pivot.lit(false));

            let ab = resolve(&a, &b, pivot);
            let ba = resolve(&b, &a, pivot);

            // Results are sorted and deduplicated, so set equality is plain equality.
            prop_assert_eq!(&ab, &ba);
            prop_assert!(ab.iter().all(|&lit| lit.var() != pivot));
        }
    }
}
