//! Boolean satisfiability solver.
use std::io;

use partial_ref::{IntoPartialRef, IntoPartialRefMut, PartialRef};

use anyhow::Error;
use log::info;

use satori_dimacs::DimacsParser;
use satori_formula::{CnfFormula, Lit, Var};

use crate::cdcl::conflict_step;
use crate::config::SolverConfig;
use crate::context::{ensure_var_count, AssignmentP, Context, DecisionP, SolverStateP};
use crate::load::load_clause;
use crate::state::SatState;

/// A boolean satisfiability solver.
///
/// Decides one formula per solver instance: load clauses with
/// [`add_formula`](Solver::add_formula) or [`add_dimacs_cnf`](Solver::add_dimacs_cnf), then call
/// [`solve`](Solver::solve) once.
#[derive(Default)]
pub struct Solver {
    ctx: Box<Context>,
}

impl Solver {
    /// Create a new solver.
    pub fn new() -> Solver {
        Solver::default()
    }

    /// Create a new solver with the given configuration.
    pub fn with_config(config: &SolverConfig) -> Solver {
        let mut solver = Solver::new();
        solver.set_config(config);
        solver
    }

    /// Apply a configuration.
    pub fn set_config(&mut self, config: &SolverConfig) {
        let mut ctx = self.ctx.into_partial_ref_mut();
        ctx.part_mut(DecisionP).set_seed(config.branch_seed);
    }

    /// Add a formula to the solver.
    pub fn add_formula(&mut self, formula: &CnfFormula) {
        let mut ctx = self.ctx.into_partial_ref_mut();
        ensure_var_count(ctx.borrow(), formula.var_count());
        for clause in formula.iter() {
            load_clause(ctx.borrow(), clause);
        }
    }

    /// Reads and adds a formula in DIMACS CNF format.
    ///
    /// The input is parsed and loaded in chunks, avoiding a temporary [`CnfFormula`] for the
    /// whole input.
    pub fn add_dimacs_cnf(&mut self, input: impl io::Read) -> Result<(), Error> {
        let parser = DimacsParser::parse_incremental(input, |parser| {
            self.add_formula(&parser.take_formula());
            Ok(())
        })?;

        info!(
            "Parsed formula with {} variables and {} clauses",
            parser.var_count(),
            parser.clause_count()
        );

        Ok(())
    }

    /// Check the satisfiability of the loaded formula.
    pub fn solve(&mut self) -> bool {
        let mut ctx = self.ctx.into_partial_ref_mut();

        while ctx.part(SolverStateP).sat_state == SatState::Unknown {
            conflict_step(ctx.borrow());
        }

        let state = ctx.part(SolverStateP);
        info!(
            "Finished with {} conflicts, {} decisions, {} propagations",
            state.stats.conflicts, state.stats.decisions, state.stats.propagations
        );

        state.sat_state == SatState::Sat
    }

    /// Set of literals that satisfy the formula.
    ///
    /// `None` unless the last call to [`solve`](Solver::solve) found the formula satisfiable.
    pub fn model(&self) -> Option<Vec<Lit>> {
        let ctx = self.ctx.into_partial_ref();
        if ctx.part(SolverStateP).sat_state != SatState::Sat {
            return None;
        }
        Some(
            ctx.part(AssignmentP)
                .assignment()
                .iter()
                .enumerate()
                .flat_map(|(index, value)| value.map(|value| Var::from_index(index).lit(value)))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    use satori_dimacs::write_dimacs;
    use satori_formula::{cnf_formula, test::*, CnfFormula};

    #[test]
    fn empty_formula_is_sat() {
        let mut solver = Solver::new();
        solver.add_formula(&CnfFormula::new());

        assert!(solver.solve());
        assert_eq!(solver.model(), Some(vec![]));
    }

    #[test]
    fn empty_clause_is_unsat() {
        let mut solver = Solver::new();
        let mut formula = CnfFormula::new();
        formula.add_clause(&[] as &[Lit]);
        solver.add_formula(&formula);

        assert!(!solver.solve());
        assert_eq!(solver.model(), None);
    }

    #[test]
    fn contradicting_units_are_unsat() {
        let mut solver = Solver::new();
        solver.add_formula(&cnf_formula![
            1;
            -1;
        ]);

        assert!(!solver.solve());
    }

    #[test]
    fn single_unit_is_sat() {
        let mut solver = Solver::new();
        solver.add_formula(&cnf_formula![
            1;
        ]);

        assert!(solver.solve());
        assert_eq!(solver.model(), Some(vec![satori_formula::lit!(1)]));
    }

    #[test]
    fn forced_chain_propagates_at_root() {
        let mut solver = Solver::new();
        solver.add_formula(&cnf_formula![
            1;
            -1, 2;
            -2, 3;
        ]);

        assert!(solver.solve());

        let model = solver.model().unwrap();
        for number in 1..=3 {
            assert!(model.contains(&satori_formula::lit!(number)));
        }
    }

    #[test]
    fn conflicting_propagations_of_one_decision() {
        let mut solver = Solver::new();
        solver.add_formula(&cnf_formula![
            1, 2;
            1, -2;
            -1, 3;
            -1, -3;
        ]);

        assert!(!solver.solve());
    }

    #[test]
    fn pigeon_hole_3_pigeons_2_holes() {
        let mut solver = Solver::new();
        solver.add_formula(&pigeon_hole(2));

        assert!(!solver.solve());
    }

    #[test]
    fn same_seed_same_model() {
        let formula = cnf_formula![
            1, 2, -3;
            -2, 4;
            3, -4, 5;
            -1, -5, 2;
            5, 6, 7;
            -6, -7;
        ];

        let config = SolverConfig { branch_seed: 7 };

        let mut solver_a = Solver::with_config(&config);
        solver_a.add_formula(&formula);
        assert!(solver_a.solve());

        let mut solver_b = Solver::with_config(&config);
        solver_b.add_formula(&formula);
        assert!(solver_b.solve());

        assert_eq!(solver_a.model(), solver_b.model());
    }

    proptest! {
        #[test]
        fn sgen_unsat(formula in sgen_unsat_formula(1..7usize)) {
            let mut solver = Solver::new();

            solver.add_formula(&formula);

            prop_assert!(!solver.solve());
        }

        #[test]
        fn sat_with_model(formula in sat_formula(4..20usize, 10..100usize, 0.05..0.2, 0.9..1.0)) {
            let mut solver = Solver::new();

            solver.add_formula(&formula);

            prop_assert!(solver.solve());

            let model = solver.model().unwrap();

            for clause in formula.iter() {
                prop_assert!(clause.iter().any(|lit| model.contains(lit)));
            }
        }

        #[test]
        fn sat_via_dimacs(formula in sat_formula(4..20usize, 10..100usize, 0.05..0.2, 0.9..1.0)) {
            let mut solver = Solver::new();

            let mut dimacs = vec![];

            write_dimacs(&mut dimacs, &formula).unwrap();

            solver.add_dimacs_cnf(&mut &dimacs[..]).unwrap();

            prop_assert!(solver.solve());

            let model = solver.model().unwrap();

            for clause in formula.iter() {
                prop_assert!(clause.iter().any(|lit| model.contains(lit)));
            }
        }

        #[test]
        fn pigeon_hole_unsat(holes in 1..4usize) {
            let mut solver = Solver::new();
            solver.add_formula(&pigeon_hole(holes));

            prop_assert!(!solver.solve());
        }
    }
}
