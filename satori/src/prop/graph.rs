//! The implication graph.
use satori_formula::{Lit, LitIdx, Var};

use crate::clause::{ClauseAlloc, ClauseRef};

/// Why a variable is assigned.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Reason {
    /// Branching decision, no antecedent clause.
    Decision,
    /// Unit propagation out of the referenced clause.
    Clause(ClauseRef),
}

impl Reason {
    /// The literals whose falsification forced the assignment.
    ///
    /// A propagating clause keeps the implied literal in slot 0, so that slot is skipped here.
    /// Decisions and unit clause propagations have no antecedent literals.
    pub fn lits<'a>(&self, alloc: &'a ClauseAlloc) -> &'a [Lit] {
        match self {
            Reason::Decision => &[],
            Reason::Clause(cref) => &alloc.clause(*cref).lits()[1..],
        }
    }

}

/// Propagation that found a clause with every literal assigned false.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Conflict {
    pub cref: ClauseRef,
}

impl Conflict {
    /// The literals of the conflicting clause.
    pub fn lits<'a>(&self, alloc: &'a ClauseAlloc) -> &'a [Lit] {
        alloc.clause(self.cref).lits()
    }
}

/// Node and incoming edges of the implication graph.
#[derive(Copy, Clone)]
pub struct ImplNode {
    pub reason: Reason,
    pub level: LitIdx,
}

/// The implication graph.
///
/// This is a DAG having all assigned variables as nodes, with unit clauses and decisions as
/// sources. For each propagated assignment it has incoming edges from the assignments that
/// triggered the propagation. The edges are never materialized; conflict analysis walks them
/// through the stored reasons.
#[derive(Default)]
pub struct ImplGraph {
    /// Contains only valid data for indices of assigned variables.
    pub nodes: Vec<ImplNode>,
}

impl ImplGraph {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.nodes.resize(
            count,
            ImplNode {
                reason: Reason::Decision,
                level: 0,
            },
        );
    }

    /// The reason recorded for an assigned variable.
    pub fn reason(&self, var: Var) -> Reason {
        self.nodes[var.index()].reason
    }

    /// The decision level recorded for an assigned variable.
    pub fn level(&self, var: Var) -> usize {
        self.nodes[var.index()].level as usize
    }
}
