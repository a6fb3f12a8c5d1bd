//! Decision heuristics.

use partial_ref::{partial, PartialRef};

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use satori_formula::Lit;

use crate::context::{AssignmentP, Context, DecisionP, ImplGraphP, SolverStateP, TrailP};
use crate::prop::{enqueue_assignment, Reason};

/// State of the branching heuristic.
///
/// Branching picks uniformly among the unassigned variables with a uniform random polarity. The
/// RNG is a seeded ChaCha so runs are reproducible across platforms.
pub struct Decision {
    rng: ChaCha8Rng,
}

impl Default for Decision {
    fn default() -> Decision {
        Decision {
            rng: ChaCha8Rng::seed_from_u64(0),
        }
    }
}

impl Decision {
    /// Reseed the branching RNG.
    pub fn set_seed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }
}

/// Make a decision and enqueue it.
///
/// Opens a new decision level and enqueues a random unassigned variable with a random polarity.
///
/// Returns `false` without deciding anything when all variables are assigned.
pub fn make_decision(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut DecisionP,
        mut ImplGraphP,
        mut SolverStateP,
        mut TrailP,
    ),
) -> bool {
    let (decision, mut ctx) = ctx.split_part_mut(DecisionP);

    let unassigned: Vec<usize> = ctx
        .part(AssignmentP)
        .assignment()
        .iter()
        .enumerate()
        .filter_map(|(index, value)| if value.is_none() { Some(index) } else { None })
        .collect();

    if unassigned.is_empty() {
        return false;
    }

    let &index = unassigned.choose(&mut decision.rng).unwrap();
    let decision_lit = Lit::from_index(index, decision.rng.gen());

    ctx.part_mut(TrailP).new_decision_level();

    enqueue_assignment(ctx.borrow(), decision_lit, Reason::Decision);

    ctx.part_mut(SolverStateP).stats.decisions += 1;

    true
}
