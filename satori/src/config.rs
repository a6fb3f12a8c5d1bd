//! Solver configuration.

/// Configurable parameters used during solving.
#[derive(Clone, Debug, Default)]
pub struct SolverConfig {
    /// Seed for the branching RNG.
    ///
    /// Two runs on the same formula with the same seed make the same decisions.
    pub branch_seed: u64,
}
