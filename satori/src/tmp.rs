//! Temporary data.
use satori_formula::Lit;

/// Scratch buffers shared by routines that are never active at the same time.
///
/// Check the documented invariants of current users before adding new ones.
#[derive(Default)]
pub struct TmpData {
    pub lits: Vec<Lit>,
}
