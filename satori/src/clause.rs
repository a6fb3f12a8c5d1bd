//! Clause storage.
use std::slice;

use satori_formula::{Lit, LitIdx};

pub mod alloc;
pub mod db;
pub mod header;

pub use alloc::{ClauseAlloc, ClauseRef};
pub use db::ClauseDb;
pub use header::ClauseHeader;

use header::HEADER_LEN;

/// A stored clause.
///
/// Lives inside a [`ClauseAlloc`] buffer and thus must have a representation compatible with a
/// slice of [`LitIdx`] words: the header word followed by the literals.
///
/// A DST struct with two members and `repr(C)` would be nicer, but such a type is nearly
/// impossible to construct and use on stable rust.
#[repr(transparent)]
pub struct Clause {
    data: [LitIdx],
}

impl Clause {
    /// The clause's header.
    pub fn header(&self) -> &ClauseHeader {
        unsafe {
            let header_ptr = self.data.as_ptr() as *const ClauseHeader;
            &*header_ptr
        }
    }

    /// The clause's literals.
    pub fn lits(&self) -> &[Lit] {
        unsafe {
            let lit_ptr = self.data.as_ptr().add(HEADER_LEN) as *const Lit;
            slice::from_raw_parts(lit_ptr, self.data.len() - HEADER_LEN)
        }
    }

    /// Mutable slice of the clause's literals.
    pub fn lits_mut(&mut self) -> &mut [Lit] {
        unsafe {
            let lit_ptr = self.data.as_mut_ptr().add(HEADER_LEN) as *mut Lit;
            slice::from_raw_parts_mut(lit_ptr, self.data.len() - HEADER_LEN)
        }
    }
}
