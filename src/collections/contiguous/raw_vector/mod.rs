//! A module containing [`RawVector`] and its pointer iterator, [`RawIter`].

mod iter;
mod raw_vector;

pub use iter::*;
pub use raw_vector::*;
