//! A module containing [`Vector`], the typed wrapper around
//! [`RawVector`](super::RawVector).
//!
//! [`Iter`](std::slice::Iter) and [`IterMut`](std::slice::IterMut) from [`std::slice`] are used
//! for borrowed iteration.
//!
//! [`Vector`] is also re-exported under the parent module.

mod tests;
mod vector;

pub use vector::*;
