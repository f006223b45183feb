//! MurmurHash3, the default hash operation for every element type.
//!
//! [`murmur3_64`] is the function containers use directly. [`MurmurHasher`] and
//! [`BuildMurmurHasher`] adapt it to [`std::hash`] so that the same function can back any hashing
//! collection.

mod hasher;
mod murmur;

pub use hasher::*;
pub use murmur::*;
