//! Growable, contiguous collections: [`RawVector`] and its typed wrapper [`Vector`].
//!
//! Both kinds of storage share the same [`BufferHeader`]. Heap storage grows by half of its
//! capacity (rounded up) whenever it runs out of room, while stack storage is borrowed from the
//! caller and refuses to grow.

mod buffer;
#[cfg(feature = "vector")]
mod raw_vector;
#[cfg(feature = "vector")]
mod vector;

pub use buffer::{AllocationKind, BufferHeader, INIT_CAP, MIN_CAP, grown_cap};
pub(crate) use buffer::RawBuffer;
#[cfg(feature = "vector")]
pub use raw_vector::*;
#[cfg(feature = "vector")]
pub use vector::*;
