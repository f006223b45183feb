//! Runtime type information for the type-erased containers.
//!
//! # Purpose
//! A [`RawVector`](crate::collections::contiguous::RawVector) doesn't know what it stores, only
//! how big each element is and how to copy, destroy, hash, compare and print one. That knowledge
//! lives in a [`TypeDescriptor`], a small table of optional operations that fall back to plain
//! byte manipulation (see [`bytewise`]) when they aren't provided.
//!
//! # Method
//! Types known at compile time don't build descriptors by hand; they implement [`Element`] and
//! get one from [`Element::DESCRIPTOR`]. Hand-built descriptors are for storage that really is
//! opaque, such as data handed over a plugin boundary.

pub mod bytewise;
mod descriptor;
mod element;

pub use descriptor::*;
pub use element::*;

mod tests;
