//! Type-erased contiguous containers, driven by runtime type descriptors.
//!
//! # Purpose
//! This crate is the core of a small container runtime: vectors and byte strings whose elements
//! are described by a [`TypeDescriptor`](types::TypeDescriptor) instead of a generic parameter.
//! One implementation of each container handles every element type, including types that are only
//! known at runtime, while the typed wrappers keep things pleasant for plain Rust callers.
//!
//! # Method
//! Every container stores its elements in one contiguous block with a
//! [`BufferHeader`](collections::contiguous::BufferHeader) describing it. A block either lives on
//! the heap, where it grows by half of its capacity at a time, or in caller-provided storage,
//! where its capacity can never change. The per-type behaviour (copying, destroying, hashing,
//! comparing and printing) comes from the descriptor, falling back to byte-wise operations and
//! [MurmurHash3](hash) when a type doesn't override them.
//!
//! I've been relatively cautious about unsafe code. The type-erased layer is unsafe to drive
//! directly, since it can't check what the bytes it is handed represent, but everything above it
//! is safe.
//!
//! # Error Handling
//! Operations that allocate return a [`Result`] rather than aborting. Running out of memory and
//! trying to grow fixed storage are the same failure here:
//! [`OutOfMemory`](error::OutOfMemory). A failed operation leaves its container exactly as it
//! was.
//!
//! Errors are strongly typed, using enums for static dispatch rather than dynamic, with structs
//! (mostly ZSTs) that implement [`Error`](std::error::Error). Index errors panic in the
//! convenience methods and are returned by their `try_` counterparts.
//!
//! # Dependencies
//! This crate uses `std` for allocation. It depends on `derive_more` for some very repetitive
//! trait implementations, and on `log` to report reallocations and allocation failures.
#![warn(clippy::missing_safety_doc)]
#![warn(clippy::undocumented_unsafe_blocks)]
#![warn(clippy::missing_panics_doc)]
#![warn(clippy::unwrap_used)]
#![allow(clippy::module_inception)]

pub mod collections;
pub mod hash;
pub mod types;

pub(crate) mod util;

pub use util::error;
