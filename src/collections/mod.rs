//! Type-erased, contiguous collection types.
//!
//! # Purpose
//! Every collection here stores its elements in one contiguous block described by a
//! [`BufferHeader`](contiguous::BufferHeader). Element behaviour comes from a
//! [`TypeDescriptor`](crate::types::TypeDescriptor) rather than from generics, so the same code
//! handles any element type, including ones only known at runtime.
//!
//! # Method
//! The typed wrappers implement [`Deref<Target = [T]>`](std::ops::Deref), which saves writing most
//! of the read-only functionality twice.

pub mod contiguous;
#[cfg(feature = "string")]
pub mod string;
