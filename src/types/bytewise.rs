//! The byte-wise operations used whenever a [`TypeDescriptor`](super::TypeDescriptor) doesn't
//! override one.

use std::fmt::{self, Write};
use std::mem::MaybeUninit;

use crate::hash;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Copies `src` into `dst`, which may be uninitialized. Both slices must have the same length.
///
/// # Panics
/// Panics if the slices have different lengths.
pub fn copy(dst: &mut [MaybeUninit<u8>], src: &[u8]) {
    assert_eq!(dst.len(), src.len(), "byte-wise copy between slices of different lengths");
    for (dst, &src) in dst.iter_mut().zip(src) {
        dst.write(src);
    }
}

/// MurmurHash3-64 of the raw bytes.
pub fn hash(bytes: &[u8], seed: u64) -> u64 {
    hash::murmur3_64(bytes, seed)
}

/// Byte comparison. Only an approximation of equality for types with padding or pointers that
/// should be compared deeply.
pub fn equal(a: &[u8], b: &[u8]) -> bool {
    a == b
}

/// Writes the bytes as lowercase hex, two characters per byte, in memory order.
///
/// # Examples
/// ```
/// # use container_core::types::bytewise;
/// let mut out = String::new();
/// bytewise::stringify(&[0x00, 0x7f, 0xab], &mut out).unwrap();
/// assert_eq!(out, "007fab");
/// ```
pub fn stringify(bytes: &[u8], out: &mut dyn Write) -> fmt::Result {
    for byte in bytes {
        out.write_char(HEX_DIGITS[(byte >> 4) as usize] as char)?;
        out.write_char(HEX_DIGITS[(byte & 0x0f) as usize] as char)?;
    }
    Ok(())
}
