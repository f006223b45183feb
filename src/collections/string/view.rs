use std::num::NonZeroU64;
use std::ops::Range;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one state of one [`ByteString`](super::ByteString). A string gets a fresh stamp
/// whenever its contents change, and no two stamps are ever equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Stamp(NonZeroU64);

impl Stamp {
    pub(crate) fn next() -> Stamp {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Stamp(NonZeroU64::MIN.saturating_add(NEXT.fetch_add(1, Ordering::Relaxed)))
    }
}

/// A non-owning window into a [`ByteString`](super::ByteString): an offset and a length, plus the
/// stamp of the string at the time the View was made.
///
/// A View borrows nothing, so it can be kept while its string is modified. Resolving it through
/// [`ByteString::resolve`](super::ByteString::resolve) afterwards fails with
/// [`StaleView`](crate::error::StaleView) instead of returning the wrong bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct View {
    offset: usize,
    len: usize,
    stamp: Stamp,
}

impl View {
    pub(crate) const fn new(offset: usize, len: usize, stamp: Stamp) -> View {
        View { offset, len, stamp }
    }

    /// Returns the index of the first byte in the View.
    pub const fn offset(&self) -> usize {
        self.offset
    }

    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the index one past the last byte in the View.
    pub const fn end(&self) -> usize {
        self.offset + self.len
    }

    pub const fn range(&self) -> Range<usize> {
        self.offset..self.end()
    }

    pub const fn stamp(&self) -> Stamp {
        self.stamp
    }
}
