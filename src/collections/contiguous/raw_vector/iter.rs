use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::ptr::NonNull;

/// An iterator over pointers to the elements of a [`RawVector`](super::RawVector).
pub struct RawIter<'v> {
    next: NonNull<u8>,
    stride: usize,
    remaining: usize,
    _phantom: PhantomData<&'v [u8]>,
}

impl<'v> RawIter<'v> {
    /// # Safety
    /// `start` must be valid for `len` initialized elements spaced `stride` bytes apart, which
    /// remain valid and unmodified for `'v`.
    pub(crate) const unsafe fn new(start: NonNull<u8>, stride: usize, len: usize) -> RawIter<'v> {
        RawIter {
            next: start,
            stride,
            remaining: len,
            _phantom: PhantomData,
        }
    }
}

impl Iterator for RawIter<'_> {
    type Item = NonNull<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let elem = self.next;
        self.remaining -= 1;
        // SAFETY: The element after one that exists is at most one past the end of the block.
        self.next = unsafe { self.next.add(self.stride) };
        Some(elem)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for RawIter<'_> {}

impl FusedIterator for RawIter<'_> {}
