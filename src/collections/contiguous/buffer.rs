use std::alloc::{self, Layout};
use std::marker::PhantomData;
use std::mem::MaybeUninit;
use std::ptr::{self, NonNull};

use derive_more::IsVariant;

use crate::util::error::OutOfMemory;

/// The capacity a heap container starts with unless told otherwise.
pub const INIT_CAP: usize = 32;

/// The smallest capacity a heap container grows to.
pub const MIN_CAP: usize = 2;

/// Where a container's element storage comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IsVariant)]
pub enum AllocationKind {
    /// Fixed-capacity storage owned by someone else (a local array, a string literal). Never
    /// reallocated or freed by the container.
    Stack,
    /// Storage allocated, grown and freed by the container itself.
    Heap,
}

/// Metadata shared by every contiguous container.
///
/// `len <= cap` always holds, and the `cap` of a [`Stack`](AllocationKind::Stack) buffer never
/// changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHeader {
    pub len: usize,
    pub cap: usize,
    pub kind: AllocationKind,
}

/// Returns the capacity that follows `cap` when growing: `ceil(cap * 3 / 2)`, but at least
/// [`MIN_CAP`].
///
/// # Errors
/// Returns [`OutOfMemory`] if the new capacity would overflow a `usize`.
pub fn grown_cap(cap: usize) -> Result<usize, OutOfMemory> {
    cap.checked_add(cap.div_ceil(2))
        .map(|new_cap| new_cap.max(MIN_CAP))
        .ok_or(OutOfMemory)
}

/// Untyped element storage plus its [`BufferHeader`]. All element slots are `stride` bytes apart
/// and aligned to `align`.
///
/// The buffer knows nothing about the values it holds. It never initializes or drops slots; it
/// only owns (for the heap kind) the memory.
pub(crate) struct RawBuffer<'a> {
    ptr: NonNull<u8>,
    header: BufferHeader,
    stride: usize,
    align: usize,
    _marker: PhantomData<&'a mut [MaybeUninit<u8>]>,
}

impl RawBuffer<'static> {
    /// Allocates a heap buffer with room for exactly `cap` elements of `elem`.
    pub fn allocate(elem: Layout, cap: usize) -> Result<RawBuffer<'static>, OutOfMemory> {
        let mut buf = RawBuffer {
            ptr: dangling(elem.align()),
            header: BufferHeader {
                len: 0,
                cap: 0,
                kind: AllocationKind::Heap,
            },
            stride: elem.pad_to_align().size(),
            align: elem.align(),
            _marker: PhantomData,
        };
        buf.set_cap(cap)?;
        Ok(buf)
    }
}

impl<'a> RawBuffer<'a> {
    /// Wraps `cap` slots of caller-owned memory at `ptr` as a [`Stack`](AllocationKind::Stack)
    /// buffer.
    ///
    /// # Safety
    /// `ptr` must be aligned to `elem.align()` and valid for reads and writes of
    /// `cap * elem.pad_to_align().size()` bytes for `'a`, and nothing else may access that memory
    /// during `'a`. Memory that must never be written may be used only if every caller of the
    /// resulting buffer refuses to write through it.
    pub unsafe fn from_raw_fixed(
        elem: Layout,
        ptr: NonNull<u8>,
        len: usize,
        cap: usize,
    ) -> RawBuffer<'a> {
        debug_assert!(len <= cap);
        RawBuffer {
            ptr,
            header: BufferHeader {
                len,
                cap,
                kind: AllocationKind::Stack,
            },
            stride: elem.pad_to_align().size(),
            align: elem.align(),
            _marker: PhantomData,
        }
    }

    /// Wraps as many aligned slots of `storage` as fit, as an empty
    /// [`Stack`](AllocationKind::Stack) buffer.
    pub fn fixed(elem: Layout, storage: &'a mut [MaybeUninit<u8>]) -> RawBuffer<'a> {
        let stride = elem.pad_to_align().size();
        let offset = storage.as_mut_ptr().align_offset(elem.align());

        let (ptr, cap) = match storage.len().checked_sub(offset) {
            Some(_) if stride == 0 => (dangling(elem.align()), usize::MAX),
            Some(usable) => {
                // SAFETY: offset is within storage, so the pointer stays in bounds and isn't null.
                let start = unsafe { NonNull::new_unchecked(storage.as_mut_ptr().add(offset)) };
                (start.cast(), usable / stride)
            },
            None => (dangling(elem.align()), 0),
        };

        // SAFETY: ptr is aligned and cap slots of it lie within storage, which is borrowed
        // mutably for 'a.
        unsafe { RawBuffer::from_raw_fixed(elem, ptr, 0, cap) }
    }

    pub const fn header(&self) -> BufferHeader {
        self.header
    }

    pub const fn len(&self) -> usize {
        self.header.len
    }

    pub const fn cap(&self) -> usize {
        self.header.cap
    }

    pub const fn kind(&self) -> AllocationKind {
        self.header.kind
    }

    pub const fn stride(&self) -> usize {
        self.stride
    }

    pub const fn as_ptr(&self) -> NonNull<u8> {
        self.ptr
    }

    /// Returns a pointer to slot `index`, which may be one past the last slot.
    ///
    /// # Safety
    /// `index` must be `<= cap`.
    pub const unsafe fn slot(&self, index: usize) -> NonNull<u8> {
        // SAFETY: index <= cap, and cap * stride bytes were validated as a layout when the
        // buffer was created or resized, so the offset stays within (or one past) the block.
        unsafe { self.ptr.add(index * self.stride) }
    }

    /// # Safety
    /// `len` must be `<= cap`, and all slots below it must be initialized before being read.
    pub const unsafe fn set_len(&mut self, len: usize) {
        debug_assert!(len <= self.header.cap);
        self.header.len = len;
    }

    /// Makes room for at least `extra` more elements, growing by the growth factor (repeatedly,
    /// if needed) so that repeated calls stay amortized O(1).
    ///
    /// # Errors
    /// Returns [`OutOfMemory`] if allocation fails or the buffer is a
    /// [`Stack`](AllocationKind::Stack) buffer without enough room. The buffer is unchanged on
    /// error.
    pub fn reserve(&mut self, extra: usize) -> Result<(), OutOfMemory> {
        let required = self.len().checked_add(extra).ok_or(OutOfMemory)?;
        if required <= self.cap() {
            return Ok(());
        }

        let mut new_cap = self.cap();
        while new_cap < required {
            new_cap = grown_cap(new_cap)?;
        }

        self.set_cap(new_cap)
    }

    /// Grows the capacity once by the growth factor.
    pub fn grow(&mut self) -> Result<(), OutOfMemory> {
        self.set_cap(grown_cap(self.cap())?)
    }

    /// Reallocates to exactly `new_cap` slots. The caller is responsible for any elements beyond
    /// `new_cap`, which must have been destroyed already.
    ///
    /// # Errors
    /// Returns [`OutOfMemory`] for [`Stack`](AllocationKind::Stack) buffers, for layouts that
    /// overflow and when the allocator fails. The buffer is unchanged on error.
    pub fn set_cap(&mut self, new_cap: usize) -> Result<(), OutOfMemory> {
        if self.kind().is_stack() {
            return Err(OutOfMemory);
        }
        if new_cap == self.cap() {
            return Ok(());
        }
        debug_assert!(self.len() <= new_cap);

        let old_layout = self.layout_for(self.cap())?;
        let new_layout = self.layout_for(new_cap)?;

        let new_ptr = match (old_layout.size(), new_layout.size()) {
            (0, 0) => Some(self.ptr),
            (_, 0) => {
                // SAFETY: The old block was allocated with old_layout, which has a non-zero size.
                unsafe { alloc::dealloc(self.ptr.as_ptr(), old_layout) };
                Some(dangling(self.align))
            },
            // SAFETY: new_layout has a non-zero size.
            (0, _) => NonNull::new(unsafe { alloc::alloc(new_layout) }),
            // SAFETY: The block was allocated with old_layout, and the new size is non-zero and
            // fits in isize as checked by layout_for.
            (_, new_size) => NonNull::new(unsafe {
                alloc::realloc(self.ptr.as_ptr(), old_layout, new_size)
            }),
        };

        let Some(new_ptr) = new_ptr else {
            log::warn!(
                "failed to allocate {} bytes for {} slots",
                new_layout.size(),
                new_cap
            );
            return Err(OutOfMemory);
        };

        if self.cap() != 0 {
            log::debug!(
                "reallocated buffer from {} to {} slots of {} bytes",
                self.cap(),
                new_cap,
                self.stride
            );
        }

        self.ptr = new_ptr;
        self.header.cap = new_cap;
        Ok(())
    }

    fn layout_for(&self, cap: usize) -> Result<Layout, OutOfMemory> {
        let size = self.stride.checked_mul(cap).ok_or(OutOfMemory)?;
        Layout::from_size_align(size, self.align).map_err(|_| OutOfMemory)
    }
}

impl Drop for RawBuffer<'_> {
    fn drop(&mut self) {
        if self.kind().is_stack() {
            return;
        }

        if let Ok(layout) = self.layout_for(self.cap()) {
            if layout.size() != 0 {
                // SAFETY: Heap buffers always hold a block allocated with the layout for cap.
                unsafe { alloc::dealloc(self.ptr.as_ptr(), layout) };
            }
        }
    }
}

/// A non-null pointer with the provided alignment, for buffers without any allocated bytes.
fn dangling(align: usize) -> NonNull<u8> {
    NonNull::new(ptr::without_provenance_mut(align)).unwrap_or(NonNull::dangling())
}
