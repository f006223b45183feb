use std::fmt::{self, Debug, Formatter};
use std::mem::MaybeUninit;
use std::ptr::{self, NonNull};

use super::RawIter;
use crate::collections::contiguous::{AllocationKind, BufferHeader, INIT_CAP, RawBuffer};
use crate::types::{Overrides, TypeDescriptor};
use crate::util::error::OutOfMemory;

/// A growable, contiguous collection of elements whose type is only known through a
/// [`TypeDescriptor`].
///
/// Values go in and come out as raw pointers to one element's worth of bytes. Every
/// type-specific action (copying a value in, destroying it, comparing it, printing it) is
/// dispatched through the descriptor, with this vector's [`Overrides`] taking priority. The
/// overrides are local: the shared descriptor is never modified.
///
/// A RawVector either owns heap storage ([`AllocationKind::Heap`]), which grows by half of its
/// capacity when full, or borrows fixed storage from the caller ([`AllocationKind::Stack`]), in
/// which case any operation that needs more room returns [`OutOfMemory`] and changes nothing.
///
/// Dropping a RawVector destroys every element it holds and frees any heap storage.
///
/// # Time Complexity
/// For this analysis of time complexity, variables are defined as follows:
/// - `n`: The number of items in the RawVector.
/// - `m`: The number of items being added.
///
/// | Method | Complexity |
/// |-|-|
/// | `get` | `O(1)` |
/// | `len` | `O(1)` |
/// | `push` | `O(1)`*, `O(n)` |
/// | `pop` | `O(1)` |
/// | `append` | `O(m)`*, `O(n+m)` |
/// | `find` | `O(n)` |
/// | `set_cap` | `O(n)` |
/// | `clear` | `O(n)` |
///
/// \* If the RawVector doesn't have enough capacity, the elements are moved to a new allocation.
pub struct RawVector<'a> {
    buf: RawBuffer<'a>,
    descriptor: &'a TypeDescriptor,
    ops: TypeDescriptor,
}

impl<'a> RawVector<'a> {
    /// Creates a new heap RawVector with the default capacity of [`INIT_CAP`].
    ///
    /// # Errors
    /// Returns [`OutOfMemory`] if the initial allocation fails.
    ///
    /// # Examples
    /// ```
    /// # use container_core::collections::contiguous::RawVector;
    /// # use container_core::types::{descriptor_of, Overrides};
    /// let vec = RawVector::init(descriptor_of::<u32>(), Overrides::NONE).unwrap();
    /// assert_eq!(vec.len(), 0);
    /// assert_eq!(vec.cap(), 32);
    /// ```
    pub fn init(
        descriptor: &'a TypeDescriptor,
        overrides: Overrides,
    ) -> Result<RawVector<'a>, OutOfMemory> {
        RawVector::init_with_cap(descriptor, overrides, INIT_CAP)
    }

    /// Creates a new heap RawVector with capacity exactly equal to `cap`.
    ///
    /// # Errors
    /// Returns [`OutOfMemory`] if the allocation fails or its size would overflow.
    pub fn init_with_cap(
        descriptor: &'a TypeDescriptor,
        overrides: Overrides,
        cap: usize,
    ) -> Result<RawVector<'a>, OutOfMemory> {
        Ok(RawVector {
            buf: RawBuffer::allocate(descriptor.layout(), cap)?,
            descriptor,
            ops: descriptor.overridden(&overrides),
        })
    }

    /// Creates an empty RawVector over caller-provided storage. The capacity is the number of
    /// aligned elements that fit in `storage` and never changes.
    ///
    /// # Examples
    /// ```
    /// # use std::mem::MaybeUninit;
    /// # use container_core::collections::contiguous::{AllocationKind, RawVector};
    /// # use container_core::types::descriptor_of;
    /// let mut storage = [MaybeUninit::<u8>::uninit(); 2];
    /// let mut vec = RawVector::init_fixed(descriptor_of::<u8>(), &mut storage);
    /// assert_eq!(vec.kind(), AllocationKind::Stack);
    /// assert_eq!(vec.cap(), 2);
    /// // SAFETY: The pointers refer to valid u8 values.
    /// unsafe {
    ///     assert!(vec.push(&1_u8 as *const u8).is_ok());
    ///     assert!(vec.push(&2_u8 as *const u8).is_ok());
    ///     assert!(vec.push(&3_u8 as *const u8).is_err());
    /// }
    /// assert_eq!(vec.len(), 2);
    /// ```
    pub fn init_fixed(
        descriptor: &'a TypeDescriptor,
        storage: &'a mut [MaybeUninit<u8>],
    ) -> RawVector<'a> {
        RawVector {
            buf: RawBuffer::fixed(descriptor.layout(), storage),
            descriptor,
            ops: *descriptor,
        }
    }

    /// Wraps `cap` slots starting at `ptr` as an empty stack RawVector.
    ///
    /// # Safety
    /// The requirements of [`RawBuffer::from_raw_fixed`] apply, with the descriptor's layout as
    /// the element layout.
    pub(crate) unsafe fn from_raw_fixed(
        descriptor: &'a TypeDescriptor,
        overrides: Overrides,
        ptr: NonNull<u8>,
        cap: usize,
    ) -> RawVector<'a> {
        RawVector {
            // SAFETY: Upheld by the caller.
            buf: unsafe { RawBuffer::from_raw_fixed(descriptor.layout(), ptr, 0, cap) },
            descriptor,
            ops: descriptor.overridden(&overrides),
        }
    }

    /// Replaces the local overrides of this RawVector, leaving the shared descriptor untouched.
    ///
    /// # Safety
    /// Every provided operation must be sound for the described type, since safe methods such as
    /// [`clear`](RawVector::clear) and [`Debug`] call them.
    pub unsafe fn set_overrides(&mut self, overrides: Overrides) {
        self.ops = self.descriptor.overridden(&overrides);
    }

    /// Returns the shared descriptor this RawVector was created with.
    pub const fn descriptor(&self) -> &'a TypeDescriptor {
        self.descriptor
    }

    /// Returns the descriptor actually used for dispatch, with the local overrides applied.
    pub const fn operations(&self) -> &TypeDescriptor {
        &self.ops
    }

    pub const fn header(&self) -> BufferHeader {
        self.buf.header()
    }

    pub const fn len(&self) -> usize {
        self.buf.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.buf.len() == 0
    }

    pub const fn cap(&self) -> usize {
        self.buf.cap()
    }

    pub const fn kind(&self) -> AllocationKind {
        self.buf.kind()
    }

    /// Returns a pointer to the first element slot, valid for `len` elements.
    pub const fn as_ptr(&self) -> NonNull<u8> {
        self.buf.as_ptr()
    }

    /// Returns a pointer to the element at `index`, or [`None`] if it is out of bounds.
    pub const fn get(&self, index: usize) -> Option<NonNull<u8>> {
        if index < self.len() {
            // SAFETY: index < len <= cap.
            Some(unsafe { self.buf.slot(index) })
        } else {
            None
        }
    }

    /// Returns a pointer to the last element, or [`None`] if the RawVector is empty.
    pub const fn last(&self) -> Option<NonNull<u8>> {
        match self.len().checked_sub(1) {
            Some(index) => self.get(index),
            None => None,
        }
    }

    /// Returns an iterator over pointers to each element, in order.
    pub fn iter(&self) -> RawIter<'_> {
        // SAFETY: The first len slots are initialized and stay borrowed along with self.
        unsafe { RawIter::new(self.buf.as_ptr(), self.buf.stride(), self.len()) }
    }

    /// Copies the element at `value` onto the end of the RawVector using the copy operation,
    /// growing if required, and returns its index.
    ///
    /// # Errors
    /// Returns [`OutOfMemory`] if there isn't room and the RawVector can't grow. Nothing is
    /// copied in that case.
    ///
    /// # Safety
    /// `value` must point to a valid, aligned element of the described type.
    pub unsafe fn push(&mut self, value: *const u8) -> Result<usize, OutOfMemory> {
        let index = self.len();
        let slot = self.spare_slot()?;

        // SAFETY: The slot is within capacity and uninitialized, value is valid per the caller.
        unsafe {
            self.ops.copy(slot.as_ptr(), value);
            self.buf.set_len(index + 1);
        }
        Ok(index)
    }

    /// Ensures there is room for one more element and returns a pointer to the slot at `len`,
    /// which the caller may initialize before extending the length with
    /// [`set_len`](RawVector::set_len).
    pub(crate) fn spare_slot(&mut self) -> Result<NonNull<u8>, OutOfMemory> {
        self.buf.reserve(1)?;
        // SAFETY: reserve ensures len < cap.
        Ok(unsafe { self.buf.slot(self.len()) })
    }

    /// Appends `count` elements from `items` with a single block copy, bypassing the copy
    /// operation, and returns the index of the first appended element.
    ///
    /// # Errors
    /// Returns [`OutOfMemory`] if there isn't room for all of them and the RawVector can't grow.
    /// Nothing is appended in that case.
    ///
    /// # Safety
    /// `items` must point to `count` valid, contiguous elements of the described type, which must
    /// be safe to duplicate byte-wise, and must not overlap this RawVector's storage.
    pub unsafe fn append(&mut self, items: *const u8, count: usize) -> Result<usize, OutOfMemory> {
        let start = self.len();
        self.buf.reserve(count)?;

        // SAFETY: reserve ensures room for count elements after start, which also means that
        // count * stride can't overflow. The caller ensures that items is valid and disjoint.
        unsafe {
            ptr::copy_nonoverlapping(
                items,
                self.buf.slot(start).as_ptr(),
                count * self.buf.stride(),
            );
            self.buf.set_len(start + count);
        }
        Ok(start)
    }

    /// Removes the last element. If `out` is provided, the element is moved there and the caller
    /// becomes responsible for destroying it. Otherwise it is destroyed in place. Returns false if
    /// the RawVector was empty.
    ///
    /// # Safety
    /// If provided, `out` must be valid for a write of one element and must not overlap the
    /// RawVector's storage.
    pub unsafe fn pop(&mut self, out: Option<*mut u8>) -> bool {
        let Some(index) = self.len().checked_sub(1) else {
            return false;
        };

        // SAFETY: index < len, so the slot holds an initialized element. It is either moved out or
        // destroyed, then forgotten by reducing the length.
        unsafe {
            let elem = self.buf.slot(index).as_ptr();
            match out {
                Some(out) => ptr::copy_nonoverlapping(elem, out, self.buf.stride()),
                None => self.ops.destroy(elem),
            }
            self.buf.set_len(index);
        }
        true
    }

    /// Returns the index of the first element equal to `value` according to the equal operation.
    ///
    /// # Safety
    /// `value` must point to a valid, aligned element of the described type.
    pub unsafe fn find(&self, value: *const u8) -> Option<usize> {
        // SAFETY: Each pointer refers to an initialized element, value is valid per the caller.
        self.iter().position(|elem| unsafe { self.ops.equal(elem.as_ptr(), value) })
    }

    /// Sets the length directly, growing first if `len` exceeds the capacity.
    ///
    /// Shrinking only moves the length; no elements are destroyed. Extending leaves the new slots
    /// uninitialized. [`extend_default`](RawVector::extend_default) and
    /// [`truncate`](RawVector::truncate) are the initializing and destroying counterparts.
    ///
    /// # Errors
    /// Returns [`OutOfMemory`] if growing was required and failed, in which case the length is
    /// unchanged.
    ///
    /// # Safety
    /// Slots in `old_len..len` must be initialized before they are read, destroyed or the
    /// RawVector is dropped. Elements in `len..old_len` are forgotten.
    pub unsafe fn set_len(&mut self, len: usize) -> Result<(), OutOfMemory> {
        if let Some(extra) = len.checked_sub(self.len()) {
            self.buf.reserve(extra)?;
        }
        // SAFETY: reserve ensures len <= cap, and the caller takes care of initialization.
        unsafe { self.buf.set_len(len) };
        Ok(())
    }

    /// Appends `count` elements initialized from the descriptor's default value, or zero-filled
    /// if it doesn't have one.
    ///
    /// # Errors
    /// Returns [`OutOfMemory`] if there isn't room and the RawVector can't grow. Nothing is added
    /// in that case.
    ///
    /// # Safety
    /// If the descriptor has no default value, a zeroed element must be a valid element.
    pub unsafe fn extend_default(&mut self, count: usize) -> Result<(), OutOfMemory> {
        let start = self.len();
        self.buf.reserve(count)?;

        for index in start..start + count {
            // SAFETY: reserve ensures that every slot up to start + count is within capacity.
            // Default values are aligned, valid elements of the described type.
            unsafe {
                let slot = self.buf.slot(index).as_ptr();
                match self.descriptor.default_value() {
                    Some(default) => self.ops.copy(slot, default.as_ptr()),
                    None => slot.write_bytes(0, self.buf.stride()),
                }
                self.buf.set_len(index + 1);
            }
        }
        Ok(())
    }

    /// Shortens the RawVector to `len`, destroying the removed elements. Does nothing if `len` is
    /// not less than the current length.
    pub fn truncate(&mut self, len: usize) {
        while self.len() > len {
            // SAFETY: The vector isn't empty and no output is requested.
            unsafe { self.pop(None) };
        }
    }

    /// Destroys every element, leaving the capacity untouched.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Ensures that the RawVector has capacity for `extra` more elements, growing by the growth
    /// factor until it does.
    ///
    /// # Errors
    /// Returns [`OutOfMemory`] if growing fails or isn't possible.
    pub fn reserve(&mut self, extra: usize) -> Result<(), OutOfMemory> {
        self.buf.reserve(extra)
    }

    /// Grows the capacity once by the growth factor.
    ///
    /// # Errors
    /// Returns [`OutOfMemory`] if growing fails or isn't possible.
    pub fn grow(&mut self) -> Result<(), OutOfMemory> {
        self.buf.grow()
    }

    /// Sets the capacity to exactly `cap`, destroying any elements beyond it.
    ///
    /// # Errors
    /// Returns [`OutOfMemory`] for stack RawVectors, which never change capacity, and if the
    /// allocation fails. Nothing is destroyed in either case.
    pub fn set_cap(&mut self, cap: usize) -> Result<(), OutOfMemory> {
        if self.kind().is_stack() {
            return Err(OutOfMemory);
        }
        if cap >= self.len() {
            return self.buf.set_cap(cap);
        }

        // Elements are only destroyed once their new home is known to exist.
        let mut replacement = RawBuffer::allocate(self.descriptor.layout(), cap)?;
        self.truncate(cap);

        // SAFETY: The first cap slots hold initialized elements and the replacement has room for
        // exactly cap of them. The old buffer forgets them before it is dropped.
        unsafe {
            ptr::copy_nonoverlapping(
                self.buf.as_ptr().as_ptr(),
                replacement.as_ptr().as_ptr(),
                cap * self.buf.stride(),
            );
            replacement.set_len(cap);
            self.buf.set_len(0);
        }
        self.buf = replacement;
        Ok(())
    }

    /// Shrinks the capacity to match the length.
    ///
    /// # Errors
    /// Returns [`OutOfMemory`] for stack RawVectors and if the reallocation fails.
    pub fn shrink_to_fit(&mut self) -> Result<(), OutOfMemory> {
        self.set_cap(self.len())
    }
}

impl Drop for RawVector<'_> {
    fn drop(&mut self) {
        self.clear();
        // The buffer frees its own heap storage, if any.
    }
}

impl Debug for RawVector<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawVector")
            .field("type", &self.descriptor.name())
            .field("contents", &Contents(self))
            .field("len", &self.len())
            .field("cap", &self.cap())
            .field("kind", &self.kind())
            .finish()
    }
}

struct Contents<'v, 'a>(&'v RawVector<'a>);

impl Debug for Contents<'_, '_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.0.iter().map(|elem| Stringified(&self.0.ops, elem)))
            .finish()
    }
}

/// Formats one element with its stringify operation.
struct Stringified<'v>(&'v TypeDescriptor, NonNull<u8>);

impl Debug for Stringified<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        // SAFETY: Only created by Contents, for initialized elements of the described type.
        unsafe { self.0.stringify(self.1.as_ptr(), f) }
    }
}
