use std::alloc::Layout;
use std::borrow::Borrow;
use std::ffi::CStr;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::ptr::{self, NonNull};
use std::slice;
use std::str::FromStr;

use super::view::{Stamp, View};
use crate::collections::contiguous::{AllocationKind, INIT_CAP, RawBuffer};
use crate::hash;
use crate::types::Element;
use crate::util::error::{IndexOutOfBounds, OutOfMemory, StaleOrOutOfMemory, StaleView};
use crate::util::result::ResultExtension;

const BYTE: Layout = Layout::new::<u8>();

/// A growable string of bytes, always followed by a NUL byte that isn't counted in its length.
///
/// The contents don't have to be UTF-8 and may contain NUL bytes themselves. A ByteString is
/// either a read-only wrapper around a `'static` C string literal
/// ([`AllocationKind::Stack`], see [`literal`](ByteString::literal)), or an owned heap string
/// ([`AllocationKind::Heap`]) which grows by half of its capacity when full. A literal never
/// becomes a heap string: every modification of one returns [`OutOfMemory`] and changes nothing.
///
/// Substrings are referred to by [`View`]s, which stay cheap to copy because they don't borrow the
/// string. Instead, each modification gives the string a new stamp, and resolving a View made
/// before the modification fails with [`StaleView`].
///
/// # Time Complexity
/// For this analysis of time complexity, variables are defined as follows:
/// - `n`: The length of the ByteString.
/// - `m`: The length of the other string or query.
///
/// | Method | Complexity |
/// |-|-|
/// | `len` | `O(1)` |
/// | `push` | `O(1)`*, `O(n)` |
/// | `push_bytes` | `O(m)`*, `O(n+m)` |
/// | `slice` | `O(1)` |
/// | `resolve` | `O(1)` |
/// | `find_first` | `O(n*m)` |
/// | `find_all` | `O(n*m)` |
/// | `replace_first` | `O(n*m)` |
/// | `compare` | `O(n)` |
///
/// \* If the ByteString doesn't have enough capacity, the contents are moved to a new allocation.
pub struct ByteString {
    // The buffer's capacity includes the slot for the terminating NUL, its length doesn't.
    buf: RawBuffer<'static>,
    stamp: Stamp,
}

impl ByteString {
    /// Creates a new, empty heap ByteString with room for [`INIT_CAP`] bytes.
    ///
    /// # Errors
    /// Returns [`OutOfMemory`] if the allocation fails.
    pub fn new() -> Result<ByteString, OutOfMemory> {
        ByteString::with_cap(INIT_CAP)
    }

    /// Creates a new, empty heap ByteString with room for exactly `cap` bytes, plus the NUL.
    ///
    /// # Errors
    /// Returns [`OutOfMemory`] if the allocation fails or its size would overflow.
    pub fn with_cap(cap: usize) -> Result<ByteString, OutOfMemory> {
        let mut buf = RawBuffer::allocate(BYTE, cap.checked_add(1).ok_or(OutOfMemory)?)?;
        // SAFETY: The buffer has room for at least one byte.
        unsafe { buf.slot(0).write(0) };

        Ok(ByteString {
            buf,
            stamp: Stamp::next(),
        })
    }

    /// Wraps a C string literal without copying it. The resulting ByteString has the
    /// [`Stack`](AllocationKind::Stack) kind, so it can be read, sliced and searched but never
    /// modified.
    ///
    /// # Examples
    /// ```
    /// # use container_core::collections::string::ByteString;
    /// # use container_core::collections::contiguous::AllocationKind;
    /// let mut hello = ByteString::literal(c"Hello");
    /// assert_eq!(hello.kind(), AllocationKind::Stack);
    /// assert_eq!(&*hello, b"Hello");
    /// assert!(hello.push(b'!').is_err());
    /// ```
    pub fn literal(literal: &'static CStr) -> ByteString {
        let bytes = literal.to_bytes_with_nul();
        let len = bytes.len() - 1;

        ByteString {
            // SAFETY: The literal is valid for len + 1 bytes forever. It is only ever read,
            // because every method that writes checks the kind first.
            buf: unsafe {
                RawBuffer::from_raw_fixed(BYTE, NonNull::from(bytes).cast(), len, len + 1)
            },
            stamp: Stamp::next(),
        }
    }

    /// Creates a heap ByteString containing a copy of `bytes`, with exactly enough capacity for
    /// them.
    ///
    /// # Errors
    /// Returns [`OutOfMemory`] if the allocation fails.
    pub fn from_bytes(bytes: &[u8]) -> Result<ByteString, OutOfMemory> {
        let mut string = ByteString::with_cap(bytes.len())?;
        string.push_bytes(bytes)?;
        Ok(string)
    }

    /// Creates a heap ByteString containing a copy of `c_str`, without its NUL.
    ///
    /// # Errors
    /// Returns [`OutOfMemory`] if the allocation fails.
    pub fn from_c_str(c_str: &CStr) -> Result<ByteString, OutOfMemory> {
        ByteString::from_bytes(c_str.to_bytes())
    }

    /// Creates a heap ByteString containing a copy of the bytes that `view` refers to in `source`.
    ///
    /// # Errors
    /// Returns [`StaleView`] if `view` doesn't belong to the current state of `source`, or
    /// [`OutOfMemory`] if the allocation fails.
    pub fn from_view(source: &ByteString, view: View) -> Result<ByteString, StaleOrOutOfMemory> {
        Ok(ByteString::from_bytes(source.resolve(view)?)?)
    }

    /// Returns a copy of this ByteString. Literals are copied by reference and stay literals,
    /// while heap strings are copied into a new allocation with exactly enough capacity.
    ///
    /// # Errors
    /// Returns [`OutOfMemory`] if the allocation fails.
    pub fn try_clone(&self) -> Result<ByteString, OutOfMemory> {
        match self.kind() {
            AllocationKind::Stack => Ok(ByteString {
                // SAFETY: Stack strings are only created from 'static literals, valid for the
                // whole buffer, and are never written to.
                buf: unsafe {
                    RawBuffer::from_raw_fixed(BYTE, self.buf.as_ptr(), self.len(), self.buf.cap())
                },
                stamp: Stamp::next(),
            }),
            AllocationKind::Heap => ByteString::from_bytes(self),
        }
    }

    /// Returns the length of the ByteString in bytes, not counting the NUL.
    pub const fn len(&self) -> usize {
        self.buf.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.buf.len() == 0
    }

    /// Returns the number of bytes the ByteString can hold without reallocating, not counting the
    /// NUL.
    pub const fn cap(&self) -> usize {
        self.buf.cap() - 1
    }

    /// Returns the number of bytes that can be added without reallocating.
    pub const fn spare_cap(&self) -> usize {
        self.cap() - self.len()
    }

    pub const fn kind(&self) -> AllocationKind {
        self.buf.kind()
    }

    /// Returns the stamp identifying the current contents of the ByteString.
    pub const fn stamp(&self) -> Stamp {
        self.stamp
    }

    pub const fn as_bytes(&self) -> &[u8] {
        // SAFETY: The first len bytes are initialized and stay unchanged while self is borrowed.
        unsafe { slice::from_raw_parts(self.buf.as_ptr().as_ptr(), self.len()) }
    }

    /// Returns the contents followed by the terminating NUL.
    pub const fn as_bytes_with_nul(&self) -> &[u8] {
        // SAFETY: As for as_bytes, with the NUL at index len always being initialized.
        unsafe { slice::from_raw_parts(self.buf.as_ptr().as_ptr(), self.len() + 1) }
    }

    /// Returns a pointer to the contents, which are followed by a NUL.
    pub const fn as_ptr(&self) -> *const u8 {
        self.buf.as_ptr().as_ptr()
    }

    /// Appends one byte.
    ///
    /// # Errors
    /// Returns [`OutOfMemory`] for literals and if growing fails.
    pub fn push(&mut self, byte: u8) -> Result<(), OutOfMemory> {
        self.push_bytes(&[byte])
    }

    /// Appends a copy of `bytes`.
    ///
    /// # Errors
    /// Returns [`OutOfMemory`] for literals and if growing fails. Nothing is appended in that
    /// case.
    ///
    /// # Examples
    /// ```
    /// # use container_core::collections::string::ByteString;
    /// let mut string = ByteString::with_cap(0).unwrap();
    /// string.push_bytes(b"Hello, ").unwrap();
    /// string.push_str("world!").unwrap();
    /// assert_eq!(string.as_bytes_with_nul(), b"Hello, world!\0");
    /// ```
    pub fn push_bytes(&mut self, bytes: &[u8]) -> Result<(), OutOfMemory> {
        self.reserve(bytes.len())?;
        let len = self.len();

        // SAFETY: reserve makes room for bytes and the NUL after len. bytes is a shared borrow,
        // so it can't be part of this string.
        unsafe {
            ptr::copy_nonoverlapping(bytes.as_ptr(), self.buf.slot(len).as_ptr(), bytes.len());
            self.commit_len(len + bytes.len());
        }
        Ok(())
    }

    pub fn push_str(&mut self, string: &str) -> Result<(), OutOfMemory> {
        self.push_bytes(string.as_bytes())
    }

    /// Appends the bytes that `view` refers to in `source`. To append part of this string to
    /// itself, use [`extend_from_within`](ByteString::extend_from_within).
    ///
    /// # Errors
    /// Returns [`StaleView`] if `view` doesn't belong to the current state of `source`, or
    /// [`OutOfMemory`] for literals and if growing fails.
    pub fn push_view(&mut self, source: &ByteString, view: View) -> Result<(), StaleOrOutOfMemory> {
        Ok(self.push_bytes(source.resolve(view)?)?)
    }

    /// Appends a copy of the bytes that `view` refers to in this string.
    ///
    /// # Errors
    /// Returns [`StaleView`] if `view` doesn't belong to the current state of this string, or
    /// [`OutOfMemory`] for literals and if growing fails.
    ///
    /// # Examples
    /// ```
    /// # use container_core::collections::string::ByteString;
    /// let mut string = ByteString::from_bytes(b"la").unwrap();
    /// let all = string.slice(0, -1);
    /// string.extend_from_within(all).unwrap();
    /// assert_eq!(&*string, b"lala");
    /// assert!(string.extend_from_within(all).is_err(), "The view is now stale.");
    /// ```
    pub fn extend_from_within(&mut self, view: View) -> Result<(), StaleOrOutOfMemory> {
        let count = self.resolve(view)?.len();

        self.reserve(count)?;
        let len = self.len();

        // SAFETY: The view was resolved above, so offset + count <= len, and reserve makes room
        // for count bytes and the NUL after len. The source range ends at or before len, so the
        // two don't overlap.
        unsafe {
            ptr::copy_nonoverlapping(
                self.buf.slot(view.offset()).as_ptr(),
                self.buf.slot(len).as_ptr(),
                count,
            );
            self.commit_len(len + count);
        }
        Ok(())
    }

    /// Sets the length directly, growing first if needed, and writes the NUL at the new length.
    ///
    /// # Errors
    /// Returns [`OutOfMemory`] for literals and if growing fails.
    ///
    /// # Safety
    /// Bytes in `old_len..len` are uninitialized and must be written before being read.
    pub unsafe fn set_len(&mut self, len: usize) -> Result<(), OutOfMemory> {
        if let Some(extra) = len.checked_sub(self.len()) {
            self.reserve(extra)?;
        } else {
            self.check_mutable()?;
        }

        // SAFETY: There is room for len bytes and the NUL. Initializing the new bytes is up to the
        // caller.
        unsafe { self.commit_len(len) };
        Ok(())
    }

    /// Resizes the ByteString to `len`, filling any new bytes with zeroes.
    ///
    /// # Errors
    /// Returns [`OutOfMemory`] for literals and if growing fails.
    pub fn resize_zeroed(&mut self, len: usize) -> Result<(), OutOfMemory> {
        let old_len = self.len();
        if let Some(extra) = len.checked_sub(old_len) {
            self.reserve(extra)?;
            // SAFETY: reserve makes room for extra bytes after old_len.
            unsafe { self.buf.slot(old_len).write_bytes(0, extra) };
        } else {
            self.check_mutable()?;
        }

        // SAFETY: Every byte below len is initialized and there is room for the NUL.
        unsafe { self.commit_len(len) };
        Ok(())
    }

    /// Shortens the ByteString to `len` bytes. Does nothing if it isn't already longer.
    ///
    /// # Errors
    /// Returns [`OutOfMemory`] for literals.
    pub fn truncate(&mut self, len: usize) -> Result<(), OutOfMemory> {
        self.check_mutable()?;
        if len < self.len() {
            // SAFETY: Shrinking keeps every byte below len initialized.
            unsafe { self.commit_len(len) };
        }
        Ok(())
    }

    /// Empties the ByteString, keeping its capacity.
    ///
    /// # Errors
    /// Returns [`OutOfMemory`] for literals.
    pub fn clear(&mut self) -> Result<(), OutOfMemory> {
        self.truncate(0)
    }

    /// Ensures that there is room for `extra` more bytes, growing by half of the capacity until
    /// there is.
    ///
    /// # Errors
    /// Returns [`OutOfMemory`] for literals and if growing fails.
    pub fn reserve(&mut self, extra: usize) -> Result<(), OutOfMemory> {
        self.check_mutable()?;
        self.buf.reserve(extra.checked_add(1).ok_or(OutOfMemory)?)
    }

    /// Shrinks the capacity to match the length.
    ///
    /// # Errors
    /// Returns [`OutOfMemory`] for literals and if the reallocation fails.
    pub fn shrink_to_fit(&mut self) -> Result<(), OutOfMemory> {
        self.check_mutable()?;
        self.buf.set_cap(self.len() + 1)
    }

    /// Returns a [`View`] of the bytes from `begin` up to `end`. Negative indices count back from
    /// the end of the string, with `-1` meaning the length, so `slice(0, -1)` is the whole string.
    ///
    /// # Panics
    /// Panics unless `0 <= begin < end <= len` once negative indices are resolved. See
    /// [`try_slice`](ByteString::try_slice) for a non-panicking version.
    ///
    /// # Examples
    /// ```
    /// # use container_core::collections::string::ByteString;
    /// let string = ByteString::literal(c"Hello, world!");
    /// let world = string.slice(7, -2);
    /// assert_eq!(string.resolve(world).unwrap(), b"world");
    /// ```
    pub fn slice(&self, begin: isize, end: isize) -> View {
        self.try_slice(begin, end).throw()
    }

    /// Returns a [`View`] of the bytes from `begin` up to `end`, the same as
    /// [`slice`](ByteString::slice).
    ///
    /// # Errors
    /// Returns [`IndexOutOfBounds`] with the offending index unless `0 <= begin < end <= len`
    /// once negative indices are resolved.
    pub fn try_slice(&self, begin: isize, end: isize) -> Result<View, IndexOutOfBounds> {
        let len = self.len();
        let out_of_bounds = |index| IndexOutOfBounds { index, len };

        let absolute = |index: isize| {
            if index < 0 {
                len.checked_add_signed(index + 1)
            } else {
                Some(index.unsigned_abs())
            }
        };

        let start = absolute(begin)
            .filter(|&start| start < len)
            .ok_or_else(|| out_of_bounds(begin))?;
        let stop = absolute(end)
            .filter(|&stop| start < stop && stop <= len)
            .ok_or_else(|| out_of_bounds(end))?;

        Ok(View::new(start, stop - start, self.stamp))
    }

    /// Returns a [`View`] of the whole string, which may be empty.
    pub fn view(&self) -> View {
        View::new(0, self.len(), self.stamp)
    }

    /// Returns the bytes that `view` refers to.
    ///
    /// # Errors
    /// Returns [`StaleView`] if the view was made from another string, or from this one before it
    /// was last modified.
    pub fn resolve(&self, view: View) -> Result<&[u8], StaleView> {
        if view.stamp() != self.stamp {
            return Err(StaleView);
        }
        self.as_bytes().get(view.range()).ok_or(StaleView)
    }

    /// Compares the contents with `other`. Strings of different lengths always compare as `1`.
    /// Otherwise the result is the sign of the first differing byte of self minus that of other,
    /// or `0` if they are equal.
    ///
    /// # Examples
    /// ```
    /// # use container_core::collections::string::ByteString;
    /// let string = ByteString::literal(c"abc");
    /// assert_eq!(string.compare(b"abc"), 0);
    /// assert_eq!(string.compare(b"abd"), -1);
    /// assert_eq!(string.compare(b"abb"), 1);
    /// assert_eq!(string.compare(b"ab"), 1);
    /// ```
    pub fn compare(&self, other: &[u8]) -> i32 {
        if self.len() != other.len() {
            return 1;
        }

        self.iter()
            .zip(other)
            .find(|(a, b)| a != b)
            .map_or(0, |(a, b)| (i32::from(*a) - i32::from(*b)).signum())
    }

    fn check_mutable(&self) -> Result<(), OutOfMemory> {
        match self.kind() {
            AllocationKind::Stack => Err(OutOfMemory),
            AllocationKind::Heap => Ok(()),
        }
    }

    /// Sets the length, terminates the string and renews the stamp.
    ///
    /// # Safety
    /// The buffer must have room for `len + 1` bytes, and every byte below `len` must be
    /// initialized. The string must be a heap string.
    pub(crate) unsafe fn commit_len(&mut self, len: usize) {
        debug_assert!(self.kind().is_heap());
        // SAFETY: len < buffer capacity, as upheld by the caller.
        unsafe {
            self.buf.set_len(len);
            self.buf.slot(len).write(0);
        }
        self.stamp = Stamp::next();
    }
}

impl Deref for ByteString {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.as_bytes()
    }
}

impl AsRef<[u8]> for ByteString {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl Borrow<[u8]> for ByteString {
    fn borrow(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl Clone for ByteString {
    /// Clones the ByteString with [`try_clone`](ByteString::try_clone).
    ///
    /// # Panics
    /// Panics if the allocation fails.
    fn clone(&self) -> Self {
        self.try_clone().throw()
    }
}

impl PartialEq for ByteString {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for ByteString {}

impl PartialEq<[u8]> for ByteString {
    fn eq(&self, other: &[u8]) -> bool {
        self.as_bytes() == other
    }
}

impl PartialEq<str> for ByteString {
    fn eq(&self, other: &str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialEq<&str> for ByteString {
    fn eq(&self, other: &&str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Hash for ByteString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_bytes().hash(state);
    }
}

impl FromStr for ByteString {
    type Err = OutOfMemory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ByteString::from_bytes(s.as_bytes())
    }
}

impl TryFrom<&[u8]> for ByteString {
    type Error = OutOfMemory;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        ByteString::from_bytes(value)
    }
}

impl TryFrom<&str> for ByteString {
    type Error = OutOfMemory;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        ByteString::from_bytes(value.as_bytes())
    }
}

impl From<&'static CStr> for ByteString {
    fn from(value: &'static CStr) -> Self {
        ByteString::literal(value)
    }
}

// SAFETY: A ByteString uniquely owns its heap storage, and literals are immutable 'static data.
unsafe impl Send for ByteString {}
// SAFETY: No method taking &self mutates anything.
unsafe impl Sync for ByteString {}

// SAFETY: Every byte-wise default is overridden, so a ByteString is never duplicated or inspected
// as raw bytes.
unsafe impl Element for ByteString {
    const NAME: &'static str = "ByteString";

    fn duplicate(&self) -> Self {
        self.clone()
    }

    fn element_hash(&self, seed: u64) -> u64 {
        hash::murmur3_64(self, seed)
    }

    fn element_eq(&self, other: &Self) -> bool {
        self.compare(other) == 0
    }

    fn stringify(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        write!(out, "{self}")
    }
}
