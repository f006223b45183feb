use std::borrow::{Borrow, BorrowMut};
use std::fmt::{self, Debug, Formatter};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::mem::MaybeUninit;
use std::ops::{Deref, DerefMut};
use std::ptr::{self, NonNull};
use std::slice;

use crate::collections::contiguous::{AllocationKind, BufferHeader, INIT_CAP, RawVector};
use crate::types::{Element, Overrides, descriptor_of};
use crate::util::error::{IndexOutOfBounds, OutOfMemory};
use crate::util::result::ResultExtension;

/// A variable size contiguous collection of `T`, built on top of a [`RawVector`] using the
/// descriptor from `T`'s [`Element`] implementation.
///
/// Unlike [`RawVector`], values are moved in and out rather than copied through the descriptor,
/// so a Vector works like a regular owned collection. Any growth that fails is reported as
/// [`OutOfMemory`] instead of aborting, and leaves the Vector unchanged.
///
/// # Time Complexity
/// For this analysis of time complexity, variables are defined as follows:
/// - `n`: The number of items in the Vector.
/// - `m`: The number of items in the appended slice.
///
/// | Method | Complexity |
/// |-|-|
/// | `get` | `O(1)` |
/// | `len` | `O(1)` |
/// | `push` | `O(1)`*, `O(n)` |
/// | `pop` | `O(1)` |
/// | `append` | `O(m)`*, `O(n+m)` |
/// | `find` | `O(n)` |
/// | `reserve` | `O(n)`**, `O(1)` |
/// | `set_cap` | `O(n)` |
/// | `truncate` | `O(n)` |
///
/// \* If the Vector doesn't have enough capacity for the new elements, they take `O(n)`.
///
/// \** If the Vector has enough capacity for the additional items already, `reserve` is `O(1)`.
pub struct Vector<'a, T> {
    raw: RawVector<'a>,
    _phantom: PhantomData<T>,
}

impl<T: Element> Vector<'static, T> {
    /// Creates a new heap Vector with the default capacity of [`INIT_CAP`].
    ///
    /// # Errors
    /// Returns [`OutOfMemory`] if the initial allocation fails.
    ///
    /// # Examples
    /// ```
    /// # use container_core::collections::contiguous::Vector;
    /// let vec = Vector::<u8>::init().unwrap();
    /// assert_eq!(vec.len(), 0);
    /// assert_eq!(vec.cap(), 32);
    /// ```
    pub fn init() -> Result<Vector<'static, T>, OutOfMemory> {
        Vector::with_cap(INIT_CAP)
    }

    /// Creates a new heap Vector with capacity exactly equal to the provided value, allowing
    /// values to be added without reallocation.
    ///
    /// # Errors
    /// Returns [`OutOfMemory`] if the allocation fails or its size would overflow.
    ///
    /// # Examples
    /// ```
    /// # use container_core::collections::contiguous::Vector;
    /// let mut vec = Vector::<u8>::with_cap(5).unwrap();
    /// assert_eq!(vec.cap(), 5);
    /// vec.append(&[1, 2, 3, 4, 5]).unwrap();
    /// assert_eq!(vec.cap(), 5);
    /// ```
    pub fn with_cap(cap: usize) -> Result<Vector<'static, T>, OutOfMemory> {
        Ok(Vector {
            raw: RawVector::init_with_cap(descriptor_of::<T>(), Overrides::NONE, cap)?,
            _phantom: PhantomData,
        })
    }

    /// Creates a new heap Vector whose local operations are replaced by `overrides`. The shared
    /// descriptor of `T` isn't affected.
    ///
    /// # Errors
    /// Returns [`OutOfMemory`] if the initial allocation fails.
    ///
    /// # Safety
    /// Every provided operation must be sound when called on valid values of `T`. The copy
    /// operation must produce a value that is safe to drop independently of the original.
    pub unsafe fn init_with(overrides: Overrides) -> Result<Vector<'static, T>, OutOfMemory> {
        Ok(Vector {
            raw: RawVector::init_with_cap(descriptor_of::<T>(), overrides, INIT_CAP)?,
            _phantom: PhantomData,
        })
    }
}

impl<'a, T: Element> Vector<'a, T> {
    /// Creates an empty Vector over caller-provided storage, with a capacity equal to the length
    /// of `storage` that never changes. Nothing is ever freed by the Vector, but its elements are
    /// still dropped.
    ///
    /// # Examples
    /// ```
    /// # use std::mem::MaybeUninit;
    /// # use container_core::collections::contiguous::{AllocationKind, Vector};
    /// let mut storage = [MaybeUninit::<u32>::uninit(); 2];
    /// let mut vec = Vector::init_fixed(&mut storage);
    /// assert_eq!(vec.kind(), AllocationKind::Stack);
    /// assert!(vec.push(1).is_ok());
    /// assert!(vec.push(2).is_ok());
    /// assert!(vec.push(3).is_err());
    /// assert_eq!(&*vec, &[1, 2]);
    /// ```
    pub fn init_fixed(storage: &'a mut [MaybeUninit<T>]) -> Vector<'a, T> {
        let cap = storage.len();
        let ptr = NonNull::from(storage).cast::<u8>();

        Vector {
            // SAFETY: storage is aligned for T and valid for cap elements, and is borrowed
            // mutably for 'a.
            raw: unsafe {
                RawVector::from_raw_fixed(descriptor_of::<T>(), Overrides::NONE, ptr, cap)
            },
            _phantom: PhantomData,
        }
    }

    /// Returns the length of the Vector.
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns true if the Vector contains no elements.
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Returns the current capacity of the Vector. The capacity is exactly the value provided to
    /// any of the capacity manipulation functions, or the result of growing by the growth factor.
    pub const fn cap(&self) -> usize {
        self.raw.cap()
    }

    pub const fn kind(&self) -> AllocationKind {
        self.raw.kind()
    }

    pub const fn header(&self) -> BufferHeader {
        self.raw.header()
    }

    /// Returns the type-erased RawVector this Vector is built on.
    pub const fn as_raw(&self) -> &RawVector<'a> {
        &self.raw
    }

    /// Push the provided value onto the end of the Vector, increasing the capacity if required,
    /// and returns its index.
    ///
    /// # Errors
    /// Returns [`OutOfMemory`] if more capacity was needed and couldn't be allocated. The value is
    /// dropped in that case.
    ///
    /// # Examples
    /// ```
    /// # use container_core::collections::contiguous::Vector;
    /// let mut vec = Vector::<u8>::with_cap(0).unwrap();
    /// for i in 0..=5 {
    ///     assert_eq!(vec.push(i), Ok(i as usize));
    /// }
    /// assert_eq!(&*vec, &[0, 1, 2, 3, 4, 5]);
    /// ```
    pub fn push(&mut self, value: T) -> Result<usize, OutOfMemory> {
        let index = self.len();
        let slot = self.raw.spare_slot()?;

        // SAFETY: spare_slot guarantees room for one more element at index. The slot is aligned
        // for T because the RawVector uses T's layout.
        unsafe {
            slot.cast::<T>().write(value);
            self.set_len_unchecked(index + 1);
        }
        Ok(index)
    }

    /// Pops the last value off the end of the Vector, returning an owned value if the Vector has
    /// length greater than 0.
    ///
    /// # Examples
    /// ```
    /// # use container_core::collections::contiguous::Vector;
    /// let mut vec = Vector::<u8>::init().unwrap();
    /// vec.append(&[0, 1, 2]).unwrap();
    /// for i in (0..vec.len()).rev() {
    ///     assert_eq!(vec.pop(), Some(i as u8));
    /// }
    /// assert_eq!(vec.pop(), None);
    /// ```
    pub fn pop(&mut self) -> Option<T> {
        let mut out = MaybeUninit::<T>::uninit();

        // SAFETY: out is valid for one T and doesn't overlap the Vector's storage.
        if unsafe { self.raw.pop(Some(out.as_mut_ptr().cast())) } {
            // SAFETY: A successful pop moved an initialized T into out.
            Some(unsafe { out.assume_init() })
        } else {
            None
        }
    }

    /// Appends a copy of every element in `items` with a single block copy, returning the index
    /// of the first appended element.
    ///
    /// # Errors
    /// Returns [`OutOfMemory`] if the Vector couldn't grow to fit all of them. Nothing is
    /// appended in that case.
    pub fn append(&mut self, items: &[T]) -> Result<usize, OutOfMemory>
    where
        T: Copy,
    {
        // SAFETY: items is a valid slice of T, which is Copy and therefore safe to duplicate
        // byte-wise. A shared borrow of items can't alias the mutably borrowed storage.
        unsafe { self.raw.append(items.as_ptr().cast(), items.len()) }
    }

    /// Returns the index of the first element equal to `value`, using the equal operation of the
    /// Vector's descriptor.
    ///
    /// # Examples
    /// ```
    /// # use container_core::collections::contiguous::Vector;
    /// let mut vec = Vector::<u16>::init().unwrap();
    /// vec.append(&[4, 8, 15, 16]).unwrap();
    /// assert_eq!(vec.find(&15), Some(2));
    /// assert_eq!(vec.find(&23), None);
    /// ```
    pub fn find(&self, value: &T) -> Option<usize> {
        // SAFETY: value is a valid T.
        unsafe { self.raw.find(ptr::from_ref(value).cast()) }
    }

    /// Returns a reference to the element at `index`.
    ///
    /// # Panics
    /// Panics if the provided index is out of bounds.
    pub fn get_checked(&self, index: usize) -> &T {
        self.check_index(index);
        &self[index]
    }

    /// Shortens the Vector to `len`, dropping the removed elements. Does nothing if `len` is
    /// not less than the current length.
    pub fn truncate(&mut self, len: usize) {
        self.raw.truncate(len);
    }

    /// Drops every element, leaving the capacity untouched.
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Resizes the Vector to `new_len`, filling new slots with values returned by `f` or dropping
    /// elements beyond `new_len`.
    ///
    /// # Errors
    /// Returns [`OutOfMemory`] if the Vector couldn't grow. Nothing is added in that case.
    pub fn resize_with<F>(&mut self, new_len: usize, mut f: F) -> Result<(), OutOfMemory>
    where
        F: FnMut() -> T,
    {
        if new_len <= self.len() {
            self.truncate(new_len);
            return Ok(());
        }

        self.reserve(new_len - self.len())?;
        while self.len() < new_len {
            self.push(f())?;
        }
        Ok(())
    }

    /// Sets the length of the Vector without initializing or dropping anything, growing first if
    /// `len` exceeds the capacity.
    ///
    /// # Errors
    /// Returns [`OutOfMemory`] if growing was required and failed.
    ///
    /// # Safety
    /// Elements in `old_len..len` must be initialized before they are read or dropped. Elements
    /// in `len..old_len` are forgotten without being dropped.
    pub unsafe fn set_len(&mut self, len: usize) -> Result<(), OutOfMemory> {
        // SAFETY: Upheld by the caller.
        unsafe { self.raw.set_len(len) }
    }

    /// Ensures that the Vector has capacity to hold an additional `extra` elements. After invoking
    /// this method, the capacity will be >= len + extra.
    ///
    /// # Errors
    /// Returns [`OutOfMemory`] if the Vector couldn't grow.
    pub fn reserve(&mut self, extra: usize) -> Result<(), OutOfMemory> {
        self.raw.reserve(extra)
    }

    /// Shrinks the Vector so that its capacity is equal to its length.
    ///
    /// # Errors
    /// Returns [`OutOfMemory`] for stack Vectors and if the reallocation fails.
    pub fn shrink_to_fit(&mut self) -> Result<(), OutOfMemory> {
        self.raw.shrink_to_fit()
    }

    /// Adjusts the capacity of the Vector to `new_cap`, dropping elements if required.
    ///
    /// # Errors
    /// Returns [`OutOfMemory`] for stack Vectors and if the reallocation fails.
    pub fn set_cap(&mut self, new_cap: usize) -> Result<(), OutOfMemory> {
        self.raw.set_cap(new_cap)
    }

    /// Checks that the provided index is within the bounds of self.
    ///
    /// # Panics
    /// Panics if the provided index is out of bounds.
    pub(crate) fn check_index(&self, index: usize) {
        if index >= self.len() {
            Err(IndexOutOfBounds {
                index: index.try_into().unwrap_or(isize::MAX),
                len: self.len(),
            })
            .throw()
        }
    }

    /// # Safety
    /// `len` must be `<= cap`, see [`set_len`](Vector::set_len).
    unsafe fn set_len_unchecked(&mut self, len: usize) {
        debug_assert!(len <= self.cap());
        // SAFETY: len <= cap, so no growth happens and this can't fail.
        let _ = unsafe { self.raw.set_len(len) };
    }
}

impl<T: Element> Deref for Vector<'_, T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        // SAFETY: Vector is valid as a slice for len values, which are all initialized. The pointer
        // is nonnull and properly aligned, even for ZSTs and empty Vectors. The borrow checker
        // enforces that self isn't mutated due to this function taking a &self.
        unsafe { slice::from_raw_parts(self.raw.as_ptr().cast::<T>().as_ptr(), self.len()) }
    }
}

impl<T: Element> DerefMut for Vector<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        // SAFETY: As for deref, with the unique borrow of self guaranteeing exclusive access.
        unsafe { slice::from_raw_parts_mut(self.raw.as_ptr().cast::<T>().as_ptr(), self.len()) }
    }
}

impl<T: Element> AsRef<[T]> for Vector<'_, T> {
    fn as_ref(&self) -> &[T] {
        self.deref()
    }
}

impl<T: Element> AsMut<[T]> for Vector<'_, T> {
    fn as_mut(&mut self) -> &mut [T] {
        self.deref_mut()
    }
}

impl<T: Element> Borrow<[T]> for Vector<'_, T> {
    fn borrow(&self) -> &[T] {
        self.as_ref()
    }
}

impl<T: Element> BorrowMut<[T]> for Vector<'_, T> {
    fn borrow_mut(&mut self) -> &mut [T] {
        self.as_mut()
    }
}

impl<'v, T: Element> IntoIterator for &'v Vector<'_, T> {
    type Item = &'v T;
    type IntoIter = slice::Iter<'v, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'v, T: Element> IntoIterator for &'v mut Vector<'_, T> {
    type Item = &'v mut T;
    type IntoIter = slice::IterMut<'v, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

// SAFETY: Vectors, when used safely rely on unique pointers and are therefore safe for Send when T:
// Send. The shared descriptor is immutable.
unsafe impl<T: Element + Send> Send for Vector<'_, T> {}
// SAFETY: Vector's safe API obeys all rules of the borrow checker, so no interior mutability
// occurs. This means that Vector<T> can safely implement Sync when T: Sync.
unsafe impl<T: Element + Sync> Sync for Vector<'_, T> {}

impl<T: Element + PartialEq> PartialEq for Vector<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        **self == **other
    }
}

impl<T: Element + Eq> Eq for Vector<'_, T> {}

impl<T: Element + Hash> Hash for Vector<'_, T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (**self).hash(state);
    }
}

impl<T: Element + Debug> Debug for Vector<'_, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vector")
            .field("contents", &&**self)
            .field("len", &self.len())
            .field("cap", &self.cap())
            .finish()
    }
}
