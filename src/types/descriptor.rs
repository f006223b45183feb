use std::alloc::Layout;
use std::fmt;
use std::mem::{self, MaybeUninit};
use std::ptr;
use std::slice;

use super::bytewise;
use super::element::{self, Element};

/// Copies the element at `src` into the uninitialized slot at `dst`.
pub type CopyFn = unsafe fn(dst: *mut u8, src: *const u8);
/// Releases everything owned by the element at `elem`, leaving the slot logically uninitialized.
pub type DestroyFn = unsafe fn(elem: *mut u8);
/// Hashes the element at `elem` with the provided seed.
pub type HashFn = unsafe fn(elem: *const u8, seed: u64) -> u64;
/// Returns true if the elements at `a` and `b` are equal.
pub type EqualFn = unsafe fn(a: *const u8, b: *const u8) -> bool;
/// Writes a human readable form of the element at `elem` to `out`.
pub type StringifyFn = unsafe fn(elem: *const u8, out: &mut dyn fmt::Write) -> fmt::Result;

/// The operations a [`TypeDescriptor`] can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Copy,
    Destroy,
    Hash,
    Equal,
    Stringify,
}

/// An operation override, as stored in a [`TypeDescriptor`].
#[derive(Clone, Copy)]
pub enum Operation {
    Copy(CopyFn),
    Destroy(DestroyFn),
    Hash(HashFn),
    Equal(EqualFn),
    Stringify(StringifyFn),
}

impl Operation {
    pub const fn kind(&self) -> OperationKind {
        match self {
            Operation::Copy(_) => OperationKind::Copy,
            Operation::Destroy(_) => OperationKind::Destroy,
            Operation::Hash(_) => OperationKind::Hash,
            Operation::Equal(_) => OperationKind::Equal,
            Operation::Stringify(_) => OperationKind::Stringify,
        }
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Operation").field(&self.kind()).finish()
    }
}

/// Metadata describing one element type: its layout, a set of optional operations and optional
/// canonical default and invalid values.
///
/// A descriptor is built once (usually in a `static` or as [`Element::DESCRIPTOR`]) and never
/// changes afterwards. Containers only ever hold a reference to one, so any number of containers
/// can share the same descriptor.
///
/// Every operation that isn't provided falls back to its byte-wise counterpart in [`bytewise`]:
///
/// | Operation | Default |
/// |-|-|
/// | `copy` | copy `size` bytes |
/// | `destroy` | nothing |
/// | `hash` | MurmurHash3-64 of the raw bytes |
/// | `equal` | byte comparison |
/// | `stringify` | lowercase hex dump |
///
/// # Examples
/// ```
/// # use std::alloc::Layout;
/// # use container_core::types::{OperationKind, TypeDescriptor};
/// static RGB: TypeDescriptor = TypeDescriptor::new("Rgb", Layout::new::<[u8; 3]>());
///
/// assert_eq!(RGB.size(), 3);
/// assert!(!RGB.has_override(OperationKind::Hash));
/// ```
#[derive(Clone, Copy)]
pub struct TypeDescriptor {
    name: &'static str,
    layout: Layout,
    copy: Option<CopyFn>,
    destroy: Option<DestroyFn>,
    hash: Option<HashFn>,
    equal: Option<EqualFn>,
    stringify: Option<StringifyFn>,
    default_value: Option<&'static [u8]>,
    invalid_value: Option<&'static [u8]>,
}

impl TypeDescriptor {
    /// Creates a descriptor without any overrides or canonical values.
    pub const fn new(name: &'static str, layout: Layout) -> TypeDescriptor {
        TypeDescriptor {
            name,
            layout,
            copy: None,
            destroy: None,
            hash: None,
            equal: None,
            stringify: None,
            default_value: None,
            invalid_value: None,
        }
    }

    /// Creates the descriptor for an [`Element`] type. Every operation dispatches to the trait
    /// implementation, and `destroy` runs the type's drop glue if it has any.
    pub const fn of<T: Element>() -> TypeDescriptor {
        let mut descriptor = TypeDescriptor::new(T::NAME, Layout::new::<T>())
            .with_copy(element::copy::<T>)
            .with_hash(element::hash::<T>)
            .with_equal(element::equal::<T>)
            .with_stringify(element::stringify::<T>);

        if mem::needs_drop::<T>() {
            descriptor = descriptor.with_destroy(element::destroy::<T>);
        }
        if let Some(value) = T::DEFAULT_VALUE {
            descriptor = descriptor.with_default_value(value);
        }
        if let Some(value) = T::INVALID_VALUE {
            descriptor = descriptor.with_invalid_value(value);
        }

        descriptor
    }

    pub const fn with_copy(mut self, copy: CopyFn) -> TypeDescriptor {
        self.copy = Some(copy);
        self
    }

    pub const fn with_destroy(mut self, destroy: DestroyFn) -> TypeDescriptor {
        self.destroy = Some(destroy);
        self
    }

    pub const fn with_hash(mut self, hash: HashFn) -> TypeDescriptor {
        self.hash = Some(hash);
        self
    }

    pub const fn with_equal(mut self, equal: EqualFn) -> TypeDescriptor {
        self.equal = Some(equal);
        self
    }

    pub const fn with_stringify(mut self, stringify: StringifyFn) -> TypeDescriptor {
        self.stringify = Some(stringify);
        self
    }

    /// Records `value` as the canonical default instance.
    ///
    /// # Panics
    /// Panics (at compile time, in a const context) if `T` doesn't have the size this descriptor
    /// was created with.
    pub const fn with_default_value<T>(mut self, value: &'static T) -> TypeDescriptor {
        self.default_value = Some(Self::value_bytes(self.layout, value));
        self
    }

    /// Records `value` as the sentinel instance, see [`TypeDescriptor::is_invalid`].
    ///
    /// # Panics
    /// Panics (at compile time, in a const context) if `T` doesn't have the size this descriptor
    /// was created with.
    pub const fn with_invalid_value<T>(mut self, value: &'static T) -> TypeDescriptor {
        self.invalid_value = Some(Self::value_bytes(self.layout, value));
        self
    }

    const fn value_bytes<T>(layout: Layout, value: &'static T) -> &'static [u8] {
        assert!(
            mem::size_of::<T>() == layout.size(),
            "canonical value doesn't match the described layout"
        );
        // SAFETY: value is a live reference to size_of::<T>() bytes that lives forever.
        unsafe { slice::from_raw_parts(ptr::from_ref(value).cast::<u8>(), mem::size_of::<T>()) }
    }

    /// Applies vector-local overrides, returning a new descriptor. `self` is left untouched.
    pub const fn overridden(&self, overrides: &Overrides) -> TypeDescriptor {
        let mut descriptor = *self;
        if let Some(copy) = overrides.copy {
            descriptor.copy = Some(copy);
        }
        if let Some(equal) = overrides.equal {
            descriptor.equal = Some(equal);
        }
        if let Some(destroy) = overrides.destroy {
            descriptor.destroy = Some(destroy);
        }
        if let Some(stringify) = overrides.stringify {
            descriptor.stringify = Some(stringify);
        }
        descriptor
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub const fn layout(&self) -> Layout {
        self.layout
    }

    pub const fn size(&self) -> usize {
        self.layout.size()
    }

    pub const fn align(&self) -> usize {
        self.layout.align()
    }

    /// The distance in bytes between two consecutive elements in a container.
    pub fn stride(&self) -> usize {
        self.layout.pad_to_align().size()
    }

    pub const fn default_value(&self) -> Option<&'static [u8]> {
        self.default_value
    }

    pub const fn invalid_value(&self) -> Option<&'static [u8]> {
        self.invalid_value
    }

    /// Returns the override for `kind`, or `None` if the byte-wise default is used.
    pub const fn operation(&self, kind: OperationKind) -> Option<Operation> {
        match kind {
            OperationKind::Copy => match self.copy {
                Some(copy) => Some(Operation::Copy(copy)),
                None => None,
            },
            OperationKind::Destroy => match self.destroy {
                Some(destroy) => Some(Operation::Destroy(destroy)),
                None => None,
            },
            OperationKind::Hash => match self.hash {
                Some(hash) => Some(Operation::Hash(hash)),
                None => None,
            },
            OperationKind::Equal => match self.equal {
                Some(equal) => Some(Operation::Equal(equal)),
                None => None,
            },
            OperationKind::Stringify => match self.stringify {
                Some(stringify) => Some(Operation::Stringify(stringify)),
                None => None,
            },
        }
    }

    pub const fn has_override(&self, kind: OperationKind) -> bool {
        self.operation(kind).is_some()
    }

    /// Copies the element at `src` into `dst`.
    ///
    /// # Safety
    /// `src` must point to a valid element of the described type and `dst` must be valid for
    /// writes of one element. If the copy operation is overridden, both must also be properly
    /// aligned.
    pub unsafe fn copy(&self, dst: *mut u8, src: *const u8) {
        match self.copy {
            // SAFETY: Upheld by the caller.
            Some(copy) => unsafe { copy(dst, src) },
            // SAFETY: Both pointers are valid for size bytes. Distinct elements never overlap.
            None => unsafe {
                let dst = slice::from_raw_parts_mut(dst.cast::<MaybeUninit<u8>>(), self.size());
                bytewise::copy(dst, self.bytes(src));
            },
        }
    }

    /// Destroys the element at `elem`, after which the slot must be treated as uninitialized.
    ///
    /// # Safety
    /// `elem` must point to a valid, properly aligned element of the described type that isn't
    /// used again.
    pub unsafe fn destroy(&self, elem: *mut u8) {
        if let Some(destroy) = self.destroy {
            // SAFETY: Upheld by the caller.
            unsafe { destroy(elem) }
        }
    }

    /// # Safety
    /// `elem` must point to a valid, properly aligned element of the described type. Without a
    /// hash override, the element must not contain uninitialized bytes.
    pub unsafe fn hash(&self, elem: *const u8, seed: u64) -> u64 {
        match self.hash {
            // SAFETY: Upheld by the caller.
            Some(hash) => unsafe { hash(elem, seed) },
            // SAFETY: Upheld by the caller.
            None => bytewise::hash(unsafe { self.bytes(elem) }, seed),
        }
    }

    /// # Safety
    /// Both pointers must point to valid, properly aligned elements of the described type.
    /// Without an equal override, the elements must not contain uninitialized bytes.
    pub unsafe fn equal(&self, a: *const u8, b: *const u8) -> bool {
        match self.equal {
            // SAFETY: Upheld by the caller.
            Some(equal) => unsafe { equal(a, b) },
            // SAFETY: Upheld by the caller.
            None => unsafe { bytewise::equal(self.bytes(a), self.bytes(b)) },
        }
    }

    /// # Safety
    /// `elem` must point to a valid, properly aligned element of the described type. Without a
    /// stringify override, the element must not contain uninitialized bytes.
    pub unsafe fn stringify(&self, elem: *const u8, out: &mut dyn fmt::Write) -> fmt::Result {
        match self.stringify {
            // SAFETY: Upheld by the caller.
            Some(stringify) => unsafe { stringify(elem, out) },
            // SAFETY: Upheld by the caller.
            None => bytewise::stringify(unsafe { self.bytes(elem) }, out),
        }
    }

    /// Returns true if the element at `elem` equals the invalid sentinel. Always false for a
    /// descriptor without one.
    ///
    /// # Safety
    /// Same as [`TypeDescriptor::equal`].
    pub unsafe fn is_invalid(&self, elem: *const u8) -> bool {
        match self.invalid_value {
            // SAFETY: The sentinel is a valid, aligned element recorded from a &'static T.
            Some(invalid) => unsafe { self.equal(elem, invalid.as_ptr()) },
            None => false,
        }
    }

    /// # Safety
    /// `elem` must be valid for reads of `size` initialized bytes for the lifetime `'e`.
    unsafe fn bytes<'e>(&self, elem: *const u8) -> &'e [u8] {
        // SAFETY: Upheld by the caller.
        unsafe { slice::from_raw_parts(elem, self.size()) }
    }
}

/// Operations replaced for a single container only. The shared [`TypeDescriptor`] is never
/// modified.
#[derive(Default, Clone, Copy)]
pub struct Overrides {
    pub copy: Option<CopyFn>,
    pub equal: Option<EqualFn>,
    pub destroy: Option<DestroyFn>,
    pub stringify: Option<StringifyFn>,
}

impl Overrides {
    pub const NONE: Overrides = Overrides {
        copy: None,
        equal: None,
        destroy: None,
        stringify: None,
    };

    pub const fn with_copy(mut self, copy: CopyFn) -> Overrides {
        self.copy = Some(copy);
        self
    }

    pub const fn with_equal(mut self, equal: EqualFn) -> Overrides {
        self.equal = Some(equal);
        self
    }

    pub const fn with_destroy(mut self, destroy: DestroyFn) -> Overrides {
        self.destroy = Some(destroy);
        self
    }

    pub const fn with_stringify(mut self, stringify: StringifyFn) -> Overrides {
        self.stringify = Some(stringify);
        self
    }
}

const ALL_KINDS: [OperationKind; 5] = [
    OperationKind::Copy,
    OperationKind::Destroy,
    OperationKind::Hash,
    OperationKind::Equal,
    OperationKind::Stringify,
];

struct OverrideList<'a>(&'a TypeDescriptor);

impl fmt::Debug for OverrideList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(ALL_KINDS.iter().filter(|kind| self.0.has_override(**kind)))
            .finish()
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("size", &self.size())
            .field("align", &self.align())
            .field("overrides", &OverrideList(self))
            .field("has_default", &self.default_value.is_some())
            .field("has_invalid", &self.invalid_value.is_some())
            .finish()
    }
}

impl fmt::Debug for Overrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Overrides")
            .field("copy", &self.copy.is_some())
            .field("equal", &self.equal.is_some())
            .field("destroy", &self.destroy.is_some())
            .field("stringify", &self.stringify.is_some())
            .finish()
    }
}
