use std::fmt;
use std::mem;
use std::ptr;
use std::slice;

use super::bytewise;
use super::descriptor::TypeDescriptor;

/// A type that can be stored in the type-erased containers, providing the operations of its
/// [`TypeDescriptor`].
///
/// Every method has a byte-wise default, so plain data types only need a name:
/// ```
/// # use container_core::types::Element;
/// #[derive(Clone, Copy)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// // SAFETY: Point is Copy and has no padding.
/// unsafe impl Element for Point {
///     const NAME: &'static str = "Point";
/// }
///
/// let a = Point { x: 1, y: 2 };
/// assert!(a.element_eq(&Point { x: 1, y: 2 }));
/// assert_eq!(Point::DESCRIPTOR.size(), 8);
/// ```
///
/// Destruction is the type's own [`Drop`] implementation. [`TypeDescriptor::of`] only records a
/// destroy operation for types that need dropping.
///
/// # Safety
/// The provided methods treat `Self` as a plain sequence of bytes. An implementation that keeps
/// one of them must guarantee:
/// - [`duplicate`](Element::duplicate): a bitwise copy of a value is a valid, independent value,
///   meaning that `Self` doesn't own anything that would be released twice.
/// - [`element_hash`](Element::element_hash), [`element_eq`](Element::element_eq) and
///   [`stringify`](Element::stringify): `Self` contains no padding or otherwise uninitialized
///   bytes.
///
/// Overriding a method lifts its requirement.
pub unsafe trait Element: Sized + 'static {
    const NAME: &'static str;

    /// The canonical default instance, if the type has a meaningful one.
    const DEFAULT_VALUE: Option<&'static Self> = None;

    /// A sentinel instance that never represents real data.
    const INVALID_VALUE: Option<&'static Self> = None;

    /// The descriptor shared by every container of this type.
    const DESCRIPTOR: TypeDescriptor = TypeDescriptor::of::<Self>();

    fn duplicate(&self) -> Self {
        // SAFETY: The implementor guarantees that a bitwise copy is an independent value.
        unsafe { ptr::read(self) }
    }

    fn element_hash(&self, seed: u64) -> u64 {
        bytewise::hash(bytes_of(self), seed)
    }

    fn element_eq(&self, other: &Self) -> bool {
        bytewise::equal(bytes_of(self), bytes_of(other))
    }

    fn stringify(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        bytewise::stringify(bytes_of(self), out)
    }
}

/// Returns the shared descriptor for `T`.
pub fn descriptor_of<T: Element>() -> &'static TypeDescriptor {
    &T::DESCRIPTOR
}

/// Views a value as its raw bytes. Only sound for types without padding, which every caller gets
/// from the [`Element`] safety contract.
fn bytes_of<T>(value: &T) -> &[u8] {
    // SAFETY: The reference is valid for size_of::<T>() bytes for its whole lifetime, and Element
    // implementors relying on byte-wise defaults guarantee that all of them are initialized.
    unsafe { slice::from_raw_parts(ptr::from_ref(value).cast::<u8>(), mem::size_of::<T>()) }
}

// The functions below adapt the trait to the raw signatures stored in a TypeDescriptor. Each has
// the safety requirements of the matching TypeDescriptor method, with T as the described type.

pub(crate) unsafe fn copy<T: Element>(dst: *mut u8, src: *const u8) {
    // SAFETY: src points to a valid T and dst is valid for an aligned write of one T.
    unsafe { dst.cast::<T>().write((*src.cast::<T>()).duplicate()) }
}

pub(crate) unsafe fn destroy<T: Element>(elem: *mut u8) {
    // SAFETY: elem points to a valid T which is never used again.
    unsafe { ptr::drop_in_place(elem.cast::<T>()) }
}

pub(crate) unsafe fn hash<T: Element>(elem: *const u8, seed: u64) -> u64 {
    // SAFETY: elem points to a valid T.
    unsafe { (*elem.cast::<T>()).element_hash(seed) }
}

pub(crate) unsafe fn equal<T: Element>(a: *const u8, b: *const u8) -> bool {
    // SAFETY: Both pointers point to valid values of T.
    unsafe { (*a.cast::<T>()).element_eq(&*b.cast::<T>()) }
}

pub(crate) unsafe fn stringify<T: Element>(elem: *const u8, out: &mut dyn fmt::Write) -> fmt::Result {
    // SAFETY: elem points to a valid T.
    unsafe { (*elem.cast::<T>()).stringify(out) }
}

macro_rules! impl_element {
    ($($ty:ty = $default:expr),* $(,)?) => {
        $(
            // SAFETY: Primitive types are Copy and have no padding.
            unsafe impl Element for $ty {
                const NAME: &'static str = stringify!($ty);
                const DEFAULT_VALUE: Option<&'static Self> = Some(&$default);
            }
        )*
    };
}

impl_element! {
    u8 = 0, u16 = 0, u32 = 0, u64 = 0, u128 = 0, usize = 0,
    i8 = 0, i16 = 0, i32 = 0, i64 = 0, i128 = 0, isize = 0,
    f32 = 0.0, f64 = 0.0,
    bool = false,
    char = '\0',
}
