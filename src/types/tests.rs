#![cfg(test)]

use std::alloc::Layout;
use std::fmt::{self, Write};
use std::mem::MaybeUninit;
use std::ptr;

use super::*;
use crate::hash;
use crate::util::alloc::CountedDrop;
use crate::util::panic::assert_panics;

static RAW_U32: TypeDescriptor = TypeDescriptor::new("u32", Layout::new::<u32>());

#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C)]
struct Person {
    age: u32,
    height_cm: u32,
}

// SAFETY: Person is Copy and, being two u32s under repr(C), has no padding.
unsafe impl Element for Person {
    const NAME: &'static str = "Person";
    const DEFAULT_VALUE: Option<&'static Self> = Some(&Person { age: 9999, height_cm: 180 });
    const INVALID_VALUE: Option<&'static Self> = Some(&Person { age: u32::MAX, height_cm: 0 });

    fn stringify(&self, out: &mut dyn Write) -> fmt::Result {
        write!(out, "age: {}, height: {}cm", self.age, self.height_cm)
    }
}

unsafe fn ignore_height(a: *const u8, b: *const u8) -> bool {
    // SAFETY: Only ever called on valid Person values.
    unsafe { (*a.cast::<Person>()).age == (*b.cast::<Person>()).age }
}

fn stringify_with(descriptor: &TypeDescriptor, elem: *const u8) -> String {
    let mut out = String::new();
    // SAFETY: Callers pass pointers to valid elements of the described type.
    unsafe { descriptor.stringify(elem, &mut out) }.expect("Writing to a String can't fail.");
    out
}

#[test]
fn test_default_dispatch() {
    let value = 0xdead_beef_u32;
    let other = 0xdead_beee_u32;
    let value_ptr = ptr::from_ref(&value).cast::<u8>();
    let other_ptr = ptr::from_ref(&other).cast::<u8>();

    for kind in [
        OperationKind::Copy,
        OperationKind::Destroy,
        OperationKind::Hash,
        OperationKind::Equal,
        OperationKind::Stringify,
    ] {
        assert!(
            RAW_U32.operation(kind).is_none(),
            "A descriptor built with new shouldn't have any overrides."
        );
    }

    // SAFETY: Both pointers refer to live u32 values.
    unsafe {
        assert_eq!(
            RAW_U32.hash(value_ptr, 7),
            hash::murmur3_64(&value.to_ne_bytes(), 7),
            "The default hash should be murmur3 over the raw bytes."
        );
        assert!(RAW_U32.equal(value_ptr, value_ptr));
        assert!(
            !RAW_U32.equal(value_ptr, other_ptr),
            "The default equality should compare bytes."
        );
        assert!(!RAW_U32.is_invalid(value_ptr), "No sentinel means nothing is invalid.");
    }

    let mut copy = MaybeUninit::<u32>::uninit();
    // SAFETY: copy is valid for a write of one u32 and value_ptr is a live u32.
    unsafe { RAW_U32.copy(copy.as_mut_ptr().cast(), value_ptr) };
    // SAFETY: The byte-wise copy initialized all four bytes.
    assert_eq!(unsafe { copy.assume_init() }, value);

    assert_eq!(
        stringify_with(&RAW_U32, ptr::from_ref(&0x0a0b_0c0d_u32.to_be()).cast()),
        "0a0b0c0d",
        "The default stringify should be a lowercase hex dump in memory order."
    );
}

#[test]
fn test_element_descriptor() {
    let descriptor = descriptor_of::<u32>();
    assert_eq!(descriptor.name(), "u32");
    assert_eq!(descriptor.layout(), Layout::new::<u32>());
    assert!(descriptor.has_override(OperationKind::Hash));
    assert!(
        !descriptor.has_override(OperationKind::Destroy),
        "Types without drop glue shouldn't get a destroy operation."
    );
    assert_eq!(descriptor.default_value(), Some(&[0_u8; 4][..]));

    let value = 123_456_u32;
    let value_ptr = ptr::from_ref(&value).cast::<u8>();
    // SAFETY: value_ptr refers to a live u32.
    unsafe {
        assert_eq!(
            descriptor.hash(value_ptr, 3),
            RAW_U32.hash(value_ptr, 3),
            "Element defaults should match the byte-wise defaults."
        );
    }
    assert_eq!(stringify_with(descriptor, value_ptr), stringify_with(&RAW_U32, value_ptr));

    assert!(
        descriptor_of::<CountedDrop>().has_override(OperationKind::Destroy),
        "Types with drop glue should be destroyed through it."
    );
}

#[test]
fn test_custom_element() {
    let descriptor = descriptor_of::<Person>();
    let sisyphus = Person { age: 9999, height_cm: 180 };

    assert_eq!(
        stringify_with(descriptor, ptr::from_ref(&sisyphus).cast()),
        "age: 9999, height: 180cm"
    );
    assert_eq!(
        descriptor.default_value().map(<[u8]>::len),
        Some(8),
        "The default value should be recorded as raw bytes."
    );

    let invalid = Person { age: u32::MAX, height_cm: 0 };
    // SAFETY: Both pointers refer to live Person values.
    unsafe {
        assert!(descriptor.is_invalid(ptr::from_ref(&invalid).cast()));
        assert!(!descriptor.is_invalid(ptr::from_ref(&sisyphus).cast()));
    }
}

#[test]
fn test_overrides_are_local() {
    let shared = descriptor_of::<Person>();
    let local = shared.overridden(&Overrides::NONE.with_equal(ignore_height));

    let a = Person { age: 30, height_cm: 170 };
    let b = Person { age: 30, height_cm: 190 };
    let a_ptr = ptr::from_ref(&a).cast::<u8>();
    let b_ptr = ptr::from_ref(&b).cast::<u8>();

    // SAFETY: Both pointers refer to live Person values.
    unsafe {
        assert!(local.equal(a_ptr, b_ptr), "The override should be used.");
        assert!(
            !shared.equal(a_ptr, b_ptr),
            "The shared descriptor shouldn't be affected by an override."
        );
    }
    assert_eq!(local.name(), shared.name());
}

#[test]
fn test_destroy_and_copy() {
    let counter = CountedDrop::new(0);
    let descriptor = descriptor_of::<CountedDrop>();

    let mut slot = MaybeUninit::<CountedDrop>::uninit();
    // SAFETY: counter is a live CountedDrop and slot is valid for one aligned write.
    unsafe { descriptor.copy(slot.as_mut_ptr().cast(), ptr::from_ref(&counter).cast()) };
    assert_eq!(counter.count(), 0, "Copying shouldn't drop anything.");

    // SAFETY: slot was initialized by the copy above and isn't used afterwards.
    unsafe { descriptor.destroy(slot.as_mut_ptr().cast()) };
    assert_eq!(counter.count(), 1, "Destroying the copy should drop it exactly once.");
}

#[test]
fn test_bytewise() {
    let mut out = String::new();
    bytewise::stringify(&[], &mut out).expect("Writing to a String can't fail.");
    assert_eq!(out, "");

    bytewise::stringify(&[0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef], &mut out)
        .expect("Writing to a String can't fail.");
    assert_eq!(out, "0123456789abcdef");

    let mut uninit = [MaybeUninit::<u8>::uninit(); 3];
    bytewise::copy(&mut uninit, &[1, 2, 3]);
    // SAFETY: Every byte was just written.
    let dst = uninit.map(|byte| unsafe { byte.assume_init() });
    assert_eq!(dst, [1, 2, 3]);

    assert_panics!({
        bytewise::copy(&mut [MaybeUninit::uninit(); 2], &[1, 2, 3]);
    });
    assert!(bytewise::equal(&dst, &[1, 2, 3]));
    assert_eq!(bytewise::hash(&dst, 5), hash::murmur3_64(&[1, 2, 3], 5));
}
