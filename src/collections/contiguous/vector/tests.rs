#![cfg(test)]

use std::mem::MaybeUninit;

use super::*;
use crate::collections::contiguous::{AllocationKind, INIT_CAP};
use crate::types::{Element, Overrides};
use crate::util::alloc::{CountedDrop, ZeroSizedType};
use crate::util::error::OutOfMemory;
use crate::util::panic::assert_panics;

fn from_slice<T: Element + Copy>(items: &[T]) -> Vector<'static, T> {
    let mut vec = Vector::init().expect("Allocating a small Vector shouldn't fail.");
    vec.append(items).expect("Heap Vectors should grow.");
    vec
}

unsafe fn equal_ignoring_case(a: *const u8, b: *const u8) -> bool {
    // SAFETY: Only used on Vectors of u8.
    unsafe { a.read().eq_ignore_ascii_case(&b.read()) }
}

#[test]
fn test_push_pop() {
    let mut vec = Vector::<u64>::with_cap(0).expect("An empty Vector doesn't allocate.");

    for i in 0..100 {
        assert_eq!(vec.push(i), Ok(i as usize));
    }
    assert_eq!(vec.len(), 100);
    assert!(vec.iter().copied().eq(0..100), "Elements should stay in push order.");

    for i in (0..100).rev() {
        assert_eq!(vec.pop(), Some(i));
    }
    assert_eq!(vec.pop(), None);
    assert!(vec.is_empty());
}

#[test]
fn test_growth() {
    let mut vec = Vector::<u8>::init().expect("Allocating a small Vector shouldn't fail.");
    assert_eq!(vec.cap(), INIT_CAP);

    vec.resize_with(INIT_CAP, || 0).expect("There should already be room.");
    assert_eq!(vec.cap(), INIT_CAP, "Filling to capacity shouldn't grow.");

    vec.push(1).expect("Heap Vectors should grow.");
    assert_eq!(vec.cap(), 48, "Capacity should grow by half.");

    vec.reserve(100).expect("Heap Vectors should grow.");
    assert!(vec.cap() >= 133);
    assert_eq!(vec.cap(), 162, "Reserving should step through the growth factor.");
}

#[test]
fn test_fixed() {
    let mut storage = [MaybeUninit::<u16>::uninit(); 3];
    let mut vec = Vector::init_fixed(&mut storage);
    assert_eq!(vec.kind(), AllocationKind::Stack);
    assert_eq!(vec.cap(), 3);

    vec.append(&[1, 2]).expect("There should be room for two elements.");
    assert_eq!(vec.append(&[3, 4]), Err(OutOfMemory), "Appends should fit entirely or not at all.");
    assert_eq!(vec.push(3), Ok(2));
    assert_eq!(vec.push(4), Err(OutOfMemory));
    assert_eq!(vec.set_cap(10), Err(OutOfMemory));
    assert_eq!(vec.reserve(1), Err(OutOfMemory));
    assert_eq!(&*vec, &[1, 2, 3], "Failed operations shouldn't change anything.");
    assert_eq!(vec.cap(), 3);

    assert_eq!(vec.pop(), Some(3));
    assert_eq!(vec.push(5), Ok(2), "Popping should make room again.");
}

#[test]
fn test_fixed_drops_elements() {
    let counter = CountedDrop::new(0);
    let mut storage: [MaybeUninit<CountedDrop>; 4] = [const { MaybeUninit::uninit() }; 4];

    {
        let mut vec = Vector::init_fixed(&mut storage);
        for _ in 0..4 {
            vec.push(counter.clone()).expect("There should be room for four elements.");
        }
        assert_eq!(vec.push(counter.clone()), Err(OutOfMemory));
        assert_eq!(counter.count(), 1, "The rejected value should be dropped.");
    }

    assert_eq!(counter.count(), 5, "Dropping a stack Vector should drop its elements.");
}

#[test]
fn test_drop_counts() {
    let counter = CountedDrop::new(0);
    let mut vec = Vector::init().expect("Allocating a small Vector shouldn't fail.");

    for _ in 0..10 {
        vec.push(counter.clone()).expect("Heap Vectors should grow.");
    }
    assert_eq!(counter.count(), 0, "Growing shouldn't drop anything.");

    drop(vec.pop());
    assert_eq!(counter.count(), 1);

    vec.truncate(5);
    assert_eq!(counter.count(), 5);

    vec.set_cap(3).expect("Shrinking a heap Vector shouldn't fail.");
    assert_eq!(counter.count(), 7, "Elements beyond the new capacity should be dropped.");
    assert_eq!(vec.len(), 3);

    vec.clear();
    assert_eq!(counter.count(), 10);
    drop(vec);
    assert_eq!(counter.count(), 10, "Nothing should be dropped twice.");
}

#[test]
fn test_find() {
    let vec = from_slice(b"Hello");
    assert_eq!(vec.find(&b'l'), Some(2));
    assert_eq!(vec.find(&b'h'), None);

    // SAFETY: equal_ignoring_case is sound for u8 values.
    let mut vec = unsafe { Vector::<u8>::init_with(Overrides::NONE.with_equal(equal_ignoring_case)) }
        .expect("Allocating a small Vector shouldn't fail.");
    vec.append(b"Hello").expect("Heap Vectors should grow.");
    assert_eq!(vec.find(&b'h'), Some(0), "find should use the local equal override.");
    assert_eq!(vec.find(&b'L'), Some(2));
}

#[test]
fn test_set_len() {
    let mut vec = from_slice(&[1_u32, 2, 3]);

    // SAFETY: The new slots are written before being read.
    unsafe {
        vec.set_len(5).expect("Heap Vectors should grow.");
    }
    vec[3] = 4;
    vec[4] = 5;
    assert_eq!(&*vec, &[1, 2, 3, 4, 5]);

    // SAFETY: u32 doesn't need dropping.
    unsafe { vec.set_len(1) }.expect("Shrinking can't fail.");
    assert_eq!(&*vec, &[1]);
}

#[test]
fn test_resize_with() {
    let mut vec = from_slice(&['a', 'b']);
    vec.resize_with(4, || 'z').expect("Heap Vectors should grow.");
    assert_eq!(&*vec, &['a', 'b', 'z', 'z']);

    vec.resize_with(1, || unreachable!()).expect("Shrinking can't fail.");
    assert_eq!(&*vec, &['a']);
}

#[test]
fn test_check_index() {
    let vec = from_slice(&[1_i8, 2, 3]);
    assert_eq!(*vec.get_checked(2), 3);
    assert_panics!({
        vec.get_checked(3);
    });
}

#[test]
fn test_zst_support() {
    let mut vec = Vector::<ZeroSizedType>::init().expect("ZSTs don't allocate.");
    for _ in 0..1000 {
        vec.push(ZeroSizedType).expect("ZSTs don't allocate.");
    }
    assert_eq!(vec.len(), 1000);
    assert_eq!(vec.iter().count(), 1000);
    assert_eq!(vec.pop(), Some(ZeroSizedType));
}

#[test]
fn test_traits() {
    let a = from_slice(&[1_u8, 2, 3]);
    let mut b = from_slice(&[1_u8, 2]);
    assert_ne!(a, b);
    b.push(3).expect("Heap Vectors should grow.");
    assert_eq!(a, b);

    for value in &mut b {
        *value *= 2;
    }
    assert_eq!(&*b, &[2, 4, 6]);
    assert_eq!((&b).into_iter().sum::<u8>(), 12);

    assert_eq!(format!("{a:?}"), "Vector { contents: [1, 2, 3], len: 3, cap: 32 }");
}

#[test]
fn test_raw_access() {
    let vec = from_slice(&[10_u32, 20]);
    let raw = vec.as_raw();
    assert_eq!(raw.len(), 2);
    assert_eq!(raw.descriptor().name(), "u32");
    // SAFETY: The RawVector holds u32 values.
    assert_eq!(raw.get(1).map(|elem| unsafe { elem.cast::<u32>().read() }), Some(20));
}
