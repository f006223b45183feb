//! Property-based tests for the contiguous containers and byte strings.
#![cfg(all(feature = "string", feature = "vector"))]

use std::mem::MaybeUninit;

use container_core::collections::contiguous::{AllocationKind, INIT_CAP, MIN_CAP, Vector, grown_cap};
use container_core::collections::string::ByteString;
use container_core::error::OutOfMemory;
use proptest::prelude::*;

/// Short words over a tiny alphabet, so that queries actually occur in the generated strings.
fn word_strategy(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(prop::sample::select(&b"abc"[..]), 0..=max_len)
}

proptest! {
    #[test]
    fn prop_grown_cap_always_grows(cap in 0usize..(usize::MAX / 2)) {
        let grown = grown_cap(cap).expect("Growing a small capacity can't overflow.");
        prop_assert!(grown > cap);
        prop_assert!(grown >= MIN_CAP);
        prop_assert!(grown <= cap + cap / 2 + 1 || grown == MIN_CAP);
    }

    #[test]
    fn prop_vector_preserves_contents(elements in prop::collection::vec(any::<u32>(), 0..500)) {
        let mut vec = Vector::<u32>::init().expect("Allocating a small Vector shouldn't fail.");
        prop_assert_eq!(vec.cap(), INIT_CAP);

        for (i, &elem) in elements.iter().enumerate() {
            let old_cap = vec.cap();
            prop_assert_eq!(vec.push(elem), Ok(i));
            prop_assert_eq!(vec.len(), i + 1);
            prop_assert!(vec.len() <= vec.cap());
            if old_cap != vec.cap() {
                prop_assert_eq!(Ok(vec.cap()), grown_cap(old_cap), "Pushes grow one step at a time.");
            }
        }

        prop_assert_eq!(&*vec, &elements[..]);
        prop_assert_eq!(vec.kind(), AllocationKind::Heap);
    }

    #[test]
    fn prop_vector_push_pop_symmetry(elements in prop::collection::vec(any::<u64>(), 0..200)) {
        let mut vec = Vector::<u64>::with_cap(0).expect("An empty Vector doesn't allocate.");
        for &elem in &elements {
            vec.push(elem).expect("Heap Vectors grow.");
        }

        for &expected in elements.iter().rev() {
            prop_assert_eq!(vec.pop(), Some(expected));
        }
        prop_assert_eq!(vec.pop(), None);
        prop_assert!(vec.is_empty());
    }

    #[test]
    fn prop_fixed_vector_never_grows(cap in 0usize..16, pushes in 0usize..32) {
        let mut storage = [MaybeUninit::<u16>::uninit(); 16];
        let mut vec = Vector::init_fixed(&mut storage[..cap]);

        for i in 0..pushes {
            let result = vec.push(i as u16);
            if i < cap {
                prop_assert_eq!(result, Ok(i));
            } else {
                prop_assert_eq!(result, Err(OutOfMemory));
            }
            prop_assert_eq!(vec.cap(), cap);
        }

        prop_assert_eq!(vec.len(), pushes.min(cap));
        prop_assert_eq!(vec.reserve(cap + 1), Err(OutOfMemory));
        prop_assert_eq!(vec.kind(), AllocationKind::Stack);
    }

    #[test]
    fn prop_byte_string_stays_terminated(
        parts in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..40), 0..20)
    ) {
        let mut string = ByteString::with_cap(0).expect("Allocating one byte shouldn't fail.");
        let mut expected = Vec::new();

        for part in &parts {
            string.push_bytes(part).expect("Heap strings grow.");
            expected.extend_from_slice(part);

            prop_assert_eq!(string.as_bytes(), &expected[..]);
            prop_assert_eq!(string.as_bytes_with_nul().last(), Some(&0));
            prop_assert!(string.len() <= string.cap());
        }
    }

    #[test]
    fn prop_find_all_views_resolve(haystack in word_strategy(64), query in word_strategy(3)) {
        let string = ByteString::from_bytes(&haystack).expect("Allocating a small string shouldn't fail.");
        let count = string.find_all(&query, None);

        let mut views = vec![string.view(); count];
        prop_assert_eq!(string.find_all(&query, Some(&mut views)), count);

        let mut next = 0;
        for view in views {
            prop_assert!(view.offset() >= next, "Matches shouldn't overlap.");
            prop_assert_eq!(string.resolve(view), Ok(&query[..]));
            next = view.end();
        }

        if query.is_empty() {
            prop_assert_eq!(count, 0);
        } else {
            prop_assert_eq!(string.find_first(&query).is_some(), count > 0);
        }
    }

    #[test]
    fn prop_replace_first_splices(haystack in word_strategy(32), query in word_strategy(2)) {
        let string = ByteString::from_bytes(&haystack).expect("Allocating a small string shouldn't fail.");
        let replaced = string.replace_first(&query, b"XY").expect("Allocating the result shouldn't fail.");

        match string.find_first(&query) {
            Some(found) => {
                let mut expected = haystack[..found.offset()].to_vec();
                expected.extend_from_slice(b"XY");
                expected.extend_from_slice(&haystack[found.end()..]);
                prop_assert_eq!(&*replaced, &expected[..]);
                prop_assert_eq!(replaced.cap(), replaced.len());
            }
            None => prop_assert_eq!(replaced, string),
        }
    }
}
