#![cfg(test)]

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::hash;
use crate::types::Element;

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ZeroSizedType;

// SAFETY: A ZST has no bytes, padding or otherwise.
unsafe impl Element for ZeroSizedType {
    const NAME: &'static str = "ZeroSizedType";
}

/// Counts how many times any of its clones have been dropped.
#[derive(Debug, Clone)]
pub struct CountedDrop(pub Rc<Cell<usize>>);

impl CountedDrop {
    pub fn new(value: usize) -> CountedDrop {
        CountedDrop(Rc::new(Cell::new(value)))
    }

    pub fn count(&self) -> usize {
        self.0.get()
    }
}

impl Drop for CountedDrop {
    fn drop(&mut self) {
        self.0.set(self.0.get() + 1);
    }
}

// SAFETY: Every byte-wise default is overridden, so the Rc is never duplicated or inspected as raw
// bytes.
unsafe impl Element for CountedDrop {
    const NAME: &'static str = "CountedDrop";

    fn duplicate(&self) -> Self {
        self.clone()
    }

    fn element_hash(&self, seed: u64) -> u64 {
        hash::murmur3_64(&(Rc::as_ptr(&self.0) as usize).to_ne_bytes(), seed)
    }

    fn element_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    fn stringify(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        write!(out, "CountedDrop({})", self.count())
    }
}
