use std::error::Error;
use std::fmt::{self, Display, Formatter};

use derive_more::{Display, Error, From, IsVariant, TryInto};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexOutOfBounds {
    pub index: isize,
    pub len: usize,
}

impl Display for IndexOutOfBounds {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Index {} out of bounds for collection with {} elements!", self.index, self.len)
    }
}

impl Error for IndexOutOfBounds {}

/// Returned whenever a container can't get the memory it needs: the allocator failed, the
/// requested layout overflowed or a fixed-capacity container is full. The container is always
/// left as it was before the failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfMemory;

impl Display for OutOfMemory {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Out of memory!")
    }
}

impl Error for OutOfMemory {}

/// A [`View`](crate::collections::string::View) was resolved against a string that has been
/// modified since the view was created, or against a different string entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaleView;

impl Display for StaleView {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "View refers to a string that has since been modified!")
    }
}

impl Error for StaleView {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error, From, TryInto, IsVariant)]
pub enum StaleOrOutOfMemory {
    StaleView(StaleView),
    OutOfMemory(OutOfMemory),
}
