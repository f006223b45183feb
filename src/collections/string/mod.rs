//! A module containing [`ByteString`], its non-owning [`View`]s and the [`bformat!`](crate::bformat)
//! macro.
//!
//! [`Matches`] iterates over the occurrences of a query in a ByteString, yielding Views.

mod byte_string;
mod fmt;
mod search;
mod view;

pub use byte_string::*;
pub use search::*;
pub use view::*;
