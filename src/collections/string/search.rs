use std::iter::FusedIterator;

use super::byte_string::ByteString;
use super::view::View;
use crate::util::error::OutOfMemory;

impl ByteString {
    /// Returns a [`View`] of the first occurrence of `query`, or [`None`] if it doesn't occur or
    /// is empty.
    ///
    /// # Examples
    /// ```
    /// # use container_core::collections::string::ByteString;
    /// let string = ByteString::literal(c"aaab");
    /// let found = string.find_first("aab").unwrap();
    /// assert_eq!(found.offset(), 1);
    /// assert_eq!(string.resolve(found).unwrap(), b"aab");
    /// ```
    pub fn find_first(&self, query: impl AsRef<[u8]>) -> Option<View> {
        self.matches(query.as_ref()).next()
    }

    /// Returns an iterator over [`View`]s of every non-overlapping occurrence of `query`, from
    /// left to right. After each match, searching resumes right after it.
    pub fn matches<'s, 'q>(&'s self, query: &'q [u8]) -> Matches<'s, 'q> {
        Matches {
            string: self,
            query,
            next: 0,
        }
    }

    /// Counts the non-overlapping occurrences of `query`, writing a [`View`] of each into `out`
    /// while there is room. Passing [`None`] only counts them.
    ///
    /// # Examples
    /// ```
    /// # use container_core::collections::string::{ByteString, View};
    /// let string = ByteString::literal(c"one two one two one");
    /// assert_eq!(string.find_all("one", None), 3);
    ///
    /// let mut found = [string.view(); 2];
    /// assert_eq!(string.find_all("one", Some(&mut found)), 3);
    /// assert_eq!(found.map(|view| view.offset()), [0, 8]);
    /// ```
    pub fn find_all(&self, query: impl AsRef<[u8]>, out: Option<&mut [View]>) -> usize {
        let mut slots = out.map(|out| out.iter_mut());
        let mut count = 0;

        for view in self.matches(query.as_ref()) {
            if let Some(slot) = slots.as_mut().and_then(Iterator::next) {
                *slot = view;
            }
            count += 1;
        }

        count
    }

    /// Returns a new heap ByteString where the first occurrence of `query` is replaced with
    /// `replacement`. If `query` doesn't occur, the result is a copy of this string.
    ///
    /// # Errors
    /// Returns [`OutOfMemory`] if allocating the result fails.
    ///
    /// # Examples
    /// ```
    /// # use container_core::collections::string::ByteString;
    /// let string = ByteString::literal(c"Hello, world!");
    /// let replaced = string.replace_first("world", "there").unwrap();
    /// assert_eq!(&*replaced, b"Hello, there!");
    /// assert_eq!(string.replace_first("nobody", "there").unwrap(), string);
    /// ```
    pub fn replace_first(
        &self,
        query: impl AsRef<[u8]>,
        replacement: impl AsRef<[u8]>,
    ) -> Result<ByteString, OutOfMemory> {
        let Some(found) = self.find_first(query) else {
            return ByteString::from_bytes(self);
        };
        let replacement = replacement.as_ref();

        let mut result = ByteString::with_cap(self.len() - found.len() + replacement.len())?;
        result.push_bytes(&self[..found.offset()])?;
        result.push_bytes(replacement)?;
        result.push_bytes(&self[found.end()..])?;
        Ok(result)
    }

    /// Returns the index of the first occurrence of `byte`.
    pub fn find_first_char(&self, byte: u8) -> Option<usize> {
        self.iter().position(|&b| b == byte)
    }

    /// Returns the index of the last occurrence of `byte`.
    pub fn find_last_char(&self, byte: u8) -> Option<usize> {
        self.iter().rposition(|&b| b == byte)
    }
}

/// An iterator over the non-overlapping occurrences of a query in a [`ByteString`], created by
/// [`ByteString::matches`].
#[derive(Debug)]
pub struct Matches<'s, 'q> {
    string: &'s ByteString,
    query: &'q [u8],
    next: usize,
}

impl Iterator for Matches<'_, '_> {
    type Item = View;

    fn next(&mut self) -> Option<Self::Item> {
        let haystack = self.string.get(self.next..)?;
        let offset = self.next + find(haystack, self.query)?;

        self.next = offset + self.query.len();
        Some(View::new(offset, self.query.len(), self.string.stamp()))
    }
}

impl FusedIterator for Matches<'_, '_> {}

/// Returns the index of the first occurrence of `needle` in `haystack`. An empty needle is never
/// found.
fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    haystack.windows(needle.len()).position(|window| window == needle)
}
