use std::fmt::{self, Arguments, Debug, Display, Formatter, Write};

use super::byte_string::ByteString;
use crate::util::error::OutOfMemory;

/// Creates a [`ByteString`] using interpolation of runtime expressions, like [`format!`], but
/// returning `Result<ByteString, OutOfMemory>`. The string is allocated with exactly enough room
/// for the formatted output.
///
/// # Examples
/// ```
/// # use container_core::bformat;
/// let name = "Alice";
/// let string = bformat!("Hello, {name}! You are {} years old.", 30).unwrap();
/// assert_eq!(&*string, b"Hello, Alice! You are 30 years old.");
/// assert_eq!(string.cap(), string.len());
/// ```
#[macro_export]
macro_rules! bformat {
    ($($arg:tt)*) => {
        $crate::collections::string::ByteString::from_fmt(::std::format_args!($($arg)*))
    };
}

impl ByteString {
    /// Creates a heap ByteString from formatting arguments, measuring the output first so that
    /// the allocation is exactly the right size. Usually called through [`bformat!`].
    ///
    /// # Errors
    /// Returns [`OutOfMemory`] if the allocation fails, or if a formatting trait implementation
    /// returns an error.
    pub fn from_fmt(args: Arguments<'_>) -> Result<ByteString, OutOfMemory> {
        let mut string = ByteString::with_cap(measure(args)?)?;
        string.write_reserved(args)?;
        Ok(string)
    }

    /// Appends formatted output, growing once to fit all of it.
    ///
    /// # Errors
    /// Returns [`OutOfMemory`] for literals, if growing fails, or if a formatting trait
    /// implementation returns an error. The string is left unchanged in all of these cases.
    ///
    /// # Examples
    /// ```
    /// # use container_core::collections::string::ByteString;
    /// let mut string = ByteString::from_bytes(b"x = ").unwrap();
    /// string.push_fmt(format_args!("{:>4}", 42)).unwrap();
    /// assert_eq!(&*string, b"x =   42");
    /// ```
    pub fn push_fmt(&mut self, args: Arguments<'_>) -> Result<(), OutOfMemory> {
        self.reserve(measure(args)?)?;
        self.write_reserved(args)
    }

    /// Writes `args` into space that has already been reserved, restoring the old length if
    /// formatting fails part way through.
    fn write_reserved(&mut self, args: Arguments<'_>) -> Result<(), OutOfMemory> {
        let old_len = self.len();
        if fmt::write(self, args).is_err() {
            log::warn!("formatting into a ByteString failed, discarding partial output");
            self.truncate(old_len)?;
            return Err(OutOfMemory);
        }
        Ok(())
    }
}

/// Returns the number of bytes that `args` formats to.
fn measure(args: Arguments<'_>) -> Result<usize, OutOfMemory> {
    let mut counter = ByteCounter(0);
    fmt::write(&mut counter, args).map_err(|_| OutOfMemory)?;
    Ok(counter.0)
}

/// A writer that only counts what would have been written.
struct ByteCounter(usize);

impl Write for ByteCounter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0 = self.0.checked_add(s.len()).ok_or(fmt::Error)?;
        Ok(())
    }
}

impl Write for ByteString {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push_str(s).map_err(|_| fmt::Error)
    }
}

impl Display for ByteString {
    /// Writes the contents as UTF-8, replacing invalid sequences with
    /// [`U+FFFD`](char::REPLACEMENT_CHARACTER).
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for chunk in self.utf8_chunks() {
            f.write_str(chunk.valid())?;
            if !chunk.invalid().is_empty() {
                f.write_char(char::REPLACEMENT_CHARACTER)?;
            }
        }
        Ok(())
    }
}

impl Debug for ByteString {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteString")
            .field("contents", &format_args!("\"{}\"", self.escape_ascii()))
            .field("len", &self.len())
            .field("cap", &self.cap())
            .field("kind", &self.kind())
            .finish()
    }
}
