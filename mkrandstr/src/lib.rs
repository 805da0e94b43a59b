#![doc = include_str!("../README.md")]
#![deny(missing_docs)]

use std::ffi::OsStr;
use std::io::Write;

use rand::distributions::{Distribution, Uniform};
use rand::Rng;

/// The flag that names the desired character count.
pub const LENGTH_FLAG: &str = "--length";

/// The number of characters generated when [LENGTH_FLAG] is absent.
pub const DEFAULT_LENGTH: u64 = 10;

/// The first visible ASCII code point, `!`.
pub const ASCII_VISIBLE_START: u8 = b'!';

/// The last visible ASCII code point, `~`.
pub const ASCII_VISIBLE_END: u8 = b'~';

/// The line printed after resolver errors.
pub const FATAL_TOO_MANY_ERRORS: &str = "[FATAL] Too many errors emmited. Aborting.";

/// The line printed when the output buffer cannot be obtained.
pub const FATAL_ALLOCATION: &str =
    "[FATAL] Cannot allocate memory to generate a string of such size.";

///////////////////////////////////////////// ErrorKind ////////////////////////////////////////////

/// The discriminant of a run's outcome.  `None` is what a successful run carries.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// No error.
    None,
    /// The count is not a string of decimal digits.
    Unparseable,
    /// The count does not fit in a u64.
    OutOfBounds,
    /// The flag was the last argument.
    MissingArgument,
    /// The string's buffer could not be allocated.
    AllocationFailure,
    /// The string could not be written out.
    Output,
}

/////////////////////////////////////////////// Error //////////////////////////////////////////////

/// Error type for mkrandstr.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The value following the flag is not a decimal number.
    Unparseable(String),
    /// The value following the flag exceeds u64::MAX.
    OutOfBounds(String),
    /// The flag had no value following it.
    MissingArgument(&'static str),
    /// A buffer of the requested length could not be reserved.
    AllocationFailure(u64),
    /// Writing the string failed.
    Output(String),
}

impl Error {
    /// The [ErrorKind] of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Unparseable(_) => ErrorKind::Unparseable,
            Error::OutOfBounds(_) => ErrorKind::OutOfBounds,
            Error::MissingArgument(_) => ErrorKind::MissingArgument,
            Error::AllocationFailure(_) => ErrorKind::AllocationFailure,
            Error::Output(_) => ErrorKind::Output,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Unparseable(_) => write!(f, "Could not parse desired character count"),
            Error::OutOfBounds(_) => write!(
                f,
                "Desired character count is out of bounds for an unsigned 64-bit integer"
            ),
            Error::MissingArgument(flag) => write!(f, "Please provide a number after {flag}"),
            Error::AllocationFailure(length) => {
                write!(f, "cannot allocate {length} bytes for the string")
            }
            Error::Output(what) => write!(f, "could not write the string: {what}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Output(err.to_string())
    }
}

////////////////////////////////////////////// Options /////////////////////////////////////////////

/// The fixed parameters of a run.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Options {
    /// The flag to look for.
    pub flag: &'static str,
    /// The length when the flag is absent.
    pub default_length: u64,
    /// The lowest code point to generate, inclusive.
    pub low: u8,
    /// The highest code point to generate, inclusive.
    pub high: u8,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            flag: LENGTH_FLAG,
            default_length: DEFAULT_LENGTH,
            low: ASCII_VISIBLE_START,
            high: ASCII_VISIBLE_END,
        }
    }
}

impl Options {
    /// Resolve the desired character count from `args`, which excludes the program name.
    ///
    /// Only the first occurrence of the flag counts.  Everything else is ignored, including
    /// arguments that are not UTF-8.  Checks happen in order:  a value must follow the flag, it
    /// must be all ASCII digits, and it must fit in a u64.  The empty string is all digits, but
    /// does not parse, so it is unparseable.
    pub fn resolve_length<S: AsRef<OsStr>>(&self, args: &[S]) -> Result<u64, Error> {
        let flag = OsStr::new(self.flag);
        let position = match args.iter().position(|arg| arg.as_ref() == flag) {
            Some(position) => position,
            None => {
                tracing::debug!(length = self.default_length, "{} absent", self.flag);
                return Ok(self.default_length);
            }
        };
        let value = match args.get(position + 1) {
            Some(value) => value.as_ref(),
            None => {
                return Err(Error::MissingArgument(self.flag));
            }
        };
        let value = match value.to_str() {
            Some(value) => value,
            None => {
                return Err(Error::Unparseable(value.to_string_lossy().into_owned()));
            }
        };
        if !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::Unparseable(value.to_string()));
        }
        match value.parse::<u64>() {
            Ok(length) => {
                tracing::debug!(length, "resolved {}", self.flag);
                Ok(length)
            }
            Err(err) => match err.kind() {
                std::num::IntErrorKind::PosOverflow => Err(Error::OutOfBounds(value.to_string())),
                _ => Err(Error::Unparseable(value.to_string())),
            },
        }
    }

    /// A [StringGenerator] over this options' code points.
    ///
    /// # Panics
    ///
    /// Panics if `low > high` or `high` is not ASCII.
    pub fn generator(&self) -> StringGenerator {
        StringGenerator::new(self.low, self.high)
    }

    /// Generate a string of `length` characters over this options' code points from a freshly
    /// seeded engine.
    ///
    /// # Panics
    ///
    /// Panics under the same conditions as [Options::generator].
    pub fn generate_random_string(&self, length: u64) -> Result<String, Error> {
        use rand::SeedableRng;
        let mut rng = rand::rngs::StdRng::from_entropy();
        self.generator().generate(&mut rng, length)
    }
}

/// Resolve the character count from `args` using the default [Options].
pub fn resolve_length<S: AsRef<OsStr>>(args: &[S]) -> Result<u64, Error> {
    Options::default().resolve_length(args)
}

///////////////////////////////////////// StringGenerator //////////////////////////////////////////

/// StringGenerator draws each character independently and uniformly from an inclusive range of
/// ASCII code points.
#[derive(Clone, Copy, Debug)]
pub struct StringGenerator {
    chars: Uniform<u8>,
}

impl StringGenerator {
    /// Create a generator over `low..=high`.
    ///
    /// # Panics
    ///
    /// Panics if `low > high` or `high` is not ASCII.
    pub fn new(low: u8, high: u8) -> Self {
        assert!(low <= high);
        assert!(high.is_ascii());
        Self {
            chars: Uniform::new_inclusive(low, high),
        }
    }

    /// Generate a string of exactly `length` characters.
    ///
    /// The buffer is reserved up front.  When it cannot be, this returns
    /// [Error::AllocationFailure] and generates nothing.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R, length: u64) -> Result<String, Error> {
        let len = usize::try_from(length).map_err(|_| Error::AllocationFailure(length))?;
        let mut string = String::new();
        if string.try_reserve_exact(len).is_err() {
            tracing::warn!(length, "could not reserve string buffer");
            return Err(Error::AllocationFailure(length));
        }
        self.fill(rng, &mut string, len);
        tracing::debug!(length, "generated string");
        Ok(string)
    }

    /// Append `length` characters to `buffer`.
    pub fn fill<R: Rng + ?Sized>(&self, rng: &mut R, buffer: &mut String, length: usize) {
        for _ in 0..length {
            buffer.push(self.chars.sample(rng) as char);
        }
    }
}

impl Default for StringGenerator {
    fn default() -> Self {
        Self::new(ASCII_VISIBLE_START, ASCII_VISIBLE_END)
    }
}

/// Generate a visible-ASCII string of `length` characters from a freshly seeded engine.
pub fn generate_random_string(length: u64) -> Result<String, Error> {
    Options::default().generate_random_string(length)
}

/// Write `line` and a newline to `out`, flushing it.
pub fn write_line<W: Write>(out: &mut W, line: &str) -> Result<(), Error> {
    writeln!(out, "{line}")?;
    out.flush()?;
    Ok(())
}

//////////////////////////////////////////// Diagnostics ///////////////////////////////////////////

/// The errors collected while validating the command line.
#[derive(Debug, Default)]
pub struct Diagnostics {
    errors: Vec<Error>,
}

impl Diagnostics {
    /// Record the error from `result`, if any, and pass along the value.
    pub fn check<T>(&mut self, result: Result<T, Error>) -> Option<T> {
        match result {
            Ok(t) => Some(t),
            Err(err) => {
                self.errors.push(err);
                None
            }
        }
    }

    /// True iff no errors were recorded.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// The recorded errors, in the order they happened.
    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    /// Write one `[ERR]` line per error, then the fatal line if there were any.
    pub fn report<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        for err in self.errors.iter() {
            writeln!(out, "[ERR] {err}")?;
        }
        if !self.errors.is_empty() {
            writeln!(out, "{FATAL_TOO_MANY_ERRORS}")?;
        }
        Ok(())
    }
}

/////////////////////////////////////////////// tests //////////////////////////////////////////////
