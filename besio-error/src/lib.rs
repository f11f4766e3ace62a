#![deny(missing_docs)]

//! This crate defines error & result types for besio.
//! It also contains a variety of useful macros for error handling.

use std::backtrace::Backtrace;
use std::borrow::Cow;
use std::convert::Infallible;
use std::fmt::{Debug, Display, Formatter};
use std::num::TryFromIntError;
use std::ops::Deref;
use std::{env, fmt, io};

/// A string that can be used as an error message.
#[derive(Debug)]
pub struct ErrString(Cow<'static, str>);

#[allow(clippy::fallible_impl_from)]
impl<T> From<T> for ErrString
where
    T: Into<Cow<'static, str>>,
{
    #[allow(clippy::panic)]
    fn from(msg: T) -> Self {
        if env::var("BESIO_PANIC_ON_ERR").as_deref().unwrap_or("") == "1" {
            panic!("{}\nBacktrace:\n{}", msg.into(), Backtrace::capture());
        } else {
            Self(msg.into())
        }
    }
}

impl AsRef<str> for ErrString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for ErrString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for ErrString {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl From<Infallible> for BesError {
    fn from(_: Infallible) -> Self {
        unreachable!()
    }
}

// Alias so `thiserror` does not treat these fields as backtraces and emit a
// `provide` method, which requires the unstable `error_generic_member_access`.
type StdBacktrace = Backtrace;

/// The top-level error type for besio.
#[derive(thiserror::Error)]
#[non_exhaustive]
pub enum BesError {
    /// The requested entry range `[start, stop)` does not fit the available entries.
    #[error("entry range [{0}, {1}) is out of bounds for {2} entries\nBacktrace:\n{3}")]
    EntryRange(i64, i64, u64, StdBacktrace),
    /// A field or branch selection pattern matched nothing.
    #[error("{0}\nBacktrace:\n{1}")]
    UnknownField(ErrString, StdBacktrace),
    /// A byte-count field is missing its framing bit.
    #[error("malformed framing: raw byte count {0:#010x} at position {1} lacks the 0x40000000 flag\nBacktrace:\n{2}")]
    MalformedFraming(u32, usize, StdBacktrace),
    /// A read ran past the end of the readable bytes.
    #[error("decode exhausted: cannot read {0} bytes at position {1}, limit is {2}\nBacktrace:\n{3}")]
    DecodeExhaustion(usize, usize, usize, StdBacktrace),
    /// An invalid argument was provided.
    #[error("{0}\nBacktrace:\n{1}")]
    InvalidArgument(ErrString, StdBacktrace),
    /// A shape description cannot be turned into a reader.
    #[error("{0}\nBacktrace:\n{1}")]
    InvalidShape(ErrString, StdBacktrace),
    /// An assertion failed.
    #[error("{0}\nBacktrace:\n{1}")]
    AssertionFailed(ErrString, StdBacktrace),
    /// The decode pass was cancelled between two entries.
    #[error("decode cancelled after {0} entries\nBacktrace:\n{1}")]
    Cancelled(u64, StdBacktrace),
    /// A wrapper for other errors, carrying additional context.
    #[error("{0}: {1}")]
    Context(ErrString, #[source] Box<BesError>),
    /// A wrapper for IO errors.
    #[error("{0}\nBacktrace:\n{1}")]
    IOError(io::Error, StdBacktrace),
    /// A wrapper for integer conversion errors.
    #[error("{0}\nBacktrace:\n{1}")]
    TryFromInt(TryFromIntError, StdBacktrace),
    /// A wrapper for JSON errors.
    #[cfg(feature = "serde")]
    #[error("{0}\nBacktrace:\n{1}")]
    SerdeJson(serde_json::Error, StdBacktrace),
}

impl BesError {
    /// Adds additional context to an error.
    pub fn with_context<T: Into<ErrString>>(self, msg: T) -> Self {
        BesError::Context(msg.into(), Box::new(self))
    }

    /// Returns the innermost error, skipping any [`BesError::Context`] wrappers.
    pub fn root_cause(&self) -> &BesError {
        match self {
            BesError::Context(_, inner) => inner.root_cause(),
            other => other,
        }
    }
}

impl Debug for BesError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl From<io::Error> for BesError {
    fn from(value: io::Error) -> Self {
        BesError::IOError(value, Backtrace::capture())
    }
}

impl From<TryFromIntError> for BesError {
    fn from(value: TryFromIntError) -> Self {
        BesError::TryFromInt(value, Backtrace::capture())
    }
}

#[cfg(feature = "serde")]
impl From<serde_json::Error> for BesError {
    fn from(value: serde_json::Error) -> Self {
        BesError::SerdeJson(value, Backtrace::capture())
    }
}

/// A type alias for Results that return BesErrors as their error type.
pub type BesResult<T> = Result<T, BesError>;

/// A trait for unwrapping a BesResult.
pub trait BesUnwrap {
    /// The type of the value being unwrapped.
    type Output;

    /// Returns the value of the result if it is Ok, otherwise panics with the error.
    /// Should be called only in contexts where the error condition represents a bug (programmer error).
    fn besio_unwrap(self) -> Self::Output;
}

impl<T, E> BesUnwrap for Result<T, E>
where
    E: Into<BesError>,
{
    type Output = T;

    #[inline(always)]
    fn besio_unwrap(self) -> Self::Output {
        self.map_err(|err| err.into())
            .unwrap_or_else(|err| besio_panic!(err))
    }
}

/// A trait for expect-ing a BesResult or an Option.
pub trait BesExpect {
    /// The type of the value being expected.
    type Output;

    /// Returns the value of the result if it is Ok, otherwise panics with the error.
    /// Should be called only in contexts where the error condition represents a bug (programmer error).
    fn besio_expect(self, msg: &str) -> Self::Output;
}

impl<T, E> BesExpect for Result<T, E>
where
    E: Into<BesError>,
{
    type Output = T;

    #[inline(always)]
    fn besio_expect(self, msg: &str) -> Self::Output {
        self.map_err(|err| err.into())
            .unwrap_or_else(|e| besio_panic!(e.with_context(msg.to_string())))
    }
}

impl<T> BesExpect for Option<T> {
    type Output = T;

    #[inline(always)]
    fn besio_expect(self, msg: &str) -> Self::Output {
        self.unwrap_or_else(|| {
            let err = BesError::AssertionFailed(msg.to_string().into(), Backtrace::capture());
            besio_panic!(err)
        })
    }
}

/// A convenient macro for creating a BesError.
#[macro_export]
macro_rules! besio_err {
    (EntryRange: $start:expr, $stop:expr, $entries:expr) => {{
        use std::backtrace::Backtrace;
        $crate::__private::must_use(
            $crate::BesError::EntryRange($start, $stop, $entries, Backtrace::capture())
        )
    }};
    (MalformedFraming: $raw:expr, $pos:expr) => {{
        use std::backtrace::Backtrace;
        $crate::__private::must_use(
            $crate::BesError::MalformedFraming($raw, $pos, Backtrace::capture())
        )
    }};
    (DecodeExhaustion: $wanted:expr, $pos:expr, $limit:expr) => {{
        use std::backtrace::Backtrace;
        $crate::__private::must_use(
            $crate::BesError::DecodeExhaustion($wanted, $pos, $limit, Backtrace::capture())
        )
    }};
    (Cancelled: $entries:expr) => {{
        use std::backtrace::Backtrace;
        $crate::__private::must_use(
            $crate::BesError::Cancelled($entries, Backtrace::capture())
        )
    }};
    (Context: $msg:literal, $err:expr) => {{
        $crate::__private::must_use(
            $crate::BesError::Context($msg.into(), Box::new($err))
        )
    }};
    ($variant:ident: $fmt:literal $(, $arg:expr)* $(,)?) => {{
        use std::backtrace::Backtrace;
        $crate::__private::must_use(
            $crate::BesError::$variant(format!($fmt, $($arg),*).into(), Backtrace::capture())
        )
    }};
    ($fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::besio_err!(InvalidArgument: $fmt, $($arg),*)
    };
}

/// A convenience macro for returning a BesError.
#[macro_export]
macro_rules! besio_bail {
    ($($tt:tt)+) => {
        return Err($crate::besio_err!($($tt)+))
    };
}

/// A convenience macro for panicking with a BesError in the presence of a programmer error
/// (e.g., an invariant has been violated).
#[macro_export]
macro_rules! besio_panic {
    ($variant:ident: $fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::besio_panic!($crate::besio_err!($variant: $fmt, $($arg),*))
    };
    ($err:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {{
        let err: $crate::BesError = $err;
        panic!("{}", err.with_context(format!($fmt, $($arg),*)))
    }};
    ($fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::besio_panic!($crate::besio_err!($fmt, $($arg),*))
    };
    ($err:expr) => {{
        let err: $crate::BesError = $err;
        panic!("{}", err)
    }};
}

#[doc(hidden)]
pub mod __private {
    #[doc(hidden)]
    #[inline]
    #[cold]
    #[must_use]
    pub const fn must_use(error: crate::BesError) -> crate::BesError {
        error
    }
}
