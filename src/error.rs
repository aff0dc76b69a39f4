//! Errors surfaced by the metric container.

use crate::metric::{Kind, WireType};
use std::error;
use std::fmt;
use std::io;

/// Boxed error type returned by transports.
pub type BoxError = Box<dyn error::Error + Send + Sync>;

/// Convenience alias used throughout the crate.
pub type Result<T> = ::std::result::Result<T, Error>;

/// Everything that can go wrong while recording, encoding or flushing.
#[derive(Debug)]
pub enum Error {
    /// A metric was recorded with an empty name.
    EmptyName,
    /// A metric was recorded with more tags than the collector accepts.
    TooManyTags(usize),
    /// A gauge sample did not match the numeric kind the metric was created
    /// with. The existing sample is left untouched.
    NumericKindConflict {
        /// Metric name
        name: String,
        /// Canonical tag string of the metric
        tags: String,
        /// Wire type the metric already carries
        existing: WireType,
        /// Wire type of the rejected value
        given: WireType,
    },
    /// No metric exists for the requested identity.
    NotFound {
        /// Kind that was looked up
        kind: Kind,
        /// Identity that was looked up
        id: u64,
        /// Metric name
        name: String,
        /// Canonical tag string
        tags: String,
    },
    /// Writing the encoded metrics to the output sink failed. The store is
    /// left intact.
    Encoding(io::Error),
    /// A flush was requested but the container has no transport.
    NoTransport,
    /// The flush context was cancelled or its deadline passed before
    /// submission.
    Cancelled,
    /// The transport rejected or failed the submission.
    Transport(BoxError),
    /// The configuration could not be parsed.
    Config(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::EmptyName => write!(f, "invalid metric name (empty)"),
            Error::TooManyTags(n) => write!(
                f,
                "invalid tags ({} > {})",
                n,
                crate::constants::MAX_TAGS
            ),
            Error::NumericKindConflict {
                ref name,
                ref tags,
                existing,
                given,
            } => write!(
                f,
                "({} {}) exists with different wire type ({}) vs ({})",
                name, tags, existing, given
            ),
            Error::NotFound {
                kind,
                id,
                ref name,
                ref tags,
            } => write!(f, "{} {} ({} {}) not found", kind, id, name, tags),
            Error::Encoding(ref e) => write!(f, "writing metrics: {}", e),
            Error::NoTransport => write!(f, "no trap check configured"),
            Error::Cancelled => write!(f, "submission cancelled"),
            Error::Transport(ref e) => write!(f, "submitting metrics to broker: {}", e),
            Error::Config(ref msg) => write!(f, "invalid configuration: {}", msg),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::Encoding(ref e) => Some(e),
            Error::Transport(ref e) => Some(&**e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Error {
        Error::Encoding(e)
    }
}
