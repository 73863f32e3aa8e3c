//! Tells where in a scenario file a read failed.

use crate::text_deserialize::TextError;

/// Prefixes the error of a failed read with the record or key being read.
/// Outer callers add their location on top, so messages read outermost first.
pub trait Context: Sized {
    fn context(self, location: impl AsRef<str>) -> Self;
    fn with_context<S: AsRef<str>>(self, location: impl FnOnce() -> S) -> Self;
}
impl<T> Context for Result<T, TextError> {
    fn context(self, location: impl AsRef<str>) -> Self {
        return self.map_err(|err| err.context(location));
    }

    /// Only formats the location when the read failed
    fn with_context<S: AsRef<str>>(self, location: impl FnOnce() -> S) -> Self {
        return self.map_err(|err| err.context(location()));
    }
}
