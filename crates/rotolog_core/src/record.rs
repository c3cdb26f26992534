//! Records: anything that can be rendered to a byte payload.

use std::borrow::Cow;
use std::fmt;
use thiserror::Error;

/// A record could not be rendered to bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FormatError {
    message: String,
}

impl FormatError {
    /// Creates a format error with the given message.
    pub fn new(message: impl fmt::Display) -> Self {
        Self {
            message: message.to_string(),
        }
    }

    /// Returns the error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A log record the engine can write.
///
/// The engine does not care how a record is laid out; it only needs the
/// final bytes. Formatting happens before the rotation decision, so the
/// size policy sees the exact payload length.
pub trait Record {
    /// Renders the record to the bytes that will be appended to the file.
    ///
    /// # Errors
    ///
    /// Returns a [`FormatError`] if the record cannot be rendered. The file
    /// is left untouched in that case.
    fn to_bytes(&self) -> Result<Cow<'_, [u8]>, FormatError>;
}

impl Record for [u8] {
    fn to_bytes(&self) -> Result<Cow<'_, [u8]>, FormatError> {
        Ok(Cow::Borrowed(self))
    }
}

impl Record for Vec<u8> {
    fn to_bytes(&self) -> Result<Cow<'_, [u8]>, FormatError> {
        Ok(Cow::Borrowed(self))
    }
}

impl Record for str {
    fn to_bytes(&self) -> Result<Cow<'_, [u8]>, FormatError> {
        Ok(Cow::Borrowed(self.as_bytes()))
    }
}

impl Record for String {
    fn to_bytes(&self) -> Result<Cow<'_, [u8]>, FormatError> {
        Ok(Cow::Borrowed(self.as_bytes()))
    }
}

impl<R: Record + ?Sized> Record for &R {
    fn to_bytes(&self) -> Result<Cow<'_, [u8]>, FormatError> {
        (**self).to_bytes()
    }
}
