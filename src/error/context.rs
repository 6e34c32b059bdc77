//! Context helpers for attaching messages to errors.

use super::{CclError, Result};

/// Attach a context message to a failing `Result`.
pub trait ResultExt<T> {
    /// Wrap the error with a static or computed context message.
    ///
    /// # Errors
    ///
    /// Returns `CclError::WithContext` if `self` is an error.
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Like [`ResultExt::context`], but only builds the message on failure.
    ///
    /// # Errors
    ///
    /// Returns `CclError::WithContext` if `self` is an error.
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|source| CclError::WithContext {
            context: message.into(),
            source: Box::new(source),
        })
    }

    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|source| CclError::WithContext {
            context: f().into(),
            source: Box::new(source),
        })
    }
}

/// Turn a missing value into a configuration error.
pub trait OptionExt<T> {
    /// # Errors
    ///
    /// Returns `CclError::Config` if `self` is `None`.
    fn ok_or_config(self, message: impl Into<String>) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_config(self, message: impl Into<String>) -> Result<T> {
        self.ok_or_else(|| CclError::Config(message.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_wraps_source() {
        let failed: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::other("disk full"));
        let err = failed.context("writing tests.json").unwrap_err();
        assert_eq!(err.to_string(), "writing tests.json: disk full");
    }

    #[test]
    fn option_ok_or_config() {
        let missing: Option<u8> = None;
        let err = missing.ok_or_config("source-dir not set").unwrap_err();
        assert!(matches!(err, CclError::Config(_)));
    }
}
