use std::error::Error as StdError;
use std::fmt::{self, Display};

use palaver_model::{ErrorKind, ModelProviderError};

/// The error returned by a failed conversation turn.
///
/// It carries the provider's error unmodified; use [`Error::kind`] to tell
/// the failures apart.
#[derive(Debug)]
pub struct Error {
    inner: Box<dyn ModelProviderError>,
}

impl Error {
    #[inline]
    pub(crate) fn from_provider(inner: Box<dyn ModelProviderError>) -> Self {
        Self { inner }
    }

    /// Returns the kind of this error.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.inner.kind()
    }

    /// Returns the error reported by the model provider.
    #[inline]
    pub fn provider_error(&self) -> &dyn ModelProviderError {
        self.inner.as_ref()
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.inner, f)
    }
}

impl StdError for Error {}
