use std::fmt::{self, Display};

/// The kind of error that occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The request was rejected before or by the provider as invalid.
    InvalidRequest,
    /// The credential is missing, invalid, or lacks permission.
    Authentication,
    /// The model provider is rate limited.
    RateLimitExceeded,
    /// The model provider is overloaded or failed internally.
    Overloaded,
    /// The response could not be understood.
    MalformedResponse,
    /// The request never reached the provider, or the connection broke.
    Transport,
    /// Any other errors.
    Other,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::InvalidRequest => "invalid request",
            ErrorKind::Authentication => "authentication failed",
            ErrorKind::RateLimitExceeded => "rate limit exceeded",
            ErrorKind::Overloaded => "provider overloaded",
            ErrorKind::MalformedResponse => "malformed response",
            ErrorKind::Transport => "transport error",
            ErrorKind::Other => "other error",
        };
        f.write_str(s)
    }
}
