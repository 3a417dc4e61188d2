//! Error type shared by the request layer, the resolvers and the payload builders.
//!
//! Every failure carries an optional HTTP status code so callers can decide
//! whether to fall back to another endpoint without parsing messages.

/// Result alias used across the core crate and the request layer.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Missing or malformed configuration or user input. Never retried.
    #[error("{0}")]
    Config(String),

    /// The server rejected our credentials (401/403).
    #[error("{message}")]
    Auth { message: String, status: u16 },

    /// Any other status outside the expected set.
    #[error("{message}")]
    Api { message: String, status: u16 },

    /// A mutation the server refused, re-raised with the operation that was attempted.
    #[error("{context} {source}")]
    Rejected {
        context: String,
        #[source]
        source: Box<Error>,
    },

    /// The request never produced a response (DNS, refused connection, timeout).
    #[error("{0}")]
    Network(String),

    /// A human-supplied reference did not match any server-side entity.
    #[error("{0}")]
    Resolve(String),

    /// The server answered with a payload we could not decode.
    #[error("Unexpected response shape: {0}")]
    InvalidResponse(String),
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    pub fn resolve(message: impl Into<String>) -> Self {
        Error::Resolve(message.into())
    }

    /// HTTP status attached to this error, if the server answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Auth { status, .. } | Error::Api { status, .. } => Some(*status),
            Error::Rejected { source, .. } => source.status_code(),
            _ => None,
        }
    }

    /// True when the error carries one of `codes`.
    pub fn has_status(&self, codes: &[u16]) -> bool {
        self.status_code().is_some_and(|code| codes.contains(&code))
    }

    /// Wrap a 422 with `context`; every other error passes through untouched.
    pub fn rejected_as(self, context: impl Into<String>) -> Self {
        if self.status_code() == Some(422) {
            Error::Rejected {
                context: context.into(),
                source: Box::new(self),
            }
        } else {
            self
        }
    }
}
