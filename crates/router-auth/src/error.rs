//! Errors stored in the request context

use provider::{ProviderError, QueryError};

/// Everything that can stop an auth request.
///
/// Request-time variants end up in the context's error slot; they are never
/// logged or retried here. `UnregisteredProvider` is only returned by the
/// startup-time link checks.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unsupported provider: {0}")]
    UnsupportedProvider(String),

    #[error("provider {0} is not registered")]
    UnregisteredProvider(String),

    #[error("no provider in request context")]
    MissingProvider,

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_provider_message() {
        assert_eq!(
            Error::UnsupportedProvider("myspace".into()).to_string(),
            "unsupported provider: myspace"
        );
    }

    #[test]
    fn wrapped_errors_display_transparently() {
        let err: Error = QueryError::InvalidEscape("%zz".into()).into();
        assert_eq!(err.to_string(), "invalid URL escape \"%zz\"");

        let err: Error = ProviderError::TokenExchange("bad_verification_code".into()).into();
        assert_eq!(err.to_string(), "token exchange failed: bad_verification_code");
    }
}
