pub type Result<T> = std::result::Result<T, Error>;

/// Failure taxonomy of the client core.
///
/// Payloads are plain strings so the type stays `Clone` and can ride
/// inside published poll state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// DNS, TLS, connect or timeout failure with no usable HTTP response.
    #[error("Network error: {message}")]
    Network { message: String },

    /// HTTP 401 or 403; the stored token is no longer accepted.
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    /// Any other non-success status, or a success body that does not decode.
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Device-local storage read or write failure.
    #[error("Persistence error: {message}")]
    Persistence { message: String },
}

impl Error {
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn auth<S: Into<String>>(message: S) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    pub fn server<S: Into<String>>(status: u16, message: S) -> Self {
        Self::Server {
            status,
            message: message.into(),
        }
    }

    pub fn persistence<S: Into<String>>(message: S) -> Self {
        Self::Persistence {
            message: message.into(),
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, Error::Auth { .. })
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::network(err.to_string())
    }
}
