use reqwest::StatusCode;

/// All error types that can occur when talking to the Govee cloud API.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The HTTP client could not be built from the configuration.
    #[error("invalid client configuration: {0}")]
    Config(String),

    /// The request could not be sent or the response could not be read.
    #[error("http {action} error: {err}")]
    Http {
        action: String,
        err: reqwest::Error,
    },

    /// The API answered with a non-success HTTP status.
    #[error("request failed with status {status}: {message}")]
    Status { status: StatusCode, message: String },

    /// The vendor rejected the call because the key's daily quota is spent.
    #[error("rate limit exceeded. remaining: {remaining}, reset: {reset}")]
    VendorRateLimited { remaining: String, reset: String },

    /// The response envelope carried a non-200 code.
    #[error("api error {code}: {message}")]
    Api { code: i64, message: String },

    /// The local daily quota is spent; the call was not sent.
    #[error("rate limit reached for today")]
    QuotaExhausted,

    /// Failed to deserialize JSON data.
    #[error("failed to load json: {0:?}")]
    JsonLoad(serde_json::Error),

    /// The device has not been seen in a device listing.
    #[error("unknown device {0}")]
    UnknownDevice(String),

    /// Failed to parse a [`crate::Color`] from a string.
    #[error("invalid color string: {0}")]
    InvalidColorString(String),
}

impl Error {
    /// Create a new http error
    pub fn http(action: &str, err: reqwest::Error) -> Self {
        Error::Http {
            action: action.to_string(),
            err,
        }
    }

    /// Create a new status error
    pub fn status(status: StatusCode, message: &str) -> Self {
        Error::Status {
            status,
            message: message.to_string(),
        }
    }

    /// Whether this is the local quota gate refusing a call.
    pub fn is_quota_exhausted(&self) -> bool {
        matches!(self, Error::QuotaExhausted)
    }
}

/// Hacky implementation of PartialEq for testing
#[cfg(test)]
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}
