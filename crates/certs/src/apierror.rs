use std::fmt;

pub const CONNECT_FAILED: &str = "Could not connect to the server. Please try again later.";
pub const LOGIN_FAILED: &str = "Login failed.";
pub const FETCH_FAILED: &str = "Could not fetch certificates.";
pub const ADD_FAILED: &str = "Failed to add certificate.";

/// Failure talking to the certificate portal.
///
/// `Display` renders the message shown to the user; the transport detail
/// carried by `Connect` and `Decode` goes to the log.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// The request never got a response.
    Connect(String),
    /// The server answered with an error status.
    Status { code: u16, message: String },
    /// The response body was not what the endpoint promises.
    Decode(String),
    /// The server understood the request and refused it.
    Rejected(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Connect(_) => write!(f, "{CONNECT_FAILED}"),
            ApiError::Status { message, .. } => write!(f, "{message}"),
            ApiError::Decode(detail) => write!(f, "unexpected response from the server: {detail}"),
            ApiError::Rejected(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Connect(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}
