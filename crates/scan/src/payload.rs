use std::fmt;

/// Text decoded from a QR symbol, passed on untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DecodedPayload(String);

impl DecodedPayload {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for DecodedPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for DecodedPayload {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl From<&str> for DecodedPayload {
    fn from(text: &str) -> Self {
        Self(text.to_string())
    }
}
