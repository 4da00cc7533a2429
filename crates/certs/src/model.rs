use {
    serde::{Deserialize, Serialize},
    std::fmt,
};

/// Identifier as the portal sends it, a JSON number or string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    Number(i64),
    Text(String),
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::Number(n) => write!(f, "{n}"),
            Id::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for Id {
    fn from(n: i64) -> Self {
        Id::Number(n)
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Id::Text(s.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Id,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

#[derive(Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// A wipe certificate issued by the portal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Certificate {
    pub id: Id,
    pub device_name: String,
    pub wipe_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wipe_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Id>,
}

impl Certificate {
    /// Date part of `wipe_date`, e.g. `2024-05-01` for `2024-05-01T10:00:00Z`.
    pub fn wipe_day(&self) -> &str {
        self.wipe_date
            .split(['T', ' '])
            .next()
            .unwrap_or(&self.wipe_date)
    }

    /// Labelled fields for the detail view, in display order.
    pub fn details(&self) -> Vec<(&'static str, String)> {
        vec![
            ("serial number", self.serial_number.clone().unwrap_or_default()),
            ("wipe method", self.wipe_method.clone().unwrap_or_default()),
            ("status", self.status.clone().unwrap_or_default()),
            (
                "wiped by user id",
                self.user_id.as_ref().map(Id::to_string).unwrap_or_default(),
            ),
        ]
    }

    /// One row of the certificate list.
    pub fn summary_line(&self) -> String {
        format!("{} ({})", self.device_name, self.wipe_day())
    }
}
