use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How a session is held.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SessionType {
    #[serde(rename = "In-Person", alias = "in-person", alias = "in_person")]
    InPerson,
    #[serde(rename = "Online", alias = "online")]
    Online,
}

impl SessionType {
    pub const ALL: [SessionType; 2] = [SessionType::InPerson, SessionType::Online];

    pub fn label(&self) -> &'static str {
        match self {
            SessionType::InPerson => "In-Person",
            SessionType::Online => "Online",
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown session type {0:?}, expected In-Person or Online")]
pub struct UnknownSessionType(pub String);

impl FromStr for SessionType {
    type Err = UnknownSessionType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "inperson" => Ok(SessionType::InPerson),
            "online" => Ok(SessionType::Online),
            _ => Err(UnknownSessionType(s.to_string())),
        }
    }
}
