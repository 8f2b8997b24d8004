use serde::{Deserialize, Serialize};

/// A forced answer as written in the configuration file.
///
/// `type` and `address` are kept as strings here; they are checked and
/// compiled into a [`PolicyOverwrite`](crate::PolicyOverwrite) when the
/// configuration is turned into a snapshot.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct OverwriteConfig {
    #[serde(rename = "type")]
    pub record_type: String,

    pub address: String,

    #[serde(default)]
    pub ttl: Option<u32>,
}

/// Blacklist entry. Only the presence of the key matters; the value may be a
/// flag, a free-form note, or a table carrying a reason.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum BlacklistConfig {
    Flag(bool),
    Note(String),
    Detailed {
        #[serde(default)]
        reason: Option<String>,
    },
}

impl BlacklistConfig {
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Flag(_) => None,
            Self::Note(note) => Some(note.as_str()),
            Self::Detailed { reason } => reason.as_deref(),
        }
    }
}
