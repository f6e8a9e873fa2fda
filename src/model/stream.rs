use serde::{Deserialize, Serialize};

use crate::model::profile::ProfileRecord;

/// Framing lines sent before the first and after the last profile of a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(tag = "_meta", rename_all = "lowercase")]
pub enum StreamMarker {
    /// Number of names accepted for the batch
    Start { total: usize },
    /// Number of profiles actually sent out of `total`
    Done { sent: usize, total: usize },
}

/// One line of the `application/x-ndjson` batch stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BatchMessage {
    Marker(StreamMarker),
    Profile(Box<ProfileRecord>),
}

impl BatchMessage {
    /// Serializes the message as a single newline-terminated JSON line.
    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}
