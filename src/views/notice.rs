//! User-facing notices derived from sync events

use crate::core::events::{SyncAction, SyncEvent};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A toast-style message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub description: String,
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl Notice {
    pub fn success(description: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            title: "Success".to_string(),
            description: description.into(),
        }
    }

    pub fn error(description: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: "Error".to_string(),
            description: description.into(),
        }
    }

    /// Notice for an event, if it warrants one
    ///
    /// Successful fetches are silent. Failed fetches name the table, other
    /// failures the record kind.
    pub fn from_event(event: &SyncEvent) -> Option<Self> {
        match &event.action {
            SyncAction::Fetched { .. } => None,
            SyncAction::Failed { operation, .. } if operation == "fetch" => {
                Some(Self::error(format!("Failed to fetch {}", event.table)))
            }
            SyncAction::Failed { operation, .. } => Some(Self::error(format!(
                "Failed to {} {}",
                operation, event.entity_type
            ))),
            action => action.operation().map(|operation| {
                Self::success(format!(
                    "{} {} successfully",
                    capitalize(&event.entity_type),
                    operation.past_participle()
                ))
            }),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.description)
    }
}
