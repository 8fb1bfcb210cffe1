// ABOUTME: Domain error type shared by the registry, dispatcher, and platform adapters
// ABOUTME: Separates configuration-time conflicts from fire-and-forget runtime dispatch failures

use crate::activation::Activation;
use crate::keys::Shortcut;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The proposed shortcut is already owned by a different application.
    #[error("shortcut {shortcut} is already bound to {owner}")]
    Conflict { shortcut: Shortcut, owner: String },

    /// The target application could not be located for launch.
    #[error("application not found: {0}")]
    ApplicationNotFound(String),

    #[error("failed to launch {application_id}: {source}")]
    Launch {
        application_id: String,
        #[source]
        source: std::io::Error,
    },

    /// The OS rejected a front/hide request.
    #[error("failed to {action} {application_id}: {reason}")]
    Activation {
        application_id: String,
        action: Activation,
        reason: String,
    },

    #[error("invalid shortcut '{input}': {reason}")]
    InvalidShortcut { input: String, reason: &'static str },

    #[error("no binding for application {0}")]
    UnknownApplication(String),
}

impl Error {
    pub fn activation(application_id: &str, action: Activation, reason: impl Into<String>) -> Self {
        Error::Activation {
            application_id: application_id.to_string(),
            action,
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_message_names_owner() {
        let err = Error::Conflict {
            shortcut: Shortcut::parse("cmd+1").unwrap(),
            owner: "com.example.editor".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "shortcut Cmd+1 is already bound to com.example.editor"
        );
    }

    #[test]
    fn test_activation_message() {
        let err = Error::activation("com.example.mail", Activation::Hide, "not running");
        assert_eq!(err.to_string(), "failed to hide com.example.mail: not running");
    }
}
