//! Application layer errors

use thiserror::Error;

/// General bot errors, raised by platform adapters
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Platform API error: {0}")]
    Api(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Roster membership and rotation errors
#[derive(Error, Debug)]
pub enum RosterError {
    #[error("That user is already in the pope queue!")]
    AlreadyPresent(String),

    #[error("That user is not in the pope queue!")]
    NotPresent(String),

    #[error("There must be at least two popes to {action}!")]
    InsufficientMembers { action: &'static str },

    #[error("There are no registered popes!")]
    EmptyRoster,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Command execution errors
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Roster(#[from] RosterError),

    /// A plain reason given by a handler, reported verbatim
    #[error("{0}")]
    Rejected(String),

    #[error(transparent)]
    Bot(#[from] BotError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CommandError {
    /// Text that is safe to show the user who issued the command.
    pub fn user_message(&self) -> String {
        match self {
            CommandError::Roster(RosterError::Storage(_)) => {
                "Something went wrong while reading or saving the pope queue.".to_string()
            }
            CommandError::Bot(_) => {
                "Something went wrong while talking to the chat platform.".to_string()
            }
            CommandError::Internal(_) => "Something went wrong while running that command.".to_string(),
            other => other.to_string(),
        }
    }

    /// Faults of the bot itself rather than of the request.
    pub fn is_fault(&self) -> bool {
        matches!(
            self,
            CommandError::Roster(RosterError::Storage(_))
                | CommandError::Bot(_)
                | CommandError::Internal(_)
        )
    }
}

impl From<String> for CommandError {
    fn from(reason: String) -> Self {
        CommandError::Rejected(reason)
    }
}

impl From<&str> for CommandError {
    fn from(reason: &str) -> Self {
        CommandError::Rejected(reason.to_string())
    }
}

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Serialization(e.to_string())
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Command '{0}' is registered twice")]
    DuplicateCommand(String),
}
