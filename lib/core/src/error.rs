use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("User already exists: {0}")]
    UserExists(String),

    #[error("Prerequisite cycle detected: {}", path.join(" -> "))]
    CycleDetected { path: Vec<String> },

    #[error("Failed to write status of node {node_id} for user {user_id}: {source}")]
    StatusWrite {
        user_id: String,
        node_id: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// True for missing users or nodes, including when wrapped by a failed
    /// status write.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::NodeNotFound(_) | Error::UserNotFound(_) => true,
            Error::StatusWrite { source, .. } => source.is_not_found(),
            _ => false,
        }
    }
}
