//! Persistence seams consumed by the graph and progress code.
//!
//! Implementations live in `learngraph-storage`; all calls are synchronous
//! and may fail.

use crate::{Edge, Node, NodeStatusForUser, Result};

/// Durable source of the graph, read once at startup
pub trait GraphStore: Send + Sync {
    fn load_nodes(&self) -> Result<Vec<Node>>;

    /// Prerequisite edges in insertion order
    fn load_edges(&self) -> Result<Vec<Edge>>;
}

/// Per-user node statuses
pub trait StatusStore: Send + Sync {
    /// All statuses recorded for `user_id`.
    /// Fails with [`crate::Error::UserNotFound`] for unregistered users.
    fn statuses_for_user(&self, user_id: &str) -> Result<Vec<NodeStatusForUser>>;

    /// Insert or replace the status of `(status.user_id, status.node_id)`
    fn upsert_status(&self, status: &NodeStatusForUser) -> Result<()>;
}
