use learngraph_core::{Edge, Error, GraphStore, Node, Result, StatusStore, UserRecord};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Write side of a storage backend, on top of the read seams the core uses
pub trait Storage: GraphStore + StatusStore {
    fn put_node(&self, node: &Node) -> Result<()>;

    /// Append an edge after all existing ones
    fn append_edge(&self, edge: &Edge) -> Result<()>;

    /// Drop every node and edge and store the given ones instead.
    /// User statuses are left untouched.
    fn replace_graph(&self, nodes: &[Node], edges: &[Edge]) -> Result<()>;

    fn create_user(&self, user_id: &str) -> Result<UserRecord>;

    fn user_exists(&self, user_id: &str) -> Result<bool>;
}

pub(crate) fn storage_err(e: impl std::fmt::Display) -> Error {
    Error::Storage(e.to_string())
}

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    bincode::serialize(value).map_err(|e| Error::Serialization(e.to_string()))
}

pub(crate) fn decode<T: DeserializeOwned>(data: &[u8]) -> Result<T> {
    bincode::deserialize(data).map_err(|e| Error::Serialization(e.to_string()))
}

/// Ids are opaque, but must be non-empty and NUL-free to be usable as keys
pub(crate) fn validate_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(Error::InvalidInput("empty id".to_string()));
    }
    if id.contains('\0') {
        return Err(Error::InvalidInput(format!("id contains NUL: {:?}", id)));
    }
    Ok(())
}

/// Both endpoints of an edge must be usable as status keys
pub(crate) fn validate_edge(edge: &Edge) -> Result<()> {
    validate_id(&edge.from)?;
    validate_id(&edge.to)
}
