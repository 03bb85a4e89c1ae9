// In-process storage for tests and ephemeral servers
use crate::backend::{validate_edge, validate_id, Storage};
use chrono::Utc;
use learngraph_core::{Edge, Error, GraphStore, Node, NodeId, NodeStatusForUser, Result, StatusStore, UserId, UserRecord};
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Default)]
pub struct MemoryStore {
    nodes: RwLock<HashMap<NodeId, Node>>,
    edges: RwLock<Vec<Edge>>,
    users: RwLock<HashMap<UserId, UserRecord>>,
    statuses: RwLock<HashMap<UserId, HashMap<NodeId, NodeStatusForUser>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GraphStore for MemoryStore {
    fn load_nodes(&self) -> Result<Vec<Node>> {
        Ok(self.nodes.read().values().cloned().collect())
    }

    fn load_edges(&self) -> Result<Vec<Edge>> {
        Ok(self.edges.read().clone())
    }
}

impl StatusStore for MemoryStore {
    fn statuses_for_user(&self, user_id: &str) -> Result<Vec<NodeStatusForUser>> {
        if !self.users.read().contains_key(user_id) {
            return Err(Error::UserNotFound(user_id.to_string()));
        }
        Ok(self
            .statuses
            .read()
            .get(user_id)
            .map(|by_node| by_node.values().cloned().collect())
            .unwrap_or_default())
    }

    fn upsert_status(&self, status: &NodeStatusForUser) -> Result<()> {
        validate_id(&status.node_id)?;
        if !self.users.read().contains_key(&status.user_id) {
            return Err(Error::UserNotFound(status.user_id.clone()));
        }
        self.statuses
            .write()
            .entry(status.user_id.clone())
            .or_default()
            .insert(status.node_id.clone(), status.clone());
        Ok(())
    }
}

impl Storage for MemoryStore {
    fn put_node(&self, node: &Node) -> Result<()> {
        validate_id(&node.id)?;
        self.nodes.write().insert(node.id.clone(), node.clone());
        Ok(())
    }

    fn append_edge(&self, edge: &Edge) -> Result<()> {
        validate_edge(edge)?;
        self.edges.write().push(edge.clone());
        Ok(())
    }

    fn replace_graph(&self, nodes: &[Node], edges: &[Edge]) -> Result<()> {
        for node in nodes {
            validate_id(&node.id)?;
        }
        for edge in edges {
            validate_edge(edge)?;
        }
        *self.nodes.write() = nodes.iter().map(|n| (n.id.clone(), n.clone())).collect();
        *self.edges.write() = edges.to_vec();
        Ok(())
    }

    fn create_user(&self, user_id: &str) -> Result<UserRecord> {
        validate_id(user_id)?;
        let mut users = self.users.write();
        if users.contains_key(user_id) {
            return Err(Error::UserExists(user_id.to_string()));
        }
        let record = UserRecord {
            id: user_id.to_string(),
            created_at: Utc::now(),
        };
        users.insert(user_id.to_string(), record.clone());
        Ok(record)
    }

    fn user_exists(&self, user_id: &str) -> Result<bool> {
        Ok(self.users.read().contains_key(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use learngraph_core::{NodeStatus, NodeType};

    #[test]
    fn test_invalid_edge_endpoints_are_rejected() {
        let store = MemoryStore::new();
        let node = Node::new("b", "B", NodeType::Lecture, "en");

        assert!(matches!(
            store.append_edge(&Edge::new("", "b")),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            store.replace_graph(&[node], &[Edge::new("", "b")]),
            Err(Error::InvalidInput(_))
        ));
        assert!(store.load_nodes().unwrap().is_empty());
        assert!(store.load_edges().unwrap().is_empty());
    }

    #[test]
    fn test_empty_node_id_status_is_rejected() {
        let store = MemoryStore::new();
        store.create_user("u1").unwrap();

        assert!(matches!(
            store.upsert_status(&NodeStatusForUser::now("u1", "", NodeStatus::Finished)),
            Err(Error::InvalidInput(_))
        ));
        assert!(store.statuses_for_user("u1").unwrap().is_empty());
    }
}
