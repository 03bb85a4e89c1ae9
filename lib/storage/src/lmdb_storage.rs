// LMDB-backed graph and status storage
use crate::backend::{decode, encode, storage_err, validate_edge, validate_id, Storage};
use chrono::Utc;
use heed::byteorder::BE;
use heed::types::{Bytes, Str, U64};
use heed::{Database, Env, EnvOpenOptions};
use learngraph_core::{Edge, Error, GraphStore, Node, NodeStatusForUser, Result, StatusStore, UserRecord};
use std::path::Path;
use std::sync::Arc;

const DB_NODES: &str = "nodes";
const DB_EDGES: &str = "edges";
const DB_USERS: &str = "users";
const DB_STATUSES: &str = "statuses";

const MAP_SIZE: usize = 1024 * 1024 * 1024; // 1GB

/// Key of a status record. Ids never contain NUL, so a user's records form
/// one contiguous prefix range.
fn status_key(user_id: &str, node_id: &str) -> String {
    format!("{}\0{}", user_id, node_id)
}

fn user_prefix(user_id: &str) -> String {
    format!("{}\0", user_id)
}

pub struct LmdbStorage {
    env: Arc<Env>,
    nodes_db: Database<Str, Bytes>,
    /// Keyed by a big-endian sequence number so iteration follows insertion order
    edges_db: Database<U64<BE>, Bytes>,
    users_db: Database<Str, Bytes>,
    statuses_db: Database<Str, Bytes>,
}

impl LmdbStorage {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        std::fs::create_dir_all(&path)?;

        let env = Arc::new(unsafe {
            EnvOpenOptions::new()
                .map_size(MAP_SIZE)
                .max_dbs(4)
                .open(path.as_ref())
                .map_err(storage_err)?
        });

        let mut wtxn = env.write_txn().map_err(storage_err)?;

        let nodes_db: Database<Str, Bytes> = env
            .create_database(&mut wtxn, Some(DB_NODES))
            .map_err(storage_err)?;

        let edges_db: Database<U64<BE>, Bytes> = env
            .create_database(&mut wtxn, Some(DB_EDGES))
            .map_err(storage_err)?;

        let users_db: Database<Str, Bytes> = env
            .create_database(&mut wtxn, Some(DB_USERS))
            .map_err(storage_err)?;

        let statuses_db: Database<Str, Bytes> = env
            .create_database(&mut wtxn, Some(DB_STATUSES))
            .map_err(storage_err)?;

        wtxn.commit().map_err(storage_err)?;

        Ok(Self {
            env,
            nodes_db,
            edges_db,
            users_db,
            statuses_db,
        })
    }

    pub fn get_node(&self, node_id: &str) -> Result<Option<Node>> {
        let rtxn = self.env.read_txn().map_err(storage_err)?;
        match self.nodes_db.get(&rtxn, node_id).map_err(storage_err)? {
            Some(data) => Ok(Some(decode(data)?)),
            None => Ok(None),
        }
    }

    pub fn get_status(&self, user_id: &str, node_id: &str) -> Result<Option<NodeStatusForUser>> {
        let rtxn = self.env.read_txn().map_err(storage_err)?;
        let key = status_key(user_id, node_id);
        match self.statuses_db.get(&rtxn, &key).map_err(storage_err)? {
            Some(data) => Ok(Some(decode(data)?)),
            None => Ok(None),
        }
    }
}

impl GraphStore for LmdbStorage {
    fn load_nodes(&self) -> Result<Vec<Node>> {
        let rtxn = self.env.read_txn().map_err(storage_err)?;
        let mut nodes = Vec::new();
        for result in self.nodes_db.iter(&rtxn).map_err(storage_err)? {
            let (_, data) = result.map_err(storage_err)?;
            nodes.push(decode(data)?);
        }
        Ok(nodes)
    }

    fn load_edges(&self) -> Result<Vec<Edge>> {
        let rtxn = self.env.read_txn().map_err(storage_err)?;
        let mut edges = Vec::new();
        for result in self.edges_db.iter(&rtxn).map_err(storage_err)? {
            let (_, data) = result.map_err(storage_err)?;
            edges.push(decode(data)?);
        }
        Ok(edges)
    }
}

impl StatusStore for LmdbStorage {
    fn statuses_for_user(&self, user_id: &str) -> Result<Vec<NodeStatusForUser>> {
        let rtxn = self.env.read_txn().map_err(storage_err)?;
        if self.users_db.get(&rtxn, user_id).map_err(storage_err)?.is_none() {
            return Err(Error::UserNotFound(user_id.to_string()));
        }

        let prefix = user_prefix(user_id);
        let mut statuses = Vec::new();
        for result in self
            .statuses_db
            .prefix_iter(&rtxn, prefix.as_str())
            .map_err(storage_err)?
        {
            let (_, data) = result.map_err(storage_err)?;
            statuses.push(decode(data)?);
        }
        Ok(statuses)
    }

    fn upsert_status(&self, status: &NodeStatusForUser) -> Result<()> {
        validate_id(&status.node_id)?;

        let mut wtxn = self.env.write_txn().map_err(storage_err)?;
        if self
            .users_db
            .get(&wtxn, &status.user_id)
            .map_err(storage_err)?
            .is_none()
        {
            return Err(Error::UserNotFound(status.user_id.clone()));
        }

        let key = status_key(&status.user_id, &status.node_id);
        self.statuses_db
            .put(&mut wtxn, &key, &encode(status)?)
            .map_err(storage_err)?;
        wtxn.commit().map_err(storage_err)?;
        Ok(())
    }
}

impl Storage for LmdbStorage {
    fn put_node(&self, node: &Node) -> Result<()> {
        validate_id(&node.id)?;
        let mut wtxn = self.env.write_txn().map_err(storage_err)?;
        self.nodes_db
            .put(&mut wtxn, &node.id, &encode(node)?)
            .map_err(storage_err)?;
        wtxn.commit().map_err(storage_err)?;
        Ok(())
    }

    fn append_edge(&self, edge: &Edge) -> Result<()> {
        validate_edge(edge)?;
        let mut wtxn = self.env.write_txn().map_err(storage_err)?;
        let next = self
            .edges_db
            .last(&wtxn)
            .map_err(storage_err)?
            .map(|(seq, _)| seq + 1)
            .unwrap_or(0);
        self.edges_db
            .put(&mut wtxn, &next, &encode(edge)?)
            .map_err(storage_err)?;
        wtxn.commit().map_err(storage_err)?;
        Ok(())
    }

    fn replace_graph(&self, nodes: &[Node], edges: &[Edge]) -> Result<()> {
        for node in nodes {
            validate_id(&node.id)?;
        }
        for edge in edges {
            validate_edge(edge)?;
        }

        let mut wtxn = self.env.write_txn().map_err(storage_err)?;
        self.nodes_db.clear(&mut wtxn).map_err(storage_err)?;
        self.edges_db.clear(&mut wtxn).map_err(storage_err)?;

        for node in nodes {
            self.nodes_db
                .put(&mut wtxn, &node.id, &encode(node)?)
                .map_err(storage_err)?;
        }
        for (seq, edge) in edges.iter().enumerate() {
            self.edges_db
                .put(&mut wtxn, &(seq as u64), &encode(edge)?)
                .map_err(storage_err)?;
        }

        wtxn.commit().map_err(storage_err)?;
        Ok(())
    }

    fn create_user(&self, user_id: &str) -> Result<UserRecord> {
        validate_id(user_id)?;

        let mut wtxn = self.env.write_txn().map_err(storage_err)?;
        if self.users_db.get(&wtxn, user_id).map_err(storage_err)?.is_some() {
            return Err(Error::UserExists(user_id.to_string()));
        }

        let record = UserRecord {
            id: user_id.to_string(),
            created_at: Utc::now(),
        };
        self.users_db
            .put(&mut wtxn, user_id, &encode(&record)?)
            .map_err(storage_err)?;
        wtxn.commit().map_err(storage_err)?;
        Ok(record)
    }

    fn user_exists(&self, user_id: &str) -> Result<bool> {
        let rtxn = self.env.read_txn().map_err(storage_err)?;
        Ok(self.users_db.get(&rtxn, user_id).map_err(storage_err)?.is_some())
    }
}
