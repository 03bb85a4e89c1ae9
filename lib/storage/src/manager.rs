use crate::backend::Storage;
use crate::lmdb_storage::LmdbStorage;
use crate::memory::MemoryStore;
use crate::seed::{GraphSeed, SeedSummary};
use learngraph_core::{
    Edge, GraphStore, KnowledgeGraph, Node, NodeStatusForUser, Result, StatusStore, UserRecord,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Owns the storage backend and builds the knowledge graph from it
pub struct StorageManager {
    backend: Arc<dyn Storage>,
    data_dir: Option<PathBuf>,
}

impl StorageManager {
    /// Open (or create) the LMDB environment under `data_dir`
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&data_dir)?;

        let lmdb = LmdbStorage::new(data_dir.join("lmdb"))?;
        info!("Opened LMDB storage at {:?}", data_dir.join("lmdb"));

        Ok(Self {
            backend: Arc::new(lmdb),
            data_dir: Some(data_dir),
        })
    }

    /// Storage that lives only as long as the process
    pub fn in_memory() -> Self {
        Self::with_backend(Arc::new(MemoryStore::new()))
    }

    pub fn with_backend(backend: Arc<dyn Storage>) -> Self {
        Self {
            backend,
            data_dir: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }

    /// Replace the stored graph with the contents of a seed file
    pub fn import_seed<P: AsRef<Path>>(&self, path: P) -> Result<SeedSummary> {
        let seed = GraphSeed::load(&path)?;
        self.import(&seed)
    }

    pub fn import(&self, seed: &GraphSeed) -> Result<SeedSummary> {
        self.backend.replace_graph(&seed.nodes, &seed.edges)?;
        let summary = seed.summary();
        info!("Imported graph seed: {} nodes, {} edges", summary.nodes, summary.edges);
        Ok(summary)
    }

    /// Current contents of the store as a seed
    pub fn export(&self) -> Result<GraphSeed> {
        Ok(GraphSeed {
            nodes: self.backend.load_nodes()?,
            edges: self.backend.load_edges()?,
        })
    }

    /// Read all nodes and edges and build the in-memory graph
    pub fn load_graph(&self) -> Result<KnowledgeGraph> {
        let nodes = self.backend.load_nodes()?;
        let edges = self.backend.load_edges()?;
        let graph = KnowledgeGraph::build(nodes, edges)?;

        info!(
            "Knowledge graph loaded: {} nodes, {} edges",
            graph.len(),
            graph.edge_count()
        );
        if graph.dangling_edge_count() > 0 {
            warn!(
                "{} prerequisite edges reference unknown nodes",
                graph.dangling_edge_count()
            );
        }

        Ok(graph)
    }

    pub fn put_node(&self, node: &Node) -> Result<()> {
        self.backend.put_node(node)
    }

    pub fn append_edge(&self, edge: &Edge) -> Result<()> {
        self.backend.append_edge(edge)
    }

    pub fn create_user(&self, user_id: &str) -> Result<UserRecord> {
        let record = self.backend.create_user(user_id)?;
        info!("Registered user {}", user_id);
        Ok(record)
    }

    pub fn user_exists(&self, user_id: &str) -> Result<bool> {
        self.backend.user_exists(user_id)
    }
}

impl GraphStore for StorageManager {
    fn load_nodes(&self) -> Result<Vec<Node>> {
        self.backend.load_nodes()
    }

    fn load_edges(&self) -> Result<Vec<Edge>> {
        self.backend.load_edges()
    }
}

impl StatusStore for StorageManager {
    fn statuses_for_user(&self, user_id: &str) -> Result<Vec<NodeStatusForUser>> {
        self.backend.statuses_for_user(user_id)
    }

    fn upsert_status(&self, status: &NodeStatusForUser) -> Result<()> {
        self.backend.upsert_status(status)
    }
}
