//! # learngraph
//!
//! Backend core of a learning platform built around a knowledge graph:
//! learners move through a DAG of topics, and every topic lists the topics
//! that must be finished before it can be started.
//!
//! ## Quick Start
//!
//! ### As a Server
//!
//! ```bash
//! learngraph --data-dir ./data --seed graph.json.gz --http-port 8080
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use learngraph::prelude::*;
//! use std::sync::Arc;
//!
//! let storage = Arc::new(StorageManager::new("./data").unwrap());
//! let graph = Arc::new(storage.load_graph().unwrap());
//! let tracker = ProgressTracker::new(graph, storage.clone());
//!
//! storage.create_user("ada").unwrap();
//! tracker.finish_with_prerequisites("ada", "recursion").unwrap();
//! let progress = tracker.classify_nodes("ada").unwrap();
//! println!("next up: {:?}", progress.next);
//! ```
//!
//! ## Crate Structure
//!
//! - `learngraph-core` - Graph model, progression and frontend projection
//! - `learngraph-storage` - LMDB persistence and graph seed files
//! - `learngraph-api` - REST API

// Re-export core types
pub use learngraph_core::{
    project, status_map,
    Edge, Node, NodeId, NodeStatus, NodeStatusForUser, NodeType, UserId, UserRecord,
    KnowledgeGraph, Progress, ProgressTracker, StatusMap,
    FrontendGraph, FrontendLink, FrontendNode,
    GraphStore, StatusStore,
    Error, Result,
};

// Re-export storage
pub use learngraph_storage::{GraphSeed, SeedSummary, StorageManager};

// Re-export API
pub use learngraph_api::RestApi;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Edge, Node, NodeStatus, NodeStatusForUser, NodeType,
        KnowledgeGraph, Progress, ProgressTracker,
        FrontendGraph,
        GraphStore, StatusStore,
        Error, Result,
        StorageManager, GraphSeed,
        RestApi,
    };
}
