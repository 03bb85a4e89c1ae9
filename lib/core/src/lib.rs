//! # learngraph Core
//!
//! Core library for the learngraph learning platform backend.
//!
//! This crate provides the in-memory model and the progression logic:
//!
//! - [`KnowledgeGraph`] - Immutable prerequisite DAG of learning nodes
//! - [`ProgressTracker`] - Next-eligible / in-progress classification and bulk finishing
//! - [`project`] - Per-locale frontend view with user statuses overlaid
//! - [`GraphStore`] / [`StatusStore`] - Persistence seams implemented by `learngraph-storage`
//!
//! ## Example
//!
//! ```rust
//! use learngraph_core::{Edge, KnowledgeGraph, Node, NodeStatus, NodeStatusForUser, NodeType, status_map};
//!
//! let graph = KnowledgeGraph::build(
//!     vec![
//!         Node::new("A", "Variables", NodeType::Lecture, "en"),
//!         Node::new("B", "Loops", NodeType::Lecture, "en"),
//!     ],
//!     vec![Edge::new("A", "B")],
//! ).unwrap();
//!
//! let statuses = status_map(vec![NodeStatusForUser::now("u1", "A", NodeStatus::Finished)]);
//! let progress = graph.classify(&statuses);
//! assert_eq!(progress.next[0].id, "B");
//!
//! assert_eq!(graph.prerequisite_closure("B"), ["A", "B"]);
//! ```

pub mod error;
pub mod graph;
pub mod node;
pub mod progress;
pub mod projector;
pub mod store;

pub use error::{Error, Result};
pub use graph::KnowledgeGraph;
pub use node::{Edge, Node, NodeId, NodeStatus, NodeStatusForUser, NodeType, UserId, UserRecord};
pub use progress::{status_map, Progress, ProgressTracker, StatusMap};
pub use projector::{project, FrontendGraph, FrontendLink, FrontendNode};
pub use store::{GraphStore, StatusStore};

