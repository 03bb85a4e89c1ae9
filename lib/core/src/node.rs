use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type NodeId = String;
pub type UserId = String;

/// Kind of learning material a node holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Lecture,
    Example,
    Assignment,
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeType::Lecture => write!(f, "lecture"),
            NodeType::Example => write!(f, "example"),
            NodeType::Assignment => write!(f, "assignment"),
        }
    }
}

impl std::str::FromStr for NodeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lecture" => Ok(NodeType::Lecture),
            "example" => Ok(NodeType::Example),
            "assignment" => Ok(NodeType::Assignment),
            _ => Err(format!("Unknown node type: {}", s)),
        }
    }
}

/// A topic in the knowledge graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub node_type: NodeType,
    pub locale: String,
    #[serde(default)]
    pub parent: Option<NodeId>,
}

impl Node {
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<NodeId>, name: impl Into<String>, node_type: NodeType, locale: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            node_type,
            locale: locale.into(),
            parent: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<NodeId>) -> Self {
        self.parent = Some(parent.into());
        self
    }
}

/// Prerequisite relation: `from` must be finished before `to` is eligible
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
}

impl Edge {
    #[inline]
    #[must_use]
    pub fn new(from: impl Into<NodeId>, to: impl Into<NodeId>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    #[default]
    Unseen,
    Started,
    Watched,
    Finished,
}

impl std::fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeStatus::Unseen => write!(f, "unseen"),
            NodeStatus::Started => write!(f, "started"),
            NodeStatus::Watched => write!(f, "watched"),
            NodeStatus::Finished => write!(f, "finished"),
        }
    }
}

impl std::str::FromStr for NodeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "" | "unseen" => Ok(NodeStatus::Unseen),
            "started" => Ok(NodeStatus::Started),
            "watched" => Ok(NodeStatus::Watched),
            "finished" => Ok(NodeStatus::Finished),
            _ => Err(format!("Unknown node status: {}", s)),
        }
    }
}

/// Progress of one user on one node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeStatusForUser {
    pub user_id: UserId,
    pub node_id: NodeId,
    pub status: NodeStatus,
    pub updated_at: DateTime<Utc>,
}

impl NodeStatusForUser {
    /// Status record stamped with the current time
    pub fn now(user_id: impl Into<UserId>, node_id: impl Into<NodeId>, status: NodeStatus) -> Self {
        Self {
            user_id: user_id.into(),
            node_id: node_id.into(),
            status,
            updated_at: Utc::now(),
        }
    }
}

/// Registered learner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub created_at: DateTime<Utc>,
}
