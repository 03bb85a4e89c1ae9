use crate::projector::{project, FrontendGraph};
use crate::store::StatusStore;
use crate::{Error, KnowledgeGraph, Node, NodeId, NodeStatus, NodeStatusForUser, Result};
use ahash::{AHashMap, AHashSet};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Status records of one user keyed by node id
pub type StatusMap = AHashMap<NodeId, NodeStatusForUser>;

/// Index status records by node id. Later records replace earlier ones.
pub fn status_map<I>(statuses: I) -> StatusMap
where
    I: IntoIterator<Item = NodeStatusForUser>,
{
    statuses
        .into_iter()
        .map(|status| (status.node_id.clone(), status))
        .collect()
}

/// Nodes a user is working on and nodes they may start next.
/// Neither list has a meaningful order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Progress {
    pub in_progress: Vec<Node>,
    pub next: Vec<Node>,
}

impl KnowledgeGraph {
    /// True when every direct prerequisite of `node_id` is finished in
    /// `statuses`. Nodes without prerequisites are always eligible.
    pub fn has_finished_all_prerequisites(&self, node_id: &str, statuses: &StatusMap) -> bool {
        if !self.has_prerequisite_entry(node_id) {
            return true;
        }

        self.direct_prerequisites(node_id).iter().all(|prereq| {
            statuses
                .get(prereq)
                .is_some_and(|s| s.status == NodeStatus::Finished)
        })
    }

    /// Split the graph into in-progress nodes and nodes eligible to start.
    pub fn classify(&self, statuses: &StatusMap) -> Progress {
        let mut progress = Progress::default();

        for node in self.nodes() {
            match statuses.get(&node.id).map(|s| s.status) {
                Some(NodeStatus::Started) | Some(NodeStatus::Watched) => {
                    progress.in_progress.push(node.clone());
                }
                None | Some(NodeStatus::Unseen) => {
                    if self.has_finished_all_prerequisites(&node.id, statuses) {
                        progress.next.push(node.clone());
                    }
                }
                Some(NodeStatus::Finished) => {}
            }
        }

        progress
    }

    /// Every node `node_id` transitively depends on, in topological order,
    /// ending with `node_id` itself.
    pub fn prerequisite_closure<'a>(&'a self, node_id: &'a str) -> Vec<NodeId> {
        let mut visited: AHashSet<&str> = AHashSet::new();
        let mut order = Vec::new();

        visited.insert(node_id);
        let mut stack: Vec<(&str, usize)> = vec![(node_id, 0)];

        while let Some(&(current, index)) = stack.last() {
            match self.direct_prerequisites(current).get(index) {
                Some(next) => {
                    if let Some(top) = stack.last_mut() {
                        top.1 += 1;
                    }
                    if visited.insert(next.as_str()) {
                        stack.push((next.as_str(), 0));
                    }
                }
                None => {
                    order.push(current.to_string());
                    stack.pop();
                }
            }
        }

        order
    }
}

/// Per-request progression queries over a shared graph and a status store.
pub struct ProgressTracker {
    graph: Arc<KnowledgeGraph>,
    statuses: Arc<dyn StatusStore>,
}

impl ProgressTracker {
    pub fn new(graph: Arc<KnowledgeGraph>, statuses: Arc<dyn StatusStore>) -> Self {
        Self { graph, statuses }
    }

    #[inline]
    pub fn graph(&self) -> &KnowledgeGraph {
        &self.graph
    }

    pub fn status_map(&self, user_id: &str) -> Result<StatusMap> {
        Ok(status_map(self.statuses.statuses_for_user(user_id)?))
    }

    pub fn classify_nodes(&self, user_id: &str) -> Result<Progress> {
        let statuses = self.status_map(user_id)?;
        let progress = self.graph.classify(&statuses);
        debug!(
            user_id,
            in_progress = progress.in_progress.len(),
            next = progress.next.len(),
            "classified nodes"
        );
        Ok(progress)
    }

    /// Record a single status change
    pub fn set_status(&self, user_id: &str, node_id: &str, status: NodeStatus) -> Result<NodeStatusForUser> {
        if !self.graph.contains(node_id) {
            return Err(Error::NodeNotFound(node_id.to_string()));
        }

        let record = NodeStatusForUser::now(user_id, node_id, status);
        self.statuses.upsert_status(&record)?;
        Ok(record)
    }

    /// Mark `node_id` and its whole prerequisite closure as finished.
    ///
    /// Writes are not transactional: the first failing write stops the loop
    /// and earlier writes stay in place. Repeating the call is safe.
    pub fn finish_with_prerequisites(&self, user_id: &str, node_id: &str) -> Result<Vec<NodeId>> {
        if !self.graph.contains(node_id) {
            return Err(Error::NodeNotFound(node_id.to_string()));
        }

        let closure = self.graph.prerequisite_closure(node_id);
        for id in &closure {
            let record = NodeStatusForUser::now(user_id, id.as_str(), NodeStatus::Finished);
            if let Err(e) = self.statuses.upsert_status(&record) {
                warn!(user_id, node_id = %id, error = %e, "status write failed during bulk finish");
                return Err(Error::StatusWrite {
                    user_id: user_id.to_string(),
                    node_id: id.clone(),
                    source: Box::new(e),
                });
            }
        }

        debug!(user_id, node_id, finished = closure.len(), "finished prerequisite closure");
        Ok(closure)
    }

    /// Frontend view of `locale`, with the user's statuses when one is given
    pub fn project(&self, locale: &str, user_id: Option<&str>) -> Result<FrontendGraph> {
        let statuses = match user_id {
            Some(user_id) => self.status_map(user_id)?,
            None => StatusMap::new(),
        };
        Ok(project(&self.graph, locale, &statuses))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Edge, NodeType};
    use chrono::Utc;
    use parking_lot::Mutex;
    use std::collections::HashSet;

    fn chain() -> KnowledgeGraph {
        KnowledgeGraph::build(
            vec![
                Node::new("A", "Alpha", NodeType::Lecture, "en"),
                Node::new("B", "Beta", NodeType::Example, "en"),
                Node::new("C", "Gamma", NodeType::Assignment, "en"),
            ],
            vec![Edge::new("A", "B"), Edge::new("B", "C")],
        )
        .unwrap()
    }

    fn statuses(entries: &[(&str, NodeStatus)]) -> StatusMap {
        status_map(entries.iter().map(|(node, status)| NodeStatusForUser {
            user_id: "u1".to_string(),
            node_id: node.to_string(),
            status: *status,
            updated_at: Utc::now(),
        }))
    }

    fn ids(nodes: &[Node]) -> Vec<&str> {
        let mut ids: Vec<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
        ids.sort_unstable();
        ids
    }

    /// Records writes; fails once the configured number of writes succeeded
    struct FlakyStore {
        written: Mutex<Vec<NodeStatusForUser>>,
        fail_after: usize,
    }

    impl StatusStore for FlakyStore {
        fn statuses_for_user(&self, user_id: &str) -> Result<Vec<NodeStatusForUser>> {
            Ok(self
                .written
                .lock()
                .iter()
                .filter(|s| s.user_id == user_id)
                .cloned()
                .collect())
        }

        fn upsert_status(&self, status: &NodeStatusForUser) -> Result<()> {
            let mut written = self.written.lock();
            if written.len() >= self.fail_after {
                return Err(Error::Storage("disk full".to_string()));
            }
            written.push(status.clone());
            Ok(())
        }
    }

    #[test]
    fn test_no_prerequisites_is_always_eligible() {
        let graph = chain();
        let any = statuses(&[("B", NodeStatus::Started), ("C", NodeStatus::Finished)]);
        assert!(graph.has_finished_all_prerequisites("A", &any));
        assert!(graph.has_finished_all_prerequisites("A", &StatusMap::new()));
        assert!(graph.has_finished_all_prerequisites("unknown", &StatusMap::new()));
    }

    #[test]
    fn test_prerequisites_must_all_be_finished() {
        let graph = KnowledgeGraph::build(
            vec![
                Node::new("A", "A", NodeType::Lecture, "en"),
                Node::new("B", "B", NodeType::Lecture, "en"),
                Node::new("C", "C", NodeType::Lecture, "en"),
            ],
            vec![Edge::new("A", "C"), Edge::new("B", "C")],
        )
        .unwrap();

        assert!(!graph.has_finished_all_prerequisites("C", &StatusMap::new()));
        assert!(!graph.has_finished_all_prerequisites("C", &statuses(&[("A", NodeStatus::Finished)])));
        assert!(!graph.has_finished_all_prerequisites(
            "C",
            &statuses(&[("A", NodeStatus::Finished), ("B", NodeStatus::Watched)])
        ));
        assert!(graph.has_finished_all_prerequisites(
            "C",
            &statuses(&[("A", NodeStatus::Finished), ("B", NodeStatus::Finished)])
        ));
    }

    #[test]
    fn test_classify_after_first_node_finished() {
        let progress = chain().classify(&statuses(&[("A", NodeStatus::Finished)]));
        assert!(progress.in_progress.is_empty());
        assert_eq!(ids(&progress.next), ["B"]);
    }

    #[test]
    fn test_classify_with_started_node() {
        let progress = chain().classify(&statuses(&[
            ("A", NodeStatus::Finished),
            ("B", NodeStatus::Started),
        ]));
        assert_eq!(ids(&progress.in_progress), ["B"]);
        assert!(progress.next.is_empty());
    }

    #[test]
    fn test_classify_unseen_counts_as_no_status() {
        let progress = chain().classify(&statuses(&[("A", NodeStatus::Unseen)]));
        assert!(progress.in_progress.is_empty());
        assert_eq!(ids(&progress.next), ["A"]);
    }

    #[test]
    fn test_classify_never_overlaps() {
        let graph = chain();
        let cases = [
            statuses(&[]),
            statuses(&[("A", NodeStatus::Watched)]),
            statuses(&[("A", NodeStatus::Finished), ("B", NodeStatus::Finished), ("C", NodeStatus::Started)]),
            statuses(&[("A", NodeStatus::Finished), ("B", NodeStatus::Unseen)]),
        ];

        for case in &cases {
            let progress = graph.classify(case);
            let in_progress: HashSet<&str> = progress.in_progress.iter().map(|n| n.id.as_str()).collect();
            assert!(progress.next.iter().all(|n| !in_progress.contains(n.id.as_str())));
        }
    }

    #[test]
    fn test_closure_is_topological() {
        assert_eq!(chain().prerequisite_closure("C"), ["A", "B", "C"]);
        assert_eq!(chain().prerequisite_closure("A"), ["A"]);
    }

    #[test]
    fn test_closure_visits_diamond_once() {
        let graph = KnowledgeGraph::build(
            ["root", "left", "right", "top"]
                .iter()
                .map(|id| Node::new(*id, *id, NodeType::Lecture, "en")),
            vec![
                Edge::new("root", "left"),
                Edge::new("root", "right"),
                Edge::new("left", "top"),
                Edge::new("right", "top"),
            ],
        )
        .unwrap();

        let closure = graph.prerequisite_closure("top");
        assert_eq!(closure, ["root", "left", "right", "top"]);

        let unique: HashSet<&String> = closure.iter().collect();
        assert_eq!(unique.len(), closure.len());
    }

    #[test]
    fn test_finish_with_prerequisites_writes_closure() {
        let store = Arc::new(FlakyStore {
            written: Mutex::new(Vec::new()),
            fail_after: usize::MAX,
        });
        let tracker = ProgressTracker::new(Arc::new(chain()), store.clone());

        let finished = tracker.finish_with_prerequisites("u1", "C").unwrap();
        assert_eq!(finished, ["A", "B", "C"]);

        let written = store.written.lock();
        assert_eq!(written.len(), 3);
        assert!(written.iter().all(|s| s.status == NodeStatus::Finished && s.user_id == "u1"));
    }

    #[test]
    fn test_finish_with_prerequisites_keeps_partial_writes() {
        let store = Arc::new(FlakyStore {
            written: Mutex::new(Vec::new()),
            fail_after: 1,
        });
        let tracker = ProgressTracker::new(Arc::new(chain()), store.clone());

        match tracker.finish_with_prerequisites("u1", "C") {
            Err(Error::StatusWrite { user_id, node_id, .. }) => {
                assert_eq!(user_id, "u1");
                assert_eq!(node_id, "B");
            }
            other => panic!("expected status write error, got {:?}", other),
        }

        let written = store.written.lock();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].node_id, "A");
    }

    #[test]
    fn test_unknown_node_is_rejected() {
        let store = Arc::new(FlakyStore {
            written: Mutex::new(Vec::new()),
            fail_after: usize::MAX,
        });
        let tracker = ProgressTracker::new(Arc::new(chain()), store);

        assert!(matches!(
            tracker.finish_with_prerequisites("u1", "Z"),
            Err(Error::NodeNotFound(_))
        ));
        assert!(matches!(
            tracker.set_status("u1", "Z", NodeStatus::Started),
            Err(Error::NodeNotFound(_))
        ));
    }
}
