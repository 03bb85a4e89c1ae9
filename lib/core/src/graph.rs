// Prerequisite graph of learning nodes
use crate::{Edge, Error, Node, NodeId, Result};
use ahash::AHashMap;

/// Directed acyclic graph of learning nodes.
///
/// `prerequisites` maps a node to its direct prerequisites, in the order the
/// edges were supplied. The graph is immutable once built; share it behind an
/// `Arc` and rebuild from the store to pick up changes.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeGraph {
    nodes: AHashMap<NodeId, Node>,
    prerequisites: AHashMap<NodeId, Vec<NodeId>>,
    edge_count: usize,
    dangling_edges: usize,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

impl KnowledgeGraph {
    /// Build the graph from node records and prerequisite edges.
    ///
    /// Duplicate node ids keep the last record. Edges whose endpoints are not
    /// known nodes are kept in `prerequisites` and counted as dangling.
    /// Returns [`Error::CycleDetected`] if the edges contain a cycle.
    pub fn build<N, E>(nodes: N, edges: E) -> Result<Self>
    where
        N: IntoIterator<Item = Node>,
        E: IntoIterator<Item = Edge>,
    {
        let mut node_map = AHashMap::new();
        for node in nodes {
            node_map.insert(node.id.clone(), node);
        }

        let mut prerequisites: AHashMap<NodeId, Vec<NodeId>> = AHashMap::new();
        let mut edge_count = 0;
        let mut dangling_edges = 0;
        for edge in edges {
            edge_count += 1;
            if !node_map.contains_key(&edge.from) || !node_map.contains_key(&edge.to) {
                dangling_edges += 1;
            }
            prerequisites.entry(edge.to).or_default().push(edge.from);
        }

        let graph = Self {
            nodes: node_map,
            prerequisites,
            edge_count,
            dangling_edges,
        };

        if let Some(path) = graph.find_cycle() {
            return Err(Error::CycleDetected { path });
        }

        Ok(graph)
    }

    #[inline]
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    #[inline]
    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// All nodes, in no particular order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Direct prerequisites of `id`, empty when it has none
    #[inline]
    pub fn direct_prerequisites(&self, id: &str) -> &[NodeId] {
        self.prerequisites.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    #[inline]
    pub(crate) fn has_prerequisite_entry(&self, id: &str) -> bool {
        self.prerequisites.contains_key(id)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Number of edges with at least one endpoint that is not a known node
    #[inline]
    #[must_use]
    pub fn dangling_edge_count(&self) -> usize {
        self.dangling_edges
    }

    /// Three-colour DFS over the prerequisite relation. Returns the first
    /// cycle found as a path that starts and ends on the same node.
    fn find_cycle(&self) -> Option<Vec<NodeId>> {
        let mut marks: AHashMap<&str, Mark> = AHashMap::new();

        let mut roots: Vec<&str> = self.prerequisites.keys().map(String::as_str).collect();
        roots.sort_unstable();

        for root in roots {
            if marks.contains_key(root) {
                continue;
            }

            marks.insert(root, Mark::InProgress);
            let mut stack: Vec<(&str, usize)> = vec![(root, 0)];

            while let Some(&(current, index)) = stack.last() {
                let prereqs = self.direct_prerequisites(current);
                let Some(next) = prereqs.get(index) else {
                    marks.insert(current, Mark::Done);
                    stack.pop();
                    continue;
                };

                if let Some(top) = stack.last_mut() {
                    top.1 += 1;
                }

                match marks.get(next.as_str()) {
                    Some(Mark::InProgress) => {
                        let start = stack
                            .iter()
                            .position(|(id, _)| *id == next.as_str())
                            .unwrap_or(0);
                        let mut path: Vec<NodeId> =
                            stack[start..].iter().map(|(id, _)| id.to_string()).collect();
                        path.push(next.clone());
                        return Some(path);
                    }
                    Some(Mark::Done) => {}
                    None => {
                        marks.insert(next.as_str(), Mark::InProgress);
                        stack.push((next.as_str(), 0));
                    }
                }
            }
        }

        None
    }
}
