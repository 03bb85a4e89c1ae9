// Client-facing view of the graph for a single locale
use crate::progress::StatusMap;
use crate::{KnowledgeGraph, NodeId, NodeStatus, NodeType};
use ahash::AHashSet;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrontendNode {
    pub id: NodeId,
    pub name: String,
    pub description: String,
    pub node_type: NodeType,
    pub parent: Option<NodeId>,
    pub status: NodeStatus,
}

/// Prerequisite link from `source` to the node that depends on it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrontendLink {
    pub source: NodeId,
    pub target: NodeId,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrontendGraph {
    pub nodes: Vec<FrontendNode>,
    pub links: Vec<FrontendLink>,
    /// Edges left out because an endpoint is outside the projected node set
    #[serde(skip)]
    pub dropped_links: usize,
}

/// Project the nodes of `locale` with the given statuses overlaid.
///
/// Nodes are sorted by id. Links are emitted only when both endpoints are in
/// the projected set; everything else is counted in `dropped_links`.
pub fn project(graph: &KnowledgeGraph, locale: &str, statuses: &StatusMap) -> FrontendGraph {
    let mut nodes: Vec<FrontendNode> = graph
        .nodes()
        .filter(|node| node.locale == locale)
        .map(|node| FrontendNode {
            id: node.id.clone(),
            name: node.name.clone(),
            description: node.description.clone(),
            node_type: node.node_type,
            parent: node.parent.clone(),
            status: statuses.get(&node.id).map(|s| s.status).unwrap_or_default(),
        })
        .collect();
    nodes.sort_unstable_by(|a, b| a.id.cmp(&b.id));

    let kept: AHashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();

    let mut links = Vec::new();
    for node in &nodes {
        for prereq in graph.direct_prerequisites(&node.id) {
            if kept.contains(prereq.as_str()) {
                links.push(FrontendLink {
                    source: prereq.clone(),
                    target: node.id.clone(),
                });
            }
        }
    }

    let dropped_links = graph.edge_count().saturating_sub(links.len());

    FrontendGraph {
        nodes,
        links,
        dropped_links,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::status_map;
    use crate::{Edge, Node, NodeStatusForUser};

    fn mixed_locales() -> KnowledgeGraph {
        KnowledgeGraph::build(
            vec![
                Node::new("A", "Alpha", NodeType::Lecture, "en").with_description("first"),
                Node::new("B", "Beta", NodeType::Example, "en").with_parent("A"),
                Node::new("C", "Gamma", NodeType::Assignment, "de"),
            ],
            vec![Edge::new("A", "B"), Edge::new("B", "C"), Edge::new("A", "C")],
        )
        .unwrap()
    }

    #[test]
    fn test_locale_filter_drops_cross_locale_links() {
        let view = project(&mixed_locales(), "en", &StatusMap::new());

        let ids: Vec<&str> = view.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["A", "B"]);
        assert_eq!(
            view.links,
            vec![FrontendLink {
                source: "A".to_string(),
                target: "B".to_string()
            }]
        );
        assert_eq!(view.dropped_links, 2);
    }

    #[test]
    fn test_links_only_reference_projected_nodes() {
        let graph = mixed_locales();
        for locale in ["en", "de", "fr"] {
            let view = project(&graph, locale, &StatusMap::new());
            let ids: AHashSet<&str> = view.nodes.iter().map(|n| n.id.as_str()).collect();
            for link in &view.links {
                assert!(ids.contains(link.source.as_str()));
                assert!(ids.contains(link.target.as_str()));
            }
        }
    }

    #[test]
    fn test_status_overlay_defaults_to_unseen() {
        let statuses = status_map(vec![NodeStatusForUser::now("u1", "B", NodeStatus::Watched)]);
        let view = project(&mixed_locales(), "en", &statuses);

        assert_eq!(view.nodes[0].status, NodeStatus::Unseen);
        assert_eq!(view.nodes[1].status, NodeStatus::Watched);
        assert_eq!(view.nodes[1].parent.as_deref(), Some("A"));
        assert_eq!(view.nodes[0].description, "first");
    }

    #[test]
    fn test_dropped_links_are_not_serialized() {
        let view = project(&mixed_locales(), "en", &StatusMap::new());
        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("dropped_links").is_none());
        assert_eq!(json["nodes"][0]["node_type"], "lecture");
    }
}
