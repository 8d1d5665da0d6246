use crate::types::{EdgeKind, NodeId, RefGraph};
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use petgraph::Direction;

impl RefGraph {
    /// Outgoing neighbours in the order their edges were added
    pub fn successors(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut targets: Vec<NodeIndex> = self
            .graph
            .edges_directed(node, Direction::Outgoing)
            .map(|e| e.target())
            .collect();
        // petgraph walks adjacency lists newest-first
        targets.reverse();
        targets
    }

    /// Find all nodes the current node delegates to (outgoing Delegates edges)
    pub fn delegates(&self, node: NodeIndex) -> Vec<NodeIndex> {
        self.targets_by_kind(node, EdgeKind::Delegates)
    }

    /// Find all skills the current node uses (outgoing UsesSkill edges)
    pub fn skills_used(&self, node: NodeIndex) -> Vec<NodeIndex> {
        self.targets_by_kind(node, EdgeKind::UsesSkill)
    }

    fn targets_by_kind(&self, node: NodeIndex, kind: EdgeKind) -> Vec<NodeIndex> {
        let mut targets: Vec<NodeIndex> = self
            .graph
            .edges_directed(node, Direction::Outgoing)
            .filter(|e| *e.weight() == kind)
            .map(|e| e.target())
            .collect();
        targets.reverse();
        targets
    }

    /// True when some node has an edge into `id`
    pub fn is_referenced(&self, id: &NodeId) -> bool {
        self.find_node(id).is_some_and(|idx| {
            self.graph
                .edges_directed(idx, Direction::Incoming)
                .next()
                .is_some()
        })
    }

    pub fn ids(&self, nodes: &[NodeIndex]) -> Vec<NodeId> {
        nodes
            .iter()
            .filter_map(|&idx| self.node(idx).cloned())
            .collect()
    }
}
