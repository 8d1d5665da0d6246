use crate::extract::ReferenceExtractor;
use crate::types::{EdgeKind, NodeId, RefGraph};
use agentlint_indexer::ComponentIndex;
use agentlint_protocol::ComponentKind;

/// Build the reference graph from an index
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphBuilder {
    extractor: ReferenceExtractor,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nodes are components taking part in at least one resolved reference; references to
    /// components that are not indexed never become edges.
    ///
    /// Edges come from agents and commands only: `Task(...)` delegation, the skill-usage forms,
    /// frontmatter `skills` and `SlashCommand(/...)`. Skills are leaves.
    pub fn build(&self, index: &ComponentIndex) -> RefGraph {
        let mut graph = RefGraph::new();

        for component in index.iter() {
            if component.name().is_empty() || component.kind() == ComponentKind::Skill {
                continue;
            }
            let source = NodeId::new(component.kind(), component.name());

            for reference in self.extractor.extract(component) {
                if !reference.pattern.forms_edge()
                    || !index.contains(reference.target, &reference.name)
                {
                    continue;
                }
                let from = graph.ensure_node(source.clone());
                let to = graph.ensure_node(reference.target_id());
                graph.add_edge(from, to, EdgeKind::for_target(reference.target));
            }
        }

        log::debug!(
            "Built reference graph: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );

        graph
    }
}
