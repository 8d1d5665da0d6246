use crate::builder::GraphBuilder;
use crate::types::{NodeId, RefGraph};
use agentlint_indexer::{Component, ComponentIndex};
use agentlint_protocol::ComponentKind;
use serde::{Deserialize, Serialize};

/// One node of a chain trace: a component and everything it pulls in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainLink {
    pub kind: ComponentKind,
    pub name: String,
    pub path: String,
    pub line_count: usize,
    pub children: Vec<ChainLink>,
}

impl ChainLink {
    /// Levels in the tree, counting this node.
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(ChainLink::depth).max().unwrap_or(0)
    }

    pub fn label(&self) -> String {
        let unit = if self.line_count == 1 { "line" } else { "lines" };
        format!(
            "{}:{} ({}, {} {unit})",
            self.kind, self.name, self.path, self.line_count
        )
    }
}

/// Expands command -> agents -> skills.
///
/// Each level only follows edges into the next kind down, so agent-to-agent delegation is never
/// walked here and the recursion depth is at most three.
pub struct ChainTracer<'a> {
    index: &'a ComponentIndex,
    graph: RefGraph,
}

impl<'a> ChainTracer<'a> {
    pub fn new(index: &'a ComponentIndex) -> Self {
        Self {
            index,
            graph: GraphBuilder::new().build(index),
        }
    }

    /// `None` when `(kind, name)` is not indexed.
    pub fn trace(&self, kind: ComponentKind, name: &str) -> Option<ChainLink> {
        let component = self.index.get(kind, name)?;
        Some(self.link(component))
    }

    fn link(&self, component: &Component) -> ChainLink {
        let id = NodeId::new(component.kind(), component.name());
        // a component without resolved references has no node
        let children = match self.graph.find_node(&id) {
            Some(node) => {
                let next = match component.kind() {
                    ComponentKind::Command => self.graph.delegates(node),
                    ComponentKind::Agent => self.graph.skills_used(node),
                    ComponentKind::Skill => Vec::new(),
                };
                self.graph
                    .ids(&next)
                    .iter()
                    .filter_map(|child| self.trace(child.kind, &child.name))
                    .collect()
            }
            None => Vec::new(),
        };

        ChainLink {
            kind: component.kind(),
            name: component.name().to_string(),
            path: component.relative_path().to_string(),
            line_count: component.line_count(),
            children,
        }
    }
}

/// Render a trace as an indented tree, depth-first, children in discovery order.
pub fn render_chain(root: &ChainLink) -> String {
    let mut out = String::new();
    out.push_str(&root.label());
    out.push('\n');
    render_children(&root.children, "", &mut out);
    out
}

fn render_children(children: &[ChainLink], prefix: &str, out: &mut String) {
    for (idx, child) in children.iter().enumerate() {
        let last = idx + 1 == children.len();
        out.push_str(prefix);
        out.push_str(if last { "└── " } else { "├── " });
        out.push_str(&child.label());
        out.push('\n');

        let nested = format!("{prefix}{}", if last { "    " } else { "│   " });
        render_children(&child.children, &nested, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentlint_indexer::DiscoveredFile;
    use pretty_assertions::assert_eq;

    fn index(files: &[(ComponentKind, &str, &str)]) -> ComponentIndex {
        ComponentIndex::from_discovered(
            files
                .iter()
                .map(|(kind, path, body)| DiscoveredFile::new(*kind, *path, *body)),
        )
    }

    #[test]
    fn unknown_root_is_none() {
        let index = index(&[]);
        assert!(ChainTracer::new(&index).trace(ComponentKind::Command, "nope").is_none());
    }

    #[test]
    fn skips_unresolved_and_duplicate_children() {
        let index = index(&[
            (ComponentKind::Command, "commands/go.md", "Task(a)\nTask(a)\nTask(ghost)\nTask(b)"),
            (ComponentKind::Agent, "agents/a.md", "alpha"),
            (ComponentKind::Agent, "agents/b.md", "beta"),
        ]);
        let link = ChainTracer::new(&index)
            .trace(ComponentKind::Command, "go")
            .unwrap();
        let names: Vec<_> = link.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn renders_box_drawing_tree() {
        let index = index(&[
            (ComponentKind::Command, "commands/go.md", "Task(a)\nTask(b)"),
            (ComponentKind::Agent, "agents/a.md", "Skill: s\nSkill: t"),
            (ComponentKind::Agent, "agents/b.md", "b"),
            (ComponentKind::Skill, "skills/s/SKILL.md", "s"),
            (ComponentKind::Skill, "skills/t/SKILL.md", "t"),
        ]);
        let link = ChainTracer::new(&index)
            .trace(ComponentKind::Command, "go")
            .unwrap();
        assert_eq!(link.depth(), 3);
        assert_eq!(
            render_chain(&link),
            "command:go (commands/go.md, 2 lines)\n\
             ├── agent:a (agents/a.md, 2 lines)\n\
             │   ├── skill:s (skills/s/SKILL.md, 1 line)\n\
             │   └── skill:t (skills/t/SKILL.md, 1 line)\n\
             └── agent:b (agents/b.md, 1 line)\n"
        );
    }
}
