use agentlint_protocol::ComponentKind;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Graph node identity shared by every check: `(kind, name)`, rendered as `kind:name`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId {
    pub kind: ComponentKind,
    pub name: String,
}

impl NodeId {
    pub fn new(kind: ComponentKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }

    pub fn agent(name: impl Into<String>) -> Self {
        Self::new(ComponentKind::Agent, name)
    }

    pub fn skill(name: impl Into<String>) -> Self {
        Self::new(ComponentKind::Skill, name)
    }

    pub fn command(name: impl Into<String>) -> Self {
        Self::new(ComponentKind::Command, name)
    }

    /// Parse `kind:name`.
    pub fn parse(raw: &str) -> Option<Self> {
        let (kind, name) = raw.split_once(':')?;
        let kind = kind.trim().parse().ok()?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some(Self::new(kind, name))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.name)
    }
}

/// Surface form a reference was recognized by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pattern {
    /// `Task(name)`
    TaskCall,
    /// `Skill: name`
    SkillLabel,
    /// `**Skill**: name`
    BoldSkillLabel,
    /// `Skill(name)`
    SkillCall,
    /// `Skills:` followed by `- name` bullets
    SkillsList,
    /// `delegate to name-specialist`
    DelegateToSpecialist,
    /// `use name-specialist`
    UseSpecialist,
    /// `see name-specialist`
    SeeSpecialist,
    /// `Task(name-specialist)`
    TaskSpecialist,
    /// `delegate via name`
    DelegateVia,
    /// `name-agent handles`
    AgentHandles,
    /// `SlashCommand(/name)`
    SlashCommand,
    /// `skills:` frontmatter list
    FrontmatterSkills,
    /// `agent:` frontmatter field
    FrontmatterAgent,
}

impl Pattern {
    /// How the reference looked in the source, for messages.
    pub fn syntax(&self, name: &str) -> String {
        match self {
            Self::TaskCall | Self::TaskSpecialist => format!("Task({name})"),
            Self::SkillLabel => format!("Skill: {name}"),
            Self::BoldSkillLabel => format!("**Skill**: {name}"),
            Self::SkillCall => format!("Skill({name})"),
            Self::SkillsList => format!("Skills: - {name}"),
            Self::DelegateToSpecialist => format!("delegate to {name}"),
            Self::UseSpecialist => format!("use {name}"),
            Self::SeeSpecialist => format!("see {name}"),
            Self::DelegateVia => format!("delegate via {name}"),
            Self::AgentHandles => format!("{name} handles"),
            Self::SlashCommand => format!("SlashCommand(/{name})"),
            Self::FrontmatterSkills => format!("frontmatter skills: {name}"),
            Self::FrontmatterAgent => format!("frontmatter agent: {name}"),
        }
    }

    /// Whether a resolved reference of this form becomes a graph edge. Agent mentions in skill
    /// bodies and the `agent:` binding of a skill are validated only.
    pub fn forms_edge(&self) -> bool {
        matches!(
            self,
            Self::TaskCall
                | Self::SkillLabel
                | Self::BoldSkillLabel
                | Self::SkillCall
                | Self::SkillsList
                | Self::FrontmatterSkills
                | Self::SlashCommand
        )
    }
}

/// One outgoing reference found in a component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub target: ComponentKind,
    pub name: String,
    pub pattern: Pattern,
    /// 1-based line in the component file
    pub line: usize,
}

impl Reference {
    pub fn new(target: ComponentKind, name: impl Into<String>, pattern: Pattern, line: usize) -> Self {
        Self {
            target,
            name: name.into(),
            pattern,
            line,
        }
    }

    pub fn target_id(&self) -> NodeId {
        NodeId::new(self.target, self.name.clone())
    }

    pub fn syntax(&self) -> String {
        self.pattern.syntax(&self.name)
    }
}

/// Type of relationship between components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeKind {
    /// Delegates work to an agent
    Delegates,

    /// Uses or preloads a skill
    UsesSkill,

    /// Invokes a slash command
    InvokesCommand,
}

impl EdgeKind {
    pub fn for_target(kind: ComponentKind) -> Self {
        match kind {
            ComponentKind::Agent => Self::Delegates,
            ComponentKind::Skill => Self::UsesSkill,
            ComponentKind::Command => Self::InvokesCommand,
        }
    }
}

/// Directed reference graph over resolved references
#[derive(Debug, Clone, Default)]
pub struct RefGraph {
    /// Directed graph (component -> component)
    pub graph: DiGraph<NodeId, EdgeKind>,

    /// NodeId -> NodeIndex mapping for fast lookup
    pub node_index: HashMap<NodeId, NodeIndex>,
}

impl RefGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the index for `id`, adding the node on first sight.
    pub fn ensure_node(&mut self, id: NodeId) -> NodeIndex {
        if let Some(&idx) = self.node_index.get(&id) {
            return idx;
        }
        let idx = self.graph.add_node(id.clone());
        self.node_index.insert(id, idx);
        idx
    }

    /// Add edge unless an identical one already exists. Returns true when added.
    pub fn add_edge(&mut self, from: NodeIndex, to: NodeIndex, kind: EdgeKind) -> bool {
        if self.graph.find_edge(from, to).is_some() {
            return false;
        }
        self.graph.add_edge(from, to, kind);
        true
    }

    pub fn find_node(&self, id: &NodeId) -> Option<NodeIndex> {
        self.node_index.get(id).copied()
    }

    pub fn node(&self, idx: NodeIndex) -> Option<&NodeId> {
        self.graph.node_weight(idx)
    }

    /// All nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &NodeId)> {
        self.graph
            .node_indices()
            .filter_map(move |idx| self.graph.node_weight(idx).map(|node| (idx, node)))
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}
