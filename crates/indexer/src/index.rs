use crate::component::{Component, DiscoveredFile};
use agentlint_protocol::ComponentKind;
use std::collections::BTreeMap;

/// Name -> component maps, one per kind.
///
/// Built once per run and never mutated afterwards, so it can be shared across
/// threads by reference.
#[derive(Debug, Clone, Default)]
pub struct ComponentIndex {
    agents: BTreeMap<String, Component>,
    skills: BTreeMap<String, Component>,
    commands: BTreeMap<String, Component>,
}

impl ComponentIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index components in discovery order; a later duplicate name replaces an earlier one.
    pub fn build(components: impl IntoIterator<Item = Component>) -> Self {
        let mut index = Self::new();
        for component in components {
            index.insert(component);
        }
        log::debug!(
            "Indexed {} agents, {} skills, {} commands",
            index.agents.len(),
            index.skills.len(),
            index.commands.len()
        );
        index
    }

    pub fn from_discovered(files: impl IntoIterator<Item = DiscoveredFile>) -> Self {
        Self::build(files.into_iter().map(Component::from_discovered))
    }

    fn insert(&mut self, component: Component) {
        let map = self.map_mut(component.kind());
        if let Some(previous) = map.insert(component.name().to_string(), component) {
            log::debug!(
                "Duplicate {} name '{}': {} replaced",
                previous.kind(),
                previous.name(),
                previous.relative_path()
            );
        }
    }

    fn map(&self, kind: ComponentKind) -> &BTreeMap<String, Component> {
        match kind {
            ComponentKind::Agent => &self.agents,
            ComponentKind::Skill => &self.skills,
            ComponentKind::Command => &self.commands,
        }
    }

    fn map_mut(&mut self, kind: ComponentKind) -> &mut BTreeMap<String, Component> {
        match kind {
            ComponentKind::Agent => &mut self.agents,
            ComponentKind::Skill => &mut self.skills,
            ComponentKind::Command => &mut self.commands,
        }
    }

    /// Look up a component. The empty name never matches.
    pub fn get(&self, kind: ComponentKind, name: &str) -> Option<&Component> {
        if name.is_empty() {
            return None;
        }
        self.map(kind).get(name)
    }

    pub fn contains(&self, kind: ComponentKind, name: &str) -> bool {
        self.get(kind, name).is_some()
    }

    /// Components of one kind, ordered by name.
    pub fn components(&self, kind: ComponentKind) -> impl Iterator<Item = &Component> {
        self.map(kind).values()
    }

    /// Every component, ordered by (kind, name).
    pub fn iter(&self) -> impl Iterator<Item = &Component> {
        ComponentKind::ALL
            .into_iter()
            .flat_map(move |kind| self.components(kind))
    }

    pub fn count(&self, kind: ComponentKind) -> usize {
        self.map(kind).len()
    }

    pub fn len(&self) -> usize {
        self.agents.len() + self.skills.len() + self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn indexes_by_kind_and_name() {
        let index = ComponentIndex::from_discovered(vec![
            DiscoveredFile::new(ComponentKind::Agent, "agents/b.md", "B"),
            DiscoveredFile::new(ComponentKind::Agent, "agents/a.md", "A"),
            DiscoveredFile::new(ComponentKind::Skill, "skills/s/SKILL.md", "S"),
        ]);

        assert_eq!(index.len(), 3);
        assert!(index.contains(ComponentKind::Agent, "a"));
        assert!(!index.contains(ComponentKind::Skill, "a"));
        let names: Vec<_> = index.iter().map(|c| c.name().to_string()).collect();
        assert_eq!(names, vec!["a", "b", "s"]);
    }

    #[test]
    fn last_duplicate_wins() {
        let index = ComponentIndex::from_discovered(vec![
            DiscoveredFile::new(ComponentKind::Agent, "agents/x.md", "first"),
            DiscoveredFile::new(ComponentKind::Agent, "agents/nested/x.md", "second"),
        ]);
        assert_eq!(index.count(ComponentKind::Agent), 1);
        let agent = index.get(ComponentKind::Agent, "x").unwrap();
        assert_eq!(agent.raw_content(), "second");
    }

    #[test]
    fn empty_name_never_matches() {
        let index = ComponentIndex::from_discovered(vec![DiscoveredFile::new(
            ComponentKind::Skill,
            "misc/SKILL.md",
            "nameless",
        )]);
        assert_eq!(index.count(ComponentKind::Skill), 1);
        assert!(index.get(ComponentKind::Skill, "").is_none());
    }
}
