use crate::builder::GraphBuilder;
use crate::types::NodeId;
use agentlint_indexer::ComponentIndex;
use agentlint_protocol::{ComponentKind, Diagnostic, Provenance, Severity};

/// Skills that nothing points at, in name order.
///
/// A skill counts as referenced when an agent or command extracts a skill reference to it, or
/// when another skill's text contains its name anywhere (plain substring, no word boundary).
pub fn find_orphan_skills(index: &ComponentIndex) -> Vec<String> {
    // skills are leaves, so every incoming edge comes from an agent or command
    let graph = GraphBuilder::new().build(index);

    let orphans: Vec<String> = index
        .components(ComponentKind::Skill)
        .filter(|skill| !skill.name().is_empty())
        .filter(|skill| !graph.is_referenced(&NodeId::skill(skill.name())))
        .filter(|skill| {
            !index.components(ComponentKind::Skill).any(|other| {
                other.relative_path() != skill.relative_path()
                    && other.raw_content().contains(skill.name())
            })
        })
        .map(|skill| skill.name().to_string())
        .collect();

    log::debug!("Orphan skills: {}", orphans.len());
    orphans
}

/// One info diagnostic per orphaned skill, pointing at the skill's own file.
pub fn orphan_diagnostics(index: &ComponentIndex) -> Vec<(String, Diagnostic)> {
    find_orphan_skills(index)
        .into_iter()
        .filter_map(|name| {
            let skill = index.get(ComponentKind::Skill, &name)?;
            let diagnostic = Diagnostic::new(
                skill.relative_path(),
                "orphan-skill",
                Severity::Info,
                Provenance::Heuristic,
                format!(
                    "skill '{name}' is not referenced by any agent, command or skill; \
                     consider adding a cross-reference (e.g. `Skill: {name}`)"
                ),
            );
            Some((name, diagnostic))
        })
        .collect()
}
