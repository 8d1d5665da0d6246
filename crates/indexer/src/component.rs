use crate::frontmatter::{parse_frontmatter, split_frontmatter, Frontmatter};
use agentlint_protocol::ComponentKind;

/// A file handed over by discovery: `(kind, relative_path, contents)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    pub kind: ComponentKind,
    pub relative_path: String,
    pub contents: String,
}

impl DiscoveredFile {
    pub fn new(
        kind: ComponentKind,
        relative_path: impl Into<String>,
        contents: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            relative_path: relative_path.into(),
            contents: contents.into(),
        }
    }
}

/// One indexed agent, skill or command.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    kind: ComponentKind,
    name: String,
    relative_path: String,
    raw_content: String,
    frontmatter: Option<Frontmatter>,
    body_start: usize,
    body_start_line: usize,
}

impl Component {
    pub fn new(
        kind: ComponentKind,
        relative_path: impl Into<String>,
        raw_content: impl Into<String>,
    ) -> Self {
        let relative_path = normalize_path(&relative_path.into());
        let raw_content = raw_content.into();
        let name = canonical_name(kind, &relative_path);

        let (frontmatter, body_start, body_start_line) = match split_frontmatter(&raw_content) {
            Some(block) => {
                let body_start = raw_content.len() - block.body.len();
                let parsed = parse_frontmatter(&block.yaml);
                if parsed.is_none() {
                    log::warn!(
                        "Ignoring malformed frontmatter in {relative_path}; frontmatter checks skipped"
                    );
                }
                (parsed, body_start, block.body_start_line)
            }
            None => (None, 0, 1),
        };

        Self {
            kind,
            name,
            relative_path,
            raw_content,
            frontmatter,
            body_start,
            body_start_line,
        }
    }

    pub fn from_discovered(file: DiscoveredFile) -> Self {
        Self::new(file.kind, file.relative_path, file.contents)
    }

    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    /// Canonical name derived from the path; empty when none could be derived.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn relative_path(&self) -> &str {
        &self.relative_path
    }

    pub fn raw_content(&self) -> &str {
        &self.raw_content
    }

    pub fn frontmatter(&self) -> Option<&Frontmatter> {
        self.frontmatter.as_ref()
    }

    /// Content after the frontmatter block (the whole file if there is none).
    pub fn body(&self) -> &str {
        &self.raw_content[self.body_start..]
    }

    /// 1-based line number of the first body line.
    pub fn body_start_line(&self) -> usize {
        self.body_start_line
    }

    pub fn line_count(&self) -> usize {
        self.raw_content.lines().count()
    }
}

/// Derive a component's canonical name from its relative path.
///
/// Agents and commands use the file stem. Skills use the directory that directly follows
/// the last `skills` segment; a skill path without one yields an empty name.
pub fn canonical_name(kind: ComponentKind, relative_path: &str) -> String {
    let normalized = normalize_path(relative_path);
    let segments: Vec<&str> = normalized.split('/').filter(|s| !s.is_empty()).collect();

    match kind {
        ComponentKind::Agent | ComponentKind::Command => segments
            .last()
            .map(|file| file_stem(file).to_string())
            .unwrap_or_default(),
        ComponentKind::Skill => {
            let Some((_, dirs)) = segments.split_last() else {
                return String::new();
            };
            dirs.iter()
                .rposition(|segment| *segment == "skills")
                .and_then(|pos| dirs.get(pos + 1))
                .map(|segment| segment.to_string())
                .unwrap_or_default()
        }
    }
}

/// Classify a relative path into a graph-participating kind.
///
/// `skills/**/<name>/SKILL.md` is a skill; markdown under `agents/` or `commands/` is an
/// agent or command, decided by whichever of those directories is closest to the file.
pub fn classify(relative_path: &str) -> Option<ComponentKind> {
    let normalized = normalize_path(relative_path);
    let segments: Vec<&str> = normalized.split('/').filter(|s| !s.is_empty()).collect();
    let (file, dirs) = segments.split_last()?;

    if *file == "SKILL.md" && dirs.contains(&"skills") {
        return Some(ComponentKind::Skill);
    }

    let is_markdown = file
        .rsplit_once('.')
        .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case("md"));
    if !is_markdown || file.eq_ignore_ascii_case("README.md") {
        return None;
    }

    dirs.iter().rev().find_map(|dir| match *dir {
        "agents" => Some(ComponentKind::Agent),
        "commands" => Some(ComponentKind::Command),
        _ => None,
    })
}

fn file_stem(file: &str) -> &str {
    match file.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file,
    }
}

fn normalize_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    path.strip_prefix("./").unwrap_or(&path).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn agent_and_command_names_strip_extension() {
        assert_eq!(canonical_name(ComponentKind::Agent, "agents/code-reviewer.md"), "code-reviewer");
        assert_eq!(canonical_name(ComponentKind::Command, "commands/git/ship.md"), "ship");
        assert_eq!(canonical_name(ComponentKind::Agent, ".\\agents\\win.md"), "win");
    }

    #[test]
    fn skill_name_follows_skills_segment() {
        assert_eq!(canonical_name(ComponentKind::Skill, "skills/git-flow/SKILL.md"), "git-flow");
        assert_eq!(
            canonical_name(ComponentKind::Skill, "plugins/acme/skills/deploy/SKILL.md"),
            "deploy"
        );
        assert_eq!(
            canonical_name(ComponentKind::Skill, "skills/deploy/references/SKILL.md"),
            "deploy"
        );
    }

    #[test]
    fn skill_without_skills_segment_has_empty_name() {
        assert_eq!(canonical_name(ComponentKind::Skill, "misc/SKILL.md"), "");
        assert_eq!(canonical_name(ComponentKind::Skill, "skills/SKILL.md"), "");
    }

    #[test]
    fn classify_by_directory() {
        assert_eq!(classify("agents/a.md"), Some(ComponentKind::Agent));
        assert_eq!(classify("commands/deploy/run.md"), Some(ComponentKind::Command));
        assert_eq!(classify("skills/s/SKILL.md"), Some(ComponentKind::Skill));
        assert_eq!(classify("agents/commands/x.md"), Some(ComponentKind::Command));
        assert_eq!(classify("agents/README.md"), None);
        assert_eq!(classify("agents/notes.txt"), None);
        assert_eq!(classify("settings.json"), None);
        assert_eq!(classify("skills/s/reference.md"), None);
    }

    #[test]
    fn component_exposes_body_after_frontmatter() {
        let component = Component::new(
            ComponentKind::Agent,
            "agents/a.md",
            "---\nname: a\nskills: [x]\n---\nTask(b)\n",
        );
        assert_eq!(component.name(), "a");
        assert_eq!(component.body(), "Task(b)\n");
        assert_eq!(component.body_start_line(), 5);
        assert!(component.frontmatter().is_some());
        assert_eq!(component.line_count(), 5);
    }

    #[test]
    fn malformed_frontmatter_degrades_to_none() {
        let component = Component::new(
            ComponentKind::Agent,
            "agents/a.md",
            "---\nskills: [oops\n---\nbody\n",
        );
        assert!(component.frontmatter().is_none());
        assert_eq!(component.body(), "body\n");
    }
}
