use crate::builtins::Builtins;
use crate::extract::{visible_lines, ReferenceExtractor};
use crate::types::{Pattern, Reference};
use agentlint_indexer::{string_field, Component, ComponentIndex};
use agentlint_protocol::{ComponentKind, Diagnostic, Provenance, Severity};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;

static FLAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[\s\[(`|=,])(--[a-z][a-z0-9-]*)").expect("static flag pattern")
});

/// Flags every CLI understands; never reported.
const UNIVERSAL_FLAGS: &[&str] = &["--help", "--version"];

/// Split an `allowed-tools` value into tokens.
///
/// Commas and whitespace separate tokens only outside parentheses, so `Task(a, b)` and
/// `Bash(git add:*)` stay whole.
pub fn parse_allowed_tools(raw: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;

    for c in raw.chars() {
        match c {
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 => flush(&mut current, &mut tokens),
            c if c.is_whitespace() && depth == 0 => flush(&mut current, &mut tokens),
            c => current.push(c),
        }
    }
    flush(&mut current, &mut tokens);
    tokens
}

fn flush(current: &mut String, tokens: &mut Vec<String>) {
    let token = current.trim();
    if !token.is_empty() {
        tokens.push(token.to_string());
    }
    current.clear();
}

/// True when `word` occurs in `haystack` with no name character on either side.
pub fn contains_word(haystack: &str, word: &str) -> bool {
    if word.is_empty() {
        return false;
    }
    let is_name_char = |c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-';
    haystack.match_indices(word).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + word.len()..].chars().next();
        !before.is_some_and(is_name_char) && !after.is_some_and(is_name_char)
    })
}

/// Checks a component's references against the index.
pub struct CrossReferenceValidator<'a> {
    index: &'a ComponentIndex,
    builtins: &'a Builtins,
    extractor: ReferenceExtractor,
}

impl<'a> CrossReferenceValidator<'a> {
    pub fn new(index: &'a ComponentIndex, builtins: &'a Builtins) -> Self {
        Self {
            index,
            builtins,
            extractor: ReferenceExtractor::new(),
        }
    }

    /// Whether `reference` points at an indexed component or a built-in.
    pub fn resolves(&self, reference: &Reference) -> bool {
        if reference.target == ComponentKind::Agent && self.builtins.contains(&reference.name) {
            return true;
        }
        self.index.contains(reference.target, &reference.name)
    }

    /// One error per distinct missing `(kind, name)` target.
    pub fn missing_references(
        &self,
        component: &Component,
        references: &[Reference],
    ) -> Vec<Diagnostic> {
        let mut reported: HashSet<(ComponentKind, &str)> = HashSet::new();
        let mut diagnostics = Vec::new();

        for reference in references {
            if reference.name.is_empty() || self.resolves(reference) {
                continue;
            }
            if !reported.insert((reference.target, reference.name.as_str())) {
                continue;
            }

            let expected = reference.target.expected_path(&reference.name);
            let message = format!(
                "{} references {} '{}' which does not exist (create {})",
                reference.syntax(),
                reference.target,
                reference.name,
                expected
            );
            diagnostics.push(
                Diagnostic::new(
                    component.relative_path(),
                    format!("missing-{}", reference.target),
                    Severity::Error,
                    Provenance::Documented,
                    message,
                )
                .at_line(reference.line)
                .suggest_path(expected),
            );
        }
        diagnostics
    }

    /// Info diagnostics for `allowed-tools` entries a command never exercises.
    pub fn unused_allowed_tools(&self, component: &Component) -> Vec<Diagnostic> {
        if component.kind() != ComponentKind::Command {
            return Vec::new();
        }
        let Some(frontmatter) = component.frontmatter() else {
            return Vec::new();
        };

        let tokens: Vec<String> = match frontmatter.get("allowed-tools") {
            Some(Value::String(raw)) => parse_allowed_tools(raw),
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .flat_map(parse_allowed_tools)
                .collect(),
            _ => return Vec::new(),
        };

        let body = component.body();
        let mut seen = HashSet::new();
        tokens
            .into_iter()
            .filter(|token| seen.insert(token.clone()))
            .filter(|token| !tool_is_exercised(token, body))
            .map(|token| {
                Diagnostic::new(
                    component.relative_path(),
                    "unused-allowed-tool",
                    Severity::Info,
                    Provenance::Heuristic,
                    format!("allowed-tools declares '{token}' but the command body never uses it"),
                )
            })
            .collect()
    }

    /// Suggestions for `--flags` a command documents that its primary agent never mentions.
    ///
    /// The primary agent is the first `Task(...)` target that resolves to an indexed agent.
    pub fn undocumented_flags(
        &self,
        component: &Component,
        references: &[Reference],
    ) -> Vec<Diagnostic> {
        if component.kind() != ComponentKind::Command {
            return Vec::new();
        }

        let Some(agent) = references
            .iter()
            .filter(|r| r.target == ComponentKind::Agent && r.pattern == Pattern::TaskCall)
            .find_map(|r| self.index.get(ComponentKind::Agent, &r.name))
        else {
            return Vec::new();
        };

        let flags = documented_flags(component);
        if flags.is_empty() {
            return Vec::new();
        }

        let mut haystacks = vec![agent.raw_content()];
        for skill_ref in self.extractor.extract(agent) {
            if skill_ref.target != ComponentKind::Skill {
                continue;
            }
            if let Some(skill) = self.index.get(ComponentKind::Skill, &skill_ref.name) {
                haystacks.push(skill.raw_content());
            }
        }

        flags
            .into_iter()
            .filter(|flag| !haystacks.iter().any(|text| contains_word(text, flag)))
            .map(|flag| {
                Diagnostic::new(
                    component.relative_path(),
                    "undocumented-flag",
                    Severity::Suggestion,
                    Provenance::Heuristic,
                    format!(
                        "flag '{flag}' is documented here but not found in agent '{}' or its skills (may be fake)",
                        agent.name()
                    ),
                )
            })
            .collect()
    }
}

fn tool_is_exercised(token: &str, body: &str) -> bool {
    let Some((tool, rest)) = token.split_once('(') else {
        return contains_word(body, token);
    };
    let argument = rest.trim_end_matches(')').trim();
    if argument.is_empty() {
        return contains_word(body, tool);
    }
    if body.contains(token) {
        return true;
    }
    let stem = argument
        .split([':', '*', ' '])
        .next()
        .unwrap_or_default()
        .trim();
    if tool == "Task" {
        return contains_word(body, stem);
    }
    contains_word(body, stem) || contains_word(body, tool)
}

/// `--flags` in a command's `argument-hint` and visible body text, first occurrence order.
fn documented_flags(component: &Component) -> Vec<String> {
    let mut texts: Vec<&str> = Vec::new();
    if let Some(hint) = component
        .frontmatter()
        .and_then(|fm| string_field(fm, "argument-hint"))
    {
        texts.push(hint);
    }
    let lines = visible_lines(component.body(), component.body_start_line());
    texts.extend(lines.iter().map(|line| line.text));

    let mut seen = HashSet::new();
    let mut flags = Vec::new();
    for text in texts {
        for caps in FLAG.captures_iter(text) {
            let Some(flag) = caps.get(1) else { continue };
            let flag = flag.as_str().trim_end_matches('-');
            if UNIVERSAL_FLAGS.contains(&flag) {
                continue;
            }
            if seen.insert(flag.to_string()) {
                flags.push(flag.to_string());
            }
        }
    }
    flags
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentlint_indexer::DiscoveredFile;
    use pretty_assertions::assert_eq;

    fn index(files: Vec<(ComponentKind, &str, &str)>) -> ComponentIndex {
        ComponentIndex::from_discovered(
            files
                .into_iter()
                .map(|(kind, path, body)| DiscoveredFile::new(kind, path, body)),
        )
    }

    #[test]
    fn allowed_tools_keep_parenthesized_tokens_whole() {
        assert_eq!(
            parse_allowed_tools("Task(a), Task(b), Write"),
            vec!["Task(a)", "Task(b)", "Write"]
        );
        assert_eq!(
            parse_allowed_tools("Bash(git add:*) Read,  Edit"),
            vec!["Bash(git add:*)", "Read", "Edit"]
        );
        assert!(parse_allowed_tools(" , ").is_empty());
    }

    #[test]
    fn missing_agent_reported_once_with_expected_path() {
        let idx = index(vec![(ComponentKind::Agent, "agents/a.md", "")]);
        let builtins = Builtins::new();
        let validator = CrossReferenceValidator::new(&idx, &builtins);
        let component = Component::new(
            ComponentKind::Command,
            "commands/c.md",
            "Task(ghost)\nTask(a)\nTask(general-purpose)\nTask(ghost)",
        );
        let refs = ReferenceExtractor::new().extract(&component);

        let diags = validator.missing_references(&component, &refs);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].rule, "missing-agent");
        assert_eq!(diags[0].severity, Severity::Error);
        assert_eq!(diags[0].suggested_path.as_deref(), Some("agents/ghost.md"));
        assert_eq!(diags[0].line, Some(1));
        assert!(diags[0].message.contains("Task(ghost)"));
        assert!(diags[0].message.contains("agents/ghost.md"));
    }

    #[test]
    fn body_and_frontmatter_duplicates_collapse() {
        let idx = ComponentIndex::new();
        let builtins = Builtins::new();
        let validator = CrossReferenceValidator::new(&idx, &builtins);
        let component = Component::new(
            ComponentKind::Agent,
            "agents/a.md",
            "---\nskills: [lost]\n---\nSkill: lost\n",
        );
        let refs = ReferenceExtractor::new().extract(&component);
        let diags = validator.missing_references(&component, &refs);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].suggested_path.as_deref(), Some("skills/lost/SKILL.md"));
    }

    #[test]
    fn unused_allowed_tools_are_info() {
        let idx = ComponentIndex::new();
        let builtins = Builtins::new();
        let validator = CrossReferenceValidator::new(&idx, &builtins);
        let component = Component::new(
            ComponentKind::Command,
            "commands/c.md",
            "---\nallowed-tools: Task(a), Task(b), Write, Bash(git status:*)\n---\nUse Task(a) and run git status.\n",
        );

        let diags = validator.unused_allowed_tools(&component);
        let messages: Vec<_> = diags.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "allowed-tools declares 'Task(b)' but the command body never uses it",
                "allowed-tools declares 'Write' but the command body never uses it",
            ]
        );
        assert!(diags.iter().all(|d| d.severity == Severity::Info));
    }

    #[test]
    fn fake_flags_checked_against_primary_agent_and_skills() {
        let idx = index(vec![
            (ComponentKind::Agent, "agents/worker.md", "Skill: opts\nSupports --fix."),
            (ComponentKind::Agent, "agents/other.md", "Handles --fast."),
            (ComponentKind::Skill, "skills/opts/SKILL.md", "Use --dry-run to preview."),
        ]);
        let builtins = Builtins::new();
        let validator = CrossReferenceValidator::new(&idx, &builtins);
        let component = Component::new(
            ComponentKind::Command,
            "commands/run.md",
            "---\nargument-hint: \"[--fix] [--fast]\"\n---\nTask(missing)\nTask(worker)\nTask(other)\nPass --dry-run or --help.\n",
        );
        let refs = ReferenceExtractor::new().extract(&component);

        let diags = validator.undocumented_flags(&component, &refs);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].severity, Severity::Suggestion);
        assert!(diags[0].message.contains("'--fast'"));
        assert!(diags[0].message.contains("agent 'worker'"));
    }

    #[test]
    fn no_primary_agent_means_no_flag_check() {
        let idx = ComponentIndex::new();
        let builtins = Builtins::new();
        let validator = CrossReferenceValidator::new(&idx, &builtins);
        let component = Component::new(ComponentKind::Command, "commands/x.md", "Task(gone) --bogus");
        let refs = ReferenceExtractor::new().extract(&component);
        assert!(validator.undocumented_flags(&component, &refs).is_empty());
    }

    #[test]
    fn word_matching_respects_name_boundaries() {
        assert!(contains_word("run git status now", "git"));
        assert!(!contains_word("digital", "git"));
        assert!(!contains_word("--fix-all", "--fix"));
        assert!(contains_word("(--fix)", "--fix"));
    }
}
