//! Heuristic reference extraction.
//!
//! Each surface form is an independent [`Recognizer`]; a component's references are the
//! de-duplicated union of the recognizers that apply to its kind. Lines inside fenced code
//! blocks are never inspected.

use crate::types::{Pattern, Reference};
use agentlint_indexer::{string_field, string_list, Component};
use agentlint_protocol::ComponentKind;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static reference pattern")
}

static TASK_CALL: Lazy<Regex> = Lazy::new(|| compile(r#"\bTask\(\s*["'`]?([^"'`,)\s]+)"#));
static SKILL_LABEL: Lazy<Regex> =
    Lazy::new(|| compile(r#"^[^*]*?\bSkill:[ \t]*["'`]?([A-Za-z0-9_-]+)"#));
static BOLD_SKILL_LABEL: Lazy<Regex> =
    Lazy::new(|| compile(r#"\*\*Skill(?:\*\*:|:\*\*)[ \t]*["'`]?([A-Za-z0-9_-]+)"#));
static SKILL_CALL: Lazy<Regex> =
    Lazy::new(|| compile(r#"\bSkill\(\s*["'`]?([A-Za-z0-9_:-]+)["'`]?\s*\)"#));
static SKILLS_HEADER: Lazy<Regex> =
    Lazy::new(|| compile(r"^\s*(?:#{1,6}\s*)?(?:\*\*)?Skills(?:\*\*)?:(?:\*\*)?\s*$"));
static LIST_ITEM: Lazy<Regex> =
    Lazy::new(|| compile(r#"^\s*[-*+]\s+(?:\*\*)?["'`]?([A-Za-z0-9_-]+)"#));
static DELEGATE_TO_SPECIALIST: Lazy<Regex> = Lazy::new(|| {
    compile(r#"\b[Dd]elegate to\s+["'`]?([a-z0-9][a-z0-9-]*-specialist)\b"#)
});
static USE_SPECIALIST: Lazy<Regex> =
    Lazy::new(|| compile(r#"\b[Uu]se\s+["'`]?([a-z0-9][a-z0-9-]*-specialist)\b"#));
static SEE_SPECIALIST: Lazy<Regex> =
    Lazy::new(|| compile(r#"\b[Ss]ee\s+["'`]?([a-z0-9][a-z0-9-]*-specialist)\b"#));
static TASK_SPECIALIST: Lazy<Regex> = Lazy::new(|| {
    compile(r#"\bTask\(\s*["'`]?([a-z0-9][a-z0-9-]*-specialist)["'`]?\s*[,)]"#)
});
static DELEGATE_VIA: Lazy<Regex> =
    Lazy::new(|| compile(r#"\b[Dd]elegate via\s+["'`]?([A-Za-z0-9_-]+)"#));
static AGENT_HANDLES: Lazy<Regex> =
    Lazy::new(|| compile(r"\b([a-z0-9][a-z0-9-]*-agent)\s+handles\b"));
static SLASH_COMMAND: Lazy<Regex> =
    Lazy::new(|| compile(r#"\bSlashCommand\(\s*["'`]?/([A-Za-z0-9_:-]+)"#));

/// Substrings marking a dynamic, non-static reference.
const PLACEHOLDER_MARKERS: &[&str] = &["$", "{", "}", "<", ">", "ARGUMENTS"];

/// A line outside fenced code blocks, with its 1-based line number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLine<'a> {
    pub number: usize,
    pub text: &'a str,
}

/// Lines of `text` that are not inside a triple-backtick fence. Fence lines themselves are dropped.
pub fn visible_lines(text: &str, first_line: usize) -> Vec<SourceLine<'_>> {
    let mut in_fence = false;
    let mut lines = Vec::new();
    for (offset, line) in text.lines().enumerate() {
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        lines.push(SourceLine {
            number: first_line + offset,
            text: line,
        });
    }
    lines
}

/// Lowercase kebab-case name: `a-z0-9` words joined by single dashes.
pub fn is_reference_name(name: &str) -> bool {
    !name.is_empty()
        && name.split('-').all(|part| {
            !part.is_empty()
                && part
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        })
}

pub fn is_placeholder(raw: &str) -> bool {
    PLACEHOLDER_MARKERS.iter().any(|marker| raw.contains(marker))
}

#[derive(Debug, Clone, Copy)]
enum Matcher {
    /// First capture group of a single-line regex, every match on every line
    Line(&'static Lazy<Regex>),
    /// Bullets directly following a `Skills:` header line
    SkillsList,
}

/// One named surface form.
#[derive(Debug, Clone, Copy)]
pub struct Recognizer {
    pattern: Pattern,
    target: ComponentKind,
    matcher: Matcher,
}

impl Recognizer {
    /// Raw `(name, line)` matches accepted by this recognizer, in line order.
    pub fn recognize(&self, lines: &[SourceLine<'_>]) -> Vec<(String, usize)> {
        let mut found = Vec::new();
        match self.matcher {
            Matcher::Line(regex) => {
                for line in lines {
                    for caps in regex.captures_iter(line.text) {
                        if let Some(raw) = caps.get(1) {
                            if self.accepts(raw.as_str()) {
                                found.push((raw.as_str().to_string(), line.number));
                            }
                        }
                    }
                }
            }
            Matcher::SkillsList => {
                let mut in_list = false;
                let mut previous: Option<usize> = None;
                for line in lines {
                    let contiguous = previous.is_some_and(|prev| line.number == prev + 1);
                    previous = Some(line.number);

                    if SKILLS_HEADER.is_match(line.text) {
                        in_list = true;
                        continue;
                    }
                    if !in_list || !contiguous {
                        in_list = false;
                        continue;
                    }
                    match LIST_ITEM.captures(line.text).and_then(|caps| caps.get(1)) {
                        Some(raw) => {
                            if self.accepts(raw.as_str()) {
                                found.push((raw.as_str().to_string(), line.number));
                            }
                        }
                        None => in_list = false,
                    }
                }
            }
        }
        found
    }

    fn accepts(&self, raw: &str) -> bool {
        if self.pattern == Pattern::TaskCall && is_placeholder(raw) {
            return false;
        }
        is_reference_name(raw)
    }
}

const fn line(pattern: Pattern, target: ComponentKind, regex: &'static Lazy<Regex>) -> Recognizer {
    Recognizer {
        pattern,
        target,
        matcher: Matcher::Line(regex),
    }
}

/// `Task(name)` delegation from agents and commands.
pub static AGENT_DELEGATION: [Recognizer; 1] =
    [line(Pattern::TaskCall, ComponentKind::Agent, &TASK_CALL)];

/// The four skill-usage surface forms.
pub static SKILL_USAGE: [Recognizer; 4] = [
    line(Pattern::SkillLabel, ComponentKind::Skill, &SKILL_LABEL),
    line(Pattern::BoldSkillLabel, ComponentKind::Skill, &BOLD_SKILL_LABEL),
    line(Pattern::SkillCall, ComponentKind::Skill, &SKILL_CALL),
    Recognizer {
        pattern: Pattern::SkillsList,
        target: ComponentKind::Skill,
        matcher: Matcher::SkillsList,
    },
];

/// Narrative agent mentions inside skill bodies, most specific first.
pub static SKILL_BODY_AGENTS: [Recognizer; 7] = [
    line(Pattern::DelegateToSpecialist, ComponentKind::Agent, &DELEGATE_TO_SPECIALIST),
    line(Pattern::UseSpecialist, ComponentKind::Agent, &USE_SPECIALIST),
    line(Pattern::SeeSpecialist, ComponentKind::Agent, &SEE_SPECIALIST),
    line(Pattern::TaskSpecialist, ComponentKind::Agent, &TASK_SPECIALIST),
    line(Pattern::TaskCall, ComponentKind::Agent, &TASK_CALL),
    line(Pattern::DelegateVia, ComponentKind::Agent, &DELEGATE_VIA),
    line(Pattern::AgentHandles, ComponentKind::Agent, &AGENT_HANDLES),
];

/// `SlashCommand(/name)` invocations.
pub static COMMAND_INVOCATION: [Recognizer; 1] =
    [line(Pattern::SlashCommand, ComponentKind::Command, &SLASH_COMMAND)];

/// Run recognizers in order; a `(target, name)` pair is reported once, tagged by the first
/// recognizer that found it.
pub fn run_recognizers<'r>(
    recognizers: impl IntoIterator<Item = &'r Recognizer>,
    lines: &[SourceLine<'_>],
) -> Vec<Reference> {
    let mut seen: HashSet<(ComponentKind, String)> = HashSet::new();
    let mut references = Vec::new();
    for recognizer in recognizers {
        for (name, line) in recognizer.recognize(lines) {
            if seen.insert((recognizer.target, name.clone())) {
                references.push(Reference::new(recognizer.target, name, recognizer.pattern, line));
            }
        }
    }
    references
}

/// Extracts outgoing references from components.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceExtractor;

impl ReferenceExtractor {
    pub fn new() -> Self {
        Self
    }

    /// All outgoing references of `component`: body references first, then frontmatter ones.
    pub fn extract(&self, component: &Component) -> Vec<Reference> {
        let lines = visible_lines(component.body(), component.body_start_line());
        let mut references = match component.kind() {
            ComponentKind::Agent | ComponentKind::Command => run_recognizers(
                AGENT_DELEGATION
                    .iter()
                    .chain(SKILL_USAGE.iter())
                    .chain(COMMAND_INVOCATION.iter()),
                &lines,
            ),
            ComponentKind::Skill => run_recognizers(SKILL_BODY_AGENTS.iter(), &lines),
        };
        references.extend(self.frontmatter_references(component));

        log::debug!(
            "Extracted {} references from {}",
            references.len(),
            component.relative_path()
        );
        references
    }

    /// References declared in frontmatter: `skills` for agents, `agent` for skills.
    pub fn frontmatter_references(&self, component: &Component) -> Vec<Reference> {
        let Some(frontmatter) = component.frontmatter() else {
            return Vec::new();
        };

        let (key, target, pattern, names) = match component.kind() {
            ComponentKind::Agent => (
                "skills",
                ComponentKind::Skill,
                Pattern::FrontmatterSkills,
                string_list(frontmatter, "skills"),
            ),
            ComponentKind::Skill => (
                "agent",
                ComponentKind::Agent,
                Pattern::FrontmatterAgent,
                string_field(frontmatter, "agent")
                    .map(|name| vec![name.to_string()])
                    .unwrap_or_default(),
            ),
            ComponentKind::Command => return Vec::new(),
        };

        let line = frontmatter_key_line(component, key);
        let mut seen = HashSet::new();
        names
            .into_iter()
            .filter(|name| !name.is_empty() && !is_placeholder(name))
            .filter(|name| seen.insert(name.clone()))
            .map(|name| Reference::new(target, name, pattern, line))
            .collect()
    }

    /// `Task(...)` targets in free text.
    pub fn agent_delegations(&self, text: &str) -> Vec<Reference> {
        run_recognizers(AGENT_DELEGATION.iter(), &visible_lines(text, 1))
    }

    /// Skill names used in free text, across all four surface forms.
    pub fn skill_usages(&self, text: &str) -> Vec<Reference> {
        run_recognizers(SKILL_USAGE.iter(), &visible_lines(text, 1))
    }

    /// Agent mentions in a skill body.
    pub fn skill_body_agents(&self, text: &str) -> Vec<Reference> {
        run_recognizers(SKILL_BODY_AGENTS.iter(), &visible_lines(text, 1))
    }
}

fn frontmatter_key_line(component: &Component, key: &str) -> usize {
    let prefix = format!("{key}:");
    component
        .raw_content()
        .lines()
        .take(component.body_start_line().saturating_sub(1))
        .position(|line| line.starts_with(&prefix))
        .map(|idx| idx + 1)
        .unwrap_or(1)
}
