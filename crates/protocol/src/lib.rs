use anyhow::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

mod report;

pub use report::{LintReport, LintResult, LintSummary};

pub const REPORT_SCHEMA_VERSION: u32 = 1;

/// Kind of a graph-participating component.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Agent,
    Skill,
    Command,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 3] = [Self::Agent, Self::Skill, Self::Command];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Agent => "agent",
            Self::Skill => "skill",
            Self::Command => "command",
        }
    }

    /// File a user would create to satisfy a reference to `name`.
    pub fn expected_path(&self, name: &str) -> String {
        match self {
            Self::Agent => format!("agents/{name}.md"),
            Self::Skill => format!("skills/{name}/SKILL.md"),
            Self::Command => format!("commands/{name}.md"),
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComponentKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "agent" => Ok(Self::Agent),
            "skill" => Ok(Self::Skill),
            "command" => Ok(Self::Command),
            other => Err(format!(
                "unknown component kind '{other}' (expected agent, skill or command)"
            )),
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Suggestion,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Suggestion => "suggestion",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "info" => Ok(Self::Info),
            "suggestion" => Ok(Self::Suggestion),
            "warning" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            other => Err(format!(
                "unknown severity '{other}' (expected error, warning, suggestion or info)"
            )),
        }
    }
}

/// Where a diagnostic's rule comes from. Used for grouping in reports only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Observation made by agentlint's own heuristics
    Heuristic,
    /// Requirement documented by the assistant runtime
    Documented,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Diagnostic {
    /// Relative path of the component the diagnostic is attached to
    pub file: String,

    /// 1-based line, when the finding points at one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,

    pub message: String,
    pub severity: Severity,
    pub provenance: Provenance,

    /// Stable kebab-case rule id (e.g. `missing-agent`)
    pub rule: String,

    /// File the user should create to resolve the finding
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_path: Option<String>,
}

impl Diagnostic {
    pub fn new(
        file: impl Into<String>,
        rule: impl Into<String>,
        severity: Severity,
        provenance: Provenance,
        message: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            line: None,
            message: message.into(),
            severity,
            provenance,
            rule: rule.into(),
            suggested_path: None,
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn suggest_path(mut self, path: impl Into<String>) -> Self {
        self.suggested_path = Some(path.into());
        self
    }
}

pub fn serialize_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(Into::into)
}

pub fn serialize_json_pretty<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(Into::into)
}

/// JSON Schema describing [`LintReport`].
pub fn report_schema() -> Result<serde_json::Value> {
    let schema = schemars::schema_for!(LintReport);
    serde_json::to_value(schema).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_display() {
        for kind in ComponentKind::ALL {
            assert_eq!(kind.to_string().parse::<ComponentKind>(), Ok(kind));
        }
        assert!("hook".parse::<ComponentKind>().is_err());
    }

    #[test]
    fn expected_paths_follow_directory_layout() {
        assert_eq!(ComponentKind::Agent.expected_path("reviewer"), "agents/reviewer.md");
        assert_eq!(
            ComponentKind::Skill.expected_path("git-flow"),
            "skills/git-flow/SKILL.md"
        );
        assert_eq!(ComponentKind::Command.expected_path("ship"), "commands/ship.md");
    }

    #[test]
    fn severity_orders_from_info_to_error() {
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Warning > Severity::Suggestion);
        assert!(Severity::Suggestion > Severity::Info);
    }

    #[test]
    fn diagnostic_skips_empty_optionals_in_json() {
        let diag = Diagnostic::new(
            "agents/a.md",
            "missing-agent",
            Severity::Error,
            Provenance::Documented,
            "boom",
        );
        let json = serialize_json(&diag).unwrap();
        assert!(!json.contains("suggested_path"));
        assert!(!json.contains("\"line\""));
        assert!(json.contains("\"severity\":\"error\""));
    }

    #[test]
    fn schema_mentions_report_fields() {
        let schema = report_schema().unwrap();
        let raw = schema.to_string();
        assert!(raw.contains("summary"));
        assert!(raw.contains("results"));
    }
}
