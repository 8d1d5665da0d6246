use crate::{ComponentKind, Diagnostic, Severity, REPORT_SCHEMA_VERSION};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Outcome of linting one component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct LintResult {
    pub kind: ComponentKind,
    pub name: String,
    pub path: String,

    /// False once any error-severity diagnostic is attached
    pub success: bool,

    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,
}

impl LintResult {
    pub fn new(kind: ComponentKind, name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            path: path.into(),
            success: true,
            diagnostics: Vec::new(),
        }
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        if diagnostic.severity == Severity::Error {
            self.success = false;
        }
        self.diagnostics.push(diagnostic);
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for diagnostic in diagnostics {
            self.push(diagnostic);
        }
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }
}

/// Aggregate counters over a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct LintSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub errors: usize,
    pub warnings: usize,
    pub suggestions: usize,
    pub infos: usize,
}

impl LintSummary {
    pub fn from_results(results: &[LintResult]) -> Self {
        let mut summary = Self {
            total: results.len(),
            ..Self::default()
        };
        for result in results {
            if result.success {
                summary.successful += 1;
            } else {
                summary.failed += 1;
            }
            for diagnostic in &result.diagnostics {
                summary.record(diagnostic.severity);
            }
        }
        summary
    }

    fn record(&mut self, severity: Severity) {
        match severity {
            Severity::Error => self.errors += 1,
            Severity::Warning => self.warnings += 1,
            Severity::Suggestion => self.suggestions += 1,
            Severity::Info => self.infos += 1,
        }
    }

    pub fn count(&self, severity: Severity) -> usize {
        match severity {
            Severity::Error => self.errors,
            Severity::Warning => self.warnings,
            Severity::Suggestion => self.suggestions,
            Severity::Info => self.infos,
        }
    }
}

/// Full output of one lint run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct LintReport {
    pub schema_version: u32,
    pub root: String,
    pub results: Vec<LintResult>,
    pub summary: LintSummary,
}

impl LintReport {
    /// Build a report from per-component results. Results are ordered by (kind, name, path).
    pub fn new(root: impl Into<String>, mut results: Vec<LintResult>) -> Self {
        results.sort_by(|a, b| {
            a.kind
                .cmp(&b.kind)
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.path.cmp(&b.path))
        });
        let summary = LintSummary::from_results(&results);
        Self {
            schema_version: REPORT_SCHEMA_VERSION,
            root: root.into(),
            results,
            summary,
        }
    }

    pub fn find(&self, kind: ComponentKind, name: &str) -> Option<&LintResult> {
        self.results
            .iter()
            .find(|r| r.kind == kind && r.name == name)
    }

    /// Attach a batch-level diagnostic to an existing result, keeping counters in step.
    ///
    /// Returns false when no result matches `(kind, name)`.
    pub fn attach(&mut self, kind: ComponentKind, name: &str, diagnostic: Diagnostic) -> bool {
        let Some(result) = self
            .results
            .iter_mut()
            .find(|r| r.kind == kind && r.name == name)
        else {
            return false;
        };

        let was_successful = result.success;
        let severity = diagnostic.severity;
        result.push(diagnostic);
        self.summary.record(severity);

        if was_successful && !result.success {
            self.summary.successful = self.summary.successful.saturating_sub(1);
            self.summary.failed += 1;
        }
        true
    }

    /// True when any diagnostic at or above `threshold` exists.
    pub fn has_at_least(&self, threshold: Severity) -> bool {
        self.results
            .iter()
            .flat_map(|r| r.diagnostics.iter())
            .any(|d| d.severity >= threshold)
    }

    pub fn is_success(&self) -> bool {
        self.summary.failed == 0
    }
}
