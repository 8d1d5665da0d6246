use crate::builder::GraphBuilder;
use crate::builtins::Builtins;
use crate::cycles::{report_cycles, Cycle, CycleDetector};
use crate::extract::ReferenceExtractor;
use crate::orphans::orphan_diagnostics;
use crate::validate::CrossReferenceValidator;
use agentlint_indexer::ComponentIndex;
use agentlint_protocol::{ComponentKind, LintReport, LintResult};

/// Which passes beyond missing-reference validation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckOptions {
    pub cycles: bool,
    pub orphans: bool,
    pub allowed_tools: bool,
    pub fake_flags: bool,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            cycles: true,
            orphans: true,
            allowed_tools: true,
            fake_flags: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LintOutcome {
    pub report: LintReport,
    pub cycles: Vec<Cycle>,
}

/// Full validation run over an index.
///
/// Per-component checks run first; orphan and cycle passes attach to the assembled report.
pub struct Linter<'a> {
    index: &'a ComponentIndex,
    builtins: &'a Builtins,
    options: CheckOptions,
}

impl<'a> Linter<'a> {
    pub fn new(index: &'a ComponentIndex, builtins: &'a Builtins, options: CheckOptions) -> Self {
        Self {
            index,
            builtins,
            options,
        }
    }

    pub fn run(&self, root: &str) -> LintOutcome {
        let extractor = ReferenceExtractor::new();
        let validator = CrossReferenceValidator::new(self.index, self.builtins);

        let results: Vec<LintResult> = self
            .index
            .iter()
            .filter(|component| !component.name().is_empty())
            .map(|component| {
                let references = extractor.extract(component);
                let mut result = LintResult::new(
                    component.kind(),
                    component.name(),
                    component.relative_path(),
                );
                result.extend(validator.missing_references(component, &references));
                if self.options.allowed_tools {
                    result.extend(validator.unused_allowed_tools(component));
                }
                if self.options.fake_flags {
                    result.extend(validator.undocumented_flags(component, &references));
                }
                result
            })
            .collect();

        let mut report = LintReport::new(root, results);

        if self.options.orphans {
            for (name, diagnostic) in orphan_diagnostics(self.index) {
                report.attach(ComponentKind::Skill, &name, diagnostic);
            }
        }

        let cycles = if self.options.cycles {
            let graph = GraphBuilder::new().build(self.index);
            let cycles = CycleDetector::new(&graph).find_cycles();
            let attached = report_cycles(&cycles, &mut report);
            log::info!("Found {} cycles ({attached} diagnostics)", cycles.len());
            cycles
        } else {
            Vec::new()
        };

        log::info!(
            "Linted {} components: {} passed, {} failed",
            report.summary.total,
            report.summary.successful,
            report.summary.failed
        );

        LintOutcome { report, cycles }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentlint_indexer::DiscoveredFile;
    use agentlint_protocol::Severity;
    use pretty_assertions::assert_eq;

    fn fixture() -> ComponentIndex {
        ComponentIndex::from_discovered(vec![
            DiscoveredFile::new(
                ComponentKind::Command,
                "commands/ship.md",
                "---\nallowed-tools: Task, Read\n---\nRun Task(builder) with --fast\n",
            ),
            DiscoveredFile::new(ComponentKind::Agent, "agents/builder.md", "Skill: packaging\n"),
            DiscoveredFile::new(ComponentKind::Skill, "skills/packaging/SKILL.md", "zip it"),
            DiscoveredFile::new(ComponentKind::Skill, "skills/spare/SKILL.md", "unused"),
        ])
    }

    #[test]
    fn companion_checks_follow_options() {
        let index = fixture();
        let builtins = Builtins::new();

        let all = Linter::new(&index, &builtins, CheckOptions::default()).run(".");
        assert!(all.report.is_success());
        assert_eq!(all.report.summary.infos, 2);
        assert_eq!(all.report.summary.suggestions, 1);

        let none = CheckOptions {
            cycles: false,
            orphans: false,
            allowed_tools: false,
            fake_flags: false,
        };
        let bare = Linter::new(&index, &builtins, none).run(".");
        assert_eq!(bare.report.summary.infos + bare.report.summary.suggestions, 0);
    }

    #[test]
    fn cycles_fail_members() {
        let index = ComponentIndex::from_discovered(vec![
            DiscoveredFile::new(ComponentKind::Agent, "agents/a.md", "Task(b)"),
            DiscoveredFile::new(ComponentKind::Agent, "agents/b.md", "Task(a)"),
        ]);
        let outcome = Linter::new(&index, &Builtins::new(), CheckOptions::default()).run(".");
        assert_eq!(outcome.cycles.len(), 1);
        assert_eq!(outcome.report.summary.failed, 2);
        assert!(outcome.report.has_at_least(Severity::Error));
    }
}
