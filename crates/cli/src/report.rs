use agentlint_graph::Cycle;
use agentlint_protocol::{serialize_json_pretty, Diagnostic, LintReport, Provenance, Severity};
use anyhow::Result;
use clap::ValueEnum;
use console::style;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Markdown,
}

pub fn render_report(report: &LintReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(report)),
        OutputFormat::Json => serialize_json_pretty(report),
        OutputFormat::Markdown => Ok(render_markdown(report)),
    }
}

fn severity_label(severity: Severity) -> String {
    let label = severity.as_str();
    match severity {
        Severity::Error => style(label).red().bold().to_string(),
        Severity::Warning => style(label).yellow().bold().to_string(),
        Severity::Suggestion => style(label).cyan().to_string(),
        Severity::Info => style(label).dim().to_string(),
    }
}

fn location(diagnostic: &Diagnostic) -> String {
    match diagnostic.line {
        Some(line) => format!("{}:{line}", diagnostic.file),
        None => diagnostic.file.clone(),
    }
}

fn render_text(report: &LintReport) -> String {
    let mut out = String::new();

    for result in report.results.iter().filter(|r| !r.diagnostics.is_empty()) {
        out.push_str(&format!(
            "{} {}:{}\n",
            style(&result.path).bold(),
            result.kind,
            result.name
        ));
        for diagnostic in &result.diagnostics {
            out.push_str(&format!(
                "  {}[{}] {}: {}\n",
                severity_label(diagnostic.severity),
                diagnostic.rule,
                location(diagnostic),
                diagnostic.message
            ));
        }
        out.push('\n');
    }

    let summary = &report.summary;
    let verdict = if report.is_success() {
        style("ok").green().bold().to_string()
    } else {
        style("failed").red().bold().to_string()
    };
    out.push_str(&format!(
        "{verdict}: {} components, {} passed, {} failed ({} errors, {} warnings, {} suggestions, {} infos)",
        summary.total,
        summary.successful,
        summary.failed,
        summary.errors,
        summary.warnings,
        summary.suggestions,
        summary.infos
    ));
    out
}

fn render_markdown(report: &LintReport) -> String {
    let summary = &report.summary;
    let mut md = String::new();
    md.push_str("# agentlint report\n\n");
    md.push_str(&format!("- Root: `{}`\n", report.root));
    md.push_str(&format!(
        "- Components: `{}` (passed `{}`, failed `{}`)\n\n",
        summary.total, summary.successful, summary.failed
    ));

    md.push_str("| severity | count |\n");
    md.push_str("|---|---:|\n");
    for severity in [
        Severity::Error,
        Severity::Warning,
        Severity::Suggestion,
        Severity::Info,
    ] {
        md.push_str(&format!("| {} | {} |\n", severity, summary.count(severity)));
    }
    md.push('\n');

    for (provenance, title) in [
        (Provenance::Documented, "Documented requirements"),
        (Provenance::Heuristic, "Heuristic observations"),
    ] {
        let rows: Vec<&Diagnostic> = report
            .results
            .iter()
            .flat_map(|r| r.diagnostics.iter())
            .filter(|d| d.provenance == provenance)
            .collect();
        if rows.is_empty() {
            continue;
        }

        md.push_str(&format!("## {title}\n\n"));
        md.push_str("| severity | rule | location | message |\n");
        md.push_str("|---|---|---|---|\n");
        for diagnostic in rows {
            md.push_str(&format!(
                "| {} | `{}` | `{}` | {} |\n",
                diagnostic.severity,
                diagnostic.rule,
                location(diagnostic),
                escape_cell(&diagnostic.message)
            ));
        }
        md.push('\n');
    }

    md
}

pub fn render_cycles(cycles: &[Cycle]) -> String {
    if cycles.is_empty() {
        return "No cycles found".to_string();
    }
    let mut out = format!("Found {} cycle(s):\n", cycles.len());
    for cycle in cycles {
        out.push_str(&format!("  {cycle}\n"));
    }
    out.truncate(out.trim_end().len());
    out
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentlint_graph::NodeId;
    use agentlint_protocol::{ComponentKind, LintResult};
    use pretty_assertions::assert_eq;

    fn report() -> LintReport {
        let mut broken = LintResult::new(ComponentKind::Agent, "a", "agents/a.md");
        broken.push(
            Diagnostic::new(
                "agents/a.md",
                "missing-agent",
                Severity::Error,
                Provenance::Documented,
                "Task(x) references agent 'x' which does not exist (create agents/x.md)",
            )
            .at_line(3),
        );
        let mut noisy = LintResult::new(ComponentKind::Skill, "s", "skills/s/SKILL.md");
        noisy.push(Diagnostic::new(
            "skills/s/SKILL.md",
            "orphan-skill",
            Severity::Info,
            Provenance::Heuristic,
            "skill 's' | unreferenced",
        ));
        let clean = LintResult::new(ComponentKind::Command, "c", "commands/c.md");
        LintReport::new("root", vec![broken, noisy, clean])
    }

    #[test]
    fn text_lists_only_results_with_diagnostics() {
        console::set_colors_enabled(false);
        let text = render_report(&report(), OutputFormat::Text).unwrap();
        assert!(text.contains("agents/a.md agent:a"));
        assert!(text.contains("  error[missing-agent] agents/a.md:3: Task(x)"));
        assert!(!text.contains("commands/c.md"));
        assert!(text.ends_with(
            "failed: 3 components, 2 passed, 1 failed (1 errors, 0 warnings, 0 suggestions, 1 infos)"
        ));
    }

    #[test]
    fn markdown_groups_by_provenance() {
        let md = render_report(&report(), OutputFormat::Markdown).unwrap();
        assert!(md.starts_with("# agentlint report"));
        let documented = md.find("## Documented requirements").unwrap();
        let heuristic = md.find("## Heuristic observations").unwrap();
        assert!(documented < heuristic);
        assert!(md.contains("skill 's' \\| unreferenced"));
    }

    #[test]
    fn json_is_the_report() {
        let json = render_report(&report(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["summary"]["failed"], 1);
        assert_eq!(value["results"][0]["diagnostics"][0]["line"], 3);
    }

    #[test]
    fn cycles_render_one_per_line() {
        assert_eq!(render_cycles(&[]), "No cycles found");
        let cycle = Cycle::from_members(vec![NodeId::agent("b"), NodeId::agent("a")]);
        assert_eq!(
            render_cycles(&[cycle]),
            "Found 1 cycle(s):\n  agent:a -> agent:b -> agent:a"
        );
    }
}
