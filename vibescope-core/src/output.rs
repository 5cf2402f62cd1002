use crate::metrics::AnalysisOutcome;

/// Output format for consumers of an analysis outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Pretty,
    Text,
    Json,
}

/// Format an outcome as JSON.
pub fn format_json(outcome: &AnalysisOutcome) -> String {
    serde_json::to_string_pretty(outcome).expect("outcome should be serializable")
}

/// Format an outcome as plain text (no colors).
pub fn format_text(outcome: &AnalysisOutcome) -> String {
    let report = &outcome.report;
    let mut out = String::new();

    out.push_str(&format!(
        "Verdict: {} (overall {:.1}/10)\n",
        report.verdict, report.overall
    ));
    out.push_str(&format!(
        "Files: {} | Lines: {} | Comment ratio: {:.2}\n",
        outcome.total_files, outcome.total_lines, outcome.comments_ratio
    ));
    out.push_str(&format!(
        "README: {} | Tests: {}\n",
        yes_no(outcome.has_readme),
        yes_no(outcome.has_tests)
    ));
    if let Some(ref branch) = outcome.used_branch {
        out.push_str(&format!("Branch: {branch}\n"));
    }
    if outcome.partial {
        out.push_str("Note: secondary analyzer unavailable; primary metrics only\n");
    }

    out.push_str("\nScores:\n");
    for (label, value) in [
        ("AI patterns", report.ai_patterns),
        ("Code structure", report.code_structure),
        ("Documentation", report.documentation),
        ("Complexity", report.complexity),
    ] {
        out.push_str(&format!("  {label:<15} {value:>4.1}\n"));
    }

    if !report.highlights.is_empty() {
        out.push_str("\nHighlights:\n");
        for highlight in &report.highlights {
            out.push_str(&format!("  - {highlight}\n"));
        }
    }

    out
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}
