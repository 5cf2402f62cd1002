//! Colored terminal rendering of an analysis outcome.

use colored::Colorize;

use vibescope_core::metrics::AnalysisOutcome;

const BAR_WIDTH: usize = 20;

pub fn format_pretty(outcome: &AnalysisOutcome) -> String {
    let report = &outcome.report;
    let mut out = String::new();

    let verdict = if report.is_vibe_coded {
        report.verdict.red().bold()
    } else {
        report.verdict.green().bold()
    };
    out.push_str(&format!("{verdict}  (overall {:.1}/10)\n\n", report.overall));

    for (label, value) in [
        ("AI patterns", report.ai_patterns),
        ("Code structure", report.code_structure),
        ("Documentation", report.documentation),
        ("Complexity", report.complexity),
    ] {
        out.push_str(&format!("  {label:<15} {} {value:>4.1}\n", bar(value)));
    }

    out.push_str(&format!(
        "\n  {} files, {} lines, comment ratio {:.2}\n",
        outcome.total_files, outcome.total_lines, outcome.comments_ratio
    ));
    out.push_str(&format!(
        "  README {} | tests {}",
        check(outcome.has_readme),
        check(outcome.has_tests)
    ));
    if let Some(ref branch) = outcome.used_branch {
        out.push_str(&format!(" | branch {branch}"));
    }
    out.push('\n');

    if outcome.partial {
        out.push_str(&format!(
            "  {}\n",
            "secondary analyzer unavailable; primary metrics only".yellow()
        ));
    }

    if !report.highlights.is_empty() {
        out.push('\n');
        for highlight in &report.highlights {
            out.push_str(&format!("  {} {highlight}\n", "•".dimmed()));
        }
    }

    out.push_str(&format!("\n  done in {} ms\n", outcome.elapsed_ms));
    out
}

fn bar(value: f64) -> String {
    let filled = ((value / 10.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    let bar = format!(
        "{}{}",
        "█".repeat(filled),
        "░".repeat(BAR_WIDTH - filled)
    );
    if value >= 7.0 {
        bar.red().to_string()
    } else if value >= 4.0 {
        bar.yellow().to_string()
    } else {
        bar.green().to_string()
    }
}

fn check(flag: bool) -> String {
    if flag {
        "✓".green().to_string()
    } else {
        "✗".red().to_string()
    }
}
