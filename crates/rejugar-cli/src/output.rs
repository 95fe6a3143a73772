//! Console rendering of run results

use console::style;
use rejugar::{Report, Verdict};

/// Print the per-test verdict lines and the summary block
pub fn print_report(report: &Report) {
    println!();
    println!("{}", style("Test Results").bold().underlined());

    for result in &report.test_results {
        let mark = match result.verdict {
            Verdict::Pass => style("✓").green().bold(),
            Verdict::Fail => style("✗").red().bold(),
            Verdict::Flaky => style("⚠").yellow().bold(),
            Verdict::Error => style("!").red().bold(),
        };
        println!(
            "  {mark} {} [{}] {}",
            result.result.test_id, result.verdict, result.validation_notes
        );
    }

    let s = &report.summary;
    println!();
    println!("{}", style("Summary").bold().underlined());
    println!("  total:  {}", s.total_tests);
    println!("  passed: {}", style(s.passed).green());
    println!("  failed: {}", style(s.failed).red());
    println!("  flaky:  {}", style(s.flaky).yellow());
    println!("  errors: {}", style(s.errors).red());
    println!("  avg reproducibility: {:.2}", s.avg_reproducibility);

    if !report.triage_notes.is_empty() {
        println!();
        println!("{}", style("Triage").bold().underlined());
        for note in &report.triage_notes {
            println!("  {note}");
        }
    }

    for rec in &report.recommendations {
        println!("  {}", style(rec).dim());
    }
}

/// Print the parsed suite for the check command
pub fn print_suite(tests: &[rejugar::TestDefinition]) {
    println!("{}", style(format!("{} tests", tests.len())).bold());
    for test in tests {
        println!(
            "  {} [{:?}] {} step(s), expects: {}",
            style(&test.id).bold(),
            test.priority,
            test.steps.len(),
            test.expected
        );
    }
}
