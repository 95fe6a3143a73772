//! Report aggregation: classified results rolled up into one JSON document.
//!
//! The report is the single artifact downstream consumers read — summary
//! counters, per-test verdicts, triage notes for everything that did not
//! pass, and coarse recommendations derived from the summary.

use crate::executor::TestResult;
use crate::result::RejugarResult;
use crate::verdict::{classify, Verdict};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// What is known about the game under test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameInfo {
    /// Game URL
    pub url: String,
    /// Game genre or mechanic
    #[serde(rename = "type")]
    pub game_type: String,
    /// Rules description
    pub rules: String,
    /// What counts as winning
    pub win_condition: String,
}

impl Default for GameInfo {
    fn default() -> Self {
        Self {
            url: "unknown".to_string(),
            game_type: "unknown".to_string(),
            rules: "unknown".to_string(),
            win_condition: "unknown".to_string(),
        }
    }
}

/// A test result with its reproducibility classification attached
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifiedResult {
    /// Raw execution outcome
    #[serde(flatten)]
    pub result: TestResult,
    /// Classified verdict
    pub verdict: Verdict,
    /// Reproducibility confidence in [0, 1]
    pub reproducibility_score: f64,
    /// Human-readable classification note
    pub validation_notes: String,
}

impl ClassifiedResult {
    /// Classify a raw result
    #[must_use]
    pub fn from_result(result: TestResult) -> Self {
        let validation = classify(&result.attempts);
        Self {
            result,
            verdict: validation.verdict,
            reproducibility_score: validation.score,
            validation_notes: validation.notes,
        }
    }
}

/// Suite-level counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Number of tests executed
    pub total_tests: usize,
    /// Tests with verdict PASS
    pub passed: usize,
    /// Tests with verdict FAIL
    pub failed: usize,
    /// Tests with verdict FLAKY
    pub flaky: usize,
    /// Tests with verdict ERROR
    pub errors: usize,
    /// Mean reproducibility score, 0 for an empty suite
    pub avg_reproducibility: f64,
}

impl Summary {
    fn from_results(results: &[ClassifiedResult]) -> Self {
        let count = |v: Verdict| results.iter().filter(|r| r.verdict == v).count();

        let avg_reproducibility = if results.is_empty() {
            0.0
        } else {
            results.iter().map(|r| r.reproducibility_score).sum::<f64>() / results.len() as f64
        };

        Self {
            total_tests: results.len(),
            passed: count(Verdict::Pass),
            failed: count(Verdict::Fail),
            flaky: count(Verdict::Flaky),
            errors: count(Verdict::Error),
            avg_reproducibility,
        }
    }
}

/// The final run report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Stable identifier, also used as the report file name
    pub report_id: String,
    /// Report creation time, RFC 3339
    pub timestamp: String,
    /// Game URL
    pub game_url: String,
    /// Game analysis echoed from the run input
    pub game_analysis: GameInfo,
    /// Suite-level counters
    pub summary: Summary,
    /// All classified results
    pub test_results: Vec<ClassifiedResult>,
    /// One note per non-passing test
    pub triage_notes: Vec<String>,
    /// Coarse follow-up advice derived from the summary
    pub recommendations: Vec<String>,
}

impl Report {
    /// Build a report stamped with the current local time
    #[must_use]
    pub fn build(game_info: GameInfo, results: Vec<ClassifiedResult>) -> Self {
        Self::build_at(game_info, results, Local::now())
    }

    /// Build a report stamped with an explicit time
    #[must_use]
    pub fn build_at(
        game_info: GameInfo,
        results: Vec<ClassifiedResult>,
        now: DateTime<Local>,
    ) -> Self {
        let summary = Summary::from_results(&results);

        Self {
            report_id: now.format("report_%Y%m%d_%H%M%S").to_string(),
            timestamp: now.to_rfc3339(),
            game_url: game_info.url.clone(),
            triage_notes: triage_notes(&results),
            recommendations: recommendations(&summary),
            game_analysis: game_info,
            summary,
            test_results: results,
        }
    }

    /// Write the report as pretty JSON into `dir`, named after `report_id`
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created or the file cannot
    /// be written.
    pub fn persist(&self, dir: &Path) -> RejugarResult<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}.json", self.report_id));
        std::fs::write(&path, serde_json::to_string_pretty(self)?)?;
        tracing::info!(path = %path.display(), "report saved");
        Ok(path)
    }
}

fn triage_notes(results: &[ClassifiedResult]) -> Vec<String> {
    let mut notes: Vec<String> = results
        .iter()
        .filter(|r| !r.verdict.is_pass())
        .map(|r| {
            format!(
                "{} [{}]: {}",
                r.result.test_id, r.verdict, r.validation_notes
            )
        })
        .collect();

    if notes.is_empty() {
        notes.push("No issues detected. All tests passed successfully.".to_string());
    }

    notes
}

fn recommendations(summary: &Summary) -> Vec<String> {
    let mut recs = Vec::new();
    let total = summary.total_tests as f64;

    if summary.errors as f64 > total * 0.3 {
        recs.push(
            "High error rate detected. Consider increasing timeouts and improving wait conditions."
                .to_string(),
        );
    }

    if summary.flaky as f64 > total * 0.2 {
        recs.push(
            "High flaky rate detected. Game behavior may be non-deterministic or tests may have timing issues."
                .to_string(),
        );
    }

    if summary.failed > 0 {
        recs.push(
            "Failing tests detected. Review artifacts and triage notes for potential bugs."
                .to_string(),
        );
    }

    // Vacuously true for an empty suite; kept because an empty run has
    // nothing actionable to say either way.
    if summary.passed == summary.total_tests {
        recs.push("All tests passed. Consider adding more edge or stress tests.".to_string());
    }

    recs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verdict::{Attempt, AttemptStatus, ScreenshotRefs};
    use chrono::TimeZone;

    fn shot_refs() -> ScreenshotRefs {
        ScreenshotRefs {
            start: PathBuf::from("a_start.png"),
            end: PathBuf::from("a_end.png"),
        }
    }

    fn raw_result(id: &str, first: AttemptStatus, second: AttemptStatus) -> TestResult {
        TestResult {
            test_id: id.to_string(),
            test_name: "Happy Path".to_string(),
            steps: vec!["Play one move".to_string()],
            expected: "Player wins".to_string(),
            attempts: vec![
                Attempt::completed(1, first, "aaaa", shot_refs()),
                Attempt::completed(2, second, "bbbb", shot_refs()),
            ],
            artifacts: vec![],
        }
    }

    fn classified(id: &str, first: AttemptStatus, second: AttemptStatus) -> ClassifiedResult {
        ClassifiedResult::from_result(raw_result(id, first, second))
    }

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap()
    }

    mod summary_counters {
        use super::*;

        #[test]
        fn counts_each_verdict_once() {
            let results = vec![
                classified("TEST_01", AttemptStatus::Win, AttemptStatus::Win),
                classified("TEST_02", AttemptStatus::Lose, AttemptStatus::Lose),
                classified("TEST_03", AttemptStatus::Win, AttemptStatus::Lose),
                classified("TEST_04", AttemptStatus::Error, AttemptStatus::Error),
            ];

            let report = Report::build_at(GameInfo::default(), results, fixed_time());
            let s = &report.summary;

            assert_eq!(s.total_tests, 4);
            assert_eq!(s.passed, 1);
            assert_eq!(s.failed, 1);
            assert_eq!(s.flaky, 1);
            assert_eq!(s.errors, 1);
            assert_eq!(s.passed + s.failed + s.flaky + s.errors, s.total_tests);
        }

        #[test]
        fn avg_is_mean_of_scores() {
            let results = vec![
                classified("TEST_01", AttemptStatus::Win, AttemptStatus::Win),
                classified("TEST_02", AttemptStatus::Win, AttemptStatus::Lose),
            ];

            let report = Report::build_at(GameInfo::default(), results, fixed_time());
            // one consistent (score depends on hash match) + one flaky (0.0)
            assert!((report.summary.avg_reproducibility - 0.4).abs() < 1e-9);
        }

        #[test]
        fn empty_suite_has_zero_average() {
            let report = Report::build_at(GameInfo::default(), vec![], fixed_time());
            assert_eq!(report.summary.total_tests, 0);
            assert_eq!(report.summary.avg_reproducibility, 0.0);
        }
    }

    mod notes_and_recommendations {
        use super::*;

        #[test]
        fn non_pass_results_get_triage_lines() {
            let results = vec![
                classified("TEST_01", AttemptStatus::Win, AttemptStatus::Win),
                classified("TEST_02", AttemptStatus::Win, AttemptStatus::Lose),
            ];

            let report = Report::build_at(GameInfo::default(), results, fixed_time());

            assert_eq!(report.triage_notes.len(), 1);
            assert!(report.triage_notes[0].starts_with("TEST_02 [FLAKY]: "));
        }

        #[test]
        fn all_pass_yields_single_clean_note() {
            let results = vec![classified("TEST_01", AttemptStatus::Win, AttemptStatus::Win)];
            let report = Report::build_at(GameInfo::default(), results, fixed_time());

            assert_eq!(
                report.triage_notes,
                vec!["No issues detected. All tests passed successfully."]
            );
            assert_eq!(
                report.recommendations,
                vec!["All tests passed. Consider adding more edge or stress tests."]
            );
        }

        #[test]
        fn failure_and_error_rates_drive_recommendations() {
            let results = vec![
                classified("TEST_01", AttemptStatus::Error, AttemptStatus::Error),
                classified("TEST_02", AttemptStatus::Lose, AttemptStatus::Lose),
            ];

            let report = Report::build_at(GameInfo::default(), results, fixed_time());

            assert!(report
                .recommendations
                .iter()
                .any(|r| r.starts_with("High error rate detected.")));
            assert!(report
                .recommendations
                .iter()
                .any(|r| r.starts_with("Failing tests detected.")));
            assert!(!report
                .recommendations
                .iter()
                .any(|r| r.starts_with("All tests passed.")));
        }

        #[test]
        fn empty_suite_still_reports_all_passed() {
            let report = Report::build_at(GameInfo::default(), vec![], fixed_time());
            assert_eq!(
                report.recommendations,
                vec!["All tests passed. Consider adding more edge or stress tests."]
            );
        }
    }

    mod document_shape {
        use super::*;

        #[test]
        fn report_id_encodes_the_timestamp() {
            let report = Report::build_at(GameInfo::default(), vec![], fixed_time());
            assert_eq!(report.report_id, "report_20250314_092653");
        }

        #[test]
        fn game_type_serializes_as_type() {
            let info = GameInfo {
                url: "http://game.test".to_string(),
                game_type: "tile-matching".to_string(),
                rules: "match pairs".to_string(),
                win_condition: "clear the board".to_string(),
            };

            let value = serde_json::to_value(&info).unwrap();
            assert_eq!(value["type"], "tile-matching");
            assert!(value.get("game_type").is_none());
        }

        #[test]
        fn classified_result_flattens_the_raw_result() {
            let value = serde_json::to_value(classified(
                "TEST_01",
                AttemptStatus::Win,
                AttemptStatus::Win,
            ))
            .unwrap();

            assert_eq!(value["test_id"], "TEST_01");
            assert_eq!(value["verdict"], "PASS");
            assert!(value["validation_notes"].is_string());
        }

        #[test]
        fn persist_writes_named_json() {
            let dir = tempfile::tempdir().unwrap();
            let report = Report::build_at(GameInfo::default(), vec![], fixed_time());

            let path = report.persist(dir.path()).unwrap();

            assert_eq!(
                path.file_name().unwrap().to_string_lossy(),
                "report_20250314_092653.json"
            );
            let loaded: Report =
                serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
            assert_eq!(loaded.report_id, report.report_id);
        }
    }
}
