//! Test suite definitions and parsing.
//!
//! Suites arrive either as JSON or as the compact pipe format produced by
//! upstream planners, one test per line:
//!
//! ```text
//! TEST_01|Happy Path|HIGH|Click English > Match pairs until win|Player wins
//! ```
//!
//! Step text stays free-form; the only thing decided at parse time is
//! whether a step plays a move or merely waits.

use crate::result::{RejugarError, RejugarResult};
use serde::{Deserialize, Serialize};

/// What a step asks the executor to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    /// Perform one heuristic move on the board
    Play,
    /// Let the page settle without interacting
    Wait,
}

/// A single test step, classified when the suite is loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct TestStep {
    /// Original step text
    pub raw: String,
    /// Action class the executor dispatches on
    pub kind: StepKind,
}

impl TestStep {
    const PLAY_KEYWORDS: [&'static str; 4] = ["play", "click", "match", "select"];

    /// Classify a raw step line
    #[must_use]
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let lowered = raw.to_lowercase();

        let kind = if Self::PLAY_KEYWORDS.iter().any(|k| lowered.contains(k)) {
            StepKind::Play
        } else {
            // "wait" and anything unrecognized both settle without input
            StepKind::Wait
        };

        Self { raw, kind }
    }
}

impl From<String> for TestStep {
    fn from(raw: String) -> Self {
        Self::parse(raw)
    }
}

impl From<TestStep> for String {
    fn from(step: TestStep) -> Self {
        step.raw
    }
}

/// Test priority as assigned by the planner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    /// Must-run coverage
    High,
    /// Default priority
    Medium,
    /// Nice-to-have coverage
    Low,
}

impl Priority {
    fn parse(text: &str) -> Self {
        match text.trim().to_uppercase().as_str() {
            "HIGH" => Self::High,
            "LOW" => Self::Low,
            _ => Self::Medium,
        }
    }
}

/// One test case to execute twice and classify
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestDefinition {
    /// Stable identifier, e.g. `TEST_01`
    pub id: String,
    /// Human-readable category
    pub category: String,
    /// Planner priority
    pub priority: Priority,
    /// Ordered steps
    pub steps: Vec<TestStep>,
    /// Expected outcome text; drives win/lose classification
    pub expected: String,
}

impl TestDefinition {
    /// True when the expected outcome describes a win
    #[must_use]
    pub fn expects_win(&self) -> bool {
        let lowered = self.expected.to_lowercase();
        lowered.contains("win") || lowered.contains("success")
    }
}

/// Parse the pipe format, skipping malformed lines
///
/// A well-formed line has exactly five `|`-separated fields; steps within
/// the fourth field are separated by `>`. Blank lines are ignored and
/// malformed lines are logged and dropped rather than failing the suite.
#[must_use]
pub fn parse_pipe_suite(text: &str) -> Vec<TestDefinition> {
    let mut tests = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split('|').collect();
        if fields.len() != 5 {
            tracing::warn!(line, "skipping malformed test line");
            continue;
        }

        let steps = fields[3]
            .split('>')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(TestStep::parse)
            .collect();

        tests.push(TestDefinition {
            id: fields[0].trim().to_string(),
            category: fields[1].trim().to_string(),
            priority: Priority::parse(fields[2]),
            steps,
            expected: fields[4].trim().to_string(),
        });
    }

    tests
}

/// Load a suite from JSON text
///
/// # Errors
///
/// Returns [`RejugarError::SuiteFormat`] if the JSON does not describe a
/// list of test definitions.
pub fn parse_json_suite(text: &str) -> RejugarResult<Vec<TestDefinition>> {
    serde_json::from_str(text).map_err(|e| RejugarError::SuiteFormat {
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    mod step_classification {
        use super::*;

        #[test]
        fn play_keywords_are_recognized() {
            for raw in [
                "Click the English button",
                "Match pairs until the board clears",
                "Select two tiles summing to ten",
                "Play one move",
            ] {
                assert_eq!(TestStep::parse(raw).kind, StepKind::Play, "{raw}");
            }
        }

        #[test]
        fn wait_and_unknown_steps_settle() {
            assert_eq!(TestStep::parse("Wait for the timer").kind, StepKind::Wait);
            assert_eq!(TestStep::parse("Observe the board").kind, StepKind::Wait);
        }

        #[test]
        fn raw_text_is_preserved() {
            let step = TestStep::parse("Click English");
            assert_eq!(step.raw, "Click English");
        }
    }

    mod pipe_format {
        use super::*;

        #[test]
        fn parses_well_formed_lines() {
            let text = "TEST_01|Happy Path|HIGH|Click English > Match pairs until win|Player wins\n\
                        TEST_02|Edge Case|LOW|Wait 5 seconds|Timer decreases";
            let tests = parse_pipe_suite(text);

            assert_eq!(tests.len(), 2);
            assert_eq!(tests[0].id, "TEST_01");
            assert_eq!(tests[0].priority, Priority::High);
            assert_eq!(tests[0].steps.len(), 2);
            assert_eq!(tests[0].steps[0].kind, StepKind::Play);
            assert!(tests[0].expects_win());
            assert_eq!(tests[1].priority, Priority::Low);
            assert_eq!(tests[1].steps[0].kind, StepKind::Wait);
            assert!(!tests[1].expects_win());
        }

        #[test]
        fn skips_malformed_lines() {
            let text = "garbage line\n\
                        TEST_01|Happy Path|HIGH|Play|Player wins\n\
                        TEST_02|too|few|fields";
            let tests = parse_pipe_suite(text);

            assert_eq!(tests.len(), 1);
            assert_eq!(tests[0].id, "TEST_01");
        }

        #[test]
        fn blank_lines_are_ignored() {
            assert!(parse_pipe_suite("\n   \n").is_empty());
        }

        #[test]
        fn unknown_priority_defaults_to_medium() {
            let tests = parse_pipe_suite("TEST_01|Cat|URGENT|Play|wins");
            assert_eq!(tests[0].priority, Priority::Medium);
        }
    }

    mod json_format {
        use super::*;

        #[test]
        fn round_trips_step_as_plain_string() {
            let json = r#"[{
                "id": "TEST_01",
                "category": "Happy Path",
                "priority": "HIGH",
                "steps": ["Click English", "Wait for board"],
                "expected": "Player wins"
            }]"#;

            let tests = parse_json_suite(json).unwrap();
            assert_eq!(tests[0].steps[0].kind, StepKind::Play);
            assert_eq!(tests[0].steps[1].kind, StepKind::Wait);

            let back = serde_json::to_value(&tests[0].steps).unwrap();
            assert_eq!(back, serde_json::json!(["Click English", "Wait for board"]));
        }

        #[test]
        fn rejects_non_suite_json() {
            assert!(parse_json_suite("{\"not\": \"a suite\"}").is_err());
        }

        #[test]
        fn success_counts_as_expected_win() {
            let tests = parse_pipe_suite("TEST_01|Cat|HIGH|Play|Successful completion");
            assert!(tests[0].expects_win());
        }
    }
}
