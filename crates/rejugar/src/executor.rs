//! Attempt orchestration: runs each test twice against fresh page sessions.
//!
//! One attempt is one full pass through a test case — navigate, clear the
//! onboarding flow, play the scripted steps with the pairing heuristic, and
//! capture start/end screenshots plus a markup digest. The whole attempt
//! body runs under a hard deadline; the session is torn down whether the
//! attempt finishes, faults, or times out. A session that cannot even be
//! opened is an environment fault and aborts the run.

use crate::driver::{GamePage, PageFactory};
use crate::heuristic;
use crate::observe;
use crate::result::RejugarResult;
use crate::suite::{StepKind, TestDefinition};
use crate::verdict::{Attempt, AttemptStatus, ScreenshotRefs};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use std::time::Duration;

/// Every test is executed exactly this many times
pub const ATTEMPTS_PER_TEST: u8 = 2;

/// Extra settle after clicking through a language or tutorial gate
const GATE_SETTLE: Duration = Duration::from_millis(1500);

/// How long a wait step lets the page sit
const WAIT_STEP_DELAY: Duration = Duration::from_secs(1);

/// Execution timing and artifact configuration
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Deadline for navigation and page readiness
    pub page_timeout: Duration,
    /// Hard deadline for one whole attempt
    pub attempt_timeout: Duration,
    /// Settle after navigation completes
    pub settle_delay: Duration,
    /// Pause between individual clicks
    pub step_delay: Duration,
    /// Pause between consecutive tests
    pub inter_test_delay: Duration,
    /// Maximum heuristic moves played to clear onboarding
    pub warmup_moves: usize,
    /// Directory receiving screenshots
    pub artifacts_dir: PathBuf,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            page_timeout: Duration::from_secs(15),
            attempt_timeout: Duration::from_secs(30),
            settle_delay: Duration::from_secs(1),
            step_delay: Duration::from_millis(500),
            inter_test_delay: Duration::from_secs(2),
            warmup_moves: 12,
            artifacts_dir: PathBuf::from("artifacts"),
        }
    }
}

impl ExecutorConfig {
    /// Set the attempt deadline
    #[must_use]
    pub const fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    /// Set the navigation deadline
    #[must_use]
    pub const fn with_page_timeout(mut self, timeout: Duration) -> Self {
        self.page_timeout = timeout;
        self
    }

    /// Set the artifacts directory
    #[must_use]
    pub fn with_artifacts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifacts_dir = dir.into();
        self
    }

    /// Collapse all settle/step/inter-test pauses to zero
    #[must_use]
    pub const fn without_delays(mut self) -> Self {
        self.settle_delay = Duration::ZERO;
        self.step_delay = Duration::ZERO;
        self.inter_test_delay = Duration::ZERO;
        self
    }
}

/// Raw outcome of executing one test case twice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    /// Test identifier
    pub test_id: String,
    /// Test category as named by the planner
    pub test_name: String,
    /// Step texts as executed
    pub steps: Vec<String>,
    /// Expected outcome text
    pub expected: String,
    /// Both attempts, in order
    pub attempts: Vec<Attempt>,
    /// All artifacts this test produced
    pub artifacts: Vec<PathBuf>,
}

/// Sequential test executor
///
/// Generic over the page factory so the orchestration logic is testable
/// without a browser.
#[derive(Debug)]
pub struct Executor<F> {
    factory: F,
    config: ExecutorConfig,
}

impl<F: PageFactory> Executor<F> {
    /// Create an executor over the given session factory
    pub fn new(factory: F, config: ExecutorConfig) -> Self {
        Self { factory, config }
    }

    /// Execute all tests in order, two attempts each
    ///
    /// # Errors
    ///
    /// Returns error only for environment faults: the artifacts directory
    /// cannot be created, or a page session cannot be opened. Failures
    /// inside an attempt are captured in the attempt itself.
    pub async fn execute_suite(
        &self,
        url: &str,
        tests: &[TestDefinition],
    ) -> RejugarResult<Vec<TestResult>> {
        tokio::fs::create_dir_all(&self.config.artifacts_dir).await?;

        let mut results = Vec::with_capacity(tests.len());
        for (index, test) in tests.iter().enumerate() {
            tracing::info!(test_id = %test.id, category = %test.category, "executing test");

            let mut attempts = Vec::with_capacity(usize::from(ATTEMPTS_PER_TEST));
            for number in 1..=ATTEMPTS_PER_TEST {
                attempts.push(self.run_attempt(url, test, number).await?);
            }

            let artifacts = self.collect_artifacts(&test.id).await?;
            results.push(TestResult {
                test_id: test.id.clone(),
                test_name: test.category.clone(),
                steps: test.steps.iter().map(|s| s.raw.clone()).collect(),
                expected: test.expected.clone(),
                attempts,
                artifacts,
            });

            if index + 1 < tests.len() {
                tokio::time::sleep(self.config.inter_test_delay).await;
            }
        }

        Ok(results)
    }

    /// Run one attempt under the attempt deadline
    ///
    /// The session is opened outside the deadline: a factory failure is an
    /// environment fault and propagates. Everything after that is folded
    /// into the returned [`Attempt`].
    async fn run_attempt(
        &self,
        url: &str,
        test: &TestDefinition,
        number: u8,
    ) -> RejugarResult<Attempt> {
        let mut page = self.factory.open().await?;

        let outcome = tokio::time::timeout(
            self.config.attempt_timeout,
            self.attempt_body(&mut page, url, test, number),
        )
        .await;

        if let Err(e) = page.close().await {
            tracing::warn!(error = %e, "session teardown failed");
        }

        Ok(match outcome {
            Ok(Ok(attempt)) => attempt,
            Ok(Err(e)) => {
                tracing::warn!(test_id = %test.id, attempt = number, error = %e, "attempt faulted");
                Attempt::errored(number, e.to_string())
            }
            Err(_) => {
                tracing::warn!(test_id = %test.id, attempt = number, "attempt deadline exceeded");
                Attempt::timed_out(number)
            }
        })
    }

    async fn attempt_body(
        &self,
        page: &mut F::Page,
        url: &str,
        test: &TestDefinition,
        number: u8,
    ) -> RejugarResult<Attempt> {
        page.navigate(url, self.config.page_timeout).await?;
        tokio::time::sleep(self.config.settle_delay).await;

        // Language gate, when the page shows one
        let elements = page.visible_elements().await?;
        if let Some(control) = observe::find_control(&elements, "English") {
            let (x, y) = control.center();
            page.click_at(x, y).await?;
            tokio::time::sleep(GATE_SETTLE).await;
        }

        // Clear onboarding by playing until the board stops offering moves
        for _ in 0..self.config.warmup_moves {
            if !self.play_one_move(page).await? {
                break;
            }
        }

        // Tutorial completion popup, under any of its labels
        let elements = page.visible_elements().await?;
        if let Some(button) = ["Continue", "OK", "Next"]
            .iter()
            .find_map(|label| observe::find_control(&elements, label))
        {
            let (x, y) = button.center();
            page.click_at(x, y).await?;
            tokio::time::sleep(GATE_SETTLE).await;
        }

        let start = self.capture(page, &test.id, number, "start").await?;

        for step in &test.steps {
            match step.kind {
                StepKind::Play => {
                    self.play_one_move(page).await?;
                }
                StepKind::Wait => tokio::time::sleep(WAIT_STEP_DELAY).await,
            }
        }

        let end = self.capture(page, &test.id, number, "end").await?;

        let markup = page.content().await?;
        let content_hash = format!("{:x}", Sha256::digest(markup.as_bytes()));

        let status = if test.expects_win() {
            AttemptStatus::Win
        } else {
            AttemptStatus::Lose
        };

        Ok(Attempt::completed(
            number,
            status,
            content_hash,
            ScreenshotRefs { start, end },
        ))
    }

    /// Play one heuristic move: click a pair, or reshuffle, or report that
    /// the board offers nothing to do
    async fn play_one_move(&self, page: &F::Page) -> RejugarResult<bool> {
        let elements = page.visible_elements().await?;
        let tiles = observe::tiles_from_elements(&elements);

        if let Some(mv) = heuristic::select_move(&tiles) {
            let (first, second) = (tiles[mv.first], tiles[mv.second]);
            page.click_at(first.x, first.y).await?;
            tokio::time::sleep(self.config.step_delay).await;
            page.click_at(second.x, second.y).await?;
            tokio::time::sleep(self.config.step_delay).await;
            return Ok(true);
        }

        if let Some(plus) = observe::find_control(&elements, "+") {
            let (x, y) = plus.center();
            page.click_at(x, y).await?;
            tokio::time::sleep(self.config.step_delay).await;
            return Ok(true);
        }

        Ok(false)
    }

    async fn capture(
        &self,
        page: &F::Page,
        test_id: &str,
        attempt: u8,
        suffix: &str,
    ) -> RejugarResult<PathBuf> {
        let data = page.screenshot().await?;
        let path = self
            .config
            .artifacts_dir
            .join(format!("{test_id}_attempt{attempt}_{suffix}.png"));
        tokio::fs::write(&path, &data).await?;
        Ok(path)
    }

    /// All artifacts in the output directory belonging to one test
    async fn collect_artifacts(&self, test_id: &str) -> RejugarResult<Vec<PathBuf>> {
        let prefix = format!("{test_id}_");
        let mut found = Vec::new();

        let mut entries = tokio::fs::read_dir(&self.config.artifacts_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_name().to_string_lossy().starts_with(&prefix) {
                found.push(entry.path());
            }
        }

        found.sort();
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{history_contains, MockFactory, MockPage};
    use crate::observe::VisibleElement;
    use crate::suite::parse_pipe_suite;
    use crate::verdict::AttemptStatus;

    fn digit(text: &str, x: f64, y: f64) -> VisibleElement {
        VisibleElement {
            text: text.to_string(),
            x,
            y,
            width: 40.0,
            height: 40.0,
            opacity: 1.0,
        }
    }

    fn fast_config(dir: &std::path::Path) -> ExecutorConfig {
        ExecutorConfig::default()
            .with_artifacts_dir(dir)
            .without_delays()
    }

    fn suite(line: &str) -> Vec<TestDefinition> {
        parse_pipe_suite(line)
    }

    mod full_runs {
        use super::*;

        #[tokio::test]
        async fn two_attempts_with_artifacts() {
            let dir = tempfile::tempdir().unwrap();
            let factory = MockFactory::new();
            let executor = Executor::new(factory, fast_config(dir.path()));
            let tests = suite("TEST_01|Happy Path|HIGH|Play one move|Player wins");

            let results = executor.execute_suite("http://game.test", &tests).await.unwrap();

            assert_eq!(results.len(), 1);
            let result = &results[0];
            assert_eq!(result.attempts.len(), 2);
            assert_eq!(result.attempts[0].attempt, 1);
            assert_eq!(result.attempts[1].attempt, 2);
            assert_eq!(result.test_name, "Happy Path");

            // start + end screenshot per attempt
            assert_eq!(result.artifacts.len(), 4);
            for path in &result.artifacts {
                assert!(path.exists(), "{path:?} not written");
            }
        }

        #[tokio::test]
        async fn artifact_names_carry_test_and_attempt() {
            let dir = tempfile::tempdir().unwrap();
            let executor = Executor::new(MockFactory::new(), fast_config(dir.path()));
            let tests = suite("TEST_07|Cat|HIGH|Wait|loses");

            let results = executor.execute_suite("http://game.test", &tests).await.unwrap();

            let names: Vec<String> = results[0]
                .artifacts
                .iter()
                .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
                .collect();
            assert_eq!(
                names,
                vec![
                    "TEST_07_attempt1_end.png",
                    "TEST_07_attempt1_start.png",
                    "TEST_07_attempt2_end.png",
                    "TEST_07_attempt2_start.png",
                ]
            );
        }

        #[tokio::test]
        async fn identical_pages_hash_identically() {
            let dir = tempfile::tempdir().unwrap();
            let factory = MockFactory::new();
            factory.push(MockPage::new().with_html("<html>final</html>"));
            factory.push(MockPage::new().with_html("<html>final</html>"));
            let executor = Executor::new(factory, fast_config(dir.path()));
            let tests = suite("TEST_01|Cat|HIGH|Play|wins");

            let results = executor.execute_suite("http://game.test", &tests).await.unwrap();

            let attempts = &results[0].attempts;
            assert_eq!(attempts[0].status, AttemptStatus::Win);
            assert!(attempts[0].content_hash.is_some());
            assert_eq!(attempts[0].content_hash, attempts[1].content_hash);
        }

        #[tokio::test]
        async fn expected_loss_marks_lose() {
            let dir = tempfile::tempdir().unwrap();
            let executor = Executor::new(MockFactory::new(), fast_config(dir.path()));
            let tests = suite("TEST_02|Cat|HIGH|Wait|Timer runs out");

            let results = executor.execute_suite("http://game.test", &tests).await.unwrap();
            assert_eq!(results[0].attempts[0].status, AttemptStatus::Lose);
        }
    }

    mod fault_capture {
        use super::*;

        #[tokio::test]
        async fn navigation_failure_becomes_error_attempt() {
            let dir = tempfile::tempdir().unwrap();
            let factory = MockFactory::new();
            factory.push(MockPage::new().with_nav_failure("connection refused"));
            factory.push(MockPage::new().with_nav_failure("connection refused"));
            let executor = Executor::new(factory, fast_config(dir.path()));
            let tests = suite("TEST_01|Cat|HIGH|Play|wins");

            let results = executor.execute_suite("http://down.test", &tests).await.unwrap();

            for attempt in &results[0].attempts {
                assert_eq!(attempt.status, AttemptStatus::Error);
                assert!(attempt.error.as_deref().unwrap().contains("connection refused"));
                assert!(attempt.content_hash.is_none());
            }
        }

        #[tokio::test]
        async fn slow_page_times_out() {
            let dir = tempfile::tempdir().unwrap();
            let page = MockPage::new().with_interaction_delay(Duration::from_millis(200));
            let calls = page.calls_handle();
            let factory = MockFactory::new();
            factory.push(page);
            factory.push(MockPage::new().with_interaction_delay(Duration::from_millis(200)));
            let config = fast_config(dir.path())
                .with_attempt_timeout(Duration::from_millis(50));
            let executor = Executor::new(factory, config);
            let tests = suite("TEST_01|Cat|HIGH|Play|wins");

            let results = executor.execute_suite("http://slow.test", &tests).await.unwrap();

            for attempt in &results[0].attempts {
                assert_eq!(attempt.status, AttemptStatus::Timeout);
                assert_eq!(attempt.error.as_deref(), Some("Attempt timed out"));
            }
            // The session is torn down even when the deadline cancelled it
            assert!(history_contains(&calls, "close"));
        }

        #[tokio::test]
        async fn session_is_closed_even_on_failure() {
            let dir = tempfile::tempdir().unwrap();
            let page = MockPage::new().with_nav_failure("boom");
            let calls = page.calls_handle();
            let factory = MockFactory::new();
            factory.push(page);
            factory.push(MockPage::new());
            let executor = Executor::new(factory, fast_config(dir.path()));
            let tests = suite("TEST_01|Cat|HIGH|Play|wins");

            executor.execute_suite("http://down.test", &tests).await.unwrap();

            assert!(history_contains(&calls, "close"));
        }
    }

    mod play_protocol {
        use super::*;

        #[tokio::test]
        async fn pairs_on_the_board_get_clicked() {
            let dir = tempfile::tempdir().unwrap();
            let page = MockPage::new().with_snapshot(vec![
                digit("3", 100.0, 100.0),
                digit("7", 200.0, 100.0),
            ]);
            let calls = page.calls_handle();
            let factory = MockFactory::new();
            factory.push(page);
            factory.push(MockPage::new());
            let executor = Executor::new(factory, fast_config(dir.path()));
            let tests = suite("TEST_01|Cat|HIGH|Match a pair|wins");

            executor.execute_suite("http://game.test", &tests).await.unwrap();

            // 3 + 7 = 10: both tile centers are clicked
            assert!(history_contains(&calls, "click:120,120"));
            assert!(history_contains(&calls, "click:220,120"));
        }

        #[tokio::test]
        async fn empty_board_falls_back_to_reshuffle() {
            let dir = tempfile::tempdir().unwrap();
            let page = MockPage::new().with_snapshot(vec![
                digit("3", 100.0, 100.0),
                digit("4", 200.0, 100.0),
                digit("+", 300.0, 100.0),
            ]);
            let calls = page.calls_handle();
            let factory = MockFactory::new();
            factory.push(page);
            factory.push(MockPage::new());
            let executor = Executor::new(factory, fast_config(dir.path()));
            let tests = suite("TEST_01|Cat|HIGH|Match a pair|wins");

            executor.execute_suite("http://game.test", &tests).await.unwrap();

            // no valid pair among {3, 4}: the "+" control is the move
            assert!(history_contains(&calls, "click:320,120"));
        }
    }
}
