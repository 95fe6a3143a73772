//! Dual-attempt verdict classification.
//!
//! A test case is executed twice; the two [`Attempt`] records are folded
//! into a single reproducibility [`Verdict`] by [`classify`]. The
//! classifier is a pure function of the attempts of one test — no global
//! or cross-test state feeds it, so calling it twice with the same input
//! yields the same output.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Terminal status of one attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AttemptStatus {
    /// Expected text indicated a win/success outcome
    Win,
    /// Attempt completed without a win indication
    Lose,
    /// Unexpected fault during execution
    Error,
    /// Attempt deadline exceeded
    Timeout,
}

impl AttemptStatus {
    /// Fail-class statuses did not produce a game outcome at all
    #[must_use]
    pub const fn is_fail_class(&self) -> bool {
        matches!(self, Self::Error | Self::Timeout)
    }
}

impl std::fmt::Display for AttemptStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Win => "WIN",
            Self::Lose => "LOSE",
            Self::Error => "ERROR",
            Self::Timeout => "TIMEOUT",
        };
        write!(f, "{s}")
    }
}

/// Reproducibility verdict derived from two attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    /// Both attempts won
    Pass,
    /// Both attempts lost
    Fail,
    /// Attempts disagreed, or one failed to execute
    Flaky,
    /// Neither attempt produced a usable outcome
    Error,
}

impl Verdict {
    /// Check if the verdict is passing
    #[must_use]
    pub const fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
            Self::Flaky => "FLAKY",
            Self::Error => "ERROR",
        };
        write!(f, "{s}")
    }
}

/// Screenshot artifacts captured during one attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenshotRefs {
    /// Captured after onboarding, before the first scripted step
    pub start: PathBuf,
    /// Captured after the last scripted step
    pub end: PathBuf,
}

/// One timed execution of a test case
///
/// Immutable after creation. `status` is always exactly one of the four
/// enumerated kinds; `content_hash` is only present when the attempt ran
/// to completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attempt {
    /// Attempt number (1 or 2)
    pub attempt: u8,
    /// Terminal status
    pub status: AttemptStatus,
    /// Digest of the full page markup at attempt end
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
    /// Start/end screenshot artifacts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshots: Option<ScreenshotRefs>,
    /// Fault message for ERROR attempts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Attempt {
    /// Create a completed attempt with a game outcome
    #[must_use]
    pub fn completed(
        attempt: u8,
        status: AttemptStatus,
        content_hash: impl Into<String>,
        screenshots: ScreenshotRefs,
    ) -> Self {
        Self {
            attempt,
            status,
            content_hash: Some(content_hash.into()),
            screenshots: Some(screenshots),
            error: None,
        }
    }

    /// Create an attempt that faulted during execution
    #[must_use]
    pub fn errored(attempt: u8, message: impl Into<String>) -> Self {
        Self {
            attempt,
            status: AttemptStatus::Error,
            content_hash: None,
            screenshots: None,
            error: Some(message.into()),
        }
    }

    /// Create an attempt that exceeded its deadline
    #[must_use]
    pub fn timed_out(attempt: u8) -> Self {
        Self {
            attempt,
            status: AttemptStatus::Timeout,
            content_hash: None,
            screenshots: None,
            error: Some("Attempt timed out".to_string()),
        }
    }
}

/// Output of [`classify`]: verdict, reproducibility score and note
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Validation {
    /// Classified verdict
    pub verdict: Verdict,
    /// Reproducibility confidence in [0, 1]
    pub score: f64,
    /// Human-readable explanation
    pub notes: String,
}

impl Validation {
    fn new(verdict: Verdict, score: f64, notes: impl Into<String>) -> Self {
        Self {
            verdict,
            score,
            notes: notes.into(),
        }
    }
}

/// Classify a test from its attempts.
///
/// The decision table is evaluated in order:
///
/// 1. fewer than 2 attempts: ERROR, 0.0
/// 2. both fail-class (ERROR/TIMEOUT): ERROR, 0.0
/// 3. exactly one fail-class: FLAKY, 0.5
/// 4. both WIN: PASS; both LOSE: FAIL; same but neither: ERROR — score 1.0
///    when both content hashes are present and identical, else 0.8
/// 5. statuses differ: FLAKY, 0.0
#[must_use]
pub fn classify(attempts: &[Attempt]) -> Validation {
    if attempts.len() < 2 {
        return Validation::new(Verdict::Error, 0.0, "Insufficient attempts for validation");
    }

    let (a1, a2) = (&attempts[0], &attempts[1]);
    let (s1, s2) = (a1.status, a2.status);

    if s1.is_fail_class() && s2.is_fail_class() {
        return Validation::new(Verdict::Error, 0.0, "Both attempts failed to execute");
    }

    if s1.is_fail_class() || s2.is_fail_class() {
        return Validation::new(Verdict::Flaky, 0.5, "One attempt failed, one succeeded");
    }

    if s1 == s2 {
        let (verdict, notes) = match s1 {
            AttemptStatus::Win => (Verdict::Pass, "Test passed consistently"),
            AttemptStatus::Lose => (Verdict::Fail, "Test failed consistently"),
            // Fail-class pairs are caught above; kept so the outcome table
            // stays total over the status type
            _ => (Verdict::Error, "Consistent but invalid outcome"),
        };

        let hashes_match = match (&a1.content_hash, &a2.content_hash) {
            (Some(h1), Some(h2)) => h1 == h2,
            _ => false,
        };

        let (score, hash_note) = if hashes_match {
            (1.0, " (identical page state)")
        } else {
            (0.8, " (state variation allowed)")
        };

        return Validation::new(verdict, score, format!("{notes}{hash_note}"));
    }

    Validation::new(Verdict::Flaky, 0.0, format!("Inconsistent results: {s1} vs {s2}"))
}
