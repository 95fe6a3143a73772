//! Run lifecycle: an explicit phase machine instead of a status string.
//!
//! A run walks Idle → Analyzing → Analyzed → TestsGenerated → Executing →
//! Completed; any phase may drop to Error. Illegal transitions are rejected
//! so callers cannot, say, execute a suite that was never generated.

use crate::report::{GameInfo, Report};
use crate::result::{RejugarError, RejugarResult};
use crate::suite::TestDefinition;
use serde::{Deserialize, Serialize};

/// Lifecycle phase of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    /// Nothing has happened yet
    Idle,
    /// Game analysis in progress
    Analyzing,
    /// Game analysis finished
    Analyzed,
    /// Test suite is ready
    TestsGenerated,
    /// Suite execution in progress
    Executing,
    /// Report is available
    Completed,
    /// The run aborted
    Error,
}

impl RunPhase {
    /// Whether this phase may transition to `next`
    #[must_use]
    pub const fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Analyzing)
                | (Self::Analyzing, Self::Analyzed)
                | (Self::Analyzed, Self::TestsGenerated)
                | (Self::TestsGenerated, Self::Executing)
                | (Self::Executing, Self::Completed)
                | (_, Self::Error)
        )
    }
}

impl std::fmt::Display for RunPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Analyzing => "analyzing",
            Self::Analyzed => "analyzed",
            Self::TestsGenerated => "tests_generated",
            Self::Executing => "executing",
            Self::Completed => "completed",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

/// Mutable state accumulated as a run advances
#[derive(Debug, Default)]
pub struct RunContext {
    phase: Option<RunPhase>,
    /// Game analysis, set when Analyzed is reached
    pub game_info: Option<GameInfo>,
    /// Test suite, set when TestsGenerated is reached
    pub tests: Vec<TestDefinition>,
    /// Final report, set when Completed is reached
    pub report: Option<Report>,
}

impl RunContext {
    /// Fresh context in the Idle phase
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase
    #[must_use]
    pub fn phase(&self) -> RunPhase {
        self.phase.unwrap_or(RunPhase::Idle)
    }

    /// Advance to the next phase
    ///
    /// # Errors
    ///
    /// Returns [`RejugarError::InvalidState`] if the transition is not
    /// permitted from the current phase.
    pub fn advance(&mut self, next: RunPhase) -> RejugarResult<()> {
        let current = self.phase();
        if !current.can_advance_to(next) {
            return Err(RejugarError::InvalidState {
                message: format!("cannot move from {current} to {next}"),
            });
        }
        tracing::debug!(from = %current, to = %next, "run phase advanced");
        self.phase = Some(next);
        Ok(())
    }
}
