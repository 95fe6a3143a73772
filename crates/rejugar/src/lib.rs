//! Rejugar: Reproducibility Testing for Browser Tile-Matching Games
//!
//! Rejugar (Spanish: "to replay") executes each generated test case twice
//! against a live game page and classifies how reproducible the outcome is.
//! The game is driven blind: the only knowledge of the page is what a
//! generic element snapshot reveals, and the only input is coordinate
//! clicks chosen by a pairing heuristic.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    REJUGAR Pipeline                          │
//! ├──────────────────────────────────────────────────────────────┤
//! │   ┌──────────┐   ┌───────────┐   ┌──────────┐   ┌─────────┐ │
//! │   │ Suite    │   │ Executor  │   │ Verdict  │   │ Report  │ │
//! │   │ (pipe or │──►│ 2 attempts│──►│ PASS/FAIL│──►│ JSON +  │ │
//! │   │  JSON)   │   │ per test  │   │ FLAKY/ERR│   │ triage  │ │
//! │   └──────────┘   └───────────┘   └──────────┘   └─────────┘ │
//! └──────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::float_cmp))]

mod browser;
mod context;
mod driver;
mod executor;
mod heuristic;
mod observe;
mod report;
mod result;
mod suite;
mod verdict;

pub use browser::{BrowserConfig, ChromiumFactory, ChromiumSession};
pub use context::{RunContext, RunPhase};
pub use driver::{GamePage, MockFactory, MockPage, PageFactory};
pub use executor::{Executor, ExecutorConfig, TestResult, ATTEMPTS_PER_TEST};
pub use heuristic::{is_valid_pair, select_move, Move};
pub use observe::{find_control, tiles_from_elements, Tile, VisibleElement};
pub use report::{ClassifiedResult, GameInfo, Report, Summary};
pub use result::{RejugarError, RejugarResult};
pub use suite::{parse_json_suite, parse_pipe_suite, Priority, StepKind, TestDefinition, TestStep};
pub use verdict::{classify, Attempt, AttemptStatus, ScreenshotRefs, Validation, Verdict};
