//! Task priority scoring.
//!
//! Maps a task's importance, effort and due date (plus, for the default
//! strategy, how many peers it blocks) to a priority score with a
//! human-readable explanation.
//!
//! | Strategy | Formula |
//! |----------|---------|
//! | `fastest_wins` | `100 - 10·effort + importance` |
//! | `high_impact` | `10·importance - effort` |
//! | `deadline_driven` (overdue) | `200 + 5·|days_to_due|` |
//! | `deadline_driven` | `100 - days_to_due + importance` |
//! | `smart_balance` | `3·importance - effort + max(0, 10 - days_to_due) + 20·blocked` |
//!
//! `days_to_due` is a signed business-day count (see [`HolidayCalendar`]).
//! Scoring reads `today` from [`ScoringContext`] instead of the system
//! clock, so results are reproducible for a fixed day. Calling on a
//! different day may give a different score.

pub mod calendar;

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ScoringError;
use crate::task::{Task, MAX_IMPORTANCE, MIN_ESTIMATED_HOURS, MIN_IMPORTANCE};

pub use calendar::HolidayCalendar;

/// Tasks more than this many calendar days overdue cannot be scored.
pub const MAX_OVERDUE_DAYS: i64 = 30;

/// Bonus per peer task that lists the scored task as a dependency.
pub const BLOCK_BONUS: f64 = 20.0;

/// Scoring strategy.
///
/// Unknown names resolve to [`Strategy::SmartBalance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Lowest effort first
    FastestWins,
    /// Highest importance first
    HighImpact,
    /// Nearest (or most overdue) due date first
    DeadlineDriven,
    /// Blend of importance, effort, urgency and blocking
    #[default]
    SmartBalance,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::FastestWins,
        Strategy::HighImpact,
        Strategy::DeadlineDriven,
        Strategy::SmartBalance,
    ];

    /// Resolve a strategy name, falling back to `SmartBalance`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "fastest_wins" => Strategy::FastestWins,
            "high_impact" => Strategy::HighImpact,
            "deadline_driven" => Strategy::DeadlineDriven,
            _ => Strategy::SmartBalance,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::FastestWins => "fastest_wins",
            Strategy::HighImpact => "high_impact",
            Strategy::DeadlineDriven => "deadline_driven",
            Strategy::SmartBalance => "smart_balance",
        }
    }

    /// Display name used in explanations.
    pub fn label(&self) -> &'static str {
        match self {
            Strategy::FastestWins => "Fastest Wins",
            Strategy::HighImpact => "High Impact",
            Strategy::DeadlineDriven => "Deadline Driven",
            Strategy::SmartBalance => "Smart Balance",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Environmental inputs to scoring.
#[derive(Debug, Clone, Copy)]
pub struct ScoringContext<'a> {
    pub today: NaiveDate,
    pub calendar: &'a HolidayCalendar,
}

impl<'a> ScoringContext<'a> {
    pub fn new(today: NaiveDate, calendar: &'a HolidayCalendar) -> Self {
        Self { today, calendar }
    }
}

/// Result of scoring one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskScore {
    pub score: f64,
    pub explanation: String,
}

/// Check the preconditions that must hold before any scoring math.
///
/// # Errors
/// In order: due date more than [`MAX_OVERDUE_DAYS`] in the past,
/// importance outside `[1, 10]`, estimated hours below 1.
pub fn check_preconditions(task: &Task, today: NaiveDate) -> Result<(), ScoringError> {
    let days_overdue = (today - task.due_date).num_days();
    if days_overdue > MAX_OVERDUE_DAYS {
        return Err(ScoringError::DueDateTooFarInPast {
            days_overdue,
            max_days: MAX_OVERDUE_DAYS,
        });
    }
    if !(MIN_IMPORTANCE..=MAX_IMPORTANCE).contains(&task.importance) {
        return Err(ScoringError::ImportanceOutOfRange(task.importance));
    }
    if task.estimated_hours < MIN_ESTIMATED_HOURS {
        return Err(ScoringError::EstimatedHoursBelowMinimum(task.estimated_hours));
    }
    Ok(())
}

/// Number of peers that list `task` among their dependencies.
pub fn blocked_count(task: &Task, peers: &[Task]) -> usize {
    peers.iter().filter(|peer| task.blocks(peer)).count()
}

/// Score a task under `strategy`.
///
/// `peers` is only consulted by `SmartBalance`, for the block bonus.
///
/// # Errors
/// Returns a [`ScoringError`] when [`check_preconditions`] fails.
pub fn score_task(
    task: &Task,
    strategy: Strategy,
    peers: Option<&[Task]>,
    ctx: &ScoringContext<'_>,
) -> Result<TaskScore, ScoringError> {
    check_preconditions(task, ctx.today)?;

    let days_to_due = ctx.calendar.business_day_offset(ctx.today, task.due_date);
    let importance = task.importance as f64;
    let effort = task.estimated_hours as f64;
    let label = strategy.label();

    let (score, explanation) = match strategy {
        Strategy::FastestWins => (
            100.0 - effort * 10.0 + importance,
            format!(
                "Strategy: {label} - Lower effort prioritized. Effort: {}h",
                task.estimated_hours
            ),
        ),
        Strategy::HighImpact => (
            importance * 10.0 - effort,
            format!(
                "Strategy: {label} - Importance prioritized. Importance: {}/10",
                task.importance
            ),
        ),
        Strategy::DeadlineDriven if days_to_due < 0 => (
            200.0 + (days_to_due.abs() as f64) * 5.0,
            format!(
                "Strategy: {label} - Overdue ({} business days ago) [HIGH PRIORITY]",
                days_to_due.abs()
            ),
        ),
        Strategy::DeadlineDriven => (
            100.0 - days_to_due as f64 + importance,
            format!("Strategy: {label} - Due in {days_to_due} business days."),
        ),
        Strategy::SmartBalance => {
            let blocked = peers.map_or(0, |p| blocked_count(task, p));
            let urgency = if days_to_due < 0 {
                0
            } else {
                (10 - days_to_due).max(0)
            };
            (
                importance * 3.0 - effort + urgency as f64 + BLOCK_BONUS * blocked as f64,
                format!(
                    "Strategy: {label} - Importance: {}/10, Effort: {}h, Due in {days_to_due} business days, Blocks: {blocked} tasks.",
                    task.importance, task.estimated_hours
                ),
            )
        }
    };

    debug!(
        title = %task.title,
        strategy = %strategy,
        days_to_due,
        score,
        "scored task"
    );

    Ok(TaskScore { score, explanation })
}
