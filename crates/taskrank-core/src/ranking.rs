//! Ingestion and suggestion paths.
//!
//! [`analyze`] validates a batch, upserts it, scores every task against the
//! whole batch and returns the tasks ranked. [`suggest`] reads stored scores
//! only and picks the top few through a fixed fallback cascade.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{CoreError, DatabaseError, Result};
use crate::scoring::{score_task, ScoringContext, Strategy};
use crate::storage::TaskDb;
use crate::task::{Task, TaskDescriptor};

/// Maximum number of suggestions returned.
pub const SUGGESTION_LIMIT: usize = 3;

/// Cascade thresholds for suggestions when nothing is due.
const SUGGEST_MIN_IMPORTANCE: i64 = 5;
const SUGGEST_MAX_EFFORT: i64 = 5;

/// A scored task as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedTask {
    pub id: i64,
    pub title: String,
    pub due_date: NaiveDate,
    pub estimated_hours: i64,
    pub importance: i64,
    pub dependencies: Vec<String>,
    pub score: f64,
    pub explanation: String,
}

impl From<&Task> for RankedTask {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.unwrap_or_default(),
            title: task.title.clone(),
            due_date: task.due_date,
            estimated_hours: task.estimated_hours,
            importance: task.importance,
            dependencies: task.dependencies.clone(),
            score: task.score.unwrap_or(0.0),
            explanation: task.explanation.clone().unwrap_or_default(),
        }
    }
}

/// Which cascade tier produced a suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BasedOn {
    /// Due today or overdue
    Due,
    /// Importance above 5
    HighImportance,
    /// Lists at least one dependency
    HasDependencies,
    /// Under 5 estimated hours
    LowEffort,
    /// No filter matched; every task is a candidate
    All,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    #[serde(flatten)]
    pub task: RankedTask,
    pub based_on: BasedOn,
    pub strategy: Option<Strategy>,
}

fn by_score_desc(a: &Task, b: &Task) -> Ordering {
    let key = |t: &Task| t.score.unwrap_or(f64::NEG_INFINITY);
    key(b).total_cmp(&key(a))
}

/// Validate, upsert and score a batch.
///
/// The batch is atomic: every descriptor is validated before anything is
/// written, and writes happen in one transaction that is rolled back if any
/// task fails a scoring precondition. Descriptors sharing a title collapse
/// into one task carrying the last descriptor's fields.
///
/// # Errors
/// [`CoreError::Validation`] for bad input, [`CoreError::Scoring`] when a
/// task cannot be scored, [`CoreError::Database`] for storage failures.
pub fn analyze(
    db: &TaskDb,
    batch: Vec<TaskDescriptor>,
    strategy: Strategy,
    ctx: &ScoringContext<'_>,
) -> Result<Vec<RankedTask>> {
    let submitted = batch
        .into_iter()
        .map(TaskDescriptor::validate)
        .collect::<std::result::Result<Vec<_>, _>>()
        .inspect_err(|e| warn!("rejected batch: {e}"))?;

    let tx = db
        .conn()
        .unchecked_transaction()
        .map_err(DatabaseError::from)?;

    let mut stored: Vec<Task> = Vec::with_capacity(submitted.len());
    let mut slot_by_id: HashMap<i64, usize> = HashMap::new();
    let mut created = 0usize;
    for task in &submitted {
        let upserted = db.upsert_by_title(task)?;
        if upserted.created {
            created += 1;
        }
        let id = upserted.task.id.unwrap_or_default();
        match slot_by_id.get(&id) {
            Some(&slot) => stored[slot] = upserted.task,
            None => {
                slot_by_id.insert(id, stored.len());
                stored.push(upserted.task);
            }
        }
    }

    let mut scored = Vec::with_capacity(stored.len());
    for task in &stored {
        let result = score_task(task, strategy, Some(stored.as_slice()), ctx).map_err(|e| {
            warn!(title = %task.title, "rejected batch: {e}");
            CoreError::from(e)
        })?;
        let id = task.id.unwrap_or_default();
        db.record_score(id, &result, strategy)?;

        let mut task = task.clone();
        task.score = Some(result.score);
        task.explanation = Some(result.explanation);
        task.strategy = Some(strategy);
        scored.push(task);
    }

    tx.commit().map_err(DatabaseError::from)?;

    scored.sort_by(by_score_desc);
    info!(
        tasks = scored.len(),
        created,
        strategy = %strategy,
        "analyzed batch"
    );
    Ok(scored.iter().map(RankedTask::from).collect())
}

/// Pick the candidate pool for suggestions.
///
/// Tasks due on or before `today` win outright. Otherwise the first
/// non-empty tier of: importance > 5, has dependencies, effort < 5, all.
pub fn select_candidates(tasks: &[Task], today: NaiveDate) -> (BasedOn, Vec<&Task>) {
    let tiers: [(BasedOn, fn(&Task, NaiveDate) -> bool); 4] = [
        (BasedOn::Due, |t, today| t.due_date <= today),
        (BasedOn::HighImportance, |t, _| t.importance > SUGGEST_MIN_IMPORTANCE),
        (BasedOn::HasDependencies, |t, _| !t.dependencies.is_empty()),
        (BasedOn::LowEffort, |t, _| t.estimated_hours < SUGGEST_MAX_EFFORT),
    ];

    for (based_on, pred) in tiers {
        let matched: Vec<&Task> = tasks.iter().filter(|t| pred(t, today)).collect();
        if !matched.is_empty() {
            return (based_on, matched);
        }
    }
    (BasedOn::All, tasks.iter().collect())
}

/// Top stored tasks to work on next. No rescoring happens here.
///
/// # Errors
/// [`CoreError::NoTasks`] when the store is empty.
pub fn suggest(db: &TaskDb, today: NaiveDate) -> Result<Vec<Suggestion>> {
    let tasks = db.list_tasks()?;
    if tasks.is_empty() {
        return Err(CoreError::NoTasks);
    }

    let (based_on, mut candidates) = select_candidates(&tasks, today);
    candidates.sort_by(|a, b| by_score_desc(a, b));
    candidates.truncate(SUGGESTION_LIMIT);

    info!(
        stored = tasks.len(),
        returned = candidates.len(),
        based_on = ?based_on,
        "suggested tasks"
    );

    Ok(candidates
        .into_iter()
        .map(|task| Suggestion {
            task: RankedTask::from(task),
            based_on,
            strategy: task.strategy,
        })
        .collect())
}
