//! SQLite-based task storage.

use std::path::Path;

use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use super::migrations;
use crate::error::DatabaseError;
use crate::scoring::{Strategy, TaskScore};
use crate::task::Task;

const TASK_COLUMNS: &str =
    "id, title, due_date, estimated_hours, importance, dependencies, score, explanation, strategy";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Build a Task from a database row selected with [`TASK_COLUMNS`].
fn row_to_task(row: &rusqlite::Row) -> Result<Task, rusqlite::Error> {
    let due_raw: String = row.get(2)?;
    let due_date = NaiveDate::parse_from_str(&due_raw, DATE_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;

    let deps_raw: String = row.get(5)?;
    let dependencies: Vec<String> = serde_json::from_str(&deps_raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?;

    let strategy: Option<String> = row.get(8)?;

    Ok(Task {
        id: Some(row.get(0)?),
        title: row.get(1)?,
        due_date,
        estimated_hours: row.get(3)?,
        importance: row.get(4)?,
        dependencies,
        score: row.get(6)?,
        explanation: row.get(7)?,
        strategy: strategy.as_deref().map(Strategy::from_name),
    })
}

fn encode_dependencies(deps: &[String]) -> Result<String, DatabaseError> {
    serde_json::to_string(deps).map_err(|e| DatabaseError::QueryFailed(e.to_string()))
}

/// Outcome of [`TaskDb::upsert_by_title`].
#[derive(Debug, Clone, PartialEq)]
pub struct Upserted {
    pub task: Task,
    pub created: bool,
}

/// SQLite database holding task records.
///
/// Tasks are keyed by an autoincrement id. Ingestion upserts by title.
pub struct TaskDb {
    conn: Connection,
}

impl TaskDb {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open (creating if needed) the database at `path`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DatabaseError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_connection(conn)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, DatabaseError> {
        migrations::migrate(&conn).map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Insert `task`, or update the oldest row with the same title.
    ///
    /// Only the descriptive fields are written; stored score fields are
    /// left as they were.
    pub fn upsert_by_title(&self, task: &Task) -> Result<Upserted, DatabaseError> {
        let deps = encode_dependencies(&task.dependencies)?;
        let due = task.due_date.format(DATE_FORMAT).to_string();

        let existing: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM tasks WHERE title = ?1 ORDER BY id LIMIT 1",
                params![task.title],
                |row| row.get(0),
            )
            .optional()?;

        let (id, created) = match existing {
            Some(id) => {
                self.conn.execute(
                    "UPDATE tasks
                     SET due_date = ?1, estimated_hours = ?2, importance = ?3, dependencies = ?4
                     WHERE id = ?5",
                    params![due, task.estimated_hours, task.importance, deps, id],
                )?;
                (id, false)
            }
            None => {
                self.conn.execute(
                    "INSERT INTO tasks (title, due_date, estimated_hours, importance, dependencies)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![task.title, due, task.estimated_hours, task.importance, deps],
                )?;
                (self.conn.last_insert_rowid(), true)
            }
        };
        debug!(id, created, title = %task.title, "upserted task");

        let task = self.get_task(id)?.ok_or_else(|| DatabaseError::CorruptRow {
            table: "tasks".into(),
            message: format!("row {id} vanished after upsert"),
        })?;
        Ok(Upserted { task, created })
    }

    pub fn get_task(&self, id: i64) -> Result<Option<Task>, DatabaseError> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1");
        let task = self
            .conn
            .query_row(&sql, params![id], row_to_task)
            .optional()?;
        Ok(task)
    }

    pub fn find_by_title(&self, title: &str) -> Result<Option<Task>, DatabaseError> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE title = ?1 ORDER BY id LIMIT 1");
        let task = self
            .conn
            .query_row(&sql, params![title], row_to_task)
            .optional()?;
        Ok(task)
    }

    /// All tasks, ordered by id.
    pub fn list_tasks(&self) -> Result<Vec<Task>, DatabaseError> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks ORDER BY id");
        let mut stmt = self.conn.prepare(&sql)?;
        let tasks = stmt
            .query_map([], row_to_task)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    pub fn count_tasks(&self) -> Result<u64, DatabaseError> {
        let n = self
            .conn
            .query_row("SELECT COUNT(*) FROM tasks", [], |row| row.get::<_, u64>(0))?;
        Ok(n)
    }

    /// Persist the result of a scoring pass for task `id`.
    pub fn record_score(
        &self,
        id: i64,
        result: &TaskScore,
        strategy: Strategy,
    ) -> Result<(), DatabaseError> {
        let updated = self.conn.execute(
            "UPDATE tasks SET score = ?1, explanation = ?2, strategy = ?3 WHERE id = ?4",
            params![result.score, result.explanation, strategy.as_str(), id],
        )?;
        if updated == 0 {
            return Err(DatabaseError::QueryFailed(format!("no task with id {id}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn due() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 20).unwrap()
    }

    #[test]
    fn upsert_creates_then_updates_by_title() {
        let db = TaskDb::open_memory().unwrap();
        let first = db
            .upsert_by_title(&Task::new("Write report", due()).with_importance(3))
            .unwrap();
        assert!(first.created);
        let id = first.task.id.unwrap();

        let second = db
            .upsert_by_title(
                &Task::new("Write report", due())
                    .with_importance(9)
                    .with_dependencies(["12"]),
            )
            .unwrap();
        assert!(!second.created);
        assert_eq!(second.task.id, Some(id));
        assert_eq!(second.task.importance, 9);
        assert_eq!(second.task.dependencies, vec!["12".to_string()]);
        assert_eq!(db.count_tasks().unwrap(), 1);
    }

    #[test]
    fn record_score_round_trips_strategy() {
        let db = TaskDb::open_memory().unwrap();
        let stored = db.upsert_by_title(&Task::new("Ship", due())).unwrap().task;
        assert!(stored.score.is_none());

        let id = stored.id.unwrap();
        let result = TaskScore {
            score: 42.0,
            explanation: "because".into(),
        };
        db.record_score(id, &result, Strategy::HighImpact).unwrap();

        let task = db.get_task(id).unwrap().unwrap();
        assert_eq!(task.score, Some(42.0));
        assert_eq!(task.explanation.as_deref(), Some("because"));
        assert_eq!(task.strategy, Some(Strategy::HighImpact));
    }

    #[test]
    fn upsert_keeps_previous_score() {
        let db = TaskDb::open_memory().unwrap();
        let id = db.upsert_by_title(&Task::new("Ship", due())).unwrap().task.id.unwrap();
        let result = TaskScore {
            score: 7.0,
            explanation: "x".into(),
        };
        db.record_score(id, &result, Strategy::SmartBalance).unwrap();
        let again = db.upsert_by_title(&Task::new("Ship", due())).unwrap();
        assert_eq!(again.task.score, Some(7.0));
    }

    #[test]
    fn record_score_for_missing_task_fails() {
        let db = TaskDb::open_memory().unwrap();
        let result = TaskScore {
            score: 1.0,
            explanation: String::new(),
        };
        assert!(db.record_score(99, &result, Strategy::SmartBalance).is_err());
    }

    #[test]
    fn list_is_ordered_by_id() {
        let db = TaskDb::open_memory().unwrap();
        db.upsert_by_title(&Task::new("b", due())).unwrap();
        db.upsert_by_title(&Task::new("a", due())).unwrap();
        let titles: Vec<_> = db.list_tasks().unwrap().into_iter().map(|t| t.title).collect();
        assert_eq!(titles, ["b", "a"]);
        assert!(db.find_by_title("c").unwrap().is_none());
    }

    #[test]
    fn open_on_disk_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.db");
        {
            let db = TaskDb::open(&path).unwrap();
            db.upsert_by_title(&Task::new("persisted", due())).unwrap();
        }
        let db = TaskDb::open(&path).unwrap();
        assert!(db.find_by_title("persisted").unwrap().is_some());
    }
}
