//! Task types.
//!
//! [`Task`] is the stored entity. [`TaskDescriptor`] is the loosely-typed
//! shape clients submit; it is validated into a `Task` before it touches the
//! store or the scoring engine.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::scoring::Strategy;

/// Importance used when a descriptor omits it.
pub const DEFAULT_IMPORTANCE: i64 = 5;
/// Effort used when a descriptor omits it.
pub const DEFAULT_ESTIMATED_HOURS: i64 = 1;

pub const MIN_IMPORTANCE: i64 = 1;
pub const MAX_IMPORTANCE: i64 = 10;
pub const MIN_ESTIMATED_HOURS: i64 = 1;

/// A task record.
///
/// `id` is `None` until the store assigns one. `score`, `explanation` and
/// `strategy` stay `None` until the task has been scored at least once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Option<i64>,
    pub title: String,
    pub due_date: NaiveDate,
    pub estimated_hours: i64,
    pub importance: i64,
    /// Ids (as strings) listed by this task. A task T blocks every task
    /// whose `dependencies` contains T's id.
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub strategy: Option<Strategy>,
}

impl Task {
    /// Create an unsaved, unscored task with default importance and effort.
    pub fn new(title: impl Into<String>, due_date: NaiveDate) -> Self {
        Self {
            id: None,
            title: title.into(),
            due_date,
            estimated_hours: DEFAULT_ESTIMATED_HOURS,
            importance: DEFAULT_IMPORTANCE,
            dependencies: Vec::new(),
            score: None,
            explanation: None,
            strategy: None,
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_importance(mut self, importance: i64) -> Self {
        self.importance = importance;
        self
    }

    pub fn with_estimated_hours(mut self, hours: i64) -> Self {
        self.estimated_hours = hours;
        self
    }

    pub fn with_dependencies<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = deps.into_iter().map(Into::into).collect();
        self
    }

    /// The key other tasks use to reference this one in `dependencies`.
    pub fn id_key(&self) -> Option<String> {
        self.id.map(|id| id.to_string())
    }

    /// True when `other` lists this task among its dependencies.
    pub fn blocks(&self, other: &Task) -> bool {
        match self.id_key() {
            Some(key) => other.dependencies.iter().any(|d| *d == key),
            None => false,
        }
    }
}

/// A dependency entry as submitted; clients send ids as strings or numbers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DependencyRef {
    Id(i64),
    Key(String),
}

impl DependencyRef {
    pub fn into_key(self) -> String {
        match self {
            DependencyRef::Id(id) => id.to_string(),
            DependencyRef::Key(key) => key,
        }
    }
}

/// Inbound task description from an analyze batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TaskDescriptor {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub estimated_hours: Option<i64>,
    #[serde(default)]
    pub importance: Option<i64>,
    #[serde(default)]
    pub dependencies: Option<Vec<DependencyRef>>,
}

impl TaskDescriptor {
    /// Check required fields and bounds, producing an unsaved [`Task`].
    ///
    /// # Errors
    /// Returns the first [`ValidationError`] found, in the order: required
    /// fields, importance, estimated hours, date format.
    pub fn validate(self) -> Result<Task, ValidationError> {
        let title = match self.title {
            Some(t) if !t.trim().is_empty() => t,
            _ => return Err(ValidationError::MissingRequired),
        };
        let due_raw = match self.due_date {
            Some(d) if !d.trim().is_empty() => d,
            _ => return Err(ValidationError::MissingRequired),
        };

        let importance = self.importance.unwrap_or(DEFAULT_IMPORTANCE);
        if !(MIN_IMPORTANCE..=MAX_IMPORTANCE).contains(&importance) {
            return Err(ValidationError::ImportanceOutOfRange);
        }

        let estimated_hours = self.estimated_hours.unwrap_or(DEFAULT_ESTIMATED_HOURS);
        if estimated_hours < MIN_ESTIMATED_HOURS {
            return Err(ValidationError::EstimatedHoursTooLow);
        }

        let due_date = parse_due_date(&due_raw)?;

        Ok(Task {
            id: None,
            title,
            due_date,
            estimated_hours,
            importance,
            dependencies: self
                .dependencies
                .unwrap_or_default()
                .into_iter()
                .map(DependencyRef::into_key)
                .collect(),
            score: None,
            explanation: None,
            strategy: None,
        })
    }
}

/// Parse a `YYYY-MM-DD` date string.
pub fn parse_due_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(raw.to_string()))
}

/// Decode an analyze request body into descriptors.
///
/// The body must be a non-empty JSON array. Individual descriptors are not
/// validated here; see [`TaskDescriptor::validate`].
pub fn parse_batch(body: &[u8]) -> Result<Vec<TaskDescriptor>, ValidationError> {
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| ValidationError::Malformed(e.to_string()))?;
    let items = match value {
        serde_json::Value::Array(items) => items,
        _ => return Err(ValidationError::NotAList),
    };
    if items.is_empty() {
        return Err(ValidationError::EmptyBatch);
    }
    items
        .into_iter()
        .map(|item| {
            serde_json::from_value(item).map_err(|e| ValidationError::Malformed(e.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(title: &str, due: &str) -> TaskDescriptor {
        TaskDescriptor {
            title: Some(title.to_string()),
            due_date: Some(due.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn validate_applies_defaults() {
        let task = descriptor("Write report", "2026-10-20").validate().unwrap();
        assert_eq!(task.importance, DEFAULT_IMPORTANCE);
        assert_eq!(task.estimated_hours, DEFAULT_ESTIMATED_HOURS);
        assert!(task.dependencies.is_empty());
        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2026, 10, 20).unwrap());
    }

    #[test]
    fn validate_rejects_blank_title_and_date() {
        assert_eq!(
            descriptor("  ", "2026-10-20").validate(),
            Err(ValidationError::MissingRequired)
        );
        assert_eq!(
            descriptor("Task", "").validate(),
            Err(ValidationError::MissingRequired)
        );
        let missing = TaskDescriptor {
            title: Some("Task".into()),
            ..Default::default()
        };
        assert_eq!(missing.validate(), Err(ValidationError::MissingRequired));
    }

    #[test]
    fn validate_checks_bounds() {
        let mut d = descriptor("Task", "2026-10-20");
        d.importance = Some(11);
        assert_eq!(d.clone().validate(), Err(ValidationError::ImportanceOutOfRange));
        d.importance = Some(0);
        assert_eq!(d.clone().validate(), Err(ValidationError::ImportanceOutOfRange));
        d.importance = Some(10);
        d.estimated_hours = Some(0);
        assert_eq!(d.validate(), Err(ValidationError::EstimatedHoursTooLow));
    }

    #[test]
    fn validate_rejects_malformed_date() {
        assert_eq!(
            descriptor("Task", "20/10/2026").validate(),
            Err(ValidationError::InvalidDate("20/10/2026".into()))
        );
    }

    #[test]
    fn parse_batch_normalizes_numeric_dependencies() {
        let body = br#"[{"title": "A", "due_date": "2026-10-20", "dependencies": [3, "7"]}]"#;
        let batch = parse_batch(body).unwrap();
        let task = batch.into_iter().next().unwrap().validate().unwrap();
        assert_eq!(task.dependencies, vec!["3".to_string(), "7".to_string()]);
    }

    #[test]
    fn parse_batch_rejects_non_arrays_and_empty() {
        assert_eq!(parse_batch(b"{}"), Err(ValidationError::NotAList));
        assert_eq!(parse_batch(b"[]"), Err(ValidationError::EmptyBatch));
        assert!(matches!(parse_batch(b"[{"), Err(ValidationError::Malformed(_))));
        assert!(matches!(
            parse_batch(br#"[{"title": "A", "importance": "high"}]"#),
            Err(ValidationError::Malformed(_))
        ));
    }

    #[test]
    fn blocks_matches_id_string() {
        let due = NaiveDate::from_ymd_opt(2026, 10, 20).unwrap();
        let blocker = Task::new("Design schema", due).with_id(4);
        let dependent = Task::new("Build API", due).with_dependencies(["4"]);
        assert!(blocker.blocks(&dependent));
        assert!(!dependent.blocks(&blocker));
        assert!(!Task::new("unsaved", due).blocks(&dependent));
    }
}
