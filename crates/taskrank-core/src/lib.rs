//! # taskrank Core Library
//!
//! This library provides the business logic for taskrank, a task
//! prioritization service. The HTTP server and CLI are thin layers over
//! the same core.
//!
//! ## Architecture
//!
//! - **Scoring**: pure per-task priority formulas under selectable
//!   strategies, with business-day urgency and a dependency block bonus
//! - **Ranking**: batch ingestion (validate, upsert, score, sort) and the
//!   stored-score suggestion cascade
//! - **Storage**: SQLite task store and TOML configuration
//!
//! ## Key Components
//!
//! - [`score_task`]: the scoring engine
//! - [`TaskDb`]: task persistence
//! - [`Config`]: service configuration

pub mod clock;
pub mod error;
pub mod ranking;
pub mod scoring;
pub mod storage;
pub mod task;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{ConfigError, CoreError, DatabaseError, ScoringError, ValidationError};
pub use ranking::{analyze, suggest, BasedOn, RankedTask, Suggestion};
pub use scoring::{score_task, HolidayCalendar, ScoringContext, Strategy, TaskScore};
pub use storage::{Config, TaskDb};
pub use task::{Task, TaskDescriptor};
