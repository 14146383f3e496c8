use std::path::Path;

use serde_json::json;
use taskrank_core::task::parse_batch;
use taskrank_core::{ranking, Clock, Config, ScoringContext, Strategy, SystemClock, TaskDb};

pub fn run(file: &Path, strategy: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let strategy = strategy
        .map(Strategy::from_name)
        .unwrap_or_else(|| config.default_strategy());

    let body = std::fs::read(file).map_err(|e| format!("cannot read {}: {e}", file.display()))?;
    let batch = parse_batch(&body)?;

    let db = TaskDb::open(config.database_path()?)?;
    let calendar = config.calendar()?;
    let ctx = ScoringContext::new(SystemClock.today(), &calendar);
    let tasks = ranking::analyze(&db, batch, strategy, &ctx)?;

    println!("{}", serde_json::to_string_pretty(&json!({ "tasks": tasks }))?);
    Ok(())
}
