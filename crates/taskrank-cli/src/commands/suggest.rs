use serde_json::json;
use taskrank_core::{ranking, Clock, Config, SystemClock, TaskDb};

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = TaskDb::open(config.database_path()?)?;
    let suggestions = ranking::suggest(&db, SystemClock.today())?;

    println!(
        "{}",
        serde_json::to_string_pretty(&json!({ "suggestions": suggestions }))?
    );
    Ok(())
}
