use clap::{Parser, Subcommand};
use taskrank_core::Config;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "taskrank", version, about = "Task prioritization service")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Address to bind, overrides server.bind
        #[arg(long)]
        bind: Option<String>,
    },
    /// Ingest a JSON batch of tasks and print them ranked
    Analyze {
        /// File containing a JSON array of tasks
        file: std::path::PathBuf,
        /// fastest_wins, high_impact, deadline_driven or smart_balance
        #[arg(long)]
        strategy: Option<String>,
    },
    /// Print the top stored tasks to work on next
    Suggest,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let configured = Config::load()
            .map(|c| c.logging.filter)
            .unwrap_or_else(|_| "info".into());
        EnvFilter::try_new(configured).unwrap_or_else(|_| EnvFilter::new("info"))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let result = match cli.command {
        Commands::Serve { bind } => commands::serve::run(bind),
        Commands::Analyze { file, strategy } => commands::analyze::run(&file, strategy.as_deref()),
        Commands::Suggest => commands::suggest::run(),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
