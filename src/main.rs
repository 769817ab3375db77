use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use dotenv::dotenv;

use text2sql::infrastructure::container::{AppConfig, AppContainer, StorageBackend};
use text2sql::presentation::cli;

/// Log level mapped onto the env_logger filter.
#[derive(Clone, Debug, ValueEnum)]
enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

fn init_logger(log_level: &LogLevel) {
    let filter = match log_level {
        LogLevel::Debug => log::LevelFilter::Debug,
        LogLevel::Info => log::LevelFilter::Info,
        LogLevel::Warning => log::LevelFilter::Warn,
        LogLevel::Error => log::LevelFilter::Error,
    };
    env_logger::Builder::from_default_env()
        .filter_level(filter)
        .init();
}

#[derive(Parser)]
#[command(name = "text2sql")]
#[command(about = "Generate SQL from natural-language questions", long_about = None)]
#[command(version)]
struct Cli {
    /// Log level (DEBUG, INFO, WARNING, ERROR)
    #[arg(long, value_enum, default_value_t = LogLevel::Info, global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a SQL query and explanation for a question
    Generate {
        /// The user's question (natural language)
        #[arg(long)]
        question: String,
        /// The SQL dialect to use
        #[arg(long, default_value = "SQLite")]
        dialect: String,
    },
    /// Load table metadata and sample query files into the embedded stores
    Ingest {
        /// Directory of <table_name>.txt metadata files
        #[arg(long)]
        metadata_dir: Option<PathBuf>,
        /// Directory of <query_name>.sql sample query files
        #[arg(long)]
        queries_dir: Option<PathBuf>,
    },
    /// Summarize stored tables and queries and register their embeddings
    Index,
}

async fn run(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::from_env()?;

    match command {
        Commands::Generate { question, dialect } => {
            let container = AppContainer::new(config)?;
            cli::run_generate(&container, &question, &dialect).await
        }
        Commands::Ingest {
            metadata_dir,
            queries_dir,
        } => {
            // Ingest moves flat files into the embedded database, so it
            // always targets that backend and may create the store file.
            config.storage_backend = StorageBackend::EmbeddedDb;
            config.create_database_if_missing = true;
            let metadata_dir = metadata_dir.unwrap_or_else(|| config.metadata_dir.clone());
            let queries_dir = queries_dir.unwrap_or_else(|| config.queries_dir.clone());
            let container = AppContainer::new(config)?;
            cli::run_ingest(&container, &metadata_dir, &queries_dir).await
        }
        Commands::Index => {
            let container = AppContainer::new(config)?;
            cli::run_index(&container).await
        }
    }
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    let cli = Cli::parse();
    init_logger(&cli.log_level);

    if let Err(error) = run(cli.command).await {
        log::error!("{}", error);
        std::process::exit(1);
    }
}
