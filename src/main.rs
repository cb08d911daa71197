// ABOUTME: CLI entry point for sqlite-mysql-migrator
// ABOUTME: Parses connection flags and runs the migration

use clap::Parser;
use sqlite_mysql_migrator::commands;
use sqlite_mysql_migrator::mysql::TargetOptions;

#[derive(Parser)]
#[command(name = "sqlite-mysql-migrator")]
#[command(about = "Copy a SQLite database's tables and rows into MySQL", long_about = None)]
struct Cli {
    /// Path to the source SQLite database file
    #[arg(long)]
    sqlite: String,
    /// Target MySQL host (host or host:port)
    #[arg(long)]
    mysql: String,
    /// Target MySQL user
    #[arg(long)]
    user: String,
    /// Target MySQL password
    #[arg(long)]
    password: String,
    /// Target MySQL database name
    #[arg(long)]
    database: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging - default to INFO level if RUST_LOG not set
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let target = TargetOptions::new(&cli.mysql, &cli.user, &cli.password, &cli.database)?;
    commands::migrate(&cli.sqlite, &target).await
}
