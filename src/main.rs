// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use clap::{Parser, Subcommand};
use courselens::{
    analyzer::ProgressSink, AnalyzerConfig, CourseAnalyzer, CourseIdentity, JsonFileStore,
    RunStatus,
};
use std::{env, sync::Arc};

#[derive(Parser)]
#[command(name = "courselens", about = "Course and professor feedback analysis")]
struct Cli {
    /// Directory for the result cache and audit log
    #[arg(long, env = "COURSELENS_DATA_DIR", default_value = "./data")]
    data_dir: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze feedback for a course
    Analyze {
        /// Course code, e.g. "CS 2130"
        #[arg(long)]
        course: String,

        /// Full course title
        #[arg(long)]
        name: Option<String>,

        /// Instructor name
        #[arg(long)]
        professor: Option<String>,

        /// Force stub providers even when credentials are configured
        #[arg(long)]
        stub: bool,
    },

    /// Show result cache statistics
    CacheStats,

    /// Clear the result cache (all entries, or expired only)
    CacheClear {
        #[arg(long)]
        expired_only: bool,
    },

    /// Dump the model audit log as plain text
    AuditDump,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let store = Arc::new(JsonFileStore::new(&cli.data_dir));

    match cli.command {
        Command::Analyze {
            course,
            name,
            professor,
            stub,
        } => {
            let mut config = AnalyzerConfig::from_env();
            if stub {
                config.search.api_key = None;
                config.llm.api_key = None;
            }
            config.validate().map_err(anyhow::Error::msg)?;

            let mut identity = CourseIdentity::new(course);
            if let Some(name) = name {
                identity = identity.with_name(name);
            }
            if let Some(professor) = professor {
                identity = identity.with_professor(professor);
            }

            let analyzer = CourseAnalyzer::new(config, store);
            let (sink, mut progress) = ProgressSink::channel();

            let updates = tokio::spawn(async move {
                while let Some(update) = progress.recv().await {
                    println!(
                        "[{}/{}] {}",
                        update.step, update.total_steps, update.message
                    );
                }
            });

            let run = analyzer.analyze(&identity, &sink).await;
            drop(sink);
            updates.await?;

            match run.status {
                RunStatus::Completed => {
                    println!("{}", serde_json::to_string_pretty(&run)?);
                }
                _ => {
                    eprintln!(
                        "Analysis failed: {}",
                        run.error.unwrap_or_else(|| "unknown error".to_string())
                    );
                    std::process::exit(1);
                }
            }
        }

        Command::CacheStats => {
            let config = AnalyzerConfig::from_env();
            let cache = courselens::ResultCache::new(store, config.cache);
            println!("{}", serde_json::to_string_pretty(&cache.stats().await)?);
        }

        Command::CacheClear { expired_only } => {
            let config = AnalyzerConfig::from_env();
            let cache = courselens::ResultCache::new(store, config.cache);
            if expired_only {
                let removed = cache.clear_expired().await?;
                println!("Removed {} expired entries", removed);
            } else {
                cache.clear().await?;
                println!("Cache cleared");
            }
        }

        Command::AuditDump => {
            let audit = courselens::llm::AuditLog::new(store);
            print!("{}", audit.formatted().await);
        }
    }

    Ok(())
}
