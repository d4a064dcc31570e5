use anyhow::Result;
use clap::{Parser, Subcommand};
use marksearch_core::{DocId, EngineConfig, SearchEngine};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Batch-ingest text files into the search index", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest .txt files from a file or directory
    Build {
        /// Input path (file or directory)
        #[arg(long)]
        input: PathBuf,
        /// Engine data directory
        #[arg(long, default_value = "./data")]
        data: PathBuf,
        /// Stop-word file (quoted words); builtin list is used when unreadable
        #[arg(long, default_value = "StopWords.txt")]
        stop_words: PathBuf,
    },
    /// Print index statistics as JSON
    Stats {
        /// Engine data directory
        #[arg(long, default_value = "./data")]
        data: PathBuf,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, data, stop_words } => build(&input, &data, &stop_words),
        Commands::Stats { data } => stats(&data),
    }
}

fn build(input: &Path, data: &Path, stop_words: &Path) -> Result<()> {
    let engine = SearchEngine::open(&EngineConfig {
        data_dir: data.to_path_buf(),
        stop_words_path: Some(stop_words.to_path_buf()),
    })?;

    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() && p.extension().and_then(|s| s.to_str()) == Some("txt") {
                files.push(p.to_path_buf());
            }
        }
    } else if input.is_file() {
        files.push(input.to_path_buf());
    }

    let mut ingested = 0usize;
    let mut failed = 0usize;
    for file in files {
        let filename = file
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unnamed.txt")
            .to_string();
        match ingest_file(&engine, &file, &filename) {
            Ok(doc_id) => {
                ingested += 1;
                tracing::info!(doc_id, filename, "ingested");
            }
            Err(err) => {
                // a bad file is reported and skipped, its siblings still index
                failed += 1;
                tracing::error!(%err, filename, "failed to ingest");
            }
        }
    }
    tracing::info!(ingested, failed, "build complete");
    Ok(())
}

fn ingest_file(engine: &SearchEngine, path: &Path, filename: &str) -> Result<DocId> {
    // invalid UTF-8 is replaced rather than rejected
    let bytes = std::fs::read(path)?;
    let content = String::from_utf8_lossy(&bytes);
    Ok(engine.add_document(filename, &content)?)
}

fn stats(data: &Path) -> Result<()> {
    let engine = SearchEngine::open(&EngineConfig {
        data_dir: data.to_path_buf(),
        stop_words_path: None,
    })?;
    let stats = engine.stats()?;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}
