use anyhow::Result;
use clap::Parser;
use regex::Regex;
use reqwest::Client;
use std::time::Duration;
use tracing_subscriber::{fmt, EnvFilter};

/// Classic sample texts served by Project Gutenberg.
const SAMPLE_TEXTS: &[(&str, &str)] = &[
    ("https://www.gutenberg.org/files/74/74-0.txt", "tom_sawyer.txt"),
    ("https://www.gutenberg.org/files/1342/1342-0.txt", "pride_and_prejudice.txt"),
    ("https://www.gutenberg.org/files/11/11-0.txt", "alice_wonderland.txt"),
];

#[derive(Parser)]
#[command(name = "fetcher")]
#[command(about = "Download sample texts and submit them to a running server")]
struct Cli {
    /// Base URL of the search server
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    server: String,
    /// Request timeout seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Cli::parse();

    let client = Client::builder()
        .user_agent("marksearch-fetcher/0.1")
        .timeout(Duration::from_secs(args.timeout_secs))
        .build()?;
    // Gutenberg wraps its texts in *** START/END *** banners
    let boilerplate = Regex::new(r"(?s)\*\*\*.*?\*\*\*").expect("valid regex");

    let mut submitted = 0usize;
    for (url, filename) in SAMPLE_TEXTS {
        match fetch_and_submit(&client, &args.server, &boilerplate, url, filename).await {
            Ok(document_id) => {
                submitted += 1;
                tracing::info!(document_id, filename, "submitted");
            }
            Err(err) => tracing::error!(%err, filename, "skipped"),
        }
    }
    tracing::info!(submitted, total = SAMPLE_TEXTS.len(), "fetch complete");
    Ok(())
}

async fn fetch_and_submit(
    client: &Client,
    server: &str,
    boilerplate: &Regex,
    url: &str,
    filename: &str,
) -> Result<u64> {
    let text = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    let content = boilerplate.replace_all(&text, "").into_owned();

    let body: serde_json::Value = client
        .post(format!("{server}/documents"))
        .json(&serde_json::json!({ "filename": filename, "content": content }))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    Ok(body["document_id"].as_u64().unwrap_or_default())
}
