//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `dbdump_pipeline` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - Optional upload of the finished archive
//! - User-facing output formatting

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::process;

use dbdump_pipeline::cli::Cli;
use dbdump_pipeline::initialization::{init_http_client, init_logger_with};
use dbdump_pipeline::upload::BlobUploader;
use dbdump_pipeline::{DumpReport, DumpRunner};

#[tokio::main]
async fn main() -> Result<()> {
    // Credentials are usually kept in a .env file next to the binary or in the cwd
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let cli = Cli::parse();

    init_logger_with(cli.log_level.clone().into(), cli.log_format.clone())
        .context("Failed to initialize logger")?;

    match run(&cli).await {
        Ok(report) => {
            if cli.json {
                println!("{}", serde_json::to_string(&report)?);
            } else {
                println!(
                    "✅ {} dump: {} bytes in {:.1}s",
                    report.engine,
                    report.bytes,
                    report.elapsed_ms as f64 / 1000.0
                );
                match &report.blob_url {
                    Some(url) => println!("Uploaded to {}", url),
                    None => println!("Archive saved at {}", report.path),
                }
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("dbdump error: {:#}", e);
            process::exit(1);
        }
    }
}

async fn run(cli: &Cli) -> Result<DumpReport> {
    // Resolve the upload target before dumping so a typo fails fast
    let destination = cli.upload.destination().map_err(|e| anyhow!(e))?;
    let uploader = match &destination {
        Some(destination) => {
            let client = init_http_client(None).context("Failed to initialize HTTP client")?;
            Some(BlobUploader::new(destination, client).context("Invalid upload destination")?)
        }
        None => None,
    };

    let runner = DumpRunner::from_config(&cli.config());
    let request = cli.request();
    let archive = runner
        .dump(&request)
        .await
        .with_context(|| format!("{} dump failed", request.engine()))?;

    let mut report = archive.report();
    if let Some(uploader) = uploader {
        let blob = uploader
            .upload(&archive.path)
            .await
            .with_context(|| format!("Upload of {} failed", archive.path.display()))?;
        report.blob_url = Some(blob.url);
        if !cli.upload.keep_local {
            if let Err(e) = tokio::fs::remove_file(&archive.path).await {
                log::warn!("Failed to remove {}: {}", archive.path.display(), e);
            }
        }
    }
    Ok(report)
}
