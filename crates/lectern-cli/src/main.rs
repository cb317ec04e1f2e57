//! Lectern CLI: inspect and publish course drafts.
//!
//! Set LECTERN_API_URL (default http://localhost:3000) and optionally
//! LECTERN_API_TOKEN for Bearer auth.

use anyhow::Context;
use clap::{Parser, Subcommand};
use lectern_api_client::{ApiClient, OrphanPolicy, UploadOrchestrator};
use lectern_cli::{init_tracing, load_draft, truncate_string};
use lectern_core::build_manifest;
use serde::Serialize;
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "lectern", about = "Lectern course upload CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the upload slots a draft would request
    Manifest {
        /// Path to the draft JSON file
        draft: PathBuf,
    },
    /// Presign, upload every pending video, then commit the course
    Publish {
        /// Path to the draft JSON file
        draft: PathBuf,
        /// Leave uploaded objects in storage when a transfer fails
        #[arg(long)]
        keep_orphans: bool,
    },
    /// List courses, newest first
    List,
    /// Get a single course by ID
    Get {
        /// Course UUID
        id: Uuid,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Manifest { draft } => {
            let draft = load_draft(&draft)?;
            let manifest = build_manifest(&draft);
            if manifest.is_empty() {
                println!("No pending videos");
            }
            for slot in &manifest {
                let lesson = &draft.disciplines[slot.id.discipline].lessons[slot.id.lesson];
                println!(
                    "{:<12} {:<32} {:<28} {}",
                    slot.id.to_string(),
                    truncate_string(&slot.original_file_name, 32),
                    slot.declared_content_type,
                    truncate_string(&lesson.title, 40)
                );
            }
        }
        Commands::Publish {
            draft,
            keep_orphans,
        } => {
            let draft = load_draft(&draft)?;
            let policy = if keep_orphans {
                OrphanPolicy::Retain
            } else {
                OrphanPolicy::DeleteUploaded
            };
            let orchestrator = UploadOrchestrator::new(api_client()?).with_orphan_policy(policy);

            let published = orchestrator
                .publish(&draft)
                .await
                .context("Publishing failed")?;
            print_json(&published.course)?;
        }
        Commands::List => {
            let courses = api_client()?.list_courses().await?;
            print_json(&courses)?;
        }
        Commands::Get { id } => {
            let course = api_client()?.get_course(id).await?;
            print_json(&course)?;
        }
    }

    Ok(())
}

fn api_client() -> anyhow::Result<ApiClient> {
    ApiClient::from_env().context("Failed to create API client. Check LECTERN_API_URL")
}
