use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use flowpack::web::AjaxClient;
use flowpack::{archive, manifest, Project};
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a project archive from a manifest
    Pack {
        /// Path to the project manifest YAML file
        #[arg(long, short)]
        manifest: PathBuf,

        /// Output directory for the archive
        #[arg(long, short, default_value = ".")]
        out_dir: PathBuf,

        /// Replace an existing archive
        #[arg(long)]
        overwrite: bool,
    },

    /// Pack a manifest and upload it to the scheduler
    Upload {
        /// Path to the project manifest YAML file
        #[arg(long, short)]
        manifest: PathBuf,

        /// Output directory for the archive
        #[arg(long, short, default_value = ".")]
        out_dir: PathBuf,

        /// Replace an existing archive
        #[arg(long)]
        overwrite: bool,

        /// Scheduler web server URL
        #[arg(long, default_value = "http://localhost:8081")]
        host: String,

        /// Login username
        #[arg(long, short)]
        username: String,

        /// Login password (falls back to FLOWPACK_PASSWORD)
        #[arg(long, short)]
        password: Option<String>,
    },

    /// Schedule an uploaded flow
    Schedule {
        /// Scheduler web server URL
        #[arg(long, default_value = "http://localhost:8081")]
        host: String,

        /// Login username
        #[arg(long, short)]
        username: String,

        /// Login password (falls back to FLOWPACK_PASSWORD)
        #[arg(long, short)]
        password: Option<String>,

        /// Project name
        #[arg(long)]
        project: String,

        /// Flow name
        #[arg(long)]
        flow: String,

        /// Start time, "YYYY-MM-DD HH:MM"
        #[arg(long)]
        at: String,

        /// Recurrence period (e.g. 1d, 2h, 30m)
        #[arg(long)]
        period: Option<String>,
    },
}

fn resolve_password(password: Option<String>) -> Result<String> {
    match password {
        Some(password) => Ok(password),
        None => std::env::var("FLOWPACK_PASSWORD")
            .context("no --password given and FLOWPACK_PASSWORD is not set"),
    }
}

fn pack_manifest(manifest_path: &Path, out_dir: &Path, overwrite: bool) -> Result<(Project, PathBuf)> {
    let manifest = manifest::load_project_manifest(manifest_path)
        .with_context(|| format!("failed to load manifest {}", manifest_path.display()))?;
    let project = manifest::assemble(&manifest)?;
    let path = archive::build(&project, out_dir, overwrite)?;
    Ok((project, path))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Pack { manifest, out_dir, overwrite } => {
            let (project, path) = pack_manifest(&manifest, &out_dir, overwrite)?;
            info!("Packed project '{}' with {} flows", project.name(), project.flow_count());
            println!("{}", path.display());
        }

        Commands::Upload { manifest, out_dir, overwrite, host, username, password } => {
            let (project, path) = pack_manifest(&manifest, &out_dir, overwrite)?;
            let password = resolve_password(password)?;
            let client = AjaxClient::login(&host, &username, &password).await?;
            client.create_project(project.name(), project.description(), true).await?;
            let res = client.upload_project(project.name(), &path).await?;
            info!("Uploaded '{}' as version {:?}", project.name(), res.get("version"));
        }

        Commands::Schedule { host, username, password, project, flow, at, period } => {
            let start = NaiveDateTime::parse_from_str(&at, "%Y-%m-%d %H:%M")
                .with_context(|| format!("invalid start time '{at}', expected YYYY-MM-DD HH:MM"))?;
            let password = resolve_password(password)?;
            let client = AjaxClient::login(&host, &username, &password).await?;
            client.schedule_flow(&project, &flow, start, period.as_deref()).await?;
            info!("Schedule registered for {}.{}", project, flow);
        }
    }

    Ok(())
}
