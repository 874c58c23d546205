//! `glassybites` -- glass-food storyboard prompt generator.
//!
//! Reads a newline-delimited list of food names, asks Gemini for one
//! storyboard per food (all in parallel) and prints the cards.
//!
//! # Environment variables
//!
//! | Variable                       | Default                | Description                        |
//! |--------------------------------|------------------------|------------------------------------|
//! | `GEMINI_API_KEY` / `API_KEY`   | --                     | Key used when none has been saved  |
//! | `GEMINI_MODEL`                 | `gemini-2.5-flash`     | Model id                           |
//! | `GEMINI_API_BASE_URL`          | public endpoint        | API root, e.g. for a proxy         |
//! | `GLASSYBITES_CREDENTIALS_PATH` | user config dir        | Where `key set` saves the key      |
//! | `GLASSYBITES_TEMPLATE`         | built-in               | JSON storyboard template           |

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use glassybites_cli::commands::{self, MISSING_KEY_MESSAGE};
use glassybites_cli::config::StudioConfig;
use glassybites_cli::credentials::{resolve_credential, CredentialStore, FileCredentialStore};
use glassybites_cli::render::{render_cards, render_json};
use glassybites_core::food_list::DEFAULT_BITE_COUNT;
use glassybites_gemini::GeminiApi;
use glassybites_pipeline::PipelineError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Exit status when no API key is configured.
const EXIT_MISSING_KEY: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "glassybites", version, about = "Glass-food storyboard prompt generator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate storyboards for a list of foods (one per line).
    Generate(GenerateArgs),
    /// Manage the saved API key.
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Bite scenes per storyboard.
    #[arg(long, short, default_value_t = DEFAULT_BITE_COUNT, value_parser = clap::value_parser!(u32).range(1..))]
    bites: u32,
    /// Read food names from this file instead of stdin.
    #[arg(long, short)]
    file: Option<PathBuf>,
    /// Print the projects as JSON.
    #[arg(long)]
    json: bool,
    /// JSON storyboard template to use.
    #[arg(long)]
    template: Option<PathBuf>,
    /// Use the earlier outfit/pool/pickup slot set.
    #[arg(long, conflicts_with = "template")]
    classic: bool,
}

#[derive(Subcommand, Debug)]
enum KeyAction {
    /// Save an API key for future runs.
    Set { key: String },
    /// Show whether a key is configured.
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "glassybites=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = StudioConfig::from_env();

    match cli.command {
        Commands::Key { action } => {
            match action {
                KeyAction::Set { key } => {
                    let credentials = FileCredentialStore::new(config.credentials_path()?);
                    commands::set_key(&credentials, &key)?;
                    println!("API key saved to {}", credentials.path().display());
                }
                KeyAction::Status => {
                    let credentials = commands::open_credential_store(config.credentials_path());
                    println!(
                        "{}",
                        commands::key_status(
                            credentials.as_ref(),
                            config.env_api_key.as_deref()
                        )?
                    );
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Generate(args) => {
            let credentials = commands::open_credential_store(config.credentials_path());
            generate(&config, credentials.as_ref(), args).await
        }
    }
}

async fn generate(
    config: &StudioConfig,
    credentials: &dyn CredentialStore,
    args: GenerateArgs,
) -> anyhow::Result<ExitCode> {
    let Some(resolved) = resolve_credential(credentials, config.env_api_key.as_deref())? else {
        eprintln!("{MISSING_KEY_MESSAGE}");
        return Ok(ExitCode::from(EXIT_MISSING_KEY));
    };
    tracing::debug!(source = %resolved.source, "Using API key");

    let template = config.template(args.template.as_deref(), args.classic)?;
    let input = match &args.file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read food list from stdin")?;
            text
        }
    };

    tracing::info!(model = %config.model, base_url = %config.base_url, "Starting glassybites");

    let api = GeminiApi::new(&config.base_url);
    let orchestrator = commands::build_orchestrator(Arc::new(api), template, &config.model);

    let report = match commands::generate(
        &orchestrator,
        &input,
        args.bites,
        Some(resolved.credential),
        std::io::stderr(),
    )
    .await
    {
        Ok(report) => report,
        Err(PipelineError::MissingCredential) => {
            eprintln!("{MISSING_KEY_MESSAGE}");
            return Ok(ExitCode::from(EXIT_MISSING_KEY));
        }
        Err(PipelineError::EmptyBatch) => {
            anyhow::bail!("No food names given; enter one food per line")
        }
        Err(e) => return Err(e.into()),
    };

    let mut stdout = std::io::stdout().lock();
    if args.json {
        render_json(report.store.projects(), &mut stdout)?;
    } else {
        render_cards(report.store.projects(), &mut stdout)?;
    }

    if report.summary.failed > 0 {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
