//! practice-smoke: exercises the test-data lifecycle against a live notes service
//!
//! Creates a user, a batch of notes and the mixed-status set, then cleans
//! everything up and prints the cleanup report as JSON. Exits non-zero when
//! any step or any deletion failed.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use practice_api::ApiConfig;
use practice_e2e::{SuiteConfig, TestDataApi, TestSuite, UniquenessStrategy};

#[derive(Parser, Debug)]
#[command(name = "practice-smoke")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML file with API settings (defaults apply if absent)
    #[arg(short, long, default_value = "practice.toml")]
    config: PathBuf,

    /// Override the service base URL
    #[arg(long, env = "PRACTICE_BASE_URL")]
    base_url: Option<String>,

    /// Number of notes to create in the batch step
    #[arg(short, long, default_value = "3")]
    notes: usize,

    /// Fixture directory
    #[arg(long)]
    fixtures: Option<PathBuf>,

    /// Derive user identities from the timestamp alone
    #[arg(long)]
    timestamp_only: bool,

    /// Skip the health-check probe
    #[arg(long)]
    no_wait: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .init();

    let mut api = ApiConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?
        .with_env_overrides()?;
    if let Some(base_url) = args.base_url {
        api = api.with_base_url(base_url);
    }

    let mut config = SuiteConfig {
        api,
        wait_for_api: !args.no_wait,
        ..Default::default()
    };
    if let Some(dir) = args.fixtures {
        config.fixtures_dir = dir;
    }
    if args.timestamp_only {
        config.uniqueness = UniquenessStrategy::Timestamp;
    }

    let suite = TestSuite::before_suite(config)
        .await
        .context("starting test suite")?;

    let outcome = {
        let data = suite.data();
        let mut data = data.lock().await;
        run_scenario(&mut data, args.notes).await
    };
    if let Err(e) = &outcome {
        error!("Smoke scenario failed: {:#}", e);
    }

    let report = suite.dispose().await;
    println!("{}", serde_json::to_string_pretty(&report)?);

    if outcome.is_err() || !report.is_clean() {
        std::process::exit(1);
    }
    Ok(())
}

async fn run_scenario(data: &mut TestDataApi, note_count: usize) -> anyhow::Result<()> {
    let token = data
        .create_user_and_get_token(None)
        .await
        .context("creating user")?;

    let profile = data.auth().get_profile(&token).await?;
    data.auth().validate_registration_response(&profile, 200)?;

    let single = data.create_note(&token, None).await.context("creating note")?;
    info!("Created note {}", single.id);

    if note_count > 0 {
        let batch = data
            .create_multiple_notes(&token, note_count)
            .await
            .context("creating note batch")?;
        info!("Created {} batch notes", batch.len());
    }

    let mixed = data
        .create_notes_with_mixed_status(&token)
        .await
        .context("creating mixed-status notes")?;
    info!(
        "Created {} completed and {} pending notes",
        mixed.completed.len(),
        mixed.pending.len()
    );

    let listed = data.notes().get_all(&token, &[]).await?;
    data.notes().validate_notes_list_response(&listed, 200)?;

    Ok(())
}
