//! Sentinel CLI - prepares, diagnoses and wires OpenClaw agents to Sentinel.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::{json, Value};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod doctor;
mod env_sync;
mod install;
mod setup;

use sentinel_plugin::workspace::resolve_workspace_dir;
use sentinel_plugin::{ConfigOverrides, Gateway, Sentinel, SentinelClient, SentinelConfig};

#[derive(Debug, Parser)]
#[command(name = "sentinel", version, about = "Sentinel Agent CLI Manager")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Per-command overrides for the connection settings.
#[derive(Debug, Clone, Default, Args)]
struct ConnectionArgs {
    /// Override API key for this command
    #[arg(long)]
    api_key: Option<String>,
    /// Override Sentinel API base URL for this command
    #[arg(long)]
    base_url: Option<String>,
    /// Override agent ID for this command
    #[arg(long)]
    agent_id: Option<String>,
}

impl From<ConnectionArgs> for ConfigOverrides {
    fn from(args: ConnectionArgs) -> Self {
        ConfigOverrides {
            api_key: args.api_key,
            base_url: args.base_url,
            agent_id: args.agent_id,
            workspace_dir: None,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Prepare Sentinel environment variables for CLI + OpenClaw plugin usage
    Setup {
        /// Path to env file
        #[arg(long, default_value = ".env")]
        file: PathBuf,
        /// Overwrite env file with Sentinel template
        #[arg(long)]
        force: bool,
        /// Emit machine-readable setup output
        #[arg(long)]
        json: bool,
    },
    /// Checks Sentinel API key, connectivity, and agent configuration
    Doctor {
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
        /// Treat WARN checks as failures
        #[arg(long)]
        strict_warn: bool,
        #[command(flatten)]
        connection: ConnectionArgs,
    },
    /// Fast connectivity check (equivalent to: sentinel doctor --strict-warn)
    Check {
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        connection: ConnectionArgs,
    },
    /// Environment secret sync commands
    Env {
        #[command(subcommand)]
        command: EnvCommands,
    },
    /// Deprecated alias for 'sentinel env push'
    EnvPush {
        /// Path to env file
        #[arg(long, default_value = ".env")]
        file: PathBuf,
    },
    /// Deprecated alias for 'sentinel env pull'
    EnvPull {
        /// Path to env file
        #[arg(long, default_value = ".env")]
        file: PathBuf,
        /// Overwrite destination file without prompt
        #[arg(long)]
        force: bool,
    },
    /// Injects Sentinel protocols into OpenClaw HEARTBEAT.md
    InstallHeartbeat {
        /// OpenClaw workspace root (defaults: --workspace-dir, OPENCLAW_WORKSPACE_DIR, then current directory)
        #[arg(long)]
        workspace_dir: Option<String>,
    },
    /// Run the sentinel_heartbeat skill once and print its message
    Heartbeat {
        #[command(flatten)]
        connection: ConnectionArgs,
    },
}

#[derive(Debug, Subcommand)]
enum EnvCommands {
    /// Backup local .env secrets to the Cloud Vault
    Push {
        /// Path to env file
        #[arg(long, default_value = ".env")]
        file: PathBuf,
    },
    /// Restore secrets from Cloud Vault to local .env
    Pull {
        /// Path to env file
        #[arg(long, default_value = ".env")]
        file: PathBuf,
        /// Overwrite destination file without prompt
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so command output stays machine-readable
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Setup { file, force, json } => run_setup(&file, force, json),
        Commands::Doctor {
            json,
            strict_warn,
            connection,
        } => run_doctor(connection, strict_warn, json).await,
        Commands::Check { json, connection } => run_check(connection, json).await,
        Commands::Env { command } => match command {
            EnvCommands::Push { file } => run_env(env_sync::push(&absolute(&file)?)),
            EnvCommands::Pull { file, force } => {
                run_env(env_sync::pull(&absolute(&file)?, force))
            }
        },
        Commands::EnvPush { file } => {
            eprintln!(
                "{}",
                env_sync::deprecation_warning("sentinel env-push", "sentinel env push")
            );
            run_env(env_sync::push(&absolute(&file)?))
        }
        Commands::EnvPull { file, force } => {
            eprintln!(
                "{}",
                env_sync::deprecation_warning("sentinel env-pull", "sentinel env pull")
            );
            run_env(env_sync::pull(&absolute(&file)?, force))
        }
        Commands::InstallHeartbeat { workspace_dir } => run_install(workspace_dir.as_deref()),
        Commands::Heartbeat { connection } => run_heartbeat(connection).await,
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("Cannot determine current directory")?;
    Ok(cwd.join(path))
}

fn load_config(connection: ConnectionArgs) -> Result<SentinelConfig> {
    SentinelConfig::load(connection.into()).context("Failed to load Sentinel configuration")
}

fn client_for(config: &SentinelConfig) -> Option<SentinelClient> {
    config
        .api_key
        .as_deref()
        .map(|key| SentinelClient::new(key, &config.api_base_url, &config.agent_id))
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn exit_code(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn run_setup(file: &Path, force: bool, json: bool) -> Result<ExitCode> {
    let path = absolute(file)?;
    let outcome = setup::write_setup_template(&path, force)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    let config = load_config(ConnectionArgs::default())?;

    if json {
        let mut report = json!({
            "ok": true,
            "file": path.display().to_string(),
            "requiredEnv": setup::REQUIRED_ENV,
            "optionalEnv": setup::OPTIONAL_ENV,
            "detected": {
                "hasApiKey": config.has_api_key(),
                "baseUrl": config.api_base_url,
                "agentId": config.agent_id,
            },
        });
        if let (Value::Object(report), Value::Object(outcome)) =
            (&mut report, serde_json::to_value(&outcome)?)
        {
            report.extend(outcome);
        }
        print_json(&report)?;
        return Ok(ExitCode::SUCCESS);
    }

    println!("{}", outcome.detail);
    println!("Required env: SENTINEL_API_KEY");
    println!("Optional env: SENTINEL_API_BASE_URL, SENTINEL_AGENT_ID (or AGENT_ID)");
    println!("Detected base URL: {}", config.api_base_url);
    println!("Detected agent ID: {}", config.agent_id);
    Ok(ExitCode::SUCCESS)
}

async fn run_doctor(connection: ConnectionArgs, strict_warn: bool, json: bool) -> Result<ExitCode> {
    let config = load_config(connection)?;
    let client = client_for(&config);
    let report = doctor::doctor(
        &config,
        client.as_ref().map(|c| c as &dyn Gateway),
        strict_warn,
    )
    .await;

    if json {
        print_json(&report)?;
    } else {
        for check in &report.checks {
            println!("{}", check);
        }
    }
    Ok(exit_code(report.ok))
}

async fn run_check(connection: ConnectionArgs, json: bool) -> Result<ExitCode> {
    let config = load_config(connection)?;
    let client = client_for(&config);
    let report = doctor::check(&config, client.as_ref().map(|c| c as &dyn Gateway)).await;

    if json {
        print_json(&report)?;
    } else {
        for check in &report.checks {
            println!("{}", check);
        }
    }
    Ok(exit_code(report.ok))
}

fn run_env(result: std::result::Result<(), String>) -> Result<ExitCode> {
    match result {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(message) => {
            eprintln!("ERROR: {}", message);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn run_install(workspace_dir: Option<&str>) -> Result<ExitCode> {
    let config = load_config(ConnectionArgs::default())?;
    let workspace = resolve_workspace_dir(&[workspace_dir, config.workspace_dir.as_deref()])?;

    match install::install_heartbeat(&workspace) {
        Ok(install::InstallOutcome::Installed) => {
            println!("Successfully injected Sentinel heartbeat block into HEARTBEAT.md");
            Ok(ExitCode::SUCCESS)
        }
        Ok(install::InstallOutcome::AlreadyInstalled) => {
            println!("Sentinel heartbeat block is already installed in HEARTBEAT.md");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            eprintln!("ERROR: HEARTBEAT.md not found. Are you in the root of an OpenClaw agent?");
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e).context("Failed to update HEARTBEAT.md"),
    }
}

async fn run_heartbeat(connection: ConnectionArgs) -> Result<ExitCode> {
    let config = load_config(connection)?;
    let sentinel = Sentinel::new(&config).await?;
    let message = sentinel.invoke("sentinel_heartbeat", Value::Null).await?;

    match message {
        Value::String(text) => println!("{}", text),
        other => println!("{}", other),
    }
    Ok(ExitCode::SUCCESS)
}
