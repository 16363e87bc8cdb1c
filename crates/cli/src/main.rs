//! DealHub CLI - extraction jobs and agreement version lifecycle from the terminal

mod logging;
mod output;
mod settings;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use dealhub_core::application::constants::DEFAULT_RECENT_DAYS;
use dealhub_core::application::{
    cancel_channel, AgreementIntake, AgreementLifecycle, ExtractionJobClient, PollOptions,
};
use dealhub_core::domain::{
    ExtractionProfile, JobKey, NewAgreement, PollOutcome, StartExtractionRequest,
};
use dealhub_core::port::DocumentUpload;
use dealhub_sdk::{HttpApiClient, Session};
use serde_json::Value;
use settings::Settings;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

#[derive(Parser)]
#[command(name = "dealhub")]
#[command(about = "DealHub facility-agreement extraction CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// API gateway URL (overrides config and DEALHUB_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Bearer token (overrides config and DEALHUB_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,

    /// Extra config file layered over ~/.config/dealhub/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and print a token for DEALHUB_TOKEN
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "DEALHUB_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Show the identity behind the current token
    Whoami,

    /// Upload a facility agreement PDF
    Upload {
        file: PathBuf,

        #[arg(short, long)]
        agreement_id: Option<i64>,

        #[arg(long, default_value = "FACILITY_AGREEMENT")]
        document_type: String,
    },

    /// Download a stored document
    Download {
        document_id: i64,

        /// Output path
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Create and manage agreement headers
    Agreement {
        #[command(subcommand)]
        command: AgreementCommands,
    },

    /// Start an extraction and wait for it (Ctrl-C stops waiting)
    ///
    /// With --file, a new agreement is created, the PDF is uploaded to it and
    /// extracted with the FACILITY_AGREEMENT profile.
    Extract {
        #[arg(short, long, required_unless_present = "file")]
        document_id: Option<i64>,

        #[arg(short, long, required_unless_present = "file")]
        agreement_id: Option<i64>,

        /// PDF to run through the full intake
        #[arg(
            short,
            long,
            conflicts_with_all = ["document_id", "agreement_id"],
            requires_all = ["borrower", "agent"]
        )]
        file: Option<PathBuf>,

        /// Agreement name for --file (defaults to the file name)
        #[arg(long, requires = "file")]
        name: Option<String>,

        #[arg(long, requires = "file")]
        borrower: Option<String>,

        #[arg(long, requires = "file")]
        agent: Option<String>,

        #[arg(long, default_value = "FACILITY_AGREEMENT")]
        profile: String,

        #[arg(long)]
        document_type: Option<String>,

        /// Polling interval in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Overall polling budget in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Store the result as a new draft version
        #[arg(long)]
        draft: bool,

        /// Write the extracted JSON to this file ("-" for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Query a job's status once
    Status { job_key: String },

    /// Resume waiting on an existing job
    Wait {
        job_key: String,

        #[arg(long)]
        interval_ms: Option<u64>,

        #[arg(long)]
        timeout_ms: Option<u64>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Create a draft version from a JSON file ("-" for stdin)
    Draft { agreement_id: i64, file: PathBuf },

    /// Save edits to a draft version
    Save {
        agreement_id: i64,
        version_id: i64,
        file: PathBuf,
    },

    /// Move a draft to VALIDATED
    Validate { version_id: i64 },

    /// Move a validated version to PUBLISHED
    Publish { version_id: i64 },

    /// Draft, validate and publish a JSON document in one go
    Promote { agreement_id: i64, file: PathBuf },

    /// List recently touched agreements
    Recent {
        #[arg(short, long, default_value_t = DEFAULT_RECENT_DAYS)]
        days: u32,
    },

    /// Search historical agreements
    History {
        #[arg(short, long, default_value = "")]
        query: String,
    },

    /// Published payloads delivered to the current lender
    Inbox,
}

#[derive(Subcommand)]
enum AgreementCommands {
    /// Create an agreement header
    Create {
        #[arg(long)]
        name: String,

        #[arg(long)]
        borrower: String,

        #[arg(long)]
        agent: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = logging::init()?;

    let settings =
        Settings::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let session = session_for(&cli, &settings);

    match cli.command {
        Commands::Login { email, password } => {
            let session = HttpApiClient::login(session, email, password).await?;
            println!("{}", "✓ Logged in".green().bold());
            if let Some(token) = session.token() {
                println!("export DEALHUB_TOKEN={}", token);
            }
        }

        Commands::Whoami => {
            let me = HttpApiClient::new(session)?.me().await?;
            println!("  {} {}", "Id:".bold(), me.id);
            println!("  {} {}", "Role:".bold(), me.role);
            if let Some(email) = me.email {
                println!("  {} {}", "Email:".bold(), email);
            }
        }

        Commands::Upload {
            file,
            agreement_id,
            document_type,
        } => {
            let client = HttpApiClient::new(session)?;
            let uploaded = client
                .upload_document(&file, agreement_id, Some(&document_type))
                .await
                .with_context(|| format!("Failed to upload {}", file.display()))?;

            println!("{}", "✓ Document uploaded".green().bold());
            println!("  {} {}", "Document:".bold(), uploaded.document_id);
            if let Some(id) = uploaded.agreement_id {
                println!("  {} {}", "Agreement:".bold(), id);
            }
        }

        Commands::Download { document_id, out } => {
            let bytes = HttpApiClient::new(session)?
                .download_document(document_id)
                .await?;
            std::fs::write(&out, &bytes)
                .with_context(|| format!("Failed to write {}", out.display()))?;
            println!(
                "{}",
                format!("✓ Saved {} bytes to {}", bytes.len(), out.display()).green()
            );
        }

        Commands::Agreement {
            command:
                AgreementCommands::Create {
                    name,
                    borrower,
                    agent,
                },
        } => {
            let request = NewAgreement::new(name, borrower, agent)?;
            let created = lifecycle(session)?.create_agreement(&request).await?;
            output::print_agreement("Agreement created", &created);
        }

        Commands::Extract {
            file: Some(file),
            name,
            borrower,
            agent,
            interval_ms,
            timeout_ms,
            draft,
            output,
            ..
        } => {
            let name = match name {
                Some(name) => name,
                None => file_stem(&file)?,
            };
            let request = NewAgreement::new(
                name,
                borrower.unwrap_or_default(),
                agent.unwrap_or_default(),
            )?;
            let upload = read_upload(&file)?;

            let api = Arc::new(HttpApiClient::new(session)?);
            let intake =
                AgreementIntake::new(api.clone(), api.clone(), job_client(api, &settings));

            let options = settings.poll_options(interval_ms, timeout_ms);
            let (options, ctrl_c) = cancel_on_ctrl_c(options);
            info!(file = %file.display(), "Starting agreement intake");
            let report = intake.run(&request, upload, options, draft).await;
            ctrl_c.abort();
            let report = report?;

            output::print_agreement("Agreement created", &report.agreement);
            println!("  {} {}", "Document:".bold(), report.document_id);
            println!("{} {}", "✓ Extraction started:".green().bold(), report.job_key);

            finish(&report.outcome, output.as_deref())?;
            if let Some(version) = &report.draft {
                output::print_version("Draft created", version);
            }
        }

        Commands::Extract {
            document_id,
            agreement_id,
            profile,
            document_type,
            interval_ms,
            timeout_ms,
            draft,
            output,
            ..
        } => {
            let (Some(document_id), Some(agreement_id)) = (document_id, agreement_id) else {
                bail!("--document-id and --agreement-id are required without --file");
            };
            let mut request = StartExtractionRequest::new(document_id, agreement_id)
                .with_profile(ExtractionProfile::parse(&profile)?);
            if let Some(kind) = document_type {
                request = request.with_document_type(kind);
            }

            let api = Arc::new(HttpApiClient::new(session)?);
            let jobs = job_client(api.clone(), &settings);

            let job_key = jobs.submit(&request).await?;
            println!("{} {}", "✓ Extraction started:".green().bold(), job_key);

            let options = settings.poll_options(interval_ms, timeout_ms);
            let outcome = wait_for(&jobs, &job_key, options).await?;
            let document = finish(&outcome, output.as_deref())?;

            if let (Some(document), true) = (document, draft) {
                let lifecycle = AgreementLifecycle::new(api);
                let version = lifecycle.create_draft(agreement_id, &document).await?;
                output::print_version("Draft created", &version);
            }
        }

        Commands::Status { job_key } => {
            let job_key = JobKey::new(job_key)?;
            let jobs = job_client(Arc::new(HttpApiClient::new(session)?), &settings);
            let state = jobs.fetch_state(&job_key).await?;

            println!("  {} {}", "Job:".bold(), job_key);
            println!("  {} {}", "Status:".bold(), or_unknown(&state.status));
            if let Some(error) = state.error_detail {
                println!("  {} {}", "Error:".bold(), error.red());
            }
            if state.result_payload.is_some() {
                println!("  {} available", "Result:".bold());
            }
        }

        Commands::Wait {
            job_key,
            interval_ms,
            timeout_ms,
            output,
        } => {
            let job_key = JobKey::new(job_key)?;
            let jobs = job_client(Arc::new(HttpApiClient::new(session)?), &settings);
            let options = settings.poll_options(interval_ms, timeout_ms);
            let outcome = wait_for(&jobs, &job_key, options).await?;
            finish(&outcome, output.as_deref())?;
        }

        Commands::Draft { agreement_id, file } => {
            let document = read_document(&file)?;
            let version = lifecycle(session)?
                .create_draft(agreement_id, &document)
                .await?;
            output::print_version("Draft created", &version);
        }

        Commands::Save {
            agreement_id,
            version_id,
            file,
        } => {
            let document = read_document(&file)?;
            let version = lifecycle(session)?
                .save_draft(agreement_id, version_id, &document)
                .await?;
            let label = if version.id == version_id {
                "Draft updated"
            } else {
                "Draft updated (new version created)"
            };
            output::print_version(label, &version);
        }

        Commands::Validate { version_id } => {
            let version = lifecycle(session)?.validate_by_id(version_id).await?;
            output::print_version("Validated", &version);
        }

        Commands::Publish { version_id } => {
            let version = lifecycle(session)?.publish_by_id(version_id).await?;
            output::print_version("Published", &version);
        }

        Commands::Promote { agreement_id, file } => {
            let document = read_document(&file)?;
            let version = lifecycle(session)?.promote(agreement_id, &document).await?;
            output::print_version("Published", &version);
        }

        Commands::Recent { days } => {
            let rows = lifecycle(session)?.recent(days).await?;
            output::print_agreements(rows);
        }

        Commands::History { query } => {
            let rows = lifecycle(session)?.historical(&query).await?;
            output::print_agreements(rows);
        }

        Commands::Inbox => {
            let messages = lifecycle(session)?.lender_inbox().await?;
            output::print_inbox(messages);
        }
    }

    Ok(())
}

fn session_for(cli: &Cli, settings: &Settings) -> Session {
    let api_url = cli.api_url.clone().unwrap_or_else(|| settings.api_url.clone());
    let session = Session::new(api_url);

    match cli.token.as_ref().or(settings.token.as_ref()) {
        Some(token) => session.with_token(token.clone()),
        None => session,
    }
}

fn job_client(api: Arc<HttpApiClient>, settings: &Settings) -> ExtractionJobClient {
    ExtractionJobClient::new(api)
        .with_vocabulary(settings.vocabulary())
        .with_retry_policy(settings.retry_policy())
}

fn lifecycle(session: Session) -> Result<AgreementLifecycle> {
    Ok(AgreementLifecycle::new(Arc::new(HttpApiClient::new(session)?)))
}

/// Attach a Ctrl-C listener to `options`; abort the handle once polling is over
fn cancel_on_ctrl_c(options: PollOptions) -> (PollOptions, JoinHandle<()>) {
    let (handle, token) = cancel_channel();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            handle.cancel();
        }
    });
    (options.cancel_on(token), ctrl_c)
}

/// Poll until an outcome; Ctrl-C cancels the wait, not the job
async fn wait_for(
    jobs: &ExtractionJobClient,
    job_key: &JobKey,
    options: PollOptions,
) -> Result<PollOutcome> {
    let (options, ctrl_c) = cancel_on_ctrl_c(options);

    info!(job_key = %job_key, "Waiting for extraction");
    let outcome = jobs.poll(job_key, options).await;
    ctrl_c.abort();

    Ok(outcome?)
}

/// Print the outcome; on success return the document (after writing it out if asked)
fn finish(outcome: &PollOutcome, output: Option<&Path>) -> Result<Option<Value>> {
    output::print_outcome(outcome);

    match outcome {
        PollOutcome::Succeeded { payload, .. } => {
            output::print_document_summary(payload);
            if let Some(path) = output {
                write_document(path, payload)?;
            }
            Ok(Some(payload.clone()))
        }
        PollOutcome::Cancelled { .. } => Ok(None),
        PollOutcome::Failed { job_key, .. } => bail!("extraction {} failed", job_key),
        PollOutcome::TimedOut { job_key, .. } => {
            bail!("timed out waiting for extraction {}", job_key)
        }
    }
}

fn read_upload(path: &Path) -> Result<DocumentUpload> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("{} is not a file", path.display()))?;
    Ok(DocumentUpload::new(file_name, bytes))
}

fn file_stem(path: &Path) -> Result<String> {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .with_context(|| format!("Cannot derive an agreement name from {}", path.display()))
}

fn read_document(path: &Path) -> Result<Value> {
    let text = if path == Path::new("-") {
        std::io::read_to_string(std::io::stdin()).context("Failed to read stdin")?
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?
    };
    serde_json::from_str(&text).context("Invalid JSON document")
}

fn write_document(path: &Path, document: &Value) -> Result<()> {
    let text = serde_json::to_string_pretty(document)?;
    if path == Path::new("-") {
        println!("{}", text);
    } else {
        std::fs::write(path, text)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("  {} {}", "Saved:".bold(), path.display());
    }
    Ok(())
}

fn or_unknown(status: &str) -> String {
    if status.trim().is_empty() {
        "(none)".to_string()
    } else {
        status.to_string()
    }
}
