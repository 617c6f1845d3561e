use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use kyc_wizard::api::{KycClient, Verifier};
use kyc_wizard::app::{run_wizard, AppCtx};
use kyc_wizard::camera::{Camera, CameraSlot, FileCamera, StreamCamera};
use kyc_wizard::cli::{ApiArgs, Cli, Command};
use kyc_wizard::commands;
use kyc_wizard::config::{stream_config_from_env, ApiConfig};
use kyc_wizard::countries::CountryCatalog;
use kyc_wizard::defaults::Defaults;
use kyc_wizard::logging;
use kyc_wizard::types::VerificationSession;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match dispatch(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

async fn dispatch(cli: Cli) -> Result<u8> {
    let catalog = match &cli.countries {
        Some(path) => CountryCatalog::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => CountryCatalog::bundled().context("loading bundled country table")?,
    };
    let session = match &cli.api.session {
        Some(id) => VerificationSession::new(id.clone()),
        None => VerificationSession::generate(),
    };

    let cmd = cli.cmd.unwrap_or(Command::Run { document_image: None, log_file: None });
    match cmd {
        Command::Run { document_image, log_file } => {
            let log_file = log_file.unwrap_or_else(|| PathBuf::from(Defaults::LOG_FILE));
            logging::init_file(&log_file)?;

            let verifier = verifier(&cli.api)?;
            let camera: Box<dyn Camera> = match document_image {
                Some(doc) => Box::new(FileCamera::new(doc)),
                None => Box::new(StreamCamera::new(stream_config_from_env())),
            };

            tracing::info!(session = %session, countries = catalog.len(), "starting wizard");
            let ctx = AppCtx::new(session, catalog, verifier, CameraSlot::new(camera));
            let wizard = run_wizard(ctx).await?;
            if wizard.is_complete() {
                println!("✓ Verification {} complete ({} photo(s) accepted)", wizard.session, wizard.accepted.len());
            }
            Ok(0)
        }

        Command::Countries => {
            commands::countries::emit(&catalog, std::io::stdout().lock())?;
            Ok(0)
        }

        Command::Submit { image, document_type } => {
            logging::init_stderr()?;
            let verifier = verifier(&cli.api)?;
            let report = commands::submit::run(
                verifier,
                &image,
                document_type,
                session,
                Duration::from_secs(Defaults::OCR_DRAIN_SECS),
            )
            .await;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(report.exit_code())
        }
    }
}

fn verifier(args: &ApiArgs) -> Result<Arc<dyn Verifier>> {
    let mut config = ApiConfig::from_env()?;
    if let Some(url) = &args.api_url {
        config = config.with_base_url(url)?;
    }
    if let Some(token) = &args.api_token {
        config = config.with_token(token.clone());
    }
    tracing::debug!(?config, "verification service");
    Ok(Arc::new(KycClient::new(config)?))
}
