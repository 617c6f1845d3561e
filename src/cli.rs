use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::types::DocumentType;

/// Identity document capture and verification wizard
#[derive(Parser, Debug)]
#[command(version, about = "KYC document capture wizard")]
pub struct Cli {
    #[command(flatten)]
    pub api: ApiArgs,

    /// Country table to use instead of the bundled one (JSON rows of
    /// country, country_code, document)
    #[arg(long, global = true)]
    pub countries: Option<PathBuf>,

    #[command(subcommand)]
    pub cmd: Option<Command>,
}

/// Verification service connection (overrides KYC_API_URL / KYC_API_TOKEN)
#[derive(Args, Debug, Default)]
pub struct ApiArgs {
    /// Base URL of the verification service
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Bearer token for the verification service
    #[arg(long, global = true)]
    pub api_token: Option<String>,

    /// Verification session id (default: a fresh UUID)
    #[arg(long, global = true)]
    pub session: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the interactive wizard (default)
    Run {
        /// Serve document captures from this JPEG instead of a camera device
        #[arg(long)]
        document_image: Option<PathBuf>,

        /// Log file (default: ./kyc-wizard.log)
        #[arg(long)]
        log_file: Option<PathBuf>,
    },

    /// Print the country list in display order as JSON
    Countries,

    /// Send one image through the quality check and OCR without the UI
    Submit {
        /// JPEG to submit
        #[arg(long)]
        image: PathBuf,

        /// Document side, e.g. passport, id_card_front, driving_licence_back
        #[arg(long = "type")]
        document_type: DocumentType,
    },
}
