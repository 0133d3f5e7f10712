//! Extract command - run the ingestion pipeline over one file

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use crate::config::AppConfig;
use crate::domain::ingestion::{validate_upload, DocumentSource};
use crate::infrastructure::ingestion::DocumentPipeline;
use crate::infrastructure::logging;

#[derive(Args)]
pub struct ExtractArgs {
    /// Path to the document to extract
    pub file: PathBuf,

    /// Declared MIME type (guessed from the extension when omitted)
    #[arg(long)]
    pub mime: Option<String>,

    /// Skip the upload contract checks (type allow-list, size limit)
    #[arg(long)]
    pub skip_validation: bool,
}

/// Run the extract command
pub async fn run(args: ExtractArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_default();
    init_logging(&config);

    let bytes = tokio::fs::read(&args.file).await?;
    let filename = args
        .file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    let mime = args.mime.clone().unwrap_or_else(|| {
        mime_guess::from_path(&args.file)
            .first_or_octet_stream()
            .essence_str()
            .to_string()
    });

    info!("Extracting {} ({})", filename, mime);

    if !args.skip_validation {
        validate_upload(&filename, &mime, bytes.len(), &config.ingestion.limits())?;
    }

    let source = DocumentSource::from_bytes(bytes)
        .with_filename(filename.clone())
        .with_mime(mime);

    let pipeline = DocumentPipeline::new();
    let parsed = pipeline.parse(&source).await?;

    println!("File: {}", filename);
    println!("Type: {}", parsed.kind.label());
    println!("Length: {}", parsed.content.len());
    println!();
    println!("{}", parsed.content);

    Ok(())
}

fn init_logging(config: &AppConfig) {
    logging::init_logging(&logging::LoggingConfig {
        level: config.logging.level.clone(),
        format: config.logging.format.clone(),
    });
}
