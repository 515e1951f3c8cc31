use anyhow::Result;
use clap::Parser;
use patcheck_core::{BoxFormat, Slot};
use patcheck_cv::inspection::InspectionOutcome;
use patcheck_cv::{InspectionConfig, InspectionService};
use serde::Serialize;
use std::path::PathBuf;

mod parser;

/// Check object detections against reference assembly patterns
#[derive(Parser, Debug)]
#[command(name = "patcheck", version)]
struct Cli {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Pattern file or directory, overrides the configuration
    #[arg(long)]
    patterns: Option<PathBuf>,

    /// Pattern library key, overrides the key in the request
    #[arg(long)]
    pattern_key: Option<String>,

    /// Coordinate convention of the boxes: auto, xyxy or xywh
    #[arg(long)]
    box_format: Option<BoxFormat>,

    /// Image the boxes were detected on; pixel boxes are scaled by its size
    #[arg(long)]
    image: Option<PathBuf>,

    /// Also list the slots of the best pattern that were not found
    #[arg(long)]
    failed: bool,

    /// JSON file with the detections or a full pattern request
    detections: PathBuf,
}

#[derive(Serialize)]
struct Report {
    #[serde(flatten)]
    outcome: InspectionOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    failed_slots: Option<Vec<Slot>>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = InspectionConfig::load(cli.config.as_deref())?;
    if let Some(path) = cli.patterns {
        config.patterns.path = Some(path);
    }
    if let Some(box_format) = cli.box_format {
        config.matching.box_format = box_format;
    }

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .init();
    tracing::debug!("Using configuration: {:?}", config);

    let mut request = parser::read_request(&cli.detections)?;
    if let Some(key) = cli.pattern_key {
        request.pattern_key = Some(key);
    }
    if let Some(image) = &cli.image {
        request = parser::scale_to_image(request, image)?;
    }

    let service = InspectionService::from_config(config)?;

    let inline = request.pattern.clone().map(|p| p.into_library()).transpose()?;
    let pattern_key = request.pattern_key.clone();
    let outcome = service.inspect(request)?;

    let failed_slots = if cli.failed {
        Some(match &inline {
            Some(library) => outcome.failed_slots(library),
            None => service.failed_slots(&outcome, pattern_key.as_deref())?,
        })
    } else {
        None
    };

    let report = Report {
        outcome,
        failed_slots,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
