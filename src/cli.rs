//
// cli.rs
// EOTRH-Score-rs
//
// Defines the CLI surface with Clap and dispatches user-selected commands to the
// analysis pipeline, the scoring engine, or the web server.
//

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config::AnalysisConfig;
use crate::models::ManualFindings;
use crate::roi::RoiSet;
use crate::scoring;
use crate::texture::TextureAnalyzer;
use crate::web;

#[derive(Parser)]
#[command(name = "eotrh-score")]
#[command(about = "EOTRH suspicion scoring from radiographs, ROIs, and manual findings", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Full pipeline: texture analysis plus the integrated classification
    Analyze {
        /// Radiograph image (PNG, JPEG, TIFF, ...)
        #[arg(short, long)]
        image: PathBuf,
        /// JSON file with ROI polygons: [[[x, y], ...], ...]
        #[arg(short, long)]
        rois: PathBuf,
        /// JSON file with the validated manual findings
        #[arg(short, long)]
        findings: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Digital texture analysis only
    Texture {
        #[arg(short, long)]
        image: PathBuf,
        #[arg(short, long)]
        rois: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Integrated engine over already-known subsystem scores
    Score {
        #[arg(long)]
        clinical: u32,
        #[arg(long)]
        radio: u32,
        #[arg(long)]
        digital: u32,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Start the JSON API server
    Web {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(short, long, default_value_t = 3000)]
        port: u16,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

pub async fn run() -> Result<()> {
    // Parse the raw CLI arguments once and dispatch to a subcommand handler.
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            image,
            rois,
            findings,
            config,
        } => {
            let config = load_config(config.as_deref())?;
            let image_bytes = read_image(&image)?;
            let rois = read_rois(&rois)?;
            let findings = read_findings(&findings)?;

            let analyzer = TextureAnalyzer::new(config.texture.clone());
            let texture = analyzer.analyze(&image_bytes, rois.polygons());
            let clinical = scoring::clinical_score(&findings, &config.scoring);
            let radiographic = scoring::radiographic_score(&findings, &config.scoring);
            let result = scoring::integrate(
                clinical,
                radiographic,
                texture.digital_score,
                texture.max_entropy,
                texture.roi_details,
                &config.scoring,
            );
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Texture {
            image,
            rois,
            config,
        } => {
            let config = load_config(config.as_deref())?;
            let image_bytes = read_image(&image)?;
            let rois = read_rois(&rois)?;

            let analyzer = TextureAnalyzer::new(config.texture.clone());
            let outcome = analyzer.analyze(&image_bytes, rois.polygons());
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Commands::Score {
            clinical,
            radio,
            digital,
            config,
        } => {
            let config = load_config(config.as_deref())?;
            // Subsystem scores arrive pre-capped from their own layers; enforce
            // the caps again so manual invocations cannot exceed the scale.
            let result = scoring::integrate(
                clinical.min(config.scoring.max_clinical),
                radio.min(config.scoring.max_radiographic),
                digital.min(config.scoring.max_digital),
                0.0,
                Vec::new(),
                &config.scoring,
            );
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Web { host, port, config } => {
            let config = load_config(config.as_deref())?;
            web::start_server(&host, port, config).await?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    match path {
        Some(path) => AnalysisConfig::from_path(path),
        None => Ok(AnalysisConfig::default()),
    }
}

fn read_image(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("Failed to read image file {:?}", path))
}

fn read_rois(path: &Path) -> Result<RoiSet> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("Failed to read ROI file {:?}", path))?;
    RoiSet::from_json(&raw).with_context(|| format!("Invalid ROI data in {:?}", path))
}

fn read_findings(path: &Path) -> Result<ManualFindings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read findings file {:?}", path))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid manual findings in {:?}", path))
}
