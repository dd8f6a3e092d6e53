//! Headless PCA commentary generation.
//!
//! ```text
//! pca_cli --template deck.pptx --dataset pca.xlsx --slides 5,6,7 --variant inline
//! ```

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use pca_commentary::generator::generate_to_file;
use pca_commentary::{parse_slide_indices, ChartVariant, Deck, GeneratorConfig};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum VariantArg {
    Inline,
    Summary,
}

impl From<VariantArg> for ChartVariant {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::Inline => ChartVariant::Inline,
            VariantArg::Summary => ChartVariant::Summary,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "pca_cli", version, about = "Add PCA commentary and cost charts to a PowerPoint deck")]
struct Args {
    /// PowerPoint template; a blank 4:3 deck is used when omitted
    #[arg(long)]
    template: Option<PathBuf>,

    /// Slides in the blank deck when no template is given
    #[arg(long, default_value_t = 10)]
    blank_slides: usize,

    /// PCA workbook (.xlsx, .xlsm, .xls, .ods or .csv)
    #[arg(long)]
    dataset: PathBuf,

    /// Zero-based slide indices, comma-separated
    #[arg(long, default_value = "5,6,7")]
    slides: String,

    /// Chart set to add; overrides the config file
    #[arg(long, value_enum)]
    variant: Option<VariantArg>,

    /// JSON generator config
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output path; defaults to the variant's fixed file name
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let mut config = match &args.config {
        Some(path) => GeneratorConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => GeneratorConfig::default(),
    };
    if let Some(variant) = args.variant {
        config = config.with_variant(variant.into());
    }

    let deck = match &args.template {
        Some(path) => Deck::open(path)
            .with_context(|| format!("Failed to open template {}", path.display()))?,
        None => {
            info!("No template given, using a blank deck with {} slides", args.blank_slides);
            Deck::blank(args.blank_slides)
        }
    };

    let slide_indices = parse_slide_indices(&args.slides);
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(config.variant.output_file_name()));

    let report = generate_to_file(deck, &args.dataset, &slide_indices, &config, &output)
        .with_context(|| format!("Failed to generate from {}", args.dataset.display()))?;

    println!("Wrote {}", output.display());
    println!(
        "  {} text boxes, {} charts ({})",
        report.text_boxes_added(),
        report.charts.len(),
        report.variant.label()
    );
    for slide in report.omitted() {
        if let pca_commentary::commentary::RowCommentary::Omitted(reason) = &slide.commentary {
            println!(
                "  slide {}: no commentary (sheet row {}: {})",
                slide.slide_index, slide.sheet_row, reason
            );
        }
    }
    if !report.dropped_indices.is_empty() {
        println!("  skipped slide indices: {:?}", report.dropped_indices);
    }
    if let Some(index) = report.summary_slide {
        println!("  summary slide appended at index {}", index);
    }

    Ok(())
}
