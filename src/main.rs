use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use stenosis_annotate::{AnalysisPipeline, AnnotationConfig, Annotator, Briefing, JsonDetections, load_image};

#[derive(Parser)]
#[command(name = "stenosis-annotate")]
#[command(about = "Number and outline detected stenosis regions on an angiogram")]
struct Cli {
    /// Path to the angiogram image
    #[arg(value_name = "IMAGE")]
    image_path: PathBuf,

    /// JSON file with the detector output: [{"bbox": [x1, y1, x2, y2], "score": s}, ...]
    #[arg(short, long, value_name = "FILE")]
    detections: PathBuf,

    /// Where to write the annotated image (format follows the extension)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Minimum confidence for a region to be kept (overrides --config)
    #[arg(short, long)]
    threshold: Option<f32>,

    /// JSON file with rendering and filtering settings
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the briefing as JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Save intermediate outputs to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Cli) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => AnnotationConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AnnotationConfig::default(),
    };
    if let Some(threshold) = args.threshold {
        config.score_threshold = threshold;
    }
    config.validate()?;
    let threshold = config.score_threshold;

    tracing::info!("Loading image: {}", args.image_path.display());
    let image = load_image(&args.image_path)?;
    tracing::info!("Image loaded: {}x{}", image.width(), image.height());

    let detector = Arc::new(JsonDetections::new(&args.detections));
    let mut pipeline = AnalysisPipeline::new(detector, Annotator::new().with_config(config)).with_verbose(args.verbose);
    if let Some(debug_dir) = args.debug_out {
        pipeline = pipeline.with_debug(debug_dir)?;
    }

    let outcome = pipeline.run(&image)?;

    if let Some(output) = &args.output {
        outcome
            .result
            .save(output)
            .with_context(|| format!("Failed to save annotated image {}", output.display()))?;
        tracing::info!("Annotated image written to {}", output.display());
    }

    let briefing = Briefing::from_result(&outcome.result, threshold);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&briefing)?);
    } else {
        print!("{}", briefing);
    }

    Ok(())
}

fn main() {
    let args = Cli::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("Detection failed: {:#}", e);
        std::process::exit(1);
    }
}
