//! Structure a candidate document
//!
//! Reads a `DocumentInput` JSON file (per-page candidates from the
//! extractors), runs the structuring pipeline and prints the element JSON,
//! or the chunk JSON when chunking is configured.
//!
//! Usage:
//!   cargo run --release --bin element-oxide -- candidates.json
//!   cargo run --release --bin element-oxide -- candidates.json --config config.json --output elements.json
//!   RUST_LOG=debug cargo run --bin element-oxide -- candidates.json --validate

use element_oxide::elements::{elements_to_file, elements_to_json, DataSourceMetadata};
use element_oxide::structure::validate_hierarchy;
use element_oxide::{DocumentInput, StructuringConfig, StructuringPipeline};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

struct CliArgs {
    input: PathBuf,
    config: Option<PathBuf>,
    output: Option<PathBuf>,
    validate: bool,
}

impl CliArgs {
    fn from_args() -> Option<Self> {
        let args: Vec<String> = std::env::args().collect();
        let mut input = None;
        let mut config = None;
        let mut output = None;
        let mut validate = false;

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--config" => {
                    i += 1;
                    config = args.get(i).map(PathBuf::from);
                },
                "--output" | "-o" => {
                    i += 1;
                    output = args.get(i).map(PathBuf::from);
                },
                "--validate" => {
                    validate = true;
                },
                other if input.is_none() && !other.starts_with('-') => {
                    input = Some(PathBuf::from(other));
                },
                other => {
                    eprintln!("Ignoring unknown argument: {}", other);
                },
            }
            i += 1;
        }

        Some(Self {
            input: input?,
            config,
            output,
            validate,
        })
    }
}

fn run(args: &CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config: StructuringConfig = match &args.config {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => StructuringConfig::default(),
    };
    let pipeline = StructuringPipeline::new(config)?;

    let mut document: DocumentInput = serde_json::from_str(&fs::read_to_string(&args.input)?)?;
    let processed_at = chrono::Utc::now().to_rfc3339();
    document
        .data_source
        .get_or_insert_with(DataSourceMetadata::default)
        .date_processed = Some(processed_at);

    let start = Instant::now();
    let processed = pipeline.process(&document)?;
    log::info!(
        "structured {} elements ({} chunks) in {:.2?}",
        processed.elements.len(),
        processed.chunks.as_ref().map_or(0, |c| c.len()),
        start.elapsed()
    );

    if args.validate {
        let violations = validate_hierarchy(&processed.elements);
        for violation in &violations {
            eprintln!("hierarchy: {}", violation);
        }
        if !violations.is_empty() {
            return Err(format!("{} hierarchy violations", violations.len()).into());
        }
    }

    match &args.output {
        Some(path) => elements_to_file(processed.output(), path)?,
        None => println!("{}", elements_to_json(processed.output())?),
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let Some(args) = CliArgs::from_args() else {
        eprintln!("Usage: element-oxide <candidates.json> [--config config.json] [--output out.json] [--validate]");
        return ExitCode::from(2);
    };

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        },
    }
}
