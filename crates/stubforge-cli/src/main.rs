//! `stubforge`: render prompts, synthesize schema values, run the pipeline.
//!
//! # Usage
//!
//! ```text
//! stubforge render --template prompt.txt --inputs inputs.yaml
//! stubforge synth --schema schema.json --seed 7 --count 3
//! stubforge pipeline --manifest demos/cells.yaml --seed 42 --pretty
//! ```

mod cli;
mod manifest;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use uuid::Uuid;

use stubforge_core::{
    render, run_pipeline, EngineConfig, GenerationEngine, Inputs, PromptTemplate, SchemaTemplate,
};

use cli::{Cli, Commands};
use manifest::{load_structured, schema_body, Manifest};

fn main() {
    if let Err(error) = run() {
        eprintln!("stubforge error: {error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    match cli.command {
        Commands::Render { template, inputs } => render_command(&template, &inputs),
        Commands::Synth {
            schema,
            seed,
            count,
        } => synth_command(&schema, seed, count),
        Commands::Pipeline {
            manifest,
            seed,
            config,
            pretty,
        } => pipeline_command(&manifest, seed, config.as_deref(), pretty),
    }
}

fn init_tracing(quiet: bool, verbose: bool) -> Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("STUBFORGE_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

fn render_command(template: &Path, inputs: &Path) -> Result<()> {
    let text = std::fs::read_to_string(template)
        .with_context(|| format!("reading template {}", template.display()))?;
    let inputs: Inputs = load_structured(inputs)?;

    let rendered = render(&text, &inputs)
        .with_context(|| format!("rendering {}", template.display()))?;
    print!("{rendered}");
    Ok(())
}

fn synth_command(schema: &Path, seed: Option<u64>, count: usize) -> Result<()> {
    let body: serde_json::Value = load_structured(schema)?;
    let schema = SchemaTemplate {
        id: Uuid::new_v4(),
        schema_type: "adhoc".to_string(),
        version: 1,
        schema_body: schema_body(&body)?,
    };
    let prompt = PromptTemplate {
        id: Uuid::new_v4(),
        key: "adhoc".to_string(),
        version: 1,
        template_text: String::new(),
        model_name: String::new(),
        model_params: serde_json::Value::Null,
    };

    let config = EngineConfig {
        seed,
        ..Default::default()
    };
    let engine = GenerationEngine::new(config);
    let inputs = Inputs::new();

    for _ in 0..count {
        let raw = engine
            .generate(&prompt, &schema, &inputs)
            .context("synthesizing from schema")?;
        println!("{}", String::from_utf8_lossy(&raw));
    }
    Ok(())
}

fn pipeline_command(
    manifest: &Path,
    seed: Option<u64>,
    config: Option<&Path>,
    pretty: bool,
) -> Result<()> {
    let mut engine_config = match config {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if seed.is_some() {
        engine_config.seed = seed;
    }

    tracing::debug!(seed = ?engine_config.seed, "Engine configured");

    let manifest = Manifest::load(manifest)?;
    let engine = GenerationEngine::new(engine_config);
    let document = manifest.document(engine.now());
    let templates = manifest.templates()?;

    let output = run_pipeline(&engine, &document, &templates)
        .with_context(|| format!("running pipeline for '{}'", document.human_title))?;

    print_json(&output, pretty)
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{text}");
    Ok(())
}
