//! Multiview Gen
//!
//! Command-line entry point for generating multiview image datasets.

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use multiview_gen::config::{self, Config};
use multiview_gen::generator::{GenerationProgress, WorkerEvent};
use multiview_gen::logging::{init_logging, LogConfig};
use multiview_gen::{FailurePolicy, GenerationOptions, GenerationWorker, OfflineScene};

#[derive(Parser, Debug)]
#[command(name = "multiview-gen")]
#[command(about = "Render multiview image datasets of 3D models", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render every object of a config into its output directory
    Generate {
        /// Path to the JSON config
        #[arg(long, short)]
        config: PathBuf,

        /// Render only the first camera coordinate per object
        #[arg(long)]
        preview: bool,

        /// Seed for camera, light and material sampling
        #[arg(long)]
        seed: Option<u64>,

        /// Continue with the next object when one fails
        #[arg(long)]
        skip_failed: bool,
    },
    /// Write a starter config
    Template {
        /// Where to write the config
        #[arg(long, short)]
        output: PathBuf,
    },
    /// Check a config and print what it would generate
    Validate {
        /// Path to the JSON config
        #[arg(long, short)]
        config: PathBuf,
    },
}

fn main() {
    if let Err(e) = init_logging(&LogConfig::default()) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate {
            config,
            preview,
            seed,
            skip_failed,
        } => {
            let failure_policy = if skip_failed {
                FailurePolicy::SkipObject
            } else {
                FailurePolicy::Abort
            };
            generate(
                &config,
                GenerationOptions {
                    preview,
                    failure_policy,
                    seed,
                },
            )
        }
        Commands::Template { output } => template(&output),
        Commands::Validate { config } => validate(&config),
    };

    if let Err(e) = result {
        log::error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn load_config(path: &Path) -> Result<Config> {
    config::load(path).with_context(|| format!("Failed to load config {}", path.display()))
}

fn generate(path: &Path, options: GenerationOptions) -> Result<()> {
    let config = load_config(path)?;
    let worker = GenerationWorker::spawn(config, OfflineScene::new(), options)
        .context("Failed to start generation worker")?;

    let mut progress = GenerationProgress::new();
    for event in worker.events().iter() {
        match event {
            WorkerEvent::Started { objects } => log::info!("Generating {} object(s)", objects),
            WorkerEvent::Progress(event) => {
                progress.apply(&event);
                log::debug!("{}", progress.display());
            }
            WorkerEvent::Completed(_) => log::info!("Generation complete"),
            WorkerEvent::Failed(error) => log::error!("Generation failed: {}", error),
            WorkerEvent::Cancelled => log::warn!("Generation cancelled"),
        }
    }

    let report = worker.join().context("Dataset generation failed")?;
    for skipped in &report.skipped {
        log::warn!("Skipped {}: {}", skipped.name, skipped.error);
    }
    println!(
        "{} image(s) for {} object(s) written to {}",
        report.total_images(),
        report.objects.len(),
        report.output_dir.display()
    );
    Ok(())
}

fn template(output: &Path) -> Result<()> {
    config::serialize(&Config::example(), Some(output))
        .with_context(|| format!("Failed to write template {}", output.display()))?;
    println!("Template written to {}", output.display());
    Ok(())
}

fn validate(path: &Path) -> Result<()> {
    let config = load_config(path)?;
    println!("Config is valid");
    println!("  objects:     {}", config.objects().len());
    println!("  lights:      {}", config.lights().len());
    println!("  viewpoints:  {}", config.viewpoints().len());
    println!("  coordinates: {} per object", config.coordinates_per_object(false));
    println!(
        "  images:      {} per object ({} style(s))",
        config.images_per_object(false),
        config.render().styles.len()
    );
    println!("  output:      {}", config.output_dir().display());

    let styles: Vec<&str> = config.render().styles.iter().map(|s| s.display_name()).collect();
    println!("  styles:      {}", styles.join(", "));
    for object in config.objects() {
        println!(
            "  - {} ({}, texture {})",
            object.name,
            object.path.display(),
            object.material.texture().display_name()
        );
    }
    Ok(())
}
