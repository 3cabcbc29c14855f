use std::{io, path::PathBuf};

use clap::Parser;
use color_eyre as ey;
use ey::eyre::Context;
use meld_content::{
    config::PipelineConfig,
    glb::{verify_glb, DEFAULT_MIN_SIZE},
    gltf_backend::{GltfExporter, GltfImporter},
    pipeline::Pipeline,
};
use meld_shared::log::{self, info};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
enum CommandLineArguments {
    /// Combines all asset files of a project into one GLB
    Aggregate(Aggregate),
    /// Checks the header of a GLB file
    Verify(Verify),
}

#[derive(Parser, Debug)]
struct Aggregate {
    /// Directory relative to which sources and output are resolved
    #[arg(short, long, default_value = ".")]
    project_root: PathBuf,

    /// YAML configuration file. Replaces the project root when given
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output file, relative to the project root
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Adds placeholder devices below the root
    #[arg(long)]
    placeholders: bool,
}

#[derive(Parser, Debug)]
struct Verify {
    /// GLB file to check
    #[arg(short, long)]
    path: PathBuf,

    /// Minimum expected file size in bytes
    #[arg(short, long, default_value_t = DEFAULT_MIN_SIZE)]
    min_size: u64,
}

fn main() -> ey::Result<()> {
    color_eyre::install()?;

    // Setup logging
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                meld_shared::chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(log::LevelFilter::Info)
        .chain(io::stdout())
        .apply()
        .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;

    let command_line_arguments = CommandLineArguments::parse();
    match command_line_arguments {
        CommandLineArguments::Aggregate(aggregate) => {
            let mut config = match &aggregate.config {
                Some(path) => PipelineConfig::load(path).wrap_err("Failed to load the configuration")?,
                None => PipelineConfig::new(&aggregate.project_root),
            };
            if let Some(output) = aggregate.output {
                config.output = output;
            }
            config.placeholders |= aggregate.placeholders;
            let config = config.with_env_overrides();

            let mut pipeline = Pipeline::new(config, GltfImporter, GltfExporter);
            let report = pipeline.run().wrap_err("Failed to aggregate the assets")?;
            info!(
                "Wrote {} with {} node(s) from {} file(s) in {}",
                report.output.display(),
                report.node_count,
                report.file_count,
                report.source_directory.display()
            );
        }
        CommandLineArguments::Verify(verify) => {
            let summary = verify_glb(&verify.path, verify.min_size)
                .wrap_err_with(|| format!("Failed to verify {}", verify.path.display()))?;
            info!("OK: {} ({} bytes)", verify.path.display(), summary.size);
        }
    }
    Ok(())
}
