//! Minimal CLI: C# sources → (NUnit test stubs | structural model)
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;

use crate::parse::{CSharpParser, StructureParser};
use crate::pipeline::io::{FsArtifactWriter, FsSourceReader};
use crate::pipeline::{Pipeline, PipelineConfig};
use crate::synth::NUnitSynthesizer;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// generate NUnit/Moq test stubs for every class in a set of C# sources
#[derive(Parser, Debug)]
#[command(name = "cs-testgen", version)]
pub struct CommandLineInterface {
    /// more logging (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// generate one `<Class>Tests.cs` stub per class
    Generate(GenerateOut),
    /// parse and print the structural model as JSON
    Inspect(InspectOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct GenerateOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output directory for generated test files (created if missing)
    #[arg(short, long)]
    out: PathBuf,

    /// concurrent source reads
    #[arg(long, default_value_t = 1)]
    read_parallelism: usize,

    /// concurrent parse + synthesis jobs; never below the processor count
    #[arg(long)]
    synthesize_parallelism: Option<usize>,

    /// concurrent artifact writes
    #[arg(long, default_value_t = 1)]
    write_parallelism: usize,

    /// capacity of each queue between stages
    #[arg(long, default_value_t = 16)]
    queue_capacity: usize,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(clap::Parser, Debug)]
struct InspectOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn sources(&self) -> Result<Vec<String>> {
        let paths = resolve_file_path_patterns(&self.input)
            .context("failed to resolve input file paths")?;
        Ok(paths.into_iter().map(|p| p.to_string_lossy().to_string()).collect())
    }
}

impl GenerateOut {
    fn pipeline_config(&self) -> PipelineConfig {
        let defaults = PipelineConfig::default();
        PipelineConfig {
            read_parallelism: self.read_parallelism,
            synthesize_parallelism: self
                .synthesize_parallelism
                .unwrap_or(defaults.synthesize_parallelism),
            write_parallelism: self.write_parallelism,
            queue_capacity: self.queue_capacity,
        }
        .normalized()
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
    pub async fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Generate(target) => {
                let config = target.pipeline_config();

                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    eprintln!("{config:#?}");
                    return Ok(());
                }

                let sources = target.input_settings.sources()?;
                let pipeline = Pipeline::new(
                    config,
                    Arc::new(FsSourceReader),
                    Arc::new(FsArtifactWriter::new(&target.out)),
                    Arc::new(CSharpParser::new()),
                    Arc::new(NUnitSynthesizer::new()),
                );
                let report = pipeline.execute(sources).await.map_err(|error| {
                    let stage = error.stage();
                    anyhow::Error::new(error).context(format!("{stage} stage failed"))
                })?;

                println!(
                    "{} {} test file(s) from {} source(s) into {}",
                    "generated".green().bold(),
                    report.artifacts_written,
                    report.sources_read,
                    target.out.display(),
                );
            }
            Command::Inspect(target) => {
                let parser = CSharpParser::new();
                let mut models = serde_json::Map::new();
                for source_path in target.input_settings.sources()? {
                    let source = tokio::fs::read_to_string(&source_path)
                        .await
                        .with_context(|| format!("failed to read source file ({source_path})"))?;
                    let model = parser
                        .parse(&source)
                        .with_context(|| format!("failed to parse C# source file ({source_path})"))?;
                    models.insert(source_path, serde_json::to_value(&model)?);
                }
                let models_src = serde_json::to_string_pretty(&models)?;
                if let Some(out) = target.out.as_ref() {
                    if let Some(parent) = out.parent() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                    tokio::fs::write(out, &models_src)
                        .await
                        .with_context(|| format!("failed to write {}", out.display()))?;
                } else {
                    println!("{models_src}");
                }
            }
        }
        Ok(())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'['))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                // Pattern was explicitly a glob but matched nothing -> surface as an error
                anyhow::bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
