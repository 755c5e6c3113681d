//! pdfrank CLI - rank PDF sections for a persona and task

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfrank::{
    write_report, AnalyzeEvent, AnalyzeOptions, Analyzer, Embedder, ErrorMode, HashEmbedder,
    JsonFormat, Level, LopdfSource, Request,
};

#[derive(Parser)]
#[command(name = "pdfrank")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Rank PDF sections by relevance to a persona and task", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank the sections of every requested PDF and write the report
    Run {
        /// Request JSON (persona, job_to_be_done, documents)
        #[arg(short, long, value_name = "FILE", default_value = "input/challenge1b_input.json")]
        input: PathBuf,

        /// Directory holding the requested PDFs
        #[arg(long, value_name = "DIR", default_value = "input/PDF")]
        pdf_dir: PathBuf,

        /// Report destination
        #[arg(short, long, value_name = "FILE", default_value = "output/challenge1b_output.json")]
        output: PathBuf,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Embed sections one at a time
        #[arg(long)]
        sequential: bool,

        /// Fail on pages whose content cannot be decoded
        #[arg(long)]
        strict: bool,

        /// Embedding provider
        #[arg(long, value_enum, default_value = "hash")]
        embedder: EmbedderKind,

        /// Vector length (hash embedder, or requested from the remote model)
        #[arg(long)]
        dimensions: Option<usize>,

        #[command(flatten)]
        remote: RemoteArgs,
    },

    /// Show the leveled sections of one PDF
    Sections {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Fail on pages whose content cannot be decoded
        #[arg(long)]
        strict: bool,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum EmbedderKind {
    /// Offline feature-hashing embedder
    Hash,
    /// OpenAI-compatible HTTP endpoint (requires the `remote` feature)
    Openai,
}

#[derive(clap::Args)]
struct RemoteArgs {
    /// API key for the embedding endpoint
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Base URL of the embedding endpoint
    #[arg(long, env = "OPENAI_BASE_URL", default_value = "https://api.openai.com/v1")]
    base_url: String,

    /// Embedding model name
    #[arg(long, env = "PDFRANK_EMBEDDING_MODEL", default_value = "text-embedding-3-small")]
    model: String,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Run {
            input,
            pdf_dir,
            output,
            compact,
            sequential,
            strict,
            embedder,
            dimensions,
            remote,
        }) => build_embedder(embedder, dimensions, &remote).and_then(|embedder| {
            let options = AnalyzeOptions::new()
                .with_document_dir(pdf_dir)
                .with_error_mode(error_mode(strict))
                .with_parallel(!sequential)
                .with_json_format(if compact {
                    JsonFormat::Compact
                } else {
                    JsonFormat::Pretty
                });
            cmd_run(&input, &output, Analyzer::new(embedder, options))
        }),
        Some(Commands::Sections { input, strict }) => cmd_sections(&input, strict),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            println!("{}", "Usage: pdfrank run [--input FILE] [--pdf-dir DIR] [--output FILE]".yellow());
            println!("       pdfrank --help for more information");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn error_mode(strict: bool) -> ErrorMode {
    if strict {
        ErrorMode::Strict
    } else {
        ErrorMode::Lenient
    }
}

fn build_embedder(
    kind: EmbedderKind,
    dimensions: Option<usize>,
    remote: &RemoteArgs,
) -> CliResult<Box<dyn Embedder>> {
    match kind {
        EmbedderKind::Hash => Ok(Box::new(
            dimensions.map_or_else(HashEmbedder::default, HashEmbedder::new),
        )),
        EmbedderKind::Openai => build_remote(dimensions, remote),
    }
}

#[cfg(feature = "remote")]
fn build_remote(dimensions: Option<usize>, remote: &RemoteArgs) -> CliResult<Box<dyn Embedder>> {
    let api_key = remote
        .api_key
        .clone()
        .ok_or("--api-key or OPENAI_API_KEY is required for the openai embedder")?;
    let mut config =
        pdfrank::OpenAiConfig::new(api_key, remote.model.as_str()).with_base_url(remote.base_url.as_str());
    if let Some(dimensions) = dimensions {
        config = config.with_dimensions(dimensions);
    }
    Ok(Box::new(pdfrank::OpenAiEmbedder::new(config)?))
}

#[cfg(not(feature = "remote"))]
fn build_remote(_dimensions: Option<usize>, remote: &RemoteArgs) -> CliResult<Box<dyn Embedder>> {
    log::debug!("Requested remote model {} at {}", remote.model, remote.base_url);
    Err("this build does not include the openai embedder (rebuild with --features remote)".into())
}

fn cmd_run(input: &Path, output: &Path, analyzer: Analyzer<Box<dyn Embedder>>) -> CliResult<()> {
    let request = Request::from_path(input)?;

    let pb = ProgressBar::new(request.documents.len() as u64 + 1);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let record = analyzer.analyze_with_events(
        &request,
        |document| analyzer.open_document(document),
        |event| match event {
            AnalyzeEvent::DocumentStart { document, .. } => {
                pb.set_message(document.filename.clone());
            }
            AnalyzeEvent::DocumentEnd { .. } => pb.inc(1),
            AnalyzeEvent::Ranking { sections } => pb.set_message(format!(
                "Ranking {} sections with {}...",
                sections,
                analyzer.embedder().name()
            )),
        },
    )?;
    write_report(output, &record, analyzer.options().json_format)?;
    pb.inc(1);
    pb.finish_with_message("Done!");

    println!(
        "\n{} {} sections from {} documents",
        "Ranked".green().bold(),
        record.extracted_sections.len(),
        request.documents.len()
    );
    for (i, section) in record.extracted_sections.iter().take(5).enumerate() {
        let branch = if i + 1 == record.extracted_sections.len().min(5) {
            "└─"
        } else {
            "├─"
        };
        println!(
            "  {} {:>3}. {} {}",
            branch.dimmed(),
            section.importance_rank,
            section.section_title,
            format!("({})", section.document).dimmed()
        );
    }
    println!("{} {}", "Saved to".green(), output.display());

    Ok(())
}

fn cmd_sections(input: &Path, strict: bool) -> CliResult<()> {
    let source = LopdfSource::open(input)?;
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extraction = pdfrank::extract_sections(&source, &name, error_mode(strict))?;

    println!("{}", "Document Sections".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!("{}: PDF {}", "Format".bold(), source.version());
    println!("{}: {}", "Method".bold(), extraction.method);
    println!("{}: {}", "Sections".bold(), extraction.sections.len());
    println!();

    for section in &extraction.sections {
        let page = section
            .page
            .map_or_else(|| "p.?".to_string(), |p| format!("p.{}", p));
        let level = match section.level {
            Level::H1 => section.level.as_str().cyan().bold(),
            Level::H2 => section.level.as_str().cyan(),
            Level::H3 => section.level.as_str().blue(),
            Level::P => section.level.as_str().dimmed(),
        };
        let indent = match section.level {
            Level::H1 | Level::P => "",
            Level::H2 => "  ",
            Level::H3 => "    ",
        };
        println!("{} {:>5} {}{}", level, page.dimmed(), indent, section.text);
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pdfrank".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Persona-driven PDF section ranking");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/pdfrank".dimmed());
    println!("License: MIT");
}
