//! pdf-outline CLI - batch PDF title and outline extraction

mod config;

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdf_outline::batch::{list_pdf_files, process_directory_with};
use pdf_outline::model::count_bookmarks;
use pdf_outline::{
    extract_file_with_options, parse_backend_list, render, BatchReport, FileOutcome, FileStatus,
    PdfDocument,
};

use config::{FileConfig, Overrides, Settings};

#[derive(Parser)]
#[command(name = "pdf-outline")]
#[command(version)]
#[command(about = "Extract PDF titles and heading outlines to JSON", long_about = None)]
struct Cli {
    /// Directory of PDF files to process
    #[arg(value_name = "INPUT_DIR", env = "PDF_OUTLINE_INPUT")]
    input: Option<PathBuf>,

    /// Directory for the JSON results
    #[arg(value_name = "OUTPUT_DIR", env = "PDF_OUTLINE_OUTPUT")]
    output: Option<PathBuf>,

    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct GlobalArgs {
    /// Config file (default: ./pdf-outline.toml, then the user config directory)
    #[arg(long, global = true, value_name = "FILE", env = "PDF_OUTLINE_CONFIG")]
    config: Option<PathBuf>,

    /// Backends to try in order, comma-separated (structure, plain-text, layout)
    #[arg(
        long = "backend",
        global = true,
        value_name = "LIST",
        env = "PDF_OUTLINE_BACKENDS"
    )]
    backends: Option<String>,

    /// Maximum heuristic headings per document (0 = unlimited)
    #[arg(long, global = true, value_name = "N")]
    max_headings: Option<usize>,

    /// Report backend errors instead of writing a filename-derived result
    #[arg(long, global = true)]
    strict: bool,

    /// Process files in parallel
    #[arg(long, global = true)]
    parallel: bool,

    /// Write compact JSON
    #[arg(long, global = true)]
    compact: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Process every PDF in a directory (the default command)
    Batch {
        /// Directory of PDF files to process
        #[arg(value_name = "INPUT_DIR")]
        input: Option<PathBuf>,

        /// Directory for the JSON results
        #[arg(value_name = "OUTPUT_DIR")]
        output: Option<PathBuf>,
    },

    /// Extract the outline of a single PDF
    Extract {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Show document information
    Info {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Print the effective configuration as TOML
    Config,

    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let Cli {
        input,
        output,
        global,
        command,
    } = cli;

    if let Some(Commands::Version) = command {
        cmd_version();
        return Ok(());
    }

    let file = config::load(global.config.as_deref())?;
    let (input, output) = match &command {
        Some(Commands::Batch {
            input: batch_input,
            output: batch_output,
        }) => (batch_input.clone().or(input), batch_output.clone().or(output)),
        _ => (input, output),
    };
    let settings = resolve_settings(&global, file, input, output)?;

    match command {
        Some(Commands::Extract { input, output }) => {
            cmd_extract(&input, output.as_deref(), &settings)
        }
        Some(Commands::Info { input }) => cmd_info(&input, &settings),
        Some(Commands::Config) => cmd_config(&settings),
        Some(Commands::Batch { .. }) | Some(Commands::Version) | None => cmd_batch(&settings),
    }
}

fn resolve_settings(
    global: &GlobalArgs,
    file: FileConfig,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<Settings, Box<dyn Error>> {
    let backends = match global.backends.as_deref() {
        Some(list) => {
            let kinds = parse_backend_list(list)?;
            if kinds.is_empty() {
                return Err(format!("Invalid backend list '{}': no backends given", list).into());
            }
            Some(kinds)
        }
        None => None,
    };

    let overrides = Overrides {
        input,
        output,
        backends,
        max_headings: global.max_headings,
        strict: global.strict,
        parallel: global.parallel,
        compact: global.compact,
    };
    Ok(Settings::resolve(file, overrides))
}

fn cmd_batch(settings: &Settings) -> Result<(), Box<dyn Error>> {
    let files = list_pdf_files(&settings.input)?;

    println!(
        "{} {} {} {}",
        "Processing".cyan().bold(),
        settings.input.display(),
        "->".dimmed(),
        settings.output.display()
    );
    if files.is_empty() {
        println!("{}", "No PDF files found".yellow());
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let report = process_directory_with(
        &settings.input,
        &settings.output,
        &settings.batch_options(),
        |outcome| {
            pb.println(format_outcome(outcome));
            pb.inc(1);
        },
    )?;
    pb.finish_and_clear();

    print_summary(&report);
    Ok(())
}

fn format_outcome(outcome: &FileOutcome) -> String {
    let name = outcome
        .input
        .file_name()
        .unwrap_or_default()
        .to_string_lossy();

    match &outcome.status {
        FileStatus::Extracted { backend, entries } => format!(
            "{} {}: {} ({} outline items, {})",
            "✓".green(),
            name,
            outcome.title.bold(),
            entries,
            backend.to_string().dimmed()
        ),
        FileStatus::Fallback { reason } => format!(
            "{} {}: {} ({} {})",
            "!".yellow(),
            name,
            outcome.title.bold(),
            "fallback:".yellow(),
            reason
        ),
        FileStatus::Failed { error } => format!("{} {}: {}", "✗".red(), name, error.red()),
    }
}

fn print_summary(report: &BatchReport) {
    println!("\n{}", "Summary".green().bold());
    println!("  {} {} processed", "├─".dimmed(), report.len());
    println!("  {} {} extracted", "├─".dimmed(), report.extracted());
    println!("  {} {} fallback", "├─".dimmed(), report.fallbacks());
    println!("  {} {} failed", "└─".dimmed(), report.failures());
}

fn cmd_extract(
    input: &Path,
    output: Option<&Path>,
    settings: &Settings,
) -> Result<(), Box<dyn Error>> {
    let extraction = extract_file_with_options(input, &settings.extract_options())?;
    let json = render::to_json(&extraction.result, settings.json_format())?;

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_info(input: &Path, settings: &Settings) -> Result<(), Box<dyn Error>> {
    let doc = PdfDocument::open(input)?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: PDF {}", "Format".bold(), doc.header().version);
    println!("{}: {}", "Pages".bold(), doc.page_count());
    if let Some(title) = doc.metadata_title() {
        println!("{}: {}", "Title".bold(), title);
    }
    println!(
        "{}: {}",
        "Bookmarks".bold(),
        count_bookmarks(&doc.bookmarks())
    );

    println!();
    println!("{}", "Extraction".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let extraction = extract_file_with_options(input, &settings.extract_options())?;
    for failure in &extraction.failures {
        println!(
            "{}: {} {}",
            failure.backend.to_string().bold(),
            "failed".red(),
            failure.error
        );
    }
    println!("{}: {}", "Backend".bold(), extraction.source);
    println!("{}: {}", "Title".bold(), extraction.result.title);
    println!("{}: {}", "Outline items".bold(), extraction.result.len());

    Ok(())
}

fn cmd_config(settings: &Settings) -> Result<(), Box<dyn Error>> {
    print!("{}", settings.to_file_config().to_toml()?);
    Ok(())
}

fn cmd_version() {
    println!(
        "{} {}",
        "pdf-outline".cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("PDF title and outline extraction tool");
    println!("Library: pdf-outline {}", pdf_outline::version());
    println!("License: MIT");
}
