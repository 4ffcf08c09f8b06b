mod config;
mod labels;
mod test_runner;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use log::LevelFilter;

use extract::{Document, ExtractionError};

const SUBCOMMANDS: &[&str] = &["extract", "test", "labels", "help"];

#[derive(Parser)]
#[command(
    name = "spread-task",
    version,
    about = "Generate Spread task files from Markdown and reStructuredText tutorials",
    after_help = "\
Special markers:
  SPREAD blocks (always included):
    Markdown: <!-- SPREAD
              command content
              -->
    RST:      .. SPREAD
              .. command content
              .. SPREAD END

  SPREAD SKIP markers (exclude all commands in range):
    Markdown: <!-- SPREAD SKIP --> ... <!-- SPREAD SKIP END -->
    RST:      .. SPREAD SKIP ... .. SPREAD SKIP END"
)]
struct Cli {
    /// Disable colored error output
    #[arg(long, global = true)]
    no_color: bool,

    /// Enable verbose output (DEBUG level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract commands from a document into a task file
    Extract(ExtractArgs),

    /// Run .test.md / .test.rst fixture files
    Test(TestArgs),

    /// Convert GitHub runner labels to runner charm series names
    Labels(LabelsArgs),
}

#[derive(clap::Args)]
struct ExtractArgs {
    /// Markdown or reStructuredText file to extract commands from
    input: PathBuf,

    /// Output YAML file or directory
    #[arg(default_value = taskfile::DEFAULT_FILE_NAME)]
    output: PathBuf,

    /// Also skip "What you'll need", "Requirements" and "Prerequisites" sections
    #[arg(long)]
    skip_sections: bool,

    /// Configuration file (defaults to ./spread-task.toml when present)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(clap::Args)]
struct TestArgs {
    /// Path to a fixture file or a directory containing them
    path: PathBuf,

    /// Run only fixtures in these categories (subfolder names). Repeatable.
    #[arg(short, long)]
    category: Vec<String>,

    /// List available categories and exit
    #[arg(long)]
    list_categories: bool,
}

#[derive(clap::Args)]
struct LabelsArgs {
    /// Labels in GitHub style; each argument may be a comma-separated list
    #[arg(required = true)]
    labels: Vec<String>,
}

fn main() {
    let args = with_default_subcommand(std::env::args().collect());
    let cli = Cli::parse_from(&args);
    init_logging(cli.verbose, cli.quiet);

    let exit_code = match cli.command {
        Command::Extract(extract_args) => do_extract(extract_args, cli.no_color),
        Command::Test(test_args) => {
            if test_args.list_categories {
                test_runner::list_categories(&test_args.path);
                0
            } else {
                test_runner::run_tests(&test_args.path, cli.no_color, &test_args.category)
            }
        }
        Command::Labels(labels_args) => {
            println!("{}", labels::convert_labels(&labels_args.labels).join(","));
            0
        }
    };
    process::exit(exit_code);
}

/// `spread-task doc.md [out]` is shorthand for `spread-task extract doc.md [out]`.
fn with_default_subcommand(mut args: Vec<String>) -> Vec<String> {
    let needs_subcommand = args
        .iter()
        .skip(1)
        .find(|a| !a.starts_with('-'))
        .is_some_and(|first_pos| !SUBCOMMANDS.contains(&first_pos.as_str()));
    if needs_subcommand {
        args.insert(1, "extract".to_string());
    }
    args
}

/// `-q` wins over `-v`. `RUST_LOG` refines whatever the flags select.
fn init_logging(verbose: bool, quiet: bool) {
    let level = if quiet {
        LevelFilter::Warn
    } else if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| writeln!(buf, "{}: {}", record.level(), record.args()))
        .init();
}

fn do_extract(args: ExtractArgs, no_color: bool) -> i32 {
    let options = match config::load(args.config.as_deref()) {
        Ok(config) => config.extract_options(args.skip_sections),
        Err(e) => {
            log::error!("{}", e);
            return 1;
        }
    };

    let document = match Document::read(&args.input) {
        Ok(d) => d,
        Err(e) => {
            log::error!("{}", e);
            return 1;
        }
    };

    // Set up codespan file database
    let mut files = SimpleFiles::new();
    let file_id = files.add(args.input.display().to_string(), document.text.clone());

    let parser = extract::Parser::new(document, file_id).with_options(options);
    let list = match parser.parse() {
        Ok(list) => list,
        Err(error) => {
            emit_error(&files, file_id, &error, no_color);
            return 1;
        }
    };

    log::info!(
        "Found {} command block(s) in {}",
        list.len(),
        args.input.display()
    );
    for (i, command) in list.commands.iter().enumerate() {
        log::debug!("Command block {}: {}", i + 1, command.text);
    }

    match taskfile::write_task_file(&args.output, &list.commands) {
        Ok(written) => {
            log::info!("Commands written to {}", written.display());
            0
        }
        Err(e) => {
            log::error!("cannot write '{}': {}", display_output(&args.output), e);
            1
        }
    }
}

fn display_output(path: &Path) -> String {
    taskfile::resolve_output_path(path).display().to_string()
}

/// Marker errors are shown against the source; everything else is a plain log line.
fn emit_error(
    files: &SimpleFiles<String, String>,
    file_id: usize,
    error: &ExtractionError,
    no_color: bool,
) {
    if !error.is_marker_error() {
        log::error!("{}", error);
        return;
    }

    let color_choice = if no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };
    let writer = StandardStream::stderr(color_choice);
    let config = term::Config::default();
    let diagnostic = error.to_diagnostic(file_id);
    let _ = term::emit_to_write_style(&mut writer.lock(), &config, files, &diagnostic);
}
