//! todocx CLI - convert Markdown and PDF documents to Word.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;

use todocx::{convert_archive, MarkdownConverter, PdfConverter};

#[derive(Parser)]
#[command(name = "todocx")]
#[command(version)]
#[command(about = "Convert Markdown and PDF documents to Word (.docx)", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a Markdown file
    #[command(alias = "md")]
    Markdown {
        /// Input Markdown file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output .docx file (defaults to the input name)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Directory for resolving relative image references
        /// (defaults to the input file's directory)
        #[arg(long, value_name = "DIR")]
        images_dir: Option<PathBuf>,
    },

    /// Convert a PDF file
    Pdf {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output .docx file (defaults to the input name)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Skip image extraction
        #[arg(long)]
        no_images: bool,

        /// Simple mode: text and tables only
        #[arg(long)]
        simple: bool,
    },

    /// Convert every Markdown file in a zip archive
    Batch {
        /// Input zip archive
        #[arg(value_name = "ARCHIVE")]
        input: PathBuf,

        /// Output zip archive of converted documents
        #[arg(short, long, value_name = "ARCHIVE")]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> todocx::Result<()> {
    match cli.command {
        Commands::Markdown {
            input,
            output,
            images_dir,
        } => {
            let output = output.unwrap_or_else(|| input.with_extension("docx"));
            let mut converter = MarkdownConverter::new();
            if let Some(dir) = images_dir {
                converter = converter.with_images_dir(dir);
            }
            converter.convert_file(&input, &output)?;
            report_written(&output);
        }
        Commands::Pdf {
            input,
            output,
            no_images,
            simple,
        } => {
            let output = output.unwrap_or_else(|| input.with_extension("docx"));
            let converter = if simple {
                PdfConverter::simple()
            } else {
                PdfConverter::new().with_images(!no_images)
            };
            converter.convert_file(&input, &output)?;
            report_written(&output);
        }
        Commands::Batch { input, output } => {
            let output = output.unwrap_or_else(|| {
                let stem = input
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "converted".to_string());
                input.with_file_name(format!("{}_converted.zip", stem))
            });

            let report = convert_archive(&input, &output)?;
            println!(
                "{} converted {} file(s) into {}",
                "ok:".green().bold(),
                report.converted_count(),
                output.display()
            );
            for failure in &report.failed {
                eprintln!(
                    "{} {}: {}",
                    "warning:".yellow().bold(),
                    failure.file,
                    failure.reason
                );
            }
        }
    }
    Ok(())
}

fn report_written(output: &Path) {
    println!("{} wrote {}", "ok:".green().bold(), output.display());
}
