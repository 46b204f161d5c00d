use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use twbrs::{ParserConfig, TableauMetadata, WorkbookParser};

mod formatter;

#[derive(Parser)]
#[command(name = "twbdump")]
#[command(about = "Extract structural metadata from Tableau workbooks (.twb/.twbx)", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the .twb or .twbx file
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Path to configuration file (TOML)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "human")]
    format: OutputFormat,

    /// Write JSON output to a file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, ValueEnum)]
enum OutputFormat {
    /// Human-readable colored summary
    Human,
    /// JSON-LD style document
    Json,
}

fn load_config(cli: &Cli) -> Result<ParserConfig> {
    if let Some(config_path) = &cli.config {
        return ParserConfig::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()));
    }

    // Try to load default config from current directory if it exists
    let default_config_path = PathBuf::from("twbdump.toml");
    if default_config_path.exists() {
        log::debug!("Using {}", default_config_path.display());
        ParserConfig::from_file(&default_config_path).with_context(|| {
            format!(
                "Failed to load config from {}",
                default_config_path.display()
            )
        })
    } else {
        Ok(ParserConfig::default())
    }
}

fn check_args(cli: &Cli) -> Result<()> {
    if cli.format == OutputFormat::Human && cli.output.is_some() {
        bail!("--output is only supported with --format json");
    }
    Ok(())
}

fn write_json(path: &Path, metadata: &TableauMetadata) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, metadata)?;
    writer.flush()?;
    Ok(())
}

fn run(cli: &Cli) -> Result<()> {
    check_args(cli)?;
    let config = load_config(cli)?;
    config.validate().context("Invalid configuration")?;

    let parser = WorkbookParser::with_config(config);
    let metadata = parser
        .parse_file(&cli.file)
        .with_context(|| format!("Failed to parse workbook: {}", cli.file.display()))?;

    match (&cli.format, &cli.output) {
        (OutputFormat::Human, _) => formatter::print_human(&cli.file, &metadata),
        (OutputFormat::Json, None) => formatter::print_json(&metadata)?,
        (OutputFormat::Json, Some(path)) => {
            write_json(path, &metadata)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Metadata written to {}", path.display());
        }
    }

    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(err) = run(&cli) {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
