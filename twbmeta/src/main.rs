use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use twbmeta_core::{Extractor, ExtractorConfig, TranslatedFormula, translate, writer};

mod formatter;

#[derive(Parser)]
#[command(name = "twbmeta")]
#[command(about = "Metadata extractor for Tableau workbooks (.twb/.twbx)", long_about = None)]
#[command(version)]
struct Cli {
    /// Workbook files to extract
    #[arg(value_name = "FILE", required = true, num_args = 1..)]
    files: Vec<PathBuf>,

    /// Path to configuration file (TOML)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "human")]
    format: OutputFormat,

    /// Directory for the CSV tables (csv format only)
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Table printed to stdout when no output directory is given (csv format only)
    #[arg(short, long, value_enum, default_value = "worksheets")]
    table: Table,

    /// Translate calculated-field formulas with the configured service
    #[arg(long)]
    translate: bool,

    /// Log extraction details to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON output for downstream tooling
    Json,
    /// Delimited tables
    Csv,
}

#[derive(Clone, Copy, ValueEnum)]
enum Table {
    Worksheets,
    Fields,
    Summary,
    Translations,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    // Load configuration
    let mut config = if let Some(config_path) = &cli.config {
        ExtractorConfig::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else {
        // Try to load default config from current directory if it exists
        let default_config_path = PathBuf::from("twbmeta.toml");
        if default_config_path.exists() {
            ExtractorConfig::from_file(&default_config_path).with_context(|| {
                format!(
                    "Failed to load config from {}",
                    default_config_path.display()
                )
            })?
        } else {
            ExtractorConfig::default()
        }
    };
    if cli.translate {
        config.translation.enabled = true;
    }
    config.validate().context("Invalid configuration")?;

    let extractor = Extractor::with_config(config);
    let batch = extractor.extract_batch(&cli.files);
    log::info!(
        "extracted {} of {} workbook(s)",
        batch.summaries.len(),
        cli.files.len()
    );

    let translations: Option<Vec<TranslatedFormula>> = if extractor.config().translation.enabled {
        let translator = translate::translator_from_config(&extractor.config().translation)
            .context("Failed to set up formula translation")?;
        Some(extractor.translate(&batch.fields, translator.as_ref()))
    } else {
        None
    };

    match cli.format {
        OutputFormat::Human => {
            formatter::print_human(&batch, translations.as_deref());
        }
        OutputFormat::Json => {
            formatter::print_json(&batch, translations.as_deref())?;
        }
        OutputFormat::Csv => {
            let delimiter = extractor.config().delimiter();
            if let Some(dir) = &cli.output_dir {
                let written =
                    writer::write_tables_to_dir(dir, &batch, translations.as_deref(), delimiter)
                        .with_context(|| format!("Failed to export to {}", dir.display()))?;
                for path in written {
                    eprintln!("Wrote {}", path.display());
                }
            } else {
                let table = match cli.table {
                    Table::Worksheets => writer::table_to_string(delimiter, &batch.worksheets)?,
                    Table::Fields => writer::table_to_string(delimiter, &batch.fields)?,
                    Table::Summary => writer::table_to_string(delimiter, &batch.summaries)?,
                    Table::Translations => {
                        let translations = translations
                            .as_deref()
                            .context("The translations table needs --translate")?;
                        writer::table_to_string(delimiter, translations)?
                    }
                };
                print!("{}", table);
            }
            for failure in &batch.failures {
                eprintln!("error: {}", failure);
            }
        }
    }

    // Exit with appropriate code
    let exit_code = if batch.has_failures() { 1 } else { 0 };
    std::process::exit(exit_code);
}
