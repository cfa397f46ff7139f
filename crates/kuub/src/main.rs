mod render;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use kuub_core::{write_exports, ExportOutcome, ReportConfig, ReportPipeline};
use kuub_parser::formats::parse_date_text;
use kuub_parser::{load_orders_from_path, LoadOptions, LoadedOrders};
use tracing::info;
use tracing_subscriber::EnvFilter;

const CONFIG_ENV: &str = "KUUB_CONFIG";

#[derive(Parser, Debug)]
#[command(author, version, about = "Extra-volume reporting for container pickup orders", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print summary metrics, aggregates and flagged orders
    Report(ReportArgs),
    /// Write the flagged-order workbook and the per-location overview
    Export(ExportArgs),
    /// Show the detected header row and column layout of an order file
    Inspect(InputArgs),
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Order file (xlsx, xlsm, xlsb, xls, ods, csv or txt)
    file: PathBuf,
    /// Use this zero-based row as the header instead of detecting it
    #[arg(long)]
    header_row: Option<usize>,
    /// Field delimiter for CSV input (detected when omitted)
    #[arg(long, value_parser = parse_delimiter)]
    delimiter: Option<u8>,
}

#[derive(Args, Debug)]
struct FilterArgs {
    /// Flag orders with more extra bins than this
    #[arg(long)]
    min_extra_bins: Option<f64>,
    /// Flag orders with more extra volume (m3) than this
    #[arg(long)]
    min_extra_m3: Option<f64>,
    /// First pickup date to include (dd-mm-yyyy or yyyy-mm-dd)
    #[arg(long, value_parser = parse_cli_date)]
    from: Option<NaiveDate>,
    /// Last pickup date to include (dd-mm-yyyy or yyyy-mm-dd)
    #[arg(long, value_parser = parse_cli_date)]
    to: Option<NaiveDate>,
    /// Drop orders without a readable pickup date
    #[arg(long)]
    exclude_undated: bool,
    /// TOML config file (falls back to $KUUB_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ReportArgs {
    #[command(flatten)]
    input: InputArgs,
    #[command(flatten)]
    filters: FilterArgs,
    /// Print the report as JSON instead of tables
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[command(flatten)]
    input: InputArgs,
    #[command(flatten)]
    filters: FilterArgs,
    /// Directory the export files are written to
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Report(args) => {
            let config = resolve_config(&args.filters)?;
            let pipeline = ReportPipeline::new(load(&args.input)?)?;
            let report = pipeline
                .run(&config)
                .context("failed to build report")?;

            if args.json {
                println!("{}", report.to_json()?);
            } else {
                print!("{}", render::report(&report, &config)?);
            }
            Ok(())
        }
        Command::Export(args) => {
            let config = resolve_config(&args.filters)?;
            let pipeline = ReportPipeline::new(load(&args.input)?)?;
            let report = pipeline
                .run(&config)
                .context("failed to build report")?;

            match write_exports(&report, &args.out_dir)? {
                ExportOutcome::NothingToExport => {
                    println!("Geen geflagde orders om te exporteren.");
                }
                ExportOutcome::Written {
                    flagged_path,
                    locations_path,
                } => {
                    println!("{}", flagged_path.display());
                    println!("{}", locations_path.display());
                }
            }
            Ok(())
        }
        Command::Inspect(args) => {
            let loaded = load(&args)?;
            print!("{}", render::inspect(&loaded));
            Ok(())
        }
    }
}

fn load(input: &InputArgs) -> Result<LoadedOrders> {
    let options = LoadOptions {
        delimiter: input.delimiter,
        header_row: input.header_row,
    };
    let loaded = load_orders_from_path(&input.file, &options)
        .with_context(|| format!("failed to load {}", input.file.display()))?;
    info!(
        header_row = loaded.header_row,
        rows = loaded.row_count(),
        "Order file loaded"
    );
    Ok(loaded)
}

fn resolve_config(filters: &FilterArgs) -> Result<ReportConfig> {
    resolve_config_with(filters, std::env::var_os(CONFIG_ENV).map(PathBuf::from))
}

/// File values first, then command-line overrides. `--config` wins over `env_path`.
fn resolve_config_with(filters: &FilterArgs, env_path: Option<PathBuf>) -> Result<ReportConfig> {
    let path = filters.config.clone().or(env_path);

    let mut config = match path {
        Some(path) => ReportConfig::from_path(&path)
            .with_context(|| format!("failed to read config {}", path.display()))?,
        None => ReportConfig::default(),
    };

    if let Some(min_extra_bins) = filters.min_extra_bins {
        config.thresholds.min_extra_bins = min_extra_bins;
    }
    if let Some(min_extra_m3) = filters.min_extra_m3 {
        config.thresholds.min_extra_m3 = min_extra_m3;
    }
    if filters.from.is_some() {
        config.date_range.start = filters.from;
    }
    if filters.to.is_some() {
        config.date_range.end = filters.to;
    }
    if filters.exclude_undated {
        config.include_undated = false;
    }

    config.validate().context("invalid report configuration")?;
    Ok(config)
}

fn parse_cli_date(raw: &str) -> std::result::Result<NaiveDate, String> {
    parse_date_text(raw).ok_or_else(|| format!("unrecognized date '{raw}'"))
}

fn parse_delimiter(raw: &str) -> std::result::Result<u8, String> {
    match raw {
        "tab" | "\\t" => Ok(b'\t'),
        _ => match raw.as_bytes() {
            [byte] if byte.is_ascii() => Ok(*byte),
            _ => Err(format!("delimiter must be a single ASCII character, got '{raw}'")),
        },
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use tempfile::TempDir;

    const FILE_CONFIG: &str = r#"
        include_undated = true

        [thresholds]
        min_extra_bins = 4.0
        min_extra_m3 = 2.5

        [date_range]
        start = "2025-01-01"
        end = "2025-01-31"
    "#;

    fn write_config(dir: &TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, body).unwrap();
        path
    }

    fn filters(config: Option<PathBuf>) -> FilterArgs {
        FilterArgs {
            min_extra_bins: None,
            min_extra_m3: None,
            from: None,
            to: None,
            exclude_undated: false,
            config,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn file_values_apply_without_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "kuub.toml", FILE_CONFIG);

        let config = resolve_config_with(&filters(Some(path)), None).unwrap();

        assert_eq!(config.thresholds.min_extra_bins, 4.0);
        assert_eq!(config.thresholds.min_extra_m3, 2.5);
        assert_eq!(config.date_range.start, Some(date(2025, 1, 1)));
        assert!(config.include_undated);
    }

    #[test]
    fn flags_override_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "kuub.toml", FILE_CONFIG);
        let args = FilterArgs {
            min_extra_bins: Some(1.5),
            from: Some(date(2025, 1, 10)),
            exclude_undated: true,
            ..filters(Some(path))
        };

        let config = resolve_config_with(&args, None).unwrap();

        assert_eq!(config.thresholds.min_extra_bins, 1.5);
        assert_eq!(config.thresholds.min_extra_m3, 2.5);
        assert_eq!(config.date_range.start, Some(date(2025, 1, 10)));
        assert_eq!(config.date_range.end, Some(date(2025, 1, 31)));
        assert!(!config.include_undated);
    }

    #[test]
    fn env_path_is_used_when_no_config_flag_is_given() {
        let dir = tempfile::tempdir().unwrap();
        let env_path = write_config(&dir, "env.toml", FILE_CONFIG);

        let config = resolve_config_with(&filters(None), Some(env_path.clone())).unwrap();
        assert_eq!(config.thresholds.min_extra_bins, 4.0);

        let flag_path = write_config(&dir, "flag.toml", "[thresholds]\nmin_extra_bins = 6.0\n");
        let config = resolve_config_with(&filters(Some(flag_path)), Some(env_path)).unwrap();
        assert_eq!(config.thresholds.min_extra_bins, 6.0);
    }

    #[test]
    fn no_config_anywhere_yields_defaults() {
        let config = resolve_config_with(&filters(None), None).unwrap();
        assert_eq!(config, ReportConfig::default());
    }

    #[test]
    fn overrides_are_validated() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "kuub.toml", FILE_CONFIG);
        let args = FilterArgs {
            to: Some(date(2024, 12, 1)),
            ..filters(Some(path))
        };

        assert!(resolve_config_with(&args, None).is_err());
    }

    #[test]
    fn delimiter_accepts_tab_and_single_characters() {
        assert_eq!(parse_delimiter("tab"), Ok(b'\t'));
        assert_eq!(parse_delimiter("\\t"), Ok(b'\t'));
        assert_eq!(parse_delimiter(";"), Ok(b';'));
        assert!(parse_delimiter(";;").is_err());
        assert!(parse_delimiter("").is_err());
        assert!(parse_delimiter("€").is_err());
    }

    #[test]
    fn cli_dates_accept_day_first_and_iso() {
        assert_eq!(parse_cli_date("06-01-2025"), Ok(date(2025, 1, 6)));
        assert_eq!(parse_cli_date("2025-01-06"), Ok(date(2025, 1, 6)));
        assert!(parse_cli_date("gisteren").is_err());
    }

    #[test]
    fn report_arguments_parse_from_command_line() {
        let cli = Cli::try_parse_from([
            "kuub",
            "report",
            "orders.csv",
            "--delimiter",
            "tab",
            "--min-extra-bins",
            "3",
            "--from",
            "01-01-2025",
            "--exclude-undated",
            "--json",
        ])
        .unwrap();

        let Command::Report(args) = cli.command else {
            panic!("expected the report subcommand");
        };
        assert_eq!(args.input.delimiter, Some(b'\t'));
        assert_eq!(args.filters.min_extra_bins, Some(3.0));
        assert_eq!(args.filters.from, Some(date(2025, 1, 1)));
        assert!(args.filters.exclude_undated);
        assert!(args.json);
    }

    #[test]
    fn multi_character_delimiter_is_rejected_by_the_parser() {
        let result = Cli::try_parse_from(["kuub", "inspect", "orders.csv", "--delimiter", ";;"]);
        assert!(result.is_err());
    }
}
