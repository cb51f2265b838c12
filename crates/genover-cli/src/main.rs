use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;
use std::str::FromStr;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use genover::scraper::DEFAULT_TIMEOUT;
use genover::{RuleSet, Source, WebScraper, normalize_species};
use log::LevelFilter;

#[derive(Parser)]
#[command(name = "genover")]
#[command(
    about = "Look up the latest genome assembly version of a species on Ensembl, NCBI and UCSC",
    long_about = None
)]
struct Cli {
    #[arg(help = "Species name, e.g. \"Saccharomyces cerevisiae\". Prompted for when omitted")]
    species: Option<String>,

    #[arg(
        short = 's',
        long = "source",
        value_parser = parse_source,
        help = "Only check this source (repeatable): ensembl, ncbi or ucsc"
    )]
    sources: Vec<Source>,

    #[arg(
        short = 'o',
        long = "output",
        value_enum,
        default_value = "text",
        help = "Output format"
    )]
    format: OutputFormat,

    #[arg(long, value_name = "FILE", help = "JSON file overriding the extraction rules")]
    rules: Option<PathBuf>,

    #[arg(
        long,
        value_name = "SECS",
        default_value_t = DEFAULT_TIMEOUT.as_secs(),
        value_parser = clap::value_parser!(u64).range(1..),
        help = "HTTP timeout per request"
    )]
    timeout: u64,

    #[arg(
        short = 'l',
        long = "log-level",
        value_enum,
        default_value = "warn",
        help = "Set the logging level"
    )]
    log_level: LogLevel,
}

#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn parse_source(s: &str) -> Result<Source, String> {
    Source::from_str(s).map_err(|e| e.to_string())
}

fn prompt_species() -> io::Result<String> {
    print!("Enter the species name (e.g., Saccharomyces cerevisiae): ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level.clone().into())
        .init();

    let rules = match &cli.rules {
        Some(path) => RuleSet::from_file(path),
        None => RuleSet::default().validate(),
    }
    .unwrap_or_else(|e| {
        log::error!("Invalid extraction rules: {}", e);
        process::exit(1);
    });

    let scraper = WebScraper::with_rules(rules, Duration::from_secs(cli.timeout))
        .unwrap_or_else(|e| {
            log::error!("Error creating scraper: {}", e);
            process::exit(1);
        });

    let prompted = cli.species.is_none();
    let input = match cli.species {
        Some(species) => species,
        None => prompt_species().unwrap_or_else(|e| {
            log::error!("Failed to read species name: {}", e);
            process::exit(1);
        }),
    };
    let species = normalize_species(&input).unwrap_or_else(|e| {
        log::error!("{}", e);
        process::exit(1);
    });

    let sources = if cli.sources.is_empty() {
        Source::ALL.to_vec()
    } else {
        cli.sources
    };

    let report = scraper.check_sources(&species, &sources).await;
    if report.failures() > 0 {
        log::info!(
            "{} of {} source(s) could not be checked",
            report.failures(),
            report.results.len()
        );
    }

    match cli.format {
        OutputFormat::Json => match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                log::error!("Error serializing to JSON: {}", e);
                process::exit(1);
            }
        },
        OutputFormat::Text => {
            if prompted {
                println!();
            }
            print!("{}", report);
        }
    }
}
