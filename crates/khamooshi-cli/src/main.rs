use std::fs;
use std::path::PathBuf;
use std::process;
use std::str::FromStr;

use chrono::Local;
use clap::{Args, Parser, Subcommand, ValueEnum};
use khamooshi::calendar::{gregorian_to_jalali, to_readable_jalali};
use khamooshi::types::{Place, ScrapedOutage};
use khamooshi::utils::parse_places;
use khamooshi::{ErrorBody, OutageChecker, OutageError, Settings};
use log::LevelFilter;

#[derive(Parser)]
#[command(name = "khamooshi")]
#[command(about = "Check the Qom scheduled power outage table for your places", long_about = None)]
struct Cli {
    #[arg(
        short = 'l',
        long = "log-level",
        value_enum,
        default_value = "info",
        global = true,
        help = "Set the logging level"
    )]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
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

#[derive(Debug, Args)]
struct SourceArgs {
    #[arg(long, help = "Outage table URL (defaults to KHAMOOSHI_URL or the qepd.co.ir page)")]
    url: Option<String>,

    #[arg(long, value_name = "SECS", help = "HTTP request timeout in seconds")]
    timeout: Option<u64>,
}

impl SourceArgs {
    fn settings(self) -> Settings {
        let mut settings = Settings::from_env();
        if let Some(url) = self.url {
            settings.url = url;
        }
        if let Some(timeout) = self.timeout {
            settings.request_timeout_secs = timeout;
        }
        settings
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Find the announced outage hours for one or more places
    Check {
        #[arg(
            short = 'p',
            long = "place",
            value_name = "ALIAS=PHRASE",
            value_parser = parse_place,
            help = "Place to look for; repeat for several places"
        )]
        places: Vec<Place>,

        #[arg(
            long,
            value_name = "PATH",
            help = "Read places from a file: alias line, phrase line, blank line between places"
        )]
        places_file: Option<PathBuf>,

        #[arg(
            short = 'o',
            long = "output",
            value_enum,
            default_value = "text",
            help = "Output format"
        )]
        format: OutputFormat,

        #[command(flatten)]
        source: SourceArgs,
    },
    /// Show the date the current outage table was published for
    Date {
        #[arg(
            short = 'o',
            long = "output",
            value_enum,
            default_value = "text",
            help = "Output format"
        )]
        format: OutputFormat,

        #[command(flatten)]
        source: SourceArgs,
    },
}

fn parse_place(s: &str) -> Result<Place, String> {
    Place::from_str(s).map_err(|e| e.to_string())
}

fn serialize_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            log::error!("Error serializing to JSON: {}", e);
            process::exit(1);
        }
    }
}

fn fail(err: &OutageError, format: &OutputFormat) -> ! {
    match format {
        OutputFormat::Json => serialize_json(&ErrorBody::from(err)),
        OutputFormat::Text => log::error!("{} (code {})", err, err.code()),
    }
    process::exit(1);
}

fn build_checker(source: SourceArgs) -> OutageChecker {
    OutageChecker::new(source.settings()).unwrap_or_else(|e| {
        log::error!("Error creating outage checker: {}", e);
        process::exit(1);
    })
}

fn print_outage(outage: &ScrapedOutage) {
    let today = Local::now().date_naive();
    println!("Outage table for {}", to_readable_jalali(outage.date, today));

    if outage.places.is_empty() {
        println!("No outages announced for the given places.");
        return;
    }

    for (i, place) in outage.places.iter().enumerate() {
        print!("{:>3}. {}", i + 1, place);
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level.clone().into())
        .init();

    match cli.command {
        Commands::Check {
            mut places,
            places_file,
            format,
            source,
        } => {
            if let Some(path) = places_file {
                let text = fs::read_to_string(&path).unwrap_or_else(|e| {
                    log::error!("Error reading places file {}: {}", path.display(), e);
                    process::exit(1);
                });
                let from_file = parse_places(&text);
                log::debug!("Read {} place(s) from {}", from_file.len(), path.display());
                places.extend(from_file);
            }

            let checker = build_checker(source);
            let outage = checker
                .check(&places)
                .await
                .unwrap_or_else(|e| fail(&e, &format));

            match format {
                OutputFormat::Json => serialize_json(&outage),
                OutputFormat::Text => print_outage(&outage),
            }
        }

        Commands::Date { format, source } => {
            let checker = build_checker(source);
            let date = checker
                .publication_date()
                .await
                .unwrap_or_else(|e| fail(&e, &format));

            match format {
                OutputFormat::Json => serialize_json(&date),
                OutputFormat::Text => {
                    let today = Local::now().date_naive();
                    match gregorian_to_jalali(date) {
                        Some(jalali) => println!(
                            "{} ({}, {})",
                            to_readable_jalali(date, today),
                            jalali,
                            date
                        ),
                        None => println!("{}", date),
                    }
                }
            }
        }
    }
}
