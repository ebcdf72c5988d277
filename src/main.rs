use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod aggregate;
mod anonymize;
mod chart;
mod convert;
mod models;
mod prompt;

use crate::aggregate::MAX_PRECISION;
use crate::chart::ChartStyle;
use crate::models::{AggregateOptions, Direction, SortKey, SortOrder, EXCLUDED_CLASS};

#[derive(Parser)]
#[command(name = "class-progress")]
#[command(about = "Average exercise progress by class from a student data export", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace identifying fields in a raw JSON export
    Anonymize {
        /// Directory to read and write from. Default: cwd
        #[arg(short = 'L', long, default_value = ".")]
        location: PathBuf,
        /// Raw JSON export to read
        #[arg(short = 'J', long = "json", default_value = "student_data.json")]
        json_file: String,
        /// Anonymized JSON file to write
        #[arg(short = 'O', long = "out", default_value = "cleaned_data.json")]
        out_file: String,
        /// Overwrite an existing output file without asking
        #[arg(short, long)]
        yes: bool,
    },
    /// Write a CSV file from the JSON student data
    WriteCsv {
        /// Directory to read and write from. Default: cwd
        #[arg(short = 'L', long, default_value = ".")]
        location: PathBuf,
        /// JSON file to read
        #[arg(short = 'J', long = "json", default_value = "cleaned_data.json")]
        json_file: String,
        /// CSV file to write
        #[arg(short = 'C', long = "csv", default_value = "cleaned_data.csv")]
        csv_file: String,
        /// Overwrite an existing output file without asking
        #[arg(short, long)]
        yes: bool,
    },
    /// Plot average bites completed by class
    Plot(PlotArgs),
    /// Plot average bites completed by class, split by difficulty
    Stacked(PlotArgs),
}

#[derive(Args)]
struct PlotArgs {
    /// Directory to read the CSV from. Default: cwd
    #[arg(short = 'L', long, default_value = ".")]
    location: PathBuf,
    /// CSV file to read
    #[arg(short = 'C', long = "csv", default_value = "cleaned_data.csv")]
    csv_file: String,
    /// Sort by average bites completed instead of class
    #[arg(short = 'S', long)]
    sort_by_average: bool,
    /// Decimal places kept in the averages
    #[arg(
        short,
        long,
        default_value_t = 1,
        value_parser = clap::value_parser!(u32).range(0..=MAX_PRECISION as i64)
    )]
    precision: u32,
    /// Class label left out of the averages
    #[arg(long, default_value = EXCLUDED_CLASS)]
    exclude: String,
    /// Chart width in terminal columns
    #[arg(short, long, default_value_t = 75)]
    width: usize,
}

impl PlotArgs {
    fn options(&self, style: ChartStyle) -> AggregateOptions {
        let sort = match (self.sort_by_average, style) {
            (true, ChartStyle::Horizontal) => SortOrder {
                key: SortKey::Total,
                direction: Direction::Ascending,
            },
            (true, ChartStyle::Stacked) => SortOrder {
                key: SortKey::Total,
                direction: Direction::Descending,
            },
            (false, _) => SortOrder {
                key: SortKey::Class,
                direction: Direction::Ascending,
            },
        };

        AggregateOptions {
            excluded_class: self.exclude.clone(),
            precision: self.precision,
            sort: Some(sort),
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Anonymize {
            location,
            json_file,
            out_file,
            yes,
        } => {
            let location = resolve(&location)?;
            let json_path = location.join(json_file);
            let out_path = location.join(out_file);
            let written = guarded(&out_path, yes, || {
                anonymize::anonymize_file(&json_path, &out_path)
            })?;
            match written {
                Some(count) => println!("Anonymized {count} students @ {}", out_path.display()),
                None => println!("Exiting without writing anonymized data."),
            }
        }
        Commands::WriteCsv {
            location,
            json_file,
            csv_file,
            yes,
        } => {
            let location = resolve(&location)?;
            let json_path = location.join(json_file);
            let csv_path = location.join(csv_file);
            let written = guarded(&csv_path, yes, || convert::json_to_csv(&json_path, &csv_path))?;
            match written {
                Some(_) => println!("Successfully created csv file @ {}", csv_path.display()),
                None => println!("Exiting without creating a csv."),
            }
        }
        Commands::Plot(args) => plot(&args, ChartStyle::Horizontal)?,
        Commands::Stacked(args) => plot(&args, ChartStyle::Stacked)?,
    }

    Ok(())
}

fn plot(args: &PlotArgs, style: ChartStyle) -> anyhow::Result<()> {
    let csv_path = resolve(&args.location)?.join(&args.csv_file);
    let records = aggregate::load_records(&csv_path)?;
    let rows = aggregate::aggregate(&records, &args.options(style));
    info!(?style, classes = rows.len(), "rendering chart");
    print!("{}", chart::render(&rows, style, args.width)?);
    Ok(())
}

fn resolve(location: &std::path::Path) -> anyhow::Result<PathBuf> {
    location
        .canonicalize()
        .with_context(|| format!("failed to resolve directory {}", location.display()))
}

fn guarded<F>(path: &std::path::Path, yes: bool, write: F) -> anyhow::Result<Option<usize>>
where
    F: FnOnce() -> anyhow::Result<usize>,
{
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    prompt::write_guarded(path, yes, &mut stdin.lock(), &mut stdout, write)
}
