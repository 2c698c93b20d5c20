//! railsql CLI - turn a station/line CSV into a SQL insert script
//!
//! ```bash
//! railsql < wmata.csv > network.sql
//! railsql -i wmata.csv -o network.sql --membership-table LineStation
//! railsql -d ';' --summary summary.json < network.csv
//! ```
//!
//! The script is wrapped in `BEGIN;` / `COMMIT;`. Any failure writes
//! `ROLLBACK;` instead, logs the cause on stderr and exits with status 1.

use clap::Parser;
use railsql::{
    convert, logging, write_summary, ConvertOptions, PipelineError, ReaderOptions, TableNames,
};
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser)]
#[command(name = "railsql")]
#[command(about = "Convert a transit network CSV into a transactional SQL script", long_about = None)]
struct Cli {
    /// Input CSV file (default: stdin)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output SQL file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// CSV delimiter
    #[arg(short, long, default_value = ",")]
    delimiter: char,

    /// Table receiving one row per rail line
    #[arg(long, default_value = "RailLine")]
    line_table: String,

    /// Table receiving one row per station
    #[arg(long, default_value = "Station")]
    station_table: String,

    /// Table receiving one row per station/line membership
    #[arg(long, default_value = "MembershipTable")]
    membership_table: String,

    /// Write a JSON summary of the run to this file
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn options(&self) -> Result<ConvertOptions, Box<dyn std::error::Error>> {
        if !self.delimiter.is_ascii() {
            return Err(format!("delimiter must be a single ASCII character, got '{}'", self.delimiter).into());
        }

        Ok(ConvertOptions {
            reader: ReaderOptions {
                delimiter: self.delimiter as u8,
            },
            tables: TableNames {
                rail_line: self.line_table.clone(),
                station: self.station_table.clone(),
                membership: self.membership_table.clone(),
            },
        })
    }
}

fn main() {
    // Load .env file (if present), so RUST_LOG can live there
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(&cli) {
        if let Some(message) = diagnostic(e.as_ref()) {
            eprintln!("railsql: {}", message);
        }
        std::process::exit(1);
    }
}

/// Message for errors `convert` has not already logged.
fn diagnostic(err: &(dyn std::error::Error + 'static)) -> Option<String> {
    if err.downcast_ref::<PipelineError>().is_some() {
        return None;
    }
    Some(err.to_string())
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let options = cli.options()?;

    let input: Box<dyn Read> = match &cli.input {
        Some(path) => {
            debug!("reading {}", path.display());
            Box::new(File::open(path)?)
        }
        None => Box::new(io::stdin().lock()),
    };

    let output: Box<dyn Write> = match &cli.output {
        Some(path) => {
            debug!("writing {}", path.display());
            Box::new(File::create(path)?)
        }
        None => Box::new(io::stdout().lock()),
    };

    let summary = convert(input, output, &options)?;

    if let Some(path) = &cli.summary {
        write_summary(path, &summary)?;
    }

    Ok(())
}
