use clap::{Parser, Subcommand};
use royalbit_sheetio::cli;
use royalbit_sheetio::error::SheetIoResult;
use royalbit_sheetio::types::UnmappedCode;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sheetio")]
#[command(about = "Spreadsheet export/import driven by header rules")]
#[command(long_about = "Sheetio - Spreadsheet export/import driven by header rules

Headers carry their own formatting rule:
  Status(select):1=Active,2=Inactive   → column 'Status', codes 1,2 shown as labels
  Age                                  → plain column

COMMANDS:
  export  - Job file (headers + rows) to .xlsx / .xls / .csv / .html
  import  - First sheet of an .xlsx / .xls file to JSON or YAML
  rules   - Show how each header of a job file is parsed

EXAMPLES:
  sheetio export people.yaml people.xlsx
  sheetio export people.yaml people.txt --legacy-csv
  sheetio import people.xlsx people.json --job people.yaml")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Export a job file to a spreadsheet.

A job file lists the headers as [label, field] pairs and the rows as records:

  headers:
    - [\"Status(select):1=Active,2=Inactive\", status]
    - [Age, meta.age]
  rows:
    - { status: \"1,2\", meta: { age: 30 } }

Fields may go one level deep (meta.age). Missing values are written as '-'.
The format comes from the output extension unless --format is given.

UNMAPPED CODES:
  fail         - abort the export (default)
  blank        - leave the code's segment empty
  passthrough  - write the raw code")]
    /// Export a job file to .xlsx / .xls / .csv / .html
    Export {
        /// Path to YAML or JSON job file
        job: PathBuf,

        /// Output file path
        output: PathBuf,

        /// Output format (xlsx, xls, csv, html); defaults to the output extension
        #[arg(short, long)]
        format: Option<String>,

        /// Write the legacy tab-comma text layout instead of a spreadsheet
        #[arg(long, conflicts_with = "format")]
        legacy_csv: bool,

        /// How to handle codes missing from a column's code table
        #[arg(long, value_enum, default_value_t = UnmappedCode::Fail)]
        unmapped: UnmappedCode,

        /// Show verbose export steps
        #[arg(short, long)]
        verbose: bool,
    },

    #[command(long_about = "Import the first sheet of an .xlsx or .xls file.

Cells are read as trimmed text. Scanning stops once more than 50 blank rows
in a row have been seen, and blank rows are dropped from the result.

With --job, the first row is treated as the header row and the remaining
rows are turned back into records using the job's header rules
(labels such as 'Active' become their codes again).

The output is JSON or YAML depending on its extension.")]
    /// Import an .xlsx / .xls file to JSON or YAML
    Import {
        /// Path to .xlsx or .xls file
        input: PathBuf,

        /// Output file path (.json, .yaml or .yml)
        output: PathBuf,

        /// First row to read (1-based)
        #[arg(long, default_value = "1")]
        start_row: u32,

        /// Job file whose headers decode the rows into records
        #[arg(short, long)]
        job: Option<PathBuf>,

        /// Show verbose import steps
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show the parsed header rules of a job file
    Rules {
        /// Path to YAML or JSON job file
        job: PathBuf,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "royalbit_sheetio=debug".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> SheetIoResult<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Export {
            job,
            output,
            format,
            legacy_csv,
            unmapped,
            verbose,
        } => {
            if verbose {
                init_tracing();
            }
            cli::export(job, output, format, legacy_csv, unmapped, verbose)
        }

        Commands::Import {
            input,
            output,
            start_row,
            job,
            verbose,
        } => {
            if verbose {
                init_tracing();
            }
            cli::import(input, output, start_row, job, verbose)
        }

        Commands::Rules { job } => cli::rules(job),
    }
}
