use crate::error::{SheetIoError, SheetIoResult};
use crate::excel::{legacy_csv, SheetExporter, SheetImporter};
use crate::parser;
use crate::rules::{ColumnFormat, HeaderRule};
use crate::types::{ExportFormat, ExportOptions, ImportOptions, UnmappedCode};
use colored::Colorize;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Output document for `import`
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum OutputKind {
    Json,
    Yaml,
}

impl OutputKind {
    fn from_path(path: &Path) -> SheetIoResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(SheetIoError::UnsupportedFormat(format!(
                "import output must be .json, .yaml or .yml, got '{}'",
                path.display()
            ))),
        }
    }

    fn render<T: Serialize>(self, value: &T) -> SheetIoResult<String> {
        Ok(match self {
            Self::Json => serde_json::to_string_pretty(value)?,
            Self::Yaml => serde_yaml::to_string(value)?,
        })
    }
}

/// Execute the export command
pub fn export(
    job: PathBuf,
    output: PathBuf,
    format: Option<String>,
    legacy: bool,
    unmapped: UnmappedCode,
    verbose: bool,
) -> SheetIoResult<()> {
    println!("{}", "📤 Sheetio - Export".bold().green());
    println!("   Job:    {}", job.display());
    println!("   Output: {}\n", output.display());

    if verbose {
        println!("{}", "📖 Reading job file...".cyan());
    }
    let job = parser::parse_job(&job)?;

    if verbose {
        println!(
            "   Found {} columns, {} rows\n",
            job.headers.len(),
            job.rows.len()
        );
    }

    let options = ExportOptions {
        unmapped,
        ..ExportOptions::default()
    };
    let exporter = SheetExporter::new(&job.headers)?.with_options(options);

    if legacy {
        if verbose {
            println!("{}", "📝 Writing legacy text export...".cyan());
        }
        let bytes = legacy_csv::encode(&exporter, &job.rows)?;
        fs::write(&output, bytes)?;
    } else {
        let format = match format {
            Some(name) => name.parse::<ExportFormat>()?,
            None => ExportFormat::from_path(&output)?,
        };
        if verbose {
            println!("{}", format!("📊 Writing .{} file...", format).cyan());
        }
        let bytes = exporter.encode(&job.rows, format)?;
        fs::write(&output, bytes)?;
    }

    println!("{}", "✅ Export Complete!".bold().green());
    println!("   File: {}", output.display());
    println!("   Rows: {}\n", job.rows.len());

    Ok(())
}

/// Execute the import command
pub fn import(
    input: PathBuf,
    output: PathBuf,
    start_row: u32,
    job: Option<PathBuf>,
    verbose: bool,
) -> SheetIoResult<()> {
    println!("{}", "📥 Sheetio - Import".bold().green());
    println!("   Input:  {}", input.display());
    println!("   Output: {}\n", output.display());

    let kind = OutputKind::from_path(&output)?;
    let options = ImportOptions {
        start_row,
        ..ImportOptions::default()
    };
    let importer = SheetImporter::new(&input).with_options(options);

    if verbose {
        println!("{}", "📖 Reading first sheet...".cyan());
    }

    let (document, count) = match job {
        Some(job) => {
            let rules = HeaderRule::parse_all(&parser::parse_headers(&job)?)?;
            if verbose {
                println!("   Decoding with {} header rules", rules.len());
            }
            let records = importer.import_records(&rules)?;
            (kind.render(&records)?, records.len())
        }
        None => {
            let rows = importer.import()?;
            (kind.render(&rows)?, rows.len())
        }
    };

    if verbose {
        println!("{}", "💾 Writing output...".cyan());
    }
    fs::write(&output, document)?;

    println!("{}", "✅ Import Complete!".bold().green());
    println!("   File: {}", output.display());
    println!("   Rows: {}\n", count);

    Ok(())
}

/// Execute the rules command
pub fn rules(job: PathBuf) -> SheetIoResult<()> {
    println!("{}", "🔍 Sheetio - Header Rules".bold().green());
    println!("   Job: {}\n", job.display());

    let specs = parser::parse_headers(&job)?;
    let rules = HeaderRule::parse_all(&specs)?;

    for (i, rule) in rules.iter().enumerate() {
        print!(
            "   {:>2}. {} {} {}",
            i + 1,
            rule.label.bright_blue().bold(),
            "←".dimmed(),
            rule.field.to_string().yellow()
        );
        match &rule.format {
            ColumnFormat::Plain => println!(),
            ColumnFormat::Coded { kind, codes } => {
                println!(" {}", format!("({})", kind).cyan());
                let mut entries: Vec<_> = codes.iter().collect();
                entries.sort();
                for (code, label) in entries {
                    println!("         {} = {}", code.green(), label);
                }
            }
        }
    }

    println!("\n{}", format!("✅ {} columns", rules.len()).bold().green());
    Ok(())
}
