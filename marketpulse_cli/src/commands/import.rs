use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use marketpulse_lib::import::{self, RawPostRow};
use marketpulse_lib::DashboardConfig;

use crate::commands::open_db;
use crate::output::{print_status, OutputFormat};

#[derive(Args)]
pub struct ImportArgs {
    /// Exported posts file (.csv or .json)
    pub file: PathBuf,

    /// Input format: csv or json (default: from the file extension)
    #[arg(long)]
    pub format: Option<String>,

    /// Show every rejected row instead of the first few
    #[arg(long)]
    pub all_errors: bool,
}

const ERROR_PREVIEW: usize = 10;

fn detect_format(args: &ImportArgs) -> Result<&'static str> {
    let explicit = args.format.as_deref().map(str::to_lowercase);
    let ext = args
        .file
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);
    match explicit.as_deref().or(ext.as_deref()) {
        Some("json") => Ok("json"),
        Some("csv") | Some("txt") => Ok("csv"),
        Some(other) => bail!(
            "unsupported import format '{}'. Export the sheet as CSV or JSON",
            other
        ),
        None => Ok("csv"),
    }
}

fn read_csv_rows(path: &Path) -> Result<Vec<RawPostRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let mut rows = Vec::new();
    for (index, result) in rdr.deserialize::<RawPostRow>().enumerate() {
        let row = result.with_context(|| format!("Row {}: malformed CSV record", index + 2))?;
        rows.push(row);
    }
    Ok(rows)
}

pub fn run(args: &ImportArgs, config: &DashboardConfig, format: &OutputFormat) -> Result<()> {
    let rows = match detect_format(args)? {
        "json" => {
            let text = std::fs::read_to_string(&args.file)
                .with_context(|| format!("failed to read {}", args.file.display()))?;
            import::rows_from_json(&text)?
        }
        _ => read_csv_rows(&args.file)?,
    };

    let parsed = import::parse_rows(rows);
    let limit = if args.all_errors {
        parsed.errors.len()
    } else {
        ERROR_PREVIEW
    };
    for error in parsed.errors.iter().take(limit) {
        eprintln!("{}", error);
    }
    if parsed.errors.len() > limit {
        eprintln!(
            "... and {} more rejected rows (use --all-errors to list them)",
            parsed.errors.len() - limit
        );
    }

    let db = open_db(config)?;
    let filename = args
        .file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| args.file.display().to_string());
    let total_rows = parsed.total_rows;
    let metadata = import::commit(&db, &filename, parsed)?;

    eprintln!(
        "Imported {} of {} rows into {}",
        metadata.total_records,
        total_rows,
        config.database.display()
    );
    print_status(Some(&metadata), metadata.total_records, format)
}
