use anyhow::Result;
use marketpulse_lib::{DashboardConfig, DataSource};

use crate::commands::open_db;
use crate::output::{print_status, OutputFormat};

/// Report the current snapshot: record count, source file and when it was
/// loaded.
pub fn run(config: &DashboardConfig, format: &OutputFormat) -> Result<()> {
    let db = open_db(config)?;
    let count = db.post_count()?;
    let metadata = db.metadata()?;

    if count == 0 {
        eprintln!("No posts loaded. Run 'marketpulse import <file>' first.");
    }

    print_status(metadata.as_ref(), count as usize, format)
}
