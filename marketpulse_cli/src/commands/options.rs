use anyhow::Result;
use clap::Args;
use marketpulse_lib::sector::GICS_SECTORS;
use marketpulse_lib::{extract_options, DashboardConfig, DataSource, FilterOptions};

use crate::commands::{open_db, today, DateWindowArgs};
use crate::output::{print_options, OutputFormat};

#[derive(Args)]
pub struct OptionsArgs {
    #[command(flatten)]
    pub window: DateWindowArgs,
}

/// List the sectors and keywords that can be filtered on within the date
/// window.
pub fn run(args: &OptionsArgs, config: &DashboardConfig, format: &OutputFormat) -> Result<()> {
    let window = args.window.to_filter(config, today())?;
    let db = open_db(config)?;
    let snapshot = db.get_all()?;

    let options = if snapshot.is_empty() {
        eprintln!("No posts loaded; listing the default GICS sectors.");
        FilterOptions {
            available_sectors: GICS_SECTORS.iter().map(|s| s.to_string()).collect(),
            available_keywords: Vec::new(),
        }
    } else {
        extract_options(&snapshot, &window)
    };

    print_options(&options, format)
}
