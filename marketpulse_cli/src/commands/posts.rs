use anyhow::Result;
use clap::Args;
use marketpulse_lib::{sort_records, DashboardConfig, DataSource, SortDirection, SortField};

use crate::commands::{open_db, today, FilterArgs};
use crate::output::{print_posts, OutputFormat};

#[derive(Args)]
pub struct PostsArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Sort field: time, sentiment, market-impact, impact
    #[arg(long, default_value = "time")]
    pub sort_by: String,

    /// Sort ascending instead of descending
    #[arg(long)]
    pub asc: bool,

    /// Maximum number of posts to show
    #[arg(long)]
    pub limit: Option<usize>,
}

pub fn run(args: &PostsArgs, config: &DashboardConfig, format: &OutputFormat) -> Result<()> {
    let sort_by: SortField = args.sort_by.parse().map_err(anyhow::Error::msg)?;
    let direction = if args.asc {
        SortDirection::Asc
    } else {
        SortDirection::Desc
    };
    let filter = args.filter.to_filter(config, today())?;

    let db = open_db(config)?;
    let snapshot = db.get_all()?;
    let mut matched = filter.apply(&snapshot);
    let total_matched = matched.len();

    sort_records(&mut matched, sort_by, direction);
    if let Some(limit) = args.limit {
        matched.truncate(limit);
    }

    eprintln!(
        "{} of {} posts match ({} shown)",
        total_matched,
        snapshot.len(),
        matched.len()
    );

    print_posts(&matched, format)
}
