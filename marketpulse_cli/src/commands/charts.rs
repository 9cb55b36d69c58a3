use anyhow::{bail, Result};
use clap::Args;
use marketpulse_lib::{ChartViews, DashboardConfig, DataSource, DisplayLimits};

use crate::commands::{open_db, today, FilterArgs};
use crate::output::{
    print_impact_categories, print_json, print_keyword_counts, print_sector_counts,
    print_sentiment_distribution, print_summary, print_time_series, OutputFormat,
};

#[derive(Args)]
pub struct ChartsArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Show a single view: summary, sentiment, timeline, impact, sectors, keywords
    #[arg(long)]
    pub view: Option<String>,

    /// Do not truncate the timeline or the sector/keyword rankings
    #[arg(long)]
    pub no_limits: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum View {
    Summary,
    Sentiment,
    Timeline,
    Impact,
    Sectors,
    Keywords,
}

impl View {
    const ALL: [View; 6] = [
        View::Summary,
        View::Sentiment,
        View::Timeline,
        View::Impact,
        View::Sectors,
        View::Keywords,
    ];

    fn parse(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "summary" => Ok(View::Summary),
            "sentiment" | "distribution" => Ok(View::Sentiment),
            "timeline" | "time-series" => Ok(View::Timeline),
            "impact" => Ok(View::Impact),
            "sectors" | "sector" => Ok(View::Sectors),
            "keywords" | "keyword" => Ok(View::Keywords),
            _ => bail!(
                "unknown view '{}'. Valid values: summary, sentiment, timeline, impact, sectors, keywords",
                value
            ),
        }
    }

    fn title(&self) -> &'static str {
        match self {
            View::Summary => "Summary",
            View::Sentiment => "Sentiment Distribution",
            View::Timeline => "Daily Sentiment and Market Impact",
            View::Impact => "Market Impact Categories",
            View::Sectors => "Sectors",
            View::Keywords => "Keywords",
        }
    }
}

fn print_view(views: &ChartViews, view: View, format: &OutputFormat) -> Result<()> {
    match (view, format) {
        (View::Summary, OutputFormat::Json) => print_json(&views.summary),
        (View::Sentiment, OutputFormat::Json) => print_json(&views.sentiment_distribution),
        (View::Timeline, OutputFormat::Json) => print_json(&views.time_series),
        (View::Impact, OutputFormat::Json) => print_json(&views.impact_categories),
        (View::Sectors, OutputFormat::Json) => print_json(&views.sectors),
        (View::Keywords, OutputFormat::Json) => print_json(&views.keywords),
        (View::Summary, _) => print_summary(&views.summary, format)?,
        (View::Sentiment, _) => print_sentiment_distribution(&views.sentiment_distribution, format)?,
        (View::Timeline, _) => print_time_series(&views.time_series, format)?,
        (View::Impact, _) => print_impact_categories(&views.impact_categories, format)?,
        (View::Sectors, _) => print_sector_counts(&views.sectors, format)?,
        (View::Keywords, _) => print_keyword_counts(&views.keywords, format)?,
    }
    Ok(())
}

pub fn run(args: &ChartsArgs, config: &DashboardConfig, format: &OutputFormat) -> Result<()> {
    let view = args.view.as_deref().map(View::parse).transpose()?;
    if view.is_none() && *format == OutputFormat::Csv {
        bail!("--output csv needs a single --view (e.g. --view sectors)");
    }

    let filter = args.filter.to_filter(config, today())?;
    let db = open_db(config)?;
    let snapshot = db.get_all()?;
    let subset = filter.apply(&snapshot);

    let limits = if args.no_limits {
        DisplayLimits {
            time_series_days: None,
            top_sectors: usize::MAX,
            top_keywords: usize::MAX,
        }
    } else {
        config.display.clone()
    };
    let views = ChartViews::compute(&subset).with_display_limits(&limits);

    eprintln!("{} of {} posts in view", subset.len(), snapshot.len());

    match view {
        Some(view) => print_view(&views, view, format)?,
        None if *format == OutputFormat::Json => print_json(&views),
        None => {
            for (i, view) in View::ALL.iter().enumerate() {
                if i > 0 {
                    println!();
                }
                println!("{}", view.title());
                print_view(&views, *view, format)?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_names() {
        assert_eq!(View::parse("Timeline").unwrap(), View::Timeline);
        assert_eq!(View::parse("time-series").unwrap(), View::Timeline);
        assert_eq!(View::parse("sector").unwrap(), View::Sectors);
        assert!(View::parse("pie").is_err());
    }
}
