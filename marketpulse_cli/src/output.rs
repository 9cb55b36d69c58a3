use anyhow::Result;
use marketpulse_lib::aggregate::{
    CategoryCount, KeywordCount, SectorCount, SentimentBucket, SummaryStats, TimeSeriesPoint,
};
use marketpulse_lib::{FilterOptions, ImpactCategory, Record, UploadMetadata};
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

const CONTENT_PREVIEW_CHARS: usize = 60;

#[derive(Clone, Debug, PartialEq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
    Markdown,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            "csv" => OutputFormat::Csv,
            "md" | "markdown" => OutputFormat::Markdown,
            _ => OutputFormat::Table,
        }
    }
}

#[derive(Tabled, Serialize)]
struct PostRow {
    #[tabled(rename = "Time")]
    #[serde(rename = "Time")]
    time: String,
    #[tabled(rename = "Impact")]
    #[serde(rename = "Impact")]
    impact: String,
    #[tabled(rename = "Sentiment")]
    #[serde(rename = "Sentiment")]
    sentiment: String,
    #[tabled(rename = "Market Impact")]
    #[serde(rename = "Market Impact")]
    market_impact: String,
    #[tabled(rename = "Sectors")]
    #[serde(rename = "Sectors")]
    sectors: String,
    #[tabled(rename = "Content")]
    #[serde(rename = "Content")]
    content: String,
}

/// Every stored column, for spreadsheet export.
#[derive(Serialize)]
struct PostExportRow<'a> {
    id: &'a str,
    time_str: &'a str,
    content: &'a str,
    url: &'a str,
    platform: &'a str,
    impact_on_market: &'a str,
    sentiment_score: Option<f64>,
    market_impact_score: Option<f64>,
    keywords: &'a str,
    sector: &'a str,
    reason: &'a str,
}

#[derive(Tabled, Serialize)]
struct MetricRow {
    #[tabled(rename = "Metric")]
    #[serde(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Value")]
    #[serde(rename = "Value")]
    value: String,
}

#[derive(Tabled, Serialize)]
struct BucketRow {
    #[tabled(rename = "Sentiment")]
    #[serde(rename = "Sentiment")]
    range: String,
    #[tabled(rename = "Posts")]
    #[serde(rename = "Posts")]
    count: usize,
}

#[derive(Tabled, Serialize)]
struct TimelineRow {
    #[tabled(rename = "Date")]
    #[serde(rename = "Date")]
    date: String,
    #[tabled(rename = "Avg Sentiment")]
    #[serde(rename = "Avg Sentiment")]
    sentiment: String,
    #[tabled(rename = "Avg Market Impact")]
    #[serde(rename = "Avg Market Impact")]
    market_impact: String,
}

#[derive(Tabled, Serialize)]
struct CategoryRow {
    #[tabled(rename = "Impact")]
    #[serde(rename = "Impact")]
    category: String,
    #[tabled(rename = "Label")]
    #[serde(rename = "Label")]
    label: String,
    #[tabled(rename = "Posts")]
    #[serde(rename = "Posts")]
    count: usize,
}

#[derive(Tabled, Serialize)]
struct TokenRow {
    #[tabled(rename = "Name")]
    #[serde(rename = "Name")]
    name: String,
    #[tabled(rename = "Posts")]
    #[serde(rename = "Posts")]
    count: usize,
}

#[derive(Tabled, Serialize)]
struct OptionRow {
    #[tabled(rename = "Kind")]
    #[serde(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Value")]
    #[serde(rename = "Value")]
    value: String,
}

// -- Row builders --

fn build_post_rows(records: &[&Record]) -> Vec<PostRow> {
    records
        .iter()
        .map(|r| PostRow {
            time: r.timestamp.clone(),
            impact: r.impact_category().to_string(),
            sentiment: format_score(r.sentiment_score),
            market_impact: format_score(r.market_impact_score),
            sectors: r.sector_tokens().join(", "),
            content: truncate_content(&r.content, CONTENT_PREVIEW_CHARS),
        })
        .collect()
}

fn build_export_rows<'a>(records: &[&'a Record]) -> Vec<PostExportRow<'a>> {
    records
        .iter()
        .map(|r| PostExportRow {
            id: &r.id,
            time_str: &r.timestamp,
            content: &r.content,
            url: &r.url,
            platform: r.platform.as_deref().unwrap_or(""),
            impact_on_market: r.impact_on_market.as_deref().unwrap_or(""),
            sentiment_score: r.sentiment_score,
            market_impact_score: r.market_impact_score,
            keywords: r.keywords.as_deref().unwrap_or(""),
            sector: r.sectors.as_deref().unwrap_or(""),
            reason: r.reason.as_deref().unwrap_or(""),
        })
        .collect()
}

fn build_status_rows(metadata: Option<&UploadMetadata>, record_count: usize) -> Vec<MetricRow> {
    let mut rows = vec![MetricRow {
        metric: "Records".to_string(),
        value: record_count.to_string(),
    }];
    match metadata {
        Some(meta) => {
            rows.push(MetricRow {
                metric: "Source File".to_string(),
                value: meta.filename.clone(),
            });
            rows.push(MetricRow {
                metric: "Last Updated".to_string(),
                value: meta.uploaded_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            });
        }
        None => rows.push(MetricRow {
            metric: "Last Updated".to_string(),
            value: "never".to_string(),
        }),
    }
    rows
}

fn build_summary_rows(summary: &SummaryStats) -> Vec<MetricRow> {
    vec![
        MetricRow {
            metric: "Total Posts".to_string(),
            value: summary.total_records.to_string(),
        },
        MetricRow {
            metric: "Avg Sentiment".to_string(),
            value: format_score(summary.avg_sentiment),
        },
        MetricRow {
            metric: "Direct Impact".to_string(),
            value: summary.direct_impact_count.to_string(),
        },
    ]
}

fn build_bucket_rows(buckets: &[SentimentBucket]) -> Vec<BucketRow> {
    buckets
        .iter()
        .map(|b| BucketRow {
            range: b.range.clone(),
            count: b.count,
        })
        .collect()
}

fn build_timeline_rows(points: &[TimeSeriesPoint]) -> Vec<TimelineRow> {
    points
        .iter()
        .map(|p| TimelineRow {
            date: p.date.clone(),
            sentiment: format!("{:.2}", p.sentiment),
            market_impact: format!("{:.2}", p.market_impact),
        })
        .collect()
}

fn build_category_rows(counts: &[CategoryCount]) -> Vec<CategoryRow> {
    counts
        .iter()
        .map(|c| CategoryRow {
            category: c.category.to_string(),
            label: impact_label(c.category).to_string(),
            count: c.count,
        })
        .collect()
}

fn build_sector_rows(counts: &[SectorCount]) -> Vec<TokenRow> {
    counts
        .iter()
        .map(|c| TokenRow {
            name: c.sector.clone(),
            count: c.count,
        })
        .collect()
}

fn build_keyword_rows(counts: &[KeywordCount]) -> Vec<TokenRow> {
    counts
        .iter()
        .map(|c| TokenRow {
            name: c.keyword.clone(),
            count: c.count,
        })
        .collect()
}

fn build_option_rows(options: &FilterOptions) -> Vec<OptionRow> {
    let sectors = options.available_sectors.iter().map(|s| OptionRow {
        kind: "sector".to_string(),
        value: s.clone(),
    });
    let keywords = options.available_keywords.iter().map(|k| OptionRow {
        kind: "keyword".to_string(),
        value: k.clone(),
    });
    sectors.chain(keywords).collect()
}

// -- Generic printers --

fn print_rows<T: Tabled + Serialize>(rows: Vec<T>, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", Table::new(rows)),
        OutputFormat::Markdown => {
            let mut table = Table::new(rows);
            table.with(Style::markdown());
            println!("{}", table);
        }
        OutputFormat::Csv => print_csv(rows)?,
        OutputFormat::Json => print_json(&rows),
    }
    Ok(())
}

fn print_csv<T: Serialize>(rows: impl IntoIterator<Item = T>) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(std::io::stdout());
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn print_json<T: serde::Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}

// -- Posts --

/// JSON emits full records; CSV emits every column so the file can be
/// re-imported.
pub fn print_posts(records: &[&Record], format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            print_json(&records);
            Ok(())
        }
        OutputFormat::Csv => print_csv(build_export_rows(records)),
        _ => print_rows(build_post_rows(records), format),
    }
}

// -- Status --

pub fn print_status(
    metadata: Option<&UploadMetadata>,
    record_count: usize,
    format: &OutputFormat,
) -> Result<()> {
    print_rows(build_status_rows(metadata, record_count), format)
}

// -- Charts --

pub fn print_summary(summary: &SummaryStats, format: &OutputFormat) -> Result<()> {
    print_rows(build_summary_rows(summary), format)
}

pub fn print_sentiment_distribution(buckets: &[SentimentBucket], format: &OutputFormat) -> Result<()> {
    print_rows(build_bucket_rows(buckets), format)
}

pub fn print_time_series(points: &[TimeSeriesPoint], format: &OutputFormat) -> Result<()> {
    print_rows(build_timeline_rows(points), format)
}

pub fn print_impact_categories(counts: &[CategoryCount], format: &OutputFormat) -> Result<()> {
    print_rows(build_category_rows(counts), format)
}

pub fn print_sector_counts(counts: &[SectorCount], format: &OutputFormat) -> Result<()> {
    print_rows(build_sector_rows(counts), format)
}

pub fn print_keyword_counts(counts: &[KeywordCount], format: &OutputFormat) -> Result<()> {
    print_rows(build_keyword_rows(counts), format)
}

// -- Options --

pub fn print_options(options: &FilterOptions, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            print_json(options);
            Ok(())
        }
        _ => print_rows(build_option_rows(options), format),
    }
}

// -- Formatting helpers --

fn format_score(score: Option<f64>) -> String {
    match score {
        Some(value) => format!("{:.2}", value),
        None => "-".to_string(),
    }
}

/// Dashboard label for an impact category.
fn impact_label(category: ImpactCategory) -> &'static str {
    match category {
        ImpactCategory::Direct => "직접",
        ImpactCategory::Indirect => "간접",
        ImpactCategory::NoImpact => "없음",
    }
}

fn truncate_content(content: &str, max_chars: usize) -> String {
    let single_line = content.split_whitespace().collect::<Vec<_>>().join(" ");
    if single_line.chars().count() <= max_chars {
        return single_line;
    }
    let cut: String = single_line.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", cut.trim_end())
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
