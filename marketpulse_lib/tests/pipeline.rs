//! End-to-end checks: import the fixture, filter it, aggregate it.

use std::path::PathBuf;

use chrono::NaiveDate;
use marketpulse_lib::aggregate::{CategoryCount, SectorCount};
use marketpulse_lib::import::{commit, parse_rows, rows_from_json};
use marketpulse_lib::{
    extract_options, ChartViews, DataSource, Db, DisplayLimits, Filter, ImpactCategory,
    MemoryStore, Record,
};

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("posts.json")
}

fn load_fixture() -> Vec<Record> {
    let json = std::fs::read_to_string(fixture_path()).expect("read fixture");
    let parsed = parse_rows(rows_from_json(&json).expect("decode fixture"));
    assert_eq!(parsed.total_rows, 8);
    assert_eq!(parsed.records.len(), 6);
    parsed.records
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn fixture_import_reports_rejected_rows() {
    let json = std::fs::read_to_string(fixture_path()).unwrap();
    let parsed = parse_rows(rows_from_json(&json).unwrap());
    let messages: Vec<String> = parsed.errors.iter().map(|e| e.to_string()).collect();
    assert_eq!(messages.len(), 2);
    assert!(messages[0].starts_with("Row 8:"));
    assert!(messages[1].starts_with("Row 9:"));
    assert!(messages[1].contains("Duplicate url"));
}

#[test]
fn unscored_row_stays_unscored() {
    let records = load_fixture();
    let thanks = records.iter().find(|r| r.url.ends_with("1006")).unwrap();
    assert_eq!(thanks.sentiment_score, None);
    assert_eq!(thanks.market_impact_score, None);
    let birthday = records.iter().find(|r| r.url.ends_with("1004")).unwrap();
    assert_eq!(birthday.market_impact_score, Some(0.0));
}

#[test]
fn full_snapshot_views() {
    let records = load_fixture();
    let views = ChartViews::compute(&records);

    assert_eq!(views.summary.total_records, 6);
    assert_eq!(views.summary.direct_impact_count, 2);

    let histogram: Vec<usize> = views.sentiment_distribution.iter().map(|b| b.count).collect();
    assert_eq!(histogram, vec![2, 1, 0, 0, 2]);

    let dates: Vec<&str> = views.time_series.iter().map(|p| p.date.as_str()).collect();
    assert_eq!(dates, vec!["2024-03-01", "2024-03-02", "2024-03-03", "2024-03-04"]);
    assert!((views.time_series[0].sentiment - 0.025).abs() < 1e-9);
    assert_eq!(views.time_series[3].sentiment, 0.0);

    assert_eq!(
        views.impact_categories,
        vec![
            CategoryCount { category: ImpactCategory::Direct, count: 2 },
            CategoryCount { category: ImpactCategory::Indirect, count: 2 },
            CategoryCount { category: ImpactCategory::NoImpact, count: 2 },
        ]
    );

    assert_eq!(views.keywords[0].keyword, "tariffs");
    assert_eq!(views.keywords[0].count, 2);
    assert_eq!(views.sectors.len(), 7);
    assert!(views.sectors.iter().all(|s| s.count == 1));
}

#[test]
fn filtered_views_and_options() {
    let records = load_fixture();
    let filter = Filter::default()
        .with_date_from(date(2024, 3, 1))
        .with_date_to(date(2024, 3, 2))
        .with_sentiment_max(0.0);

    let subset = filter.apply(&records);
    let views = ChartViews::compute(&subset);
    assert_eq!(views.summary.total_records, 2);
    assert_eq!(
        views.sectors[0],
        SectorCount { sector: "Financials".into(), count: 1 }
    );

    let options = extract_options(&records, &filter);
    assert_eq!(
        options.available_sectors,
        vec!["Energy", "Financials", "Industrials", "Materials", "Real Estate"]
    );
    assert!(options.available_keywords.contains(&"oil".to_string()));
    assert!(!options.available_keywords.contains(&"antitrust".to_string()));
}

#[test]
fn display_limits_do_not_change_counts() {
    let records = load_fixture();
    let limits = DisplayLimits {
        time_series_days: Some(2),
        top_sectors: 2,
        top_keywords: 3,
    };
    let full = ChartViews::compute(&records);
    let limited = full.clone().with_display_limits(&limits);
    assert_eq!(limited.time_series, full.time_series[2..].to_vec());
    assert_eq!(limited.sectors, full.sectors[..2].to_vec());
    assert_eq!(limited.keywords.len(), 3);
    assert_eq!(limited.summary, full.summary);
}

#[test]
fn memory_and_sqlite_stores_agree() {
    let json = std::fs::read_to_string(fixture_path()).unwrap();

    let memory = MemoryStore::new();
    commit(&memory, "posts.json", parse_rows(rows_from_json(&json).unwrap())).unwrap();

    let db = Db::open_in_memory().unwrap();
    db.init().unwrap();
    commit(&db, "posts.json", parse_rows(rows_from_json(&json).unwrap())).unwrap();

    let from_memory = memory.get_all().unwrap();
    let from_db = db.get_all().unwrap();
    assert_eq!(from_memory, from_db);
    assert_eq!(
        ChartViews::compute(from_memory.as_slice()),
        ChartViews::compute(from_db.as_slice())
    );
    assert_eq!(db.metadata().unwrap().unwrap().total_records, 6);
}
