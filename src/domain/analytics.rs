//! Read-side aggregation of click logs.
//!
//! Everything here is pure: the service layer loads the in-window logs and this
//! module turns them into the report structures served by the API.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Duration, NaiveDate, Timelike, Utc};
use serde::Serialize;

use crate::domain::entities::{ClickLog, UNKNOWN};
use crate::utils::url_validator::referrer_host;

/// Referrer category for clicks without a usable referrer.
pub const DIRECT: &str = "direct";

/// Reporting window ending now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    Day,
    #[default]
    Week,
    Month,
    Year,
}

impl Period {
    /// Parses a query value; anything unrecognised falls back to a week.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("day") => Self::Day,
            Some("month") => Self::Month,
            Some("year") => Self::Year,
            _ => Self::Week,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }

    pub fn duration(&self) -> Duration {
        match self {
            Self::Day => Duration::hours(24),
            Self::Week => Duration::days(7),
            Self::Month => Duration::days(30),
            Self::Year => Duration::days(365),
        }
    }

    /// Start of the window that ends at `now`.
    pub fn since(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.duration()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_clicks: i64,
    pub unique_clicks: i64,
    /// Busiest UTC hour as `HH:00`.
    pub peak_hour: Option<String>,
    /// Busiest UTC date as `YYYY-MM-DD`.
    pub peak_day: Option<String>,
    pub avg_daily_clicks: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPoint {
    pub date: String,
    pub clicks: i64,
    pub unique_clicks: i64,
}

/// One category of a breakdown. `percentage` is the fraction of all clicks (0..=1).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Breakdown {
    pub category: String,
    pub clicks: i64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkAnalytics {
    pub summary: Summary,
    pub time_series: Vec<DailyPoint>,
    pub geographic: Vec<Breakdown>,
    pub devices: Vec<Breakdown>,
    pub browsers: Vec<Breakdown>,
    pub operating_systems: Vec<Breakdown>,
    pub referrers: Vec<Breakdown>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: String,
    pub clicks: i64,
}

/// Aggregates the clicks of one link observed between `since` and `now`.
pub fn aggregate(clicks: &[ClickLog], since: DateTime<Utc>, now: DateTime<Utc>) -> LinkAnalytics {
    let total = clicks.len() as i64;

    LinkAnalytics {
        summary: summarize(clicks),
        time_series: time_series(clicks, since, now),
        geographic: breakdown(clicks, total, |c| {
            c.country.clone().unwrap_or_else(|| UNKNOWN.to_string())
        }),
        devices: breakdown(clicks, total, |c| c.device_type.clone()),
        browsers: breakdown(clicks, total, |c| c.browser.clone()),
        operating_systems: breakdown(clicks, total, |c| c.os.clone()),
        referrers: breakdown(clicks, total, |c| {
            referrer_host(c.referrer.as_deref()).unwrap_or_else(|| DIRECT.to_string())
        }),
    }
}

fn summarize(clicks: &[ClickLog]) -> Summary {
    let unique = clicks.iter().map(|c| c.ip_hash.as_str()).collect::<HashSet<_>>();

    let mut hours: BTreeMap<u32, i64> = BTreeMap::new();
    let mut days: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for click in clicks {
        *hours.entry(click.clicked_at.hour()).or_default() += 1;
        *days.entry(click.clicked_at.date_naive()).or_default() += 1;
    }

    let avg_daily_clicks = if days.is_empty() {
        0.0
    } else {
        round2(clicks.len() as f64 / days.len() as f64)
    };

    Summary {
        total_clicks: clicks.len() as i64,
        unique_clicks: unique.len() as i64,
        peak_hour: busiest(&hours).map(|h| format!("{:02}:00", h)),
        peak_day: busiest(&days).map(|d| d.format("%Y-%m-%d").to_string()),
        avg_daily_clicks,
    }
}

/// Key with the most hits; ties go to the smallest key.
fn busiest<K: Copy + Ord>(counts: &BTreeMap<K, i64>) -> Option<K> {
    let mut best: Option<(K, i64)> = None;
    for (key, count) in counts {
        if best.is_none_or(|(_, c)| *count > c) {
            best = Some((*key, *count));
        }
    }
    best.map(|(k, _)| k)
}

fn time_series(clicks: &[ClickLog], since: DateTime<Utc>, now: DateTime<Utc>) -> Vec<DailyPoint> {
    if clicks.is_empty() {
        return Vec::new();
    }

    let mut per_day: HashMap<NaiveDate, (i64, HashSet<&str>)> = HashMap::new();
    for click in clicks {
        let entry = per_day.entry(click.clicked_at.date_naive()).or_default();
        entry.0 += 1;
        entry.1.insert(click.ip_hash.as_str());
    }

    days_between(since, now)
        .into_iter()
        .map(|day| {
            let (clicks, unique) = per_day
                .get(&day)
                .map(|(n, ips)| (*n, ips.len() as i64))
                .unwrap_or((0, 0));
            DailyPoint {
                date: day.format("%Y-%m-%d").to_string(),
                clicks,
                unique_clicks: unique,
            }
        })
        .collect()
}

/// Zero-filled per-day totals for a dashboard window.
///
/// `counts` maps `YYYY-MM-DD` to clicks; dates outside the window are ignored.
pub fn click_trends(
    counts: &HashMap<String, i64>,
    since: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Vec<TrendPoint> {
    days_between(since, now)
        .into_iter()
        .map(|day| {
            let date = day.format("%Y-%m-%d").to_string();
            let clicks = counts.get(&date).copied().unwrap_or(0);
            TrendPoint { date, clicks }
        })
        .collect()
}

fn days_between(since: DateTime<Utc>, now: DateTime<Utc>) -> Vec<NaiveDate> {
    let last = now.date_naive();
    let mut day = since.date_naive();
    let mut days = Vec::new();
    while day <= last {
        days.push(day);
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }
    days
}

fn breakdown<F>(clicks: &[ClickLog], total: i64, key: F) -> Vec<Breakdown>
where
    F: Fn(&ClickLog) -> String,
{
    let mut counts: HashMap<String, i64> = HashMap::new();
    for click in clicks {
        *counts.entry(key(click)).or_default() += 1;
    }

    let mut rows: Vec<Breakdown> = counts
        .into_iter()
        .map(|(category, clicks)| Breakdown {
            percentage: percentage(clicks, total),
            category,
            clicks,
        })
        .collect();

    rows.sort_by(|a, b| {
        b.clicks
            .cmp(&a.clicks)
            .then_with(|| a.category.cmp(&b.category))
    });
    rows
}

/// Fraction of `total` rounded to four decimals; 0 when `total` is 0.
pub fn percentage(part: i64, total: i64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (part as f64 / total as f64 * 10_000.0).round() / 10_000.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn click(at: DateTime<Utc>, ip_hash: &str, device: &str, referrer: Option<&str>) -> ClickLog {
        ClickLog {
            id: 0,
            link_id: 1,
            ip_hash: ip_hash.to_string(),
            user_agent: String::new(),
            device_type: device.to_string(),
            browser: "Chrome".to_string(),
            os: "Linux".to_string(),
            country: None,
            referrer: referrer.map(str::to_string),
            clicked_at: at,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 10, 18, 0, 0).unwrap()
    }

    #[test]
    fn test_period_parse() {
        assert_eq!(Period::parse(Some("day")), Period::Day);
        assert_eq!(Period::parse(Some("MONTH")), Period::Month);
        assert_eq!(Period::parse(Some("year")), Period::Year);
        assert_eq!(Period::parse(Some("fortnight")), Period::Week);
        assert_eq!(Period::parse(None), Period::Week);
        assert_eq!(Period::Day.since(now()), now() - Duration::hours(24));
    }

    #[test]
    fn test_zero_clicks() {
        let report = aggregate(&[], Period::Week.since(now()), now());

        assert_eq!(report.summary.total_clicks, 0);
        assert_eq!(report.summary.unique_clicks, 0);
        assert!(report.summary.peak_hour.is_none());
        assert!(report.summary.peak_day.is_none());
        assert_eq!(report.summary.avg_daily_clicks, 0.0);
        assert!(report.time_series.is_empty());
        assert!(report.devices.is_empty());
        assert_eq!(percentage(0, 0), 0.0);
        assert!(!percentage(0, 0).is_nan());
    }

    #[test]
    fn test_summary_and_breakdowns() {
        let d1 = Utc.with_ymd_and_hms(2026, 5, 9, 14, 10, 0).unwrap();
        let d2 = Utc.with_ymd_and_hms(2026, 5, 10, 9, 0, 0).unwrap();
        let clicks = vec![
            click(d1, "a", "mobile", Some("https://t.co/abc")),
            click(d1 + Duration::minutes(5), "a", "mobile", None),
            click(d1 + Duration::minutes(20), "b", "desktop", Some("https://t.co/xyz")),
            click(d2, "c", "tablet", Some("not a url")),
        ];

        let report = aggregate(&clicks, Period::Week.since(now()), now());

        assert_eq!(report.summary.total_clicks, 4);
        assert_eq!(report.summary.unique_clicks, 3);
        assert_eq!(report.summary.peak_hour.as_deref(), Some("14:00"));
        assert_eq!(report.summary.peak_day.as_deref(), Some("2026-05-09"));
        assert_eq!(report.summary.avg_daily_clicks, 2.0);

        assert_eq!(report.devices[0].category, "mobile");
        assert_eq!(report.devices[0].clicks, 2);
        assert_eq!(report.devices[0].percentage, 0.5);
        assert_eq!(report.devices[2].percentage, 0.25);
        // equal counts are ordered by name
        assert_eq!(report.devices[1].category, "desktop");
        assert_eq!(report.devices[2].category, "tablet");

        assert_eq!(report.referrers[0].category, "direct");
        assert_eq!(report.referrers[0].clicks, 2);
        assert_eq!(report.referrers[1].category, "t.co");

        assert_eq!(report.geographic.len(), 1);
        assert_eq!(report.geographic[0].category, "unknown");
        assert_eq!(report.geographic[0].percentage, 1.0);
    }

    #[test]
    fn test_time_series_is_zero_filled() {
        let d = Utc.with_ymd_and_hms(2026, 5, 8, 1, 0, 0).unwrap();
        let clicks = vec![click(d, "a", "desktop", None), click(d, "a", "desktop", None)];

        let report = aggregate(&clicks, Period::Week.since(now()), now());

        assert_eq!(report.time_series.len(), 8);
        assert_eq!(report.time_series.first().unwrap().date, "2026-05-03");
        assert_eq!(report.time_series.last().unwrap().date, "2026-05-10");

        let busy = report
            .time_series
            .iter()
            .find(|p| p.date == "2026-05-08")
            .unwrap();
        assert_eq!(busy.clicks, 2);
        assert_eq!(busy.unique_clicks, 1);
        assert_eq!(report.time_series.iter().map(|p| p.clicks).sum::<i64>(), 2);
    }

    #[test]
    fn test_percentages_are_fractions() {
        assert_eq!(percentage(1, 3), 0.3333);
        assert_eq!(percentage(2, 3), 0.6667);
        assert_eq!(percentage(5, 5), 1.0);
        assert_eq!(percentage(3, 0), 0.0);
    }

    #[test]
    fn test_click_trends() {
        let mut counts = HashMap::new();
        counts.insert("2026-05-10".to_string(), 4);
        counts.insert("2020-01-01".to_string(), 99);

        let trends = click_trends(&counts, Period::Day.since(now()), now());

        assert_eq!(
            trends,
            vec![
                TrendPoint { date: "2026-05-09".to_string(), clicks: 0 },
                TrendPoint { date: "2026-05-10".to_string(), clicks: 4 },
            ]
        );
    }
}
