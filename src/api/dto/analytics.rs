//! DTOs for analytics endpoints.

use serde::{Deserialize, Serialize};

use crate::api::dto::link::LinkResponse;
use crate::domain::analytics::{Breakdown, DailyPoint, LinkAnalytics, Period, Summary, TrendPoint};

/// `?period=day|week|month|year`; anything else means a week.
#[derive(Debug, Default, Deserialize)]
pub struct PeriodParams {
    pub period: Option<String>,
}

impl PeriodParams {
    pub fn period(&self) -> Period {
        Period::parse(self.period.as_deref())
    }
}

/// `?format=csv|json&period=...` for exports.
#[derive(Debug, Default, Deserialize)]
pub struct ExportParams {
    pub format: Option<String>,
    pub period: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub period: &'static str,
    pub total_links: i64,
    pub active_links: i64,
    pub total_clicks: i64,
    pub today_clicks: i64,
    pub period_clicks: i64,
    pub click_trends: Vec<TrendPoint>,
    pub recent_links: Vec<LinkResponse>,
}

#[derive(Debug, Serialize)]
pub struct GeographicEntry {
    pub country: String,
    pub clicks: i64,
    pub percentage: f64,
}

#[derive(Debug, Serialize)]
pub struct DeviceEntry {
    #[serde(rename = "type")]
    pub device_type: String,
    pub clicks: i64,
    pub percentage: f64,
}

#[derive(Debug, Serialize)]
pub struct BrowserEntry {
    pub browser: String,
    pub clicks: i64,
    pub percentage: f64,
}

#[derive(Debug, Serialize)]
pub struct OsEntry {
    pub os: String,
    pub clicks: i64,
    pub percentage: f64,
}

#[derive(Debug, Serialize)]
pub struct ReferrerEntry {
    pub source: String,
    pub clicks: i64,
    pub percentage: f64,
}

macro_rules! from_breakdown {
    ($entry:ident, $field:ident) => {
        impl From<Breakdown> for $entry {
            fn from(b: Breakdown) -> Self {
                Self {
                    $field: b.category,
                    clicks: b.clicks,
                    percentage: b.percentage,
                }
            }
        }
    };
}

from_breakdown!(GeographicEntry, country);
from_breakdown!(DeviceEntry, device_type);
from_breakdown!(BrowserEntry, browser);
from_breakdown!(OsEntry, os);
from_breakdown!(ReferrerEntry, source);

/// Per-link report; each breakdown names its category key after what it counts.
#[derive(Debug, Serialize)]
pub struct LinkAnalyticsResponse {
    pub summary: Summary,
    pub time_series: Vec<DailyPoint>,
    pub geographic: Vec<GeographicEntry>,
    pub devices: Vec<DeviceEntry>,
    pub browsers: Vec<BrowserEntry>,
    pub operating_systems: Vec<OsEntry>,
    pub referrers: Vec<ReferrerEntry>,
}

fn entries<T: From<Breakdown>>(rows: Vec<Breakdown>) -> Vec<T> {
    rows.into_iter().map(T::from).collect()
}

impl From<LinkAnalytics> for LinkAnalyticsResponse {
    fn from(report: LinkAnalytics) -> Self {
        Self {
            summary: report.summary,
            time_series: report.time_series,
            geographic: entries(report.geographic),
            devices: entries(report.devices),
            browsers: entries(report.browsers),
            operating_systems: entries(report.operating_systems),
            referrers: entries(report.referrers),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_period_params() {
        let p = PeriodParams {
            period: Some("month".to_string()),
        };
        assert_eq!(p.period(), Period::Month);
        assert_eq!(PeriodParams::default().period(), Period::Week);
    }

    #[test]
    fn test_breakdown_keys_are_named_per_array() {
        let row = |category: &str| Breakdown {
            category: category.to_string(),
            clicks: 1,
            percentage: 0.5,
        };
        let report = LinkAnalytics {
            summary: Summary {
                total_clicks: 2,
                unique_clicks: 1,
                peak_hour: None,
                peak_day: None,
                avg_daily_clicks: 2.0,
            },
            time_series: vec![],
            geographic: vec![row("unknown")],
            devices: vec![row("mobile")],
            browsers: vec![row("Safari")],
            operating_systems: vec![row("iOS")],
            referrers: vec![row("t.co")],
        };

        let body = serde_json::to_value(LinkAnalyticsResponse::from(report)).unwrap();

        assert_eq!(
            body["devices"][0],
            json!({ "type": "mobile", "clicks": 1, "percentage": 0.5 })
        );
        assert_eq!(body["geographic"][0]["country"], "unknown");
        assert_eq!(body["browsers"][0]["browser"], "Safari");
        assert_eq!(body["operating_systems"][0]["os"], "iOS");
        assert_eq!(body["referrers"][0]["source"], "t.co");
        assert!(body["devices"][0].get("category").is_none());
    }
}
