//! Click analytics service.
//!
//! Loads click logs and link counters for the caller and hands them to the
//! pure aggregation functions in [`crate::domain::analytics`].

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;

use crate::domain::analytics::{self, LinkAnalytics, Period, TrendPoint};
use crate::domain::entities::{ClickLog, Link, UNKNOWN};
use crate::domain::repositories::{ClickRepository, LinkRepository};
use crate::error::AppError;

/// Links shown in the dashboard's "recent" list.
pub const RECENT_LINKS: i64 = 5;

/// Per-user overview for one reporting window.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub total_links: i64,
    pub active_links: i64,
    pub total_clicks: i64,
    pub today_clicks: i64,
    pub period_clicks: i64,
    pub click_trends: Vec<TrendPoint>,
    pub recent_links: Vec<Link>,
}

/// Analytics export encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    /// Parses the `format` query value. Missing means CSV.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for any other value.
    pub fn parse(value: Option<&str>) -> Result<Self, AppError> {
        match value.map(str::trim) {
            None | Some("") | Some("csv") => Ok(Self::Csv),
            Some("json") => Ok(Self::Json),
            Some(other) => Err(AppError::bad_request(
                "Unsupported export format",
                json!({ "format": other, "supported": ["csv", "json"] }),
            )),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Csv => "text/csv; charset=utf-8",
            Self::Json => "application/json",
        }
    }
}

/// One exported click, in column order.
#[derive(Debug, Clone, Serialize)]
pub struct ExportRecord {
    pub clicked_at: DateTime<Utc>,
    pub ip_hash: String,
    pub country: String,
    pub device_type: String,
    pub browser: String,
    pub os: String,
    pub referrer: String,
}

impl From<ClickLog> for ExportRecord {
    fn from(click: ClickLog) -> Self {
        Self {
            clicked_at: click.clicked_at,
            ip_hash: click.ip_hash,
            country: click.country.unwrap_or_else(|| UNKNOWN.to_string()),
            device_type: click.device_type,
            browser: click.browser,
            os: click.os,
            referrer: click.referrer.unwrap_or_default(),
        }
    }
}

/// Encoded export ready to be served as a download.
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub filename: String,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

/// Service computing per-link and per-user click analytics.
pub struct AnalyticsService<L, C>
where
    L: LinkRepository,
    C: ClickRepository,
{
    link_repository: Arc<L>,
    click_repository: Arc<C>,
}

impl<L, C> AnalyticsService<L, C>
where
    L: LinkRepository,
    C: ClickRepository,
{
    pub fn new(link_repository: Arc<L>, click_repository: Arc<C>) -> Self {
        Self {
            link_repository,
            click_repository,
        }
    }

    /// Aggregates the clicks of a link owned by `user_id` over `period`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the link does not exist or is not
    /// owned by the caller.
    pub async fn link_analytics(
        &self,
        link_id: i64,
        user_id: i64,
        period: Period,
    ) -> Result<LinkAnalytics, AppError> {
        let now = Utc::now();
        let since = period.since(now);
        let clicks = self.owned_clicks(link_id, user_id, since).await?;

        Ok(analytics::aggregate(&clicks, since, now))
    }

    /// Builds the caller's dashboard for `period`.
    ///
    /// `today_clicks` counts click logs since UTC midnight. `total_clicks` is
    /// the sum of link counters.
    pub async fn dashboard(&self, user_id: i64, period: Period) -> Result<Dashboard, AppError> {
        let now = Utc::now();
        let since = period.since(now);
        let midnight = now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|t| t.and_utc())
            .unwrap_or(now);

        let totals = self.link_repository.totals_for_user(user_id).await?;
        let today_clicks = self
            .click_repository
            .count_for_user_since(user_id, midnight)
            .await?;
        let daily: HashMap<String, i64> = self
            .click_repository
            .daily_counts_for_user_since(user_id, since)
            .await?
            .into_iter()
            .collect();
        let recent_links = self
            .link_repository
            .recent_for_user(user_id, RECENT_LINKS)
            .await?;

        Ok(Dashboard {
            total_links: totals.total_links,
            active_links: totals.active_links,
            total_clicks: totals.total_clicks,
            today_clicks,
            period_clicks: daily.values().sum(),
            click_trends: analytics::click_trends(&daily, since, now),
            recent_links,
        })
    }

    /// Exports the raw in-window click logs of a link, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for a missing or foreign link and
    /// [`AppError::Internal`] if encoding fails.
    pub async fn export(
        &self,
        link_id: i64,
        user_id: i64,
        period: Period,
        format: ExportFormat,
    ) -> Result<ExportFile, AppError> {
        let since = period.since(Utc::now());
        let records: Vec<ExportRecord> = self
            .owned_clicks(link_id, user_id, since)
            .await?
            .into_iter()
            .map(ExportRecord::from)
            .collect();

        let body = match format {
            ExportFormat::Csv => encode_csv(&records)?,
            ExportFormat::Json => serde_json::to_vec_pretty(&records).map_err(encode_error)?,
        };

        Ok(ExportFile {
            filename: format!(
                "analytics_{}_{}.{}",
                link_id,
                period.as_str(),
                format.extension()
            ),
            content_type: format.content_type(),
            body,
        })
    }

    async fn owned_clicks(
        &self,
        link_id: i64,
        user_id: i64,
        since: DateTime<Utc>,
    ) -> Result<Vec<ClickLog>, AppError> {
        if self
            .link_repository
            .find_by_id_for_user(link_id, user_id)
            .await?
            .is_none()
        {
            return Err(AppError::not_found("Link not found", json!({ "id": link_id })));
        }

        self.click_repository
            .clicks_for_link_since(link_id, since)
            .await
    }
}

fn encode_error(e: impl std::fmt::Display) -> AppError {
    AppError::internal("Failed to encode export", json!({ "error": e.to_string() }))
}

fn encode_csv(records: &[ExportRecord]) -> Result<Vec<u8>, AppError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record([
            "clicked_at",
            "ip_hash",
            "country",
            "device_type",
            "browser",
            "os",
            "referrer",
        ])
        .map_err(encode_error)?;

    for r in records {
        writer
            .write_record([
                r.clicked_at.to_rfc3339().as_str(),
                r.ip_hash.as_str(),
                r.country.as_str(),
                r.device_type.as_str(),
                r.browser.as_str(),
                r.os.as_str(),
                r.referrer.as_str(),
            ])
            .map_err(encode_error)?;
    }

    writer.into_inner().map_err(encode_error)
}
