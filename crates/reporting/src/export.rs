//! Tabular export of the dashboard: one fixed column set per tab, written
//! as fully quoted CSV or as JSON records.

use chrono::NaiveDate;
use hudey_core::config::LineEnding;
use hudey_core::error::{HudeyError, HudeyResult};
use hudey_core::types::{AnalyticsSnapshot, EngagementStatus};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

use crate::funnel::stage_count;

// ─── Types ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportTab {
    Overview,
    Campaigns,
    Creators,
    Email,
    Funnel,
    Content,
}

impl ExportTab {
    pub const ALL: [ExportTab; 6] = [
        Self::Overview,
        Self::Campaigns,
        Self::Creators,
        Self::Email,
        Self::Funnel,
        Self::Content,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Overview => "overview",
            Self::Campaigns => "campaigns",
            Self::Creators => "creators",
            Self::Email => "email",
            Self::Funnel => "funnel",
            Self::Content => "content",
        }
    }

    pub fn headers(self) -> &'static [&'static str] {
        match self {
            Self::Overview => &["Metric", "Value"],
            Self::Campaigns => &[
                "Campaign",
                "Status",
                "Creators",
                "Responded",
                "Agreed",
                "Emails Sent",
                "Open Rate (%)",
            ],
            Self::Creators => &[
                "Name",
                "Email",
                "Platform",
                "Campaign",
                "Status",
                "Response Time (hours)",
                "Fee (GBP)",
            ],
            Self::Email => &["Campaign", "Sent", "Delivered", "Opened", "Clicked", "Bounced"],
            Self::Funnel => &["Stage", "Count"],
            Self::Content => &[
                "Campaign",
                "Posts Live",
                "Likes",
                "Comments",
                "Shares",
                "Saves",
                "Compliance Score",
                "Compliance Issues",
            ],
        }
    }
}

impl fmt::Display for ExportTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportTab {
    type Err = HudeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tab| tab.as_str() == s)
            .ok_or_else(|| HudeyError::Export(format!("unknown export tab: {s}")))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = HudeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(HudeyError::Export(format!("unknown export format: {other}"))),
        }
    }
}

/// Header plus string rows, in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

// ─── Table builders ─────────────────────────────────────────────────────────

/// Shape the displayed snapshot into the rows of one tab.
pub fn build_table(snapshot: &AnalyticsSnapshot, tab: ExportTab) -> ExportTable {
    let rows = match tab {
        ExportTab::Overview => overview_rows(snapshot),
        ExportTab::Campaigns => snapshot
            .per_campaign
            .iter()
            .map(|c| {
                vec![
                    c.name.clone(),
                    c.status.to_string(),
                    c.creators.to_string(),
                    c.responded.to_string(),
                    c.agreed.to_string(),
                    c.emails_sent.to_string(),
                    c.open_rate.to_string(),
                ]
            })
            .collect(),
        ExportTab::Creators => snapshot
            .all_creators
            .iter()
            .map(|c| {
                vec![
                    c.name.clone(),
                    c.email.clone(),
                    c.platform.clone().unwrap_or_default(),
                    c.campaign_name.clone(),
                    c.status.to_string(),
                    optional_cell(c.response_time_hours),
                    optional_cell(c.fee_gbp),
                ]
            })
            .collect(),
        ExportTab::Email => snapshot
            .email_breakdown
            .iter()
            .map(|e| {
                vec![
                    e.campaign_name.clone(),
                    e.sent.to_string(),
                    e.delivered.to_string(),
                    e.opened.to_string(),
                    e.clicked.to_string(),
                    e.bounced.to_string(),
                ]
            })
            .collect(),
        ExportTab::Funnel => EngagementStatus::FUNNEL
            .iter()
            .map(|status| {
                vec![
                    stage_label(*status),
                    stage_count(&snapshot.engagement_funnel, *status).to_string(),
                ]
            })
            .collect(),
        ExportTab::Content => snapshot
            .content_performance
            .per_campaign
            .iter()
            .map(|c| {
                vec![
                    c.campaign_name.clone(),
                    c.posts_live.to_string(),
                    c.likes.to_string(),
                    c.comments.to_string(),
                    c.shares.to_string(),
                    c.saves.to_string(),
                    c.compliance_score.to_string(),
                    c.compliance_issues.to_string(),
                ]
            })
            .collect(),
    };

    ExportTable {
        headers: tab.headers().iter().map(|h| h.to_string()).collect(),
        rows,
    }
}

fn overview_rows(s: &AnalyticsSnapshot) -> Vec<Vec<String>> {
    let fields: [(&str, String); 12] = [
        ("Total Campaigns", s.total_campaigns.to_string()),
        ("Creators Contacted", s.total_creators_contacted.to_string()),
        ("Agreed", s.total_agreed.to_string()),
        ("Declined", s.total_declined.to_string()),
        ("Response Rate (%)", s.response_rate.to_string()),
        ("Conversion Rate (%)", s.conversion_rate.to_string()),
        ("Emails Sent", s.email_stats.total_sent.to_string()),
        ("Delivery Rate (%)", s.email_stats.delivery_rate.to_string()),
        ("Open Rate (%)", s.email_stats.open_rate.to_string()),
        ("Click Rate (%)", s.email_stats.click_rate.to_string()),
        (
            "Active Negotiations",
            s.negotiation_stats.active_negotiations.to_string(),
        ),
        (
            "Avg Response Time (hours)",
            s.negotiation_stats.avg_response_time_hours.to_string(),
        ),
    ];
    fields
        .into_iter()
        .map(|(label, value)| vec![label.to_string(), value])
        .collect()
}

fn stage_label(status: EngagementStatus) -> String {
    crate::funnel::capitalize(status.as_str())
}

fn optional_cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

// ─── Serializers ────────────────────────────────────────────────────────────

/// Quote a CSV field unconditionally, doubling embedded quotes.
pub fn quote_field(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Serialize a table as CSV with every field quoted.
pub fn to_csv(table: &ExportTable, line_ending: LineEnding) -> String {
    std::iter::once(&table.headers)
        .chain(table.rows.iter())
        .map(|row| {
            row.iter()
                .map(|cell| quote_field(cell))
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join(line_ending.as_str())
}

/// Serialize a table as an array of `{header: cell}` objects.
pub fn to_json(table: &ExportTable) -> HudeyResult<String> {
    let records: Vec<serde_json::Map<String, serde_json::Value>> = table
        .rows
        .iter()
        .map(|row| {
            table
                .headers
                .iter()
                .zip(row.iter())
                .map(|(h, cell)| (h.clone(), serde_json::Value::String(cell.clone())))
                .collect()
        })
        .collect();
    Ok(serde_json::to_string_pretty(&records)?)
}

/// `analytics-<tab>-<YYYY-MM-DD>.<ext>`
pub fn export_filename(tab: ExportTab, format: ExportFormat, date: NaiveDate) -> String {
    format!(
        "analytics-{}-{}.{}",
        tab,
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

/// Render one tab and write it under `dir`. Returns the written path.
pub fn write_export(
    dir: &Path,
    snapshot: &AnalyticsSnapshot,
    tab: ExportTab,
    format: ExportFormat,
    line_ending: LineEnding,
    date: NaiveDate,
) -> HudeyResult<PathBuf> {
    let table = build_table(snapshot, tab);
    let body = match format {
        ExportFormat::Csv => to_csv(&table, line_ending),
        ExportFormat::Json => to_json(&table)?,
    };

    std::fs::create_dir_all(dir)?;
    let path = dir.join(export_filename(tab, format, date));
    std::fs::write(&path, body.as_bytes())?;

    info!(
        tab = %tab,
        rows = table.rows.len(),
        path = %path.display(),
        "Analytics export written"
    );
    Ok(path)
}

// ─── Tests ──────────────────────────────────────────────────────────────────
