use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ── Company ticker ────────────────────────────────────────────────────────────

/// Closed set of tracked symbols. Only ever constructed through
/// `normalize::normalize_ticker` when coming from free-form input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CompanyTicker {
    Aapl,
    Meta,
    Msft,
    Goog,
    Amzn,
    Nvda,
    Tsla,
}

impl CompanyTicker {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Aapl => "AAPL",
            Self::Meta => "META",
            Self::Msft => "MSFT",
            Self::Goog => "GOOG",
            Self::Amzn => "AMZN",
            Self::Nvda => "NVDA",
            Self::Tsla => "TSLA",
        }
    }
}

impl fmt::Display for CompanyTicker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Quarterly record ──────────────────────────────────────────────────────────

/// One reported quarter for one company. `quarter` is always the canonical
/// label form `"Q<1-4> <yyyy>"`; revenue and net income are billions USD,
/// gross margin is a percentage. Immutable once constructed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuarterlyRecord {
    pub quarter: String,
    pub year: i32,
    pub quarter_number: u8,
    pub revenue: f64,
    pub net_income: f64,
    pub gross_margin: f64,
}

/// The canonical per-company time series. Records are kept sorted ascending
/// by (year, quarter_number) by the parser; derived views re-sort descending
/// locally and never mutate this.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompanySeries {
    pub ticker: CompanyTicker,
    pub records: Vec<QuarterlyRecord>,
}

// ── Snapshot ──────────────────────────────────────────────────────────────────

/// Where a snapshot's rows came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnapshotOrigin {
    /// Spreadsheet CSV export endpoint.
    CsvExport,
    /// Google Visualization API (gviz) endpoint.
    VisualizationApi,
    /// Embedded seed dataset (all live strategies failed, or offline mode).
    Seed,
}

impl fmt::Display for SnapshotOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::CsvExport => "csv-export",
            Self::VisualizationApi => "visualization-api",
            Self::Seed => "seed",
        };
        f.write_str(s)
    }
}

/// A fully parsed in-memory dataset. Consumers treat a snapshot as immutable
/// and replace it wholesale on the next successful fetch.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub series: Vec<CompanySeries>,
    pub origin: SnapshotOrigin,
    pub fetched_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(series: Vec<CompanySeries>, origin: SnapshotOrigin) -> Self {
        Self {
            series,
            origin,
            fetched_at: Utc::now(),
        }
    }
}

// ── Visualization API wire types ──────────────────────────────────────────────

/// Envelope of a gviz `tq` response after the JSONP wrapper is stripped.
#[derive(Debug, Clone, Deserialize)]
pub struct GvizResponse {
    pub table: GvizTable,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GvizTable {
    pub cols: Vec<GvizColumn>,
    pub rows: Vec<GvizRow>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GvizColumn {
    #[serde(default)]
    pub label: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GvizRow {
    pub c: Vec<Option<GvizCell>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GvizCell {
    #[serde(default)]
    pub v: Option<CellValue>,
}

/// A nullable typed cell value as gviz serialises it.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Bool(bool),
    Text(String),
}

impl CellValue {
    /// Coerce to text the way the row mapper expects; callers map a missing
    /// cell to the empty string.
    pub fn to_text(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}
