//! External fetch boundary for the published spreadsheet.
//!
//! Two strategies are tried in order: the CSV export endpoint (works for
//! sheets published to the web) and the Google Visualization API (works for
//! public sheets, returns a JSONP-wrapped table). The parser core knows
//! nothing about this layer; it only ever sees a row set or a failure.

pub mod cache;
pub mod http_client;

use crate::config::{ClientConfig, SheetsConfig};
use crate::error::ParseError;
use crate::models::{CompanySeries, GvizResponse, SnapshotOrigin};
use crate::parser::{parse_delimited, parse_table};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tracing::{info, warn};
use url::Url;

use self::http_client::HttpClient;

// ── Source trait ──────────────────────────────────────────────────────────────

/// Swappable data source abstraction.
#[async_trait]
pub trait FinancialDataSource: Send + Sync {
    async fn fetch_series(&self) -> Result<(SnapshotOrigin, Vec<CompanySeries>)>;
}

// ── Google Sheets source ──────────────────────────────────────────────────────

pub struct SheetsSource {
    client: HttpClient,
    sheets: SheetsConfig,
}

impl SheetsSource {
    pub fn new(sheets: &SheetsConfig, client: &ClientConfig) -> Result<Self> {
        Ok(Self {
            client: HttpClient::new(client)?,
            sheets: sheets.clone(),
        })
    }

    fn csv_url(&self) -> Result<Url> {
        let mut url = Url::parse(&format!(
            "{}/{}/export",
            self.sheets.base_url.trim_end_matches('/'),
            self.sheets.spreadsheet_id
        ))?;
        url.query_pairs_mut()
            .append_pair("format", "csv")
            .append_pair("gid", &self.sheets.data_gid);
        Ok(url)
    }

    fn gviz_url(&self) -> Result<Url> {
        let mut url = Url::parse(&format!(
            "{}/{}/gviz/tq",
            self.sheets.base_url.trim_end_matches('/'),
            self.sheets.spreadsheet_id
        ))?;
        url.query_pairs_mut()
            .append_pair("tqx", "out:json")
            .append_pair("gid", &self.sheets.data_gid);
        Ok(url)
    }

    async fn fetch_csv_export(&self) -> Result<Vec<CompanySeries>> {
        let url = self.csv_url()?;
        let body = self
            .client
            .get_text(url.as_str(), Some("text/csv"))
            .await
            .context("CSV export fetch failed")?;
        let series = parse_delimited(&body)?;
        if series.is_empty() {
            bail!("CSV export yielded no recognizable companies");
        }
        Ok(series)
    }

    async fn fetch_visualization(&self) -> Result<Vec<CompanySeries>> {
        let url = self.gviz_url()?;
        let body = self
            .client
            .get_text(url.as_str(), None)
            .await
            .context("Visualization API fetch failed")?;

        let payload = strip_jsonp(&body)?;
        let response: GvizResponse =
            serde_json::from_str(payload).context("Visualization API payload")?;

        let series = parse_table(&response.table);
        if series.is_empty() {
            bail!("Visualization API yielded no recognizable companies");
        }
        Ok(series)
    }
}

#[async_trait]
impl FinancialDataSource for SheetsSource {
    async fn fetch_series(&self) -> Result<(SnapshotOrigin, Vec<CompanySeries>)> {
        match self.fetch_csv_export().await {
            Ok(series) => {
                info!("Fetched {} companies via CSV export", series.len());
                return Ok((SnapshotOrigin::CsvExport, series));
            }
            Err(e) => warn!("CSV export strategy failed: {:#}", e),
        }

        match self.fetch_visualization().await {
            Ok(series) => {
                info!("Fetched {} companies via Visualization API", series.len());
                Ok((SnapshotOrigin::VisualizationApi, series))
            }
            Err(e) => {
                warn!("Visualization API strategy failed: {:#}", e);
                bail!("All fetch strategies failed")
            }
        }
    }
}

/// Unwrap the `google.visualization.Query.setResponse(...)` JSONP envelope.
fn strip_jsonp(body: &str) -> Result<&str, ParseError> {
    const MARKER: &str = "google.visualization.Query.setResponse(";

    let start = body
        .find(MARKER)
        .ok_or_else(|| ParseError::BadResponseShape("missing setResponse envelope".into()))?
        + MARKER.len();
    let rest = &body[start..];
    let end = rest
        .rfind(')')
        .ok_or_else(|| ParseError::BadResponseShape("unterminated setResponse envelope".into()))?;
    Ok(&rest[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CompanyTicker;

    const GVIZ_BODY: &str = concat!(
        "/*O_o*/\ngoogle.visualization.Query.setResponse(",
        r#"{"table":{"cols":[{"label":"Ticker"},{"label":"Quarter"},{"label":"Revenue"}],"#,
        r#""rows":[{"c":[{"v":"AAPL"},{"v":"Q1 2024"},{"v":119.58}]},"#,
        r#"{"c":[{"v":"Nonsense"},{"v":"Q1 2024"},{"v":1}]}]}}"#,
        ");"
    );

    #[test]
    fn test_strip_jsonp() {
        let payload = strip_jsonp(GVIZ_BODY).unwrap();
        assert!(payload.starts_with("{\"table\""));
        assert!(payload.ends_with("}}"));
        assert!(strip_jsonp("<html>error</html>").is_err());
    }

    #[test]
    fn test_gviz_round_trip() {
        let payload = strip_jsonp(GVIZ_BODY).unwrap();
        let response: GvizResponse = serde_json::from_str(payload).unwrap();
        let series = parse_table(&response.table);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].ticker, CompanyTicker::Aapl);
        assert_eq!(series[0].records[0].revenue, 119.58);
    }

    #[test]
    fn test_urls() {
        let source = SheetsSource::new(
            &crate::config::AppConfig::default().sheets,
            &crate::config::AppConfig::default().client,
        )
        .unwrap();

        let csv = source.csv_url().unwrap();
        assert!(csv.as_str().contains("/export?format=csv&gid="));
        let gviz = source.gviz_url().unwrap();
        assert!(gviz.as_str().contains("/gviz/tq?"));
        assert!(gviz.as_str().contains("out%3Ajson"));
    }
}
