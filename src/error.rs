use thiserror::Error;

/// Terminal parse failures. Row-level problems (bad ticker, bad quarter,
/// unresolvable required header) never surface here — those rows are dropped
/// silently by the row mapper.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Fewer than two non-blank lines: no header/data to work with.
    #[error("tabular input has no data rows")]
    NoDataRows,

    /// The visualization response body did not carry the expected JSONP
    /// envelope or table payload.
    #[error("unrecognized table response: {0}")]
    BadResponseShape(String),
}
