//! Value normalizers for messy spreadsheet input: quarter labels in several
//! textual shapes, currency strings with symbols and separators, and free-form
//! ticker/company names. All functions are pure and return `Option` — bad
//! input is a filterable `None`, never a panic.

use crate::models::CompanyTicker;
use std::cmp::Ordering;

// ── Quarter labels ────────────────────────────────────────────────────────────

/// Numeric view of a canonical quarter label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuarterParts {
    pub year: i32,
    pub quarter: u8,
}

/// Normalize a quarter string to the canonical `"Q<1-4> <yyyy>"` form.
///
/// Accepted shapes (case-insensitive, interior whitespace tolerated):
/// `Q1 2024` / `Q1'24`, `1Q2024` / `1Q 24`, `2024Q1` / `24 Q1`, `2024-Q1`.
/// Two-digit years are expanded by prefixing "20" — no century disambiguation,
/// so "99" becomes 2099.
pub fn normalize_quarter(input: &str) -> Option<String> {
    let s = input.trim();
    shape_q_year(s)
        .or_else(|| shape_dq_year(s))
        .or_else(|| shape_year_q(s))
        .map(|(quarter, year)| format!("Q{quarter} {year}"))
}

/// `Q<d> <yy|yyyy>`, optionally with an apostrophe before a short year.
fn shape_q_year(s: &str) -> Option<(u8, String)> {
    let rest = s.strip_prefix(['Q', 'q'])?;
    let (quarter, rest) = take_quarter_digit(rest)?;
    let rest = rest.trim_start();
    let rest = rest.strip_prefix(['\'', '"']).unwrap_or(rest);
    Some((quarter, expand_year(rest)?))
}

/// `<d>Q <yy|yyyy>`.
fn shape_dq_year(s: &str) -> Option<(u8, String)> {
    let (quarter, rest) = take_quarter_digit(s)?;
    let rest = rest.strip_prefix(['Q', 'q'])?;
    Some((quarter, expand_year(rest.trim_start())?))
}

/// `<yy|yyyy>Q<d>` and `<yy|yyyy>-Q<d>`.
fn shape_year_q(s: &str) -> Option<(u8, String)> {
    let digits_end = s
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len());
    let (year, rest) = s.split_at(digits_end);
    let year = expand_year(year)?;

    let rest = match rest.strip_prefix('-') {
        Some(r) => r,
        None => rest.trim_start(),
    };
    let rest = rest.strip_prefix(['Q', 'q'])?;
    let (quarter, rest) = take_quarter_digit(rest)?;
    if !rest.is_empty() {
        return None;
    }
    Some((quarter, year))
}

fn take_quarter_digit(s: &str) -> Option<(u8, &str)> {
    let mut chars = s.chars();
    let d = chars.next()?.to_digit(10)?;
    if !(1..=4).contains(&d) {
        return None;
    }
    Some((d as u8, chars.as_str()))
}

/// Exactly 2–4 digits; short years get the "20" prefix.
fn expand_year(s: &str) -> Option<String> {
    if !(2..=4).contains(&s.len()) || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if s.len() == 2 {
        Some(format!("20{s}"))
    } else {
        Some(s.to_string())
    }
}

/// Re-derive numeric year/quarter from a label, normalizing first when the
/// input is not already canonical.
pub fn parse_quarter(label: &str) -> Option<QuarterParts> {
    let normalized = normalize_quarter(label);
    let canonical = normalized.as_deref().unwrap_or(label);
    find_canonical(canonical)
}

/// Scan for the canonical `Q<d> <yyyy>` shape anywhere in the string.
fn find_canonical(s: &str) -> Option<QuarterParts> {
    for (i, _) in s.match_indices('Q') {
        let rest = &s[i + 1..];
        let mut chars = rest.chars();
        let Some(quarter) = chars.next().and_then(|c| c.to_digit(10)) else {
            continue;
        };
        let rest = chars.as_str();
        let trimmed = rest.trim_start();
        if trimmed.len() == rest.len() {
            // Needs at least one separating whitespace character.
            continue;
        }
        let digits: Vec<u8> = trimmed
            .bytes()
            .take_while(|b| b.is_ascii_digit())
            .collect();
        if digits.len() < 4 {
            continue;
        }
        let year = digits[..4]
            .iter()
            .fold(0i32, |acc, b| acc * 10 + i32::from(b - b'0'));
        return Some(QuarterParts {
            year,
            quarter: quarter as u8,
        });
    }
    None
}

/// Total order by (year, quarter number). An unparseable side degrades to
/// `Ordering::Equal` — a non-distinguishing comparison, never an error. This
/// can silently misorder garbage labels; callers must tolerate it.
pub fn compare_quarters(a: &str, b: &str) -> Ordering {
    match (parse_quarter(a), parse_quarter(b)) {
        (Some(pa), Some(pb)) => pa
            .year
            .cmp(&pb.year)
            .then(pa.quarter.cmp(&pb.quarter)),
        _ => Ordering::Equal,
    }
}

// ── Currency / numbers ────────────────────────────────────────────────────────

/// Parse a number out of a currency-ish string: strips `$`/`€`/`£`, commas and
/// whitespace, drops any other non-digit/dot/minus character, then parses the
/// remainder as a float. Empty or unparseable input is `None`.
pub fn parse_number(input: &str) -> Option<f64> {
    let cleaned: String = input
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}

/// `parse_number`, then scale raw-unit values down to billions.
///
/// Heuristic: magnitudes above 1000 are assumed to be raw units and divided by
/// 1e9; anything else is assumed to already be in billions. This cannot tell a
/// small-company value legitimately over 1000 raw units from a big-company
/// value already over 1000B. Known limitation, kept as-is.
pub fn parse_billions(input: &str) -> Option<f64> {
    let num = parse_number(input)?;
    if num.abs() > 1000.0 {
        Some(num / 1_000_000_000.0)
    } else {
        Some(num)
    }
}

/// Strip a `%` sign and parse as float.
pub fn parse_percentage(input: &str) -> Option<f64> {
    let cleaned = input.replace('%', "");
    cleaned.trim().parse().ok()
}

// ── Tickers ───────────────────────────────────────────────────────────────────

/// Resolve free-form input (ticker code or common company name) to a canonical
/// ticker. Uppercases, strips every non-letter, then consults a fixed synonym
/// table; GOOGL folds into GOOG. Unrecognized input is `None`.
pub fn normalize_ticker(input: &str) -> Option<CompanyTicker> {
    let cleaned: String = input
        .chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_uppercase())
        .collect();

    let ticker = match cleaned.as_str() {
        "AAPL" | "APPLE" => CompanyTicker::Aapl,
        "META" | "FACEBOOK" => CompanyTicker::Meta,
        "MSFT" | "MICROSOFT" => CompanyTicker::Msft,
        "GOOG" | "GOOGL" | "GOOGLE" | "ALPHABET" => CompanyTicker::Goog,
        "AMZN" | "AMAZON" => CompanyTicker::Amzn,
        "NVDA" | "NVIDIA" => CompanyTicker::Nvda,
        "TSLA" | "TESLA" => CompanyTicker::Tsla,
        _ => return None,
    };
    Some(ticker)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
