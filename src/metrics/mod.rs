//! Derived metrics over canonical company series: current-period revenue,
//! trailing-twelve-month aggregates, year-over-year growth, leaderboards and
//! the multi-year chart matrix.
//!
//! Every view works on a caller-supplied ticker selection and re-sorts each
//! series descending (most recent first) locally; the canonical ascending
//! series is never mutated. Pure functions over an immutable snapshot — safe
//! to call repeatedly or memoize.

use crate::companies::{Company, CompanyCatalog};
use crate::models::{CompanySeries, CompanyTicker, QuarterlyRecord};
use crate::normalize::compare_quarters;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

// ── View types ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct CurrentRevenue {
    pub ticker: CompanyTicker,
    pub company: &'static Company,
    pub quarter: String,
    pub revenue: f64,
    pub absolute_change: f64,
    pub percentage_change: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TtmSummary {
    pub ticker: CompanyTicker,
    pub company: &'static Company,
    pub ttm_revenue: f64,
    pub ttm_net_income: f64,
    pub latest_quarter: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuarterGrowth {
    pub quarter: String,
    pub growth: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct YoyGrowth {
    pub ticker: CompanyTicker,
    pub company: &'static Company,
    pub quarters: Vec<QuarterGrowth>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GrossMarginView {
    pub ticker: CompanyTicker,
    pub company: &'static Company,
    pub gross_margin: f64,
    pub quarter: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NetIncomeTtm {
    pub ticker: CompanyTicker,
    pub company: &'static Company,
    pub net_income: f64,
    pub latest_quarter: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaderEntry {
    pub ticker: CompanyTicker,
    pub company: &'static Company,
    pub growth: f64,
    pub quarter: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PerformanceLeaders {
    pub best: Option<LeaderEntry>,
    pub worst: Option<LeaderEntry>,
    pub average: f64,
}

/// One chart row: a quarter plus every selected company's revenue for it.
/// Companies with no record for the quarter report 0, not an omitted key.
#[derive(Debug, Clone, Serialize)]
pub struct ChartRow {
    pub quarter: String,
    pub revenue: BTreeMap<CompanyTicker, f64>,
}

// ── Engine ────────────────────────────────────────────────────────────────────

pub struct MetricsEngine<'a> {
    catalog: &'a CompanyCatalog,
}

impl<'a> MetricsEngine<'a> {
    pub const fn new(catalog: &'a CompanyCatalog) -> Self {
        Self { catalog }
    }

    fn selected<'s>(
        &self,
        data: &'s [CompanySeries],
        selection: &[CompanyTicker],
    ) -> Vec<&'s CompanySeries> {
        data.iter()
            .filter(|s| selection.contains(&s.ticker))
            .collect()
    }

    /// Descending chronological view of one series (most recent first).
    fn sorted_desc(series: &CompanySeries) -> Vec<&QuarterlyRecord> {
        let mut records: Vec<&QuarterlyRecord> = series.records.iter().collect();
        records.sort_by(|a, b| compare_quarters(&b.quarter, &a.quarter));
        records
    }

    /// Most recent quarter label anywhere in the snapshot.
    pub fn latest_quarter(&self, data: &[CompanySeries]) -> Option<String> {
        let mut latest: Option<&str> = None;
        for series in data {
            for record in &series.records {
                match latest {
                    Some(l) if compare_quarters(&record.quarter, l) != Ordering::Greater => {}
                    _ => latest = Some(&record.quarter),
                }
            }
        }
        latest.map(str::to_string)
    }

    /// Latest quarter's revenue with deltas against the immediately preceding
    /// quarter. With no preceding record both deltas are 0; a zero previous
    /// revenue pins the percentage to 0 while the absolute delta is still the
    /// raw difference.
    pub fn current_revenue(
        &self,
        data: &[CompanySeries],
        selection: &[CompanyTicker],
    ) -> Vec<CurrentRevenue> {
        self.selected(data, selection)
            .into_iter()
            .map(|series| {
                let sorted = Self::sorted_desc(series);
                let latest = sorted.first().copied();
                let previous = sorted.get(1).copied();

                let latest_revenue = latest.map_or(0.0, |r| r.revenue);
                let (absolute_change, percentage_change) = match previous {
                    Some(prev) if prev.revenue != 0.0 => (
                        latest_revenue - prev.revenue,
                        (latest_revenue - prev.revenue) / prev.revenue * 100.0,
                    ),
                    Some(prev) => (latest_revenue - prev.revenue, 0.0),
                    None => (0.0, 0.0),
                };

                CurrentRevenue {
                    ticker: series.ticker,
                    company: self.catalog.get(series.ticker),
                    quarter: latest.map_or_else(String::new, |r| r.quarter.clone()),
                    revenue: latest_revenue,
                    absolute_change,
                    percentage_change,
                }
            })
            .collect()
    }

    /// Trailing twelve months: sums over the most recent up-to-4 quarters,
    /// contiguous or not, anchored at the latest quarter label.
    pub fn ttm(&self, data: &[CompanySeries], selection: &[CompanyTicker]) -> Vec<TtmSummary> {
        self.selected(data, selection)
            .into_iter()
            .map(|series| {
                let sorted = Self::sorted_desc(series);
                let window = &sorted[..sorted.len().min(4)];

                TtmSummary {
                    ticker: series.ticker,
                    company: self.catalog.get(series.ticker),
                    ttm_revenue: window.iter().map(|r| r.revenue).sum(),
                    ttm_net_income: window.iter().map(|r| r.net_income).sum(),
                    latest_quarter: window
                        .first()
                        .map_or_else(String::new, |r| r.quarter.clone()),
                }
            })
            .collect()
    }

    /// Year-over-year revenue growth for up to the 4 most recent quarters.
    /// The prior-year match is searched across the whole series; a missing
    /// match or zero prior revenue contributes no entry at all.
    pub fn yoy_growth(
        &self,
        data: &[CompanySeries],
        selection: &[CompanyTicker],
    ) -> Vec<YoyGrowth> {
        self.selected(data, selection)
            .into_iter()
            .map(|series| {
                let sorted = Self::sorted_desc(series);
                let mut quarters = Vec::new();

                for current in sorted.iter().take(4) {
                    let prior = sorted.iter().find(|r| {
                        r.year == current.year - 1 && r.quarter_number == current.quarter_number
                    });
                    if let Some(prior) = prior {
                        if prior.revenue != 0.0 {
                            quarters.push(QuarterGrowth {
                                quarter: current.quarter.clone(),
                                growth: (current.revenue - prior.revenue) / prior.revenue * 100.0,
                            });
                        }
                    }
                }

                YoyGrowth {
                    ticker: series.ticker,
                    company: self.catalog.get(series.ticker),
                    quarters,
                }
            })
            .collect()
    }

    /// Latest reported gross margin, verbatim.
    pub fn gross_margin(
        &self,
        data: &[CompanySeries],
        selection: &[CompanyTicker],
    ) -> Vec<GrossMarginView> {
        self.selected(data, selection)
            .into_iter()
            .map(|series| {
                let sorted = Self::sorted_desc(series);
                let latest = sorted.first();
                GrossMarginView {
                    ticker: series.ticker,
                    company: self.catalog.get(series.ticker),
                    gross_margin: latest.map_or(0.0, |r| r.gross_margin),
                    quarter: latest.map_or_else(String::new, |r| r.quarter.clone()),
                }
            })
            .collect()
    }

    /// Companies ranked by TTM net income, descending. The sort is stable:
    /// ties keep the input's relative order.
    pub fn net_income_ttm_ranking(
        &self,
        data: &[CompanySeries],
        selection: &[CompanyTicker],
    ) -> Vec<NetIncomeTtm> {
        let mut ranked: Vec<NetIncomeTtm> = self
            .ttm(data, selection)
            .into_iter()
            .map(|t| NetIncomeTtm {
                ticker: t.ticker,
                company: t.company,
                net_income: t.ttm_net_income,
                latest_quarter: t.latest_quarter,
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.net_income
                .partial_cmp(&a.net_income)
                .unwrap_or(Ordering::Equal)
        });
        ranked
    }

    /// Best/worst/average of each company's most recent valid YoY figure.
    /// Companies with no valid figure are excluded entirely; with zero
    /// qualifiers the sentinel `{None, None, 0.0}` comes back.
    pub fn performance_leaders(
        &self,
        data: &[CompanySeries],
        selection: &[CompanyTicker],
    ) -> PerformanceLeaders {
        let mut entries: Vec<LeaderEntry> = self
            .yoy_growth(data, selection)
            .into_iter()
            .filter_map(|company| {
                company.quarters.first().map(|latest| LeaderEntry {
                    ticker: company.ticker,
                    company: company.company,
                    growth: latest.growth,
                    quarter: latest.quarter.clone(),
                })
            })
            .collect();

        if entries.is_empty() {
            return PerformanceLeaders {
                best: None,
                worst: None,
                average: 0.0,
            };
        }

        let average = entries.iter().map(|e| e.growth).sum::<f64>() / entries.len() as f64;
        entries.sort_by(|a, b| b.growth.partial_cmp(&a.growth).unwrap_or(Ordering::Equal));

        PerformanceLeaders {
            worst: entries.last().cloned(),
            best: entries.into_iter().next(),
            average,
        }
    }

    /// Revenue matrix over the last three calendar years plus the current one:
    /// the union of quarter labels present across the selection, sorted by the
    /// quarter total order, with 0 filled in for missing data points.
    pub fn chart_series(
        &self,
        data: &[CompanySeries],
        selection: &[CompanyTicker],
        current_year: i32,
    ) -> Vec<ChartRow> {
        let filtered = self.selected(data, selection);
        let cutoff = current_year - 3;

        let mut quarters: Vec<String> = Vec::new();
        for series in &filtered {
            for record in &series.records {
                if record.year >= cutoff && !quarters.contains(&record.quarter) {
                    quarters.push(record.quarter.clone());
                }
            }
        }
        quarters.sort_by(|a, b| compare_quarters(a, b));

        quarters
            .into_iter()
            .map(|quarter| {
                let revenue = filtered
                    .iter()
                    .map(|series| {
                        let value = series
                            .records
                            .iter()
                            .find(|r| r.quarter == quarter)
                            .map_or(0.0, |r| r.revenue);
                        (series.ticker, value)
                    })
                    .collect();
                ChartRow { quarter, revenue }
            })
            .collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::parse_quarter;
    use crate::seed;

    fn rec(quarter: &str, revenue: f64, net_income: f64, gross_margin: f64) -> QuarterlyRecord {
        let parts = parse_quarter(quarter).unwrap();
        QuarterlyRecord {
            quarter: quarter.to_string(),
            year: parts.year,
            quarter_number: parts.quarter,
            revenue,
            net_income,
            gross_margin,
        }
    }

    fn series(ticker: CompanyTicker, records: Vec<QuarterlyRecord>) -> CompanySeries {
        CompanySeries { ticker, records }
    }

    const ALL: [CompanyTicker; 7] = crate::companies::COMPANY_ORDER;

    #[test]
    fn test_ttm_sums_four_most_recent_seed_quarters() {
        let catalog = CompanyCatalog;
        let engine = MetricsEngine::new(&catalog);
        let data = seed::seed_series().unwrap();

        let ttm = engine.ttm(&data, &[CompanyTicker::Aapl]);
        assert_eq!(ttm.len(), 1);
        // Q3 2024 + Q2 2024 + Q1 2024 + Q4 2023 from the seed dataset.
        let expected = 94.93 + 85.78 + 119.58 + 89.50;
        assert!((ttm[0].ttm_revenue - expected).abs() < 1e-9);
        assert_eq!(ttm[0].latest_quarter, "Q3 2024");
    }

    #[test]
    fn test_yoy_growth_against_seed() {
        let catalog = CompanyCatalog;
        let engine = MetricsEngine::new(&catalog);
        let data = seed::seed_series().unwrap();

        let yoy = engine.yoy_growth(&data, &[CompanyTicker::Aapl]);
        let quarters = &yoy[0].quarters;
        assert_eq!(quarters.len(), 4);
        assert_eq!(quarters[0].quarter, "Q3 2024");

        // Q1 2024 (119.58) vs Q1 2023 (117.15) ≈ +2.07%.
        let q1 = quarters.iter().find(|q| q.quarter == "Q1 2024").unwrap();
        assert!((q1.growth - 2.07).abs() < 0.01);
    }

    #[test]
    fn test_yoy_missing_prior_year_is_an_omission() {
        let catalog = CompanyCatalog;
        let engine = MetricsEngine::new(&catalog);
        let data = vec![series(
            CompanyTicker::Nvda,
            vec![rec("Q2 2024", 30.04, 16.60, 75.1), rec("Q3 2023", 18.12, 9.24, 74.0)],
        )];

        let yoy = engine.yoy_growth(&data, &ALL);
        // Neither quarter has a same-quarter prior year: no entries, not zeros.
        assert!(yoy[0].quarters.is_empty());
    }

    #[test]
    fn test_current_revenue_deltas() {
        let catalog = CompanyCatalog;
        let engine = MetricsEngine::new(&catalog);
        let data = vec![series(
            CompanyTicker::Msft,
            vec![rec("Q2 2024", 64.73, 22.04, 69.9), rec("Q3 2024", 65.59, 24.67, 69.4)],
        )];

        let current = engine.current_revenue(&data, &ALL);
        assert_eq!(current[0].quarter, "Q3 2024");
        assert!((current[0].absolute_change - 0.86).abs() < 1e-9);
        assert!((current[0].percentage_change - 0.86 / 64.73 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_current_revenue_single_record_and_zero_previous() {
        let catalog = CompanyCatalog;
        let engine = MetricsEngine::new(&catalog);

        let single = vec![series(CompanyTicker::Aapl, vec![rec("Q1 2024", 119.58, 33.92, 46.6)])];
        let view = engine.current_revenue(&single, &ALL);
        assert_eq!(view[0].absolute_change, 0.0);
        assert_eq!(view[0].percentage_change, 0.0);

        // Zero previous revenue: percentage pinned to 0, absolute still real.
        let zero_prev = vec![series(
            CompanyTicker::Aapl,
            vec![rec("Q4 2023", 0.0, 0.0, 0.0), rec("Q1 2024", 119.58, 33.92, 46.6)],
        )];
        let view = engine.current_revenue(&zero_prev, &ALL);
        assert_eq!(view[0].percentage_change, 0.0);
        assert!((view[0].absolute_change - 119.58).abs() < 1e-9);
    }

    #[test]
    fn test_gross_margin_latest_verbatim() {
        let catalog = CompanyCatalog;
        let engine = MetricsEngine::new(&catalog);
        let data = seed::seed_series().unwrap();

        let gm = engine.gross_margin(&data, &[CompanyTicker::Tsla]);
        assert_eq!(gm[0].quarter, "Q3 2024");
        assert_eq!(gm[0].gross_margin, 19.8);
    }

    #[test]
    fn test_net_income_ranking_is_stable_descending() {
        let catalog = CompanyCatalog;
        let engine = MetricsEngine::new(&catalog);
        let data = vec![
            series(CompanyTicker::Aapl, vec![rec("Q1 2024", 1.0, 5.0, 0.0)]),
            series(CompanyTicker::Meta, vec![rec("Q1 2024", 1.0, 9.0, 0.0)]),
            // Tied with AAPL: must stay behind it (input order preserved).
            series(CompanyTicker::Tsla, vec![rec("Q1 2024", 1.0, 5.0, 0.0)]),
        ];

        let ranked = engine.net_income_ttm_ranking(&data, &ALL);
        let order: Vec<CompanyTicker> = ranked.iter().map(|r| r.ticker).collect();
        assert_eq!(
            order,
            vec![CompanyTicker::Meta, CompanyTicker::Aapl, CompanyTicker::Tsla]
        );
    }

    #[test]
    fn test_performance_leaders() {
        let catalog = CompanyCatalog;
        let engine = MetricsEngine::new(&catalog);
        let data = seed::seed_series().unwrap();

        let leaders = engine.performance_leaders(&data, &ALL);
        let best = leaders.best.unwrap();
        let worst = leaders.worst.unwrap();
        // NVDA's Q3 2024 vs Q3 2023 is by far the strongest seed growth.
        assert_eq!(best.ticker, CompanyTicker::Nvda);
        assert!(best.growth > worst.growth);
    }

    #[test]
    fn test_performance_leaders_empty_selection_sentinel() {
        let catalog = CompanyCatalog;
        let engine = MetricsEngine::new(&catalog);
        let data = seed::seed_series().unwrap();

        let leaders = engine.performance_leaders(&data, &[]);
        assert!(leaders.best.is_none());
        assert!(leaders.worst.is_none());
        assert_eq!(leaders.average, 0.0);
    }

    #[test]
    fn test_chart_series_zero_fills_missing_quarters() {
        let catalog = CompanyCatalog;
        let engine = MetricsEngine::new(&catalog);
        let data = vec![
            series(
                CompanyTicker::Aapl,
                vec![rec("Q1 2024", 119.58, 0.0, 0.0), rec("Q2 2024", 85.78, 0.0, 0.0)],
            ),
            series(CompanyTicker::Meta, vec![rec("Q1 2024", 36.46, 0.0, 0.0)]),
            series(CompanyTicker::Tsla, vec![rec("Q2 2024", 25.50, 0.0, 0.0)]),
        ];

        let selection = [CompanyTicker::Aapl, CompanyTicker::Meta, CompanyTicker::Tsla];
        let rows = engine.chart_series(&data, &selection, 2024);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].quarter, "Q1 2024");

        // META has no Q2 2024: the key is present with 0, not omitted.
        let q2 = &rows[1];
        assert_eq!(q2.revenue[&CompanyTicker::Meta], 0.0);
        assert_eq!(q2.revenue[&CompanyTicker::Tsla], 25.50);
        assert_eq!(q2.revenue.len(), 3);
    }

    #[test]
    fn test_chart_series_window_excludes_old_years() {
        let catalog = CompanyCatalog;
        let engine = MetricsEngine::new(&catalog);
        let data = vec![series(
            CompanyTicker::Aapl,
            vec![rec("Q1 2020", 91.82, 0.0, 0.0), rec("Q1 2024", 119.58, 0.0, 0.0)],
        )];

        let rows = engine.chart_series(&data, &ALL, 2024);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].quarter, "Q1 2024");
    }

    #[test]
    fn test_latest_quarter_across_snapshot() {
        let catalog = CompanyCatalog;
        let engine = MetricsEngine::new(&catalog);
        let data = seed::seed_series().unwrap();
        assert_eq!(engine.latest_quarter(&data).as_deref(), Some("Q3 2024"));
        assert_eq!(engine.latest_quarter(&[]), None);
    }

    #[test]
    fn test_empty_selection_yields_empty_views() {
        let catalog = CompanyCatalog;
        let engine = MetricsEngine::new(&catalog);
        let data = seed::seed_series().unwrap();

        assert!(engine.current_revenue(&data, &[]).is_empty());
        assert!(engine.ttm(&data, &[]).is_empty());
        assert!(engine.yoy_growth(&data, &[]).is_empty());
        assert!(engine.chart_series(&data, &[], 2024).is_empty());
    }
}
