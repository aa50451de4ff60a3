//! Static company metadata. Pure configuration: the metrics engine takes this
//! as an injected lookup and never computes anything from it.

use crate::models::CompanyTicker;
use serde::Serialize;

/// Presentational metadata for one tracked company.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Company {
    pub ticker: CompanyTicker,
    pub name: &'static str,
    pub display_name: &'static str,
    pub color: &'static str,
}

/// Canonical display order for the tracked universe.
pub const COMPANY_ORDER: [CompanyTicker; 7] = [
    CompanyTicker::Aapl,
    CompanyTicker::Meta,
    CompanyTicker::Msft,
    CompanyTicker::Goog,
    CompanyTicker::Amzn,
    CompanyTicker::Nvda,
    CompanyTicker::Tsla,
];

const COMPANIES: [Company; 7] = [
    Company {
        ticker: CompanyTicker::Aapl,
        name: "Apple Inc.",
        display_name: "Apple",
        color: "#A2AAAD",
    },
    Company {
        ticker: CompanyTicker::Meta,
        name: "Meta Platforms, Inc.",
        display_name: "Meta",
        color: "#0081FB",
    },
    Company {
        ticker: CompanyTicker::Msft,
        name: "Microsoft Corporation",
        display_name: "Microsoft",
        color: "#00A4EF",
    },
    Company {
        ticker: CompanyTicker::Goog,
        name: "Alphabet Inc.",
        display_name: "Google",
        color: "#4285F4",
    },
    Company {
        ticker: CompanyTicker::Amzn,
        name: "Amazon.com, Inc.",
        display_name: "Amazon",
        color: "#FF9900",
    },
    Company {
        ticker: CompanyTicker::Nvda,
        name: "NVIDIA Corporation",
        display_name: "Nvidia",
        color: "#76B900",
    },
    Company {
        ticker: CompanyTicker::Tsla,
        name: "Tesla, Inc.",
        display_name: "Tesla",
        color: "#E82127",
    },
];

/// Injected lookup table handed to the metrics engine.
#[derive(Debug, Clone, Default)]
pub struct CompanyCatalog;

impl CompanyCatalog {
    pub const fn get(&self, ticker: CompanyTicker) -> &'static Company {
        let idx = match ticker {
            CompanyTicker::Aapl => 0,
            CompanyTicker::Meta => 1,
            CompanyTicker::Msft => 2,
            CompanyTicker::Goog => 3,
            CompanyTicker::Amzn => 4,
            CompanyTicker::Nvda => 5,
            CompanyTicker::Tsla => 6,
        };
        &COMPANIES[idx]
    }

    pub fn all(&self) -> impl Iterator<Item = &'static Company> {
        COMPANY_ORDER.iter().map(|t| self.get(*t))
    }
}
