//! Valuation model selection and intrinsic value.
//!
//! This is a hand-authored heuristic, not a forecast model: a fixed
//! industry keyword table routes capital-intensive, balance-sheet
//! driven sectors to a price-to-book multiple and everything else to
//! trailing earnings.

use dashboard_core::{CompanyProfile, ValuationModel};

/// Industries priced off the balance sheet. Matched case-sensitively
/// as substrings of the provider's industry string.
pub const BOOK_VALUE_INDUSTRIES: [&str; 5] =
    ["Bank", "Insurance", "Shipping", "Steel", "Basic Materials"];

/// Assumed fair price-to-book multiple for those sectors
pub const FAIR_PRICE_TO_BOOK: f64 = 1.3;

/// Fallback trailing P/E when the provider reports none
pub const DEFAULT_TRAILING_PE: f64 = 15.0;

pub fn model_for_industry(industry: Option<&str>) -> ValuationModel {
    let industry = industry.unwrap_or("");
    if BOOK_VALUE_INDUSTRIES.iter().any(|kw| industry.contains(kw)) {
        ValuationModel::PriceToBook
    } else {
        ValuationModel::PriceToEarnings
    }
}

/// Intrinsic value under the selected model. None when the model's
/// driving field is missing upstream; a fabricated 0.00 would read as
/// a real estimate.
pub fn intrinsic_value(model: ValuationModel, profile: &CompanyProfile) -> Option<f64> {
    match model {
        ValuationModel::PriceToBook => profile.book_value.map(|bv| bv * FAIR_PRICE_TO_BOOK),
        ValuationModel::PriceToEarnings => profile
            .trailing_eps
            .map(|eps| eps * profile.trailing_pe.unwrap_or(DEFAULT_TRAILING_PE)),
    }
}
