pub mod analyzer;
pub mod valuation;

pub use analyzer::*;
pub use valuation::*;
