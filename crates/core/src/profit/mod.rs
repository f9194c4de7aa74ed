//! Profit module - landed cost, forward margin and reverse required price.

mod profit_calculator;
mod profit_model;

pub use profit_calculator::{solve_price, ProfitCalculator};
pub use profit_model::{CostInputs, ProfitBreakdown, RequiredPrice};
