mod engine;
mod error;
mod history;
mod types;

pub use engine::{
    blended_return, blended_yield_pct, compound_annual_growth_rate, project_future_value,
    simulate,
};
pub use error::{TableError, ValidationError};
pub use history::{load_csv, parse_csv, reference_table};
pub use types::{
    AnnualReturn, Assumptions, EquityPoint, GrowthWeight, InvestorProfile, ReturnTable,
    SimulationParameters, SimulationResult,
};
