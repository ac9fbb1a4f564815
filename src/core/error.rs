#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("return table must contain at least one year")]
    Empty,

    #[error("return table years must be strictly ascending: {previous} followed by {next}")]
    NotAscending { previous: i32, next: i32 },

    #[error("return table has a non-finite return in {year}")]
    NonFiniteReturn { year: i32 },

    #[error("return table has a loss below -100% in {year}")]
    LossBeyondTotal { year: i32 },

    #[error("failed to read return table {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("return table CSV line {line}: {reason}")]
    Parse { line: u64, reason: String },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("growth weight must be between 0 and 100, got {0}")]
    GrowthWeightOutOfRange(u32),

    #[error("initial capital must be > 0, got {0}")]
    NonPositiveCapital(f64),

    #[error("horizon years must be > 0")]
    ZeroHorizon,

    #[error("{name} must be a finite value >= 0, got {value}")]
    NegativeYield { name: &'static str, value: f64 },

    #[error("{name} must be between 0 and 100, got {value}")]
    RateOutOfRange { name: &'static str, value: f64 },
}
