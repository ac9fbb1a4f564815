use serde::Serialize;

use super::error::{TableError, ValidationError};

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnualReturn {
    pub year: i32,
    pub growth_return_pct: f64,
    pub income_return_pct: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReturnTable {
    years: Vec<AnnualReturn>,
}

impl ReturnTable {
    pub fn new(years: Vec<AnnualReturn>) -> Result<Self, TableError> {
        if years.is_empty() {
            return Err(TableError::Empty);
        }
        for row in &years {
            if !row.growth_return_pct.is_finite() || !row.income_return_pct.is_finite() {
                return Err(TableError::NonFiniteReturn { year: row.year });
            }
            if row.growth_return_pct < -100.0 || row.income_return_pct < -100.0 {
                return Err(TableError::LossBeyondTotal { year: row.year });
            }
        }
        for pair in years.windows(2) {
            if pair[1].year <= pair[0].year {
                return Err(TableError::NotAscending {
                    previous: pair[0].year,
                    next: pair[1].year,
                });
            }
        }
        Ok(Self { years })
    }

    pub fn years(&self) -> &[AnnualReturn] {
        &self.years
    }

    pub fn len(&self) -> usize {
        self.years.len()
    }

    // Always false once constructed; present for clippy::len_without_is_empty.
    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    pub fn first_year(&self) -> i32 {
        self.years[0].year
    }

    pub fn last_year(&self) -> i32 {
        self.years[self.years.len() - 1].year
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct GrowthWeight(u8);

impl GrowthWeight {
    pub fn new(pct: u32) -> Result<Self, ValidationError> {
        if pct > 100 {
            return Err(ValidationError::GrowthWeightOutOfRange(pct));
        }
        Ok(Self(pct as u8))
    }

    pub fn growth_pct(self) -> u32 {
        u32::from(self.0)
    }

    pub fn income_pct(self) -> u32 {
        100 - u32::from(self.0)
    }

    pub fn growth_fraction(self) -> f64 {
        f64::from(self.0) / 100.0
    }

    pub fn income_fraction(self) -> f64 {
        f64::from(100 - self.0) / 100.0
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SimulationParameters {
    pub growth_weight: GrowthWeight,
    pub initial_capital: f64,
    pub horizon_years: Option<u32>,
}

// Yields are percentages; the two rates are fractions.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Assumptions {
    pub growth_yield_pct: f64,
    pub income_yield_pct: f64,
    pub dividend_tax_rate: f64,
    pub savings_rate: f64,
}

impl Default for Assumptions {
    fn default() -> Self {
        Self {
            growth_yield_pct: 0.6,
            income_yield_pct: 3.4,
            dividend_tax_rate: 0.15,
            savings_rate: 0.035,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum InvestorProfile {
    AggressiveGrowth,
    AggressiveBalanced,
    NeutralBalanced,
    StableIncome,
}

impl InvestorProfile {
    pub fn classify(weight: GrowthWeight) -> Self {
        match weight.growth_pct() {
            80.. => InvestorProfile::AggressiveGrowth,
            60..=79 => InvestorProfile::AggressiveBalanced,
            40..=59 => InvestorProfile::NeutralBalanced,
            _ => InvestorProfile::StableIncome,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EquityPoint {
    pub year: i32,
    pub balance: f64,
    pub savings_balance: f64,
    // None on the anchor point before the first historical year.
    pub blended_return_pct: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub growth_weight_pct: u32,
    pub income_weight_pct: u32,
    pub initial_capital: f64,
    pub equity_curve: Vec<EquityPoint>,
    pub cagr: f64,
    pub max_drawdown_pct: f64,
    pub final_balance: f64,
    pub projected_future_value: Option<f64>,
    pub estimated_dividend_yield_pct: f64,
    pub estimated_monthly_income: f64,
    pub estimated_monthly_income_after_tax: f64,
    pub final_savings_balance: f64,
    pub excess_over_savings: f64,
    pub profile: InvestorProfile,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(year: i32, growth: f64, income: f64) -> AnnualReturn {
        AnnualReturn {
            year,
            growth_return_pct: growth,
            income_return_pct: income,
        }
    }

    #[test]
    fn weights_always_sum_to_100() {
        for pct in 0..=100 {
            let weight = GrowthWeight::new(pct).expect("in range");
            assert_eq!(weight.growth_pct() + weight.income_pct(), 100);
            assert!((weight.growth_fraction() + weight.income_fraction() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn growth_weight_rejects_above_100() {
        assert_eq!(
            GrowthWeight::new(101),
            Err(ValidationError::GrowthWeightOutOfRange(101))
        );
    }

    #[test]
    fn profile_thresholds() {
        let classify = |pct| InvestorProfile::classify(GrowthWeight::new(pct).expect("in range"));
        assert_eq!(classify(80), InvestorProfile::AggressiveGrowth);
        assert_eq!(classify(79), InvestorProfile::AggressiveBalanced);
        assert_eq!(classify(60), InvestorProfile::AggressiveBalanced);
        assert_eq!(classify(59), InvestorProfile::NeutralBalanced);
        assert_eq!(classify(40), InvestorProfile::NeutralBalanced);
        assert_eq!(classify(39), InvestorProfile::StableIncome);
        assert_eq!(classify(0), InvestorProfile::StableIncome);
    }

    #[test]
    fn table_rejects_non_finite_returns() {
        let err = ReturnTable::new(vec![row(2020, 1.0, 1.0), row(2021, f64::NAN, 1.0)])
            .expect_err("must reject NaN");
        assert!(matches!(err, TableError::NonFiniteReturn { year: 2021 }));
    }

    #[test]
    fn table_rejects_loss_beyond_total() {
        let err = ReturnTable::new(vec![row(2020, 1.0, -100.5)])
            .expect_err("must reject a loss beyond -100%");
        assert!(matches!(err, TableError::LossBeyondTotal { year: 2020 }));
    }

    #[test]
    fn table_accepts_total_loss() {
        let table = ReturnTable::new(vec![row(2020, -100.0, -100.0)]).expect("-100% is valid");
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn table_allows_gaps_between_years() {
        let table = ReturnTable::new(vec![row(1990, 1.0, 1.0), row(2000, 2.0, 2.0)])
            .expect("gaps are allowed");
        assert_eq!(table.first_year(), 1990);
        assert_eq!(table.last_year(), 2000);
        assert!(!table.is_empty());
    }
}
