use super::types::{
    Assumptions, EquityPoint, GrowthWeight, InvestorProfile, ReturnTable, SimulationParameters,
    SimulationResult,
};

const MONTHS_PER_YEAR: f64 = 12.0;

#[derive(Debug)]
struct DrawdownTracker {
    peak: f64,
    max_drawdown: f64,
}

impl DrawdownTracker {
    fn with_initial(initial: f64) -> Self {
        Self {
            peak: initial,
            max_drawdown: 0.0,
        }
    }

    fn update(&mut self, balance: f64) {
        if balance > self.peak {
            self.peak = balance;
        }
        // A zero peak only happens with zero capital; the curve is flat then.
        if self.peak > 0.0 {
            let drawdown = (balance - self.peak) / self.peak;
            if drawdown < self.max_drawdown {
                self.max_drawdown = drawdown;
            }
        }
    }
}

pub fn simulate(
    table: &ReturnTable,
    params: &SimulationParameters,
    assumptions: &Assumptions,
) -> SimulationResult {
    let weight = params.growth_weight;
    let initial_capital = params.initial_capital;

    let mut balance = initial_capital;
    let mut savings_balance = initial_capital;
    let mut drawdown = DrawdownTracker::with_initial(initial_capital);

    let mut equity_curve = Vec::with_capacity(table.len() + 1);
    equity_curve.push(EquityPoint {
        year: table.first_year() - 1,
        balance: initial_capital,
        savings_balance: initial_capital,
        blended_return_pct: None,
    });

    for row in table.years() {
        let blended = blended_return(weight, row.growth_return_pct, row.income_return_pct);
        balance *= 1.0 + blended;
        savings_balance *= 1.0 + assumptions.savings_rate;
        drawdown.update(balance);

        equity_curve.push(EquityPoint {
            year: row.year,
            balance: balance.round(),
            savings_balance: savings_balance.round(),
            blended_return_pct: Some(blended * 100.0),
        });
    }

    let cagr = compound_annual_growth_rate(initial_capital, balance, table.len());
    let projected_future_value = params
        .horizon_years
        .map(|years| project_future_value(initial_capital, cagr, years));

    let estimated_dividend_yield_pct = blended_yield_pct(weight, assumptions);
    let income_basis = projected_future_value.unwrap_or(balance);
    let estimated_monthly_income =
        income_basis * (estimated_dividend_yield_pct / 100.0) / MONTHS_PER_YEAR;

    let final_balance = balance.round();
    let final_savings_balance = savings_balance.round();

    SimulationResult {
        growth_weight_pct: weight.growth_pct(),
        income_weight_pct: weight.income_pct(),
        initial_capital,
        equity_curve,
        cagr,
        max_drawdown_pct: drawdown.max_drawdown * 100.0,
        final_balance,
        projected_future_value,
        estimated_dividend_yield_pct,
        estimated_monthly_income,
        estimated_monthly_income_after_tax: estimated_monthly_income
            * (1.0 - assumptions.dividend_tax_rate),
        final_savings_balance,
        excess_over_savings: (balance - savings_balance).round(),
        profile: InvestorProfile::classify(weight),
    }
}

pub fn blended_return(weight: GrowthWeight, growth_pct: f64, income_pct: f64) -> f64 {
    weight.growth_fraction() * (growth_pct / 100.0)
        + weight.income_fraction() * (income_pct / 100.0)
}

pub fn blended_yield_pct(weight: GrowthWeight, assumptions: &Assumptions) -> f64 {
    weight.growth_fraction() * assumptions.growth_yield_pct
        + weight.income_fraction() * assumptions.income_yield_pct
}

pub fn compound_annual_growth_rate(start: f64, end: f64, years: usize) -> f64 {
    // Zero capital leaves nothing to compound.
    if start <= 0.0 || years == 0 {
        return 0.0;
    }
    (end / start).powf(1.0 / years as f64) - 1.0
}

pub fn project_future_value(start: f64, rate: f64, years: u32) -> f64 {
    start * (1.0 + rate).powf(f64::from(years))
}
