use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use super::error::TableError;
use super::types::{AnnualReturn, ReturnTable};

// Calendar-year total returns, 2014-2025: (year, growth fund, dividend fund).
const REFERENCE_RETURNS: [(i32, f64, f64); 12] = [
    (2014, 19.18, 15.82),
    (2015, 9.45, -0.32),
    (2016, 7.10, 16.05),
    (2017, 32.66, 21.03),
    (2018, -0.14, -5.56),
    (2019, 38.96, 27.27),
    (2020, 48.60, 15.11),
    (2021, 27.24, 29.87),
    (2022, -32.58, -3.23),
    (2023, 54.85, 4.57),
    (2024, 22.11, 18.90),
    (2025, 14.50, 11.20),
];

#[derive(Debug, Deserialize)]
struct CsvRow {
    year: i32,
    growth: f64,
    income: f64,
}

pub fn reference_table() -> ReturnTable {
    let years = REFERENCE_RETURNS
        .iter()
        .map(|&(year, growth, income)| AnnualReturn {
            year,
            growth_return_pct: growth,
            income_return_pct: income,
        })
        .collect();
    ReturnTable::new(years).expect("reference return table is valid")
}

pub fn load_csv(path: &Path) -> Result<ReturnTable, TableError> {
    let file = std::fs::File::open(path).map_err(|e| TableError::Read {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    parse_csv(file)
}

pub fn parse_csv<R: Read>(reader: R) -> Result<ReturnTable, TableError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut years = Vec::new();
    for result in rdr.deserialize::<CsvRow>() {
        let row = result.map_err(|e| TableError::Parse {
            line: e.position().map(|p| p.line()).unwrap_or(0),
            reason: e.to_string(),
        })?;
        years.push(AnnualReturn {
            year: row.year,
            growth_return_pct: row.growth,
            income_return_pct: row.income,
        });
    }

    ReturnTable::new(years)
}
