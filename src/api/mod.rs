use axum::{
    Router,
    extract::{Json, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::Parser;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::core::{
    AnnualReturn, Assumptions, GrowthWeight, ReturnTable, SimulationParameters, SimulationResult,
    TableError, ValidationError, load_csv, reference_table, simulate,
};

pub const RETURNS_CSV_ENV: &str = "BLEND_RETURNS_CSV";
const REFERENCE_SOURCE: &str = "reference 2014-2025";

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Args(#[from] clap::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error("failed to serialize result: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulatePayload {
    growth_weight: Option<u32>,
    initial_capital: Option<f64>,
    horizon_years: Option<u32>,
    growth_yield: Option<f64>,
    income_yield: Option<f64>,
    dividend_tax_rate: Option<f64>,
    savings_rate: Option<f64>,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "blend",
    about = "Historical backtest of a growth fund / dividend fund blend with annual rebalancing"
)]
pub struct Cli {
    #[arg(
        long,
        default_value_t = 70,
        help = "Share of capital in the growth fund in percent; the rest goes to the dividend fund"
    )]
    growth_weight: u32,
    #[arg(long, default_value_t = 10_000_000.0)]
    initial_capital: f64,
    #[arg(long, help = "Project the final balance this many years forward at the CAGR")]
    horizon_years: Option<u32>,
    #[arg(
        long,
        default_value_t = 0.6,
        help = "Long-run cash yield of the growth fund in percent"
    )]
    growth_yield: f64,
    #[arg(
        long,
        default_value_t = 3.4,
        help = "Long-run cash yield of the dividend fund in percent"
    )]
    income_yield: f64,
    #[arg(long, default_value_t = 15.0, help = "Tax withheld on dividends in percent")]
    dividend_tax_rate: f64,
    #[arg(
        long,
        default_value_t = 3.5,
        help = "Deposit rate of the savings benchmark in percent"
    )]
    savings_rate: f64,
    #[arg(long, help = "CSV file with year,growth,income rows instead of the built-in table")]
    returns_csv: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
struct ApiRequest {
    params: SimulationParameters,
    assumptions: Assumptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AssumptionsResponse {
    growth_yield_pct: f64,
    income_yield_pct: f64,
    dividend_tax_rate: f64,
    savings_rate: f64,
}

impl From<&Assumptions> for AssumptionsResponse {
    fn from(value: &Assumptions) -> Self {
        Self {
            growth_yield_pct: value.growth_yield_pct,
            income_yield_pct: value.income_yield_pct,
            dividend_tax_rate: value.dividend_tax_rate,
            savings_rate: value.savings_rate,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulateResponse {
    first_year: i32,
    last_year: i32,
    historical_years: usize,
    assumptions: AssumptionsResponse,
    #[serde(flatten)]
    result: SimulationResult,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReturnsResponse<'a> {
    source: &'a str,
    years: &'a [AnnualReturn],
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub struct AppState {
    table: ReturnTable,
    source: String,
}

impl AppState {
    pub fn new(table: ReturnTable, source: impl Into<String>) -> Self {
        Self {
            table,
            source: source.into(),
        }
    }
}

pub fn load_table(path: Option<&Path>) -> Result<(ReturnTable, String), TableError> {
    match path {
        Some(path) => Ok((load_csv(path)?, path.display().to_string())),
        None => Ok((reference_table(), REFERENCE_SOURCE.to_string())),
    }
}

pub fn load_table_from_env() -> Result<(ReturnTable, String), TableError> {
    let path = std::env::var_os(RETURNS_CSV_ENV).map(PathBuf::from);
    load_table(path.as_deref())
}

fn build_request(cli: &Cli) -> Result<ApiRequest, ValidationError> {
    let growth_weight = GrowthWeight::new(cli.growth_weight)?;

    if !cli.initial_capital.is_finite() || cli.initial_capital <= 0.0 {
        return Err(ValidationError::NonPositiveCapital(cli.initial_capital));
    }

    if cli.horizon_years == Some(0) {
        return Err(ValidationError::ZeroHorizon);
    }

    for (name, value) in [
        ("growth yield", cli.growth_yield),
        ("income yield", cli.income_yield),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(ValidationError::NegativeYield { name, value });
        }
    }

    for (name, value) in [
        ("dividend tax rate", cli.dividend_tax_rate),
        ("savings rate", cli.savings_rate),
    ] {
        if !(0.0..=100.0).contains(&value) {
            return Err(ValidationError::RateOutOfRange { name, value });
        }
    }

    Ok(ApiRequest {
        params: SimulationParameters {
            growth_weight,
            initial_capital: cli.initial_capital,
            horizon_years: cli.horizon_years,
        },
        assumptions: Assumptions {
            growth_yield_pct: cli.growth_yield,
            income_yield_pct: cli.income_yield,
            dividend_tax_rate: cli.dividend_tax_rate / 100.0,
            savings_rate: cli.savings_rate / 100.0,
        },
    })
}

pub fn run_cli<I, T>(args: I) -> Result<String, CliError>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = Cli::try_parse_from(args)?;
    let request = build_request(&cli)?;
    let (table, source) = load_table(cli.returns_csv.as_deref())?;
    debug!("simulating against {source}");

    let response = build_simulate_response(&table, &request);
    Ok(serde_json::to_string_pretty(&response)?)
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/simulate",
            get(simulate_get_handler).post(simulate_post_handler),
        )
        .route("/api/returns", get(returns_handler))
        .fallback(not_found_handler)
        .with_state(Arc::new(state))
}

pub async fn run_http_server(port: u16, state: AppState) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(
        "return table: {} ({} years, {}-{})",
        state.source,
        state.table.len(),
        state.table.first_year(),
        state.table.last_year()
    );
    let app = router(state);

    let listener = TcpListener::bind(addr).await?;
    info!("blend HTTP API listening on http://{addr}");
    info!("Local access: http://127.0.0.1:{port}/api/simulate");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn returns_handler(State(state): State<Arc<AppState>>) -> Response {
    json_response(
        StatusCode::OK,
        ReturnsResponse {
            source: &state.source,
            years: state.table.years(),
        },
    )
}

async fn simulate_get_handler(
    State(state): State<Arc<AppState>>,
    Query(payload): Query<SimulatePayload>,
) -> Response {
    simulate_handler_impl(&state, payload)
}

async fn simulate_post_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SimulatePayload>,
) -> Response {
    simulate_handler_impl(&state, payload)
}

fn simulate_handler_impl(state: &AppState, payload: SimulatePayload) -> Response {
    let request = match api_request_from_payload(payload) {
        Ok(request) => request,
        Err(err) => {
            warn!("rejected simulate request: {err}");
            return error_response(StatusCode::BAD_REQUEST, &err.to_string());
        }
    };

    debug!(
        "simulate weight={} capital={} horizon={:?}",
        request.params.growth_weight.growth_pct(),
        request.params.initial_capital,
        request.params.horizon_years
    );
    json_response(
        StatusCode::OK,
        build_simulate_response(&state.table, &request),
    )
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn api_request_from_json(json: &str) -> Result<ApiRequest, String> {
    let payload = serde_json::from_str::<SimulatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload).map_err(|e| e.to_string())
}

fn api_request_from_payload(payload: SimulatePayload) -> Result<ApiRequest, ValidationError> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.growth_weight {
        cli.growth_weight = v;
    }
    if let Some(v) = payload.initial_capital {
        cli.initial_capital = v;
    }
    if let Some(v) = payload.horizon_years {
        cli.horizon_years = Some(v);
    }
    if let Some(v) = payload.growth_yield {
        cli.growth_yield = v;
    }
    if let Some(v) = payload.income_yield {
        cli.income_yield = v;
    }
    if let Some(v) = payload.dividend_tax_rate {
        cli.dividend_tax_rate = v;
    }
    if let Some(v) = payload.savings_rate {
        cli.savings_rate = v;
    }

    build_request(&cli)
}

fn default_cli_for_api() -> Cli {
    Cli {
        growth_weight: 70,
        initial_capital: 10_000_000.0,
        horizon_years: None,
        growth_yield: 0.6,
        income_yield: 3.4,
        dividend_tax_rate: 15.0,
        savings_rate: 3.5,
        returns_csv: None,
    }
}

fn build_simulate_response(table: &ReturnTable, request: &ApiRequest) -> SimulateResponse {
    SimulateResponse {
        first_year: table.first_year(),
        last_year: table.last_year(),
        historical_years: table.len(),
        assumptions: AssumptionsResponse::from(&request.assumptions),
        result: simulate(table, &request.params, &request.assumptions),
    }
}
