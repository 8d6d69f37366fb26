//! Exchange-rate endpoints
//!
//! Every request re-fetches the upstream feed; nothing is cached between
//! requests.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::get,
    Router,
};

use adapter_exrate::query;
use adapter_exrate::{ConversionResult, ExrateError, RateSheet};

use super::AppState;
use crate::config::ErrorMode;
use crate::error::RouteError;
use crate::telemetry;

const ROUTE_ALL: &str = "all_rates";
const ROUTE_CURRENCY: &str = "currency";
const ROUTE_CONVERT: &str = "convert";

/// Build the rate routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(all_rates_handler))
        .route("/{currency}", get(currency_handler))
        .route("/convert/{currency}/{amount}", get(convert_handler))
}

fn respond<T>(
    state: &AppState,
    route: &'static str,
    result: Result<T, ExrateError>,
) -> Result<Json<T>, RouteError> {
    match result {
        Ok(value) => {
            telemetry::record_request(route, "ok");
            Ok(Json(value))
        }
        Err(error) => Err(state.reject(route, error)),
    }
}

/// GET / - Full rate sheet
async fn all_rates_handler(State(state): State<AppState>) -> Result<Json<RateSheet>, RouteError> {
    let result = state.fetch_rate_sheet().await.map(query::get_all_rates);
    respond(&state, ROUTE_ALL, result)
}

/// GET /{currency} - Rate sheet narrowed to one currency (case-insensitive)
async fn currency_handler(
    State(state): State<AppState>,
    Path(currency): Path<String>,
) -> Result<Json<RateSheet>, RouteError> {
    let result = state
        .fetch_rate_sheet()
        .await
        .and_then(|sheet| query::get_rate_by_currency(sheet, &currency));
    respond(&state, ROUTE_CURRENCY, result)
}

/// GET /convert/{currency}/{amount} - Amount converted at mid rates
///
/// In compat mode a non-numeric amount is not rejected: it becomes `NaN`
/// and the results serialize as `null`.
async fn convert_handler(
    State(state): State<AppState>,
    Path((currency, amount)): Path<(String, String)>,
) -> Result<Json<ConversionResult>, RouteError> {
    let amount = match query::parse_amount(&amount) {
        Ok(amount) => amount,
        Err(error) if state.config.error_mode == ErrorMode::Compat => {
            tracing::warn!(error = %error, "Converting non-numeric amount as NaN");
            f64::NAN
        }
        Err(error) => return Err(state.reject(ROUTE_CONVERT, error)),
    };

    let result = state
        .fetch_rate_sheet()
        .await
        .and_then(|sheet| query::convert_amount(&sheet, &currency, amount));
    respond(&state, ROUTE_CONVERT, result)
}
