//! Application request rates
//!
//! GET /metrics/apps/rps

use axum::extract::{Query, State};
use serde::Deserialize;
use tracing::info;
use utoipa::IntoParams;

use crate::aggregate::{self, Aggregation};
use crate::api::response::{ErrorResponse, PrettyJson};
use crate::api::{first_value, non_empty, AppState};
use crate::error::AppResult;
use crate::prometheus::{query, RangeWidth};

/// Query parameters for `/metrics/apps/rps`
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AppRatesQuery {
    /// Application group to restrict the series to
    #[serde(rename = "app-group")]
    pub app_group: Option<String>,
    /// Focal application; without it every pair in the group is returned
    pub app: Option<String>,
    /// Rate lookback window, defaults to `5m`
    #[serde(rename = "range-width")]
    pub range_width: Option<String>,
}

impl From<Vec<(String, String)>> for AppRatesQuery {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self {
            app_group: first_value(&pairs, "app-group"),
            app: first_value(&pairs, "app"),
            range_width: first_value(&pairs, "range-width"),
        }
    }
}

/// Requests per second between applications
#[utoipa::path(
    get,
    path = "/metrics/apps/rps",
    tag = "metrics",
    params(AppRatesQuery),
    responses(
        (status = 200, description = "`{peer: rps}` when `app` is set, `{app: {peer: rps}}` otherwise", body = Aggregation),
        (status = 500, description = "Query could not be built or executed", body = ErrorResponse)
    )
)]
pub async fn requests_per_second(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> AppResult<PrettyJson<Aggregation>> {
    app_rates(&state, AppRatesQuery::from(pairs)).await
}

async fn app_rates(
    state: &AppState,
    params: AppRatesQuery,
) -> AppResult<PrettyJson<Aggregation>> {
    let range = RangeWidth::from_param(params.range_width.as_deref())?;
    let group = non_empty(params.app_group.as_deref());

    let rates = match non_empty(params.app.as_deref()) {
        Some(app) => {
            info!(app, group = ?group, range_width = %range, "Getting request rates for app");
            let samples = state
                .backend
                .instant_vector(&query::requests_between_pair(group, app, &range))
                .await?;
            Aggregation::Peers(aggregate::app_rates_for(&samples, app))
        }
        None => {
            info!(group = ?group, range_width = %range, "Getting request rates for all apps");
            let samples = state
                .backend
                .instant_vector(&query::requests_within_group(group, &range))
                .await?;
            Aggregation::Pairs(aggregate::app_rates_all(&samples))
        }
    };

    Ok(PrettyJson(rates))
}
