use super::metrics;
use super::models::{AnalyticsFilter, AnalyticsSummary};
use crate::common::errors::AppResult;
use crate::common::state::AppState;
use crate::experiments::models::{ExperimentFilter, ExperimentStatus};
use crate::experiments::services;
use axum::extract::{Query, State};
use axum::response::Json;
use sea_orm::Iterable;
use utoipa_axum::{router::OpenApiRouter, routes};

pub fn router(state: &AppState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(get_analytics))
        .with_state(state.clone())
}

impl From<AnalyticsFilter> for ExperimentFilter {
    fn from(filter: AnalyticsFilter) -> Self {
        let status = filter.exclude_contaminated.then(|| {
            ExperimentStatus::iter()
                .filter(|status| *status != ExperimentStatus::Contaminated)
                .collect()
        });

        ExperimentFilter {
            status,
            substrate_type: filter.substrate_type,
            inoculated_from: filter.inoculated_from,
            inoculated_to: filter.inoculated_to,
            ..ExperimentFilter::default()
        }
    }
}

#[utoipa::path(
    get,
    path = "/",
    params(AnalyticsFilter),
    responses(
        (
            status = 200,
            description = "Success rates, colonization speed, status counts and timeline",
            body = AnalyticsSummary
        )
    ),
    tag = "analytics",
    summary = "Aggregate analytics"
)]
pub async fn get_analytics(
    State(state): State<AppState>,
    Query(filter): Query<AnalyticsFilter>,
) -> AppResult<Json<AnalyticsSummary>> {
    let experiments = services::list_experiments(&state.db, &filter.into()).await?;
    Ok(Json(metrics::summarize(&experiments)))
}
